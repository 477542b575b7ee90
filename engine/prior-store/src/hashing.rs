use crate::types::Position;

/// Stable key for a player, shared by the prior files and the slate.
///
/// The key is `TEAM_POS_NAME` with the name upper-cased and every run of
/// non-alphanumeric characters collapsed to one underscore, so the same
/// player always maps to the same key across sites and restarts.
pub fn player_key(name: &str, position: Position, team: &str) -> String {
    format!("{}_{}_{}", team.trim().to_ascii_uppercase(), position, slugify(name))
}

/// Upper-case slug of a display name ("Ja'Marr Chase" -> "JA_MARR_CHASE")
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_sep = false;

    for ch in name.chars() {
        if ch.is_ascii_alphanumeric() {
            if pending_sep && !slug.is_empty() {
                slug.push('_');
            }
            pending_sep = false;
            slug.push(ch.to_ascii_uppercase());
        } else {
            pending_sep = true;
        }
    }

    slug
}

/// Name normalization for fuzzy lookups (case and punctuation insensitive)
pub fn normalize_name(name: &str) -> String {
    slugify(name).replace('_', "")
}
