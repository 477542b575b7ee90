//! Slate records and per-record validation

use prior_store::{player_key, Position};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// One row of a DFS slate as supplied by the caller
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SlatePlayer {
    /// Stable key; derived from name, position and team when absent
    #[serde(default)]
    pub player_id: Option<String>,

    #[serde(default)]
    pub name: String,

    /// Site position code ("QB", "DST", "D", ...)
    #[serde(default)]
    pub position: String,

    #[serde(default)]
    pub team: String,

    #[serde(default)]
    pub opponent: String,

    /// Salary in dollars
    #[serde(default)]
    pub salary: Option<u32>,

    /// Projected ownership in percent (0..100)
    #[serde(default)]
    pub ownership: Option<f64>,

    /// Site fantasy point projection
    #[serde(default)]
    pub site_projection: Option<f64>,

    /// Game over/under
    #[serde(default)]
    pub vegas_total: Option<f64>,

    /// Spread from this player's team's perspective (negative = favorite)
    #[serde(default)]
    pub spread: Option<f64>,
}

/// A slate record that passed validation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidatedPlayer {
    /// Index of the record in the input slate
    pub record: usize,
    pub player_id: String,
    pub name: String,
    pub position: Position,
    pub team: String,
    pub opponent: String,
    pub salary: Option<u32>,
    pub ownership: Option<f64>,
    pub site_projection: Option<f64>,
    pub vegas_total: Option<f64>,
    pub spread: Option<f64>,
}

impl ValidatedPlayer {
    /// Matchup key shared by both teams of a game
    pub fn matchup_key(&self) -> String {
        matchup_key(&self.team, &self.opponent)
    }
}

/// Key of a game: both team ids sorted and joined with `@`
pub fn matchup_key(team: &str, opponent: &str) -> String {
    if team <= opponent {
        format!("{team}@{opponent}")
    } else {
        format!("{opponent}@{team}")
    }
}

/// What is wrong with a slate record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DefectKind {
    MissingField { field: String },
    UnknownPosition { value: String },
    DuplicatePlayer { player_id: String },
    InvalidMatchup { team: String, opponent: String },
    NoPriorOrProjection,
    MissingTeamPrior { team: String },
    InvalidOptional { field: String, value: String },
}

impl DefectKind {
    /// Whether the record is dropped from the run
    pub fn is_rejection(&self) -> bool {
        !matches!(self, DefectKind::MissingTeamPrior { .. } | DefectKind::InvalidOptional { .. })
    }
}

impl fmt::Display for DefectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DefectKind::MissingField { field } => write!(f, "missing mandatory field '{field}'"),
            DefectKind::UnknownPosition { value } => write!(f, "unknown position '{value}'"),
            DefectKind::DuplicatePlayer { player_id } => {
                write!(f, "duplicate player '{player_id}'")
            }
            DefectKind::InvalidMatchup { team, opponent } => {
                write!(f, "invalid matchup {team} vs {opponent}")
            }
            DefectKind::NoPriorOrProjection => {
                write!(f, "no usable prior and no site projection")
            }
            DefectKind::MissingTeamPrior { team } => {
                write!(f, "no team prior for {team}, using league average")
            }
            DefectKind::InvalidOptional { field, value } => {
                write!(f, "ignoring invalid {field} '{value}'")
            }
        }
    }
}

/// A per-record problem reported alongside results
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordDefect {
    /// Index of the record in the input slate
    pub record: usize,

    /// Player id or name, whatever the record carried
    pub player: String,

    #[serde(flatten)]
    pub kind: DefectKind,
}

impl RecordDefect {
    pub fn new(record: usize, player: impl Into<String>, kind: DefectKind) -> Self {
        Self { record, player: player.into(), kind }
    }
}

/// Split a slate into valid players and defects.
///
/// Rejected records never reach the simulation; optional fields that fail
/// validation are dropped with a non-rejecting defect.
pub fn validate_slate(slate: &[SlatePlayer]) -> (Vec<ValidatedPlayer>, Vec<RecordDefect>) {
    let mut valid = Vec::with_capacity(slate.len());
    let mut defects = Vec::new();
    let mut seen = HashSet::new();

    for (record, row) in slate.iter().enumerate() {
        let label = row
            .player_id
            .as_deref()
            .filter(|id| !id.trim().is_empty())
            .unwrap_or(row.name.as_str())
            .trim()
            .to_string();

        match validate_record(record, row) {
            Ok((player, optional_defects)) => {
                if !seen.insert(player.player_id.clone()) {
                    defects.push(RecordDefect::new(
                        record,
                        label,
                        DefectKind::DuplicatePlayer { player_id: player.player_id },
                    ));
                    continue;
                }
                defects.extend(optional_defects);
                valid.push(player);
            }
            Err(kind) => defects.push(RecordDefect::new(record, label, kind)),
        }
    }

    (valid, defects)
}

fn validate_record(
    record: usize,
    row: &SlatePlayer,
) -> Result<(ValidatedPlayer, Vec<RecordDefect>), DefectKind> {
    let id = row.player_id.as_deref().map(str::trim).filter(|id| !id.is_empty());
    let name = row.name.trim();
    if id.is_none() && name.is_empty() {
        return Err(DefectKind::MissingField { field: "name".to_string() });
    }
    for (field, value) in
        [("position", &row.position), ("team", &row.team), ("opponent", &row.opponent)]
    {
        if value.trim().is_empty() {
            return Err(DefectKind::MissingField { field: field.to_string() });
        }
    }

    let position: Position = row
        .position
        .parse()
        .map_err(|_| DefectKind::UnknownPosition { value: row.position.clone() })?;

    let team = row.team.trim().to_ascii_uppercase();
    let opponent = row.opponent.trim().to_ascii_uppercase();
    if team == opponent {
        return Err(DefectKind::InvalidMatchup { team, opponent });
    }

    let player_id = match id {
        Some(id) => id.to_string(),
        None => player_key(name, position, &team),
    };
    let display_name = if name.is_empty() { player_id.clone() } else { name.to_string() };

    let mut defects = Vec::new();
    let mut check = |field: &str, value: Option<f64>, ok: fn(f64) -> bool| -> Option<f64> {
        let value = value?;
        if value.is_finite() && ok(value) {
            Some(value)
        } else {
            defects.push(RecordDefect::new(
                record,
                player_id.clone(),
                DefectKind::InvalidOptional { field: field.to_string(), value: value.to_string() },
            ));
            None
        }
    };

    let ownership = check("ownership", row.ownership, |v| (0.0..=100.0).contains(&v));
    let site_projection = check("site_projection", row.site_projection, |v| v >= 0.0);
    let vegas_total = check("vegas_total", row.vegas_total, |v| v > 0.0);
    let spread = check("spread", row.spread, |_| true);

    let player = ValidatedPlayer {
        record,
        player_id,
        name: display_name,
        position,
        team,
        opponent,
        salary: row.salary,
        ownership,
        site_projection,
        vegas_total,
        spread,
    };
    Ok((player, defects))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(name: &str, position: &str, team: &str, opponent: &str) -> SlatePlayer {
        SlatePlayer {
            name: name.to_string(),
            position: position.to_string(),
            team: team.to_string(),
            opponent: opponent.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_valid_record_gets_derived_key() {
        let (valid, defects) = validate_slate(&[row("Josh Allen", "qb", "buf", "MIA")]);
        assert!(defects.is_empty());
        assert_eq!(valid.len(), 1);
        assert_eq!(valid[0].player_id, "BUF_QB_JOSH_ALLEN");
        assert_eq!(valid[0].position, Position::QB);
        assert_eq!(valid[0].matchup_key(), "BUF@MIA");
    }

    #[test]
    fn test_matchup_key_is_order_independent() {
        assert_eq!(matchup_key("MIA", "BUF"), matchup_key("BUF", "MIA"));
    }

    #[test]
    fn test_rejections() {
        let slate = vec![
            row("", "QB", "BUF", "MIA"),
            row("Somebody", "K", "BUF", "MIA"),
            row("Somebody Else", "WR", "BUF", "BUF"),
            row("Josh Allen", "QB", "BUF", "MIA"),
            row("Josh Allen", "QB", "BUF", "MIA"),
            row("James Cook", "RB", "", "MIA"),
        ];
        let (valid, defects) = validate_slate(&slate);

        assert_eq!(valid.len(), 1);
        assert_eq!(defects.len(), 5);
        assert!(defects.iter().all(|d| d.kind.is_rejection()));
        assert!(matches!(defects[0].kind, DefectKind::MissingField { .. }));
        assert!(matches!(defects[1].kind, DefectKind::UnknownPosition { .. }));
        assert!(matches!(defects[2].kind, DefectKind::InvalidMatchup { .. }));
        assert_eq!(defects[3].record, 4);
        assert!(matches!(defects[3].kind, DefectKind::DuplicatePlayer { .. }));
        assert_eq!(defects[4].kind, DefectKind::MissingField { field: "team".to_string() });
    }

    #[test]
    fn test_invalid_optionals_are_dropped_not_rejected() {
        let mut r = row("Dalton Kincaid", "TE", "BUF", "MIA");
        r.ownership = Some(140.0);
        r.site_projection = Some(f64::NAN);
        r.vegas_total = Some(47.5);
        r.salary = Some(4200);

        let (valid, defects) = validate_slate(&[r]);
        assert_eq!(valid.len(), 1);
        assert_eq!(valid[0].ownership, None);
        assert_eq!(valid[0].site_projection, None);
        assert_eq!(valid[0].vegas_total, Some(47.5));
        assert_eq!(defects.len(), 2);
        assert!(defects.iter().all(|d| !d.kind.is_rejection()));
    }

    #[test]
    fn test_dst_aliases_and_explicit_ids() {
        let mut r = row("Bills", "D", "BUF", "MIA");
        r.player_id = Some("BUF_DST".to_string());
        let (valid, _) = validate_slate(&[r]);
        assert_eq!(valid[0].position, Position::DST);
        assert_eq!(valid[0].player_id, "BUF_DST");
    }

    #[test]
    fn test_defect_serializes_flat() {
        let defect = RecordDefect::new(3, "X", DefectKind::NoPriorOrProjection);
        let json = serde_json::to_value(&defect).unwrap();
        assert_eq!(json["kind"], "no_prior_or_projection");
        assert_eq!(json["record"], 3);
    }
}
