//! Team-level usage allocation
//!
//! Every player draws shares from their own stream; teammates are then
//! rescaled together at each index so a channel never hands out more than
//! the whole team volume.

use crate::sampling::beta_share;
use crate::seeding::{stream, Stage};
use prior_store::UsagePrior;
use serde::{Deserialize, Serialize};

/// Realized shares for one player at one draw index
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct UsageDraw {
    /// Share of team pass attempts
    pub pass_share: f64,

    /// Share of team targets
    pub target_share: f64,

    /// Share of team carries
    pub carry_share: f64,
}

/// A player taking part in usage allocation
#[derive(Debug, Clone, Copy)]
pub struct UsageParticipant<'a> {
    pub player_id: &'a str,
    pub usage: &'a UsagePrior,
}

/// Draw and normalize usage for one team.
///
/// Returns one series per participant, in input order.
pub fn allocate_team_usage(
    participants: &[UsageParticipant<'_>],
    seed: u64,
    n_draws: usize,
    max_share: f64,
) -> Vec<Vec<UsageDraw>> {
    let mut series: Vec<Vec<UsageDraw>> = participants
        .iter()
        .map(|p| {
            let mut rng = stream(seed, Stage::Usage, p.player_id);
            (0..n_draws)
                .map(|_| UsageDraw {
                    pass_share: beta_share(&mut rng, p.usage.pass_attempt_share, max_share),
                    target_share: beta_share(&mut rng, p.usage.target_share, max_share),
                    carry_share: beta_share(&mut rng, p.usage.carry_share, max_share),
                })
                .collect()
        })
        .collect();

    for i in 0..n_draws {
        normalize_channel(&mut series, i, |d| &mut d.pass_share);
        normalize_channel(&mut series, i, |d| &mut d.target_share);
        normalize_channel(&mut series, i, |d| &mut d.carry_share);
    }

    series
}

fn normalize_channel(
    series: &mut [Vec<UsageDraw>],
    index: usize,
    channel: impl Fn(&mut UsageDraw) -> &mut f64,
) {
    let total: f64 = series.iter_mut().map(|s| *channel(&mut s[index])).sum();
    if total > 1.0 {
        for s in series.iter_mut() {
            *channel(&mut s[index]) /= total;
        }
    }
}
