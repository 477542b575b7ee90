//! Slate-wide view of simulated players

use prior_store::Position;
use serde::{Deserialize, Serialize};
use sim_engine::{PlayerSummary, RunOutput};

/// One simulated player with the site inputs downstream metrics need
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoolEntry {
    pub player_id: String,
    pub name: String,
    pub position: Position,
    pub team: String,
    pub opponent: String,
    pub salary: Option<u32>,

    /// Percent (0..100)
    pub ownership: Option<f64>,
    pub site_projection: Option<f64>,
    pub summary: PlayerSummary,
}

impl PoolEntry {
    /// Whether the player counts toward projection accuracy
    pub fn is_evaluable(&self) -> bool {
        !self.summary.rookie_fallback && self.site_projection.map_or(false, |site| site > 0.0)
    }
}

/// Every summary in a slate plus salary, ownership and site projection
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PoolContext {
    pub entries: Vec<PoolEntry>,
}

impl PoolContext {
    pub fn new(entries: Vec<PoolEntry>) -> Self {
        Self { entries }
    }

    pub fn from_run(output: &RunOutput) -> Self {
        let entries = output
            .players
            .iter()
            .map(|simulated| {
                let player = &simulated.player;
                PoolEntry {
                    player_id: player.player_id.clone(),
                    name: player.name.clone(),
                    position: player.position,
                    team: player.team.clone(),
                    opponent: player.opponent.clone(),
                    salary: player.salary,
                    ownership: player.ownership,
                    site_projection: player.site_projection,
                    summary: simulated.summary.clone(),
                }
            })
            .collect();
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PoolEntry> {
        self.entries.iter()
    }
}
