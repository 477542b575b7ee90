use crate::hashing::normalize_name;
use crate::types::{PlayerPrior, PlayerPriorData, Position, TeamPrior, TeamPriorData};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};

pub const TEAM_PRIORS_FILE: &str = "team_priors.json";
pub const PLAYER_PRIORS_FILE: &str = "player_priors.json";
pub const BOOM_THRESHOLDS_FILE: &str = "boom_thresholds.json";

/// Errors raised while loading priors
#[derive(Error, Debug)]
pub enum PriorStoreError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Duplicate {kind} prior for '{key}'")]
    Duplicate { kind: &'static str, key: String },
}

/// Source of historical priors. The engine only reads from it, once per run.
pub trait PriorStore: Send + Sync {
    fn load_team_priors(&self) -> Result<HashMap<String, TeamPrior>, PriorStoreError>;

    fn load_player_priors(&self) -> Result<HashMap<String, PlayerPrior>, PriorStoreError>;

    fn load_boom_thresholds(&self) -> Result<HashMap<Position, f64>, PriorStoreError>;
}

/// Priors held in memory (tests, embedding callers)
#[derive(Debug, Clone, Default)]
pub struct InMemoryPriorStore {
    teams: HashMap<String, TeamPrior>,
    players: HashMap<String, PlayerPrior>,
    thresholds: HashMap<Position, f64>,
}

impl InMemoryPriorStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_team(mut self, prior: TeamPrior) -> Self {
        self.teams.insert(prior.team.clone(), prior);
        self
    }

    pub fn with_player(mut self, prior: PlayerPrior) -> Self {
        self.players.insert(prior.player_id.clone(), prior);
        self
    }

    pub fn with_threshold(mut self, position: Position, threshold: f64) -> Self {
        self.thresholds.insert(position, threshold);
        self
    }
}

impl PriorStore for InMemoryPriorStore {
    fn load_team_priors(&self) -> Result<HashMap<String, TeamPrior>, PriorStoreError> {
        Ok(self.teams.clone())
    }

    fn load_player_priors(&self) -> Result<HashMap<String, PlayerPrior>, PriorStoreError> {
        Ok(self.players.clone())
    }

    fn load_boom_thresholds(&self) -> Result<HashMap<Position, f64>, PriorStoreError> {
        Ok(self.thresholds.clone())
    }
}

/// Priors stored as JSON files in one baseline directory
#[derive(Debug, Clone)]
pub struct JsonPriorStore {
    dir: PathBuf,
}

impl JsonPriorStore {
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        Self { dir: dir.as_ref().to_path_buf() }
    }

    fn read<T: serde::de::DeserializeOwned>(&self, file: &str) -> Result<T, PriorStoreError> {
        let path = self.dir.join(file);
        info!("Loading priors from: {:?}", path);

        let content = std::fs::read_to_string(&path)
            .map_err(|source| PriorStoreError::Io { path: path.clone(), source })?;
        serde_json::from_str(&content).map_err(|source| PriorStoreError::Parse { path, source })
    }
}

impl PriorStore for JsonPriorStore {
    fn load_team_priors(&self) -> Result<HashMap<String, TeamPrior>, PriorStoreError> {
        let data: TeamPriorData = self.read(TEAM_PRIORS_FILE)?;
        info!("Loaded {} team priors (seasons {})", data.teams.len(), data.seasons);

        let mut teams = HashMap::with_capacity(data.teams.len());
        for prior in data.teams {
            let key = prior.team.clone();
            if teams.insert(key.clone(), prior).is_some() {
                return Err(PriorStoreError::Duplicate { kind: "team", key });
            }
        }
        Ok(teams)
    }

    fn load_player_priors(&self) -> Result<HashMap<String, PlayerPrior>, PriorStoreError> {
        let data: PlayerPriorData = self.read(PLAYER_PRIORS_FILE)?;
        info!("Loaded {} player priors (seasons {})", data.players.len(), data.seasons);

        let mut players = HashMap::with_capacity(data.players.len());
        for prior in data.players {
            let key = prior.player_id.clone();
            if players.insert(key.clone(), prior).is_some() {
                return Err(PriorStoreError::Duplicate { kind: "player", key });
            }
        }
        Ok(players)
    }

    fn load_boom_thresholds(&self) -> Result<HashMap<Position, f64>, PriorStoreError> {
        self.read(BOOM_THRESHOLDS_FILE)
    }
}

/// Boom thresholds used when the baseline has no entry for a position
pub fn default_boom_threshold(position: Position) -> f64 {
    match position {
        Position::QB => 25.0,
        Position::RB => 20.0,
        Position::WR => 18.0,
        Position::TE => 15.0,
        Position::DST => 12.0,
    }
}

/// Read-only view of all priors for the duration of one run
#[derive(Debug, Clone, Default)]
pub struct PriorSnapshot {
    teams: HashMap<String, TeamPrior>,
    players: HashMap<String, PlayerPrior>,
    thresholds: HashMap<Position, f64>,

    /// Normalized name -> player ids, for slates that carry a different key
    players_by_name: HashMap<String, Vec<String>>,
}

impl PriorSnapshot {
    /// Load every prior table from a store
    pub fn load(store: &dyn PriorStore) -> Result<Self, PriorStoreError> {
        let teams = store.load_team_priors()?;
        let players = store.load_player_priors()?;
        let mut thresholds = store.load_boom_thresholds()?;

        for position in Position::ALL {
            thresholds.entry(position).or_insert_with(|| {
                let fallback = default_boom_threshold(position);
                warn!("No boom threshold for {}, using default {:.1}", position, fallback);
                fallback
            });
        }

        Ok(Self::from_parts(teams, players, thresholds))
    }

    pub fn from_parts(
        teams: HashMap<String, TeamPrior>,
        players: HashMap<String, PlayerPrior>,
        thresholds: HashMap<Position, f64>,
    ) -> Self {
        let mut players_by_name: HashMap<String, Vec<String>> = HashMap::new();
        for prior in players.values() {
            players_by_name
                .entry(normalize_name(&prior.name))
                .or_default()
                .push(prior.player_id.clone());
        }
        for ids in players_by_name.values_mut() {
            ids.sort();
        }

        Self { teams, players, thresholds, players_by_name }
    }

    pub fn team(&self, team: &str) -> Option<&TeamPrior> {
        self.teams.get(team)
    }

    /// Find a player's prior by key, then by name within the same position.
    ///
    /// The name match covers traded players whose key still carries the old team.
    pub fn player(&self, player_id: &str, name: &str, position: Position) -> Option<&PlayerPrior> {
        if let Some(prior) = self.players.get(player_id) {
            return Some(prior);
        }

        self.players_by_name
            .get(&normalize_name(name))?
            .iter()
            .filter_map(|id| self.players.get(id))
            .find(|prior| prior.position == position)
    }

    pub fn boom_threshold(&self, position: Position) -> Option<f64> {
        self.thresholds.get(&position).copied()
    }

    pub fn thresholds(&self) -> &HashMap<Position, f64> {
        &self.thresholds
    }

    pub fn team_count(&self) -> usize {
        self.teams.len()
    }

    pub fn player_count(&self) -> usize {
        self.players.len()
    }

    /// Whether nothing usable was loaded
    pub fn is_empty(&self) -> bool {
        self.teams.is_empty() && self.players.is_empty()
    }

    /// Team priors sorted by team id
    pub fn teams_sorted(&self) -> Vec<&TeamPrior> {
        let mut teams: Vec<&TeamPrior> = self.teams.values().collect();
        teams.sort_by(|a, b| a.team.cmp(&b.team));
        teams
    }

    /// Player priors sorted by player id
    pub fn players_sorted(&self) -> Vec<&PlayerPrior> {
        let mut players: Vec<&PlayerPrior> = self.players.values().collect();
        players.sort_by(|a, b| a.player_id.cmp(&b.player_id));
        players
    }
}
