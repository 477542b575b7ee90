//! Content-addressed cache of simulation runs

use crate::config::EngineConfig;
use crate::error::SimError;
use crate::run::RunOutput;
use crate::slate::SlatePlayer;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use prior_store::PriorSnapshot;
use serde::Serialize;
use siphasher::sip::SipHasher13;
use std::collections::HashMap;
use std::hash::Hasher;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, info};

/// Identity of a cached run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct RunKey {
    pub inputs_hash: u64,
    pub seed: u64,
    pub n_draws: usize,
}

#[derive(Debug, Clone)]
struct CachedRun {
    output: Arc<RunOutput>,
    cached_at: DateTime<Utc>,
    sequence: u64,
}

/// Bounded cache of run outputs, evicting the oldest entry first
pub struct RunCache {
    max_entries: usize,
    entries: RwLock<HashMap<RunKey, CachedRun>>,
    sequence: AtomicU64,
    hits: AtomicU64,
    misses: AtomicU64,
}

/// Snapshot of cache state
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CacheStats {
    pub size: usize,
    pub max_size: usize,
    pub hits: u64,
    pub misses: u64,
    pub oldest_entry: Option<DateTime<Utc>>,
}

impl RunCache {
    pub fn new(max_entries: usize) -> Self {
        Self {
            max_entries: max_entries.max(1),
            entries: RwLock::new(HashMap::new()),
            sequence: AtomicU64::new(0),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Look up a run
    pub fn get(&self, key: &RunKey) -> Option<Arc<RunOutput>> {
        let entries = self.entries.read();
        match entries.get(key) {
            Some(cached) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                debug!(
                    "Run cache hit for {:016x} (seed {}, {} draws)",
                    key.inputs_hash, key.seed, key.n_draws
                );
                Some(Arc::clone(&cached.output))
            }
            None => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                debug!("Run cache miss for {:016x}", key.inputs_hash);
                None
            }
        }
    }

    /// Store a run, evicting the oldest entries when full
    pub fn insert(&self, key: RunKey, output: Arc<RunOutput>) {
        let mut entries = self.entries.write();

        if !entries.contains_key(&key) && entries.len() >= self.max_entries {
            let mut by_age: Vec<(RunKey, u64)> =
                entries.iter().map(|(k, v)| (*k, v.sequence)).collect();
            by_age.sort_by_key(|(_, sequence)| *sequence);

            let to_remove = entries.len() + 1 - self.max_entries;
            for (old, _) in by_age.iter().take(to_remove) {
                entries.remove(old);
            }
            info!("Run cache full, evicted {} oldest entries", to_remove);
        }

        let sequence = self.sequence.fetch_add(1, Ordering::Relaxed);
        entries.insert(key, CachedRun { output, cached_at: Utc::now(), sequence });
    }

    /// Drop every run computed from the given inputs
    pub fn invalidate_inputs(&self, inputs_hash: u64) -> usize {
        let mut entries = self.entries.write();
        let before = entries.len();
        entries.retain(|key, _| key.inputs_hash != inputs_hash);
        let removed = before - entries.len();
        if removed > 0 {
            info!("Invalidated {} cached runs for inputs {:016x}", removed, inputs_hash);
        }
        removed
    }

    /// Drop everything
    pub fn invalidate_all(&self) {
        let mut entries = self.entries.write();
        let removed = entries.len();
        entries.clear();
        info!("Invalidated all {} cached runs", removed);
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    pub fn stats(&self) -> CacheStats {
        let entries = self.entries.read();
        CacheStats {
            size: entries.len(),
            max_size: self.max_entries,
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            oldest_entry: entries.values().map(|cached| cached.cached_at).min(),
        }
    }
}

/// Everything a run reads, in a stable order for hashing
#[derive(Serialize)]
struct RunInputs<'a> {
    teams: Vec<&'a prior_store::TeamPrior>,
    players: Vec<&'a prior_store::PlayerPrior>,
    thresholds: Vec<(prior_store::Position, f64)>,
    slate: &'a [SlatePlayer],
    config: HashedConfig<'a>,
}

/// Configuration minus the fields that never change results
#[derive(Serialize)]
struct HashedConfig<'a> {
    season: i32,
    week: u32,
    min_stable_draws: usize,
    retain_outcomes: bool,
    environment: &'a crate::config::EnvironmentConfig,
    usage: &'a crate::config::UsageConfig,
    scoring: &'a crate::scoring::ScoringRules,
    fallback: &'a crate::config::FallbackConfig,
}

/// SipHash of the serialized priors, slate and result-affecting configuration.
///
/// Seed and draw count are part of [`RunKey`]; thread count and cache
/// settings are left out because they never change the output.
pub fn inputs_hash(
    priors: &PriorSnapshot,
    slate: &[SlatePlayer],
    config: &EngineConfig,
) -> Result<u64, SimError> {
    let mut thresholds: Vec<_> = priors.thresholds().iter().map(|(p, t)| (*p, *t)).collect();
    thresholds.sort_by_key(|(position, _)| *position);

    let inputs = RunInputs {
        teams: priors.teams_sorted(),
        players: priors.players_sorted(),
        thresholds,
        slate,
        config: HashedConfig {
            season: config.run.season,
            week: config.run.week,
            min_stable_draws: config.run.min_stable_draws,
            retain_outcomes: config.run.retain_outcomes,
            environment: &config.environment,
            usage: &config.usage,
            scoring: &config.scoring,
            fallback: &config.fallback,
        },
    };

    let bytes = serde_json::to_vec(&inputs)?;
    let mut hasher = SipHasher13::new_with_keys(0, 0);
    hasher.write(&bytes);
    Ok(hasher.finish())
}
