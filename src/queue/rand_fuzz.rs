use itertools::Itertools;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::HashSet;
use std::path::Path;

use crate::datatype::{self, NodeId, Priority};
use crate::minimizer::{self, CoverageOracle};
use crate::queue::durable::DurableQueue;
use crate::queue::file::FileQueue;
use crate::queue::SeedQueue;
use crate::{QueueConfig, Result};

const RAND_SEED_QUEUE_NAME: &str = "rand-seed";

/// Two-tier seed queue for the random-fuzzing loop.
///
/// The favored tier is durable: dequeue hands out clones round-robin and the
/// seed stays for re-sampling until a culling pass removes it. The normal
/// tier spills to disk and is consumed for good. Tier choice is a biased
/// coin flip while both tiers hold seeds.
pub struct RandFuzzQueue<S> {
    favored: DurableQueue<S>,
    normal: FileQueue,
    last_minimized_count: usize,
    remove_count: u64,
    favored_seed_prob: f64,
    culling_threshold: f64,
    rng: StdRng,
}

impl<S> RandFuzzQueue<S>
where
    S: Serialize + DeserializeOwned + Clone + PartialEq,
{
    pub fn initialize(
        queue_dir: &Path,
        favored_snapshot: Option<&Path>,
        config: &QueueConfig,
    ) -> Result<Self> {
        Self::with_rng(queue_dir, favored_snapshot, config, StdRng::from_entropy())
    }

    /// Deterministic variant for tests and reproducible runs.
    pub fn with_rng_seed(
        queue_dir: &Path,
        favored_snapshot: Option<&Path>,
        config: &QueueConfig,
        rng_seed: u64,
    ) -> Result<Self> {
        Self::with_rng(
            queue_dir,
            favored_snapshot,
            config,
            StdRng::seed_from_u64(rng_seed),
        )
    }

    fn with_rng(
        queue_dir: &Path,
        favored_snapshot: Option<&Path>,
        config: &QueueConfig,
        rng: StdRng,
    ) -> Result<Self> {
        let favored = match favored_snapshot {
            Some(path) if path.is_file() => DurableQueue::load(path)?,
            _ => DurableQueue::new(config.durable_queue_max_size),
        };
        let normal =
            FileQueue::initialize(RAND_SEED_QUEUE_NAME, queue_dir, config.file_queue_max_size)?;
        log::debug!(
            "rand-fuzz queue up: {} favored, {} normal seeds",
            favored.size(),
            normal.size()
        );
        Ok(RandFuzzQueue {
            favored,
            normal,
            last_minimized_count: 0,
            remove_count: 0,
            favored_seed_prob: config.favored_seed_prob,
            culling_threshold: config.seed_culling_threshold,
            rng,
        })
    }

    pub fn favored_size(&self) -> usize {
        self.favored.size()
    }

    pub fn normal_size(&self) -> usize {
        self.normal.size()
    }

    /// Cumulative number of seeds removed by culling passes.
    pub fn remove_count(&self) -> u64 {
        self.remove_count
    }

    /// The favored tier has outgrown the last culled size by the configured
    /// factor. A never-minimized queue triggers as soon as any seed exists.
    pub fn time_to_minimize(&self) -> bool {
        self.favored.size() as f64 > self.last_minimized_count as f64 * self.culling_threshold
    }

    /// Cull favored seeds whose coverage is subsumed by the others.
    ///
    /// Queries the oracle once per live seed, then applies the removals in
    /// descending index order so the left-shifts cannot invalidate the
    /// indices still pending. Returns the number of seeds removed.
    pub fn minimize(&mut self, oracle: &mut impl CoverageOracle<S>) -> Result<usize> {
        let entries: Vec<(usize, S, HashSet<NodeId>)> = self
            .favored
            .iter_indexed()
            .map(|(idx, seed)| (idx, seed.clone(), oracle.node_set(seed)))
            .collect();
        let redundant = minimizer::redundant_entries(entries);
        let removed = redundant.len();
        for (idx, seed) in redundant
            .into_iter()
            .sorted_by(|a, b| b.0.cmp(&a.0))
        {
            self.favored.remove(idx, &seed)?;
        }
        self.last_minimized_count = self.favored.size();
        self.remove_count += removed as u64;
        log::info!(
            "seed culling removed {} seeds, {} remain favored",
            removed,
            self.favored.size()
        );
        Ok(removed)
    }

    pub fn monitor_data(&self) -> serde_json::Value {
        serde_json::json!({
            "favored": self.favored.size(),
            "normal": self.normal.size(),
            "removed": self.remove_count,
        })
    }
}

impl<S> SeedQueue<S> for RandFuzzQueue<S>
where
    S: Serialize + DeserializeOwned + Clone + PartialEq,
{
    fn enqueue(&mut self, priority: Priority, seed: S) -> Result<()> {
        match priority {
            Priority::Favored => {
                self.favored.enqueue(seed);
                Ok(())
            }
            Priority::Normal => {
                let bytes = datatype::to_bytes(&seed)?;
                self.normal.enqueue(&bytes)
            }
        }
    }

    // Favored with probability `favored_seed_prob` while both tiers hold
    // seeds; the favored path samples without removing, the normal path
    // consumes.
    fn dequeue(&mut self) -> Result<(Priority, S)> {
        let pick_favored =
            self.normal.is_empty() || self.rng.gen::<f64>() < self.favored_seed_prob;
        if pick_favored {
            Ok((Priority::Favored, self.favored.fetch()?))
        } else {
            let bytes = self.normal.dequeue()?;
            Ok((Priority::Normal, datatype::from_bytes(&bytes)?))
        }
    }

    fn is_empty(&self) -> bool {
        self.favored.is_empty() && self.normal.is_empty()
    }

    fn save(&self, path: &Path) -> Result<()> {
        self.favored.save(path)
    }
}
