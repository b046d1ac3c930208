use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::Path;

use crate::datatype::{self, Priority};
use crate::queue::file::FileQueue;
use crate::queue::pure::PureQueue;
use crate::queue::SeedQueue;
use crate::{QueueConfig, Result};

const CONCOLIC_SEED_QUEUE_NAME: &str = "concolic-seed";

/// Two-tier seed queue for the concolic loop.
///
/// Favored seeds wait in memory; normal seeds spill to disk serialized and
/// act as pure overflow, consumed only when the favored tier runs dry. Each
/// seed is handed out at most once.
pub struct ConcolicQueue<S> {
    favored: PureQueue<S>,
    normal: FileQueue,
}

impl<S: Serialize + DeserializeOwned> ConcolicQueue<S> {
    pub fn initialize(
        queue_dir: &Path,
        favored_snapshot: Option<&Path>,
        config: &QueueConfig,
    ) -> Result<Self> {
        let favored = match favored_snapshot {
            Some(path) => PureQueue::load(path)?,
            None => PureQueue::new(),
        };
        let normal =
            FileQueue::initialize(CONCOLIC_SEED_QUEUE_NAME, queue_dir, config.file_queue_max_size)?;
        log::debug!(
            "concolic queue up: {} favored, {} normal seeds",
            favored.size(),
            normal.size()
        );
        Ok(ConcolicQueue { favored, normal })
    }

    pub fn favored_size(&self) -> usize {
        self.favored.size()
    }

    pub fn normal_size(&self) -> usize {
        self.normal.size()
    }
}

impl<S: Serialize + DeserializeOwned> SeedQueue<S> for ConcolicQueue<S> {
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

    // Strict favored-first: the normal tier is touched only while the
    // favored tier is dry.
    fn dequeue(&mut self) -> Result<(Priority, S)> {
        let pick_favored = self.normal.is_empty() || !self.favored.is_empty();
        if pick_favored {
            Ok((Priority::Favored, self.favored.dequeue()?))
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::datatype::Seed;
    use crate::Error;
    use tempfile::tempdir;

    fn seed(byte: u8) -> Seed {
        Seed::new(vec![byte], u32::from(byte))
    }

    #[test]
    fn favored_seeds_always_come_out_before_normal_ones() {
        let dir = tempdir().unwrap();
        let mut queue: ConcolicQueue<Seed> =
            ConcolicQueue::initialize(dir.path(), None, &QueueConfig::default()).unwrap();

        queue.enqueue(Priority::Normal, seed(1)).unwrap();
        queue.enqueue(Priority::Favored, seed(2)).unwrap();
        queue.enqueue(Priority::Normal, seed(3)).unwrap();
        queue.enqueue(Priority::Favored, seed(4)).unwrap();

        assert_eq!(queue.dequeue().unwrap(), (Priority::Favored, seed(2)));
        assert_eq!(queue.dequeue().unwrap(), (Priority::Favored, seed(4)));
        assert_eq!(queue.dequeue().unwrap(), (Priority::Normal, seed(1)));
        assert_eq!(queue.dequeue().unwrap(), (Priority::Normal, seed(3)));
        assert!(queue.is_empty());
        assert!(matches!(queue.dequeue(), Err(Error::Empty(_))));
    }

    #[test]
    fn normal_seeds_survive_the_disk_round_trip() {
        let dir = tempdir().unwrap();
        let mut queue: ConcolicQueue<Seed> =
            ConcolicQueue::initialize(dir.path(), None, &QueueConfig::default()).unwrap();
        let payload = Seed::new(vec![0xca, 0xfe], 42);
        queue.enqueue(Priority::Normal, payload.clone()).unwrap();
        assert_eq!(queue.dequeue().unwrap(), (Priority::Normal, payload));
    }

    #[test]
    fn restart_restores_both_tiers() {
        let dir = tempdir().unwrap();
        let queue_dir = dir.path().join("queue");
        let snapshot = dir.path().join("concolic-favored");
        {
            let mut queue: ConcolicQueue<Seed> =
                ConcolicQueue::initialize(&queue_dir, None, &QueueConfig::default()).unwrap();
            queue.enqueue(Priority::Favored, seed(1)).unwrap();
            queue.enqueue(Priority::Normal, seed(2)).unwrap();
            queue.save(&snapshot).unwrap();
        }
        let mut queue: ConcolicQueue<Seed> =
            ConcolicQueue::initialize(&queue_dir, Some(&snapshot), &QueueConfig::default())
                .unwrap();
        assert_eq!(queue.favored_size(), 1);
        assert_eq!(queue.normal_size(), 1);
        assert_eq!(queue.dequeue().unwrap(), (Priority::Favored, seed(1)));
        assert_eq!(queue.dequeue().unwrap(), (Priority::Normal, seed(2)));
    }

    #[test]
    fn missing_snapshot_starts_with_an_empty_favored_tier() {
        let dir = tempdir().unwrap();
        let snapshot = dir.path().join("no-such-snapshot");
        let queue: ConcolicQueue<Seed> =
            ConcolicQueue::initialize(&dir.path().join("q"), Some(&snapshot), &QueueConfig::default())
                .unwrap();
        assert!(queue.is_empty());
    }
}
