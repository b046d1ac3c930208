pub mod concolic;
pub mod durable;
pub mod file;
pub mod pure;
pub mod rand_fuzz;

use std::path::Path;

use crate::datatype::Priority;
use crate::Result;

/// Common surface of the two tier queues. The concolic loop consumes each
/// seed at most once in priority order; the random loop re-samples surviving
/// seeds, so its favored tier hands out clones without removing.
pub trait SeedQueue<S> {
    // Store a seed under the given priority. Best effort: a full tier drops
    // the seed silently.
    fn enqueue(&mut self, priority: Priority, seed: S) -> Result<()>;

    // Hand out the next seed together with the tier it came from.
    fn dequeue(&mut self) -> Result<(Priority, S)>;

    fn is_empty(&self) -> bool;

    // Snapshot the favored tier. The normal tier already lives on disk.
    fn save(&self, path: &Path) -> Result<()>;
}
