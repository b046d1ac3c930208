use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::mem;
use std::path::Path;

use crate::datatype;
use crate::{Error, Result};

/// Two-stack FIFO backing the favored tier of the concolic queue.
///
/// `pending` holds the front of the queue in pop-from-the-back order;
/// `pushed` collects new arrivals. When `pending` runs dry, `pushed` is
/// reversed into it, which keeps every operation amortized O(1).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PureQueue<T> {
    pushed: Vec<T>,
    pending: Vec<T>,
}

impl<T> PureQueue<T> {
    pub fn new() -> Self {
        PureQueue {
            pushed: Vec::new(),
            pending: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.pushed.is_empty() && self.pending.is_empty()
    }

    pub fn size(&self) -> usize {
        self.pushed.len() + self.pending.len()
    }

    pub fn enqueue(&mut self, x: T) {
        self.pushed.push(x);
    }

    fn shift(&mut self) {
        if self.pending.is_empty() {
            self.pending = mem::take(&mut self.pushed);
            self.pending.reverse();
        }
    }

    pub fn dequeue(&mut self) -> Result<T> {
        self.shift();
        self.pending
            .pop()
            .ok_or_else(|| Error::Empty("pure queue".to_string()))
    }

    pub fn peek(&mut self) -> Result<&T> {
        self.shift();
        self.pending
            .last()
            .ok_or_else(|| Error::Empty("pure queue".to_string()))
    }

    pub fn drop_front(&mut self) -> Result<()> {
        self.dequeue().map(|_| ())
    }

    /// Live elements in dequeue order.
    pub fn elements(&self) -> Vec<&T> {
        self.pending.iter().rev().chain(self.pushed.iter()).collect()
    }
}

impl<T> Default for PureQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Serialize + DeserializeOwned> PureQueue<T> {
    pub fn save(&self, path: &Path) -> Result<()> {
        let bytes = datatype::to_bytes(self)?;
        std::fs::write(path, bytes)?;
        Ok(())
    }

    // A missing snapshot is a fresh start, not an error.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.is_file() {
            return Ok(Self::new());
        }
        let bytes = std::fs::read(path)?;
        datatype::from_bytes(&bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn dequeue_follows_fifo_order_under_interleaving() {
        let mut queue = PureQueue::new();
        queue.enqueue(1);
        queue.enqueue(2);
        assert_eq!(queue.dequeue().unwrap(), 1);
        queue.enqueue(3);
        assert_eq!(queue.dequeue().unwrap(), 2);
        assert_eq!(queue.dequeue().unwrap(), 3);
        assert!(matches!(queue.dequeue(), Err(Error::Empty(_))));
    }

    #[test]
    fn enqueue_then_dequeue_returns_the_element() {
        let mut queue = PureQueue::new();
        queue.enqueue("seed");
        assert_eq!(queue.size(), 1);
        assert_eq!(queue.dequeue().unwrap(), "seed");
        assert!(queue.is_empty());
    }

    #[test]
    fn peek_and_drop_front_do_not_reorder() {
        let mut queue = PureQueue::new();
        queue.enqueue(10);
        queue.enqueue(20);
        assert_eq!(*queue.peek().unwrap(), 10);
        assert_eq!(*queue.peek().unwrap(), 10);
        queue.drop_front().unwrap();
        assert_eq!(queue.dequeue().unwrap(), 20);
    }

    #[test]
    fn elements_lists_the_logical_queue_in_dequeue_order() {
        let mut queue = PureQueue::new();
        queue.enqueue(1);
        queue.enqueue(2);
        queue.dequeue().unwrap();
        queue.enqueue(3);
        queue.enqueue(4);
        assert_eq!(queue.elements(), vec![&2, &3, &4]);
    }

    #[test]
    fn save_then_load_restores_the_full_state() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("favored-snapshot");

        let mut queue = PureQueue::new();
        queue.enqueue(1u32);
        queue.enqueue(2);
        queue.dequeue().unwrap();
        queue.enqueue(3);
        queue.save(&path).unwrap();

        let mut restored: PureQueue<u32> = PureQueue::load(&path).unwrap();
        assert_eq!(restored.size(), queue.size());
        assert_eq!(restored.dequeue().unwrap(), 2);
        assert_eq!(restored.dequeue().unwrap(), 3);
    }

    #[test]
    fn load_of_a_missing_path_returns_an_empty_queue() {
        let dir = tempdir().unwrap();
        let queue: PureQueue<u32> = PureQueue::load(&dir.path().join("nothing-here")).unwrap();
        assert!(queue.is_empty());
    }
}
