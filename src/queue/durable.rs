use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::datatype;
use crate::{Error, Result};

/// Round-robin seed store for the random-fuzzing loop.
///
/// `fetch` never removes: random fuzzing re-executes the same seed many
/// times, so elements live until the culling pass removes them explicitly.
/// The finger walks the live slots `0..len` and wraps, which gives every
/// surviving seed its fair turn.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DurableQueue<T> {
    slots: Vec<T>,
    cap: usize,
    finger: usize,
}

impl<T: Clone + PartialEq> DurableQueue<T> {
    pub fn new(cap: usize) -> Self {
        DurableQueue {
            slots: Vec::with_capacity(cap),
            cap,
            finger: 0,
        }
    }

    pub fn size(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.cap
    }

    // Best effort: a full queue drops the new seed.
    pub fn enqueue(&mut self, x: T) {
        if self.slots.len() >= self.cap {
            log::debug!("durable queue full ({} slots), dropping seed", self.cap);
            return;
        }
        self.slots.push(x);
    }

    /// Hand out a clone of the slot under the finger and advance it.
    pub fn fetch(&mut self) -> Result<T> {
        if self.slots.is_empty() {
            return Err(Error::Empty("durable queue".to_string()));
        }
        if self.finger >= self.slots.len() {
            return Err(Error::InvalidFinger(format!(
                "finger {} with {} live slots",
                self.finger,
                self.slots.len()
            )));
        }
        let elem = self.slots[self.finger].clone();
        self.finger = (self.finger + 1) % self.slots.len();
        Ok(elem)
    }

    /// Remove the element at `idx` after verifying it is the one the caller
    /// observed. A mismatch means the queue changed underneath the caller.
    ///
    /// Removing at the finger leaves the finger in place, so the next fetch
    /// returns the element that shifted down into the freed slot.
    pub fn remove(&mut self, idx: usize, expected: &T) -> Result<T> {
        if idx >= self.slots.len() || self.slots[idx] != *expected {
            return Err(Error::ElementMismatch(format!(
                "slot {} does not hold the expected element",
                idx
            )));
        }
        let removed = self.slots.remove(idx);
        if idx < self.finger {
            self.finger -= 1;
        }
        if self.finger >= self.slots.len() {
            self.finger = 0;
        }
        Ok(removed)
    }

    /// Live elements paired with their slot indices, the shape the culling
    /// pass consumes.
    pub fn iter_indexed(&self) -> impl Iterator<Item = (usize, &T)> {
        self.slots.iter().enumerate()
    }

    pub fn elements(&self) -> Vec<&T> {
        self.slots.iter().collect()
    }
}

impl<T: Clone + PartialEq + Serialize + DeserializeOwned> DurableQueue<T> {
    pub fn save(&self, path: &Path) -> Result<()> {
        let bytes = datatype::to_bytes(self)?;
        std::fs::write(path, bytes)?;
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path)?;
        let queue: Self = datatype::from_bytes(&bytes)?;
        if queue.finger >= queue.slots.len().max(1) {
            return Err(Error::InvalidFinger(format!(
                "snapshot finger {} with {} live slots",
                queue.finger,
                queue.slots.len()
            )));
        }
        Ok(queue)
    }
}
