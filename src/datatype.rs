use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU32, Ordering};

use crate::Result;

pub type SeedId = u32;

/// Coverage unit reached by executing a seed (e.g. a CFG node). Produced by
/// the external coverage oracle; the queue core only compares and hashes it.
pub type NodeId = u64;

/// Priority tag assigned per-enqueue by the caller. Not stored with the seed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Priority {
    Favored,
    Normal,
}

/// A fuzzer input plus metadata. The queues treat it as an opaque value that
/// serializes to bytes and compares for equality; the coverage oracle knows
/// how to execute it.
#[derive(Default, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Seed {
    id: SeedId,
    buffer: Vec<u8>,
}

impl Seed {
    pub fn new(buffer: Vec<u8>, id: SeedId) -> Self {
        Seed { id, buffer }
    }

    pub fn get_id(&self) -> SeedId {
        self.id
    }

    pub fn gen_id(&mut self) {
        self.id = get_id();
    }

    pub fn get_buffer(&self) -> &Vec<u8> {
        &self.buffer
    }

    pub fn take_buffer(self) -> Vec<u8> {
        self.buffer
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }
}

static COUNTER: AtomicU32 = AtomicU32::new(0);
pub fn get_id() -> SeedId {
    COUNTER.fetch_add(1, Ordering::Relaxed)
}

// Binary codec seam. The queues never look inside the bytes these produce;
// one serialized element becomes one file in the normal tier, and a full
// queue state becomes one snapshot blob.
pub fn to_bytes<T: Serialize>(value: &T) -> Result<Vec<u8>> {
    Ok(bincode::serialize(value)?)
}

pub fn from_bytes<T: DeserializeOwned>(bytes: &[u8]) -> Result<T> {
    Ok(bincode::deserialize(bytes)?)
}
