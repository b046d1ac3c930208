pub mod datatype;
pub mod minimizer;
pub mod queue;

use std::path::PathBuf;
use std::{fmt, io};

// Default tunables. All of them are fixed at queue initialization time.
pub const DEFAULT_DURABLE_QUEUE_MAX_SIZE: usize = 100;
pub const DEFAULT_FILE_QUEUE_MAX_SIZE: usize = 4096;
pub const DEFAULT_FAVORED_SEED_PROB: f64 = 0.8;
pub const DEFAULT_SEED_CULLING_THRESHOLD: f64 = 2.0;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug)]
pub enum Error {
    /// Dequeue or fetch on an empty queue. A programming error at the call
    /// site; never caught internally.
    Empty(String),
    /// The cursor points outside the live range. State corruption.
    InvalidFinger(String),
    /// The queue directory does not exist.
    DirectoryNotFound(PathBuf),
    /// A verified removal found a different element in the slot. State
    /// corruption, likely concurrent mutation.
    ElementMismatch(String),
    /// File related error
    File(io::Error),
    /// Serialization error
    Serialize(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Empty(s) => write!(f, "No items in {0}", &s),
            Self::InvalidFinger(s) => write!(f, "Invalid finger: {0}", &s),
            Self::DirectoryNotFound(path) => {
                write!(f, "Queue directory not found: {}", path.display())
            }
            Self::ElementMismatch(s) => write!(f, "Element mismatch: {0}", &s),
            Self::File(err) => write!(f, "File IO failed: {:?}", &err),
            Self::Serialize(s) => write!(f, "Error in Serialization: `{0}`", &s),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::File(err) => Some(err),
            _ => None,
        }
    }
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        Self::File(err)
    }
}

impl From<bincode::Error> for Error {
    fn from(err: bincode::Error) -> Self {
        Self::Serialize(format!("{:?}", err))
    }
}

// Queue tuning knobs shared by both fuzzing loops.
#[derive(Debug, Clone)]
pub struct QueueConfig {
    /// Capacity of the favored tier of the random-fuzzing queue.
    pub durable_queue_max_size: usize,
    /// Capacity of the disk-spilled normal tiers.
    pub file_queue_max_size: usize,
    /// Probability of drawing from the favored tier when both tiers hold seeds.
    pub favored_seed_prob: f64,
    /// Growth factor of the favored tier that triggers the next culling pass.
    pub seed_culling_threshold: f64,
}

impl Default for QueueConfig {
    fn default() -> Self {
        QueueConfig {
            durable_queue_max_size: DEFAULT_DURABLE_QUEUE_MAX_SIZE,
            file_queue_max_size: DEFAULT_FILE_QUEUE_MAX_SIZE,
            favored_seed_prob: DEFAULT_FAVORED_SEED_PROB,
            seed_culling_threshold: DEFAULT_SEED_CULLING_THRESHOLD,
        }
    }
}
