use std::fs::{self, File};
use std::io::prelude::*;
use std::path::{Path, PathBuf};

use crate::{Error, Result};

/// Disk-spilled FIFO of serialized seeds.
///
/// Every live entry is one file named `"{name}-{k}"` for `k` in
/// `[lower_idx, upper_idx)`; enqueue creates exactly one file and dequeue
/// deletes exactly one. Restart recovers the index window by scanning the
/// directory, so a crashed write shows up as one extra index and nothing
/// worse.
#[derive(Debug)]
pub struct FileQueue {
    name: String,
    dir: PathBuf,
    lower_idx: u64,
    upper_idx: u64,
    finger: u64,
    max_count: usize,
}

impl FileQueue {
    pub fn create(name: &str, dir: &Path, max_count: usize) -> Result<Self> {
        fs::create_dir_all(dir)?;
        Ok(FileQueue {
            name: name.to_string(),
            dir: dir.to_path_buf(),
            lower_idx: 0,
            upper_idx: 0,
            finger: 0,
            max_count,
        })
    }

    /// Rebuild the index window from the files on disk.
    pub fn load(name: &str, dir: &Path, max_count: usize) -> Result<Self> {
        if !dir.is_dir() {
            return Err(Error::DirectoryNotFound(dir.to_path_buf()));
        }
        let prefix = format!("{}-", name);
        let mut bounds: Option<(u64, u64)> = None;
        for entry in fs::read_dir(dir)? {
            let file_name = entry?.file_name();
            let index = match file_name.to_str().and_then(|s| s.strip_prefix(&prefix)) {
                Some(suffix) => match suffix.parse::<u64>() {
                    Ok(k) if suffix.bytes().all(|b| b.is_ascii_digit()) => k,
                    _ => continue,
                },
                None => continue,
            };
            bounds = match bounds {
                Some((lo, hi)) => Some((lo.min(index), hi.max(index))),
                None => Some((index, index)),
            };
        }
        let (lower_idx, upper_idx) = match bounds {
            Some((lo, hi)) => (lo, hi + 1),
            None => (0, 0),
        };
        log::debug!(
            "loaded file queue {} from {}: indices [{}, {})",
            name,
            dir.display(),
            lower_idx,
            upper_idx
        );
        Ok(FileQueue {
            name: name.to_string(),
            dir: dir.to_path_buf(),
            lower_idx,
            upper_idx,
            finger: lower_idx,
            max_count,
        })
    }

    pub fn initialize(name: &str, dir: &Path, max_count: usize) -> Result<Self> {
        if dir.is_dir() {
            Self::load(name, dir, max_count)
        } else {
            Self::create(name, dir, max_count)
        }
    }

    pub fn size(&self) -> usize {
        (self.upper_idx - self.lower_idx) as usize
    }

    pub fn is_empty(&self) -> bool {
        self.size() == 0
    }

    fn entry_path(&self, index: u64) -> PathBuf {
        self.dir.join(format!("{}-{}", self.name, index))
    }

    // Best effort: a full queue drops the new entry.
    pub fn enqueue(&mut self, bytes: &[u8]) -> Result<()> {
        if self.size() >= self.max_count {
            log::debug!(
                "file queue {} full ({} entries), dropping seed",
                self.name,
                self.max_count
            );
            return Ok(());
        }
        let mut file = File::create(self.entry_path(self.upper_idx))?;
        file.write_all(bytes)?;
        self.upper_idx += 1;
        Ok(())
    }

    pub fn dequeue(&mut self) -> Result<Vec<u8>> {
        if self.is_empty() {
            return Err(Error::Empty(format!("file queue {}", self.name)));
        }
        if !(self.lower_idx <= self.finger && self.finger < self.upper_idx) {
            return Err(Error::InvalidFinger(format!(
                "finger {} outside [{}, {})",
                self.finger, self.lower_idx, self.upper_idx
            )));
        }
        let path = self.entry_path(self.lower_idx);
        let mut buffer = Vec::new();
        File::open(&path)?.read_to_end(&mut buffer)?;
        fs::remove_file(&path)?;
        self.lower_idx += 1;
        self.finger = self.finger.max(self.lower_idx);
        Ok(buffer)
    }
}
