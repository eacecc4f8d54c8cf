//! The segment registry: a ring buffer of resident segments indexed by
//! `index mod MaxFilesCount`, tracking `first_index`/`last_index` so rollover
//! and retention never need to scan the directory.

use std::collections::VecDeque;
use std::fs;
use std::path::{Path, PathBuf};

use crate::clock::Clock;
use crate::error::{Error, Result};
use crate::segment::{segment_path, Segment, State};

/// Owns every resident segment and the monotone counters bounding them.
/// Invariants: no holes in `[first_index, last_index]`; exactly one
/// `Writable` segment, at `last_index`; `last_index - first_index + 1 <=
/// max_files`.
pub struct SegmentRegistry {
    root: PathBuf,
    max_files: usize,
    capacity: usize,
    segments: VecDeque<Segment>,
}

impl SegmentRegistry {
    /// Wipe `root` (no persistence across restarts) and create the first
    /// writable segment, index 1.
    pub fn open(root: &Path, max_files: usize, capacity: usize, clock: &dyn Clock) -> Result<Self> {
        if root.exists() {
            fs::remove_dir_all(root)?;
        }
        fs::create_dir_all(root)?;
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(root, fs::Permissions::from_mode(0o700))?;
        }
        let mut registry = Self {
            root: root.to_path_buf(),
            max_files,
            capacity,
            segments: VecDeque::new(),
        };
        let first = Segment::create(&registry.root, 1, registry.capacity, clock)?;
        registry.segments.push_back(first);
        Ok(registry)
    }

    pub fn first_index(&self) -> u64 {
        self.segments.front().map(|s| s.index).unwrap_or(1)
    }

    pub fn last_index(&self) -> u64 {
        self.segments.back().map(|s| s.index).unwrap_or(1)
    }

    pub fn active_mut(&mut self) -> Result<&mut Segment> {
        self.segments
            .back_mut()
            .ok_or(Error::InternalInvariant("registry has no active segment"))
    }

    pub fn lookup(&self, index: u64) -> Result<&Segment> {
        let first = self.first_index();
        if index < first {
            return Err(Error::PathNotFound);
        }
        let offset = (index - first) as usize;
        self.segments.get(offset).ok_or(Error::PathNotFound)
    }

    /// Seal the active segment, create the next one, and evict the oldest
    /// resident segment if the cap would otherwise be exceeded. The new
    /// segment becomes active.
    pub fn rollover(&mut self, clock: &dyn Clock) -> Result<()> {
        let next_index = self.last_index() + 1;
        self.active_mut()?.seal()?;

        let next = Segment::create(&self.root, next_index, self.capacity, clock)?;
        self.segments.push_back(next);

        if self.segments.len() > self.max_files {
            self.evict_oldest()?;
        }
        Ok(())
    }

    /// Drop and unlink the oldest resident segment, unless it's the only
    /// (and therefore active) one.
    pub fn evict_oldest(&mut self) -> Result<()> {
        if self.segments.len() <= 1 {
            return Ok(());
        }
        let mut oldest = self
            .segments
            .pop_front()
            .ok_or(Error::InternalInvariant("evict from empty registry"))?;
        let index = oldest.index;
        oldest.drop_segment()?;
        let path = segment_path(&self.root, index);
        if let Err(err) = fs::remove_file(&path) {
            if err.kind() != std::io::ErrorKind::NotFound {
                return Err(err.into());
            }
        }
        log::info!("segment {index} evicted");
        Ok(())
    }

    /// Evict resident segments (oldest first, never the active one) for
    /// which `predicate(created_at)` holds, stopping at the first segment
    /// that doesn't match.
    pub fn evict_while(&mut self, predicate: impl Fn(u64) -> bool) -> Result<usize> {
        let mut evicted = 0;
        loop {
            if self.segments.len() <= 1 {
                break;
            }
            let should_evict = match self.segments.front() {
                Some(segment) if segment.state != State::Dropped => predicate(segment.created_at),
                _ => false,
            };
            if !should_evict {
                break;
            }
            self.evict_oldest()?;
            evicted += 1;
        }
        Ok(evicted)
    }

    pub fn resident_count(&self) -> usize {
        self.segments.len()
    }

    /// Unmap every resident segment, attempting all of them and returning
    /// the first error encountered, if any. Files are left on disk.
    pub fn close_all(&mut self) -> Result<()> {
        let mut first_err = None;
        for segment in self.segments.iter_mut() {
            if let Err(err) = segment.drop_segment() {
                if first_err.is_none() {
                    first_err = Some(err);
                }
            }
        }
        match first_err {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}
