//! A single append-only segment file: a fixed-capacity mmap'd region plus the
//! bookkeeping (`bytes_used`, `record_count`, `state`) needed to decide when
//! it's full and whether it's still safe to write into.

use std::path::{Path, PathBuf};

use crate::clock::Clock;
use crate::error::{Error, Result};
use crate::mmap::MappedRegion;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    Writable,
    Sealed,
    Dropped,
}

pub fn segment_filename(index: u64) -> String {
    format!("{index}.seq")
}

pub fn segment_path(root: &Path, index: u64) -> PathBuf {
    root.join(segment_filename(index))
}

/// One on-disk segment. Owns its mapped region; `append` is only valid while
/// `state == Writable`.
pub struct Segment {
    pub index: u64,
    pub created_at: u64,
    pub bytes_used: usize,
    pub record_count: u64,
    pub state: State,
    region: MappedRegion,
}

impl Segment {
    pub fn create(root: &Path, index: u64, capacity: usize, clock: &dyn Clock) -> Result<Self> {
        let path = segment_path(root, index);
        let region = MappedRegion::create_for_write(&path, capacity)?;
        log::debug!("segment {index} created at {}", path.display());
        Ok(Self {
            index,
            created_at: clock.now_ns(),
            bytes_used: 0,
            record_count: 0,
            state: State::Writable,
            region,
        })
    }

    pub fn capacity(&self) -> usize {
        self.region.len()
    }

    pub fn available(&self) -> usize {
        self.capacity().saturating_sub(self.bytes_used)
    }

    /// Append `payload` and return the byte offset it was written at. Caller
    /// must have already checked `available() >= payload.len()`.
    pub fn append(&mut self, payload: &[u8]) -> Result<usize> {
        if self.state != State::Writable {
            return Err(Error::InternalInvariant("append into non-writable segment"));
        }
        if payload.len() > self.available() {
            return Err(Error::InternalInvariant("append exceeds segment capacity"));
        }
        let offset = self.bytes_used;
        self.region.range_mut(offset, payload.len())?.copy_from_slice(payload);
        self.bytes_used += payload.len();
        self.record_count += 1;
        Ok(offset)
    }

    /// Read `length` bytes starting at `offset`. Valid in any state except
    /// `Dropped`.
    pub fn view(&self, offset: usize, length: usize) -> Result<&[u8]> {
        if self.state == State::Dropped {
            return Err(Error::PathNotFound);
        }
        let end = offset
            .checked_add(length)
            .ok_or(Error::InternalInvariant("view range overflow"))?;
        if end > self.bytes_used {
            return Err(Error::InternalInvariant("view range exceeds bytes written"));
        }
        Ok(&self.region.as_slice()[offset..end])
    }

    /// Flush the writable mapping to disk and remap it read-only.
    pub fn seal(&mut self) -> Result<()> {
        if self.state == State::Writable {
            self.region.seal()?;
            self.state = State::Sealed;
            log::debug!(
                "segment {} sealed, {} bytes / {} records",
                self.index,
                self.bytes_used,
                self.record_count
            );
        }
        Ok(())
    }

    /// Called once a batch of reads against this segment is done, hinting the
    /// kernel can drop its pages under memory pressure.
    pub fn reading_done(&self) {
        self.region.reading_done();
    }

    /// Unmap and mark the segment as dropped. The caller is responsible for
    /// removing the backing file from disk.
    pub fn drop_segment(&mut self) -> Result<()> {
        if self.state != State::Dropped {
            self.region.close()?;
            self.state = State::Dropped;
        }
        Ok(())
    }
}
