//! A fixed-length, file-backed mapped byte region.
//!
//! Wraps `memmap2` to give the rest of the crate a single seam for segment
//! file lifecycle: create, map, advise, and unmap. Modeled on the teacher's
//! `MmapFile` (mmap as the sole FFI boundary, per Design Notes §9), but split
//! into explicit read-write and read-only mapping modes so `Segment::seal`
//! can actually drop write access instead of merely promising not to use it.

use std::fs::{File, OpenOptions};
use std::path::Path;

use memmap2::{Advice, Mmap, MmapMut, MmapOptions};

use crate::error::{Error, Result};

enum State {
    Write(MmapMut),
    Read(Mmap),
}

/// A mapped view of one segment file. `close()` unmaps explicitly and is not
/// idempotent — a second call is a programming error and returns `Err`.
pub struct MappedRegion {
    _file: File,
    state: Option<State>,
    len: usize,
}

impl MappedRegion {
    /// Create (or truncate) `path` to `len` bytes and map it read-write,
    /// advising the kernel the access pattern will be sequential and that
    /// the pages will be needed soon.
    pub fn create_for_write(path: &Path, len: usize) -> Result<Self> {
        let file = OpenOptions::new()
            .create(true)
            .read(true)
            .write(true)
            .truncate(true)
            .open(path)?;
        file.set_len(len as u64)?;
        let map = unsafe { MmapOptions::new().len(len).map_mut(&file)? };
        let _ = map.advise(Advice::Sequential);
        let _ = map.advise(Advice::WillNeed);
        Ok(Self {
            _file: file,
            state: Some(State::Write(map)),
            len,
        })
    }

    /// Map an already-sealed segment file read-only, advising the kernel the
    /// pages are not needed yet (discard on the next pressure cycle).
    pub fn open_for_read(path: &Path) -> Result<Self> {
        let file = OpenOptions::new().read(true).open(path)?;
        let len = file.metadata()?.len() as usize;
        let map = unsafe { MmapOptions::new().len(len).map(&file)? };
        let _ = map.advise(Advice::DontNeed);
        Ok(Self {
            _file: file,
            state: Some(State::Read(map)),
            len,
        })
    }

    /// Re-advise "don't need" to prompt the kernel to release clean pages
    /// after a batch of reads.
    pub fn reading_done(&self) {
        match &self.state {
            Some(State::Read(map)) => {
                let _ = map.advise(Advice::DontNeed);
            }
            Some(State::Write(map)) => {
                let _ = map.advise(Advice::DontNeed);
            }
            None => {}
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn as_slice(&self) -> &[u8] {
        match self.state.as_ref().expect("region used after close") {
            State::Write(map) => map,
            State::Read(map) => map,
        }
    }

    /// Mutable access into the mapped bytes. Only valid while the region is
    /// still in write mode (i.e. before `seal`/`into_read_only`).
    pub fn range_mut(&mut self, offset: usize, len: usize) -> Result<&mut [u8]> {
        let end = offset
            .checked_add(len)
            .ok_or(Error::InternalInvariant("mmap range overflow"))?;
        if end > self.len {
            return Err(Error::InternalInvariant("mmap range out of bounds"));
        }
        match self.state.as_mut().expect("region used after close") {
            State::Write(map) => Ok(&mut map[offset..end]),
            State::Read(_) => Err(Error::InternalInvariant("write into read-only region")),
        }
    }

    /// Flush the writable mapping to its backing file, then remap read-only
    /// and advise "don't need" (the region will no longer be written).
    pub fn seal(&mut self) -> Result<()> {
        let state = self.state.take().expect("region used after close");
        match state {
            State::Write(map) => {
                map.flush()?;
            }
            State::Read(map) => {
                self.state = Some(State::Read(map));
                return Ok(());
            }
        }
        let map = unsafe { MmapOptions::new().len(self.len).map(&self._file)? };
        let _ = map.advise(Advice::DontNeed);
        self.state = Some(State::Read(map));
        Ok(())
    }

    /// Unmap. Calling this a second time is a programming error.
    pub fn close(&mut self) -> Result<()> {
        match self.state.take() {
            Some(_) => Ok(()),
            None => Err(Error::Io(std::io::Error::new(
                std::io::ErrorKind::Other,
                "mapped region already closed",
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn write_then_read_round_trip() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("1.seq");

        let mut region = MappedRegion::create_for_write(&path, 64).expect("create");
        region
            .range_mut(0, 5)
            .expect("range")
            .copy_from_slice(b"hello");
        region.seal().expect("seal");
        assert_eq!(&region.as_slice()[0..5], b"hello");

        let read_only = MappedRegion::open_for_read(&path).expect("open for read");
        assert_eq!(&read_only.as_slice()[0..5], b"hello");
    }

    #[test]
    fn close_twice_errors() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("1.seq");
        let mut region = MappedRegion::create_for_write(&path, 16).expect("create");
        region.close().expect("first close");
        assert!(region.close().is_err());
    }
}
