//! The public blob store: `open`, `put`, `get_many`, `close`.
//!
//! A single `Mutex` guards the registry and the active segment together, the
//! same way the teacher's `Queue` guards its one writable `MmapFile` — see
//! Open Question #4 in SPEC_FULL.md for why an `RwLock` split wasn't worth it.

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::clock::{Clock, SystemClock};
use crate::codec::Id;
use crate::error::{Error, Result};
use crate::registry::SegmentRegistry;

/// Construction parameters for a `Store`. Plain struct, no env/file loader —
/// the embedding program is responsible for sourcing these values.
#[derive(Debug, Clone)]
pub struct Options {
    /// Directory holding `<index>.seq` segment files. Created if missing.
    pub path: PathBuf,
    /// Per-segment capacity in bytes. Payloads larger than this are rejected.
    pub max_buffer_size: usize,
    /// Maximum number of resident segment files at any time.
    pub max_files_count: usize,
    /// Minimum age, in nanoseconds, before a sealed segment is eligible for
    /// TTL eviction.
    pub ttl_ns: u64,
}

struct Inner {
    registry: SegmentRegistry,
}

/// An append-only, time-bounded store of opaque byte payloads.
pub struct Store {
    options: Options,
    clock: Box<dyn Clock>,
    inner: Mutex<Inner>,
}

impl Store {
    pub fn open(options: Options) -> Result<Self> {
        Self::open_with_clock(options, Box::new(SystemClock))
    }

    pub fn open_with_clock(options: Options, clock: Box<dyn Clock>) -> Result<Self> {
        let registry = SegmentRegistry::open(
            &options.path,
            options.max_files_count,
            options.max_buffer_size,
            clock.as_ref(),
        )?;
        Ok(Self {
            options,
            clock,
            inner: Mutex::new(Inner { registry }),
        })
    }

    pub fn path(&self) -> &Path {
        &self.options.path
    }

    /// Append `payload`, rolling over to a new segment first if it wouldn't
    /// fit in the active one. Rejects payloads larger than `max_buffer_size`
    /// before attempting any rollover.
    pub fn put(&self, payload: &[u8]) -> Result<Id> {
        if payload.len() > self.options.max_buffer_size {
            return Err(Error::PayloadTooLarge);
        }

        let mut inner = self.inner.lock().expect("store mutex poisoned");
        let needs_rollover = {
            let active = inner.registry.active_mut()?;
            active.available() < payload.len()
        };
        if needs_rollover {
            inner.registry.rollover(self.clock.as_ref())?;
            log::info!("segment rollover to {}", inner.registry.last_index());
        }

        let segment_index = inner.registry.last_index();
        let offset = inner.registry.active_mut()?.append(payload)?;
        Ok(Id {
            segment_index,
            offset: offset as u64,
            length: payload.len() as u64,
        })
    }

    /// Resolve `ids` to their payload bytes. Identifiers are sorted by
    /// `(segment_index, offset)` before resolution for read locality; the
    /// returned `Vec` is in that sorted order, not the caller's input order.
    pub fn get_many(&self, ids: &[Id]) -> Result<Vec<Vec<u8>>> {
        let mut sorted: Vec<Id> = ids.to_vec();
        sorted.sort_by_key(|id| (id.segment_index, id.offset));

        let inner = self.inner.lock().expect("store mutex poisoned");
        let mut out = Vec::with_capacity(sorted.len());
        let mut current_segment: Option<u64> = None;

        for id in &sorted {
            if current_segment != Some(id.segment_index) {
                if let Some(previous) = current_segment {
                    if let Ok(segment) = inner.registry.lookup(previous) {
                        segment.reading_done();
                    }
                }
                current_segment = Some(id.segment_index);
            }
            let segment = inner.registry.lookup(id.segment_index)?;
            let bytes = segment.view(id.offset as usize, id.length as usize)?;
            out.push(bytes.to_vec());
        }

        if let Some(last) = current_segment {
            if let Ok(segment) = inner.registry.lookup(last) {
                segment.reading_done();
            }
        }
        Ok(out)
    }

    /// Run one TTL sweep: evict sealed segments whose `created_at` is at
    /// least `ttl_ns` old, oldest first, stopping at the first that isn't.
    /// Never touches the active segment.
    pub fn sweep_expired(&self) -> Result<usize> {
        let now = self.clock.now_ns();
        let ttl_ns = self.options.ttl_ns;
        let mut inner = self.inner.lock().expect("store mutex poisoned");
        inner
            .registry
            .evict_while(|created_at| now.saturating_sub(created_at) >= ttl_ns)
    }

    pub fn resident_segment_count(&self) -> usize {
        let inner = self.inner.lock().expect("store mutex poisoned");
        inner.registry.resident_count()
    }

    /// TTL in nanoseconds, also used as the retention sweep interval.
    pub fn ttl_ns(&self) -> u64 {
        self.options.ttl_ns
    }

    /// Unmap every resident segment, attempting all and surfacing the first
    /// error. The data directory is left on disk. Callers should stop any
    /// `RetentionTicker` before calling this.
    pub fn close(self) -> Result<()> {
        let mut inner = self.inner.lock().expect("store mutex poisoned");
        inner.registry.close_all()
    }
}
