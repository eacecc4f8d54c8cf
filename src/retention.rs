//! Background TTL sweep ticker.
//!
//! The store itself only exposes a synchronous `sweep_expired` (see
//! `store.rs`); this module runs that sweep on an interval from its own
//! thread, the same shape as a cron-style cleanup loop, but scoped to one
//! `Arc<Store>` instead of scanning reader heartbeat files the way the
//! teacher's own `cleanup_segments` does.

use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crate::store::Store;

/// Drives periodic calls to `Store::sweep_expired` on a dedicated thread
/// until dropped or explicitly stopped.
pub struct RetentionTicker {
    stop: Sender<()>,
    handle: Option<JoinHandle<()>>,
}

impl RetentionTicker {
    /// Spawn a ticker that calls `store.sweep_expired()` once per `TTL` —
    /// the option doubles as the sweep interval.
    pub fn spawn(store: Arc<Store>) -> Self {
        let interval = Duration::from_nanos(store.ttl_ns().max(1));
        let (stop, rx) = mpsc::channel();
        let handle = thread::spawn(move || loop {
            match rx.recv_timeout(interval) {
                Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                Err(RecvTimeoutError::Timeout) => match store.sweep_expired() {
                    Ok(0) => {}
                    Ok(n) => log::info!("retention sweep evicted {n} segment(s)"),
                    Err(err) => log::warn!("retention sweep failed: {err}"),
                },
            }
        });
        Self {
            stop,
            handle: Some(handle),
        }
    }

    /// Signal the ticker thread to stop and wait for it to exit.
    pub fn stop(mut self) {
        let _ = self.stop.send(());
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for RetentionTicker {
    fn drop(&mut self) {
        let _ = self.stop.send(());
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}
