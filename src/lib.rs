//! Append-only, time-bounded, opaque-blob store over rolling mmap'd segments.
//!
//! `Store::put` copies a payload into the active segment and returns a
//! compact `Id`; `Store::get_many` resolves a batch of `Id`s back to bytes,
//! sorted by segment for read locality. Payloads expire collectively, either
//! by `RetentionTicker`'s TTL sweep or by the hard cap on resident segments
//! enforced synchronously at rollover. There is no update, no delete-by-key,
//! and no durability across restarts.

pub mod clock;
pub mod codec;
pub mod error;
pub mod mmap;
pub mod registry;
pub mod retention;
pub mod segment;
pub mod store;

pub use clock::{Clock, QuantaClock, SystemClock};
pub use codec::Id;
pub use error::{Error, Result};
pub use retention::RetentionTicker;
pub use store::{Options, Store};
