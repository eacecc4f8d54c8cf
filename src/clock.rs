use std::time::{SystemTime, UNIX_EPOCH};

/// A source of timestamps for segment creation and TTL comparisons.
///
/// Lets the embedding program swap wall-clock time (portable, NTP-adjustable)
/// for a TSC-based clock (monotonic, cheaper per call) without touching the
/// retention or rollover logic.
pub trait Clock: Send + Sync + 'static {
    /// Current timestamp in nanoseconds since the UNIX epoch.
    fn now_ns(&self) -> u64;
}

/// Default clock, backed by `SystemTime`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ns(&self) -> u64 {
        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("system time before UNIX epoch");
        u64::try_from(timestamp.as_nanos()).expect("system time exceeds timestamp range")
    }
}

/// TSC-backed clock via `quanta`, anchored to wall-clock time at construction
/// and advanced by TSC ticks thereafter. Monotonic; cheaper per call than
/// `SystemClock` under contention.
#[derive(Debug, Clone)]
pub struct QuantaClock {
    clock: quanta::Clock,
    start_wall_ns: u64,
    start_instant: quanta::Instant,
}

impl Default for QuantaClock {
    fn default() -> Self {
        let clock = quanta::Clock::new();
        let start_instant = clock.now();
        let start_wall_ns = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("system time before UNIX epoch")
            .as_nanos() as u64;
        Self {
            clock,
            start_wall_ns,
            start_instant,
        }
    }
}

impl QuantaClock {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Clock for QuantaClock {
    fn now_ns(&self) -> u64 {
        let delta = self.clock.now().duration_since(self.start_instant);
        self.start_wall_ns + delta.as_nanos() as u64
    }
}
