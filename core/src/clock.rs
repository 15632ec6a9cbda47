//! Roast timer
//!
//! The clock never reads the system time itself. Callers pass a millisecond
//! reading from a [`TimeSource`], which keeps the same arithmetic usable from
//! native hosts, the browser and tests.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

/// Source of monotonic millisecond readings
pub trait TimeSource: Send + Sync {
    fn now_ms(&self) -> u64;
}

/// Milliseconds since the source was created, from the monotonic system clock
#[derive(Debug, Clone)]
pub struct SystemTimeSource {
    origin: Instant,
}

impl SystemTimeSource {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemTimeSource {
    fn default() -> Self {
        Self::new()
    }
}

impl TimeSource for SystemTimeSource {
    fn now_ms(&self) -> u64 {
        self.origin.elapsed().as_millis() as u64
    }
}

/// Hand-driven time source; clones share the same reading
#[derive(Debug, Clone, Default)]
pub struct ManualTimeSource {
    now: Arc<AtomicU64>,
}

impl ManualTimeSource {
    pub fn new(start_ms: u64) -> Self {
        Self {
            now: Arc::new(AtomicU64::new(start_ms)),
        }
    }

    pub fn set_ms(&self, ms: u64) {
        self.now.store(ms, Ordering::SeqCst);
    }

    pub fn advance_ms(&self, ms: u64) {
        self.now.fetch_add(ms, Ordering::SeqCst);
    }

    pub fn advance_secs(&self, secs: u64) {
        self.advance_ms(secs * 1000);
    }
}

impl TimeSource for ManualTimeSource {
    fn now_ms(&self) -> u64 {
        self.now.load(Ordering::SeqCst)
    }
}

/// Elapsed-seconds stopwatch with pause/resume.
///
/// Seconds accumulated in earlier running windows are kept in a baseline;
/// the current window is measured from the anchor reading taken at start,
/// so resuming after a pause continues from the retained value without drift.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoastClock {
    elapsed_seconds: u32,
    running: bool,
    baseline_seconds: u32,
    anchor_ms: Option<u64>,
}

impl RoastClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Paused clock holding `elapsed_seconds`, used when reopening a saved roast
    pub fn with_elapsed(elapsed_seconds: u32) -> Self {
        Self {
            elapsed_seconds,
            running: false,
            baseline_seconds: elapsed_seconds,
            anchor_ms: None,
        }
    }

    pub fn elapsed_seconds(&self) -> u32 {
        self.elapsed_seconds
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Start or resume. Returns `false` if the clock was already running.
    pub fn start(&mut self, now_ms: u64) -> bool {
        if self.running {
            return false;
        }
        self.baseline_seconds = self.elapsed_seconds;
        self.anchor_ms = Some(now_ms);
        self.running = true;
        true
    }

    /// Stop advancing, keeping the elapsed value. Returns `false` if already paused.
    pub fn pause(&mut self, now_ms: u64) -> bool {
        if !self.running {
            return false;
        }
        self.tick(now_ms);
        self.running = false;
        self.baseline_seconds = self.elapsed_seconds;
        self.anchor_ms = None;
        true
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Recompute elapsed seconds from the anchor. No-op while paused.
    ///
    /// Elapsed time never decreases, even if `now_ms` steps backwards.
    pub fn tick(&mut self, now_ms: u64) -> u32 {
        if let (true, Some(anchor)) = (self.running, self.anchor_ms) {
            let window = (now_ms.saturating_sub(anchor) / 1000).min(u64::from(u32::MAX)) as u32;
            let secs = self.baseline_seconds.saturating_add(window);
            self.elapsed_seconds = self.elapsed_seconds.max(secs);
        }
        self.elapsed_seconds
    }
}
