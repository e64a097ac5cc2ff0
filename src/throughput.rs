//! Batch throughput tracking for command handlers.
//!
//! Every handled command bumps a cycle counter that wraps at the batch size.
//! Each wrap is a batch boundary: the time since the previous boundary is
//! reported and the boundary timestamp moves forward.

use chrono::{DateTime, Duration, Utc};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use crate::clock::Clock;

/// Default number of commands per batch.
pub const DEFAULT_BATCH_SIZE: u32 = 100;

/// Emitted once per completed batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchReport {
    /// 1-based sequence number of the batch.
    pub batch: u64,
    /// Number of commands in the batch.
    pub commands: u32,
    /// Wall-clock time since the previous boundary. Never negative.
    pub elapsed: Duration,
}

#[derive(Debug)]
struct CycleState {
    cycle: u32,
    batches: u64,
    previous: DateTime<Utc>,
}

/// Counts handled commands and measures each batch.
pub struct ThroughputCounter {
    batch_size: u32,
    handled: AtomicU64,
    state: Mutex<CycleState>,
    clock: Arc<dyn Clock>,
}

impl ThroughputCounter {
    /// Create a counter. The first batch is measured from now.
    pub fn new(batch_size: u32, clock: Arc<dyn Clock>) -> Self {
        let previous = clock.now();
        ThroughputCounter {
            batch_size: batch_size.max(1),
            handled: AtomicU64::new(0),
            state: Mutex::new(CycleState {
                cycle: 0,
                batches: 0,
                previous,
            }),
            clock,
        }
    }

    /// Record one handled command, returning a report on a batch boundary.
    pub fn record(&self) -> Option<BatchReport> {
        self.handled.fetch_add(1, Ordering::Relaxed);

        let mut state = self.lock();
        state.cycle = if state.cycle + 1 >= self.batch_size {
            0
        } else {
            state.cycle + 1
        };
        if state.cycle != 0 {
            return None;
        }

        // Read the clock under the lock so boundaries are observed in order.
        let now = self.clock.now();
        let elapsed = (now - state.previous).max(Duration::zero());
        state.previous = state.previous.max(now);
        state.batches += 1;

        Some(BatchReport {
            batch: state.batches,
            commands: self.batch_size,
            elapsed,
        })
    }

    /// Total commands recorded.
    pub fn handled(&self) -> u64 {
        self.handled.load(Ordering::Relaxed)
    }

    /// Position within the current batch, in `0..batch_size`.
    pub fn cycle(&self) -> u32 {
        self.lock().cycle
    }

    /// Completed batches.
    pub fn batches(&self) -> u64 {
        self.lock().batches
    }

    pub fn batch_size(&self) -> u32 {
        self.batch_size
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, CycleState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl std::fmt::Debug for ThroughputCounter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ThroughputCounter")
            .field("batch_size", &self.batch_size)
            .field("handled", &self.handled())
            .field("state", &*self.lock())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use chrono::TimeZone;

    fn start() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 15, 10, 0, 0).unwrap()
    }

    fn counter(batch_size: u32) -> (ThroughputCounter, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new(start()));
        (ThroughputCounter::new(batch_size, clock.clone()), clock)
    }

    #[test]
    fn test_boundary_fires_once_per_batch() {
        let (counter, _clock) = counter(100);

        let fired = (0..100).filter_map(|_| counter.record()).count();
        assert_eq!(fired, 1);
        assert_eq!(counter.cycle(), 0);
        assert_eq!(counter.batches(), 1);
        assert_eq!(counter.handled(), 100);
    }

    #[test]
    fn test_boundary_on_hundredth_call() {
        let (counter, _clock) = counter(100);

        for i in 1..100 {
            assert!(counter.record().is_none());
            assert_eq!(counter.cycle(), i);
        }
        let report = counter.record().expect("boundary on the 100th call");
        assert_eq!(report.batch, 1);
        assert_eq!(report.commands, 100);
    }

    #[test]
    fn test_elapsed_measured_between_boundaries() {
        let (counter, clock) = counter(10);

        clock.advance(Duration::milliseconds(40));
        let first = (0..10).filter_map(|_| counter.record()).last().unwrap();
        assert_eq!(first.elapsed, Duration::milliseconds(40));

        clock.advance(Duration::milliseconds(15));
        let second = (0..10).filter_map(|_| counter.record()).last().unwrap();
        assert_eq!(second.batch, 2);
        assert_eq!(second.elapsed, Duration::milliseconds(15));
    }

    #[test]
    fn test_clock_going_backwards_reports_zero() {
        let (counter, clock) = counter(2);

        clock.advance(Duration::milliseconds(100));
        counter.record();
        assert_eq!(
            counter.record().unwrap().elapsed,
            Duration::milliseconds(100)
        );

        clock.advance(Duration::milliseconds(-30));
        counter.record();
        assert_eq!(counter.record().unwrap().elapsed, Duration::zero());

        // The boundary did not move backwards: only time past it counts.
        clock.advance(Duration::milliseconds(50));
        counter.record();
        assert_eq!(
            counter.record().unwrap().elapsed,
            Duration::milliseconds(20)
        );
    }

    #[test]
    fn test_batch_size_of_one() {
        let (counter, _clock) = counter(1);
        assert!(counter.record().is_some());
        assert!(counter.record().is_some());
        assert_eq!(counter.batches(), 2);
    }

    #[test]
    fn test_zero_batch_size_is_clamped() {
        let (counter, _clock) = counter(0);
        assert_eq!(counter.batch_size(), 1);
    }

    #[test]
    fn test_concurrent_records_are_not_lost() {
        let (counter, _clock) = counter(100);
        let counter = Arc::new(counter);

        let threads: Vec<_> = (0..8)
            .map(|_| {
                let counter = Arc::clone(&counter);
                std::thread::spawn(move || {
                    (0..250).filter(|_| counter.record().is_some()).count()
                })
            })
            .collect();

        let fired: usize = threads.into_iter().map(|t| t.join().unwrap()).sum();
        assert_eq!(fired, 20);
        assert_eq!(counter.handled(), 2000);
        assert_eq!(counter.cycle(), 0);
    }
}
