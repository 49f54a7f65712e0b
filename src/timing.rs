use std::time::{Duration, Instant};

use tracing::warn;

/// Source of monotonic timestamps, expressed as the offset from an arbitrary origin.
pub trait Clock {
    fn now(&self) -> Duration;
}

/// `Instant` backed clock, the highest resolution monotonic source std offers.
#[derive(Debug, Clone, Copy)]
pub struct MonotonicClock {
    origin: Instant,
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }
}

#[derive(Debug)]
pub struct Timed<T> {
    pub value: T,
    pub elapsed: Duration,
    pub attempts: u32,
}

/// Runs `f` between two clock readings.
///
/// A zero difference means the clock ran out of resolution; `f` is run and
/// timed again, at most `retries` more times. The last measurement is returned
/// even if it is still zero, callers must not divide by it blindly.
pub fn measure<C, T, E, F>(clock: &C, retries: u32, mut f: F) -> Result<Timed<T>, E>
where
    C: Clock + ?Sized,
    F: FnMut() -> Result<T, E>,
{
    let mut attempt = 0;
    loop {
        let start = clock.now();
        let value = f()?;
        let end = clock.now();
        let elapsed = end.saturating_sub(start);
        if !elapsed.is_zero() || attempt >= retries {
            return Ok(Timed {
                value,
                elapsed,
                attempts: attempt + 1,
            });
        }
        attempt += 1;
        warn!(attempt, "clock did not advance during the measurement, measuring again");
    }
}
