use std::{hint::black_box, time::Duration};

use hdrhistogram::Histogram;
use tracing::{debug, info};

use crate::{
    kernel::Kernel,
    matrix::{generate, Matrix},
    report::Summary,
    timing::{measure, Clock},
    Result,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// matrix dimension
    pub n: usize,
    /// fixes the random stream, entropy seeded when absent
    pub seed: Option<u64>,
    pub kernel: Kernel,
    /// timed kernel runs over the same inputs, the fastest one is reported
    pub repeat: u32,
    /// re-measurements of a run whose elapsed time reads as zero
    pub retries: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            n: 1024,
            seed: None,
            kernel: Kernel::Naive,
            repeat: 1,
            retries: 3,
        }
    }
}

/// Generates A and B, times `config.repeat` multiplications into C and
/// summarizes the fastest one.
pub fn run<C: Clock + ?Sized>(config: &Config, clock: &C) -> Result<Summary> {
    debug!(?config, "starting benchmark");
    let n = config.n;
    let (a, b) = generate(n, config.seed)?;
    let mut c = Matrix::zeroed("C", n)?;

    let mut latency =
        Histogram::<u64>::new_with_bounds(1, u64::MAX, 3).expect("messed up arguments");
    let mut best: Option<Duration> = None;
    for _ in 0..config.repeat.max(1) {
        let timed = measure(clock, config.retries, || {
            config
                .kernel
                .run(n, a.as_slice(), b.as_slice(), c.as_mut_slice())
        })?;
        black_box(c.as_slice());
        debug!(
            elapsed = ?timed.elapsed,
            attempts = timed.attempts,
            "kernel finished"
        );
        let nanos = u64::try_from(timed.elapsed.as_nanos()).unwrap_or(u64::MAX);
        latency.saturating_record(nanos);
        best = Some(best.map_or(timed.elapsed, |best| best.min(timed.elapsed)));
    }
    debug!(checksum = c.checksum(), "result matrix");
    if latency.len() > 1 {
        log_distribution(&latency);
    }
    Ok(Summary::new(config.kernel, n, best.unwrap_or(Duration::ZERO)))
}

fn log_distribution(hist: &Histogram<u64>) {
    info!(
        "kernel latency: samples {} min {}µs max {}µs mean {:.2}µs stdev {:.2}µs p80 {}µs p95 {}µs",
        hist.len(),
        hist.min() / 1_000,
        hist.max() / 1_000,
        hist.mean() / 1_000.0,
        hist.stdev() / 1_000.0,
        hist.value_at_quantile(0.8) / 1_000,
        hist.value_at_quantile(0.95) / 1_000
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        report::{flops, Throughput},
        timing::{testing::StepClock, MonotonicClock},
        Error,
    };

    fn config(n: usize) -> Config {
        Config {
            n,
            seed: Some(1),
            ..Default::default()
        }
    }

    #[test]
    fn test_run_reports_measured_throughput() {
        let clock = StepClock::new(0, Duration::from_millis(2));
        let summary = run(&config(32), &clock).unwrap();
        assert_eq!(summary.n, 32);
        assert_eq!(summary.elapsed_secs, 0.002);
        assert_eq!(
            summary.throughput,
            Throughput::Gflops(flops(32) / 0.002 / 1e9)
        );
        assert_eq!(clock.readings(), 2);
    }

    #[test]
    fn test_run_real_clock() {
        let summary = run(&config(48), &MonotonicClock::new()).unwrap();
        assert!(summary.elapsed_secs >= 0.0);
        match summary.throughput {
            Throughput::Gflops(gflops) => {
                assert_eq!(gflops, 2.0 * 48.0 * 48.0 * 48.0 / summary.elapsed_secs / 1e9)
            }
            Throughput::Undefined => assert_eq!(summary.elapsed_secs, 0.0),
        }
    }

    #[test]
    fn test_run_frozen_clock() {
        let clock = StepClock::frozen();
        let summary = run(&config(4), &clock).unwrap();
        assert_eq!(summary.throughput, Throughput::Undefined);
        // initial measurement plus three retries, two readings each
        assert_eq!(clock.readings(), 8);
    }

    #[test]
    fn test_run_zero_size() {
        let summary = run(&config(0), &MonotonicClock::new()).unwrap();
        assert_eq!(summary.n, 0);
        assert!(summary.elapsed_secs >= 0.0);
    }

    #[test]
    fn test_run_repeat() {
        let clock = StepClock::new(0, Duration::from_micros(100));
        let cfg = Config {
            repeat: 5,
            kernel: Kernel::Ikj,
            ..config(8)
        };
        let summary = run(&cfg, &clock).unwrap();
        assert_eq!(summary.kernel, Kernel::Ikj);
        assert_eq!(summary.elapsed_secs, 0.0001);
        assert_eq!(clock.readings(), 10);

        // without retries the first run keeps its zero reading and wins
        let clock = StepClock::new(2, Duration::from_micros(100));
        let cfg = Config {
            repeat: 3,
            retries: 0,
            ..config(8)
        };
        let summary = run(&cfg, &clock).unwrap();
        assert_eq!(summary.throughput, Throughput::Undefined);
        assert_eq!(clock.readings(), 6);
    }

    #[test]
    fn test_run_allocation_failure() {
        let err = run(&config(1 << 29), &MonotonicClock::new()).unwrap_err();
        assert!(matches!(err, Error::Allocation { buffer: "A", .. }));
        let err = run(&config(usize::MAX), &MonotonicClock::new()).unwrap_err();
        assert_eq!(err, Error::Dimension { n: usize::MAX });
    }
}
