use std::{fmt, time::Duration};

use crate::kernel::Kernel;

/// Floating point operations in an n x n x n multiply: one multiply and one add per inner step.
pub fn flops(n: usize) -> f64 {
    let n = n as f64;
    2.0 * n * n * n
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Throughput {
    Gflops(f64),
    /// The measured duration was zero, there is nothing to divide by.
    Undefined,
}

impl Throughput {
    pub fn new(flops: f64, elapsed_secs: f64) -> Self {
        if elapsed_secs > 0.0 {
            Self::Gflops(flops / elapsed_secs / 1e9)
        } else {
            Self::Undefined
        }
    }
}

impl fmt::Display for Throughput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Gflops(gflops) => write!(f, "{:.3}", gflops),
            Self::Undefined => f.write_str("undefined"),
        }
    }
}

/// Result of a single benchmark run. Displays as the summary line.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Summary {
    pub kernel: Kernel,
    pub n: usize,
    pub elapsed_secs: f64,
    pub flops: f64,
    pub throughput: Throughput,
}

impl Summary {
    pub fn new(kernel: Kernel, n: usize, elapsed: Duration) -> Self {
        let elapsed_secs = elapsed.as_secs_f64();
        let flops = flops(n);
        Self {
            kernel,
            n,
            elapsed_secs,
            flops,
            throughput: Throughput::new(flops, elapsed_secs),
        }
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} DGEMM: {:.3} seconds, {} GFLOP/s",
            self.kernel.label(),
            self.elapsed_secs,
            self.throughput
        )
    }
}
