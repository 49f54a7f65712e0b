use std::{cmp::min, str::FromStr};

use tracing::instrument;

use crate::{
    matrix::{element_count, Matrix},
    Error, Result,
};

// k-block length for the blocked kernel
const BLOCK: usize = 64;

/// Loop order used to compute C = A * B.
///
/// All kernels compute the same sum for every output cell. `Naive` is the
/// baseline; the others may associate the additions differently and agree with it
/// only within floating point tolerance.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Kernel {
    #[default]
    Naive,
    Ikj,
    Blocked,
}

impl Kernel {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Naive => "naive",
            Self::Ikj => "ikj",
            Self::Blocked => "blocked",
        }
    }

    /// Name used in the summary line.
    pub fn label(&self) -> &str {
        match self {
            Self::Naive => "Naive",
            Self::Ikj => "IKJ",
            Self::Blocked => "Blocked",
        }
    }

    pub fn run(&self, n: usize, a: &[f64], b: &[f64], c: &mut [f64]) -> Result<()> {
        match self {
            Self::Naive => dgemm(n, a, b, c),
            Self::Ikj => dgemm_ikj(n, a, b, c),
            Self::Blocked => dgemm_blocked(n, a, b, c),
        }
    }
}

impl FromStr for Kernel {
    type Err = eyre::Error;

    fn from_str(s: &str) -> eyre::Result<Self> {
        match s {
            "naive" => Ok(Self::Naive),
            "ikj" => Ok(Self::Ikj),
            "blocked" => Ok(Self::Blocked),
            _ => Err(eyre::eyre!("unknown kernel: {}", s)),
        }
    }
}

fn check_shapes(n: usize, a: &[f64], b: &[f64], c: &[f64]) -> Result<()> {
    let expected = element_count(n)?;
    for (name, actual) in [("A", a.len()), ("B", b.len()), ("C", c.len())] {
        if actual != expected {
            return Err(Error::Shape {
                name,
                expected,
                actual,
            });
        }
    }
    Ok(())
}

/// Naive DGEMM over row-major n x n buffers.
///
/// Every `c[i * n + j]` is the sum of `a[i * n + k] * b[k * n + j]` accumulated
/// in increasing k into a single running sum and stored once. Fails before
/// touching `c` if any buffer does not hold exactly n * n elements.
#[allow(clippy::needless_range_loop)]
#[instrument(level = "debug", skip(a, b, c))]
pub fn dgemm(n: usize, a: &[f64], b: &[f64], c: &mut [f64]) -> Result<()> {
    check_shapes(n, a, b, c)?;
    for i in 0..n {
        for j in 0..n {
            let mut sum = 0.0;
            for k in 0..n {
                sum += a[i * n + k] * b[k * n + j];
            }
            c[i * n + j] = sum;
        }
    }
    Ok(())
}

/// Streams rows of B into the output row, accumulating in increasing k.
#[instrument(level = "debug", skip(a, b, c))]
pub fn dgemm_ikj(n: usize, a: &[f64], b: &[f64], c: &mut [f64]) -> Result<()> {
    check_shapes(n, a, b, c)?;
    if n == 0 {
        return Ok(());
    }
    c.fill(0.0);
    for (c_row, a_row) in c.chunks_exact_mut(n).zip(a.chunks_exact(n)) {
        for (a_ik, b_row) in a_row.iter().zip(b.chunks_exact(n)) {
            for (c_ij, b_kj) in c_row.iter_mut().zip(b_row) {
                *c_ij += a_ik * b_kj;
            }
        }
    }
    Ok(())
}

/// Sums each k-block of `BLOCK` products into a scalar before adding it to C.
#[allow(clippy::needless_range_loop)]
#[instrument(level = "debug", skip(a, b, c))]
pub fn dgemm_blocked(n: usize, a: &[f64], b: &[f64], c: &mut [f64]) -> Result<()> {
    check_shapes(n, a, b, c)?;
    c.fill(0.0);
    for i in 0..n {
        for kb in (0..n).step_by(BLOCK) {
            let kend = min(kb + BLOCK, n);
            for j in 0..n {
                let mut sum = 0.0;
                for k in kb..kend {
                    sum += a[i * n + k] * b[k * n + j];
                }
                c[i * n + j] += sum;
            }
        }
    }
    Ok(())
}

/// Allocates C and computes A * B with the given kernel.
pub fn multiply(kernel: Kernel, a: &Matrix, b: &Matrix) -> Result<Matrix> {
    let n = a.n();
    if b.n() != n {
        return Err(Error::Shape {
            name: "B",
            expected: element_count(n)?,
            actual: b.as_slice().len(),
        });
    }
    let mut c = Matrix::zeroed("C", n)?;
    kernel.run(n, a.as_slice(), b.as_slice(), c.as_mut_slice())?;
    Ok(c)
}
