use std::mem;

use rand::{distributions::Uniform, rngs::StdRng, Rng, SeedableRng};
use tracing::debug;

use crate::{Error, Result};

/// Square n x n matrix of f64 stored row-major: element (i, j) lives at `i * n + j`.
#[derive(Debug, Clone, PartialEq)]
pub struct Matrix {
    n: usize,
    data: Vec<f64>,
}

/// Number of elements in an n x n matrix, rejecting dimensions whose buffer
/// could not be addressed.
pub fn element_count(n: usize) -> Result<usize> {
    let len = n.checked_mul(n).ok_or(Error::Dimension { n })?;
    match len.checked_mul(mem::size_of::<f64>()) {
        Some(bytes) if bytes <= isize::MAX as usize => Ok(len),
        _ => Err(Error::Dimension { n }),
    }
}

impl Matrix {
    /// Allocates a zero-filled matrix. `name` identifies the buffer in allocation errors.
    pub fn zeroed(name: &'static str, n: usize) -> Result<Self> {
        let len = element_count(n)?;
        let bytes = len * mem::size_of::<f64>();
        let mut data = Vec::new();
        data.try_reserve_exact(len)
            .map_err(|_| Error::Allocation {
                buffer: name,
                bytes,
            })?;
        data.resize(len, 0.0);
        debug!(buffer = name, n, bytes, "allocated matrix");
        Ok(Self { n, data })
    }

    pub fn from_vec(name: &'static str, n: usize, data: Vec<f64>) -> Result<Self> {
        let expected = element_count(n)?;
        if data.len() != expected {
            return Err(Error::Shape {
                name,
                expected,
                actual: data.len(),
            });
        }
        Ok(Self { n, data })
    }

    pub fn identity(n: usize) -> Result<Self> {
        let mut m = Self::zeroed("I", n)?;
        for i in 0..n {
            m.data[i * n + i] = 1.0;
        }
        Ok(m)
    }

    #[inline]
    pub fn n(&self) -> usize {
        self.n
    }

    #[inline]
    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [f64] {
        &mut self.data
    }

    #[inline]
    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.data[i * self.n + j]
    }

    pub fn checksum(&self) -> f64 {
        self.data.iter().sum()
    }
}

/// Allocates A and B and fills both from a single uniform [0, 1) stream,
/// drawing A[i] and then B[i] for every linear index i.
///
/// `seed` fixes the stream; without it the generator is seeded from OS entropy.
pub fn generate(n: usize, seed: Option<u64>) -> Result<(Matrix, Matrix)> {
    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let mut a = Matrix::zeroed("A", n)?;
    let mut b = Matrix::zeroed("B", n)?;
    let uniform = Uniform::new(0.0, 1.0);
    for (x, y) in a.data.iter_mut().zip(b.data.iter_mut()) {
        *x = rng.sample(uniform);
        *y = rng.sample(uniform);
    }
    Ok((a, b))
}
