pub mod bench;
pub mod kernel;
pub mod matrix;
pub mod report;
pub mod timing;

pub use bench::{run, Config};
pub use kernel::{dgemm, multiply, Kernel};
pub use matrix::{generate, Matrix};
pub use report::{Summary, Throughput};

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum Error {
    #[error("matrix dimension {n} overflows the addressable element count")]
    Dimension { n: usize },
    #[error("failed to allocate {bytes} bytes for matrix {buffer}")]
    Allocation { buffer: &'static str, bytes: usize },
    #[error("matrix {name} has {actual} elements, expected {expected}")]
    Shape {
        name: &'static str,
        expected: usize,
        actual: usize,
    },
}

pub type Result<T> = std::result::Result<T, Error>;
