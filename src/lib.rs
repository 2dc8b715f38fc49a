#[cfg(feature = "python")]
use pyo3::prelude::*;

pub mod cache {
    pub mod cache_solve;
    pub mod cached_matrix;
}
pub mod matrix {
    pub mod matrix;
    pub mod matrix_real;
}

pub mod config;
pub mod error;

#[cfg(feature = "python")]
pub mod python;

pub use cache::cache_solve::{CacheSolver, CacheStats, GaussJordan, Inverter};
pub use cache::cached_matrix::{CachedMatrix, InvalidateCache};
pub use config::SolveConfig;
pub use error::{InverseError, InverseResult};
pub use matrix::matrix::Matrix;
pub use matrix::matrix_real::{MatrixReal, RealElement};

/// A Python module implemented in Rust.
#[cfg(feature = "python")]
#[pymodule]
fn cached_inverse(_py: Python, m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<python::PyCachedMatrix>()?;
    m.add_function(wrap_pyfunction!(python::cache_solve, m)?)?;
    Ok(())
}
