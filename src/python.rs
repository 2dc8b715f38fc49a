use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;

use crate::cache::cache_solve::CacheSolver;
use crate::cache::cached_matrix::CachedMatrix;
use crate::error::InverseError;
use crate::matrix::matrix::Matrix;
use crate::matrix::matrix_real::MatrixReal;

impl From<InverseError> for PyErr {
    fn from(error: InverseError) -> PyErr {
        PyValueError::new_err(error.to_string())
    }
}

#[pyclass(name = "CachedMatrix")]
pub struct PyCachedMatrix {
    inner: CachedMatrix<f64>,
    solver: CacheSolver,
}

#[pymethods]
impl PyCachedMatrix {
    /// `lines` must be rectangular, ragged rows raise `ValueError`.
    #[new]
    fn new(lines: Vec<Vec<f64>>) -> PyResult<Self> {
        Ok(PyCachedMatrix {
            inner: CachedMatrix::new(MatrixReal::try_from_list(lines)?),
            solver: CacheSolver::new(),
        })
    }

    pub fn get(&self) -> Vec<Vec<f64>> {
        self.inner.get().to_list()
    }

    pub fn set(&mut self, lines: Vec<Vec<f64>>) -> PyResult<()> {
        self.inner.set(MatrixReal::try_from_list(lines)?);
        Ok(())
    }

    pub fn get_inverse(&self) -> Option<Vec<Vec<f64>>> {
        self.inner.get_cached_inverse().map(|inv| inv.to_list())
    }

    pub fn set_inverse(&mut self, lines: Vec<Vec<f64>>) -> PyResult<()> {
        self.inner.set_cached_inverse(MatrixReal::try_from_list(lines)?);
        Ok(())
    }

    pub fn solve(&mut self) -> PyResult<Vec<Vec<f64>>> {
        Ok(self.solver.solve(&mut self.inner)?.to_list())
    }

    #[getter]
    pub fn hits(&self) -> u64 {
        self.solver.stats().hits
    }

    #[getter]
    pub fn misses(&self) -> u64 {
        self.solver.stats().misses
    }

    fn __repr__(&self) -> String {
        format!(
            "CachedMatrix({}x{}, cached={})",
            self.inner.get().rows,
            self.inner.get().cols,
            self.inner.is_cached()
        )
    }
}

#[pyfunction]
pub fn cache_solve(mut cm: PyRefMut<'_, PyCachedMatrix>) -> PyResult<Vec<Vec<f64>>> {
    cm.solve()
}
