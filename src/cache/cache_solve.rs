use tracing::{debug, info, warn};

use crate::cache::cached_matrix::CachedMatrix;
use crate::config::SolveConfig;
use crate::error::InverseError;
use crate::matrix::matrix_real::{MatrixReal, RealElement};

/// The expensive computation sitting behind the cache.
pub trait Inverter<T> {
    fn invert(&self, matrix: &MatrixReal<T>) -> Result<MatrixReal<T>, InverseError>;
}

/// Default primitive: Gauss-Jordan elimination with partial pivoting.
#[derive(Debug, Clone, Copy, Default)]
pub struct GaussJordan {
    pub config: SolveConfig,
}

impl GaussJordan {
    pub fn new(config: SolveConfig) -> Self {
        GaussJordan { config }
    }
}

impl<T: RealElement> Inverter<T> for GaussJordan {
    fn invert(&self, matrix: &MatrixReal<T>) -> Result<MatrixReal<T>, InverseError> {
        matrix.inverse_with(&self.config)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Calls answered from the cache slot.
    pub hits: u64,
    /// Calls that found the slot empty, failed attempts included.
    pub misses: u64,
    /// Misses where the primitive returned an error.
    pub failures: u64,
}

/// Compute-or-retrieve front end for a `CachedMatrix`.
#[derive(Debug, Default)]
pub struct CacheSolver<P = GaussJordan> {
    inverter: P,
    stats: CacheStats,
}

impl CacheSolver<GaussJordan> {
    pub fn new() -> Self {
        Self::with_inverter(GaussJordan::default())
    }

    pub fn with_config(config: SolveConfig) -> Self {
        Self::with_inverter(GaussJordan::new(config))
    }
}

impl<P> CacheSolver<P> {
    pub fn with_inverter(inverter: P) -> Self {
        CacheSolver {
            inverter,
            stats: CacheStats::default(),
        }
    }

    pub fn inverter(&self) -> &P {
        &self.inverter
    }

    pub fn stats(&self) -> CacheStats {
        self.stats
    }

    /// Return the inverse of `cm`'s matrix, computing and storing it on a miss.
    ///
    /// A hit logs "getting cached inverse" and returns a copy of the stored
    /// inverse without calling the primitive. Errors from the primitive are
    /// returned as is and leave the slot empty, so the next call retries.
    pub fn solve<T>(&mut self, cm: &mut CachedMatrix<T>) -> Result<MatrixReal<T>, InverseError>
    where
        T: RealElement,
        P: Inverter<T>,
    {
        if let Some(inv) = cm.get_cached_inverse() {
            info!("getting cached inverse");
            self.stats.hits += 1;
            return Ok(inv.clone());
        }

        self.stats.misses += 1;
        let value = cm.get();
        debug!(rows = value.rows, cols = value.cols, "computing inverse");

        match self.inverter.invert(value) {
            Ok(inv) => {
                cm.set_cached_inverse(inv.clone());
                Ok(inv)
            }
            Err(err) => {
                self.stats.failures += 1;
                warn!(%err, "inversion failed");
                Err(err)
            }
        }
    }

    /// Solve `A * X = rhs` where `A` is `cm`'s matrix, through the cached inverse.
    ///
    /// Only the inverse itself is ever stored, the product is not.
    pub fn solve_with<T>(
        &mut self,
        cm: &mut CachedMatrix<T>,
        rhs: &MatrixReal<T>,
    ) -> Result<MatrixReal<T>, InverseError>
    where
        T: RealElement,
        P: Inverter<T>,
    {
        let inv = self.solve(cm)?;
        if inv.cols != rhs.rows {
            return Err(InverseError::DimensionMismatch {
                op: "solve_with",
                lhs: (inv.rows, inv.cols),
                rhs: (rhs.rows, rhs.cols),
            });
        }
        &inv * rhs
    }
}

// --------------------------------------------------
//                      TESTS
// --------------------------------------------------
