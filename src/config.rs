use crate::error::{InverseError, InverseResult};

/// Tuning knobs for the Gauss-Jordan inversion primitive.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SolveConfig {
    /// Relative pivot tolerance: a pivot `p` is rejected when
    /// `|p| <= tolerance * max|a_ij|`. The elimination raises it to
    /// `n * epsilon` of the element type when it is smaller.
    pub tolerance: f64,
    /// Matrices with at least this many rows eliminate rows in parallel.
    pub parallel_threshold: usize,
}

impl SolveConfig {
    pub fn new() -> Self {
        SolveConfig {
            tolerance: 1e-12,
            parallel_threshold: 128,
        }
    }

    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    pub fn with_parallel_threshold(mut self, rows: usize) -> Self {
        self.parallel_threshold = rows;
        self
    }

    pub fn validate(&self) -> InverseResult<()> {
        if !self.tolerance.is_finite() || self.tolerance < 0.0 {
            return Err(InverseError::InvalidConfig {
                reason: format!("tolerance must be finite and >= 0, got {}", self.tolerance),
            });
        }
        Ok(())
    }
}

impl Default for SolveConfig {
    fn default() -> Self {
        Self::new()
    }
}

// --------------------------------------------------
//                      TESTS
// --------------------------------------------------
