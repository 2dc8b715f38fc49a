use itertools::Itertools;
use num_traits::{Float, ToPrimitive};
use rand::Rng;
use rayon::prelude::*;
use std::fmt;
use std::ops;

use crate::config::SolveConfig;
use crate::error::InverseError;
use crate::matrix::matrix::Matrix;

pub trait RealElement:  // Avoid repeating all the traits
    Float
    + std::iter::Sum<Self>
    + fmt::Display
    + fmt::Debug
    + Send
    + Sync
{
}

impl<T> RealElement for T where
    T: Float + std::iter::Sum<T> + fmt::Display + fmt::Debug + Send + Sync
{
}

/// Dense row-major matrix of floating point numbers.
#[derive(Debug, Clone, PartialEq)]
pub struct MatrixReal<T> {
    pub cols: usize,
    pub rows: usize,
    pub cells: Vec<T>,
}

impl<T: RealElement> Matrix<T> for MatrixReal<T> {
    /// Short rows are padded with zeros up to the widest row.
    fn from_list(lines: Vec<Vec<T>>) -> Self {
        let cols = lines.iter().map(|l| l.len()).max().unwrap_or(0);
        let rows = lines.len();

        MatrixReal {
            rows,
            cols,
            cells: lines
                .into_iter()
                .flat_map(|l| {
                    let pad = cols - l.len();
                    l.into_iter().chain(std::iter::repeat(T::zero()).take(pad))
                })
                .collect(),
        }
    }

    fn to_list(&self) -> Vec<Vec<T>> {
        if self.cols == 0 {
            return vec![vec![]; self.rows];
        }
        self.cells
            .chunks(self.cols)
            .map(|line| line.into())
            .collect()
    }

    fn identity(n: usize) -> MatrixReal<T> {
        MatrixReal {
            rows: n,
            cols: n,
            cells: (0..n)
                .flat_map(|i| (0..n).map(move |j| if i == j { T::one() } else { T::zero() }))
                .collect(),
        }
    }

    fn inverse(&self) -> Result<MatrixReal<T>, InverseError> {
        self.inverse_with(&SolveConfig::default())
    }

    fn transpose(&self) -> MatrixReal<T> {
        MatrixReal {
            rows: self.cols,
            cols: self.rows,
            cells: (0..self.cols)
                .flat_map(|c| (0..self.rows).map(move |r| self.at(r, c)))
                .collect(),
        }
    }

    #[inline(always)]
    fn at(&self, row: usize, col: usize) -> T {
        self.cells[row * self.cols + col]
    }
}

impl<T: RealElement> MatrixReal<T> {
    pub fn new(rows: usize, cols: usize) -> MatrixReal<T> {
        MatrixReal {
            rows,
            cols,
            cells: vec![T::zero(); rows * cols],
        }
    }

    /// Like `from_list`, but rejects rows of unequal length instead of padding them.
    pub fn try_from_list(lines: Vec<Vec<T>>) -> Result<MatrixReal<T>, InverseError> {
        if let Some(expected) = lines.first().map(|l| l.len()) {
            let ragged = lines
                .iter()
                .enumerate()
                .find(|(_, l)| l.len() != expected);
            if let Some((row, line)) = ragged {
                return Err(InverseError::Ragged {
                    row,
                    len: line.len(),
                    expected,
                });
            }
        }
        Ok(MatrixReal::from_list(lines))
    }

    pub fn is_square(&self) -> bool {
        self.rows == self.cols
    }

    pub fn inverse_with(&self, config: &SolveConfig) -> Result<MatrixReal<T>, InverseError> {
        self.ensure_square()?;
        self.gauss_jordan(MatrixReal::identity(self.rows), config)
    }

    pub fn approx_eq(&self, other: &MatrixReal<T>, tolerance: T) -> bool {
        self.rows == other.rows
            && self.cols == other.cols
            && self
                .cells
                .iter()
                .zip(other.cells.iter())
                .all(|(a, b)| (*a - *b).abs() <= tolerance)
    }

    fn ensure_square(&self) -> Result<(), InverseError> {
        if !self.is_square() {
            return Err(InverseError::NotSquare {
                rows: self.rows,
                cols: self.cols,
            });
        }
        Ok(())
    }

    fn max_abs(&self) -> T {
        self.cells.iter().fold(T::zero(), |acc, x| acc.max(x.abs()))
    }

    // Reduce [self | rhs] until the left block is the identity, the right
    // block is then self^-1 * rhs. Caller guarantees self is square.
    fn gauss_jordan(
        &self,
        rhs: MatrixReal<T>,
        config: &SolveConfig,
    ) -> Result<MatrixReal<T>, InverseError> {
        config.validate()?;

        let n = self.rows;
        let m = rhs.cols;
        if n == 0 {
            return Ok(MatrixReal::new(0, m));
        }

        if let Some(pos) = self.cells.iter().position(|x| !x.is_finite()) {
            return Err(InverseError::Singular {
                index: pos % n,
                pivot: f64::NAN,
            });
        }

        let width = n + m;
        let mut aug: Vec<T> = (0..n)
            .flat_map(|r| {
                self.cells[r * n..(r + 1) * n]
                    .iter()
                    .chain(rhs.cells[r * m..(r + 1) * m].iter())
                    .copied()
            })
            .collect();

        // Never trust pivots below the rounding noise of the element type
        let size: T = num_traits::cast(n).unwrap_or_else(T::one);
        let tolerance: T = num_traits::cast(config.tolerance).unwrap_or_else(T::epsilon);
        let threshold = tolerance.max(T::epsilon() * size) * self.max_abs();

        for col in 0..n {
            // Partial pivoting
            let (pivot_row, pivot_abs) = (col..n)
                .map(|r| (r, aug[r * width + col].abs()))
                .fold((col, T::zero()), |best, cand| {
                    if cand.1 > best.1 {
                        cand
                    } else {
                        best
                    }
                });

            if !(pivot_abs > threshold) {
                return Err(InverseError::Singular {
                    index: col,
                    pivot: ToPrimitive::to_f64(&pivot_abs).unwrap_or(f64::NAN),
                });
            }

            if pivot_row != col {
                for k in 0..width {
                    aug.swap(col * width + k, pivot_row * width + k);
                }
            }

            let pivot = aug[col * width + col];
            for cell in aug[col * width..(col + 1) * width].iter_mut() {
                *cell = *cell / pivot;
            }

            let pivot_slice = aug[col * width..(col + 1) * width].to_vec();
            let eliminate = |(r, row): (usize, &mut [T])| {
                if r == col {
                    return;
                }
                let factor = row[col];
                if factor == T::zero() {
                    return;
                }
                for (cell, p) in row.iter_mut().zip(pivot_slice.iter()) {
                    *cell = *cell - factor * *p;
                }
            };

            if n >= config.parallel_threshold {
                aug.par_chunks_mut(width).enumerate().for_each(eliminate);
            } else {
                aug.chunks_mut(width).enumerate().for_each(eliminate);
            }
        }

        Ok(MatrixReal {
            rows: n,
            cols: m,
            cells: aug
                .chunks(width)
                .flat_map(|row| row[n..].iter().copied())
                .collect(),
        })
    }
}

impl MatrixReal<f64> {
    /// Entries drawn uniformly from `[-1, 1)`.
    pub fn random<R: Rng>(rows: usize, cols: usize, rng: &mut R) -> MatrixReal<f64> {
        MatrixReal {
            rows,
            cols,
            cells: (0..rows * cols).map(|_| rng.gen_range(-1.0..1.0)).collect(),
        }
    }

    /// Strictly diagonally dominant, hence always invertible.
    pub fn random_invertible<R: Rng>(n: usize, rng: &mut R) -> MatrixReal<f64> {
        let mut m = MatrixReal::random(n, n, rng);
        for i in 0..n {
            m.cells[i * n + i] = n as f64 + rng.gen_range(0.0..1.0);
        }
        m
    }
}

impl<T: RealElement> ops::Mul<&MatrixReal<T>> for &MatrixReal<T> {
    type Output = Result<MatrixReal<T>, InverseError>;

    fn mul(self, rhs: &MatrixReal<T>) -> Result<MatrixReal<T>, InverseError> {
        if self.cols != rhs.rows {
            return Err(InverseError::DimensionMismatch {
                op: "mul",
                lhs: (self.rows, self.cols),
                rhs: (rhs.rows, rhs.cols),
            });
        }

        let mut result = MatrixReal::new(self.rows, rhs.cols);
        if rhs.cols == 0 {
            return Ok(result);
        }

        let rot = rhs.transpose();
        let inner = self.cols;

        result
            .cells
            .par_chunks_mut(rhs.cols)
            .enumerate()
            .for_each(|(r, row)| {
                let lhs_row = &self.cells[r * inner..(r + 1) * inner];
                for (c, cell) in row.iter_mut().enumerate() {
                    let rhs_col = &rot.cells[c * inner..(c + 1) * inner];
                    *cell = lhs_row.iter().zip(rhs_col).map(|(a, b)| *a * *b).sum();
                }
            });

        Ok(result)
    }
}

impl<T: RealElement> fmt::Display for MatrixReal<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let precision = f.precision().unwrap_or(4);
        for row in self.to_list() {
            writeln!(
                f,
                "[{}]",
                row.iter()
                    .map(|x| format!("{:>w$.p$}", x, w = precision + 6, p = precision))
                    .join(", ")
            )?;
        }
        Ok(())
    }
}

// --------------------------------------------------
//                      TESTS
// --------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_matrix_real_basics() {
        let a = MatrixReal::<f64>::identity(2);
        let b = MatrixReal::from_list(vec![vec![2.0, 3.0], vec![4.0, 5.0]]);

        let c = (&a * &b).unwrap();
        assert_eq!(c, b);

        assert_eq!(b.transpose().to_list(), vec![vec![2.0, 4.0], vec![3.0, 5.0]]);
        assert_eq!(b.at(1, 0), 4.0);

        let padded = MatrixReal::from_list(vec![vec![1.0, 2.0, 3.0], vec![4.0]]);
        assert_eq!(
            padded.to_list(),
            vec![vec![1.0, 2.0, 3.0], vec![4.0, 0.0, 0.0]]
        );
        assert!(!padded.is_square());
    }

    #[test]
    fn test_matrix_real_mul_mismatch() {
        let a = MatrixReal::<f64>::new(2, 3);
        assert_eq!(
            &a * &a,
            Err(InverseError::DimensionMismatch {
                op: "mul",
                lhs: (2, 3),
                rhs: (2, 3),
            })
        );
    }

    #[test]
    fn test_inverse_diagonal() {
        let m = MatrixReal::from_list(vec![vec![2.0, 0.0], vec![0.0, 2.0]]);
        assert_eq!(
            m.inverse().unwrap().to_list(),
            vec![vec![0.5, 0.0], vec![0.0, 0.5]]
        );
    }

    #[test]
    fn test_inverse_general() {
        let m = MatrixReal::from_list(vec![vec![4.0, 7.0], vec![2.0, 6.0]]);
        let expected = MatrixReal::from_list(vec![vec![0.6, -0.7], vec![-0.2, 0.4]]);
        assert!(m.inverse().unwrap().approx_eq(&expected, 1e-12));

        let m = MatrixReal::from_list(vec![
            vec![4.0, 7.0, 2.0],
            vec![3.0, 6.0, 1.0],
            vec![2.0, 5.0, 3.0],
        ]);
        let product = (&m * &m.inverse().unwrap()).unwrap();
        assert!(product.approx_eq(&MatrixReal::identity(3), 1e-12));
    }

    #[test]
    fn test_inverse_needs_pivoting() {
        let m = MatrixReal::from_list(vec![vec![0.0, 1.0], vec![1.0, 0.0]]);
        assert_eq!(m.inverse().unwrap(), m);
    }

    #[test]
    fn test_inverse_singular() {
        let m = MatrixReal::from_list(vec![vec![1.0, 2.0], vec![2.0, 4.0]]);
        assert!(matches!(
            m.inverse(),
            Err(InverseError::Singular { index: 1, .. })
        ));

        let zero = MatrixReal::<f64>::new(3, 3);
        assert!(matches!(
            zero.inverse(),
            Err(InverseError::Singular { index: 0, .. })
        ));

        let nan = MatrixReal::from_list(vec![vec![1.0, f64::NAN], vec![0.0, 1.0]]);
        assert!(matches!(nan.inverse(), Err(InverseError::Singular { .. })));
    }

    #[test]
    fn test_inverse_not_square() {
        let m = MatrixReal::<f64>::new(2, 3);
        assert_eq!(
            m.inverse(),
            Err(InverseError::NotSquare { rows: 2, cols: 3 })
        );
    }

    #[test]
    fn test_inverse_empty() {
        let m = MatrixReal::<f64>::from_list(vec![]);
        let inv = m.inverse().unwrap();
        assert_eq!(inv.rows, 0);
        assert_eq!(inv.cols, 0);
    }

    #[test]
    fn test_inverse_tolerance() {
        let m = MatrixReal::from_list(vec![vec![1.0, 0.0], vec![0.0, 1e-9]]);
        assert!(m.inverse().is_ok());
        assert!(m
            .inverse_with(&SolveConfig::new().with_tolerance(1e-6))
            .is_err());
    }

    #[test]
    fn test_try_from_list_rejects_ragged() {
        assert_eq!(
            MatrixReal::<f64>::try_from_list(vec![vec![1.0, 2.0], vec![3.0]]),
            Err(InverseError::Ragged {
                row: 1,
                len: 1,
                expected: 2
            })
        );

        let m = MatrixReal::try_from_list(vec![vec![1.0, 2.0], vec![3.0, 4.0]]).unwrap();
        assert_eq!(m.to_list(), vec![vec![1.0, 2.0], vec![3.0, 4.0]]);
        assert_eq!(MatrixReal::<f64>::try_from_list(vec![]).unwrap().rows, 0);
    }

    #[test]
    fn test_inverse_singular_f32() {
        let m = MatrixReal::<f32>::from_list(vec![
            vec![1.0, 2.0, 3.0],
            vec![4.0, 5.0, 6.0],
            vec![7.0, 8.0, 9.0],
        ]);
        assert!(matches!(
            m.inverse(),
            Err(InverseError::Singular { index: 2, .. })
        ));

        let m = MatrixReal::<f32>::from_list(vec![vec![1.0, 1.0], vec![1.0, 1.0 + 1e-7]]);
        assert!(matches!(
            m.inverse(),
            Err(InverseError::Singular { index: 1, .. })
        ));

        // The f64 default tolerance is untouched by the floor
        let m = MatrixReal::<f64>::from_list(vec![vec![1.0, 1.0], vec![1.0, 1.0 + 1e-7]]);
        assert!(m.inverse().is_ok());
    }

    #[test]
    fn test_random_round_trip() {
        let mut rng = StdRng::seed_from_u64(42);
        for n in 1..12 {
            let m = MatrixReal::random_invertible(n, &mut rng);
            let inv = m.inverse().unwrap();
            let product = (&m * &inv).unwrap();
            assert!(product.approx_eq(&MatrixReal::identity(n), 1e-9));
        }
    }

    #[test]
    fn test_parallel_elimination_matches_sequential() {
        let mut rng = StdRng::seed_from_u64(7);
        let m = MatrixReal::random_invertible(24, &mut rng);

        let sequential = m
            .inverse_with(&SolveConfig::new().with_parallel_threshold(usize::MAX))
            .unwrap();
        let parallel = m
            .inverse_with(&SolveConfig::new().with_parallel_threshold(1))
            .unwrap();
        assert_eq!(sequential, parallel);
    }

    #[test]
    fn test_f32_inverse() {
        let m = MatrixReal::<f32>::from_list(vec![vec![4.0, 0.0], vec![0.0, 8.0]]);
        assert_eq!(
            m.inverse().unwrap().to_list(),
            vec![vec![0.25, 0.0], vec![0.0, 0.125]]
        );
    }

    #[test]
    fn test_display() {
        let m = MatrixReal::from_list(vec![vec![1.0, 2.0], vec![3.0, 4.5]]);
        assert_eq!(
            format!("{:.1}", m),
            "[    1.0,     2.0]\n[    3.0,     4.5]\n"
        );
    }
}
