use crate::error::InverseError;

pub trait Matrix<T>
where
    Self: Sized,
{
    fn from_list(lines: Vec<Vec<T>>) -> Self;
    fn to_list(&self) -> Vec<Vec<T>>;

    fn identity(n: usize) -> Self;
    fn inverse(&self) -> Result<Self, InverseError>;
    fn transpose(&self) -> Self;
    fn at(&self, row: usize, col: usize) -> T;
}
