use std::ops::Range;

use eyre::{ensure, Result};
use sprs::TriMat;

use stria_core_rs::num::Float;

pub use ndarray::Array2;
pub use sprs::CsMat;

/// Build a CSR matrix from (row, col, value) triplets. Duplicated cells are summed up.
pub fn from_triplets<V: Float>(
    shape: (usize, usize),
    triplets: impl IntoIterator<Item = (usize, usize, V)>,
) -> Result<CsMat<V>> {
    let (nrows, ncols) = shape;
    let mut matrix = TriMat::new(shape);
    for (row, col, value) in triplets {
        ensure!(
            row < nrows && col < ncols,
            "Cell ({row}, {col}) is outside of the {nrows}x{ncols} matrix"
        );
        matrix.add_triplet(row, col, value);
    }
    Ok(matrix.to_csr())
}

/// Matrix without stored cells.
pub fn empty<V: Float>(shape: (usize, usize)) -> CsMat<V> {
    let matrix: TriMat<V> = TriMat::new(shape);
    matrix.to_csr()
}

/// Operations on sparse contact matrices used by the stripe caller. Cells that are not stored
/// read as zeros.
pub trait ContactMatrix<V>: Sized {
    fn is_square(&self) -> bool;

    /// Value of the cell, zero if the cell is not stored.
    fn value(&self, row: usize, col: usize) -> V;

    /// Stored cells as (row, col, value) in the row-major order.
    fn cells(&self) -> impl Iterator<Item = (usize, usize, V)> + '_;

    /// New matrix holding only the cells accepted by the predicate.
    fn retain(&self, keep: impl Fn(usize, usize, V) -> bool) -> Self;

    /// Largest stored value, NaNs are ignored.
    fn max_value(&self) -> Option<V>;

    /// Sum of each column. Values are accumulated in the row order.
    fn column_sums(&self) -> Vec<V>;

    /// Dense copy of the block [rows.start, rows.end) x [cols.start, cols.end).
    fn block(&self, rows: Range<usize>, cols: Range<usize>) -> Result<Array2<V>>;

    /// Full symmetric matrix built from the upper triangular part (diagonal included). Cells
    /// below the diagonal are ignored, the way cooler stores contact maps.
    fn mirror_upper(&self) -> Result<Self>;
}

impl<V: Float> ContactMatrix<V> for CsMat<V> {
    fn is_square(&self) -> bool {
        self.rows() == self.cols()
    }

    fn value(&self, row: usize, col: usize) -> V {
        self.get(row, col).copied().unwrap_or_else(V::zero)
    }

    fn cells(&self) -> impl Iterator<Item = (usize, usize, V)> + '_ {
        self.iter().map(|(value, (row, col))| (row, col, *value))
    }

    fn retain(&self, keep: impl Fn(usize, usize, V) -> bool) -> Self {
        let mut matrix = TriMat::with_capacity(self.shape(), self.nnz());
        for (row, col, value) in self.cells() {
            if keep(row, col, value) {
                matrix.add_triplet(row, col, value);
            }
        }
        matrix.to_csr()
    }

    fn max_value(&self) -> Option<V> {
        self.data()
            .iter()
            .copied()
            .filter(|x| !x.is_nan())
            .reduce(|acc, x| acc.max(x))
    }

    fn column_sums(&self) -> Vec<V> {
        let mut sums = vec![V::zero(); self.cols()];
        for (_, col, value) in self.cells() {
            sums[col] = sums[col] + value;
        }
        sums
    }

    fn block(&self, rows: Range<usize>, cols: Range<usize>) -> Result<Array2<V>> {
        ensure!(
            rows.start <= rows.end && rows.end <= self.rows(),
            "Rows {rows:?} are outside of the {}x{} matrix",
            self.rows(),
            self.cols()
        );
        ensure!(
            cols.start <= cols.end && cols.end <= self.cols(),
            "Columns {cols:?} are outside of the {}x{} matrix",
            self.rows(),
            self.cols()
        );

        let mut block = Array2::zeros((rows.len(), cols.len()));
        for (i, row) in rows.enumerate() {
            let Some(values) = self.outer_view(row) else {
                continue;
            };
            for (col, value) in values.iter() {
                if cols.contains(&col) {
                    block[[i, col - cols.start]] = *value;
                }
            }
        }
        Ok(block)
    }

    fn mirror_upper(&self) -> Result<Self> {
        ensure!(
            self.is_square(),
            "Only square matrices can be mirrored, got {}x{}",
            self.rows(),
            self.cols()
        );

        let upper = self.cells().filter(|(row, col, _)| row <= col);
        let lower = self
            .cells()
            .filter(|(row, col, _)| row < col)
            .map(|(row, col, value)| (col, row, value));
        from_triplets(self.shape(), upper.chain(lower))
    }
}
