//! Weight matrix representations.
//!
//! A partition stores its in-partition weights in a square matrix over
//! elements. Rows are target elements (slots), columns are source elements
//! (gates). Both representations share that convention, so a read of
//! `(row, col)` means the same edge whichever one backs the partition.
//!
//! # Example
//!
//! ```
//! use nodenet::matrix::{DenseMatrix, SparseMatrix, WeightMatrix};
//!
//! let mut dense = DenseMatrix::new(4);
//! dense.write(3, 1, -0.42).unwrap();
//!
//! let sparse = SparseMatrix::from_dense(&dense);
//! assert_eq!(dense.read(3, 1).unwrap(), sparse.read(3, 1).unwrap());
//! assert_eq!(sparse.read(1, 3).unwrap(), 0.0);
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::{LinkError, LinkResult};
use crate::types::{ElementIndex, Weight};

/// Uniform element access over a square weight matrix.
pub trait WeightMatrix {
    /// Number of rows (and columns).
    fn dim(&self) -> usize;

    /// Reads the weight at `(row, col)`.
    fn read(&self, row: ElementIndex, col: ElementIndex) -> LinkResult<Weight>;

    /// Writes the weight at `(row, col)`.
    fn write(&mut self, row: ElementIndex, col: ElementIndex, weight: Weight) -> LinkResult<()>;

    /// Returns all non-zero entries as `(row, col, weight)`, row-major.
    fn entries(&self) -> Vec<(ElementIndex, ElementIndex, Weight)>;

    /// Zeroes the row and the column of `element`. Out-of-range elements are ignored.
    fn clear_element(&mut self, element: ElementIndex);

    /// Fails with `ElementOutOfRange` if `(row, col)` lies outside the matrix.
    fn check_bounds(&self, row: ElementIndex, col: ElementIndex) -> LinkResult<()> {
        let dim = self.dim();
        if row >= dim || col >= dim {
            return Err(LinkError::ElementOutOfRange { row, col, dim });
        }
        Ok(())
    }
}

/// Full row-major storage, O(1) indexed access.
#[derive(Clone, Debug, PartialEq)]
pub struct DenseMatrix {
    dim: usize,
    values: Vec<Weight>,
}

impl DenseMatrix {
    /// Creates a zero-filled `dim x dim` matrix.
    pub fn new(dim: usize) -> Self {
        Self {
            dim,
            values: vec![0.0; dim * dim],
        }
    }

    /// Builds a dense copy of a sparse matrix.
    pub fn from_sparse(sparse: &SparseMatrix) -> Self {
        let mut dense = Self::new(sparse.dim);
        for (&(row, col), &weight) in &sparse.entries {
            dense.values[row * dense.dim + col] = weight;
        }
        dense
    }

    /// Returns one row (all source elements feeding `row`).
    pub fn row(&self, row: ElementIndex) -> Option<&[Weight]> {
        if row >= self.dim {
            return None;
        }
        Some(&self.values[row * self.dim..(row + 1) * self.dim])
    }
}

impl WeightMatrix for DenseMatrix {
    fn dim(&self) -> usize {
        self.dim
    }

    fn read(&self, row: ElementIndex, col: ElementIndex) -> LinkResult<Weight> {
        self.check_bounds(row, col)?;
        Ok(self.values[row * self.dim + col])
    }

    fn write(&mut self, row: ElementIndex, col: ElementIndex, weight: Weight) -> LinkResult<()> {
        self.check_bounds(row, col)?;
        self.values[row * self.dim + col] = weight;
        Ok(())
    }

    fn entries(&self) -> Vec<(ElementIndex, ElementIndex, Weight)> {
        self.values
            .iter()
            .enumerate()
            .filter(|(_, w)| **w != 0.0)
            .map(|(i, w)| (i / self.dim, i % self.dim, *w))
            .collect()
    }

    fn clear_element(&mut self, element: ElementIndex) {
        if element >= self.dim {
            return;
        }
        self.values[element * self.dim..(element + 1) * self.dim].fill(0.0);
        for row in 0..self.dim {
            self.values[row * self.dim + element] = 0.0;
        }
    }
}

/// Storage that records only non-zero entries.
///
/// Entries are kept ordered by `(row, col)`; reads of unrecorded positions
/// inside the bounds return `0.0`, exactly like the dense case.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SparseMatrix {
    dim: usize,
    entries: BTreeMap<(ElementIndex, ElementIndex), Weight>,
}

impl SparseMatrix {
    /// Creates an empty `dim x dim` matrix.
    pub fn new(dim: usize) -> Self {
        Self {
            dim,
            entries: BTreeMap::new(),
        }
    }

    /// Builds a sparse copy of a dense matrix.
    pub fn from_dense(dense: &DenseMatrix) -> Self {
        let mut sparse = Self::new(dense.dim);
        for (row, col, weight) in dense.entries() {
            sparse.entries.insert((row, col), weight);
        }
        sparse
    }

    /// Number of stored (non-zero) entries.
    pub fn nnz(&self) -> usize {
        self.entries.len()
    }
}

impl WeightMatrix for SparseMatrix {
    fn dim(&self) -> usize {
        self.dim
    }

    fn read(&self, row: ElementIndex, col: ElementIndex) -> LinkResult<Weight> {
        self.check_bounds(row, col)?;
        Ok(self.entries.get(&(row, col)).copied().unwrap_or(0.0))
    }

    fn write(&mut self, row: ElementIndex, col: ElementIndex, weight: Weight) -> LinkResult<()> {
        self.check_bounds(row, col)?;
        if weight == 0.0 {
            self.entries.remove(&(row, col));
        } else {
            self.entries.insert((row, col), weight);
        }
        Ok(())
    }

    fn entries(&self) -> Vec<(ElementIndex, ElementIndex, Weight)> {
        self.entries
            .iter()
            .map(|(&(row, col), &weight)| (row, col, weight))
            .collect()
    }

    fn clear_element(&mut self, element: ElementIndex) {
        self.entries
            .retain(|&(row, col), _| row != element && col != element);
    }
}

/// Storage format of a partition.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum MatrixFormat {
    #[default]
    Dense,
    Sparse,
}

/// The matrix a partition owns, in one of the two formats.
#[derive(Clone, Debug, PartialEq)]
pub enum WeightStorage {
    Dense(DenseMatrix),
    Sparse(SparseMatrix),
}

impl WeightStorage {
    /// Creates empty storage of the given format.
    pub fn new(format: MatrixFormat, dim: usize) -> Self {
        match format {
            MatrixFormat::Dense => WeightStorage::Dense(DenseMatrix::new(dim)),
            MatrixFormat::Sparse => WeightStorage::Sparse(SparseMatrix::new(dim)),
        }
    }

    /// Returns the storage format.
    pub fn format(&self) -> MatrixFormat {
        match self {
            WeightStorage::Dense(_) => MatrixFormat::Dense,
            WeightStorage::Sparse(_) => MatrixFormat::Sparse,
        }
    }

    /// The single dispatch point from format to matrix interface.
    pub fn as_matrix(&self) -> &dyn WeightMatrix {
        match self {
            WeightStorage::Dense(m) => m,
            WeightStorage::Sparse(m) => m,
        }
    }

    /// Mutable counterpart of [`as_matrix`](Self::as_matrix).
    pub fn as_matrix_mut(&mut self) -> &mut dyn WeightMatrix {
        match self {
            WeightStorage::Dense(m) => m,
            WeightStorage::Sparse(m) => m,
        }
    }

    /// Converts to the given format, keeping every weight.
    pub fn converted(&self, format: MatrixFormat) -> Self {
        match (self, format) {
            (WeightStorage::Dense(m), MatrixFormat::Sparse) => {
                WeightStorage::Sparse(SparseMatrix::from_dense(m))
            }
            (WeightStorage::Sparse(m), MatrixFormat::Dense) => {
                WeightStorage::Dense(DenseMatrix::from_sparse(m))
            }
            _ => self.clone(),
        }
    }
}
