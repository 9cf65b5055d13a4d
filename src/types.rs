//! Core shared types.
//!
//! Correspondences are stored row-wise in a [`DataMatrix`]: row `i` holds
//! `[xa, ya, xb, yb]`, the i-th point of set A followed by its partner in
//! set B. Row order is the correspondence order; inlier masks and every
//! per-correspondence output are aligned to it.

use nalgebra::{DMatrix, Point2};

/// Dynamic matrix of `f64` holding one correspondence per row.
pub type DataMatrix = DMatrix<f64>;

/// Number of columns of a correspondence [`DataMatrix`].
pub const DATA_COLUMNS: usize = 4;

/// Point of the first set (A) of correspondence `row`.
#[inline]
pub fn point_a(data: &DataMatrix, row: usize) -> Point2<f64> {
    Point2::new(data[(row, 0)], data[(row, 1)])
}

/// Point of the second set (B) of correspondence `row`.
#[inline]
pub fn point_b(data: &DataMatrix, row: usize) -> Point2<f64> {
    Point2::new(data[(row, 2)], data[(row, 3)])
}

/// Build a new data matrix containing only the rows flagged in `mask`, in
/// their original order.
pub fn compact_rows(data: &DataMatrix, mask: &[bool]) -> DataMatrix {
    let rows: Vec<usize> = mask
        .iter()
        .enumerate()
        .filter_map(|(i, &keep)| keep.then_some(i))
        .collect();
    data.select_rows(rows.iter())
}
