//! Row-major point storage shared (read-only) by every clustering strategy.

use crate::error::{Error, Result};

/// An immutable `n_points x n_features` matrix of `f32` coordinates.
///
/// Rows are stored contiguously, so `row(i)` is a plain slice.
#[derive(Clone, Debug, PartialEq)]
pub struct PointStore {
    data: Vec<f32>,
    n_features: usize,
}

impl PointStore {
    /// Build a store from a flat row-major buffer.
    ///
    /// `data.len()` must be a multiple of `n_features`. An empty buffer is a
    /// valid store with zero points.
    pub fn new(n_features: usize, data: Vec<f32>) -> Result<Self> {
        if n_features == 0 {
            return Err(Error::InvalidParameter {
                name: "n_features",
                message: "must be at least 1",
            });
        }
        if data.len() % n_features != 0 {
            let rows = data.len() / n_features;
            return Err(Error::DimensionMismatch {
                expected: (rows + 1) * n_features,
                found: data.len(),
            });
        }
        if let Some(pos) = data.iter().position(|x| !x.is_finite()) {
            return Err(Error::NonFinite {
                row: pos / n_features,
                col: pos % n_features,
            });
        }
        Ok(Self { data, n_features })
    }

    /// Build a store from one vector per point.
    ///
    /// An empty slice yields an empty single-feature store.
    pub fn from_rows(rows: &[Vec<f32>]) -> Result<Self> {
        let Some(first) = rows.first() else {
            return Ok(Self {
                data: Vec::new(),
                n_features: 1,
            });
        };

        let d = first.len();
        if d == 0 {
            return Err(Error::InvalidParameter {
                name: "n_features",
                message: "must be at least 1",
            });
        }
        let mut flat = Vec::with_capacity(rows.len() * d);
        for row in rows {
            if row.len() != d {
                return Err(Error::DimensionMismatch {
                    expected: d,
                    found: row.len(),
                });
            }
            flat.extend_from_slice(row);
        }
        Self::new(d, flat)
    }

    /// Copy the given rows (in order) into a new, smaller store.
    pub(crate) fn select(&self, ids: &[usize]) -> Self {
        let mut data = Vec::with_capacity(ids.len() * self.n_features);
        for &i in ids {
            data.extend_from_slice(self.row(i));
        }
        Self {
            data,
            n_features: self.n_features,
        }
    }

    /// Number of points.
    #[inline]
    pub fn len(&self) -> usize {
        self.data.len() / self.n_features
    }

    /// Whether the store holds no points.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Number of features per point.
    #[inline]
    pub fn n_features(&self) -> usize {
        self.n_features
    }

    /// Coordinates of point `i`.
    #[inline]
    pub fn row(&self, i: usize) -> &[f32] {
        &self.data[i * self.n_features..(i + 1) * self.n_features]
    }

    /// Iterate over all rows in index order.
    pub fn rows(&self) -> impl Iterator<Item = &[f32]> + '_ {
        self.data.chunks_exact(self.n_features)
    }

    /// The underlying row-major buffer.
    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    /// Per-axis `(min, max)` over all points. Empty for an empty store.
    pub(crate) fn bounds(&self) -> Vec<(f32, f32)> {
        if self.is_empty() {
            return Vec::new();
        }
        let mut bounds = vec![(f32::INFINITY, f32::NEG_INFINITY); self.n_features];
        for row in self.rows() {
            for (b, &x) in bounds.iter_mut().zip(row) {
                b.0 = b.0.min(x);
                b.1 = b.1.max(x);
            }
        }
        bounds
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_rows_flattens_in_order() {
        let store = PointStore::from_rows(&[vec![1.0, 2.0], vec![3.0, 4.0]]).unwrap();
        assert_eq!(store.len(), 2);
        assert_eq!(store.n_features(), 2);
        assert_eq!(store.row(1), &[3.0, 4.0]);
        assert_eq!(store.as_slice(), &[1.0, 2.0, 3.0, 4.0]);
    }

    #[test]
    fn ragged_rows_are_rejected() {
        let err = PointStore::from_rows(&[vec![1.0, 2.0], vec![3.0]]).unwrap_err();
        assert!(matches!(
            err,
            Error::DimensionMismatch {
                expected: 2,
                found: 1
            }
        ));
    }

    #[test]
    fn partial_row_buffer_is_rejected() {
        assert!(PointStore::new(3, vec![0.0; 7]).is_err());
        assert!(PointStore::new(0, vec![]).is_err());
    }

    #[test]
    fn non_finite_values_are_rejected() {
        let err = PointStore::new(2, vec![0.0, 1.0, f32::NAN, 2.0]).unwrap_err();
        assert!(matches!(err, Error::NonFinite { row: 1, col: 0 }));
    }

    #[test]
    fn empty_store() {
        let store = PointStore::from_rows(&[]).unwrap();
        assert!(store.is_empty());
        assert_eq!(store.len(), 0);
        assert!(store.bounds().is_empty());
    }

    #[test]
    fn bounds_per_axis() {
        let store =
            PointStore::from_rows(&[vec![1.0, -2.0], vec![-3.0, 4.0], vec![0.0, 0.0]]).unwrap();
        assert_eq!(store.bounds(), vec![(-3.0, 1.0), (-2.0, 4.0)]);
    }
}
