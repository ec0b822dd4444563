//! Random-projection bucket assignment used by the approximate strategy.
//!
//! Each hash table projects points onto [`DOUT`] random unit directions,
//! quantizes every projected coordinate relative to a reference point into a
//! 16-bit cell index, and packs the [`DOUT`] indices into one [`BucketKey`].
//! Points sharing a key share a bucket.
//!
//! The computation is a pure function of its inputs, so it can run anywhere.
//! [`Projector`] is the seam for that: [`CpuProjector`] is the in-process
//! loop, and an accelerator binding only has to return the same keys.

use rand::prelude::*;

use super::util::{dot, normalize_in_place};
use crate::error::{Error, Result};
use crate::points::PointStore;

/// Projected dimensions per table. Eight 16-bit cells fill a [`BucketKey`].
pub const DOUT: usize = 8;

/// Default number of independent tables built per iteration.
pub const REDUNDANT: usize = 2;

/// Packed bucket coordinates: `DOUT` 16-bit cells, cell `j` in bits `16j..16j+16`.
pub type BucketKey = u128;

/// Projection directions and reference point of one hash table.
#[derive(Clone, Debug, PartialEq)]
pub struct ProjectionTable {
    /// `DOUT x dim`, row-major, each row unit length.
    directions: Vec<f32>,
    reference: Vec<f32>,
}

impl ProjectionTable {
    /// Build a table from explicit directions (`DOUT` rows of `dim` values,
    /// row-major) and a reference point of length `dim`.
    ///
    /// Rows are normalized to unit length.
    pub fn new(mut directions: Vec<f32>, reference: Vec<f32>) -> Result<Self> {
        let dim = reference.len();
        if dim == 0 {
            return Err(Error::InvalidParameter {
                name: "reference",
                message: "must have at least one coordinate",
            });
        }
        if directions.len() != DOUT * dim {
            return Err(Error::DimensionMismatch {
                expected: DOUT * dim,
                found: directions.len(),
            });
        }
        for row in directions.chunks_exact_mut(dim) {
            normalize_in_place(row);
        }
        Ok(Self {
            directions,
            reference,
        })
    }

    /// Fresh uniform random directions and a reference point drawn from `points`.
    ///
    /// `points` must not be empty.
    pub fn random<R: Rng>(points: &PointStore, rng: &mut R) -> Self {
        let dim = points.n_features();
        let mut directions = Vec::with_capacity(DOUT * dim);
        for _ in 0..DOUT * dim {
            // Uniform in [-1, 1].
            directions.push(rng.random::<f32>() * 2.0 - 1.0);
        }
        for row in directions.chunks_exact_mut(dim) {
            normalize_in_place(row);
        }
        let reference = points.row(rng.random_range(0..points.len())).to_vec();
        Self {
            directions,
            reference,
        }
    }

    /// Same directions, new reference point drawn from `points`.
    ///
    /// `points` must not be empty.
    pub fn reanchored<R: Rng>(&self, points: &PointStore, rng: &mut R) -> Self {
        Self {
            directions: self.directions.clone(),
            reference: points.row(rng.random_range(0..points.len())).to_vec(),
        }
    }

    /// Dimensionality of the input space.
    pub fn dim(&self) -> usize {
        self.reference.len()
    }

    /// Projection direction `j` (`j < DOUT`).
    pub fn direction(&self, j: usize) -> &[f32] {
        let dim = self.dim();
        &self.directions[j * dim..(j + 1) * dim]
    }

    /// Reference point in the input space.
    pub fn reference(&self) -> &[f32] {
        &self.reference
    }

    /// Coordinates of `x` along the `DOUT` directions.
    pub fn project(&self, x: &[f32]) -> [f32; DOUT] {
        let mut out = [0.0f32; DOUT];
        for (j, o) in out.iter_mut().enumerate() {
            *o = dot(x, self.direction(j));
        }
        out
    }
}

/// 16-bit cell index of a projected coordinate: `floor((value - min) / width) + 1`,
/// computed in `f64` and saturated to the `i16` range.
#[inline]
pub fn quantize(value: f32, min: f32, width: f32) -> i16 {
    let cell = ((f64::from(value) - f64::from(min)) / f64::from(width)).floor() + 1.0;
    cell.clamp(f64::from(i16::MIN), f64::from(i16::MAX)) as i16
}

/// Pack `DOUT` cell indices into a bucket key.
#[inline]
pub fn pack(cells: &[i16; DOUT]) -> BucketKey {
    cells
        .iter()
        .enumerate()
        .fold(0, |key, (j, &c)| key | (BucketKey::from(c as u16) << (16 * j)))
}

/// Maps points to one bucket key per table.
///
/// Implementations must be deterministic: identical inputs give identical
/// keys. Any error aborts the fit that issued the call.
pub trait Projector {
    /// Returns one vector per table, each holding one key per point of
    /// `points` (in point order).
    fn project(
        &self,
        points: &PointStore,
        tables: &[ProjectionTable],
        cell_width: f32,
    ) -> Result<Vec<Vec<BucketKey>>>;
}

/// In-process projector: a plain loop over points and tables.
#[derive(Clone, Copy, Debug, Default)]
pub struct CpuProjector;

impl Projector for CpuProjector {
    fn project(
        &self,
        points: &PointStore,
        tables: &[ProjectionTable],
        cell_width: f32,
    ) -> Result<Vec<Vec<BucketKey>>> {
        let mut keys: Vec<Vec<BucketKey>> = Vec::with_capacity(tables.len());
        for table in tables {
            if table.dim() != points.n_features() {
                return Err(Error::DimensionMismatch {
                    expected: points.n_features(),
                    found: table.dim(),
                });
            }
            let mins = table.project(table.reference());
            let mut out = Vec::with_capacity(points.len());
            for row in points.rows() {
                let projected = table.project(row);
                let mut cells = [0i16; DOUT];
                for ((c, &p), &m) in cells.iter_mut().zip(&projected).zip(&mins) {
                    *c = quantize(p, m, cell_width);
                }
                out.push(pack(&cells));
            }
            keys.push(out);
        }
        Ok(keys)
    }
}
