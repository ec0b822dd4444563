//! Uniform grid over the input points.
//!
//! The cell width is `eps / sqrt(D)`, so the diagonal of a cell is exactly
//! `eps`: any two points sharing a cell are neighbors. Cell coordinates start
//! at 1 on every axis; index 0 is a guard band so that stencil arithmetic never
//! produces a negative coordinate for an occupied cell.
//!
//! For 2D inputs cells also have a scalar *planar key*
//! `dx * (n_cols + 1) + dy`, and [`GridIndex::stencil`] walks the fixed
//! 21-cell neighborhood of a cell.

use std::collections::HashMap;

use crate::error::{Error, Result};
use crate::points::PointStore;

/// Cell indices stay below this, so `floor` is exact in `f64` and stencil
/// offsets cannot overflow.
const MAX_CELL: f64 = (1u64 << 52) as f64;

/// `floor((x - lo) / width) + 1`, computed in `f64`.
fn cell_index(x: f32, lo: f32, width: f64) -> Result<i64> {
    let cell = ((f64::from(x) - f64::from(lo)) / width).floor();
    if !(0.0..MAX_CELL).contains(&cell) {
        return Err(Error::InvalidParameter {
            name: "epsilon",
            message: "too small for the extent of the data",
        });
    }
    Ok(cell as i64 + 1)
}

/// Neighborhood visited around a planar cell, as `(row, col)` offsets in visit
/// order: a 5x5 block without its four corners.
///
/// In planar key space the walk starts at `key - 2 * stride - 1` and steps by
/// one, jumping to the next row after the 3rd, 8th, 13th and 18th visit.
/// Offsets are applied to coordinates, not keys, so the walk never wraps
/// across a row on narrow grids.
pub const STENCIL: [(i64, i64); 21] = [
    (-2, -1),
    (-2, 0),
    (-2, 1),
    (-1, -2),
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (-1, 2),
    (0, -2),
    (0, -1),
    (0, 0),
    (0, 1),
    (0, 2),
    (1, -2),
    (1, -1),
    (1, 0),
    (1, 1),
    (1, 2),
    (2, -1),
    (2, 0),
    (2, 1),
];

/// One occupied grid cell.
#[derive(Clone, Debug)]
pub struct Cell {
    coords: Box<[i64]>,
    points: Vec<usize>,
}

impl Cell {
    /// Cell coordinates, one per axis, each `>= 1`.
    pub fn coords(&self) -> &[i64] {
        &self.coords
    }

    /// Indices of the points in this cell, in ascending order.
    pub fn points(&self) -> &[usize] {
        &self.points
    }

    /// Number of points in this cell.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Always false: only occupied cells are stored.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Sparse uniform grid: occupied cells in first-seen order plus a coordinate
/// lookup table.
#[derive(Clone, Debug)]
pub struct GridIndex {
    cell_width: f64,
    origin: Vec<f32>,
    extents: Vec<i64>,
    cells: Vec<Cell>,
    lookup: HashMap<Box<[i64]>, usize>,
    point_cell: Vec<usize>,
    planar_stride: Option<i64>,
}

impl GridIndex {
    /// Bucket every point of `points` into cells of width `eps / sqrt(D)`.
    ///
    /// `eps` must be positive; callers validate it. Fails when a cell index
    /// along some axis would exceed `2^52`.
    pub fn build(points: &PointStore, eps: f32) -> Result<Self> {
        let dim = points.n_features();
        let cell_width = f64::from(eps) / (dim as f64).sqrt();
        let bounds = points.bounds();

        let origin: Vec<f32> = bounds.iter().map(|b| b.0).collect();
        let extents = bounds
            .iter()
            .map(|&(lo, hi)| cell_index(hi, lo, cell_width))
            .collect::<Result<Vec<i64>>>()?;

        let mut cells: Vec<Cell> = Vec::new();
        let mut lookup: HashMap<Box<[i64]>, usize> = HashMap::new();
        let mut point_cell = Vec::with_capacity(points.len());

        for (i, row) in points.rows().enumerate() {
            let coords = row
                .iter()
                .zip(&origin)
                .map(|(&x, &lo)| cell_index(x, lo, cell_width))
                .collect::<Result<Box<[i64]>>>()?;

            let idx = match lookup.get(&coords) {
                Some(&idx) => idx,
                None => {
                    let idx = cells.len();
                    cells.push(Cell {
                        coords: coords.clone(),
                        points: Vec::new(),
                    });
                    lookup.insert(coords, idx);
                    idx
                }
            };
            cells[idx].points.push(i);
            point_cell.push(idx);
        }

        // The stencil reaches two rows past the last one; make sure every key
        // it can produce fits in an i64.
        let planar_stride = match extents.as_slice() {
            [rows, cols] => {
                let stride = cols.checked_add(1);
                stride.filter(|s| rows.checked_add(3).and_then(|r| r.checked_mul(*s)).is_some())
            }
            _ => None,
        };

        tracing::debug!(
            n_points = points.len(),
            n_cells = cells.len(),
            cell_width,
            ?extents,
            "grid built"
        );

        Ok(Self {
            cell_width,
            origin,
            extents,
            cells,
            lookup,
            point_cell,
            planar_stride,
        })
    }

    /// Width of a cell along every axis.
    pub fn cell_width(&self) -> f64 {
        self.cell_width
    }

    /// Per-axis minimum coordinate of the input.
    pub fn origin(&self) -> &[f32] {
        &self.origin
    }

    /// Number of cells spanned by the data along each axis (guard band excluded).
    pub fn extents(&self) -> &[i64] {
        &self.extents
    }

    /// Number of occupied cells.
    pub fn n_cells(&self) -> usize {
        self.cells.len()
    }

    /// Occupied cells in first-seen order; a cell's position is its id.
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Cell by id.
    pub fn cell(&self, id: usize) -> &Cell {
        &self.cells[id]
    }

    /// Id of the cell holding point `point`.
    pub fn cell_of(&self, point: usize) -> usize {
        self.point_cell[point]
    }

    /// Id of the occupied cell at `coords`, if any.
    pub fn find(&self, coords: &[i64]) -> Option<usize> {
        self.lookup.get(coords).copied()
    }

    /// Whether planar keys and [`stencil`](Self::stencil) are available:
    /// the input is 2D and the grid is small enough for `i64` keys.
    pub fn is_planar(&self) -> bool {
        self.planar_stride.is_some()
    }

    /// Scalar key `dx * (n_cols + 1) + dy` of a cell. `None` unless planar.
    pub fn planar_key(&self, id: usize) -> Option<i64> {
        let stride = self.planar_stride?;
        let c = &self.cells[id].coords;
        Some(c[0] * stride + c[1])
    }

    /// Occupied cells of the 21-cell neighborhood of cell `id`, in
    /// [`STENCIL`] order. The cell itself is included (11th position).
    ///
    /// Yields nothing for non-planar grids.
    pub fn stencil(&self, id: usize) -> impl Iterator<Item = usize> + '_ {
        let center = self.is_planar().then(|| &self.cells[id].coords);
        STENCIL.iter().filter_map(move |&(row, col)| {
            let c = center?;
            let coords = [c[0] + row, c[1] + col];
            self.lookup.get(&coords[..]).copied()
        })
    }
}
