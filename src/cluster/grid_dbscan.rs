//! Exact grid-indexed DBSCAN for 2D points.
//!
//! The grid has cell width `eps / sqrt(2)`, so every point within `eps` of a
//! point lies in the 21-cell stencil around its cell. The fit runs in four
//! passes over a [`GridFit`]:
//!
//! 1. **Core points.** A cell holding more than `min_pts` points is all core
//!    (its points are pairwise within `eps`). Otherwise each point counts
//!    stencil points within `eps`, itself included, until the count exceeds
//!    `min_pts`.
//! 2. **Merging.** Union-Find over cells. For every stencil neighbor of a cell
//!    holding core points, the first core pair within `eps` found between the
//!    two cells joins them. Neighbors already in the same set are skipped.
//! 3. **Projection.** Cells whose set grew take the set root as label for all
//!    their points. Singleton cells take their own id if they hold a core
//!    point and are noise otherwise.
//! 4. **Border points.** Points still noise take the label of the nearest
//!    core point within `eps` in their stencil.
//!
//! Core points and noise match the brute-force reference exactly. A border
//! point within `eps` of two clusters may land in either.

use super::dbscan::{Label, Labels, NOISE};
use super::grid::GridIndex;
use super::util::{squared_euclidean, UnionFind};
use crate::error::{Error, Result};
use crate::points::PointStore;

pub(crate) fn fit(points: &PointStore, eps: f32, min_pts: usize) -> Result<Labels> {
    let n = points.len();
    if n == 0 {
        return Ok(Vec::new());
    }
    if points.n_features() != 2 {
        return Err(Error::UnsupportedDimension {
            expected: 2,
            found: points.n_features(),
        });
    }

    let grid = GridIndex::build(points, eps)?;
    if !grid.is_planar() {
        return Err(Error::InvalidParameter {
            name: "epsilon",
            message: "too small for the extent of the data",
        });
    }

    let mut fit = GridFit::new(points, grid, eps * eps, min_pts);
    fit.classify_cores();
    fit.merge_cells();
    fit.project_labels();
    fit.resolve_borders();
    Ok(fit.labels)
}

/// State of one grid fit. Nothing outlives the call to [`fit`].
pub(crate) struct GridFit<'a> {
    points: &'a PointStore,
    grid: GridIndex,
    eps_sqr: f32,
    min_pts: usize,
    is_core: Vec<bool>,
    uf: UnionFind,
    labels: Labels,
}

impl<'a> GridFit<'a> {
    pub(crate) fn new(points: &'a PointStore, grid: GridIndex, eps_sqr: f32, min_pts: usize) -> Self {
        let n = points.len();
        let n_cells = grid.n_cells();
        Self {
            points,
            grid,
            eps_sqr,
            min_pts,
            is_core: vec![false; n],
            uf: UnionFind::new(n_cells),
            labels: vec![NOISE; n],
        }
    }

    /// Neighbor-scan core test: more than `min_pts` stencil points (the point
    /// itself included) strictly within `eps`.
    pub(crate) fn is_core_by_scan(&self, point: usize) -> bool {
        let p = self.points.row(point);
        let mut count = 0usize;
        for id in self.grid.stencil(self.grid.cell_of(point)) {
            for &q in self.grid.cell(id).points() {
                if squared_euclidean(p, self.points.row(q)) < self.eps_sqr {
                    count += 1;
                    if count > self.min_pts {
                        return true;
                    }
                }
            }
        }
        false
    }

    pub(crate) fn classify_cores(&mut self) {
        let mut is_core = vec![false; self.points.len()];
        for cell in self.grid.cells() {
            if cell.len() > self.min_pts {
                for &p in cell.points() {
                    is_core[p] = true;
                }
            } else {
                for &p in cell.points() {
                    is_core[p] = self.is_core_by_scan(p);
                }
            }
        }
        self.is_core = is_core;

        tracing::debug!(
            n_core = self.is_core.iter().filter(|&&c| c).count(),
            n_points = self.points.len(),
            "core points classified"
        );
    }

    /// Whether some core point of cell `a` lies within `eps` of a core point of cell `b`.
    fn cells_linked(&self, a: usize, b: usize) -> bool {
        let (a, b) = (self.grid.cell(a), self.grid.cell(b));
        a.points().iter().filter(|&&p| self.is_core[p]).any(|&p| {
            let x = self.points.row(p);
            b.points().iter().any(|&q| {
                self.is_core[q] && squared_euclidean(x, self.points.row(q)) < self.eps_sqr
            })
        })
    }

    fn merge_cells(&mut self) {
        for id in 0..self.grid.n_cells() {
            if !self.grid.cell(id).points().iter().any(|&p| self.is_core[p]) {
                continue;
            }
            for other in self.grid.stencil(id) {
                if self.uf.find(other) == self.uf.find(id) {
                    continue;
                }
                if self.cells_linked(id, other) {
                    self.uf.union(other, id);
                }
            }
        }

        tracing::debug!(
            n_cells = self.grid.n_cells(),
            n_sets = self.uf.count(),
            "cells merged"
        );
    }

    fn project_labels(&mut self) {
        for id in 0..self.grid.n_cells() {
            let root = self.uf.find(id);
            let cell = self.grid.cell(id);
            let merged = self.uf.set_size(root) > 1;
            let label = if merged || cell.points().iter().any(|&p| self.is_core[p]) {
                root as Label
            } else {
                NOISE
            };
            for &p in cell.points() {
                self.labels[p] = label;
            }
        }
    }

    /// Nearest core point strictly within `eps` of `point`, searched over the stencil.
    fn nearest_core(&self, point: usize) -> Option<usize> {
        let p = self.points.row(point);
        let mut best = self.eps_sqr;
        let mut nearest = None;
        for id in self.grid.stencil(self.grid.cell_of(point)) {
            for &q in self.grid.cell(id).points() {
                if !self.is_core[q] {
                    continue;
                }
                let d = squared_euclidean(p, self.points.row(q));
                if d < best {
                    best = d;
                    nearest = Some(q);
                }
            }
        }
        nearest
    }

    fn resolve_borders(&mut self) {
        for p in 0..self.labels.len() {
            if self.labels[p] != NOISE {
                continue;
            }
            if let Some(q) = self.nearest_core(p) {
                self.labels[p] = self.labels[q];
            }
        }

        tracing::debug!(
            n_noise = self.labels.iter().filter(|&&l| l == NOISE).count(),
            "border points resolved"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cluster::dbscan::fit_distance_matrix;
    use crate::cluster::labels::partition_agreement;

    fn store(rows: &[[f32; 2]]) -> PointStore {
        let rows: Vec<Vec<f32>> = rows.iter().map(|r| r.to_vec()).collect();
        PointStore::from_rows(&rows).unwrap()
    }

    /// Deterministic pseudo-random square blob around `center`.
    fn blob(center: [f32; 2], n: usize, spread: f32, salt: usize) -> Vec<[f32; 2]> {
        (0..n)
            .map(|i| {
                let a = ((i * 37 + salt * 11) % 101) as f32 / 101.0 - 0.5;
                let b = ((i * 53 + salt * 7) % 97) as f32 / 97.0 - 0.5;
                [center[0] + a * spread, center[1] + b * spread]
            })
            .collect()
    }

    #[test]
    fn rejects_non_planar_input() {
        let points = PointStore::new(3, vec![0.0; 9]).unwrap();
        let err = fit(&points, 0.5, 2).unwrap_err();
        assert!(matches!(
            err,
            Error::UnsupportedDimension {
                expected: 2,
                found: 3
            }
        ));
    }

    #[test]
    fn empty_and_single_point() {
        let empty = PointStore::from_rows(&[]).unwrap();
        assert!(fit(&empty, 0.5, 2).unwrap().is_empty());

        let one = store(&[[3.0, 4.0]]);
        assert_eq!(fit(&one, 0.5, 1).unwrap(), vec![NOISE]);
    }

    #[test]
    fn isolated_outlier_stays_noise() {
        let mut rows = blob([0.0, 0.0], 40, 0.4, 1);
        rows.push([5.0, 5.0]);
        let points = store(&rows);
        let labels = fit(&points, 0.3, 4).unwrap();
        assert_eq!(labels[40], NOISE);
        assert!(labels[..40].iter().all(|&l| l == labels[0] && l != NOISE));
    }

    #[test]
    fn matches_reference_on_separated_blobs() {
        let mut rows = blob([0.0, 0.0], 60, 0.5, 1);
        rows.extend(blob([3.0, 0.5], 60, 0.5, 2));
        rows.extend(blob([1.0, 4.0], 60, 0.5, 3));
        rows.push([8.0, 8.0]);
        let points = store(&rows);

        let grid = fit(&points, 0.3, 4).unwrap();
        let brute = fit_distance_matrix(&points, 0.3 * 0.3, 4);
        assert_eq!(partition_agreement(&grid, &brute), 1.0);
    }

    #[test]
    fn refit_is_identical() {
        let mut rows = blob([0.0, 0.0], 50, 1.0, 4);
        rows.extend(blob([2.5, 2.5], 50, 1.0, 5));
        let points = store(&rows);
        let first = fit(&points, 0.25, 3).unwrap();
        let second = fit(&points, 0.25, 3).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn dense_cell_cores_pass_the_scan() {
        let mut rows = blob([0.0, 0.0], 80, 0.5, 6);
        rows.extend(blob([1.2, 0.3], 30, 1.5, 7));
        let points = store(&rows);

        let min_pts = 3;
        let grid = GridIndex::build(&points, 0.2).unwrap();
        let mut fit = GridFit::new(&points, grid, 0.2 * 0.2, min_pts);
        fit.classify_cores();

        let mut dense = 0;
        for cell in fit.grid.cells() {
            if cell.len() > min_pts {
                for &p in cell.points() {
                    dense += 1;
                    assert!(fit.is_core[p]);
                    assert!(fit.is_core_by_scan(p), "point {p} core only by cell size");
                }
            }
        }
        assert!(dense > 0);
    }

    #[test]
    fn border_point_takes_nearest_core_label() {
        // Two chains of core points; the middle point sees one core of each
        // and is slightly closer to the right chain.
        let mut rows = Vec::new();
        for i in 0..8 {
            rows.push([-0.84 + i as f32 * 0.12, 0.0]);
        }
        for i in 0..8 {
            rows.push([0.9 + i as f32 * 0.12, 0.0]);
        }
        rows.push([0.46, 0.0]);
        let points = store(&rows);

        let labels = fit(&points, 0.5, 4).unwrap();
        assert!(labels[..8].iter().all(|&l| l == labels[0]));
        assert!(labels[8..16].iter().all(|&l| l == labels[8]));
        assert_ne!(labels[0], labels[8]);
        assert_eq!(labels[16], labels[8]);
    }
}
