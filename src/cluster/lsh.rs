//! Approximate DBSCAN over redundant random-projection hash tables.
//!
//! When cells hold far more than `min_pts` points, exact neighbor scans
//! dominate the cost of the grid method. This strategy bounds the work:
//!
//! 1. **Subsampling.** The grid is built as for the exact method (any
//!    dimension). Cells with more than `min_pts` points are all core. Cells with
//!    more than `cell_cap_factor * min_pts` points keep only that many members,
//!    picked after a shuffle. The kept points form the *reduced* set.
//! 2. **Hashing.** Every iteration draws one fresh set of projection
//!    directions and a reference point per [`ProjectionTable`], then asks the
//!    [`Projector`] for bucket keys of all reduced points. Bucket members are
//!    shuffled.
//! 3. **Core evidence.** A reduced point that is not yet core records distinct
//!    bucket-mates within `eps` in a small window; filling the window makes it
//!    core.
//! 4. **Merging.** Union-Find over reduced points. Each core point joins the
//!    first core bucket-mate within `eps`, once per table.
//! 5. **Labels.** As in the grid method, over point sets instead of cells.
//!    Dropped points take the label of their cell.
//! 6. **Border points.** Points left as noise adopt the label of the closest
//!    core bucket-mate within `eps`, over a few more iterations.
//!
//! Buckets only stand in for neighborhoods; distances are always checked, so
//! the method can miss links but never invents one.

use std::collections::HashMap;

use rand::prelude::*;

use super::dbscan::{Label, Labels, NOISE};
use super::grid::GridIndex;
use super::projection::{BucketKey, ProjectionTable, Projector, DOUT, REDUNDANT};
use super::util::{squared_euclidean, UnionFind};
use crate::error::{Error, Result};
use crate::points::PointStore;

/// Parameters of the approximate strategy.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LshParams {
    /// Hash / core / merge rounds.
    pub merge_iterations: usize,

    /// Extra hash rounds spent on border points after labeling.
    pub border_iterations: usize,

    /// Cells keep at most `cell_cap_factor * min_pts` points.
    pub cell_cap_factor: usize,

    /// Hash tables per round. They share directions and differ in reference point.
    pub tables: usize,

    /// Distinct neighbors within `eps` a point must collect in one round to
    /// become core.
    pub core_window: usize,

    /// Optional RNG seed for reproducibility.
    pub seed: Option<u64>,
}

impl Default for LshParams {
    fn default() -> Self {
        Self {
            merge_iterations: 20,
            border_iterations: 5,
            cell_cap_factor: 3,
            tables: REDUNDANT,
            core_window: DOUT,
            seed: None,
        }
    }
}

impl LshParams {
    fn validate(&self) -> Result<()> {
        let checks = [
            (self.merge_iterations, "merge_iterations"),
            (self.cell_cap_factor, "cell_cap_factor"),
            (self.tables, "tables"),
            (self.core_window, "core_window"),
        ];
        for (value, name) in checks {
            if value == 0 {
                return Err(Error::InvalidParameter {
                    name,
                    message: "must be at least 1",
                });
            }
        }
        Ok(())
    }
}

pub(crate) fn fit(
    points: &PointStore,
    eps: f32,
    min_pts: usize,
    params: &LshParams,
    projector: &dyn Projector,
) -> Result<Labels> {
    params.validate()?;
    if points.is_empty() {
        return Ok(Vec::new());
    }

    let rng = match params.seed {
        Some(s) => StdRng::seed_from_u64(s),
        None => StdRng::from_rng(&mut rand::rng()),
    };
    let grid = GridIndex::build(points, eps)?;
    let mut fit = LshFit::new(points, grid, eps, min_pts, params, rng);

    for iter in 0..params.merge_iterations {
        fit.rehash(projector)?;
        let promoted = fit.promote_cores();
        let merged = fit.merge_buckets();
        tracing::trace!(iter, promoted, merged, n_sets = fit.uf.count(), "lsh round");
    }

    fit.emit_labels();
    tracing::debug!(
        n_sets = fit.uf.count(),
        n_noise = fit.border.len(),
        "lsh labels emitted"
    );

    fit.resolve_borders();
    for _ in 0..params.border_iterations {
        fit.rehash(projector)?;
        fit.resolve_borders();
    }

    tracing::debug!(
        n_noise = fit.labels.iter().filter(|&&l| l == NOISE).count(),
        "lsh border points resolved"
    );
    Ok(fit.labels)
}

/// Kept subset of the input and its mapping to original ids.
#[derive(Debug)]
struct ReducedIndex {
    to_origin: Vec<usize>,
    from_origin: Vec<Option<usize>>,
}

impl ReducedIndex {
    fn subsample(grid: &GridIndex, n: usize, cap: usize, rng: &mut StdRng) -> Self {
        let mut keep = vec![false; n];
        for cell in grid.cells() {
            if cell.len() <= cap {
                for &p in cell.points() {
                    keep[p] = true;
                }
            } else {
                let mut members = cell.points().to_vec();
                members.shuffle(rng);
                for &p in &members[..cap] {
                    keep[p] = true;
                }
            }
        }

        let to_origin: Vec<usize> = (0..n).filter(|&p| keep[p]).collect();
        let mut from_origin = vec![None; n];
        for (r, &p) in to_origin.iter().enumerate() {
            from_origin[p] = Some(r);
        }
        Self {
            to_origin,
            from_origin,
        }
    }

    fn len(&self) -> usize {
        self.to_origin.len()
    }
}

/// Reduced points grouped by bucket key for one table.
#[derive(Debug)]
struct Buckets {
    members: Vec<Vec<usize>>,
    bucket_of: Vec<usize>,
}

impl Buckets {
    fn build(keys: &[BucketKey], rng: &mut StdRng) -> Self {
        let mut index: HashMap<BucketKey, usize> = HashMap::new();
        let mut members: Vec<Vec<usize>> = Vec::new();
        let mut bucket_of = Vec::with_capacity(keys.len());
        for (r, key) in keys.iter().enumerate() {
            let b = *index.entry(*key).or_insert_with(|| {
                members.push(Vec::new());
                members.len() - 1
            });
            members[b].push(r);
            bucket_of.push(b);
        }
        for bucket in &mut members {
            bucket.shuffle(rng);
        }
        Self { members, bucket_of }
    }

    /// All members of the bucket holding `r`, `r` included.
    fn peers(&self, r: usize) -> &[usize] {
        &self.members[self.bucket_of[r]]
    }
}

const EMPTY_SLOT: usize = usize::MAX;

/// State of one approximate fit. Everything indexed by reduced id unless noted.
struct LshFit<'a> {
    points: &'a PointStore,
    grid: GridIndex,
    reduced: ReducedIndex,
    /// Coordinates of the reduced points, the projector's input.
    reduced_points: PointStore,
    eps_sqr: f32,
    cell_width: f32,
    tables: usize,
    core_window: usize,
    cap: usize,
    rng: StdRng,
    is_core: Vec<bool>,
    uf: UnionFind,
    buckets: Vec<Buckets>,
    /// Labels by original id.
    labels: Labels,
    /// Reduced points that were noise after merging, with the squared
    /// distance of the best core found so far.
    border: Vec<(usize, f32)>,
}

impl<'a> LshFit<'a> {
    fn new(
        points: &'a PointStore,
        grid: GridIndex,
        eps: f32,
        min_pts: usize,
        params: &LshParams,
        mut rng: StdRng,
    ) -> Self {
        let n = points.len();
        let cap = params.cell_cap_factor.saturating_mul(min_pts);
        let reduced = ReducedIndex::subsample(&grid, n, cap, &mut rng);
        let reduced_points = points.select(&reduced.to_origin);

        // Dense cells: every member is core, and members are pairwise within eps.
        let mut is_core = vec![false; reduced.len()];
        let mut uf = UnionFind::new(reduced.len());
        for cell in grid.cells() {
            if cell.len() <= min_pts {
                continue;
            }
            let mut kept = cell.points().iter().filter_map(|&p| reduced.from_origin[p]);
            if let Some(first) = kept.next() {
                is_core[first] = true;
                for r in kept {
                    is_core[r] = true;
                    uf.union(first, r);
                }
            }
        }

        tracing::debug!(
            n_points = n,
            n_reduced = reduced.len(),
            n_core = is_core.iter().filter(|&&c| c).count(),
            cap,
            "lsh subsampled"
        );

        Self {
            points,
            grid,
            reduced,
            reduced_points,
            eps_sqr: eps * eps,
            cell_width: eps,
            tables: params.tables,
            core_window: params.core_window,
            cap,
            rng,
            is_core,
            uf,
            buckets: Vec::new(),
            labels: vec![NOISE; n],
            border: Vec::new(),
        }
    }

    #[inline]
    fn dist(&self, a: usize, b: usize) -> f32 {
        squared_euclidean(self.reduced_points.row(a), self.reduced_points.row(b))
    }

    /// Draw fresh tables and rebuild the buckets. The tables of one round
    /// share their directions and differ in the reference point.
    fn rehash(&mut self, projector: &dyn Projector) -> Result<()> {
        let mut tables = Vec::with_capacity(self.tables);
        tables.push(ProjectionTable::random(self.points, &mut self.rng));
        while tables.len() < self.tables {
            let next = tables[0].reanchored(self.points, &mut self.rng);
            tables.push(next);
        }
        let keys = projector.project(&self.reduced_points, &tables, self.cell_width)?;

        let m = self.reduced.len();
        if keys.len() != tables.len() || keys.iter().any(|k| k.len() != m) {
            return Err(Error::Projection(format!(
                "expected {} tables of {} keys, got {:?}",
                tables.len(),
                m,
                keys.iter().map(Vec::len).collect::<Vec<_>>()
            )));
        }

        self.buckets = keys
            .iter()
            .map(|k| Buckets::build(k, &mut self.rng))
            .collect();
        Ok(())
    }

    /// Collect neighbor evidence for non-core points; returns how many were promoted.
    fn promote_cores(&mut self) -> usize {
        let w = self.core_window;
        let m = self.reduced.len();

        // One window per non-core point, fresh every round.
        let mut row_of = vec![usize::MAX; m];
        let mut rows = 0;
        for r in 0..m {
            if !self.is_core[r] {
                row_of[r] = rows;
                rows += 1;
            }
        }
        let mut window = vec![EMPTY_SLOT; rows * w];

        let mut promoted = 0;
        for t in 0..self.buckets.len() {
            for r in 0..m {
                if self.is_core[r] {
                    continue;
                }
                let slots = &mut window[row_of[r] * w..(row_of[r] + 1) * w];
                for &other in self.buckets[t].peers(r) {
                    if other == r {
                        continue;
                    }
                    let d = squared_euclidean(
                        self.reduced_points.row(r),
                        self.reduced_points.row(other),
                    );
                    if d >= self.eps_sqr {
                        continue;
                    }
                    let Some(k) = slots.iter().position(|&s| s == other || s == EMPTY_SLOT) else {
                        continue;
                    };
                    if slots[k] == EMPTY_SLOT {
                        slots[k] = other;
                        if k + 1 == w {
                            self.is_core[r] = true;
                            promoted += 1;
                            break;
                        }
                    }
                }
            }
        }
        promoted
    }

    /// Join every core point with its first core bucket-mate within eps, per table.
    fn merge_buckets(&mut self) -> usize {
        let before = self.uf.count();
        let m = self.reduced.len();
        for t in 0..self.buckets.len() {
            let table_before = self.uf.count();
            for r in 0..m {
                if !self.is_core[r] {
                    continue;
                }
                let hit = self.buckets[t]
                    .peers(r)
                    .iter()
                    .copied()
                    .find(|&o| o != r && self.is_core[o] && self.dist(r, o) < self.eps_sqr);
                if let Some(o) = hit {
                    self.uf.union(o, r);
                }
            }
            tracing::trace!(table = t, merged = table_before - self.uf.count(), "table merged");
        }
        before - self.uf.count()
    }

    fn emit_labels(&mut self) {
        let m = self.reduced.len();
        for r in 0..m {
            let root = self.uf.find(r);
            if self.uf.set_size(root) > 1 || self.is_core[r] {
                self.labels[self.reduced.to_origin[r]] = root as Label;
            } else {
                self.border.push((r, self.eps_sqr));
            }
        }

        // Points dropped by subsampling sit in dense cells and follow a kept member.
        for cell in self.grid.cells() {
            if cell.len() <= self.cap {
                continue;
            }
            let Some(&kept) = cell
                .points()
                .iter()
                .find(|&&p| self.reduced.from_origin[p].is_some())
            else {
                continue;
            };
            let label = self.labels[kept];
            for &p in cell.points() {
                if self.reduced.from_origin[p].is_none() {
                    self.labels[p] = label;
                }
            }
        }
    }

    /// Move border candidates to the label of a strictly closer core bucket-mate.
    fn resolve_borders(&mut self) {
        for (r, best) in self.border.iter_mut() {
            for buckets in &self.buckets {
                for &other in buckets.peers(*r) {
                    if !self.is_core[other] {
                        continue;
                    }
                    let d = squared_euclidean(
                        self.reduced_points.row(*r),
                        self.reduced_points.row(other),
                    );
                    if d < *best {
                        *best = d;
                        self.labels[self.reduced.to_origin[*r]] =
                            self.labels[self.reduced.to_origin[other]];
                    }
                }
            }
        }
    }
}
