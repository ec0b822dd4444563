//! DBSCAN: Density-Based Spatial Clustering of Applications with Noise.
//!
//! # The Algorithm (Ester et al., 1996)
//!
//! DBSCAN groups points that are reachable from each other through chains of
//! dense neighborhoods and marks everything else as noise. Unlike k-means, it:
//!
//! - Discovers clusters of arbitrary shape
//! - Automatically determines the number of clusters
//! - Identifies noise points (outliers)
//!
//! ## Core Concepts
//!
//! - **Epsilon (ε)**: Maximum distance between two points to be neighbors.
//! - **MinPts**: Density threshold.
//! - **Core point**: More than MinPts points (itself included) lie within ε.
//!   Equivalently, at least MinPts *other* points.
//! - **Border point**: Within ε of a core point but not core itself.
//! - **Noise point**: Neither core nor border.
//!
//! ## Strategies
//!
//! [`Dbscan`] holds the parameters and runs one of three strategies:
//!
//! | [`Method`] | Cost | Result |
//! |---|---|---|
//! | `BruteForce` | O(n²) time and memory | reference labels |
//! | `Grid` | ~O(n) for bounded density, 2D only | same partition as the reference |
//! | `Approximate` | bounded per-cell work, any dimension | randomized, may miss links |
//!
//! The brute-force version in this file is the original KDD-96 formulation run
//! over a precomputed distance matrix. It is slow and memory hungry, and is
//! kept as the correctness oracle for the other two.
//!
//! ## Limitations
//!
//! - Struggles with varying densities (consider OPTICS / HDBSCAN)
//! - ε is sensitive and dataset-dependent
//!
//! ## References
//!
//! Ester et al. (1996). "A Density-Based Algorithm for Discovering Clusters
//! in Large Spatial Databases with Noise." KDD-96.

use super::lsh::{self, LshParams};
use super::projection::{CpuProjector, Projector};
use super::traits::Clustering;
use super::{grid_dbscan, util};
use crate::error::{Error, Result};
use crate::points::PointStore;

/// A cluster id (`>= 0`) or [`NOISE`].
pub type Label = i32;

/// One label per input point.
pub type Labels = Vec<Label>;

/// Label of points that belong to no cluster.
pub const NOISE: Label = -1;

/// Which clustering strategy [`Dbscan`] runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Method {
    /// Distance-matrix baseline.
    BruteForce,
    /// Exact grid-indexed clustering (2D inputs).
    #[default]
    Grid,
    /// Randomized-projection approximation.
    Approximate,
}

/// DBSCAN parameters plus the strategy used by [`Clustering::fit`].
#[derive(Debug, Clone)]
pub struct Dbscan {
    /// Epsilon: maximum distance for neighborhood.
    epsilon: f32,
    /// Density threshold for core point classification.
    min_pts: usize,
    method: Method,
    lsh: LshParams,
}

impl Dbscan {
    /// Create a new DBSCAN clusterer.
    ///
    /// # Arguments
    ///
    /// * `epsilon` - Maximum distance between two points to be neighbors.
    /// * `min_pts` - A core point needs more than `min_pts` points within
    ///   `epsilon`, counting itself.
    ///
    /// # Typical Values
    ///
    /// - `epsilon`: Often determined by k-distance plot (k = min_pts).
    /// - `min_pts`: 2 * dimension is a common heuristic.
    pub fn new(epsilon: f32, min_pts: usize) -> Self {
        Self {
            epsilon,
            min_pts,
            method: Method::default(),
            lsh: LshParams::default(),
        }
    }

    /// Set epsilon (neighborhood radius).
    pub fn with_epsilon(mut self, epsilon: f32) -> Self {
        self.epsilon = epsilon;
        self
    }

    /// Set the density threshold.
    pub fn with_min_pts(mut self, min_pts: usize) -> Self {
        self.min_pts = min_pts;
        self
    }

    /// Select the strategy used by [`Clustering::fit`].
    pub fn with_method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    /// Set the parameters of the approximate strategy.
    pub fn with_lsh_params(mut self, params: LshParams) -> Self {
        self.lsh = params;
        self
    }

    /// Neighborhood radius.
    pub fn epsilon(&self) -> f32 {
        self.epsilon
    }

    /// Density threshold.
    pub fn min_pts(&self) -> usize {
        self.min_pts
    }

    /// Strategy used by [`Clustering::fit`].
    pub fn method(&self) -> Method {
        self.method
    }

    /// Parameters of the approximate strategy.
    pub fn lsh_params(&self) -> &LshParams {
        &self.lsh
    }

    pub(crate) fn eps_sqr(&self) -> f32 {
        self.epsilon * self.epsilon
    }

    pub(crate) fn validate(&self) -> Result<()> {
        if !self.epsilon.is_finite() || self.epsilon <= 0.0 {
            return Err(Error::InvalidParameter {
                name: "epsilon",
                message: "must be positive and finite",
            });
        }
        if self.min_pts == 0 {
            return Err(Error::InvalidParameter {
                name: "min_pts",
                message: "must be at least 1",
            });
        }
        Ok(())
    }

    /// Reference clustering over a full distance matrix.
    pub fn fit_brute_force(&self, points: &PointStore) -> Result<Labels> {
        self.validate()?;
        Ok(fit_distance_matrix(points, self.eps_sqr(), self.min_pts))
    }

    /// Exact grid-indexed clustering. Requires 2D points.
    pub fn fit_grid(&self, points: &PointStore) -> Result<Labels> {
        self.validate()?;
        grid_dbscan::fit(points, self.epsilon, self.min_pts)
    }

    /// Approximate clustering with the in-process projector.
    pub fn fit_approximate(&self, points: &PointStore) -> Result<Labels> {
        self.fit_approximate_with(points, &CpuProjector)
    }

    /// Approximate clustering with a caller-supplied projector.
    ///
    /// Any projector error aborts the fit.
    pub fn fit_approximate_with(
        &self,
        points: &PointStore,
        projector: &dyn Projector,
    ) -> Result<Labels> {
        self.validate()?;
        lsh::fit(points, self.epsilon, self.min_pts, &self.lsh, projector)
    }
}

impl Default for Dbscan {
    fn default() -> Self {
        Self::new(0.5, 5)
    }
}

impl Clustering for Dbscan {
    fn fit(&self, points: &PointStore) -> Result<Labels> {
        match self.method {
            Method::BruteForce => self.fit_brute_force(points),
            Method::Grid => self.fit_grid(points),
            Method::Approximate => self.fit_approximate(points),
        }
    }
}

/// Full symmetric matrix of squared distances, row-major `n x n`.
fn distance_matrix(points: &PointStore) -> Vec<f32> {
    let n = points.len();
    let mut dm = vec![0.0f32; n * n];
    for i in 0..n {
        let a = points.row(i);
        for j in (i + 1)..n {
            let d = util::squared_euclidean(a, points.row(j));
            dm[i * n + j] = d;
            dm[j * n + i] = d;
        }
    }
    dm
}

/// All points within epsilon of `pid`, `pid` itself included.
fn region_query(dm: &[f32], n: usize, pid: usize, eps_sqr: f32) -> Vec<usize> {
    dm[pid * n..(pid + 1) * n]
        .iter()
        .enumerate()
        .filter(|(_, &d)| d <= eps_sqr)
        .map(|(j, _)| j)
        .collect()
}

/// Grow cluster `cluster_id` from core point `pid`.
///
/// `frontier` starts as the neighborhood of `pid` and is extended with the
/// neighborhood of every core point reached.
#[allow(clippy::too_many_arguments)]
fn expand_cluster(
    dm: &[f32],
    n: usize,
    eps_sqr: f32,
    min_pts: usize,
    mut frontier: Vec<usize>,
    labels: &mut [Label],
    visited: &mut [bool],
    cluster_id: Label,
    pid: usize,
) {
    labels[pid] = cluster_id;

    let mut next = 0;
    while next < frontier.len() {
        let q = frontier[next];
        next += 1;

        if !visited[q] {
            visited[q] = true;
            let neighbors = region_query(dm, n, q, eps_sqr);
            if neighbors.len() > min_pts {
                frontier.extend(neighbors);
            }
        }

        // Points visited earlier as non-core are promoted to border here.
        if labels[q] == NOISE {
            labels[q] = cluster_id;
        }
    }
}

pub(crate) fn fit_distance_matrix(points: &PointStore, eps_sqr: f32, min_pts: usize) -> Labels {
    let n = points.len();
    let mut labels = vec![NOISE; n];
    if n == 0 {
        return labels;
    }

    let dm = distance_matrix(points);
    let mut visited = vec![false; n];
    let mut cluster_id: Label = 0;

    for pid in 0..n {
        if visited[pid] {
            continue;
        }
        visited[pid] = true;

        let neighbors = region_query(&dm, n, pid, eps_sqr);
        if neighbors.len() > min_pts {
            expand_cluster(
                &dm,
                n,
                eps_sqr,
                min_pts,
                neighbors,
                &mut labels,
                &mut visited,
                cluster_id,
                pid,
            );
            cluster_id += 1;
        }
    }

    tracing::debug!(n_points = n, n_clusters = cluster_id, "distance-matrix fit done");
    labels
}
