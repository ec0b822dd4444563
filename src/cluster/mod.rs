//! Density-based clustering of dense point sets.
//!
//! ## DBSCAN
//!
//! Points with enough neighbors within `eps` are *core*; core points within
//! `eps` of each other share a cluster; points within `eps` of a core point
//! join its cluster as *border* points; everything else is noise
//! ([`NOISE`]).
//!
//! ## Strategies
//!
//! - **Brute force**: full distance matrix. Quadratic, exact, the reference.
//! - **Grid** (2D): points are bucketed into cells of width `eps / sqrt(2)`
//!   and neighbor searches visit the fixed 21-cell [`STENCIL`] around a cell.
//!   Cells are the unit of merging, so dense regions cost little.
//! - **Approximate** (any dimension): dense cells are subsampled and
//!   neighborhoods come from random-projection hash buckets
//!   ([`projection`]). Labels depend on the RNG; set
//!   [`LshParams::seed`] for reproducible runs.
//!
//! Cluster ids are set roots and carry no meaning beyond identity;
//! [`labels::relabel_dense`] renumbers them.
//!
//! ## Usage
//!
//! ```rust
//! use gridscan::cluster::{labels, Clustering, Dbscan, LshParams, Method};
//! use gridscan::PointStore;
//!
//! let points = PointStore::from_rows(&[
//!     vec![0.0, 0.0],
//!     vec![0.1, 0.1],
//!     vec![0.0, 0.1],
//!     vec![10.0, 10.0],
//!     vec![10.1, 10.1],
//!     vec![10.0, 10.1],
//!     vec![50.0, 50.0],
//! ])
//! .unwrap();
//!
//! // Exact grid method (the default).
//! let grid = Dbscan::new(0.5, 2).fit(&points).unwrap();
//! assert_eq!(grid[0], grid[1]);
//! assert_ne!(grid[0], grid[3]);
//! assert_eq!(grid[6], gridscan::NOISE);
//!
//! // Brute-force reference gives the same partition.
//! let brute = Dbscan::new(0.5, 2)
//!     .with_method(Method::BruteForce)
//!     .fit(&points)
//!     .unwrap();
//! assert_eq!(labels::partition_agreement(&grid, &brute), 1.0);
//!
//! // Approximate method, seeded.
//! let approx = Dbscan::new(0.5, 2)
//!     .with_method(Method::Approximate)
//!     .with_lsh_params(LshParams {
//!         seed: Some(42),
//!         ..Default::default()
//!     })
//!     .fit(&points)
//!     .unwrap();
//! assert_eq!(approx.len(), points.len());
//! ```

mod dbscan;
mod grid;
mod grid_dbscan;
pub mod labels;
mod lsh;
pub mod projection;
mod traits;
mod util;

pub use dbscan::{Dbscan, Label, Labels, Method, NOISE};
pub use grid::{Cell, GridIndex, STENCIL};
pub use lsh::LshParams;
pub use projection::{BucketKey, CpuProjector, ProjectionTable, Projector};
pub use traits::Clustering;
pub use util::UnionFind;
