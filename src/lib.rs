//! Grid-indexed and hash-approximated DBSCAN.
//!
//! `gridscan` clusters dense `f32` point sets with DBSCAN. Besides the
//! quadratic reference it provides:
//! - an exact 2D method over a uniform grid with cell width `eps / sqrt(2)`
//! - an approximate method for any dimension built on random-projection hashing
//!
//! The public API lives under [`cluster`]; inputs are [`PointStore`]s.

#![forbid(unsafe_code)]

pub mod cluster;
pub mod error;
pub mod points;

pub use cluster::{Clustering, Dbscan, Label, Labels, LshParams, Method, NOISE};
pub use error::{Error, Result};
pub use points::PointStore;
