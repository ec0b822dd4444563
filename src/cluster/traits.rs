use super::dbscan::Labels;
use crate::error::Result;
use crate::points::PointStore;

/// Common interface for hard clustering algorithms (one label per point).
pub trait Clustering {
    /// Fit on `points` and return one label per point, [`NOISE`](super::NOISE) for outliers.
    fn fit(&self, points: &PointStore) -> Result<Labels>;
}
