//! Brute-force, grid, and approximate DBSCAN on a simple 2D dataset.
//!
//! Run with `RUST_LOG=gridscan=debug` to see the per-stage diagnostics.

use gridscan::cluster::labels::{partition_agreement, relabel_dense};
use gridscan::{Clustering, Dbscan, LshParams, Method, PointStore, NOISE};
use tracing_subscriber::EnvFilter;

fn print_labels(title: &str, points: &PointStore, labels: &[i32]) {
    println!("\n=== {title} ===");
    for (i, label) in relabel_dense(labels).iter().enumerate() {
        let p = points.row(i);
        let tag = if *label == NOISE {
            "NOISE".to_string()
        } else {
            format!("cluster {}", label)
        };
        println!("  point {:2} ({:5.1}, {:5.1}) => {}", i, p[0], p[1], tag);
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    // Three well-separated clusters in 2D, plus one outlier.
    let points = PointStore::from_rows(&[
        // Cluster A (near origin)
        vec![0.0, 0.0],
        vec![0.1, 0.2],
        vec![0.2, 0.1],
        vec![-0.1, 0.1],
        // Cluster B (near (5, 5))
        vec![5.0, 5.0],
        vec![5.1, 4.9],
        vec![4.9, 5.1],
        vec![5.2, 5.2],
        // Cluster C (near (10, 0))
        vec![10.0, 0.0],
        vec![10.1, 0.1],
        vec![9.9, -0.1],
        vec![10.2, 0.2],
        // Outlier
        vec![2.5, 7.5],
    ])?;

    let model = Dbscan::new(1.0, 2);

    let brute = model.clone().with_method(Method::BruteForce).fit(&points)?;
    print_labels("Brute force (eps=1.0, min_pts=2)", &points, &brute);

    let grid = model.clone().with_method(Method::Grid).fit(&points)?;
    print_labels("Grid (eps=1.0, min_pts=2)", &points, &grid);

    let approx = model
        .with_method(Method::Approximate)
        .with_lsh_params(LshParams {
            seed: Some(42),
            ..Default::default()
        })
        .fit(&points)?;
    print_labels("Approximate (eps=1.0, min_pts=2, seed=42)", &points, &approx);

    println!(
        "\nagreement with brute force: grid {:.3}, approximate {:.3}",
        partition_agreement(&grid, &brute),
        partition_agreement(&approx, &brute)
    );
    Ok(())
}
