#![allow(dead_code)]

use gridscan::PointStore;

/// Deterministic, roughly Gaussian 2D blob: Box-Muller over two Weyl sequences.
pub fn blob(center: (f64, f64), n: usize, std: f64, salt: usize) -> Vec<Vec<f32>> {
    (0..n)
        .map(|i| {
            let k = (i + 1) as f64;
            let u1 = (k * 0.754_877_666_246_692_7 + salt as f64 * 0.1)
                .fract()
                .max(1e-12);
            let u2 = (k * 0.569_840_290_998_053_2 + salt as f64 * 0.3).fract();
            let r = std * (-2.0 * u1.ln()).sqrt();
            let t = 2.0 * std::f64::consts::PI * u2;
            vec![
                (center.0 + r * t.cos()) as f32,
                (center.1 + r * t.sin()) as f32,
            ]
        })
        .collect()
}

/// Three blobs of 50 points around (0, 0), (3, 0.5) and (1, 4).
pub fn three_blobs(std: f64) -> Vec<Vec<f32>> {
    let mut rows = blob((0.0, 0.0), 50, std, 1);
    rows.extend(blob((3.0, 0.5), 50, std, 2));
    rows.extend(blob((1.0, 4.0), 50, std, 3));
    rows
}

pub fn store(rows: &[Vec<f32>]) -> PointStore {
    PointStore::from_rows(rows).unwrap()
}
