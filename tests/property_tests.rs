use gridscan::cluster::labels::{cluster_count, relabel_dense};
use gridscan::cluster::UnionFind;
use gridscan::{Clustering, Dbscan, LshParams, Method, PointStore, NOISE};
use proptest::prelude::*;

fn points_2d() -> impl Strategy<Value = Vec<Vec<f32>>> {
    prop::collection::vec(prop::collection::vec(-2.0f32..2.0, 2), 0..60)
}

fn noise_mask(labels: &[i32]) -> Vec<bool> {
    labels.iter().map(|&l| l == NOISE).collect()
}

proptest! {
    #[test]
    fn prop_union_find_joins_and_shrinks(
        n in 1usize..40,
        ops in prop::collection::vec((0usize..40, 0usize..40), 0..80)
    ) {
        let mut uf = UnionFind::new(n);
        let mut unions = Vec::new();
        for (a, b) in ops {
            let (a, b) = (a % n, b % n);
            let before = uf.count();
            uf.union(a, b);
            prop_assert!(uf.count() <= before);
            unions.push((a, b));
            for &(x, y) in &unions {
                prop_assert_eq!(uf.find(x), uf.find(y));
            }
        }

        let mut roots: Vec<usize> = (0..n).map(|i| uf.find(i)).collect();
        roots.sort_unstable();
        roots.dedup();
        prop_assert_eq!(roots.len(), uf.count());
    }

    #[test]
    fn prop_every_point_labeled(
        data in points_2d(),
        eps in 0.1f32..1.0,
        min_pts in 1usize..6,
        seed in any::<u64>()
    ) {
        let points = PointStore::from_rows(&data).unwrap();
        for method in [Method::BruteForce, Method::Grid, Method::Approximate] {
            let labels = Dbscan::new(eps, min_pts)
                .with_method(method)
                .with_lsh_params(LshParams { seed: Some(seed), ..Default::default() })
                .fit(&points)
                .unwrap();
            prop_assert_eq!(labels.len(), data.len());
            prop_assert!(labels.iter().all(|&l| l >= NOISE));
        }
    }

    #[test]
    fn prop_grid_agrees_with_brute_force_on_density(
        data in points_2d(),
        eps in 0.2f32..1.0,
        min_pts in 1usize..6
    ) {
        let points = PointStore::from_rows(&data).unwrap();
        let model = Dbscan::new(eps, min_pts);
        let grid = model.fit_grid(&points).unwrap();
        let brute = model.fit_brute_force(&points).unwrap();

        prop_assert_eq!(noise_mask(&grid), noise_mask(&brute));
        prop_assert_eq!(cluster_count(&grid), cluster_count(&brute));
    }

    #[test]
    fn prop_grid_is_idempotent(
        data in points_2d(),
        eps in 0.1f32..1.0,
        min_pts in 1usize..6
    ) {
        let points = PointStore::from_rows(&data).unwrap();
        let model = Dbscan::new(eps, min_pts);
        prop_assert_eq!(model.fit_grid(&points).unwrap(), model.fit_grid(&points).unwrap());
    }

    #[test]
    fn prop_isolated_point_is_noise(
        mut data in points_2d(),
        eps in 0.1f32..1.0,
        min_pts in 1usize..6
    ) {
        data.push(vec![100.0, -100.0]);
        let points = PointStore::from_rows(&data).unwrap();
        let model = Dbscan::new(eps, min_pts);
        prop_assert_eq!(*model.fit_grid(&points).unwrap().last().unwrap(), NOISE);
        prop_assert_eq!(*model.fit_brute_force(&points).unwrap().last().unwrap(), NOISE);
    }

    #[test]
    fn prop_relabel_keeps_partition(labels in prop::collection::vec(-1i32..20, 0..50)) {
        let dense = relabel_dense(&labels);
        prop_assert_eq!(cluster_count(&dense), cluster_count(&labels));
        for i in 0..labels.len() {
            for j in 0..labels.len() {
                prop_assert_eq!(labels[i] == labels[j], dense[i] == dense[j]);
            }
        }
    }
}
