// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Invariant tests for `GridIndex`: every item lives in exactly one bucket,
//! growth preserves items, and the grid agrees with the flat reference index.

use kurbo::Point;
use proptest::prelude::*;
use understory_grid_index::{
    BucketCoord, FlatIndex, GridConfig, GridIndex, Positioned, SpatialQuery,
};

fn sorted_ids<'a>(items: impl IntoIterator<Item = &'a Positioned<u32>>) -> Vec<u32> {
    let mut ids: Vec<u32> = items.into_iter().map(|e| e.value).collect();
    ids.sort_unstable();
    ids
}

fn coord() -> impl Strategy<Value = f64> {
    // Mostly inside the initial extent, sometimes far outside to force growth.
    prop_oneof![
        4 => 0.0..1000.0_f64,
        1 => 1000.0..20_000.0_f64,
    ]
}

fn points(max: usize) -> impl Strategy<Value = Vec<(f64, f64)>> {
    prop::collection::vec((coord(), coord()), 0..max)
}

fn build(points: &[(f64, f64)], config: GridConfig) -> (GridIndex<u32>, FlatIndex<u32>) {
    let mut grid = GridIndex::new(config).unwrap();
    let mut flat = FlatIndex::new();
    for (i, &(x, y)) in points.iter().enumerate() {
        let id = u32::try_from(i).unwrap();
        grid.insert(Positioned::new(id, x, y)).unwrap();
        flat.insert(Positioned::new(id, x, y)).unwrap();
    }
    (grid, flat)
}

proptest! {
    #[test]
    fn full_bounds_query_returns_each_item_once(pts in points(200)) {
        let (grid, _) = build(&pts, GridConfig::default());
        let b = grid.bounds();
        let hits = grid.query_range(Point::new(b.x0, b.y0), Point::new(b.x1, b.y1));
        let expected: Vec<u32> = (0..u32::try_from(pts.len()).unwrap()).collect();
        prop_assert_eq!(sorted_ids(hits), expected);
    }

    #[test]
    fn every_item_sits_in_its_addressed_bucket(pts in points(200)) {
        let (grid, _) = build(&pts, GridConfig::default().with_max_buckets(12, 12));
        let (rows, cols) = grid.bucket_dims();
        let mut total = 0;
        for row in 0..rows {
            for col in 0..cols {
                let coord = BucketCoord::new(row, col);
                for item in grid.bucket(coord) {
                    prop_assert_eq!(grid.bucket_of(item.x, item.y), coord);
                }
                total += grid.bucket(coord).len();
            }
        }
        prop_assert_eq!(total, grid.len());
        prop_assert_eq!(total, pts.len());
    }

    #[test]
    fn growth_preserves_positions(pts in points(100), w in 1000.0..50_000.0_f64, h in 1000.0..50_000.0_f64) {
        let (mut grid, _) = build(&pts, GridConfig::default());
        let before: Vec<(u32, f64, f64)> = {
            let mut v: Vec<_> = grid.iter().map(|e| (e.value, e.x, e.y)).collect();
            v.sort_by_key(|e| e.0);
            v
        };
        grid.ensure_capacity(w, h);
        let mut after: Vec<_> = grid.iter().map(|e| (e.value, e.x, e.y)).collect();
        after.sort_by_key(|e| e.0);
        prop_assert_eq!(before, after);
        prop_assert!(grid.bounds().x1 >= w);
        prop_assert!(grid.bounds().y1 >= h);
    }

    #[test]
    fn grid_matches_flat_reference(
        pts in points(150),
        x0 in -100.0..2000.0_f64,
        y0 in -100.0..2000.0_f64,
        w in 0.0..3000.0_f64,
        h in 0.0..3000.0_f64,
    ) {
        let (grid, flat) = build(&pts, GridConfig::default());
        let a = Point::new(x0, y0);
        let b = Point::new(x0 + w, y0 + h);
        prop_assert_eq!(sorted_ids(grid.query_range(a, b)), sorted_ids(flat.query_range(a, b)));
    }
}

#[test]
fn concrete_bucket_addresses() {
    let mut grid = GridIndex::new(GridConfig::default()).unwrap();
    assert_eq!(grid.bounds().x1, 1000.0);
    assert_eq!(grid.bucket_ranges().width, 200.0);
    grid.insert(Positioned::new(1_u32, 150.0, 150.0)).unwrap();
    grid.insert(Positioned::new(2_u32, 950.0, 50.0)).unwrap();
    assert_eq!(grid.bucket(BucketCoord::new(0, 0)).len(), 1);
    assert_eq!(grid.bucket(BucketCoord::new(4, 0)).len(), 1);
    let hits = grid.query_range(Point::new(100.0, 100.0), Point::new(300.0, 300.0));
    assert_eq!(sorted_ids(hits), [1]);
}

#[test]
fn flat_index_is_not_partitioned() {
    let flat = FlatIndex::<u32>::new();
    let grid = GridIndex::<u32>::default();
    assert!(!flat.is_partitioned());
    assert!(grid.is_partitioned());
}

#[test]
fn disjoint_queries_never_share_items() {
    let mut grid = GridIndex::new(GridConfig::default()).unwrap();
    for i in 0..100_u32 {
        let x = f64::from(i % 10) * 100.0 + 5.0;
        let y = f64::from(i / 10) * 100.0 + 5.0;
        grid.insert(Positioned::new(i, x, y)).unwrap();
    }
    let left = sorted_ids(grid.query_range(Point::new(0.0, 0.0), Point::new(499.0, 1000.0)));
    let right = sorted_ids(grid.query_range(Point::new(500.0, 0.0), Point::new(1000.0, 1000.0)));
    assert_eq!(left.len() + right.len(), 100);
    assert!(left.iter().all(|id| !right.contains(id)));
}
