// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use criterion::{BatchSize, Criterion, black_box, criterion_group, criterion_main};
use kurbo::{Point, Size};
use understory_element_store::ElementStore;
use understory_grid_index::GridConfig;
use understory_render_pool::{Placeable, RenderPool};
use understory_viewport_virtualizer::{ViewportVirtualizer, VirtualizerConfig};

#[derive(Default)]
struct Node {
    at: Point,
}

impl Placeable for Node {
    fn place(&mut self, at: Point) {
        self.at = at;
    }
}

/// One item every `step` units over a `side x side` canvas.
fn build_store(side: f64, step: f64) -> ElementStore<u32> {
    let mut store = ElementStore::new(GridConfig::default()).unwrap();
    let n = (side / step) as u32;
    for i in 0..n {
        for j in 0..n {
            store
                .add(i * n + j, Point::new(f64::from(i) * step, f64::from(j) * step))
                .unwrap();
        }
    }
    store
}

fn virtualizer() -> ViewportVirtualizer {
    let mut virt = ViewportVirtualizer::new(VirtualizerConfig::default()).unwrap();
    virt.viewport_mut().set_size(Size::new(1280.0, 800.0)).unwrap();
    virt
}

fn bench_refresh(c: &mut Criterion) {
    let mut group = c.benchmark_group("viewport_refresh");
    let store = build_store(20_000.0, 40.0);

    group.bench_function("scroll_by_20", |b| {
        let mut pool = RenderPool::new(Node::default);
        let mut virt = virtualizer();
        virt.refresh(&store, &mut pool);
        let mut y = 0.0;
        b.iter(|| {
            y = if y > 15_000.0 { 0.0 } else { y + 20.0 };
            virt.viewport_mut().set_offset(Point::new(0.0, y)).unwrap();
            black_box(virt.refresh(&store, &mut pool));
        });
    });

    group.bench_function("jump", |b| {
        let mut pool = RenderPool::new(Node::default);
        let mut virt = virtualizer();
        let mut flip = false;
        b.iter(|| {
            flip = !flip;
            let at = if flip { 0.0 } else { 10_000.0 };
            virt.viewport_mut().set_offset(Point::new(at, at)).unwrap();
            black_box(virt.refresh(&store, &mut pool));
        });
    });

    group.bench_function("invalidate_full", |b| {
        b.iter_batched(
            || {
                let mut pool = RenderPool::new(Node::default);
                let mut virt = virtualizer();
                virt.refresh(&store, &mut pool);
                virt.invalidate();
                (pool, virt)
            },
            |(mut pool, mut virt)| black_box(virt.refresh(&store, &mut pool)),
            BatchSize::SmallInput,
        );
    });
    group.finish();
}

criterion_group!(benches, bench_refresh);
criterion_main!(benches);
