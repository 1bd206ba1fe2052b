// Copyright (c) 2018-2021 Rafael Villar Burke <pachi@ietcc.csic.es>
// Distributed under the MIT License
// (See acoompanying LICENSE file or a copy at http://opensource.org/licenses/MIT)

use criterion::{criterion_group, criterion_main, Criterion};
use terrashade::{GeomType, TerrainConfig, TerrainCorrector};

fn flat_dem(rows: usize, cols: usize) -> Vec<f32> {
    let mut v = Vec::with_capacity(rows * cols * 3);
    for r in 0..rows {
        for c in 0..cols {
            v.extend_from_slice(&[c as f32 * 10.0, r as f32 * 10.0, 0.0]);
        }
    }
    v
}

fn bench_engines(c: &mut Criterion) {
    let rows = 81;
    let cols = 81;
    let pixel_per_gc = 4;
    let outer = flat_dem(rows, cols);
    let inner = flat_dem(rows, cols);
    let cfg = TerrainConfig {
        dem_rows: rows,
        dem_cols: cols,
        dem_rows_in: rows,
        dem_cols_in: cols,
        pixel_per_gc,
        offset_gc: 0,
        geom_type: GeomType::Triangle,
        ..TerrainConfig::default()
    };
    let corrector = TerrainCorrector::initialise(cfg.clone(), &outer, &inner).unwrap();
    let (ny, nx) = cfg.num_gc();
    let mask = vec![1u8; ny * nx];
    let sun_pos = nalgebra::Vector3::new(400.0_f64, 400.0, 1000.0);

    c.bench_function("sw_dir_cor (single ray)", |b| {
        let mut out = vec![0.0f32; ny * nx];
        b.iter(|| corrector.sw_dir_cor(sun_pos, &mask, &mut out, true))
    });

    c.bench_function("sw_dir_cor_coherent", |b| {
        let mut out = vec![0.0f32; ny * nx];
        b.iter(|| corrector.sw_dir_cor_coherent(sun_pos, &mask, &mut out))
    });

    c.bench_function("sw_dir_cor_coherent_rp8", |b| {
        let mut out = vec![0.0f32; ny * nx];
        b.iter(|| corrector.sw_dir_cor_coherent_rp8(sun_pos, &mask, &mut out).unwrap())
    });
}

criterion_group! {
    name = benches;
    config = Criterion::default().sample_size(10);
    targets = bench_engines
}
criterion_main!(benches);
