// Copyright (c) 2018-2021 Rafael Villar Burke <pachi@ietcc.csic.es>
// Distributed under the MIT License
// (See acoompanying LICENSE file or a copy at http://opensource.org/licenses/MIT)

//! Synthesises a toy ridge-shaped DEM and prints the three engines' output
//! side by side for a single sun position.

use anyhow::Result;
use terrashade::{GeomType, TerrainConfig, TerrainCorrector};

const PROGNAME: &str = "demo_correction";

fn get_copytxt() -> String {
    format!(
        "{} - Ray-traced shortwave correction demo\n\nCopyright (c) 2018-2021 Rafael Villar Burke <pachi@ietcc.csic.es>\nPublicado bajo licencia MIT\n",
        PROGNAME
    )
}

/// Builds a `rows x cols` DEM with a simple sinusoidal ridge running along
/// its columns, `spacing` metres between vertices.
fn synth_dem(rows: usize, cols: usize, spacing: f32, ridge_height: f32) -> Vec<f32> {
    let mut v = Vec::with_capacity(rows * cols * 3);
    for r in 0..rows {
        for c in 0..cols {
            let x = c as f32 * spacing;
            let y = r as f32 * spacing;
            let z = ridge_height * (x / (cols as f32 * spacing) * std::f32::consts::PI).sin();
            v.extend_from_slice(&[x, y, z]);
        }
    }
    v
}

fn main() -> Result<()> {
    env_logger::init();
    eprintln!("{}\n", get_copytxt());

    let outer_rows = 41;
    let outer_cols = 41;
    let pixel_per_gc = 4;
    let offset_gc = 1;
    let spacing = 10.0;

    let outer = synth_dem(outer_rows, outer_cols, spacing, 30.0);
    let inner_rows = outer_rows - 2 * offset_gc * pixel_per_gc;
    let inner_cols = outer_cols - 2 * offset_gc * pixel_per_gc;
    let full_inner = synth_dem(outer_rows, outer_cols, spacing, 30.0);
    let mut inner = Vec::with_capacity(inner_rows * inner_cols * 3);
    for r in 0..inner_rows {
        for c in 0..inner_cols {
            let or = r + offset_gc * pixel_per_gc;
            let oc = c + offset_gc * pixel_per_gc;
            let off = (or * outer_cols + oc) * 3;
            inner.extend_from_slice(&full_inner[off..off + 3]);
        }
    }

    let cfg = TerrainConfig {
        dem_rows: outer_rows,
        dem_cols: outer_cols,
        dem_rows_in: inner_rows,
        dem_cols_in: inner_cols,
        pixel_per_gc,
        offset_gc,
        geom_type: GeomType::Triangle,
        dist_search_km: 5.0,
        sw_dir_cor_max: 25.0,
        ang_max_deg: 89.0,
        ray_org_elev: 0.1,
    };

    eprintln!(
        "Construyendo escena terreno: {}x{} DEM exterior, {}x{} DEM interior",
        cfg.dem_rows, cfg.dem_cols, cfg.dem_rows_in, cfg.dem_cols_in
    );
    let corrector = TerrainCorrector::initialise(cfg.clone(), &outer, &inner)?;

    let (ny, nx) = cfg.num_gc();
    let mask = vec![1u8; ny * nx];
    let sun_pos = nalgebra::Vector3::new(5000.0_f64, 5000.0, 8000.0);

    let mut out_single = vec![0.0f32; ny * nx];
    corrector.sw_dir_cor(sun_pos, &mask, &mut out_single, true);

    let mut out_coherent = vec![0.0f32; ny * nx];
    corrector.sw_dir_cor_coherent(sun_pos, &mask, &mut out_coherent);

    let mut out_p8 = vec![0.0f32; ny * nx];
    corrector.sw_dir_cor_coherent_rp8(sun_pos, &mask, &mut out_p8)?;

    eprintln!("\ncelda  single  coherent  packet8");
    for idx in 0..ny * nx {
        eprintln!(
            "{:>5}  {:>6.3}  {:>8.3}  {:>7.3}",
            idx, out_single[idx], out_coherent[idx], out_p8[idx]
        );
    }

    Ok(())
}
