// Copyright (c) 2018-2021 Rafael Villar Burke <pachi@ietcc.csic.es>
// Distributed under the MIT License
// (See acoompanying LICENSE file or a copy at http://opensource.org/licenses/MIT)

//! Cross-checks the triangle, quad and grid geometry modes against each
//! other: all three must agree on whether a given shadow ray is occluded
//! over the same DEM.

use terrashade::config::GeomType;
use terrashade::dem::DemView;
use terrashade::scene::{Point3, Ray, Scene, Vector3};

fn ridge_dem(rows: usize, cols: usize) -> Vec<f32> {
    let mut v = Vec::with_capacity(rows * cols * 3);
    for r in 0..rows {
        for c in 0..cols {
            let z = if c == cols / 2 { 20.0 } else { 0.0 };
            v.extend_from_slice(&[c as f32 * 5.0, r as f32 * 5.0, z]);
        }
    }
    v
}

#[test]
fn all_geometry_modes_agree_on_a_ridge_shadow() {
    let grid = ridge_dem(11, 11);
    let dem = DemView::new(&grid, 11, 11);

    let triangle_scene = Scene::build(&dem, GeomType::Triangle).unwrap();
    let quad_scene = Scene::build(&dem, GeomType::Quad).unwrap();
    let grid_scene = Scene::build(&dem, GeomType::Grid).unwrap();

    // a low-angle ray grazing past the ridge should be occluded in all three
    let low_angle_ray = Ray::new(
        Point3::new(0.0, 25.0, 1.0),
        Vector3::new(1.0, 0.0, 0.05),
    )
    .with_tfar(200.0);

    assert_eq!(
        triangle_scene.occluded(&low_angle_ray),
        quad_scene.occluded(&low_angle_ray)
    );
    assert_eq!(
        triangle_scene.occluded(&low_angle_ray),
        grid_scene.occluded(&low_angle_ray)
    );

    // straight up from well clear of the ridge: unoccluded everywhere
    let clear_ray = Ray::new(Point3::new(0.0, 0.0, 1.0), Vector3::new(0.0, 0.0, 1.0));
    assert!(!triangle_scene.occluded(&clear_ray));
    assert!(!quad_scene.occluded(&clear_ray));
    assert!(!grid_scene.occluded(&clear_ray));
}
