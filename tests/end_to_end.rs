// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! End-to-end scenarios: reading, assembling, reordering and projecting

use anyhow::Result;
use approx::assert_relative_eq;
use discretesurf::assembly::{CurveSection, SurfaceSection};
use discretesurf::geometry::CurveConnectivity;
use discretesurf::io::write_projection;
use discretesurf::{
    assemble, load_geometry, project_all, AssemblyWarning, BvhBackend, Closure, CoordinateTable,
    Curve, LineElement, MeshSections, Projectable, ProjectionAccumulator, RawMesh, Section,
    SerialCommunicator, ShiftCriterion, SurfConfig, Surface, SurfaceMesh,
};
use nalgebra::{Point3, Vector3};
use std::f64::consts::PI;
use std::sync::Arc;

fn elems(pairs: &[(usize, usize)]) -> Vec<LineElement> {
    pairs.iter().map(|&(a, b)| LineElement(a, b)).collect()
}

/// Regular pentagon whose second node (1-based) sits at the top
fn pentagon_mesh() -> RawMesh {
    let coords = (0..5)
        .map(|k| {
            let theta = PI / 2.0 + (k as f64 - 1.0) * 2.0 * PI / 5.0;
            [theta.cos(), theta.sin(), 0.0]
        })
        .collect();

    RawMesh {
        coords,
        bars_conn: vec![[1, 2], [2, 3], [3, 4], [4, 5], [5, 1]],
        curve_bars_ptr: vec![1, 6],
        curve_names: vec!["Pentagon".into()],
        ..RawMesh::default()
    }
}

#[test]
fn test_pentagon_shift_start_max_y() -> Result<()> {
    let config = SurfConfig::default();
    let sections = pentagon_mesh().into_sections(&config)?;
    let mut geometry = assemble(
        &sections,
        &[] as &[&str],
        Arc::new(BvhBackend::new()),
        &SerialCommunicator,
        &config,
    )?;
    assert_eq!(geometry.warnings, vec![AssemblyWarning::EmptySurface]);

    let curve = geometry.curve_mut("pentagon").unwrap();
    assert_eq!(curve.closure(), Some(Closure::Periodic));
    assert_eq!(curve.elements(), elems(&[(0, 1), (1, 2), (2, 3), (3, 4), (4, 0)]).as_slice());

    curve.shift_start(ShiftCriterion::MaxY)?;
    assert_eq!(curve.elements(), elems(&[(1, 2), (2, 3), (3, 4), (4, 0), (0, 1)]).as_slice());

    let points = curve.extract_points()?;
    assert_eq!(points.len(), 6);
    assert_relative_eq!(points[0], Point3::new(0.0, 1.0, 0.0), epsilon = 1e-12);
    assert_eq!(points[0], points[5]);
    Ok(())
}

fn horizontal_square() -> Surface {
    let coords = Arc::new(CoordinateTable::from_rows(&[
        [0.0, 0.0, 0.0],
        [1.0, 0.0, 0.0],
        [1.0, 1.0, 0.0],
        [0.0, 1.0, 0.0],
    ]));
    Surface::new(
        coords,
        SurfaceMesh::new(vec![[0, 1, 2], [0, 2, 3]], vec![]),
        Arc::new(BvhBackend::new()),
        None,
        &SerialCommunicator,
    )
    .unwrap()
}

fn vertical_square() -> Surface {
    let coords = Arc::new(CoordinateTable::from_rows(&[
        [10.0, 0.0, 0.0],
        [10.0, 1.0, 0.0],
        [10.0, 1.0, 1.0],
        [10.0, 0.0, 1.0],
    ]));
    Surface::new(
        coords,
        SurfaceMesh::new(vec![], vec![[0, 1, 2, 3]]),
        Arc::new(BvhBackend::new()),
        None,
        &SerialCommunicator,
    )
    .unwrap()
}

fn straight_curve() -> Curve {
    let coords = Arc::new(CoordinateTable::from_rows(&[
        [5.0, 0.0, 0.0],
        [5.0, 2.0, 0.0],
        [5.0, 4.0, 0.0],
    ]));
    let topology = discretesurf::sort_connectivity(&elems(&[(1, 2), (0, 1)])).unwrap();
    Curve::new(coords, CurveConnectivity::Sorted(topology))
}

#[test]
fn test_nearest_object_wins_with_its_auxiliary() -> Result<()> {
    let a = horizontal_square();
    let b = vertical_square();
    let c = straight_curve();

    let query = vec![
        Point3::new(0.5, 0.5, 0.3),
        Point3::new(10.2, 0.5, 0.5),
        Point3::new(5.1, 3.0, 0.0),
        Point3::new(1e6, 1e6, 1e6),
    ];

    let orders: [[&dyn Projectable; 3]; 3] = [[&a, &b, &c], [&c, &b, &a], [&b, &c, &a]];
    for objects in orders {
        let mut acc = ProjectionAccumulator::new(query.len());
        project_all(&objects, &query, &mut acc, &SerialCommunicator)?;

        assert_relative_eq!(acc.distances2()[0], 0.09, epsilon = 1e-12);
        assert_relative_eq!(acc.points()[0], Point3::new(0.5, 0.5, 0.0), epsilon = 1e-12);
        assert_relative_eq!(acc.auxiliary()[0], Vector3::new(0.0, 0.0, 1.0), epsilon = 1e-12);

        assert_relative_eq!(acc.distances2()[1], 0.04, epsilon = 1e-12);
        assert_relative_eq!(acc.points()[1], Point3::new(10.0, 0.5, 0.5), epsilon = 1e-12);
        assert_relative_eq!(acc.auxiliary()[1], Vector3::new(1.0, 0.0, 0.0), epsilon = 1e-12);

        assert_relative_eq!(acc.distances2()[2], 0.01, epsilon = 1e-12);
        assert_relative_eq!(acc.points()[2], Point3::new(5.0, 3.0, 0.0), epsilon = 1e-12);
        assert_relative_eq!(acc.auxiliary()[2], Vector3::new(0.0, 1.0, 0.0), epsilon = 1e-12);

        // Farther than the sentinel from everything
        assert!(!acc.is_projected(3));
        assert_eq!(acc.best(3), Some((1e10, Point3::origin(), Vector3::zeros())));
    }
    Ok(())
}

#[test]
fn test_branching_curve_falls_back_unsorted() -> Result<()> {
    let coords = Arc::new(CoordinateTable::from_rows(&[
        [0.0, 0.0, 0.0],
        [1.0, 0.0, 0.0],
        [2.0, 0.0, 0.0],
        [1.0, 1.0, 0.0],
        [0.0, 1.0, 0.0],
    ]));
    let branched = elems(&[(0, 1), (1, 2), (1, 3), (3, 4)]);

    let mut sections = MeshSections::new(coords);
    sections.insert(
        "plate",
        Section::Surface(SurfaceSection {
            mesh: SurfaceMesh::new(vec![[0, 1, 3]], vec![]),
        }),
    );
    sections.insert("tee", Section::Curve(CurveSection { elements: branched.clone() }));

    let geometry = assemble(
        &sections,
        &["plate"],
        Arc::new(BvhBackend::new()),
        &SerialCommunicator,
        &SurfConfig::default(),
    )?;

    assert_eq!(geometry.warnings.len(), 1);
    assert!(matches!(
        &geometry.warnings[0],
        AssemblyWarning::UnsortedCurve { name, .. } if name == "tee"
    ));

    let curve = geometry.curve("tee").unwrap();
    assert!(!curve.is_sorted());
    assert_eq!(curve.closure(), None);
    assert_eq!(curve.elements(), branched.as_slice());

    // The unsorted curve still takes part in projection
    let acc = geometry.project(&[Point3::new(2.0, 0.5, 0.0)], &SerialCommunicator, &SurfConfig::default())?;
    assert_relative_eq!(acc.distances2()[0], 0.25, epsilon = 1e-12);
    Ok(())
}

#[test]
fn test_load_project_and_write() -> Result<()> {
    let raw = RawMesh {
        coords: vec![
            [0.0, 0.0, 0.0],
            [1.0, 0.0, 0.0],
            [1.0, 1.0, 0.0],
            [0.0, 1.0, 0.0],
            [0.0, 0.0, 2.0],
            [1.0, 0.0, 2.0],
        ],
        tria_conn: vec![[1, 2, 3]],
        quads_conn: vec![[1, 2, 3, 4]],
        bars_conn: vec![[5, 6]],
        surf_tria_ptr: vec![1, 2, 2],
        surf_quads_ptr: vec![1, 1, 2],
        curve_bars_ptr: vec![1, 2],
        surf_names: vec!["WING".into(), "Body".into()],
        curve_names: vec!["te".into()],
    };

    let dir = tempfile::tempdir()?;
    let mesh_path = dir.path().join("mesh.json");
    std::fs::write(&mesh_path, serde_json::to_string(&raw)?)?;

    let config = SurfConfig::default();
    let geometry = load_geometry(&mesh_path, &["body"], &config)?;
    assert!(geometry.warnings.is_empty());
    assert_eq!(geometry.surface.mesh().quad_count(), 1);
    assert_eq!(geometry.surface.mesh().tria_count(), 0);
    assert_eq!(geometry.curves.len(), 1);

    let query = vec![Point3::new(0.25, 0.75, 0.5), Point3::new(0.5, 0.0, 1.75)];
    let acc = geometry.project(&query, &SerialCommunicator, &config)?;
    assert_relative_eq!(acc.distances2()[0], 0.25, epsilon = 1e-12);
    assert_relative_eq!(acc.auxiliary()[0], Vector3::new(0.0, 0.0, 1.0), epsilon = 1e-12);
    assert_relative_eq!(acc.distances2()[1], 0.0625, epsilon = 1e-12);
    assert_relative_eq!(acc.auxiliary()[1], Vector3::new(1.0, 0.0, 0.0), epsilon = 1e-12);

    let out = dir.path().join("projection.json");
    write_projection(&out, &query, &acc)?;
    let written: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&out)?)?;
    assert_eq!(written.as_array().map(Vec::len), Some(2));
    Ok(())
}

#[test]
fn test_default_selection_merges_every_surface() -> Result<()> {
    let raw = RawMesh {
        coords: vec![
            [0.0, 0.0, 0.0],
            [1.0, 0.0, 0.0],
            [1.0, 1.0, 0.0],
            [0.0, 1.0, 0.0],
        ],
        tria_conn: vec![[1, 2, 3]],
        quads_conn: vec![[1, 2, 3, 4]],
        bars_conn: vec![[1, 2], [2, 3], [1, 3]],
        surf_tria_ptr: vec![1, 2, 2],
        surf_quads_ptr: vec![1, 1, 2],
        curve_bars_ptr: vec![1, 3, 4],
        surf_names: vec!["Wing".into(), "Body".into()],
        curve_names: vec!["Edge".into(), "Diagonal".into()],
    };

    let config = SurfConfig::default();
    let sections = raw.into_sections(&config)?;
    let selection: Vec<String> = sections.surface_names().into_iter().map(str::to_string).collect();
    assert_eq!(selection, vec!["wing", "body"]);

    let geometry = assemble(
        &sections,
        selection.as_slice(),
        Arc::new(BvhBackend::with_leaf_size(config.leaf_size)),
        &SerialCommunicator,
        &config,
    )?;
    assert!(geometry.warnings.is_empty());
    assert_eq!(geometry.surface.mesh().tria_count(), 1);
    assert_eq!(geometry.surface.mesh().quad_count(), 1);
    assert_eq!(geometry.curves.len(), 2);
    assert_eq!(geometry.curve("diagonal").and_then(Curve::closure), Some(Closure::Open));
    Ok(())
}
