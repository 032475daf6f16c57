// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Coordinate tables and surface connectivity

use nalgebra::{Point3, Vector3};
use serde::{Deserialize, Serialize};

/// Node coordinates shared by every section of a mesh.
///
/// Node indices used throughout the crate are 0-based positions in this
/// table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CoordinateTable {
    points: Vec<Point3<f64>>,
}

impl CoordinateTable {
    pub fn new(points: Vec<Point3<f64>>) -> Self {
        Self { points }
    }

    pub fn from_rows(rows: &[[f64; 3]]) -> Self {
        Self {
            points: rows.iter().map(|r| Point3::new(r[0], r[1], r[2])).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn get(&self, node: usize) -> Option<&Point3<f64>> {
        self.points.get(node)
    }

    pub fn points(&self) -> &[Point3<f64>] {
        &self.points
    }
}

impl std::ops::Index<usize> for CoordinateTable {
    type Output = Point3<f64>;

    fn index(&self, node: usize) -> &Self::Output {
        &self.points[node]
    }
}

/// Triangle and quad connectivity of a surface
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SurfaceMesh {
    pub trias: Vec<[usize; 3]>,
    pub quads: Vec<[usize; 4]>,
}

impl SurfaceMesh {
    pub fn new(trias: Vec<[usize; 3]>, quads: Vec<[usize; 4]>) -> Self {
        Self { trias, quads }
    }

    /// Append another section's elements; node indices are already global
    pub fn append(&mut self, other: &SurfaceMesh) {
        self.trias.extend_from_slice(&other.trias);
        self.quads.extend_from_slice(&other.quads);
    }

    pub fn tria_count(&self) -> usize {
        self.trias.len()
    }

    pub fn quad_count(&self) -> usize {
        self.quads.len()
    }

    pub fn element_count(&self) -> usize {
        self.trias.len() + self.quads.len()
    }

    pub fn is_empty(&self) -> bool {
        self.element_count() == 0
    }

    /// Largest node index referenced by any element
    pub fn max_node(&self) -> Option<usize> {
        let tria_max = self.trias.iter().flat_map(|t| t.iter()).max();
        let quad_max = self.quads.iter().flat_map(|q| q.iter()).max();
        tria_max.max(quad_max).copied()
    }
}

/// Compute one unit normal per node from the adjacent elements.
///
/// Face normals are accumulated with area weighting. Quads use the cross
/// product of their diagonals. Nodes not touched by any element get +Z.
pub fn compute_nodal_normals(coords: &CoordinateTable, mesh: &SurfaceMesh) -> Vec<Vector3<f64>> {
    let mut normal_sums: Vec<Vector3<f64>> = vec![Vector3::zeros(); coords.len()];

    // Both cross products below have norm equal to twice the face area
    for tria in &mesh.trias {
        let p0 = &coords[tria[0]];
        let p1 = &coords[tria[1]];
        let p2 = &coords[tria[2]];
        let face_normal = (p1 - p0).cross(&(p2 - p0));
        for &node in tria {
            normal_sums[node] += face_normal;
        }
    }

    for quad in &mesh.quads {
        let p0 = &coords[quad[0]];
        let p1 = &coords[quad[1]];
        let p2 = &coords[quad[2]];
        let p3 = &coords[quad[3]];
        let face_normal = (p2 - p0).cross(&(p3 - p1));
        for &node in quad {
            normal_sums[node] += face_normal;
        }
    }

    normal_sums
        .into_iter()
        .map(|sum| {
            let norm = sum.norm();
            if norm > 0.0 {
                sum / norm
            } else {
                Vector3::new(0.0, 0.0, 1.0)
            }
        })
        .collect()
}
