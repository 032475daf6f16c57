// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! In-process spatial index built on the crate's BVH

use nalgebra::{Point3, Vector3};
use rayon::prelude::*;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use super::{ElementRef, IndexId, SurfaceCandidates, SurfaceHit, SurfaceIndex, SurfaceIndexBackend};
use crate::comm::Communicator;
use crate::error::{SurfError, SurfResult};
use crate::geometry::{BoundingBox, CoordinateTable, SurfaceMesh, BVH};
use crate::projection::ProjectionCandidates;
use crate::utils::math::{closest_point_on_triangle, normalize_or_zero};

/// Builds [`BvhSurfaceIndex`] instances for a single process.
#[derive(Debug)]
pub struct BvhBackend {
    leaf_size: usize,
    next_id: AtomicU64,
}

impl BvhBackend {
    pub fn new() -> Self {
        Self::with_leaf_size(4)
    }

    pub fn with_leaf_size(leaf_size: usize) -> Self {
        Self {
            leaf_size: leaf_size.max(1),
            next_id: AtomicU64::new(0),
        }
    }
}

impl Default for BvhBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl SurfaceIndexBackend for BvhBackend {
    fn build(
        &self,
        coords: Arc<CoordinateTable>,
        mesh: Arc<SurfaceMesh>,
        bbox: Option<&BoundingBox>,
        comm: &dyn Communicator,
    ) -> SurfResult<Box<dyn SurfaceIndex>> {
        comm.barrier();
        let id = IndexId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let index = BvhSurfaceIndex::build(id, coords, mesh, bbox, self.leaf_size)?;
        log::debug!(
            "Built spatial index {} over {} elements",
            index.id,
            index.element_count()
        );
        Ok(Box::new(index))
    }
}

/// Spatial index over the triangles and quads of one surface
#[derive(Debug)]
pub struct BvhSurfaceIndex {
    id: IndexId,
    coords: Arc<CoordinateTable>,
    mesh: Arc<SurfaceMesh>,
    /// Items are element refs; the BVH stores positions in this list
    elements: Vec<ElementRef>,
    bvh: BVH,
}

/// Closest point on one element
struct ElementProjection {
    point: Point3<f64>,
    distance2: f64,
    uvw: [f64; 3],
    normal: Vector3<f64>,
}

impl BvhSurfaceIndex {
    fn build(
        id: IndexId,
        coords: Arc<CoordinateTable>,
        mesh: Arc<SurfaceMesh>,
        bbox: Option<&BoundingBox>,
        leaf_size: usize,
    ) -> SurfResult<Self> {
        if let Some(max_node) = mesh.max_node() {
            if max_node >= coords.len() {
                return Err(SurfError::NodeIndexOutOfRange {
                    index: max_node as i64,
                    node_count: coords.len(),
                });
            }
        }

        let all = (0..mesh.tria_count())
            .map(ElementRef::Tria)
            .chain((0..mesh.quad_count()).map(ElementRef::Quad));

        let mut elements = Vec::with_capacity(mesh.element_count());
        let mut items = Vec::with_capacity(mesh.element_count());
        for element in all {
            let element_bbox = element_bbox(&coords, &mesh, element);
            if bbox.map_or(true, |b| b.intersects(&element_bbox)) {
                items.push((elements.len(), element_bbox));
                elements.push(element);
            }
        }

        let bvh = BVH::build(items, leaf_size);
        Ok(Self {
            id,
            coords,
            mesh,
            elements,
            bvh,
        })
    }

    fn project_onto(
        &self,
        point: &Point3<f64>,
        element: ElementRef,
        normals: &[Vector3<f64>],
    ) -> ElementProjection {
        match element {
            ElementRef::Tria(i) => {
                let [n0, n1, n2] = self.mesh.trias[i];
                let (q, bary) = closest_point_on_triangle(
                    point,
                    &self.coords[n0],
                    &self.coords[n1],
                    &self.coords[n2],
                );
                let normal = normals[n0] * bary[0] + normals[n1] * bary[1] + normals[n2] * bary[2];
                ElementProjection {
                    point: q,
                    distance2: (q - point).norm_squared(),
                    uvw: [bary[1], bary[2], 0.0],
                    normal: normalize_or_zero(&normal),
                }
            }
            ElementRef::Quad(i) => {
                let [n0, n1, n2, n3] = self.mesh.quads[i];
                let p0 = &self.coords[n0];
                let p2 = &self.coords[n2];

                // Split along the 0-2 diagonal and map back to (u, v)
                let (qa, ba) = closest_point_on_triangle(point, p0, &self.coords[n1], p2);
                let (qb, bb) = closest_point_on_triangle(point, p0, p2, &self.coords[n3]);
                let da = (qa - point).norm_squared();
                let db = (qb - point).norm_squared();
                let (q, distance2, u, v) = if da <= db {
                    (qa, da, ba[1] + ba[2], ba[2])
                } else {
                    (qb, db, bb[1], bb[1] + bb[2])
                };

                let normal = normals[n0] * ((1.0 - u) * (1.0 - v))
                    + normals[n1] * (u * (1.0 - v))
                    + normals[n2] * (u * v)
                    + normals[n3] * ((1.0 - u) * v);
                ElementProjection {
                    point: q,
                    distance2,
                    uvw: [u, v, 0.0],
                    normal: normalize_or_zero(&normal),
                }
            }
        }
    }

    fn nearest_one(
        &self,
        point: &Point3<f64>,
        normals: &[Vector3<f64>],
    ) -> Option<(ElementRef, ElementProjection)> {
        let (item, _) = self.bvh.nearest(point, |item| {
            self.project_onto(point, self.elements[item], normals).distance2
        })?;
        let element = self.elements[item];
        Some((element, self.project_onto(point, element, normals)))
    }
}

impl SurfaceIndex for BvhSurfaceIndex {
    fn id(&self) -> IndexId {
        self.id
    }

    fn element_count(&self) -> usize {
        self.elements.len()
    }

    fn nearest(
        &self,
        query: &[Point3<f64>],
        nodal_normals: &[Vector3<f64>],
        comm: &dyn Communicator,
    ) -> SurfResult<SurfaceCandidates> {
        if nodal_normals.len() != self.coords.len() {
            return Err(SurfError::length_mismatch(
                "nodal normals",
                self.coords.len(),
                nodal_normals.len(),
            ));
        }
        comm.barrier();

        let results: Vec<_> = query
            .par_iter()
            .map(|point| self.nearest_one(point, nodal_normals))
            .collect();

        let proc_id = comm.rank();
        let mut candidates = ProjectionCandidates::unreachable(query.len());
        let mut hits = vec![None; query.len()];
        for (i, result) in results.into_iter().enumerate() {
            if let Some((element, projection)) = result {
                candidates.distances2[i] = projection.distance2;
                candidates.points[i] = projection.point;
                candidates.auxiliary[i] = projection.normal;
                hits[i] = Some(SurfaceHit {
                    proc_id,
                    element,
                    uvw: projection.uvw,
                });
            }
        }

        Ok(SurfaceCandidates { candidates, hits })
    }
}

fn element_bbox(coords: &CoordinateTable, mesh: &SurfaceMesh, element: ElementRef) -> BoundingBox {
    match element {
        ElementRef::Tria(i) => BoundingBox::from_points(mesh.trias[i].iter().map(|&n| &coords[n])),
        ElementRef::Quad(i) => BoundingBox::from_points(mesh.quads[i].iter().map(|&n| &coords[n])),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::comm::SerialCommunicator;
    use crate::geometry::compute_nodal_normals;
    use approx::assert_relative_eq;

    fn plate() -> (Arc<CoordinateTable>, Arc<SurfaceMesh>) {
        // Unit quad in z = 0 next to a triangle in x = 2
        let coords = CoordinateTable::from_rows(&[
            [0.0, 0.0, 0.0],
            [1.0, 0.0, 0.0],
            [1.0, 1.0, 0.0],
            [0.0, 1.0, 0.0],
            [2.0, 0.0, 0.0],
            [2.0, 1.0, 0.0],
            [2.0, 0.0, 1.0],
        ]);
        let mesh = SurfaceMesh::new(vec![[4, 5, 6]], vec![[0, 1, 2, 3]]);
        (Arc::new(coords), Arc::new(mesh))
    }

    #[test]
    fn test_nearest_on_quad() {
        let (coords, mesh) = plate();
        let normals = compute_nodal_normals(&coords, &mesh);
        let backend = BvhBackend::new();
        let index = backend
            .build(coords, mesh, None, &SerialCommunicator)
            .unwrap();

        let query = [Point3::new(0.25, 0.75, 2.0)];
        let result = index.nearest(&query, &normals, &SerialCommunicator).unwrap();

        assert_relative_eq!(result.candidates.distances2[0], 4.0, epsilon = 1e-12);
        assert_relative_eq!(result.candidates.points[0], Point3::new(0.25, 0.75, 0.0), epsilon = 1e-12);
        assert_relative_eq!(result.candidates.auxiliary[0], Vector3::new(0.0, 0.0, 1.0), epsilon = 1e-12);

        let hit = result.hits[0].unwrap();
        assert_eq!(hit.element, ElementRef::Quad(0));
        assert_eq!(hit.proc_id, 0);
        assert_relative_eq!(hit.uvw[0], 0.25, epsilon = 1e-12);
        assert_relative_eq!(hit.uvw[1], 0.75, epsilon = 1e-12);
    }

    #[test]
    fn test_nearest_on_tria() {
        let (coords, mesh) = plate();
        let normals = compute_nodal_normals(&coords, &mesh);
        let index = BvhBackend::new()
            .build(coords, mesh, None, &SerialCommunicator)
            .unwrap();

        let query = [Point3::new(3.0, 0.25, 0.25)];
        let result = index.nearest(&query, &normals, &SerialCommunicator).unwrap();

        assert_relative_eq!(result.candidates.distances2[0], 1.0, epsilon = 1e-12);
        assert_eq!(result.hits[0].unwrap().element, ElementRef::Tria(0));
        assert_relative_eq!(result.candidates.auxiliary[0].x.abs(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_bounding_box_filters_elements() {
        let (coords, mesh) = plate();
        let window = BoundingBox::new(Point3::new(1.5, -1.0, -1.0), Point3::new(3.0, 2.0, 2.0));
        let index = BvhBackend::new()
            .build(coords, mesh, Some(&window), &SerialCommunicator)
            .unwrap();
        assert_eq!(index.element_count(), 1);
    }

    #[test]
    fn test_empty_index_returns_unreachable() {
        let coords = Arc::new(CoordinateTable::from_rows(&[[0.0, 0.0, 0.0]]));
        let mesh = Arc::new(SurfaceMesh::default());
        let normals = compute_nodal_normals(&coords, &mesh);
        let index = BvhBackend::new()
            .build(coords, mesh, None, &SerialCommunicator)
            .unwrap();

        let result = index
            .nearest(&[Point3::new(1.0, 1.0, 1.0)], &normals, &SerialCommunicator)
            .unwrap();
        assert_eq!(result.candidates.distances2[0], f64::INFINITY);
        assert!(result.hits[0].is_none());
    }

    #[test]
    fn test_ids_are_unique_per_backend() {
        let (coords, mesh) = plate();
        let backend = BvhBackend::new();
        let a = backend
            .build(coords.clone(), mesh.clone(), None, &SerialCommunicator)
            .unwrap();
        let b = backend.build(coords, mesh, None, &SerialCommunicator).unwrap();
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn test_out_of_range_node_is_rejected() {
        let coords = Arc::new(CoordinateTable::from_rows(&[[0.0, 0.0, 0.0]]));
        let mesh = Arc::new(SurfaceMesh::new(vec![[0, 1, 2]], vec![]));
        let err = BvhBackend::new()
            .build(coords, mesh, None, &SerialCommunicator)
            .unwrap_err();
        assert!(matches!(err, SurfError::NodeIndexOutOfRange { .. }));
    }
}
