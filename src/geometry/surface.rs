// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Queryable surface built from triangle and quad sections

use nalgebra::{Point3, Vector3};
use std::sync::Arc;

use super::bbox::BoundingBox;
use super::mesh::{compute_nodal_normals, CoordinateTable, SurfaceMesh};
use crate::comm::Communicator;
use crate::error::{SurfError, SurfResult};
use crate::projection::{Projectable, ProjectionAccumulator};
use crate::search::{IndexId, SurfaceCandidates, SurfaceHit, SurfaceIndex, SurfaceIndexBackend};

/// Surface with derived nodal normals and its own spatial index.
///
/// The index is built when the surface is created and rebuilt whenever the
/// coordinates change; it is released when the surface is dropped. Creating
/// a surface, updating its points and projecting onto it are collective
/// operations.
pub struct Surface {
    coords: Arc<CoordinateTable>,
    mesh: Arc<SurfaceMesh>,
    nodal_normals: Vec<Vector3<f64>>,
    bbox: Option<BoundingBox>,
    backend: Arc<dyn SurfaceIndexBackend>,
    index: Box<dyn SurfaceIndex>,
}

impl Surface {
    pub fn new(
        coords: Arc<CoordinateTable>,
        mesh: SurfaceMesh,
        backend: Arc<dyn SurfaceIndexBackend>,
        bbox: Option<BoundingBox>,
        comm: &dyn Communicator,
    ) -> SurfResult<Self> {
        let mesh = Arc::new(mesh);
        check_nodes(&coords, &mesh)?;
        let nodal_normals = compute_nodal_normals(&coords, &mesh);
        let index = backend.build(coords.clone(), mesh.clone(), bbox.as_ref(), comm)?;

        log::info!(
            "Surface {} ready: {} trias, {} quads",
            index.id(),
            mesh.tria_count(),
            mesh.quad_count()
        );

        Ok(Self {
            coords,
            mesh,
            nodal_normals,
            bbox,
            backend,
            index,
        })
    }

    /// Replace the coordinates, recomputing normals and rebuilding the index
    pub fn update_points(
        &mut self,
        coords: Arc<CoordinateTable>,
        comm: &dyn Communicator,
    ) -> SurfResult<()> {
        check_nodes(&coords, &self.mesh)?;
        let nodal_normals = compute_nodal_normals(&coords, &self.mesh);
        let index = self
            .backend
            .build(coords.clone(), self.mesh.clone(), self.bbox.as_ref(), comm)?;

        log::debug!("Surface index {} replaced by {}", self.index.id(), index.id());
        self.coords = coords;
        self.nodal_normals = nodal_normals;
        self.index = index;
        Ok(())
    }

    /// Nearest surface point for every query point, without merging
    pub fn nearest(
        &self,
        query: &[Point3<f64>],
        comm: &dyn Communicator,
    ) -> SurfResult<SurfaceCandidates> {
        self.index.nearest(query, &self.nodal_normals, comm)
    }

    /// Project and merge into `acc`, returning the element hit per point
    /// for every point this surface improved
    pub fn project_with_hits(
        &self,
        query: &[Point3<f64>],
        acc: &mut ProjectionAccumulator,
        comm: &dyn Communicator,
    ) -> SurfResult<Vec<Option<SurfaceHit>>> {
        let before = acc.distances2().to_vec();
        let result = self.nearest(query, comm)?;
        acc.accumulate(query, &result.candidates)?;

        Ok(result
            .hits
            .into_iter()
            .zip(before)
            .zip(acc.distances2())
            .map(|((hit, old), new)| if *new < old { hit } else { None })
            .collect())
    }

    pub fn coords(&self) -> &Arc<CoordinateTable> {
        &self.coords
    }

    pub fn mesh(&self) -> &SurfaceMesh {
        &self.mesh
    }

    pub fn nodal_normals(&self) -> &[Vector3<f64>] {
        &self.nodal_normals
    }

    pub fn index_id(&self) -> IndexId {
        self.index.id()
    }

    pub fn is_empty(&self) -> bool {
        self.mesh.is_empty()
    }
}

impl std::fmt::Debug for Surface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Surface")
            .field("index", &self.index.id())
            .field("trias", &self.mesh.tria_count())
            .field("quads", &self.mesh.quad_count())
            .field("nodes", &self.coords.len())
            .finish()
    }
}

impl Projectable for Surface {
    fn project(
        &self,
        query: &[Point3<f64>],
        acc: &mut ProjectionAccumulator,
        comm: &dyn Communicator,
    ) -> SurfResult<usize> {
        let result = self.nearest(query, comm)?;
        acc.accumulate(query, &result.candidates)
    }
}

fn check_nodes(coords: &CoordinateTable, mesh: &SurfaceMesh) -> SurfResult<()> {
    match mesh.max_node() {
        Some(node) if node >= coords.len() => Err(SurfError::NodeIndexOutOfRange {
            index: node as i64,
            node_count: coords.len(),
        }),
        _ => Ok(()),
    }
}
