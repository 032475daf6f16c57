// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Nearest-point search primitives
//!
//! The spatial index and the curve search are opaque engines from the point
//! of view of the geometry layer. They are reached through the traits in
//! this module and return candidate projections by value; merging those
//! candidates into a running best answer is done by
//! [`ProjectionAccumulator`](crate::projection::ProjectionAccumulator).

mod bvh_backend;
mod polyline;

pub use bvh_backend::{BvhBackend, BvhSurfaceIndex};
pub use polyline::PolylineSearch;

use nalgebra::{Point3, Vector3};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

use crate::comm::Communicator;
use crate::error::SurfResult;
use crate::geometry::{BoundingBox, CoordinateTable, LineElement, SurfaceMesh};
use crate::projection::ProjectionCandidates;

/// Identifier of a built spatial index, unique per backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IndexId(pub u64);

impl fmt::Display for IndexId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "tree{:08}", self.0)
    }
}

/// Surface element that produced a projection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ElementRef {
    Tria(usize),
    Quad(usize),
}

/// Where on the surface a query point landed
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SurfaceHit {
    /// Rank of the process owning the element
    pub proc_id: usize,
    pub element: ElementRef,
    /// Parametric coordinates inside the element
    pub uvw: [f64; 3],
}

/// Result of one surface search
#[derive(Debug, Clone)]
pub struct SurfaceCandidates {
    /// Distances, points and interpolated normals
    pub candidates: ProjectionCandidates,
    /// Element information, `None` where nothing was found
    pub hits: Vec<Option<SurfaceHit>>,
}

/// Builds spatial indices over surface meshes.
///
/// `build` is a collective operation over `comm`.
pub trait SurfaceIndexBackend: Send + Sync {
    fn build(
        &self,
        coords: Arc<CoordinateTable>,
        mesh: Arc<SurfaceMesh>,
        bbox: Option<&BoundingBox>,
        comm: &dyn Communicator,
    ) -> SurfResult<Box<dyn SurfaceIndex>>;
}

/// A built spatial index, bound to the coordinates it was built from.
pub trait SurfaceIndex: Send + Sync + fmt::Debug {
    fn id(&self) -> IndexId;

    /// Number of elements held by the index
    fn element_count(&self) -> usize;

    /// Nearest surface point for every query point; collective over `comm`.
    ///
    /// Points with no element in reach get an infinite distance, a zero
    /// point and a zero normal.
    fn nearest(
        &self,
        query: &[Point3<f64>],
        nodal_normals: &[Vector3<f64>],
        comm: &dyn Communicator,
    ) -> SurfResult<SurfaceCandidates>;
}

/// Nearest point on a chain of line elements.
pub trait CurveSearch: Send + Sync {
    /// Candidates carry the unit tangent of the winning element, oriented
    /// along the element's traversal direction.
    fn nearest(
        &self,
        query: &[Point3<f64>],
        coords: &CoordinateTable,
        elements: &[LineElement],
    ) -> SurfResult<ProjectionCandidates>;
}
