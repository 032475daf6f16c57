// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Geometry module - meshes, curve topology and queryable objects

mod bbox;
mod bvh;
mod connectivity;
mod curve;
mod mesh;
mod orientation;
mod surface;

pub use bbox::BoundingBox;
pub use bvh::BVH;
pub use connectivity::{sort_connectivity, Closure, CurveTopology, LineElement};
pub use curve::{Curve, CurveConnectivity};
pub use mesh::{compute_nodal_normals, CoordinateTable, SurfaceMesh};
pub use orientation::{flip, flip_elements, shift_start, ShiftCriterion};
pub use surface::Surface;
