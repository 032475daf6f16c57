// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! discretesurf
//!
//! Discrete surface and curve geometry for projecting point clouds onto
//! meshed components. A mesh is split into named surface and curve
//! sections; selected surfaces are merged into one indexed surface, every
//! curve is sorted into an ordered chain, and query points are projected
//! onto all of them keeping the nearest result per point.

pub mod assembly;
pub mod cli;
pub mod comm;
pub mod config;
pub mod error;
pub mod geometry;
pub mod io;
pub mod projection;
pub mod search;
pub mod utils;

pub use assembly::{assemble, AssembledGeometry, AssemblyWarning, MeshSections, Section};
pub use comm::{Communicator, SerialCommunicator};
pub use config::SurfConfig;
pub use error::{SurfError, SurfResult};
pub use geometry::{
    sort_connectivity, Closure, CoordinateTable, Curve, CurveTopology, LineElement,
    ShiftCriterion, Surface, SurfaceMesh,
};
pub use io::{JsonMeshReader, MeshReader, RawMesh};
pub use projection::{project_all, Projectable, ProjectionAccumulator, ProjectionCandidates};
pub use search::{BvhBackend, PolylineSearch};

use anyhow::Result;
use std::path::Path;
use std::sync::Arc;

/// Read a JSON mesh file and assemble it in a single process
pub fn load_geometry<S: AsRef<str>>(
    path: impl AsRef<Path>,
    selection: &[S],
    config: &SurfConfig,
) -> Result<AssembledGeometry> {
    let sections = JsonMeshReader.read(path.as_ref())?.into_sections(config)?;
    let backend = Arc::new(BvhBackend::with_leaf_size(config.leaf_size));
    Ok(assemble(
        &sections,
        selection,
        backend,
        &SerialCommunicator,
        config,
    )?)
}
