// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! I/O module - mesh reading and projection output

mod json_reader;
mod reader;
mod results;

pub use json_reader::JsonMeshReader;
pub use reader::{MeshReader, RawMesh};
pub use results::{projection_records, read_points, write_projection, ProjectionRecord};
