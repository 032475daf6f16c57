// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Raw mesh data and the 1-based to 0-based boundary
//!
//! Mesh files store node indices starting at 1 and describe sections with
//! CSR-style pointer arrays, also 1-based: section `k` owns entries
//! `ptr[k] - 1 .. ptr[k + 1] - 1` of the global connectivity. Everything
//! downstream of [`RawMesh::into_sections`] is 0-based.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;

use crate::assembly::{CurveSection, MeshSections, Section, SurfaceSection};
use crate::config::SurfConfig;
use crate::error::{SurfError, SurfResult};
use crate::geometry::{CoordinateTable, LineElement, SurfaceMesh};

/// Source of raw mesh data
pub trait MeshReader {
    fn read(&self, path: &Path) -> Result<RawMesh>;
}

/// Mesh exactly as stored on disk, with 1-based node indices
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawMesh {
    pub coords: Vec<[f64; 3]>,
    pub tria_conn: Vec<[i64; 3]>,
    pub quads_conn: Vec<[i64; 4]>,
    pub bars_conn: Vec<[i64; 2]>,
    pub surf_tria_ptr: Vec<usize>,
    pub surf_quads_ptr: Vec<usize>,
    pub curve_bars_ptr: Vec<usize>,
    pub surf_names: Vec<String>,
    pub curve_names: Vec<String>,
}

impl RawMesh {
    /// Slice the global connectivity into named 0-based sections.
    ///
    /// This is the only place where node indices are shifted.
    pub fn into_sections(self, config: &SurfConfig) -> SurfResult<MeshSections> {
        let node_count = self.coords.len();
        let tria_ranges = section_ranges("surf_tria_ptr", &self.surf_tria_ptr, self.surf_names.len(), self.tria_conn.len())?;
        let quad_ranges = section_ranges("surf_quads_ptr", &self.surf_quads_ptr, self.surf_names.len(), self.quads_conn.len())?;
        let bar_ranges = section_ranges("curve_bars_ptr", &self.curve_bars_ptr, self.curve_names.len(), self.bars_conn.len())?;

        let mut sections = MeshSections::new(Arc::new(CoordinateTable::from_rows(&self.coords)));

        for (k, raw_name) in self.surf_names.iter().enumerate() {
            let trias = self.tria_conn[tria_ranges[k].clone()]
                .iter()
                .map(|element| to_zero_based(element, node_count))
                .collect::<SurfResult<Vec<_>>>()?;
            let quads = self.quads_conn[quad_ranges[k].clone()]
                .iter()
                .map(|element| to_zero_based(element, node_count))
                .collect::<SurfResult<Vec<_>>>()?;

            sections.insert(
                config.normalize_name(raw_name),
                Section::Surface(SurfaceSection {
                    mesh: SurfaceMesh::new(trias, quads),
                }),
            );
        }

        for (k, raw_name) in self.curve_names.iter().enumerate() {
            let elements = self.bars_conn[bar_ranges[k].clone()]
                .iter()
                .map(|element| to_zero_based(element, node_count).map(LineElement::from))
                .collect::<SurfResult<Vec<_>>>()?;

            sections.insert(
                config.normalize_name(raw_name),
                Section::Curve(CurveSection { elements }),
            );
        }

        log::debug!(
            "Read {} nodes, {} surface and {} curve sections",
            node_count,
            self.surf_names.len(),
            self.curve_names.len()
        );
        Ok(sections)
    }
}

fn to_zero_based<const N: usize>(element: &[i64; N], node_count: usize) -> SurfResult<[usize; N]> {
    let mut nodes = [0usize; N];
    for (slot, &raw) in nodes.iter_mut().zip(element) {
        if raw < 1 || raw as u64 > node_count as u64 {
            return Err(SurfError::NodeIndexOutOfRange {
                index: raw,
                node_count,
            });
        }
        *slot = (raw - 1) as usize;
    }
    Ok(nodes)
}

/// 0-based element ranges for `sections` sections of a connectivity array
/// holding `total` elements
fn section_ranges(
    what: &str,
    ptr: &[usize],
    sections: usize,
    total: usize,
) -> SurfResult<Vec<std::ops::Range<usize>>> {
    if sections == 0 {
        return Ok(Vec::new());
    }
    if ptr.len() != sections + 1 {
        return Err(SurfError::SectionLayout {
            reason: format!("{} has {} entries for {} sections", what, ptr.len(), sections),
        });
    }

    ptr.windows(2)
        .map(|pair| {
            let (start, end) = (pair[0], pair[1]);
            if start < 1 || end < start || end - 1 > total {
                return Err(SurfError::SectionLayout {
                    reason: format!("{} range {}..{} invalid for {} elements", what, start, end, total),
                });
            }
            Ok(start - 1..end - 1)
        })
        .collect()
}
