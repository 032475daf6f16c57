// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Section assembly
//!
//! A mesh file holds named sections sharing one coordinate table. Selected
//! surface sections are merged into a single [`Surface`]; every curve
//! section becomes its own [`Curve`]. Bad input curves and bad selection
//! names are reported as [`AssemblyWarning`]s and never abort the batch.

use nalgebra::Point3;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

use crate::comm::Communicator;
use crate::config::SurfConfig;
use crate::error::{SurfError, SurfResult};
use crate::geometry::{
    sort_connectivity, CoordinateTable, Curve, CurveConnectivity, LineElement, Surface,
    SurfaceMesh,
};
use crate::projection::{project_all, Projectable, ProjectionAccumulator};
use crate::search::SurfaceIndexBackend;

/// Triangles and quads of one surface section, 0-based
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SurfaceSection {
    pub mesh: SurfaceMesh,
}

/// Unordered line elements of one curve section, 0-based
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurveSection {
    pub elements: Vec<LineElement>,
}

/// A named mesh section
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Section {
    Surface(SurfaceSection),
    Curve(CurveSection),
}

impl Section {
    pub fn is_surface(&self) -> bool {
        matches!(self, Section::Surface(_))
    }

    /// Number of triangles and quads, or line elements
    pub fn element_count(&self) -> usize {
        match self {
            Section::Surface(surface) => surface.mesh.element_count(),
            Section::Curve(curve) => curve.elements.len(),
        }
    }
}

/// Coordinate table plus the named sections that index into it
#[derive(Debug, Clone)]
pub struct MeshSections {
    pub coords: Arc<CoordinateTable>,
    sections: Vec<(String, Section)>,
}

impl MeshSections {
    pub fn new(coords: Arc<CoordinateTable>) -> Self {
        Self {
            coords,
            sections: Vec::new(),
        }
    }

    /// Add a section, replacing an earlier one with the same name in place
    pub fn insert(&mut self, name: impl Into<String>, section: Section) {
        let name = name.into();
        match self.sections.iter_mut().find(|(existing, _)| *existing == name) {
            Some(slot) => {
                log::warn!("Section {} defined twice, keeping the last definition", name);
                slot.1 = section;
            }
            None => self.sections.push((name, section)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&Section> {
        self.sections
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, section)| section)
    }

    pub fn surface(&self, name: &str) -> SurfResult<&SurfaceSection> {
        match self.get(name) {
            Some(Section::Surface(surface)) => Ok(surface),
            Some(Section::Curve(_)) => Err(SurfError::NotASurface { name: name.to_string() }),
            None => Err(SurfError::UnknownSection { name: name.to_string() }),
        }
    }

    pub fn curve(&self, name: &str) -> SurfResult<&CurveSection> {
        match self.get(name) {
            Some(Section::Curve(curve)) => Ok(curve),
            Some(Section::Surface(_)) => Err(SurfError::NotACurve { name: name.to_string() }),
            None => Err(SurfError::UnknownSection { name: name.to_string() }),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Section)> {
        self.sections.iter().map(|(name, section)| (name.as_str(), section))
    }

    pub fn surface_names(&self) -> Vec<&str> {
        self.iter()
            .filter(|(_, section)| section.is_surface())
            .map(|(name, _)| name)
            .collect()
    }

    pub fn curve_names(&self) -> Vec<&str> {
        self.iter()
            .filter(|(_, section)| !section.is_surface())
            .map(|(name, _)| name)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.sections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }
}

/// Non-fatal problem found while assembling
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AssemblyWarning {
    /// Selected name matches no section
    UnknownSection { name: String },
    /// Selected name is a curve section
    NotASurface { name: String },
    /// No surface elements were selected
    EmptySurface,
    /// Curve kept with its elements in input order
    UnsortedCurve { name: String, reason: String },
}

impl fmt::Display for AssemblyWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssemblyWarning::UnknownSection { name } => {
                write!(f, "{} is not a section of this mesh", name)
            }
            AssemblyWarning::NotASurface { name } => write!(f, "{} is not a surface section", name),
            AssemblyWarning::EmptySurface => write!(f, "no surface elements selected"),
            AssemblyWarning::UnsortedCurve { name, reason } => write!(
                f,
                "curve \"{}\" could not be sorted ({}); it might be composed of disconnected curves",
                name, reason
            ),
        }
    }
}

/// Surface and curves built from one mesh
#[derive(Debug)]
pub struct AssembledGeometry {
    pub surface: Surface,
    pub curves: Vec<(String, Curve)>,
    pub warnings: Vec<AssemblyWarning>,
}

impl AssembledGeometry {
    pub fn curve(&self, name: &str) -> Option<&Curve> {
        self.curves
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, curve)| curve)
    }

    pub fn curve_mut(&mut self, name: &str) -> Option<&mut Curve> {
        self.curves
            .iter_mut()
            .find(|(existing, _)| existing == name)
            .map(|(_, curve)| curve)
    }

    /// The surface followed by every curve, in section order
    pub fn objects(&self) -> Vec<&dyn Projectable> {
        std::iter::once(&self.surface as &dyn Projectable)
            .chain(self.curves.iter().map(|(_, curve)| curve as &dyn Projectable))
            .collect()
    }

    /// Best projection of `query` onto the surface and all curves
    pub fn project(
        &self,
        query: &[Point3<f64>],
        comm: &dyn Communicator,
        config: &SurfConfig,
    ) -> SurfResult<ProjectionAccumulator> {
        let mut acc = ProjectionAccumulator::with_sentinel(query.len(), config.sentinel_distance2);
        project_all(&self.objects(), query, &mut acc, comm)?;
        Ok(acc)
    }

    /// Move every object to new coordinates; collective over `comm`.
    ///
    /// Nothing is updated unless the table covers the nodes of the surface
    /// and of every curve.
    pub fn update_points(
        &mut self,
        coords: Arc<CoordinateTable>,
        comm: &dyn Communicator,
    ) -> SurfResult<()> {
        for (name, curve) in &self.curves {
            if let Err(err) = curve.check_coords(&coords) {
                log::error!("Curve {} cannot take the new coordinates: {}", name, err);
                return Err(err);
            }
        }

        self.surface.update_points(coords.clone(), comm)?;
        for (_, curve) in &mut self.curves {
            curve.update_points(coords.clone())?;
        }
        Ok(())
    }
}

/// Build the combined surface from `selection` and a curve for every curve
/// section.
///
/// Surface elements are concatenated in selection order; node indices are
/// global and are not renumbered. Selection names are normalized the same
/// way section names are. Building the surface is collective over `comm`
/// and happens even when nothing was selected.
pub fn assemble<S: AsRef<str>>(
    sections: &MeshSections,
    selection: &[S],
    backend: Arc<dyn SurfaceIndexBackend>,
    comm: &dyn Communicator,
    config: &SurfConfig,
) -> SurfResult<AssembledGeometry> {
    let mut warnings = Vec::new();
    let mut mesh = SurfaceMesh::default();

    for raw_name in selection {
        let name = config.normalize_name(raw_name.as_ref());
        match sections.surface(&name) {
            Ok(surface) => mesh.append(&surface.mesh),
            Err(err) => {
                log::warn!("Skipping selection: {}", err);
                warnings.push(match err {
                    SurfError::NotASurface { name } => AssemblyWarning::NotASurface { name },
                    _ => AssemblyWarning::UnknownSection { name },
                });
            }
        }
    }

    if mesh.is_empty() {
        log::warn!("No surface elements selected");
        warnings.push(AssemblyWarning::EmptySurface);
    }

    let surface = Surface::new(
        sections.coords.clone(),
        mesh,
        backend,
        config.bounding_box,
        comm,
    )?;

    let mut curves = Vec::new();
    for (name, section) in sections.iter() {
        let Section::Curve(section) = section else {
            continue;
        };

        let (curve, warning) = build_curve(sections.coords.clone(), name, section);
        warnings.extend(warning);
        curves.push((name.to_string(), curve));
    }

    log::info!(
        "Assembled surface with {} elements and {} curves ({} warnings)",
        surface.mesh().element_count(),
        curves.len(),
        warnings.len()
    );

    Ok(AssembledGeometry {
        surface,
        curves,
        warnings,
    })
}

/// Sort a curve section into a [`Curve`].
///
/// Elements that do not form a single chain are kept unsorted and the
/// sorter's reason comes back as an [`AssemblyWarning::UnsortedCurve`].
pub fn build_curve(
    coords: Arc<CoordinateTable>,
    name: &str,
    section: &CurveSection,
) -> (Curve, Option<AssemblyWarning>) {
    match sort_connectivity(&section.elements) {
        Ok(topology) => (Curve::new(coords, CurveConnectivity::Sorted(topology)), None),
        Err(err) => {
            let warning = AssemblyWarning::UnsortedCurve {
                name: name.to_string(),
                reason: err.to_string(),
            };
            log::warn!("{}", warning);
            let curve = Curve::new(coords, CurveConnectivity::Unsorted(section.elements.clone()));
            (curve, Some(warning))
        }
    }
}
