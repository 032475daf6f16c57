// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Curves made of line elements over the shared coordinate table

use nalgebra::Point3;
use std::sync::Arc;

use super::connectivity::{Closure, CurveTopology, LineElement};
use super::mesh::CoordinateTable;
use super::orientation::{self, ShiftCriterion};
use crate::comm::Communicator;
use crate::error::{SurfError, SurfResult};
use crate::projection::{Projectable, ProjectionAccumulator, ProjectionCandidates};
use crate::search::{CurveSearch, PolylineSearch};

/// Line elements of a curve, either walked into a chain or kept as read
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CurveConnectivity {
    Sorted(CurveTopology),
    /// Elements that could not be sorted, in their original order
    Unsorted(Vec<LineElement>),
}

impl CurveConnectivity {
    pub fn elements(&self) -> &[LineElement] {
        match self {
            CurveConnectivity::Sorted(topology) => topology.elements(),
            CurveConnectivity::Unsorted(elements) => elements,
        }
    }
}

pub struct Curve {
    coords: Arc<CoordinateTable>,
    connectivity: CurveConnectivity,
    search: Arc<dyn CurveSearch>,
}

impl Curve {
    pub fn new(coords: Arc<CoordinateTable>, connectivity: CurveConnectivity) -> Self {
        Self::with_search(coords, connectivity, Arc::new(PolylineSearch))
    }

    pub fn with_search(
        coords: Arc<CoordinateTable>,
        connectivity: CurveConnectivity,
        search: Arc<dyn CurveSearch>,
    ) -> Self {
        Self {
            coords,
            connectivity,
            search,
        }
    }

    pub fn coords(&self) -> &Arc<CoordinateTable> {
        &self.coords
    }

    pub fn connectivity(&self) -> &CurveConnectivity {
        &self.connectivity
    }

    pub fn elements(&self) -> &[LineElement] {
        self.connectivity.elements()
    }

    pub fn topology(&self) -> Option<&CurveTopology> {
        match &self.connectivity {
            CurveConnectivity::Sorted(topology) => Some(topology),
            CurveConnectivity::Unsorted(_) => None,
        }
    }

    pub fn is_sorted(&self) -> bool {
        matches!(self.connectivity, CurveConnectivity::Sorted(_))
    }

    /// `None` when the elements could not be sorted
    pub fn closure(&self) -> Option<Closure> {
        self.topology().map(CurveTopology::closure)
    }

    pub fn len(&self) -> usize {
        self.elements().len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements().is_empty()
    }

    /// Polyline through the curve: the first node of every element followed
    /// by the second node of the last one. Periodic curves repeat their
    /// start point at the end.
    pub fn extract_points(&self) -> SurfResult<Vec<Point3<f64>>> {
        let elements = self.elements();
        let Some(last) = elements.last() else {
            return Ok(Vec::new());
        };

        elements
            .iter()
            .map(LineElement::first)
            .chain(std::iter::once(last.second()))
            .map(|node| self.point(node))
            .collect()
    }

    /// Reverse the traversal direction
    pub fn flip(&mut self) {
        self.connectivity = match &self.connectivity {
            CurveConnectivity::Sorted(topology) => CurveConnectivity::Sorted(orientation::flip(topology)),
            CurveConnectivity::Unsorted(elements) => {
                CurveConnectivity::Unsorted(orientation::flip_elements(elements))
            }
        };
    }

    /// Rotate a periodic curve to start at the node selected by `criterion`
    pub fn shift_start(&mut self, criterion: ShiftCriterion) -> SurfResult<()> {
        let topology = self.topology().ok_or(SurfError::OpenCurveShift)?;
        let shifted = orientation::shift_start(topology, &self.coords, criterion)?;
        log::debug!(
            "Shifted curve start to node {:?} ({})",
            shifted.start_node(),
            criterion
        );
        self.connectivity = CurveConnectivity::Sorted(shifted);
        Ok(())
    }

    /// Check that `coords` covers every node this curve references
    pub fn check_coords(&self, coords: &CoordinateTable) -> SurfResult<()> {
        let max_node = self
            .elements()
            .iter()
            .map(|element| element.0.max(element.1))
            .max();
        match max_node {
            Some(node) if node >= coords.len() => Err(SurfError::NodeIndexOutOfRange {
                index: node as i64,
                node_count: coords.len(),
            }),
            _ => Ok(()),
        }
    }

    pub fn update_points(&mut self, coords: Arc<CoordinateTable>) -> SurfResult<()> {
        self.check_coords(&coords)?;
        self.coords = coords;
        Ok(())
    }

    /// Nearest point on the curve for every query point, without merging
    pub fn nearest(&self, query: &[Point3<f64>]) -> SurfResult<ProjectionCandidates> {
        self.search.nearest(query, &self.coords, self.elements())
    }

    fn point(&self, node: usize) -> SurfResult<Point3<f64>> {
        self.coords
            .get(node)
            .copied()
            .ok_or(SurfError::NodeIndexOutOfRange {
                index: node as i64,
                node_count: self.coords.len(),
            })
    }
}

impl std::fmt::Debug for Curve {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Curve")
            .field("connectivity", &self.connectivity)
            .field("nodes", &self.coords.len())
            .finish()
    }
}

impl Projectable for Curve {
    /// Curves are replicated on every process; `comm` is not used.
    fn project(
        &self,
        query: &[Point3<f64>],
        acc: &mut ProjectionAccumulator,
        _comm: &dyn Communicator,
    ) -> SurfResult<usize> {
        let candidates = self.nearest(query)?;
        acc.accumulate(query, &candidates)
    }
}
