// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Reversing and rotating ordered curves

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::connectivity::{CurveTopology, LineElement};
use super::mesh::CoordinateTable;
use crate::error::{SurfError, SurfResult};

/// Geometric extremum used to pick the start node of a periodic curve
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ShiftCriterion {
    MaxX,
    MaxY,
    MaxZ,
    MinX,
    MinY,
    MinZ,
}

impl ShiftCriterion {
    fn axis(self) -> usize {
        match self {
            ShiftCriterion::MaxX | ShiftCriterion::MinX => 0,
            ShiftCriterion::MaxY | ShiftCriterion::MinY => 1,
            ShiftCriterion::MaxZ | ShiftCriterion::MinZ => 2,
        }
    }

    /// Score where larger is better
    fn score(self, value: f64) -> f64 {
        match self {
            ShiftCriterion::MaxX | ShiftCriterion::MaxY | ShiftCriterion::MaxZ => value,
            ShiftCriterion::MinX | ShiftCriterion::MinY | ShiftCriterion::MinZ => -value,
        }
    }
}

impl FromStr for ShiftCriterion {
    type Err = SurfError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "maxx" => Ok(ShiftCriterion::MaxX),
            "maxy" => Ok(ShiftCriterion::MaxY),
            "maxz" => Ok(ShiftCriterion::MaxZ),
            "minx" => Ok(ShiftCriterion::MinX),
            "miny" => Ok(ShiftCriterion::MinY),
            "minz" => Ok(ShiftCriterion::MinZ),
            _ => Err(SurfError::UnknownCriterion(s.to_string())),
        }
    }
}

impl fmt::Display for ShiftCriterion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ShiftCriterion::MaxX => "maxX",
            ShiftCriterion::MaxY => "maxY",
            ShiftCriterion::MaxZ => "maxZ",
            ShiftCriterion::MinX => "minX",
            ShiftCriterion::MinY => "minY",
            ShiftCriterion::MinZ => "minZ",
        };
        f.write_str(name)
    }
}

/// Reverse element order and swap the nodes of every element
pub fn flip_elements(elements: &[LineElement]) -> Vec<LineElement> {
    elements.iter().rev().map(LineElement::reversed).collect()
}

/// Traverse the curve in the opposite direction
pub fn flip(topology: &CurveTopology) -> CurveTopology {
    CurveTopology::from_parts_unchecked(flip_elements(topology.elements()), topology.closure())
}

/// Rotate a periodic curve so it starts at the node that best meets `criterion`.
///
/// Only the starting offset changes. Ties go to the earliest element in
/// the current traversal order. Open curves are rejected.
pub fn shift_start(
    topology: &CurveTopology,
    coords: &CoordinateTable,
    criterion: ShiftCriterion,
) -> SurfResult<CurveTopology> {
    if !topology.is_periodic() {
        return Err(SurfError::OpenCurveShift);
    }
    if topology.is_empty() {
        return Err(SurfError::EmptyCurve);
    }

    let axis = criterion.axis();
    let mut best_offset = 0;
    let mut best_score = f64::NEG_INFINITY;

    for (offset, element) in topology.elements().iter().enumerate() {
        let point = coords.get(element.first()).ok_or(SurfError::NodeIndexOutOfRange {
            index: element.first() as i64,
            node_count: coords.len(),
        })?;
        let score = criterion.score(point[axis]);
        if score > best_score {
            best_score = score;
            best_offset = offset;
        }
    }

    let mut elements = topology.elements().to_vec();
    elements.rotate_left(best_offset);

    Ok(CurveTopology::from_parts_unchecked(elements, topology.closure()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::connectivity::{sort_connectivity, Closure};

    fn elems(pairs: &[(usize, usize)]) -> Vec<LineElement> {
        pairs.iter().map(|&(a, b)| LineElement(a, b)).collect()
    }

    fn square() -> CoordinateTable {
        CoordinateTable::from_rows(&[
            [0.0, 0.0, 0.0],
            [1.0, 0.0, 0.0],
            [1.0, 1.0, 0.5],
            [0.0, 1.0, 0.0],
        ])
    }

    #[test]
    fn test_flip_open() {
        let topology = sort_connectivity(&elems(&[(0, 1), (1, 2), (2, 3)])).unwrap();
        let flipped = flip(&topology);

        assert_eq!(flipped.elements(), elems(&[(3, 2), (2, 1), (1, 0)]).as_slice());
        assert_eq!(flipped.closure(), Closure::Open);
        assert_eq!(flip(&flipped), topology);
    }

    #[test]
    fn test_shift_start_max_y() {
        let topology = sort_connectivity(&elems(&[(0, 1), (1, 2), (2, 3), (3, 0)])).unwrap();
        let shifted = shift_start(&topology, &square(), ShiftCriterion::MaxY).unwrap();

        // Nodes 2 and 3 tie on y; node 2 comes first along the curve
        assert_eq!(
            shifted.elements(),
            elems(&[(2, 3), (3, 0), (0, 1), (1, 2)]).as_slice()
        );
        assert!(shifted.is_periodic());
    }

    #[test]
    fn test_shift_start_min_x_and_max_z() {
        let topology = sort_connectivity(&elems(&[(1, 2), (2, 3), (3, 0), (0, 1)])).unwrap();

        let shifted = shift_start(&topology, &square(), ShiftCriterion::MinX).unwrap();
        assert_eq!(shifted.start_node(), Some(3));

        let shifted = shift_start(&topology, &square(), ShiftCriterion::MaxZ).unwrap();
        assert_eq!(shifted.start_node(), Some(2));
    }

    #[test]
    fn test_shift_start_rejects_open_curve() {
        let topology = sort_connectivity(&elems(&[(0, 1), (1, 2)])).unwrap();
        assert_eq!(
            shift_start(&topology, &square(), ShiftCriterion::MaxY),
            Err(SurfError::OpenCurveShift)
        );
    }

    #[test]
    fn test_criterion_parsing() {
        assert_eq!("maxY".parse::<ShiftCriterion>().unwrap(), ShiftCriterion::MaxY);
        assert_eq!(" MINZ ".parse::<ShiftCriterion>().unwrap(), ShiftCriterion::MinZ);
        assert!("top".parse::<ShiftCriterion>().is_err());
        assert_eq!(ShiftCriterion::MaxY.to_string(), "maxY");
    }
}
