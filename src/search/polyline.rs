// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Exact nearest-point search on line-element curves

use nalgebra::Point3;
use rayon::prelude::*;

use super::CurveSearch;
use crate::error::{SurfError, SurfResult};
use crate::geometry::{CoordinateTable, LineElement};
use crate::projection::ProjectionCandidates;
use crate::utils::math::{closest_point_on_segment, normalize_or_zero};

/// Checks every element of the curve for every query point.
///
/// Curves are replicated on all processes, so no communication happens.
#[derive(Debug, Clone, Copy, Default)]
pub struct PolylineSearch;

impl CurveSearch for PolylineSearch {
    fn nearest(
        &self,
        query: &[Point3<f64>],
        coords: &CoordinateTable,
        elements: &[LineElement],
    ) -> SurfResult<ProjectionCandidates> {
        if let Some(bad) = elements
            .iter()
            .flat_map(|e| [e.first(), e.second()])
            .find(|&node| node >= coords.len())
        {
            return Err(SurfError::NodeIndexOutOfRange {
                index: bad as i64,
                node_count: coords.len(),
            });
        }

        let results: Vec<Option<(f64, Point3<f64>, usize)>> = query
            .par_iter()
            .map(|point| {
                let mut best: Option<(f64, Point3<f64>, usize)> = None;
                for (id, element) in elements.iter().enumerate() {
                    let (q, _) =
                        closest_point_on_segment(point, &coords[element.first()], &coords[element.second()]);
                    let d = (q - point).norm_squared();
                    if best.map_or(true, |(best_d, _, _)| d < best_d) {
                        best = Some((d, q, id));
                    }
                }
                best
            })
            .collect();

        let mut candidates = ProjectionCandidates::unreachable(query.len());
        for (i, result) in results.into_iter().enumerate() {
            if let Some((d, q, id)) = result {
                let element = elements[id];
                let direction = coords[element.second()] - coords[element.first()];
                candidates.distances2[i] = d;
                candidates.points[i] = q;
                candidates.auxiliary[i] = normalize_or_zero(&direction);
            }
        }
        Ok(candidates)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use nalgebra::Vector3;

    fn l_shape() -> (CoordinateTable, Vec<LineElement>) {
        let coords = CoordinateTable::from_rows(&[
            [0.0, 0.0, 0.0],
            [2.0, 0.0, 0.0],
            [2.0, 2.0, 0.0],
        ]);
        (coords, vec![LineElement(0, 1), LineElement(1, 2)])
    }

    #[test]
    fn test_nearest_with_tangent() {
        let (coords, elements) = l_shape();
        let query = [Point3::new(1.0, -1.0, 0.0), Point3::new(3.0, 1.5, 0.0)];
        let result = PolylineSearch.nearest(&query, &coords, &elements).unwrap();

        assert_relative_eq!(result.distances2[0], 1.0);
        assert_relative_eq!(result.points[0], Point3::new(1.0, 0.0, 0.0));
        assert_relative_eq!(result.auxiliary[0], Vector3::new(1.0, 0.0, 0.0));

        assert_relative_eq!(result.distances2[1], 1.0);
        assert_relative_eq!(result.points[1], Point3::new(2.0, 1.5, 0.0));
        assert_relative_eq!(result.auxiliary[1], Vector3::new(0.0, 1.0, 0.0));
    }

    #[test]
    fn test_tangent_follows_traversal_direction() {
        let (coords, _) = l_shape();
        let reversed = vec![LineElement(2, 1), LineElement(1, 0)];
        let result = PolylineSearch
            .nearest(&[Point3::new(1.0, -1.0, 0.0)], &coords, &reversed)
            .unwrap();
        assert_relative_eq!(result.auxiliary[0], Vector3::new(-1.0, 0.0, 0.0));
    }

    #[test]
    fn test_empty_curve_is_unreachable() {
        let (coords, _) = l_shape();
        let result = PolylineSearch
            .nearest(&[Point3::origin()], &coords, &[])
            .unwrap();
        assert_eq!(result.distances2[0], f64::INFINITY);
    }

    #[test]
    fn test_out_of_range_node() {
        let (coords, _) = l_shape();
        let err = PolylineSearch
            .nearest(&[Point3::origin()], &coords, &[LineElement(0, 7)])
            .unwrap_err();
        assert!(matches!(err, SurfError::NodeIndexOutOfRange { index: 7, .. }));
    }
}
