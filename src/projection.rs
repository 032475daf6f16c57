// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Best-projection aggregation across several geometric objects
//!
//! A batch of query points is projected onto many objects in turn. Each
//! object produces one candidate per point; the accumulator keeps, per
//! point, the candidate with the smallest squared distance seen so far
//! together with the point and auxiliary vector (surface normal or curve
//! tangent) that came with it.

use nalgebra::{Point3, Vector3};
use serde::{Deserialize, Serialize};

use crate::comm::Communicator;
use crate::config::DEFAULT_SENTINEL;
use crate::error::{SurfError, SurfResult};

/// Candidate projections produced by a single object
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectionCandidates {
    pub distances2: Vec<f64>,
    pub points: Vec<Point3<f64>>,
    pub auxiliary: Vec<Vector3<f64>>,
}

impl ProjectionCandidates {
    /// `n` candidates that can never win
    pub fn unreachable(n: usize) -> Self {
        Self {
            distances2: vec![f64::INFINITY; n],
            points: vec![Point3::origin(); n],
            auxiliary: vec![Vector3::zeros(); n],
        }
    }

    pub fn len(&self) -> usize {
        self.distances2.len()
    }

    pub fn is_empty(&self) -> bool {
        self.distances2.is_empty()
    }

    fn check_len(&self, expected: usize) -> SurfResult<()> {
        if self.distances2.len() != expected {
            return Err(SurfError::length_mismatch(
                "candidate distances",
                expected,
                self.distances2.len(),
            ));
        }
        if self.points.len() != expected {
            return Err(SurfError::length_mismatch(
                "candidate points",
                expected,
                self.points.len(),
            ));
        }
        if self.auxiliary.len() != expected {
            return Err(SurfError::length_mismatch(
                "candidate auxiliary vectors",
                expected,
                self.auxiliary.len(),
            ));
        }
        Ok(())
    }
}

/// Best projection found so far for every query point.
///
/// Created fresh for each batch of query points and discarded afterwards.
/// Squared distances only ever decrease while the batch is processed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectionAccumulator {
    distances2: Vec<f64>,
    points: Vec<Point3<f64>>,
    auxiliary: Vec<Vector3<f64>>,
    sentinel: f64,
}

impl ProjectionAccumulator {
    /// Accumulator for `n` points initialized with the default sentinel
    pub fn new(n: usize) -> Self {
        Self::with_sentinel(n, DEFAULT_SENTINEL)
    }

    pub fn with_sentinel(n: usize, sentinel: f64) -> Self {
        Self {
            distances2: vec![sentinel; n],
            points: vec![Point3::origin(); n],
            auxiliary: vec![Vector3::zeros(); n],
            sentinel,
        }
    }

    pub fn len(&self) -> usize {
        self.distances2.len()
    }

    pub fn is_empty(&self) -> bool {
        self.distances2.is_empty()
    }

    pub fn sentinel(&self) -> f64 {
        self.sentinel
    }

    pub fn distances2(&self) -> &[f64] {
        &self.distances2
    }

    pub fn points(&self) -> &[Point3<f64>] {
        &self.points
    }

    pub fn auxiliary(&self) -> &[Vector3<f64>] {
        &self.auxiliary
    }

    /// Best (squared distance, point, auxiliary) for query point `i`
    pub fn best(&self, i: usize) -> Option<(f64, Point3<f64>, Vector3<f64>)> {
        Some((
            *self.distances2.get(i)?,
            *self.points.get(i)?,
            *self.auxiliary.get(i)?,
        ))
    }

    /// Whether any object produced a projection closer than the sentinel
    pub fn is_projected(&self, i: usize) -> bool {
        self.distances2.get(i).is_some_and(|&d| d < self.sentinel)
    }

    pub fn projected_count(&self) -> usize {
        self.distances2.iter().filter(|&&d| d < self.sentinel).count()
    }

    /// Merge one object's candidates, keeping the strictly closer one per
    /// point. Returns how many points improved.
    pub fn accumulate(
        &mut self,
        query: &[Point3<f64>],
        candidates: &ProjectionCandidates,
    ) -> SurfResult<usize> {
        if query.len() != self.len() {
            return Err(SurfError::length_mismatch(
                "query points",
                self.len(),
                query.len(),
            ));
        }
        candidates.check_len(self.len())?;

        let mut improved = 0;
        for i in 0..self.len() {
            if candidates.distances2[i] < self.distances2[i] {
                self.distances2[i] = candidates.distances2[i];
                self.points[i] = candidates.points[i];
                self.auxiliary[i] = candidates.auxiliary[i];
                improved += 1;
            }
        }
        Ok(improved)
    }
}

/// Geometric object that query points can be projected onto
pub trait Projectable {
    /// Search this object and merge the result into `acc`; returns how many
    /// points improved. Surfaces treat this as a collective operation.
    fn project(
        &self,
        query: &[Point3<f64>],
        acc: &mut ProjectionAccumulator,
        comm: &dyn Communicator,
    ) -> SurfResult<usize>;
}

/// Project onto every object in order, merging into one accumulator.
///
/// The order must be identical on every process sharing `comm`.
pub fn project_all(
    objects: &[&dyn Projectable],
    query: &[Point3<f64>],
    acc: &mut ProjectionAccumulator,
    comm: &dyn Communicator,
) -> SurfResult<usize> {
    let mut improved = 0;
    for object in objects {
        improved += object.project(query, acc, comm)?;
    }
    log::debug!(
        "Projected {} points onto {} objects, {} projected",
        query.len(),
        objects.len(),
        acc.projected_count()
    );
    Ok(improved)
}
