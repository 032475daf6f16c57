// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Query point input and projection result output

use anyhow::{Context, Result};
use nalgebra::Point3;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::projection::ProjectionAccumulator;

/// Best projection of one query point
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectionRecord {
    pub query: [f64; 3],
    pub distance2: f64,
    pub point: [f64; 3],
    pub auxiliary: [f64; 3],
    pub projected: bool,
}

/// One record per query point, in query order
pub fn projection_records(query: &[Point3<f64>], acc: &ProjectionAccumulator) -> Vec<ProjectionRecord> {
    query
        .iter()
        .enumerate()
        .filter_map(|(i, q)| {
            let (distance2, point, auxiliary) = acc.best(i)?;
            Some(ProjectionRecord {
                query: [q.x, q.y, q.z],
                distance2,
                point: [point.x, point.y, point.z],
                auxiliary: [auxiliary.x, auxiliary.y, auxiliary.z],
                projected: acc.is_projected(i),
            })
        })
        .collect()
}

/// Write the projection of every query point as pretty JSON
pub fn write_projection(
    path: impl AsRef<Path>,
    query: &[Point3<f64>],
    acc: &ProjectionAccumulator,
) -> Result<()> {
    let json = serde_json::to_string_pretty(&projection_records(query, acc))?;
    fs::write(path.as_ref(), json)
        .with_context(|| format!("Failed to write projection file: {:?}", path.as_ref()))?;
    Ok(())
}

/// Read query points stored as a JSON array of `[x, y, z]`
pub fn read_points(path: impl AsRef<Path>) -> Result<Vec<Point3<f64>>> {
    let content = fs::read_to_string(path.as_ref())
        .with_context(|| format!("Failed to read points file: {:?}", path.as_ref()))?;
    let rows: Vec<[f64; 3]> = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse points file: {:?}", path.as_ref()))?;
    Ok(rows.into_iter().map(Point3::from).collect())
}
