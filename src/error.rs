// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Error types for geometry assembly and projection

use thiserror::Error;

/// Result type for library operations.
pub type SurfResult<T> = Result<T, SurfError>;

/// Errors raised by the geometry layer.
///
/// Data-quality problems in input curves surface as [`SurfError::Topology`]
/// and are normally recovered by the section assembler. The remaining
/// variants describe misuse or structurally broken input and are returned
/// to the caller unchanged.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SurfError {
    /// Line elements do not form a single open path or a single cycle.
    #[error("line elements do not form a single curve: {reason}")]
    Topology { reason: String },

    /// A section name does not exist in the mesh.
    #[error("unknown section: {name}")]
    UnknownSection { name: String },

    /// A section was used as a surface but holds line elements.
    #[error("section {name} is not a surface section")]
    NotASurface { name: String },

    #[error("section {name} is not a curve section")]
    NotACurve { name: String },

    /// Start shifting is only defined for sorted periodic curves.
    #[error("cannot shift the start node of an open or unsorted curve")]
    OpenCurveShift,

    /// A curve without elements was asked for an ordered operation.
    #[error("curve has no elements")]
    EmptyCurve,

    /// A node index fell outside the coordinate table.
    #[error("node index {index} out of range (mesh has {node_count} nodes)")]
    NodeIndexOutOfRange { index: i64, node_count: usize },

    /// Two arrays that must be parallel have different lengths.
    #[error("{what}: expected {expected} entries, got {actual}")]
    LengthMismatch {
        what: &'static str,
        expected: usize,
        actual: usize,
    },

    /// A section pointer array is malformed.
    #[error("invalid section layout: {reason}")]
    SectionLayout { reason: String },

    /// A shift criterion string could not be parsed.
    #[error("unknown shift criterion: {0}")]
    UnknownCriterion(String),
}

impl SurfError {
    pub(crate) fn topology(reason: impl Into<String>) -> Self {
        SurfError::Topology {
            reason: reason.into(),
        }
    }

    pub(crate) fn length_mismatch(what: &'static str, expected: usize, actual: usize) -> Self {
        SurfError::LengthMismatch {
            what,
            expected,
            actual,
        }
    }
}
