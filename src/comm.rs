// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Process communicator abstraction
//!
//! Building a surface index and projecting onto a surface are collective
//! operations: every process sharing a communicator must issue them in the
//! same order and the same number of times. Divergence cannot be detected
//! locally and shows up as a hang inside the search engine.

/// Group of cooperating processes executing the same operation sequence.
pub trait Communicator: Send + Sync {
    /// Rank of the calling process
    fn rank(&self) -> usize;

    /// Number of processes in the group
    fn size(&self) -> usize;

    /// Block until every process reaches this point
    fn barrier(&self);
}

/// Communicator for a single process.
#[derive(Debug, Clone, Copy, Default)]
pub struct SerialCommunicator;

impl Communicator for SerialCommunicator {
    fn rank(&self) -> usize {
        0
    }

    fn size(&self) -> usize {
        1
    }

    fn barrier(&self) {}
}
