// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Curve topology recovery from unordered line elements
//!
//! Curve sections arrive as an unordered bag of two-node elements. Sorting
//! walks them into a single chain where each element starts at the node the
//! previous one ended on.

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

use crate::error::{SurfError, SurfResult};

/// Two-node line element, directed from `.0` to `.1` when traversed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LineElement(pub usize, pub usize);

impl LineElement {
    pub fn new(first: usize, second: usize) -> Self {
        Self(first, second)
    }

    pub fn first(&self) -> usize {
        self.0
    }

    pub fn second(&self) -> usize {
        self.1
    }

    pub fn contains(&self, node: usize) -> bool {
        self.0 == node || self.1 == node
    }

    pub fn reversed(&self) -> Self {
        Self(self.1, self.0)
    }

    /// Orient so that traversal starts at `node`
    fn starting_at(&self, node: usize) -> Self {
        if self.0 == node {
            *self
        } else {
            self.reversed()
        }
    }
}

impl From<[usize; 2]> for LineElement {
    fn from(nodes: [usize; 2]) -> Self {
        Self(nodes[0], nodes[1])
    }
}

/// Whether a curve has two free ends or closes on itself
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Closure {
    Open,
    Periodic,
}

/// Ordered chain of line elements.
///
/// `elements[i].second() == elements[i + 1].first()` holds for every pair,
/// and for periodic curves the last element also ends where the first
/// begins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurveTopology {
    elements: Vec<LineElement>,
    closure: Closure,
}

impl CurveTopology {
    /// Wrap an already ordered chain, checking its consistency
    pub fn from_ordered(elements: Vec<LineElement>, closure: Closure) -> SurfResult<Self> {
        let topology = Self { elements, closure };
        if topology.is_consistent() {
            Ok(topology)
        } else {
            Err(SurfError::topology("elements are not chained head to tail"))
        }
    }

    pub(crate) fn from_parts_unchecked(elements: Vec<LineElement>, closure: Closure) -> Self {
        Self { elements, closure }
    }

    pub fn elements(&self) -> &[LineElement] {
        &self.elements
    }

    pub fn into_elements(self) -> Vec<LineElement> {
        self.elements
    }

    pub fn closure(&self) -> Closure {
        self.closure
    }

    pub fn is_periodic(&self) -> bool {
        self.closure == Closure::Periodic
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn start_node(&self) -> Option<usize> {
        self.elements.first().map(LineElement::first)
    }

    pub fn end_node(&self) -> Option<usize> {
        self.elements.last().map(LineElement::second)
    }

    /// Nodes in traversal order; a periodic curve does not repeat its start
    pub fn nodes(&self) -> Vec<usize> {
        let mut nodes: Vec<usize> = self.elements.iter().map(LineElement::first).collect();
        if self.closure == Closure::Open {
            if let Some(end) = self.end_node() {
                nodes.push(end);
            }
        }
        nodes
    }

    fn is_consistent(&self) -> bool {
        let chained = self
            .elements
            .windows(2)
            .all(|pair| pair[0].second() == pair[1].first());
        let closed = match self.closure {
            Closure::Open => true,
            Closure::Periodic => self.start_node() == self.end_node(),
        };
        chained && closed
    }
}

/// Sort an unordered set of line elements into a single curve.
///
/// An open curve starts at its lowest-numbered free end. A curve without
/// free ends is periodic and starts at the first node of the first input
/// element. Any node shared by more than two elements, and any element that
/// cannot be reached by walking from the start, makes the set invalid.
pub fn sort_connectivity(elements: &[LineElement]) -> SurfResult<CurveTopology> {
    if elements.is_empty() {
        return Err(SurfError::EmptyCurve);
    }

    // Element ids touching each node, in input order
    let mut incidence: AHashMap<usize, Vec<usize>> = AHashMap::new();
    for (id, element) in elements.iter().enumerate() {
        incidence.entry(element.0).or_default().push(id);
        incidence.entry(element.1).or_default().push(id);
    }

    if let Some((node, ids)) = incidence
        .iter()
        .filter(|(_, ids)| ids.len() > 2)
        .min_by_key(|(node, _)| **node)
    {
        return Err(SurfError::topology(format!(
            "node {} is shared by {} elements",
            node,
            ids.len()
        )));
    }

    let free_end = incidence
        .iter()
        .filter(|(_, ids)| ids.len() == 1)
        .map(|(node, _)| *node)
        .min();

    let (mut end_node, closure) = match free_end {
        Some(node) => (node, Closure::Open),
        None => (elements[0].0, Closure::Periodic),
    };

    let mut consumed = vec![false; elements.len()];
    let mut sorted = Vec::with_capacity(elements.len());

    while sorted.len() < elements.len() {
        // Lowest-index unconsumed element containing the current end node
        let next = incidence
            .get(&end_node)
            .and_then(|ids| ids.iter().copied().find(|&id| !consumed[id]));

        let Some(id) = next else {
            return Err(SurfError::topology(format!(
                "{} of {} elements unreachable from node {}",
                elements.len() - sorted.len(),
                elements.len(),
                end_node
            )));
        };

        consumed[id] = true;
        let element = elements[id].starting_at(end_node);
        end_node = element.1;
        sorted.push(element);
    }

    log::debug!(
        "Sorted {} line elements into a {:?} curve",
        sorted.len(),
        closure
    );

    Ok(CurveTopology::from_parts_unchecked(sorted, closure))
}
