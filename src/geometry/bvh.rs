// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Bounding Volume Hierarchy (BVH) for spatial acceleration
//! Used to accelerate nearest-element searches

use super::BoundingBox;
use nalgebra::Point3;

const MAX_DEPTH: usize = 32;

/// BVH node
#[derive(Debug, Clone)]
pub struct BVHNode {
    /// Bounding box of this node
    pub bbox: BoundingBox,
    /// Left child (None for leaf)
    pub left: Option<Box<BVHNode>>,
    /// Right child (None for leaf)
    pub right: Option<Box<BVHNode>>,
    /// Item indices (only for leaf nodes)
    pub items: Vec<usize>,
}

impl BVHNode {
    fn leaf(bbox: BoundingBox, items: Vec<usize>) -> Self {
        Self {
            bbox,
            left: None,
            right: None,
            items,
        }
    }

    fn internal(bbox: BoundingBox, left: Box<BVHNode>, right: Box<BVHNode>) -> Self {
        Self {
            bbox,
            left: Some(left),
            right: Some(right),
            items: Vec::new(),
        }
    }

    pub fn is_leaf(&self) -> bool {
        self.left.is_none() && self.right.is_none()
    }
}

/// Bounding Volume Hierarchy over arbitrary boxed items
#[derive(Debug, Clone)]
pub struct BVH {
    root: BVHNode,
    item_count: usize,
}

impl BVH {
    /// Build BVH from (item_index, bbox) pairs
    pub fn build(items: Vec<(usize, BoundingBox)>, leaf_size: usize) -> Self {
        let item_count = items.len();
        if items.is_empty() {
            return Self {
                root: BVHNode::leaf(BoundingBox::empty(), Vec::new()),
                item_count,
            };
        }

        let root = Self::build_recursive(items, leaf_size.max(1), 0);
        Self { root, item_count }
    }

    fn build_recursive(
        mut items: Vec<(usize, BoundingBox)>,
        leaf_size: usize,
        depth: usize,
    ) -> BVHNode {
        if items.len() <= leaf_size || depth >= MAX_DEPTH {
            let bbox = Self::compute_union_bbox(&items);
            let indices = items.iter().map(|(idx, _)| *idx).collect();
            return BVHNode::leaf(bbox, indices);
        }

        // Split at the median along the longest axis
        let axis = Self::find_best_split_axis(&items);
        items.sort_by(|(_, a), (_, b)| a.center()[axis].total_cmp(&b.center()[axis]));

        let right_items = items.split_off(items.len() / 2);
        let left = Box::new(Self::build_recursive(items, leaf_size, depth + 1));
        let right = Box::new(Self::build_recursive(right_items, leaf_size, depth + 1));
        let bbox = left.bbox.union(&right.bbox);

        BVHNode::internal(bbox, left, right)
    }

    /// Longest axis of the items' union box
    fn find_best_split_axis(items: &[(usize, BoundingBox)]) -> usize {
        let size = Self::compute_union_bbox(items).size();

        if size.x >= size.y && size.x >= size.z {
            0
        } else if size.y >= size.z {
            1
        } else {
            2
        }
    }

    fn compute_union_bbox(items: &[(usize, BoundingBox)]) -> BoundingBox {
        items
            .iter()
            .fold(BoundingBox::empty(), |acc, (_, bbox)| acc.union(bbox))
    }

    pub fn len(&self) -> usize {
        self.item_count
    }

    pub fn is_empty(&self) -> bool {
        self.item_count == 0
    }

    pub fn bbox(&self) -> &BoundingBox {
        &self.root.bbox
    }

    /// Find the item closest to `point`.
    ///
    /// `distance2` returns the exact squared distance from the point to an
    /// item. Subtrees whose box is not strictly closer than the best item
    /// found so far are skipped, so on ties the first item visited wins.
    pub fn nearest<F>(&self, point: &Point3<f64>, mut distance2: F) -> Option<(usize, f64)>
    where
        F: FnMut(usize) -> f64,
    {
        if self.is_empty() {
            return None;
        }

        let mut best: Option<(usize, f64)> = None;
        Self::nearest_recursive(&self.root, point, &mut distance2, &mut best);
        best
    }

    fn nearest_recursive<F>(
        node: &BVHNode,
        point: &Point3<f64>,
        distance2: &mut F,
        best: &mut Option<(usize, f64)>,
    ) where
        F: FnMut(usize) -> f64,
    {
        let bound = best.map_or(f64::INFINITY, |(_, d)| d);
        if node.bbox.distance_squared(point) >= bound {
            return;
        }

        if node.is_leaf() {
            for &item in &node.items {
                let d = distance2(item);
                if best.map_or(true, |(_, best_d)| d < best_d) {
                    *best = Some((item, d));
                }
            }
            return;
        }

        if let (Some(left), Some(right)) = (&node.left, &node.right) {
            // Visit the nearer child first to tighten the bound early
            let (first, second) =
                if left.bbox.distance_squared(point) <= right.bbox.distance_squared(point) {
                    (left, right)
                } else {
                    (right, left)
                };
            Self::nearest_recursive(first, point, distance2, best);
            Self::nearest_recursive(second, point, distance2, best);
        }
    }

    #[cfg(test)]
    pub fn root(&self) -> &BVHNode {
        &self.root
    }
}
