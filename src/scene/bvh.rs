// Copyright (c) 2018-2021 Rafael Villar Burke <pachi@ietcc.csic.es>
// Distributed under the MIT License
// (See acoompanying LICENSE file or a copy at http://opensource.org/licenses/MIT)

//! A hand-rolled bounding volume hierarchy (BVH) over `Bounded +
//! Intersectable` elements, built iteratively by centroid-axis partitioning.
//!
//! This is the occlusion backend for the triangle and quad geometry modes
//! ([`crate::config::GeomType::Triangle`]/[`GeomType::Quad`]); the grid mode
//! ([`super::grid`]) bypasses it entirely.

use super::aabb::{Bounded, Intersectable, AABB};
use super::Ray;

type NodeId = usize;

struct TreeElement<T> {
    elem: T,
    aabb: AABB,
    centroid: nalgebra::Point3<f32>,
}

enum BVHNode<T> {
    Leaf {
        aabb: AABB,
        elements: Vec<T>,
    },
    Node {
        aabb: AABB,
        left: NodeId,
        right: NodeId,
    },
}

impl<T> BVHNode<T> {
    fn aabb(&self) -> &AABB {
        match self {
            BVHNode::Leaf { aabb, .. } => aabb,
            BVHNode::Node { aabb, .. } => aabb,
        }
    }
}

/// A bounding volume hierarchy over elements of type `T`.
pub struct BVH<T> {
    nodes: Vec<BVHNode<T>>,
    root: NodeId,
}

impl<T> BVH<T>
where
    T: Bounded,
{
    /// Builds a BVH over `elements`, splitting nodes until each leaf holds
    /// at most `max_leaf_size` elements (or no further split reduces the
    /// group, in which case the leaf is kept oversized).
    pub fn build(elements: Vec<T>, max_leaf_size: usize) -> Self {
        let wrapped: Vec<TreeElement<T>> = elements
            .into_iter()
            .map(|elem| {
                let aabb = elem.aabb();
                let centroid = aabb.center();
                TreeElement {
                    elem,
                    aabb,
                    centroid,
                }
            })
            .collect();

        let mut nodes = Vec::new();
        let root = Self::build_from_node_list(&mut nodes, wrapped, max_leaf_size);
        Self { nodes, root }
    }

    fn build_from_node_list(
        nodes: &mut Vec<BVHNode<T>>,
        elements: Vec<TreeElement<T>>,
        max_leaf_size: usize,
    ) -> NodeId {
        let aabb = elements
            .iter()
            .fold(AABB::default(), |acc, e| acc.join(&e.aabb));

        if elements.len() <= max_leaf_size {
            let elements = elements.into_iter().map(|e| e.elem).collect();
            nodes.push(BVHNode::Leaf { aabb, elements });
            return nodes.len() - 1;
        }

        match Self::partition_elements_by_centroid(elements) {
            Some((left_elems, right_elems)) => {
                let left = Self::build_from_node_list(nodes, left_elems, max_leaf_size);
                let right = Self::build_from_node_list(nodes, right_elems, max_leaf_size);
                nodes.push(BVHNode::Node { aabb, left, right });
                nodes.len() - 1
            }
            None => {
                let elements = elements.into_iter().map(|e| e.elem).collect();
                nodes.push(BVHNode::Leaf { aabb, elements });
                nodes.len() - 1
            }
        }
    }

    /// Splits `elements` in half along the longest axis of their combined
    /// AABB, ordering by centroid. Returns `None` when the group cannot be
    /// usefully split further (fewer than two distinct centroids).
    fn partition_elements_by_centroid(
        mut elements: Vec<TreeElement<T>>,
    ) -> Option<(Vec<TreeElement<T>>, Vec<TreeElement<T>>)> {
        if elements.len() < 2 {
            return None;
        }
        let bounds = elements
            .iter()
            .fold(AABB::default(), |acc, e| acc.join(&e.aabb));
        let extent = bounds.max - bounds.min;
        let axis = if extent.x >= extent.y && extent.x >= extent.z {
            0
        } else if extent.y >= extent.z {
            1
        } else {
            2
        };

        elements.sort_by(|a, b| {
            a.centroid[axis]
                .partial_cmp(&b.centroid[axis])
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        let mid = elements.len() / 2;
        let right = elements.split_off(mid);
        if right.is_empty() || elements.is_empty() {
            None
        } else {
            Some((elements, right))
        }
    }

    /// Nodes visited in root-first (preorder) order, closest to how the
    /// tree would be traced.
    pub fn preorder(&self) -> PreorderIter<'_, T> {
        PreorderIter {
            bvh: self,
            stack: vec![self.root],
        }
    }
}

pub struct PreorderIter<'a, T> {
    bvh: &'a BVH<T>,
    stack: Vec<NodeId>,
}

impl<'a, T> Iterator for PreorderIter<'a, T> {
    type Item = &'a BVHNode<T>;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.stack.pop()?;
        let node = &self.bvh.nodes[id];
        if let BVHNode::Node { left, right, .. } = node {
            self.stack.push(*right);
            self.stack.push(*left);
        }
        Some(node)
    }
}

impl<T> Intersectable for BVH<T>
where
    T: Bounded + Intersectable,
{
    fn intersects(&self, ray: &Ray) -> Option<f32> {
        self.intersects_node(self.root, ray)
    }
}

impl<T> BVH<T>
where
    T: Bounded + Intersectable,
{
    fn intersects_node(&self, id: NodeId, ray: &Ray) -> Option<f32> {
        let node = &self.nodes[id];
        if node.aabb().intersects(ray).is_none() {
            return None;
        }
        match node {
            BVHNode::Leaf { elements, .. } => elements
                .iter()
                .filter_map(|e| e.intersects(ray))
                .fold(None, |acc, t| match acc {
                    Some(best) if best <= t => Some(best),
                    _ => Some(t),
                }),
            BVHNode::Node { left, right, .. } => {
                let l = self.intersects_node(*left, ray);
                let r = self.intersects_node(*right, ray);
                match (l, r) {
                    (Some(a), Some(b)) => Some(a.min(b)),
                    (Some(a), None) => Some(a),
                    (None, Some(b)) => Some(b),
                    (None, None) => None,
                }
            }
        }
    }

    /// True as soon as any element is found along the ray; used by the
    /// occlusion queries, which only need a boolean.
    pub fn occluded(&self, ray: &Ray) -> bool {
        self.intersects(ray).is_some()
    }
}
