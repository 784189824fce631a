//! A binary BVH built top-down from presorted axis orderings.

pub mod builder;
pub mod node;
pub mod split;

use std::{
    collections::{HashMap, HashSet},
    fmt,
};

use crate::bounds::Bounds;
use node::Bvh2Node;

/// A binary BVH. The root is `nodes[0]`; siblings are stored next to each other.
#[derive(Clone, Debug)]
pub struct Bvh2<B> {
    /// List of nodes contained in this bvh. The first node is the root.
    pub nodes: Vec<Bvh2Node<B>>,
    /// Maps the contiguous leaf ranges back to the original primitive ids.
    pub primitive_indices: Vec<u32>,
}

impl<B> Default for Bvh2<B> {
    fn default() -> Self {
        Self {
            nodes: Vec::new(),
            primitive_indices: Vec::new(),
        }
    }
}

impl<B: Copy> Bvh2<B> {
    /// Clear the bvh while keeping its allocations.
    pub fn reset_for_reuse(&mut self, prim_count: usize) {
        self.nodes.clear();
        self.nodes.reserve((2 * prim_count).saturating_sub(1));
        self.primitive_indices.clear();
        self.primitive_indices.reserve(prim_count);
    }

    /// The original ids of the primitives in a leaf node. Empty for inner nodes.
    #[inline(always)]
    pub fn leaf_primitives(&self, node: &Bvh2Node<B>) -> &[u32] {
        if !node.is_leaf() {
            return &[];
        }
        let start = node.first_index as usize;
        &self.primitive_indices[start..start + node.prim_count as usize]
    }

    /// Get the maximum depth of the BVH from the given node
    pub fn depth(&self, node_index: usize) -> usize {
        let node = &self.nodes[node_index];
        if node.is_leaf() {
            1
        } else {
            1 + self
                .depth(node.first_index as usize)
                .max(self.depth((node.first_index + 1) as usize))
        }
    }

    /// Walks the whole tree and asserts its structure: every node is reached once, children fit
    /// inside their parent, leaves enclose their primitives, and every primitive is referenced by
    /// exactly one leaf. With `tight_fit`, node boxes must equal the union of their contents.
    pub fn validate<const D: usize>(
        &self,
        primitives: &[B],
        tight_fit: bool,
    ) -> Bvh2ValidationResult
    where
        B: Bounds<D>,
    {
        let mut result = Bvh2ValidationResult {
            require_tight_fit: tight_fit,
            ..Default::default()
        };

        if !self.nodes.is_empty() {
            self.validate_impl::<D>(primitives, &mut result, 0, 0, 0);
        }
        assert_eq!(result.discovered_nodes.len(), self.nodes.len());
        assert_eq!(result.node_count, self.nodes.len());
        assert_eq!(result.prim_count, self.primitive_indices.len());
        assert_eq!(
            result.discovered_primitives.len(),
            primitives.len(),
            "Not every primitive is referenced by exactly one leaf"
        );

        result
    }

    fn validate_impl<const D: usize>(
        &self,
        primitives: &[B],
        result: &mut Bvh2ValidationResult,
        node_index: u32,
        parent_index: u32,
        current_depth: u32,
    ) where
        B: Bounds<D>,
    {
        result.max_depth = result.max_depth.max(current_depth);
        let parent_aabb = self.nodes[parent_index as usize].aabb;
        assert!(
            result.discovered_nodes.insert(node_index),
            "Node {node_index} is reachable more than once"
        );
        let node = &self.nodes[node_index as usize];
        result.node_count += 1;
        *result.nodes_at_depth.entry(current_depth).or_insert(0) += 1;

        assert!(
            parent_aabb.contains(&node.aabb),
            "Child {} does not fit in parent {}:\nchild:  {:?}\nparent: {:?}",
            node_index,
            parent_index,
            node.aabb,
            parent_aabb
        );

        if node.is_leaf() {
            result.leaf_count += 1;
            *result.leaves_at_depth.entry(current_depth).or_insert(0) += 1;
            let mut temp_aabb = B::INVALID;
            for &prim_index in self.leaf_primitives(node) {
                result.prim_count += 1;
                assert!(
                    result.discovered_primitives.insert(prim_index),
                    "Primitive {prim_index} is referenced by more than one leaf"
                );
                let prim_aabb = primitives[prim_index as usize];
                temp_aabb.insert(&prim_aabb);
                assert!(
                    node.aabb.contains(&prim_aabb),
                    "Primitive {} does not fit in leaf {}:\nprimitive: {:?}\nleaf:      {:?}",
                    prim_index,
                    node_index,
                    prim_aabb,
                    node.aabb
                );
            }
            if result.require_tight_fit {
                assert_eq!(
                    temp_aabb, node.aabb,
                    "Primitives do not fit tightly in leaf {node_index}",
                );
            }
        } else {
            let left_id = node.first_index as usize;
            let right_id = left_id + 1;
            if result.require_tight_fit {
                let mut children_aabb = self.nodes[left_id].aabb;
                children_aabb.insert(&self.nodes[right_id].aabb);
                assert_eq!(
                    children_aabb, node.aabb,
                    "Children {left_id} & {right_id} do not fit tightly in parent {node_index}",
                );
            }

            self.validate_impl::<D>(
                primitives,
                result,
                left_id as u32,
                node_index,
                current_depth + 1,
            );
            self.validate_impl::<D>(
                primitives,
                result,
                right_id as u32,
                node_index,
                current_depth + 1,
            );
        }
    }
}

/// Result of Bvh2 validation. Contains various bvh stats.
#[derive(Default, Debug)]
pub struct Bvh2ValidationResult {
    /// Require validation to ensure aabbs tightly fit children and primitives.
    pub require_tight_fit: bool,
    /// Set of primitives discovered though validation traversal.
    pub discovered_primitives: HashSet<u32>,
    /// Set of nodes discovered though validation traversal.
    pub discovered_nodes: HashSet<u32>,
    /// Total number of nodes discovered though validation traversal.
    pub node_count: usize,
    /// Total number of leafs discovered though validation traversal.
    pub leaf_count: usize,
    /// Total number of primitives discovered though validation traversal.
    pub prim_count: usize,
    /// Maximum hierarchical BVH depth discovered though validation traversal.
    pub max_depth: u32,
    /// Quantity of nodes found at each depth though validation traversal.
    pub nodes_at_depth: HashMap<u32, u32>,
    /// Quantity of leaves found at each depth though validation traversal.
    pub leaves_at_depth: HashMap<u32, u32>,
}

impl fmt::Display for Bvh2ValidationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Avg primitives/leaf: {:.3}",
            self.prim_count as f64 / self.leaf_count as f64
        )?;

        writeln!(
            f,
            "\
node_count: {}
prim_count: {}
leaf_count: {}",
            self.node_count, self.prim_count, self.leaf_count
        )?;

        writeln!(f, "Node & Leaf counts for each depth")?;
        for i in 0..=self.max_depth {
            writeln!(
                f,
                "{:<3} {:<10} {:<10}",
                i,
                self.nodes_at_depth.get(&i).unwrap_or(&0),
                self.leaves_at_depth.get(&i).unwrap_or(&0)
            )?;
        }

        Ok(())
    }
}
