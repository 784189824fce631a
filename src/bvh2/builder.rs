use std::time::{Duration, Instant};

use crate::{bounds::Bounds, partition::AxisPartitioner, BvhBuildParams};

use super::{
    node::Bvh2Node,
    split::{median_split, SahSplitter, Split, SplitHeuristic},
    Bvh2,
};

/// A range of the axis orderings waiting to become `nodes[node_id]`.
#[derive(Clone, Copy, Debug)]
struct BuildTask {
    node_id: usize,
    begin: usize,
    end: usize,
}

/// Top-down Bvh2 builder. Sorts the primitives once per axis, then splits ranges of those
/// orderings until every range is small enough to become a leaf.
///
/// After building, keep this around to reuse the associated allocations.
#[derive(Clone, Debug)]
pub struct Bvh2Builder<const D: usize> {
    pub partitioner: AxisPartitioner<D>,
    sah: SahSplitter,
    stack: Vec<BuildTask>,
}

impl<const D: usize> Default for Bvh2Builder<D> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const D: usize> Bvh2Builder<D> {
    pub fn new() -> Self {
        Bvh2Builder {
            partitioner: AxisPartitioner::new(),
            sah: SahSplitter::new(),
            stack: Vec::new(),
        }
    }

    /// Initialize a builder with pre-allocated capacity for building a bvh with prim_count.
    pub fn with_capacity(prim_count: usize) -> Self {
        Bvh2Builder {
            partitioner: AxisPartitioner::with_capacity(prim_count),
            sah: SahSplitter::new(),
            stack: Vec::with_capacity(64),
        }
    }

    /// # Arguments
    /// * `aabbs` - A list of bounding boxes. Should correspond to the number and order of primitives.
    /// * `config` - Split heuristic, sort key and leaf size limits.
    pub fn build<B: Bounds<D>>(&mut self, aabbs: &[B], config: &BvhBuildParams) -> Bvh2<B> {
        let mut bvh = Bvh2::default();
        self.build_with_bvh(&mut bvh, aabbs, config);
        bvh
    }

    /// # Arguments
    /// * `bvh` - An existing bvh. The builder will clear this bvh and reuse its allocations.
    /// * `aabbs` - A list of bounding boxes. Should correspond to the number and order of primitives.
    /// * `config` - Split heuristic, sort key and leaf size limits.
    pub fn build_with_bvh<B: Bounds<D>>(
        &mut self,
        bvh: &mut Bvh2<B>,
        aabbs: &[B],
        config: &BvhBuildParams,
    ) {
        crate::scope!("build_bvh2");

        let prim_count = aabbs.len();
        assert!(
            node_count_fits_u32(prim_count),
            "Primitive count {prim_count} needs more than u32::MAX nodes"
        );
        bvh.reset_for_reuse(prim_count);

        self.partitioner.set_sort_key(config.sort_key);
        crate::timeit!["sort axes", self.partitioner.initialize(aabbs);];

        if prim_count == 0 {
            return;
        }

        let max_prims_per_leaf = config.max_prims_per_leaf.max(1) as usize;

        let root_aabb = self.partitioner.compute_bbox(aabbs, 0, prim_count);
        bvh.nodes.push(Bvh2Node::new(root_aabb, 0, 0));
        self.stack.clear();
        self.stack.push(BuildTask {
            node_id: 0,
            begin: 0,
            end: prim_count,
        });

        while let Some(task) = self.stack.pop() {
            let BuildTask {
                node_id,
                begin,
                end,
            } = task;
            let aabb = bvh.nodes[node_id].aabb;

            let Some(Split { axis, pivot }) =
                self.find_split(aabbs, begin, end, &aabb, max_prims_per_leaf, config)
            else {
                bvh.nodes[node_id].make_leaf(begin as u32, (end - begin) as u32);
                continue;
            };

            self.partitioner.sort_indices(axis, begin, end, pivot);

            let first_child = bvh.nodes.len();
            let left_aabb = self.partitioner.compute_bbox(aabbs, begin, pivot);
            let right_aabb = self.partitioner.compute_bbox(aabbs, pivot, end);
            bvh.nodes.push(Bvh2Node::new(left_aabb, 0, 0));
            bvh.nodes.push(Bvh2Node::new(right_aabb, 0, 0));
            bvh.nodes[node_id].make_inner(first_child as u32);

            // Left is popped first so leaves come out in ordering order.
            self.stack.push(BuildTask {
                node_id: first_child + 1,
                begin: pivot,
                end,
            });
            self.stack.push(BuildTask {
                node_id: first_child,
                begin,
                end: pivot,
            });
        }

        // Split commits only ever rewrite the range they split, so finished leaf ranges are final.
        bvh.primitive_indices
            .extend_from_slice(self.partitioner.get_item_ordering());
    }

    /// Returns `None` when `begin..end` should become a leaf.
    fn find_split<B: Bounds<D>>(
        &mut self,
        aabbs: &[B],
        begin: usize,
        end: usize,
        aabb: &B,
        max_prims_per_leaf: usize,
        config: &BvhBuildParams,
    ) -> Option<Split> {
        let count = end - begin;
        if count < 2 {
            return None;
        }

        match config.split_heuristic {
            SplitHeuristic::Median => (count > max_prims_per_leaf)
                .then(|| median_split(&self.partitioner, aabbs, begin, end)),
            SplitHeuristic::Sah => {
                match self.sah.find_split(
                    &self.partitioner,
                    aabbs,
                    begin,
                    end,
                    aabb,
                    config.traversal_cost,
                    config.intersection_cost,
                ) {
                    Some((split, split_cost)) => {
                        let leaf_cost = config.intersection_cost * count as f32;
                        if count <= max_prims_per_leaf && leaf_cost <= split_cost {
                            None
                        } else {
                            Some(split)
                        }
                    }
                    // Degenerate bounds give SAH nothing to compare, fall back to halving.
                    None => (count > max_prims_per_leaf)
                        .then(|| median_split(&self.partitioner, aabbs, begin, end)),
                }
            }
        }
    }
}

/// A binary tree over `prim_count` primitives has up to `2 * prim_count - 1` nodes, all of which
/// must be addressable by the `u32` child indices.
#[inline]
fn node_count_fits_u32(prim_count: usize) -> bool {
    prim_count
        .checked_mul(2)
        .is_some_and(|n| n.saturating_sub(1) <= u32::MAX as usize)
}

/// Build a bvh2 from the given list of primitive bounds.
/// Just a helper function / example, feel free to reimplement for your specific use case.
///
/// # Arguments
/// * `aabbs` - A list of bounding boxes, one per primitive.
/// * `config` - Parameters for configuring the BVH building.
/// * `core_build_time` - The core BVH build time. Does not include debug validation.
pub fn build_bvh2<const D: usize, B: Bounds<D>>(
    aabbs: &[B],
    config: BvhBuildParams,
    core_build_time: &mut Duration,
) -> Bvh2<B> {
    let start_time = Instant::now();

    let bvh2 = Bvh2Builder::<D>::with_capacity(aabbs.len()).build(aabbs, &config);

    *core_build_time += start_time.elapsed();

    #[cfg(debug_assertions)]
    {
        bvh2.validate(aabbs, true);
    }

    bvh2
}
