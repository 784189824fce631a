#[cfg(test)]
mod tests {
    use std::time::Duration;

    use axbvh::{
        aabb::{Aabb, Aabb2},
        bounds::Bounds,
        bvh2::builder::{build_bvh2, Bvh2Builder},
        partition::{key::SortKey, AxisPartitioner},
        test_util::scenes::{grid_aabbs, random_aabbs, random_aabbs_2d},
        BvhBuildParams,
    };
    use glam::{vec2, Vec3A};

    fn is_permutation(indices: &[u32], count: usize) -> bool {
        let mut seen = vec![false; count];
        indices.len() == count
            && indices
                .iter()
                .all(|&i| (i as usize) < count && !std::mem::replace(&mut seen[i as usize], true))
    }

    fn boxes_x(centers: &[f32]) -> Vec<Aabb> {
        centers
            .iter()
            .map(|&x| Aabb::new(Vec3A::new(x - 0.5, 0.0, 0.0), Vec3A::new(x + 0.5, 1.0, 1.0)))
            .collect()
    }

    #[test]
    pub fn build_bvh2_with_nothing() {
        let aabbs: Vec<Aabb> = Vec::new();
        let bvh = build_bvh2(&aabbs, BvhBuildParams::medium_build(), &mut Duration::default());
        assert!(bvh.nodes.is_empty());
        assert!(bvh.primitive_indices.is_empty());
    }

    #[test]
    pub fn build_bvh2_with_single_primitive() {
        let aabbs = random_aabbs(1, 5);
        let bvh = build_bvh2(&aabbs, BvhBuildParams::fast_build(), &mut Duration::default());
        assert_eq!(bvh.nodes.len(), 1);
        assert!(bvh.nodes[0].is_leaf());
        assert_eq!(bvh.nodes[0].aabb, aabbs[0]);
        assert_eq!(bvh.primitive_indices, [0]);
    }

    #[test]
    pub fn build_bvh2_all_configs() {
        let aabbs = random_aabbs(2000, 7);
        for config in [
            BvhBuildParams::fastest_build(),
            BvhBuildParams::fast_build(),
            BvhBuildParams::medium_build(),
            BvhBuildParams::slow_build(),
        ] {
            let mut core_build_time = Duration::default();
            let bvh = build_bvh2(&aabbs, config, &mut core_build_time);
            let result = bvh.validate(&aabbs, true);
            assert_eq!(result.prim_count, aabbs.len());
            assert_eq!(result.node_count, 2 * result.leaf_count - 1);
            assert!(is_permutation(&bvh.primitive_indices, aabbs.len()));
        }
    }

    #[test]
    pub fn build_bvh2_min_sort_key() {
        let aabbs = random_aabbs(500, 11);
        let config = BvhBuildParams {
            sort_key: SortKey::Min,
            ..BvhBuildParams::medium_build()
        };
        let bvh = build_bvh2(&aabbs, config, &mut Duration::default());
        bvh.validate(&aabbs, true);
    }

    #[test]
    pub fn build_bvh2_2d() {
        let aabbs = random_aabbs_2d(777, 3);
        let bvh = Bvh2Builder::<2>::new().build(&aabbs, &BvhBuildParams::medium_build());
        let result = bvh.validate(&aabbs, true);
        assert_eq!(result.prim_count, aabbs.len());
        assert!(is_permutation(&bvh.primitive_indices, aabbs.len()));
    }

    #[test]
    pub fn sah_separates_2d_rows() {
        // Two rows of boxes far apart along y. The root split should put each row in its own child.
        let aabbs: Vec<Aabb2> = (0..16)
            .map(|i| {
                let y = if i % 2 == 0 { 0.0 } else { 100.0 };
                let min = vec2((i / 2) as f32 * 1.5, y);
                Aabb2::new(min, min + 1.0)
            })
            .collect();
        let bvh = Bvh2Builder::<2>::new().build(&aabbs, &BvhBuildParams::medium_build());
        bvh.validate(&aabbs, true);
        let root = &bvh.nodes[0];
        assert!(!root.is_leaf());
        for child in [&bvh.nodes[1], &bvh.nodes[2]] {
            assert!(child.aabb.max.y - child.aabb.min.y <= 1.0);
        }
    }

    #[test]
    pub fn build_bvh2_grid() {
        let aabbs = grid_aabbs(8);
        let bvh = build_bvh2(&aabbs, BvhBuildParams::fast_build(), &mut Duration::default());
        let result = bvh.validate(&aabbs, true);
        assert_eq!(result.prim_count, 512);
        // Halving a power of two count down to leaves of 4 gives a perfectly balanced tree.
        assert_eq!(result.max_depth, 7);
        assert_eq!(result.leaf_count, 128);
    }

    #[test]
    pub fn partition_single_axis_scenario() {
        let aabbs = boxes_x(&[3.0, 1.0, 4.0, 2.0]);
        let mut partitioner = AxisPartitioner::<3>::new();
        partitioner.initialize(&aabbs);
        assert_eq!(partitioner.get_item_ordering(), [1, 3, 0, 2]);

        partitioner.sort_indices(0, 0, 4, 2);
        for axis in 0..3 {
            let mut left = partitioner.axis_ordering(axis)[..2].to_vec();
            left.sort();
            assert_eq!(left, [1, 3], "axis {axis}");
        }
        partitioner.validate_range(&aabbs, 0, 2);
        partitioner.validate_range(&aabbs, 2, 4);
        assert_eq!(partitioner.get_item_ordering(), [1, 3, 0, 2]);

        let left = partitioner.compute_bbox(&aabbs, 0, 2);
        assert_eq!(left, aabbs[1].union(&aabbs[3]));
    }

    /// Every axis ordering of `aabbs` by box center, ties by primitive index, with a comparison
    /// sort.
    fn reference_orderings(aabbs: &[Aabb]) -> [Vec<u32>; 3] {
        std::array::from_fn(|axis| {
            let mut ordering: Vec<u32> = (0..aabbs.len() as u32).collect();
            ordering.sort_by(|&a, &b| {
                let ka = aabbs[a as usize].axis_center(axis);
                let kb = aabbs[b as usize].axis_center(axis);
                ka.partial_cmp(&kb).unwrap().then(a.cmp(&b))
            });
            ordering
        })
    }

    #[test]
    pub fn large_inputs_match_comparison_sort() {
        // Both sets are past the size where initialize switches to radix sorting. The grid has
        // 4900 primitives per distinct key on every axis.
        for aabbs in [random_aabbs(300_000, 4), grid_aabbs(70)] {
            let count = aabbs.len();
            assert!(count > 250_000);

            let mut partitioner = AxisPartitioner::<3>::new();
            partitioner.initialize(&aabbs);
            for (axis, expected) in reference_orderings(&aabbs).iter().enumerate() {
                assert!(
                    partitioner.axis_ordering(axis) == expected.as_slice(),
                    "Axis {axis} ordering differs from the comparison sort for {count} primitives"
                );
            }

            let pivot = count / 2 + 17;
            partitioner.sort_indices(1, 0, count, pivot);
            partitioner.validate_range(&aabbs, 0, pivot);
            partitioner.validate_range(&aabbs, pivot, count);
        }
    }

    #[test]
    pub fn partition_recursive_splits_stay_sorted() {
        let aabbs = random_aabbs(1000, 99);
        let mut partitioner = AxisPartitioner::<3>::new();
        partitioner.initialize(&aabbs);

        let mut ranges = vec![(0usize, aabbs.len(), 0usize)];
        while let Some((begin, end, depth)) = ranges.pop() {
            if end - begin < 2 {
                continue;
            }
            // Alternate axes and use an off center pivot so both commit paths get used.
            let axis = depth % 3;
            let pivot = begin + (end - begin) / 3 + 1;
            partitioner.sort_indices(axis, begin, end, pivot);
            partitioner.validate_range(&aabbs, begin, pivot);
            partitioner.validate_range(&aabbs, pivot, end);
            partitioner.validate_set_identity(begin, pivot);
            partitioner.validate_set_identity(pivot, end);
            ranges.push((begin, pivot, depth + 1));
            ranges.push((pivot, end, depth + 1));
        }
        assert!(is_permutation(partitioner.get_item_ordering(), aabbs.len()));
    }
}
