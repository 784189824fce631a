//! Split policies that choose where to cut a range of the presorted axis orderings.

use crate::{bounds::Bounds, partition::AxisPartitioner};

/// How the builder picks the split axis and pivot of each range.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SplitHeuristic {
    /// Cut the range in half along the axis with the largest sort key extent.
    #[default]
    Median,
    /// Evaluate the surface area heuristic at every cut of every axis and take the cheapest.
    Sah,
}

/// A cut of the range `begin..end`: `begin..pivot` of the `axis` ordering goes left.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Split {
    pub axis: usize,
    pub pivot: usize,
}

/// Object median split on the axis whose sort keys spread the furthest within `begin..end`.
///
/// Each ordering is sorted within the range, so the spread of an axis is just its last key minus
/// its first.
pub fn median_split<const D: usize, B: Bounds<D>>(
    partitioner: &AxisPartitioner<D>,
    bboxes: &[B],
    begin: usize,
    end: usize,
) -> Split {
    debug_assert!(end - begin >= 2, "Cannot split fewer than two primitives");
    let sort_key = partitioner.sort_key();

    let mut axis = 0;
    let mut largest_extent = f32::NEG_INFINITY;
    for d in 0..D {
        let ordering = &partitioner.axis_ordering(d)[begin..end];
        let first = sort_key.value(&bboxes[ordering[0] as usize], d);
        let last = sort_key.value(&bboxes[ordering[ordering.len() - 1] as usize], d);
        let extent = last - first;
        if extent > largest_extent {
            largest_extent = extent;
            axis = d;
        }
    }

    Split {
        axis,
        pivot: begin + (end - begin) / 2,
    }
}

/// Full sweep SAH over the presorted orderings. Keeps the per-position area buffer around so
/// repeated evaluations don't allocate.
#[derive(Clone, Debug, Default)]
pub struct SahSplitter {
    right_areas: Vec<f32>,
}

impl SahSplitter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cheapest split of `begin..end` and its cost, relative to `parent_aabb`:
    /// `traversal_cost + intersection_cost * (A_l * N_l + A_r * N_r) / A_parent`.
    ///
    /// Returns `None` when no finite cost exists, e.g. for flat or invalid parent boxes.
    #[allow(clippy::too_many_arguments)]
    pub fn find_split<const D: usize, B: Bounds<D>>(
        &mut self,
        partitioner: &AxisPartitioner<D>,
        bboxes: &[B],
        begin: usize,
        end: usize,
        parent_aabb: &B,
        traversal_cost: f32,
        intersection_cost: f32,
    ) -> Option<(Split, f32)> {
        crate::scope!("sah_find_split");

        let count = end - begin;
        let parent_area = parent_aabb.half_area();
        if count < 2 || !(parent_area > 0.0 && parent_area.is_finite()) {
            return None;
        }

        self.right_areas.resize(count, 0.0);

        let mut best = None;
        let mut best_cost = f32::INFINITY;
        for axis in 0..D {
            let ordering = &partitioner.axis_ordering(axis)[begin..end];

            let mut right = B::INVALID;
            for i in (1..count).rev() {
                right.insert(&bboxes[ordering[i] as usize]);
                self.right_areas[i] = right.half_area();
            }

            let mut left = B::INVALID;
            for i in 1..count {
                left.insert(&bboxes[ordering[i - 1] as usize]);
                let cost = left.half_area() * i as f32 + self.right_areas[i] * (count - i) as f32;
                if cost < best_cost {
                    best_cost = cost;
                    best = Some(Split {
                        axis,
                        pivot: begin + i,
                    });
                }
            }
        }

        best.map(|split| {
            (
                split,
                traversal_cost + intersection_cost * best_cost / parent_area,
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use glam::Vec3A;

    use super::*;
    use crate::aabb::Aabb;

    fn unit_box(x: f32, y: f32, z: f32) -> Aabb {
        let min = Vec3A::new(x, y, z);
        Aabb::new(min, min + 1.0)
    }

    #[test]
    fn median_picks_widest_axis() {
        let bboxes: Vec<Aabb> = (0..8).map(|i| unit_box(0.0, i as f32 * 3.0, 0.5)).collect();
        let mut partitioner = AxisPartitioner::<3>::new();
        partitioner.initialize(&bboxes);
        let split = median_split(&partitioner, &bboxes, 0, 8);
        assert_eq!(split, Split { axis: 1, pivot: 4 });
        let split = median_split(&partitioner, &bboxes, 2, 5);
        assert_eq!(split, Split { axis: 1, pivot: 3 });
    }

    #[test]
    fn sah_finds_gap_between_clusters() {
        // Two tight clusters along z, three boxes near z = 0 and five near z = 50. Jitter x and y
        // so neither of those orderings keeps the clusters apart.
        let jitter = |i: usize| ((i * 3) % 8) as f32 * 0.01;
        let bboxes: Vec<Aabb> = (0..8)
            .map(|i| {
                let z = if i < 3 { 0.0 } else { 50.0 };
                unit_box((i % 5) as f32 * 0.1, jitter(i), z)
            })
            .collect();
        let mut partitioner = AxisPartitioner::<3>::new();
        partitioner.initialize(&bboxes);
        let parent = partitioner.compute_bbox(&bboxes, 0, 8);

        let mut sah = SahSplitter::new();
        let (split, cost) = sah
            .find_split(&partitioner, &bboxes, 0, 8, &parent, 1.0, 1.0)
            .unwrap();
        assert_eq!(split, Split { axis: 2, pivot: 3 });
        assert!(cost < 8.0, "splitting the clusters should beat a leaf, cost {cost}");
        let left: Vec<u32> = partitioner.axis_ordering(2)[..3].to_vec();
        assert_eq!(left, [0, 1, 2]);
    }

    #[test]
    fn sah_rejects_flat_parent() {
        let bboxes: Vec<Aabb> = (0..4)
            .map(|_| Aabb::from_point(Vec3A::splat(2.0)))
            .collect();
        let mut partitioner = AxisPartitioner::<3>::new();
        partitioner.initialize(&bboxes);
        let parent = partitioner.compute_bbox(&bboxes, 0, 4);
        let mut sah = SahSplitter::new();
        assert!(sah
            .find_split(&partitioner, &bboxes, 0, 4, &parent, 1.0, 1.0)
            .is_none());
    }
}
