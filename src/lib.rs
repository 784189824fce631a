//! # Presorted axis partitioning for top-down BVH construction
//!
//! - [`partition::AxisPartitioner`] sorts primitive indices once along every axis, then commits
//!   each split of a top-down build with a stable partition of the other axes, so the orderings
//!   stay sorted inside every child range without sorting again.
//! - A reference [`bvh2::builder::Bvh2Builder`] drives the partitioner with either an object
//!   median or a full sweep SAH split and writes a flat binary BVH.
//! - Works on any [`bounds::Bounds`] box type; 3D [`aabb::Aabb`] and 2D [`aabb::Aabb2`] are provided.
//!
//! The axis sorts optionally use [rayon](https://github.com/rayon-rs/rayon) (`parallel` feature).
//! Split commits are always single threaded: one partitioner drives one build.
//!
//! ## Example
//!
//! ```
//! use axbvh::{partition::AxisPartitioner, test_util::scenes::random_aabbs};
//!
//! let aabbs = random_aabbs(100, 0);
//!
//! let mut partitioner = AxisPartitioner::<3>::new();
//! partitioner.initialize(&aabbs);
//!
//! // The driver picks an axis and a cut position along that axis' ordering...
//! let root = partitioner.compute_bbox(&aabbs, 0, 100);
//! let axis = root.largest_axis();
//! partitioner.sort_indices(axis, 0, 100, 50);
//!
//! // ...and both halves are now coherent on every axis.
//! partitioner.validate_range(&aabbs, 0, 50);
//! partitioner.validate_range(&aabbs, 50, 100);
//! ```
//!
//! Or let the reference builder do the recursion:
//!
//! ```
//! use axbvh::{bvh2::builder::build_bvh2, test_util::scenes::random_aabbs, BvhBuildParams};
//! use std::time::Duration;
//!
//! let aabbs = random_aabbs(1000, 0);
//! let bvh = build_bvh2(&aabbs, BvhBuildParams::medium_build(), &mut Duration::default());
//!
//! // Leaves index into primitive_indices, which maps back to the original primitives.
//! let leaf = bvh.nodes.iter().find(|node| node.is_leaf()).unwrap();
//! for &prim_id in bvh.leaf_primitives(leaf) {
//!     assert!(leaf.aabb.contains_aabb(&aabbs[prim_id as usize]));
//! }
//! ```

use std::time::Duration;

use bvh2::split::SplitHeuristic;
use partition::key::SortKey;

pub mod aabb;
pub mod bounds;
pub mod bvh2;
pub mod partition;
pub mod test_util;

/// A macro to measure and print the execution time of a block of code.
///
/// # Arguments
/// * `$label` - A string label to identify the code block being timed.
/// * `$($code:tt)*` - The code block whose execution time is to be measured.
///
/// # Usage
/// ```rust
/// use axbvh::timeit;
/// timeit!["example",
///     // code to measure
/// ];
/// ```
///
/// # Note
/// The macro purposefully doesn't include a scope so variables don't need to
/// be passed out of it. This allows it to be trivially added to existing code.
///
/// This macro only measures time when the `timeit` feature is enabled.
#[macro_export]
#[doc(hidden)]
macro_rules! timeit {
    [$label:expr, $($code:tt)*] => {
        #[cfg(feature = "timeit")]
        let timeit_start = std::time::Instant::now();
        $($code)*
        #[cfg(feature = "timeit")]
        println!("{:>8} {}", format!("{}", $crate::PrettyDuration(timeit_start.elapsed())), $label);
    };
}

/// A wrapper struct for `std::time::Duration` to provide pretty-printing of durations.
#[doc(hidden)]
pub struct PrettyDuration(pub Duration);

impl std::fmt::Display for PrettyDuration {
    /// Durations are formatted as follows:
    /// - If the duration is greater than or equal to 1 second, it is formatted in seconds (s).
    /// - If the duration is greater than or equal to 1 millisecond but less than 1 second, it is formatted in milliseconds (ms).
    /// - If the duration is less than 1 millisecond, it is formatted in microseconds (µs).
    ///   In the case of seconds & milliseconds, the duration is always printed with a precision of two decimal places.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let duration = self.0;
        if duration.as_secs() > 0 {
            let seconds =
                duration.as_secs() as f64 + f64::from(duration.subsec_nanos()) / 1_000_000_000.0;
            write!(f, "{seconds:.2}s ")
        } else if duration.subsec_millis() > 0 {
            let milliseconds =
                duration.as_millis() as f64 + f64::from(duration.subsec_micros() % 1_000) / 1_000.0;
            write!(f, "{milliseconds:.2}ms")
        } else {
            let microseconds = duration.as_micros();
            write!(f, "{microseconds}µs")
        }
    }
}

/// Add profile scope. Nesting the macro allows us to make the profiling crate optional.
#[doc(hidden)]
#[macro_export]
macro_rules! scope {
    [$label:expr] => {
        #[cfg(feature = "profile")]
        profiling::scope!($label);
    };
}

/// Build parameters for [`bvh2::builder::Bvh2Builder`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BvhBuildParams {
    /// How each range is split.
    pub split_heuristic: SplitHeuristic,
    /// Which box coordinate orders primitives along each axis.
    pub sort_key: SortKey,
    /// Min 1. Ranges above this size are always split. With SAH, ranges at or below it become a
    /// leaf only when that is cheaper than the best split.
    pub max_prims_per_leaf: u32,
    /// SAH cost of visiting an inner node, relative to `intersection_cost`.
    pub traversal_cost: f32,
    /// SAH cost of intersecting one primitive.
    pub intersection_cost: f32,
}

impl BvhBuildParams {
    pub const fn fastest_build() -> Self {
        BvhBuildParams {
            split_heuristic: SplitHeuristic::Median,
            sort_key: SortKey::Center,
            max_prims_per_leaf: 8,
            traversal_cost: 1.0,
            intersection_cost: 1.0,
        }
    }
    pub const fn fast_build() -> Self {
        BvhBuildParams {
            split_heuristic: SplitHeuristic::Median,
            sort_key: SortKey::Center,
            max_prims_per_leaf: 4,
            traversal_cost: 1.0,
            intersection_cost: 1.0,
        }
    }
    pub const fn medium_build() -> Self {
        BvhBuildParams {
            split_heuristic: SplitHeuristic::Sah,
            sort_key: SortKey::Center,
            max_prims_per_leaf: 4,
            traversal_cost: 1.0,
            intersection_cost: 1.0,
        }
    }
    /// Lets SAH pick leaf sizes up to 8, with inner nodes a little more expensive than a
    /// primitive test.
    pub const fn slow_build() -> Self {
        BvhBuildParams {
            split_heuristic: SplitHeuristic::Sah,
            sort_key: SortKey::Center,
            max_prims_per_leaf: 8,
            traversal_cost: 1.2,
            intersection_cost: 1.0,
        }
    }
}

impl Default for BvhBuildParams {
    fn default() -> Self {
        Self::medium_build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pretty_duration() {
        let fmt = |d| format!("{}", PrettyDuration(d));
        assert_eq!(fmt(Duration::from_micros(250)), "250µs");
        assert_eq!(fmt(Duration::from_micros(2_500)), "2.50ms");
        assert_eq!(fmt(Duration::from_millis(1_500)), "1.50s ");
    }
}
