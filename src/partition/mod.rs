//! Presorted per-axis primitive orderings, and the stable range split that keeps them coherent
//! while a top-down builder recursively subdivides them.
//!
//! [`AxisPartitioner::initialize`] sorts the primitive indices once along every axis. From then on
//! a builder works on contiguous ranges of those orderings: it picks an axis and a cut position
//! within a range (on that axis the range is already sorted, so any cut is a valid spatial split)
//! and commits it with [`AxisPartitioner::sort_indices`], which stably partitions every other axis
//! to match. Both children then hold the same primitives on every axis, each axis still sorted, so
//! the recursion never has to sort again.

pub mod key;

use std::mem;

use bytemuck::zeroed_vec;

#[cfg(feature = "parallel")]
use rayon::iter::{IndexedParallelIterator, IntoParallelRefMutIterator, ParallelIterator};

use crate::bounds::Bounds;
use key::{sort_axis, AxisKey, SortKey};

/// Which child of the current split a primitive lands in.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Side {
    #[default]
    Left,
    Right,
}

/// Holds one ordering of primitive indices per axis, plus the scratch used to split them.
///
/// The partitioner never stores the primitive bounds. Every call that needs them borrows the same
/// slice that was passed to [`AxisPartitioner::initialize`], which must not change in between.
///
/// One instance drives one single threaded build. To build subtrees on separate threads, give
/// each thread its own partitioner.
#[derive(Clone, Debug)]
pub struct AxisPartitioner<const D: usize> {
    indices: [Vec<u32>; D],
    scratch: Vec<u32>,
    tags: Vec<Side>,
    keys: Vec<AxisKey>,
    sort_key: SortKey,
}

impl<const D: usize> Default for AxisPartitioner<D> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const D: usize> AxisPartitioner<D> {
    /// Create an empty partitioner ordering primitives by box center.
    pub fn new() -> Self {
        Self::with_sort_key(SortKey::Center)
    }

    pub fn with_sort_key(sort_key: SortKey) -> Self {
        assert!(D > 0, "AxisPartitioner needs at least one axis");
        AxisPartitioner {
            indices: std::array::from_fn(|_| Vec::new()),
            scratch: Vec::new(),
            tags: Vec::new(),
            keys: Vec::new(),
            sort_key,
        }
    }

    /// Create a partitioner with buffers preallocated for `prim_count` primitives. Keep it around
    /// after a build to reuse the allocations.
    pub fn with_capacity(prim_count: usize) -> Self {
        crate::scope!("preallocate_partitioner");
        let mut partitioner = Self::new();
        partitioner.indices = std::array::from_fn(|_| zeroed_vec(prim_count));
        partitioner.scratch = zeroed_vec(prim_count);
        partitioner.tags = vec![Side::Left; prim_count];
        partitioner.keys = zeroed_vec(prim_count);
        partitioner
    }

    #[inline(always)]
    pub fn sort_key(&self) -> SortKey {
        self.sort_key
    }

    /// Takes effect at the next [`AxisPartitioner::initialize`].
    #[inline(always)]
    pub fn set_sort_key(&mut self, sort_key: SortKey) {
        self.sort_key = sort_key;
    }

    /// Number of primitives in the current orderings.
    #[inline(always)]
    pub fn len(&self) -> usize {
        self.indices[0].len()
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Sort `0..bboxes.len()` along every axis and size the scratch buffers. Replaces all previous
    /// state. An empty slice is valid and results in empty orderings.
    pub fn initialize<B: Bounds<D>>(&mut self, bboxes: &[B]) {
        crate::scope!("initialize_partitioner");

        let prim_count = bboxes.len();
        assert!(
            prim_count <= u32::MAX as usize,
            "Primitive count {prim_count} does not fit in u32 indices"
        );
        let sort_key = self.sort_key;

        #[cfg(feature = "parallel")]
        {
            self.indices
                .as_mut_slice()
                .par_iter_mut()
                .enumerate()
                .for_each(|(axis, indices)| {
                    let mut keys = Vec::new();
                    sort_axis(bboxes, axis, sort_key, &mut keys, indices);
                });
        }
        #[cfg(not(feature = "parallel"))]
        {
            for (axis, indices) in self.indices.iter_mut().enumerate() {
                sort_axis(bboxes, axis, sort_key, &mut self.keys, indices);
            }
        }

        self.scratch.resize(prim_count, 0);
        self.tags.resize(prim_count, Side::Left);
    }

    /// Union of the boxes of the primitives at `begin..end` of the axis 0 ordering. Returns
    /// [`Bounds::INVALID`] for an empty range.
    #[inline]
    pub fn compute_bbox<B: Bounds<D>>(&self, bboxes: &[B], begin: usize, end: usize) -> B {
        debug_assert!(
            begin <= end && end <= self.len(),
            "Range {begin}..{end} out of bounds for {} primitives",
            self.len()
        );

        let mut bbox = B::INVALID;
        for &index in &self.indices[0][begin..end] {
            bbox.insert(&bboxes[index as usize]);
        }
        bbox
    }

    /// The axis 0 ordering. Once a build has split every range down to its leaves this is the
    /// primitive order the leaves index into.
    #[inline(always)]
    pub fn get_item_ordering(&self) -> &[u32] {
        &self.indices[0]
    }

    /// The ordering of `axis`.
    #[inline(always)]
    pub fn axis_ordering(&self, axis: usize) -> &[u32] {
        &self.indices[axis]
    }

    /// Commit a split of the range `begin..end` at `pivot` along `split_axis`.
    ///
    /// The primitives at `begin..pivot` of the `split_axis` ordering become the left child and
    /// those at `pivot..end` the right child. Every other axis is stably partitioned to match, so
    /// afterwards all axes hold the same primitives in `begin..pivot` and in `pivot..end`, each
    /// still sorted along its own axis. The `split_axis` ordering itself is left untouched.
    ///
    /// `begin..end` must be an active range: the root range after [`AxisPartitioner::initialize`],
    /// or a child produced by an earlier split that has not been split since. Requires
    /// `begin <= pivot <= end <= self.len()` and `split_axis < D`. Violations are caught by debug
    /// assertions only.
    pub fn sort_indices(&mut self, split_axis: usize, begin: usize, end: usize, pivot: usize) {
        crate::scope!("sort_indices");

        let size = self.len();
        debug_assert!(split_axis < D, "Split axis {split_axis} out of range for {D} axes");
        debug_assert!(
            begin <= pivot && pivot <= end && end <= size,
            "Invalid split {begin}..{pivot}..{end} for {size} primitives"
        );

        #[cfg(all(feature = "validate", debug_assertions))]
        self.validate_set_identity(begin, end);

        let Self {
            indices: axes,
            scratch,
            tags,
            ..
        } = self;

        for &index in &axes[split_axis][begin..pivot] {
            tags[index as usize] = Side::Left;
        }
        for &index in &axes[split_axis][pivot..end] {
            tags[index as usize] = Side::Right;
        }

        for (axis, indices) in axes.iter_mut().enumerate() {
            if axis == split_axis {
                continue;
            }

            let mut left = begin;
            let mut right = pivot;
            for &index in &indices[begin..end] {
                match tags[index as usize] {
                    Side::Left => {
                        debug_assert!(left < pivot, "Axis {axis} has too many left primitives");
                        scratch[left] = index;
                        left += 1;
                    }
                    Side::Right => {
                        debug_assert!(right < end, "Axis {axis} has too many right primitives");
                        scratch[right] = index;
                        right += 1;
                    }
                }
            }
            debug_assert_eq!(left, pivot, "Axis {axis} is out of sync with the split axis");
            debug_assert_eq!(right, end, "Axis {axis} is out of sync with the split axis");

            // Large ranges: moving the untouched head and tail into scratch and swapping buffers
            // moves less data than copying the range back.
            if end - begin > size / 2 {
                scratch[..begin].copy_from_slice(&indices[..begin]);
                scratch[end..].copy_from_slice(&indices[end..]);
                mem::swap(indices, scratch);
            } else {
                indices[begin..end].copy_from_slice(&scratch[begin..end]);
            }
        }
    }

    /// Asserts that every axis holds the same primitives in `begin..end`, each exactly once.
    pub fn validate_set_identity(&self, begin: usize, end: usize) {
        let mut reference = self.indices[0][begin..end].to_vec();
        reference.sort_unstable();
        assert!(
            reference.windows(2).all(|w| w[0] != w[1]),
            "Duplicate primitive in axis 0 range {begin}..{end}"
        );
        for (axis, indices) in self.indices.iter().enumerate().skip(1) {
            let mut set = indices[begin..end].to_vec();
            set.sort_unstable();
            assert_eq!(
                set, reference,
                "Axis {axis} holds different primitives than axis 0 in range {begin}..{end}"
            );
        }
    }

    /// Asserts the invariants of an active range: the same primitives on every axis, and every
    /// axis sorted by its key (ties by primitive index) within `begin..end`.
    pub fn validate_range<B: Bounds<D>>(&self, bboxes: &[B], begin: usize, end: usize) {
        self.validate_set_identity(begin, end);
        for (axis, indices) in self.indices.iter().enumerate() {
            for pair in indices[begin..end].windows(2) {
                let [a, b] = [pair[0], pair[1]].map(|index| {
                    AxisKey::new(
                        self.sort_key.value(&bboxes[index as usize], axis),
                        index,
                    )
                });
                assert!(
                    a < b,
                    "Axis {axis} is not sorted in range {begin}..{end}: primitive {} before {}",
                    pair[0],
                    pair[1]
                );
            }
        }
    }
}
