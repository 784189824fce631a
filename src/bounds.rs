//! The box interface the partitioner and builder consume.

use std::fmt::Debug;

/// Marker for types that can cross threads when the `parallel` feature is enabled.
#[cfg(feature = "parallel")]
pub trait MaybeSync: Send + Sync {}
#[cfg(feature = "parallel")]
impl<T: Send + Sync> MaybeSync for T {}

/// Marker for types that can cross threads when the `parallel` feature is enabled.
#[cfg(not(feature = "parallel"))]
pub trait MaybeSync {}
#[cfg(not(feature = "parallel"))]
impl<T> MaybeSync for T {}

/// A `D` dimensional axis-aligned box that can be invalidated and grown by union.
///
/// Primitive bounds are borrowed by [`crate::partition::AxisPartitioner`] for the duration of
/// each call and must stay unchanged between `initialize` and the last split of a build.
pub trait Bounds<const D: usize>: Copy + Debug + PartialEq + MaybeSync {
    /// The empty box. Inserting any box into it yields that box.
    const INVALID: Self;

    fn axis_min(&self, axis: usize) -> f32;

    fn axis_max(&self, axis: usize) -> f32;

    /// Grow this box so it also encloses `other`.
    fn insert(&mut self, other: &Self);

    /// Checks if min <= max on all axes.
    fn is_valid(&self) -> bool;

    /// Half of the box surface measure (half area in 3D, half perimeter in 2D). Used as the SAH
    /// probability term.
    fn half_area(&self) -> f32;

    /// Checks if `other` lies fully inside this box.
    fn contains(&self, other: &Self) -> bool;

    #[inline(always)]
    fn axis_center(&self, axis: usize) -> f32 {
        (self.axis_min(axis) + self.axis_max(axis)) * 0.5
    }
}
