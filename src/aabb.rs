//! Axis-Aligned Bounding Boxes (AABB) represented by their minimum and maximum points.

use bytemuck::{Pod, Zeroable};
use glam::{Vec2, Vec3A};

use crate::bounds::Bounds;

/// A 3D Axis-Aligned Bounding Box (AABB) represented by its minimum and maximum points.
#[derive(Default, Clone, Copy, Debug, PartialEq, Zeroable)]
#[repr(C)]
pub struct Aabb {
    pub min: Vec3A,
    pub max: Vec3A,
}

unsafe impl Pod for Aabb {}

impl Aabb {
    /// An invalid (empty) AABB with min set to the maximum possible value
    /// and max set to the minimum possible value.
    pub const INVALID: Self = Self {
        min: Vec3A::splat(f32::MAX),
        max: Vec3A::splat(f32::MIN),
    };

    /// Creates a new AABB with the given minimum and maximum points.
    #[inline(always)]
    pub fn new(min: Vec3A, max: Vec3A) -> Self {
        Self { min, max }
    }

    /// Creates a new AABB with both min and max set to the given point.
    #[inline(always)]
    pub fn from_point(point: Vec3A) -> Self {
        Self {
            min: point,
            max: point,
        }
    }

    /// Extends the AABB to include the given point.
    #[inline(always)]
    pub fn extend(&mut self, point: Vec3A) -> &mut Self {
        *self = self.union(&Self::from_point(point));
        self
    }

    /// Returns the union of this AABB and another AABB.
    #[inline(always)]
    #[must_use]
    pub fn union(&self, other: &Self) -> Self {
        Aabb {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    /// Returns the diagonal vector of the AABB.
    #[inline(always)]
    pub fn diagonal(&self) -> Vec3A {
        self.max - self.min
    }

    /// Returns the center point of the AABB.
    #[inline(always)]
    pub fn center(&self) -> Vec3A {
        (self.max + self.min) * 0.5
    }

    /// Returns the index of the largest axis of the AABB.
    #[inline]
    pub fn largest_axis(&self) -> usize {
        let d = self.diagonal();
        if d.x < d.y {
            if d.y < d.z { 2 } else { 1 }
        } else if d.x < d.z {
            2
        } else {
            0
        }
    }

    /// Returns half the surface area of the AABB.
    #[inline(always)]
    pub fn half_area(&self) -> f32 {
        let d = self.diagonal();
        (d.x + d.y) * d.z + d.x * d.y
    }

    /// Checks if the AABB is valid (i.e., min <= max on all axes).
    pub fn valid(&self) -> bool {
        self.min.cmple(self.max).all()
    }

    /// Checks if `other` is fully enclosed by this AABB.
    #[inline(always)]
    pub fn contains_aabb(&self, other: &Aabb) -> bool {
        other.min.cmpge(self.min).all() && other.max.cmple(self.max).all()
    }
}

impl Bounds<3> for Aabb {
    const INVALID: Self = Aabb::INVALID;

    #[inline(always)]
    fn axis_min(&self, axis: usize) -> f32 {
        self.min[axis]
    }

    #[inline(always)]
    fn axis_max(&self, axis: usize) -> f32 {
        self.max[axis]
    }

    #[inline(always)]
    fn insert(&mut self, other: &Self) {
        *self = self.union(other);
    }

    #[inline(always)]
    fn is_valid(&self) -> bool {
        self.valid()
    }

    #[inline(always)]
    fn half_area(&self) -> f32 {
        Aabb::half_area(self)
    }

    #[inline(always)]
    fn contains(&self, other: &Self) -> bool {
        self.contains_aabb(other)
    }
}

/// A 2D Axis-Aligned Bounding Box, for planar scenes (sprites, curves, UI quads).
#[derive(Default, Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
#[repr(C)]
pub struct Aabb2 {
    pub min: Vec2,
    pub max: Vec2,
}

impl Aabb2 {
    pub const INVALID: Self = Self {
        min: Vec2::splat(f32::MAX),
        max: Vec2::splat(f32::MIN),
    };

    #[inline(always)]
    pub fn new(min: Vec2, max: Vec2) -> Self {
        Self { min, max }
    }

    #[inline(always)]
    #[must_use]
    pub fn union(&self, other: &Self) -> Self {
        Aabb2 {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    /// Half the perimeter, the 2D analogue of [`Aabb::half_area`].
    #[inline(always)]
    pub fn half_perimeter(&self) -> f32 {
        let d = self.max - self.min;
        d.x + d.y
    }
}

impl Bounds<2> for Aabb2 {
    const INVALID: Self = Aabb2::INVALID;

    #[inline(always)]
    fn axis_min(&self, axis: usize) -> f32 {
        self.min[axis]
    }

    #[inline(always)]
    fn axis_max(&self, axis: usize) -> f32 {
        self.max[axis]
    }

    #[inline(always)]
    fn insert(&mut self, other: &Self) {
        *self = self.union(other);
    }

    #[inline(always)]
    fn is_valid(&self) -> bool {
        self.min.cmple(self.max).all()
    }

    #[inline(always)]
    fn half_area(&self) -> f32 {
        self.half_perimeter()
    }

    #[inline(always)]
    fn contains(&self, other: &Self) -> bool {
        other.min.cmpge(self.min).all() && other.max.cmple(self.max).all()
    }
}
