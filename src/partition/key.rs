//! Per-axis sort keys and the initial sort of one axis ordering.

use bytemuck::{Pod, Zeroable};
use rdst::{RadixKey, RadixSort};

use crate::bounds::Bounds;

/// Which coordinate of a primitive's box orders it along an axis.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    /// Box center, `(min + max) * 0.5`.
    #[default]
    Center,
    /// Box minimum.
    Min,
}

impl SortKey {
    #[inline(always)]
    pub fn value<const D: usize, B: Bounds<D>>(self, aabb: &B, axis: usize) -> f32 {
        match self {
            SortKey::Center => aabb.axis_center(axis),
            SortKey::Min => aabb.axis_min(axis),
        }
    }
}

/// Maps a float to a `u32` whose unsigned order matches the float order. `-0.0` and `0.0` map to
/// the same value.
#[inline(always)]
pub fn ordered_bits(value: f32) -> u32 {
    let value = if value == 0.0 { 0.0 } else { value };
    let bits = value.to_bits();
    if bits & 0x8000_0000 != 0 {
        !bits
    } else {
        bits | 0x8000_0000
    }
}

/// Sort key in the high 32 bits, primitive index in the low 32 bits. Every code is unique, so an
/// unstable sort of codes orders equal keys by primitive index.
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq, PartialOrd, Ord, Pod, Zeroable)]
#[repr(C)]
pub struct AxisKey {
    pub code: u64,
}

impl AxisKey {
    #[inline(always)]
    pub fn new(value: f32, index: u32) -> Self {
        AxisKey {
            code: ((ordered_bits(value) as u64) << 32) | index as u64,
        }
    }

    #[inline(always)]
    pub fn index(&self) -> u32 {
        self.code as u32
    }
}

impl RadixKey for AxisKey {
    const LEVELS: usize = 8;

    #[inline(always)]
    fn get_level(&self, level: usize) -> u8 {
        self.code.get_level(level)
    }
}

/// Fills `indices` with `0..bboxes.len()` sorted ascending by `sort_key` on `axis`, ties broken by
/// primitive index. `keys` is scratch space.
pub(crate) fn sort_axis<const D: usize, B: Bounds<D>>(
    bboxes: &[B],
    axis: usize,
    sort_key: SortKey,
    keys: &mut Vec<AxisKey>,
    indices: &mut Vec<u32>,
) {
    crate::scope!("sort_axis");

    let prim_count = bboxes.len();
    keys.resize(prim_count, AxisKey::default());
    keys.iter_mut()
        .zip(bboxes)
        .enumerate()
        .for_each(|(index, (key, aabb))| {
            let value = sort_key.value(aabb, axis);
            debug_assert!(
                !value.is_nan(),
                "Primitive {index} has a NaN sort key on axis {axis}: {aabb:?}"
            );
            *key = AxisKey::new(value, index as u32);
        });

    #[cfg(feature = "parallel")]
    {
        match prim_count {
            0..=20_000 => keys.sort_unstable_by_key(|k| k.code),
            _ => keys.radix_sort_builder().with_tuner(&AxisTuner {}).sort(),
        };
    }
    #[cfg(not(feature = "parallel"))]
    {
        match prim_count {
            0..=250_000 => keys.sort_unstable_by_key(|k| k.code),
            _ => keys.radix_sort_unstable(),
        };
    }

    indices.resize(prim_count, 0);
    indices
        .iter_mut()
        .zip(keys.iter())
        .for_each(|(index, key)| *index = key.index());
}

#[cfg(feature = "parallel")]
use rdst::tuner::{Algorithm, Tuner, TuningParams};

#[cfg(feature = "parallel")]
struct AxisTuner;

#[cfg(feature = "parallel")]
impl Tuner for AxisTuner {
    fn pick_algorithm(&self, p: &TuningParams, _counts: &[usize]) -> Algorithm {
        if p.input_len <= 128 {
            return Algorithm::Comparative;
        }

        match p.input_len {
            0..=20_000 => Algorithm::Ska,
            _ => Algorithm::Regions,
        }
    }
}

#[cfg(test)]
mod tests {
    use glam::Vec3A;

    use super::*;
    use crate::aabb::Aabb;

    #[test]
    fn ordered_bits_preserves_order() {
        let values = [
            f32::MIN,
            -1.0e10,
            -3.5,
            -1.0,
            -f32::MIN_POSITIVE,
            0.0,
            f32::MIN_POSITIVE,
            0.25,
            1.0,
            7.0e12,
            f32::MAX,
        ];
        for pair in values.windows(2) {
            assert!(
                ordered_bits(pair[0]) < ordered_bits(pair[1]),
                "{} should order before {}",
                pair[0],
                pair[1]
            );
        }
        assert_eq!(ordered_bits(-0.0), ordered_bits(0.0));
    }

    #[test]
    fn axis_key_ties_break_by_index() {
        assert!(AxisKey::new(1.0, 3) < AxisKey::new(1.0, 4));
        assert!(AxisKey::new(1.0, 9) < AxisKey::new(2.0, 0));
        assert_eq!(AxisKey::new(-2.0, 17).index(), 17);
    }

    #[test]
    fn sort_axis_by_center_and_min() {
        // Centers on x: 2.0, 1.0, 0.5. Mins on x: 0.0, 1.0, -1.0.
        let bboxes = [
            Aabb::new(Vec3A::new(0.0, 0.0, 0.0), Vec3A::new(4.0, 1.0, 1.0)),
            Aabb::new(Vec3A::new(1.0, 0.0, 0.0), Vec3A::new(1.0, 1.0, 1.0)),
            Aabb::new(Vec3A::new(-1.0, 0.0, 0.0), Vec3A::new(2.0, 1.0, 1.0)),
        ];
        let mut keys = Vec::new();
        let mut indices = Vec::new();

        sort_axis(&bboxes, 0, SortKey::Center, &mut keys, &mut indices);
        assert_eq!(indices, [2, 1, 0]);

        sort_axis(&bboxes, 0, SortKey::Min, &mut keys, &mut indices);
        assert_eq!(indices, [2, 0, 1]);

        // All equal on y, identity order.
        sort_axis(&bboxes, 1, SortKey::Center, &mut keys, &mut indices);
        assert_eq!(indices, [0, 1, 2]);
    }
}
