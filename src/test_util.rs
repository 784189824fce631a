//! Deterministic box sets and hashing helpers for tests and benchmarks.

pub mod sampling {
    #[inline(always)]
    pub fn uhash(x: u32) -> u32 {
        // from https://nullprogram.com/blog/2018/07/31/
        let mut x = x ^ (x >> 16);
        x = x.overflowing_mul(0x7feb352d).0;
        x = x ^ (x >> 15);
        x = x.overflowing_mul(0x846ca68b).0;
        x = x ^ (x >> 16);
        x
    }

    #[inline(always)]
    pub fn uhash2(a: u32, b: u32) -> u32 {
        uhash((a.overflowing_mul(1597334673).0) ^ (b.overflowing_mul(3812015801).0))
    }

    #[inline(always)]
    pub fn unormf(n: u32) -> f32 {
        n as f32 * (1.0 / 0xffffffffu32 as f32)
    }

    /// Uniform value in 0..1 for the `n`th draw of `seed`.
    #[inline(always)]
    pub fn hash_unorm(seed: u32, n: u32) -> f32 {
        unormf(uhash2(seed, n))
    }
}

pub mod scenes {
    use glam::{vec2, vec3a};

    use super::sampling::hash_unorm;
    use crate::aabb::{Aabb, Aabb2};

    /// `count` boxes scattered in -10..10 on every axis, each up to 1 unit wide per axis.
    pub fn random_aabbs(count: usize, seed: u32) -> Vec<Aabb> {
        (0..count as u32)
            .map(|i| {
                let r = |k: u32| hash_unorm(seed, i.wrapping_mul(6).wrapping_add(k));
                let min = vec3a(r(0), r(1), r(2)) * 20.0 - 10.0;
                let size = vec3a(r(3), r(4), r(5));
                Aabb::new(min, min + size)
            })
            .collect()
    }

    /// `count` boxes scattered in -10..10, each up to 1 unit wide per axis.
    pub fn random_aabbs_2d(count: usize, seed: u32) -> Vec<Aabb2> {
        (0..count as u32)
            .map(|i| {
                let r = |k: u32| hash_unorm(seed, i.wrapping_mul(4).wrapping_add(k));
                let min = vec2(r(0), r(1)) * 20.0 - 10.0;
                Aabb2::new(min, min + vec2(r(2), r(3)))
            })
            .collect()
    }

    /// Unit boxes on an `n * n * n` integer grid, a set with many equal keys per axis.
    pub fn grid_aabbs(n: usize) -> Vec<Aabb> {
        let mut aabbs = Vec::with_capacity(n * n * n);
        for z in 0..n {
            for y in 0..n {
                for x in 0..n {
                    let min = vec3a(x as f32, y as f32, z as f32);
                    aabbs.push(Aabb::new(min, min + 1.0));
                }
            }
        }
        aabbs
    }
}
