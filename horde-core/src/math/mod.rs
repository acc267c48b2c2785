//! Vector & sampling helpers
//!
//! `Vec2` comes from `bevy::math`; this module only adds the few operations the
//! simulation needs on top of it (NaN-free normalization, rotation by angle) and
//! the seeded random helpers every subsystem shares.

use bevy::math::Vec2;
use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256PlusPlus;

/// The one RNG type threaded through the whole simulation.
pub type SimRng = Xoshiro256PlusPlus;

/// Lengths at or below this normalize to zero.
pub const NORM_EPSILON: f32 = 1e-6;

pub fn rng_from_seed(seed: u64) -> SimRng {
    SimRng::seed_from_u64(seed)
}

pub trait VecExt {
    /// Unit vector in the same direction, or `Vec2::ZERO` for near-zero input.
    fn safe_norm(self) -> Vec2;
    /// Counter-clockwise rotation by `radians`.
    fn rotated(self, radians: f32) -> Vec2;
    /// Same direction, given length (zero if direction is undefined).
    fn with_len(self, len: f32) -> Vec2;
}

impl VecExt for Vec2 {
    fn safe_norm(self) -> Vec2 {
        let len = self.length();
        // negated compare so NaN lengths also fall through to zero
        if !(len > NORM_EPSILON) {
            return Vec2::ZERO;
        }
        self / len
    }

    fn rotated(self, radians: f32) -> Vec2 {
        Vec2::from_angle(radians).rotate(self)
    }

    fn with_len(self, len: f32) -> Vec2 {
        self.safe_norm() * len
    }
}

/// Clamp that maps NaN to `lo`.
pub fn clamp(v: f32, lo: f32, hi: f32) -> f32 {
    v.max(lo).min(hi)
}

pub fn clamp_i(v: i32, lo: i32, hi: i32) -> i32 {
    v.max(lo).min(hi)
}

pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Uniform value between `a` and `b`; the bounds may be given in either order.
pub fn rand_range<R: Rng + ?Sized>(rng: &mut R, a: f32, b: f32) -> f32 {
    a + rng.gen::<f32>() * (b - a)
}

/// Unit vector at a uniformly random angle.
pub fn random_unit<R: Rng + ?Sized>(rng: &mut R) -> Vec2 {
    Vec2::from_angle(rand_range(rng, 0.0, std::f32::consts::TAU))
}

pub fn sample<'a, T, R: Rng + ?Sized>(rng: &mut R, items: &'a [T]) -> Option<&'a T> {
    if items.is_empty() {
        return None;
    }
    items.get(rng.gen_range(0..items.len()))
}

/// Up to `n` distinct elements, sampled without replacement.
pub fn pick_n<T: Clone, R: Rng + ?Sized>(rng: &mut R, items: &[T], n: usize) -> Vec<T> {
    let mut indices: Vec<usize> = (0..items.len()).collect();
    let take = n.min(indices.len());
    for i in 0..take {
        let j = rng.gen_range(i..indices.len());
        indices.swap(i, j);
    }
    indices[..take].iter().map(|&i| items[i].clone()).collect()
}

/// Draws an index against the cumulative sum of `weights`; the first bucket whose
/// running total exceeds the roll wins. Non-positive totals fall back to index 0.
pub fn weighted_index<R: Rng + ?Sized>(rng: &mut R, weights: &[f32]) -> usize {
    let total: f32 = weights.iter().map(|w| w.max(0.0)).sum();
    if !(total > 0.0) {
        return 0;
    }
    let roll = rng.gen::<f32>() * total;
    let mut acc = 0.0;
    for (i, w) in weights.iter().enumerate() {
        acc += w.max(0.0);
        if roll < acc {
            return i;
        }
    }
    weights.len().saturating_sub(1)
}
