//! Random sources for emission and collision jitter
//!
//! Every random draw in the simulation goes through [`RandomSource`], so a
//! test can swap the xorshift generator for a scripted [`SequenceRng`] and
//! check exact outcomes.

use cinder_core::Vec3;

/// A source of uniform floats in `[0, 1)`, plus the shaped draws built on it
pub trait RandomSource {
    /// Returns a float in [0, 1)
    fn next_f32(&mut self) -> f32;

    /// Returns a float in [min, max)
    fn range(&mut self, min: f32, max: f32) -> f32 {
        min + self.next_f32() * (max - min)
    }

    /// Returns a float in [-1, 1)
    fn signed(&mut self) -> f32 {
        self.range(-1.0, 1.0)
    }

    /// True with probability `p`
    fn chance(&mut self, p: f32) -> bool {
        self.next_f32() < p
    }

    /// Uniform index into a non-empty collection of `len` items
    fn index(&mut self, len: usize) -> usize {
        debug_assert!(len > 0);
        ((self.next_f32() * len as f32) as usize).min(len.saturating_sub(1))
    }

    /// Uniform point in the box `[-half, half)` on each axis
    fn in_box(&mut self, half_extents: Vec3) -> Vec3 {
        let x = self.signed() * half_extents.x;
        let y = self.signed() * half_extents.y;
        let z = self.signed() * half_extents.z;
        Vec3::new(x, y, z)
    }

    /// Perturb `base` by a random azimuth (about +Y) and a random elevation
    /// (about +Z), both in degrees, composed in `order`. A full azimuth arc
    /// with a narrow elevation arc gives a cone-shaped spray.
    fn spray(
        &mut self,
        base: Vec3,
        azimuth: (f32, f32),
        elevation: (f32, f32),
        order: SprayOrder,
    ) -> Vec3 {
        let az = self.range(azimuth.0, azimuth.1);
        let el = self.range(elevation.0, elevation.1);
        match order {
            SprayOrder::AzimuthFirst => base.rotate_y(az).rotate_z(el),
            SprayOrder::ElevationFirst => base.rotate_z(el).rotate_y(az),
        }
    }
}

/// Which spray rotation is applied to the base velocity first
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SprayOrder {
    #[default]
    AzimuthFirst,
    ElevationFirst,
}

impl SprayOrder {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "azimuth_first" => Some(SprayOrder::AzimuthFirst),
            "elevation_first" => Some(SprayOrder::ElevationFirst),
            _ => None,
        }
    }
}

/// Lightweight xorshift32 PRNG
pub struct ParticleRng {
    state: u32,
}

impl ParticleRng {
    pub fn new(seed: u32) -> Self {
        Self {
            state: if seed == 0 { 1 } else { seed },
        }
    }

    fn next_u32(&mut self) -> u32 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 17;
        x ^= x << 5;
        self.state = x;
        x
    }
}

impl RandomSource for ParticleRng {
    fn next_f32(&mut self) -> f32 {
        // Top 24 bits: exactly representable, never reaches 1.0
        (self.next_u32() >> 8) as f32 / (1u32 << 24) as f32
    }
}

/// Replays a fixed list of values, cycling when exhausted
pub struct SequenceRng {
    values: Vec<f32>,
    cursor: usize,
}

impl SequenceRng {
    pub fn new(values: Vec<f32>) -> Self {
        Self { values, cursor: 0 }
    }

    /// Always returns `value`
    pub fn constant(value: f32) -> Self {
        Self::new(vec![value])
    }
}

impl RandomSource for SequenceRng {
    fn next_f32(&mut self) -> f32 {
        if self.values.is_empty() {
            return 0.0;
        }
        let v = self.values[self.cursor % self.values.len()];
        self.cursor += 1;
        v
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rng_range_bounds() {
        let mut rng = ParticleRng::new(42);
        for _ in 0..1000 {
            let v = rng.range(0.0, 10.0);
            assert!((0.0..10.0).contains(&v));
        }
    }

    #[test]
    fn rng_unit_interval_excludes_one() {
        let mut rng = ParticleRng::new(7);
        for _ in 0..10_000 {
            let v = rng.next_f32();
            assert!((0.0..1.0).contains(&v));
        }
    }

    #[test]
    fn zero_seed_is_replaced() {
        let mut rng = ParticleRng::new(0);
        assert!(rng.next_f32() > 0.0);
    }

    #[test]
    fn in_box_stays_inside() {
        let mut rng = ParticleRng::new(99);
        let half = Vec3::new(0.5, 0.0, 2.0);
        for _ in 0..500 {
            let p = rng.in_box(half);
            assert!(p.x.abs() <= 0.5);
            assert_eq!(p.y, 0.0);
            assert!(p.z.abs() <= 2.0);
        }
    }

    #[test]
    fn spray_preserves_speed() {
        let mut rng = ParticleRng::new(3);
        let base = Vec3::new(0.25, 1.0, 0.0);
        for _ in 0..100 {
            let v = rng.spray(base, (0.0, 360.0), (0.0, 10.0), SprayOrder::AzimuthFirst);
            assert!((v.length() - base.length()).abs() < 1e-4);
        }
    }

    #[test]
    fn spray_with_empty_arcs_is_identity() {
        let mut rng = ParticleRng::new(5);
        let base = Vec3::new(0.0, 0.0, -10.0);
        for order in [SprayOrder::AzimuthFirst, SprayOrder::ElevationFirst] {
            let v = rng.spray(base, (0.0, 0.0), (0.0, 0.0), order);
            assert!((v - base).length() < 1e-6);
        }
    }

    #[test]
    fn spray_order_changes_composition() {
        let mut rng = ParticleRng::new(5);
        let base = Vec3::new(1.0, 0.0, 0.0);
        // Azimuth first swings +X onto -Z, which the Z rotation leaves alone
        let v = rng.spray(base, (90.0, 90.0), (90.0, 90.0), SprayOrder::AzimuthFirst);
        assert!((v - Vec3::new(0.0, 0.0, -1.0)).length() < 1e-5);
        // Elevation first lifts +X onto +Y, which the Y rotation leaves alone
        let v = rng.spray(base, (90.0, 90.0), (90.0, 90.0), SprayOrder::ElevationFirst);
        assert!((v - Vec3::new(0.0, 1.0, 0.0)).length() < 1e-5);
    }

    #[test]
    fn sequence_cycles() {
        let mut rng = SequenceRng::new(vec![0.1, 0.9]);
        assert_eq!(rng.next_f32(), 0.1);
        assert_eq!(rng.next_f32(), 0.9);
        assert_eq!(rng.next_f32(), 0.1);
    }

    #[test]
    fn index_in_bounds() {
        let mut rng = SequenceRng::new(vec![0.0, 0.5, 0.999_999]);
        assert_eq!(rng.index(4), 0);
        assert_eq!(rng.index(4), 2);
        assert_eq!(rng.index(4), 3);
    }
}
