//! Point samplers for generating event vertices inside primitive solids.
//!
//! Each sampler draws a point uniformly (by volume or by surface, depending on
//! the requested region) in the local frame of its shape and maps it through
//! the shape's [`crate::transform::Transform`] into the parent frame.
use std::f64::consts::TAU;

use glam::DVec3;
use mint::Vector3;
use rand::RngCore;

use crate::error::{Error, Result};

pub mod box_sampler;
pub mod cylinder_sampler;
pub mod hex_prism_sampler;

pub use box_sampler::{BoxPointSampler, BoxRegion};
pub use cylinder_sampler::{CylinderPointSampler, CylinderRegion};
pub use hex_prism_sampler::HexPrismPointSampler;

/// Region tag for a uniform draw over a solid's whole volume.
pub const WHOLE_VOL: &str = "WHOLE_VOL";

/// Trait for region-aware point sampling.
pub trait PointSampling: Send + Sync {
    /// Region tags this sampler accepts.
    fn regions(&self) -> &'static [&'static str];

    fn generate_vertex(&self, region: &str, rng: &mut dyn RngCore) -> Result<Vector3<f64>>;
}

/// Resolve a region tag against a closed table of `(tag, value)` pairs.
pub(crate) fn resolve_region<R: Copy>(
    owner: &str,
    region: &str,
    table: &[(&'static str, R)],
) -> Result<R> {
    table
        .iter()
        .find(|(tag, _)| *tag == region)
        .map(|(_, value)| *value)
        .ok_or_else(|| {
            let accepted: Vec<&str> = table.iter().map(|(tag, _)| *tag).collect();
            Error::unknown_region(owner, region, &accepted)
        })
}

/// Generate a random double in the range [0, 1).
#[inline]
pub(crate) fn rand01(rng: &mut dyn RngCore) -> f64 {
    (rng.next_u64() >> 11) as f64 * (1.0 / (1u64 << 53) as f64)
}

/// Generate a random double in the range [lo, hi).
#[inline]
pub(crate) fn rand_between(rng: &mut dyn RngCore, lo: f64, hi: f64) -> f64 {
    lo + rand01(rng) * (hi - lo)
}

/// Generate a uniform index in `0..n`. `n` must be non-zero.
#[inline]
pub(crate) fn uniform_index(rng: &mut dyn RngCore, n: u64) -> u64 {
    debug_assert!(n > 0, "uniform_index needs a non-empty range");
    ((rng.next_u64() as u128 * n as u128) >> 64) as u64
}

/// Isotropic unit vector.
pub fn isotropic_direction(rng: &mut dyn RngCore) -> DVec3 {
    let cos_theta = 2.0 * rand01(rng) - 1.0;
    let sin_theta = (1.0 - cos_theta * cos_theta).max(0.0).sqrt();
    let phi = TAU * rand01(rng);
    DVec3::new(sin_theta * phi.cos(), sin_theta * phi.sin(), cos_theta)
}
