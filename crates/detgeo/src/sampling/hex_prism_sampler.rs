//! Uniform vertex sampling inside a regular hexagonal prism.
use std::f64::consts::FRAC_PI_3;

use glam::{DVec2, DVec3};
use mint::Vector3;
use rand::RngCore;

use crate::error::Result;
use crate::sampling::{rand01, rand_between, resolve_region, uniform_index, PointSampling, WHOLE_VOL};
use crate::shape::HexPrismShape;
use crate::transform::Transform;

const HEX_REGIONS: &[(&str, ())] = &[(WHOLE_VOL, ())];
const HEX_REGION_TAGS: &[&str] = &[WHOLE_VOL];

/// Corner `k` of a pointy-top hexagon (first corner on +Y).
#[inline]
pub(crate) fn hex_corner(circumradius: f64, k: u64) -> DVec2 {
    let angle = std::f64::consts::FRAC_PI_2 + k as f64 * FRAC_PI_3;
    DVec2::new(angle.cos(), angle.sin()) * circumradius
}

/// Hexagonal prism sampler.
///
/// The hexagon splits into six congruent triangles fanning out from the
/// center. One is chosen uniformly, then a point is drawn uniformly in it by
/// folding the unit square onto the triangle.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HexPrismPointSampler {
    pub shape: HexPrismShape,
    pub placement: Transform,
}

impl HexPrismPointSampler {
    pub fn new(shape: HexPrismShape, placement: Transform) -> Self {
        Self { shape, placement }
    }

    pub fn sample(&self, rng: &mut dyn RngCore) -> DVec3 {
        let rc = self.shape.circumradius();
        let k = uniform_index(rng, 6);
        let a = hex_corner(rc, k);
        let b = hex_corner(rc, (k + 1) % 6);

        let mut u = rand01(rng);
        let mut v = rand01(rng);
        if u + v > 1.0 {
            u = 1.0 - u;
            v = 1.0 - v;
        }
        let xy = a * u + b * v;
        let half = self.shape.half_thickness();
        let z = rand_between(rng, -half, half);
        self.placement.transform_point(xy.extend(z))
    }
}

impl PointSampling for HexPrismPointSampler {
    fn regions(&self) -> &'static [&'static str] {
        HEX_REGION_TAGS
    }

    fn generate_vertex(&self, region: &str, rng: &mut dyn RngCore) -> Result<Vector3<f64>> {
        resolve_region("hexagonal prism sampler", region, HEX_REGIONS)?;
        Ok(self.sample(rng).into())
    }
}
