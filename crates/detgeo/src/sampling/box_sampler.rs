//! Uniform vertex sampling inside or on the surface of a box.
use glam::DVec3;
use mint::Vector3;
use rand::RngCore;

use crate::error::Result;
use crate::sampling::{rand01, rand_between, resolve_region, PointSampling};
use crate::shape::BoxShape;
use crate::transform::Transform;

/// Regions understood by [`BoxPointSampler`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BoxRegion {
    WholeVolume,
    Surface,
}

const BOX_REGIONS: &[(&str, BoxRegion)] = &[
    ("WHOLE_VOL", BoxRegion::WholeVolume),
    ("SURFACE", BoxRegion::Surface),
];

const BOX_REGION_TAGS: &[&str] = &["WHOLE_VOL", "SURFACE"];

/// Box sampler.
///
/// The box volume measure factorizes across axes, so a volume draw is three
/// independent uniform coordinates. A surface draw first picks a face with
/// probability proportional to its area.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoxPointSampler {
    pub shape: BoxShape,
    pub placement: Transform,
}

impl BoxPointSampler {
    pub fn new(shape: BoxShape, placement: Transform) -> Self {
        Self { shape, placement }
    }

    /// Sampler for a box centered on the parent origin.
    pub fn centered(shape: BoxShape) -> Self {
        Self::new(shape, Transform::IDENTITY)
    }

    pub fn sample(&self, region: BoxRegion, rng: &mut dyn RngCore) -> DVec3 {
        let local = match region {
            BoxRegion::WholeVolume => self.local_volume_point(rng),
            BoxRegion::Surface => self.local_surface_point(rng),
        };
        self.placement.transform_point(local)
    }

    fn local_volume_point(&self, rng: &mut dyn RngCore) -> DVec3 {
        let s = &self.shape;
        let x = rand_between(rng, -s.half_x(), s.half_x());
        let y = rand_between(rng, -s.half_y(), s.half_y());
        let z = rand_between(rng, -s.half_z(), s.half_z());
        DVec3::new(x, y, z)
    }

    fn local_surface_point(&self, rng: &mut dyn RngCore) -> DVec3 {
        let (hx, hy, hz) = (self.shape.half_x(), self.shape.half_y(), self.shape.half_z());

        // Each pair of opposite faces, weighted by the area of one face.
        let area_xy = hx * hy;
        let area_yz = hy * hz;
        let area_xz = hx * hz;
        let total = area_xy + area_yz + area_xz;

        let pick = rand01(rng) * total;
        let sign = if rand01(rng) < 0.5 { -1.0 } else { 1.0 };

        if pick < area_xy {
            let x = rand_between(rng, -hx, hx);
            let y = rand_between(rng, -hy, hy);
            DVec3::new(x, y, sign * hz)
        } else if pick < area_xy + area_yz {
            let y = rand_between(rng, -hy, hy);
            let z = rand_between(rng, -hz, hz);
            DVec3::new(sign * hx, y, z)
        } else {
            let x = rand_between(rng, -hx, hx);
            let z = rand_between(rng, -hz, hz);
            DVec3::new(x, sign * hy, z)
        }
    }
}

impl PointSampling for BoxPointSampler {
    fn regions(&self) -> &'static [&'static str] {
        BOX_REGION_TAGS
    }

    fn generate_vertex(&self, region: &str, rng: &mut dyn RngCore) -> Result<Vector3<f64>> {
        let region = resolve_region("box sampler", region, BOX_REGIONS)?;
        Ok(self.sample(region, rng).into())
    }
}
