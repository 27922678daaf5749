//! Uniform vertex sampling over a cylindrical shell section.
use glam::DVec3;
use mint::Vector3;
use rand::RngCore;

use crate::error::Result;
use crate::sampling::{rand01, rand_between, resolve_region, PointSampling};
use crate::shape::CylinderShape;
use crate::transform::Transform;

/// Regions understood by [`CylinderPointSampler`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CylinderRegion {
    Volume,
    OuterSurface,
    InnerSurface,
    EndCaps,
}

const SOLID_REGIONS: &[(&str, CylinderRegion)] = &[
    ("VOLUME", CylinderRegion::Volume),
    ("WHOLE_VOL", CylinderRegion::Volume),
    ("OUTER_SURFACE", CylinderRegion::OuterSurface),
    ("END_CAPS", CylinderRegion::EndCaps),
];

const HOLLOW_REGIONS: &[(&str, CylinderRegion)] = &[
    ("VOLUME", CylinderRegion::Volume),
    ("WHOLE_VOL", CylinderRegion::Volume),
    ("OUTER_SURFACE", CylinderRegion::OuterSurface),
    ("INNER_SURFACE", CylinderRegion::InnerSurface),
    ("END_CAPS", CylinderRegion::EndCaps),
];

const SOLID_TAGS: &[&str] = &["VOLUME", "WHOLE_VOL", "OUTER_SURFACE", "END_CAPS"];
const HOLLOW_TAGS: &[&str] = &[
    "VOLUME",
    "WHOLE_VOL",
    "OUTER_SURFACE",
    "INNER_SURFACE",
    "END_CAPS",
];

/// Cylinder sampler with the cylinder axis along local Z.
///
/// Radii are drawn as `r = sqrt(u * (R_out^2 - R_in^2) + R_in^2)` so the
/// density follows the `r dr` area element.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CylinderPointSampler {
    pub shape: CylinderShape,
    pub placement: Transform,
}

impl CylinderPointSampler {
    pub fn new(shape: CylinderShape, placement: Transform) -> Self {
        Self { shape, placement }
    }

    pub fn centered(shape: CylinderShape) -> Self {
        Self::new(shape, Transform::IDENTITY)
    }

    fn region_table(&self) -> &'static [(&'static str, CylinderRegion)] {
        if self.shape.inner_radius() > 0.0 {
            HOLLOW_REGIONS
        } else {
            SOLID_REGIONS
        }
    }

    /// Resolve a tag against the regions this particular shape supports.
    pub fn resolve(&self, region: &str) -> Result<CylinderRegion> {
        resolve_region("cylinder sampler", region, self.region_table())
    }

    pub fn sample(&self, region: CylinderRegion, rng: &mut dyn RngCore) -> DVec3 {
        let s = &self.shape;
        let (r, z) = match region {
            CylinderRegion::Volume => (
                self.annulus_radius(rng),
                rand_between(rng, -s.half_length(), s.half_length()),
            ),
            CylinderRegion::OuterSurface => (
                s.outer_radius(),
                rand_between(rng, -s.half_length(), s.half_length()),
            ),
            CylinderRegion::InnerSurface => (
                s.inner_radius(),
                rand_between(rng, -s.half_length(), s.half_length()),
            ),
            CylinderRegion::EndCaps => {
                let z = if rand01(rng) < 0.5 {
                    -s.half_length()
                } else {
                    s.half_length()
                };
                (self.annulus_radius(rng), z)
            }
        };
        let phi = s.start_phi() + rand01(rng) * s.span_phi();
        let local = DVec3::new(r * phi.cos(), r * phi.sin(), z);
        self.placement.transform_point(local)
    }

    fn annulus_radius(&self, rng: &mut dyn RngCore) -> f64 {
        let r_in2 = self.shape.inner_radius() * self.shape.inner_radius();
        let r_out2 = self.shape.outer_radius() * self.shape.outer_radius();
        (rand01(rng) * (r_out2 - r_in2) + r_in2).sqrt()
    }
}

impl PointSampling for CylinderPointSampler {
    fn regions(&self) -> &'static [&'static str] {
        if self.shape.inner_radius() > 0.0 {
            HOLLOW_TAGS
        } else {
            SOLID_TAGS
        }
    }

    fn generate_vertex(&self, region: &str, rng: &mut dyn RngCore) -> Result<Vector3<f64>> {
        let region = self.resolve(region)?;
        Ok(self.sample(region, rng).into())
    }
}

#[cfg(test)]
mod tests {
    use std::f64::consts::{FRAC_PI_2, PI};

    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;
    use crate::error::Error;

    const BINS: usize = 10;

    fn radial_histogram(sampler: &CylinderPointSampler, n: usize, seed: u64) -> [f64; BINS] {
        let mut rng = StdRng::seed_from_u64(seed);
        let radius = sampler.shape.outer_radius();
        let mut counts = [0.0; BINS];
        for _ in 0..n {
            let p = sampler.sample(CylinderRegion::Volume, &mut rng);
            let r = p.truncate().length();
            let bin = ((r / radius) * BINS as f64).min(BINS as f64 - 1.0) as usize;
            counts[bin] += 1.0;
        }
        counts
    }

    fn chi_square(observed: &[f64; BINS], expected: &[f64; BINS]) -> f64 {
        observed
            .iter()
            .zip(expected)
            .map(|(o, e)| (o - e) * (o - e) / e)
            .sum()
    }

    #[test]
    fn radial_density_grows_linearly() {
        let n = 100_000;
        let sampler = CylinderPointSampler::centered(CylinderShape::solid(5.0, 2.0).unwrap());
        let counts = radial_histogram(&sampler, n, 42);

        // P(bin k) = ((k+1)^2 - k^2) / BINS^2 = (2k + 1) / BINS^2.
        let mut linear = [0.0; BINS];
        for (k, e) in linear.iter_mut().enumerate() {
            *e = n as f64 * (2 * k + 1) as f64 / (BINS * BINS) as f64;
        }
        // 9 degrees of freedom: 99.9% quantile is about 27.9.
        assert!(chi_square(&counts, &linear) < 27.9);
    }

    #[test]
    fn uniform_in_radius_hypothesis_is_rejected() {
        let n = 100_000;
        let sampler = CylinderPointSampler::centered(CylinderShape::solid(5.0, 2.0).unwrap());
        let counts = radial_histogram(&sampler, n, 7);

        let flat = [n as f64 / BINS as f64; BINS];
        assert!(chi_square(&counts, &flat) > 1_000.0);
    }

    #[test]
    fn hollow_volume_respects_inner_radius() {
        let sampler =
            CylinderPointSampler::centered(CylinderShape::tube(2.0, 3.0, 1.0).unwrap());
        let mut rng = StdRng::seed_from_u64(17);
        for _ in 0..2_000 {
            let p = sampler.sample(CylinderRegion::Volume, &mut rng);
            let r = p.truncate().length();
            assert!((2.0 - 1e-12..=3.0 + 1e-12).contains(&r));
            assert!(p.z.abs() <= 1.0);
        }
    }

    #[test]
    fn azimuth_is_confined_to_span() {
        let shape = CylinderShape::new(0.0, 1.0, 1.0, 0.0, FRAC_PI_2).unwrap();
        let sampler = CylinderPointSampler::centered(shape);
        let mut rng = StdRng::seed_from_u64(21);
        for _ in 0..2_000 {
            let p = sampler.sample(CylinderRegion::Volume, &mut rng);
            assert!(p.x >= -1e-12 && p.y >= -1e-12);
        }
    }

    #[test]
    fn surfaces_and_caps_lie_on_boundary() {
        let sampler =
            CylinderPointSampler::centered(CylinderShape::tube(1.0, 2.0, 3.0).unwrap());
        let mut rng = StdRng::seed_from_u64(4);
        for _ in 0..500 {
            let outer = sampler.sample(CylinderRegion::OuterSurface, &mut rng);
            assert!((outer.truncate().length() - 2.0).abs() < 1e-9);
            let inner = sampler.sample(CylinderRegion::InnerSurface, &mut rng);
            assert!((inner.truncate().length() - 1.0).abs() < 1e-9);
            let cap = sampler.sample(CylinderRegion::EndCaps, &mut rng);
            assert!((cap.z.abs() - 3.0).abs() < 1e-12);
        }
    }

    #[test]
    fn inner_surface_requires_a_hollow_cylinder() {
        let solid = CylinderPointSampler::centered(CylinderShape::solid(1.0, 1.0).unwrap());
        let mut rng = StdRng::seed_from_u64(4);
        let err = solid.generate_vertex("INNER_SURFACE", &mut rng).unwrap_err();
        match err {
            Error::UnknownRegion { accepted, .. } => {
                assert!(!accepted.iter().any(|r| r == "INNER_SURFACE"));
            }
            other => panic!("unexpected error {other:?}"),
        }
        assert!(!solid.regions().contains(&"INNER_SURFACE"));
    }

    #[test]
    fn placement_rotates_axis() {
        let shape = CylinderShape::solid(0.1, 10.0).unwrap();
        let sampler =
            CylinderPointSampler::new(shape, Transform::from_rotation_y(PI / 2.0, DVec3::ZERO));
        let mut rng = StdRng::seed_from_u64(8);
        for _ in 0..200 {
            let p = sampler.sample(CylinderRegion::Volume, &mut rng);
            // The axis now runs along X, so |z| is bounded by the radius.
            assert!(p.z.abs() <= 0.1 + 1e-12);
        }
    }
}
