//! Absorption-length bench: three fibres side by side, a lamp behind a
//! filter and a photomultiplier looking at the lamp.
use std::f64::consts::FRAC_PI_2;
use std::sync::Arc;

use glam::DVec3;
use mint::Vector3;
use rand::RngCore;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::geometry::{Geometry, Lifecycle, ParameterSet};
use crate::layout::RepeatedElementPlacer;
use crate::recipes::{log_constructed, pmt_r7378a};
use crate::sampling::{resolve_region, BoxPointSampler, BoxRegion};
use crate::shape::{BoxShape, CylinderShape};
use crate::transform::Transform;
use crate::units::{CM, MM};
use crate::volume::{VolumeNode, VolumeTree};

pub const PREFIX: &str = "geometry.fiber_absorption";

const FIBER_COUNT: u32 = 3;
const FIBER_RADIUS: f64 = 1.0 * MM;
const FIBER_LENGTH: f64 = 11.0 * CM;
const FIBER_X: f64 = 23.0 * MM;
const FILTER_X: f64 = 21.9 * MM;
const LAMP_X: f64 = 24.5 * MM;

const REGIONS: &[(&str, ())] = &[("LAMP", ())];

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, PartialEq)]
pub struct FiberAbsorptionConfig {
    /// Shortest absorption length of the wavelength shifter.
    pub lambdawls: f64,
}

impl Default for FiberAbsorptionConfig {
    fn default() -> Self {
        Self {
            lambdawls: 1.3 * MM,
        }
    }
}

impl FiberAbsorptionConfig {
    pub fn from_params(params: &ParameterSet) -> Result<Self> {
        let mut scope = params.scope(PREFIX);
        let config = Self {
            lambdawls: scope.positive_length("lambdawls", Self::default().lambdawls)?,
        };
        scope.finish()?;
        Ok(config)
    }

    pub fn core_material(&self) -> String {
        format!("PVT/BCF92@{}mm", self.lambdawls / MM)
    }
}

fn lamp_sampler() -> Result<BoxPointSampler> {
    let shape = BoxShape::new(0.05 * MM, 3.0 * MM, 3.0 * MM)?;
    Ok(BoxPointSampler::new(
        shape,
        Transform::from_translation(DVec3::new(LAMP_X, 0.0, 0.0)),
    ))
}

#[derive(Debug, Default)]
pub struct FiberAbsorption {
    lifecycle: Lifecycle,
    config: FiberAbsorptionConfig,
    lamp: Option<BoxPointSampler>,
}

impl FiberAbsorption {
    pub fn config(&self) -> &FiberAbsorptionConfig {
        &self.config
    }

    fn build_tree(c: &FiberAbsorptionConfig) -> Result<VolumeTree> {
        let lab = BoxShape::new(46.0 * MM, 25.4 * MM, 11.0 * CM)?;
        let fiber = CylinderShape::solid(FIBER_RADIUS, 0.5 * FIBER_LENGTH)?;
        let placer = RepeatedElementPlacer::new(FIBER_COUNT, FIBER_RADIUS, 0.0)?
            .with_offset(DVec3::new(FIBER_X, 0.0, 0.0));
        let fibers = placer
            .placements()
            .into_iter()
            .enumerate()
            .map(|(copy, (_, t))| {
                VolumeNode::new("FIBER", fiber, c.core_material())
                    .placed(t)
                    .copy(copy as u32)
            });

        let pmt = pmt_r7378a::build()?;
        let pmt_node = pmt
            .body
            .placed(Transform::from_rotation_y(FRAC_PI_2, DVec3::ZERO))
            .copy(FIBER_COUNT);

        let filter = VolumeNode::new(
            "FILT",
            BoxShape::new(0.1 * MM, 12.25 * MM, 12.25 * MM)?,
            "G4_SILICON_DIOXIDE",
        )
        .at(DVec3::new(FILTER_X, 0.0, 0.0))
        .copy(FIBER_COUNT + 1);

        let root = VolumeNode::new("LAB", lab, "G4_AIR")
            .with_children(fibers)
            .with_child(pmt_node)
            .with_child(filter);
        Ok(VolumeTree::new(root).with_sensitive_detectors([pmt.sensitive_detector]))
    }
}

impl Geometry for FiberAbsorption {
    fn name(&self) -> &'static str {
        "FiberAbsorption"
    }

    fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }

    fn regions(&self) -> Vec<&'static str> {
        REGIONS.iter().map(|(tag, _)| *tag).collect()
    }

    fn configure(&mut self, params: &ParameterSet) -> Result<()> {
        let (config, lamp) = self.lifecycle.configure_with(|| {
            Ok((FiberAbsorptionConfig::from_params(params)?, lamp_sampler()?))
        })?;
        self.config = config;
        self.lamp = Some(lamp);
        Ok(())
    }

    fn construct(&mut self) -> Result<Arc<VolumeTree>> {
        let config = &self.config;
        let tree = self.lifecycle.construct_with(|| Self::build_tree(config))?;
        log_constructed(self.name(), &tree);
        Ok(Arc::new(tree))
    }

    fn generate_vertex(&self, region: &str, rng: &mut dyn RngCore) -> Result<Vector3<f64>> {
        resolve_region(self.name(), region, REGIONS)?;
        let lamp = self.lifecycle.ready(&self.lamp, "generate_vertex")?;
        Ok(lamp.sample(BoxRegion::WholeVolume, rng).into())
    }
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;
    use crate::error::Error;
    use crate::geometry::ParamValue;
    use crate::recipes::tests::{assert_rejects_foo, build};

    #[test]
    fn three_fibres_in_a_row_beside_the_pmt() {
        let (_, tree) = build(Box::new(FiberAbsorption::default()), &ParameterSet::new());
        let mut ys: Vec<f64> = tree
            .placements_of("FIBER")
            .iter()
            .map(|t| {
                assert!((t.translation.x - 23.0).abs() < 1e-12);
                t.translation.y
            })
            .collect();
        ys.sort_by(f64::total_cmp);
        assert_eq!(ys, vec![-2.0, 0.0, 2.0]);

        // Window faces +X towards the filter.
        let window = tree.placements_of("PMT_WINDOW")[0];
        assert!((window.translation - DVec3::new(18.5, 0.0, 0.0)).length() < 1e-9);
        assert!(tree.find("FILT").is_some());
    }

    #[test]
    fn absorption_length_tags_the_core() {
        let params = ParameterSet::new()
            .with("geometry.fiber_absorption.lambdawls", ParamValue::length(2.5 * MM));
        let (_, tree) = build(Box::new(FiberAbsorption::default()), &params);
        assert_eq!(tree.find("FIBER").unwrap().material, "PVT/BCF92@2.5mm");
    }

    #[test]
    fn lamp_vertices_fill_the_slab() {
        let (geometry, tree) = build(Box::new(FiberAbsorption::default()), &ParameterSet::new());
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..1_000 {
            let p: DVec3 = geometry.generate_vertex("LAMP", &mut rng).unwrap().into();
            assert!((p.x - 24.5).abs() <= 0.05 + 1e-12);
            assert!(p.y.abs() <= 3.0 && p.z.abs() <= 3.0);
            assert!(tree.point_in("LAB", p));
        }
    }

    #[test]
    fn rejects_non_positive_absorption_length() {
        let mut geometry = FiberAbsorption::default();
        let params = ParameterSet::new()
            .with("geometry.fiber_absorption.lambdawls", ParamValue::length(0.0));
        assert!(matches!(
            geometry.configure(&params),
            Err(Error::InvalidConfig { .. })
        ));
    }

    #[test]
    fn rejects_foo() {
        let (geometry, _) = build(Box::new(FiberAbsorption::default()), &ParameterSet::new());
        assert_rejects_foo(geometry.as_ref());
    }
}
