//! Box of liquid or gaseous xenon with a single photosensor plate.
use std::sync::Arc;

use glam::DVec3;
use mint::Vector3;
use rand::RngCore;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{Error, Result};
use crate::geometry::{Geometry, Lifecycle, ParamValue, ParameterSet};
use crate::recipes::log_constructed;
use crate::sampling::{resolve_region, BoxPointSampler, BoxRegion};
use crate::shape::BoxShape;
use crate::units::{ATM, CM, M, MM};
use crate::volume::{SensitiveDetector, VolumeNode, VolumeTree};

pub const PREFIX: &str = "geometry.xe_box";

const SENSOR_THICKNESS: f64 = 2.0 * MM;
const LAB_MARGIN: f64 = 1.0 * CM;

const REGIONS: &[(&str, BoxRegion)] = &[
    ("WHOLE_VOL", BoxRegion::WholeVolume),
    ("SURFACE", BoxRegion::Surface),
];

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, PartialEq)]
pub struct XeBoxConfig {
    /// Liquid xenon when set, gas at `pressure` otherwise.
    pub liquid: bool,
    pub pressure: f64,
    /// Full edge lengths along X, Y and Z.
    pub length: f64,
    pub width: f64,
    pub height: f64,
}

impl Default for XeBoxConfig {
    fn default() -> Self {
        Self {
            liquid: true,
            pressure: 1.0 * ATM,
            length: 1.0 * M,
            width: 1.0 * M,
            height: 1.0 * M,
        }
    }
}

impl XeBoxConfig {
    pub fn from_params(params: &ParameterSet) -> Result<Self> {
        let d = Self::default();
        let mut scope = params.scope(PREFIX);
        let pressure_given = scope.is_set("pressure");
        let config = Self {
            liquid: scope.flag("liquid", d.liquid)?,
            pressure: scope.pressure("pressure", d.pressure)?,
            length: scope.positive_length("length", d.length)?,
            width: scope.positive_length("width", d.width)?,
            height: scope.positive_length("height", d.height)?,
        };
        config.validate(&scope.path("pressure"))?;
        scope.finish()?;

        if config.liquid && pressure_given {
            warn!(
                "XeBox: pressure {} bar is ignored for liquid xenon.",
                config.pressure
            );
        }
        Ok(config)
    }

    fn validate(&self, pressure_path: &str) -> Result<()> {
        if !(self.pressure.is_finite() && self.pressure > 0.0) {
            return Err(Error::invalid_config(
                pressure_path,
                ParamValue::pressure(self.pressure),
                "pressure > 0",
            ));
        }
        Ok(())
    }

    pub fn material(&self) -> String {
        if self.liquid {
            "G4_lXe".to_owned()
        } else {
            format!("GXe@{}bar", self.pressure)
        }
    }
}

#[derive(Debug, Default)]
pub struct XeBox {
    lifecycle: Lifecycle,
    config: XeBoxConfig,
    sampler: Option<BoxPointSampler>,
}

impl XeBox {
    pub fn config(&self) -> &XeBoxConfig {
        &self.config
    }

    fn build_tree(c: &XeBoxConfig) -> Result<VolumeTree> {
        let xenon = BoxShape::from_full_lengths(c.length, c.width, c.height)?;
        let lab = BoxShape::from_full_lengths(
            c.length + LAB_MARGIN,
            c.width + LAB_MARGIN,
            c.height + LAB_MARGIN,
        )?;
        let sensor = BoxShape::from_full_lengths(c.length, c.width, SENSOR_THICKNESS)?;

        let root = VolumeNode::new("LAB", lab, "G4_AIR")
            .with_child(VolumeNode::new("XE_BOX", xenon, c.material()))
            .with_child(
                VolumeNode::new("SENSOR", sensor, "TPB")
                    .at(DVec3::new(0.0, 0.0, 0.5 * (c.height + SENSOR_THICKNESS))),
            );

        Ok(VolumeTree::new(root).with_sensitive_detectors([
            SensitiveDetector {
                name: "/XE_BOX".to_owned(),
                volume: "XE_BOX".to_owned(),
                depth: 0,
                time_binning: None,
            },
            SensitiveDetector {
                name: "/SENSOR".to_owned(),
                volume: "SENSOR".to_owned(),
                depth: 1,
                time_binning: None,
            },
        ]))
    }
}

impl Geometry for XeBox {
    fn name(&self) -> &'static str {
        "XeBox"
    }

    fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }

    fn regions(&self) -> Vec<&'static str> {
        REGIONS.iter().map(|(tag, _)| *tag).collect()
    }

    fn configure(&mut self, params: &ParameterSet) -> Result<()> {
        let (config, sampler) = self.lifecycle.configure_with(|| {
            let config = XeBoxConfig::from_params(params)?;
            let shape = BoxShape::from_full_lengths(config.length, config.width, config.height)?;
            Ok((config, BoxPointSampler::centered(shape)))
        })?;
        self.config = config;
        self.sampler = Some(sampler);
        Ok(())
    }

    fn construct(&mut self) -> Result<Arc<VolumeTree>> {
        let config = &self.config;
        let tree = self.lifecycle.construct_with(|| Self::build_tree(config))?;
        log_constructed(self.name(), &tree);
        Ok(Arc::new(tree))
    }

    fn generate_vertex(&self, region: &str, rng: &mut dyn RngCore) -> Result<Vector3<f64>> {
        let region = resolve_region(self.name(), region, REGIONS)?;
        let sampler = self.lifecycle.ready(&self.sampler, "generate_vertex")?;
        Ok(sampler.sample(region, rng).into())
    }
}
