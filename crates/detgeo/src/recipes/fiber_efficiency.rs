//! Single wavelength-shifting fibre with an end mirror, a teflon reflector
//! panel and a photosensor at the far end.
use std::sync::Arc;

use glam::DVec3;
use mint::Vector3;
use rand::RngCore;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{Error, Result};
use crate::geometry::{Geometry, Lifecycle, ParamScope, ParamValue, ParameterSet};
use crate::recipes::log_constructed;
use crate::sampling::{resolve_region, CylinderPointSampler, CylinderRegion};
use crate::shape::{BoxShape, CylinderShape};
use crate::units::{CM, MM, UM};
use crate::volume::{SensitiveDetector, VolumeNode, VolumeTree};

pub const PREFIX: &str = "geometry.fiber_efficiency";

const WORLD_HALF: f64 = 25.0 * CM;
const COATING_THICKNESS: f64 = 1.0 * UM;
const END_HALF_LENGTH: f64 = 0.1 * MM;
const SENSOR_THICKNESS: f64 = 5.0 * CM;
const SENSOR_GAP: f64 = 0.5 * MM;
/// Fraction of the half length where the teflon panel and the outside
/// source sit.
const PANEL_Z_FRACTION: f64 = 0.8;
const PANEL_HALF: DVec3 = DVec3::new(3.6 * MM, 0.25 * MM, 3.6 * MM);
const OUTSIDE_SOURCE_Y: f64 = 150.0 * MM;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Region {
    InsideFiber,
    OutsideFiber,
}

const REGIONS: &[(&str, Region)] = &[
    ("INSIDE_FIBER", Region::InsideFiber),
    ("OUTSIDE_FIBER", Region::OutsideFiber),
];

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, PartialEq)]
pub struct FiberEfficiencyConfig {
    pub fiber_radius: f64,
    pub length: f64,
    /// Wavelength-shifting coating, `TPB` or `TPH`.
    pub coating: String,
    /// Fibre core, `Y11` or `B2`.
    pub fiber_type: String,
    pub coated: bool,
}

impl Default for FiberEfficiencyConfig {
    fn default() -> Self {
        Self {
            fiber_radius: 0.5 * MM,
            length: 25.0 * CM,
            coating: "TPB".to_owned(),
            fiber_type: "Y11".to_owned(),
            coated: true,
        }
    }
}

impl FiberEfficiencyConfig {
    pub fn from_params(params: &ParameterSet) -> Result<Self> {
        let d = Self::default();
        let mut scope = params.scope(PREFIX);
        let config = Self {
            fiber_radius: scope.positive_length("fiber_radius", d.fiber_radius)?,
            length: scope.positive_length("length", d.length)?,
            coating: scope.choice("coating", "TPB", &["TPB", "TPH"])?.to_owned(),
            fiber_type: scope.choice("fiber_type", "Y11", &["Y11", "B2"])?.to_owned(),
            coated: scope.flag("coated", d.coated)?,
        };
        config.validate(&scope)?;
        scope.finish()?;
        Ok(config)
    }

    fn validate(&self, scope: &ParamScope<'_>) -> Result<()> {
        if self.coated && self.fiber_radius <= COATING_THICKNESS {
            return Err(Error::invalid_config(
                scope.path("fiber_radius"),
                ParamValue::length(self.fiber_radius),
                format!(
                    "> {} (the coating thickness) when coated",
                    ParamValue::length(COATING_THICKNESS)
                ),
            ));
        }
        // The panel hangs below the fibre and must stay clear of the sensor
        // behind its far end.
        let half_length = 0.5 * self.length;
        if self.panel_z() - PANEL_HALF.z <= -(half_length + SENSOR_GAP) {
            let min_length = 2.0 * (PANEL_HALF.z - SENSOR_GAP) / (1.0 + PANEL_Z_FRACTION);
            return Err(Error::invalid_config(
                scope.path("length"),
                ParamValue::length(self.length),
                format!(
                    "> {} so the teflon panel clears the sensor",
                    ParamValue::length(min_length)
                ),
            ));
        }
        Ok(())
    }

    fn panel_z(&self) -> f64 {
        0.5 * PANEL_Z_FRACTION * self.length
    }

    fn outside_source(&self) -> DVec3 {
        DVec3::new(0.0, OUTSIDE_SOURCE_Y, self.panel_z())
    }
}

#[derive(Debug, Default)]
pub struct FiberEfficiency {
    lifecycle: Lifecycle,
    config: FiberEfficiencyConfig,
    core: Option<CylinderPointSampler>,
}

impl FiberEfficiency {
    pub fn config(&self) -> &FiberEfficiencyConfig {
        &self.config
    }

    fn core_shape(c: &FiberEfficiencyConfig) -> Result<CylinderShape> {
        CylinderShape::solid(c.fiber_radius, 0.5 * c.length)
    }

    fn build_tree(c: &FiberEfficiencyConfig) -> Result<VolumeTree> {
        let half_length = 0.5 * c.length;
        let sensor_z = -(half_length + 0.5 * SENSOR_THICKNESS + SENSOR_GAP);

        let world_half_xy = WORLD_HALF.max(c.fiber_radius + 2.0 * PANEL_HALF.y + 1.0 * CM);
        let world_half_z = WORLD_HALF.max(half_length + SENSOR_THICKNESS + SENSOR_GAP + 1.0 * CM);
        let world = BoxShape::new(world_half_xy, world_half_xy, world_half_z)?;

        let mut fiber = VolumeNode::new("FIBER", Self::core_shape(c)?, c.fiber_type.as_str());
        if c.coated {
            let inner = c.fiber_radius - COATING_THICKNESS;
            fiber.push_child(VolumeNode::new(
                "FIBER_COATING",
                CylinderShape::tube(inner, c.fiber_radius, half_length)?,
                c.coating.as_str(),
            ));
        }

        let end = VolumeNode::new(
            "FIBER_END",
            CylinderShape::solid(0.5 * c.fiber_radius, END_HALF_LENGTH)?,
            "G4_Al",
        )
        .at(DVec3::new(0.0, 0.0, half_length + END_HALF_LENGTH));

        // Lies against the underside of the fibre.
        let panel = BoxShape::new(PANEL_HALF.x, PANEL_HALF.y, PANEL_HALF.z)?;
        let teflon = VolumeNode::new("TEFLON", panel, "G4_TEFLON").at(DVec3::new(
            0.0,
            -(c.fiber_radius + PANEL_HALF.y),
            c.panel_z(),
        ));

        let sensor = VolumeNode::new(
            "FIBER_SENSOR",
            BoxShape::new(0.5 * MM, 0.5 * MM, 0.5 * SENSOR_THICKNESS)?,
            "G4_SILICON_DIOXIDE",
        )
        .at(DVec3::new(0.0, 0.0, sensor_z));

        let root = VolumeNode::new("WORLD", world, "G4_AIR")
            .with_child(fiber)
            .with_child(end)
            .with_child(teflon)
            .with_child(sensor);

        Ok(VolumeTree::new(root).with_sensitive_detectors([SensitiveDetector {
            name: "/FIBER_SENSOR".to_owned(),
            volume: "FIBER_SENSOR".to_owned(),
            depth: 1,
            time_binning: None,
        }]))
    }
}

impl Geometry for FiberEfficiency {
    fn name(&self) -> &'static str {
        "FiberEfficiency"
    }

    fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }

    fn regions(&self) -> Vec<&'static str> {
        REGIONS.iter().map(|(tag, _)| *tag).collect()
    }

    fn configure(&mut self, params: &ParameterSet) -> Result<()> {
        let (config, core) = self.lifecycle.configure_with(|| {
            let config = FiberEfficiencyConfig::from_params(params)?;
            let core = CylinderPointSampler::centered(Self::core_shape(&config)?);
            Ok((config, core))
        })?;
        self.config = config;
        self.core = Some(core);
        Ok(())
    }

    fn construct(&mut self) -> Result<Arc<VolumeTree>> {
        let config = &self.config;
        let tree = self.lifecycle.construct_with(|| Self::build_tree(config))?;
        if config.coated {
            info!(
                "FiberEfficiency: {} fibre with {} coating.",
                config.fiber_type, config.coating
            );
        } else {
            info!("FiberEfficiency: bare {} fibre.", config.fiber_type);
        }
        log_constructed(self.name(), &tree);
        Ok(Arc::new(tree))
    }

    fn generate_vertex(&self, region: &str, rng: &mut dyn RngCore) -> Result<Vector3<f64>> {
        let region = resolve_region(self.name(), region, REGIONS)?;
        let core = self.lifecycle.ready(&self.core, "generate_vertex")?;
        let point = match region {
            Region::InsideFiber => core.sample(CylinderRegion::Volume, rng),
            Region::OutsideFiber => self.config.outside_source(),
        };
        Ok(point.into())
    }
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;
    use crate::error::Error;
    use crate::geometry::ParamValue;
    use crate::recipes::tests::{
        assert_rejects_foo, assert_siblings_disjoint, assert_vertices_inside, build,
    };

    #[test]
    fn inside_fiber_stays_in_the_core() {
        let (geometry, tree) = build(Box::new(FiberEfficiency::default()), &ParameterSet::new());
        assert_vertices_inside(geometry.as_ref(), &tree, "INSIDE_FIBER", "FIBER", 2_000);
    }

    #[test]
    fn outside_fiber_is_a_fixed_point() {
        let params = ParameterSet::new()
            .with("geometry.fiber_efficiency.length", ParamValue::length(100.0 * MM));
        let (geometry, _) = build(Box::new(FiberEfficiency::default()), &params);
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..3 {
            let p: DVec3 = geometry.generate_vertex("OUTSIDE_FIBER", &mut rng).unwrap().into();
            assert_eq!(p, DVec3::new(0.0, 150.0, 40.0));
        }
    }

    #[test]
    fn coating_is_optional() {
        let (_, coated) = build(Box::new(FiberEfficiency::default()), &ParameterSet::new());
        let coating = coated.find("FIBER_COATING").unwrap();
        assert_eq!(coating.material, "TPB");

        let params =
            ParameterSet::new().with("geometry.fiber_efficiency.coated", ParamValue::Flag(false));
        let (_, bare) = build(Box::new(FiberEfficiency::default()), &params);
        assert!(bare.find("FIBER_COATING").is_none());
        assert_eq!(bare.node_count(), coated.node_count() - 1);
    }

    #[test]
    fn sensor_sits_behind_the_fibre() {
        let (_, tree) = build(Box::new(FiberEfficiency::default()), &ParameterSet::new());
        let sensor = tree.placements_of("FIBER_SENSOR");
        assert_eq!(sensor.len(), 1);
        assert!((sensor[0].translation.z + 150.5).abs() < 1e-9);
        assert_eq!(tree.sensitive_detectors[0].name, "/FIBER_SENSOR");
        assert!(tree.point_in("WORLD", DVec3::new(0.0, 0.0, -175.0)));
    }

    #[test]
    fn rejects_unknown_coating() {
        let mut geometry = FiberEfficiency::default();
        let params =
            ParameterSet::new().with("geometry.fiber_efficiency.coating", ParamValue::text("PTH"));
        assert!(matches!(
            geometry.configure(&params),
            Err(Error::InvalidConfig { .. })
        ));
    }

    fn rejected_field(params: &ParameterSet) -> Option<String> {
        let mut geometry = FiberEfficiency::default();
        let field = match geometry.configure(params) {
            Err(Error::InvalidConfig { field, .. }) => Some(field),
            _ => None,
        };
        assert_eq!(geometry.lifecycle(), Lifecycle::Unconfigured);
        field
    }

    #[test]
    fn teflon_panel_lies_against_the_fibre() {
        let (_, tree) = build(Box::new(FiberEfficiency::default()), &ParameterSet::new());
        let below_axis = DVec3::new(0.0, -0.4, 0.8 * 125.0);
        assert!(tree.point_in("FIBER", below_axis));
        assert!(!tree.point_in("TEFLON", below_axis));
        assert_siblings_disjoint(&tree);

        for radius in [0.5 * MM, 2.0 * MM] {
            let params = ParameterSet::new()
                .with("geometry.fiber_efficiency.fiber_radius", ParamValue::length(radius));
            let (_, tree) = build(Box::new(FiberEfficiency::default()), &params);
            let panel = tree.placements_of("TEFLON");
            let top = panel[0].translation.y + PANEL_HALF.y;
            assert!((top + radius).abs() < 1e-12, "panel top {top} for radius {radius}");
            assert_siblings_disjoint(&tree);
        }
    }

    #[test]
    fn coated_fibre_must_be_thicker_than_its_coating() {
        let thin = ParameterSet::new()
            .with("geometry.fiber_efficiency.fiber_radius", ParamValue::length(0.5 * UM));
        assert_eq!(
            rejected_field(&thin).as_deref(),
            Some("geometry.fiber_efficiency.fiber_radius")
        );

        let bare = thin.with("geometry.fiber_efficiency.coated", ParamValue::Flag(false));
        let (_, tree) = build(Box::new(FiberEfficiency::default()), &bare);
        assert!(tree.find("FIBER_COATING").is_none());
    }

    #[test]
    fn short_fibre_keeps_panel_clear_of_the_sensor() {
        let short = ParameterSet::new()
            .with("geometry.fiber_efficiency.length", ParamValue::length(3.0 * MM));
        assert_eq!(
            rejected_field(&short).as_deref(),
            Some("geometry.fiber_efficiency.length")
        );

        let params = ParameterSet::new()
            .with("geometry.fiber_efficiency.length", ParamValue::length(4.0 * MM))
            .with("geometry.fiber_efficiency.fiber_radius", ParamValue::length(0.1 * MM));
        let (_, tree) = build(Box::new(FiberEfficiency::default()), &params);
        assert_siblings_disjoint(&tree);
    }

    #[test]
    fn rejects_foo() {
        let (geometry, _) = build(Box::new(FiberEfficiency::default()), &ParameterSet::new());
        assert_rejects_foo(geometry.as_ref());
    }
}
