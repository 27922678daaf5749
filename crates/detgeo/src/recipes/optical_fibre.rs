//! Bundle of optical fibres read out by a single R7378A photomultiplier.
use std::f64::consts::FRAC_PI_2;
use std::f64::consts::PI;
use std::sync::Arc;

use glam::DVec3;
use mint::Vector3;
use rand::RngCore;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::geometry::{Geometry, Lifecycle, ParameterSet};
use crate::layout::{Arrangement, RepeatedElementPlacer};
use crate::recipes::{log_constructed, pmt_r7378a};
use crate::sampling::{
    resolve_region, BoxPointSampler, BoxRegion, CylinderPointSampler, CylinderRegion,
};
use crate::shape::{BoxShape, CylinderShape, Solid};
use crate::transform::Transform;
use crate::units::{CM, MM};
use crate::volume::{VolumeNode, VolumeTree};

pub const PREFIX: &str = "geometry.optical_fibre";

/// Extra room along a single row of fibres.
const LINE_MARGIN: f64 = 10.0 * MM;
const LAB_MARGIN: f64 = 1.0 * CM;
const LAMP_THICKNESS: f64 = 0.1 * MM;

const CORE_MATERIALS: &[&str] = &["EJ280", "EJ286", "Y11", "BCF92"];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Region {
    Fiber,
    Lamp,
}

const REGIONS: &[(&str, Region)] = &[("FIBER", Region::Fiber), ("LAMP", Region::Lamp)];

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FiberShape {
    Round,
    Square,
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, PartialEq)]
pub struct OpticalFibreConfig {
    /// Fibre radius; half the side for square fibres.
    pub radius: f64,
    pub length: f64,
    /// Gap between neighbouring fibres.
    pub fiber_dist: f64,
    pub shape: FiberShape,
    pub core_material: String,
    pub num_fibers: u32,
    /// Diameter of the lamp disk.
    pub lamp_size: f64,
    /// Gap between the fibre ends and the photomultiplier window.
    pub gap_size: f64,
}

impl Default for OpticalFibreConfig {
    fn default() -> Self {
        Self {
            radius: 1.0 * MM,
            length: 1.0 * CM,
            fiber_dist: 0.0,
            shape: FiberShape::Round,
            core_material: "EJ280".to_owned(),
            num_fibers: 1,
            lamp_size: 1.0 * CM,
            gap_size: 0.1 * MM,
        }
    }
}

impl OpticalFibreConfig {
    pub fn from_params(params: &ParameterSet) -> Result<Self> {
        let d = Self::default();
        let mut scope = params.scope(PREFIX);
        let config = Self {
            radius: scope.positive_length("radius", d.radius)?,
            length: scope.positive_length("length", d.length)?,
            fiber_dist: scope.non_negative_length("fiber_dist", d.fiber_dist)?,
            shape: match scope.choice("shape", "round", &["round", "square"])? {
                "square" => FiberShape::Square,
                _ => FiberShape::Round,
            },
            core_material: scope
                .choice("core_mat", "EJ280", CORE_MATERIALS)?
                .to_owned(),
            num_fibers: scope.count("num_fibers", d.num_fibers, 1)?,
            lamp_size: scope.positive_length("lamp_size", d.lamp_size)?,
            gap_size: scope.positive_length("gap_size", d.gap_size)?,
        };
        scope.finish()?;
        Ok(config)
    }

    /// Material tag of the fibre core.
    pub fn core_material_tag(&self) -> String {
        match self.core_material.as_str() {
            "Y11" => "Y11".to_owned(),
            other => format!("PVT/{other}"),
        }
    }
}

#[derive(Clone, Copy, Debug)]
enum FiberBody {
    Round(CylinderShape),
    Square(BoxShape),
}

impl FiberBody {
    fn solid(self) -> Solid {
        match self {
            FiberBody::Round(shape) => shape.into(),
            FiberBody::Square(shape) => shape.into(),
        }
    }
}

/// Everything derived from the configuration that vertex generation needs.
#[derive(Clone, Copy, Debug)]
struct Bundle {
    placer: RepeatedElementPlacer,
    fiber: FiberBody,
    lamp: CylinderPointSampler,
}

impl Bundle {
    fn new(c: &OpticalFibreConfig) -> Result<Self> {
        let placer = RepeatedElementPlacer::new(c.num_fibers, c.radius, c.fiber_dist)?
            .with_line_margin(LINE_MARGIN);
        let fiber = match c.shape {
            FiberShape::Round => FiberBody::Round(CylinderShape::solid(c.radius, 0.5 * c.length)?),
            FiberShape::Square => {
                FiberBody::Square(BoxShape::new(c.radius, c.radius, 0.5 * c.length)?)
            }
        };

        // Thin disk beside the bundle, facing it along X.
        let footprint = placer.footprint();
        let lamp_shape = CylinderShape::solid(0.5 * c.lamp_size, 0.5 * LAMP_THICKNESS)?;
        let lamp_center = DVec3::new(
            -0.5 * footprint.x - LAMP_THICKNESS,
            bundle_center(&placer).y,
            0.0,
        );
        let lamp = CylinderPointSampler::new(
            lamp_shape,
            Transform::from_rotation_y(FRAC_PI_2, lamp_center),
        );
        Ok(Self {
            placer,
            fiber,
            lamp,
        })
    }

    fn sample_fiber(&self, rng: &mut dyn RngCore) -> Result<DVec3> {
        let placement = self.placer.sample_placement(rng)?;
        let point = match self.fiber {
            FiberBody::Square(shape) => {
                BoxPointSampler::new(shape, placement).sample(BoxRegion::WholeVolume, rng)
            }
            FiberBody::Round(shape) => {
                CylinderPointSampler::new(shape, placement).sample(CylinderRegion::Volume, rng)
            }
        };
        Ok(point)
    }
}

/// Center of the fibre arrangement in the lab frame.
fn bundle_center(placer: &RepeatedElementPlacer) -> DVec3 {
    match placer.arrangement() {
        Arrangement::Square { .. } => placer.offset(),
        Arrangement::Linear => placer.offset() + DVec3::new(0.0, 0.5 * placer.line_margin(), 0.0),
    }
}

#[derive(Debug, Default)]
pub struct OpticalFibre {
    lifecycle: Lifecycle,
    config: OpticalFibreConfig,
    bundle: Option<Bundle>,
}

impl OpticalFibre {
    pub fn config(&self) -> &OpticalFibreConfig {
        &self.config
    }

    fn build_tree(c: &OpticalFibreConfig, bundle: &Bundle) -> Result<VolumeTree> {
        let pmt = pmt_r7378a::build()?;
        let footprint = bundle.placer.footprint();
        let center = bundle_center(&bundle.placer);

        let half_x = 0.5 * footprint.x.max(pmt_r7378a::BODY_DIAMETER) + LAB_MARGIN;
        let half_y = center.y.abs() + 0.5 * footprint.y.max(pmt_r7378a::BODY_DIAMETER) + LAB_MARGIN;
        let half_z = 0.5 * c.length + c.gap_size + pmt_r7378a::BODY_LENGTH + LAB_MARGIN;
        let half_lamp = 0.5 * c.lamp_size + LAB_MARGIN;
        let lab = BoxShape::new(
            half_x + LAMP_THICKNESS,
            half_y.max(half_lamp),
            half_z.max(half_lamp),
        )?;

        let placements = bundle.placer.placements();
        let fiber_count = placements.len() as u32;
        let fibers = placements.into_iter().enumerate().map(|(copy, (_, t))| {
            VolumeNode::new("FIBER", bundle.fiber.solid(), c.core_material_tag())
                .placed(t)
                .copy(copy as u32)
        });

        // Flipped so the window faces the fibre ends.
        let pmt_position = DVec3::new(
            center.x,
            center.y,
            0.5 * c.length + 0.5 * c.gap_size + 0.5 * pmt_r7378a::BODY_LENGTH,
        );
        let pmt_node = pmt
            .body
            .placed(Transform::from_rotation_y(PI, pmt_position))
            .copy(fiber_count + 1);

        let root = VolumeNode::new("LAB", lab, "G4_AIR")
            .with_children(fibers)
            .with_child(pmt_node);
        Ok(VolumeTree::new(root).with_sensitive_detectors([pmt.sensitive_detector]))
    }
}

impl Geometry for OpticalFibre {
    fn name(&self) -> &'static str {
        "OpticalFibre"
    }

    fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }

    fn regions(&self) -> Vec<&'static str> {
        REGIONS.iter().map(|(tag, _)| *tag).collect()
    }

    fn configure(&mut self, params: &ParameterSet) -> Result<()> {
        self.config = self.lifecycle.configure_with(|| {
            let config = OpticalFibreConfig::from_params(params)?;
            Bundle::new(&config)?;
            Ok(config)
        })?;
        Ok(())
    }

    fn construct(&mut self) -> Result<Arc<VolumeTree>> {
        let config = &self.config;
        let (tree, bundle) = self.lifecycle.construct_with(|| {
            let bundle = Bundle::new(config)?;
            Ok((Self::build_tree(config, &bundle)?, bundle))
        })?;
        self.bundle = Some(bundle);
        log_constructed(self.name(), &tree);
        Ok(Arc::new(tree))
    }

    fn generate_vertex(&self, region: &str, rng: &mut dyn RngCore) -> Result<Vector3<f64>> {
        let region = resolve_region(self.name(), region, REGIONS)?;
        let bundle = self.lifecycle.ready(&self.bundle, "generate_vertex")?;
        let point = match region {
            Region::Fiber => bundle.sample_fiber(rng)?,
            Region::Lamp => bundle.lamp.sample(CylinderRegion::Volume, rng),
        };
        Ok(point.into())
    }
}
