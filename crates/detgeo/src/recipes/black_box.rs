//! Dark enclosure with a rotatable sensor board facing a sapphire window.
//!
//! The board carries a stack of optional layers below its substrate: a
//! wavelength-shifting coating, a membrane that may be perforated by a
//! hexagonal mesh of holes, and a mask with an optional circular aperture.
use std::sync::Arc;

use glam::{DVec2, DVec3};
use mint::Vector3;
use rand::RngCore;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{Error, Result};
use crate::geometry::{Geometry, Lifecycle, ParamScope, ParamValue, ParameterSet};
use crate::layout::HexMeshTiler;
use crate::recipes::log_constructed;
use crate::sampling::{
    resolve_region, uniform_index, CylinderPointSampler, CylinderRegion, HexPrismPointSampler,
};
use crate::shape::{BoxShape, CylinderShape, HexPrismShape};
use crate::transform::Transform;
use crate::units::{CM, M, MM, UM};
use crate::volume::{SensitiveDetector, VolumeNode, VolumeTree};

pub const PREFIX: &str = "geometry.black_box";

const WORLD_HALF: DVec3 = DVec3::new(1.0 * M, 1.0 * M, 1.5 * M);
const BOX_HALF: DVec3 = DVec3::new(0.5 * M, 0.5 * M, 1.0 * M);

const BOARD_HALF_WIDTH: f64 = 60.0 * MM;
const SUBSTRATE_THICKNESS: f64 = 0.3 * MM;

const SAPPHIRE_RADIUS: f64 = 10.0 * CM;
const SAPPHIRE_THICKNESS: f64 = 6.0 * MM;
const PEDOT_THICKNESS: f64 = 0.5 * SAPPHIRE_THICKNESS;
const WINDOW_Z: f64 = -49.0 * CM;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Region {
    World,
    AdHoc,
    Sapphire,
    MembraneHole,
}

const REGIONS: &[(&str, Region)] = &[
    ("WORLD", Region::World),
    ("AD_HOC", Region::AdHoc),
    ("SAPPHIRE", Region::Sapphire),
];

const PERFORATED_REGIONS: &[(&str, Region)] = &[
    ("WORLD", Region::World),
    ("AD_HOC", Region::AdHoc),
    ("SAPPHIRE", Region::Sapphire),
    ("MEMBRANE_HOLE", Region::MembraneHole),
];

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, PartialEq)]
pub struct BlackBoxConfig {
    /// Vertex returned for the `AD_HOC` region.
    pub specific_vertex: DVec3,
    /// Board center inside the box.
    pub dice_board_position: DVec3,
    /// Board and window rotation about Y.
    pub rotation: f64,
    pub mask_thickness: f64,
    pub membrane_thickness: f64,
    pub coating_thickness: f64,
    /// Mask aperture; no aperture when zero.
    pub hole_diameter: f64,
    pub hole_position: DVec2,
    pub membrane_hole: bool,
    /// Corner-to-corner width of one hexagonal membrane hole.
    pub membrane_hole_diameter: f64,
    /// Diameter of the disk the hole mesh is packed into.
    pub membrane_mesh_diameter: f64,
    pub membrane_hole_position: DVec2,
}

impl Default for BlackBoxConfig {
    fn default() -> Self {
        Self {
            specific_vertex: DVec3::ZERO,
            dice_board_position: DVec3::ZERO,
            rotation: 0.0,
            mask_thickness: 2.0 * MM,
            membrane_thickness: 0.5 * MM,
            coating_thickness: 1.0 * UM,
            hole_diameter: 0.0,
            hole_position: DVec2::ZERO,
            membrane_hole: false,
            membrane_hole_diameter: 1.0 * MM,
            membrane_mesh_diameter: 10.0 * MM,
            membrane_hole_position: DVec2::ZERO,
        }
    }
}

impl BlackBoxConfig {
    pub fn from_params(params: &ParameterSet) -> Result<Self> {
        let d = Self::default();
        let mut scope = params.scope(PREFIX);
        let config = Self {
            specific_vertex: scope.vector_length("specific_vertex", d.specific_vertex)?,
            dice_board_position: DVec3::new(
                scope.length("dice_board_x_pos", d.dice_board_position.x)?,
                scope.length("dice_board_y_pos", d.dice_board_position.y)?,
                scope.length("dice_board_z_pos", d.dice_board_position.z)?,
            ),
            rotation: scope.angle("rotation", d.rotation)?,
            mask_thickness: scope.non_negative_length("mask_thickn", d.mask_thickness)?,
            membrane_thickness: scope
                .non_negative_length("membrane_thickn", d.membrane_thickness)?,
            coating_thickness: scope.non_negative_length("coating_thickn", d.coating_thickness)?,
            hole_diameter: scope.non_negative_length("hole_diameter", d.hole_diameter)?,
            hole_position: DVec2::new(
                scope.length("hole_x", d.hole_position.x)?,
                scope.length("hole_y", d.hole_position.y)?,
            ),
            membrane_hole: scope.flag("membrane_hole", d.membrane_hole)?,
            membrane_hole_diameter: scope
                .positive_length("membrane_hole_diameter", d.membrane_hole_diameter)?,
            membrane_mesh_diameter: scope
                .positive_length("membrane_mesh_diameter", d.membrane_mesh_diameter)?,
            membrane_hole_position: DVec2::new(
                scope.length("membrane_hole_x", d.membrane_hole_position.x)?,
                scope.length("membrane_hole_y", d.membrane_hole_position.y)?,
            ),
        };
        config.validate(&scope)?;
        scope.finish()?;
        Ok(config)
    }

    fn validate(&self, scope: &ParamScope<'_>) -> Result<()> {
        if self.hole_diameter > 0.0 {
            if self.mask_thickness == 0.0 {
                return Err(Error::invalid_config(
                    scope.path("hole_diameter"),
                    ParamValue::length(self.hole_diameter),
                    "0 when the mask is absent (mask_thickn = 0)",
                ));
            }
            check_on_board(
                scope.path("hole_diameter"),
                self.hole_position,
                0.5 * self.hole_diameter,
            )?;
        }
        if self.membrane_hole {
            if self.membrane_thickness == 0.0 {
                return Err(Error::invalid_config(
                    scope.path("membrane_hole"),
                    ParamValue::Flag(true),
                    "false when the membrane is absent (membrane_thickn = 0)",
                ));
            }
            if self.membrane_hole_diameter >= self.membrane_mesh_diameter {
                return Err(Error::invalid_config(
                    scope.path("membrane_hole_diameter"),
                    ParamValue::length(self.membrane_hole_diameter),
                    format!(
                        "< membrane_mesh_diameter ({})",
                        ParamValue::length(self.membrane_mesh_diameter)
                    ),
                ));
            }
            check_on_board(
                scope.path("membrane_mesh_diameter"),
                self.membrane_hole_position,
                0.5 * self.membrane_mesh_diameter,
            )?;
        }
        self.check_placement(scope)
    }

    /// The board and the window must both fit in the enclosure without
    /// touching each other.
    fn check_placement(&self, scope: &ParamScope<'_>) -> Result<()> {
        let board_half = DVec3::new(
            BOARD_HALF_WIDTH,
            BOARD_HALF_WIDTH,
            0.5 * self.board_thickness(),
        );
        let window_half = DVec3::new(SAPPHIRE_RADIUS, SAPPHIRE_RADIUS, window_half_length());
        let window_center = self.window_placement().translation;
        for (what, center, half) in [
            ("board", self.dice_board_position, board_half),
            ("sapphire window", window_center, window_half),
        ] {
            let reach = center.abs() + rotated_half_extents(half, self.rotation);
            for (axis, key) in POSITION_KEYS.iter().enumerate() {
                if reach[axis] > BOX_HALF[axis] {
                    return Err(Error::invalid_config(
                        scope.path(key),
                        ParamValue::length(self.dice_board_position[axis]),
                        format!(
                            "the {what} inside the black box (reaches {} mm, limit {} mm)",
                            reach[axis] / MM,
                            BOX_HALF[axis] / MM
                        ),
                    ));
                }
            }
        }

        // Both share the rotation, so in the window frame the board is an
        // axis-aligned box next to an upright disk.
        let d = self
            .window_placement()
            .inverse_transform_point(self.dice_board_position);
        let apart_axially = d.z.abs() >= board_half.z + window_half.z;
        let lateral = (d.truncate().abs() - board_half.truncate()).max(DVec2::ZERO);
        let apart_laterally = lateral.length() >= SAPPHIRE_RADIUS;
        if !(apart_axially || apart_laterally) {
            return Err(Error::invalid_config(
                scope.path("dice_board_z_pos"),
                ParamValue::length(self.dice_board_position.z),
                format!("a board clear of the sapphire window at z = {} mm", WINDOW_Z / MM),
            ));
        }
        Ok(())
    }

    fn board_placement(&self) -> Transform {
        Transform::from_rotation_y(self.rotation, self.dice_board_position)
    }

    fn window_placement(&self) -> Transform {
        let p = self.dice_board_position;
        Transform::from_rotation_y(self.rotation, DVec3::new(p.x, p.y, WINDOW_Z))
    }

    fn board_thickness(&self) -> f64 {
        SUBSTRATE_THICKNESS + self.coating_thickness + self.membrane_thickness + self.mask_thickness
    }

    /// Center height of each present layer inside the board, from the top down.
    fn layers(&self) -> Vec<Layer> {
        let mut top = 0.5 * self.board_thickness() - SUBSTRATE_THICKNESS;
        let mut layers = Vec::new();
        for (kind, thickness) in [
            (LayerKind::Coating, self.coating_thickness),
            (LayerKind::Membrane, self.membrane_thickness),
            (LayerKind::Mask, self.mask_thickness),
        ] {
            if thickness > 0.0 {
                layers.push(Layer {
                    kind,
                    thickness,
                    z: top - 0.5 * thickness,
                });
            }
            top -= thickness;
        }
        layers
    }

    fn membrane_z(&self) -> Option<f64> {
        self.layers()
            .into_iter()
            .find(|layer| layer.kind == LayerKind::Membrane)
            .map(|layer| layer.z)
    }
}

const POSITION_KEYS: [&str; 3] = ["dice_board_x_pos", "dice_board_y_pos", "dice_board_z_pos"];

fn window_half_length() -> f64 {
    0.5 * (SAPPHIRE_THICKNESS + PEDOT_THICKNESS)
}

/// Half extents of the axis-aligned box around a box of half extents `half`
/// turned by `angle` about Y.
fn rotated_half_extents(half: DVec3, angle: f64) -> DVec3 {
    let (sin, cos) = angle.sin_cos();
    let (sin, cos) = (sin.abs(), cos.abs());
    DVec3::new(
        half.x * cos + half.z * sin,
        half.y,
        half.x * sin + half.z * cos,
    )
}

fn check_on_board(field: String, center: DVec2, radius: f64) -> Result<()> {
    if center.abs().max_element() + radius > BOARD_HALF_WIDTH {
        return Err(Error::invalid_config(
            field,
            ParamValue::length(2.0 * radius),
            format!(
                "a disk around ({}, {}) mm within the {} mm board",
                center.x / MM,
                center.y / MM,
                2.0 * BOARD_HALF_WIDTH / MM
            ),
        ));
    }
    Ok(())
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum LayerKind {
    Coating,
    Membrane,
    Mask,
}

#[derive(Clone, Copy, Debug)]
struct Layer {
    kind: LayerKind,
    thickness: f64,
    z: f64,
}

/// Hexagonal holes punched through the membrane.
#[derive(Clone, Debug)]
struct MembraneHoles {
    shape: HexPrismShape,
    /// Hole centers in the membrane frame.
    centers: Vec<DVec2>,
    /// Membrane frame to world frame.
    membrane_to_world: Transform,
}

impl MembraneHoles {
    fn new(c: &BlackBoxConfig) -> Result<Self> {
        let half = 0.5 * c.membrane_thickness;
        let shape = HexPrismShape::new(0.5 * c.membrane_hole_diameter, half)?;
        let tiler = HexMeshTiler::new(0.5 * c.membrane_mesh_diameter, shape.circumradius())?;
        let centers: Vec<DVec2> = tiler
            .centers()
            .into_iter()
            .map(|p| p + c.membrane_hole_position)
            .collect();
        if centers.is_empty() {
            return Err(Error::invalid_config(
                format!("{PREFIX}.membrane_hole_diameter"),
                ParamValue::length(c.membrane_hole_diameter),
                "a hole that fits at least once in the mesh",
            ));
        }
        let membrane_z = c.membrane_z().unwrap_or(0.0);
        let membrane_to_world = c
            .board_placement()
            .then(&Transform::from_translation(DVec3::new(0.0, 0.0, membrane_z)));
        Ok(Self {
            shape,
            centers,
            membrane_to_world,
        })
    }

    fn sample(&self, rng: &mut dyn RngCore) -> DVec3 {
        let index = uniform_index(rng, self.centers.len() as u64) as usize;
        let hole = Transform::from_translation(self.centers[index].extend(0.0));
        HexPrismPointSampler::new(self.shape, self.membrane_to_world.then(&hole)).sample(rng)
    }
}

#[derive(Clone, Debug)]
struct Samplers {
    sapphire: CylinderPointSampler,
    holes: Option<MembraneHoles>,
}

impl Samplers {
    fn new(c: &BlackBoxConfig) -> Result<Self> {
        let window = CylinderShape::solid(SAPPHIRE_RADIUS, window_half_length())?;
        let holes = if c.membrane_hole {
            Some(MembraneHoles::new(c)?)
        } else {
            None
        };
        Ok(Self {
            sapphire: CylinderPointSampler::new(window, c.window_placement()),
            holes,
        })
    }
}

#[derive(Debug, Default)]
pub struct BlackBox {
    lifecycle: Lifecycle,
    config: BlackBoxConfig,
    samplers: Option<Samplers>,
}

impl BlackBox {
    pub fn config(&self) -> &BlackBoxConfig {
        &self.config
    }

    fn region_table(&self) -> &'static [(&'static str, Region)] {
        if self.config.membrane_hole {
            PERFORATED_REGIONS
        } else {
            REGIONS
        }
    }

    fn build_board(c: &BlackBoxConfig, samplers: &Samplers) -> Result<VolumeNode> {
        let mut board = VolumeNode::new(
            "DICE_BOARD",
            BoxShape::new(BOARD_HALF_WIDTH, BOARD_HALF_WIDTH, 0.5 * c.board_thickness())?,
            "FR4",
        )
        .placed(c.board_placement())
        .copy(1);

        for layer in c.layers() {
            let slab = BoxShape::new(BOARD_HALF_WIDTH, BOARD_HALF_WIDTH, 0.5 * layer.thickness)?;
            let at = DVec3::new(0.0, 0.0, layer.z);
            let node = match layer.kind {
                LayerKind::Coating => VolumeNode::new("COATING", slab, "TPB").at(at),
                LayerKind::Membrane => {
                    let membrane = VolumeNode::new("MEMBRANE", slab, "G4_KAPTON").at(at);
                    match &samplers.holes {
                        Some(holes) => membrane.with_children(holes.centers.iter().enumerate().map(
                            |(copy, center)| {
                                VolumeNode::new("HOLE", holes.shape, "G4_AIR")
                                    .at(center.extend(0.0))
                                    .copy(copy as u32)
                            },
                        )),
                        None => membrane,
                    }
                }
                LayerKind::Mask => {
                    let mut mask = VolumeNode::new("MASK", slab, "G4_Cu").at(at);
                    if c.hole_diameter > 0.0 {
                        mask.push_child(
                            VolumeNode::new(
                                "MASK_HOLE",
                                CylinderShape::solid(0.5 * c.hole_diameter, 0.5 * layer.thickness)?,
                                "G4_AIR",
                            )
                            .at(c.hole_position.extend(0.0)),
                        );
                    }
                    mask
                }
            };
            board.push_child(node);
        }
        Ok(board)
    }

    fn build_tree(c: &BlackBoxConfig, samplers: &Samplers) -> Result<VolumeTree> {
        let world = BoxShape::new(WORLD_HALF.x, WORLD_HALF.y, WORLD_HALF.z)?;
        let enclosure = BoxShape::new(BOX_HALF.x, BOX_HALF.y, BOX_HALF.z)?;

        let window_half = window_half_length();
        let pedot = VolumeNode::new(
            "PEDOT",
            CylinderShape::solid(SAPPHIRE_RADIUS, 0.5 * PEDOT_THICKNESS)?,
            "PEDOT",
        )
        .at(DVec3::new(0.0, 0.0, window_half - 0.5 * PEDOT_THICKNESS));
        let sapphire = VolumeNode::new(
            "SAPPHIRE",
            CylinderShape::solid(SAPPHIRE_RADIUS, window_half)?,
            "SAPPHIRE",
        )
        .placed(c.window_placement())
        .with_child(pedot);

        let enclosure = VolumeNode::new("BLACK_BOX", enclosure, "G4_AIR")
            .with_child(Self::build_board(c, samplers)?)
            .with_child(sapphire);
        let root = VolumeNode::new("WORLD", world, "G4_AIR").with_child(enclosure);

        Ok(VolumeTree::new(root).with_sensitive_detectors([SensitiveDetector {
            name: "/DICE_BOARD".to_owned(),
            volume: "DICE_BOARD".to_owned(),
            depth: 2,
            time_binning: None,
        }]))
    }
}

impl Geometry for BlackBox {
    fn name(&self) -> &'static str {
        "BlackBox"
    }

    fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }

    fn regions(&self) -> Vec<&'static str> {
        self.region_table().iter().map(|(tag, _)| *tag).collect()
    }

    fn configure(&mut self, params: &ParameterSet) -> Result<()> {
        self.config = self.lifecycle.configure_with(|| {
            let config = BlackBoxConfig::from_params(params)?;
            Samplers::new(&config)?;
            Ok(config)
        })?;
        Ok(())
    }

    fn construct(&mut self) -> Result<Arc<VolumeTree>> {
        let config = &self.config;
        let (tree, samplers) = self.lifecycle.construct_with(|| {
            let samplers = Samplers::new(config)?;
            Ok((Self::build_tree(config, &samplers)?, samplers))
        })?;
        if let Some(holes) = &samplers.holes {
            info!(
                "BlackBox: membrane perforated by {} hexagonal holes.",
                holes.centers.len()
            );
        }
        self.samplers = Some(samplers);
        log_constructed(self.name(), &tree);
        Ok(Arc::new(tree))
    }

    fn generate_vertex(&self, region: &str, rng: &mut dyn RngCore) -> Result<Vector3<f64>> {
        let region = resolve_region(self.name(), region, self.region_table())?;
        let samplers = self.lifecycle.ready(&self.samplers, "generate_vertex")?;
        let point = match (region, &samplers.holes) {
            (Region::World, _) => DVec3::ZERO,
            (Region::AdHoc, _) => self.config.specific_vertex,
            (Region::Sapphire, _) => samplers.sapphire.sample(CylinderRegion::Volume, rng),
            (Region::MembraneHole, Some(holes)) => holes.sample(rng),
            (Region::MembraneHole, None) => {
                return Err(Error::unknown_region(self.name(), "MEMBRANE_HOLE", &self.regions()))
            }
        };
        Ok(point.into())
    }
}
