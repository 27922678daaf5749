//! Hamamatsu R7378A photomultiplier sub-assembly.
use glam::DVec3;

use crate::error::Result;
use crate::shape::{CylinderShape, SphereShellShape};
use crate::units::{MM, NS};
use crate::volume::{SensitiveDetector, VolumeNode};

pub const BODY_DIAMETER: f64 = 25.4 * MM;
pub const BODY_LENGTH: f64 = 43.0 * MM;
pub const WINDOW_LENGTH: f64 = 6.0 * MM;

const PHOTOCATHODE_DIAMETER: f64 = 22.0 * MM;
const PHOTOCATHODE_HEIGHT: f64 = 4.0 * MM;
const PHOTOCATHODE_THICKNESS: f64 = 0.1 * MM;
const PHOTOCATHODE_Z: f64 = -16.0 * MM;

pub const SENSOR_NAME: &str = "/PMT_R7378A/Pmt";

/// Body node plus the sensitive detector registered on its photocathode.
#[derive(Clone, Debug, PartialEq)]
pub struct PmtAssembly {
    pub body: VolumeNode,
    pub sensitive_detector: SensitiveDetector,
}

/// Radius of the sphere through the rim and apex of a cap with the given
/// chord diameter and height.
fn cap_sphere_radius(diameter: f64, height: f64) -> f64 {
    0.5 * (diameter * diameter / (4.0 * height) + height)
}

/// Build the PMT with its window facing +Z.
pub fn build() -> Result<PmtAssembly> {
    let rmax = cap_sphere_radius(PHOTOCATHODE_DIAMETER, PHOTOCATHODE_HEIGHT);
    let rmin = rmax - PHOTOCATHODE_THICKNESS;
    let theta = (PHOTOCATHODE_DIAMETER / (2.0 * rmax)).asin();

    let photocathode = VolumeNode::new(
        "PHOTOCATHODE",
        SphereShellShape::new(rmin, rmax, theta)?,
        "G4_Al",
    )
    .at(DVec3::new(0.0, 0.0, PHOTOCATHODE_Z));

    let window = VolumeNode::new(
        "PMT_WINDOW",
        CylinderShape::solid(BODY_DIAMETER / 2.0, WINDOW_LENGTH / 2.0)?,
        "G4_SILICON_DIOXIDE",
    )
    .at(DVec3::new(0.0, 0.0, (BODY_LENGTH - WINDOW_LENGTH) / 2.0))
    .with_child(photocathode);

    let body = VolumeNode::new(
        "PMT_R7378A",
        CylinderShape::solid(BODY_DIAMETER / 2.0, BODY_LENGTH / 2.0)?,
        "G4_Al",
    )
    .with_child(window);

    Ok(PmtAssembly {
        body,
        sensitive_detector: SensitiveDetector {
            name: SENSOR_NAME.to_owned(),
            volume: "PHOTOCATHODE".to_owned(),
            depth: 2,
            time_binning: Some(100.0 * NS),
        },
    })
}
