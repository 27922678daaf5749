//! Immutable parameter records for the primitive solids.
//!
//! Every constructor validates its dimensions and fails with
//! [`crate::error::Error::DegenerateShape`] instead of clamping.
use std::f64::consts::{PI, TAU};

use glam::DVec3;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

fn require_positive(shape: &'static str, dimension: &'static str, value: f64) -> Result<f64> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(Error::degenerate(shape, dimension, value, "finite and > 0"))
    }
}

/// Axis-aligned box described by its half-extents.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoxShape {
    half_x: f64,
    half_y: f64,
    half_z: f64,
}

impl BoxShape {
    pub fn new(half_x: f64, half_y: f64, half_z: f64) -> Result<Self> {
        Ok(Self {
            half_x: require_positive("box", "half_x", half_x)?,
            half_y: require_positive("box", "half_y", half_y)?,
            half_z: require_positive("box", "half_z", half_z)?,
        })
    }

    /// Box from full edge lengths.
    pub fn from_full_lengths(x: f64, y: f64, z: f64) -> Result<Self> {
        Self::new(x * 0.5, y * 0.5, z * 0.5)
    }

    pub fn half_x(&self) -> f64 {
        self.half_x
    }

    pub fn half_y(&self) -> f64 {
        self.half_y
    }

    pub fn half_z(&self) -> f64 {
        self.half_z
    }

    pub fn volume(&self) -> f64 {
        8.0 * self.half_x * self.half_y * self.half_z
    }
}

/// Cylindrical shell section: `inner_radius <= r <= outer_radius`,
/// `|z| <= half_length`, `start_phi <= phi <= start_phi + span_phi`.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CylinderShape {
    inner_radius: f64,
    outer_radius: f64,
    half_length: f64,
    start_phi: f64,
    span_phi: f64,
}

impl CylinderShape {
    pub fn new(
        inner_radius: f64,
        outer_radius: f64,
        half_length: f64,
        start_phi: f64,
        span_phi: f64,
    ) -> Result<Self> {
        let outer_radius = require_positive("cylinder", "outer_radius", outer_radius)?;
        let half_length = require_positive("cylinder", "half_length", half_length)?;
        if !inner_radius.is_finite() || inner_radius < 0.0 {
            return Err(Error::degenerate(
                "cylinder",
                "inner_radius",
                inner_radius,
                "finite and >= 0",
            ));
        }
        if inner_radius >= outer_radius {
            return Err(Error::degenerate(
                "cylinder",
                "inner_radius",
                inner_radius,
                "< outer_radius",
            ));
        }
        if !span_phi.is_finite() || span_phi <= 0.0 || span_phi > TAU + 1e-12 {
            return Err(Error::degenerate(
                "cylinder",
                "span_phi",
                span_phi,
                "in (0, 2*pi]",
            ));
        }
        if !start_phi.is_finite() {
            return Err(Error::degenerate("cylinder", "start_phi", start_phi, "finite"));
        }
        Ok(Self {
            inner_radius,
            outer_radius,
            half_length,
            start_phi,
            span_phi: span_phi.min(TAU),
        })
    }

    /// Full solid cylinder of radius `radius`.
    pub fn solid(radius: f64, half_length: f64) -> Result<Self> {
        Self::new(0.0, radius, half_length, 0.0, TAU)
    }

    /// Full-azimuth tube between two radii.
    pub fn tube(inner_radius: f64, outer_radius: f64, half_length: f64) -> Result<Self> {
        Self::new(inner_radius, outer_radius, half_length, 0.0, TAU)
    }

    pub fn inner_radius(&self) -> f64 {
        self.inner_radius
    }

    pub fn outer_radius(&self) -> f64 {
        self.outer_radius
    }

    pub fn half_length(&self) -> f64 {
        self.half_length
    }

    pub fn start_phi(&self) -> f64 {
        self.start_phi
    }

    pub fn span_phi(&self) -> f64 {
        self.span_phi
    }

    pub fn volume(&self) -> f64 {
        let r2 = self.outer_radius * self.outer_radius - self.inner_radius * self.inner_radius;
        0.5 * self.span_phi * r2 * 2.0 * self.half_length
    }
}

/// Regular hexagonal prism, pointy side along +Y, extruded along Z.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HexPrismShape {
    circumradius: f64,
    half_thickness: f64,
}

impl HexPrismShape {
    pub fn new(circumradius: f64, half_thickness: f64) -> Result<Self> {
        Ok(Self {
            circumradius: require_positive("hexagonal prism", "circumradius", circumradius)?,
            half_thickness: require_positive("hexagonal prism", "half_thickness", half_thickness)?,
        })
    }

    pub fn circumradius(&self) -> f64 {
        self.circumradius
    }

    pub fn half_thickness(&self) -> f64 {
        self.half_thickness
    }

    /// Flat-to-flat width.
    pub fn width(&self) -> f64 {
        3f64.sqrt() * self.circumradius
    }
}

/// Spherical shell cap around +Z, opening half-angle `theta_max`.
/// Only used to describe volumes; nothing samples it.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SphereShellShape {
    inner_radius: f64,
    outer_radius: f64,
    theta_max: f64,
}

impl SphereShellShape {
    pub fn new(inner_radius: f64, outer_radius: f64, theta_max: f64) -> Result<Self> {
        let outer_radius = require_positive("sphere shell", "outer_radius", outer_radius)?;
        if !(0.0..outer_radius).contains(&inner_radius) {
            return Err(Error::degenerate(
                "sphere shell",
                "inner_radius",
                inner_radius,
                "in [0, outer_radius)",
            ));
        }
        if !theta_max.is_finite() || theta_max <= 0.0 || theta_max > PI {
            return Err(Error::degenerate(
                "sphere shell",
                "theta_max",
                theta_max,
                "in (0, pi]",
            ));
        }
        Ok(Self {
            inner_radius,
            outer_radius,
            theta_max,
        })
    }

    pub fn inner_radius(&self) -> f64 {
        self.inner_radius
    }

    pub fn outer_radius(&self) -> f64 {
        self.outer_radius
    }

    pub fn theta_max(&self) -> f64 {
        self.theta_max
    }
}

/// The shape of a volume node.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Solid {
    Box(BoxShape),
    Cylinder(CylinderShape),
    HexPrism(HexPrismShape),
    SphereShell(SphereShellShape),
}

impl Solid {
    pub fn kind(&self) -> &'static str {
        match self {
            Solid::Box(_) => "box",
            Solid::Cylinder(_) => "cylinder",
            Solid::HexPrism(_) => "hexagonal prism",
            Solid::SphereShell(_) => "sphere shell",
        }
    }

    /// Whether a point given in the solid's local frame lies inside it.
    /// Boundaries count as inside, with a small absolute tolerance.
    pub fn contains(&self, p: DVec3) -> bool {
        const EPS: f64 = 1e-9;
        match self {
            Solid::Box(b) => {
                p.x.abs() <= b.half_x + EPS
                    && p.y.abs() <= b.half_y + EPS
                    && p.z.abs() <= b.half_z + EPS
            }
            Solid::Cylinder(c) => {
                let r = p.truncate().length();
                if p.z.abs() > c.half_length + EPS
                    || r > c.outer_radius + EPS
                    || r < c.inner_radius - EPS
                {
                    return false;
                }
                if c.span_phi >= TAU || r < EPS {
                    return true;
                }
                let phi = (p.y.atan2(p.x) - c.start_phi).rem_euclid(TAU);
                phi <= c.span_phi + EPS || phi >= TAU - EPS
            }
            Solid::HexPrism(h) => {
                let (x, y) = (p.x.abs(), p.y.abs());
                let rc = h.circumradius;
                p.z.abs() <= h.half_thickness + EPS
                    && x <= 0.5 * 3f64.sqrt() * rc + EPS
                    && y + x / 3f64.sqrt() <= rc + EPS
            }
            Solid::SphereShell(s) => {
                let r = p.length();
                if r > s.outer_radius + EPS || r < s.inner_radius - EPS {
                    return false;
                }
                r < EPS || (p.z / r).clamp(-1.0, 1.0).acos() <= s.theta_max + EPS
            }
        }
    }
}

impl From<BoxShape> for Solid {
    fn from(value: BoxShape) -> Self {
        Solid::Box(value)
    }
}

impl From<CylinderShape> for Solid {
    fn from(value: CylinderShape) -> Self {
        Solid::Cylinder(value)
    }
}

impl From<HexPrismShape> for Solid {
    fn from(value: HexPrismShape) -> Self {
        Solid::HexPrism(value)
    }
}

impl From<SphereShellShape> for Solid {
    fn from(value: SphereShellShape) -> Self {
        Solid::SphereShell(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn box_rejects_non_positive_extent() {
        let err = BoxShape::new(1.0, 0.0, 1.0).unwrap_err();
        assert!(matches!(
            err,
            Error::DegenerateShape {
                dimension: "half_y",
                ..
            }
        ));
        assert!(BoxShape::new(1.0, 1.0, -2.0).is_err());
        assert!(BoxShape::new(f64::NAN, 1.0, 1.0).is_err());
    }

    #[test]
    fn box_volume_uses_full_edges() {
        let b = BoxShape::from_full_lengths(2.0, 4.0, 6.0).unwrap();
        assert_eq!(b.half_y(), 2.0);
        assert_eq!(b.volume(), 48.0);
    }

    #[test]
    fn cylinder_validates_radii_and_span() {
        assert!(CylinderShape::new(2.0, 1.0, 1.0, 0.0, TAU).is_err());
        assert!(CylinderShape::new(1.0, 1.0, 1.0, 0.0, TAU).is_err());
        assert!(CylinderShape::new(-0.1, 1.0, 1.0, 0.0, TAU).is_err());
        assert!(CylinderShape::new(0.0, 1.0, 0.0, 0.0, TAU).is_err());
        assert!(CylinderShape::new(0.0, 1.0, 1.0, 0.0, 0.0).is_err());
        assert!(CylinderShape::new(0.0, 1.0, 1.0, 0.0, 7.0).is_err());
        assert!(CylinderShape::new(0.5, 1.0, 1.0, 0.0, PI).is_ok());
    }

    #[test]
    fn solid_cylinder_volume() {
        let c = CylinderShape::solid(1.0, 0.5).unwrap();
        assert!((c.volume() - PI).abs() < 1e-12);
    }

    #[test]
    fn hex_prism_width_is_flat_to_flat() {
        let h = HexPrismShape::new(2.0, 0.1).unwrap();
        assert!((h.width() - 2.0 * 3f64.sqrt()).abs() < 1e-12);
        assert!(HexPrismShape::new(0.0, 0.1).is_err());
    }

    #[test]
    fn containment_respects_each_solid() {
        let b: Solid = BoxShape::new(1.0, 2.0, 3.0).unwrap().into();
        assert!(b.contains(DVec3::new(1.0, -2.0, 0.0)));
        assert!(!b.contains(DVec3::new(1.1, 0.0, 0.0)));

        let quarter: Solid = CylinderShape::new(0.5, 1.0, 1.0, 0.0, PI / 2.0)
            .unwrap()
            .into();
        assert!(quarter.contains(DVec3::new(0.5, 0.5, 0.0)));
        assert!(!quarter.contains(DVec3::new(-0.5, 0.5, 0.0)));
        assert!(!quarter.contains(DVec3::new(0.2, 0.2, 0.0)));

        let hex: Solid = HexPrismShape::new(1.0, 0.5).unwrap().into();
        assert!(hex.contains(DVec3::new(0.0, 1.0, 0.0)));
        assert!(!hex.contains(DVec3::new(0.9, 0.0, 0.0)));

        let cap: Solid = SphereShellShape::new(1.0, 2.0, 0.5).unwrap().into();
        assert!(cap.contains(DVec3::new(0.0, 0.0, 1.5)));
        assert!(!cap.contains(DVec3::new(1.5, 0.0, 0.0)));
    }

    #[test]
    fn sphere_shell_requires_ordered_radii() {
        assert!(SphereShellShape::new(1.0, 1.0, 0.5).is_err());
        assert!(SphereShellShape::new(0.9, 1.0, 0.0).is_err());
        assert!(SphereShellShape::new(0.9, 1.0, 0.5).is_ok());
    }
}
