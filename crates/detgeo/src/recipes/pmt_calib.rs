//! Photomultiplier calibration stand: a bare R7378A looking at a point source.
use std::sync::Arc;

use glam::DVec3;
use mint::Vector3;
use rand::RngCore;

use crate::error::Result;
use crate::geometry::{Geometry, Lifecycle, ParameterSet};
use crate::recipes::{log_constructed, pmt_r7378a};
use crate::sampling::resolve_region;
use crate::shape::BoxShape;
use crate::units::{CM, MM};
use crate::volume::{VolumeNode, VolumeTree};

pub const PREFIX: &str = "geometry.pmt_calib";

const POINT_SOURCE: DVec3 = DVec3::new(0.0, 0.0, -30.0 * CM);
const PMT_Z: f64 = -25.0 * CM - 21.5 * MM;

const REGIONS: &[(&str, ())] = &[("POINT_SOURCE", ())];

/// Takes no parameters; any key under its prefix is rejected.
#[derive(Debug, Default)]
pub struct PmtCalib {
    lifecycle: Lifecycle,
}

impl PmtCalib {
    fn build_tree() -> Result<VolumeTree> {
        let lab = BoxShape::new(3.0 * CM, 3.0 * CM, 30.0 * CM)?;
        let pmt = pmt_r7378a::build()?;
        let root = VolumeNode::new("LAB", lab, "G4_AIR")
            .with_child(pmt.body.at(DVec3::new(0.0, 0.0, PMT_Z)));
        Ok(VolumeTree::new(root).with_sensitive_detectors([pmt.sensitive_detector]))
    }
}

impl Geometry for PmtCalib {
    fn name(&self) -> &'static str {
        "PmtCalib"
    }

    fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }

    fn regions(&self) -> Vec<&'static str> {
        REGIONS.iter().map(|(tag, _)| *tag).collect()
    }

    fn configure(&mut self, params: &ParameterSet) -> Result<()> {
        self.lifecycle
            .configure_with(|| params.scope(PREFIX).finish())
    }

    fn construct(&mut self) -> Result<Arc<VolumeTree>> {
        let tree = self.lifecycle.construct_with(Self::build_tree)?;
        log_constructed(self.name(), &tree);
        Ok(Arc::new(tree))
    }

    fn generate_vertex(&self, region: &str, _rng: &mut dyn RngCore) -> Result<Vector3<f64>> {
        resolve_region(self.name(), region, REGIONS)?;
        self.lifecycle
            .require(Lifecycle::Constructed, "generate_vertex")?;
        Ok(POINT_SOURCE.into())
    }
}
