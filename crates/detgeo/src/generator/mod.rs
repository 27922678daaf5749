//! Primary-particle generators that draw their vertices from a geometry.
use std::any::Any;

use glam::DVec3;
use rand::RngCore;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::geometry::{Geometry, ParameterSet};

pub mod alpha;

pub use alpha::{AlphaConfig, AlphaGenerator};

/// One particle leaving a primary vertex.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, PartialEq)]
pub struct PrimaryParticle {
    /// PDG Monte Carlo particle code.
    pub pdg_code: i32,
    pub mass: f64,
    pub kinetic_energy: f64,
    pub momentum: DVec3,
    pub polarization: DVec3,
    pub proper_time: f64,
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, PartialEq)]
pub struct PrimaryVertex {
    pub position: DVec3,
    pub time: f64,
    pub particles: Vec<PrimaryParticle>,
}

/// A named primary generator.
///
/// Generators are configured once and then only read, so one instance can
/// serve several worker threads, each with its own random stream.
pub trait PrimaryGenerator: Any + Send + Sync {
    fn name(&self) -> &'static str;

    /// Apply parameters under the generator's prefix.
    fn configure(&mut self, params: &ParameterSet) -> Result<()>;

    /// Draw one primary vertex; the position comes from `geometry`.
    fn generate_primary_vertex(
        &self,
        geometry: &dyn Geometry,
        rng: &mut dyn RngCore,
    ) -> Result<PrimaryVertex>;
}
