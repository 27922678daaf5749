//! Mono-species alpha source with a flat kinetic energy spectrum.
use glam::DVec3;
use rand::RngCore;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::generator::{PrimaryGenerator, PrimaryParticle, PrimaryVertex};
use crate::geometry::{Geometry, Lifecycle, ParamValue, ParameterSet};
use crate::sampling::{isotropic_direction, rand_between};
use crate::units::MEV;

pub const PREFIX: &str = "generator.alpha";

pub const ALPHA_MASS: f64 = 3727.3794 * MEV;
pub const ALPHA_PDG_CODE: i32 = 1_000_020_040;

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, PartialEq)]
pub struct AlphaConfig {
    /// Geometry region the vertices are drawn from.
    pub region: String,
    pub energy_low: f64,
    pub energy_high: f64,
}

impl AlphaConfig {
    pub fn from_params(params: &ParameterSet) -> Result<Self> {
        let mut scope = params.scope(PREFIX);
        let region = scope.text("region")?;
        let energy_low = scope.energy("energy_low", 1.0 * MEV)?;
        let energy_high = scope.energy("energy_high", 2.0 * MEV)?;
        scope.finish()?;

        let Some(region) = region else {
            return Err(Error::invalid_config(
                format!("{PREFIX}.region"),
                "<unset>",
                "a region tag of the geometry",
            ));
        };
        if !(energy_low >= 0.0 && energy_low.is_finite()) {
            return Err(Error::invalid_config(
                format!("{PREFIX}.energy_low"),
                ParamValue::energy(energy_low),
                ">= 0",
            ));
        }
        if !(energy_high >= energy_low && energy_high.is_finite()) {
            return Err(Error::invalid_config(
                format!("{PREFIX}.energy_high"),
                ParamValue::energy(energy_high),
                format!(">= energy_low ({})", ParamValue::energy(energy_low)),
            ));
        }
        Ok(Self {
            region,
            energy_low,
            energy_high,
        })
    }
}

/// Emits one alpha per vertex, isotropically, with kinetic energy uniform in
/// `[energy_low, energy_high)`.
#[derive(Debug, Default)]
pub struct AlphaGenerator {
    lifecycle: Lifecycle,
    config: Option<AlphaConfig>,
}

impl AlphaGenerator {
    pub fn config(&self) -> Option<&AlphaConfig> {
        self.config.as_ref()
    }
}

impl PrimaryGenerator for AlphaGenerator {
    fn name(&self) -> &'static str {
        "AlphaGenerator"
    }

    fn configure(&mut self, params: &ParameterSet) -> Result<()> {
        let config = self
            .lifecycle
            .configure_with(|| AlphaConfig::from_params(params))?;
        self.config = Some(config);
        Ok(())
    }

    fn generate_primary_vertex(
        &self,
        geometry: &dyn Geometry,
        rng: &mut dyn RngCore,
    ) -> Result<PrimaryVertex> {
        self.lifecycle
            .require(Lifecycle::Configured, "generate_primary_vertex")?;
        let Some(config) = &self.config else {
            return Err(Error::Lifecycle {
                operation: "generate_primary_vertex",
                state: self.lifecycle,
            });
        };

        let position: DVec3 = geometry.generate_vertex(&config.region, rng)?.into();
        let kinetic_energy = rand_between(rng, config.energy_low, config.energy_high);
        let total = kinetic_energy + ALPHA_MASS;
        let p = (total * total - ALPHA_MASS * ALPHA_MASS).max(0.0).sqrt();
        let direction = isotropic_direction(rng);

        Ok(PrimaryVertex {
            position,
            time: 0.0,
            particles: vec![PrimaryParticle {
                pdg_code: ALPHA_PDG_CODE,
                mass: ALPHA_MASS,
                kinetic_energy,
                momentum: direction * p,
                polarization: DVec3::ZERO,
                proper_time: 0.0,
            }],
        })
    }
}
