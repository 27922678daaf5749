//! The recipe contract: configure once, construct once, then draw vertices.
use std::any::Any;
use std::fmt;
use std::sync::Arc;

use mint::Vector3;
use rand::RngCore;

use crate::error::{Error, Result};
use crate::volume::VolumeTree;

pub mod params;

pub use params::{ParamScope, ParamValue, ParameterSet};

/// Where a recipe instance is in its life.
///
/// `Unconfigured -> Configured -> Constructed`, with `Failed` entered when
/// construction fails. There is no way back to an earlier state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum Lifecycle {
    #[default]
    Unconfigured,
    Configured,
    Constructed,
    Failed,
}

impl fmt::Display for Lifecycle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Lifecycle::Unconfigured => "unconfigured",
            Lifecycle::Configured => "configured",
            Lifecycle::Constructed => "constructed",
            Lifecycle::Failed => "failed",
        })
    }
}

impl Lifecycle {
    fn reject(self, operation: &'static str) -> Error {
        Error::Lifecycle {
            operation,
            state: self,
        }
    }

    /// Run a configuration step; only allowed once, before construction.
    /// A failed step leaves the state untouched.
    pub(crate) fn configure_with<T>(&mut self, step: impl FnOnce() -> Result<T>) -> Result<T> {
        if *self != Lifecycle::Unconfigured {
            return Err(self.reject("configure"));
        }
        let value = step()?;
        *self = Lifecycle::Configured;
        Ok(value)
    }

    /// Run the construction step; a failure is terminal.
    pub(crate) fn construct_with<T>(&mut self, step: impl FnOnce() -> Result<T>) -> Result<T> {
        if *self != Lifecycle::Configured {
            return Err(self.reject("construct"));
        }
        match step() {
            Ok(value) => {
                *self = Lifecycle::Constructed;
                Ok(value)
            }
            Err(err) => {
                *self = Lifecycle::Failed;
                Err(err)
            }
        }
    }

    /// Borrow what construction produced, failing unless constructed.
    pub(crate) fn ready<'a, T>(self, built: &'a Option<T>, operation: &'static str) -> Result<&'a T> {
        match built {
            Some(value) if self == Lifecycle::Constructed => Ok(value),
            _ => Err(self.reject(operation)),
        }
    }

    /// Fail unless the state is exactly `expected`.
    pub(crate) fn require(self, expected: Lifecycle, operation: &'static str) -> Result<()> {
        if self == expected {
            Ok(())
        } else {
            Err(self.reject(operation))
        }
    }
}

/// A named detector model.
///
/// Instances come out of a [`crate::registry::GeometryRegistry`] unconfigured.
/// After [`Geometry::construct`] the instance is read-only and may be shared
/// across threads; every vertex draw takes its random stream explicitly.
pub trait Geometry: Any + Send + Sync {
    /// Name the recipe is registered under.
    fn name(&self) -> &'static str;

    fn lifecycle(&self) -> Lifecycle;

    /// Region tags accepted by [`Geometry::generate_vertex`]. Some recipes
    /// accept extra tags depending on their configuration.
    fn regions(&self) -> Vec<&'static str>;

    /// Apply parameters under the recipe's prefix. Unknown keys, wrong
    /// dimensions and out-of-range values are rejected here.
    fn configure(&mut self, params: &ParameterSet) -> Result<()>;

    /// Build the volume tree. Called exactly once.
    fn construct(&mut self) -> Result<Arc<VolumeTree>>;

    /// Draw one vertex in the named region.
    ///
    /// Unknown regions are reported before the lifecycle is checked.
    fn generate_vertex(&self, region: &str, rng: &mut dyn RngCore) -> Result<Vector3<f64>>;
}
