#![forbid(unsafe_code)]
//! detgeo: name-keyed detector geometry recipes with measure-correct vertex sampling.
//!
//! Modules:
//! - shape, transform, volume: primitive solids, rigid placements and the volume tree
//! - sampling: uniform point samplers for boxes, cylinders and hexagonal prisms
//! - layout: hexagonal mesh tiling and repeated element lattices
//! - geometry, recipes: the configure/construct/generate contract and the built-in detectors
//! - registry, generator: name-keyed factories and the alpha primary generator
//! - units, seeding: internal units and per-event random streams
pub mod error;
pub mod generator;
pub mod geometry;
pub mod layout;
pub mod recipes;
pub mod registry;
pub mod sampling;
pub mod seeding;
pub mod shape;
pub mod transform;
pub mod units;
pub mod volume;

/// Convenient re-exports for common types. Import with `use detgeo::prelude::*;`.
pub mod prelude {
    pub use crate::error::{Error, Result};
    pub use crate::generator::{AlphaGenerator, PrimaryGenerator, PrimaryParticle, PrimaryVertex};
    pub use crate::geometry::{Geometry, Lifecycle, ParamValue, ParameterSet};
    pub use crate::layout::{Arrangement, ElementIndex, HexMeshTiler, RepeatedElementPlacer};
    pub use crate::recipes::{
        BlackBox, FiberAbsorption, FiberEfficiency, OpticalFibre, PlainDice, PmtCalib, XeBox,
    };
    pub use crate::registry::{FactoryRegistry, GeneratorRegistry, GeometryRegistry};
    pub use crate::sampling::{
        BoxPointSampler, BoxRegion, CylinderPointSampler, CylinderRegion, HexPrismPointSampler,
        PointSampling,
    };
    pub use crate::seeding::{event_rng, seed_for_event, DEFAULT_SEED};
    pub use crate::shape::{BoxShape, CylinderShape, HexPrismShape, Solid, SphereShellShape};
    pub use crate::transform::Transform;
    pub use crate::volume::{SensitiveDetector, VolumeNode, VolumeTree};
}
