//! Name-keyed factories for geometries and primary generators.
//!
//! Registries are filled once at start-up, usually through
//! [`GeometryRegistry::with_builtin_recipes`], and only read afterwards.
use std::collections::BTreeMap;
use std::fmt;

use tracing::debug;

use crate::error::{Error, Result};
use crate::generator::{AlphaGenerator, PrimaryGenerator};
use crate::geometry::Geometry;
use crate::recipes::{BlackBox, FiberAbsorption, FiberEfficiency, OpticalFibre, PmtCalib, XeBox};

/// Zero-argument constructor producing a fresh instance.
pub type Factory<T> = fn() -> Box<T>;

/// Registry of factories keyed by name.
pub struct FactoryRegistry<T: ?Sized> {
    kind: &'static str,
    factories: BTreeMap<&'static str, Factory<T>>,
}

pub type GeometryRegistry = FactoryRegistry<dyn Geometry>;
pub type GeneratorRegistry = FactoryRegistry<dyn PrimaryGenerator>;

impl<T: ?Sized> FactoryRegistry<T> {
    /// Creates an empty registry; `kind` names the product in error messages.
    pub fn new(kind: &'static str) -> Self {
        Self {
            kind,
            factories: BTreeMap::new(),
        }
    }

    pub fn kind(&self) -> &'static str {
        self.kind
    }

    /// Registers `factory` under `name`. A name can be registered only once.
    pub fn register(&mut self, name: &'static str, factory: Factory<T>) -> Result<()> {
        if self.factories.contains_key(name) {
            return Err(Error::DuplicateRegistration {
                kind: self.kind,
                name: name.to_owned(),
            });
        }
        self.factories.insert(name, factory);
        debug!("Registered {} '{}'.", self.kind, name);
        Ok(())
    }

    /// Builds a fresh instance of the named product.
    pub fn create(&self, name: &str) -> Result<Box<T>> {
        match self.factories.get(name) {
            Some(factory) => Ok(factory()),
            None => Err(Error::NotFound {
                kind: self.kind,
                name: name.to_owned(),
                available: self.names().map(str::to_owned).collect(),
            }),
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    /// Registered names in lexical order.
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.factories.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.factories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }
}

impl<T: ?Sized> fmt::Debug for FactoryRegistry<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FactoryRegistry")
            .field("kind", &self.kind)
            .field("names", &self.factories.keys().collect::<Vec<_>>())
            .finish()
    }
}

fn geometry<G: Geometry + Default>() -> Box<dyn Geometry> {
    Box::new(G::default())
}

fn generator<G: PrimaryGenerator + Default>() -> Box<dyn PrimaryGenerator> {
    Box::new(G::default())
}

impl GeometryRegistry {
    /// Registry holding every recipe shipped with the crate.
    pub fn with_builtin_recipes() -> Result<Self> {
        let mut registry = Self::new("geometry");
        registry.register("XeBox", geometry::<XeBox>)?;
        registry.register("OpticalFibre", geometry::<OpticalFibre>)?;
        registry.register("FiberEfficiency", geometry::<FiberEfficiency>)?;
        registry.register("FiberAbsorption", geometry::<FiberAbsorption>)?;
        registry.register("BlackBox", geometry::<BlackBox>)?;
        registry.register("PmtCalib", geometry::<PmtCalib>)?;
        Ok(registry)
    }
}

impl GeneratorRegistry {
    pub fn with_builtin_generators() -> Result<Self> {
        let mut registry = Self::new("generator");
        registry.register("AlphaGenerator", generator::<AlphaGenerator>)?;
        Ok(registry)
    }
}
