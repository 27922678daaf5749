#![forbid(unsafe_code)]

use anyhow::Context;
use detgeo::prelude::*;
use glam::DVec3;
use tracing_subscriber::EnvFilter;

/// Log to stderr; `RUST_LOG` overrides the default `info` level.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Create, configure and construct the named recipe.
pub fn build_geometry(name: &str, params: &ParameterSet) -> anyhow::Result<Box<dyn Geometry>> {
    let registry = GeometryRegistry::with_builtin_recipes()?;
    let mut geometry = registry.create(name)?;
    geometry
        .configure(params)
        .with_context(|| format!("configuring {name}"))?;
    geometry
        .construct()
        .with_context(|| format!("constructing {name}"))?;
    Ok(geometry)
}

/// Per-axis mean and variance.
#[derive(Clone, Copy, Debug)]
pub struct Moments {
    pub mean: DVec3,
    pub variance: DVec3,
}

pub fn moments(points: &[DVec3]) -> Moments {
    let n = points.len().max(1) as f64;
    let mean = points.iter().copied().sum::<DVec3>() / n;
    let variance = points
        .iter()
        .map(|p| (*p - mean) * (*p - mean))
        .sum::<DVec3>()
        / n;
    Moments { mean, variance }
}

/// Axis-aligned bounds of a point cloud.
pub fn bounds(points: &[DVec3]) -> Option<(DVec3, DVec3)> {
    let first = *points.first()?;
    Some(
        points
            .iter()
            .fold((first, first), |(lo, hi), p| (lo.min(*p), hi.max(*p))),
    )
}
