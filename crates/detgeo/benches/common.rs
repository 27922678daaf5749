use std::time::Duration;

use criterion::{Criterion, Throughput};
use detgeo::geometry::{Geometry, ParameterSet};
use detgeo::registry::GeometryRegistry;

pub const SAMPLE_SIZE: usize = 20;
pub const WARM_UP: Duration = Duration::from_secs(1);
pub const MEASUREMENT_TIME: Duration = Duration::from_secs(2);

pub fn default_criterion() -> Criterion {
    Criterion::default()
        .configure_from_args()
        .sample_size(SAMPLE_SIZE)
        .warm_up_time(WARM_UP)
        .measurement_time(MEASUREMENT_TIME)
}

pub fn elements_throughput(elements: usize) -> Throughput {
    Throughput::Elements(elements.max(1) as u64)
}

/// Configured and constructed recipe, ready for vertex generation.
#[allow(dead_code)]
pub fn constructed(name: &str, params: &ParameterSet) -> Box<dyn Geometry> {
    let registry = GeometryRegistry::with_builtin_recipes().expect("builtin recipes");
    let mut geometry = registry.create(name).expect("registered recipe");
    geometry.configure(params).expect("valid parameters");
    geometry.construct().expect("construction succeeds");
    geometry
}
