use detgeo::prelude::*;
use detgeo_examples::init_tracing;

fn main() -> anyhow::Result<()> {
    init_tracing();
    let registry = GeometryRegistry::with_builtin_recipes()?;

    for name in registry.names() {
        let mut geometry = registry.create(name)?;
        geometry.configure(&ParameterSet::new())?;
        let tree = geometry.construct()?;
        println!(
            "{name}: {} volumes, regions {:?}",
            tree.node_count(),
            geometry.regions()
        );
        for visited in tree.iter() {
            println!(
                "  {}{} [{}] {}",
                "  ".repeat(visited.depth),
                visited.node.name,
                visited.node.solid.kind(),
                visited.node.material
            );
        }
        for sd in &tree.sensitive_detectors {
            println!("  sensitive detector {} on {}", sd.name, sd.volume);
        }
    }

    if let Err(err) = registry.create("NEW_GEOMETRY") {
        println!("lookup of an unregistered name: {err}");
    }
    Ok(())
}
