use detgeo::prelude::*;
use detgeo_examples::{build_geometry, init_tracing};
use rand::rngs::StdRng;
use rand::SeedableRng;

fn main() -> anyhow::Result<()> {
    init_tracing();

    let tiler = HexMeshTiler::new(10.0, 1.0)?;
    let centers = tiler.centers();
    println!(
        "{} cells of circumradius {} inside radius {} (pitch {:.4})",
        centers.len(),
        tiler.circumradius(),
        tiler.boundary_radius(),
        tiler.pitch()
    );
    let farthest = centers
        .iter()
        .map(|c| tiler.farthest_vertex_distance(*c))
        .fold(0.0_f64, f64::max);
    println!("farthest vertex at {farthest:.4}");
    for center in centers.iter().take(7) {
        println!("  ({:+.4}, {:+.4})", center.x, center.y);
    }

    let params = ParameterSet::parse(
        "geometry.black_box.membrane_hole true\n\
         geometry.black_box.membrane_hole_diameter 2 mm\n\
         geometry.black_box.membrane_mesh_diameter 20 mm\n\
         geometry.black_box.rotation 15 deg\n",
    )?;
    let geometry = build_geometry("BlackBox", &params)?;
    let mut rng = StdRng::seed_from_u64(7);
    println!("BlackBox regions: {:?}", geometry.regions());
    for _ in 0..5 {
        let p = geometry.generate_vertex("MEMBRANE_HOLE", &mut rng)?;
        println!("  MEMBRANE_HOLE vertex ({:+.4}, {:+.4}, {:+.4})", p.x, p.y, p.z);
    }
    Ok(())
}
