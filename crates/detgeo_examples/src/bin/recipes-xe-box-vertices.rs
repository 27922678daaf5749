use detgeo::prelude::*;
use detgeo_examples::{bounds, build_geometry, init_tracing, moments};
use glam::DVec3;
use rand::rngs::StdRng;
use rand::SeedableRng;

const MACRO: &str = "\
# 2 cm gaseous xenon cube at 15 bar
geometry.xe_box.liquid false
geometry.xe_box.pressure 15 bar
geometry.xe_box.length 2 cm
geometry.xe_box.width 2 cm
geometry.xe_box.height 2 cm
";

fn main() -> anyhow::Result<()> {
    init_tracing();
    let params = ParameterSet::parse(MACRO)?;
    let geometry = build_geometry("XeBox", &params)?;

    for region in geometry.regions() {
        let mut rng = StdRng::seed_from_u64(42);
        let points = (0..10_000)
            .map(|_| geometry.generate_vertex(region, &mut rng).map(DVec3::from))
            .collect::<Result<Vec<_>>>()?;
        let m = moments(&points);
        println!("{region}: mean {:.3?} variance {:.3?}", m.mean, m.variance);
        if let Some((lo, hi)) = bounds(&points) {
            println!("{region}: bounds {lo:.3?} .. {hi:.3?}");
        }
    }

    // Uniform on [-10, 10] mm has variance 100/3 per axis.
    println!("expected WHOLE_VOL variance {:.3}", 100.0 / 3.0);
    Ok(())
}
