use std::thread;

use detgeo::prelude::*;
use detgeo_examples::{build_geometry, init_tracing};

const EVENTS: u64 = 20_000;
const WORKERS: u64 = 4;
const BINS: usize = 10;

fn main() -> anyhow::Result<()> {
    init_tracing();
    let params = ParameterSet::parse(
        "geometry.optical_fibre.num_fibers 9\n\
         geometry.optical_fibre.core_mat Y11\n\
         geometry.optical_fibre.fiber_dist 0.2 mm\n\
         generator.alpha.region FIBER\n\
         generator.alpha.energy_low 4 MeV\n\
         generator.alpha.energy_high 6 MeV\n",
    )?;
    let geometry = build_geometry("OpticalFibre", &params)?;
    let mut generator = GeneratorRegistry::with_builtin_generators()?.create("AlphaGenerator")?;
    generator.configure(&params)?;

    // Each event has its own stream, so the split over workers does not matter.
    let per_worker = EVENTS / WORKERS;
    let energies = thread::scope(|s| -> anyhow::Result<Vec<f64>> {
        let workers: Vec<_> = (0..WORKERS)
            .map(|w| {
                let geometry = geometry.as_ref();
                let generator = generator.as_ref();
                s.spawn(move || -> Result<Vec<f64>> {
                    (w * per_worker..(w + 1) * per_worker)
                        .map(|event| {
                            let mut rng = event_rng(DEFAULT_SEED, event);
                            let vertex = generator.generate_primary_vertex(geometry, &mut rng)?;
                            Ok(vertex.particles[0].kinetic_energy)
                        })
                        .collect()
                })
            })
            .collect();
        let mut all = Vec::new();
        for worker in workers {
            let chunk = worker
                .join()
                .map_err(|_| anyhow::anyhow!("worker panicked"))??;
            all.extend(chunk);
        }
        Ok(all)
    })?;

    let mut histogram = [0usize; BINS];
    for e in &energies {
        let bin = (((e - 4.0) / 2.0) * BINS as f64) as usize;
        histogram[bin.min(BINS - 1)] += 1;
    }
    println!("alpha kinetic energy, {} events:", energies.len());
    for (i, count) in histogram.iter().enumerate() {
        let lo = 4.0 + 2.0 * i as f64 / BINS as f64;
        println!("{lo:5.2} MeV | {}", "#".repeat(count / 50));
    }
    Ok(())
}
