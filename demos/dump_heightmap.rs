//! Smoke-test entry point: generates an fBm heightmap, runs a hydraulic
//! erosion pass, and writes the result to a raw float file. Not a product
//! CLI — a minimal binary to drive the library end-to-end.

use clap::Parser;
use highmap::algebra::Vec2i;
use highmap::erosion::{hydraulic_particle, HydraulicParticleParams};
use highmap::primitives::{fbm, NoiseFunction};
use highmap::io::write_raw_f32;

#[derive(Parser, Debug)]
struct Args {
    #[arg(long, default_value_t = 256)]
    nx: i32,
    #[arg(long, default_value_t = 256)]
    ny: i32,
    #[arg(long, default_value_t = 0)]
    seed: u32,
    #[arg(long, default_value = "heightmap.raw")]
    output: String,
    #[arg(long, default_value_t = 2000)]
    particles: usize,
}

fn main() {
    highmap::logging::init();
    let args = Args::parse();

    tracing::info!(nx = args.nx, ny = args.ny, seed = args.seed, "generating heightmap");
    let mut z = fbm(
        NoiseFunction::Perlin,
        Vec2i::new(args.nx, args.ny),
        (4.0, 4.0),
        args.seed,
        8,
        0.5,
        2.0,
        None,
    );

    let params = HydraulicParticleParams {
        nparticles: args.particles,
        seed: args.seed as u64,
        ..Default::default()
    };
    let stats = hydraulic_particle(&mut z, &params);
    tracing::info!(
        eroded = stats.eroded,
        deposited = stats.deposited,
        particles_run = stats.particles_run,
        "erosion pass complete"
    );

    write_raw_f32(&z, &args.output).expect("failed to write heightmap");
    tracing::info!(output = %args.output, "wrote heightmap");
}
