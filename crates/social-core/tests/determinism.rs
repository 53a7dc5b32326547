//! Determinism verification tests
//!
//! Tests to ensure the simulation produces identical results given the same seed.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use social_core::{PersonalityCatalog, SimConfig, Simulation, WorldBounds};

fn config(seed: u64, population: usize) -> SimConfig {
    let mut config = SimConfig::default();
    config.world.seed = seed;
    config.world.population = population;
    config
}

fn run(seed: u64, ticks: u64) -> Simulation {
    let mut sim = Simulation::new(&config(seed, 150), PersonalityCatalog::builtin()).unwrap();
    for _ in 0..ticks {
        sim.step(1.0).unwrap();
    }
    sim
}

/// Test that SmallRng produces identical sequences with the same seed
#[test]
fn test_rng_determinism() {
    let mut rng1 = SmallRng::seed_from_u64(42);
    let values1: Vec<f64> = (0..100).map(|_| rng1.gen()).collect();

    let mut rng2 = SmallRng::seed_from_u64(42);
    let values2: Vec<f64> = (0..100).map(|_| rng2.gen()).collect();

    assert_eq!(values1, values2, "RNG sequences should be identical with same seed");
}

/// Same seed, same ticks: identical populations and metrics
#[test]
fn test_simulation_determinism() {
    let a = run(42, 300);
    let b = run(42, 300);

    assert_eq!(a.population(), b.population());
    assert_eq!(a.metrics_snapshot(), b.metrics_snapshot());
}

/// Different seeds diverge
#[test]
fn test_different_seeds_diverge() {
    let a = run(42, 50);
    let b = run(43, 50);
    assert_ne!(a.population(), b.population());
}

/// Reset reseeds, so a reset world replays the same run
#[test]
fn test_reset_replays_run() {
    let mut sim = Simulation::new(&config(7, 120), PersonalityCatalog::builtin()).unwrap();
    for _ in 0..100 {
        sim.step(1.0).unwrap();
    }
    let first = sim.population().to_vec();

    sim.reset(WorldBounds::default()).unwrap();
    for _ in 0..100 {
        sim.step(1.0).unwrap();
    }
    assert_eq!(sim.population(), first.as_slice());
}

/// Operator perturbations draw from the same stream
#[test]
fn test_glitch_determinism() {
    let mut a = run(9, 20);
    let mut b = run(9, 20);
    assert_eq!(a.trigger_glitch(), b.trigger_glitch());
    for _ in 0..20 {
        a.step(1.0).unwrap();
        b.step(1.0).unwrap();
    }
    assert_eq!(a.population(), b.population());
}
