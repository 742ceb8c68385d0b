use std::f64::consts::PI;

use arena_rl::{
    quantizer::{QuantizerConfig, RelativeEncoder, StateEncoder, SurfEncoder},
    waves::WaveTracker,
};
use rand::{Rng, SeedableRng, rngs::StdRng};

mod common;

use common::observation;

fn random_observation(rng: &mut StdRng, time: u64) -> arena_rl::types::Observation {
    let mut obs = observation(
        time,
        rng.random_range(18.0..782.0),
        rng.random_range(18.0..582.0),
        rng.random_range(-PI..PI),
        rng.random_range(0.0..1_200.0),
    );
    obs.me.heading = rng.random_range(0.0..2.0 * PI);
    obs.me.energy = rng.random_range(0.0..100.0);
    obs.opponent.velocity = rng.random_range(-8.0..8.0);
    obs
}

#[test]
fn encoding_is_deterministic() {
    let relative = RelativeEncoder::new(QuantizerConfig::default()).unwrap();
    let surf = SurfEncoder::new(QuantizerConfig::default()).unwrap();
    let waves = WaveTracker::new();
    let mut rng = StdRng::seed_from_u64(11);

    for time in 0..200 {
        let obs = random_observation(&mut rng, time);
        assert_eq!(relative.encode(&obs, &waves), relative.encode(&obs, &waves));
        assert_eq!(surf.encode(&obs, &waves), surf.encode(&obs, &waves));
    }
}

#[test]
fn every_observation_lands_in_the_key_space() {
    let relative = RelativeEncoder::new(QuantizerConfig::default()).unwrap();
    let surf = SurfEncoder::new(QuantizerConfig::default()).unwrap();
    let waves = WaveTracker::new();
    let mut rng = StdRng::seed_from_u64(99);

    let relative_space = relative.key_space();
    let surf_space = surf.key_space();
    for time in 0..2_000 {
        let obs = random_observation(&mut rng, time);
        let state = relative.encode(&obs, &waves);
        assert!(relative_space.contains(state.components()), "{state:?}");
        let state = surf.encode(&obs, &waves);
        assert!(surf_space.contains(state.components()), "{state:?}");
    }
}

#[test]
fn thresholds_split_binary_components() {
    let encoder = RelativeEncoder::new(QuantizerConfig::default()).unwrap();
    let waves = WaveTracker::new();

    let mut obs = observation(1, 400.0, 300.0, 0.0, 200.0);
    obs.opponent.velocity = 0.5;
    obs.me.energy = 30.0;
    let still_and_weak = encoder.encode(&obs, &waves);
    assert_eq!(still_and_weak.components()[2], 0);
    assert_eq!(still_and_weak.components()[5], 0);

    obs.opponent.velocity = 6.0;
    obs.me.energy = 90.0;
    let moving_and_healthy = encoder.encode(&obs, &waves);
    assert_eq!(moving_and_healthy.components()[2], 1);
    assert_eq!(moving_and_healthy.components()[5], 1);
}

#[test]
fn coarser_scale_shrinks_the_key_space() {
    let fine = RelativeEncoder::new(QuantizerConfig::default()).unwrap();
    let coarse = RelativeEncoder::new(QuantizerConfig::default().with_scale(0.005)).unwrap();
    assert!(coarse.key_space().cardinality() < fine.key_space().cardinality());
    assert_eq!(coarse.arity(), fine.arity());
}
