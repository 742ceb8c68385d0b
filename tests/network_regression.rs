use arena_rl::nn::{
    Activation, ConnectionWeight, NetworkConfig, NetworkSnapshot, NeuralNet, Trainer,
    TrainerConfig, UpdateMode, xor_patterns,
};

fn unipolar_xor_net(seed: u64) -> NeuralNet {
    NeuralNet::new(
        NetworkConfig::new(2, 4, 1)
            .with_learning_rate(0.2)
            .with_momentum(0.9)
            .with_seed(seed),
    )
    .unwrap()
}

#[test]
fn constant_weights_reproduce_reference_outputs() {
    let mut net = unipolar_xor_net(0);
    net.set_all_weights(0.2);

    let origin = out_of(&net, [0.0, 0.0]);
    assert!((0.65..=0.67).contains(&origin));
    assert!((origin - 0.6547).abs() < 1e-3);
    assert!((out_of(&net, [0.0, 1.0]) - 0.6635).abs() < 1e-3);
    assert!((out_of(&net, [1.0, 0.0]) - 0.6635).abs() < 1e-3);
    assert!((out_of(&net, [1.0, 1.0]) - 0.6718).abs() < 1e-3);

    net.set_all_weights(0.0);
    for input in [[0.0, 0.0], [0.0, 1.0], [1.0, 1.0]] {
        assert_eq!(out_of(&net, input), 0.5);
    }
}

fn out_of(net: &NeuralNet, input: [f64; 2]) -> f64 {
    net.output_for(&input).unwrap()[0]
}

#[test]
fn sigmoid_reference_values() {
    assert!((Activation::Unipolar.apply(1.0) - 0.731059).abs() < 1e-3);
    assert!((Activation::Bipolar.apply(1.0) - 0.462117).abs() < 1e-3);
}

#[test]
fn unipolar_xor_converges_for_some_seed() {
    let trainer = Trainer::new(TrainerConfig::default()).unwrap();
    let samples = xor_patterns(Activation::Unipolar);

    let converged: Vec<u64> = (0..10)
        .filter(|&seed| {
            let mut net = unipolar_xor_net(seed);
            trainer.fit(&mut net, &samples).unwrap().converged
        })
        .collect();
    assert!(!converged.is_empty(), "no seed in 0..10 learned XOR");

    let mut net = unipolar_xor_net(converged[0]);
    let report = trainer.fit(&mut net, &samples).unwrap();
    assert!(report.final_error <= 0.05);
    assert!(report.epochs <= 10_000);
    for sample in &samples {
        let output = net.output_for(&sample.input).unwrap()[0];
        assert!((output - sample.target[0]).abs() < 0.25);
    }
}

#[test]
fn bipolar_xor_converges_for_some_seed() {
    let trainer = Trainer::new(TrainerConfig::default()).unwrap();
    let samples = xor_patterns(Activation::Bipolar);
    let any = (0..10).any(|seed| {
        let mut net = NeuralNet::new(
            NetworkConfig::default()
                .with_activation(Activation::Bipolar)
                .with_seed(seed),
        )
        .unwrap();
        trainer.fit(&mut net, &samples).unwrap().converged
    });
    assert!(any);
}

#[test]
fn training_is_deterministic_for_a_seed() {
    let trainer = Trainer::new(TrainerConfig::default().with_max_epochs(200)).unwrap();
    let samples = xor_patterns(Activation::Unipolar);

    let mut a = unipolar_xor_net(4);
    let mut b = unipolar_xor_net(4);
    let ra = trainer.fit(&mut a, &samples).unwrap();
    let rb = trainer.fit(&mut b, &samples).unwrap();
    assert_eq!(ra.errors, rb.errors);
    assert_eq!(a.weights(), b.weights());
}

#[test]
fn batch_mode_error_decreases() {
    let config = NetworkConfig::default()
        .with_update_mode(UpdateMode::Batch)
        .with_momentum(0.5)
        .with_seed(1);
    let mut net = NeuralNet::new(config).unwrap();
    let trainer = Trainer::new(
        TrainerConfig::default()
            .with_max_epochs(500)
            .with_target_error(0.0),
    )
    .unwrap();
    let report = trainer
        .fit(&mut net, &xor_patterns(Activation::Unipolar))
        .unwrap();
    assert_eq!(report.epochs, 500);
    assert!(report.errors[499] < report.errors[0]);
}

#[test]
fn weights_are_addressed_by_layer_and_endpoints() {
    let mut net = unipolar_xor_net(0);
    net.set_all_weights(0.0);
    // Every hidden unit outputs σ(0) = 0.5 into four 0.5 weights
    let hidden_to_output: Vec<ConnectionWeight> = (1..=4)
        .map(|from| ConnectionWeight {
            layer: 1,
            from,
            to: 0,
            weight: 0.5,
        })
        .collect();
    net.set_weights(&hidden_to_output).unwrap();
    let expected = Activation::Unipolar.apply(4.0 * 0.5 * 0.5);
    assert!((out_of(&net, [1.0, 1.0]) - expected).abs() < 1e-12);
}

#[test]
fn snapshot_roundtrip_preserves_outputs() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("xor.json");

    let trainer = Trainer::new(TrainerConfig::default().with_max_epochs(300)).unwrap();
    let mut net = unipolar_xor_net(6);
    trainer
        .fit(&mut net, &xor_patterns(Activation::Unipolar))
        .unwrap();

    NetworkSnapshot::from_network(&net).save_to_file(&path).unwrap();
    let restored = NetworkSnapshot::load_from_file(&path)
        .unwrap()
        .into_network()
        .unwrap();
    assert_eq!(restored.weights(), net.weights());
    for input in [[0.0, 0.0], [0.0, 1.0], [1.0, 0.0], [1.0, 1.0]] {
        assert_eq!(out_of(&restored, input), out_of(&net, input));
    }
}
