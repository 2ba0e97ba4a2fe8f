// Behavioural properties of the simulator, checked across the whole catalog

use approx::relative_eq;
use cameroon_dsge::output::{read_irf_csv, write_irf_csv};
use cameroon_dsge::{DsgeError, ModelConfig, PropagationMode, StateSpaceSimulator, Variable};

fn pure_matrix_complete() -> StateSpaceSimulator {
    let config = ModelConfig {
        propagation: PropagationMode::PureMatrix,
        ..ModelConfig::complete()
    };
    StateSpaceSimulator::new(config).unwrap()
}

#[test]
fn given_any_shock_when_simulated_then_period_zero_is_steady_state() {
    for sim in [StateSpaceSimulator::complete(), StateSpaceSimulator::simple()] {
        for key in sim.catalog().keys() {
            let irf = sim.simulate(key, 0.03, 10).unwrap();
            assert!(
                irf.period(0).unwrap().iter().all(|v| *v == 0.0),
                "{key}: period 0 should be all zeros"
            );
        }
    }
}

#[test]
fn given_any_shock_when_simulated_then_period_one_is_shock_vector() {
    let sim = StateSpaceSimulator::complete();
    for key in sim.catalog().keys() {
        for amplitude in [0.001, 0.02, -0.05, 0.1] {
            let irf = sim.simulate(key, amplitude, 5).unwrap();
            let expected = sim.shock_vector(key, amplitude).unwrap();
            assert_eq!(irf.period(1), Some(&expected), "{key} at {amplitude}");
        }
    }
}

#[test]
fn given_pure_matrix_mode_when_amplitude_scales_then_response_scales() {
    let sim = pure_matrix_complete();
    let a = 0.02;

    for key in sim.catalog().keys() {
        let base = sim.simulate(key, a, 40).unwrap();
        for k in [0.5, 2.0, 10.0] {
            let scaled = sim.simulate(key, k * a, 40).unwrap();
            let expected = base.trajectory().scaled(k);

            for (t, (got, want)) in scaled
                .trajectory()
                .states()
                .iter()
                .zip(expected.states())
                .enumerate()
            {
                for (x, y) in got.iter().zip(want) {
                    assert!(
                        relative_eq!(*x, *y, epsilon = 1e-12, max_relative = 1e-9),
                        "{key}, k={k}, period {t}: {x} vs {y}"
                    );
                }
            }
        }
    }
}

#[test]
fn given_persistence_decay_when_compared_to_pure_matrix_then_never_larger_after_period_8() {
    let decay = StateSpaceSimulator::complete();
    let pure = pure_matrix_complete();

    for key in decay.catalog().keys() {
        let damped = decay.simulate(key, 0.02, 40).unwrap();
        let undamped = pure.simulate(key, 0.02, 40).unwrap();

        for t in 8..40 {
            let d = damped.period(t).unwrap();
            let p = undamped.period(t).unwrap();
            for (i, (x, y)) in d.iter().zip(p).enumerate() {
                assert!(
                    x.abs() <= y.abs() * (1.0 + 1e-9),
                    "{key}, period {t}, {}: {x} vs {y}",
                    Variable::ALL[i]
                );
            }
        }

        // The gap widens: damping compounds period after period
        let ratio = |t: usize| {
            damped.trajectory().states()[t]
                .iter()
                .map(|v| v.abs())
                .sum::<f64>()
                / undamped.trajectory().states()[t]
                    .iter()
                    .map(|v| v.abs())
                    .sum::<f64>()
        };
        assert!(ratio(39) < ratio(8), "{key}");
    }
}

#[test]
fn given_monetary_shock_of_two_percent_then_impact_matches_coefficients() {
    let sim = StateSpaceSimulator::complete();
    let irf = sim.simulate("monetary", 0.02, 40).unwrap();

    assert_eq!(irf.horizon(), 40);
    assert!(irf.period(0).unwrap().iter().all(|v| *v == 0.0));

    let impact = irf.period(1).unwrap();
    for variable in Variable::ALL {
        let expected = match variable {
            Variable::InterestRate => 0.02,
            Variable::Credit => -0.016,
            Variable::Investment => -0.012,
            _ => 0.0,
        };
        assert!(
            (impact[variable.index()] - expected).abs() < 1e-15,
            "{variable}: {}",
            impact[variable.index()]
        );
    }
}

#[test]
fn given_unknown_shock_then_invalid_shock_type() {
    let sim = StateSpaceSimulator::complete();
    match sim.simulate("earthquake", 0.02, 40) {
        Err(DsgeError::InvalidShockType { key }) => assert_eq!(key, "earthquake"),
        other => panic!("Expected InvalidShockType, got {other:?}"),
    }

    // Complete-only shocks are unknown to the simple model
    let simple = StateSpaceSimulator::simple();
    assert!(simple.simulate("markup", 0.02, 40).is_err());
}

#[test]
fn given_variance_decomposition_then_rows_sum_to_one_for_each_horizon() {
    let sim = StateSpaceSimulator::complete();
    for h in [4, 20, 40] {
        let table = sim.variance_decomposition(h).unwrap();
        assert_eq!(table.horizon, h);
        for (variable, row) in table.rows() {
            let total: f64 = row.iter().sum();
            assert!((total - 1.0).abs() < 1e-9, "h={h}, {variable}: {total}");
        }
    }
}

#[test]
fn given_same_horizon_then_variance_decomposition_is_identical() {
    let sim = StateSpaceSimulator::complete();
    assert_eq!(
        sim.variance_decomposition(20).unwrap(),
        sim.variance_decomposition(20).unwrap()
    );

    // An independently built engine with the same config agrees too
    let other = StateSpaceSimulator::new(ModelConfig::complete()).unwrap();
    assert_eq!(
        sim.variance_decomposition(20).unwrap(),
        other.variance_decomposition(20).unwrap()
    );
}

#[test]
fn given_different_seed_then_variance_noise_changes() {
    let config = ModelConfig {
        variance_seed: 7,
        ..ModelConfig::complete()
    };
    let reseeded = StateSpaceSimulator::new(config).unwrap();
    let baseline = StateSpaceSimulator::complete();

    assert_ne!(
        reseeded.variance_decomposition(20).unwrap(),
        baseline.variance_decomposition(20).unwrap()
    );
}

#[test]
fn given_historical_decomposition_then_repeated_calls_match() {
    let sim = StateSpaceSimulator::complete();
    let a = sim.historical_decomposition(24).unwrap();
    let b = sim.historical_decomposition(24).unwrap();
    assert_eq!(a, b);
    assert_eq!(a.observed_output.len(), 24);
}

#[test]
fn given_n_draws_then_every_parameter_has_n_samples() {
    let sim = StateSpaceSimulator::complete();
    for n in [1, 10, 1000] {
        let set = sim.sample_posteriors(n).unwrap();
        assert_eq!(set.len(), 15);
        assert!(set.iter().all(|d| d.samples.len() == n));
    }

    assert!(matches!(
        sim.sample_posteriors(0),
        Err(DsgeError::InvalidDrawCount { draws: 0 })
    ));
}

#[test]
fn given_many_draws_then_sample_means_approach_declared_means() {
    let sim = StateSpaceSimulator::complete();
    let summaries = sim.sample_posteriors(5000).unwrap().summaries();

    let close = summaries
        .iter()
        .filter(|s| {
            let declared = sim.parameters().get(&s.name).unwrap().mean;
            ((s.mean - declared) / declared).abs() < 0.05
        })
        .count();

    assert!(
        close as f64 >= 0.9 * summaries.len() as f64,
        "Only {close} of {} parameter means within 5%",
        summaries.len()
    );
    for s in &summaries {
        assert!(s.p5 <= s.mean && s.mean <= s.p95, "{}", s.name);
    }
}

#[test]
fn given_csv_export_when_reparsed_then_values_match_to_four_decimals() {
    let sim = StateSpaceSimulator::complete();
    for key in ["monetary", "oil_price", "financial"] {
        let irf = sim.simulate(key, 0.02, 40).unwrap();

        let mut buf = Vec::new();
        write_irf_csv(&irf, &mut buf).unwrap();
        let parsed = read_irf_csv(buf.as_slice()).unwrap();

        assert_eq!(parsed.len(), 40);
        for (t, (original, read)) in irf
            .trajectory()
            .states()
            .iter()
            .zip(parsed.states())
            .enumerate()
        {
            for (x, y) in original.iter().zip(read) {
                assert!(
                    (x - y).abs() <= 0.5e-4 * (1.0 + 1e-9),
                    "{key}, period {t}: {x} vs {y}"
                );
                assert_eq!(format!("{x:.4}"), format!("{y:.4}"));
            }
        }
    }
}

#[test]
fn given_parallel_batch_then_matches_sequential_simulation() {
    let sim = StateSpaceSimulator::complete();
    let batch = sim.impulse_responses(0.02, 40).unwrap();

    let sequential: Vec<_> = sim
        .catalog()
        .keys()
        .map(|key| sim.simulate(key, 0.02, 40).unwrap())
        .collect();
    assert_eq!(batch, sequential);
}
