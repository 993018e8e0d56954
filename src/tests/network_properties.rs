//! Property tests over randomly generated interaction networks.
//!
//! Invariants that must hold for any valid network:
//! - diffusion keeps levels in [0, 1]
//! - seeded Monte Carlo is reproducible and its summary is ordered
//! - cascade sequences are aligned and non-decreasing
//! - structural metrics stay in range, feedback loops have distinct risks

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use crate::analysis::{
        average_clustering, betweenness_centrality, density, resilience_score, Weighting,
    };
    use crate::network::{DiffusionConfig, DiffusionEngine, RiskNetwork};
    use crate::simulation::{CascadeConfig, CascadeSimulator, MonteCarloAggregator, MonteCarloConfig};
    use crate::types::{ImpactSample, Risk, RiskId, SimulationResult};
    use crate::{FeedbackConfig, FeedbackLoopDetector};

    fn risks(impacts: &[f64]) -> Vec<Risk> {
        impacts
            .iter()
            .enumerate()
            .map(|(i, &impact)| {
                Risk::new(RiskId(i as u32 + 1), format!("risk {i}"), "", "", 0.5, impact)
                    .expect("valid risk")
            })
            .collect()
    }

    fn symmetric(n: usize, upper: &[f64]) -> Vec<Vec<f64>> {
        let mut matrix = vec![vec![0.0; n]; n];
        let mut k = 0;
        for i in 0..n {
            for j in (i + 1)..n {
                matrix[i][j] = upper[k];
                matrix[j][i] = upper[k];
                k += 1;
            }
        }
        matrix
    }

    /// Risk impacts plus a symmetric interaction matrix with some zero entries.
    fn network_input() -> impl Strategy<Value = (Vec<f64>, Vec<Vec<f64>>)> {
        (2_usize..7).prop_flat_map(|n| {
            let pairs = n * (n - 1) / 2;
            (
                prop::collection::vec(0.0_f64..=1.0, n),
                prop::collection::vec(prop_oneof![Just(0.0), 0.0_f64..=1.0], pairs),
            )
                .prop_map(move |(impacts, upper)| (impacts, symmetric(n, &upper)))
        })
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(48))]

        #[test]
        fn diffusion_stays_in_unit_interval((impacts, matrix) in network_input(), alpha in 0.0_f64..5.0) {
            let risks = risks(&impacts);
            let net = RiskNetwork::from_matrix(&risks, matrix).expect("valid network");
            let engine = DiffusionEngine::new(&net, &DiffusionConfig::default().with_alpha(alpha));

            let mut levels = impacts.clone();
            engine.advance(&mut levels, 10).expect("matching length");
            prop_assert!(levels.iter().all(|&v| (0.0..=1.0).contains(&v)));
        }

        #[test]
        fn monte_carlo_is_seeded_and_ordered((impacts, matrix) in network_input(), seed in 0_u64..1_000) {
            let risks = risks(&impacts);
            let net = RiskNetwork::from_matrix(&risks, matrix).expect("valid network");
            let engine = DiffusionEngine::new(&net, &DiffusionConfig::default());
            let config = MonteCarloConfig::default().with_num_simulations(40).with_seed(seed);

            let a = MonteCarloAggregator::new(engine, config.clone()).expect("valid config")
                .aggregate(&risks).expect("aggregate");
            let b = MonteCarloAggregator::new(engine, config).expect("valid config")
                .aggregate(&risks).expect("aggregate");
            prop_assert_eq!(&a, &b);

            prop_assert!(a.min <= a.median + 1e-12);
            prop_assert!(a.median <= a.percentile_95 + 1e-12);
            prop_assert!(a.percentile_95 <= a.max + 1e-12);
            prop_assert!(a.max <= risks.len() as f64 + 1e-12);
        }

        #[test]
        fn cascade_sequences_are_aligned((impacts, matrix) in network_input(), threshold in -0.5_f64..1.5) {
            let risks = risks(&impacts);
            let net = RiskNetwork::from_matrix(&risks, matrix).expect("valid network");
            let engine = DiffusionEngine::new(&net, &DiffusionConfig::default());
            let sim = CascadeSimulator::new(engine, CascadeConfig::default().with_threshold(threshold))
                .expect("valid config");
            let outcome = sim.simulate(&[RiskId(1)]).expect("cascade");

            prop_assert!(outcome.steps <= 10);
            prop_assert!(outcome.activation_of(RiskId(1)).is_some());
            for activation in &outcome.activations {
                prop_assert_eq!(activation.levels.len(), outcome.steps + 1);
                prop_assert!(activation.levels.windows(2).all(|w| w[1] >= w[0]));
                prop_assert!(activation.levels[..activation.activated_at].iter().all(|&v| v == 0.0));
            }

            // A quiescent run has nothing left to activate, whatever the step bound.
            if outcome.quiescent {
                let longer = CascadeSimulator::new(
                    engine,
                    CascadeConfig::default().with_threshold(threshold).with_max_steps(20),
                )
                .expect("valid config")
                .simulate(&[RiskId(1)])
                .expect("cascade");
                prop_assert_eq!(&longer, &outcome);
            }
        }

        #[test]
        fn structural_metrics_are_bounded((impacts, matrix) in network_input()) {
            let risks = risks(&impacts);
            let net = RiskNetwork::from_matrix(&risks, matrix).expect("valid network");

            let d = density(&net);
            prop_assert!((0.0..=1.0).contains(&d));
            for weighting in [Weighting::Unweighted, Weighting::Weighted] {
                let c = average_clustering(&net, weighting);
                prop_assert!((-1e-12..=1.0 + 1e-12).contains(&c));
            }
            prop_assert!(betweenness_centrality(&net).iter().all(|&c| c >= 0.0));
        }

        #[test]
        fn feedback_loops_have_distinct_nodes((impacts, matrix) in network_input()) {
            let risks = risks(&impacts);
            let net = RiskNetwork::from_matrix(&risks, matrix).expect("valid network");
            let loops = FeedbackLoopDetector::new(&net, FeedbackConfig::default())
                .expect("valid config")
                .detect();

            for cycle in &loops.cycles {
                prop_assert!(cycle.len() >= 3);
                let mut sorted = cycle.clone();
                sorted.sort();
                sorted.dedup();
                prop_assert_eq!(sorted.len(), cycle.len());
            }

            // Truncation means loops were dropped, never that the cap was met exactly.
            let total = loops.len();
            let capped = |max_cycles| {
                FeedbackLoopDetector::new(&net, FeedbackConfig::default().with_max_cycles(max_cycles))
                    .expect("valid config")
                    .detect()
            };
            if total > 0 {
                prop_assert!(!capped(total).truncated);
            }
            if total > 1 {
                let short = capped(total - 1);
                prop_assert!(short.truncated);
                prop_assert_eq!(short.len(), total - 1);
            }
        }

        #[test]
        fn resilience_score_penalises_variance(
            impacts in prop::collection::vec(0.01_f64..1.0, 1..8),
            spread in 0.01_f64..2.0,
        ) {
            let samples: Vec<ImpactSample> = impacts
                .iter()
                .enumerate()
                .map(|(i, &v)| ImpactSample::new(RiskId(i as u32), v))
                .collect();
            let calm = SimulationResult::new(vec![1.0, 1.0, 1.0]);
            let noisy = SimulationResult::new(vec![1.0 - spread, 1.0, 1.0 + spread]);

            let calm_score = resilience_score(&samples, &[calm]).expect("positive total");
            let noisy_score = resilience_score(&samples, &[noisy]).expect("positive total");
            prop_assert!(noisy_score < calm_score);
        }
    }
}
