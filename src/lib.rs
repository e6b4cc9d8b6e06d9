//! Dead-feature and false-optional-feature detection for time-aware feature models.
//!
//! Given a time-aware feature model (features, attributes, contexts, opaque constraints, and
//! each optional feature's time ranges) this crate decides, for every `(time, feature)`
//! candidate, whether the feature is dead (never selectable) or false optional (always
//! selected), using one of three interchangeable [`strategies::Strategy`] implementations
//! around a real SMT solver. Parsing feature-model source files, CLI wiring and output
//! transport are the caller's concern; see `SPEC_FULL.md` for the full design.

pub mod candidates;
pub mod config;
pub mod encoding;
pub mod engine;
pub mod error;
pub mod harvest;
pub mod model;
pub mod result;
pub mod solver;
pub mod strategies;

pub use config::EngineConfig;
pub use error::EngineError;
pub use model::{constraint, Bounds, Constraint, Tfm, TimeRange};
pub use result::AnomalyResult;
pub use strategies::Strategy;

use std::io::Write;

/// Runs `strategy` against `tfm` and writes the resulting JSON line to `out`, matching §6's
/// external interface in full (entry point + output sink in one call).
pub fn run_to_writer(
    strategy: Strategy,
    tfm: &Tfm,
    config: &EngineConfig,
    out: &mut impl Write,
) -> Result<(), EngineError> {
    let result = strategy.run(tfm, config)?;
    result.write_to(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use model::FeatureVar;

    fn bool_tfm(features: &[&str]) -> Tfm {
        Tfm::new(features.iter().map(|f| f.to_string()).collect(), true)
    }

    fn not_feature(name: &'static str) -> Constraint {
        constraint(move |_ctx, vars| match vars.feature(name) {
            FeatureVar::Bool(b) => b.not(),
            FeatureVar::Int(_) => unreachable!("test fixtures use boolean encoding"),
        })
    }

    fn or_features(a: &'static str, b: &'static str) -> Constraint {
        constraint(move |ctx, vars| {
            let lhs = match vars.feature(a) {
                FeatureVar::Bool(b) => b.clone(),
                FeatureVar::Int(_) => unreachable!("test fixtures use boolean encoding"),
            };
            let rhs = match vars.feature(b) {
                FeatureVar::Bool(b) => b.clone(),
                FeatureVar::Int(_) => unreachable!("test fixtures use boolean encoding"),
            };
            z3::ast::Bool::or(ctx, &[&lhs, &rhs])
        })
    }

    /// S1 from SPEC_FULL.md §8: a trivially dead feature, no explicit time context.
    #[test]
    fn s1_trivially_dead() {
        let mut tfm = bool_tfm(&["a", "b"]);
        tfm.constraints.push(not_feature("a"));
        tfm.optional_features.insert("a".to_string(), vec![(0, 0)]);
        tfm.optional_features.insert("b".to_string(), vec![(0, 0)]);

        let result = Strategy::Grid.run(&tfm, &EngineConfig::default()).unwrap();

        assert_eq!(result.dead_features.get("a"), Some(&vec![0]));
        assert!(result.false_optionals.is_empty());
    }

    /// S2 from SPEC_FULL.md §8: `a ∨ b`, `¬b` ⇒ `b` dead, `a` false optional.
    #[test]
    fn s2_false_optional() {
        let mut tfm = bool_tfm(&["a", "b"]);
        tfm.constraints.push(or_features("a", "b"));
        tfm.constraints.push(not_feature("b"));
        tfm.optional_features.insert("a".to_string(), vec![(0, 0)]);
        tfm.optional_features.insert("b".to_string(), vec![(0, 0)]);

        let result = Strategy::Grid.run(&tfm, &EngineConfig::default()).unwrap();

        assert_eq!(result.dead_features.get("b"), Some(&vec![0]));
        assert_eq!(result.false_optionals.get("a"), Some(&vec![0]));
    }

    #[test]
    fn no_optional_features_means_no_anomalies() {
        let tfm = bool_tfm(&["a"]);
        let result = Strategy::Grid.run(&tfm, &EngineConfig::default()).unwrap();
        assert!(result.dead_features.is_empty());
        assert!(result.false_optionals.is_empty());
    }

    fn all_strategies() -> [Strategy; 3] {
        [Strategy::Speculative, Strategy::Grid, Strategy::Quantified]
    }

    fn as_sets(result: &AnomalyResult) -> (Vec<(String, i64)>, Vec<(String, i64)>) {
        let mut dead: Vec<(String, i64)> = result
            .dead_features
            .iter()
            .flat_map(|(f, ts)| ts.iter().map(move |t| (f.clone(), *t)))
            .collect();
        let mut false_optional: Vec<(String, i64)> = result
            .false_optionals
            .iter()
            .flat_map(|(f, ts)| ts.iter().map(move |t| (f.clone(), *t)))
            .collect();
        dead.sort();
        false_optional.sort();
        (dead, false_optional)
    }

    /// S3 from SPEC_FULL.md §8: a time-dependent constraint kills `a` only at `T = 1`.
    #[test]
    fn s3_time_dependent() {
        for strategy in all_strategies() {
            let mut tfm = bool_tfm(&["a"]);
            tfm.contexts.insert("T".to_string(), model::Bounds::new(0, 2));
            tfm.time_context = Some("T".to_string());
            tfm.constraints.push(constraint(|ctx, vars| {
                let t = vars.context("T");
                let a = match vars.feature("a") {
                    FeatureVar::Bool(b) => b.clone(),
                    FeatureVar::Int(_) => unreachable!(),
                };
                t._eq(&z3::ast::Int::from_i64(ctx, 1)).implies(&a.not())
            }));
            tfm.optional_features.insert("a".to_string(), vec![(0, 2)]);

            let result = strategy.run(&tfm, &EngineConfig::default()).unwrap();
            let (dead, false_optional) = as_sets(&result);

            assert_eq!(dead, vec![("a".to_string(), 1)], "strategy {strategy:?}");
            assert!(false_optional.is_empty(), "strategy {strategy:?}");
        }
    }

    /// S4 from SPEC_FULL.md §8: many independent optional features, all simultaneously
    /// selectable, must all survive the speculative strategy's batch-collapse loop.
    #[test]
    fn s4_batch_collapse_reports_nothing_dead() {
        let features: Vec<String> = (0..128).map(|i| format!("f{i}")).collect();
        let mut tfm = Tfm::new(features.clone(), true);
        for f in &features {
            tfm.optional_features.insert(f.clone(), vec![(0, 0)]);
        }

        let result = Strategy::Speculative
            .run(&tfm, &EngineConfig::default())
            .unwrap();

        assert!(result.dead_features.is_empty());
        assert!(result.false_optionals.is_empty());
    }

    /// S5 from SPEC_FULL.md §8: a globally unsatisfiable instant reports every candidate as both
    /// dead and false optional (grid search's short-circuit, invariant 4).
    #[test]
    fn s5_globally_unsat_short_circuit() {
        let mut tfm = bool_tfm(&["a", "b"]);
        tfm.constraints
            .push(constraint(|ctx, _vars| z3::ast::Bool::from_bool(ctx, false)));
        tfm.optional_features.insert("a".to_string(), vec![(0, 0)]);
        tfm.optional_features.insert("b".to_string(), vec![(0, 0)]);

        let result = Strategy::Grid.run(&tfm, &EngineConfig::default()).unwrap();

        let (dead, false_optional) = as_sets(&result);
        assert_eq!(dead, vec![("a".to_string(), 0), ("b".to_string(), 0)]);
        assert_eq!(
            false_optional,
            vec![("a".to_string(), 0), ("b".to_string(), 0)]
        );
    }

    /// S6 from SPEC_FULL.md §8: quantified enumeration over three optional features where two
    /// are forced off.
    #[test]
    fn s6_quantified_enumeration() {
        let mut tfm = bool_tfm(&["a", "b", "c"]);
        tfm.constraints.push(not_feature("a"));
        tfm.constraints.push(not_feature("c"));
        tfm.optional_features.insert("a".to_string(), vec![(0, 0)]);
        tfm.optional_features.insert("b".to_string(), vec![(0, 0)]);
        tfm.optional_features.insert("c".to_string(), vec![(0, 0)]);

        let result = Strategy::Quantified
            .run(&tfm, &EngineConfig::default())
            .unwrap();

        let (dead, false_optional) = as_sets(&result);
        assert_eq!(dead, vec![("a".to_string(), 0), ("c".to_string(), 0)]);
        assert!(false_optional.is_empty());
    }

    /// Cross-strategy equivalence (testable property from §8): on an instance where every solver
    /// call returns a definitive sat/unsat, all three strategies agree, modulo list ordering.
    #[test]
    fn cross_strategy_equivalence() {
        let mut tfm = bool_tfm(&["a", "b"]);
        tfm.constraints.push(or_features("a", "b"));
        tfm.constraints.push(not_feature("b"));
        tfm.optional_features.insert("a".to_string(), vec![(0, 0)]);
        tfm.optional_features.insert("b".to_string(), vec![(0, 0)]);

        let results: Vec<AnomalyResult> = all_strategies()
            .into_iter()
            .map(|s| s.run(&tfm, &EngineConfig::default()).unwrap())
            .collect();

        let reference = as_sets(&results[0]);
        for result in &results[1..] {
            assert_eq!(as_sets(result), reference);
        }
    }

    /// Idempotence of the missing time context (testable property from §8): supplying `time = 0`
    /// explicitly produces the same result as leaving the time context unset.
    #[test]
    fn idempotence_of_missing_time_context() {
        let mut implicit = bool_tfm(&["a"]);
        implicit.constraints.push(not_feature("a"));
        implicit.optional_features.insert("a".to_string(), vec![(0, 0)]);

        let mut explicit = implicit.clone();
        explicit.contexts.insert("T".to_string(), model::Bounds::new(0, 0));
        explicit.time_context = Some("T".to_string());

        let implicit_result = Strategy::Grid
            .run(&implicit, &EngineConfig::default())
            .unwrap();
        let explicit_result = Strategy::Grid
            .run(&explicit, &EngineConfig::default())
            .unwrap();

        assert_eq!(as_sets(&implicit_result), as_sets(&explicit_result));
    }
}
