//! Builds a toy time-aware feature model in-process and runs the grid strategy against it,
//! printing the anomaly result to stdout. Not a general CLI — parsing real feature-model
//! source files and argument handling are out of scope for this crate.

use std::io;

use tfm_anomaly::model::FeatureVar;
use tfm_anomaly::{constraint, EngineConfig, Strategy, Tfm};

fn main() {
    env_logger::init();

    // features {a, b}, constraint a \/ b, additional constraint not(b)
    // => b is dead, a is false optional, both at time 0 (matches SPEC_FULL.md S2).
    let mut tfm = Tfm::new(vec!["a".to_string(), "b".to_string()], true);

    tfm.constraints.push(constraint(|ctx, vars| {
        let a = match vars.feature("a") {
            FeatureVar::Bool(b) => b.clone(),
            FeatureVar::Int(_) => unreachable!(),
        };
        let b = match vars.feature("b") {
            FeatureVar::Bool(b) => b.clone(),
            FeatureVar::Int(_) => unreachable!(),
        };
        z3::ast::Bool::or(ctx, &[&a, &b])
    }));
    tfm.constraints.push(constraint(|_ctx, vars| match vars.feature("b") {
        FeatureVar::Bool(b) => b.not(),
        FeatureVar::Int(_) => unreachable!(),
    }));

    tfm.optional_features.insert("a".to_string(), vec![(0, 0)]);
    tfm.optional_features.insert("b".to_string(), vec![(0, 0)]);

    let result = match Strategy::Grid.run(&tfm, &EngineConfig::default()) {
        Ok(result) => result,
        Err(err) => {
            eprintln!("anomaly analysis failed: {err}");
            std::process::exit(1);
        }
    };

    let stdout = io::stdout();
    let mut lock = stdout.lock();
    if let Err(err) = result.write_to(&mut lock) {
        eprintln!("failed to write result: {err}");
        std::process::exit(1);
    }
}
