//! Strategy: grid search (C5). See SPEC_FULL.md §4.6.

use z3::ast::{Ast, Int};
use z3::SatResult;

use crate::candidates::candidate_index;
use crate::config::EngineConfig;
use crate::engine::{new_context, prepare};
use crate::error::EngineError;
use crate::harvest::harvest;
use crate::model::Tfm;
use crate::result::AnomalyResult;

/// Runs the per-candidate push/pop search described in SPEC_FULL.md §4.6. Simpler and more
/// robust than the speculative strategy on instances where producing a model is expensive,
/// since it only ever harvests a model once per time instant.
pub fn run(tfm: &Tfm, config: &EngineConfig) -> Result<AnomalyResult, EngineError> {
    let mut tfm = tfm.clone();
    let context = new_context();
    let run = prepare(&context, &mut tfm);

    if config.non_incremental_solver {
        run.handle.set_non_incremental();
    } else {
        log::debug!("preliminary check");
        run.handle.check();
    }

    let index = candidate_index(&tfm.optional_features);
    log::info!(
        "features to check: {}, time instants: {}",
        tfm.optional_features.len(),
        index.len()
    );

    let mut result = AnomalyResult::default();

    for (&t, candidates) in &index {
        log::debug!("processing time instant {t}, features to check {}", candidates.len());
        let _instant_frame = run.handle.push();
        run.handle.assert(
            &run.assembled
                .vars
                .context(&run.time_context)
                ._eq(&Int::from_i64(&context, t)),
        );

        let mut dead = candidates.clone();
        let mut false_optional = candidates.clone();

        match run.handle.check() {
            SatResult::Unsat => {
                log::debug!("all instances are dead for time {t}");
                for f in &dead {
                    result.record_dead(f, t);
                    result.record_false_optional(f, t);
                }
                continue;
            }
            SatResult::Sat => {
                let model = run.handle.get_model().expect("sat result carries a model");
                let (dead_remove, false_remove) = harvest(
                    run.encoding.as_ref(),
                    &context,
                    &run.assembled.vars,
                    &model,
                    &dead,
                    &false_optional,
                );
                for f in &dead_remove {
                    dead.remove(f);
                }
                for f in &false_remove {
                    false_optional.remove(f);
                }
            }
            SatResult::Unknown => return Err(EngineError::IndeterminateSolverResult),
        }

        log::debug!("checking for dead features");
        let mut remaining = dead.len();
        for f in dead.iter() {
            log::debug!("processing feature {f}, remaining {remaining}");
            remaining -= 1;
            let _frame = run.handle.push();
            run.handle
                .assert(&run.encoding.select(&context, &run.assembled.vars, f));
            match run.handle.check() {
                SatResult::Unsat => {
                    log::debug!("{f} is a dead feature");
                    result.record_dead(f, t);
                    false_optional.remove(f);
                }
                SatResult::Sat => {}
                SatResult::Unknown => return Err(EngineError::IndeterminateSolverResult),
            }
        }

        log::debug!("checking for false optional features");
        let mut remaining = false_optional.len();
        for f in false_optional.iter() {
            log::debug!("processing feature {f}, remaining {remaining}");
            remaining -= 1;
            let _frame = run.handle.push();
            run.handle
                .assert(&run.encoding.deselect(&context, &run.assembled.vars, f));
            match run.handle.check() {
                SatResult::Unsat => {
                    log::debug!("{f} is a false optional feature");
                    result.record_false_optional(f, t);
                }
                SatResult::Sat => {}
                SatResult::Unknown => return Err(EngineError::IndeterminateSolverResult),
            }
        }
    }

    Ok(result)
}
