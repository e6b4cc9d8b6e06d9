//! Strategy: optimized/speculative batched search (C4). See SPEC_FULL.md §4.5.

use std::collections::BTreeSet;

use z3::ast::{Ast, Bool, Int};
use z3::SatResult;

use crate::candidates::candidate_index;
use crate::config::EngineConfig;
use crate::encoding::Encoding;
use crate::engine::{new_context, prepare};
use crate::error::EngineError;
use crate::harvest::harvest;
use crate::model::{Tfm, Vars};
use crate::result::AnomalyResult;
use crate::solver::SolverHandle;
use z3::Context;

/// Runs the batched-candidate dead/false-optional search described in SPEC_FULL.md §4.5.
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

        if !config.non_incremental_solver {
            log::debug!("preliminary check");
            run.handle.check();
        }

        let mut dead: BTreeSet<String> = candidates.clone();
        let mut false_optional: BTreeSet<String> = candidates.clone();

        {
            let _dead_frame = run.handle.push();
            run_dead_loop(
                &run.handle,
                &context,
                run.encoding.as_ref(),
                &run.assembled.vars,
                config,
                t,
                &mut dead,
                &mut false_optional,
                &mut result,
            );
        }

        {
            let _false_frame = run.handle.push();
            run_false_optional_loop(
                &run.handle,
                &context,
                run.encoding.as_ref(),
                &run.assembled.vars,
                t,
                &mut false_optional,
                &mut result,
            );
        }
    }

    Ok(result)
}

fn run_dead_loop<'ctx>(
    handle: &SolverHandle<'ctx>,
    ctx: &'ctx Context,
    encoding: &dyn Encoding,
    vars: &Vars<'ctx>,
    config: &EngineConfig,
    t: i64,
    dead: &mut BTreeSet<String>,
    false_optional: &mut BTreeSet<String>,
    result: &mut AnomalyResult,
) {
    let mut batch = starting_batch(config.starting_batch, dead.len());

    while !dead.is_empty() {
        log::debug!(
            "{} ({}) dead (false optional) features to check, batch {}",
            dead.len(),
            false_optional.len(),
            batch
        );

        if batch == 1 {
            handle.clear_timeout();
            let terms: Vec<Bool<'ctx>> = dead.iter().map(|f| encoding.selected_term(ctx, vars, f)).collect();
            let refs: Vec<&Bool<'ctx>> = terms.iter().collect();
            handle.assert(&Bool::or(ctx, &refs));

            match handle.check() {
                SatResult::Unsat => {
                    for f in dead.iter() {
                        result.record_dead(f, t);
                    }
                    for f in dead.iter() {
                        false_optional.remove(f);
                    }
                    dead.clear();
                }
                SatResult::Sat => {
                    let model = handle.get_model().expect("sat result carries a model");
                    let (dead_remove, false_remove) =
                        harvest(encoding, ctx, vars, &model, dead, false_optional);
                    for f in &dead_remove {
                        dead.remove(f);
                    }
                    for f in &false_remove {
                        false_optional.remove(f);
                    }
                    batch = starting_batch(config.starting_batch, dead.len());
                }
                SatResult::Unknown => {
                    log::debug!("execution not terminated within the timeout, moving on");
                }
            }
        } else {
            let _frame = handle.push();
            handle.set_timeout_ms(config.batch_timeout_ms);
            log::debug!("attempt to prune {batch} features at once");
            handle.assert(&encoding.build_pbge(ctx, vars, dead, batch as i32));

            match handle.check() {
                SatResult::Unsat => {
                    batch = (batch / 2).max(1);
                }
                SatResult::Sat => {
                    let model = handle.get_model().expect("sat result carries a model");
                    let (dead_remove, false_remove) =
                        harvest(encoding, ctx, vars, &model, dead, false_optional);
                    for f in &dead_remove {
                        dead.remove(f);
                    }
                    for f in &false_remove {
                        false_optional.remove(f);
                    }
                    batch = starting_batch(config.starting_batch, dead.len()).min(batch);
                }
                SatResult::Unknown => {
                    log::debug!("execution not terminated within the timeout, moving on");
                    batch = (batch / 2).max(1);
                }
            }
        }
    }
}

fn run_false_optional_loop<'ctx>(
    handle: &SolverHandle<'ctx>,
    ctx: &'ctx Context,
    encoding: &dyn Encoding,
    vars: &Vars<'ctx>,
    t: i64,
    false_optional: &mut BTreeSet<String>,
    result: &mut AnomalyResult,
) {
    while !false_optional.is_empty() {
        log::debug!("{} false optional features to check", false_optional.len());
        let terms: Vec<Bool<'ctx>> = false_optional
            .iter()
            .map(|f| encoding.deselect(ctx, vars, f))
            .collect();
        let refs: Vec<&Bool<'ctx>> = terms.iter().collect();
        handle.assert(&Bool::or(ctx, &refs));

        match handle.check() {
            SatResult::Unsat => {
                for f in false_optional.iter() {
                    result.record_false_optional(f, t);
                }
                false_optional.clear();
            }
            SatResult::Sat => {
                let model = handle.get_model().expect("sat result carries a model");
                let empty = BTreeSet::new();
                let (_, false_remove) = harvest(encoding, ctx, vars, &model, &empty, false_optional);
                for f in &false_remove {
                    false_optional.remove(f);
                }
            }
            SatResult::Unknown => {
                log::debug!("execution not terminated within the timeout, moving on");
            }
        }
    }
}

fn starting_batch(starting_batch: u32, remaining: usize) -> u32 {
    starting_batch.min(((remaining as u32) / 2).max(1))
}
