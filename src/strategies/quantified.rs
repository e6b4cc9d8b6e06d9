//! Strategy: quantified enumeration (C6). See SPEC_FULL.md §4.7.

use z3::ast::{forall_const, Ast, Bool, Int};
use z3::SatResult;

use crate::candidates::candidate_index;
use crate::config::EngineConfig;
use crate::encoding::Encoding;
use crate::engine::{new_context, prepare_without_base};
use crate::error::EngineError;
use crate::model::{Tfm, Vars};
use crate::result::AnomalyResult;
use crate::solver::SolverHandle;
use z3::Context;

/// Runs the single ∀-formula enumeration described in SPEC_FULL.md §4.7. Excels on small
/// instances where quantifier elimination is feasible and push/pop overhead would dominate.
///
/// Unlike the grid and speculative strategies, `base` is never asserted on the outer solver
/// here — only `0 ≤ k < n` and the ∀-formula are, since `base` appears solely as the consequent
/// of the quantified formula's negation (SPEC_FULL.md §4.7).
pub fn run(tfm: &Tfm, config: &EngineConfig) -> Result<AnomalyResult, EngineError> {
    let mut tfm = tfm.clone();
    let context = new_context();
    let run = prepare_without_base(&context, &mut tfm);

    if config.non_incremental_solver {
        run.handle.set_non_incremental();
    } else {
        log::debug!("preliminary check");
        run.handle.check();
    }

    let index = candidate_index(&tfm.optional_features);
    let candidates: Vec<(i64, String)> = index
        .iter()
        .flat_map(|(&t, features)| features.iter().map(move |f| (t, f.clone())))
        .collect();
    let n = candidates.len() as i64;

    log::info!(
        "computing dead or false optional features considering {} optional features, {} possibilities",
        tfm.optional_features.len(),
        candidates.len()
    );

    let k = Int::new_const(&context, "_selector");
    run.handle.assert(&k.ge(&Int::from_i64(&context, 0)));
    run.handle.assert(&k.lt(&Int::from_i64(&context, n)));

    let base_conjunction = {
        let refs: Vec<&Bool> = run.assembled.base.iter().collect();
        Bool::and(&context, &refs)
    };
    let bound_dynamics = run.assembled.vars.quantifier_bounds();
    let bounds: Vec<&dyn Ast<'_>> = bound_dynamics.iter().map(|d| d as &dyn Ast<'_>).collect();

    let mut result = AnomalyResult::default();

    log::info!("search for dead features");
    {
        let _frame = run.handle.push();
        let formula = witness_formula(
            &context,
            &run.assembled.vars,
            run.encoding.as_ref(),
            &candidates,
            &k,
            &run.time_context,
            &base_conjunction,
            &bounds,
            true,
        );
        run.handle.assert(&formula);
        enumerate(&run.handle, &context, &candidates, &k, |f, t| {
            result.record_dead(f, t);
        })?;
    }

    log::info!("search for false optional features");
    {
        let formula = witness_formula(
            &context,
            &run.assembled.vars,
            run.encoding.as_ref(),
            &candidates,
            &k,
            &run.time_context,
            &base_conjunction,
            &bounds,
            false,
        );
        run.handle.assert(&formula);
        enumerate(&run.handle, &context, &candidates, &k, |f, t| {
            result.record_false_optional(f, t);
        })?;
    }

    Ok(result)
}

#[allow(clippy::too_many_arguments)]
fn witness_formula<'ctx>(
    ctx: &'ctx Context,
    vars: &Vars<'ctx>,
    encoding: &dyn Encoding,
    candidates: &[(i64, String)],
    k: &Int<'ctx>,
    time_context: &str,
    base_conjunction: &Bool<'ctx>,
    bounds: &[&dyn Ast<'ctx>],
    dead_pass: bool,
) -> Bool<'ctx> {
    let time_var = vars.context(time_context);

    let implications: Vec<Bool<'ctx>> = candidates
        .iter()
        .enumerate()
        .map(|(i, (t, f))| {
            let selector = k._eq(&Int::from_i64(ctx, i as i64));
            let forced_value = if dead_pass {
                encoding.select(ctx, vars, f)
            } else {
                encoding.deselect(ctx, vars, f)
            };
            let forced_time = time_var._eq(&Int::from_i64(ctx, *t));
            let consequence = Bool::and(ctx, &[&forced_value, &forced_time]);
            selector.implies(&consequence)
        })
        .collect();

    let antecedent_refs: Vec<&Bool<'ctx>> = implications.iter().collect();
    let antecedent = Bool::and(ctx, &antecedent_refs);
    let body = antecedent.implies(&base_conjunction.not());

    forall_const(ctx, bounds, &[], &body)
}

fn enumerate<'ctx>(
    handle: &SolverHandle<'ctx>,
    ctx: &'ctx Context,
    candidates: &[(i64, String)],
    k: &Int<'ctx>,
    mut on_found: impl FnMut(&str, i64),
) -> Result<(), EngineError> {
    loop {
        match handle.check() {
            SatResult::Sat => {
                let model = handle.get_model().expect("sat result carries a model");
                let value = model
                    .eval(k, true)
                    .and_then(|v| v.as_i64())
                    .expect("selector must evaluate to an integer");
                let (t, f) = &candidates[value as usize];
                log::debug!("found anomaly: {f} at time {t}");
                on_found(f, *t);
                handle.assert(&k._eq(&Int::from_i64(ctx, value)).not());
            }
            SatResult::Unsat => {
                log::debug!("formula found unsat, enumeration complete");
                return Ok(());
            }
            SatResult::Unknown => return Err(EngineError::IndeterminateSolverResult),
        }
    }
}
