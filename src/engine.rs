//! Shared per-run setup used by every strategy: resolving the time context, picking the
//! encoding, assembling the base formula, and opening the solver.

use z3::{Config, Context};

use crate::encoding::{select_encoding, Encoding};
use crate::model::{assemble, Assembled, Tfm};
use crate::solver::SolverHandle;

pub struct Run<'ctx> {
    pub time_context: String,
    pub encoding: Box<dyn Encoding>,
    pub assembled: Assembled<'ctx>,
    pub handle: SolverHandle<'ctx>,
}

/// Resolves the time context on `tfm`, assembles the base formula against `ctx`, asserts it on
/// a fresh solver, and returns everything a strategy needs to drive its search (C1-C3 shared
/// setup). Used by the grid and speculative strategies, which check `base ∧ time=t ∧ ...`
/// directly on the solver.
pub fn prepare<'ctx>(ctx: &'ctx Context, tfm: &mut Tfm) -> Run<'ctx> {
    let (assembled, handle, time_context, encoding) = prepare_inner(ctx, tfm);
    for assertion in &assembled.base {
        handle.assert(assertion);
    }
    Run {
        time_context,
        encoding,
        assembled,
        handle,
    }
}

/// Same setup as [`prepare`], but leaves the base formula unasserted on the solver. The
/// quantified strategy (C6) needs `base` only as the consequent of its ∀-formula's negation,
/// never asserted on its own — asserting it here would make a globally-unsatisfiable TFM fail
/// the outer `check()` before enumeration even starts, short-circuiting to no anomalies instead
/// of "every candidate is dead" like the grid and speculative strategies report.
pub fn prepare_without_base<'ctx>(ctx: &'ctx Context, tfm: &mut Tfm) -> Run<'ctx> {
    let (assembled, handle, time_context, encoding) = prepare_inner(ctx, tfm);
    Run {
        time_context,
        encoding,
        assembled,
        handle,
    }
}

fn prepare_inner<'ctx>(
    ctx: &'ctx Context,
    tfm: &mut Tfm,
) -> (Assembled<'ctx>, SolverHandle<'ctx>, String, Box<dyn Encoding>) {
    let time_context = tfm.resolve_time_context();
    let encoding = select_encoding(tfm.features_as_boolean);
    let assembled = assemble(ctx, tfm);
    let handle = SolverHandle::new(ctx);
    (assembled, handle, time_context, encoding)
}

/// A fresh, default-configured z3 context. Strategies each own one per run (§9).
pub fn new_context() -> Context {
    Context::new(&Config::new())
}
