//! The solver capability adapter (C7): the only module that names the z3 crate's raw API.
//!
//! Strategies talk to a [`SolverHandle`] and its scoped [`Frame`] guard; neither type exposes
//! the underlying `z3::Solver` so a future solver swap is contained here.

use z3::ast::Bool;
use z3::{Context, Model, Params, SatResult, Solver};

/// Owns the one SMT solver instance a strategy run drives. Not `Sync`: a host that parallelizes
/// by time instant must give each worker its own [`SolverHandle`] (§9 "Shared mutable state").
pub struct SolverHandle<'ctx> {
    ctx: &'ctx Context,
    solver: Solver<'ctx>,
}

impl<'ctx> SolverHandle<'ctx> {
    pub fn new(ctx: &'ctx Context) -> Self {
        Self {
            ctx,
            solver: Solver::new(ctx),
        }
    }

    pub fn assert(&self, term: &Bool<'ctx>) {
        self.solver.assert(term);
    }

    pub fn check(&self) -> SatResult {
        self.solver.check()
    }

    pub fn get_model(&self) -> Option<Model<'ctx>> {
        self.solver.get_model()
    }

    /// Opens a new assertion-stack frame. The frame is popped when the returned guard is
    /// dropped, on every exit path including early returns and `?` propagation — this is the
    /// scoped-acquisition discipline §9 requires instead of manual push/pop pairing.
    #[must_use]
    pub fn push(&self) -> Frame<'_, 'ctx> {
        self.solver.push();
        Frame { handle: self }
    }

    /// Sets the per-`check` timeout in milliseconds.
    pub fn set_timeout_ms(&self, ms: u32) {
        let mut params = Params::new(self.ctx);
        params.set_u32("timeout", ms);
        self.solver.set_params(&params);
    }

    /// Effectively disables the timeout, for the speculative strategy's singleton step.
    pub fn clear_timeout(&self) {
        self.set_timeout_ms(u32::MAX);
    }

    /// Configures the solver so every `check` forces a fresh, non-incremental solve, per the
    /// `non_incremental_solver` tuning flag (§5).
    pub fn set_non_incremental(&self) {
        let mut params = Params::new(self.ctx);
        params.set_u32("combined_solver.solver2_timeout", 1);
        self.solver.set_params(&params);
    }
}

/// An open assertion-stack frame. Pops on drop.
pub struct Frame<'a, 'ctx> {
    handle: &'a SolverHandle<'ctx>,
}

impl Drop for Frame<'_, '_> {
    fn drop(&mut self) {
        self.handle.solver.pop(1);
    }
}
