//! Model harvest (C3): pruning pending candidates from one satisfying assignment.

use std::collections::BTreeSet;

use z3::Context;
use z3::Model;

use crate::encoding::Encoding;
use crate::model::Vars;

/// Given a satisfying model `M` and the pending dead/false-optional candidate sets, returns the
/// subsets the model already disproves: `dead_remove = { f in dead : M(f) = 1 }` and
/// `false_remove = { f in false_optional : M(f) = 0 }`. A single model informs both sets at
/// once, so callers should never recompute the model per set (§9 "Harvest reuse policy").
pub fn harvest<'ctx>(
    encoding: &dyn Encoding,
    ctx: &'ctx Context,
    vars: &Vars<'ctx>,
    model: &Model<'ctx>,
    dead: &BTreeSet<String>,
    false_optional: &BTreeSet<String>,
) -> (Vec<String>, Vec<String>) {
    let mut dead_remove = Vec::new();
    for feature in dead {
        let term = encoding.selected_term(ctx, vars, feature);
        if model
            .eval(&term, true)
            .and_then(|v| v.as_bool())
            .unwrap_or(false)
        {
            dead_remove.push(feature.clone());
        }
    }

    let mut false_remove = Vec::new();
    for feature in false_optional {
        let term = encoding.deselect(ctx, vars, feature);
        if model
            .eval(&term, true)
            .and_then(|v| v.as_bool())
            .unwrap_or(false)
        {
            false_remove.push(feature.clone());
        }
    }

    log::debug!(
        "removed {} ({}) dead (false optional) checks",
        dead_remove.len(),
        false_remove.len()
    );

    (dead_remove, false_remove)
}
