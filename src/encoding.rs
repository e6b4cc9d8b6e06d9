//! The boolean-vs-integer-in-{0,1} feature encoding capability (C8).
//!
//! Every strategy calls only [`Encoding::select`], [`Encoding::deselect`],
//! [`Encoding::selected_term`] and [`Encoding::build_pbge`]; the two implementations below are
//! the only place that knows which z3 theory backs a feature.

use std::collections::BTreeSet;

use z3::ast::{Ast, Bool, Int};
use z3::Context;

use crate::model::{FeatureVar, Vars};

/// Abstracts the boolean/integer feature encoding switch behind four primitives.
pub trait Encoding: Send + Sync {
    /// The term that is true exactly when `feature` is selected in a given model. Also used
    /// directly as the assertion "`feature` is selected" (grid search's single-candidate check,
    /// and the speculative strategy's singleton disjunction).
    fn selected_term<'ctx>(&self, ctx: &'ctx Context, vars: &Vars<'ctx>, feature: &str) -> Bool<'ctx>;

    /// The term/assertion that `feature` is deselected.
    fn deselect<'ctx>(&self, ctx: &'ctx Context, vars: &Vars<'ctx>, feature: &str) -> Bool<'ctx>;

    /// At least `k` of `candidates` are selected simultaneously.
    fn build_pbge<'ctx>(
        &self,
        ctx: &'ctx Context,
        vars: &Vars<'ctx>,
        candidates: &BTreeSet<String>,
        k: i32,
    ) -> Bool<'ctx>;

    /// Alias for [`Encoding::selected_term`], named to match the assertion use (select `feature`).
    fn select<'ctx>(&self, ctx: &'ctx Context, vars: &Vars<'ctx>, feature: &str) -> Bool<'ctx> {
        self.selected_term(ctx, vars, feature)
    }
}

fn pbge_terms<'ctx>(
    encoding: &dyn Encoding,
    ctx: &'ctx Context,
    vars: &Vars<'ctx>,
    candidates: &BTreeSet<String>,
) -> Vec<Bool<'ctx>> {
    candidates
        .iter()
        .map(|f| encoding.selected_term(ctx, vars, f))
        .collect()
}

/// Features are native z3 booleans.
pub struct BooleanEncoding;

impl Encoding for BooleanEncoding {
    fn selected_term<'ctx>(&self, _ctx: &'ctx Context, vars: &Vars<'ctx>, feature: &str) -> Bool<'ctx> {
        match vars.feature(feature) {
            FeatureVar::Bool(b) => b.clone(),
            FeatureVar::Int(_) => panic!("feature `{feature}` is not boolean-encoded"),
        }
    }

    fn deselect<'ctx>(&self, ctx: &'ctx Context, vars: &Vars<'ctx>, feature: &str) -> Bool<'ctx> {
        self.selected_term(ctx, vars, feature).not()
    }

    fn build_pbge<'ctx>(
        &self,
        ctx: &'ctx Context,
        vars: &Vars<'ctx>,
        candidates: &BTreeSet<String>,
        k: i32,
    ) -> Bool<'ctx> {
        let terms = pbge_terms(self, ctx, vars, candidates);
        let pairs: Vec<(&Bool<'ctx>, i32)> = terms.iter().map(|t| (t, 1)).collect();
        Bool::pb_ge(ctx, &pairs, k)
    }
}

/// Features are integers constrained to `{0, 1}`.
pub struct IntegerEncoding;

impl Encoding for IntegerEncoding {
    fn selected_term<'ctx>(&self, ctx: &'ctx Context, vars: &Vars<'ctx>, feature: &str) -> Bool<'ctx> {
        match vars.feature(feature) {
            FeatureVar::Int(i) => i._eq(&Int::from_i64(ctx, 1)),
            FeatureVar::Bool(_) => panic!("feature `{feature}` is not integer-encoded"),
        }
    }

    fn deselect<'ctx>(&self, ctx: &'ctx Context, vars: &Vars<'ctx>, feature: &str) -> Bool<'ctx> {
        match vars.feature(feature) {
            FeatureVar::Int(i) => i._eq(&Int::from_i64(ctx, 0)),
            FeatureVar::Bool(_) => panic!("feature `{feature}` is not integer-encoded"),
        }
    }

    fn build_pbge<'ctx>(
        &self,
        ctx: &'ctx Context,
        vars: &Vars<'ctx>,
        candidates: &BTreeSet<String>,
        k: i32,
    ) -> Bool<'ctx> {
        let terms = pbge_terms(self, ctx, vars, candidates);
        let pairs: Vec<(&Bool<'ctx>, i32)> = terms.iter().map(|t| (t, 1)).collect();
        Bool::pb_ge(ctx, &pairs, k)
    }
}

/// Picks the encoding named by [`crate::model::Tfm::features_as_boolean`].
pub fn select_encoding(features_as_boolean: bool) -> Box<dyn Encoding> {
    if features_as_boolean {
        Box::new(BooleanEncoding)
    } else {
        Box::new(IntegerEncoding)
    }
}
