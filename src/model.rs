//! The time-aware feature model (TFM) data types and base assertion assembly (C1).

use std::collections::BTreeMap;
use std::sync::Arc;

use uuid::Uuid;
use z3::ast::{Ast, Bool, Dynamic, Int};
use z3::Context;

/// Inclusive integer bounds for an attribute or context variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bounds {
    pub min: i64,
    pub max: i64,
}

impl Bounds {
    pub fn new(min: i64, max: i64) -> Self {
        Self { min, max }
    }
}

/// A closed time range `[lo, hi]` during which a feature is optional.
pub type TimeRange = (i64, i64);

/// An opaque SMT expression. The engine never inspects a constraint's structure; it only asks
/// it to produce a boolean term given a live solver context and the variable dictionary (C1).
pub type Constraint =
    Arc<dyn for<'ctx> Fn(&'ctx Context, &Vars<'ctx>) -> Bool<'ctx> + Send + Sync>;

/// Builds a [`Constraint`] from a plain closure.
pub fn constraint<F>(f: F) -> Constraint
where
    F: for<'ctx> Fn(&'ctx Context, &Vars<'ctx>) -> Bool<'ctx> + Send + Sync + 'static,
{
    Arc::new(f)
}

/// The time-aware feature model supplied by the external parser/caller.
#[derive(Clone)]
pub struct Tfm {
    pub features: Vec<String>,
    pub features_as_boolean: bool,
    pub attributes: BTreeMap<String, Bounds>,
    pub contexts: BTreeMap<String, Bounds>,
    pub constraints: Vec<Constraint>,
    pub optional_features: BTreeMap<String, Vec<TimeRange>>,
    pub time_context: Option<String>,
}

impl Tfm {
    pub fn new(features: Vec<String>, features_as_boolean: bool) -> Self {
        Self {
            features,
            features_as_boolean,
            attributes: BTreeMap::new(),
            contexts: BTreeMap::new(),
            constraints: Vec::new(),
            optional_features: BTreeMap::new(),
            time_context: None,
        }
    }

    /// Returns the time context's name, synthesizing a fresh one if the TFM does not declare
    /// one. Synthesis binds the new context to the single instant `[0, 0]` and extends every
    /// optional-feature range with `(0, 0)`, per §3.
    ///
    /// The synthesized context's bounds entry is inserted before anything reads or writes it —
    /// the reference implementation gets this order backwards (see `DESIGN.md`).
    pub fn resolve_time_context(&mut self) -> String {
        if let Some(name) = &self.time_context {
            return name.clone();
        }
        let name = format!("_{}", Uuid::new_v4().simple());
        self.contexts.entry(name.clone()).or_insert(Bounds::new(0, 0));
        for ranges in self.optional_features.values_mut() {
            ranges.push((0, 0));
        }
        self.time_context = Some(name.clone());
        name
    }
}

/// A feature variable, typed according to the TFM's `features_as_boolean` flag.
pub enum FeatureVar<'ctx> {
    Bool(Bool<'ctx>),
    Int(Int<'ctx>),
}

/// The variable dictionary built once per run by [`assemble`] and shared by every strategy and
/// by user-supplied [`Constraint`] closures.
pub struct Vars<'ctx> {
    features: BTreeMap<String, FeatureVar<'ctx>>,
    attributes: BTreeMap<String, Int<'ctx>>,
    contexts: BTreeMap<String, Int<'ctx>>,
}

impl<'ctx> Vars<'ctx> {
    pub fn feature(&self, name: &str) -> &FeatureVar<'ctx> {
        self.features
            .get(name)
            .unwrap_or_else(|| panic!("unknown feature `{name}`"))
    }

    pub fn attribute(&self, name: &str) -> &Int<'ctx> {
        self.attributes
            .get(name)
            .unwrap_or_else(|| panic!("unknown attribute `{name}`"))
    }

    pub fn context(&self, name: &str) -> &Int<'ctx> {
        self.contexts
            .get(name)
            .unwrap_or_else(|| panic!("unknown context `{name}`"))
    }

    /// Every feature, attribute and context variable, type-erased for use as quantifier bound
    /// variables (C6).
    pub fn quantifier_bounds(&self) -> Vec<Dynamic<'ctx>> {
        let mut bounds = Vec::with_capacity(
            self.features.len() + self.attributes.len() + self.contexts.len(),
        );
        for var in self.features.values() {
            bounds.push(match var {
                FeatureVar::Bool(b) => Dynamic::from_ast(b),
                FeatureVar::Int(i) => Dynamic::from_ast(i),
            });
        }
        bounds.extend(self.attributes.values().map(Dynamic::from_ast));
        bounds.extend(self.contexts.values().map(Dynamic::from_ast));
        bounds
    }
}

/// The output of model assembly: the variable dictionary plus every base assertion (variable
/// bounds followed by the user's constraints, verbatim).
pub struct Assembled<'ctx> {
    pub vars: Vars<'ctx>,
    pub base: Vec<Bool<'ctx>>,
}

/// Translates a [`Tfm`] into a variable dictionary and a flat list of base assertions (C1).
/// Called exactly once per strategy run.
pub fn assemble<'ctx>(ctx: &'ctx Context, tfm: &Tfm) -> Assembled<'ctx> {
    let mut base = Vec::new();
    let mut features = BTreeMap::new();

    for name in &tfm.features {
        if tfm.features_as_boolean {
            features.insert(name.clone(), FeatureVar::Bool(Bool::new_const(ctx, name.as_str())));
        } else {
            let var = Int::new_const(ctx, name.as_str());
            base.push(var.ge(&Int::from_i64(ctx, 0)));
            base.push(var.le(&Int::from_i64(ctx, 1)));
            features.insert(name.clone(), FeatureVar::Int(var));
        }
    }

    let mut attributes = BTreeMap::new();
    for (name, bounds) in &tfm.attributes {
        let var = Int::new_const(ctx, name.as_str());
        base.push(var.ge(&Int::from_i64(ctx, bounds.min)));
        base.push(var.le(&Int::from_i64(ctx, bounds.max)));
        attributes.insert(name.clone(), var);
    }

    let mut contexts = BTreeMap::new();
    for (name, bounds) in &tfm.contexts {
        let var = Int::new_const(ctx, name.as_str());
        base.push(var.ge(&Int::from_i64(ctx, bounds.min)));
        base.push(var.le(&Int::from_i64(ctx, bounds.max)));
        contexts.insert(name.clone(), var);
    }

    let vars = Vars {
        features,
        attributes,
        contexts,
    };

    for c in &tfm.constraints {
        base.push(c(ctx, &vars));
    }

    Assembled { vars, base }
}
