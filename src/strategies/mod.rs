//! The three interchangeable anomaly-detection strategies (C4, C5, C6). All three produce the
//! same [`crate::result::AnomalyResult`] on inputs where the solver returns definitive answers;
//! see SPEC_FULL.md §4.8 for when each is the right choice.

pub mod grid;
pub mod quantified;
pub mod speculative;

use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::model::Tfm;
use crate::result::AnomalyResult;

/// Selects which strategy a run uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// Batched-candidate search with adaptive batch size (C4). Best when models are cheap and
    /// many candidates share witnesses.
    Speculative,
    /// One push/pop per candidate (C5). Best when producing a model is the expensive step.
    Grid,
    /// Single ∀-formula enumeration (C6). Best on small instances.
    Quantified,
}

impl Strategy {
    pub fn run(self, tfm: &Tfm, config: &EngineConfig) -> Result<AnomalyResult, EngineError> {
        match self {
            Strategy::Speculative => speculative::run(tfm, config),
            Strategy::Grid => grid::run(tfm, config),
            Strategy::Quantified => quantified::run(tfm, config),
        }
    }
}
