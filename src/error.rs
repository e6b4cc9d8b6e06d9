use thiserror::Error;

/// Everything that can go wrong running a strategy or serializing its result.
///
/// Recoverable solver states (a batch timeout in the speculative strategy) never reach this
/// type; they are handled locally by shrinking the batch. Only states the spec calls fatal
/// are represented here.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The solver returned `unknown` where the strategy can only make sense of `sat`/`unsat`.
    /// Only the grid and quantified strategies can hit this; the speculative strategy absorbs
    /// `unknown` as a timeout signal instead.
    #[error("solver returned an indeterminate result where only sat/unsat are valid")]
    IndeterminateSolverResult,

    /// Failure writing the serialized [`crate::result::AnomalyResult`] to the output sink.
    #[error("failed to write anomaly result: {0}")]
    Io(#[from] std::io::Error),

    /// Failure encoding the result as JSON.
    #[error("failed to encode anomaly result as json: {0}")]
    Json(#[from] serde_json::Error),
}
