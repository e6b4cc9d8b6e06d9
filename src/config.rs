/// Tunable knobs for the anomaly detection strategies.
///
/// The defaults reproduce the reference tool's hardcoded constants exactly, so
/// `EngineConfig::default()` is the right choice unless a caller has measured a reason to
/// deviate.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Initial ceiling on the speculative strategy's batch size (`STARTING_BATCH`).
    pub starting_batch: u32,

    /// Per-batch solver timeout in milliseconds for the speculative strategy
    /// (`BATCH_TIMEOUT_MS`). Ignored by the grid and quantified strategies, which never set a
    /// timeout.
    pub batch_timeout_ms: u32,

    /// When set, the solver is pushed towards a fresh solve on every `check` instead of reusing
    /// incremental state, and strategies skip their preliminary warm-up checks. This is a
    /// tuning pass-through, not a semantic change; its interaction with the speculative
    /// strategy's own per-batch timeout is intentionally left independent (see the reference's
    /// open question on this).
    pub non_incremental_solver: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            starting_batch: 64,
            batch_timeout_ms: 30_000,
            non_incremental_solver: false,
        }
    }
}
