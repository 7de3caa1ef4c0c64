//! Engine configuration options.

/// Policy for validating quote strike prices at submission time.
///
/// The percentage bounds in an asset config are relative to spot, and checking
/// them requires a live oracle read. Maker-asserted skips that read and trusts
/// the maker's ladder; the bounds then only constrain oracle-checked books.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrikeValidation {
    MakerAsserted,
    OracleChecked,
}

/// Engine configuration.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Maximum number of events to retain in memory.
    pub max_events: usize,
    /// Enable verbose logging.
    pub verbose: bool,
    /// Oracle prices older than this are rejected at settlement.
    pub oracle_staleness_secs: i64,
    /// How long a maker has to confirm a position request.
    pub confirmation_window_secs: i64,
    /// Strike bound policy for quote submission.
    pub strike_validation: StrikeValidation,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_events: 100_000,
            verbose: false,
            oracle_staleness_secs: 60,
            confirmation_window_secs: 30,
            strike_validation: StrikeValidation::MakerAsserted,
        }
    }
}
