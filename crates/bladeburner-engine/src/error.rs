//! Error types for the headless engine binary.
//!
//! [`EngineError`] is the top-level error type that wraps all possible
//! failure modes during start-up and the simulated run.

/// Top-level error for the engine binary.
///
/// Each variant wraps a specific subsystem error, providing a single
/// error type that `main` can propagate with `?`.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Configuration loading failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: bladeburner_core::ConfigError,
    },

    /// A division operation failed.
    #[error("division error: {source}")]
    Division {
        /// The underlying division error.
        #[from]
        source: bladeburner_core::DivisionError,
    },

    /// Writing the final snapshot failed.
    #[error("snapshot error: {source}")]
    Snapshot {
        /// The underlying snapshot error.
        #[from]
        source: bladeburner_core::SnapshotError,
    },

    /// The snapshot file could not be written.
    #[error("failed to write snapshot: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// The configured starting action does not exist.
    #[error("unknown starting action: {name}")]
    UnknownAction {
        /// The configured name.
        name: String,
    },

    /// The run parameters cannot make progress.
    #[error("invalid run config: {reason}")]
    InvalidRun {
        /// What was wrong.
        reason: String,
    },
}
