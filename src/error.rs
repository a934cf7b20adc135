//! Unified error type hierarchy for the two-phase compare harness
//!
//! Provides structured error handling with ConfigError, CaseError, HookError,
//! RuntimeError, and the umbrella CompareTwoError.
//!
//! Phase failures and comparison failures are NOT errors: they are recorded as
//! `PhaseStatus::Fail` and surface as `Ok(false)` from `CompareTwo::run`.

use std::io;
use thiserror::Error;

/// Test definition and harness configuration errors.
///
/// Raised synchronously at construction or call time and never retried.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Suffix must not be empty")]
    EmptySuffix,

    #[error("Suffix contains invalid characters: '{0}'")]
    InvalidSuffix(String),

    #[error("Must have different suffixes for run one and run two (both are '{0}')")]
    DuplicateSuffix(String),

    #[error("Run suffix cannot be '{0}' (reserved for original file backups)")]
    ReservedSuffix(String),

    #[error("Invalid for both sharedlib_only and model_only to be set")]
    InvalidScope,

    #[error("Test sets {flag} but does not provide {hooks}")]
    MissingCapability {
        flag: &'static str,
        hooks: &'static str,
    },

    #[error("No {0} command configured")]
    MissingCommand(&'static str),

    #[error("Configuration file not found: {0}")]
    FileNotFound(String),

    #[error("Configuration validation failed: {0}")]
    ValidationFailed(String),

    #[error("Invalid JSON in config: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("Invalid TOML in config: {0}")]
    InvalidToml(#[from] toml::de::Error),

    #[error("Could not serialize config to TOML: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    #[error("IO error during config operations: {0}")]
    IoError(#[from] io::Error),
}

/// Case configuration store and snapshot storage errors.
#[derive(Error, Debug)]
pub enum CaseError {
    #[error("IO error on case store: {0}")]
    Io(#[from] io::Error),

    #[error("Malformed case file {file}: {source}")]
    Malformed {
        file: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Case value not found: {0}")]
    MissingValue(String),

    #[error("Case value {key} is not {expected}")]
    TypeMismatch { key: String, expected: &'static str },

    #[error("No saved {kind} snapshot with suffix '{suffix}'")]
    SnapshotMissing { kind: String, suffix: String },
}

/// Errors raised by test-specific hooks.
#[derive(Error, Debug)]
pub enum HookError {
    /// A hook required by the test's flags was never provided.
    #[error("{0} must be implemented by this test")]
    NotImplemented(&'static str),

    #[error("Hook failed: {0}")]
    Failed(String),

    #[error(transparent)]
    Case(#[from] CaseError),
}

/// Build, execution and comparison primitive errors.
#[derive(Error, Debug)]
pub enum RuntimeError {
    #[error("Build failed: {0}")]
    BuildFailed(String),

    #[error("Command '{cmd}' failed: {reason}")]
    CommandFailed { cmd: String, reason: String },

    #[error(transparent)]
    Case(#[from] CaseError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Global error type for the orchestrator.
#[derive(Error, Debug)]
pub enum CompareTwoError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Hook error: {0}")]
    Hook(#[from] HookError),

    #[error("Case error: {0}")]
    Case(#[from] CaseError),

    #[error("Runtime error: {0}")]
    Runtime(#[from] RuntimeError),

    #[error("Invalid orchestrator state: {0}")]
    InvalidState(String),
}

impl CompareTwoError {
    /// Get a one-line message suitable for a test report
    pub fn user_message(&self) -> String {
        match self {
            CompareTwoError::Config(e) => format!("Test is misconfigured: {}", e),
            CompareTwoError::Hook(HookError::NotImplemented(hook)) => {
                format!("Test definition is incomplete: {} is missing", hook)
            }
            CompareTwoError::Hook(e) => format!("Test setup failed: {}", e),
            CompareTwoError::Case(e) => format!("Case configuration failed: {}", e),
            CompareTwoError::Runtime(e) => format!("Build or run step failed: {}", e),
            CompareTwoError::InvalidState(msg) => format!("Orchestrator misuse: {}", msg),
        }
    }

    /// True for errors that signal a malformed test definition rather than a
    /// failure of the case or its tooling.
    pub fn is_definition_error(&self) -> bool {
        matches!(
            self,
            CompareTwoError::Config(_) | CompareTwoError::Hook(HookError::NotImplemented(_))
        )
    }
}

/// Top-level result type for orchestrator operations.
pub type Result<T> = std::result::Result<T, CompareTwoError>;
