//! Two-Phase Compare
//!
//! This crate orchestrates comparison system tests: a case is built once or
//! twice, run twice with different settings, and the outputs of the two runs
//! are compared.
//!
//! **Architecture**: `CompareTwo` owns the control flow only. The case store
//! and the build/run/compare primitives are collaborators behind the `Case`
//! and `TestRuntime` traits, and each test supplies its hooks through
//! `CompareTwoTest`.
//!
//! The system is organized into functional modules:
//! - **error**: Error type hierarchy
//! - **models**: Suffixes, statuses, build scopes and case values
//! - **config**: Test definitions and harness settings
//! - **case**: Collaborator traits and their file-backed implementations
//! - **system_tests**: Hook traits and the bundled ERS, REP and LII tests
//! - **orchestrator**: Build coordination and the run/compare sequence
//! - **system**: Logging setup
//! - **log_collector**: Decoupled disk logging

// Core foundational modules
pub mod error;
pub mod models;

// Test definitions and harness settings
pub mod config;

// Case store and runtime collaborators
pub mod case;

// Bundled comparison tests and the hook traits they implement
pub mod system_tests;

// Logging setup and macros
pub mod system;

// Decoupled logging system
pub mod log_collector;

// Build coordination and run/compare sequencing
pub mod orchestrator;

// Re-export the log crate for macro usage
pub use log;

pub use system::{flush_all_logs, initialize_logging};
pub use log_collector::{LogCollector, LogLine};

// ============================================================================
// PUBLIC RE-EXPORTS FOR CONVENIENCE
// ============================================================================

pub use error::{CaseError, CompareTwoError, ConfigError, HookError, Result, RuntimeError};

pub use models::{
    BuildModeFlags, BuildScope, CaseValue, ConfigKind, Phase, PhaseId, PhaseStatus, Suffix,
};

pub use config::{CompareTwoSettings, HarnessSettings};

pub use case::{Case, CommandRuntime, FileCase, FileSnapshotStore, TestRuntime};

pub use system_tests::{CompareTwoTest, PeLayoutHooks, TwoBuildHooks};

pub use orchestrator::{CompareTwo, RunState, TestStatus};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
