//! Case Module - collaborator interfaces and their file-backed implementations
//!
//! The orchestrator never touches the filesystem itself. Everything it needs
//! from the outside world goes through two traits:
//! - [`Case`]: the live configuration store of one case (read/flush/get/set)
//! - [`TestRuntime`]: snapshot, staging, build, run and compare primitives
//!
//! `FileCase`, `FileSnapshotStore` and `CommandRuntime` are the reference
//! implementations used by the command-line harness.

pub mod command;
pub mod file_case;
pub mod snapshots;

use std::path::Path;

use crate::error::{CaseError, RuntimeError};
use crate::models::{BuildScope, CaseValue, ConfigKind, Suffix};

pub use command::CommandRuntime;
pub use file_case::FileCase;
pub use snapshots::FileSnapshotStore;

/// Trait for the persisted configuration store of a case
pub trait Case {
    /// Root directory of the case.
    fn caseroot(&self) -> &Path;

    fn get_value(&self, key: &str) -> Option<CaseValue>;

    fn set_value(&mut self, key: &str, value: CaseValue) -> Result<(), CaseError>;

    /// Reload persisted configuration into the live case.
    fn read_config(&mut self) -> Result<(), CaseError>;

    /// Persist in-memory changes so they can be snapshotted.
    fn flush_config(&mut self) -> Result<(), CaseError>;

    /// Reload after staged files replaced the live configuration.
    ///
    /// `modified_pes` is true when the processor layout was among the staged
    /// files, in which case layout-derived values must be recomputed.
    fn load_staged_config(&mut self, modified_pes: bool) -> Result<(), CaseError>;

    fn get_int(&self, key: &str) -> Result<i64, CaseError> {
        let value = self
            .get_value(key)
            .ok_or_else(|| CaseError::MissingValue(key.to_string()))?;
        value.as_int().ok_or_else(|| CaseError::TypeMismatch {
            key: key.to_string(),
            expected: "an integer",
        })
    }

    fn get_string(&self, key: &str) -> Result<String, CaseError> {
        self.get_value(key)
            .map(|value| value.to_string())
            .ok_or_else(|| CaseError::MissingValue(key.to_string()))
    }
}

/// Trait for the build/run/compare primitives and snapshot storage
pub trait TestRuntime {
    fn snapshot_exists(&self, kind: ConfigKind, suffix: &Suffix) -> bool;

    fn save_snapshot(&mut self, kind: ConfigKind, suffix: &Suffix) -> Result<(), CaseError>;

    /// Restore a saved snapshot over the live file.
    ///
    /// Returns `Ok(false)` when there was nothing to restore.
    fn restore_snapshot(&mut self, kind: ConfigKind, suffix: &Suffix) -> Result<bool, CaseError>;

    /// Make a saved snapshot the active configuration for the next step.
    fn stage_snapshot(&mut self, kind: ConfigKind, suffix: &Suffix) -> Result<(), CaseError>;

    /// Save the build record and executable produced by the last build.
    fn save_build_artifacts(&mut self, suffix: &Suffix) -> Result<(), CaseError>;

    /// Put a saved build record and executable back in place.
    fn stage_build_artifacts(&mut self, suffix: &Suffix) -> Result<(), CaseError>;

    fn perform_build(&mut self, case: &mut dyn Case, scope: BuildScope)
        -> Result<(), RuntimeError>;

    /// Run the simulation for one phase. `Ok(false)` is a failed run.
    fn execute_phase(&mut self, case: &mut dyn Case, suffix: &Suffix)
        -> Result<bool, RuntimeError>;

    /// Compare the outputs of two phases. `Ok(false)` means they differ.
    fn compare(
        &mut self,
        case: &mut dyn Case,
        suffix_a: &Suffix,
        suffix_b: &Suffix,
    ) -> Result<bool, RuntimeError>;
}
