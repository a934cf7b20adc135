//! Two-phase comparison orchestration: build (once or twice), run twice, compare.
//!
//! `CompareTwo` owns the control flow and nothing else. The case store, the
//! build/run/compare primitives and the test-specific hooks are all supplied
//! by the caller; see `case::Case`, `case::TestRuntime` and
//! `system_tests::CompareTwoTest`.

pub mod builder;
pub mod executor;
pub mod state;

pub use state::{RunState, TestStatus};

use crate::case::{Case, TestRuntime};
use crate::config::CompareTwoSettings;
use crate::error::{CompareTwoError, ConfigError, Result};
use crate::models::{BuildModeFlags, Phase, PhaseId, PhaseStatus, Suffix};
use crate::system_tests::CompareTwoTest;

/// Drives one two-phase comparison test.
pub struct CompareTwo<'a, T: CompareTwoTest> {
    /// Live configuration store of the case under test
    case: &'a mut dyn Case,

    /// Snapshot, build, run and compare primitives
    runtime: &'a mut dyn TestRuntime,

    /// Test-specific hooks
    test: T,

    flags: BuildModeFlags,

    run_one: Phase,
    run_two: Phase,
    compare_status: PhaseStatus,

    state: RunState,
}

impl<'a, T: CompareTwoTest> CompareTwo<'a, T> {
    /// Create an orchestrator for `test` on `case`.
    ///
    /// # Errors
    /// - `ConfigError` for an empty, invalid, duplicate or reserved run-two suffix
    /// - `ConfigError::MissingCapability` when the flags require hooks the
    ///   test does not provide
    pub fn new(
        case: &'a mut dyn Case,
        runtime: &'a mut dyn TestRuntime,
        mut test: T,
        settings: &CompareTwoSettings,
    ) -> Result<Self> {
        let (run_one_suffix, run_two_suffix) = settings.validated_suffixes()?;
        let flags = settings.flags();

        if flags.runs_have_different_pe_settings && test.pe_layouts().is_none() {
            return Err(ConfigError::MissingCapability {
                flag: "runs_have_different_pe_settings",
                hooks: "adjust_pes_for_run_one/adjust_pes_for_run_two",
            }
            .into());
        }
        if flags.has_two_executables() && test.two_builds().is_none() {
            return Err(ConfigError::MissingCapability {
                flag: "two_builds_for_sharedlib/two_builds_for_model",
                hooks: "build_one_setup/build_two_setup",
            }
            .into());
        }

        log::debug!(
            "[CompareTwo] Created test: suffixes '{}'/'{}', flags {:?}",
            run_one_suffix,
            run_two_suffix,
            flags
        );

        Ok(CompareTwo {
            case,
            runtime,
            test,
            flags,
            run_one: Phase::new(PhaseId::One, run_one_suffix, &settings.run_one_description),
            run_two: Phase::new(PhaseId::Two, run_two_suffix, &settings.run_two_description),
            compare_status: PhaseStatus::NotRun,
            state: RunState::Init,
        })
    }

    pub fn flags(&self) -> BuildModeFlags {
        self.flags
    }

    pub fn run_one_suffix(&self) -> &Suffix {
        &self.run_one.suffix
    }

    pub fn run_two_suffix(&self) -> &Suffix {
        &self.run_two.suffix
    }

    pub fn phase(&self, id: PhaseId) -> &Phase {
        match id {
            PhaseId::One => &self.run_one,
            PhaseId::Two => &self.run_two,
        }
    }

    pub fn run_one_status(&self) -> PhaseStatus {
        self.run_one.status
    }

    pub fn run_two_status(&self) -> PhaseStatus {
        self.run_two.status
    }

    pub fn compare_status(&self) -> PhaseStatus {
        self.compare_status
    }

    /// Snapshot of all three statuses for reporting.
    pub fn status(&self) -> TestStatus {
        TestStatus {
            run_one: self.run_one.status,
            run_two: self.run_two.status,
            compare: self.compare_status,
        }
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    pub fn test(&self) -> &T {
        &self.test
    }

    /// Give the test hooks back, ending the borrow of case and runtime.
    pub fn into_test(self) -> T {
        self.test
    }

    fn transition_to(&mut self, next: RunState) -> Result<()> {
        if !self.state.can_transition_to(next) {
            return Err(CompareTwoError::InvalidState(format!(
                "Invalid run transition: {} -> {}",
                self.state.as_str(),
                next.as_str()
            )));
        }
        log::debug!(
            "[CompareTwo] {} -> {}",
            self.state.as_str(),
            next.as_str()
        );
        self.state = next;
        Ok(())
    }
}
