//! Run execution: two runs and the comparison, with early return on failure.
//!
//! A failed run or comparison is an outcome, not an error: it is recorded in
//! the status and `run()` returns `Ok(false)`. Nothing after a failed run is
//! touched, not even the next run's setup hooks.

use crate::error::{CompareTwoError, Result};
use crate::log_parsed;
use crate::models::{ConfigKind, PhaseId, Suffix};
use crate::system_tests::CompareTwoTest;

use super::state::{self, RunState};
use super::CompareTwo;

impl<'a, T: CompareTwoTest> CompareTwo<'a, T> {
    /// Run both phases and compare them.
    ///
    /// Returns `Ok(true)` only when both runs and the comparison pass.
    ///
    /// # Errors
    /// Hook, case and runtime errors are returned unchanged. Calling `run()`
    /// a second time on the same orchestrator is `CompareTwoError::InvalidState`.
    pub fn run(&mut self) -> Result<bool> {
        if self.state != RunState::Init {
            return Err(CompareTwoError::InvalidState(format!(
                "run() already called (state: {})",
                self.state.as_str()
            )));
        }

        // First run
        self.transition_to(RunState::Run1Setup)?;
        self.test.run_common_setup(&mut *self.case)?;
        self.test.run_one_setup(&mut *self.case)?;
        if !self.execute(PhaseId::One)? {
            self.transition_to(RunState::Done)?;
            log_parsed!("[Run] First run failed, skipping second run and comparison");
            return Ok(false);
        }

        // Second run
        self.transition_to(RunState::Run2Setup)?;
        self.test.run_common_setup(&mut *self.case)?;
        self.test.run_two_setup(&mut *self.case)?;
        if !self.execute(PhaseId::Two)? {
            self.transition_to(RunState::Done)?;
            log_parsed!("[Run] Second run failed, skipping comparison");
            return Ok(false);
        }

        // Compare results
        self.transition_to(RunState::Compare)?;
        let one = self.run_one.suffix.clone();
        let two = self.run_two.suffix.clone();
        let success = self.runtime.compare(&mut *self.case, &one, &two)?;
        let status = state::record(&mut self.compare_status, success)
            .map_err(CompareTwoError::InvalidState)?;
        log_parsed!("[Run] Comparison of '{}' and '{}': {}", one, two, status);

        self.transition_to(RunState::Done)?;
        Ok(success)
    }

    /// Stage the phase's files, execute it and record the outcome.
    fn execute(&mut self, id: PhaseId) -> Result<bool> {
        let suffix = self.phase(id).suffix.clone();
        self.stage_for_run(&suffix)?;

        self.transition_to(match id {
            PhaseId::One => RunState::Run1Exec,
            PhaseId::Two => RunState::Run2Exec,
        })?;
        log::info!(
            "[Run] Doing {} run: {}",
            id.ordinal(),
            self.phase(id).description
        );
        let success = self.runtime.execute_phase(&mut *self.case, &suffix)?;

        let phase = match id {
            PhaseId::One => &mut self.run_one,
            PhaseId::Two => &mut self.run_two,
        };
        let status =
            state::record(&mut phase.status, success).map_err(CompareTwoError::InvalidState)?;
        log_parsed!("[Run] {} run '{}': {}", id.ordinal(), suffix, status);
        Ok(success)
    }

    /// Put the run's saved layout and build files in place and reload the case.
    fn stage_for_run(&mut self, suffix: &Suffix) -> Result<()> {
        let modified_pes = self.flags.runs_have_different_pe_settings;
        let two_executables = self.flags.has_two_executables();

        if modified_pes {
            self.runtime.stage_snapshot(ConfigKind::PeLayout, suffix)?;
        }
        if two_executables {
            self.runtime.stage_build_artifacts(suffix)?;
        }
        if modified_pes || two_executables {
            self.case.load_staged_config(modified_pes)?;
        }
        Ok(())
    }
}
