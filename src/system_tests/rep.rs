//! REP: two identical runs must give bit-for-bit identical results.

use crate::case::Case;
use crate::config::CompareTwoSettings;
use crate::error::HookError;

use super::CompareTwoTest;

/// Settings shared by tests that start both runs cold with history output at
/// the end of the run.
pub(crate) fn cold_start_setup(case: &mut dyn Case) -> Result<(), HookError> {
    case.set_value("CONTINUE_RUN", false.into())?;
    case.set_value("REST_OPTION", "none".into())?;
    case.set_value("HIST_OPTION", "$STOP_OPTION".into())?;
    case.set_value("HIST_N", "$STOP_N".into())?;
    Ok(())
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Rep;

impl Rep {
    pub fn settings() -> CompareTwoSettings {
        CompareTwoSettings::runtime_only("rep2")
    }
}

impl CompareTwoTest for Rep {
    fn run_common_setup(&mut self, case: &mut dyn Case) -> Result<(), HookError> {
        cold_start_setup(case)
    }

    fn run_one_setup(&mut self, _case: &mut dyn Case) -> Result<(), HookError> {
        Ok(())
    }

    fn run_two_setup(&mut self, _case: &mut dyn Case) -> Result<(), HookError> {
        Ok(())
    }
}
