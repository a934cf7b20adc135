//! ERS: exact restart test.
//!
//! Run one goes STOP_N units and writes a restart file at REST_N. Run two
//! continues from that restart file for the remaining units. The history
//! output of both runs must match.

use crate::case::Case;
use crate::config::CompareTwoSettings;
use crate::error::{ConfigError, HookError};
use crate::models::CaseValue;

use super::CompareTwoTest;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ers {
    stop_option: String,
    stop_n: i64,
    rest_n: i64,
}

impl Ers {
    pub fn settings() -> CompareTwoSettings {
        CompareTwoSettings::runtime_only("rest").with_descriptions("initial run", "restart test")
    }

    pub fn new(case: &dyn Case) -> crate::Result<Self> {
        let stop_option = case.get_string("STOP_OPTION")?;
        let stop_n = case.get_int("STOP_N")?;

        // at least one time unit both before and after the restart
        if stop_n <= 2 {
            return Err(ConfigError::ValidationFailed(format!(
                "stop_n value {} too short",
                stop_n
            ))
            .into());
        }

        Ok(Ers {
            stop_option,
            stop_n,
            rest_n: stop_n / 2 + 1,
        })
    }

    pub fn rest_n(&self) -> i64 {
        self.rest_n
    }
}

impl CompareTwoTest for Ers {
    fn run_common_setup(&mut self, case: &mut dyn Case) -> Result<(), HookError> {
        case.set_value("HIST_OPTION", self.stop_option.as_str().into())?;
        case.set_value("HIST_N", CaseValue::Int(self.stop_n))?;
        Ok(())
    }

    fn run_one_setup(&mut self, case: &mut dyn Case) -> Result<(), HookError> {
        // STOP_N is already right; set anyway for symmetry with run two
        case.set_value("STOP_N", CaseValue::Int(self.stop_n))?;
        case.set_value("CONTINUE_RUN", false.into())?;
        case.set_value("REST_OPTION", self.stop_option.as_str().into())?;
        case.set_value("REST_N", CaseValue::Int(self.rest_n))?;
        log::info!(
            "[ERS] doing a {} {} initial test with restart file at {} {}",
            self.stop_n,
            self.stop_option,
            self.rest_n,
            self.stop_option
        );
        Ok(())
    }

    fn run_two_setup(&mut self, case: &mut dyn Case) -> Result<(), HookError> {
        let stop_new = self.stop_n - self.rest_n;
        if stop_new <= 0 {
            return Err(HookError::Failed(format!(
                "stop_n value {} too short {} {}",
                stop_new, self.stop_n, self.rest_n
            )));
        }

        case.set_value("STOP_N", CaseValue::Int(stop_new))?;
        case.set_value("CONTINUE_RUN", true.into())?;
        case.set_value("REST_OPTION", "never".into())?;
        log::info!(
            "[ERS] doing a {} {} restart test",
            stop_new,
            self.stop_option
        );
        Ok(())
    }
}
