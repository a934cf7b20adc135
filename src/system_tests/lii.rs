//! LII: interpolating initial conditions onto an identical configuration must
//! give identical results.
//!
//! Run one uses `use_init_interp = .false.` (suffix base), run two
//! `use_init_interp = .true.` (suffix interp).

use crate::case::Case;
use crate::config::CompareTwoSettings;
use crate::error::HookError;

use super::rep::cold_start_setup;
use super::user_nl::{append_to_saved_files, save_user_nl_files};
use super::CompareTwoTest;

const COMPONENT: &str = "clm";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Lii;

impl Lii {
    pub fn settings() -> CompareTwoSettings {
        CompareTwoSettings::runtime_only("interp")
            .with_descriptions("use_init_interp set to false", "use_init_interp set to true")
    }
}

impl CompareTwoTest for Lii {
    fn pre_build(&mut self, case: &mut dyn Case) -> Result<(), HookError> {
        save_user_nl_files(case.caseroot(), COMPONENT)?;
        Ok(())
    }

    fn run_common_setup(&mut self, case: &mut dyn Case) -> Result<(), HookError> {
        cold_start_setup(case)
    }

    fn run_one_setup(&mut self, case: &mut dyn Case) -> Result<(), HookError> {
        append_to_saved_files(case.caseroot(), COMPONENT, "use_init_interp = .false.")?;
        Ok(())
    }

    fn run_two_setup(&mut self, case: &mut dyn Case) -> Result<(), HookError> {
        append_to_saved_files(case.caseroot(), COMPONENT, "use_init_interp = .true.")?;
        Ok(())
    }
}
