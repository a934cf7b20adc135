//! Configuration module for two-phase compare tests.
//!
//! Two kinds of configuration live here:
//!
//! - `CompareTwoSettings`: the definition of one comparison test (build-mode
//!   flags, run-two suffix, run descriptions). Fixed for the lifetime of a test.
//! - `HarnessSettings`: how the command-line harness talks to the outside
//!   world (log directory and level, build/run/compare command templates).
//!
//! # Module Structure
//!
//! - `loader`: Loads and saves settings as JSON or TOML

pub mod loader;

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::ConfigError;
use crate::models::{BuildModeFlags, Suffix, DEFAULT_RUN_TWO_SUFFIX, RUN_ONE_SUFFIX};

/// Definition of a two-phase comparison test
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompareTwoSettings {
    /// Two separate builds are needed for the shared libraries.
    /// False for tests that only change runtime options.
    pub two_builds_for_sharedlib: bool,

    /// Two separate builds are needed for the model.
    /// False for tests that only change runtime options.
    pub two_builds_for_model: bool,

    /// The two runs use different processor layouts. Usually implies one of
    /// the two-build flags, but not necessarily.
    pub runs_have_different_pe_settings: bool,

    /// Suffix of the second run. Anything other than the run-one suffix or
    /// the original-backup suffix.
    pub run_two_suffix: String,

    pub run_one_description: String,
    pub run_two_description: String,
}

impl Default for CompareTwoSettings {
    fn default() -> Self {
        CompareTwoSettings {
            two_builds_for_sharedlib: false,
            two_builds_for_model: false,
            runs_have_different_pe_settings: false,
            run_two_suffix: DEFAULT_RUN_TWO_SUFFIX.to_string(),
            run_one_description: String::new(),
            run_two_description: String::new(),
        }
    }
}

impl CompareTwoSettings {
    /// Settings for a test that only changes runtime options.
    pub fn runtime_only(run_two_suffix: impl Into<String>) -> Self {
        CompareTwoSettings {
            run_two_suffix: run_two_suffix.into(),
            ..Default::default()
        }
    }

    pub fn with_descriptions(
        mut self,
        run_one: impl Into<String>,
        run_two: impl Into<String>,
    ) -> Self {
        self.run_one_description = run_one.into();
        self.run_two_description = run_two.into();
        self
    }

    pub fn flags(&self) -> BuildModeFlags {
        BuildModeFlags {
            two_builds_for_sharedlib: self.two_builds_for_sharedlib,
            two_builds_for_model: self.two_builds_for_model,
            runs_have_different_pe_settings: self.runs_have_different_pe_settings,
        }
    }

    /// Validate both run suffixes and return them as (run one, run two).
    pub fn validated_suffixes(&self) -> Result<(Suffix, Suffix), ConfigError> {
        let run_one = Suffix::run_one();
        let run_two = Suffix::new(&self.run_two_suffix)?;

        if run_two == run_one {
            return Err(ConfigError::DuplicateSuffix(RUN_ONE_SUFFIX.to_string()));
        }
        for suffix in [&run_one, &run_two] {
            if suffix.is_reserved() {
                return Err(ConfigError::ReservedSuffix(suffix.to_string()));
            }
        }
        Ok((run_one, run_two))
    }
}

/// Settings of the command-line harness
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HarnessSettings {
    /// Directory for `full/` and `parsed/` logs. Defaults to `./logs`.
    pub log_dir: Option<PathBuf>,

    /// One of error, warn, info, debug, trace.
    pub log_level: String,

    /// Shell used to run command templates.
    pub shell: String,

    /// Run with `BUILD_SCOPE` set to all, sharedlib or model.
    pub build_command: Option<String>,

    /// Run with `COMPARE_SUFFIX` set to the phase suffix.
    pub run_command: Option<String>,

    /// Run with `COMPARE_SUFFIX_A` / `COMPARE_SUFFIX_B` set.
    pub compare_command: Option<String>,

    /// Model executable relative to the case root, saved per build.
    pub executable: Option<PathBuf>,
}

impl Default for HarnessSettings {
    fn default() -> Self {
        HarnessSettings {
            log_dir: None,
            log_level: "info".to_string(),
            shell: "sh".to_string(),
            build_command: None,
            run_command: None,
            compare_command: None,
            executable: None,
        }
    }
}

impl HarnessSettings {
    pub fn level_filter(&self) -> Result<log::LevelFilter, ConfigError> {
        self.log_level.parse().map_err(|_| {
            ConfigError::ValidationFailed(format!("Unknown log level: {}", self.log_level))
        })
    }
}
