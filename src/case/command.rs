//! Shell-command backed runtime.
//!
//! Builds, runs and comparisons are delegated to command templates from
//! `HarnessSettings`, executed with `<shell> -c <template>` in the case root.
//! The phase being worked on is passed through environment variables:
//! - `BUILD_SCOPE`: all, sharedlib or model
//! - `COMPARE_SUFFIX`: suffix of the run being executed
//! - `COMPARE_SUFFIX_A`, `COMPARE_SUFFIX_B`: suffixes being compared

use std::process::{Command, Output};

use crate::config::HarnessSettings;
use crate::error::{CaseError, ConfigError, RuntimeError};
use crate::models::{BuildScope, ConfigKind, Suffix};

use super::{Case, FileSnapshotStore, TestRuntime};

/// `TestRuntime` running shell commands against a file-backed case
pub struct CommandRuntime {
    store: FileSnapshotStore,
    settings: HarnessSettings,
}

impl CommandRuntime {
    pub fn new(store: FileSnapshotStore, settings: HarnessSettings) -> Self {
        CommandRuntime { store, settings }
    }

    pub fn store(&self) -> &FileSnapshotStore {
        &self.store
    }

    fn run_template(
        &self,
        what: &'static str,
        template: Option<&String>,
        env: &[(&str, &str)],
    ) -> Result<Output, RuntimeError> {
        let template = template.ok_or(ConfigError::MissingCommand(what))?;
        log::info!("[Command] Running {} command: {}", what, template);

        let output = Command::new(&self.settings.shell)
            .arg("-c")
            .arg(template)
            .current_dir(self.store.caseroot())
            .envs(env.iter().copied())
            .output()
            .map_err(|e| RuntimeError::CommandFailed {
                cmd: template.clone(),
                reason: e.to_string(),
            })?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        if !stdout.is_empty() {
            log::info!("[{} command] stdout: {}", what, stdout.trim_end());
        }
        let stderr = String::from_utf8_lossy(&output.stderr);
        if !stderr.is_empty() {
            log::info!("[{} command] stderr: {}", what, stderr.trim_end());
        }
        Ok(output)
    }
}

impl TestRuntime for CommandRuntime {
    fn snapshot_exists(&self, kind: ConfigKind, suffix: &Suffix) -> bool {
        self.store.exists(kind, suffix)
    }

    fn save_snapshot(&mut self, kind: ConfigKind, suffix: &Suffix) -> Result<(), CaseError> {
        self.store.save(kind, suffix)
    }

    fn restore_snapshot(&mut self, kind: ConfigKind, suffix: &Suffix) -> Result<bool, CaseError> {
        self.store.restore(kind, suffix)
    }

    fn stage_snapshot(&mut self, kind: ConfigKind, suffix: &Suffix) -> Result<(), CaseError> {
        self.store.stage(kind, suffix)
    }

    fn save_build_artifacts(&mut self, suffix: &Suffix) -> Result<(), CaseError> {
        self.store.save_build(suffix)
    }

    fn stage_build_artifacts(&mut self, suffix: &Suffix) -> Result<(), CaseError> {
        self.store.stage_build(suffix)
    }

    fn perform_build(
        &mut self,
        case: &mut dyn Case,
        scope: BuildScope,
    ) -> Result<(), RuntimeError> {
        // the build command reads the case files, so they must be current on disk
        case.flush_config()?;
        let output = self.run_template(
            "build",
            self.settings.build_command.as_ref(),
            &[("BUILD_SCOPE", scope.as_str())],
        )?;
        if !output.status.success() {
            return Err(RuntimeError::BuildFailed(format!(
                "{} build exited with status {:?}",
                scope.as_str(),
                output.status.code()
            )));
        }
        // builds may record what they produced in env_build
        case.read_config()?;
        Ok(())
    }

    fn execute_phase(
        &mut self,
        case: &mut dyn Case,
        suffix: &Suffix,
    ) -> Result<bool, RuntimeError> {
        case.flush_config()?;
        let output = self.run_template(
            "run",
            self.settings.run_command.as_ref(),
            &[("COMPARE_SUFFIX", suffix.as_str())],
        )?;
        if !output.status.success() {
            log::warn!(
                "[Command] Run '{}' exited with status {:?}",
                suffix,
                output.status.code()
            );
        }
        Ok(output.status.success())
    }

    fn compare(
        &mut self,
        _case: &mut dyn Case,
        suffix_a: &Suffix,
        suffix_b: &Suffix,
    ) -> Result<bool, RuntimeError> {
        let output = self.run_template(
            "compare",
            self.settings.compare_command.as_ref(),
            &[
                ("COMPARE_SUFFIX_A", suffix_a.as_str()),
                ("COMPARE_SUFFIX_B", suffix_b.as_str()),
            ],
        )?;
        Ok(output.status.success())
    }
}
