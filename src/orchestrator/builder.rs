//! Build coordination: one build or two, with per-run layouts and build records.
//!
//! Every `build()` starts by putting the original layout and build record
//! back (or, the first time, saving them as the originals). A build that was
//! killed part-way and re-invoked therefore starts from the same state as the
//! first attempt instead of compounding changes made by hooks.

use crate::error::{HookError, Result};
use crate::models::{BuildScope, ConfigKind, PhaseId, Suffix};
use crate::system_tests::CompareTwoTest;
use crate::log_parsed;

use super::CompareTwo;

impl<'a, T: CompareTwoTest> CompareTwo<'a, T> {
    /// Build for the given scope.
    ///
    /// `sharedlib_only` and `model_only` may not both be set. Build failures
    /// from the runtime are returned unchanged.
    pub fn build(&mut self, sharedlib_only: bool, model_only: bool) -> Result<()> {
        let scope = BuildScope::from_flags(sharedlib_only, model_only)?;
        log_parsed!("[Build] Starting {} build", scope.as_str());

        self.restore_or_save_originals()?;
        if self.flags.runs_have_different_pe_settings {
            self.create_pe_snapshots()?;
        }
        self.test.pre_build(&mut *self.case)?;

        if self.flags.needs_two_builds(scope) {
            self.do_two_builds(scope)
        } else {
            if self.flags.runs_have_different_pe_settings {
                // one build but two layouts: build with run one's layout
                let suffix = self.run_one.suffix.clone();
                self.stage_pes(&suffix)?;
            }
            log::info!("[Build] Single {} build", scope.as_str());
            self.runtime.perform_build(&mut *self.case, scope)?;
            Ok(())
        }
    }

    /// Whether a build of this scope is done twice.
    pub fn needs_two_builds(&self, sharedlib_only: bool, model_only: bool) -> Result<bool> {
        let scope = BuildScope::from_flags(sharedlib_only, model_only)?;
        Ok(self.flags.needs_two_builds(scope))
    }

    /// Kinds of configuration this test changes between runs.
    fn managed_kinds(&self) -> Vec<ConfigKind> {
        let mut kinds = Vec::new();
        if self.flags.runs_have_different_pe_settings {
            kinds.push(ConfigKind::PeLayout);
        }
        if self.flags.has_two_executables() {
            kinds.push(ConfigKind::BuildRecord);
        }
        kinds
    }

    fn restore_or_save_originals(&mut self) -> Result<()> {
        let original = Suffix::original();
        let mut restored_any = false;

        for kind in self.managed_kinds() {
            if self.runtime.restore_snapshot(kind, &original)? {
                log::info!("[Build] Restored original {}", kind);
                restored_any = true;
            } else {
                log::info!("[Build] Saving current {} as the original", kind);
                self.runtime.save_snapshot(kind, &original)?;
            }
        }

        if restored_any {
            self.case.read_config()?;
        }
        Ok(())
    }

    /// Save one layout snapshot per run, adjusting the layout first.
    ///
    /// Done as its own step, before any build, so that it works the same with
    /// one build or two. Existing snapshots are kept, so the hooks run at most
    /// once per snapshot.
    fn create_pe_snapshots(&mut self) -> Result<()> {
        for id in [PhaseId::One, PhaseId::Two] {
            let suffix = self.phase(id).suffix.clone();
            if self.runtime.snapshot_exists(ConfigKind::PeLayout, &suffix) {
                log::debug!("[Build] Layout for suffix '{}' already saved", suffix);
                continue;
            }

            let hooks = self
                .test
                .pe_layouts()
                .ok_or(HookError::NotImplemented("adjust_pes_for_run_one/two"))?;
            match id {
                PhaseId::One => hooks.adjust_pes_for_run_one(&mut *self.case)?,
                PhaseId::Two => hooks.adjust_pes_for_run_two(&mut *self.case)?,
            }

            // the adjusted layout must be on disk before it is copied
            self.case.flush_config()?;
            self.runtime.save_snapshot(ConfigKind::PeLayout, &suffix)?;
            log::info!("[Build] Saved {} layout as '{}'", id.ordinal(), suffix);
        }
        Ok(())
    }

    fn do_two_builds(&mut self, scope: BuildScope) -> Result<()> {
        for id in [PhaseId::One, PhaseId::Two] {
            let suffix = self.phase(id).suffix.clone();
            if self.flags.runs_have_different_pe_settings {
                self.stage_pes(&suffix)?;
            }

            let hooks = self
                .test
                .two_builds()
                .ok_or(HookError::NotImplemented("build_one_setup/build_two_setup"))?;
            match id {
                PhaseId::One => hooks.build_one_setup(&mut *self.case)?,
                PhaseId::Two => hooks.build_two_setup(&mut *self.case)?,
            }

            log_parsed!("[Build] {} {} build ('{}')", id.ordinal(), scope.as_str(), suffix);
            self.runtime.perform_build(&mut *self.case, scope)?;
            self.runtime.save_build_artifacts(&suffix)?;
        }
        Ok(())
    }

    fn stage_pes(&mut self, suffix: &Suffix) -> Result<()> {
        self.runtime.stage_snapshot(ConfigKind::PeLayout, suffix)?;
        self.case.load_staged_config(true)?;
        Ok(())
    }
}
