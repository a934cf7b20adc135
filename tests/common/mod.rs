//! Recording fakes shared by the orchestrator integration tests.
//!
//! `FakeCase`, `FakeRuntime` and `FakeTest` append every hook and
//! collaborator call to one shared log, so a test can assert on the exact
//! interleaving of case, runtime and hook calls.

#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use std::rc::Rc;

use two_phase_compare::{
    BuildScope, Case, CaseError, CaseValue, CompareTwoSettings, CompareTwoTest, ConfigKind,
    HookError, PeLayoutHooks, RuntimeError, Suffix, TestRuntime, TwoBuildHooks,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    // test hooks
    PreBuild,
    CommonSetup,
    RunOneSetup,
    RunTwoSetup,
    AdjustPesOne,
    AdjustPesTwo,
    BuildOneSetup,
    BuildTwoSetup,

    // case
    ReadConfig,
    FlushConfig,
    LoadStaged(bool),

    // runtime
    SaveSnapshot(ConfigKind, String),
    RestoreSnapshot(ConfigKind, String),
    StageSnapshot(ConfigKind, String),
    SaveBuild(String),
    StageBuild(String),
    Build(BuildScope),
    Execute(String),
    Compare(String, String),
}

pub type Recorder = Rc<RefCell<Vec<Call>>>;

pub fn recorder() -> Recorder {
    Rc::new(RefCell::new(Vec::new()))
}

pub fn calls(rec: &Recorder) -> Vec<Call> {
    rec.borrow().clone()
}

pub fn count(rec: &Recorder, call: &Call) -> usize {
    rec.borrow().iter().filter(|c| *c == call).count()
}

pub fn clear(rec: &Recorder) {
    rec.borrow_mut().clear();
}

pub fn stage(kind: ConfigKind, suffix: &str) -> Call {
    Call::StageSnapshot(kind, suffix.to_string())
}

pub fn save(kind: ConfigKind, suffix: &str) -> Call {
    Call::SaveSnapshot(kind, suffix.to_string())
}

pub fn restore(kind: ConfigKind, suffix: &str) -> Call {
    Call::RestoreSnapshot(kind, suffix.to_string())
}

pub fn execute(suffix: &str) -> Call {
    Call::Execute(suffix.to_string())
}

pub fn compared(a: &str, b: &str) -> Call {
    Call::Compare(a.to_string(), b.to_string())
}

// ============================================================================
// Case
// ============================================================================

pub struct FakeCase {
    caseroot: PathBuf,
    values: BTreeMap<String, CaseValue>,
    calls: Recorder,
    pub fail_flush: bool,
}

impl FakeCase {
    pub fn new(calls: &Recorder) -> Self {
        FakeCase {
            caseroot: PathBuf::from("/nonexistent/case"),
            values: BTreeMap::new(),
            calls: Rc::clone(calls),
            fail_flush: false,
        }
    }
}

impl Case for FakeCase {
    fn caseroot(&self) -> &Path {
        &self.caseroot
    }

    fn get_value(&self, key: &str) -> Option<CaseValue> {
        self.values.get(key).cloned()
    }

    fn set_value(&mut self, key: &str, value: CaseValue) -> Result<(), CaseError> {
        self.values.insert(key.to_string(), value);
        Ok(())
    }

    fn read_config(&mut self) -> Result<(), CaseError> {
        self.calls.borrow_mut().push(Call::ReadConfig);
        Ok(())
    }

    fn flush_config(&mut self) -> Result<(), CaseError> {
        self.calls.borrow_mut().push(Call::FlushConfig);
        if self.fail_flush {
            return Err(CaseError::Io(std::io::Error::new(
                std::io::ErrorKind::PermissionDenied,
                "read-only case",
            )));
        }
        Ok(())
    }

    fn load_staged_config(&mut self, modified_pes: bool) -> Result<(), CaseError> {
        self.calls.borrow_mut().push(Call::LoadStaged(modified_pes));
        Ok(())
    }
}

// ============================================================================
// Runtime
// ============================================================================

pub struct FakeRuntime {
    calls: Recorder,
    snapshots: BTreeSet<(ConfigKind, String)>,
    pub run_one_passes: bool,
    pub run_two_passes: bool,
    pub compare_passes: bool,
    pub build_fails: bool,
}

impl FakeRuntime {
    pub fn new(calls: &Recorder) -> Self {
        FakeRuntime {
            calls: Rc::clone(calls),
            snapshots: BTreeSet::new(),
            run_one_passes: true,
            run_two_passes: true,
            compare_passes: true,
            build_fails: false,
        }
    }

    /// Pretend a snapshot was saved by an earlier build.
    pub fn with_snapshot(mut self, kind: ConfigKind, suffix: &str) -> Self {
        self.snapshots.insert((kind, suffix.to_string()));
        self
    }

    /// Pretend the layout and build snapshots of both runs exist.
    pub fn with_all_run_snapshots(self, run_two_suffix: &str) -> Self {
        self.with_snapshot(ConfigKind::PeLayout, "base")
            .with_snapshot(ConfigKind::PeLayout, run_two_suffix)
            .with_snapshot(ConfigKind::BuildRecord, "base")
            .with_snapshot(ConfigKind::BuildRecord, run_two_suffix)
    }

    pub fn has_snapshot(&self, kind: ConfigKind, suffix: &str) -> bool {
        self.snapshots.contains(&(kind, suffix.to_string()))
    }

    fn record(&self, call: Call) {
        self.calls.borrow_mut().push(call);
    }

    fn missing(kind: &str, suffix: &Suffix) -> CaseError {
        CaseError::SnapshotMissing {
            kind: kind.to_string(),
            suffix: suffix.to_string(),
        }
    }
}

impl TestRuntime for FakeRuntime {
    fn snapshot_exists(&self, kind: ConfigKind, suffix: &Suffix) -> bool {
        self.has_snapshot(kind, suffix.as_str())
    }

    fn save_snapshot(&mut self, kind: ConfigKind, suffix: &Suffix) -> Result<(), CaseError> {
        self.record(Call::SaveSnapshot(kind, suffix.to_string()));
        self.snapshots.insert((kind, suffix.to_string()));
        Ok(())
    }

    fn restore_snapshot(&mut self, kind: ConfigKind, suffix: &Suffix) -> Result<bool, CaseError> {
        self.record(Call::RestoreSnapshot(kind, suffix.to_string()));
        Ok(self.snapshot_exists(kind, suffix))
    }

    fn stage_snapshot(&mut self, kind: ConfigKind, suffix: &Suffix) -> Result<(), CaseError> {
        self.record(Call::StageSnapshot(kind, suffix.to_string()));
        if !self.snapshot_exists(kind, suffix) {
            return Err(Self::missing(kind.file_stem(), suffix));
        }
        Ok(())
    }

    fn save_build_artifacts(&mut self, suffix: &Suffix) -> Result<(), CaseError> {
        self.record(Call::SaveBuild(suffix.to_string()));
        self.snapshots
            .insert((ConfigKind::BuildRecord, suffix.to_string()));
        Ok(())
    }

    fn stage_build_artifacts(&mut self, suffix: &Suffix) -> Result<(), CaseError> {
        self.record(Call::StageBuild(suffix.to_string()));
        if !self.snapshot_exists(ConfigKind::BuildRecord, suffix) {
            return Err(Self::missing("build", suffix));
        }
        Ok(())
    }

    fn perform_build(
        &mut self,
        _case: &mut dyn Case,
        scope: BuildScope,
    ) -> Result<(), RuntimeError> {
        self.record(Call::Build(scope));
        if self.build_fails {
            return Err(RuntimeError::BuildFailed("exit status 2".to_string()));
        }
        Ok(())
    }

    fn execute_phase(
        &mut self,
        _case: &mut dyn Case,
        suffix: &Suffix,
    ) -> Result<bool, RuntimeError> {
        self.record(Call::Execute(suffix.to_string()));
        if suffix.as_str() == "base" {
            Ok(self.run_one_passes)
        } else {
            Ok(self.run_two_passes)
        }
    }

    fn compare(
        &mut self,
        _case: &mut dyn Case,
        suffix_a: &Suffix,
        suffix_b: &Suffix,
    ) -> Result<bool, RuntimeError> {
        self.record(Call::Compare(suffix_a.to_string(), suffix_b.to_string()));
        Ok(self.compare_passes)
    }
}

// ============================================================================
// Test hooks
// ============================================================================

pub struct FakeTest {
    calls: Recorder,
    pub provides_pe_hooks: bool,
    pub provides_build_hooks: bool,
    pub fail_run_two_setup: bool,
    /// Capability lookups answered before the hooks are withdrawn.
    pub withdraw_hooks_after: Option<usize>,
    hook_lookups: usize,
}

impl FakeTest {
    /// A test providing every optional capability.
    pub fn new(calls: &Recorder) -> Self {
        FakeTest {
            calls: Rc::clone(calls),
            provides_pe_hooks: true,
            provides_build_hooks: true,
            fail_run_two_setup: false,
            withdraw_hooks_after: None,
            hook_lookups: 0,
        }
    }

    /// A test with only the required hooks.
    pub fn minimal(calls: &Recorder) -> Self {
        FakeTest {
            provides_pe_hooks: false,
            provides_build_hooks: false,
            ..FakeTest::new(calls)
        }
    }

    fn record(&self, call: Call) -> Result<(), HookError> {
        self.calls.borrow_mut().push(call);
        Ok(())
    }

    fn hooks_available(&mut self, provided: bool) -> bool {
        self.hook_lookups += 1;
        provided
            && self
                .withdraw_hooks_after
                .map_or(true, |limit| self.hook_lookups <= limit)
    }
}

impl CompareTwoTest for FakeTest {
    fn run_common_setup(&mut self, _case: &mut dyn Case) -> Result<(), HookError> {
        self.record(Call::CommonSetup)
    }

    fn run_one_setup(&mut self, _case: &mut dyn Case) -> Result<(), HookError> {
        self.record(Call::RunOneSetup)
    }

    fn run_two_setup(&mut self, _case: &mut dyn Case) -> Result<(), HookError> {
        self.record(Call::RunTwoSetup)?;
        if self.fail_run_two_setup {
            return Err(HookError::Failed("run two setup exploded".to_string()));
        }
        Ok(())
    }

    fn pre_build(&mut self, _case: &mut dyn Case) -> Result<(), HookError> {
        self.record(Call::PreBuild)
    }

    fn pe_layouts(&mut self) -> Option<&mut dyn PeLayoutHooks> {
        if self.hooks_available(self.provides_pe_hooks) {
            Some(self as &mut dyn PeLayoutHooks)
        } else {
            None
        }
    }

    fn two_builds(&mut self) -> Option<&mut dyn TwoBuildHooks> {
        if self.hooks_available(self.provides_build_hooks) {
            Some(self as &mut dyn TwoBuildHooks)
        } else {
            None
        }
    }
}

impl PeLayoutHooks for FakeTest {
    fn adjust_pes_for_run_one(&mut self, case: &mut dyn Case) -> Result<(), HookError> {
        case.set_value("NTASKS_ATM", CaseValue::Int(8))?;
        self.record(Call::AdjustPesOne)
    }

    fn adjust_pes_for_run_two(&mut self, case: &mut dyn Case) -> Result<(), HookError> {
        case.set_value("NTASKS_ATM", CaseValue::Int(4))?;
        self.record(Call::AdjustPesTwo)
    }
}

impl TwoBuildHooks for FakeTest {
    fn build_one_setup(&mut self, _case: &mut dyn Case) -> Result<(), HookError> {
        self.record(Call::BuildOneSetup)
    }

    fn build_two_setup(&mut self, _case: &mut dyn Case) -> Result<(), HookError> {
        self.record(Call::BuildTwoSetup)
    }
}

pub fn settings(
    two_builds_for_sharedlib: bool,
    two_builds_for_model: bool,
    runs_have_different_pe_settings: bool,
) -> CompareTwoSettings {
    CompareTwoSettings {
        two_builds_for_sharedlib,
        two_builds_for_model,
        runs_have_different_pe_settings,
        ..CompareTwoSettings::default()
    }
    .with_descriptions("baseline", "variant")
}
