//! Integration tests for the run/compare sequence of `CompareTwo::run`.
//!
//! Call orderings are asserted against the shared recording log, so every
//! staging, execution and comparison call is checked in context.

mod common;

use common::*;
use two_phase_compare::{
    CompareTwo, CompareTwoError, ConfigKind, HookError, PhaseStatus, RunState,
};

#[test]
fn test_run_without_flags_stages_nothing() {
    let rec = recorder();
    let mut case = FakeCase::new(&rec);
    let mut runtime = FakeRuntime::new(&rec);
    let test = FakeTest::minimal(&rec);

    let mut compare =
        CompareTwo::new(&mut case, &mut runtime, test, &settings(false, false, false)).unwrap();
    assert!(compare.run().unwrap());

    assert_eq!(
        calls(&rec),
        vec![
            Call::CommonSetup,
            Call::RunOneSetup,
            execute("base"),
            Call::CommonSetup,
            Call::RunTwoSetup,
            execute("test"),
            compared("base", "test"),
        ]
    );
    assert_eq!(compare.run_one_status(), PhaseStatus::Pass);
    assert_eq!(compare.run_two_status(), PhaseStatus::Pass);
    assert_eq!(compare.compare_status(), PhaseStatus::Pass);
    assert_eq!(compare.state(), RunState::Done);
}

#[test]
fn test_run_with_two_model_builds_stages_build_artifacts() {
    let rec = recorder();
    let mut case = FakeCase::new(&rec);
    let mut runtime = FakeRuntime::new(&rec).with_all_run_snapshots("test");
    let test = FakeTest::new(&rec);

    let mut compare =
        CompareTwo::new(&mut case, &mut runtime, test, &settings(false, true, false)).unwrap();
    assert!(compare.run().unwrap());

    assert_eq!(
        calls(&rec),
        vec![
            Call::CommonSetup,
            Call::RunOneSetup,
            Call::StageBuild("base".to_string()),
            Call::LoadStaged(false),
            execute("base"),
            Call::CommonSetup,
            Call::RunTwoSetup,
            Call::StageBuild("test".to_string()),
            Call::LoadStaged(false),
            execute("test"),
            compared("base", "test"),
        ]
    );
}

#[test]
fn test_run_with_different_pes_stages_layouts() {
    let rec = recorder();
    let mut case = FakeCase::new(&rec);
    let mut runtime = FakeRuntime::new(&rec).with_all_run_snapshots("test");
    let test = FakeTest::new(&rec);

    let mut compare =
        CompareTwo::new(&mut case, &mut runtime, test, &settings(false, false, true)).unwrap();
    assert!(compare.run().unwrap());

    assert_eq!(
        calls(&rec),
        vec![
            Call::CommonSetup,
            Call::RunOneSetup,
            stage(ConfigKind::PeLayout, "base"),
            Call::LoadStaged(true),
            execute("base"),
            Call::CommonSetup,
            Call::RunTwoSetup,
            stage(ConfigKind::PeLayout, "test"),
            Call::LoadStaged(true),
            execute("test"),
            compared("base", "test"),
        ]
    );
}

#[test]
fn test_run_with_both_flags_reloads_once_per_run() {
    let rec = recorder();
    let mut case = FakeCase::new(&rec);
    let mut runtime = FakeRuntime::new(&rec).with_all_run_snapshots("test");
    let test = FakeTest::new(&rec);

    let mut compare =
        CompareTwo::new(&mut case, &mut runtime, test, &settings(true, false, true)).unwrap();
    assert!(compare.run().unwrap());

    let log = calls(&rec);
    assert_eq!(
        &log[2..5],
        &[
            stage(ConfigKind::PeLayout, "base"),
            Call::StageBuild("base".to_string()),
            Call::LoadStaged(true),
        ]
    );
    assert_eq!(count(&rec, &Call::LoadStaged(true)), 2);
    assert_eq!(count(&rec, &Call::LoadStaged(false)), 0);
}

#[test]
fn test_run_uses_configured_run_two_suffix() {
    let rec = recorder();
    let mut case = FakeCase::new(&rec);
    let mut runtime = FakeRuntime::new(&rec);
    let mut config = settings(false, false, false);
    config.run_two_suffix = "rest  ".to_string();

    let mut compare =
        CompareTwo::new(&mut case, &mut runtime, FakeTest::minimal(&rec), &config).unwrap();
    assert_eq!(compare.run_two_suffix().as_str(), "rest");
    compare.run().unwrap();

    assert_eq!(count(&rec, &execute("rest")), 1);
    assert_eq!(count(&rec, &compared("base", "rest")), 1);
}

#[test]
fn test_run_one_failure_skips_everything_after() {
    let rec = recorder();
    let mut case = FakeCase::new(&rec);
    let mut runtime = FakeRuntime::new(&rec);
    runtime.run_one_passes = false;

    let mut compare = CompareTwo::new(
        &mut case,
        &mut runtime,
        FakeTest::minimal(&rec),
        &settings(false, false, false),
    )
    .unwrap();
    assert!(!compare.run().unwrap());

    assert_eq!(
        calls(&rec),
        vec![Call::CommonSetup, Call::RunOneSetup, execute("base")]
    );
    assert_eq!(compare.run_one_status(), PhaseStatus::Fail);
    assert_eq!(compare.run_two_status(), PhaseStatus::NotRun);
    assert_eq!(compare.compare_status(), PhaseStatus::NotRun);
    assert_eq!(compare.state(), RunState::Done);
}

#[test]
fn test_run_two_failure_skips_compare() {
    let rec = recorder();
    let mut case = FakeCase::new(&rec);
    let mut runtime = FakeRuntime::new(&rec);
    runtime.run_two_passes = false;

    let mut compare = CompareTwo::new(
        &mut case,
        &mut runtime,
        FakeTest::minimal(&rec),
        &settings(false, false, false),
    )
    .unwrap();
    assert!(!compare.run().unwrap());

    assert_eq!(count(&rec, &compared("base", "test")), 0);
    assert_eq!(compare.run_one_status(), PhaseStatus::Pass);
    assert_eq!(compare.run_two_status(), PhaseStatus::Fail);
    assert_eq!(compare.compare_status(), PhaseStatus::NotRun);
    assert_eq!(compare.status().overall(), PhaseStatus::Fail);
}

#[test]
fn test_compare_failure_is_recorded() {
    let rec = recorder();
    let mut case = FakeCase::new(&rec);
    let mut runtime = FakeRuntime::new(&rec);
    runtime.compare_passes = false;

    let mut compare = CompareTwo::new(
        &mut case,
        &mut runtime,
        FakeTest::minimal(&rec),
        &settings(false, false, false),
    )
    .unwrap();
    assert!(!compare.run().unwrap());

    assert_eq!(compare.run_one_status(), PhaseStatus::Pass);
    assert_eq!(compare.run_two_status(), PhaseStatus::Pass);
    assert_eq!(compare.compare_status(), PhaseStatus::Fail);
    assert_eq!(
        compare.status().summary(),
        "run1=PASS run2=PASS compare=FAIL"
    );
}

#[test]
fn test_hook_error_propagates_and_leaves_statuses() {
    let rec = recorder();
    let mut case = FakeCase::new(&rec);
    let mut runtime = FakeRuntime::new(&rec);
    let mut test = FakeTest::minimal(&rec);
    test.fail_run_two_setup = true;

    let mut compare =
        CompareTwo::new(&mut case, &mut runtime, test, &settings(false, false, false)).unwrap();
    let err = compare.run().unwrap_err();

    assert!(matches!(err, CompareTwoError::Hook(HookError::Failed(_))));
    assert_eq!(compare.run_one_status(), PhaseStatus::Pass);
    assert_eq!(compare.run_two_status(), PhaseStatus::NotRun);
    assert_eq!(count(&rec, &execute("test")), 0);
}

#[test]
fn test_missing_staged_snapshot_is_an_error() {
    let rec = recorder();
    let mut case = FakeCase::new(&rec);
    let mut runtime = FakeRuntime::new(&rec);

    let mut compare = CompareTwo::new(
        &mut case,
        &mut runtime,
        FakeTest::new(&rec),
        &settings(false, false, true),
    )
    .unwrap();
    let err = compare.run().unwrap_err();

    assert!(matches!(err, CompareTwoError::Case(_)));
    assert_eq!(count(&rec, &execute("base")), 0);
    assert_eq!(compare.run_one_status(), PhaseStatus::NotRun);
}

#[test]
fn test_second_run_is_rejected() {
    let rec = recorder();
    let mut case = FakeCase::new(&rec);
    let mut runtime = FakeRuntime::new(&rec);

    let mut compare = CompareTwo::new(
        &mut case,
        &mut runtime,
        FakeTest::minimal(&rec),
        &settings(false, false, false),
    )
    .unwrap();
    compare.run().unwrap();
    clear(&rec);

    assert!(matches!(
        compare.run(),
        Err(CompareTwoError::InvalidState(_))
    ));
    assert!(calls(&rec).is_empty());
    assert_eq!(compare.compare_status(), PhaseStatus::Pass);
}
