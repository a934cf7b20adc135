//! Run State Management and Status Tracking
//!
//! This module provides the state tracking structures used by the orchestrator
//! while it drives the two runs and the comparison.
//!
//! **Architecture**:
//! - `RunState`: Enum representing discrete steps of `run()`
//! - `TestStatus`: Three-slot outcome record (run one, run two, compare)
//! - State transitions are validated; a failed run jumps straight to `Done`

use serde::{Deserialize, Serialize};

use crate::models::PhaseStatus;

/// Step of the run/compare sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RunState {
    /// Nothing has run yet
    Init,

    /// Common and run-one setup, staging of run-one files
    Run1Setup,

    /// Executing run one
    Run1Exec,

    /// Common and run-two setup, staging of run-two files
    Run2Setup,

    /// Executing run two
    Run2Exec,

    /// Comparing the outputs of both runs
    Compare,

    /// Terminal: after the comparison or after a failed run
    Done,
}

impl RunState {
    pub fn as_str(&self) -> &'static str {
        match self {
            RunState::Init => "init",
            RunState::Run1Setup => "run1-setup",
            RunState::Run1Exec => "run1-exec",
            RunState::Run2Setup => "run2-setup",
            RunState::Run2Exec => "run2-exec",
            RunState::Compare => "compare",
            RunState::Done => "done",
        }
    }

    /// Get all valid transitions FROM this state.
    pub fn valid_next_states(&self) -> Vec<RunState> {
        match self {
            RunState::Init => vec![RunState::Run1Setup],
            RunState::Run1Setup => vec![RunState::Run1Exec],
            RunState::Run1Exec => vec![RunState::Run2Setup, RunState::Done],
            RunState::Run2Setup => vec![RunState::Run2Exec],
            RunState::Run2Exec => vec![RunState::Compare, RunState::Done],
            RunState::Compare => vec![RunState::Done],
            RunState::Done => vec![],
        }
    }

    pub fn can_transition_to(&self, next: RunState) -> bool {
        self.valid_next_states().contains(&next)
    }

    pub fn is_terminal(&self) -> bool {
        *self == RunState::Done
    }
}

/// Outcome of the three steps of a comparison test.
///
/// Each slot starts `NotRun` and is written at most once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TestStatus {
    pub run_one: PhaseStatus,
    pub run_two: PhaseStatus,
    pub compare: PhaseStatus,
}

impl TestStatus {
    /// Pass only if the comparison passed, Fail if any step failed.
    pub fn overall(&self) -> PhaseStatus {
        let slots = [self.run_one, self.run_two, self.compare];
        if slots.contains(&PhaseStatus::Fail) {
            PhaseStatus::Fail
        } else if self.compare.is_pass() {
            PhaseStatus::Pass
        } else {
            PhaseStatus::NotRun
        }
    }

    /// One-line report, e.g. `run1=PASS run2=FAIL compare=NOT RUN`.
    pub fn summary(&self) -> String {
        format!(
            "run1={} run2={} compare={}",
            self.run_one, self.run_two, self.compare
        )
    }
}

/// Write a status slot exactly once.
pub(crate) fn record(slot: &mut PhaseStatus, success: bool) -> Result<PhaseStatus, String> {
    if *slot != PhaseStatus::NotRun {
        return Err(format!("status already recorded as {}", slot));
    }
    *slot = PhaseStatus::from_outcome(success);
    Ok(*slot)
}
