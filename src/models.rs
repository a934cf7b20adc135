//! Core data types for the two-phase compare harness.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ConfigError;

/// Suffix used for saving original versions of configuration files.
pub const ORIGINAL_SUFFIX: &str = "original";

/// Suffix of the first run. Baseline generation and comparison tooling
/// assume this value, so it is not configurable.
pub const RUN_ONE_SUFFIX: &str = "base";

/// Default suffix of the second run.
pub const DEFAULT_RUN_TWO_SUFFIX: &str = "test";

static SUFFIX_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9][A-Za-z0-9_.\-]*$").expect("valid suffix regex"));

/// Tag distinguishing the artifacts and snapshots of one phase.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct Suffix(String);

impl Suffix {
    /// Validate and wrap a suffix. Trailing whitespace is stripped first.
    pub fn new(raw: &str) -> Result<Self, ConfigError> {
        let trimmed = raw.trim_end();
        if trimmed.is_empty() {
            return Err(ConfigError::EmptySuffix);
        }
        if !SUFFIX_REGEX.is_match(trimmed) {
            return Err(ConfigError::InvalidSuffix(trimmed.to_string()));
        }
        Ok(Suffix(trimmed.to_string()))
    }

    /// The reserved suffix for original-file backups.
    pub fn original() -> Self {
        Suffix(ORIGINAL_SUFFIX.to_string())
    }

    /// The fixed suffix of run one.
    pub fn run_one() -> Self {
        Suffix(RUN_ONE_SUFFIX.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_reserved(&self) -> bool {
        self.0 == ORIGINAL_SUFFIX
    }
}

impl fmt::Display for Suffix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Suffix {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Outcome of one step of the test (run one, run two, or the comparison).
///
/// Starts as `NotRun` and is set exactly once after the step executes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum PhaseStatus {
    #[default]
    #[serde(rename = "NOT RUN")]
    NotRun,
    #[serde(rename = "PASS")]
    Pass,
    #[serde(rename = "FAIL")]
    Fail,
}

impl PhaseStatus {
    pub fn from_outcome(success: bool) -> Self {
        if success {
            PhaseStatus::Pass
        } else {
            PhaseStatus::Fail
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PhaseStatus::NotRun => "NOT RUN",
            PhaseStatus::Pass => "PASS",
            PhaseStatus::Fail => "FAIL",
        }
    }

    pub fn is_pass(&self) -> bool {
        *self == PhaseStatus::Pass
    }
}

impl fmt::Display for PhaseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PhaseStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "NOT RUN" => Ok(PhaseStatus::NotRun),
            "PASS" => Ok(PhaseStatus::Pass),
            "FAIL" => Ok(PhaseStatus::Fail),
            _ => Err(format!("Unknown phase status: {}", s)),
        }
    }
}

/// Logical identity of a phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PhaseId {
    One,
    Two,
}

impl PhaseId {
    pub fn ordinal(&self) -> &'static str {
        match self {
            PhaseId::One => "first",
            PhaseId::Two => "second",
        }
    }
}

/// One of the two build/run cycles being compared.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Phase {
    pub id: PhaseId,
    pub suffix: Suffix,
    pub description: String,
    pub status: PhaseStatus,
}

impl Phase {
    pub fn new(id: PhaseId, suffix: Suffix, description: impl Into<String>) -> Self {
        Phase {
            id,
            suffix,
            description: description.into(),
            status: PhaseStatus::NotRun,
        }
    }
}

/// Configuration artifacts that the orchestrator snapshots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ConfigKind {
    /// Processor/resource layout settings (env_mach_pes).
    PeLayout,
    /// Record of what was built (env_build).
    BuildRecord,
}

impl ConfigKind {
    /// File stem used by the file-backed case store.
    pub fn file_stem(&self) -> &'static str {
        match self {
            ConfigKind::PeLayout => "env_mach_pes",
            ConfigKind::BuildRecord => "env_build",
        }
    }
}

impl fmt::Display for ConfigKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.file_stem())
    }
}

/// Which build targets a `build()` call covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BuildScope {
    /// Shared libraries and the model together.
    All,
    SharedLibOnly,
    ModelOnly,
}

impl BuildScope {
    /// Map the `(sharedlib_only, model_only)` call flags onto a scope.
    pub fn from_flags(sharedlib_only: bool, model_only: bool) -> Result<Self, ConfigError> {
        match (sharedlib_only, model_only) {
            (false, false) => Ok(BuildScope::All),
            (true, false) => Ok(BuildScope::SharedLibOnly),
            (false, true) => Ok(BuildScope::ModelOnly),
            (true, true) => Err(ConfigError::InvalidScope),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            BuildScope::All => "all",
            BuildScope::SharedLibOnly => "sharedlib",
            BuildScope::ModelOnly => "model",
        }
    }
}

/// Build-mode flags fixed at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BuildModeFlags {
    pub two_builds_for_sharedlib: bool,
    pub two_builds_for_model: bool,
    pub runs_have_different_pe_settings: bool,
}

impl BuildModeFlags {
    /// Whether a build of the given scope must be done twice.
    pub fn needs_two_builds(&self, scope: BuildScope) -> bool {
        match scope {
            BuildScope::All => self.two_builds_for_sharedlib || self.two_builds_for_model,
            BuildScope::SharedLibOnly => self.two_builds_for_sharedlib,
            BuildScope::ModelOnly => self.two_builds_for_model,
        }
    }

    /// Whether the two runs use different executables (and build records).
    pub fn has_two_executables(&self) -> bool {
        self.two_builds_for_sharedlib || self.two_builds_for_model
    }
}

/// A typed value stored in the case configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CaseValue {
    Bool(bool),
    Int(i64),
    Str(String),
}

impl CaseValue {
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            CaseValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            CaseValue::Int(i) => Some(*i),
            CaseValue::Str(s) => s.trim().parse().ok(),
            CaseValue::Bool(_) => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            CaseValue::Str(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for CaseValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CaseValue::Bool(b) => write!(f, "{}", if *b { "TRUE" } else { "FALSE" }),
            CaseValue::Int(i) => write!(f, "{}", i),
            CaseValue::Str(s) => f.write_str(s),
        }
    }
}

impl From<bool> for CaseValue {
    fn from(b: bool) -> Self {
        CaseValue::Bool(b)
    }
}

impl From<i64> for CaseValue {
    fn from(i: i64) -> Self {
        CaseValue::Int(i)
    }
}

impl From<&str> for CaseValue {
    fn from(s: &str) -> Self {
        CaseValue::Str(s.to_string())
    }
}

impl From<String> for CaseValue {
    fn from(s: String) -> Self {
        CaseValue::Str(s)
    }
}
