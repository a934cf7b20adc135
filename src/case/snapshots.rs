//! Suffix-tagged copies of case configuration files.
//!
//! Snapshots live in `<caseroot>/.compare_two/<file>.<suffix>`. A snapshot is
//! written once and afterwards only read, staged back over the live file, or
//! explicitly invalidated.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::CaseError;
use crate::models::{ConfigKind, Suffix};

use super::file_case::CaseFile;

/// Directory (relative to the case root) holding saved snapshots.
pub const SNAPSHOT_DIR: &str = ".compare_two";

/// File-system snapshot storage for one case.
#[derive(Debug, Clone)]
pub struct FileSnapshotStore {
    caseroot: PathBuf,
    /// Executable produced by the build, relative to the case root.
    executable: Option<PathBuf>,
}

impl FileSnapshotStore {
    pub fn new(caseroot: impl Into<PathBuf>) -> Self {
        FileSnapshotStore {
            caseroot: caseroot.into(),
            executable: None,
        }
    }

    /// Also save and stage this executable alongside the build record.
    pub fn with_executable(mut self, executable: impl Into<PathBuf>) -> Self {
        self.executable = Some(executable.into());
        self
    }

    pub fn caseroot(&self) -> &Path {
        &self.caseroot
    }

    fn live_path(&self, kind: ConfigKind) -> PathBuf {
        self.caseroot.join(CaseFile::from(kind).file_name())
    }

    pub fn snapshot_path(&self, kind: ConfigKind, suffix: &Suffix) -> PathBuf {
        self.caseroot.join(SNAPSHOT_DIR).join(format!(
            "{}.{}",
            CaseFile::from(kind).file_name(),
            suffix
        ))
    }

    fn executable_paths(&self, suffix: &Suffix) -> Option<(PathBuf, PathBuf)> {
        let exe = self.caseroot.join(self.executable.as_ref()?);
        let mut saved = exe.clone().into_os_string();
        saved.push(format!(".{}", suffix));
        Some((exe, PathBuf::from(saved)))
    }

    pub fn exists(&self, kind: ConfigKind, suffix: &Suffix) -> bool {
        self.snapshot_path(kind, suffix).is_file()
    }

    /// Copy the live file to the snapshot location.
    ///
    /// A live file that does not exist yet is saved as an empty JSON object so
    /// that a later restore reproduces the original state.
    pub fn save(&self, kind: ConfigKind, suffix: &Suffix) -> Result<(), CaseError> {
        let target = self.snapshot_path(kind, suffix);
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)?;
        }
        let live = self.live_path(kind);
        if live.exists() {
            fs::copy(&live, &target)?;
        } else {
            fs::write(&target, "{}")?;
        }
        log::debug!("[Snapshot] Saved {} as {}", kind, target.display());
        Ok(())
    }

    /// Copy a snapshot back over the live file if it exists.
    pub fn restore(&self, kind: ConfigKind, suffix: &Suffix) -> Result<bool, CaseError> {
        if !self.exists(kind, suffix) {
            return Ok(false);
        }
        fs::copy(self.snapshot_path(kind, suffix), self.live_path(kind))?;
        log::debug!("[Snapshot] Restored {} from suffix '{}'", kind, suffix);
        Ok(true)
    }

    /// Like `restore`, but a missing snapshot is an error.
    pub fn stage(&self, kind: ConfigKind, suffix: &Suffix) -> Result<(), CaseError> {
        if self.restore(kind, suffix)? {
            Ok(())
        } else {
            Err(CaseError::SnapshotMissing {
                kind: kind.to_string(),
                suffix: suffix.to_string(),
            })
        }
    }

    /// Remove a snapshot so the next build recreates it.
    pub fn invalidate(&self, kind: ConfigKind, suffix: &Suffix) -> Result<bool, CaseError> {
        let path = self.snapshot_path(kind, suffix);
        if !path.exists() {
            return Ok(false);
        }
        fs::remove_file(path)?;
        Ok(true)
    }

    pub fn save_build(&self, suffix: &Suffix) -> Result<(), CaseError> {
        self.save(ConfigKind::BuildRecord, suffix)?;
        if let Some((exe, saved)) = self.executable_paths(suffix) {
            if exe.exists() {
                fs::copy(&exe, &saved)?;
            } else {
                // sharedlib-only builds produce no executable
                log::warn!(
                    "[Snapshot] No executable at {} to save for suffix '{}'",
                    exe.display(),
                    suffix
                );
            }
        }
        Ok(())
    }

    pub fn stage_build(&self, suffix: &Suffix) -> Result<(), CaseError> {
        self.stage(ConfigKind::BuildRecord, suffix)?;
        if let Some((exe, saved)) = self.executable_paths(suffix) {
            if saved.exists() {
                fs::copy(&saved, &exe)?;
            } else {
                // only the shared libraries were built twice
                log::info!(
                    "[Snapshot] No executable saved for suffix '{}', keeping {}",
                    suffix,
                    exe.display()
                );
            }
        }
        Ok(())
    }
}
