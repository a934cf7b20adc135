//! Helpers for tests that change a component's user namelist between runs.
//!
//! `save_user_nl_files` keeps pristine copies of `user_nl_<component>*` in
//! `<caseroot>/user_nl_save/`. Each run then calls `append_to_saved_files`,
//! which puts the pristine copy back and appends that run's settings, so the
//! changes of one run never leak into the other.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::CaseError;

/// Directory (relative to the case root) holding saved user_nl files.
pub const SAVE_DIR: &str = "user_nl_save";

fn user_nl_files(dir: &Path, component: &str) -> Result<Vec<PathBuf>, CaseError> {
    let prefix = format!("user_nl_{}", component);
    let mut files: Vec<PathBuf> = fs::read_dir(dir)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_file())
        .filter(|path| {
            path.file_name()
                .and_then(|name| name.to_str())
                .map_or(false, |name| name.starts_with(&prefix))
        })
        .collect();
    files.sort();
    Ok(files)
}

/// Save copies of the component's user_nl files.
///
/// Already-saved copies are left alone: the build may run more than once and
/// the saved copies must stay the originals.
pub fn save_user_nl_files(caseroot: &Path, component: &str) -> Result<usize, CaseError> {
    let save_dir = caseroot.join(SAVE_DIR);
    fs::create_dir_all(&save_dir)?;

    let mut saved = 0;
    for file in user_nl_files(caseroot, component)? {
        let Some(name) = file.file_name() else {
            continue;
        };
        let target = save_dir.join(name);
        if !target.exists() {
            fs::copy(&file, &target)?;
            saved += 1;
        }
    }
    log::debug!("[user_nl] Saved {} user_nl_{} file(s)", saved, component);
    Ok(saved)
}

/// Restore the saved user_nl files and append `contents` to each.
pub fn append_to_saved_files(
    caseroot: &Path,
    component: &str,
    contents: &str,
) -> Result<(), CaseError> {
    let save_dir = caseroot.join(SAVE_DIR);
    let saved = if save_dir.is_dir() {
        user_nl_files(&save_dir, component)?
    } else {
        Vec::new()
    };
    if saved.is_empty() {
        return Err(CaseError::SnapshotMissing {
            kind: format!("user_nl_{}", component),
            suffix: SAVE_DIR.to_string(),
        });
    }

    for file in saved {
        let Some(name) = file.file_name() else {
            continue;
        };
        let target = caseroot.join(name);
        fs::copy(&file, &target)?;
        let mut handle = fs::OpenOptions::new().append(true).open(&target)?;
        writeln!(handle, "\n{}", contents)?;
    }
    Ok(())
}
