//! JSON-backed case configuration store.
//!
//! A case directory holds three flat key/value files:
//! - `env_run.json`: runtime options (STOP_N, CONTINUE_RUN, ...)
//! - `env_mach_pes.json`: processor layout (NTASKS_*, NTHRDS_*, TOTALPES)
//! - `env_build.json`: build record
//!
//! Only `env_mach_pes` and `env_build` are ever snapshotted or staged.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::CaseError;
use crate::models::{CaseValue, ConfigKind};

use super::Case;

/// Key holding the derived total processor count.
pub const TOTALPES_KEY: &str = "TOTALPES";

const NTASKS_PREFIX: &str = "NTASKS_";

/// One of the configuration files of a case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum CaseFile {
    Run,
    MachPes,
    Build,
}

impl CaseFile {
    pub const ALL: [CaseFile; 3] = [CaseFile::Run, CaseFile::MachPes, CaseFile::Build];

    pub fn file_name(&self) -> &'static str {
        match self {
            CaseFile::Run => "env_run.json",
            CaseFile::MachPes => "env_mach_pes.json",
            CaseFile::Build => "env_build.json",
        }
    }
}

impl From<ConfigKind> for CaseFile {
    fn from(kind: ConfigKind) -> Self {
        match kind {
            ConfigKind::PeLayout => CaseFile::MachPes,
            ConfigKind::BuildRecord => CaseFile::Build,
        }
    }
}

type Entries = BTreeMap<String, CaseValue>;

/// Case store persisted as JSON files in the case root.
#[derive(Debug, Clone)]
pub struct FileCase {
    caseroot: PathBuf,
    files: BTreeMap<CaseFile, Entries>,
    dirty: bool,
}

impl FileCase {
    /// Open a case directory and load its configuration.
    pub fn open(caseroot: impl Into<PathBuf>) -> Result<Self, CaseError> {
        let mut case = FileCase {
            caseroot: caseroot.into(),
            files: BTreeMap::new(),
            dirty: false,
        };
        case.read_config()?;
        Ok(case)
    }

    /// Create a case directory with the given initial values and write it out.
    pub fn create(
        caseroot: impl Into<PathBuf>,
        initial: &[(CaseFile, &str, CaseValue)],
    ) -> Result<Self, CaseError> {
        let caseroot = caseroot.into();
        fs::create_dir_all(&caseroot)?;
        let mut case = FileCase {
            caseroot,
            files: CaseFile::ALL.iter().map(|f| (*f, Entries::new())).collect(),
            dirty: true,
        };
        for (file, key, value) in initial {
            case.set_in(*file, key, value.clone());
        }
        case.flush_config()?;
        Ok(case)
    }

    pub fn path_of(&self, file: CaseFile) -> PathBuf {
        self.caseroot.join(file.file_name())
    }

    /// Set a value in a specific file, moving it out of any other file.
    pub fn set_in(&mut self, file: CaseFile, key: &str, value: CaseValue) {
        for (other, entries) in self.files.iter_mut() {
            if *other != file {
                entries.remove(key);
            }
        }
        self.files
            .entry(file)
            .or_default()
            .insert(key.to_string(), value);
        self.dirty = true;
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    fn file_holding(&self, key: &str) -> Option<CaseFile> {
        self.files
            .iter()
            .find(|(_, entries)| entries.contains_key(key))
            .map(|(file, _)| *file)
    }

    fn load_file(path: &Path) -> Result<Entries, CaseError> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Entries::new()),
            Err(e) => return Err(CaseError::Io(e)),
        };
        serde_json::from_str(&content).map_err(|source| CaseError::Malformed {
            file: path.display().to_string(),
            source,
        })
    }

    fn recompute_totalpes(&mut self) {
        let total: i64 = self
            .files
            .get(&CaseFile::MachPes)
            .map(|entries| {
                entries
                    .iter()
                    .filter(|(key, _)| key.starts_with(NTASKS_PREFIX))
                    .filter_map(|(_, value)| value.as_int())
                    .sum()
            })
            .unwrap_or(0);
        log::debug!("[Case] Recomputed {} = {}", TOTALPES_KEY, total);
        self.set_in(CaseFile::MachPes, TOTALPES_KEY, CaseValue::Int(total));
    }
}

impl Case for FileCase {
    fn caseroot(&self) -> &Path {
        &self.caseroot
    }

    fn get_value(&self, key: &str) -> Option<CaseValue> {
        self.files
            .values()
            .find_map(|entries| entries.get(key).cloned())
    }

    fn set_value(&mut self, key: &str, value: CaseValue) -> Result<(), CaseError> {
        let file = self.file_holding(key).unwrap_or(CaseFile::Run);
        self.set_in(file, key, value);
        Ok(())
    }

    fn read_config(&mut self) -> Result<(), CaseError> {
        let mut files = BTreeMap::new();
        for file in CaseFile::ALL {
            files.insert(file, Self::load_file(&self.path_of(file))?);
        }
        self.files = files;
        self.dirty = false;
        Ok(())
    }

    fn flush_config(&mut self) -> Result<(), CaseError> {
        for file in CaseFile::ALL {
            let entries = self.files.get(&file).cloned().unwrap_or_default();
            let json = serde_json::to_string_pretty(&entries).map_err(|source| {
                CaseError::Malformed {
                    file: file.file_name().to_string(),
                    source,
                }
            })?;
            fs::write(self.path_of(file), json)?;
        }
        self.dirty = false;
        Ok(())
    }

    fn load_staged_config(&mut self, modified_pes: bool) -> Result<(), CaseError> {
        self.read_config()?;
        if modified_pes {
            self.recompute_totalpes();
            self.flush_config()?;
        }
        Ok(())
    }
}
