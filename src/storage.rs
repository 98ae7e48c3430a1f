//! Storage layer: the task list as a single JSON document on disk.

use crate::repository::StoreError;
use crate::types::{Task, ValidationError};
use eyre::Result;
use std::collections::HashSet;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tempfile::Builder;

/// Suffix for the copy kept when a corrupt store is recovered.
const CORRUPT_SUFFIX: &str = ".corrupt";

/// Storage handle for reading/writing the task file.
#[derive(Debug, Clone)]
pub struct Storage {
    path: PathBuf,
}

impl Storage {
    /// Create a handle for the store at `path`. Nothing is touched on disk.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the store file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Path the first corrupt copy goes to; later copies get `.1`, `.2`, ...
    pub fn corrupt_path(&self) -> PathBuf {
        self.corrupt_candidate(0)
    }

    fn corrupt_candidate(&self, n: u32) -> PathBuf {
        let mut name = self.path.as_os_str().to_os_string();
        name.push(CORRUPT_SUFFIX);
        if n > 0 {
            name.push(format!(".{}", n));
        }
        PathBuf::from(name)
    }

    /// Load every task.
    ///
    /// A missing or blank file is an empty store. Unparseable content, or
    /// content that breaks the store invariants, fails with
    /// [`StoreError::CorruptStore`].
    pub fn load(&self) -> Result<Vec<Task>> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                log::debug!("No store at {}, starting empty", self.path.display());
                return Ok(Vec::new());
            }
            Err(source) => {
                return Err(eyre::eyre!(StoreError::StoreRead {
                    path: self.path.clone(),
                    source,
                }));
            }
        };

        let tasks = decode(&bytes).map_err(|reason| {
            eyre::eyre!(StoreError::CorruptStore {
                path: self.path.clone(),
                reason,
            })
        })?;

        log::debug!("Loaded {} task(s) from {}", tasks.len(), self.path.display());
        Ok(tasks)
    }

    /// Replace the store content with `tasks`.
    ///
    /// Writes a temp file next to the target, syncs it, and renames it into
    /// place, so a failure leaves the previous content untouched.
    pub fn save(&self, tasks: &[Task]) -> Result<()> {
        let mut json = serde_json::to_vec_pretty(tasks)?;
        json.push(b'\n');

        self.write_atomic(&json).map_err(|source| {
            eyre::eyre!(StoreError::StoreWrite {
                path: self.path.clone(),
                source,
            })
        })?;

        log::debug!("Saved {} task(s) to {}", tasks.len(), self.path.display());
        Ok(())
    }

    /// Copy the current store file aside and return where it went.
    ///
    /// Earlier copies are never overwritten: the first free name out of
    /// [`Storage::corrupt_path`], then `<that>.1`, `<that>.2`, ... is used.
    pub fn quarantine(&self) -> Result<PathBuf> {
        let mut n = 0;
        loop {
            let target = self.corrupt_candidate(n);
            let write_err = |source| {
                eyre::eyre!(StoreError::StoreWrite {
                    path: target.clone(),
                    source,
                })
            };

            match fs::OpenOptions::new().write(true).create_new(true).open(&target) {
                Ok(mut copy) => {
                    let mut original = fs::File::open(&self.path).map_err(write_err)?;
                    io::copy(&mut original, &mut copy).map_err(write_err)?;
                    log::info!("Copied corrupt store to {}", target.display());
                    return Ok(target);
                }
                Err(e) if e.kind() == io::ErrorKind::AlreadyExists => n += 1,
                Err(source) => return Err(write_err(source)),
            }
        }
    }

    fn write_atomic(&self, contents: &[u8]) -> io::Result<()> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        fs::create_dir_all(dir)?;

        let mut builder = Builder::new();
        builder.prefix(".tasks").suffix(".tmp");
        // A new store gets the umask-derived mode an ordinary create would
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            builder.permissions(fs::Permissions::from_mode(0o666));
        }

        let mut tmp = builder.tempfile_in(dir)?;
        tmp.write_all(contents)?;
        tmp.as_file().sync_all()?;

        // Keep the permissions of the file being replaced
        if let Ok(meta) = fs::metadata(&self.path) {
            tmp.as_file().set_permissions(meta.permissions())?;
        }

        tmp.persist(&self.path).map_err(|e| e.error)?;
        Ok(())
    }
}

/// Decode and check a store document.
fn decode(bytes: &[u8]) -> std::result::Result<Vec<Task>, String> {
    let text = std::str::from_utf8(bytes).map_err(|e| format!("not valid UTF-8: {}", e))?;
    if text.trim().is_empty() {
        return Ok(Vec::new());
    }

    let tasks: Vec<Task> = serde_json::from_str(text).map_err(|e| e.to_string())?;
    check_invariants(&tasks).map_err(|e| e.to_string())?;
    Ok(tasks)
}

/// Ids must be positive and pairwise distinct; timestamps ordered.
fn check_invariants(tasks: &[Task]) -> std::result::Result<(), ValidationError> {
    let mut seen = HashSet::with_capacity(tasks.len());
    for task in tasks {
        task.validate()?;
        if !seen.insert(task.id) {
            return Err(ValidationError::DuplicateId(task.id));
        }
    }
    Ok(())
}
