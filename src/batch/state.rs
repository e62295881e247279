use crate::config::BatchFiles;
use crate::error::{Result, SisBatchError};
use std::fs::{self, OpenOptions};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Decides whether another program is holding a file open.
pub trait LockProbe {
    fn is_locked(&self, path: &Path) -> bool;
}

/// Probes by opening the file for appending without writing to it.
///
/// Only a permission failure counts as locked. A missing file is available and
/// is left missing.
#[derive(Debug, Default, Clone, Copy)]
pub struct AppendProbe;

impl LockProbe for AppendProbe {
    fn is_locked(&self, path: &Path) -> bool {
        match OpenOptions::new().append(true).open(path) {
            Ok(_) => false,
            Err(e) if e.kind() == ErrorKind::PermissionDenied => true,
            Err(e) => {
                debug!(path = %path.display(), error = %e, "append probe failed, treating as available");
                false
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResetOutcome {
    Removed(PathBuf),
    Missing(PathBuf),
    Blocked { path: PathBuf, reason: String },
}

pub struct FileStateManager<P: LockProbe = AppendProbe> {
    files: BatchFiles,
    probe: P,
}

impl FileStateManager<AppendProbe> {
    pub fn new(files: BatchFiles) -> Self {
        Self::with_probe(files, AppendProbe)
    }
}

impl<P: LockProbe> FileStateManager<P> {
    pub fn with_probe(files: BatchFiles, probe: P) -> Self {
        Self { files, probe }
    }

    pub fn files(&self) -> &BatchFiles {
        &self.files
    }

    pub fn is_file_locked(&self, path: &Path) -> bool {
        self.probe.is_locked(path)
    }

    /// Every target file that is currently held elsewhere.
    pub fn locked_files(&self) -> Vec<PathBuf> {
        self.files
            .all()
            .into_iter()
            .filter(|path| self.is_file_locked(path))
            .map(Path::to_path_buf)
            .collect()
    }

    /// Gate run before a session touches anything on disk.
    pub fn ensure_available(&self) -> Result<()> {
        let locked = self.locked_files();
        if locked.is_empty() {
            Ok(())
        } else {
            warn!(count = locked.len(), "batch files are locked");
            Err(SisBatchError::FilesLocked { paths: locked })
        }
    }

    /// Clears the batch files. The log file is never reset.
    pub fn reset_batch_files(&self) -> Vec<ResetOutcome> {
        self.files.batch().into_iter().map(reset_file).collect()
    }
}

/// Deletes `path` if present. Failures are reported back, never raised.
pub fn reset_file(path: &Path) -> ResetOutcome {
    match fs::remove_file(path) {
        Ok(()) => {
            debug!(path = %path.display(), "removed previous batch file");
            ResetOutcome::Removed(path.to_path_buf())
        }
        Err(e) if e.kind() == ErrorKind::NotFound => ResetOutcome::Missing(path.to_path_buf()),
        Err(e) => {
            let reason = if e.kind() == ErrorKind::PermissionDenied {
                "permission denied, the file may be open or in use".to_string()
            } else {
                e.to_string()
            };
            warn!(path = %path.display(), %reason, "could not remove batch file");
            ResetOutcome::Blocked {
                path: path.to_path_buf(),
                reason,
            }
        }
    }
}

/// Creates `path` holding only a header row. Existing files are left untouched.
///
/// Returns whether the header was written.
pub fn ensure_header(path: &Path, columns: &[&str]) -> Result<bool> {
    let file = match OpenOptions::new().write(true).create_new(true).open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == ErrorKind::AlreadyExists => return Ok(false),
        Err(e) => return Err(SisBatchError::Io(e)),
    };

    let mut writer = csv::WriterBuilder::new()
        .terminator(csv::Terminator::CRLF)
        .from_writer(file);
    writer.write_record(columns)?;
    writer.flush()?;

    debug!(path = %path.display(), "wrote header row");
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FilesConfig;
    use std::collections::HashSet;
    use tempfile::TempDir;

    struct FakeProbe {
        locked: HashSet<PathBuf>,
    }

    impl LockProbe for FakeProbe {
        fn is_locked(&self, path: &Path) -> bool {
            self.locked.contains(path)
        }
    }

    fn files_in(dir: &TempDir) -> BatchFiles {
        BatchFiles::in_directory(dir.path(), &FilesConfig::default())
    }

    #[test]
    fn test_append_probe_leaves_missing_file_missing() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("missing.csv");

        assert!(!AppendProbe.is_locked(&path));
        assert!(!path.exists());
    }

    #[test]
    fn test_append_probe_does_not_modify_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("present.csv");
        fs::write(&path, "a,b\r\n").unwrap();

        assert!(!AppendProbe.is_locked(&path));
        assert_eq!(fs::read_to_string(&path).unwrap(), "a,b\r\n");
    }

    #[cfg(unix)]
    #[test]
    fn test_append_probe_reports_read_only_file_as_locked() {
        use std::os::unix::fs::PermissionsExt;

        let temp_dir = TempDir::new().unwrap();
        let files = files_in(&temp_dir);
        fs::write(&files.log, "course_id,user_id,role,status\r\n").unwrap();
        fs::set_permissions(&files.log, fs::Permissions::from_mode(0o444)).unwrap();

        // File modes do not bind root.
        if OpenOptions::new().append(true).open(&files.log).is_ok() {
            return;
        }

        assert!(AppendProbe.is_locked(&files.log));
        let manager = FileStateManager::new(files.clone());
        assert_eq!(manager.locked_files(), vec![files.log.clone()]);
        assert!(matches!(
            manager.ensure_available(),
            Err(SisBatchError::FilesLocked { .. })
        ));
    }

    #[test]
    fn test_gate_reports_every_locked_file() {
        let temp_dir = TempDir::new().unwrap();
        let files = files_in(&temp_dir);
        let probe = FakeProbe {
            locked: [files.user.clone(), files.log.clone()].into_iter().collect(),
        };
        let manager = FileStateManager::with_probe(files.clone(), probe);

        match manager.ensure_available() {
            Err(SisBatchError::FilesLocked { paths }) => {
                assert_eq!(paths.len(), 2);
                assert!(paths.contains(&files.user));
                assert!(paths.contains(&files.log));
            }
            other => panic!("expected FilesLocked, got {:?}", other),
        }
    }

    #[test]
    fn test_gate_passes_when_nothing_locked() {
        let temp_dir = TempDir::new().unwrap();
        let manager = FileStateManager::new(files_in(&temp_dir));
        assert!(manager.ensure_available().is_ok());
        assert!(manager.locked_files().is_empty());
    }

    #[test]
    fn test_reset_clears_batch_but_keeps_log() {
        let temp_dir = TempDir::new().unwrap();
        let files = files_in(&temp_dir);
        for path in files.all() {
            fs::write(path, "old\r\n").unwrap();
        }

        let manager = FileStateManager::new(files.clone());
        let outcomes = manager.reset_batch_files();

        assert_eq!(outcomes.len(), 3);
        assert!(outcomes.iter().all(|o| matches!(o, ResetOutcome::Removed(_))));
        assert!(!files.user.exists());
        assert!(!files.sandbox.exists());
        assert!(!files.enrolment.exists());
        assert_eq!(fs::read_to_string(&files.log).unwrap(), "old\r\n");
    }

    #[test]
    fn test_reset_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("001_CreateUser.csv");

        assert_eq!(reset_file(&path), ResetOutcome::Missing(path.clone()));
    }

    #[test]
    fn test_reset_blocked_by_directory() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("not_a_file.csv");
        fs::create_dir(&path).unwrap();

        match reset_file(&path) {
            ResetOutcome::Blocked { path: blocked, .. } => assert_eq!(blocked, path),
            other => panic!("expected Blocked, got {:?}", other),
        }
        assert!(path.exists());
    }

    #[test]
    fn test_ensure_header_writes_once() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("003_CreateEnrolment.csv");
        let columns = ["course_id", "user_id", "role", "status"];

        assert!(ensure_header(&path, &columns).unwrap());
        assert!(!ensure_header(&path, &columns).unwrap());

        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "course_id,user_id,role,status\r\n"
        );
    }

    #[test]
    fn test_ensure_header_keeps_existing_content() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("Enrolment_Log.csv");
        fs::write(&path, "course_id,user_id,role,status\r\nx_sb,x,r,Active\r\n").unwrap();

        assert!(!ensure_header(&path, &["course_id", "user_id", "role", "status"]).unwrap());
        assert!(fs::read_to_string(&path).unwrap().contains("x_sb,x,r,Active"));
    }
}
