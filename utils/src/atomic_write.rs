//! Atomic file write helpers.
//!
//! Bytes go to a temp file in the destination directory, which is then renamed
//! over the target. Where rename-over-existing fails, the old file is moved to
//! `<name>.bak` first and restored if the second rename fails too.

use std::fs;
use std::io::{self, Write};
use std::path::Path;

use tempfile::NamedTempFile;
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileSyncPolicy {
    SyncAll,
    SkipSync,
}

/// What to do when the destination already exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExistingFile {
    #[default]
    Replace,
    /// Fail with `AlreadyExists` instead of overwriting.
    Refuse,
}

#[derive(Debug, Clone, Copy)]
pub struct AtomicWriteOptions {
    pub file_sync: FileSyncPolicy,
    pub existing: ExistingFile,
    /// Unix permission bits for the final file. `None` keeps the umask default.
    pub mode: Option<u32>,
}

impl Default for AtomicWriteOptions {
    fn default() -> Self {
        Self {
            file_sync: FileSyncPolicy::SyncAll,
            existing: ExistingFile::Replace,
            mode: None,
        }
    }
}

impl AtomicWriteOptions {
    /// For files that must never clobber an earlier one, like timestamped exports.
    #[must_use]
    pub fn create_new() -> Self {
        Self {
            existing: ExistingFile::Refuse,
            ..Self::default()
        }
    }
}

/// Restore `path` from `path.bak` left behind by an interrupted replace.
pub fn recover_bak_file(path: &Path) {
    let backup = path.with_extension("bak");
    if !path.exists() && backup.exists() {
        match fs::rename(&backup, path) {
            Ok(()) => warn!(
                path = %path.display(),
                "Recovered .bak file from interrupted atomic write"
            ),
            Err(e) => warn!(path = %path.display(), "Failed to recover .bak file: {e}"),
        }
    }
}

/// Create the parent directory of `path` if it is missing.
pub fn ensure_parent_dir(path: &Path) -> io::Result<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => fs::create_dir_all(parent),
        _ => Ok(()),
    }
}

pub fn atomic_write(path: impl AsRef<Path>, bytes: &[u8]) -> io::Result<()> {
    atomic_write_with_options(path, bytes, AtomicWriteOptions::default())
}

pub fn atomic_write_with_options(
    path: impl AsRef<Path>,
    bytes: &[u8],
    options: AtomicWriteOptions,
) -> io::Result<()> {
    let path = path.as_ref();
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut tmp = NamedTempFile::new_in(parent)?;
    tmp.write_all(bytes)?;
    if options.file_sync == FileSyncPolicy::SyncAll {
        tmp.as_file().sync_all()?;
    }

    match options.existing {
        ExistingFile::Refuse => {
            tmp.persist_noclobber(path).map_err(|err| err.error)?;
        }
        ExistingFile::Replace => {
            if let Err(err) = tmp.persist(path) {
                if !path.exists() {
                    return Err(err.error);
                }
                let backup = path.with_extension("bak");
                let _ = fs::remove_file(&backup);
                fs::rename(path, &backup)?;
                if let Err(retry) = err.file.persist(path) {
                    let _ = fs::rename(&backup, path);
                    return Err(retry.error);
                }
                if let Err(e) = fs::remove_file(&backup) {
                    warn!(
                        path = %backup.display(),
                        "Failed to remove .bak after atomic write: {e}"
                    );
                }
            }
        }
    }

    apply_mode(path, options.mode)?;
    debug!(path = %path.display(), bytes = bytes.len(), "Atomic write complete");
    Ok(())
}

#[cfg(unix)]
fn apply_mode(path: &Path, mode: Option<u32>) -> io::Result<()> {
    use std::os::unix::fs::PermissionsExt;

    if let Some(mode) = mode {
        fs::set_permissions(path, fs::Permissions::from_mode(mode))?;
    }
    Ok(())
}

#[cfg(not(unix))]
fn apply_mode(_path: &Path, _mode: Option<u32>) -> io::Result<()> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::io::ErrorKind;
    use std::path::Path;

    use super::{
        AtomicWriteOptions, FileSyncPolicy, atomic_write, atomic_write_with_options,
        ensure_parent_dir, recover_bak_file,
    };

    fn fast() -> AtomicWriteOptions {
        AtomicWriteOptions {
            file_sync: FileSyncPolicy::SkipSync,
            ..AtomicWriteOptions::default()
        }
    }

    #[test]
    fn overwrites_existing_and_cleans_backup() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("config.toml");

        atomic_write_with_options(&path, b"one", fast()).expect("write one");
        atomic_write_with_options(&path, b"two", fast()).expect("write two");

        assert_eq!(fs::read_to_string(&path).expect("read"), "two");
        assert!(!path.with_extension("bak").exists());
    }

    #[test]
    fn create_new_refuses_to_clobber() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("run.json");
        atomic_write(&path, b"first").expect("first write");

        let err = atomic_write_with_options(&path, b"second", AtomicWriteOptions::create_new())
            .expect_err("second write must fail");
        assert_eq!(err.kind(), ErrorKind::AlreadyExists);
        assert_eq!(fs::read_to_string(&path).expect("read"), "first");
    }

    #[test]
    fn recovers_backup_when_target_is_missing() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("config.toml");
        fs::write(path.with_extension("bak"), "saved").expect("write bak");

        recover_bak_file(&path);
        assert_eq!(fs::read_to_string(&path).expect("read"), "saved");
        assert!(!path.with_extension("bak").exists());
    }

    #[test]
    fn ensure_parent_dir_creates_nested_dirs() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("a").join("b").join("out.csv");
        ensure_parent_dir(&path).expect("create dirs");
        assert!(path.parent().unwrap().is_dir());
        ensure_parent_dir(Path::new("bare.txt")).expect("no parent");
    }

    #[cfg(unix)]
    #[test]
    fn applies_unix_permissions_when_configured() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("private.toml");
        let opts = AtomicWriteOptions {
            mode: Some(0o600),
            ..fast()
        };
        atomic_write_with_options(&path, b"secret", opts).expect("write");

        let mode = fs::metadata(&path).expect("metadata").permissions().mode() & 0o777;
        assert_eq!(mode, 0o600);
    }
}
