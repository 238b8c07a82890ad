//! Copying avatars out of the application's private store.

use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::sync::atomic::{AtomicU64, Ordering};

/// Copies a file the current process may not be able to read on its own.
///
/// Copy failures are never reported: a missing destination shows up when the
/// resolver tries to decode it.
pub trait PrivilegedCopier: Send + Sync {
    /// Copy `source` to `dest`, ignoring any failure.
    fn copy_ignoring_errors(&self, source: &Path, dest: &Path);
}

/// Runs `cp` through a shell, optionally elevated with `su`.
///
/// Like [`FsCopier`], the copy lands in a staging file first and is moved onto
/// `dest` only once complete.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShellCopier {
    program: String,
}

impl ShellCopier {
    /// Copier using `su -c` (rooted device).
    #[must_use]
    pub fn root() -> Self {
        Self::with_program("su")
    }

    /// Copier using `sh -c`.
    #[must_use]
    pub fn unprivileged() -> Self {
        Self::with_program("sh")
    }

    /// Copier using any program that accepts `-c <command>`.
    #[must_use]
    pub fn with_program(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Program the command is passed to.
    #[must_use]
    pub fn program(&self) -> &str {
        &self.program
    }

    /// Shell command copying `source` to `staging`, then moving it onto `dest`.
    ///
    /// Paths are quoted byte for byte. Returns `None` if a path cannot be passed to
    /// a shell on this platform.
    #[must_use]
    pub fn command_line(source: &Path, staging: &Path, dest: &Path) -> Option<OsString> {
        let source = quote(source.as_os_str())?;
        let staging = quote(staging.as_os_str())?;
        let dest = quote(dest.as_os_str())?;

        let parts: [&[u8]; 10] = [
            b"cp -f ",
            &source,
            b" ",
            &staging,
            b" && mv -f ",
            &staging,
            b" ",
            &dest,
            b" || rm -f ",
            &staging,
        ];
        Some(bytes_to_os_string(parts.concat()))
    }
}

/// Single-quote `arg` for a POSIX shell.
fn quote(arg: &OsStr) -> Option<Vec<u8>> {
    let raw = os_str_bytes(arg)?;
    let mut quoted = Vec::with_capacity(raw.len() + 2);
    quoted.push(b'\'');
    for &byte in raw {
        if byte == b'\'' {
            quoted.extend_from_slice(br"'\''");
        } else {
            quoted.push(byte);
        }
    }
    quoted.push(b'\'');
    Some(quoted)
}

#[cfg(unix)]
fn os_str_bytes(arg: &OsStr) -> Option<&[u8]> {
    use std::os::unix::ffi::OsStrExt;
    Some(arg.as_bytes())
}

#[cfg(not(unix))]
fn os_str_bytes(arg: &OsStr) -> Option<&[u8]> {
    arg.to_str().map(str::as_bytes)
}

#[cfg(unix)]
fn bytes_to_os_string(bytes: Vec<u8>) -> OsString {
    use std::os::unix::ffi::OsStringExt;
    OsString::from_vec(bytes)
}

#[cfg(not(unix))]
fn bytes_to_os_string(bytes: Vec<u8>) -> OsString {
    // Every piece came from a `&str`, so this is lossless.
    String::from_utf8_lossy(&bytes).into_owned().into()
}

/// Unique sibling of `dest` that a copy is written to before being renamed.
fn staging_path(dest: &Path) -> PathBuf {
    static COUNTER: AtomicU64 = AtomicU64::new(0);
    let n = COUNTER.fetch_add(1, Ordering::Relaxed);
    let mut name = dest.file_name().unwrap_or_default().to_os_string();
    name.push(format!(".part-{}-{n}", std::process::id()));
    dest.with_file_name(name)
}

impl PrivilegedCopier for ShellCopier {
    fn copy_ignoring_errors(&self, source: &Path, dest: &Path) {
        let staging = staging_path(dest);
        let Some(command) = Self::command_line(source, &staging, dest) else {
            tracing::warn!("Cannot quote avatar path {:?} for {}", dest, self.program);
            return;
        };
        tracing::debug!("{} -c {:?}", self.program, command);

        let status = Command::new(&self.program)
            .arg("-c")
            .arg(&command)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status();

        match status {
            Ok(status) if status.success() => {}
            Ok(status) => tracing::debug!("Avatar copy exited with {status}: {:?}", command),
            Err(e) => tracing::warn!("Failed to run {}: {e}", self.program),
        }
    }
}

/// In-process copy for stores the process can already read.
///
/// The copy is written next to `dest` and renamed into place, so a concurrent
/// reader never decodes a partial file.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsCopier;

impl PrivilegedCopier for FsCopier {
    fn copy_ignoring_errors(&self, source: &Path, dest: &Path) {
        if let Some(parent) = dest.parent()
            && let Err(e) = std::fs::create_dir_all(parent)
        {
            tracing::debug!("Cannot create {:?}: {e}", parent);
            return;
        }

        let staging = staging_path(dest);
        let result = std::fs::copy(source, &staging).and_then(|_| std::fs::rename(&staging, dest));
        if let Err(e) = result {
            tracing::debug!("Avatar copy {:?} -> {:?} failed: {e}", source, dest);
            let _ = std::fs::remove_file(&staging);
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    mod shell_tests {
        use super::*;

        #[test]
        fn command_line_stages_and_quotes_paths() {
            let line = ShellCopier::command_line(
                Path::new("/a b/x.png"),
                Path::new("/it's.part"),
                Path::new("/it's"),
            )
            .unwrap();
            assert_eq!(
                line,
                r"cp -f '/a b/x.png' '/it'\''s.part' && mv -f '/it'\''s.part' '/it'\''s' || rm -f '/it'\''s.part'"
            );
        }

        #[test]
        fn staging_paths_are_unique_siblings() {
            let dest = Path::new("/backup/0123abcd");
            let first = staging_path(dest);
            let second = staging_path(dest);
            assert_ne!(first, second);
            assert_eq!(first.parent(), dest.parent());
            assert!(first.to_string_lossy().starts_with("/backup/0123abcd.part-"));
        }

        #[test]
        fn programs() {
            assert_eq!(ShellCopier::root().program(), "su");
            assert_eq!(ShellCopier::unprivileged().program(), "sh");
        }

        #[cfg(unix)]
        #[test]
        fn copies_through_sh_without_leftovers() {
            let dir = tempfile::tempdir().unwrap();
            let source = dir.path().join("src file");
            let backup = dir.path().join("backup");
            std::fs::create_dir(&backup).unwrap();
            let dest = backup.join("dest");
            std::fs::write(&source, b"avatar").unwrap();
            ShellCopier::unprivileged().copy_ignoring_errors(&source, &dest);
            assert_eq!(std::fs::read(&dest).unwrap(), b"avatar");
            assert_eq!(std::fs::read_dir(&backup).unwrap().count(), 1);
        }

        #[cfg(unix)]
        #[test]
        fn failed_copy_leaves_nothing_behind() {
            let dir = tempfile::tempdir().unwrap();
            let dest = dir.path().join("dest");
            ShellCopier::unprivileged().copy_ignoring_errors(&dir.path().join("absent"), &dest);
            assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
        }

        #[cfg(unix)]
        #[test]
        fn non_utf8_paths_are_copied_verbatim() {
            use std::os::unix::ffi::OsStrExt;

            let dir = tempfile::tempdir().unwrap();
            let source = dir.path().join(OsStr::from_bytes(b"src-\xff"));
            let dest = dir.path().join(OsStr::from_bytes(b"dest-\xfe'"));
            std::fs::write(&source, b"avatar").unwrap();
            ShellCopier::unprivileged().copy_ignoring_errors(&source, &dest);
            assert_eq!(std::fs::read(&dest).unwrap(), b"avatar");
        }

        #[test]
        fn missing_program_is_swallowed() {
            let dir = tempfile::tempdir().unwrap();
            let dest = dir.path().join("dest");
            ShellCopier::with_program("chatledger-no-such-shell")
                .copy_ignoring_errors(Path::new("/nonexistent"), &dest);
            assert!(!dest.exists());
        }
    }

    mod fs_tests {
        use super::*;

        #[test]
        fn copies_and_creates_parent() {
            let dir = tempfile::tempdir().unwrap();
            let source = dir.path().join("src");
            let dest = dir.path().join("backup").join("dest");
            std::fs::write(&source, b"png").unwrap();
            FsCopier.copy_ignoring_errors(&source, &dest);
            assert_eq!(std::fs::read(&dest).unwrap(), b"png");
            let leftovers = std::fs::read_dir(dest.parent().unwrap()).unwrap().count();
            assert_eq!(leftovers, 1);
        }

        #[test]
        fn missing_source_is_swallowed() {
            let dir = tempfile::tempdir().unwrap();
            let dest = dir.path().join("dest");
            FsCopier.copy_ignoring_errors(&dir.path().join("absent"), &dest);
            assert!(!dest.exists());
            assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
        }
    }
}
