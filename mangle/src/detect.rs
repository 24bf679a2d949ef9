//! Toolchain detection for [`CommandMangler`].
//!
//! Probes the host for a clang installation, its resource directory, and
//! on macOS the SDK sysroot. Every probe is best-effort: failures are logged
//! at debug level and leave the field unset.

use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::time::Duration;

use tracing::{debug, info};
use wait_timeout::ChildExt;

use crate::driver::{ExecutableLookup, SystemLookup};
use crate::mangler::CommandMangler;

/// Timeout for each probe command.
const PROBE_TIMEOUT: Duration = Duration::from_secs(5);

/// Compilers searched for on `PATH`, in order.
const COMPILER_NAMES: &[&str] = &["clang", "gcc", "cc"];

impl CommandMangler {
    /// Creates a mangler configured from the host toolchain.
    ///
    /// ```no_run
    /// use compile_command_mangle::CommandMangler;
    ///
    /// let mangler = CommandMangler::detect();
    /// println!("clang: {:?}", mangler.clang_path);
    /// ```
    pub fn detect() -> Self {
        let mut mangler = Self::new();
        mangler.clang_path = detect_clang_path(&SystemLookup);
        mangler.resource_dir = mangler.clang_path.as_deref().and_then(detect_resource_dir);
        mangler.sysroot = detect_sysroot();
        info!(
            clang_path = ?mangler.clang_path,
            resource_dir = ?mangler.resource_dir,
            sysroot = ?mangler.sysroot,
            "Detected toolchain"
        );
        mangler
    }
}

/// Finds the compiler generic driver names are resolved next to.
///
/// Symlinks are resolved, since the frontend locates its headers relative to
/// its real path. Falls back to a (possibly missing) `clang` next to the
/// running executable.
pub(crate) fn detect_clang_path(lookup: &dyn ExecutableLookup) -> Option<String> {
    let resolve = |path: PathBuf| -> String {
        lookup
            .real_path(&path)
            .unwrap_or(path)
            .to_string_lossy()
            .into_owned()
    };

    if cfg!(target_os = "macos") {
        if let Some(clang) = run_probe(&["xcrun", "--find", "clang"]) {
            return Some(resolve(PathBuf::from(clang)));
        }
    }
    for name in COMPILER_NAMES {
        if let Some(found) = lookup.find_program(name) {
            debug!(name, path = %found.display(), "Found compiler on PATH");
            return Some(resolve(found));
        }
    }

    let exe = std::env::current_exe().ok()?;
    let dir = exe.parent()?;
    Some(dir.join("clang").to_string_lossy().into_owned())
}

/// Asks the compiler where its builtin headers live.
pub(crate) fn detect_resource_dir(clang_path: &str) -> Option<String> {
    if !Path::new(clang_path).exists() {
        return None;
    }
    run_probe(&[clang_path, "-print-resource-dir"])
}

/// Finds the default SDK on macOS. Skipped when `SDKROOT` is set, since the
/// driver honours it already.
pub(crate) fn detect_sysroot() -> Option<String> {
    if !cfg!(target_os = "macos") || std::env::var_os("SDKROOT").is_some() {
        return None;
    }
    run_probe(&["xcrun", "--show-sdk-path"])
}

/// Runs a command and returns the first line of its stdout.
///
/// Returns `None` if the command cannot be spawned, exits unsuccessfully,
/// prints nothing, or runs past [`PROBE_TIMEOUT`].
pub(crate) fn run_probe(argv: &[&str]) -> Option<String> {
    let (program, args) = argv.split_first()?;
    let mut child = match Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
    {
        Ok(child) => child,
        Err(e) => {
            debug!(command = ?argv, error = %e, "Failed to spawn probe");
            return None;
        }
    };

    // Drain stdout while waiting so a chatty child cannot fill the pipe.
    let reader = child.stdout.take().map(|mut pipe| {
        std::thread::spawn(move || {
            let mut buf = String::new();
            pipe.read_to_string(&mut buf).map(|_| buf)
        })
    });

    match child.wait_timeout(PROBE_TIMEOUT) {
        Ok(Some(status)) if status.success() => {}
        Ok(Some(status)) => {
            debug!(command = ?argv, status = %status, "Probe exited unsuccessfully");
            return None;
        }
        Ok(None) => {
            debug!(
                command = ?argv,
                timeout_ms = PROBE_TIMEOUT.as_millis() as u64,
                "Probe timed out, killing process"
            );
            let _ = child.kill();
            let _ = child.wait();
            return None;
        }
        Err(e) => {
            debug!(command = ?argv, error = %e, "Failed to wait on probe");
            let _ = child.kill();
            let _ = child.wait();
            return None;
        }
    }

    let output = match reader?.join() {
        Ok(Ok(output)) => output,
        Ok(Err(e)) => {
            debug!(command = ?argv, error = %e, "Failed to read probe output");
            return None;
        }
        Err(_) => return None,
    };
    let line = output.lines().next()?.trim();
    (!line.is_empty()).then(|| line.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::PathLookup;

    #[test]
    fn test_missing_program_probe_fails() {
        assert_eq!(run_probe(&["compile-command-no-such-program"]), None);
        assert_eq!(run_probe(&[]), None);
    }

    #[cfg(unix)]
    #[test]
    fn test_probe_returns_first_line() {
        assert_eq!(
            run_probe(&["sh", "-c", "echo '  /res/dir  '; echo second"]).as_deref(),
            Some("/res/dir")
        );
        assert_eq!(run_probe(&["sh", "-c", "echo out; exit 3"]), None);
        assert_eq!(run_probe(&["sh", "-c", "true"]), None);
    }

    #[test]
    fn test_resource_dir_needs_existing_compiler() {
        assert_eq!(detect_resource_dir("/compile-command-test/no/clang"), None);
    }

    #[cfg(unix)]
    #[test]
    fn test_clang_path_found_on_search_path_is_resolved() {
        use std::os::unix::fs::{PermissionsExt, symlink};

        if cfg!(target_os = "macos") {
            // xcrun takes precedence there.
            return;
        }
        let dir = tempfile::tempdir().unwrap();
        let root = std::fs::canonicalize(dir.path()).unwrap();
        std::fs::create_dir(root.join("bin")).unwrap();
        std::fs::create_dir(root.join("llvm")).unwrap();
        let real = root.join("llvm/clang-18");
        std::fs::write(&real, "").unwrap();
        std::fs::set_permissions(&real, std::fs::Permissions::from_mode(0o755)).unwrap();
        symlink(&real, root.join("bin/gcc")).unwrap();

        let lookup = PathLookup::new([root.join("bin")]);
        assert_eq!(detect_clang_path(&lookup).map(PathBuf::from), Some(real));
    }

    #[test]
    fn test_clang_path_falls_back_next_to_executable() {
        let path = detect_clang_path(&PathLookup::default()).unwrap();
        if !cfg!(target_os = "macos") {
            assert!(path.ends_with("clang"));
        }
    }
}
