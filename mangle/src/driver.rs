//! Driver executable resolution and program-name inference.
//!
//! A recorded compile command names its compiler the way the build system
//! invoked it: a bare name found on `PATH`, an absolute path that may be a
//! symlink, or a path relative to a working directory we do not know.
//! [`resolve_driver`] turns that into the path a tool should run, through a
//! pluggable [`ExecutableLookup`].
//!
//! Program names also carry meaning of their own: `x86_64-linux-gnu-clang++`
//! implies `--target=x86_64-linux-gnu --driver-mode=g++`.
//! [`add_target_and_mode`] makes that explicit.

use std::ffi::OsString;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

/// Finds executables and resolves symlinks.
pub trait ExecutableLookup: fmt::Debug + Send + Sync {
    /// Searches for a bare program name, returning its path if found.
    fn find_program(&self, name: &str) -> Option<PathBuf>;

    /// Resolves every symlink in `path`. `None` if the path does not exist.
    fn real_path(&self, path: &Path) -> Option<PathBuf>;
}

/// Looks programs up on the process `PATH`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemLookup;

impl ExecutableLookup for SystemLookup {
    fn find_program(&self, name: &str) -> Option<PathBuf> {
        which::which(name).ok()
    }

    fn real_path(&self, path: &Path) -> Option<PathBuf> {
        std::fs::canonicalize(path).ok()
    }
}

/// Looks programs up on an explicit list of directories.
///
/// Useful when the search path should not depend on the environment.
///
/// # Examples
///
/// ```
/// use compile_command_mangle::{ExecutableLookup, PathLookup};
///
/// let lookup = PathLookup::new(Vec::<std::path::PathBuf>::new());
/// assert!(lookup.find_program("clang").is_none());
/// ```
#[derive(Debug, Clone, Default)]
pub struct PathLookup {
    dirs: Vec<PathBuf>,
}

impl PathLookup {
    pub fn new<I, P>(dirs: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        Self {
            dirs: dirs.into_iter().map(Into::into).collect(),
        }
    }

    fn search_path(&self) -> Option<OsString> {
        if self.dirs.is_empty() {
            return None;
        }
        std::env::join_paths(&self.dirs).ok()
    }
}

impl ExecutableLookup for PathLookup {
    fn find_program(&self, name: &str) -> Option<PathBuf> {
        let paths = self.search_path()?;
        let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        which::which_in(name, Some(paths), cwd).ok()
    }

    fn real_path(&self, path: &Path) -> Option<PathBuf> {
        std::fs::canonicalize(path).ok()
    }
}

/// Bare driver names that are replaced by a sibling of the detected clang.
const GENERIC_DRIVERS: &[&str] = &["clang", "clang++", "gcc", "g++", "cc", "c++"];

/// Resolves the driver of a compile command to the path a tool should run.
///
/// - Relative paths with a directory component are returned unchanged.
/// - Generic names such as `g++` become siblings of `clang_path`, if set.
/// - Other bare names are searched for, falling back to a sibling of
///   `clang_path` (left unresolved), else returned unchanged.
/// - Absolute paths have their directory symlink-resolved (unless
///   `follow_symlinks` is false), keeping the original file name, so
///   `/usr/bin/cc -> /usr/lib/llvm/bin/clang` resolves to
///   `/usr/lib/llvm/bin/cc`.
///
/// Paths that cannot be resolved are returned unchanged.
///
/// # Examples
///
/// ```
/// use std::path::Path;
/// use compile_command_mangle::{PathLookup, resolve_driver};
///
/// let lookup = PathLookup::default();
/// assert_eq!(resolve_driver("bin/clang", true, None, &lookup), "bin/clang");
/// assert_eq!(resolve_driver("g++", true, None, &lookup), "g++");
///
/// let clang = Path::new("/opt/llvm/bin/clang");
/// let resolved = resolve_driver("g++", true, Some(clang), &lookup);
/// assert_eq!(Path::new(&resolved), Path::new("/opt/llvm/bin/g++"));
/// ```
pub fn resolve_driver(
    driver: &str,
    follow_symlinks: bool,
    clang_path: Option<&Path>,
    lookup: &dyn ExecutableLookup,
) -> String {
    if driver.is_empty() {
        return String::new();
    }
    let sibling_of = |path: &Path| -> String {
        let name = Path::new(driver).file_name().unwrap_or_default();
        path.parent()
            .unwrap_or_else(|| Path::new(""))
            .join(name)
            .to_string_lossy()
            .into_owned()
    };

    let absolute = if Path::new(driver).is_absolute() {
        PathBuf::from(driver)
    } else if driver.contains(std::path::is_separator) {
        // Relative to a working directory we don't have.
        return driver.to_string();
    } else if let Some(clang) = clang_path.filter(|_| GENERIC_DRIVERS.contains(&driver)) {
        return sibling_of(clang);
    } else if let Some(found) = lookup.find_program(driver).filter(|p| p.is_absolute()) {
        found
    } else if let Some(clang) = clang_path {
        return sibling_of(clang);
    } else {
        debug!(driver, "Driver not found and no clang path configured");
        return driver.to_string();
    };

    if !follow_symlinks {
        return absolute.to_string_lossy().into_owned();
    }
    match lookup.real_path(&absolute) {
        Some(resolved) => {
            debug!(driver, resolved = %resolved.display(), "Resolved driver symlinks");
            sibling_of(&resolved)
        }
        None => absolute.to_string_lossy().into_owned(),
    }
}

/// A program-name suffix and the driver mode it implies.
struct DriverSuffix {
    suffix: &'static str,
    mode: Option<&'static str>,
}

const fn suffix(suffix: &'static str, mode: Option<&'static str>) -> DriverSuffix {
    DriverSuffix { suffix, mode }
}

/// Checked in order; the first suffix the name ends with wins.
const DRIVER_SUFFIXES: &[DriverSuffix] = &[
    suffix("clang", None),
    suffix("clang++", Some("--driver-mode=g++")),
    suffix("clang-c++", Some("--driver-mode=g++")),
    suffix("clang-cc", None),
    suffix("clang-cpp", Some("--driver-mode=cpp")),
    suffix("clang-g++", Some("--driver-mode=g++")),
    suffix("clang-gcc", None),
    suffix("clang-cl", Some("--driver-mode=cl")),
    suffix("cc", None),
    suffix("cpp", Some("--driver-mode=cpp")),
    suffix("cl", Some("--driver-mode=cl")),
    suffix("++", Some("--driver-mode=g++")),
    suffix("flang", Some("--driver-mode=flang")),
    suffix("clang-dxc", Some("--driver-mode=dxc")),
];

static KNOWN_ARCH: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(
        r"^(x86_64|amd64|x86|i[3-6]86|aarch64(_be|_32)?|arm64(e|_32)?|arm(v\d+[a-z.]*)?(eb)?|thumb(v\d+[a-z.]*)?(eb)?|riscv(32|64)|powerpc(64)?(le)?|ppc(64)?(le)?|mips(64)?(el)?|sparc(v9|el)?|s390x|systemz|wasm(32|64)|loongarch(32|64)|hexagon|amdgcn|r600|nvptx(64)?|avr|msp430|bpf(eb|el)?|m68k|xtensa|ve|lanai|csky|xcore|spirv(32|64)?|dxil|arc)$",
    )
    .ok()
});

/// What a compiler's program name says about how it should run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProgramName {
    /// Everything before the last `-` preceding the driver suffix.
    pub target_prefix: String,
    /// The driver suffix itself, e.g. `clang++`.
    pub mode_suffix: String,
    /// The `--driver-mode=` flag the suffix implies.
    pub driver_mode: Option<&'static str>,
    /// Whether `target_prefix` starts with an architecture we know.
    pub target_is_valid: bool,
}

impl ProgramName {
    /// Parses the file name of `program`, ignoring case.
    ///
    /// When no suffix matches, matching is retried after dropping `.exe`,
    /// then trailing version digits (`clang++3.5`), then a trailing
    /// `-component` (`clang++-tot`).
    ///
    /// # Examples
    ///
    /// ```
    /// use compile_command_mangle::ProgramName;
    ///
    /// let name = ProgramName::parse("/usr/bin/x86_64-linux-gnu-clang++-18");
    /// assert_eq!(name.target_prefix, "x86_64-linux-gnu");
    /// assert_eq!(name.driver_mode, Some("--driver-mode=g++"));
    /// assert!(name.target_is_valid);
    ///
    /// assert_eq!(ProgramName::parse("CL.EXE").driver_mode, Some("--driver-mode=cl"));
    /// assert_eq!(ProgramName::parse("python"), ProgramName::default());
    /// ```
    pub fn parse(program: &str) -> Self {
        let name = program
            .rsplit(['/', '\\'])
            .next()
            .unwrap_or(program)
            .to_lowercase();
        let Some((suffix_pos, ds)) = parse_driver_suffix(&name) else {
            return Self::default();
        };
        let suffix_end = suffix_pos + ds.suffix.len();

        let Some(last_dash) = name[..=suffix_pos].rfind('-') else {
            return Self {
                target_prefix: String::new(),
                mode_suffix: name[..suffix_end].to_string(),
                driver_mode: ds.mode,
                target_is_valid: false,
            };
        };

        let prefix = &name[..last_dash];
        Self {
            target_prefix: prefix.to_string(),
            mode_suffix: name[last_dash + 1..suffix_end].to_string(),
            driver_mode: ds.mode,
            target_is_valid: is_known_target(prefix),
        }
    }
}

fn find_driver_suffix(name: &str) -> Option<(usize, &'static DriverSuffix)> {
    DRIVER_SUFFIXES
        .iter()
        .find(|ds| name.ends_with(ds.suffix))
        .map(|ds| (name.len() - ds.suffix.len(), ds))
}

fn parse_driver_suffix(name: &str) -> Option<(usize, &'static DriverSuffix)> {
    if let Some(found) = find_driver_suffix(name) {
        return Some(found);
    }
    let name = name.strip_suffix(".exe").unwrap_or(name);
    if let Some(found) = find_driver_suffix(name) {
        return Some(found);
    }
    let name = name.trim_end_matches(|c: char| c.is_ascii_digit() || c == '.');
    if let Some(found) = find_driver_suffix(name) {
        return Some(found);
    }
    let name = &name[..name.rfind('-').unwrap_or(name.len())];
    find_driver_suffix(name)
}

fn is_known_target(triple: &str) -> bool {
    let arch = triple.split('-').next().unwrap_or_default();
    KNOWN_ARCH
        .as_ref()
        .is_some_and(|re| !arch.is_empty() && re.is_match(arch))
}

/// Makes the target and driver mode implied by the program name explicit.
///
/// Inserts `--target=<prefix>` and `--driver-mode=<mode>` right after the
/// program name, target first. Neither is added if the command already
/// chooses one (`--target=`, `-target`, `--driver-mode=`). When the name
/// implies no known target, `fallback_target` is used instead.
///
/// # Examples
///
/// ```
/// use compile_command_mangle::add_target_and_mode;
///
/// let mut args: Vec<String> = ["aarch64-linux-gnu-g++", "-c", "--", "a.cc"]
///     .map(String::from)
///     .to_vec();
/// add_target_and_mode(&mut args, None);
/// assert_eq!(
///     args,
///     ["aarch64-linux-gnu-g++", "--target=aarch64-linux-gnu", "--driver-mode=g++", "-c", "--", "a.cc"]
/// );
/// ```
pub fn add_target_and_mode(args: &mut Vec<String>, fallback_target: Option<&str>) {
    let Some(program) = args.first() else {
        return;
    };
    let parsed = ProgramName::parse(program);
    let target = if parsed.target_is_valid {
        Some(parsed.target_prefix.as_str())
    } else {
        fallback_target
    };

    let tail = &args[1..];
    let add_target = target.is_some()
        && !tail
            .iter()
            .any(|a| a.starts_with("--target=") || a == "-target");
    let add_mode =
        parsed.driver_mode.is_some() && !tail.iter().any(|a| a.starts_with("--driver-mode="));

    let mut inserted = Vec::new();
    if let Some(target) = target.filter(|_| add_target) {
        inserted.push(format!("--target={target}"));
    }
    if let Some(mode) = parsed.driver_mode.filter(|_| add_mode) {
        inserted.push(mode.to_string());
    }
    if !inserted.is_empty() {
        debug!(program = %args[0], inserted = ?inserted, "Adding target and mode from program name");
        args.splice(1..1, inserted);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain_names() {
        let clang = ProgramName::parse("clang");
        assert_eq!(clang.mode_suffix, "clang");
        assert_eq!(clang.driver_mode, None);
        assert!(!clang.target_is_valid);

        assert_eq!(ProgramName::parse("g++").driver_mode, Some("--driver-mode=g++"));
        assert_eq!(ProgramName::parse("clang-cl").driver_mode, Some("--driver-mode=cl"));
        assert_eq!(ProgramName::parse("clang-cpp").driver_mode, Some("--driver-mode=cpp"));
        assert_eq!(ProgramName::parse("gcc").driver_mode, None);
    }

    #[test]
    fn test_parse_retries_after_version_and_component() {
        assert_eq!(ProgramName::parse("clang++3.5").driver_mode, Some("--driver-mode=g++"));
        assert_eq!(ProgramName::parse("clang++-tot").mode_suffix, "clang++");
        assert_eq!(ProgramName::parse("clang++.exe").mode_suffix, "clang++");
    }

    #[test]
    fn test_parse_rejects_unknown_arch_prefix() {
        let name = ProgramName::parse("foo-clang");
        assert_eq!(name.target_prefix, "foo");
        assert!(!name.target_is_valid);
        assert!(ProgramName::parse("armv7a-none-eabi-clang").target_is_valid);
        assert!(ProgramName::parse("C:\\LLVM\\bin\\i686-w64-mingw32-clang.exe").target_is_valid);
    }

    #[test]
    fn test_existing_target_and_mode_are_kept() {
        let mut args: Vec<String> = ["x86_64-linux-gnu-clang++", "-target", "arm", "--driver-mode=gcc"]
            .map(String::from)
            .to_vec();
        let before = args.clone();
        add_target_and_mode(&mut args, None);
        assert_eq!(args, before);
    }

    #[test]
    fn test_fallback_target_used_when_name_has_none() {
        let mut args = vec!["clang".to_string(), "a.c".to_string()];
        add_target_and_mode(&mut args, Some("riscv64-unknown-elf"));
        assert_eq!(args, vec!["clang", "--target=riscv64-unknown-elf", "a.c"]);
    }

    #[test]
    fn test_relative_driver_with_directory_is_unchanged() {
        let lookup = PathLookup::default();
        let clang = Path::new("/opt/clang");
        assert_eq!(
            resolve_driver("foo/unknown-binary", true, Some(clang), &lookup),
            "foo/unknown-binary"
        );
        assert_eq!(resolve_driver("", true, Some(clang), &lookup), "");
    }

    /// Finds nothing and resolves every path into `/real/bin`.
    #[derive(Debug)]
    struct RedirectingLookup;

    impl ExecutableLookup for RedirectingLookup {
        fn find_program(&self, _name: &str) -> Option<PathBuf> {
            None
        }

        fn real_path(&self, path: &Path) -> Option<PathBuf> {
            Some(Path::new("/real/bin").join(path.file_name()?))
        }
    }

    #[test]
    fn test_unfound_driver_is_plain_sibling_of_clang() {
        let clang = Path::new("/opt/llvm/bin/clang");
        let resolved = resolve_driver("unknown-binary", true, Some(clang), &RedirectingLookup);
        assert_eq!(Path::new(&resolved), Path::new("/opt/llvm/bin/unknown-binary"));

        // Absolute drivers still go through symlink resolution.
        if cfg!(unix) {
            let driver = "/usr/bin/unknown-binary";
            let resolved = resolve_driver(driver, true, Some(clang), &RedirectingLookup);
            assert_eq!(Path::new(&resolved), Path::new("/real/bin/unknown-binary"));
        }
    }
}
