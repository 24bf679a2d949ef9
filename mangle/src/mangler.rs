//! Rewriting recorded compile commands so tools can replay them.

use std::ops::Range;
use std::path::Path;
use std::sync::Arc;

use compile_command_core::{ArgClass, CompileCommand, DriverMode, ParsedArg, classify_args};
use tracing::{debug, warn};

use crate::driver::{ExecutableLookup, SystemLookup, add_target_and_mode, resolve_driver};
use crate::edits::ArgEdits;
use crate::filetype::{FileType, transfer_language};

/// Adjusts compile commands so tools can replay them against one file.
///
/// The configuration fields are usually filled by
/// [`CommandMangler::detect`]; every one of them is optional.
///
/// # Examples
///
/// ```
/// use compile_command_mangle::{ArgEdits, CommandMangler, PathLookup};
///
/// let mut mangler = CommandMangler::new().with_lookup(PathLookup::default());
/// mangler.resource_dir = Some("/opt/llvm/lib/clang/18".into());
///
/// let mut args: Vec<String> = ["clang++", "-c", "foo.cc", "-o", "foo.o"]
///     .map(String::from)
///     .to_vec();
/// mangler.mangle_args(&mut args, "foo.cc", &ArgEdits::new());
/// assert_eq!(
///     args,
///     [
///         "clang++",
///         "--driver-mode=g++",
///         "-c",
///         "-o",
///         "foo.o",
///         "-resource-dir=/opt/llvm/lib/clang/18",
///         "--",
///         "foo.cc",
///     ]
/// );
/// ```
#[derive(Debug, Clone)]
pub struct CommandMangler {
    /// Path of the clang driver generic names are resolved next to.
    pub clang_path: Option<String>,
    /// Added as `-resource-dir=` unless the command sets one.
    pub resource_dir: Option<String>,
    /// Added as `-isysroot` unless the command sets a sysroot.
    pub sysroot: Option<String>,
    /// Target used when the program name implies none.
    pub target: Option<String>,
    lookup: Arc<dyn ExecutableLookup>,
}

impl Default for CommandMangler {
    fn default() -> Self {
        Self {
            clang_path: None,
            resource_dir: None,
            sysroot: None,
            target: None,
            lookup: Arc::new(SystemLookup),
        }
    }
}

impl CommandMangler {
    /// Creates an unconfigured mangler that searches the process `PATH`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces how executables are found and symlinks resolved.
    pub fn with_lookup(mut self, lookup: impl ExecutableLookup + 'static) -> Self {
        self.lookup = Arc::new(lookup);
        self
    }

    pub fn lookup(&self) -> &dyn ExecutableLookup {
        self.lookup.as_ref()
    }

    /// Mangles `command` so it compiles exactly `file`.
    ///
    /// See [`CommandMangler::mangle_args`].
    pub fn mangle(&self, command: &mut CompileCommand, file: &str, edits: &ArgEdits) {
        self.mangle_args(&mut command.command_line, file, edits);
    }

    /// Mangles an argument vector so it compiles exactly `file`.
    ///
    /// In order:
    ///
    /// 1. With more than one `-arch`, every `-arch` and its value is dropped.
    /// 2. Every input and everything from `--` on is dropped, and
    ///    `-- <file>` is appended. If an input had a different extension
    ///    from `file`, its language is carried over.
    /// 3. `edits` run over the whole vector.
    /// 4. Target and driver mode implied by the program name are added.
    /// 5. `-save-temps` is removed.
    /// 6. The configured resource directory and sysroot are added, unless
    ///    the command already has its own.
    /// 7. The driver is resolved to an absolute path where possible.
    ///
    /// An empty vector becomes `-- <file>` and nothing else happens.
    pub fn mangle_args(&self, args: &mut Vec<String>, file: &str, edits: &ArgEdits) {
        if args.is_empty() {
            debug!(file, "Mangling empty command");
            args.extend(["--".to_string(), file.to_string()]);
            return;
        }

        let mode = match DriverMode::detect(args.as_slice()) {
            DriverMode::Cl => DriverMode::Cl,
            _ => DriverMode::Gcc,
        };
        let transfer_from = restrict_inputs(args, file, mode);
        args.push("--".to_string());
        args.push(file.to_string());
        if let Some(original) = transfer_from {
            transfer_language(args, &original, file, mode);
        }

        edits.apply(args);

        add_target_and_mode(args, self.target.as_deref());

        args.retain(|arg| !arg.starts_with("-save-temps") && !arg.starts_with("--save-temps"));

        let has_exact = |flag: &str| args.iter().any(|arg| arg == flag);
        let has_prefix = |flag: &str| args.iter().any(|arg| arg.starts_with(flag));

        let mut extra = Vec::new();
        if let Some(dir) = &self.resource_dir {
            if !has_exact("-resource-dir") && !has_prefix("-resource-dir=") {
                extra.push(format!("-resource-dir={dir}"));
            }
        }
        if let Some(sysroot) = &self.sysroot {
            if !has_prefix("-isysroot") && !has_exact("--sysroot") && !has_prefix("--sysroot=") {
                extra.push("-isysroot".to_string());
                extra.push(sysroot.clone());
            }
        }
        let follow_symlinks = !has_exact("-no-canonical-prefixes");
        if !extra.is_empty() {
            let at = args.iter().position(|arg| arg == "--").unwrap_or(args.len());
            args.splice(at..at, extra);
        }

        if let Some(program) = args.first_mut() {
            let resolved = resolve_driver(
                program,
                follow_symlinks,
                self.clang_path.as_deref().map(Path::new),
                self.lookup.as_ref(),
            );
            *program = resolved;
        }
    }
}

/// Drops inputs, everything from `--` on, and conflicting `-arch` options.
///
/// A non-source token directly after an unknown option is kept as that
/// option's value.
///
/// Returns the last input whose extension differs from `file`'s.
fn restrict_inputs(args: &mut Vec<String>, file: &str, mode: DriverMode) -> Option<String> {
    let parsed = classify_args(args.as_slice(), mode);
    let file_ext = Path::new(file).extension();

    let mut dropped: Vec<Range<usize>> = Vec::new();
    let mut transfer_from = None;
    let mut dash_dash = None;

    let arch: Vec<_> = parsed
        .iter()
        .filter(|arg| arg.group() == Some("arch"))
        .map(|arg| arg.indices())
        .collect();
    if arch.len() > 1 {
        debug!(count = arch.len(), "Dropping conflicting -arch options");
        dropped.extend(arch);
    }

    let mut previous: Option<&ParsedArg> = None;
    for arg in &parsed {
        match arg.class {
            ArgClass::Input => {
                let input = &args[arg.index];
                let owner = previous
                    .filter(|prev| prev.class == ArgClass::Unknown)
                    .map(|prev| args[prev.index].as_str());
                if let Some(option) = owner {
                    if dash_dash.is_none() && reads_as_value(option, input, file) {
                        warn!(option, value = %input, "Keeping token after unknown option");
                        previous = Some(arg);
                        continue;
                    }
                }
                if Path::new(input).extension() != file_ext {
                    transfer_from = Some(input.clone());
                }
                if dash_dash.is_none() {
                    dropped.push(arg.indices());
                }
            }
            ArgClass::DashDash => dash_dash = Some(arg.index),
            _ => {}
        }
        previous = Some(arg);
    }

    if let Some(index) = dash_dash {
        args.truncate(index);
    }
    dropped.sort_by_key(|range| range.start);
    for range in dropped.into_iter().rev() {
        args.drain(range);
    }
    transfer_from
}

/// Whether `input`, right after an option the table does not know, is more
/// likely that option's separate value than a file to compile.
fn reads_as_value(option: &str, input: &str, file: &str) -> bool {
    if option.contains('=') || input == "-" || input == file {
        return false;
    }
    Path::new(input)
        .extension()
        .and_then(|ext| ext.to_str())
        .and_then(FileType::from_extension)
        .is_none()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(args: &[&str]) -> Vec<String> {
        args.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_restrict_inputs_remembers_other_extension() {
        let mut args = strings(&["clang", "-c", "a.c", "b.cc", "--", "c.cc"]);
        let from = restrict_inputs(&mut args, "x.cc", DriverMode::Gcc);
        assert_eq!(args, strings(&["clang", "-c"]));
        assert_eq!(from.as_deref(), Some("a.c"));
    }

    #[test]
    fn test_restrict_inputs_keeps_values_of_unknown_options() {
        let mut args = strings(&["clang", "-fake-separate", "Value", "-c", "a.c"]);
        assert_eq!(restrict_inputs(&mut args, "a.c", DriverMode::Gcc), None);
        assert_eq!(args, strings(&["clang", "-fake-separate", "Value", "-c"]));

        // Sources, stdin and joined unknown options still read as inputs.
        let mut args = strings(&["clang", "-fno-rtti", "b.cc", "-fx=1", "lib", "-g", "-"]);
        restrict_inputs(&mut args, "a.cc", DriverMode::Gcc);
        assert_eq!(args, strings(&["clang", "-fno-rtti", "-fx=1", "-g"]));
    }

    #[test]
    fn test_restrict_inputs_keeps_single_arch() {
        let mut args = strings(&["clang", "-arch", "arm64", "a.c"]);
        assert_eq!(restrict_inputs(&mut args, "a.c", DriverMode::Gcc), None);
        assert_eq!(args, strings(&["clang", "-arch", "arm64"]));
    }

    #[test]
    fn test_save_temps_removed() {
        let mangler = CommandMangler::new().with_lookup(crate::PathLookup::default());
        let mut args = strings(&["clang", "-save-temps=obj", "--save-temps", "-c", "a.c"]);
        mangler.mangle_args(&mut args, "a.c", &ArgEdits::new());
        assert_eq!(args, strings(&["clang", "-c", "--", "a.c"]));
    }
}
