//! Built-in table of compiler driver options.
//!
//! Each row describes one spelling family of an option: the prefixes it may
//! be written with, its name, how it consumes tokens, and the driver modes
//! that recognize it. Rows sharing a `group` are aliases of one logical
//! option, so `-x c++`, `--language c++` and `--language=c++` are all the
//! same thing.
//!
//! The table covers the options that matter when rewriting compile commands
//! and is extended by adding rows. [`validate_option_table`] keeps it
//! consistent.
//!
//! [`validate_option_table`]: crate::validate_option_table

use crate::types::{Consume, DriverMode, ModeSet, OptionKind};

const DASH: &[&str] = &["-"];
const DASH_DASH: &[&str] = &["--"];
const EITHER_DASH: &[&str] = &["-", "--"];
/// MSVC-style options accept both `/` and `-`.
const SLASH: &[&str] = &["/", "-"];
const SLASH_ONLY: &[&str] = &["/"];

/// One spelling family of a driver option.
///
/// # Examples
///
/// ```
/// use compile_command_core::{DriverMode, OptionKind, best_match};
///
/// let m = best_match("-std=c++17", DriverMode::Gcc).unwrap();
/// assert_eq!(m.spec.group, "std=");
/// assert_eq!(m.spec.kind, OptionKind::Joined);
/// assert_eq!(m.spelling_len, "-std=".len());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OptionSpec {
    /// Canonical option this row is an alias of.
    pub group: &'static str,
    /// Prefixes the name may be written with.
    pub prefixes: &'static [&'static str],
    /// Option name without prefix.
    pub name: &'static str,
    /// Argument-passing convention.
    pub kind: OptionKind,
    /// Driver modes that recognize this row.
    pub modes: ModeSet,
}

const fn opt(
    group: &'static str,
    prefixes: &'static [&'static str],
    name: &'static str,
    kind: OptionKind,
    modes: ModeSet,
) -> OptionSpec {
    OptionSpec {
        group,
        prefixes,
        name,
        kind,
        modes,
    }
}

use OptionKind::{
    CommaJoined, Flag, Joined, JoinedAndSeparate, JoinedOrSeparate, MultiArg,
    RemainingArgsJoined, Separate,
};

/// Options known to the driver, grouped by alias.
pub static DRIVER_OPTIONS: &[OptionSpec] = &[
    // Language and standard.
    opt("x", DASH, "x", JoinedOrSeparate, ModeSet::GCC_CC1),
    opt("x", DASH_DASH, "language", Separate, ModeSet::GCC),
    opt("x", DASH_DASH, "language=", Joined, ModeSet::GCC),
    opt("std=", EITHER_DASH, "std=", Joined, ModeSet::ALL),
    opt("std=", DASH_DASH, "std", Separate, ModeSet::GCC),
    opt("/std:", SLASH, "std:", Joined, ModeSet::CL),
    opt("/TP", SLASH, "TP", Flag, ModeSet::CL),
    opt("/TC", SLASH, "TC", Flag, ModeSet::CL),
    opt("/Tp", SLASH, "Tp", JoinedOrSeparate, ModeSet::CL),
    opt("/Tc", SLASH, "Tc", JoinedOrSeparate, ModeSet::CL),
    // Preprocessor.
    opt("I", DASH, "I", JoinedOrSeparate, ModeSet::GCC_CC1),
    opt("I", DASH_DASH, "include-directory", Separate, ModeSet::GCC),
    opt("I", DASH_DASH, "include-directory=", Joined, ModeSet::GCC),
    opt("I", SLASH, "I", JoinedOrSeparate, ModeSet::CL),
    opt("D", DASH, "D", JoinedOrSeparate, ModeSet::GCC_CC1),
    opt("D", DASH_DASH, "define-macro", Separate, ModeSet::GCC),
    opt("D", DASH_DASH, "define-macro=", Joined, ModeSet::GCC),
    opt("D", SLASH, "D", JoinedOrSeparate, ModeSet::CL),
    opt("U", DASH, "U", JoinedOrSeparate, ModeSet::GCC_CC1),
    opt("U", DASH_DASH, "undefine-macro", Separate, ModeSet::GCC),
    opt("U", DASH_DASH, "undefine-macro=", Joined, ModeSet::GCC),
    opt("U", SLASH, "U", JoinedOrSeparate, ModeSet::CL),
    opt("include", DASH, "include", JoinedOrSeparate, ModeSet::GCC_CC1),
    opt("include", DASH_DASH, "include", Separate, ModeSet::GCC),
    opt("include", DASH_DASH, "include=", Joined, ModeSet::GCC),
    opt("include", SLASH, "FI", JoinedOrSeparate, ModeSet::CL),
    opt("include-pch", DASH, "include-pch", Separate, ModeSet::GCC_CC1),
    opt("isystem", DASH, "isystem", JoinedOrSeparate, ModeSet::GCC_CC1),
    opt("isystem", SLASH, "imsvc", JoinedOrSeparate, ModeSet::CL),
    opt("isystem", SLASH_ONLY, "external:I", JoinedOrSeparate, ModeSet::CL),
    opt("iquote", DASH, "iquote", JoinedOrSeparate, ModeSet::GCC_CC1),
    opt("idirafter", DASH, "idirafter", JoinedOrSeparate, ModeSet::GCC_CC1),
    opt("isysroot", DASH, "isysroot", JoinedOrSeparate, ModeSet::GCC_CC1),
    opt("imacros", DASH, "imacros", JoinedOrSeparate, ModeSet::GCC_CC1),
    opt("iprefix", DASH, "iprefix", JoinedOrSeparate, ModeSet::GCC_CC1),
    opt("iwithprefix", DASH, "iwithprefix", JoinedOrSeparate, ModeSet::GCC_CC1),
    opt("iwithprefixbefore", DASH, "iwithprefixbefore", JoinedOrSeparate, ModeSet::GCC_CC1),
    opt("iwithsysroot", DASH, "iwithsysroot", JoinedOrSeparate, ModeSet::GCC_CC1),
    opt("ivfsoverlay", DASH, "ivfsoverlay", JoinedOrSeparate, ModeSet::GCC_CC1),
    opt("F", DASH, "F", JoinedOrSeparate, ModeSet::GCC_CC1),
    opt("iframework", DASH, "iframework", JoinedOrSeparate, ModeSet::GCC_CC1),
    opt("sysroot", DASH_DASH, "sysroot", Separate, ModeSet::CORE),
    opt("sysroot", DASH_DASH, "sysroot=", Joined, ModeSet::CORE),
    opt("resource-dir", DASH, "resource-dir", Separate, ModeSet::ALL),
    opt("resource-dir", DASH, "resource-dir=", Joined, ModeSet::CORE),
    // Outputs and actions.
    opt("o", DASH, "o", JoinedOrSeparate, ModeSet::GCC_CC1),
    opt("o", DASH_DASH, "output", Separate, ModeSet::GCC),
    opt("o", DASH_DASH, "output=", Joined, ModeSet::GCC),
    opt("o", SLASH, "o", JoinedOrSeparate, ModeSet::CL),
    opt("c", DASH, "c", Flag, ModeSet::CORE),
    opt("c", SLASH, "c", Flag, ModeSet::CL),
    opt("E", DASH, "E", Flag, ModeSet::ALL),
    opt("S", DASH, "S", Flag, ModeSet::GCC_CC1),
    opt("fsyntax-only", DASH, "fsyntax-only", Flag, ModeSet::ALL),
    opt("/Fo", SLASH, "Fo", Joined, ModeSet::CL),
    opt("/Fe", SLASH, "Fe", Joined, ModeSet::CL),
    opt("save-temps", EITHER_DASH, "save-temps", Flag, ModeSet::GCC),
    opt("save-temps", EITHER_DASH, "save-temps=", Joined, ModeSet::GCC),
    // Dependency output.
    opt("M", DASH, "M", Flag, ModeSet::GCC),
    opt("MM", DASH, "MM", Flag, ModeSet::GCC),
    opt("MD", DASH, "MD", Flag, ModeSet::GCC),
    opt("MMD", DASH, "MMD", Flag, ModeSet::GCC),
    opt("MP", DASH, "MP", Flag, ModeSet::GCC_CC1),
    opt("MF", DASH, "MF", JoinedOrSeparate, ModeSet::GCC_CC1),
    opt("MT", DASH, "MT", JoinedOrSeparate, ModeSet::GCC_CC1),
    opt("MQ", DASH, "MQ", JoinedOrSeparate, ModeSet::GCC_CC1),
    opt("MJ", DASH, "MJ", JoinedOrSeparate, ModeSet::GCC),
    opt("serialize-diagnostics", EITHER_DASH, "serialize-diagnostics", Separate, ModeSet::GCC),
    // Diagnostics.
    opt("W", DASH, "W", Joined, ModeSet::ALL),
    opt("W", DASH_DASH, "warn-", Joined, ModeSet::GCC),
    opt("w", DASH, "w", Flag, ModeSet::ALL),
    opt("pedantic", EITHER_DASH, "pedantic", Flag, ModeSet::GCC_CC1),
    opt("Qn", DASH, "Qn", Flag, ModeSet::GCC),
    // Pass-through to other tools.
    opt("Wl,", DASH, "Wl,", CommaJoined, ModeSet::GCC),
    opt("Wa,", DASH, "Wa,", CommaJoined, ModeSet::GCC),
    opt("Wp,", DASH, "Wp,", CommaJoined, ModeSet::GCC),
    opt("Xclang", DASH, "Xclang", Separate, ModeSet::CORE),
    opt("Xlinker", DASH, "Xlinker", Separate, ModeSet::GCC),
    opt("Xassembler", DASH, "Xassembler", Separate, ModeSet::GCC),
    opt("Xpreprocessor", DASH, "Xpreprocessor", Separate, ModeSet::GCC),
    opt("Xarch_", DASH, "Xarch_", JoinedAndSeparate, ModeSet::GCC),
    opt("mllvm", DASH, "mllvm", Separate, ModeSet::ALL),
    opt("/link", SLASH, "link", RemainingArgsJoined, ModeSet::CL),
    opt("/clang:", SLASH, "clang:", Joined, ModeSet::CL),
    // Driver and target selection.
    opt("driver-mode=", DASH_DASH, "driver-mode=", Joined, ModeSet::CORE),
    opt("target", DASH_DASH, "target=", Joined, ModeSet::CORE),
    opt("target", DASH, "target", Separate, ModeSet::CORE),
    opt("triple", DASH, "triple", Separate, ModeSet::CC1),
    opt("arch", DASH, "arch", Separate, ModeSet::GCC),
    opt("no-canonical-prefixes", DASH, "no-canonical-prefixes", Flag, ModeSet::CORE),
    opt("cc1", DASH, "cc1", Flag, ModeSet::GCC),
    // Linking.
    opt("L", DASH, "L", JoinedOrSeparate, ModeSet::GCC),
    opt("l", DASH, "l", JoinedOrSeparate, ModeSet::GCC),
    opt("G", DASH, "G", JoinedOrSeparate, ModeSet::GCC),
    opt("segaddr", DASH, "segaddr", MultiArg(2), ModeSet::GCC),
    opt("sectalign", DASH, "sectalign", MultiArg(3), ModeSet::GCC),
    opt("framework", DASH, "framework", Separate, ModeSet::GCC),
    opt("weak_framework", DASH, "weak_framework", Separate, ModeSet::GCC),
    opt("install_name", DASH, "install_name", Separate, ModeSet::GCC),
    opt("rpath", DASH, "rpath", Separate, ModeSet::GCC),
    // Optimization.
    opt("O", DASH, "O", Joined, ModeSet::ALL),
    // Frontend only.
    opt("plugin-arg-", DASH, "plugin-arg-", JoinedAndSeparate, ModeSet::CC1),
    opt("add-plugin", DASH, "add-plugin", Separate, ModeSet::CC1),
    opt("load", DASH, "load", Separate, ModeSet::CC1),
    opt("ast-dump", DASH, "ast-dump", Flag, ModeSet::CC1),
    // MSVC families that would otherwise read as file names.
    opt("/O", SLASH_ONLY, "O", Joined, ModeSet::CL),
    opt("/W", SLASH_ONLY, "W", Joined, ModeSet::CL),
    opt("/w", SLASH_ONLY, "w", Joined, ModeSet::CL),
    opt("/EH", SLASH_ONLY, "EH", Joined, ModeSet::CL),
    opt("/Z", SLASH_ONLY, "Z", Joined, ModeSet::CL),
    opt("/G", SLASH_ONLY, "G", Joined, ModeSet::CL),
    opt("/M", SLASH_ONLY, "M", Joined, ModeSet::CL),
    opt("/F", SLASH_ONLY, "F", Joined, ModeSet::CL),
    opt("/nologo", SLASH_ONLY, "nologo", Flag, ModeSet::CL),
    opt("/showIncludes", SLASH_ONLY, "showIncludes", Flag, ModeSet::CL),
    opt("/utf-8", SLASH_ONLY, "utf-8", Flag, ModeSet::CL),
    opt("/permissive", SLASH_ONLY, "permissive", Joined, ModeSet::CL),
    opt("/bigobj", SLASH_ONLY, "bigobj", Flag, ModeSet::CL),
];

impl OptionSpec {
    /// All prefixed spellings of this row, e.g. `-pedantic` and `--pedantic`.
    pub fn spellings(&self) -> impl Iterator<Item = String> + '_ {
        self.prefixes
            .iter()
            .map(move |prefix| format!("{prefix}{}", self.name))
    }

    /// Returns `true` if one of this row's spellings equals `spelling`.
    pub fn is_spelled(&self, spelling: &str) -> bool {
        self.prefixes.iter().any(|prefix| {
            spelling
                .strip_prefix(prefix)
                .is_some_and(|rest| rest == self.name)
        })
    }

    /// Length of the longest spelling of this row that starts `token`.
    pub fn matched_len(&self, token: &str) -> Option<usize> {
        self.prefixes
            .iter()
            .filter(|prefix| {
                token
                    .strip_prefix(**prefix)
                    .is_some_and(|rest| rest.starts_with(self.name))
            })
            .map(|prefix| prefix.len() + self.name.len())
            .max()
    }
}

/// A token matched against a row of [`DRIVER_OPTIONS`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OptionMatch {
    pub spec: &'static OptionSpec,
    /// Length of the matched spelling; anything after it is a joined value.
    pub spelling_len: usize,
    pub consume: Consume,
}

/// Finds the option a token spells in `mode`.
///
/// The longest spelling that accepts the token wins, so `-include-pch` is
/// never mistaken for `-include` with a joined `-pch` value. A spelling only
/// accepts a longer token if its kind allows joined values.
///
/// # Examples
///
/// ```
/// use compile_command_core::{Consume, DriverMode, best_match};
///
/// let m = best_match("-include-pch", DriverMode::Gcc).unwrap();
/// assert_eq!(m.spec.group, "include-pch");
/// assert_eq!(m.consume, Consume::Tokens(2));
///
/// // /U is only an option for MSVC-style drivers.
/// assert!(best_match("/Users/foo.cc", DriverMode::Gcc).is_none());
/// assert_eq!(best_match("/Users/foo.cc", DriverMode::Cl).unwrap().spec.group, "U");
/// ```
pub fn best_match(token: &str, mode: DriverMode) -> Option<OptionMatch> {
    let mut best: Option<OptionMatch> = None;
    for spec in DRIVER_OPTIONS {
        if !spec.modes.contains(mode) {
            continue;
        }
        let Some(len) = spec.matched_len(token) else {
            continue;
        };
        if best.is_some_and(|b| b.spelling_len >= len) {
            continue;
        }
        let consume = if token.len() > len {
            spec.kind.prefixed()
        } else {
            spec.kind.exact()
        };
        if consume != Consume::Never {
            best = Some(OptionMatch {
                spec,
                spelling_len: len,
                consume,
            });
        }
    }
    best
}

/// Returns every row that is an alias of the option spelled `spelling`.
///
/// Spellings may name any alias: `-x`, `--language` and `--language=` all
/// return the same three rows. Unknown spellings return an empty list.
///
/// # Examples
///
/// ```
/// use compile_command_core::alias_group;
///
/// let rows = alias_group("--language=");
/// assert!(rows.iter().any(|r| r.name == "x"));
/// assert!(rows.iter().any(|r| r.name == "language"));
/// assert!(alias_group("-xyzzy").is_empty());
/// ```
pub fn alias_group(spelling: &str) -> Vec<&'static OptionSpec> {
    let mut groups: Vec<&str> = DRIVER_OPTIONS
        .iter()
        .filter(|spec| spec.is_spelled(spelling))
        .map(|spec| spec.group)
        .collect();
    groups.dedup();
    DRIVER_OPTIONS
        .iter()
        .filter(|spec| groups.contains(&spec.group))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alias_group_covers_prefix_variants() {
        let rows = alias_group("--pedantic");
        assert_eq!(rows.len(), 1);
        let spellings: Vec<String> = rows[0].spellings().collect();
        assert_eq!(spellings, vec!["-pedantic", "--pedantic"]);
    }

    #[test]
    fn test_alias_group_includes_cl_synonyms() {
        let rows = alias_group("-I");
        assert!(rows.iter().any(|r| r.modes == ModeSet::CL));
        assert!(rows.iter().any(|r| r.name == "include-directory="));
    }

    #[test]
    fn test_best_match_rejects_flag_prefix() {
        assert!(best_match("-QnZ", DriverMode::Gcc).is_none());
        assert_eq!(
            best_match("-Qn", DriverMode::Gcc).unwrap().consume,
            Consume::Tokens(1)
        );
    }

    #[test]
    fn test_best_match_prefers_longer_spelling() {
        let m = best_match("-Wl,-rpath,/lib", DriverMode::Gcc).unwrap();
        assert_eq!(m.spec.group, "Wl,");
        let m = best_match("-resource-dir=/r", DriverMode::Gcc).unwrap();
        assert_eq!(m.spec.name, "resource-dir=");
    }

    #[test]
    fn test_best_match_respects_modes() {
        assert!(best_match("-ast-dump", DriverMode::Gcc).is_none());
        assert!(best_match("-ast-dump", DriverMode::Cc1).is_some());
        assert!(best_match("/link", DriverMode::Gcc).is_none());
        assert_eq!(
            best_match("/link", DriverMode::Cl).unwrap().consume,
            Consume::Rest
        );
    }

    #[test]
    fn test_separate_value_families() {
        let consumes = |token: &str| best_match(token, DriverMode::Gcc).map(|m| m.consume);
        for token in [
            "-framework",
            "-imacros",
            "-F",
            "-iframework",
            "-MJ",
            "-ivfsoverlay",
            "-serialize-diagnostics",
            "--serialize-diagnostics",
        ] {
            assert_eq!(consumes(token), Some(Consume::Tokens(2)), "{token}");
        }
        assert_eq!(consumes("-Xarch_x86_64"), Some(Consume::Tokens(2)));
        assert_eq!(consumes("-F/Library/Frameworks"), Some(Consume::Tokens(1)));
        assert_eq!(best_match("-framework", DriverMode::Gcc).unwrap().spec.group, "framework");
        assert_eq!(best_match("-MJ", DriverMode::Gcc).unwrap().spec.group, "MJ");
        assert!(best_match("-Fo", DriverMode::Cl).is_some_and(|m| m.spec.group == "/Fo"));
    }

    #[test]
    fn test_matched_len_picks_longest_prefix() {
        let spec = alias_group("-pedantic")[0];
        assert_eq!(spec.matched_len("--pedantic"), Some("--pedantic".len()));
        assert_eq!(spec.matched_len("-pedantic"), Some("-pedantic".len()));
        assert_eq!(spec.matched_len("pedantic"), None);
    }
}
