//! Type definitions for the driver option model.
//!
//! This module defines how a compiler driver's options consume command-line
//! tokens, which command-line dialect an invocation is written in, and the
//! [`CompileCommand`] record that tooling rewrites.

use serde::{Deserialize, Serialize};

/// Command-line dialect an invocation is parsed in.
///
/// The same token can be an option in one dialect and a file in another:
/// `/Users/me/foo.cc` is an input for a GCC-style driver but `/U` followed
/// by a macro name for an MSVC-compatible one.
///
/// # Examples
///
/// ```
/// use compile_command_core::DriverMode;
///
/// assert_eq!(DriverMode::detect(&["clang", "-c", "foo.cc"]), DriverMode::Gcc);
/// assert_eq!(DriverMode::detect(&["clang-cl", "/c", "foo.cc"]), DriverMode::Cl);
/// assert_eq!(DriverMode::detect(&["CL.EXE", "foo.cc"]), DriverMode::Cl);
/// assert_eq!(DriverMode::detect(&["cc", "foo.cc", "--driver-mode=cl"]), DriverMode::Cl);
/// assert_eq!(DriverMode::detect(&["clang", "-cc1", "foo.cc"]), DriverMode::Cc1);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum DriverMode {
    /// GCC-compatible driver (`clang`, `clang++`, `gcc`, ...). The default.
    #[default]
    Gcc,
    /// MSVC-compatible driver (`clang-cl`, `cl.exe`, `--driver-mode=cl`).
    Cl,
    /// The compiler frontend itself (`-cc1`), also reached through `-Xclang`.
    Cc1,
}

impl DriverMode {
    /// Works out the dialect of a full argument vector (program name first).
    ///
    /// A program name ending in `cl` (ignoring case and a trailing `.exe`)
    /// selects [`DriverMode::Cl`]. An explicit `--driver-mode=cl` or `-cc1`
    /// anywhere in the vector overrides the name; the first one seen wins.
    pub fn detect<S: AsRef<str>>(args: &[S]) -> Self {
        let Some(program) = args.first() else {
            return Self::Gcc;
        };
        let program = program.as_ref().to_ascii_lowercase();
        let program = program.strip_suffix(".exe").unwrap_or(&program);
        let mut mode = if program.ends_with("cl") {
            Self::Cl
        } else {
            Self::Gcc
        };
        for arg in args {
            match arg.as_ref() {
                "--driver-mode=cl" => {
                    mode = Self::Cl;
                    break;
                }
                "-cc1" => {
                    mode = Self::Cc1;
                    break;
                }
                _ => {}
            }
        }
        mode
    }

    const fn bit(self) -> u8 {
        match self {
            Self::Gcc => 1,
            Self::Cl => 2,
            Self::Cc1 => 4,
        }
    }
}

/// Set of [`DriverMode`]s in which an option spelling is recognized.
///
/// # Examples
///
/// ```
/// use compile_command_core::{DriverMode, ModeSet};
///
/// let core = ModeSet::GCC.union(ModeSet::CL);
/// assert!(core.contains(DriverMode::Cl));
/// assert!(!core.contains(DriverMode::Cc1));
/// assert!(ModeSet::ALL.contains(DriverMode::Cc1));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ModeSet(u8);

impl ModeSet {
    pub const NONE: Self = Self(0);
    pub const GCC: Self = Self(DriverMode::Gcc.bit());
    pub const CL: Self = Self(DriverMode::Cl.bit());
    pub const CC1: Self = Self(DriverMode::Cc1.bit());
    /// GCC and CL drivers, but not the frontend.
    pub const CORE: Self = Self(Self::GCC.0 | Self::CL.0);
    /// GCC driver and the frontend.
    pub const GCC_CC1: Self = Self(Self::GCC.0 | Self::CC1.0);
    pub const ALL: Self = Self(Self::GCC.0 | Self::CL.0 | Self::CC1.0);

    /// Returns the union of both sets.
    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    /// Returns `true` if `mode` is a member of this set.
    pub const fn contains(self, mode: DriverMode) -> bool {
        self.0 & mode.bit() != 0
    }

    /// Returns `true` if the two sets share a mode.
    pub const fn intersects(self, other: Self) -> bool {
        self.0 & other.0 != 0
    }

    /// Returns `true` if the set has no members.
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Iterates over the modes in this set.
    pub fn modes(self) -> impl Iterator<Item = DriverMode> {
        [DriverMode::Gcc, DriverMode::Cl, DriverMode::Cc1]
            .into_iter()
            .filter(move |mode| self.contains(*mode))
    }
}

/// How many tokens an option occupies once its spelling has matched.
///
/// Counts include the option token itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Consume {
    /// The option cannot match in this form.
    Never,
    /// The option token plus `n - 1` following tokens.
    Tokens(usize),
    /// The option token and everything after it.
    Rest,
}

impl Consume {
    /// Number of tokens consumed, with [`Consume::Rest`] saturating to
    /// `usize::MAX`. Returns `None` for [`Consume::Never`].
    pub fn token_count(self) -> Option<usize> {
        match self {
            Self::Never => None,
            Self::Tokens(n) => Some(n),
            Self::Rest => Some(usize::MAX),
        }
    }
}

/// Argument-passing convention of an option.
///
/// # Examples
///
/// ```
/// use compile_command_core::{Consume, OptionKind};
///
/// // -I/usr/include or -I /usr/include
/// let kind = OptionKind::JoinedOrSeparate;
/// assert_eq!(kind.exact(), Consume::Tokens(2));
/// assert_eq!(kind.prefixed(), Consume::Tokens(1));
///
/// // -segaddr <name> <address>
/// assert_eq!(OptionKind::MultiArg(2).exact(), Consume::Tokens(3));
/// assert_eq!(OptionKind::MultiArg(2).prefixed(), Consume::Never);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OptionKind {
    /// No value: `-c`.
    Flag,
    /// Value attached to the spelling: `-std=c++17`.
    Joined,
    /// Value in the following token: `-mllvm -foo`.
    Separate,
    /// Either of the above: `-Ifoo`, `-I foo`.
    JoinedOrSeparate,
    /// Attached part plus the following token: `-plugin-arg-foo bar`.
    JoinedAndSeparate,
    /// Attached comma-separated list: `-Wl,-rpath,/lib`.
    CommaJoined,
    /// A fixed number of following tokens: `-segaddr name addr`.
    MultiArg(u8),
    /// Everything after the spelling, which must match exactly.
    RemainingArgs,
    /// Everything after the spelling, attached or not: `/link`.
    RemainingArgsJoined,
}

impl OptionKind {
    /// Tokens consumed when a token equals the option spelling.
    pub const fn exact(self) -> Consume {
        match self {
            Self::Flag | Self::Joined | Self::CommaJoined => Consume::Tokens(1),
            Self::Separate | Self::JoinedOrSeparate | Self::JoinedAndSeparate => {
                Consume::Tokens(2)
            }
            Self::MultiArg(n) => Consume::Tokens(1 + n as usize),
            Self::RemainingArgs | Self::RemainingArgsJoined => Consume::Rest,
        }
    }

    /// Tokens consumed when the option spelling is a strict prefix of a token.
    pub const fn prefixed(self) -> Consume {
        match self {
            Self::Flag | Self::Separate | Self::MultiArg(_) | Self::RemainingArgs => {
                Consume::Never
            }
            Self::Joined | Self::CommaJoined | Self::JoinedOrSeparate => Consume::Tokens(1),
            Self::JoinedAndSeparate => Consume::Tokens(2),
            Self::RemainingArgsJoined => Consume::Rest,
        }
    }

    /// Tokens consumed by a token that starts with the spelling.
    pub fn consumes(self, token: &str, spelling: &str) -> Consume {
        if !token.starts_with(spelling) {
            Consume::Never
        } else if token.len() > spelling.len() {
            self.prefixed()
        } else {
            self.exact()
        }
    }
}

/// A single compiler invocation for one file.
///
/// Mirrors one entry of a `compile_commands.json` database after the
/// `command` string form has been split into arguments.
///
/// # Examples
///
/// ```
/// use compile_command_core::CompileCommand;
///
/// let cmd = CompileCommand::new("/src", "foo.cc", ["clang++", "-c", "foo.cc"]);
/// assert_eq!(cmd.program(), Some("clang++"));
/// assert!(cmd.heuristic.is_none());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompileCommand {
    /// Working directory the command runs in.
    pub directory: String,
    /// The main file the command compiles.
    pub filename: String,
    /// Program name followed by its arguments.
    pub command_line: Vec<String>,
    /// Output file, when the database recorded one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
    /// How this command was derived when it was not recorded for `filename`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub heuristic: Option<String>,
}

impl CompileCommand {
    /// Creates a command with no output or heuristic.
    pub fn new<I, S>(directory: &str, filename: &str, command_line: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            directory: directory.to_string(),
            filename: filename.to_string(),
            command_line: command_line.into_iter().map(Into::into).collect(),
            output: None,
            heuristic: None,
        }
    }

    /// Returns the program name (first argument), if any.
    pub fn program(&self) -> Option<&str> {
        self.command_line.first().map(String::as_str)
    }
}
