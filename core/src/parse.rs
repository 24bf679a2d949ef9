//! Token classification for driver argument vectors.
//!
//! Splits an argument vector into options (with the value tokens they own),
//! unknown options, inputs, and the `--` separator, using
//! [`DRIVER_OPTIONS`](crate::DRIVER_OPTIONS) for the given driver mode.

use crate::options::{OptionMatch, best_match};
use crate::types::DriverMode;

/// What a classified token is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgClass {
    /// A known option; `values` following tokens belong to it.
    Option { matched: OptionMatch, values: usize },
    /// A `-`-prefixed token the table does not know. Owns no values.
    Unknown,
    /// A positional input file.
    Input,
    /// The `--` separator. Every later token is an [`ArgClass::Input`].
    DashDash,
}

/// A classified token and its position in the argument vector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParsedArg {
    pub index: usize,
    pub class: ArgClass,
}

impl ParsedArg {
    /// Returns the option group if this token is a known option.
    pub fn group(&self) -> Option<&'static str> {
        match self.class {
            ArgClass::Option { matched, .. } => Some(matched.spec.group),
            _ => None,
        }
    }

    /// Indices of this token and the value tokens it owns.
    pub fn indices(&self) -> std::ops::Range<usize> {
        let values = match self.class {
            ArgClass::Option { values, .. } => values,
            _ => 0,
        };
        self.index..self.index + 1 + values
    }

    /// The option's value: the part joined to the spelling if there is one,
    /// else the first value token.
    ///
    /// # Examples
    ///
    /// ```
    /// use compile_command_core::{DriverMode, classify_args};
    ///
    /// let args = ["clang", "-xc++", "--language", "c", "-c"];
    /// let parsed = classify_args(&args, DriverMode::Gcc);
    /// assert_eq!(parsed[0].value(&args), Some("c++"));
    /// assert_eq!(parsed[1].value(&args), Some("c"));
    /// assert_eq!(parsed[2].value(&args), None);
    /// ```
    pub fn value<'a, S: AsRef<str>>(&self, args: &'a [S]) -> Option<&'a str> {
        let ArgClass::Option { matched, values } = self.class else {
            return None;
        };
        let token = args.get(self.index)?.as_ref();
        match token.get(matched.spelling_len..) {
            Some(joined) if !joined.is_empty() => Some(joined),
            _ if values > 0 => args.get(self.index + 1).map(AsRef::as_ref),
            _ => None,
        }
    }
}

/// Classifies `args[1..]`; `args[0]` is the program name and is skipped.
///
/// An option missing some of its values at the end of the vector owns
/// whatever tokens remain. In [`DriverMode::Cl`] an unrecognized token
/// starting with `/` is an input (an absolute path), while in other modes
/// `/`-prefixed tokens are always inputs.
///
/// # Examples
///
/// ```
/// use compile_command_core::{ArgClass, DriverMode, classify_args};
///
/// let args = ["clang", "-I", "inc", "-Wall", "foo.cc", "--", "bar.cc"];
/// let parsed = classify_args(&args, DriverMode::Gcc);
/// let inputs: Vec<usize> = parsed
///     .iter()
///     .filter(|p| p.class == ArgClass::Input)
///     .map(|p| p.index)
///     .collect();
/// assert_eq!(inputs, vec![4, 6]);
/// assert_eq!(parsed[0].indices(), 1..3);
/// ```
pub fn classify_args<S: AsRef<str>>(args: &[S], mode: DriverMode) -> Vec<ParsedArg> {
    let mut parsed = Vec::new();
    let mut index = 1;
    let mut after_dash_dash = false;

    while index < args.len() {
        let token = args[index].as_ref();
        let class = if after_dash_dash {
            ArgClass::Input
        } else if token == "--" {
            after_dash_dash = true;
            ArgClass::DashDash
        } else if let Some(matched) = best_match(token, mode) {
            let remaining = args.len() - index - 1;
            let wanted = matched
                .consume
                .token_count()
                .map_or(0, |count| count.saturating_sub(1));
            ArgClass::Option {
                matched,
                values: wanted.min(remaining),
            }
        } else if token.len() > 1 && token.starts_with('-') {
            ArgClass::Unknown
        } else {
            ArgClass::Input
        };

        let entry = ParsedArg { index, class };
        index = entry.indices().end;
        parsed.push(entry);
    }

    parsed
}
