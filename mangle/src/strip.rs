//! Removal of options, and the values they own, from argument vectors.
//!
//! Spellings registered with [`ArgStripper::strip`] are expanded through the
//! driver option table: stripping `-x` also strips `--language=c++`, and
//! stripping `-I` also strips `/I` for MSVC-style drivers. Spellings the
//! table does not know are matched literally, with a trailing `*` acting as
//! a prefix wildcard.

use compile_command_core::{Consume, DriverMode, ModeSet, alias_group};
use tracing::debug;

/// One matching rule produced by [`ArgStripper::strip`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StripRule {
    /// Text the token is compared against.
    pub text: String,
    /// Whether the token must equal `text`, rather than start with it.
    pub exact: bool,
    /// Driver modes the rule applies in.
    pub modes: ModeSet,
    /// Tokens removed when the rule matches, including the option itself.
    pub consume: Consume,
    /// Higher wins when several rules match. Literal rules have priority 0.
    pub priority: usize,
}

impl StripRule {
    fn matches(&self, token: &str, mode: DriverMode) -> bool {
        self.modes.contains(mode)
            && if self.exact {
                token == self.text
            } else {
                token.starts_with(&self.text)
            }
    }
}

/// Removes registered options from argument vectors.
///
/// Tokens escaped with `-Xclang` are matched in frontend mode, and the
/// escape marker goes away with the option it escapes. The program name is
/// never removed.
///
/// # Examples
///
/// ```
/// use compile_command_mangle::ArgStripper;
///
/// let mut stripper = ArgStripper::new();
/// stripper.strip("-o");
/// stripper.strip("-c");
///
/// let mut args: Vec<String> = ["clang", "-o", "foo.o", "foo.cc", "-c"]
///     .map(String::from)
///     .to_vec();
/// stripper.process(&mut args);
/// assert_eq!(args, ["clang", "foo.cc"]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct ArgStripper {
    rules: Vec<StripRule>,
}

impl ArgStripper {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a spelling to strip.
    ///
    /// Known options register a rule for every spelling of every alias, each
    /// with its own token count and driver modes. Anything else (including
    /// `-Xclang` itself) registers one literal single-token rule.
    pub fn strip(&mut self, spelling: &str) {
        let rows: Vec<_> = alias_group(spelling)
            .into_iter()
            .filter(|row| row.group != "Xclang")
            .collect();

        if rows.is_empty() {
            let (text, exact) = match spelling.strip_suffix('*') {
                Some(prefix) => (prefix, false),
                None => (spelling, true),
            };
            debug!(spelling, exact, "Stripping unknown option literally");
            self.rules.push(StripRule {
                text: text.to_string(),
                exact,
                modes: ModeSet::ALL,
                consume: Consume::Tokens(1),
                priority: 0,
            });
            return;
        }

        let before = self.rules.len();
        for row in rows {
            for text in row.spellings() {
                for (exact, consume) in [(true, row.kind.exact()), (false, row.kind.prefixed())] {
                    if consume == Consume::Never {
                        continue;
                    }
                    self.rules.push(StripRule {
                        priority: text.len(),
                        text: text.clone(),
                        exact,
                        modes: row.modes,
                        consume,
                    });
                }
            }
        }
        debug!(spelling, rules = self.rules.len() - before, "Registered strip rules");
    }

    /// All registered rules, in registration order.
    pub fn rules(&self) -> &[StripRule] {
        &self.rules
    }

    /// Returns how many tokens the best rule for `token` removes.
    ///
    /// The highest-priority matching rule wins, an exact rule beating a
    /// prefix rule of the same priority; among equals the one registered
    /// last.
    fn matching_rule(&self, token: &str, mode: DriverMode) -> Option<usize> {
        let mut best: Option<&StripRule> = None;
        for rule in &self.rules {
            if rule.matches(token, mode)
                && best.is_none_or(|b| (rule.priority, rule.exact) >= (b.priority, b.exact))
            {
                best = Some(rule);
            }
        }
        best.and_then(|rule| rule.consume.token_count())
    }

    /// Removes every matching option, with its values, from `args` in place.
    ///
    /// An option cut short by the end of the vector removes whatever values
    /// remain. A trailing `-Xclang` that escapes nothing is kept.
    pub fn process(&self, args: &mut Vec<String>) {
        if args.len() < 2 || self.rules.is_empty() {
            return;
        }

        let main_mode = DriverMode::detect(args.as_slice());
        let mut mode = main_mode;
        let mut was_xclang = false;
        let (mut read, mut write) = (1, 1);

        while read < args.len() {
            if let Some(count) = self.matching_rule(&args[read], mode) {
                if was_xclang {
                    write -= 1;
                    mode = main_mode;
                    was_xclang = false;
                }
                let mut consumed = 1;
                while read < args.len() && consumed < count {
                    read += 1;
                    if read < args.len() && args[read] == "-Xclang" {
                        read += 1;
                    }
                    consumed += 1;
                }
            } else {
                was_xclang = args[read] == "-Xclang";
                mode = if was_xclang { DriverMode::Cc1 } else { main_mode };
                args.swap(write, read);
                write += 1;
            }
            read += 1;
        }

        args.truncate(write);
    }
}
