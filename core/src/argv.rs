//! Rendering, splitting and editing of argument vectors.

/// Renders an argument vector as a single shell-style line.
///
/// Tokens containing whitespace, quotes or backslashes (and the empty token)
/// are wrapped in double quotes with `"` and `\` backslash-escaped.
/// Everything else, including a lone `$`, is written verbatim.
///
/// # Examples
///
/// ```
/// use compile_command_core::print_argv;
///
/// let args = ["one", "two", "thr ee", "f\"o\"ur", "fi\\ve", "$"];
/// assert_eq!(print_argv(&args), r#"one two "thr ee" "f\"o\"ur" "fi\\ve" $"#);
/// ```
pub fn print_argv<S: AsRef<str>>(args: &[S]) -> String {
    let mut out = String::new();
    for (i, arg) in args.iter().enumerate() {
        if i > 0 {
            out.push(' ');
        }
        let arg = arg.as_ref();
        if !needs_quoting(arg) {
            out.push_str(arg);
            continue;
        }
        out.push('"');
        for c in arg.chars() {
            if c == '"' || c == '\\' {
                out.push('\\');
            }
            out.push(c);
        }
        out.push('"');
    }
    out
}

fn needs_quoting(arg: &str) -> bool {
    arg.is_empty()
        || arg
            .chars()
            .any(|c| c.is_whitespace() || c.is_control() || matches!(c, '"' | '\'' | '\\'))
}

/// Splits a shell-style command line into arguments.
///
/// Returns `None` for unbalanced quotes or a trailing escape.
///
/// # Examples
///
/// ```
/// use compile_command_core::{print_argv, split_argv};
///
/// let args = vec!["clang".to_string(), "-DNAME=a b".to_string(), "fi\\ve".to_string()];
/// assert_eq!(split_argv(&print_argv(&args)), Some(args));
/// assert_eq!(split_argv("clang \"unterminated"), None);
/// ```
pub fn split_argv(line: &str) -> Option<Vec<String>> {
    shlex::split(line)
}

/// Where [`insert_arguments`] places new arguments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InsertPosition {
    /// Directly after the program name.
    Begin,
    /// Before the first `--`, or at the end if there is none.
    #[default]
    End,
}

/// Inserts `extra` into an argument vector.
///
/// # Examples
///
/// ```
/// use compile_command_core::{InsertPosition, insert_arguments};
///
/// let mut args: Vec<String> = ["clang", "-c", "--", "foo.cc"].map(String::from).to_vec();
/// insert_arguments(&mut args, &["-Wall"], InsertPosition::End);
/// insert_arguments(&mut args, &["-v"], InsertPosition::Begin);
/// assert_eq!(args, ["clang", "-v", "-c", "-Wall", "--", "foo.cc"]);
/// ```
pub fn insert_arguments<S: AsRef<str>>(
    args: &mut Vec<String>,
    extra: &[S],
    position: InsertPosition,
) {
    let at = match position {
        InsertPosition::Begin => args.len().min(1),
        InsertPosition::End => args.iter().position(|a| a == "--").unwrap_or(args.len()),
    };
    args.splice(at..at, extra.iter().map(|s| s.as_ref().to_string()));
}
