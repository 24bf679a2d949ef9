//! User-supplied argument edits.

use std::fmt;
use std::sync::Arc;

use compile_command_core::{InsertPosition, insert_arguments};

use crate::strip::ArgStripper;

/// A single in-place edit of an argument vector.
pub type ArgEdit = Arc<dyn Fn(&mut Vec<String>) + Send + Sync>;

/// An ordered list of argument edits, applied one after another.
///
/// Edits see the whole vector, including the trailing `-- <file>` the
/// mangler appends.
///
/// # Examples
///
/// ```
/// use compile_command_mangle::ArgEdits;
///
/// let edits = ArgEdits::new()
///     .compiler("clang++")
///     .remove(["-W*"])
///     .add(["-Wall"]);
///
/// let mut args: Vec<String> = ["g++", "-Wextra", "-c", "--", "a.cc"]
///     .map(String::from)
///     .to_vec();
/// edits.apply(&mut args);
/// assert_eq!(args, ["clang++", "-c", "-Wall", "--", "a.cc"]);
/// ```
#[derive(Clone, Default)]
pub struct ArgEdits {
    edits: Vec<ArgEdit>,
}

impl ArgEdits {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an arbitrary edit.
    pub fn push<F>(&mut self, edit: F)
    where
        F: Fn(&mut Vec<String>) + Send + Sync + 'static,
    {
        self.edits.push(Arc::new(edit));
    }

    /// Inserts `args` before `--`, or at the end if there is none.
    pub fn add<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let extra: Vec<String> = args.into_iter().map(Into::into).collect();
        if !extra.is_empty() {
            self.push(move |argv| insert_arguments(argv, extra.as_slice(), InsertPosition::End));
        }
        self
    }

    /// Strips the given spellings, as [`ArgStripper::strip`] does.
    pub fn remove<I, S>(mut self, spellings: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut stripper = ArgStripper::new();
        for spelling in spellings {
            stripper.strip(spelling.as_ref());
        }
        if !stripper.rules().is_empty() {
            self.push(move |argv| stripper.process(argv));
        }
        self
    }

    /// Replaces the program name, unless the vector is empty.
    pub fn compiler(mut self, program: impl Into<String>) -> Self {
        let program = program.into();
        self.push(move |argv| {
            if let Some(first) = argv.first_mut() {
                first.clone_from(&program);
            }
        });
        self
    }

    /// Appends every edit of `other`, keeping its order.
    pub fn extend(&mut self, other: ArgEdits) {
        self.edits.extend(other.edits);
    }

    /// Runs every edit in order.
    pub fn apply(&self, args: &mut Vec<String>) {
        for edit in &self.edits {
            edit(args);
        }
    }

    pub fn len(&self) -> usize {
        self.edits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edits.is_empty()
    }
}

impl fmt::Debug for ArgEdits {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ArgEdits")
            .field("len", &self.edits.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(args: &[&str]) -> Vec<String> {
        args.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_edits_run_in_order() {
        let mut edits = ArgEdits::new();
        edits.push(|argv| argv.push("first".into()));
        edits.push(|argv| {
            if let Some(last) = argv.last_mut() {
                last.make_ascii_uppercase();
            }
        });
        let mut args = strings(&["clang"]);
        edits.apply(&mut args);
        assert_eq!(args, strings(&["clang", "FIRST"]));
    }

    #[test]
    fn test_empty_builders_add_nothing() {
        let edits = ArgEdits::new().add(Vec::<String>::new()).remove(Vec::<&str>::new());
        assert!(edits.is_empty());
    }

    #[test]
    fn test_compiler_on_empty_vector() {
        let edits = ArgEdits::new().compiler("clang");
        let mut args = Vec::new();
        edits.apply(&mut args);
        assert!(args.is_empty());
        assert_eq!(edits.len(), 1);
    }

    #[test]
    fn test_extend_keeps_order() {
        let mut edits = ArgEdits::new().add(["-a"]);
        edits.extend(ArgEdits::new().add(["-b"]));
        let mut args = strings(&["clang", "--", "x.c"]);
        edits.apply(&mut args);
        assert_eq!(args, strings(&["clang", "-a", "-b", "--", "x.c"]));
    }
}
