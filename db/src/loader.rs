//! Loading `compile_commands.json` and finding the command for a file.
//!
//! Entries use either form the JSON compilation database format allows:
//!
//! ```json
//! [
//!   { "directory": "/src", "file": "a.cc", "arguments": ["clang++", "-c", "a.cc"] },
//!   { "directory": "/src", "file": "b.cc", "command": "clang++ -c 'b.cc'" }
//! ]
//! ```
//!
//! Files without an entry of their own, typically headers, borrow the
//! command of the most similar file.

use std::collections::HashMap;
use std::path::{Component, Path, PathBuf};

use compile_command_core::{CompileCommand, split_argv};
use serde::Deserialize;
use tracing::debug;

use crate::error::{DatabaseError, Result};

/// File name of the database inside a build directory.
pub const DATABASE_FILE: &str = "compile_commands.json";

#[derive(Debug, Deserialize)]
struct RawEntry {
    directory: String,
    file: String,
    #[serde(default)]
    arguments: Option<Vec<String>>,
    #[serde(default)]
    command: Option<String>,
    #[serde(default)]
    output: Option<String>,
}

impl RawEntry {
    fn into_command(self) -> Result<CompileCommand> {
        let command_line = match (self.arguments, &self.command) {
            (Some(arguments), _) => arguments,
            (None, Some(command)) => {
                split_argv(command).ok_or_else(|| DatabaseError::InvalidCommand {
                    file: self.file.clone(),
                    reason: format!("cannot split {command:?}"),
                })?
            }
            (None, None) => {
                return Err(DatabaseError::InvalidCommand {
                    file: self.file,
                    reason: "entry has neither `arguments` nor `command`".to_string(),
                });
            }
        };
        Ok(CompileCommand {
            directory: self.directory,
            filename: self.file,
            command_line,
            output: self.output,
            heuristic: None,
        })
    }
}

/// An in-memory compilation database.
///
/// # Examples
///
/// ```no_run
/// use compile_command_db::CompilationDatabase;
///
/// let db = CompilationDatabase::from_dir("build/").unwrap();
/// let cmd = db.command_for("src/widget.h").unwrap();
/// if let Some(how) = &cmd.heuristic {
///     println!("{how}");
/// }
/// println!("{:?}", cmd.command_line);
/// ```
#[derive(Debug, Clone, Default)]
pub struct CompilationDatabase {
    entries: Vec<CompileCommand>,
    /// Absolute, normalized file path to entry index. The first entry for a
    /// file wins.
    by_path: HashMap<PathBuf, usize>,
    /// Directory relative queries are resolved against.
    base: PathBuf,
}

impl CompilationDatabase {
    /// Builds a database from commands. Relative queries resolve against
    /// `base`.
    pub fn new(entries: Vec<CompileCommand>, base: impl Into<PathBuf>) -> Self {
        let mut by_path = HashMap::new();
        for (i, entry) in entries.iter().enumerate() {
            by_path.entry(entry_path(entry)).or_insert(i);
        }
        Self {
            entries,
            by_path,
            base: base.into(),
        }
    }

    /// Loads a `compile_commands.json` file.
    ///
    /// # Errors
    ///
    /// Returns [`DatabaseError::IoError`] if the file cannot be read,
    /// [`DatabaseError::JsonError`] if it is not a list of entries, or
    /// [`DatabaseError::InvalidCommand`] for an entry whose command cannot
    /// be split into arguments.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = std::fs::File::open(path)?;
        let reader = std::io::BufReader::new(file);
        let raw: Vec<RawEntry> = serde_json::from_reader(reader)?;
        let entries = raw
            .into_iter()
            .map(RawEntry::into_command)
            .collect::<Result<Vec<_>>>()?;
        debug!(path = %path.display(), entries = entries.len(), "Loaded compilation database");

        let base = path.parent().map(Path::to_path_buf).unwrap_or_default();
        Ok(Self::new(entries, base))
    }

    /// Loads `<dir>/compile_commands.json`.
    ///
    /// # Errors
    ///
    /// As for [`CompilationDatabase::from_file`].
    pub fn from_dir(dir: impl AsRef<Path>) -> Result<Self> {
        Self::from_file(dir.as_ref().join(DATABASE_FILE))
    }

    /// Returns the command for `file`.
    ///
    /// An entry recorded for the file is returned as is. Otherwise the
    /// command of the most similar file is borrowed: an entry in the same
    /// directory with the same file stem if there is one, else the entry
    /// sharing the longest leading run of directories. The borrowed command
    /// has its `filename` set to `file` and `heuristic` set to
    /// `inferred from <entry file>`.
    ///
    /// # Errors
    ///
    /// Returns [`DatabaseError::NotFound`] if the database is empty.
    pub fn command_for(&self, file: impl AsRef<Path>) -> Result<CompileCommand> {
        let target = normalize(&self.base.join(file.as_ref()));
        if let Some(&index) = self.by_path.get(&target) {
            return Ok(self.entries[index].clone());
        }

        let Some(index) = self.nearest(&target) else {
            return Err(DatabaseError::NotFound(target.display().to_string()));
        };
        let source = &self.entries[index];
        debug!(
            file = %target.display(),
            from = %source.filename,
            "Inferring compile command"
        );
        let mut command = source.clone();
        command.heuristic = Some(format!("inferred from {}", source.filename));
        command.filename = target.to_string_lossy().into_owned();
        command.output = None;
        Ok(command)
    }

    fn nearest(&self, target: &Path) -> Option<usize> {
        let paths: Vec<PathBuf> = self.entries.iter().map(entry_path).collect();

        let sibling = paths.iter().position(|path| {
            path.parent() == target.parent() && path.file_stem() == target.file_stem()
        });
        if sibling.is_some() {
            return sibling;
        }

        let target_dir = target.parent().unwrap_or(target);
        let mut best: Option<(usize, usize)> = None;
        for (i, path) in paths.iter().enumerate() {
            let dir = path.parent().unwrap_or(path);
            let shared = shared_components(dir, target_dir);
            if best.is_none_or(|(_, most)| shared > most) {
                best = Some((i, shared));
            }
        }
        best.map(|(i, _)| i)
    }

    pub fn entries(&self) -> &[CompileCommand] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn entry_path(entry: &CompileCommand) -> PathBuf {
    normalize(&Path::new(&entry.directory).join(&entry.filename))
}

/// Removes `.` components and folds `..` into its parent, without touching
/// the filesystem.
fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() {
                    out.push(component);
                }
            }
            other => out.push(other),
        }
    }
    out
}

fn shared_components(a: &Path, b: &Path) -> usize {
    a.components()
        .zip(b.components())
        .take_while(|(x, y)| x == y)
        .count()
}
