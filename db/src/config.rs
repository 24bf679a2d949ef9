//! YAML configuration of compile-flag edits.
//!
//! A configuration file holds one or more `---`-separated fragments. Each
//! fragment applies to the files its `If` block accepts and edits their
//! compile commands through its `CompileFlags` block.
//!
//! # Example YAML
//!
//! ```yaml
//! If:
//!   PathMatch: [".*\\.cc", ".*\\.h"]
//!   PathExclude: "third_party/.*"
//! CompileFlags:
//!   Compiler: clang++
//!   Remove: [-W*, -march=*]
//!   Add: [-Wall, -std=c++20]
//! ---
//! CompileFlags:
//!   Add: -DTOOLING
//! ```

use std::io::BufWriter;
use std::io::Write;
use std::path::Path;
use std::str::FromStr;

use compile_command_mangle::ArgEdits;
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize};
use tracing::debug;

use crate::error::Result;

/// A list given either as a single string or as a sequence.
#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

fn one_or_many<'de, D>(deserializer: D) -> std::result::Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match OneOrMany::deserialize(deserializer)? {
        OneOrMany::One(value) => vec![value],
        OneOrMany::Many(values) => values,
    })
}

/// Which files a [`Fragment`] applies to.
///
/// Patterns are regular expressions that must match the whole path, with
/// `/` as separator.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", deny_unknown_fields)]
pub struct Condition {
    /// The path must match one of these. Empty accepts every path.
    #[serde(default, deserialize_with = "one_or_many", skip_serializing_if = "Vec::is_empty")]
    pub path_match: Vec<String>,
    /// The path must match none of these.
    #[serde(default, deserialize_with = "one_or_many", skip_serializing_if = "Vec::is_empty")]
    pub path_exclude: Vec<String>,
}

impl Condition {
    fn is_empty(&self) -> bool {
        self.path_match.is_empty() && self.path_exclude.is_empty()
    }
}

/// Edits to apply to matching compile commands.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", deny_unknown_fields)]
pub struct CompileFlags {
    /// Arguments inserted before `--`.
    #[serde(default, deserialize_with = "one_or_many", skip_serializing_if = "Vec::is_empty")]
    pub add: Vec<String>,
    /// Option spellings stripped, with their aliases and values.
    #[serde(default, deserialize_with = "one_or_many", skip_serializing_if = "Vec::is_empty")]
    pub remove: Vec<String>,
    /// Replacement program name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compiler: Option<String>,
}

/// One `---`-separated document of an [`EditConfig`].
///
/// # Examples
///
/// ```
/// use compile_command_db::Fragment;
///
/// let fragment: Fragment = serde_yaml::from_str(
///     "If: { PathMatch: '.*\\.cc' }\nCompileFlags: { Add: [-Wall] }",
/// ).unwrap();
/// assert_eq!(fragment.condition.path_match, vec![".*\\.cc"]);
/// assert_eq!(fragment.compile_flags.add, vec!["-Wall"]);
/// assert!(fragment.validate().is_ok());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Fragment {
    #[serde(rename = "If", default, skip_serializing_if = "Condition::is_empty")]
    pub condition: Condition,
    #[serde(default)]
    pub compile_flags: CompileFlags,
}

impl Fragment {
    /// Checks that every path pattern compiles.
    ///
    /// # Errors
    ///
    /// Returns [`RegexError`](crate::DatabaseError::RegexError) for the
    /// first pattern that does not.
    pub fn validate(&self) -> Result<()> {
        self.compile().map(|_| ())
    }

    fn compile(&self) -> Result<CompiledFragment> {
        Ok(CompiledFragment {
            path_match: anchored(&self.condition.path_match)?,
            path_exclude: anchored(&self.condition.path_exclude)?,
            fragment: self.clone(),
        })
    }
}

fn anchored(patterns: &[String]) -> Result<Vec<Regex>> {
    patterns
        .iter()
        .map(|pattern| Ok(Regex::new(&format!("^(?:{pattern})$"))?))
        .collect()
}

#[derive(Debug, Clone)]
struct CompiledFragment {
    fragment: Fragment,
    path_match: Vec<Regex>,
    path_exclude: Vec<Regex>,
}

impl CompiledFragment {
    fn accepts(&self, path: &str) -> bool {
        (self.path_match.is_empty() || self.path_match.iter().any(|re| re.is_match(path)))
            && !self.path_exclude.iter().any(|re| re.is_match(path))
    }
}

/// Compile-flag edits loaded from YAML.
///
/// # Examples
///
/// ```
/// use compile_command_db::EditConfig;
///
/// let config: EditConfig = "
/// If: { PathExclude: 'gen/.*' }
/// CompileFlags: { Remove: [-Werror], Add: [-Wno-error] }
/// ".parse().unwrap();
///
/// let mut args: Vec<String> = ["clang", "-Werror", "--", "a.c"].map(String::from).to_vec();
/// config.edits_for("src/a.c").apply(&mut args);
/// assert_eq!(args, ["clang", "-Wno-error", "--", "a.c"]);
///
/// assert!(config.edits_for("gen/b.c").is_empty());
/// ```
#[derive(Debug, Clone, Default)]
pub struct EditConfig {
    fragments: Vec<CompiledFragment>,
}

impl FromStr for EditConfig {
    type Err = crate::DatabaseError;

    /// Parses every document of a YAML stream. Empty documents are skipped.
    fn from_str(yaml: &str) -> Result<Self> {
        let mut fragments = Vec::new();
        for document in serde_yaml::Deserializer::from_str(yaml) {
            if let Some(fragment) = Option::<Fragment>::deserialize(document)? {
                fragments.push(fragment);
            }
        }
        Self::new(fragments)
    }
}

impl EditConfig {
    /// Builds a configuration from fragments.
    ///
    /// # Errors
    ///
    /// Returns [`RegexError`](crate::DatabaseError::RegexError) if a
    /// fragment's path pattern does not compile.
    pub fn new(fragments: impl IntoIterator<Item = Fragment>) -> Result<Self> {
        let fragments = fragments
            .into_iter()
            .map(|fragment| fragment.compile())
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { fragments })
    }

    /// Loads configuration from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns [`IoError`](crate::DatabaseError::IoError) if the file cannot
    /// be read, [`YamlError`](crate::DatabaseError::YamlError) if parsing
    /// fails, or [`RegexError`](crate::DatabaseError::RegexError) for a bad
    /// path pattern.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let yaml = std::fs::read_to_string(path)?;
        let config: Self = yaml.parse()?;
        debug!(path = %path.display(), fragments = config.len(), "Loaded edit configuration");
        Ok(config)
    }

    /// Saves the configuration as a multi-document YAML file.
    ///
    /// # Errors
    ///
    /// Returns [`IoError`](crate::DatabaseError::IoError) if the file cannot
    /// be written, or [`YamlError`](crate::DatabaseError::YamlError) if
    /// serialization fails.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let file = std::fs::File::create(path)?;
        let mut writer = BufWriter::new(file);
        for (i, fragment) in self.fragments().enumerate() {
            if i > 0 {
                writer.write_all(b"---\n")?;
            }
            serde_yaml::to_writer(&mut writer, fragment)?;
        }
        writer.flush()?;
        Ok(())
    }

    pub fn fragments(&self) -> impl Iterator<Item = &Fragment> {
        self.fragments.iter().map(|compiled| &compiled.fragment)
    }

    pub fn len(&self) -> usize {
        self.fragments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }

    /// Collects the edits of every fragment that applies to `path`.
    ///
    /// Fragments contribute in file order; within a fragment the compiler is
    /// replaced first, then flags are removed, then flags are added.
    /// Backslashes in `path` are treated as `/`.
    pub fn edits_for(&self, path: &str) -> ArgEdits {
        let path = path.replace('\\', "/");
        let mut edits = ArgEdits::new();
        for compiled in self.fragments.iter().filter(|f| f.accepts(&path)) {
            let flags = &compiled.fragment.compile_flags;
            if let Some(compiler) = &flags.compiler {
                edits = edits.compiler(compiler.as_str());
            }
            edits = edits.remove(&flags.remove).add(flags.add.iter().cloned());
        }
        debug!(path = %path, edits = edits.len(), "Selected configured edits");
        edits
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_yaml() -> &'static str {
        r#"
If:
  PathMatch: [".*\\.cc", ".*\\.h"]
  PathExclude: third_party/.*
CompileFlags:
  Compiler: clang++
  Remove: [-W*]
  Add: [-Wall]
---
CompileFlags:
  Add: -DTOOLING
"#
    }

    fn strings(args: &[&str]) -> Vec<String> {
        args.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_deserialize_complete() {
        let config: EditConfig = sample_yaml().parse().unwrap();
        assert_eq!(config.len(), 2);
        let first = config.fragments().next().unwrap();
        assert_eq!(first.condition.path_match, vec![".*\\.cc", ".*\\.h"]);
        assert_eq!(first.condition.path_exclude, vec!["third_party/.*"]);
        assert_eq!(first.compile_flags.compiler.as_deref(), Some("clang++"));
        assert_eq!(first.compile_flags.remove, vec!["-W*"]);
        let second = config.fragments().nth(1).unwrap();
        assert!(second.condition.path_match.is_empty());
        assert_eq!(second.compile_flags.add, vec!["-DTOOLING"]);
    }

    #[test]
    fn test_empty_documents_are_skipped() {
        let config: EditConfig = "---\n---\nCompileFlags: { Add: [-g] }\n".parse().unwrap();
        assert_eq!(config.len(), 1);
        let config: EditConfig = "".parse().unwrap();
        assert!(config.is_empty());
    }

    #[test]
    fn test_unknown_key_is_an_error() {
        assert!("CompileFlags: { Append: [-g] }".parse::<EditConfig>().is_err());
    }

    #[test]
    fn test_bad_pattern_is_an_error() {
        let err = "If: { PathMatch: '(' }".parse::<EditConfig>().unwrap_err();
        assert!(matches!(err, crate::DatabaseError::RegexError(_)));
    }

    #[test]
    fn test_pattern_must_match_whole_path() {
        let config: EditConfig = "If: { PathMatch: 'src/.*' }\nCompileFlags: { Add: [-g] }"
            .parse()
            .unwrap();
        assert_eq!(config.edits_for("src/a.cc").len(), 1);
        assert!(config.edits_for("lib/src/a.cc").is_empty());
        assert_eq!(config.edits_for("src\\win.cc").len(), 1);
    }

    #[test]
    fn test_edits_in_fragment_order() {
        let config: EditConfig = sample_yaml().parse().unwrap();
        let mut args = strings(&["gcc", "-Wextra", "-Werror", "-c", "--", "a.cc"]);
        config.edits_for("a.cc").apply(&mut args);
        assert_eq!(
            args,
            strings(&["clang++", "-c", "-Wall", "-DTOOLING", "--", "a.cc"])
        );
    }

    #[test]
    fn test_excluded_path_gets_unconditional_fragments_only() {
        let config: EditConfig = sample_yaml().parse().unwrap();
        let mut args = strings(&["gcc", "-Werror", "--", "third_party/z.cc"]);
        config.edits_for("third_party/z.cc").apply(&mut args);
        assert_eq!(args, strings(&["gcc", "-Werror", "-DTOOLING", "--", "third_party/z.cc"]));
    }

    #[test]
    fn test_load_save_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");

        let original: EditConfig = sample_yaml().parse().unwrap();
        original.save(&path).unwrap();

        let loaded = EditConfig::load(&path).unwrap();
        assert_eq!(
            loaded.fragments().collect::<Vec<_>>(),
            original.fragments().collect::<Vec<_>>()
        );
    }
}
