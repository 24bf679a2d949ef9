//! Source languages and moving a command between files of different types.
//!
//! A command recorded for `foo.cc` can be reused for `foo.h`, but the
//! header's extension alone would make the driver treat it as C. The
//! command's original language is carried over with an explicit `-x`.

use std::path::Path;

use compile_command_core::{DriverMode, InsertPosition, classify_args, insert_arguments};
use tracing::debug;

/// Input file types the driver distinguishes by extension or `-x`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileType {
    C,
    CHeader,
    Cxx,
    CxxHeader,
    ObjC,
    ObjCHeader,
    ObjCxx,
    ObjCxxHeader,
    Cuda,
    CudaDevice,
    PreprocessedC,
    PreprocessedCxx,
    Asm,
    AsmWithCpp,
}

impl FileType {
    /// Looks up a file extension (without the dot). Case matters: `.C` is C++.
    pub fn from_extension(ext: &str) -> Option<Self> {
        Some(match ext {
            "c" => Self::C,
            "h" => Self::CHeader,
            "C" | "cc" | "CC" | "cp" | "cpp" | "CPP" | "cxx" | "CXX" | "c++" | "C++" | "cppm"
            | "ixx" => Self::Cxx,
            "H" | "hh" | "hpp" | "hxx" | "h++" | "HPP" | "tcc" => Self::CxxHeader,
            "m" => Self::ObjC,
            "M" | "mm" => Self::ObjCxx,
            "cu" => Self::Cuda,
            "i" => Self::PreprocessedC,
            "ii" => Self::PreprocessedCxx,
            "s" => Self::Asm,
            "S" | "sx" => Self::AsmWithCpp,
            _ => return None,
        })
    }

    /// Looks up a `-x` language name.
    pub fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "c" => Self::C,
            "c-header" => Self::CHeader,
            "c++" => Self::Cxx,
            "c++-header" => Self::CxxHeader,
            "objective-c" => Self::ObjC,
            "objective-c-header" => Self::ObjCHeader,
            "objective-c++" => Self::ObjCxx,
            "objective-c++-header" => Self::ObjCxxHeader,
            "cuda" => Self::Cuda,
            "cuda-cpp-output" => Self::CudaDevice,
            "cpp-output" => Self::PreprocessedC,
            "c++-cpp-output" => Self::PreprocessedCxx,
            "assembler" => Self::Asm,
            "assembler-with-cpp" => Self::AsmWithCpp,
            _ => return None,
        })
    }

    /// The `-x` language name.
    pub fn name(self) -> &'static str {
        match self {
            Self::C => "c",
            Self::CHeader => "c-header",
            Self::Cxx => "c++",
            Self::CxxHeader => "c++-header",
            Self::ObjC => "objective-c",
            Self::ObjCHeader => "objective-c-header",
            Self::ObjCxx => "objective-c++",
            Self::ObjCxxHeader => "objective-c++-header",
            Self::Cuda => "cuda",
            Self::CudaDevice => "cuda-cpp-output",
            Self::PreprocessedC => "cpp-output",
            Self::PreprocessedCxx => "c++-cpp-output",
            Self::Asm => "assembler",
            Self::AsmWithCpp => "assembler-with-cpp",
        }
    }

    /// Guesses a file's type from its extension.
    ///
    /// The flag is `false` when the guess is unreliable: `.h` is used for
    /// C, C++ and Objective-C headers alike.
    ///
    /// # Examples
    ///
    /// ```
    /// use compile_command_mangle::FileType;
    ///
    /// assert_eq!(FileType::guess("a/foo.cc"), (Some(FileType::Cxx), true));
    /// assert_eq!(FileType::guess("foo.h"), (Some(FileType::CHeader), false));
    /// assert_eq!(FileType::guess("vector"), (None, false));
    /// ```
    pub fn guess(path: &str) -> (Option<Self>, bool) {
        let file_type = Path::new(path)
            .extension()
            .and_then(|ext| ext.to_str())
            .and_then(Self::from_extension);
        let certain = file_type.is_some_and(|t| t != Self::CHeader);
        (file_type, certain)
    }

    /// The language family a type belongs to, for types that have one.
    pub fn fold(self) -> Option<Self> {
        match self {
            Self::C | Self::CHeader => Some(Self::C),
            Self::Cxx | Self::CxxHeader => Some(Self::Cxx),
            Self::ObjC | Self::ObjCHeader => Some(Self::ObjC),
            Self::ObjCxx | Self::ObjCxxHeader => Some(Self::ObjCxx),
            Self::Cuda | Self::CudaDevice => Some(Self::Cuda),
            _ => None,
        }
    }

    /// The header type of a source language; other types map to themselves.
    pub fn header_variant(self) -> Self {
        match self {
            Self::C => Self::CHeader,
            Self::Cxx => Self::CxxHeader,
            Self::ObjC => Self::ObjCHeader,
            Self::ObjCxx => Self::ObjCxxHeader,
            other => other,
        }
    }

    pub fn is_header(self) -> bool {
        matches!(
            self,
            Self::CHeader | Self::CxxHeader | Self::ObjCHeader | Self::ObjCxxHeader
        )
    }

    /// The MSVC-style flag selecting this language, if there is one.
    pub fn cl_flag(self) -> Option<&'static str> {
        match self {
            Self::C | Self::CHeader => Some("/TC"),
            Self::Cxx | Self::CxxHeader => Some("/TP"),
            _ => None,
        }
    }
}

/// Carries the language of `original_file` over to `file`.
///
/// `args` must already end in `-- <file>`. Existing language selections
/// (`-x`, `--language`, `/TC`, `/TP`) are removed; if `file`'s extension
/// does not settle its language, `-x <language>` (or `/TC`/`/TP` for
/// MSVC-style drivers) is inserted before `--`, using the header variant
/// when `file` is a header or has no known extension. `-std` flags are kept
/// only if the language does not change.
///
/// # Examples
///
/// ```
/// use compile_command_core::DriverMode;
/// use compile_command_mangle::transfer_language;
///
/// let mut args: Vec<String> = ["clang", "-std=c++17", "--", "foo.h"]
///     .map(String::from)
///     .to_vec();
/// transfer_language(&mut args, "foo.cc", "foo.h", DriverMode::Gcc);
/// assert_eq!(args, ["clang", "-std=c++17", "-x", "c++-header", "--", "foo.h"]);
/// ```
pub fn transfer_language(
    args: &mut Vec<String>,
    original_file: &str,
    file: &str,
    mode: DriverMode,
) {
    let parsed = classify_args(args.as_slice(), mode);
    let mut explicit = None;
    let mut lang_flags = Vec::new();
    let mut std_flags = Vec::new();

    for arg in &parsed {
        match arg.group() {
            Some("x") => {
                explicit = Some(arg.value(args.as_slice()).and_then(FileType::from_name));
                lang_flags.push(arg.indices());
            }
            Some("/TC") => {
                explicit = Some(Some(FileType::C));
                lang_flags.push(arg.indices());
            }
            Some("/TP") => {
                explicit = Some(Some(FileType::Cxx));
                lang_flags.push(arg.indices());
            }
            Some("std=") | Some("/std:") => std_flags.push(arg.indices()),
            _ => {}
        }
    }

    let original = explicit
        .unwrap_or_else(|| FileType::guess(original_file).0)
        .and_then(FileType::fold);
    let (guessed, certain) = FileType::guess(file);

    let mut target = guessed;
    let mut inserted: Vec<&str> = Vec::new();
    if let Some(lang) = original.filter(|_| !certain) {
        let chosen = if guessed.is_none_or(FileType::is_header) {
            lang.header_variant()
        } else {
            lang
        };
        target = Some(chosen);
        if mode == DriverMode::Cl {
            inserted.extend(chosen.cl_flag());
        } else {
            inserted.extend(["-x", chosen.name()]);
        }
    }

    let keep_std = original.is_some() && target.and_then(FileType::fold) == original;
    let mut removed = lang_flags;
    if !keep_std {
        removed.extend(std_flags);
    }
    removed.sort_by_key(|range| range.start);
    for range in removed.into_iter().rev() {
        args.drain(range);
    }

    debug!(
        from = original_file,
        to = file,
        language = original.map(FileType::name),
        inserted = ?inserted,
        keep_std,
        "Transferring language between files"
    );
    insert_arguments(args, &inserted, InsertPosition::End);
}
