//! Core model of compiler driver command lines.
//!
//! This crate knows how compiler drivers read their arguments:
//!
//! - [`DriverMode`]: the dialect an invocation is written in (GCC-style,
//!   MSVC-style, or the `-cc1` frontend).
//! - [`OptionKind`] and [`Consume`]: how an option spelling consumes tokens.
//! - [`DRIVER_OPTIONS`]: the built-in option table, with
//!   [`best_match`] and [`alias_group`] for lookups.
//! - [`classify_args`]: splits an argument vector into options, inputs and
//!   the `--` separator.
//! - [`CompileCommand`]: one compiler invocation as recorded in a
//!   compilation database.
//!
//! Validation ([`validate_option_table`]) catches structural errors in an
//! option table, such as one spelling claimed by two options.
//!
//! # Example
//!
//! ```
//! use compile_command_core::*;
//!
//! let args = ["clang", "-Xclang", "-ast-dump", "-o", "foo.o", "foo.cc"];
//! assert_eq!(DriverMode::detect(&args), DriverMode::Gcc);
//!
//! let parsed = classify_args(&args, DriverMode::Gcc);
//! let groups: Vec<_> = parsed.iter().filter_map(|p| p.group()).collect();
//! assert_eq!(groups, vec!["Xclang", "o"]);
//!
//! assert_eq!(print_argv(&args[3..]), "-o foo.o foo.cc");
//! assert!(validate_option_table(DRIVER_OPTIONS).is_empty());
//! ```

mod argv;
mod options;
mod parse;
mod types;
mod validate;

pub use argv::{InsertPosition, insert_arguments, print_argv, split_argv};
pub use options::{DRIVER_OPTIONS, OptionMatch, OptionSpec, alias_group, best_match};
pub use parse::{ArgClass, ParsedArg, classify_args};
pub use types::*;
pub use validate::{ValidationError, validate_option_table};
