//! Compilation databases and compile-flag edit configuration.
//!
//! This crate loads the inputs a tool needs before it can mangle commands:
//! `compile_commands.json` files, and YAML configuration describing which
//! edits apply to which files.
//!
//! # Quick start
//!
//! ```no_run
//! use compile_command_db::{CompilationDatabase, EditConfig};
//! use compile_command_mangle::CommandMangler;
//!
//! let db = CompilationDatabase::from_dir("build/").unwrap();
//! let config = EditConfig::load(".compile-flags.yaml").unwrap();
//! let mangler = CommandMangler::detect();
//!
//! let mut cmd = db.command_for("src/main.cc").unwrap();
//! let file = cmd.filename.clone();
//! mangler.mangle(&mut cmd, &file, &config.edits_for("src/main.cc"));
//! println!("{:?}", cmd.command_line);
//! ```

mod config;
mod error;
mod loader;

pub use config::{CompileFlags, Condition, EditConfig, Fragment};
pub use error::{DatabaseError, Result};
pub use loader::{CompilationDatabase, DATABASE_FILE};
