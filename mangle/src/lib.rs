//! Stripping and rewriting of compiler invocations.
//!
//! - [`ArgStripper`] removes options, with all their values and aliases,
//!   from an argument vector.
//! - [`CommandMangler`] rewrites a recorded compile command so a tool can
//!   replay it against one file: inputs restricted to that file, target and
//!   driver mode made explicit, toolchain paths filled in, driver resolved.
//! - [`ArgEdits`] are user edits applied while mangling, passed explicitly
//!   to every call.
//!
//! # Example
//!
//! ```
//! use compile_command_mangle::{ArgEdits, CommandMangler, PathLookup};
//!
//! let mangler = CommandMangler::new().with_lookup(PathLookup::default());
//! let edits = ArgEdits::new().remove(["-Werror"]).add(["-Wno-unused"]);
//!
//! let mut args: Vec<String> = ["clang", "-Werror", "-c", "foo.cc", "bar.cc"]
//!     .map(String::from)
//!     .to_vec();
//! mangler.mangle_args(&mut args, "foo.cc", &edits);
//! assert_eq!(args, ["clang", "-c", "-Wno-unused", "--", "foo.cc"]);
//! ```

mod detect;
mod driver;
mod edits;
mod filetype;
mod mangler;
mod strip;

pub use driver::{
    ExecutableLookup, PathLookup, ProgramName, SystemLookup, add_target_and_mode, resolve_driver,
};
pub use edits::{ArgEdit, ArgEdits};
pub use filetype::{FileType, transfer_language};
pub use mangler::CommandMangler;
pub use strip::{ArgStripper, StripRule};
