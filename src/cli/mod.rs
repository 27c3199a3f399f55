//! CLI support for the `case-tutor` binary: argument parsing, version and
//! terminal output.

pub mod args;
pub mod output;
pub mod version;

pub use args::{parse_args, CliCommand, USAGE};
pub use version::{version_line, VERSION};
