/// Contains constant values which are used as arguments to commands and in log messages.
pub mod constants;

/// Contains the error handling tooling.
pub mod error;

/// Contains tools for working with files.
pub(crate) mod file;

/// Contains macros.
pub(crate) mod macros;

/// Contains a wrapper around regex::Regex.
pub(crate) mod regex;
