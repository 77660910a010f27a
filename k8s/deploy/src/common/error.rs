use crate::exec::redact_args;
use snafu::Snafu;
use std::path::PathBuf;

/// For use with multiple fallible operations which may fail for different reasons, but are
/// defined withing the same scope and must return to the outer scope (calling scope) using
/// the try operator -- '?'.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
#[snafu(context(suffix(false)))]
pub enum Error {
    /// Error for when a container registry URL is not of the form '<protocol>://<host>'.
    #[snafu(display("Failed to split registry url '{}'", url))]
    SplitRegistryUrl { url: String },

    /// Error for when an image reference cannot be split into repository and tag.
    #[snafu(display("Failed to split image name '{}'", image))]
    SplitImageName { image: String },

    /// Error for when a command could not be started.
    #[snafu(display(
        "Failed to run command,\ncommand: {},\nargs: {:?},\ncommand_error: {}",
        command,
        redact_args(args),
        source
    ))]
    CommandSpawn {
        source: std::io::Error,
        command: String,
        args: Vec<String>,
    },

    /// Error for when a command execution succeeds, but with an error.
    #[snafu(display(
        "`{}` command returned an error,\nargs: {:?},\nstatus: {},\nstd_err: {}",
        command,
        redact_args(args),
        status,
        std_err,
    ))]
    CommandFailed {
        command: String,
        args: Vec<String>,
        status: String,
        std_err: String,
    },

    /// Error for use when converting Vec<u8> to String.
    #[snafu(display("Failed to convert Vec<u8> to UTF-8 formatted String: {}", source))]
    U8VectorToString { source: std::str::Utf8Error },

    /// Error for when the output of the dry-run docker-registry Secret is not valid JSON.
    #[snafu(display("Failed to parse dry-run Secret as JSON: {}", source))]
    DryRunSecretParse { source: serde_json::Error },

    /// Error for when the dry-run docker-registry Secret has no value for the required key.
    #[snafu(display("Dry-run Secret has no '{}' key in .data", key))]
    DryRunSecretKey { key: String },

    /// Error for when regular expression parsing or compilation fails.
    #[snafu(display("Failed to compile regex {}: {}", expression, source))]
    RegexCompile {
        source: regex::Error,
        expression: String,
    },

    /// Error when reading a file.
    #[snafu(display("Failed to read file {}: {}", filepath.display(), source))]
    ReadingFile {
        source: std::io::Error,
        filepath: PathBuf,
    },

    /// Error for when the creation of a temporary file fails.
    #[snafu(display("Failed to create temporary file: {}", source))]
    TempFileCreation { source: std::io::Error },

    /// Error for when writing to a temporary file fails.
    #[snafu(display("Failed to write to temporary file {}: {}", filepath.display(), source))]
    WriteToTempFile {
        source: std::io::Error,
        filepath: PathBuf,
    },

    /// Error for when yaml could not be parsed from a config file.
    #[snafu(display("Failed to parse YAML config at {}: {}", filepath.display(), source))]
    ConfigFileParse {
        source: serde_yaml::Error,
        filepath: PathBuf,
    },

    /// Error for when a mandatory configuration option is empty.
    #[snafu(display("Mandatory option '{}' is not set", name))]
    MissingOption { name: String },

    /// Error for when the path to a file or directory cannot be validated.
    #[snafu(display("Failed to validate path {}: {}", path.display(), source))]
    ValidatePath {
        source: std::io::Error,
        path: PathBuf,
    },

    /// Error for when the path is not that of a directory.
    #[snafu(display("{} is not a directory", path.display()))]
    NotADirectory { path: PathBuf },

    /// Error for when the path is not that of a file.
    #[snafu(display("{} is not a file", path.display()))]
    NotAFile { path: PathBuf },

    /// Error for when the helm binary is not of the major version the deploy tool expects.
    #[snafu(display("Helm version {} does not match the expected '{}'", version, expected))]
    HelmVersion { version: String, expected: String },
}

/// A wrapper type to remove repeated Result<T, Error> returns.
pub type Result<T, E = Error> = std::result::Result<T, E>;
