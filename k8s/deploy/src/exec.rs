use crate::common::{
    constants::REDACTED,
    error::{CommandFailed, CommandSpawn, Result, U8VectorToString},
};
use snafu::{ensure, ResultExt};
use std::{fmt, process::Command, str};
use tracing::debug;

/// Arguments whose value after the '=' is a credential.
const SECRET_ARG_PREFIXES: [&str; 1] = ["--docker-password="];

/// Keys in a helm `--set` list whose value is a credential.
const SECRET_SET_KEYS: [&str; 1] = ["secret.dockerconfigjson="];

/// A single command to be run: the executable, its ordered arguments and any environment
/// variables to set for it.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Invocation {
    command: String,
    args: Vec<String>,
    envs: Vec<(String, String)>,
}

impl Invocation {
    /// Creates an Invocation for the executable `command`, which is looked up in $PATH.
    pub fn new<C, A>(command: C, args: Vec<A>) -> Self
    where
        C: ToString,
        A: ToString,
    {
        Self {
            command: command.to_string(),
            args: args.iter().map(ToString::to_string).collect(),
            envs: Vec::new(),
        }
    }

    /// Adds an environment variable for the child process.
    #[must_use]
    pub fn with_env<K, V>(mut self, key: K, value: V) -> Self
    where
        K: ToString,
        V: ToString,
    {
        self.envs.push((key.to_string(), value.to_string()));
        self
    }

    /// This is a getter for the executable name.
    pub fn command(&self) -> &str {
        self.command.as_str()
    }

    /// This is a getter for the ordered arguments.
    pub fn args(&self) -> &[String] {
        self.args.as_slice()
    }

    /// This is a getter for the environment variables.
    pub fn envs(&self) -> &[(String, String)] {
        self.envs.as_slice()
    }
}

impl fmt::Display for Invocation {
    /// Credentials are redacted, so this is safe to log.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.command)?;
        for arg in redact_args(&self.args) {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}

/// Returns a copy of the arguments with credential values replaced.
pub fn redact_args(args: &[String]) -> Vec<String> {
    args.iter().map(|arg| redact_arg(arg)).collect()
}

fn redact_arg(arg: &str) -> String {
    if let Some(prefix) = SECRET_ARG_PREFIXES
        .iter()
        .find(|prefix| arg.starts_with(*prefix))
    {
        return format!("{prefix}{REDACTED}");
    }

    if !SECRET_SET_KEYS.iter().any(|key| arg.contains(key)) {
        return arg.to_string();
    }

    arg.split(',')
        .map(|pair| {
            match SECRET_SET_KEYS.iter().find(|key| pair.starts_with(*key)) {
                Some(key) => format!("{key}{REDACTED}"),
                None => pair.to_string(),
            }
        })
        .collect::<Vec<String>>()
        .join(",")
}

/// Runs commands on behalf of a deployment. Implementations run one command at a time and
/// return its standard output.
pub trait CommandExecutor {
    /// Runs the invocation to completion. A non-zero exit is an error.
    fn execute(&self, invocation: &Invocation) -> Result<String>;
}

/// This type runs commands as child processes of this one.
#[derive(Clone, Debug, Default)]
pub struct SystemExecutor;

impl CommandExecutor for SystemExecutor {
    fn execute(&self, invocation: &Invocation) -> Result<String> {
        let command = invocation.command();
        let args = invocation.args().to_vec();

        debug!(%invocation, "Running command");

        let output = Command::new(command)
            .args(args.as_slice())
            .envs(invocation.envs().iter().map(|(k, v)| (k, v)))
            .output()
            .context(CommandSpawn {
                command: command.to_string(),
                args: args.clone(),
            })?;

        let stdout_str = str::from_utf8(output.stdout.as_slice()).context(U8VectorToString)?;
        debug!(%command, bytes = stdout_str.len(), "Command standard output");
        ensure!(
            output.status.success(),
            CommandFailed {
                command: command.to_string(),
                args,
                status: output.status.to_string(),
                std_err: String::from_utf8_lossy(output.stderr.as_slice()).to_string()
            }
        );

        Ok(stdout_str.to_string())
    }
}

/// Test tooling for code which runs commands.
#[cfg(test)]
pub(crate) mod testing {
    use super::{CommandExecutor, Invocation};
    use crate::common::error::{CommandFailed, Result};
    use std::{cell::RefCell, collections::HashMap, fs};

    /// The command and its arguments joined by spaces, without redaction.
    pub(crate) fn command_line(invocation: &Invocation) -> String {
        std::iter::once(invocation.command())
            .chain(invocation.args().iter().map(String::as_str))
            .collect::<Vec<&str>>()
            .join(" ")
    }

    /// Records every invocation instead of running it. Standard output is looked up by the
    /// full command line. Commands whose command line starts with a registered failure prefix
    /// fail with a non-zero exit. The file named by a `--filename` argument is read while the
    /// command runs, since it may be gone once the command returns.
    #[derive(Default)]
    pub(crate) struct RecordingExecutor {
        calls: RefCell<Vec<Invocation>>,
        applied_files: RefCell<Vec<String>>,
        stdout: HashMap<String, String>,
        failures: Vec<String>,
    }

    impl RecordingExecutor {
        #[must_use]
        pub(crate) fn with_stdout(mut self, command_line: &str, stdout: &str) -> Self {
            self.stdout
                .insert(command_line.to_string(), stdout.to_string());
            self
        }

        #[must_use]
        pub(crate) fn with_failure(mut self, command_line_prefix: &str) -> Self {
            self.failures.push(command_line_prefix.to_string());
            self
        }

        pub(crate) fn calls(&self) -> Vec<Invocation> {
            self.calls.borrow().clone()
        }

        /// Contents of the `--filename` files, in the order they were passed.
        pub(crate) fn applied_files(&self) -> Vec<String> {
            self.applied_files.borrow().clone()
        }
    }

    impl CommandExecutor for RecordingExecutor {
        fn execute(&self, invocation: &Invocation) -> Result<String> {
            self.calls.borrow_mut().push(invocation.clone());

            let mut args = invocation.args().iter();
            while let Some(arg) = args.next() {
                if arg == "--filename" {
                    if let Some(path) = args.next() {
                        let contents = fs::read_to_string(path).unwrap_or_default();
                        self.applied_files.borrow_mut().push(contents);
                    }
                }
            }

            let command_line = command_line(invocation);
            if self
                .failures
                .iter()
                .any(|prefix| command_line.starts_with(prefix.as_str()))
            {
                return CommandFailed {
                    command: invocation.command(),
                    args: invocation.args().to_vec(),
                    status: "exit status: 1",
                    std_err: "mocked failure",
                }
                .fail();
            }

            Ok(self.stdout.get(&command_line).cloned().unwrap_or_default())
        }
    }
}
