/// Constants, errors and other tools shared by the modules below.
pub mod common;
/// The deployment configuration.
pub mod config;
/// The helm and kubectl deployments.
pub mod deploy;
/// Running external commands.
pub mod exec;
/// Log initialisation.
pub mod logging;
/// Splitting registry URLs and image references.
pub mod registry;

pub use config::{DeployTool, DeploymentConfig};
pub use deploy::run_kubernetes_deploy;
pub use exec::{CommandExecutor, Invocation, SystemExecutor};
