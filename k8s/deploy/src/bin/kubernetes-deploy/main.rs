use crate::opts::{
    validators::{validate_deployment_config, validate_helm_version},
    CliArgs,
};
use clap::Parser;
use deploy::{
    common::error::Result, logging::init_logging, run_kubernetes_deploy, DeploymentConfig,
    SystemExecutor,
};
use tracing::{error, info};

mod opts;

fn main() -> Result<()> {
    let opts = CliArgs::parse();
    init_logging(opts.fmt_style(), opts.ansi_colours());

    let config = parse_cli_args(&opts).map_err(|error| {
        error!(%error, "Failed to deploy");
        error
    })?;

    run_kubernetes_deploy(&config, &SystemExecutor).map_err(|error| {
        error!(%error, deployment_name = %config.deployment_name, "Failed to deploy");
        error
    })
}

/// This function handles the following tasks -- 1. Building the deployment config from the
/// arguments and the config file, 2. Validating the config and the tools it needs.
fn parse_cli_args(opts: &CliArgs) -> Result<DeploymentConfig> {
    let config = opts.deployment_config()?;

    validate_deployment_config(&config)?;
    validate_helm_version(config.deploy_tool, &SystemExecutor)?;

    info!(deploy_tool = %config.deploy_tool, "Validated all inputs");

    Ok(config)
}
