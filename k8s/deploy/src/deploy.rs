use crate::{
    common::error::Result,
    config::{DeployTool, DeploymentConfig},
    exec::CommandExecutor,
    registry::split_registry_url,
};
use tracing::info;

/// Contains the `helm upgrade --install` deployment.
pub(crate) mod helm;

/// Contains the `kubectl apply` deployment.
pub(crate) mod kubectl;

/// Contains tools to create and read docker-registry Secrets.
pub(crate) mod secret;

/// Deploys according to the config, running every command through the executor. The first
/// failing command ends the run; nothing is retried or rolled back.
pub fn run_kubernetes_deploy<E>(config: &DeploymentConfig, executor: &E) -> Result<()>
where
    E: CommandExecutor + ?Sized,
{
    info!(
        deploy_tool = %config.deploy_tool,
        deployment_name = %config.deployment_name,
        namespace = %config.namespace,
        image = %config.image,
        "Starting deployment"
    );

    match config.deploy_tool {
        DeployTool::Helm | DeployTool::Helm3 => helm::run_helm_deploy(config, executor)?,
        DeployTool::Kubectl => kubectl::run_kubectl_deploy(config, executor)?,
    }

    info!(
        deployment_name = %config.deployment_name,
        namespace = %config.namespace,
        "Deployment finished"
    );
    Ok(())
}

/// Returns the registry host if a registry is configured. Registry credentials need one, so
/// an empty registry URL alongside credentials is an error.
pub(crate) fn registry_host(config: &DeploymentConfig) -> Result<Option<String>> {
    if !config.has_registry_credentials() && config.container_registry_url.is_empty() {
        return Ok(None);
    }

    let (_protocol, host) = split_registry_url(config.container_registry_url.as_str())?;
    Ok(Some(host))
}

/// Prefixes the repository with the registry host, if there is one.
pub(crate) fn qualified_repository(registry_host: Option<&str>, repository: &str) -> String {
    match registry_host {
        Some(host) => format!("{host}/{repository}"),
        None => repository.to_string(),
    }
}
