use crate::{
    common::{
        constants::{HELM_COMMAND, KUBECTL_COMMAND, KUBECONFIG_ENV, TILLER_NAMESPACE_ENV},
        error::Result,
    },
    config::{DeployTool, DeploymentConfig},
    deploy::{
        qualified_repository, registry_host,
        secret::{docker_config_json, docker_registry_secret_args},
    },
    exec::{CommandExecutor, Invocation},
    registry::split_full_image_name,
    vec_to_strings,
};
use tracing::info;

/// Runs `helm init --client-only` (helm v2 only), creates the docker config for the image
/// pull Secret if there are registry credentials, and then runs `helm upgrade --install`.
pub(crate) fn run_helm_deploy<E>(config: &DeploymentConfig, executor: &E) -> Result<()>
where
    E: CommandExecutor + ?Sized,
{
    if config.deploy_tool == DeployTool::Helm {
        executor.execute(&helm_invocation(
            config,
            vec_to_strings!["init", "--client-only"],
        ))?;
    }

    let registry_host = registry_host(config)?;

    let docker_config_json = match registry_host.as_deref() {
        Some(host) if config.has_registry_credentials() => {
            Some(dry_run_docker_config_json(config, host, executor)?)
        }
        _ => None,
    };

    let (repository, tag) = split_full_image_name(config.image.as_str())?;

    let values = HelmSetValues {
        repository: qualified_repository(registry_host.as_deref(), repository.as_str()),
        tag,
        docker_config_json,
        ingress_hosts: config.ingress_hosts.clone(),
    };

    info!(
        chart_path = %config.chart_path,
        deployment_name = %config.deployment_name,
        namespace = %config.namespace,
        image_repository = %values.repository,
        image_tag = %values.tag,
        ingress_hosts = ?config.ingress_hosts,
        wait_seconds = config.helm_deploy_wait_seconds,
        "Running helm upgrade"
    );

    executor.execute(&helm_invocation(config, upgrade_args(config, &values)))?;
    Ok(())
}

/// Runs the client-side dry-run Secret creation and returns the docker config it carries.
fn dry_run_docker_config_json<E>(
    config: &DeploymentConfig,
    registry_host: &str,
    executor: &E,
) -> Result<String>
where
    E: CommandExecutor + ?Sized,
{
    let mut args = vec![format!(
        "--insecure-skip-tls-verify={}",
        config.insecure_skip_tls_verify
    )];
    args.extend(docker_registry_secret_args(
        config.container_registry_secret.as_str(),
        registry_host,
        config.container_registry_user.as_str(),
        config.container_registry_password.as_str(),
    ));
    args.extend(vec_to_strings!["--dry-run=true", "--output=json"]);

    let output = executor.execute(&Invocation::new(KUBECTL_COMMAND, args))?;
    docker_config_json(output.as_str())
}

/// A helm Invocation, with the environment helm needs to find the cluster.
fn helm_invocation(config: &DeploymentConfig, args: Vec<String>) -> Invocation {
    let mut invocation = Invocation::new(HELM_COMMAND, args);
    if let Some(kube_config) = config.kube_config.as_ref() {
        invocation = invocation.with_env(KUBECONFIG_ENV, kube_config.to_string_lossy());
    }
    if config.deploy_tool == DeployTool::Helm && !config.tiller_namespace.is_empty() {
        invocation = invocation.with_env(TILLER_NAMESPACE_ENV, config.tiller_namespace.as_str());
    }
    invocation
}

/// The chart values which are set from the deployment config.
struct HelmSetValues {
    repository: String,
    tag: String,
    docker_config_json: Option<String>,
    ingress_hosts: Vec<String>,
}

impl HelmSetValues {
    /// The value of the `--set` option, e.g.
    /// "image.repository=r/app,image.tag=1.0,ingress.hosts[0]=app.example.com".
    /// Empty values are left out.
    fn to_set_arg(&self) -> String {
        let mut pairs: Vec<String> = Vec::new();

        if !self.repository.is_empty() {
            pairs.push(format!("image.repository={}", self.repository));
        }
        if !self.tag.is_empty() {
            pairs.push(format!("image.tag={}", self.tag));
        }
        if let Some(secret) = self
            .docker_config_json
            .as_deref()
            .filter(|secret| !secret.is_empty())
        {
            pairs.push(format!("secret.dockerconfigjson={secret}"));
        }
        pairs.extend(
            self.ingress_hosts
                .iter()
                .enumerate()
                .map(|(index, host)| format!("ingress.hosts[{index}]={host}")),
        );

        pairs.join(",")
    }
}

/// The `--timeout` value. Helm v2 takes seconds, helm v3 takes a duration such as "300s".
fn timeout_arg(config: &DeploymentConfig) -> String {
    match config.deploy_tool {
        DeployTool::Helm3 => format!("{}s", config.helm_deploy_wait_seconds),
        _ => config.helm_deploy_wait_seconds.to_string(),
    }
}

/// Arguments for `helm upgrade --install`. The additional parameters go last.
fn upgrade_args(config: &DeploymentConfig, values: &HelmSetValues) -> Vec<String> {
    let mut args: Vec<String> = vec_to_strings![
        "upgrade",
        config.deployment_name,
        config.chart_path,
        "--install",
        "--force",
        "--namespace",
        config.namespace,
        "--wait",
        "--timeout",
        timeout_arg(config)
    ];

    let set_arg = values.to_set_arg();
    if !set_arg.is_empty() {
        args.extend(vec_to_strings!["--set", set_arg]);
    }

    if !config.kube_context.is_empty() {
        args.extend(vec_to_strings!["--kube-context", config.kube_context]);
    }

    args.extend(config.additional_parameters.iter().cloned());
    args
}
