use clap::{ArgAction, Parser};
use deploy::{common::error::Result, logging::FmtStyle, DeployTool, DeploymentConfig};
use std::path::PathBuf;

/// Validate input whose validation depends on other inputs.
pub(crate) mod validators;

/// These are the supported cli configuration options for a deployment. Options which are not
/// set fall back to the config file, if there is one, and then to the defaults.
#[derive(Parser)]
#[command(name = "kubernetes-deploy", version)]
#[command(about = "Deploys a container image to Kubernetes using helm or kubectl", long_about = None)]
pub(crate) struct CliArgs {
    /// YAML file with default values for the options below, using camelCase keys,
    /// e.g. 'containerRegistryUrl'.
    #[arg(long, env = "DEPLOY_CONFIG_FILE", value_name = "FILE_PATH")]
    config_file: Option<PathBuf>,

    /// This is the container registry URL, e.g. 'https://my.registry:55555'.
    #[arg(long, env = "CONTAINER_REGISTRY_URL")]
    container_registry_url: Option<String>,

    /// This is the container registry user.
    #[arg(long, env = "CONTAINER_REGISTRY_USER")]
    container_registry_user: Option<String>,

    /// This is the container registry password.
    #[arg(long, env = "CONTAINER_REGISTRY_PASSWORD", hide_env_values = true)]
    container_registry_password: Option<String>,

    /// This is the name of the docker-registry Secret which holds the registry credentials.
    #[arg(long, env = "CONTAINER_REGISTRY_SECRET")]
    container_registry_secret: Option<String>,

    /// This is the Helm chart directory path.
    #[arg(long, value_name = "DIR_PATH")]
    chart_path: Option<String>,

    /// This is the name of the Helm release.
    #[arg(long)]
    deployment_name: Option<String>,

    /// This is the tool which carries out the deployment.
    #[arg(long, value_enum)]
    deploy_tool: Option<DeployTool>,

    /// This is how long `helm upgrade` waits for the release to become ready.
    #[arg(long, value_name = "SECONDS")]
    helm_deploy_wait_seconds: Option<u32>,

    /// These are the ingress hosts (can specify multiple or separate values with commas).
    #[arg(long = "ingress-host", value_delimiter = ',')]
    ingress_hosts: Vec<String>,

    /// This is the image reference without the registry, e.g. 'path/to/image:tag'.
    #[arg(long)]
    image: Option<String>,

    /// These are passed as they are to `helm upgrade` or `kubectl apply` (can specify multiple).
    #[arg(long = "additional-parameter", allow_hyphen_values = true)]
    additional_parameters: Vec<String>,

    /// This is the kubeconfig context to deploy to.
    #[arg(long)]
    kube_context: Option<String>,

    /// This is the kubeconfig file, or a colon-separated list of them. It is handed to helm and
    /// kubectl as KUBECONFIG.
    #[arg(long, env = "DEPLOY_KUBECONFIG", value_name = "FILE_PATH")]
    kube_config: Option<PathBuf>,

    /// This is the Kubernetes Namespace to deploy to.
    #[arg(short, long)]
    namespace: Option<String>,

    /// This is the Namespace of Tiller, for Helm v2.
    #[arg(long, env = "TILLER_NAMESPACE")]
    tiller_namespace: Option<String>,

    /// Skip verification of the API server's TLS certificate.
    #[arg(long, action = ArgAction::Set)]
    insecure_skip_tls_verify: Option<bool>,

    /// This is the manifest with an 'image: <image-name>' placeholder, for kubectl deployments.
    #[arg(long, value_name = "FILE_PATH")]
    app_template: Option<PathBuf>,

    /// Formatting style to be used while logging.
    #[arg(long, value_enum, default_value_t = FmtStyle::Pretty)]
    fmt_style: FmtStyle,

    /// Use ANSI colors for the logs.
    #[arg(long, action = ArgAction::Set, default_value_t = true)]
    ansi_colors: bool,
}

impl CliArgs {
    /// This returns formatting style to be used.
    pub(crate) fn fmt_style(&self) -> FmtStyle {
        self.fmt_style
    }

    /// This returns ansi_colours arg.
    pub(crate) fn ansi_colours(&self) -> bool {
        self.ansi_colors
    }

    /// This builds the DeploymentConfig from the config file, if any, and overrides its values
    /// with the ones set in the command line or the environment. Lists set on the command line
    /// replace the config file's lists.
    pub(crate) fn deployment_config(&self) -> Result<DeploymentConfig> {
        let mut config = match self.config_file.as_ref() {
            Some(path) => DeploymentConfig::from_yaml_file(path)?,
            None => DeploymentConfig::default(),
        };

        override_with(
            &mut config.container_registry_url,
            &self.container_registry_url,
        );
        override_with(
            &mut config.container_registry_user,
            &self.container_registry_user,
        );
        override_with(
            &mut config.container_registry_password,
            &self.container_registry_password,
        );
        override_with(
            &mut config.container_registry_secret,
            &self.container_registry_secret,
        );
        override_with(&mut config.chart_path, &self.chart_path);
        override_with(&mut config.deployment_name, &self.deployment_name);
        override_with(&mut config.deploy_tool, &self.deploy_tool);
        override_with(
            &mut config.helm_deploy_wait_seconds,
            &self.helm_deploy_wait_seconds,
        );
        override_with(&mut config.image, &self.image);
        override_with(&mut config.kube_context, &self.kube_context);
        override_with(&mut config.namespace, &self.namespace);
        override_with(&mut config.tiller_namespace, &self.tiller_namespace);
        override_with(
            &mut config.insecure_skip_tls_verify,
            &self.insecure_skip_tls_verify,
        );

        if self.kube_config.is_some() {
            config.kube_config = self.kube_config.clone();
        }
        if self.app_template.is_some() {
            config.app_template = self.app_template.clone();
        }
        if !self.ingress_hosts.is_empty() {
            config.ingress_hosts = self.ingress_hosts.clone();
        }
        if !self.additional_parameters.is_empty() {
            config.additional_parameters = self.additional_parameters.clone();
        }

        Ok(config)
    }
}

/// Replaces the value if an override is set.
fn override_with<T>(value: &mut T, maybe_override: &Option<T>)
where
    T: Clone,
{
    if let Some(override_value) = maybe_override {
        *value = override_value.clone();
    }
}

#[cfg(test)]
mod tests {
    use super::CliArgs;
    use clap::Parser;
    use deploy::DeployTool;
    use std::io::Write;

    #[test]
    fn test_cli_overrides_config_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(
            b"deploymentName: fromFile\nnamespace: fileNamespace\ningressHosts: [a.b]\n",
        )
        .unwrap();

        let opts = CliArgs::try_parse_from([
            "kubernetes-deploy",
            "--config-file",
            file.path().to_str().unwrap(),
            "--namespace",
            "cliNamespace",
            "--deploy-tool",
            "helm3",
            "--ingress-host",
            "ingress.host1,ingress.host2",
            "--additional-parameter",
            "--testParam",
            "--additional-parameter",
            "testValue",
            "--insecure-skip-tls-verify",
            "false",
        ])
        .unwrap();
        let config = opts.deployment_config().unwrap();

        assert_eq!(config.deployment_name, "fromFile");
        assert_eq!(config.namespace, "cliNamespace");
        assert_eq!(config.deploy_tool, DeployTool::Helm3);
        assert_eq!(config.ingress_hosts, ["ingress.host1", "ingress.host2"]);
        assert_eq!(config.additional_parameters, ["--testParam", "testValue"]);
        assert!(!config.insecure_skip_tls_verify);
    }
}
