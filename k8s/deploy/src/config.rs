use crate::common::{
    constants::{DEFAULT_HELM_WAIT_SECONDS, DEFAULT_NAMESPACE, DEFAULT_REGISTRY_SECRET_NAME},
    error::{ConfigFileParse, ReadingFile, Result},
};
use clap::ValueEnum;
use serde::Deserialize;
use snafu::ResultExt;
use std::{fmt, fs, path::Path, path::PathBuf};

/// This is the client which carries out the deployment.
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, ValueEnum)]
#[serde(rename_all = "lowercase")]
#[value(rename_all = "lowercase")]
pub enum DeployTool {
    /// Helm v2. Runs `helm init --client-only` before the upgrade.
    #[default]
    Helm,
    /// Helm v3, which has no Tiller.
    Helm3,
    /// Plain `kubectl apply` of an app template.
    Kubectl,
}

impl fmt::Display for DeployTool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DeployTool::Helm => "helm",
            DeployTool::Helm3 => "helm3",
            DeployTool::Kubectl => "kubectl",
        };
        f.write_str(name)
    }
}

/// Everything a single deployment run needs. It is read-only for the duration of the run.
/// Key names in YAML config files are camelCase, e.g. `containerRegistryUrl`.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct DeploymentConfig {
    /// Registry URL of the form '<protocol>://<host>'.
    pub container_registry_url: String,
    pub container_registry_user: String,
    pub container_registry_password: String,
    /// Name of the docker-registry Secret.
    pub container_registry_secret: String,
    /// Helm chart directory. Only used by helm deployments.
    pub chart_path: String,
    /// Helm release name.
    pub deployment_name: String,
    pub deploy_tool: DeployTool,
    /// Value of `helm upgrade --wait --timeout`.
    pub helm_deploy_wait_seconds: u32,
    pub ingress_hosts: Vec<String>,
    /// Image reference of the form '<repository>[:<tag>]', without the registry.
    pub image: String,
    /// Passed through to the final `helm upgrade` or `kubectl apply` command as-is.
    pub additional_parameters: Vec<String>,
    pub kube_context: String,
    pub kube_config: Option<PathBuf>,
    pub namespace: String,
    pub tiller_namespace: String,
    pub insecure_skip_tls_verify: bool,
    /// Manifest with an 'image: <image-name>' placeholder. Only used by kubectl deployments.
    pub app_template: Option<PathBuf>,
}

impl Default for DeploymentConfig {
    fn default() -> Self {
        Self {
            container_registry_url: String::new(),
            container_registry_user: String::new(),
            container_registry_password: String::new(),
            container_registry_secret: DEFAULT_REGISTRY_SECRET_NAME.to_string(),
            chart_path: String::new(),
            deployment_name: String::new(),
            deploy_tool: DeployTool::default(),
            helm_deploy_wait_seconds: DEFAULT_HELM_WAIT_SECONDS,
            ingress_hosts: Vec::new(),
            image: String::new(),
            additional_parameters: Vec::new(),
            kube_context: String::new(),
            kube_config: None,
            namespace: DEFAULT_NAMESPACE.to_string(),
            tiller_namespace: String::new(),
            insecure_skip_tls_verify: true,
            app_template: None,
        }
    }
}

impl DeploymentConfig {
    /// Reads a DeploymentConfig from a YAML file. Keys absent from the file take their default
    /// values.
    pub fn from_yaml_file<P>(filepath: P) -> Result<Self>
    where
        P: AsRef<Path>,
    {
        let filepath = filepath.as_ref();
        let contents = fs::read(filepath).context(ReadingFile {
            filepath: filepath.to_path_buf(),
        })?;

        serde_yaml::from_slice(contents.as_slice()).context(ConfigFileParse {
            filepath: filepath.to_path_buf(),
        })
    }

    /// Credentials are present only if both the user and the password are set.
    pub fn has_registry_credentials(&self) -> bool {
        !self.container_registry_user.is_empty() && !self.container_registry_password.is_empty()
    }
}
