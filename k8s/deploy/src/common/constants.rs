/// This is the name of the helm binary, looked up in $PATH.
pub const HELM_COMMAND: &str = "helm";

/// This is the name of the kubectl binary, looked up in $PATH.
pub const KUBECTL_COMMAND: &str = "kubectl";

/// This is the default name of the docker-registry Secret.
pub const DEFAULT_REGISTRY_SECRET_NAME: &str = "regsecret";

/// This is the key in the docker-registry Secret's .data which holds the docker config.
pub const DOCKER_CONFIG_JSON_KEY: &str = ".dockerconfigjson";

/// This is the default `--timeout` handed to `helm upgrade --wait`, in seconds.
pub const DEFAULT_HELM_WAIT_SECONDS: u32 = 300;

/// This is the default Kubernetes Namespace.
pub const DEFAULT_NAMESPACE: &str = "default";

/// This is the placeholder in an app template which is replaced by the full image name.
/// E.g. "image: <image-name>".
pub(crate) const IMAGE_PLACEHOLDER_REGEX: &str = r"image:[ ]*<image-name>";

/// Environment variable which points helm to a kubeconfig file.
pub(crate) const KUBECONFIG_ENV: &str = "KUBECONFIG";

/// Environment variable which tells helm v2 where Tiller lives.
pub(crate) const TILLER_NAMESPACE_ENV: &str = "TILLER_NAMESPACE";

/// Value shown in logs in place of credentials.
pub(crate) const REDACTED: &str = "********";
