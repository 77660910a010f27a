use crate::{
    common::{
        constants::{IMAGE_PLACEHOLDER_REGEX, KUBECONFIG_ENV, KUBECTL_COMMAND},
        error::{MissingOption, Result},
        file::{read_to_string, write_to_tempfile},
        regex::Regex,
    },
    config::DeploymentConfig,
    deploy::{qualified_repository, registry_host, secret::docker_registry_secret_args},
    exec::{CommandExecutor, Invocation},
    registry::split_full_image_name,
    vec_to_strings,
};
use tracing::{debug, info};

/// Renders the app template with its image placeholder filled in, creates the docker-registry
/// Secret if there are registry credentials and it does not exist yet, then applies the
/// rendered manifest. Nothing runs against the cluster until the manifest is written.
pub(crate) fn run_kubectl_deploy<E>(config: &DeploymentConfig, executor: &E) -> Result<()>
where
    E: CommandExecutor + ?Sized,
{
    let registry_host = registry_host(config)?;

    // Rejects references which carry a protocol.
    split_full_image_name(config.image.as_str())?;
    let image = qualified_repository(registry_host.as_deref(), config.image.as_str());

    let template_path = config.app_template.as_ref().ok_or_else(|| {
        MissingOption {
            name: "app_template",
        }
        .build()
    })?;
    let rendered = render_app_template(read_to_string(template_path)?.as_str(), image.as_str())?;
    // Dropping this removes the file, so it has to live until `kubectl apply` is done.
    let rendered_file = write_to_tempfile(rendered.as_bytes())?;

    if let Some(host) = registry_host.as_deref() {
        if config.has_registry_credentials() {
            ensure_registry_secret(config, host, executor)?;
        }
    }

    info!(
        app_template = %template_path.display(),
        namespace = %config.namespace,
        %image,
        "Running kubectl apply"
    );

    let mut args = vec_to_strings!["apply", "--filename", rendered_file.path().to_string_lossy()];
    args.extend(config.additional_parameters.iter().cloned());

    executor.execute(&kubectl_invocation(config, args))?;
    Ok(())
}

/// A kubectl Invocation with the flags which go in front of every subcommand. The kubeconfig
/// is exported as KUBECONFIG, which may hold a list of files.
fn kubectl_invocation(config: &DeploymentConfig, subcommand_args: Vec<String>) -> Invocation {
    let mut args = vec![
        format!(
            "--insecure-skip-tls-verify={}",
            config.insecure_skip_tls_verify
        ),
        format!("--namespace={}", config.namespace),
    ];
    if !config.kube_context.is_empty() {
        args.push(format!("--context={}", config.kube_context));
    }
    args.extend(subcommand_args);

    let invocation = Invocation::new(KUBECTL_COMMAND, args);
    match config.kube_config.as_ref() {
        Some(kube_config) => invocation.with_env(KUBECONFIG_ENV, kube_config.to_string_lossy()),
        None => invocation,
    }
}

/// Creates the docker-registry Secret, unless `kubectl get secret` finds it.
fn ensure_registry_secret<E>(
    config: &DeploymentConfig,
    registry_host: &str,
    executor: &E,
) -> Result<()>
where
    E: CommandExecutor + ?Sized,
{
    let secret_name = config.container_registry_secret.as_str();

    let get_secret = kubectl_invocation(config, vec_to_strings!["get", "secret", secret_name]);
    if let Err(error) = executor.execute(&get_secret) {
        debug!(%error, secret = %secret_name, "Registry Secret not found");

        let create_args = docker_registry_secret_args(
            secret_name,
            registry_host,
            config.container_registry_user.as_str(),
            config.container_registry_password.as_str(),
        );
        executor.execute(&kubectl_invocation(config, create_args))?;
        info!(secret = %secret_name, "Created registry Secret");
    }

    Ok(())
}

/// Replaces every 'image: <image-name>' placeholder in the template with the image.
pub(crate) fn render_app_template(template: &str, image: &str) -> Result<String> {
    let regex = Regex::new(IMAGE_PLACEHOLDER_REGEX)?;
    Ok(regex
        .replace_all_literal(template, format!("image: {image}").as_str())
        .into_owned())
}

#[cfg(test)]
mod tests {
    use super::render_app_template;
    use crate::{
        config::{DeployTool, DeploymentConfig},
        deploy::run_kubernetes_deploy,
        exec::testing::RecordingExecutor,
    };
    use std::{io::Write, path::PathBuf};

    const APP_TEMPLATE: &str = "apiVersion: apps/v1
kind: Deployment
spec:
  template:
    spec:
      containers:
        - name: app
          image: <image-name>
        - name: sidecar
          image:<image-name>
";

    fn kubectl_config(app_template: &tempfile::NamedTempFile) -> DeploymentConfig {
        DeploymentConfig {
            container_registry_url: "https://my.registry:55555".to_string(),
            container_registry_user: "registryUser".to_string(),
            container_registry_password: "********".to_string(),
            deployment_name: "deploymentName".to_string(),
            deploy_tool: DeployTool::Kubectl,
            image: "path/to/Image:latest".to_string(),
            additional_parameters: vec!["--prune".to_string()],
            kube_context: "testCluster".to_string(),
            namespace: "deploymentNamespace".to_string(),
            app_template: Some(app_template.path().to_path_buf()),
            ..Default::default()
        }
    }

    fn app_template_file() -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(APP_TEMPLATE.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_render_app_template() {
        let rendered =
            render_app_template(APP_TEMPLATE, "my.registry:55555/path/to/Image:latest").unwrap();
        assert_eq!(
            rendered
                .lines()
                .filter(|line| line.trim() == "image: my.registry:55555/path/to/Image:latest")
                .count(),
            2
        );
        assert!(!rendered.contains("<image-name>"));
    }

    #[test]
    fn test_render_app_template_literal_image() {
        let rendered = render_app_template("image: <image-name>", "repo/$1:tag").unwrap();
        assert_eq!(rendered, "image: repo/$1:tag");
    }

    #[test]
    fn test_kubectl_deploy_creates_missing_secret() {
        let template = app_template_file();
        let executor = RecordingExecutor::default().with_failure(
            "kubectl --insecure-skip-tls-verify=true --namespace=deploymentNamespace \
             --context=testCluster get secret regsecret",
        );

        run_kubernetes_deploy(&kubectl_config(&template), &executor).unwrap();

        let calls = executor.calls();
        assert_eq!(calls.len(), 3);
        assert!(calls.iter().all(|call| call.command() == "kubectl"));
        assert_eq!(
            calls[1].args(),
            [
                "--insecure-skip-tls-verify=true",
                "--namespace=deploymentNamespace",
                "--context=testCluster",
                "create",
                "secret",
                "docker-registry",
                "regsecret",
                "--docker-server=my.registry:55555",
                "--docker-username=registryUser",
                "--docker-password=********"
            ]
        );

        let apply_args = calls[2].args();
        assert_eq!(apply_args[3], "apply");
        assert_eq!(apply_args[4], "--filename");
        assert_ne!(apply_args[5], template.path().to_string_lossy());
        assert_eq!(apply_args[6], "--prune");

        let applied = executor.applied_files();
        assert_eq!(applied.len(), 1);
        assert_eq!(
            applied[0]
                .lines()
                .filter(|line| line.trim() == "image: my.registry:55555/path/to/Image:latest")
                .count(),
            2,
            "{}",
            applied[0]
        );
        // The user's template is left as it was.
        assert_eq!(
            std::fs::read_to_string(template.path()).unwrap(),
            APP_TEMPLATE
        );
    }

    #[test]
    fn test_kubectl_deploy_existing_secret() {
        let template = app_template_file();
        let executor = RecordingExecutor::default();

        run_kubernetes_deploy(&kubectl_config(&template), &executor).unwrap();

        let calls = executor.calls();
        assert_eq!(calls.len(), 2);
        assert_eq!(&calls[0].args()[3..], ["get", "secret", "regsecret"]);
        assert_eq!(calls[1].args()[3], "apply");
    }

    #[test]
    fn test_kubectl_deploy_apply_failure() {
        let template = app_template_file();
        let executor = RecordingExecutor::default().with_failure(
            "kubectl --insecure-skip-tls-verify=true --namespace=deploymentNamespace \
             --context=testCluster apply",
        );

        let error = run_kubernetes_deploy(&kubectl_config(&template), &executor).unwrap_err();
        assert!(error
            .to_string()
            .starts_with("`kubectl` command returned an error"));
    }

    #[test]
    fn test_kubectl_deploy_without_credentials() {
        let template = app_template_file();
        let config = DeploymentConfig {
            container_registry_url: String::new(),
            container_registry_user: String::new(),
            container_registry_password: String::new(),
            ..kubectl_config(&template)
        };
        let executor = RecordingExecutor::default();

        run_kubernetes_deploy(&config, &executor).unwrap();

        let calls = executor.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].args()[3], "apply");
        assert!(executor.applied_files()[0].contains("image: path/to/Image:latest"));
    }

    #[test]
    fn test_kubectl_deploy_kubeconfig_list() {
        let template = app_template_file();
        let config = DeploymentConfig {
            kube_config: Some(PathBuf::from("/a/config:/b/config")),
            ..kubectl_config(&template)
        };
        let executor = RecordingExecutor::default();

        run_kubernetes_deploy(&config, &executor).unwrap();

        let calls = executor.calls();
        assert_eq!(calls.len(), 2);
        for call in calls {
            assert_eq!(
                call.envs(),
                [("KUBECONFIG".to_string(), "/a/config:/b/config".to_string())]
            );
            assert!(!call.args().iter().any(|arg| arg.starts_with("--kubeconfig")));
        }
    }

    #[test]
    fn test_kubectl_deploy_missing_template() {
        let template = app_template_file();
        let config = DeploymentConfig {
            app_template: None,
            ..kubectl_config(&template)
        };
        let executor = RecordingExecutor::default();

        let error = run_kubernetes_deploy(&config, &executor).unwrap_err();
        assert_eq!(
            error.to_string(),
            "Mandatory option 'app_template' is not set"
        );
        // The registry Secret is not touched.
        assert!(executor.calls().is_empty());
    }

    #[test]
    fn test_kubectl_deploy_unreadable_template() {
        let template = app_template_file();
        let config = DeploymentConfig {
            app_template: Some(PathBuf::from("/nonexistent/app-template.yaml")),
            ..kubectl_config(&template)
        };
        let executor = RecordingExecutor::default();

        let error = run_kubernetes_deploy(&config, &executor).unwrap_err();
        assert!(error.to_string().starts_with("Failed to read file"), "{error}");
        assert!(executor.calls().is_empty());
    }
}
