use deploy::{
    common::{
        constants::HELM_COMMAND,
        error::{
            HelmVersion, MissingOption, NotADirectory, NotAFile, RegexCompile, Result, ValidatePath,
        },
    },
    CommandExecutor, DeployTool, DeploymentConfig, Invocation,
};
use regex::Regex;
use snafu::{ensure, ResultExt};
use std::{fs, path::Path};
use tracing::debug;

/// Validate that the options which every deployment needs are set, and that the options of the
/// chosen deploy tool point at something usable.
pub(crate) fn validate_deployment_config(config: &DeploymentConfig) -> Result<()> {
    ensure_set("namespace", config.namespace.as_str())?;
    ensure_set("image", config.image.as_str())?;

    match config.deploy_tool {
        DeployTool::Helm | DeployTool::Helm3 => {
            ensure_set("deployment_name", config.deployment_name.as_str())?;
            ensure_set("chart_path", config.chart_path.as_str())?;
            validate_helm_chart_dir(Path::new(config.chart_path.as_str()))
        }
        DeployTool::Kubectl => {
            let app_template = config.app_template.as_ref().ok_or_else(|| {
                MissingOption {
                    name: "app_template",
                }
                .build()
            })?;
            ensure!(
                path_exists_and_is_file(app_template)?,
                NotAFile {
                    path: app_template.clone()
                }
            );
            Ok(())
        }
    }
}

/// Validate that the helm binary in the shell's $PATH has the major version the deploy tool
/// expects: v2 for 'helm' and v3 for 'helm3'.
pub(crate) fn validate_helm_version<E>(deploy_tool: DeployTool, executor: &E) -> Result<()>
where
    E: CommandExecutor + ?Sized,
{
    let (args, regex) = match deploy_tool {
        // Helm v2 needs Tiller to report the server version, so only ask for the client's.
        // E.g. "Client: v2.16.1+gbbdfe5e".
        DeployTool::Helm => (vec!["version", "--client", "--short"], r"v2\.[0-9]+\.[0-9]+"),
        DeployTool::Helm3 => (vec!["version", "--short"], r"^v3\.[0-9]+\.[0-9]+"),
        DeployTool::Kubectl => return Ok(()),
    };

    let version = executor.execute(&Invocation::new(HELM_COMMAND, args))?;
    debug!(version = %version.trim(), "Helm version");

    ensure!(
        Regex::new(regex)
            .context(RegexCompile {
                expression: regex.to_string(),
            })?
            .is_match(version.trim()),
        HelmVersion {
            version: version.trim(),
            expected: regex,
        }
    );

    Ok(())
}

/// Validate the input helm chart directory path:
/// - validate if the path exists and is a directory.
/// - validate if the Chart.yaml file is present.
fn validate_helm_chart_dir(dir_path: &Path) -> Result<()> {
    ensure!(
        path_exists_and_is_dir(dir_path)?,
        NotADirectory { path: dir_path }
    );

    let chart_yaml_path = dir_path.join("Chart.yaml");
    ensure!(
        path_exists_and_is_file(chart_yaml_path.as_path())?,
        NotAFile {
            path: chart_yaml_path
        }
    );

    Ok(())
}

fn ensure_set(name: &str, value: &str) -> Result<()> {
    ensure!(!value.is_empty(), MissingOption { name });
    Ok(())
}

fn path_exists_and_is_dir(path: &Path) -> Result<bool> {
    fs::metadata(path)
        .map(|m| m.is_dir())
        .context(ValidatePath { path })
}

fn path_exists_and_is_file(path: &Path) -> Result<bool> {
    fs::metadata(path)
        .map(|m| m.is_file())
        .context(ValidatePath { path })
}
