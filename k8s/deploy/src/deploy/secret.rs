use crate::{
    common::{
        constants::DOCKER_CONFIG_JSON_KEY,
        error::{DryRunSecretKey, DryRunSecretParse, Result},
    },
    vec_to_strings,
};
use serde::Deserialize;
use snafu::ResultExt;
use std::collections::HashMap;

/// This struct is used to deserialize the output of
/// `kubectl create secret docker-registry ... --dry-run=true --output=json`.
#[derive(Deserialize)]
struct DryRunSecret {
    #[serde(default)]
    data: HashMap<String, String>,
}

/// The arguments which create a docker-registry Secret with the given name, for the given
/// registry host and credentials.
pub(crate) fn docker_registry_secret_args(
    secret_name: &str,
    registry_host: &str,
    user: &str,
    password: &str,
) -> Vec<String> {
    vec_to_strings![
        "create",
        "secret",
        "docker-registry",
        secret_name,
        format!("--docker-server={registry_host}"),
        format!("--docker-username={user}"),
        format!("--docker-password={password}"),
    ]
}

/// Picks the base64 encoded docker config out of a dry-run Secret. The value is returned as
/// it is, without decoding.
pub(crate) fn docker_config_json(dry_run_output: &str) -> Result<String> {
    let secret: DryRunSecret = serde_json::from_str(dry_run_output).context(DryRunSecretParse)?;

    secret
        .data
        .get(DOCKER_CONFIG_JSON_KEY)
        .cloned()
        .ok_or_else(|| {
            DryRunSecretKey {
                key: DOCKER_CONFIG_JSON_KEY,
            }
            .build()
        })
}
