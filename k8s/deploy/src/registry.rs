use crate::common::error::{Result, SplitImageName, SplitRegistryUrl};
use snafu::ensure;

/// Separates the protocol from the host in a registry URL.
const PROTOCOL_SEPARATOR: &str = "://";

/// Splits a container registry URL of the form '<protocol>://<host>' into its protocol and
/// host, e.g. "https://my.registry:55555" yields ("https", "my.registry:55555").
/// The URL must contain exactly one "://", with something on either side of it.
pub fn split_registry_url(url: &str) -> Result<(String, String)> {
    let parts: Vec<&str> = url.split(PROTOCOL_SEPARATOR).collect();
    ensure!(
        parts.len() == 2 && parts.iter().all(|part| !part.is_empty()),
        SplitRegistryUrl { url }
    );

    Ok((parts[0].to_string(), parts[1].to_string()))
}

/// Splits an image reference of the form '<repository>[:<tag>]' into repository and tag. The
/// tag is empty if the reference does not carry one.
///
/// Only a colon after the last '/' separates a tag, so "my.registry:5000/app" is a repository
/// without a tag. References with a protocol are rejected; strip it with [`split_registry_url`]
/// first. Digest references such as "app@sha256:..." are rejected, as they carry no tag.
pub fn split_full_image_name(image: &str) -> Result<(String, String)> {
    ensure!(
        !image.is_empty() && !image.contains(PROTOCOL_SEPARATOR) && !image.contains('@'),
        SplitImageName { image }
    );

    let last_segment_start = image.rfind('/').map_or(0, |idx| idx + 1);
    match image[last_segment_start..].rfind(':') {
        Some(idx) => {
            let tag_separator = last_segment_start + idx;
            Ok((
                image[..tag_separator].to_string(),
                image[tag_separator + 1..].to_string(),
            ))
        }
        None => Ok((image.to_string(), String::new())),
    }
}
