//! Release and asset selection over the feed.
//!
//! Both selections are linear scans that keep the first match in feed order.
//! The feed's ordering is whatever the server returns; nothing here sorts.

use anyhow::Result;
use log::debug;

use crate::error::BootstrapError;
use crate::github::{Release, ReleaseAsset};
use crate::platform::PlatformTag;

/// Default prefix of the releases carrying prebuilt Cronet libraries.
pub const DEFAULT_RELEASE_PREFIX: &str = "cronet-";

/// Picks the first release whose name (or tag, when unnamed) starts with `prefix`.
pub fn find_release<'a>(releases: &'a [Release], prefix: &str) -> Result<&'a Release> {
    let release = releases
        .iter()
        .find(|release| release.display_name().starts_with(prefix))
        .ok_or_else(|| {
            BootstrapError::not_found(
                "release",
                format!(
                    "none of {} releases is named with prefix {:?}",
                    releases.len(),
                    prefix
                ),
            )
        })?;

    debug!("Selected release {}", release.display_name());
    Ok(release)
}

/// Picks the first asset of `release` whose name contains the platform tag.
pub fn find_asset<'a>(release: &'a Release, tag: &PlatformTag) -> Result<&'a ReleaseAsset> {
    let asset = release
        .assets
        .iter()
        .find(|asset| asset.name.contains(tag.as_str()))
        .ok_or_else(|| {
            BootstrapError::not_found(
                "asset",
                format!(
                    "{} release not found in {} ({})",
                    tag,
                    release.display_name(),
                    release.assets_url
                ),
            )
        })?;

    debug!("Selected asset {} ({} bytes)", asset.name, asset.size);
    Ok(asset)
}
