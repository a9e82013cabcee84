//! The fetch pipeline: presence check, release lookup, download, extraction.

use anyhow::Result;
use log::{info, warn};
use std::path::PathBuf;

use crate::archive::{self, ArchiveKind};
use crate::config::FetchSettings;
use crate::download::fetch_asset;
use crate::github::GetReleases;
use crate::http::HttpClient;
use crate::platform::PlatformTag;
use crate::release::{find_asset, find_release};
use crate::runtime::Runtime;

#[derive(Debug, PartialEq)]
pub enum Outcome {
    /// The marker file was already there; nothing was fetched.
    AlreadyPresent,
    Fetched {
        release: String,
        asset: String,
        files: Vec<PathBuf>,
    },
}

/// Makes sure the prebuilt library for the target platform is in
/// `settings.destination`, downloading it when the marker file is missing.
#[tracing::instrument(skip_all, fields(repo = %settings.repo))]
pub async fn ensure_artifacts<R: Runtime, G: GetReleases>(
    runtime: &R,
    github: &G,
    http: &HttpClient,
    settings: &FetchSettings,
) -> Result<Outcome> {
    let marker = settings.marker_path();
    if runtime.exists(&marker) {
        info!("{} already present, skipping download.", settings.marker);
        return Ok(Outcome::AlreadyPresent);
    }

    let tag = PlatformTag::resolve(runtime);
    info!("Looking up {} release for {}...", settings.release_prefix, tag);

    let releases = github.get_releases(&settings.repo).await?;
    let release = find_release(&releases, &settings.release_prefix)?;
    let asset = find_asset(release, &tag)?;
    info!("Using {} from {}", asset.name, release.display_name());

    let payload = fetch_asset(http, asset).await?;
    let kind = ArchiveKind::from_asset_name(&asset.name);
    let files = archive::extract(runtime, &payload, kind, &settings.destination)?;

    if !runtime.exists(&marker) {
        warn!(
            "{} was not among the extracted files; the next run will download again.",
            settings.marker
        );
    }

    Ok(Outcome::Fetched {
        release: release.display_name().to_string(),
        asset: asset.name.clone(),
        files,
    })
}
