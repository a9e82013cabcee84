use anyhow::{Context, Result};
use async_trait::async_trait;
use log::debug;

use super::repo::GitHubRepo;
use super::types::Release;
use crate::http::HttpClient;

pub const DEFAULT_API_URL: &str = "https://api.github.com";

/// Source of the release feed.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait GetReleases: Send + Sync {
    /// Lists the releases of `repo` in feed order, in a single request.
    async fn get_releases(&self, repo: &GitHubRepo) -> Result<Vec<Release>>;
    fn api_url(&self) -> &str;
}

pub struct GitHub {
    pub http: HttpClient,
    pub api_url: String,
}

impl GitHub {
    #[tracing::instrument(skip(http, api_url))]
    pub fn new(http: HttpClient, api_url: Option<String>) -> Self {
        let api_url = api_url
            .map(|url| url.trim_end_matches('/').to_string())
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());
        Self { http, api_url }
    }
}

#[async_trait]
impl GetReleases for GitHub {
    #[tracing::instrument(skip(self, repo))]
    async fn get_releases(&self, repo: &GitHubRepo) -> Result<Vec<Release>> {
        let url = format!("{}/repos/{}/{}/releases", self.api_url, repo.owner, repo.repo);

        debug!("Fetching releases from {}...", url);

        let releases: Vec<Release> = self
            .http
            .get_json(&url)
            .await
            .with_context(|| format!("Failed to list releases of {}", repo))?;

        debug!("Feed returned {} releases", releases.len());
        Ok(releases)
    }

    #[tracing::instrument(skip(self))]
    fn api_url(&self) -> &str {
        &self.api_url
    }
}
