use anyhow::Result;
use log::debug;
use reqwest::{
    Client,
    header::{AUTHORIZATION, HeaderMap, HeaderValue},
};
use std::path::PathBuf;

use crate::github::{GitHub, GitHubRepo};
use crate::http::HttpClient;
use crate::runtime::Runtime;

pub const DEFAULT_REPO: &str = "klzgrad/naiveproxy";
pub const DEFAULT_MARKER: &str = "libcronet_static.a";

/// Where the artifact comes from and where it goes.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchSettings {
    pub repo: GitHubRepo,
    pub api_url: Option<String>,
    pub release_prefix: String,
    /// File whose presence in `destination` means there is nothing to fetch.
    pub marker: String,
    pub destination: PathBuf,
}

impl FetchSettings {
    pub fn marker_path(&self) -> PathBuf {
        self.destination.join(&self.marker)
    }
}

/// Network clients for one run.
pub struct Config<G> {
    pub github: G,
    pub http: HttpClient,
}

impl Config<GitHub> {
    pub fn new<R: Runtime>(runtime: &R, api_url: Option<String>) -> Result<Self> {
        let mut headers = HeaderMap::new();
        if let Ok(token) = runtime.env_var("GITHUB_TOKEN")
            && !token.is_empty()
        {
            let mut auth_value = HeaderValue::from_str(&format!("Bearer {}", token))?;
            auth_value.set_sensitive(true);
            headers.insert(AUTHORIZATION, auth_value);
            debug!("Using GITHUB_TOKEN for authentication");
        }

        let client = Client::builder()
            .user_agent(concat!("cronet-bootstrap/", env!("CARGO_PKG_VERSION")))
            .default_headers(headers)
            .build()?;

        let http = HttpClient::new(client);
        let github = GitHub::new(http.clone(), api_url);

        Ok(Self { github, http })
    }
}
