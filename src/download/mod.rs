use crate::github::ReleaseAsset;
use crate::http::HttpClient;
use anyhow::{Context, Result};
use log::{info, warn};

/// Downloads a release asset into memory.
///
/// The zip path needs random access to the central directory, so the body is
/// buffered in full for both archive kinds.
#[tracing::instrument(skip(http_client, asset), fields(asset = %asset.name))]
pub async fn fetch_asset(http_client: &HttpClient, asset: &ReleaseAsset) -> Result<Vec<u8>> {
    info!("Downloading {} from {}...", asset.name, asset.browser_download_url);

    let payload = http_client
        .get_bytes(&asset.browser_download_url)
        .await
        .with_context(|| format!("Failed to download {}", asset.name))?;

    if asset.size != 0 && payload.len() as u64 != asset.size {
        warn!(
            "{} is {} bytes, feed announced {}",
            asset.name,
            payload.len(),
            asset.size
        );
    }

    info!("Download complete.");
    Ok(payload)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BootstrapError;
    use reqwest::Client;

    fn asset_at(url: String, size: u64) -> ReleaseAsset {
        ReleaseAsset {
            name: "cronet-linux-x64.tar.xz".to_string(),
            size,
            browser_download_url: url,
        }
    }

    #[tokio::test]
    async fn test_fetch_asset() {
        // --- Setup Mock Server ---
        let mut server = mockito::Server::new_async().await;
        let url = server.url();

        let mock = server
            .mock("GET", "/cronet.tar.xz")
            .with_status(200)
            .with_body("test content")
            .create_async()
            .await;

        // --- Execute ---
        let http_client = HttpClient::new(Client::new());
        let asset = asset_at(format!("{}/cronet.tar.xz", url), 12);
        let payload = fetch_asset(&http_client, &asset).await.unwrap();

        // --- Verify ---
        mock.assert_async().await;
        assert_eq!(payload, b"test content");
    }

    #[tokio::test]
    async fn test_fetch_asset_size_mismatch_is_not_fatal() {
        let mut server = mockito::Server::new_async().await;
        let url = server.url();

        let mock = server
            .mock("GET", "/cronet.tar.xz")
            .with_status(200)
            .with_body("short")
            .create_async()
            .await;

        let http_client = HttpClient::new(Client::new());
        let asset = asset_at(format!("{}/cronet.tar.xz", url), 4096);
        let payload = fetch_asset(&http_client, &asset).await.unwrap();

        mock.assert_async().await;
        assert_eq!(payload.len(), 5);
    }

    #[tokio::test]
    async fn test_fetch_asset_not_found() {
        let mut server = mockito::Server::new_async().await;
        let url = server.url();

        let mock = server
            .mock("GET", "/cronet.tar.xz")
            .with_status(404)
            .create_async()
            .await;

        let http_client = HttpClient::new(Client::new());
        let asset = asset_at(format!("{}/cronet.tar.xz", url), 12);
        let result = fetch_asset(&http_client, &asset).await;

        mock.assert_async().await;
        let err = result.unwrap_err();
        assert!(err.to_string().contains("cronet-linux-x64.tar.xz"));
        assert!(matches!(
            err.downcast_ref::<BootstrapError>(),
            Some(BootstrapError::Transfer { status: 404, .. })
        ));
    }
}
