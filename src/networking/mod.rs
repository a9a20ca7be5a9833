use std::path::Path;
use std::time::Duration;

use futures_util::StreamExt;
use log::{debug, warn};
use reqwest::Client;
use serde::de::DeserializeOwned;
use tokio::fs::File;
use tokio::io::AsyncWriteExt;

use crate::error::{LauncherError, Result};
use crate::util::progress_fraction;

/// Largest slice written to disk between progress reports.
pub const CHUNK_SIZE: usize = 8 * 1024;

const USER_AGENT: &str = concat!("rebirth-launcher/", env!("CARGO_PKG_VERSION"));

/// Fetches a remote asset to a local file, reporting progress as a 0.0-1.0 fraction.
pub trait AssetFetcher {
    async fn fetch(
        &self,
        url: &str,
        dest: &Path,
        on_progress: &mut (dyn FnMut(f32) + Send),
    ) -> Result<u64>;
}

#[derive(Clone)]
pub struct NetworkClient {
    client: Client,
}

impl NetworkClient {
    pub fn new() -> Self {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .connect_timeout(Duration::from_secs(30))
            .timeout(Duration::from_secs(30 * 60))
            .build()
            .unwrap_or_else(|err| {
                warn!("network client: falling back to default HTTP client configuration ({err})");
                Client::new()
            });
        Self::with_client(client)
    }

    pub fn with_client(client: Client) -> Self {
        Self { client }
    }

    /// GET `url` and decode the JSON body.
    pub async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, String> {
        let response = self
            .client
            .get(url)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| format!("request to {url} failed: {e}"))?
            .error_for_status()
            .map_err(|e| format!("request to {url} returned error status: {e}"))?;
        response
            .json::<T>()
            .await
            .map_err(|e| format!("invalid JSON from {url}: {e}"))
    }

    /// Stream `url` into `dest`, calling `on_progress` after every increment written
    /// when the server announces a content length.
    pub async fn download_to_path<F>(&self, url: &str, dest: &Path, mut on_progress: F) -> Result<u64>
    where
        F: FnMut(f32),
    {
        let fail = |cause: String| {
            LauncherError::download("Failed to download file")
                .with_detail(format!("URL: {url}, Error: {cause}"))
        };

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| fail(format!("request failed: {e}")))?
            .error_for_status()
            .map_err(|e| fail(format!("status error: {e}")))?;

        if let Some(parent) = dest.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| fail(format!("failed to create {}: {e}", parent.display())))?;
        }
        let mut file = File::create(dest)
            .await
            .map_err(|e| fail(format!("failed to create {}: {e}", dest.display())))?;

        let total = response.content_length();
        debug!("download: {} -> {} (length {:?})", url, dest.display(), total);
        let mut stream = response.bytes_stream();
        let mut written: u64 = 0;

        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| fail(format!("stream error: {e}")))?;
            for piece in chunk.chunks(CHUNK_SIZE) {
                file.write_all(piece)
                    .await
                    .map_err(|e| fail(format!("write error: {e}")))?;
                written += piece.len() as u64;
                if let Some(fraction) = progress_fraction(written, total) {
                    on_progress(fraction);
                }
            }
        }

        file.flush()
            .await
            .map_err(|e| fail(format!("flush error: {e}")))?;

        if let Some(total) = total
            && written < total
        {
            return Err(fail(format!(
                "download incomplete: received {written} of {total} bytes"
            )));
        }

        Ok(written)
    }
}

impl AssetFetcher for NetworkClient {
    async fn fetch(
        &self,
        url: &str,
        dest: &Path,
        on_progress: &mut (dyn FnMut(f32) + Send),
    ) -> Result<u64> {
        self.download_to_path(url, dest, on_progress).await
    }
}
