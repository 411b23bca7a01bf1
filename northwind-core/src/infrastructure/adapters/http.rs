// northwind-core/src/infrastructure/adapters/http.rs

use async_trait::async_trait;
use std::path::Path;
use std::time::Duration;
use tracing::info;

use crate::error::NorthwindError;
use crate::infrastructure::error::InfrastructureError;
use crate::infrastructure::fs::atomic_write;
use crate::ports::fetcher::SourceFetcher;

const TIMEOUT: Duration = Duration::from_secs(60);

/// Downloads raw CSVs from a static mirror (`<base_url>/<remote_name>`).
#[derive(Debug, Clone)]
pub struct HttpSourceFetcher {
    client: reqwest::Client,
    base_url: String,
}

impl HttpSourceFetcher {
    pub fn new(base_url: &str) -> Result<Self, InfrastructureError> {
        let client = reqwest::Client::builder()
            .timeout(TIMEOUT)
            .build()
            .map_err(|e| InfrastructureError::Download {
                url: base_url.to_string(),
                source: e,
            })?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn url(&self, remote_name: &str) -> String {
        format!("{}/{}", self.base_url, remote_name.trim_start_matches('/'))
    }
}

#[async_trait]
impl SourceFetcher for HttpSourceFetcher {
    async fn fetch(&self, remote_name: &str, target: &Path) -> Result<(), NorthwindError> {
        let url = self.url(remote_name);
        info!(url = %url, target = %target.display(), "Downloading raw source");

        let download = |source: reqwest::Error| InfrastructureError::Download {
            url: url.clone(),
            source,
        };
        let bytes = self
            .client
            .get(&url)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(download)?
            .bytes()
            .await
            .map_err(download)?;

        if let Some(dir) = target.parent() {
            std::fs::create_dir_all(dir)?;
        }
        // Staged then renamed: an interrupted download never leaves a partial CSV.
        atomic_write(target, &bytes)?;
        Ok(())
    }
}
