// northwind-core/src/ports/fetcher.rs

use crate::error::NorthwindError;
use async_trait::async_trait;
use std::path::Path;

/// Downloads a raw source file to a local path.
#[async_trait]
pub trait SourceFetcher: Send + Sync {
    async fn fetch(&self, remote_name: &str, target: &Path) -> Result<(), NorthwindError>;
}
