// northwind-core/src/application/extract.rs

use std::fs;
use tracing::{info, warn};

use crate::application::pipeline::PipelineContext;
use crate::domain::project::SourceTable;
use crate::error::NorthwindError;
use crate::infrastructure::error::InfrastructureError;

/// What the extract stage found (and fetched) in the raw folder.
#[derive(Debug, Clone, Default)]
pub struct Extracted {
    pub registered: Vec<SourceTable>,
    pub downloaded: Vec<SourceTable>,
}

pub fn raw_relation(table: SourceTable) -> String {
    format!("raw_{}", table.table_name())
}

/// Makes the raw CSVs available as `raw_<table>` views, downloading missing
/// ones first when allowed.
pub async fn extract(ctx: &PipelineContext<'_>) -> Result<Extracted, NorthwindError> {
    let raw_dir = ctx.layout.raw();
    fs::create_dir_all(&raw_dir)?;

    let mut out = Extracted::default();
    let wanted = SourceTable::selected(ctx.use_products);

    // 1. Download what is missing
    if ctx.config.auto_download {
        if let Some(fetcher) = ctx.fetcher {
            for table in &wanted {
                let path = raw_dir.join(table.file_name());
                if path.exists() {
                    continue;
                }
                match fetcher.fetch(table.remote_name(), &path).await {
                    Ok(()) => out.downloaded.push(*table),
                    // Products are a nice-to-have: carry on without them.
                    Err(e) if !table.is_required() => {
                        warn!(table = %table, error = %e, "Optional source could not be downloaded")
                    }
                    Err(e) => return Err(e),
                }
            }
        }
    }

    // 2. Required files must be there now
    let missing: Vec<String> = wanted
        .iter()
        .filter(|t| t.is_required() && !raw_dir.join(t.file_name()).exists())
        .map(|t| t.file_name().to_string())
        .collect();
    if !missing.is_empty() {
        return Err(InfrastructureError::MissingSources(missing).into());
    }

    // 3. Register views
    for table in wanted {
        let path = raw_dir.join(table.file_name());
        if !path.exists() {
            warn!(table = %table, "Optional source not found, continuing without it");
            continue;
        }
        ctx.connector
            .register_source(&raw_relation(table), &path)
            .await?;
        out.registered.push(table);
    }

    info!(
        registered = out.registered.len(),
        downloaded = out.downloaded.len(),
        "Extract finished"
    );
    Ok(out)
}
