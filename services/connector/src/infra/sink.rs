//! Flat-file export sink: one JSON document per authenticated account.

use std::path::PathBuf;

use anyhow::Context as _;
use async_trait::async_trait;

use crate::domain::ports::ExportSink;
use crate::domain::types::SessionExport;
use crate::error::ConnectorError;

pub struct JsonFileSink {
    dir: PathBuf,
}

impl JsonFileSink {
    /// Creates the export directory if missing.
    pub async fn new(dir: PathBuf) -> Result<Self, ConnectorError> {
        tokio::fs::create_dir_all(&dir)
            .await
            .with_context(|| format!("failed to create export dir {}", dir.display()))?;
        Ok(Self { dir })
    }
}

#[async_trait]
impl ExportSink for JsonFileSink {
    async fn store(&self, record: &SessionExport) -> Result<(), ConnectorError> {
        let filename = format!(
            "{}-{}.json",
            record.account.user_id,
            record.exported_at.timestamp_millis()
        );
        let path = self.dir.join(filename);
        let body = serde_json::to_vec_pretty(record).context("failed to serialize export record")?;
        tokio::fs::write(&path, body)
            .await
            .with_context(|| format!("failed to write export record {}", path.display()))?;
        tracing::info!(account_id = %record.account.user_id, path = %path.display(), "session export persisted");
        Ok(())
    }
}
