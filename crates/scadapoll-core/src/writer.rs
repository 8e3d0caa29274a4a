// ── Batched write path ──

use chrono::Utc;
use tracing::debug;
use url::Url;

use scadapoll_api::{HttpTransport, ScadaClient, Transport};

use crate::convert::stamp_batch;
use crate::error::CoreError;
use crate::model::{WriteBatch, WriteResult};

/// Submits write batches, one POST per batch.
#[derive(Debug)]
pub struct Writer<T = HttpTransport> {
    api: ScadaClient<T>,
}

impl<T> Clone for Writer<T> {
    fn clone(&self) -> Self {
        Self {
            api: self.api.clone(),
        }
    }
}

impl<T: Transport> Writer<T> {
    pub fn new(api: ScadaClient<T>) -> Self {
        Self { api }
    }

    /// Write a single pair or a batch against `base`.
    ///
    /// All pairs share one submission timestamp and carry good quality.
    /// Items the server refused come back in [`WriteResult::errors`];
    /// only transport and decode failures are `Err`.
    pub async fn write(
        &self,
        base: &Url,
        batch: impl Into<WriteBatch>,
    ) -> Result<WriteResult, CoreError> {
        let batch = batch.into();
        if batch.is_empty() {
            return Err(CoreError::EmptyWrite);
        }

        let count = batch.len();
        let items = stamp_batch(batch, Utc::now());
        let resp = self.api.write_items(base, &items).await?;
        let result = WriteResult::from(resp);

        debug!(
            submitted = count,
            written = result.written_count,
            failed = result.errors.len(),
            "write completed"
        );
        Ok(result)
    }
}
