// InfluxDB batch writer - line-protocol writes with hard sub-batching
use crate::application::sample_writer::BatchWriter;
use crate::domain::window::WindowBatch;
use crate::infrastructure::line_protocol::{encode_batches, SamplePoint};
use anyhow::{Context, Result};
use async_trait::async_trait;
use std::marker::PhantomData;

/// Hard cap on window batches persisted in one write round-trip.
pub const MAX_BATCHES_PER_WRITE: usize = 500;

/// Connection handle for the InfluxDB write path.
#[derive(Debug, Clone)]
pub struct InfluxStore {
    host: String,
    token: String,
    database: String,
    retention_policy: String,
    client: reqwest::Client,
}

impl InfluxStore {
    pub fn new(host: String, token: String, database: String, retention_policy: String) -> Self {
        Self {
            host: host.trim_end_matches('/').to_string(),
            token,
            database,
            retention_policy,
            client: reqwest::Client::new(),
        }
    }

    fn write_url(&self) -> String {
        format!(
            "{}/write?db={}&rp={}&precision=s",
            self.host,
            urlencoding::encode(&self.database),
            urlencoding::encode(&self.retention_policy)
        )
    }

    async fn write_lines(&self, body: String) -> Result<()> {
        let response = self
            .client
            .post(self.write_url())
            .header("Authorization", format!("Token {}", self.token))
            .body(body)
            .send()
            .await
            .context("Failed to send write request to InfluxDB")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("InfluxDB write failed with status {}: {}", status, body);
        }

        Ok(())
    }
}

/// Store-facing batch writer for one sample kind and one user. Holds no
/// buffered state of its own; groups larger than the store's per-call cap
/// are split into multiple round-trips, and a mid-group failure aborts the
/// remaining sub-groups (an unknown prefix may already be persisted).
#[derive(Debug, Clone)]
pub struct InfluxBatchWriter<T> {
    store: InfluxStore,
    user: String,
    _kind: PhantomData<T>,
}

impl<T> InfluxBatchWriter<T> {
    pub fn new(store: InfluxStore, user: String) -> Self {
        Self {
            store,
            user,
            _kind: PhantomData,
        }
    }
}

#[async_trait]
impl<T> BatchWriter<T> for InfluxBatchWriter<T>
where
    T: SamplePoint + Clone + Send + Sync + 'static,
{
    async fn write_batches(self, batches: Vec<WindowBatch<T>>) -> Result<Self> {
        for group in batches.chunks(MAX_BATCHES_PER_WRITE) {
            let body = encode_batches(group, &self.user);
            tracing::debug!(
                "Writing {} window batches ({} bytes) to measurement {}",
                group.len(),
                body.len(),
                T::measurement()
            );
            self.store.write_lines(body).await?;
        }

        Ok(self)
    }

    async fn flush(self) -> Result<Self> {
        Ok(self)
    }
}
