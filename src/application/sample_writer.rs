// Downstream batch-writer contract for the buffering pipeline
use crate::domain::window::WindowBatch;
use async_trait::async_trait;

/// Destination for completed window batches.
///
/// Implementations follow the pipeline's persistent-state discipline: every
/// call consumes the writer and returns its successor state, and the caller
/// must rebind to the returned value. A retained stale state risks re-sending
/// already-flushed data.
#[async_trait]
pub trait BatchWriter<T>: Sized + Send {
    /// Writes a group of window batches, oldest first. A non-ok result means
    /// an unknown prefix of the group may already be persisted.
    async fn write_batches(self, batches: Vec<WindowBatch<T>>) -> anyhow::Result<Self>;

    /// Pushes any held state through to the backing store.
    async fn flush(self) -> anyhow::Result<Self>;
}
