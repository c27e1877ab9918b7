// Count-batched writing layer - coalesces window batches until a flush
// threshold is reached, then forwards the whole group downstream in one call
use crate::application::chain::Chain;
use crate::application::sample_writer::BatchWriter;
use crate::domain::window::WindowBatch;
use async_trait::async_trait;

/// Buffers incoming window batches and forwards them to the inner writer in
/// groups of up to `flush_size`, amortizing the backing store's per-call
/// cost. Follows the same persistent-update discipline as the streamer.
pub struct BatchingWriter<T, W> {
    held: Chain<WindowBatch<T>>,
    size: usize,
    flush_size: usize,
    inner: W,
}

impl<T, W> BatchingWriter<T, W>
where
    T: Clone + Send + Sync,
    W: BatchWriter<T> + Send,
{
    pub fn new(inner: W, flush_size: usize) -> Self {
        Self {
            held: Chain::new(),
            size: 0,
            flush_size,
            inner,
        }
    }

    /// Returns a writer whose threshold is at least `flush_size`, reusing
    /// the current one unchanged when it already batches at that
    /// granularity or coarser.
    ///
    /// Intended for callers handed a writer that may already be a
    /// `BatchingWriter`: rather than wrapping it in a second layer, they
    /// can widen the existing threshold in place.
    pub fn with_flush_size(self, flush_size: usize) -> Self {
        if self.flush_size >= flush_size {
            self
        } else {
            Self { flush_size, ..self }
        }
    }

    /// Window batches currently held back from the inner writer.
    pub fn held_count(&self) -> usize {
        self.size
    }
}

#[async_trait]
impl<T, W> BatchWriter<T> for BatchingWriter<T, W>
where
    T: Clone + Send + Sync + 'static,
    W: BatchWriter<T> + Send,
{
    async fn write_batches(self, batches: Vec<WindowBatch<T>>) -> anyhow::Result<Self> {
        let mut w = self;
        for batch in batches {
            // Flush before appending: the writer may briefly hold a full
            // group while the newest arrival waits to land.
            if w.size >= w.flush_size {
                w = w.flush().await?;
            }

            let held = w.held.push(batch);
            let size = w.size + 1;
            w = Self { held, size, ..w };
        }

        Ok(w)
    }

    async fn flush(self) -> anyhow::Result<Self> {
        if self.size == 0 {
            return Ok(Self {
                held: Chain::new(),
                size: 0,
                ..self
            });
        }

        let Self {
            held,
            flush_size,
            inner,
            ..
        } = self;

        let (group, _) = held.linearize();
        let inner = inner.write_batches(group).await?;

        Ok(Self {
            held: Chain::new(),
            size: 0,
            flush_size,
            inner,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::sample_writer::test_support::{read, RecordingWriter};
    use crate::domain::sample::GlucoseRead;

    fn single_read_batch(timestamp: i64) -> WindowBatch<GlucoseRead> {
        WindowBatch::new(vec![read(timestamp, 75)])
    }

    #[tokio::test]
    async fn test_full_group_flushes_in_one_call() {
        let inner = RecordingWriter::new();
        let mut writer = BatchingWriter::new(inner.clone(), 10);

        for i in 0..10 {
            writer = writer.write_batches(vec![single_read_batch(i)]).await.unwrap();
        }
        assert_eq!(inner.call_count(), 0);

        writer.flush().await.unwrap();
        assert_eq!(inner.group_sizes(), vec![10]);
    }

    #[tokio::test]
    async fn test_eleventh_batch_triggers_a_single_flush_of_ten() {
        let inner = RecordingWriter::new();
        let mut writer = BatchingWriter::new(inner.clone(), 10);

        for i in 0..11 {
            writer = writer.write_batches(vec![single_read_batch(i)]).await.unwrap();
        }

        // The flush happens before the 11th append, leaving one held back.
        assert_eq!(inner.group_sizes(), vec![10]);
        assert_eq!(writer.held_count(), 1);

        writer.flush().await.unwrap();
        assert_eq!(inner.group_sizes(), vec![10, 1]);
    }

    #[tokio::test]
    async fn test_two_full_groups() {
        let inner = RecordingWriter::new();
        let mut writer = BatchingWriter::new(inner.clone(), 10);

        for i in 0..20 {
            writer = writer.write_batches(vec![single_read_batch(i)]).await.unwrap();
        }
        assert_eq!(inner.group_sizes(), vec![10]);

        writer.flush().await.unwrap();
        assert_eq!(inner.group_sizes(), vec![10, 10]);
    }

    #[tokio::test]
    async fn test_flush_on_empty_writer_makes_no_downstream_call() {
        let inner = RecordingWriter::new();
        let writer: BatchingWriter<GlucoseRead, _> = BatchingWriter::new(inner.clone(), 10);

        let writer = writer.flush().await.unwrap();
        writer.flush().await.unwrap();

        assert_eq!(inner.call_count(), 0);
    }

    #[tokio::test]
    async fn test_groups_arrive_oldest_first() {
        let inner = RecordingWriter::new();
        let mut writer = BatchingWriter::new(inner.clone(), 5);

        let batches: Vec<_> = (0..5).map(single_read_batch).collect();
        writer = writer.write_batches(batches.clone()).await.unwrap();
        writer.flush().await.unwrap();

        let calls_sizes = inner.group_sizes();
        assert_eq!(calls_sizes, vec![5]);
        let delivered = inner.delivered();
        let expected: Vec<_> = batches
            .iter()
            .flat_map(|b| b.samples().to_vec())
            .collect();
        assert_eq!(delivered, expected);
    }

    #[tokio::test]
    async fn test_with_flush_size_reuses_compatible_writer() {
        let inner = RecordingWriter::new();
        let writer: BatchingWriter<GlucoseRead, _> = BatchingWriter::new(inner, 20);

        let rewrapped = writer.with_flush_size(10);
        assert_eq!(rewrapped.flush_size, 20);

        let widened = rewrapped.with_flush_size(50);
        assert_eq!(widened.flush_size, 50);
    }

    #[tokio::test]
    async fn test_failed_flush_propagates() {
        let inner = RecordingWriter::new();
        let mut writer = BatchingWriter::new(inner.clone(), 2);

        for i in 0..2 {
            writer = writer.write_batches(vec![single_read_batch(i)]).await.unwrap();
        }

        inner.fail_next_write();
        let result = writer.write_batches(vec![single_read_batch(2)]).await;

        assert!(result.is_err());
        assert_eq!(inner.call_count(), 0);
    }
}
