// Windowed streaming layer - groups chronologically ordered samples into
// fixed-duration window batches and forwards completed windows downstream
use crate::application::chain::Chain;
use crate::application::sample_writer::BatchWriter;
use crate::domain::sample::{
    CalibrationRead, Exercise, GlucoseRead, Injection, Meal, Timestamp, Timestamped,
};
use crate::domain::window::WindowBatch;
use std::time::Duration;

/// Immutable snapshot of one ingestion stream: the current window's chain,
/// the timestamp opening the window, the window duration and the downstream
/// writer. Every operation consumes the snapshot and returns its successor;
/// callers must always rebind to the returned value, since writing through a
/// stale snapshot would silently lose or duplicate data.
pub struct SampleStreamer<T, W> {
    window: Chain<T>,
    window_start: Option<Timestamp>,
    duration: Duration,
    writer: W,
}

pub type GlucoseReadStreamer<W> = SampleStreamer<GlucoseRead, W>;
pub type CalibrationReadStreamer<W> = SampleStreamer<CalibrationRead, W>;
pub type InjectionStreamer<W> = SampleStreamer<Injection, W>;
pub type MealStreamer<W> = SampleStreamer<Meal, W>;
pub type ExerciseStreamer<W> = SampleStreamer<Exercise, W>;

impl<T, W> SampleStreamer<T, W>
where
    T: Timestamped + Clone + Send + Sync,
    W: BatchWriter<T> + Send,
{
    /// Returns a streamer with no open window that cuts a new window batch
    /// every `duration` of sample time.
    pub fn new(writer: W, duration: Duration) -> Self {
        Self {
            window: Chain::new(),
            window_start: None,
            duration,
            writer,
        }
    }

    /// Writes a single sample.
    pub async fn write_one(self, sample: T) -> anyhow::Result<Self> {
        self.write_many(&[sample]).await
    }

    /// Writes a run of samples. `samples` must be sorted oldest to most
    /// recent and must not predate the current window; the streamer windows,
    /// it does not re-sort. The first downstream failure aborts the
    /// remaining samples and propagates.
    pub async fn write_many(self, samples: &[T]) -> anyhow::Result<Self> {
        let mut s = self;
        for sample in samples {
            let t = sample.timestamp();
            s = match s.window_start {
                None => s.open_window(sample.clone()),
                Some(start) if t - start >= s.duration.as_secs() as i64 => {
                    // Window complete: forward it, then start over at this
                    // sample.
                    s.flush().await?.open_window(sample.clone())
                }
                Some(_) => {
                    let window = s.window.push(sample.clone());
                    Self { window, ..s }
                }
            };
        }

        Ok(s)
    }

    fn open_window(self, sample: T) -> Self {
        let start = sample.timestamp();
        Self {
            window: Chain::new().push(sample),
            window_start: Some(start),
            ..self
        }
    }

    /// Forwards the current window downstream as a single batch and returns
    /// a streamer with an empty window. A no-op when the window is empty.
    pub async fn flush(self) -> anyhow::Result<Self> {
        let Self {
            window,
            duration,
            writer,
            ..
        } = self;

        let (samples, count) = window.linearize();
        if count == 0 {
            return Ok(Self::new(writer, duration));
        }

        let writer = writer.write_batches(vec![WindowBatch::new(samples)]).await?;
        Ok(Self::new(writer, duration))
    }

    /// Flushes this streamer and then the downstream writer, leaving nothing
    /// buffered at either layer. Safe to call again on the returned state.
    pub async fn close(self) -> anyhow::Result<Self> {
        let Self {
            window,
            window_start,
            duration,
            writer,
        } = self.flush().await?;

        let writer = writer.flush().await?;
        Ok(Self {
            window,
            window_start,
            duration,
            writer,
        })
    }
}

/// Per-kind entry points, one for each sample stream the service ingests.
pub fn glucose_read_streamer<W>(writer: W, duration: Duration) -> GlucoseReadStreamer<W>
where
    W: BatchWriter<GlucoseRead> + Send,
{
    SampleStreamer::new(writer, duration)
}

pub fn calibration_read_streamer<W>(writer: W, duration: Duration) -> CalibrationReadStreamer<W>
where
    W: BatchWriter<CalibrationRead> + Send,
{
    SampleStreamer::new(writer, duration)
}

pub fn injection_streamer<W>(writer: W, duration: Duration) -> InjectionStreamer<W>
where
    W: BatchWriter<Injection> + Send,
{
    SampleStreamer::new(writer, duration)
}

pub fn meal_streamer<W>(writer: W, duration: Duration) -> MealStreamer<W>
where
    W: BatchWriter<Meal> + Send,
{
    SampleStreamer::new(writer, duration)
}

pub fn exercise_streamer<W>(writer: W, duration: Duration) -> ExerciseStreamer<W>
where
    W: BatchWriter<Exercise> + Send,
{
    SampleStreamer::new(writer, duration)
}
