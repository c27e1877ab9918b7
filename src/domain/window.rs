// Window batch model - one fixed-duration window's worth of samples
use crate::domain::sample::{Timestamp, Timestamped};
use std::time::Duration;

/// Nominal amount of data covered by one window batch.
pub const DAY_OF_DATA: Duration = Duration::from_secs(24 * 60 * 60);

/// An ordered run of samples of one kind whose timestamps fall inside one
/// window. Start and end times are derived from the first and last sample,
/// never stored. A batch is never constructed empty.
#[derive(Debug, Clone, PartialEq)]
pub struct WindowBatch<T> {
    samples: Vec<T>,
}

impl<T> WindowBatch<T> {
    /// `samples` must be non-empty and in non-decreasing time order.
    pub fn new(samples: Vec<T>) -> Self {
        debug_assert!(!samples.is_empty());
        Self { samples }
    }

    pub fn samples(&self) -> &[T] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }
}

impl<T: Timestamped> WindowBatch<T> {
    pub fn start_time(&self) -> Timestamp {
        self.samples[0].timestamp()
    }

    pub fn end_time(&self) -> Timestamp {
        self.samples[self.samples.len() - 1].timestamp()
    }
}

impl<T: Timestamped> Timestamped for WindowBatch<T> {
    fn timestamp(&self) -> Timestamp {
        self.start_time()
    }
}
