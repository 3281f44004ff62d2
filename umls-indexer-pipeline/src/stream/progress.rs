//! Progress notification for long-running streams.

use tracing::info;

/// Receives the running document count every K documents.
pub trait ProgressObserver: Send {
    fn on_progress(&mut self, count: u64);
}

/// Observer that reports progress through the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogProgress;

impl ProgressObserver for LogProgress {
    fn on_progress(&mut self, count: u64) {
        info!(documents = count, "Documents processed");
    }
}

impl<F> ProgressObserver for F
where
    F: FnMut(u64) + Send,
{
    fn on_progress(&mut self, count: u64) {
        self(count)
    }
}
