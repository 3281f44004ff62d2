//! Bounded, observable stream of concept documents.

use std::fmt;
use std::iter::FusedIterator;
use std::path::PathBuf;

use tracing::info;

use crate::errors::PipelineError;
use crate::processor::{ConceptProcessor, SkipMalformed, SkipMalformedExt};
use crate::schema::Schema;
use crate::source::LineSource;
use crate::stream::progress::{LogProgress, ProgressObserver};
use umls_indexer_shared::{ConceptDocument, IndexTarget};

/// Configuration for a concept stream.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StreamOptions {
    /// Stop after this many documents.
    pub demo: Option<usize>,
    /// Notify the observer after every K-th document. Zero disables notification.
    pub notify_every: u64,
}

impl StreamOptions {
    pub fn with_demo(mut self, demo: usize) -> Self {
        self.demo = Some(demo);
        self
    }

    pub fn with_notify_every(mut self, notify_every: u64) -> Self {
        self.notify_every = notify_every;
        self
    }
}

/// Lifecycle of a `ConceptStream`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamState {
    Unopened,
    Streaming,
    /// The source ended or failed.
    Exhausted,
    /// The demo bound was reached before the source ended.
    DemoExhausted,
}

impl StreamState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Exhausted | Self::DemoExhausted)
    }
}

/// Diagnostic counters of a stream.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StreamStats {
    pub lines_read: u64,
    pub short_lines: u64,
    pub skipped: u64,
    pub emitted: u64,
}

/// Lazy sequence of concept documents read from an MRCONSO extract.
///
/// Each pull reads as many raw lines as needed to produce one valid document.
/// Malformed lines are skipped; source errors end the stream after being
/// yielded once. The file handle is released as soon as the stream reaches
/// a terminal state.
pub struct ConceptStream {
    inner: SkipMalformed<LineSource, ConceptProcessor>,
    options: StreamOptions,
    observer: Box<dyn ProgressObserver>,
    state: StreamState,
    emitted: u64,
}

impl ConceptStream {
    /// Create a stream over `path` with the MRCONSO schema.
    pub fn open(path: impl Into<PathBuf>, target: IndexTarget, options: StreamOptions) -> Self {
        Self::with_schema(path, Schema::mrconso(), target, options)
    }

    /// Create a stream over `path` with a custom schema.
    pub fn with_schema(
        path: impl Into<PathBuf>,
        schema: Schema,
        target: IndexTarget,
        options: StreamOptions,
    ) -> Self {
        let processor = ConceptProcessor::with_schema(schema, target);
        Self::new(LineSource::new(path), processor, options)
    }

    pub fn new(source: LineSource, processor: ConceptProcessor, options: StreamOptions) -> Self {
        Self {
            inner: source.skip_malformed(processor),
            options,
            observer: Box::new(LogProgress),
            state: StreamState::Unopened,
            emitted: 0,
        }
    }

    /// Replace the progress observer.
    pub fn with_observer(mut self, observer: impl ProgressObserver + 'static) -> Self {
        self.observer = Box::new(observer);
        self
    }

    pub fn options(&self) -> &StreamOptions {
        &self.options
    }

    pub fn state(&self) -> StreamState {
        self.state
    }

    pub fn stats(&self) -> StreamStats {
        StreamStats {
            lines_read: self.inner.lines().lines_read(),
            short_lines: self.inner.projector().short_lines(),
            skipped: self.inner.skipped(),
            emitted: self.emitted,
        }
    }

    /// Open the extract before the first pull, so a missing or unreadable
    /// file is reported up front. A demo bound of zero never opens it.
    ///
    /// On failure the stream is exhausted and yields nothing.
    pub fn open_source(&mut self) -> Result<(), PipelineError> {
        if self.state.is_terminal() || self.demo_reached() {
            return Ok(());
        }

        if let Err(e) = self.inner.lines_mut().open() {
            self.finish(StreamState::Exhausted);
            return Err(e);
        }
        Ok(())
    }

    /// End the stream now and release the source.
    pub fn close(&mut self) {
        if !self.state.is_terminal() {
            self.finish(StreamState::Exhausted);
        }
    }

    fn demo_reached(&self) -> bool {
        self.options
            .demo
            .is_some_and(|limit| self.emitted >= limit as u64)
    }

    fn finish(&mut self, state: StreamState) {
        self.inner.lines_mut().close();
        self.state = state;

        let stats = self.stats();
        info!(
            state = ?state,
            lines_read = stats.lines_read,
            short_lines = stats.short_lines,
            skipped = stats.skipped,
            emitted = stats.emitted,
            "Concept stream finished"
        );
    }
}

impl Iterator for ConceptStream {
    type Item = Result<ConceptDocument, PipelineError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.state.is_terminal() {
            return None;
        }

        if self.demo_reached() {
            self.finish(StreamState::DemoExhausted);
            return None;
        }

        self.state = StreamState::Streaming;

        match self.inner.next() {
            None => {
                self.finish(StreamState::Exhausted);
                None
            }
            Some(Err(e)) => {
                self.finish(StreamState::Exhausted);
                Some(Err(e))
            }
            Some(Ok(doc)) => {
                self.emitted += 1;

                let every = self.options.notify_every;
                if every > 0 && self.emitted % every == 0 {
                    self.observer.on_progress(self.emitted);
                }

                if self.demo_reached() {
                    self.finish(StreamState::DemoExhausted);
                }

                Some(Ok(doc))
            }
        }
    }
}

impl FusedIterator for ConceptStream {}

impl fmt::Debug for ConceptStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConceptStream")
            .field("source", self.inner.lines())
            .field("options", &self.options)
            .field("state", &self.state)
            .field("stats", &self.stats())
            .finish()
    }
}
