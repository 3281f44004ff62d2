//! Lazily opened line source over an RRF file.
//!
//! The file is opened on the first pull, read one line at a time, and closed
//! as soon as the stream ends, the caller calls `close`, or the source is
//! dropped.

use std::fmt;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::iter::FusedIterator;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::errors::PipelineError;

/// Column separator of RRF files.
pub const FIELD_DELIMITER: char = '|';

/// Lifecycle of a `LineSource`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceState {
    /// Constructed, file not opened yet.
    Unopened,
    /// File open, lines being read.
    Streaming,
    /// End of stream reached or source closed; the handle is released.
    Exhausted,
}

/// One line of the extract with its terminator stripped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawLine {
    line_number: u64,
    text: String,
}

impl RawLine {
    /// Create a raw line. `line_number` is 1-based.
    pub fn new(line_number: u64, text: impl Into<String>) -> Self {
        Self {
            line_number,
            text: text.into(),
        }
    }

    /// 1-based position of the line in the file.
    pub fn line_number(&self) -> u64 {
        self.line_number
    }

    /// The line text without terminator.
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Columns of the line, split on `|`, in file order.
    pub fn columns(&self) -> std::str::Split<'_, char> {
        self.text.split(FIELD_DELIMITER)
    }
}

impl fmt::Display for RawLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// Single-pass reader of raw lines from one file.
///
/// An empty line or the physical end of the file ends the stream. The source
/// is not restartable; read the file again with a new `LineSource`.
pub struct LineSource {
    path: PathBuf,
    reader: Option<BufReader<File>>,
    state: SourceState,
    lines_read: u64,
    buffer: Vec<u8>,
}

impl LineSource {
    /// Create a source for `path`. Nothing is opened until the first read.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            reader: None,
            state: SourceState::Unopened,
            lines_read: 0,
            buffer: Vec::new(),
        }
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Current lifecycle state.
    pub fn state(&self) -> SourceState {
        self.state
    }

    /// Whether the file handle is currently held.
    pub fn is_open(&self) -> bool {
        self.reader.is_some()
    }

    /// Number of non-terminating lines read so far.
    pub fn lines_read(&self) -> u64 {
        self.lines_read
    }

    /// Open the backing file now instead of on the first read.
    ///
    /// Opening an already open source is a no-op. Opening an exhausted source
    /// does nothing either: it stays exhausted.
    pub fn open(&mut self) -> Result<(), PipelineError> {
        if self.state != SourceState::Unopened {
            return Ok(());
        }

        match File::open(&self.path) {
            Ok(file) => {
                self.reader = Some(BufReader::new(file));
                self.state = SourceState::Streaming;
                info!(path = %self.path.display(), "Opened source file");
                Ok(())
            }
            Err(e) => {
                self.state = SourceState::Exhausted;
                Err(PipelineError::io(&self.path, e))
            }
        }
    }

    /// Release the file handle and end the stream.
    pub fn close(&mut self) {
        if self.reader.take().is_some() {
            debug!(path = %self.path.display(), lines_read = self.lines_read, "Closed source file");
        }
        self.state = SourceState::Exhausted;
    }

    /// Read the next raw line.
    ///
    /// Returns `Ok(None)` at end of stream, which is either an empty line or
    /// the end of the file. I/O failures are returned as errors and close the
    /// source.
    pub fn next_line(&mut self) -> Result<Option<RawLine>, PipelineError> {
        match self.state {
            SourceState::Exhausted => return Ok(None),
            SourceState::Unopened => self.open()?,
            SourceState::Streaming => {}
        }

        let Some(reader) = self.reader.as_mut() else {
            self.close();
            return Ok(None);
        };

        self.buffer.clear();
        let read = match reader.read_until(b'\n', &mut self.buffer) {
            Ok(read) => read,
            Err(e) => {
                self.close();
                return Err(PipelineError::io(&self.path, e));
            }
        };

        let bytes = trim_line_terminator(&self.buffer);
        if read == 0 || bytes.is_empty() {
            debug!(lines_read = self.lines_read, "Reached end of source stream");
            self.close();
            return Ok(None);
        }

        self.lines_read += 1;
        let text = match std::str::from_utf8(bytes) {
            Ok(text) => text.to_string(),
            Err(e) => {
                warn!(line = self.lines_read, error = %e, "Line is not valid UTF-8, replacing invalid bytes");
                String::from_utf8_lossy(bytes).into_owned()
            }
        };

        Ok(Some(RawLine::new(self.lines_read, text)))
    }
}

impl fmt::Debug for LineSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LineSource")
            .field("path", &self.path)
            .field("state", &self.state)
            .field("lines_read", &self.lines_read)
            .finish()
    }
}

impl Iterator for LineSource {
    type Item = Result<RawLine, PipelineError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_line().transpose()
    }
}

impl FusedIterator for LineSource {}

/// Strip a trailing `\n` or `\r\n`.
fn trim_line_terminator(bytes: &[u8]) -> &[u8] {
    let bytes = bytes.strip_suffix(b"\n").unwrap_or(bytes);
    bytes.strip_suffix(b"\r").unwrap_or(bytes)
}
