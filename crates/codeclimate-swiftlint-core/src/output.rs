//! Output of lint results.
//!
//! Normal runs stream [`Issue`] records through an [`IssueWriter`]: a single
//! thread owns the sink and writes one record at a time, so records from
//! parallel producers never interleave. Debug runs print Xcode-style lines
//! through [`XcodeReporter`].

use std::io::{self, Write};
use std::sync::mpsc;
use std::thread::{self, JoinHandle};

use crate::issue::Issue;
use crate::violation::Violation;

/// Record terminator, fixed for a whole run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Framing {
    /// `{...}\0`
    #[default]
    Nul,
    /// `{...}\n\0`
    NewlineNul,
}

impl Framing {
    /// Bytes written after each record.
    #[must_use]
    pub fn terminator(self) -> &'static [u8] {
        match self {
            Self::Nul => b"\0",
            Self::NewlineNul => b"\n\0",
        }
    }
}

/// Output errors.
#[derive(Debug, thiserror::Error)]
pub enum OutputError {
    /// Writing to the sink failed.
    #[error("Failed to write output: {0}")]
    Io(#[from] io::Error),

    /// A record could not be serialized.
    #[error("Failed to serialize issue: {0}")]
    Json(#[from] serde_json::Error),

    /// The writer stopped before all records were sent.
    #[error("Output writer has shut down")]
    Closed,

    /// The writer thread panicked.
    #[error("Output writer panicked")]
    Panicked,
}

/// Handle used by producers to queue batches of issues.
#[derive(Debug, Clone)]
pub struct IssueSender(mpsc::Sender<Vec<Issue>>);

impl IssueSender {
    /// Queues a batch; records of one batch are written back to back.
    ///
    /// # Errors
    ///
    /// Returns [`OutputError::Closed`] if the writer has stopped.
    pub fn send(&self, batch: Vec<Issue>) -> Result<(), OutputError> {
        if batch.is_empty() {
            return Ok(());
        }
        self.0.send(batch).map_err(|_| OutputError::Closed)
    }
}

/// The single writer of the issue stream.
#[derive(Debug)]
pub struct IssueWriter<W> {
    sender: IssueSender,
    handle: JoinHandle<Result<W, OutputError>>,
}

impl<W: Write + Send + 'static> IssueWriter<W> {
    /// Starts the writer thread, which takes ownership of `sink`.
    ///
    /// # Errors
    ///
    /// Returns an error if the thread cannot be spawned.
    pub fn spawn(sink: W, framing: Framing) -> io::Result<Self> {
        let (tx, rx) = mpsc::channel::<Vec<Issue>>();
        let handle = thread::Builder::new()
            .name("issue-writer".to_string())
            .spawn(move || write_all(sink, &rx, framing))?;
        Ok(Self {
            sender: IssueSender(tx),
            handle,
        })
    }

    /// Returns a new producer handle.
    #[must_use]
    pub fn sender(&self) -> IssueSender {
        self.sender.clone()
    }

    /// Waits until every queued record is written, flushes the sink and
    /// returns it.
    ///
    /// All senders handed out must be dropped first, or this blocks.
    ///
    /// # Errors
    ///
    /// Returns the first write or serialization error of the writer.
    pub fn finish(self) -> Result<W, OutputError> {
        drop(self.sender);
        self.handle.join().map_err(|_| OutputError::Panicked)?
    }
}

fn write_all<W: Write>(
    mut sink: W,
    rx: &mpsc::Receiver<Vec<Issue>>,
    framing: Framing,
) -> Result<W, OutputError> {
    let mut written = 0usize;
    for batch in rx {
        for issue in batch {
            let mut record = issue.to_json()?;
            record.extend_from_slice(framing.terminator());
            sink.write_all(&record)?;
            written += 1;
        }
    }
    sink.flush()?;
    tracing::debug!("Wrote {written} issue(s)");
    Ok(sink)
}

/// Human-readable reporter used in debug mode.
#[derive(Debug)]
pub struct XcodeReporter<W> {
    sink: W,
}

impl<W: Write> XcodeReporter<W> {
    /// Creates a reporter writing to `sink`.
    pub fn new(sink: W) -> Self {
        Self { sink }
    }

    /// Writes one line per violation.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails.
    pub fn report(&mut self, violations: &[Violation]) -> io::Result<()> {
        for violation in violations {
            writeln!(self.sink, "{}", violation.format_xcode())?;
        }
        Ok(())
    }

    /// Flushes and returns the sink.
    ///
    /// # Errors
    ///
    /// Returns an error if flushing fails.
    pub fn into_inner(mut self) -> io::Result<W> {
        self.sink.flush()?;
        Ok(self.sink)
    }
}

/// Summary line printed at the end of a debug run.
#[must_use]
pub fn summary_line(violations: usize) -> String {
    format!("Done linting! Found {violations} violations")
}
