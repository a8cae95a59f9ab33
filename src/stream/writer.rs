//! Newline-delimited JSON event writer

use crate::events::CompressedEvent;
use crate::stream::{EventSink, StreamResult};
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::Path;

/// Buffered writer emitting one JSON record per line.
///
/// Records are written in emission order and never rewritten; call
/// [`finish`](Self::finish) (or let the writer drop) to flush buffered lines.
pub struct JsonlWriter<W: Write> {
    out: BufWriter<W>,
}

impl JsonlWriter<File> {
    /// Create (or truncate) an output file.
    pub fn create(path: impl AsRef<Path>) -> StreamResult<Self> {
        Ok(Self::new(File::create(path)?))
    }

    /// Open a log for appending, creating it if missing.
    pub fn append(path: impl AsRef<Path>) -> StreamResult<Self> {
        let file = OpenOptions::new().append(true).create(true).open(path)?;
        Ok(Self::new(file))
    }
}

impl<W: Write> JsonlWriter<W> {
    pub fn new(inner: W) -> Self {
        Self {
            out: BufWriter::new(inner),
        }
    }

    /// Flush buffered records to the underlying writer.
    pub fn finish(mut self) -> StreamResult<()> {
        self.out.flush()?;
        Ok(())
    }

    /// Flush and return the underlying writer.
    pub fn into_inner(self) -> StreamResult<W> {
        self.out.into_inner().map_err(|e| e.into_error().into())
    }
}

impl<W: Write> EventSink for JsonlWriter<W> {
    fn write_event(&mut self, event: &CompressedEvent) -> StreamResult<()> {
        serde_json::to_writer(&mut self.out, event)?;
        self.out.write_all(b"\n")?;
        Ok(())
    }
}
