//! Event stream I/O
//!
//! Newline-delimited JSON transport for the raw-event input contract and the
//! compressed-event output contract, plus the sink seam the compressor emits
//! through.

pub mod reader;
pub mod writer;

pub use reader::JsonlReader;
pub use writer::JsonlWriter;

use crate::events::CompressedEvent;
use thiserror::Error;

/// Errors that can occur reading or writing an event stream.
#[derive(Error, Debug)]
pub enum StreamError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Malformed event at line {line}: {source}")]
    Parse {
        line: usize,
        #[source]
        source: serde_json::Error,
    },
}

/// Result type for stream operations
pub type StreamResult<T> = Result<T, StreamError>;

/// An append-only, order-preserving destination for compressed events.
pub trait EventSink {
    fn write_event(&mut self, event: &CompressedEvent) -> StreamResult<()>;
}

/// In-memory sink, mainly for tests and buffered post-processing.
impl EventSink for Vec<CompressedEvent> {
    fn write_event(&mut self, event: &CompressedEvent) -> StreamResult<()> {
        self.push(event.clone());
        Ok(())
    }
}
