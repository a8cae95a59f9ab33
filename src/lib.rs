//! Open ScreenTrace - Semantic compression of screen-activity input streams.
//!
//! Capture collaborators log raw mouse and keyboard events as
//! newline-delimited JSON; this crate pairs presses with releases, merges
//! typing into strings, condenses mouse gestures, and writes a compact
//! semantic event stream for downstream summarization.

pub mod events;
pub mod processing;
pub mod session;
pub mod stream;

pub use events::{CompressedEvent, RawEvent, SemanticEvent};
pub use processing::{CompressorConfig, CompressorReport, EventCompressor};
pub use session::{CompressionSession, EventSource, JsonlFileSource, SessionError, SessionSummary};
pub use stream::{EventSink, JsonlReader, JsonlWriter, StreamError};

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize tracing/logging for binaries embedding the library.
pub fn init_logging() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "open_screentrace=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}
