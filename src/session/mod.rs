//! Single-consumer compression sessions
//!
//! Capture producers run concurrently, but the compressor's buffer and
//! timeout decisions require strictly chronological processing. A session
//! funnels every producer through one bounded channel and drains it from a
//! single task, so the engine itself never needs synchronization. Producers
//! are responsible for handing over events in non-decreasing timestamp
//! order.

use crate::events::RawEvent;
use crate::processing::EventCompressor;
use crate::stream::{EventSink, JsonlReader, StreamError};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::sync::mpsc;
use uuid::Uuid;

/// Default bound on the producer-to-compressor channel.
const DEFAULT_CHANNEL_CAPACITY: usize = 1024;

/// Errors that can occur while running a compression session
#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Stream error: {0}")]
    Stream(#[from] StreamError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Event channel closed before the source finished")]
    ChannelClosed,

    #[error("Source error: {0}")]
    Source(String),
}

/// Result type for session operations
pub type SessionResult<T> = Result<T, SessionError>;

/// Sending half of the session's event channel, handed to each source.
pub type RawEventSender = mpsc::Sender<RawEvent>;

/// What a source did over its lifetime.
#[derive(Debug, Clone, Copy, Default)]
pub struct SourceReport {
    pub events_sent: u64,
    pub lines_skipped: u64,
}

/// A capture-side producer of raw input events.
///
/// Sources run to completion, pushing events into the session channel. The
/// session ends once every source has finished and the channel drains.
#[async_trait]
pub trait EventSource: Send {
    fn id(&self) -> &str;

    async fn run(self: Box<Self>, events: RawEventSender) -> SessionResult<SourceReport>;
}

/// Replays a recorded raw-event log (newline-delimited JSON) into the
/// session, skipping malformed lines with a warning.
pub struct JsonlFileSource {
    id: String,
    path: PathBuf,
}

impl JsonlFileSource {
    pub fn new(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();
        Self {
            id: format!("jsonl:{}", path.display()),
            path,
        }
    }
}

#[async_trait]
impl EventSource for JsonlFileSource {
    fn id(&self) -> &str {
        &self.id
    }

    async fn run(self: Box<Self>, events: RawEventSender) -> SessionResult<SourceReport> {
        let path = self.path;
        // File parsing is blocking work; keep it off the async workers.
        let report = tokio::task::spawn_blocking(move || -> SessionResult<SourceReport> {
            let reader = JsonlReader::open(&path)?;
            let mut report = SourceReport::default();

            for item in reader {
                match item {
                    Ok(event) => {
                        events
                            .blocking_send(event)
                            .map_err(|_| SessionError::ChannelClosed)?;
                        report.events_sent += 1;
                    }
                    Err(StreamError::Parse { line, source }) => {
                        tracing::warn!(path = %path.display(), line, error = %source, "skipping malformed event line");
                        report.lines_skipped += 1;
                    }
                    Err(e) => return Err(e.into()),
                }
            }

            Ok(report)
        })
        .await
        .map_err(|e| SessionError::Source(format!("source task failed: {e}")))??;

        Ok(report)
    }
}

/// Summary of a finished compression session.
#[derive(Debug, Clone)]
pub struct SessionSummary {
    pub id: Uuid,
    pub started_at: DateTime<Utc>,
    pub events_in: u64,
    pub events_out: u64,
    pub lines_skipped: u64,
}

/// Drives one compressor over the merged output of a set of event sources.
pub struct CompressionSession<S: EventSink> {
    id: Uuid,
    compressor: EventCompressor<S>,
    channel_capacity: usize,
}

impl<S: EventSink> CompressionSession<S> {
    pub fn new(compressor: EventCompressor<S>) -> Self {
        Self {
            id: Uuid::new_v4(),
            compressor,
            channel_capacity: DEFAULT_CHANNEL_CAPACITY,
        }
    }

    pub fn with_channel_capacity(mut self, capacity: usize) -> Self {
        self.channel_capacity = capacity;
        self
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Run every source to completion, compress the merged feed, and
    /// finalize. Returns the sink and the session summary.
    pub async fn run(
        mut self,
        sources: Vec<Box<dyn EventSource>>,
    ) -> SessionResult<(S, SessionSummary)> {
        let started_at = Utc::now();
        let (tx, mut rx) = mpsc::channel(self.channel_capacity);

        tracing::info!(
            session = %self.id,
            sources = sources.len(),
            "compression session started"
        );

        let mut handles = Vec::with_capacity(sources.len());
        for source in sources {
            let source_id = source.id().to_string();
            handles.push((source_id, tokio::spawn(source.run(tx.clone()))));
        }
        drop(tx);

        // The single consumer: strictly sequential with respect to arrival
        // order, as the compressor requires.
        while let Some(event) = rx.recv().await {
            self.compressor.process(event)?;
        }

        let mut lines_skipped = 0;
        for (source_id, handle) in handles {
            match handle.await {
                Ok(Ok(report)) => lines_skipped += report.lines_skipped,
                Ok(Err(e)) => return Err(e),
                Err(e) => {
                    return Err(SessionError::Source(format!(
                        "source {source_id} panicked: {e}"
                    )))
                }
            }
        }

        let (sink, report) = self.compressor.finalize()?;
        let summary = SessionSummary {
            id: self.id,
            started_at,
            events_in: report.events_in,
            events_out: report.events_out,
            lines_skipped,
        };

        tracing::info!(
            session = %summary.id,
            events_in = summary.events_in,
            events_out = summary.events_out,
            lines_skipped = summary.lines_skipped,
            "compression session finished"
        );
        Ok((sink, summary))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{CompressedEvent, SemanticEvent};
    use crate::processing::CompressorConfig;
    use std::io::Write;

    fn session() -> CompressionSession<Vec<CompressedEvent>> {
        CompressionSession::new(EventCompressor::new(CompressorConfig::default(), Vec::new()))
    }

    #[tokio::test]
    async fn test_file_source_drives_compression() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("raw.jsonl");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(
            file,
            r#"{{"ts": 0.0, "device": "keyboard", "type": "press", "key": "h"}}"#
        )
        .unwrap();
        writeln!(
            file,
            r#"{{"ts": 0.02, "device": "keyboard", "type": "release", "key": "h"}}"#
        )
        .unwrap();
        writeln!(
            file,
            r#"{{"ts": 0.05, "device": "keyboard", "type": "press", "key": "i"}}"#
        )
        .unwrap();
        writeln!(
            file,
            r#"{{"ts": 0.07, "device": "keyboard", "type": "release", "key": "i"}}"#
        )
        .unwrap();

        let (output, summary) = session()
            .run(vec![Box::new(JsonlFileSource::new(&path))])
            .await
            .unwrap();

        assert_eq!(summary.events_in, 4);
        assert_eq!(summary.events_out, 1);
        assert_eq!(summary.lines_skipped, 0);
        assert!(matches!(
            &output[0],
            CompressedEvent::Semantic(SemanticEvent::TypedString { string, .. }) if string == "hi"
        ));
    }

    #[tokio::test]
    async fn test_malformed_lines_are_skipped_and_counted() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("raw.jsonl");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(
            file,
            r#"{{"ts": 0.0, "device": "keyboard", "type": "release", "key": "a"}}"#
        )
        .unwrap();
        writeln!(file, "{{ definitely not an event").unwrap();
        writeln!(
            file,
            r#"{{"ts": 0.5, "device": "mouse", "type": "move", "x": 1.0, "y": 2.0}}"#
        )
        .unwrap();

        let (output, summary) = session()
            .run(vec![Box::new(JsonlFileSource::new(&path))])
            .await
            .unwrap();

        assert_eq!(summary.events_in, 2);
        assert_eq!(summary.lines_skipped, 1);
        // Orphan release passes through, move run flushes at finalize.
        assert_eq!(output.len(), 2);
    }

    #[tokio::test]
    async fn test_missing_input_file_fails() {
        let result = session()
            .run(vec![Box::new(JsonlFileSource::new("/nonexistent/raw.jsonl"))])
            .await;
        assert!(result.is_err());
    }
}
