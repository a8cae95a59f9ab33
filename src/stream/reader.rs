//! Newline-delimited JSON event reader

use crate::events::RawEvent;
use crate::stream::{StreamError, StreamResult};
use std::fs::File;
use std::io::{BufRead, BufReader, Lines};
use std::path::Path;

/// Iterator over raw events in a newline-delimited JSON log.
///
/// Blank lines are skipped. Malformed lines yield a
/// [`StreamError::Parse`] carrying the 1-based line number, leaving the
/// caller to decide whether to skip or abort.
pub struct JsonlReader<R: BufRead> {
    lines: Lines<R>,
    line: usize,
}

impl JsonlReader<BufReader<File>> {
    pub fn open(path: impl AsRef<Path>) -> StreamResult<Self> {
        Ok(Self::new(BufReader::new(File::open(path)?)))
    }
}

impl<R: BufRead> JsonlReader<R> {
    pub fn new(inner: R) -> Self {
        Self {
            lines: inner.lines(),
            line: 0,
        }
    }
}

impl<R: BufRead> Iterator for JsonlReader<R> {
    type Item = StreamResult<RawEvent>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let line = match self.lines.next()? {
                Ok(line) => line,
                Err(e) => return Some(Err(e.into())),
            };
            self.line += 1;

            if line.trim().is_empty() {
                continue;
            }

            return Some(serde_json::from_str(&line).map_err(|source| StreamError::Parse {
                line: self.line,
                source,
            }));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_reads_events_and_skips_blank_lines() {
        let input = concat!(
            r#"{"ts": 1.0, "device": "keyboard", "type": "press", "key": "a"}"#,
            "\n\n",
            r#"{"ts": 1.1, "device": "mouse", "type": "move", "x": 3.0, "y": 4.0}"#,
            "\n",
        );

        let events: Vec<RawEvent> = JsonlReader::new(Cursor::new(input))
            .collect::<StreamResult<_>>()
            .unwrap();
        assert_eq!(
            events,
            vec![
                RawEvent::key_press(1.0, "a"),
                RawEvent::mouse_move(1.1, 3.0, 4.0),
            ]
        );
    }

    #[test]
    fn test_malformed_line_reports_line_number() {
        let input = concat!(
            r#"{"ts": 1.0, "device": "keyboard", "type": "press", "key": "a"}"#,
            "\n",
            "not json\n",
            r#"{"ts": 2.0, "device": "keyboard", "type": "release", "key": "a"}"#,
            "\n",
        );

        let mut reader = JsonlReader::new(Cursor::new(input));
        assert!(reader.next().unwrap().is_ok());
        match reader.next().unwrap() {
            Err(StreamError::Parse { line, .. }) => assert_eq!(line, 2),
            other => panic!("expected parse error, got {other:?}"),
        }
        // The reader recovers on the next line.
        assert!(reader.next().unwrap().is_ok());
        assert!(reader.next().is_none());
    }

    #[test]
    fn test_round_trip_through_file() {
        use crate::events::CompressedEvent;
        use crate::stream::{EventSink, JsonlWriter};

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("raw.jsonl");

        let events = vec![
            RawEvent::key_press(1.0, "a"),
            RawEvent::mouse_scroll(1.5, 10.0, 20.0, 0, -3),
        ];
        let mut writer = JsonlWriter::create(&path).unwrap();
        for event in &events {
            writer
                .write_event(&CompressedEvent::Raw(event.clone()))
                .unwrap();
        }
        writer.finish().unwrap();

        let read: Vec<RawEvent> = JsonlReader::open(&path)
            .unwrap()
            .collect::<StreamResult<_>>()
            .unwrap();
        assert_eq!(read, events);
    }
}
