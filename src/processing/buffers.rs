//! Rolling-run state for in-progress merges
//!
//! Each run kind is a plain value type that accumulates samples and converts
//! into exactly one semantic record when flushed. The compressor owns at most
//! one run of each kind at a time.

use crate::events::SemanticEvent;
use crate::processing::round5;

/// An in-progress run of character key-clicks forming one typed string.
#[derive(Debug, Clone)]
pub struct TypedRun {
    string: String,
    num_chars: usize,
    start_ts: f64,
    last_press_ts: f64,
    last_duration: f64,
}

impl TypedRun {
    pub fn start(ch: &str, press_ts: f64, duration: f64) -> Self {
        Self {
            string: ch.to_string(),
            num_chars: 1,
            start_ts: press_ts,
            last_press_ts: press_ts,
            last_duration: duration,
        }
    }

    pub fn append(&mut self, ch: &str, press_ts: f64, duration: f64) {
        self.string.push_str(ch);
        self.num_chars += 1;
        self.last_press_ts = press_ts;
        self.last_duration = duration;
    }

    /// Press timestamp of the most recently appended character, used for the
    /// inter-key gap check.
    pub fn last_press_ts(&self) -> f64 {
        self.last_press_ts
    }

    /// The span runs from the first press to the end of the last release.
    pub fn into_event(self) -> SemanticEvent {
        let end_ts = self.last_press_ts + self.last_duration;
        SemanticEvent::typed_string(
            self.start_ts,
            self.string,
            round5(end_ts - self.start_ts),
            self.num_chars,
        )
    }
}

/// A continuous mouse gesture, collapsed to its endpoints and a sample count.
#[derive(Debug, Clone)]
pub struct MoveRun {
    start_x: f64,
    start_y: f64,
    start_ts: f64,
    end_x: f64,
    end_y: f64,
    end_ts: f64,
    num_moves: usize,
}

impl MoveRun {
    pub fn start(x: f64, y: f64, ts: f64) -> Self {
        Self {
            start_x: x,
            start_y: y,
            start_ts: ts,
            end_x: x,
            end_y: y,
            end_ts: ts,
            num_moves: 1,
        }
    }

    pub fn extend(&mut self, x: f64, y: f64, ts: f64) {
        self.end_x = x;
        self.end_y = y;
        self.end_ts = ts;
        self.num_moves += 1;
    }

    pub fn end_ts(&self) -> f64 {
        self.end_ts
    }

    pub fn into_event(self) -> SemanticEvent {
        SemanticEvent::condensed_move(
            self.start_ts,
            self.start_x,
            self.start_y,
            self.end_x,
            self.end_y,
            round5(self.end_ts - self.start_ts),
            self.num_moves,
        )
    }
}

/// A scroll gesture with deltas summed across all buffered samples.
#[derive(Debug, Clone)]
pub struct ScrollRun {
    start_ts: f64,
    end_ts: f64,
    total_dx: i64,
    total_dy: i64,
    num_scrolls: usize,
}

impl ScrollRun {
    pub fn start(dx: i64, dy: i64, ts: f64) -> Self {
        Self {
            start_ts: ts,
            end_ts: ts,
            total_dx: dx,
            total_dy: dy,
            num_scrolls: 1,
        }
    }

    pub fn extend(&mut self, dx: i64, dy: i64, ts: f64) {
        self.total_dx += dx;
        self.total_dy += dy;
        self.end_ts = ts;
        self.num_scrolls += 1;
    }

    pub fn end_ts(&self) -> f64 {
        self.end_ts
    }

    pub fn into_event(self) -> SemanticEvent {
        SemanticEvent::condensed_scroll(
            self.start_ts,
            self.total_dx,
            self.total_dy,
            round5(self.end_ts - self.start_ts),
            self.num_scrolls,
        )
    }
}
