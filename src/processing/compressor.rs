//! Streaming event compression
//!
//! `EventCompressor` is a synchronous state machine driven by one call per
//! raw input event. It pairs presses with releases, merges character
//! key-clicks into typed strings, condenses mouse gestures, and passes
//! through whatever it cannot classify. Emission order preserves causality:
//! a run is always flushed before the record of the event that terminated it.

use crate::events::{
    is_char_key, to_char, CompressedEvent, KeyboardAction, MouseAction, RawEvent, SemanticEvent,
};
use crate::processing::buffers::{MoveRun, ScrollRun, TypedRun};
use crate::processing::config::CompressorConfig;
use crate::processing::round5;
use crate::stream::{EventSink, StreamResult};

/// Identity of an open press awaiting its release.
///
/// Mouse clicks are assumed stationary, so the identity pins the button to
/// its press position rounded to the nearest pixel.
#[derive(Debug, Clone, PartialEq, Eq)]
enum PendingId {
    Key(String),
    Button { button: String, x: i64, y: i64 },
}

fn button_id(button: &str, x: f64, y: f64) -> PendingId {
    PendingId::Button {
        button: button.to_string(),
        x: x.round() as i64,
        y: y.round() as i64,
    }
}

/// Event counts over one compression session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CompressorReport {
    /// Raw events accepted by `process`.
    pub events_in: u64,
    /// Compressed records written to the sink, final flush included.
    pub events_out: u64,
}

/// Streaming compressor over a chronological raw-event feed.
///
/// Feed events with [`process`](Self::process), then call
/// [`finalize`](Self::finalize) exactly once; `finalize` consumes the
/// compressor, so a second call cannot compile.
pub struct EventCompressor<S: EventSink> {
    config: CompressorConfig,
    sink: S,
    /// Open presses in insertion order; at most one per identity.
    pending: Vec<(PendingId, RawEvent)>,
    typed: Option<TypedRun>,
    moves: Option<MoveRun>,
    scrolls: Option<ScrollRun>,
    /// Highest timestamp seen; regressing inputs are clamped up to it.
    watermark: f64,
    report: CompressorReport,
}

impl<S: EventSink> EventCompressor<S> {
    pub fn new(config: CompressorConfig, sink: S) -> Self {
        Self {
            config,
            sink,
            pending: Vec::new(),
            typed: None,
            moves: None,
            scrolls: None,
            watermark: f64::NEG_INFINITY,
            report: CompressorReport::default(),
        }
    }

    pub fn report(&self) -> CompressorReport {
        self.report
    }

    /// Process one raw event, emitting zero or more compressed records.
    ///
    /// Any run the event does not continue is flushed first, then runs whose
    /// idle gap expired, then the event itself is classified.
    pub fn process(&mut self, mut event: RawEvent) -> StreamResult<()> {
        self.report.events_in += 1;

        let ts = event.ts();
        if ts < self.watermark {
            tracing::warn!(
                ts,
                watermark = self.watermark,
                "regressing event timestamp clamped"
            );
            event.set_ts(self.watermark);
        } else {
            self.watermark = ts;
        }

        self.flush_interrupted(&event)?;
        self.flush_expired(event.ts())?;

        match event {
            RawEvent::Keyboard(kb) => match kb.action {
                KeyboardAction::Press { ref key } => {
                    let id = PendingId::Key(key.clone());
                    self.track_press(id, RawEvent::Keyboard(kb))
                }
                KeyboardAction::Release { ref key } => {
                    let id = PendingId::Key(key.clone());
                    let Some(press) = self.take_pending(&id) else {
                        // Release without a preceding press; pass it through.
                        return self.emit_raw(RawEvent::Keyboard(kb));
                    };

                    let press_ts = press.ts();
                    let duration = round5(kb.ts - press_ts);
                    if duration > self.config.key_click_max_delta {
                        // Too slow for a click; both halves stand alone.
                        self.emit_raw(press)?;
                        return self.emit_raw(RawEvent::Keyboard(kb));
                    }

                    if is_char_key(key) {
                        self.push_typed(to_char(key), press_ts, duration)
                    } else {
                        self.flush_typed()?;
                        self.emit_semantic(SemanticEvent::key_click(press_ts, key.clone(), duration))
                    }
                }
            },
            RawEvent::Mouse(m) => match m.action {
                MouseAction::Click {
                    x,
                    y,
                    ref button,
                    pressed,
                } => {
                    let id = button_id(button, x, y);
                    if pressed {
                        self.track_press(id, RawEvent::Mouse(m))
                    } else {
                        let Some(press) = self.take_pending(&id) else {
                            return self.emit_raw(RawEvent::Mouse(m));
                        };

                        let duration = round5(m.ts - press.ts());
                        if duration > self.config.mouse_click_max_delta {
                            self.emit_raw(press)?;
                            return self.emit_raw(RawEvent::Mouse(m));
                        }

                        // Release coordinates stamp the click.
                        self.emit_semantic(SemanticEvent::mouse_click(
                            press.ts(),
                            x,
                            y,
                            button.clone(),
                            duration,
                        ))
                    }
                }
                MouseAction::Move { x, y } => {
                    if let Some(run) = self.moves.as_mut() {
                        if m.ts - run.end_ts() <= self.config.mouse_sequence_max_delta {
                            run.extend(x, y, m.ts);
                            return Ok(());
                        }
                        self.flush_moves()?;
                    }
                    self.moves = Some(MoveRun::start(x, y, m.ts));
                    Ok(())
                }
                MouseAction::Scroll { dx, dy, .. } => {
                    if let Some(run) = self.scrolls.as_mut() {
                        if m.ts - run.end_ts() <= self.config.mouse_sequence_max_delta {
                            run.extend(dx, dy, m.ts);
                            return Ok(());
                        }
                        self.flush_scrolls()?;
                    }
                    self.scrolls = Some(ScrollRun::start(dx, dy, m.ts));
                    Ok(())
                }
            },
        }
    }

    /// Flush all open runs (typed, move, scroll, in that order), then emit
    /// every still-pending press as a pass-through record in insertion order.
    ///
    /// Returns the sink and the final event counts.
    pub fn finalize(mut self) -> StreamResult<(S, CompressorReport)> {
        self.flush_typed()?;
        self.flush_moves()?;
        self.flush_scrolls()?;

        for (_, press) in std::mem::take(&mut self.pending) {
            self.report.events_out += 1;
            self.sink.write_event(&CompressedEvent::Raw(press))?;
        }

        Ok((self.sink, self.report))
    }

    /// Flush any run the incoming event is not a same-kind continuation of.
    fn flush_interrupted(&mut self, event: &RawEvent) -> StreamResult<()> {
        let char_key = matches!(event, RawEvent::Keyboard(kb) if is_char_key(kb.key()));
        if !char_key {
            self.flush_typed()?;
        }
        if !matches!(
            event,
            RawEvent::Mouse(m) if matches!(m.action, MouseAction::Move { .. })
        ) {
            self.flush_moves()?;
        }
        if !matches!(
            event,
            RawEvent::Mouse(m) if matches!(m.action, MouseAction::Scroll { .. })
        ) {
            self.flush_scrolls()?;
        }
        Ok(())
    }

    /// Flush runs whose idle gap has expired relative to `ts`.
    fn flush_expired(&mut self, ts: f64) -> StreamResult<()> {
        let typing_max = self.config.typing_max_interkey_delta;
        let sequence_max = self.config.mouse_sequence_max_delta;

        if self
            .typed
            .as_ref()
            .map_or(false, |run| ts - run.last_press_ts() > typing_max)
        {
            self.flush_typed()?;
        }
        if self
            .moves
            .as_ref()
            .map_or(false, |run| ts - run.end_ts() > sequence_max)
        {
            self.flush_moves()?;
        }
        if self
            .scrolls
            .as_ref()
            .map_or(false, |run| ts - run.end_ts() > sequence_max)
        {
            self.flush_scrolls()?;
        }
        Ok(())
    }

    /// Append a character click to the typed run, splitting the run first if
    /// the press-to-press gap exceeds the typing threshold.
    fn push_typed(&mut self, ch: &str, press_ts: f64, duration: f64) -> StreamResult<()> {
        if let Some(run) = self.typed.as_mut() {
            if press_ts - run.last_press_ts() <= self.config.typing_max_interkey_delta {
                run.append(ch, press_ts, duration);
                return Ok(());
            }
            self.flush_typed()?;
        }
        self.typed = Some(TypedRun::start(ch, press_ts, duration));
        Ok(())
    }

    /// Record an open press. A duplicate press for the same identity means
    /// the stream lost a release; the stale press is passed through first.
    fn track_press(&mut self, id: PendingId, event: RawEvent) -> StreamResult<()> {
        if let Some(stale) = self.take_pending(&id) {
            self.emit_raw(stale)?;
        }
        self.pending.push((id, event));
        Ok(())
    }

    fn take_pending(&mut self, id: &PendingId) -> Option<RawEvent> {
        let index = self.pending.iter().position(|(pending, _)| pending == id)?;
        Some(self.pending.remove(index).1)
    }

    fn flush_typed(&mut self) -> StreamResult<()> {
        if let Some(run) = self.typed.take() {
            self.emit_semantic(run.into_event())?;
        }
        Ok(())
    }

    fn flush_moves(&mut self) -> StreamResult<()> {
        if let Some(run) = self.moves.take() {
            self.emit_semantic(run.into_event())?;
        }
        Ok(())
    }

    fn flush_scrolls(&mut self) -> StreamResult<()> {
        if let Some(run) = self.scrolls.take() {
            self.emit_semantic(run.into_event())?;
        }
        Ok(())
    }

    fn emit_semantic(&mut self, event: SemanticEvent) -> StreamResult<()> {
        self.report.events_out += 1;
        self.sink.write_event(&CompressedEvent::Semantic(event))
    }

    fn emit_raw(&mut self, event: RawEvent) -> StreamResult<()> {
        self.report.events_out += 1;
        self.sink.write_event(&CompressedEvent::Raw(event))
    }
}
