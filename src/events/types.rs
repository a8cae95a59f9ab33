use serde::{Deserialize, Serialize};

/// Input device an event originated from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Device {
    Keyboard,
    Mouse,
}

/// A raw input observation from the capture layer.
///
/// Events arrive as newline-delimited JSON with `device` and `type`
/// discriminators and a `ts` field in wall-clock seconds. Callers feed them
/// to the compressor in non-decreasing timestamp order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "device", rename_all = "lowercase")]
pub enum RawEvent {
    Keyboard(KeyboardEvent),
    Mouse(MouseEvent),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyboardEvent {
    pub ts: f64,
    #[serde(flatten)]
    pub action: KeyboardAction,
}

/// Key names follow the capture layer's convention: printable keys are the
/// literal character ("a", "$"), named keys carry a "Key." prefix
/// ("Key.space", "Key.ctrl").
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum KeyboardAction {
    Press { key: String },
    Release { key: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MouseEvent {
    pub ts: f64,
    #[serde(flatten)]
    pub action: MouseAction,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum MouseAction {
    /// One half of a button press/release pair (`pressed` distinguishes them).
    Click {
        x: f64,
        y: f64,
        button: String,
        pressed: bool,
    },
    Move {
        x: f64,
        y: f64,
    },
    Scroll {
        x: f64,
        y: f64,
        dx: i64,
        dy: i64,
    },
}

impl RawEvent {
    pub fn key_press(ts: f64, key: impl Into<String>) -> Self {
        RawEvent::Keyboard(KeyboardEvent {
            ts,
            action: KeyboardAction::Press { key: key.into() },
        })
    }

    pub fn key_release(ts: f64, key: impl Into<String>) -> Self {
        RawEvent::Keyboard(KeyboardEvent {
            ts,
            action: KeyboardAction::Release { key: key.into() },
        })
    }

    pub fn mouse_button(ts: f64, x: f64, y: f64, button: impl Into<String>, pressed: bool) -> Self {
        RawEvent::Mouse(MouseEvent {
            ts,
            action: MouseAction::Click {
                x,
                y,
                button: button.into(),
                pressed,
            },
        })
    }

    pub fn mouse_move(ts: f64, x: f64, y: f64) -> Self {
        RawEvent::Mouse(MouseEvent {
            ts,
            action: MouseAction::Move { x, y },
        })
    }

    pub fn mouse_scroll(ts: f64, x: f64, y: f64, dx: i64, dy: i64) -> Self {
        RawEvent::Mouse(MouseEvent {
            ts,
            action: MouseAction::Scroll { x, y, dx, dy },
        })
    }

    pub fn ts(&self) -> f64 {
        match self {
            RawEvent::Keyboard(e) => e.ts,
            RawEvent::Mouse(e) => e.ts,
        }
    }

    pub(crate) fn set_ts(&mut self, ts: f64) {
        match self {
            RawEvent::Keyboard(e) => e.ts = ts,
            RawEvent::Mouse(e) => e.ts = ts,
        }
    }

    pub fn device(&self) -> Device {
        match self {
            RawEvent::Keyboard(_) => Device::Keyboard,
            RawEvent::Mouse(_) => Device::Mouse,
        }
    }
}

impl KeyboardEvent {
    pub fn key(&self) -> &str {
        match &self.action {
            KeyboardAction::Press { key } | KeyboardAction::Release { key } => key,
        }
    }
}

/// A compressed output record.
///
/// Either a semantically classified record or a raw event passed through
/// unchanged because it could not be paired or classified. The raw variant
/// serializes identically to the input record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CompressedEvent {
    Semantic(SemanticEvent),
    Raw(RawEvent),
}

/// A semantically classified span of input activity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SemanticEvent {
    /// A single press/release pair of a non-character key.
    KeyClick {
        ts: f64,
        device: Device,
        key: String,
        duration: f64,
    },
    /// A run of character key-clicks merged into one string.
    TypedString {
        ts: f64,
        device: Device,
        string: String,
        duration: f64,
        num_chars: usize,
    },
    /// A button press/release pair, stamped with the release coordinates.
    MouseClick {
        ts: f64,
        device: Device,
        x: f64,
        y: f64,
        button: String,
        duration: f64,
    },
    /// A continuous mouse gesture collapsed to its endpoints.
    CondensedMove {
        ts: f64,
        device: Device,
        start_x: f64,
        start_y: f64,
        end_x: f64,
        end_y: f64,
        duration: f64,
        num_moves: usize,
    },
    /// A scroll gesture with deltas summed across all samples.
    CondensedScroll {
        ts: f64,
        device: Device,
        total_dx: i64,
        total_dy: i64,
        duration: f64,
        num_scrolls: usize,
    },
}

impl SemanticEvent {
    pub fn key_click(ts: f64, key: String, duration: f64) -> Self {
        SemanticEvent::KeyClick {
            ts,
            device: Device::Keyboard,
            key,
            duration,
        }
    }

    pub fn typed_string(ts: f64, string: String, duration: f64, num_chars: usize) -> Self {
        SemanticEvent::TypedString {
            ts,
            device: Device::Keyboard,
            string,
            duration,
            num_chars,
        }
    }

    pub fn mouse_click(ts: f64, x: f64, y: f64, button: String, duration: f64) -> Self {
        SemanticEvent::MouseClick {
            ts,
            device: Device::Mouse,
            x,
            y,
            button,
            duration,
        }
    }

    pub fn condensed_move(
        ts: f64,
        start_x: f64,
        start_y: f64,
        end_x: f64,
        end_y: f64,
        duration: f64,
        num_moves: usize,
    ) -> Self {
        SemanticEvent::CondensedMove {
            ts,
            device: Device::Mouse,
            start_x,
            start_y,
            end_x,
            end_y,
            duration,
            num_moves,
        }
    }

    pub fn condensed_scroll(
        ts: f64,
        total_dx: i64,
        total_dy: i64,
        duration: f64,
        num_scrolls: usize,
    ) -> Self {
        SemanticEvent::CondensedScroll {
            ts,
            device: Device::Mouse,
            total_dx,
            total_dy,
            duration,
            num_scrolls,
        }
    }
}

/// Whether a key representation is a printable character or the space key.
///
/// Named keys other than "Key.space" (modifiers, arrows, enter, ...) are not
/// characters; anything without the "Key." prefix is assumed printable.
pub fn is_char_key(key: &str) -> bool {
    if key.is_empty() {
        return false;
    }
    if key.starts_with("Key.") {
        key == "Key.space"
    } else {
        true
    }
}

/// The character a key contributes to a typed string ("Key.space" maps to a
/// literal space).
pub fn to_char(key: &str) -> &str {
    if key == "Key.space" {
        " "
    } else {
        key
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_keyboard_press_wire_format() {
        let event = RawEvent::key_press(12.5, "a");
        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(
            value,
            json!({"device": "keyboard", "type": "press", "ts": 12.5, "key": "a"})
        );
    }

    #[test]
    fn test_mouse_scroll_wire_format() {
        let event = RawEvent::mouse_scroll(3.25, 100.0, 200.0, 0, -2);
        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(
            value,
            json!({
                "device": "mouse", "type": "scroll",
                "ts": 3.25, "x": 100.0, "y": 200.0, "dx": 0, "dy": -2
            })
        );
    }

    #[test]
    fn test_raw_event_parses_from_capture_json() {
        let event: RawEvent = serde_json::from_str(
            r#"{"ts": 1.5, "device": "mouse", "type": "click", "x": 10.0, "y": 20.0, "button": "left", "pressed": true}"#,
        )
        .unwrap();
        assert_eq!(event, RawEvent::mouse_button(1.5, 10.0, 20.0, "left", true));
    }

    #[test]
    fn test_typed_string_wire_format() {
        let event = SemanticEvent::typed_string(5.0, "hi".to_string(), 0.3, 2);
        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(
            value,
            json!({
                "type": "typed_string", "ts": 5.0, "device": "keyboard",
                "string": "hi", "duration": 0.3, "num_chars": 2
            })
        );
    }

    #[test]
    fn test_compressed_event_raw_passthrough_is_transparent() {
        let raw = RawEvent::key_release(2.0, "Key.shift");
        let passthrough = CompressedEvent::Raw(raw.clone());
        assert_eq!(
            serde_json::to_value(&passthrough).unwrap(),
            serde_json::to_value(&raw).unwrap()
        );
    }

    #[test]
    fn test_compressed_event_deserializes_by_type() {
        let semantic: CompressedEvent = serde_json::from_str(
            r#"{"ts": 1.0, "device": "keyboard", "type": "key_click", "key": "Key.enter", "duration": 0.1}"#,
        )
        .unwrap();
        assert!(matches!(semantic, CompressedEvent::Semantic(_)));

        let raw: CompressedEvent = serde_json::from_str(
            r#"{"ts": 1.0, "device": "keyboard", "type": "press", "key": "a"}"#,
        )
        .unwrap();
        assert!(matches!(raw, CompressedEvent::Raw(_)));
    }

    #[test]
    fn test_is_char_key() {
        assert!(is_char_key("a"));
        assert!(is_char_key("$"));
        assert!(is_char_key("Key.space"));
        assert!(!is_char_key("Key.ctrl"));
        assert!(!is_char_key("Key.enter"));
        assert!(!is_char_key(""));
    }

    #[test]
    fn test_to_char_maps_space() {
        assert_eq!(to_char("Key.space"), " ");
        assert_eq!(to_char("x"), "x");
    }
}
