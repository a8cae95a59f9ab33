//! Raw and compressed input-event model
//!
//! Defines the typed event records exchanged with capture producers (raw
//! mouse/keyboard observations) and downstream consumers (semantically
//! classified records), plus the key-classification helpers shared with the
//! compression engine.

pub mod types;

pub use types::{
    is_char_key, to_char, CompressedEvent, Device, KeyboardAction, KeyboardEvent, MouseAction,
    MouseEvent, RawEvent, SemanticEvent,
};
