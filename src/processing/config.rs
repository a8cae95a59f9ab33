use serde::{Deserialize, Serialize};

/// Timing thresholds governing when raw events merge into one record, all in
/// seconds.
///
/// Historically these values drifted between capture revisions, so they are
/// configuration rather than constants. The defaults are the values the
/// compressor shipped with; loading a partial JSON document fills the rest
/// from the defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CompressorConfig {
    /// Max press-to-release gap for a keyboard `key_click`.
    pub key_click_max_delta: f64,
    /// Max press-to-release gap for a `mouse_click`.
    pub mouse_click_max_delta: f64,
    /// Max gap between consecutive character-key presses in one
    /// `typed_string` run.
    pub typing_max_interkey_delta: f64,
    /// Max gap between consecutive move/scroll samples in one gesture run.
    pub mouse_sequence_max_delta: f64,
}

impl Default for CompressorConfig {
    fn default() -> Self {
        Self {
            key_click_max_delta: 0.7,
            mouse_click_max_delta: 0.7,
            typing_max_interkey_delta: 1.0,
            mouse_sequence_max_delta: 0.5,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_thresholds() {
        let config = CompressorConfig::default();
        assert_eq!(config.key_click_max_delta, 0.7);
        assert_eq!(config.mouse_click_max_delta, 0.7);
        assert_eq!(config.typing_max_interkey_delta, 1.0);
        assert_eq!(config.mouse_sequence_max_delta, 0.5);
    }

    #[test]
    fn test_partial_config_fills_defaults() {
        let config: CompressorConfig =
            serde_json::from_str(r#"{"typing_max_interkey_delta": 0.1}"#).unwrap();
        assert_eq!(config.typing_max_interkey_delta, 0.1);
        assert_eq!(config.key_click_max_delta, 0.7);
        assert_eq!(config.mouse_sequence_max_delta, 0.5);
    }
}
