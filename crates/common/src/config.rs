//! Channel configuration structs.
//!
//! The surrounding shell loads and parses configuration files; the core
//! only consumes these already-validated structs.

use serde::{Deserialize, Serialize};

use crate::format::VideoFormat;

/// Configuration for one output channel.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelConfig {
    /// Video mode the channel runs in.
    pub video_mode: VideoFormat,
    /// Optional human-readable label for diagnostics.
    #[serde(default)]
    pub label: Option<String>,
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            video_mode: VideoFormat::Pal,
            label: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_pal() {
        assert_eq!(ChannelConfig::default().video_mode, VideoFormat::Pal);
    }

    #[test]
    fn serialize_deserialize_roundtrip() {
        let config = ChannelConfig {
            video_mode: VideoFormat::Hd1080p50,
            label: Some("program".into()),
        };
        let json = serde_json::to_string(&config).unwrap();
        let restored: ChannelConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, config);
    }

    #[test]
    fn label_defaults_when_missing() {
        let config: ChannelConfig = serde_json::from_str(r#"{"video_mode":"Pal"}"#).unwrap();
        assert_eq!(config.video_mode, VideoFormat::Pal);
        assert!(config.label.is_none());
    }
}
