//! Persisted config schema.
//!
//! The TOML file is hand-editable; every section has a working default.
//! Sections are singletons — the range has exactly one shooter, so there is
//! never more than one controller, and one web server is plenty.

use serde::{Deserialize, Serialize};

/// Top-level persisted config.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeadeyeConfig {
    #[serde(default)]
    pub controller: ControllerSection,
    /// When present, replaces the UDP controller with a synthetic one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mock_controller: Option<MockControllerSection>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub webserver: Option<WebserverSection>,
    #[serde(default)]
    pub board: BoardSection,
}

/// The UDP motion/trigger controller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControllerSection {
    #[serde(default)]
    pub name: String,
    pub bind: String,
}

impl Default for ControllerSection {
    fn default() -> Self {
        Self {
            name: "Motion Controller".into(),
            bind: "0.0.0.0:5006".into(),
        }
    }
}

/// A synthetic controller that pulls the trigger on a fixed cadence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MockControllerSection {
    #[serde(default)]
    pub name: String,
    /// Seconds between synthetic trigger pulls.
    #[serde(default = "default_pulse_secs")]
    pub pulse_secs: u64,
}

fn default_pulse_secs() -> u64 {
    2
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebserverSection {
    #[serde(default)]
    pub name: String,
    pub bind: String,
}

/// Target board and scoring parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoardSection {
    /// Intensity field resolution (the field is `field_size` x `field_size`).
    pub field_size: usize,
    /// Per-cell intensity ceiling.
    pub max_intensity: f32,
    /// Score for a dead-center hit.
    pub max_score: f64,
    /// How fast the impact footprint widens with local hit density.
    pub spread_growth: f64,
}

impl Default for BoardSection {
    fn default() -> Self {
        Self {
            field_size: 256,
            max_intensity: 30.0,
            max_score: 10.0,
            spread_growth: 1.5,
        }
    }
}

impl Default for DeadeyeConfig {
    /// Known good defaults: the controller on the stock port and a local
    /// web server for sinks.
    fn default() -> Self {
        Self {
            controller: ControllerSection::default(),
            mock_controller: None,
            webserver: Some(WebserverSection {
                name: "Web Server".into(),
                bind: "127.0.0.1:3030".into(),
            }),
            board: BoardSection::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_round_trips() {
        let config = DeadeyeConfig::default();
        let text = serde_json::to_string(&config).unwrap();
        let back: DeadeyeConfig = serde_json::from_str(&text).unwrap();
        assert_eq!(back, config);
    }

    #[test]
    fn missing_sections_fall_back_to_defaults() {
        let config: DeadeyeConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config.controller.bind, "0.0.0.0:5006");
        assert_eq!(config.board.field_size, 256);
        assert!(config.mock_controller.is_none());
        assert!(config.webserver.is_none());
    }

    #[test]
    fn mock_controller_defaults_pulse_cadence() {
        let config: DeadeyeConfig =
            serde_json::from_str(r#"{"mock_controller":{"name":"Bench"}}"#).unwrap();
        assert_eq!(config.mock_controller.unwrap().pulse_secs, 2);
    }
}
