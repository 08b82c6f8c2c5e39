//! Generation configuration parameters

use serde::{Deserialize, Serialize};

/// Parameters for controlling text generation
///
/// Every field is optional; unset fields are left to the provider's defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GenerationConfig {
    /// Maximum number of tokens to generate
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    /// Randomness (0.0-2.0, higher = more random)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    /// Nucleus sampling threshold
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f32>,
    /// Stop generation when these sequences are encountered
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stop: Option<Vec<String>>,
}

impl GenerationConfig {
    /// Create a configuration capped at `max_tokens`
    pub fn new(max_tokens: u32) -> Self {
        Self {
            max_tokens: Some(max_tokens),
            ..Default::default()
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn with_top_p(mut self, top_p: f32) -> Self {
        self.top_p = Some(top_p);
        self
    }

    pub fn with_stop(mut self, stop: Vec<String>) -> Self {
        self.stop = Some(stop);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_new() {
        let config = GenerationConfig::new(2048);
        assert_eq!(config.max_tokens, Some(2048));
        assert!(config.temperature.is_none());
        assert!(config.top_p.is_none());
        assert!(config.stop.is_none());
    }

    #[test]
    fn test_config_default_is_empty() {
        let config = GenerationConfig::default();
        assert!(config.max_tokens.is_none());
        assert_eq!(serde_json::to_string(&config).unwrap(), "{}");
    }

    #[test]
    fn test_config_builder() {
        let config = GenerationConfig::new(512)
            .with_temperature(0.7)
            .with_top_p(0.9)
            .with_stop(vec!["STOP".to_string()]);

        assert_eq!(config.max_tokens, Some(512));
        assert_eq!(config.temperature, Some(0.7));
        assert_eq!(config.top_p, Some(0.9));
        assert_eq!(config.stop, Some(vec!["STOP".to_string()]));
    }

    #[test]
    fn test_config_serialization_skips_unset() {
        let config = GenerationConfig::new(1024).with_temperature(0.5);
        let json = serde_json::to_string(&config).unwrap();
        assert!(json.contains("\"max_tokens\":1024"));
        assert!(json.contains("\"temperature\":0.5"));
        assert!(!json.contains("\"top_p\""));
        assert!(!json.contains("\"stop\""));
    }
}
