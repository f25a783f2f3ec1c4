use serde::Deserialize;

/// Configuration for building a [`crate::PronunciationAligner`].
#[derive(Debug, Clone, Deserialize)]
pub struct AlignerConfig {
    /// Sample rate the emission provider was trained for. Audio at any other
    /// rate still aligns, with a warning.
    #[serde(default = "default_sample_rate")]
    pub expected_sample_rate_hz: u32,
}

impl AlignerConfig {
    pub const DEFAULT_SAMPLE_RATE_HZ: u32 = 16_000;
}

fn default_sample_rate() -> u32 {
    AlignerConfig::DEFAULT_SAMPLE_RATE_HZ
}

impl Default for AlignerConfig {
    fn default() -> Self {
        Self {
            expected_sample_rate_hz: Self::DEFAULT_SAMPLE_RATE_HZ,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aligner_config_default() {
        let config = AlignerConfig::default();
        assert_eq!(config.expected_sample_rate_hz, 16_000);
    }

    #[test]
    fn aligner_config_deserializes_with_defaults() {
        let config: AlignerConfig = serde_json::from_str("{}").expect("valid config json");
        assert_eq!(
            config.expected_sample_rate_hz,
            AlignerConfig::DEFAULT_SAMPLE_RATE_HZ
        );

        let config: AlignerConfig = serde_json::from_str(r#"{"expected_sample_rate_hz": 8000}"#)
            .expect("valid config json");
        assert_eq!(config.expected_sample_rate_hz, 8_000);
    }
}
