use serde::{Deserialize, Serialize};

use crate::scoring::{BleuOptions, SmoothMethod, Tokenize};

/// BLEU settings, sacreBLEU defaults unless overridden
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScoringConfig {
    #[serde(default)]
    pub tokenize: Tokenize,

    #[serde(default)]
    pub lowercase: bool,

    #[serde(default)]
    pub smooth: SmoothMethod,

    #[serde(rename = "smooth_value")]
    #[serde(default)]
    pub smooth_value: Option<f64>,

    #[serde(rename = "use_effective_order")]
    #[serde(default)]
    pub use_effective_order: bool,
}

impl From<&ScoringConfig> for BleuOptions {
    fn from(config: &ScoringConfig) -> Self {
        Self {
            tokenize: config.tokenize,
            lowercase: config.lowercase,
            smooth: config.smooth,
            smooth_value: config.smooth_value,
            use_effective_order: config.use_effective_order,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_section_yields_sacrebleu_defaults() {
        let config: ScoringConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(BleuOptions::from(&config), BleuOptions::default());
    }

    #[test]
    fn parses_overrides() {
        let config: ScoringConfig =
            serde_json::from_str(r#"{"tokenize": "none", "smooth": "floor", "smooth_value": 0.2}"#)
                .unwrap();
        let options = BleuOptions::from(&config);
        assert_eq!(options.tokenize, Tokenize::None);
        assert_eq!(options.smooth, SmoothMethod::Floor);
        assert_eq!(options.smooth_value, Some(0.2));
    }
}
