//! Environment-driven service configuration.

use tracing::warn;

use crate::inference::GenerationOptions;

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 8000;
const DEFAULT_CLASSIFIER_MODEL: &str = "Xenova/distilbert-base-uncased-finetuned-sst-2-english";
const DEFAULT_GENERATOR_MODEL: &str = "Qwen/Qwen2-0.5B";
const DEFAULT_MAX_NEW_TOKENS: usize = 100;

const TEMPERATURE: f64 = 0.6;
const TOP_K: usize = 30;
const TOP_P: f64 = 0.9;
const SEED: u64 = 299792458;

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub classifier_model: String,
    pub generator_model: String,
    pub max_new_tokens: usize,
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Self {
        let host = get("ML_PIPELINE_HOST").unwrap_or_else(|| DEFAULT_HOST.to_string());
        let port = match get("ML_PIPELINE_PORT") {
            Some(raw) => match raw.parse::<u16>() {
                Ok(parsed) => parsed,
                Err(_) => {
                    warn!("invalid ML_PIPELINE_PORT={:?}, falling back to {}", raw, DEFAULT_PORT);
                    DEFAULT_PORT
                }
            },
            None => DEFAULT_PORT,
        };
        let classifier_model = get("ML_PIPELINE_CLASSIFIER_MODEL")
            .unwrap_or_else(|| DEFAULT_CLASSIFIER_MODEL.to_string());
        let generator_model = get("ML_PIPELINE_GENERATOR_MODEL")
            .unwrap_or_else(|| DEFAULT_GENERATOR_MODEL.to_string());
        let max_new_tokens = match get("ML_PIPELINE_MAX_NEW_TOKENS") {
            Some(raw) => match raw.parse::<usize>() {
                Ok(parsed) if parsed > 0 => parsed,
                _ => {
                    warn!(
                        "invalid ML_PIPELINE_MAX_NEW_TOKENS={:?}, falling back to {}",
                        raw, DEFAULT_MAX_NEW_TOKENS
                    );
                    DEFAULT_MAX_NEW_TOKENS
                }
            },
            None => DEFAULT_MAX_NEW_TOKENS,
        };

        Self {
            host,
            port,
            classifier_model,
            generator_model,
            max_new_tokens,
        }
    }

    pub fn generation_options(&self) -> GenerationOptions {
        GenerationOptions {
            max_new_tokens: self.max_new_tokens,
            temperature: TEMPERATURE,
            top_k: TOP_K,
            top_p: TOP_P,
            seed: SEED,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(vars: &[(&str, &str)]) -> Config {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_apply_when_env_is_empty() {
        let config = config_from(&[]);
        assert_eq!(config.host, DEFAULT_HOST);
        assert_eq!(config.port, DEFAULT_PORT);
        assert_eq!(config.classifier_model, DEFAULT_CLASSIFIER_MODEL);
        assert_eq!(config.generator_model, DEFAULT_GENERATOR_MODEL);
        assert_eq!(config.max_new_tokens, DEFAULT_MAX_NEW_TOKENS);
    }

    #[test]
    fn env_overrides_are_honored() {
        let config = config_from(&[
            ("ML_PIPELINE_HOST", "127.0.0.1"),
            ("ML_PIPELINE_PORT", "9000"),
            ("ML_PIPELINE_GENERATOR_MODEL", "Qwen/Qwen2-1.5B"),
            ("ML_PIPELINE_MAX_NEW_TOKENS", "32"),
        ]);
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 9000);
        assert_eq!(config.generator_model, "Qwen/Qwen2-1.5B");
        assert_eq!(config.max_new_tokens, 32);
    }

    #[test]
    fn malformed_port_falls_back_to_default() {
        let config = config_from(&[("ML_PIPELINE_PORT", "not-a-port")]);
        assert_eq!(config.port, DEFAULT_PORT);
    }

    #[test]
    fn zero_max_new_tokens_falls_back_to_default() {
        let config = config_from(&[("ML_PIPELINE_MAX_NEW_TOKENS", "0")]);
        assert_eq!(config.max_new_tokens, DEFAULT_MAX_NEW_TOKENS);
    }
}
