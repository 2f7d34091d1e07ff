use std::fs;
use std::path::Path;
use anyhow::Result;
use regex::Regex;
use serde_json::Value;
use tracing::debug;

use crate::config_manager::main::Config;

/// Read a JSON-LD, JSON or YAML configuration file into a JSON value,
/// substituting `${VAR_NAME}` placeholders from the environment
pub fn read_config_value(config_path: &str) -> Result<Value> {
    if !Path::new(config_path).exists() {
        anyhow::bail!("Configuration file not found: {}", config_path);
    }

    let content = load_text_file_with_guess_encoding(config_path)?;
    if content.trim().is_empty() {
        anyhow::bail!("Configuration file is empty: {}", config_path);
    }

    let content = substitute_env_vars(&content)?;

    let path_lower = config_path.to_lowercase();
    let value = if path_lower.ends_with(".yaml") || path_lower.ends_with(".yml") {
        serde_yaml::from_str::<Value>(&content)?
    } else {
        serde_json::from_str::<Value>(&content)?
    };

    debug!("Read configuration from {}", config_path);
    Ok(value)
}

/// Replace `${VAR_NAME}` with the variable's value, leaving unknown variables untouched
pub fn substitute_env_vars(content: &str) -> Result<String> {
    let pattern = Regex::new(r"\$\{(\w+)\}")?;
    let replaced = pattern.replace_all(content, |caps: &regex::Captures| {
        std::env::var(&caps[1]).unwrap_or_else(|_| caps[0].to_string())
    });
    Ok(replaced.into_owned())
}

/// Validate configuration data against the Config model
pub fn validate_config(config_data: Value) -> Result<Config> {
    let config: Config = serde_json::from_value(config_data)?;
    config
        .translator_config
        .validate()
        .map_err(|e| anyhow::anyhow!("Invalid translator_config: {}", e))?;
    Ok(config)
}

/// Load text file with encoding detection
pub fn load_text_file_with_guess_encoding(file_path: &str) -> Result<String> {
    let mut bytes = fs::read(file_path)?;

    // strip UTF-8 BOM
    if bytes.starts_with(&[0xEF, 0xBB, 0xBF]) {
        bytes.drain(0..3);
    }

    match String::from_utf8(bytes) {
        Ok(content) => Ok(content),
        Err(e) => {
            let bytes = e.into_bytes();
            let (cow, _, had_errors) = encoding_rs::GBK.decode(&bytes);
            if had_errors {
                debug!("{} is neither UTF-8 nor GBK, decoding lossily", file_path);
                Ok(String::from_utf8_lossy(&bytes).into_owned())
            } else {
                Ok(cow.into_owned())
            }
        }
    }
}
