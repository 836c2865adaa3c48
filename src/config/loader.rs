// Configuration loader
// Loads settings from ~/.ramani/config.toml (or an explicit path) and the
// GEMINI_API_KEY environment variable

use anyhow::{bail, Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

use super::constants::{API_KEY_ENV, CONFIG_DIR_NAME, CONFIG_FILE_NAME};
use super::settings::Config;

/// ~/.ramani/config.toml
pub fn default_config_path() -> Result<PathBuf> {
    let home = dirs::home_dir().context("Could not determine home directory")?;
    Ok(home.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
}

/// Load configuration from file and environment
///
/// An explicit `path` must exist. Without one, the default path is used when
/// present and built-in defaults otherwise.
pub fn load_config(path: Option<&Path>) -> Result<Config> {
    let env_key = std::env::var(API_KEY_ENV).ok();
    match path {
        Some(path) => load_config_from(Some(path), env_key),
        None => {
            let default_path = default_config_path()?;
            let path = default_path.exists().then_some(default_path.as_path());
            load_config_from(path, env_key)
        }
    }
}

/// Same as [`load_config`] with the environment key passed in explicitly
pub fn load_config_from(path: Option<&Path>, env_key: Option<String>) -> Result<Config> {
    let mut config = match path {
        Some(path) => {
            let contents = fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file {}", path.display()))?;
            parse_config(&contents)
                .with_context(|| format!("Failed to parse config file {}", path.display()))?
        }
        None => Config::default(),
    };

    if let Some(key) = env_key.filter(|k| !k.trim().is_empty()) {
        tracing::debug!("Using API key from {}", API_KEY_ENV);
        config.provider.api_key = key;
    }

    if config.provider.api_key.trim().is_empty() {
        bail!(
            "No API key configured.\n\n\
            Set it in ~/{}/{}:\n\n\
            [provider]\n\
            api_key = \"...\"\n\n\
            or export {}=\"...\"",
            CONFIG_DIR_NAME,
            CONFIG_FILE_NAME,
            API_KEY_ENV
        );
    }

    config
        .validate()
        .context("Configuration validation failed")?;

    Ok(config)
}

/// Parse config TOML without validation
pub fn parse_config(contents: &str) -> Result<Config> {
    let config: Config = toml::from_str(contents)?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BusyPolicy;
    use std::io::Write;

    fn write_config(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_parse_empty_uses_defaults() {
        let config = parse_config("").unwrap();
        assert_eq!(config.provider.max_output_tokens, 100);
        assert_eq!(config.persona.name, "Ramani");
        assert!(config.log_path.is_none());
    }

    #[test]
    fn test_load_full_file() {
        let file = write_config(
            r#"
log_path = "/tmp/ramani.jsonl"

[provider]
api_key = "file-key"
model = "gemini-pro"
max_output_tokens = 64

[session]
busy_policy = "queue"
max_exchanges = 10

[persona]
name = "Shamba"
preamble = ["You help farmers."]
"#,
        );

        let config = load_config_from(Some(file.path()), None).unwrap();
        assert_eq!(config.provider.api_key, "file-key");
        assert_eq!(config.provider.model, "gemini-pro");
        assert_eq!(config.provider.max_output_tokens, 64);
        assert_eq!(config.session.busy_policy, BusyPolicy::Queue);
        assert_eq!(config.session.max_exchanges, 10);
        assert_eq!(config.persona.name, "Shamba");
        assert_eq!(config.log_path, Some(PathBuf::from("/tmp/ramani.jsonl")));
    }

    #[test]
    fn test_env_key_overrides_file() {
        let file = write_config("[provider]\napi_key = \"file-key\"\n");
        let config = load_config_from(Some(file.path()), Some("env-key".to_string())).unwrap();
        assert_eq!(config.provider.api_key, "env-key");
    }

    #[test]
    fn test_blank_env_key_ignored() {
        let file = write_config("[provider]\napi_key = \"file-key\"\n");
        let config = load_config_from(Some(file.path()), Some("  ".to_string())).unwrap();
        assert_eq!(config.provider.api_key, "file-key");
    }

    #[test]
    fn test_missing_key_is_error() {
        let err = load_config_from(None, None).unwrap_err();
        assert!(err.to_string().contains("No API key"));
    }

    #[test]
    fn test_defaults_with_env_key_only() {
        let config = load_config_from(None, Some("env-key".to_string())).unwrap();
        assert_eq!(config.provider.api_key, "env-key");
    }

    #[test]
    fn test_missing_explicit_file_is_error() {
        let result = load_config_from(Some(Path::new("/nonexistent/ramani.toml")), None);
        assert!(result.is_err());
    }

    #[test]
    fn test_invalid_values_fail_validation() {
        let file = write_config("[provider]\napi_key = \"k\"\nrequest_timeout_secs = 0\n");
        let err = load_config_from(Some(file.path()), None).unwrap_err();
        assert!(format!("{:#}", err).contains("request_timeout_secs"));
    }

    #[test]
    fn test_unknown_busy_policy_rejected() {
        assert!(parse_config("[session]\nbusy_policy = \"drop\"\n").is_err());
    }
}
