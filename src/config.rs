use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use serde::Deserialize;

use crate::error::ConfigError;
use crate::infrastructure::RetryPolicy;
use crate::models::WorksheetNames;

/// Config file read when `PROMPT_FLOW_CONFIG` is not set
pub const DEFAULT_CONFIG_FILE: &str = "prompt_flow.toml";

/// A secret that never shows up in `Debug` output
#[derive(Clone, PartialEq, Eq)]
pub struct SecretString(String);

impl SecretString {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for SecretString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SecretString(***)")
    }
}

/// How the binary schedules runs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunMode {
    /// One run, then exit. Timing belongs to an external cron.
    Once,
    /// Keep running on a fixed interval until interrupted
    Serve,
}

impl FromStr for RunMode {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "once" => Ok(RunMode::Once),
            "serve" => Ok(RunMode::Serve),
            _ => Err(()),
        }
    }
}

/// Program configuration
#[derive(Clone, Debug)]
pub struct Config {
    // --- Generation ---
    pub gemini_api_key: SecretString,
    pub gemini_api_base_url: String,
    pub gemini_model_name: String,
    pub gemini_temperature: f32,
    // --- Spreadsheet ---
    /// Service-account key JSON
    pub service_account_key_file: String,
    /// Spreadsheet title, looked up by name
    pub spreadsheet_name: String,
    pub process_worksheet: String,
    pub done_worksheet: String,
    // --- Retry / transport ---
    /// Retries after the first attempt, per step
    pub task_retries: u32,
    pub retry_delay_secs: u64,
    pub request_timeout_secs: u64,
    // --- Scheduling ---
    pub run_mode: RunMode,
    pub serve_interval_secs: u64,
    /// Debug-level logging
    pub verbose_logging: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            gemini_api_key: SecretString::new(""),
            gemini_api_base_url: "https://generativelanguage.googleapis.com/v1beta/openai"
                .to_string(),
            gemini_model_name: "gemini-2.5-flash".to_string(),
            gemini_temperature: 1.0,
            service_account_key_file: "chatbot_key.json".to_string(),
            spreadsheet_name: "Image Prompt".to_string(),
            process_worksheet: "Process".to_string(),
            done_worksheet: "Done".to_string(),
            task_retries: 3,
            retry_delay_secs: 5,
            request_timeout_secs: 60,
            run_mode: RunMode::Once,
            serve_interval_secs: 60,
            verbose_logging: false,
        }
    }
}

/// Optional TOML layer. The API key is deliberately absent.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub gemini_api_base_url: Option<String>,
    pub gemini_model_name: Option<String>,
    pub gemini_temperature: Option<f32>,
    pub service_account_key_file: Option<String>,
    pub spreadsheet_name: Option<String>,
    pub process_worksheet: Option<String>,
    pub done_worksheet: Option<String>,
    pub task_retries: Option<u32>,
    pub retry_delay_secs: Option<u64>,
    pub request_timeout_secs: Option<u64>,
    pub run_mode: Option<RunMode>,
    pub serve_interval_secs: Option<u64>,
    pub verbose_logging: Option<bool>,
}

impl FileConfig {
    pub fn parse(path: &str, content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|source| ConfigError::TomlParseFailed {
            path: path.to_string(),
            source,
        })
    }

    /// Read the config file if there is one.
    ///
    /// An explicitly named file must exist; the default one may be missing.
    pub fn discover(explicit: Option<String>) -> Result<Option<Self>, ConfigError> {
        let (path, required) = match explicit {
            Some(path) => (path, true),
            None => (DEFAULT_CONFIG_FILE.to_string(), false),
        };

        if !required && !Path::new(&path).exists() {
            return Ok(None);
        }

        let content =
            std::fs::read_to_string(&path).map_err(|source| ConfigError::FileReadFailed {
                path: path.clone(),
                source,
            })?;
        Self::parse(&path, &content).map(Some)
    }
}

impl Config {
    /// Defaults, then the TOML file, then `.env` and the process environment
    pub fn load() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        let process_env = |k: &str| std::env::var(k).ok();
        let file = FileConfig::discover(env_value(&process_env, "PROMPT_FLOW_CONFIG"))?;
        Self::from_sources(file, process_env)
    }

    /// Build from an optional file layer and an environment lookup
    pub fn from_sources(
        file: Option<FileConfig>,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(file) = file {
            config.apply_file(file);
        }
        config.apply_env(&env)?;
        config.validate()?;

        Ok(config)
    }

    fn apply_file(&mut self, file: FileConfig) {
        let FileConfig {
            gemini_api_base_url,
            gemini_model_name,
            gemini_temperature,
            service_account_key_file,
            spreadsheet_name,
            process_worksheet,
            done_worksheet,
            task_retries,
            retry_delay_secs,
            request_timeout_secs,
            run_mode,
            serve_interval_secs,
            verbose_logging,
        } = file;

        overlay(&mut self.gemini_api_base_url, gemini_api_base_url);
        overlay(&mut self.gemini_model_name, gemini_model_name);
        overlay(&mut self.gemini_temperature, gemini_temperature);
        overlay(&mut self.service_account_key_file, service_account_key_file);
        overlay(&mut self.spreadsheet_name, spreadsheet_name);
        overlay(&mut self.process_worksheet, process_worksheet);
        overlay(&mut self.done_worksheet, done_worksheet);
        overlay(&mut self.task_retries, task_retries);
        overlay(&mut self.retry_delay_secs, retry_delay_secs);
        overlay(&mut self.request_timeout_secs, request_timeout_secs);
        overlay(&mut self.run_mode, run_mode);
        overlay(&mut self.serve_interval_secs, serve_interval_secs);
        overlay(&mut self.verbose_logging, verbose_logging);
    }

    fn apply_env(&mut self, env: &dyn Fn(&str) -> Option<String>) -> Result<(), ConfigError> {
        let api_key = env_value(env, "GOOGLE_API_KEY").ok_or_else(|| ConfigError::EnvVarNotFound {
            var_name: "GOOGLE_API_KEY".to_string(),
        })?;
        self.gemini_api_key = SecretString::new(api_key);

        overlay(&mut self.gemini_api_base_url, env_value(env, "GEMINI_API_BASE_URL"));
        overlay(&mut self.gemini_model_name, env_value(env, "GEMINI_MODEL_NAME"));
        overlay(&mut self.gemini_temperature, parse_env(env, "GEMINI_TEMPERATURE", "number")?);
        overlay(&mut self.service_account_key_file, env_value(env, "SERVICE_ACCOUNT_KEY_FILE"));
        overlay(&mut self.spreadsheet_name, env_value(env, "SPREADSHEET_NAME"));
        overlay(&mut self.process_worksheet, env_value(env, "PROCESS_WORKSHEET"));
        overlay(&mut self.done_worksheet, env_value(env, "DONE_WORKSHEET"));
        overlay(&mut self.task_retries, parse_env(env, "TASK_RETRIES", "unsigned integer")?);
        overlay(&mut self.retry_delay_secs, parse_env(env, "RETRY_DELAY_SECS", "unsigned integer")?);
        overlay(
            &mut self.request_timeout_secs,
            parse_env(env, "REQUEST_TIMEOUT_SECS", "unsigned integer")?,
        );
        overlay(&mut self.run_mode, parse_env(env, "RUN_MODE", "run mode (once|serve)")?);
        overlay(
            &mut self.serve_interval_secs,
            parse_env(env, "SERVE_INTERVAL_SECS", "unsigned integer")?,
        );
        overlay(&mut self.verbose_logging, parse_env(env, "VERBOSE_LOGGING", "bool")?);

        Ok(())
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=2.0).contains(&self.gemini_temperature) {
            return Err(ConfigError::InvalidValue {
                field: "gemini_temperature",
                requirement: "between 0.0 and 2.0",
            });
        }
        if self.request_timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "request_timeout_secs",
                requirement: "greater than zero",
            });
        }
        if self.run_mode == RunMode::Serve && self.serve_interval_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "serve_interval_secs",
                requirement: "greater than zero in serve mode",
            });
        }
        if self.process_worksheet.trim().is_empty() || self.spreadsheet_name.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "spreadsheet_name / process_worksheet",
                requirement: "non-empty",
            });
        }
        Ok(())
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.task_retries, Duration::from_secs(self.retry_delay_secs))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn serve_interval(&self) -> Duration {
        Duration::from_secs(self.serve_interval_secs)
    }

    pub fn worksheet_names(&self) -> WorksheetNames {
        WorksheetNames {
            process: self.process_worksheet.clone(),
            done: self.done_worksheet.clone(),
        }
    }
}

fn overlay<T>(slot: &mut T, value: Option<T>) {
    if let Some(value) = value {
        *slot = value;
    }
}

/// Blank values count as unset
fn env_value(env: &dyn Fn(&str) -> Option<String>, name: &str) -> Option<String> {
    env(name).filter(|v| !v.trim().is_empty())
}

fn parse_env<T: FromStr>(
    env: &dyn Fn(&str) -> Option<String>,
    name: &str,
    expected_type: &str,
) -> Result<Option<T>, ConfigError> {
    match env_value(env, name) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::EnvVarParseFailed {
                var_name: name.to_string(),
                value: raw,
                expected_type: expected_type.to_string(),
            }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |k| map.get(k).cloned()
    }

    #[test]
    fn test_defaults_with_only_api_key() {
        let config = Config::from_sources(None, env_from(&[("GOOGLE_API_KEY", "k")])).unwrap();

        assert_eq!(config.gemini_api_key.expose(), "k");
        assert_eq!(config.gemini_model_name, "gemini-2.5-flash");
        assert_eq!(config.service_account_key_file, "chatbot_key.json");
        assert_eq!(config.spreadsheet_name, "Image Prompt");
        assert_eq!(config.process_worksheet, "Process");
        assert_eq!(config.done_worksheet, "Done");
        assert_eq!(config.task_retries, 3);
        assert_eq!(config.retry_delay_secs, 5);
        assert_eq!(config.run_mode, RunMode::Once);
    }

    #[test]
    fn test_missing_or_blank_api_key_is_an_error() {
        let err = Config::from_sources(None, env_from(&[])).unwrap_err();
        assert!(matches!(err, ConfigError::EnvVarNotFound { ref var_name } if var_name == "GOOGLE_API_KEY"));

        let err = Config::from_sources(None, env_from(&[("GOOGLE_API_KEY", "   ")])).unwrap_err();
        assert!(matches!(err, ConfigError::EnvVarNotFound { .. }));
    }

    #[test]
    fn test_env_overrides_file_overrides_defaults() {
        let file = FileConfig::parse(
            "prompt_flow.toml",
            r#"
            spreadsheet_name = "Prompt Queue"
            task_retries = 5
            run_mode = "serve"
            serve_interval_secs = 3600
            "#,
        )
        .unwrap();

        let config = Config::from_sources(
            Some(file),
            env_from(&[("GOOGLE_API_KEY", "k"), ("TASK_RETRIES", "1")]),
        )
        .unwrap();

        assert_eq!(config.spreadsheet_name, "Prompt Queue");
        assert_eq!(config.task_retries, 1);
        assert_eq!(config.run_mode, RunMode::Serve);
        assert_eq!(config.serve_interval(), Duration::from_secs(3600));
        assert_eq!(config.process_worksheet, "Process");
    }

    #[test]
    fn test_invalid_number_is_not_silently_defaulted() {
        let err = Config::from_sources(
            None,
            env_from(&[("GOOGLE_API_KEY", "k"), ("RETRY_DELAY_SECS", "five")]),
        )
        .unwrap_err();

        match err {
            ConfigError::EnvVarParseFailed { var_name, value, .. } => {
                assert_eq!(var_name, "RETRY_DELAY_SECS");
                assert_eq!(value, "five");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_file_rejects_unknown_keys() {
        let err = FileConfig::parse("prompt_flow.toml", "gemini_api_key = \"oops\"").unwrap_err();
        assert!(matches!(err, ConfigError::TomlParseFailed { .. }));
    }

    #[test]
    fn test_serve_mode_needs_an_interval() {
        let err = Config::from_sources(
            None,
            env_from(&[
                ("GOOGLE_API_KEY", "k"),
                ("RUN_MODE", "serve"),
                ("SERVE_INTERVAL_SECS", "0"),
            ]),
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { field: "serve_interval_secs", .. }));
    }

    #[test]
    fn test_debug_hides_api_key() {
        let config =
            Config::from_sources(None, env_from(&[("GOOGLE_API_KEY", "AIzaSyTOPSECRET")])).unwrap();
        assert!(!format!("{:?}", config).contains("AIzaSyTOPSECRET"));
    }
}
