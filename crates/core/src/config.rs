//! Configuration management for the company chat service.
//!
//! This module handles loading and merging configuration from multiple sources,
//! in increasing order of precedence:
//! - Built-in defaults
//! - A YAML config file (`COMPANY_CHAT_CONFIG`)
//! - Environment variables
//! - Command-line flags
//!
//! The resulting [`AppConfig`] is built once at startup and handed to the
//! pipeline components. Nothing below the binary reads the environment.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{AppError, AppResult};

/// Default retrieval service endpoint.
pub const DEFAULT_RETRIEVAL_URL: &str = "http://127.0.0.1:8000/query";

/// Default confidence threshold applied to the retrieval best score.
pub const DEFAULT_CONFIDENCE_THRESHOLD: f64 = 0.35;

/// Default generation provider.
pub const DEFAULT_PROVIDER: &str = "openai";

/// Default generation model (small and cheap).
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// Default bind address.
pub const DEFAULT_HOST: &str = "0.0.0.0";

/// Exact sentence the summarizer must reply with when the context does not
/// cover the question.
pub const NO_DATA_REPLY: &str = "해당 자료가 없습니다. 고객센터로 문의해 주세요.";

/// Pre-approved handoff message shown whenever no trustworthy answer exists.
pub const DEFAULT_HANDOFF_MESSAGE: &str = "정확한 답변을 드리기 어려운 문의입니다. \
상담원이 직접 안내해 드리겠습니다.\n\
고객센터: 대표번호 1600-0000 / 카카오톡 채널 '고객센터'\n\
운영시간: 평일 09:00~18:00 (점심 12:00~13:00, 주말·공휴일 휴무)";

/// Canonical "no information available" phrasings.
pub const DEFAULT_NO_DATA_PHRASES: &[&str] = &[
    NO_DATA_REPLY,
    "자료에 없습니다. 고객센터로 문의해 주세요.",
    "해당 자료가 없습니다.",
    "자료에 없습니다.",
    "자료에 없음",
];

/// Origins allowed to call the service from a browser.
pub const DEFAULT_ALLOWED_ORIGINS: &[&str] = &[
    "https://www.060kc.com",
    "https://060kc.com",
    "http://localhost:8080",
];

/// Generation providers the service knows how to build.
pub const KNOWN_PROVIDERS: &[&str] = &["openai", "ollama", "mock"];

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Optional config file path
    pub config_file: Option<PathBuf>,

    /// Listening port (required by `serve`)
    pub port: Option<u16>,

    /// Bind address
    pub host: String,

    /// Retrieval service endpoint (POST `{question}`)
    pub retrieval_url: String,

    /// Secondary guard on the retrieval best score, in [0, 1]
    pub confidence_threshold: f64,

    /// Generation provider ("openai", "ollama", "mock")
    pub provider: String,

    /// Generation model identifier
    pub model: String,

    /// Custom base URL for the generation provider
    pub llm_endpoint: Option<String>,

    /// API key for the generation provider
    #[serde(skip_serializing)]
    pub api_key: Option<String>,

    /// Timeout applied to each outbound call; `None` keeps the transport default
    pub request_timeout_secs: Option<u64>,

    /// CORS allow-list
    pub allowed_origins: Vec<String>,

    /// Fixed handoff message
    pub handoff_message: String,

    /// Canonical refusal phrasings used by the no-data detector
    pub no_data_phrases: Vec<String>,

    /// Optional YAML prompt definition replacing the built-in summarizer prompt
    pub prompt_file: Option<PathBuf>,

    /// Log level override
    pub log_level: Option<String>,

    /// Emit JSON log lines
    pub log_json: bool,

    /// Verbose mode (enables debug logging)
    pub verbose: bool,

    /// Disable colored output
    pub no_color: bool,
}

/// Full configuration file structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct ConfigFile {
    server: Option<ServerSection>,
    retrieval: Option<RetrievalSection>,
    llm: Option<LlmSection>,
    answer: Option<AnswerSection>,
    logging: Option<LoggingSection>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ServerSection {
    port: Option<u16>,
    host: Option<String>,
    allowed_origins: Option<Vec<String>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RetrievalSection {
    url: Option<String>,
    confidence_threshold: Option<f64>,
    timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LlmSection {
    provider: Option<String>,
    model: Option<String>,
    endpoint: Option<String>,
    api_key_env: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AnswerSection {
    handoff_message: Option<String>,
    no_data_phrases: Option<Vec<String>>,
    prompt_file: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct LoggingSection {
    level: Option<String>,
    color: Option<bool>,
    format: Option<String>,
}

/// Command-line overrides, applied last.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub port: Option<u16>,
    pub host: Option<String>,
    pub retrieval_url: Option<String>,
    pub confidence_threshold: Option<f64>,
    pub provider: Option<String>,
    pub model: Option<String>,
    pub log_level: Option<String>,
    pub verbose: bool,
    pub no_color: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            config_file: None,
            port: None,
            host: DEFAULT_HOST.to_string(),
            retrieval_url: DEFAULT_RETRIEVAL_URL.to_string(),
            confidence_threshold: DEFAULT_CONFIDENCE_THRESHOLD,
            provider: DEFAULT_PROVIDER.to_string(),
            model: DEFAULT_MODEL.to_string(),
            llm_endpoint: None,
            api_key: None,
            request_timeout_secs: None,
            allowed_origins: DEFAULT_ALLOWED_ORIGINS
                .iter()
                .map(|s| s.to_string())
                .collect(),
            handoff_message: DEFAULT_HANDOFF_MESSAGE.to_string(),
            no_data_phrases: DEFAULT_NO_DATA_PHRASES
                .iter()
                .map(|s| s.to_string())
                .collect(),
            prompt_file: None,
            log_level: None,
            log_json: false,
            verbose: false,
            no_color: false,
        }
    }
}

impl AppConfig {
    /// Load configuration from the process environment and defaults.
    ///
    /// Environment variables:
    /// - `COMPANY_CHAT_CONFIG`: Path to a YAML config file
    /// - `PORT`: Listening port
    /// - `HOST`: Bind address
    /// - `RETRIEVAL_URL`: Retrieval service endpoint
    /// - `CONFIDENCE_THRESHOLD`: Float in [0, 1]
    /// - `LLM_PROVIDER`: Generation provider
    /// - `CHAT_MODEL`: Generation model
    /// - `LLM_ENDPOINT`: Custom generation base URL
    /// - `OPENAI_API_KEY`: Generation API key
    /// - `REQUEST_TIMEOUT_SECS`: Outbound call timeout
    /// - `ALLOWED_ORIGINS`: Comma-separated CORS origins
    /// - `PROMPT_FILE`: YAML prompt override
    /// - `RUST_LOG`, `LOG_FORMAT`, `NO_COLOR`: Logging
    ///
    /// # Example
    /// ```no_run
    /// use company_chat_core::config::AppConfig;
    ///
    /// let config = AppConfig::load().expect("Failed to load config");
    /// println!("Retrieval: {}", config.retrieval_url);
    /// ```
    pub fn load() -> AppResult<Self> {
        Self::load_with_file(None)
    }

    /// Load configuration from the environment, reading `config_file`
    /// in place of `COMPANY_CHAT_CONFIG` when given.
    pub fn load_with_file(config_file: Option<&Path>) -> AppResult<Self> {
        let config_file = config_file.map(|p| p.to_string_lossy().into_owned());
        Self::load_from(|key| match key {
            "COMPANY_CHAT_CONFIG" if config_file.is_some() => config_file.clone(),
            _ => std::env::var(key).ok(),
        })
    }

    /// Load configuration using an arbitrary variable lookup.
    ///
    /// Empty values are treated as unset.
    pub fn load_from<F>(lookup: F) -> AppResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let mut config = Self::default();

        if let Some(config_file) = var("COMPANY_CHAT_CONFIG") {
            let path = PathBuf::from(config_file);
            if !path.exists() {
                return Err(AppError::Config(format!(
                    "Config file does not exist: {:?}",
                    path
                )));
            }
            config = config.merge_yaml(&path, &var)?;
            config.config_file = Some(path);
        }

        // Environment variables override YAML config
        if let Some(port) = var("PORT") {
            config.port = Some(parse_port(&port)?);
        }

        if let Some(host) = var("HOST") {
            config.host = host;
        }

        if let Some(url) = var("RETRIEVAL_URL") {
            config.retrieval_url = url;
        }

        if let Some(threshold) = var("CONFIDENCE_THRESHOLD") {
            config.confidence_threshold = threshold.trim().parse().map_err(|_| {
                AppError::Config(format!("Invalid CONFIDENCE_THRESHOLD: {}", threshold))
            })?;
        }

        if let Some(provider) = var("LLM_PROVIDER") {
            config.provider = provider.to_lowercase();
        }

        if let Some(model) = var("CHAT_MODEL") {
            config.model = model;
        }

        if let Some(endpoint) = var("LLM_ENDPOINT") {
            config.llm_endpoint = Some(endpoint);
        }

        if let Some(key) = var("OPENAI_API_KEY") {
            config.api_key = Some(key);
        }

        if let Some(secs) = var("REQUEST_TIMEOUT_SECS") {
            config.request_timeout_secs = Some(secs.trim().parse().map_err(|_| {
                AppError::Config(format!("Invalid REQUEST_TIMEOUT_SECS: {}", secs))
            })?);
        }

        if let Some(origins) = var("ALLOWED_ORIGINS") {
            config.allowed_origins = split_list(&origins);
        }

        if let Some(prompt_file) = var("PROMPT_FILE") {
            config.prompt_file = Some(PathBuf::from(prompt_file));
        }

        if let Some(level) = var("RUST_LOG") {
            config.log_level = Some(level);
        }

        if let Some(format) = var("LOG_FORMAT") {
            config.log_json = format.eq_ignore_ascii_case("json");
        }

        if lookup("NO_COLOR").is_some() {
            config.no_color = true;
        }

        Ok(config)
    }

    /// Merge YAML configuration file into this config.
    fn merge_yaml<F>(&self, path: &Path, var: &F) -> AppResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            AppError::Config(format!("Failed to read config file {:?}: {}", path, e))
        })?;

        let config_file: ConfigFile = serde_yaml::from_str(&contents).map_err(|e| {
            AppError::Config(format!("Failed to parse config file {:?}: {}", path, e))
        })?;

        let mut result = self.clone();

        if let Some(server) = config_file.server {
            if let Some(port) = server.port {
                result.port = Some(port);
            }
            if let Some(host) = server.host {
                result.host = host;
            }
            if let Some(origins) = server.allowed_origins {
                result.allowed_origins = origins;
            }
        }

        if let Some(retrieval) = config_file.retrieval {
            if let Some(url) = retrieval.url {
                result.retrieval_url = url;
            }
            if let Some(threshold) = retrieval.confidence_threshold {
                result.confidence_threshold = threshold;
            }
            if let Some(secs) = retrieval.timeout_secs {
                result.request_timeout_secs = Some(secs);
            }
        }

        if let Some(llm) = config_file.llm {
            if let Some(provider) = llm.provider {
                result.provider = provider.to_lowercase();
            }
            if let Some(model) = llm.model {
                result.model = model;
            }
            if let Some(endpoint) = llm.endpoint {
                result.llm_endpoint = Some(endpoint);
            }
            // The file names the variable, never the secret itself
            if let Some(env_name) = llm.api_key_env {
                result.api_key = var(&env_name);
            }
        }

        if let Some(answer) = config_file.answer {
            if let Some(message) = answer.handoff_message {
                result.handoff_message = message;
            }
            if let Some(phrases) = answer.no_data_phrases {
                result.no_data_phrases = phrases;
            }
            if let Some(prompt_file) = answer.prompt_file {
                result.prompt_file = Some(prompt_file);
            }
        }

        if let Some(logging) = config_file.logging {
            if let Some(level) = logging.level {
                result.log_level = Some(level);
            }
            if let Some(color) = logging.color {
                result.no_color = !color;
            }
            if let Some(format) = logging.format {
                result.log_json = format.eq_ignore_ascii_case("json");
            }
        }

        Ok(result)
    }

    /// Apply CLI overrides to the configuration.
    ///
    /// Command-line flags take precedence over environment variables and
    /// the config file.
    pub fn with_overrides(mut self, overrides: ConfigOverrides) -> Self {
        if let Some(port) = overrides.port {
            self.port = Some(port);
        }

        if let Some(host) = overrides.host {
            self.host = host;
        }

        if let Some(url) = overrides.retrieval_url {
            self.retrieval_url = url;
        }

        if let Some(threshold) = overrides.confidence_threshold {
            self.confidence_threshold = threshold;
        }

        if let Some(provider) = overrides.provider {
            self.provider = provider.to_lowercase();
        }

        if let Some(model) = overrides.model {
            self.model = model;
        }

        if let Some(log_level) = overrides.log_level {
            self.log_level = Some(log_level);
        }

        if overrides.verbose {
            self.verbose = true;
            // Verbose mode implies debug logging
            if self.log_level.is_none() {
                self.log_level = Some("debug".to_string());
            }
        }

        if overrides.no_color {
            self.no_color = true;
        }

        self
    }

    /// Listening port, required to run the HTTP server.
    ///
    /// Port 0 is rejected whichever layer supplied it.
    pub fn require_port(&self) -> AppResult<u16> {
        match self.port {
            Some(0) => Err(AppError::Config("Port must be greater than 0".to_string())),
            Some(port) => Ok(port),
            None => Err(AppError::Config(
                "PORT is not set. The server only listens on the port given by the host."
                    .to_string(),
            )),
        }
    }

    /// Socket address string for the HTTP listener.
    pub fn bind_addr(&self) -> AppResult<String> {
        Ok(format!("{}:{}", self.host, self.require_port()?))
    }

    /// Outbound request timeout, if one is configured.
    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }

    /// Validate configuration before building the pipeline.
    pub fn validate(&self) -> AppResult<()> {
        if !self.confidence_threshold.is_finite()
            || !(0.0..=1.0).contains(&self.confidence_threshold)
        {
            return Err(AppError::Config(format!(
                "Confidence threshold must be within [0, 1], got {}",
                self.confidence_threshold
            )));
        }

        if !KNOWN_PROVIDERS.contains(&self.provider.as_str()) {
            return Err(AppError::Config(format!(
                "Unknown provider: {}. Supported: {}",
                self.provider,
                KNOWN_PROVIDERS.join(", ")
            )));
        }

        if self.provider == "openai" && self.api_key.is_none() {
            return Err(AppError::Config(
                "API key not found in environment variable: OPENAI_API_KEY".to_string(),
            ));
        }

        if !(self.retrieval_url.starts_with("http://") || self.retrieval_url.starts_with("https://"))
        {
            return Err(AppError::Config(format!(
                "Retrieval URL must be http(s): {}",
                self.retrieval_url
            )));
        }

        if self.handoff_message.trim().is_empty() {
            return Err(AppError::Config(
                "Handoff message must not be empty".to_string(),
            ));
        }

        Ok(())
    }
}

fn parse_port(raw: &str) -> AppResult<u16> {
    match raw.trim().parse::<u16>() {
        Ok(port) if port > 0 => Ok(port),
        _ => Err(AppError::Config(format!("Invalid PORT: {}", raw))),
    }
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.provider, "openai");
        assert_eq!(config.model, "gpt-4o-mini");
        assert_eq!(config.confidence_threshold, 0.35);
        assert_eq!(config.port, None);
        assert_eq!(config.allowed_origins.len(), 3);
        assert!(config.no_data_phrases.iter().any(|p| p == NO_DATA_REPLY));
        assert!(!config.verbose);
    }

    #[test]
    fn test_load_from_env() {
        let config = AppConfig::load_from(lookup(&[
            ("PORT", "10000"),
            ("RETRIEVAL_URL", "http://rag.internal/query"),
            ("CONFIDENCE_THRESHOLD", "0.5"),
            ("CHAT_MODEL", "gpt-4o"),
            ("OPENAI_API_KEY", "sk-test"),
            ("ALLOWED_ORIGINS", "https://a.example, https://b.example,"),
            ("LOG_FORMAT", "json"),
        ]))
        .unwrap();

        assert_eq!(config.port, Some(10000));
        assert_eq!(config.retrieval_url, "http://rag.internal/query");
        assert_eq!(config.confidence_threshold, 0.5);
        assert_eq!(config.model, "gpt-4o");
        assert_eq!(config.api_key.as_deref(), Some("sk-test"));
        assert_eq!(
            config.allowed_origins,
            vec!["https://a.example", "https://b.example"]
        );
        assert!(config.log_json);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_env_values_are_unset() {
        let config = AppConfig::load_from(lookup(&[("PORT", ""), ("CHAT_MODEL", "  ")])).unwrap();
        assert_eq!(config.port, None);
        assert_eq!(config.model, DEFAULT_MODEL);
    }

    #[test]
    fn test_invalid_port_is_rejected() {
        assert!(AppConfig::load_from(lookup(&[("PORT", "abc")])).is_err());
        assert!(AppConfig::load_from(lookup(&[("PORT", "0")])).is_err());
        assert!(AppConfig::load_from(lookup(&[("PORT", "70000")])).is_err());
    }

    #[test]
    fn test_zero_port_from_flag_or_file_is_rejected() {
        let config = AppConfig::default().with_overrides(ConfigOverrides {
            port: Some(0),
            ..Default::default()
        });
        assert!(config.require_port().is_err());
        assert!(config.bind_addr().is_err());

        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "server:\n  port: 0").unwrap();
        let path = file.path().to_string_lossy().into_owned();
        let config = AppConfig::load_from(lookup(&[("COMPANY_CHAT_CONFIG", &path)])).unwrap();
        assert!(config.require_port().is_err());
    }

    #[test]
    fn test_require_port() {
        let config = AppConfig::default();
        assert!(config.require_port().is_err());

        let config = AppConfig::load_from(lookup(&[("PORT", "8080")])).unwrap();
        assert_eq!(config.require_port().unwrap(), 8080);
        assert_eq!(config.bind_addr().unwrap(), "0.0.0.0:8080");
    }

    #[test]
    fn test_invalid_threshold() {
        assert!(AppConfig::load_from(lookup(&[("CONFIDENCE_THRESHOLD", "high")])).is_err());

        let mut config = AppConfig::default();
        config.provider = "mock".to_string();
        config.confidence_threshold = 1.5;
        assert!(config.validate().is_err());
        config.confidence_threshold = f64::NAN;
        assert!(config.validate().is_err());
        config.confidence_threshold = 0.0;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_with_overrides() {
        let config = AppConfig::default();
        let overridden = config.with_overrides(ConfigOverrides {
            port: Some(3000),
            provider: Some("Ollama".to_string()),
            model: Some("llama3.2".to_string()),
            confidence_threshold: Some(0.6),
            verbose: true,
            ..Default::default()
        });

        assert_eq!(overridden.port, Some(3000));
        assert_eq!(overridden.provider, "ollama");
        assert_eq!(overridden.model, "llama3.2");
        assert_eq!(overridden.confidence_threshold, 0.6);
        assert!(overridden.verbose);
        assert_eq!(overridden.log_level, Some("debug".to_string()));
    }

    #[test]
    fn test_validate_unknown_provider() {
        let mut config = AppConfig::default();
        config.provider = "unknown".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_openai_requires_key() {
        let config = AppConfig::default();
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.provider = "ollama".to_string();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_retrieval_url_scheme() {
        let mut config = AppConfig::default();
        config.provider = "mock".to_string();
        config.retrieval_url = "ftp://rag".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_yaml_config_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
server:
  port: 9000
  allowedOrigins: ["https://chat.example"]
retrieval:
  url: http://rag:8000/query
  confidenceThreshold: 0.4
  timeoutSecs: 20
llm:
  provider: ollama
  model: llama3.2
  apiKeyEnv: MY_KEY
answer:
  handoffMessage: "상담원에게 연결합니다."
  noDataPhrases: ["자료 없음"]
logging:
  level: debug
  color: false
"#
        )
        .unwrap();

        let path = file.path().to_string_lossy().to_string();
        let config = AppConfig::load_from(lookup(&[
            ("COMPANY_CHAT_CONFIG", path.as_str()),
            ("MY_KEY", "secret"),
            ("CHAT_MODEL", "qwen2.5"),
        ]))
        .unwrap();

        assert_eq!(config.port, Some(9000));
        assert_eq!(config.allowed_origins, vec!["https://chat.example"]);
        assert_eq!(config.retrieval_url, "http://rag:8000/query");
        assert_eq!(config.confidence_threshold, 0.4);
        assert_eq!(config.request_timeout(), Some(Duration::from_secs(20)));
        assert_eq!(config.provider, "ollama");
        // Environment beats the file
        assert_eq!(config.model, "qwen2.5");
        assert_eq!(config.api_key.as_deref(), Some("secret"));
        assert_eq!(config.handoff_message, "상담원에게 연결합니다.");
        assert_eq!(config.no_data_phrases, vec!["자료 없음"]);
        assert_eq!(config.log_level.as_deref(), Some("debug"));
        assert!(config.no_color);
    }

    #[test]
    fn test_missing_config_file() {
        let result = AppConfig::load_from(lookup(&[(
            "COMPANY_CHAT_CONFIG",
            "/definitely/not/here.yaml",
        )]));
        assert!(result.is_err());
    }
}
