use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use dotenv::dotenv;
use std::{env, fmt, str::FromStr, time::Duration};

use crate::constants::{
    DEFAULT_CONTACT_TO_EMAIL, DEFAULT_RATE_LIMIT_MAX_REQUESTS, DEFAULT_RATE_LIMIT_WINDOW_SECS,
    RESEND_API_URL,
};

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum AppEnvironment {
    Development,
    Production,
    Testing,
}

impl FromStr for AppEnvironment {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "development" => Ok(AppEnvironment::Development),
            "production" => Ok(AppEnvironment::Production),
            "testing" => Ok(AppEnvironment::Testing),
            _ => Err(ConfigError::Message(format!("Invalid environment: {}", s))),
        }
    }
}

#[derive(Deserialize, Clone)]
#[serde(rename_all = "snake_case")]
pub struct AppConfig {
    #[serde(default = "default_env")]
    pub env: AppEnvironment,

    #[serde(default = "default_name")]
    pub name: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_worker_count")]
    pub worker_count: usize,

    /// Comma separated list of origins allowed to post the form.
    #[serde(default = "default_cors_origins")]
    pub cors_allowed_origins: String,

    #[serde(default)]
    pub redis_url: Option<String>,

    #[serde(default)]
    pub redis_token: Option<String>,

    /// Keep counters in process when no Redis is configured.
    #[serde(default)]
    pub rate_limit_in_memory: bool,

    #[serde(default = "default_rate_limit_max_requests")]
    pub rate_limit_max_requests: u64,

    #[serde(default = "default_rate_limit_window_secs")]
    pub rate_limit_window_secs: u64,

    #[serde(default)]
    pub resend_api_key: Option<String>,

    #[serde(default = "default_resend_api_url")]
    pub resend_api_url: String,

    #[serde(default)]
    pub smtp_host: Option<String>,

    #[serde(default = "default_smtp_port")]
    pub smtp_port: u16,

    #[serde(default)]
    pub smtp_user: Option<String>,

    #[serde(default)]
    pub smtp_password: Option<String>,

    #[serde(default = "default_contact_to_email")]
    pub contact_to_email: String,

    #[serde(default)]
    pub contact_from_email: Option<String>,
}

fn default_env() -> AppEnvironment {
    AppEnvironment::Development
}
fn default_name() -> String {
    "Portfolio-Contact".to_string()
}
fn default_port() -> u16 {
    8080
}
fn default_host() -> String {
    "127.0.0.1".to_string()
}
fn default_worker_count() -> usize {
    num_cpus::get()
}
fn default_cors_origins() -> String {
    "*".to_string()
}
fn default_rate_limit_max_requests() -> u64 {
    DEFAULT_RATE_LIMIT_MAX_REQUESTS
}
fn default_rate_limit_window_secs() -> u64 {
    DEFAULT_RATE_LIMIT_WINDOW_SECS
}
fn default_resend_api_url() -> String {
    RESEND_API_URL.to_string()
}
fn default_smtp_port() -> u16 {
    587
}
fn default_contact_to_email() -> String {
    DEFAULT_CONTACT_TO_EMAIL.to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            env: default_env(),
            name: default_name(),
            port: default_port(),
            host: default_host(),
            worker_count: default_worker_count(),
            cors_allowed_origins: default_cors_origins(),
            redis_url: None,
            redis_token: None,
            rate_limit_in_memory: false,
            rate_limit_max_requests: default_rate_limit_max_requests(),
            rate_limit_window_secs: default_rate_limit_window_secs(),
            resend_api_key: None,
            resend_api_url: default_resend_api_url(),
            smtp_host: None,
            smtp_port: default_smtp_port(),
            smtp_user: None,
            smtp_password: None,
            contact_to_email: default_contact_to_email(),
            contact_from_email: None,
        }
    }
}

impl AppConfig {
    pub fn new() -> Result<Self, ConfigError> {
        dotenv().ok();

        let raw_env = env::var("APP_ENV").unwrap_or_else(|_| "development".into());
        let env_name = AppEnvironment::from_str(&raw_env)
            .map_err(|_| ConfigError::Message(format!("Invalid APP_ENV value: {}", raw_env)))?;

        let builder = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", env_name)).required(false))
            .add_source(
                Environment::with_prefix("APP")
                    .prefix_separator("_")
                    .separator("__")
                    .ignore_empty(true),
            );

        let mut config: Self = builder.build()?.try_deserialize()?;

        config.env = env_name;

        // Integration secrets are commonly provisioned without the APP_ prefix
        config.redis_url = or_env(config.redis_url, "REDIS_URL");
        config.redis_token = or_env(config.redis_token, "REDIS_TOKEN");
        config.resend_api_key = or_env(config.resend_api_key, "RESEND_API_KEY");
        config.smtp_host = or_env(config.smtp_host, "SMTP_HOST");
        config.smtp_user = or_env(config.smtp_user, "SMTP_USER");
        config.smtp_password = or_env(config.smtp_password, "SMTP_PASSWORD");
        config.contact_from_email = or_env(config.contact_from_email, "CONTACT_FROM_EMAIL");

        if env::var("APP_SMTP_PORT").is_err() {
            if let Some(port) = or_env(None, "SMTP_PORT") {
                config.smtp_port = port
                    .parse()
                    .map_err(|_| ConfigError::Message(format!("Invalid SMTP_PORT value: {port}")))?;
            }
        }
        if env::var("APP_CONTACT_TO_EMAIL").is_err() {
            if let Some(to) = or_env(None, "CONTACT_TO_EMAIL") {
                config.contact_to_email = to;
            }
        }

        config.normalize();
        config.validate()?;
        Ok(config)
    }

    /// Treats blank optional values as unset.
    fn normalize(&mut self) {
        for field in [
            &mut self.redis_url,
            &mut self.redis_token,
            &mut self.resend_api_key,
            &mut self.smtp_host,
            &mut self.smtp_user,
            &mut self.smtp_password,
            &mut self.contact_from_email,
        ] {
            if field.as_deref().is_some_and(|v| v.trim().is_empty()) {
                *field = None;
            }
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut errors = Vec::new();

        if self.port == 0 && self.env != AppEnvironment::Testing {
            errors.push("PORT must be non-zero outside testing");
        }
        if self.is_production() && self.cors_origins().iter().any(|o| o == "*") {
            errors.push("Wildcard CORS (*) is not allowed in production");
        }
        if self.worker_count == 0 {
            errors.push("WORKER_COUNT must be greater than zero");
        }
        if self.rate_limit_max_requests == 0 {
            errors.push("RATE_LIMIT_MAX_REQUESTS must be greater than zero");
        }
        if self.rate_limit_window_secs == 0 {
            errors.push("RATE_LIMIT_WINDOW_SECS must be greater than zero");
        }
        if self.smtp_host.is_some() && (self.smtp_user.is_none() || self.smtp_password.is_none()) {
            errors.push("SMTP_HOST requires SMTP_USER and SMTP_PASSWORD");
        }
        if self.contact_to_email.trim().is_empty() {
            errors.push("CONTACT_TO_EMAIL cannot be empty");
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Message(errors.join(", ")))
        }
    }

    pub fn is_production(&self) -> bool {
        self.env == AppEnvironment::Production
    }

    pub fn cors_origins(&self) -> Vec<String> {
        self.cors_allowed_origins
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect()
    }

    pub fn rate_limit_window(&self) -> Duration {
        Duration::from_secs(self.rate_limit_window_secs)
    }
}

fn or_env(current: Option<String>, env_key: &str) -> Option<String> {
    current.or_else(|| env::var(env_key).ok().filter(|v| !v.trim().is_empty()))
}

impl fmt::Display for AppEnvironment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            AppEnvironment::Development => "development",
            AppEnvironment::Production => "production",
            AppEnvironment::Testing => "testing",
        };
        write!(f, "{s}")
    }
}

trait Redact {
    fn redact(&self) -> &str;
}

impl Redact for Option<String> {
    fn redact(&self) -> &str {
        match self.as_deref() {
            None | Some("") => "[MISSING]",
            Some(_) => "[REDACTED]",
        }
    }
}

impl fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("name", &self.name)
            .field("port", &self.port)
            .field("host", &self.host)
            .field("worker_count", &self.worker_count)
            .field("cors_allowed_origins", &self.cors_allowed_origins)
            .field("redis_url", &self.redis_url.redact())
            .field("redis_token", &self.redis_token.redact())
            .field("rate_limit_in_memory", &self.rate_limit_in_memory)
            .field("rate_limit_max_requests", &self.rate_limit_max_requests)
            .field("rate_limit_window_secs", &self.rate_limit_window_secs)
            .field("resend_api_key", &self.resend_api_key.redact())
            .field("resend_api_url", &self.resend_api_url)
            .field("smtp_host", &self.smtp_host)
            .field("smtp_port", &self.smtp_port)
            .field("smtp_user", &self.smtp_user)
            .field("smtp_password", &self.smtp_password.redact())
            .field("contact_to_email", &self.contact_to_email)
            .field("contact_from_email", &self.contact_from_email)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_contact_policy() {
        let config = AppConfig::default();

        assert_eq!(config.rate_limit_max_requests, 5);
        assert_eq!(config.rate_limit_window(), Duration::from_secs(600));
        assert_eq!(config.contact_to_email, DEFAULT_CONTACT_TO_EMAIL);
        assert_eq!(config.resend_api_url, "https://api.resend.com/emails");
        assert_eq!(config.smtp_port, 587);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn debug_output_hides_secrets() {
        let config = AppConfig {
            redis_url: Some("redis://:hunter2@cache:6379".into()),
            resend_api_key: Some("re_live_abcdef".into()),
            smtp_password: Some("smtp-pass".into()),
            ..AppConfig::default()
        };

        let out = format!("{config:?}");
        assert!(!out.contains("hunter2"));
        assert!(!out.contains("re_live_abcdef"));
        assert!(!out.contains("smtp-pass"));
        assert!(out.contains("[REDACTED]"));
        assert!(out.contains("redis_token: \"[MISSING]\""));
    }

    #[test]
    fn smtp_host_needs_credentials() {
        let config = AppConfig {
            smtp_host: Some("smtp.example.com".into()),
            ..AppConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn production_rejects_wildcard_cors() {
        let config = AppConfig {
            env: AppEnvironment::Production,
            ..AppConfig::default()
        };
        assert!(config.validate().is_err());

        let config = AppConfig {
            env: AppEnvironment::Production,
            cors_allowed_origins: "https://example.dev, https://www.example.dev".into(),
            ..AppConfig::default()
        };
        assert!(config.validate().is_ok());
        assert_eq!(
            config.cors_origins(),
            vec!["https://example.dev", "https://www.example.dev"]
        );
    }

    #[test]
    fn blank_secrets_are_unset() {
        let mut config = AppConfig {
            resend_api_key: Some("  ".into()),
            ..AppConfig::default()
        };
        config.normalize();
        assert!(config.resend_api_key.is_none());
    }
}
