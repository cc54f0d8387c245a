//! Server Configuration
//!
//! Read once at startup from the process environment (after `.env` has been
//! loaded). Missing required values abort startup.

use std::env;
use std::fmt;
use std::net::IpAddr;
use std::time::Duration;

use anyhow::{Context, bail};

const DEFAULT_FRONTEND_ORIGINS: &str = "http://localhost:40922,http://127.0.0.1:40922";

#[derive(Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub db_max_connections: u32,
    pub jwt_secret: String,
    pub server_port: u16,
    /// Public base URL used in links sent by mail
    pub backend_base_url: String,
    pub frontend_origins: Vec<String>,
    pub password_pepper: Option<String>,
    /// Content generation is disabled when unset
    pub ai_api_key: Option<String>,
    pub ai_model: Option<String>,
    pub ai_base_url: Option<String>,
    pub mail_from: Option<String>,
    pub request_timeout: Duration,
    pub reaper_interval: Duration,
    pub auth_rate_limit_max: u32,
    pub auth_rate_limit_window_secs: u64,
    /// Reverse proxies allowed to set `X-Forwarded-For`; empty trusts none
    pub trusted_proxies: Vec<IpAddr>,
    /// JSON log lines instead of the human-readable format
    pub log_json: bool,
}

impl fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppConfig")
            .field("database_url", &"[REDACTED]")
            .field("db_max_connections", &self.db_max_connections)
            .field("jwt_secret", &"[REDACTED]")
            .field("server_port", &self.server_port)
            .field("backend_base_url", &self.backend_base_url)
            .field("frontend_origins", &self.frontend_origins)
            .field("password_pepper", &self.password_pepper.as_ref().map(|_| "[REDACTED]"))
            .field("ai_api_key", &self.ai_api_key.as_ref().map(|_| "[REDACTED]"))
            .field("ai_model", &self.ai_model)
            .field("ai_base_url", &self.ai_base_url)
            .field("mail_from", &self.mail_from)
            .field("request_timeout", &self.request_timeout)
            .field("reaper_interval", &self.reaper_interval)
            .field("auth_rate_limit_max", &self.auth_rate_limit_max)
            .field("auth_rate_limit_window_secs", &self.auth_rate_limit_window_secs)
            .field("trusted_proxies", &self.trusted_proxies)
            .field("log_json", &self.log_json)
            .finish()
    }
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from any key lookup; blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let required = |key: &str| get(key).with_context(|| format!("{} must be set", key));

        let jwt_secret = required("JWT_SECRET")?;
        if jwt_secret.len() < 32 {
            bail!("JWT_SECRET must be at least 32 bytes");
        }

        Ok(Self {
            database_url: required("DATABASE_URL")?,
            db_max_connections: parse_or(get("DB_MAX_CONNECTIONS"), "DB_MAX_CONNECTIONS", 5)?,
            jwt_secret,
            server_port: required("SERVER_PORT")?
                .parse()
                .context("SERVER_PORT must be a port number")?,
            backend_base_url: required("BACKEND_BASE_URL")?,
            frontend_origins: get("FRONTEND_ORIGINS")
                .unwrap_or_else(|| DEFAULT_FRONTEND_ORIGINS.to_string())
                .split(',')
                .map(str::trim)
                .filter(|o| !o.is_empty())
                .map(str::to_string)
                .collect(),
            password_pepper: get("PASSWORD_PEPPER"),
            ai_api_key: get("AI_API_KEY"),
            ai_model: get("AI_MODEL"),
            ai_base_url: get("AI_BASE_URL"),
            mail_from: get("MAIL_FROM"),
            request_timeout: Duration::from_secs(parse_or(
                get("REQUEST_TIMEOUT_SECS"),
                "REQUEST_TIMEOUT_SECS",
                30,
            )?),
            reaper_interval: Duration::from_secs(parse_or(
                get("REAPER_INTERVAL_SECS"),
                "REAPER_INTERVAL_SECS",
                600,
            )?),
            auth_rate_limit_max: parse_or(get("AUTH_RATE_LIMIT_MAX"), "AUTH_RATE_LIMIT_MAX", 20)?,
            auth_rate_limit_window_secs: parse_or(
                get("AUTH_RATE_LIMIT_WINDOW_SECS"),
                "AUTH_RATE_LIMIT_WINDOW_SECS",
                60,
            )?,
            trusted_proxies: get("TRUSTED_PROXIES")
                .unwrap_or_default()
                .split(',')
                .map(str::trim)
                .filter(|p| !p.is_empty())
                .map(|p| {
                    p.parse::<IpAddr>()
                        .with_context(|| format!("TRUSTED_PROXIES has an invalid address: {}", p))
                })
                .collect::<anyhow::Result<_>>()?,
            log_json: get("LOG_FORMAT").is_some_and(|f| f.eq_ignore_ascii_case("json")),
        })
    }
}

fn parse_or<T>(value: Option<String>, key: &str, default: T) -> anyhow::Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match value {
        Some(v) => v
            .parse()
            .with_context(|| format!("{} has an invalid value: {}", key, v)),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    const REQUIRED: &[(&str, &str)] = &[
        ("DATABASE_URL", "postgres://localhost/medium"),
        ("JWT_SECRET", "0123456789abcdef0123456789abcdef"),
        ("SERVER_PORT", "8080"),
        ("BACKEND_BASE_URL", "http://localhost:8080"),
    ];

    #[test]
    fn test_defaults() {
        let config = AppConfig::from_lookup(lookup(REQUIRED)).unwrap();
        assert_eq!(config.server_port, 8080);
        assert_eq!(config.db_max_connections, 5);
        assert_eq!(config.request_timeout, Duration::from_secs(30));
        assert_eq!(config.reaper_interval, Duration::from_secs(600));
        assert_eq!(config.auth_rate_limit_max, 20);
        assert_eq!(config.frontend_origins.len(), 2);
        assert!(config.ai_api_key.is_none());
        assert!(config.trusted_proxies.is_empty());
        assert!(!config.log_json);
    }

    #[test]
    fn test_missing_required() {
        let err = AppConfig::from_lookup(lookup(&REQUIRED[1..])).unwrap_err();
        assert!(err.to_string().contains("DATABASE_URL"));

        let mut short_secret = REQUIRED.to_vec();
        short_secret[1] = ("JWT_SECRET", "short");
        assert!(AppConfig::from_lookup(lookup(&short_secret)).is_err());
    }

    #[test]
    fn test_overrides() {
        let mut pairs = REQUIRED.to_vec();
        pairs.extend([
            ("AI_API_KEY", "key"),
            ("FRONTEND_ORIGINS", "https://a.example, ,https://b.example"),
            ("REQUEST_TIMEOUT_SECS", "5"),
            ("LOG_FORMAT", "JSON"),
            ("PASSWORD_PEPPER", "   "),
        ]);
        let config = AppConfig::from_lookup(lookup(&pairs)).unwrap();
        assert_eq!(config.ai_api_key.as_deref(), Some("key"));
        assert_eq!(config.frontend_origins, vec!["https://a.example", "https://b.example"]);
        assert_eq!(config.request_timeout, Duration::from_secs(5));
        assert!(config.log_json);
        assert!(config.password_pepper.is_none());
    }

    #[test]
    fn test_invalid_numbers() {
        let mut pairs = REQUIRED.to_vec();
        pairs[2] = ("SERVER_PORT", "not-a-port");
        let err = AppConfig::from_lookup(lookup(&pairs)).unwrap_err();
        assert!(err.to_string().contains("SERVER_PORT"));

        let mut pairs = REQUIRED.to_vec();
        pairs.push(("REAPER_INTERVAL_SECS", "-1"));
        let err = AppConfig::from_lookup(lookup(&pairs)).unwrap_err();
        assert!(err.to_string().contains("REAPER_INTERVAL_SECS"));
    }

    #[test]
    fn test_trusted_proxies() {
        let mut pairs = REQUIRED.to_vec();
        pairs.push(("TRUSTED_PROXIES", "10.0.0.2, ::1,"));
        let config = AppConfig::from_lookup(lookup(&pairs)).unwrap();
        let expected: Vec<IpAddr> = vec!["10.0.0.2".parse().unwrap(), "::1".parse().unwrap()];
        assert_eq!(config.trusted_proxies, expected);

        let mut pairs = REQUIRED.to_vec();
        pairs.push(("TRUSTED_PROXIES", "10.0.0.0/8"));
        let err = AppConfig::from_lookup(lookup(&pairs)).unwrap_err();
        assert!(err.to_string().contains("TRUSTED_PROXIES"));
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let config = AppConfig::from_lookup(lookup(REQUIRED)).unwrap();
        let debug = format!("{:?}", config);
        assert!(!debug.contains("0123456789abcdef"));
        assert!(!debug.contains("postgres://"));
    }
}
