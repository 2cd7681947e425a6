use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

use crate::constants::limits;

/// Minimum length of the cookie signing secret, in bytes.
pub const MIN_SESSION_SECRET_LEN: usize = 64;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub general: GeneralConfig,

    pub database: DatabaseConfig,

    pub server: ServerConfig,

    pub security: SecurityConfig,

    pub limits: LimitsConfig,

    pub observability: ObservabilityConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    pub log_level: String,

    /// "pretty" or "json"
    pub log_format: String,

    /// Number of tokio worker threads (default: 2)
    /// Set to 0 to use the number of CPU cores
    pub worker_threads: usize,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: "pretty".to_string(),
            worker_threads: 2,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// Connection string. Overridden by `DATABASE_URL`.
    pub url: String,

    pub max_connections: u32,

    pub min_connections: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite:data/userbase.db".to_string(),
            max_connections: 5,
            min_connections: 1,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_address: String,

    pub port: u16,

    /// Whether to set the Secure flag on session cookies.
    /// Set to false for local development without HTTPS.
    pub secure_cookies: bool,

    /// Sessions expire after this many minutes without a request.
    pub session_inactivity_minutes: i64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0".to_string(),
            port: 5000,
            secure_cookies: true,
            session_inactivity_minutes: 60,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SecurityConfig {
    /// Argon2 memory cost in KiB (default: 8192 = 8MB)
    pub argon2_memory_cost_kib: u32,

    /// Argon2 time cost (iterations)
    pub argon2_time_cost: u32,

    /// Argon2 parallelism (default: 1)
    pub argon2_parallelism: u32,

    /// Secret used to sign the session cookie. Overridden by `SECRET_KEY`.
    /// Never written back to disk.
    #[serde(skip_serializing)]
    pub session_secret: Option<String>,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            argon2_memory_cost_kib: 8192,
            argon2_time_cost: 3,
            argon2_parallelism: 1,
            session_secret: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Upper bound for username, names and email.
    pub max_string_length: usize,

    pub min_password_length: usize,

    pub max_password_length: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_string_length: limits::MAX_STRING_LENGTH,
            min_password_length: limits::MIN_PASSWORD_LENGTH,
            max_password_length: limits::MAX_PASSWORD_LENGTH,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    pub metrics_enabled: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            metrics_enabled: true,
        }
    }
}

impl Config {
    /// Loads the first config file found, then applies environment overrides.
    pub fn load() -> Result<Self> {
        let mut config = Self::load_file()?;
        config.apply_env_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    fn load_file() -> Result<Self> {
        for path in &Self::config_paths() {
            if path.exists() {
                info!("Loading config from: {}", path.display());
                return Self::load_from_path(path);
            }
        }

        info!("No config file found, using defaults");
        Ok(Self::default())
    }

    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// `DATABASE_URL`, `SECRET_KEY` and `PORT` take precedence over the file.
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("DATABASE_URL").filter(|v| !v.is_empty()) {
            self.database.url = url;
        }

        if let Some(secret) = lookup("SECRET_KEY").filter(|v| !v.is_empty()) {
            self.security.session_secret = Some(secret);
        }

        if let Some(port) = lookup("PORT").and_then(|v| v.parse().ok()) {
            self.server.port = port;
        }
    }

    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        info!("Config saved to: {}", path.display());
        Ok(())
    }

    fn config_paths() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from("config.toml")];

        if let Some(config_dir) = dirs::config_dir() {
            paths.push(config_dir.join("userbase").join("config.toml"));
        }

        if let Some(home) = dirs::home_dir() {
            paths.push(home.join(".userbase").join("config.toml"));
        }

        paths
    }

    fn default_config_path() -> PathBuf {
        PathBuf::from("config.toml")
    }

    pub fn create_default_if_missing() -> Result<bool> {
        let path = Self::default_config_path();
        if path.exists() {
            Ok(false)
        } else {
            Self::default().save_to_path(&path)?;
            info!("Created default config file: {}", path.display());
            Ok(true)
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.database.url.is_empty() {
            anyhow::bail!("Database URL cannot be empty");
        }

        if self.limits.max_string_length == 0 {
            anyhow::bail!("limits.max_string_length must be > 0");
        }

        if self.limits.min_password_length > self.limits.max_password_length {
            anyhow::bail!(
                "limits.min_password_length ({}) exceeds limits.max_password_length ({})",
                self.limits.min_password_length,
                self.limits.max_password_length
            );
        }

        if let Some(secret) = &self.security.session_secret
            && secret.len() < MIN_SESSION_SECRET_LEN
        {
            anyhow::bail!(
                "Session secret must be at least {MIN_SESSION_SECRET_LEN} bytes (got {})",
                secret.len()
            );
        }

        if self.server.session_inactivity_minutes <= 0 {
            anyhow::bail!("server.session_inactivity_minutes must be > 0");
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.limits.max_string_length, 64);
        assert_eq!(config.limits.min_password_length, 6);
        assert_eq!(config.limits.max_password_length, 20);
        assert!(config.server.secure_cookies);
        assert!(config.security.session_secret.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_serialization_omits_secret() {
        let mut config = Config::default();
        config.security.session_secret = Some("s".repeat(64));
        let toml_str = toml::to_string_pretty(&config).unwrap();
        assert!(toml_str.contains("[database]"));
        assert!(toml_str.contains("[limits]"));
        assert!(!toml_str.contains("session_secret"));
    }

    #[test]
    fn test_config_deserialization() {
        let toml_str = r#"
            [general]
            log_level = "debug"

            [limits]
            min_password_length = 8
        "#;

        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.general.log_level, "debug");
        assert_eq!(config.limits.min_password_length, 8);
        assert_eq!(config.limits.max_password_length, 20);
        assert_eq!(config.database.url, "sqlite:data/userbase.db");
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = HashMap::from([
            ("DATABASE_URL", "postgres://app@localhost/app"),
            ("SECRET_KEY", "k"),
            ("PORT", "8080"),
        ]);

        let mut config = Config::default();
        config.apply_env_overrides(|key| env.get(key).map(ToString::to_string));

        assert_eq!(config.database.url, "postgres://app@localhost/app");
        assert_eq!(config.security.session_secret.as_deref(), Some("k"));
        assert_eq!(config.server.port, 8080);
    }

    #[test]
    fn test_env_overrides_ignore_empty_and_invalid() {
        let mut config = Config::default();
        config.apply_env_overrides(|key| match key {
            "DATABASE_URL" => Some(String::new()),
            "PORT" => Some("not-a-port".to_string()),
            _ => None,
        });

        assert_eq!(config.database.url, "sqlite:data/userbase.db");
        assert_eq!(config.server.port, 5000);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = Config::default();
        config.limits.min_password_length = 30;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.security.session_secret = Some("too-short".to_string());
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.security.session_secret = Some("x".repeat(MIN_SESSION_SECRET_LEN));
        assert!(config.validate().is_ok());
    }
}
