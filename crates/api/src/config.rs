use serde::Deserialize;
use std::net::SocketAddr;

/// URL scheme that selects the in-process ticket store.
pub const MEMORY_STORE_URL: &str = "memory://";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub logging: LoggingConfig,
    pub security: SecurityConfig,
    /// Operator PIN and session token settings
    #[serde(default)]
    pub auth: AuthConfig,
    /// Soft-deleted ticket retention
    #[serde(default)]
    pub retention: RetentionConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Base URL used to build shareable ticket links (`{base}/t/{id}`)
    #[serde(default = "default_public_base_url")]
    pub public_base_url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// PostgreSQL URL, `memory://`, or empty when no store is configured.
    #[serde(default)]
    pub url: String,

    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    #[serde(default = "default_min_connections")]
    pub min_connections: u32,

    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,

    #[serde(default = "default_idle_timeout")]
    pub idle_timeout_secs: u64,
}

/// Which ticket store backend the database URL selects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    NotConfigured,
    Memory,
    Postgres,
}

impl DatabaseConfig {
    pub fn backend(&self) -> StoreBackend {
        let url = self.url.trim();
        if url.is_empty() {
            StoreBackend::NotConfigured
        } else if url.starts_with(MEMORY_STORE_URL) {
            StoreBackend::Memory
        } else {
            StoreBackend::Postgres
        }
    }
}

impl From<&DatabaseConfig> for persistence::db::PoolSettings {
    fn from(config: &DatabaseConfig) -> Self {
        Self {
            url: config.url.clone(),
            max_connections: config.max_connections,
            min_connections: config.min_connections,
            connect_timeout_secs: config.connect_timeout_secs,
            idle_timeout_secs: config.idle_timeout_secs,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_log_format")]
    pub format: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SecurityConfig {
    #[serde(default)]
    pub cors_origins: Vec<String>,

    /// Login attempts allowed per client per minute (0 disables the limit)
    #[serde(default = "default_login_rate_limit")]
    pub login_rate_limit_per_minute: u32,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuthConfig {
    /// Argon2id PHC hash of the operator PIN
    #[serde(default)]
    pub admin_pin_hash: String,

    /// HS256 signing secret for session tokens
    #[serde(default)]
    pub session_secret: String,

    #[serde(default = "default_session_expiry")]
    pub session_expiry_secs: i64,

    #[serde(default = "default_jwt_leeway")]
    pub leeway_secs: u64,
}

impl AuthConfig {
    /// Both the PIN hash and the signing secret are present.
    pub fn is_configured(&self) -> bool {
        !self.admin_pin_hash.trim().is_empty() && !self.session_secret.is_empty()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RetentionConfig {
    /// Days a soft-deleted ticket stays in the trash (0 keeps it forever)
    #[serde(default = "default_deleted_ticket_days")]
    pub deleted_ticket_days: u32,

    #[serde(default = "default_purge_interval_minutes")]
    pub purge_interval_minutes: u64,
}

impl Default for RetentionConfig {
    fn default() -> Self {
        Self {
            deleted_ticket_days: default_deleted_ticket_days(),
            purge_interval_minutes: default_purge_interval_minutes(),
        }
    }
}

// Default value functions
fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_port() -> u16 {
    8080
}
fn default_request_timeout() -> u64 {
    30
}
fn default_public_base_url() -> String {
    "http://localhost:8080".to_string()
}
fn default_max_connections() -> u32 {
    20
}
fn default_min_connections() -> u32 {
    5
}
fn default_connect_timeout() -> u64 {
    10
}
fn default_idle_timeout() -> u64 {
    600
}
fn default_log_level() -> String {
    "info".to_string()
}
fn default_log_format() -> String {
    "json".to_string()
}
fn default_login_rate_limit() -> u32 {
    10
}
fn default_session_expiry() -> i64 {
    43200 // 12 hours, one event shift
}
fn default_jwt_leeway() -> u64 {
    shared::jwt::DEFAULT_LEEWAY_SECS
}
fn default_deleted_ticket_days() -> u32 {
    30
}
fn default_purge_interval_minutes() -> u64 {
    60
}

/// Longest accepted trash retention window, in days.
pub const MAX_RETENTION_DAYS: u32 = 36_500;

#[derive(Debug, thiserror::Error)]
pub enum ConfigValidationError {
    #[error("Missing required configuration: {0}")]
    MissingRequired(String),

    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),
}

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default"))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(config::Environment::with_prefix("TD").separator("__"))
            .build()?;

        let cfg: Self = config.try_deserialize()?;
        cfg.validate()
            .map_err(|e| config::ConfigError::Message(e.to_string()))?;
        Ok(cfg)
    }

    /// Loads embedded defaults plus overrides, without validation.
    pub fn load_for_test(overrides: &[(&str, &str)]) -> Result<Self, config::ConfigError> {
        let defaults = r#"
            [server]
            host = "127.0.0.1"
            port = 8080
            request_timeout_secs = 30
            public_base_url = "https://tickets.example.com"

            [database]
            url = ""
            max_connections = 20
            min_connections = 5
            connect_timeout_secs = 10
            idle_timeout_secs = 600

            [logging]
            level = "info"
            format = "json"

            [security]
            cors_origins = []
            login_rate_limit_per_minute = 0

            [auth]
            admin_pin_hash = ""
            session_secret = ""
            session_expiry_secs = 900
            leeway_secs = 0

            [retention]
            deleted_ticket_days = 30
            purge_interval_minutes = 60
        "#;

        let mut builder = config::Config::builder()
            .add_source(config::File::from_str(defaults, config::FileFormat::Toml));

        for (key, value) in overrides {
            builder = builder.set_override(*key, *value)?;
        }

        builder.build()?.try_deserialize()
    }

    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        // Validate port range
        if self.server.port == 0 {
            return Err(ConfigValidationError::InvalidValue(
                "Server port cannot be 0".to_string(),
            ));
        }

        if self.server.public_base_url.trim().is_empty() {
            return Err(ConfigValidationError::MissingRequired(
                "TD__SERVER__PUBLIC_BASE_URL must be set".to_string(),
            ));
        }

        // Validate connection pool settings
        if self.database.min_connections > self.database.max_connections {
            return Err(ConfigValidationError::InvalidValue(
                "min_connections cannot exceed max_connections".to_string(),
            ));
        }

        let auth = &self.auth;
        if !auth.session_secret.is_empty()
            && auth.session_secret.len() < shared::jwt::MIN_SECRET_LEN
        {
            return Err(ConfigValidationError::InvalidValue(format!(
                "auth.session_secret must be at least {} bytes",
                shared::jwt::MIN_SECRET_LEN
            )));
        }

        if !auth.admin_pin_hash.trim().is_empty() && !shared::pin::is_valid_hash(&auth.admin_pin_hash)
        {
            return Err(ConfigValidationError::InvalidValue(
                "auth.admin_pin_hash must be an Argon2 PHC string".to_string(),
            ));
        }

        if !(1..=shared::jwt::MAX_EXPIRY_SECS).contains(&auth.session_expiry_secs) {
            return Err(ConfigValidationError::InvalidValue(format!(
                "auth.session_expiry_secs must be between 1 and {}",
                shared::jwt::MAX_EXPIRY_SECS
            )));
        }

        if self.retention.deleted_ticket_days > MAX_RETENTION_DAYS {
            return Err(ConfigValidationError::InvalidValue(format!(
                "retention.deleted_ticket_days must be at most {}",
                MAX_RETENTION_DAYS
            )));
        }

        if self.retention.deleted_ticket_days > 0 && self.retention.purge_interval_minutes == 0 {
            return Err(ConfigValidationError::InvalidValue(
                "retention.purge_interval_minutes must be positive".to_string(),
            ));
        }

        Ok(())
    }

    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigValidationError> {
        format!("{}:{}", self.server.host, self.server.port)
            .parse()
            .map_err(|e| ConfigValidationError::InvalidValue(format!("socket address: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test_secret_key_for_session_tokens_0123456789";

    #[test]
    fn test_config_load_with_defaults() {
        let config = Config::load_for_test(&[]).expect("Failed to load config");

        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.database.max_connections, 20);
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.retention.deleted_ticket_days, 30);
        assert_eq!(config.retention.purge_interval_minutes, 60);
        assert!(!config.auth.is_configured());
    }

    #[test]
    fn test_config_overrides() {
        let config = Config::load_for_test(&[
            ("database.url", "memory://"),
            ("server.port", "9090"),
            ("auth.session_secret", SECRET),
        ])
        .expect("Failed to load config");

        assert_eq!(config.server.port, 9090);
        assert_eq!(config.database.url, "memory://");
        assert_eq!(config.auth.session_secret, SECRET);
    }

    #[test]
    fn test_store_backend_selection() {
        let mut config = Config::load_for_test(&[]).unwrap();
        assert_eq!(config.database.backend(), StoreBackend::NotConfigured);

        config.database.url = "memory://".to_string();
        assert_eq!(config.database.backend(), StoreBackend::Memory);

        config.database.url = "postgres://td:td@localhost:5432/tickets".to_string();
        assert_eq!(config.database.backend(), StoreBackend::Postgres);

        config.database.url = "   ".to_string();
        assert_eq!(config.database.backend(), StoreBackend::NotConfigured);
    }

    #[test]
    fn test_validation_defaults_pass() {
        let config = Config::load_for_test(&[]).unwrap();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validation_rejects_port_zero() {
        let config = Config::load_for_test(&[("server.port", "0")]).unwrap();
        assert!(matches!(
            config.validate(),
            Err(ConfigValidationError::InvalidValue(_))
        ));
    }

    #[test]
    fn test_validation_rejects_inverted_pool_bounds() {
        let config = Config::load_for_test(&[
            ("database.min_connections", "30"),
            ("database.max_connections", "10"),
        ])
        .unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_rejects_short_secret() {
        let config = Config::load_for_test(&[("auth.session_secret", "short")]).unwrap();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("session_secret"));
    }

    #[test]
    fn test_validation_rejects_out_of_range_session_expiry() {
        let config = Config::load_for_test(&[(
            "auth.session_expiry_secs",
            "9223372036854775807",
        )])
        .unwrap();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("session_expiry_secs"));

        let config = Config::load_for_test(&[("auth.session_expiry_secs", "0")]).unwrap();
        assert!(config.validate().is_err());

        let config = Config::load_for_test(&[("auth.session_expiry_secs", "2592000")]).unwrap();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validation_rejects_out_of_range_retention() {
        let config =
            Config::load_for_test(&[("retention.deleted_ticket_days", "4294967295")]).unwrap();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("deleted_ticket_days"));

        let config = Config::load_for_test(&[("retention.deleted_ticket_days", "36500")]).unwrap();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validation_rejects_plaintext_pin() {
        let config = Config::load_for_test(&[("auth.admin_pin_hash", "2823")]).unwrap();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("admin_pin_hash"));
    }

    #[test]
    fn test_validation_accepts_hashed_pin() {
        let hash = shared::pin::hash_pin("2823").unwrap();
        let config = Config::load_for_test(&[
            ("auth.admin_pin_hash", hash.as_str()),
            ("auth.session_secret", SECRET),
        ])
        .unwrap();
        assert!(config.validate().is_ok());
        assert!(config.auth.is_configured());
    }

    #[test]
    fn test_socket_addr() {
        let config = Config::load_for_test(&[("server.port", "3000")]).unwrap();
        assert_eq!(config.socket_addr().unwrap().port(), 3000);

        let bad = Config::load_for_test(&[("server.host", "not a host")]).unwrap();
        assert!(bad.socket_addr().is_err());
    }

    #[test]
    fn test_database_config_conversion() {
        let config = Config::load_for_test(&[("database.url", "postgres://localhost/td")]).unwrap();
        let pool_config = persistence::db::PoolSettings::from(&config.database);
        assert_eq!(pool_config.url, "postgres://localhost/td");
        assert_eq!(pool_config.max_connections, 20);
    }
}
