//! Configuration management
//!
//! Loads configuration from:
//! 1. Default values
//! 2. Configuration file (config/local.toml)
//! 3. Environment variables (override)

use serde::Deserialize;

/// Main application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub auth: AuthConfig,
    pub logging: LoggingConfig,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Bind address (e.g., "0.0.0.0")
    pub host: String,
    /// Port number (e.g., 3000)
    pub port: u16,
}

/// Authentication configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    /// JWT signing secret (32+ bytes). Required: there is no default,
    /// and startup fails if it is absent or too short.
    pub jwt_secret: String,
    /// Identity token lifetime in seconds (default: 3600 = 1 hour)
    pub token_ttl_seconds: i64,
    /// Argon2 memory cost in KiB (default: 19456)
    pub hash_memory_kib: u32,
    /// Argon2 iteration count (default: 2)
    pub hash_iterations: u32,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error
    pub level: String,
    /// Log format: "pretty" or "json"
    pub format: String,
}

impl AppConfig {
    /// Load configuration from file and environment
    ///
    /// # Loading Order
    /// 1. Default values
    /// 2. config/default.toml (if exists)
    /// 3. config/local.toml (if exists)
    /// 4. Environment variables (TRANDAIZ_*)
    ///
    /// # Errors
    /// Returns error if configuration is invalid. In particular,
    /// `auth.jwt_secret` has no default and must be provided.
    pub fn load() -> Result<Self, crate::error::AppError> {
        use config::{Config, Environment, File};

        let config = Config::builder()
            // Start with default values
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 3000)?
            .set_default("auth.token_ttl_seconds", 3600)?
            .set_default("auth.hash_memory_kib", 19456)?
            .set_default("auth.hash_iterations", 2)?
            .set_default("logging.level", "info")?
            .set_default("logging.format", "pretty")?
            // Load from config/default.toml if it exists
            .add_source(File::with_name("config/default").required(false))
            // Load from config/local.toml if it exists (overrides default)
            .add_source(File::with_name("config/local").required(false))
            // Load from environment variables (TRANDAIZ_*)
            .add_source(
                Environment::with_prefix("TRANDAIZ")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| crate::error::AppError::Config(e.to_string()))?;

        let app_config: Self = config
            .try_deserialize()
            .map_err(|e| crate::error::AppError::Config(e.to_string()))?;
        app_config.validate()?;
        Ok(app_config)
    }

    pub fn validate(&self) -> Result<(), crate::error::AppError> {
        const MIN_JWT_SECRET_BYTES: usize = 32;

        if self.auth.jwt_secret.as_bytes().len() < MIN_JWT_SECRET_BYTES {
            return Err(crate::error::AppError::Config(format!(
                "auth.jwt_secret must be at least {} bytes",
                MIN_JWT_SECRET_BYTES
            )));
        }

        if self.auth.token_ttl_seconds <= 0 {
            return Err(crate::error::AppError::Config(
                "auth.token_ttl_seconds must be greater than 0".to_string(),
            ));
        }

        if self.auth.hash_iterations == 0 {
            return Err(crate::error::AppError::Config(
                "auth.hash_iterations must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_config() -> AppConfig {
        AppConfig {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 3000,
            },
            auth: AuthConfig {
                jwt_secret: "x".repeat(32),
                token_ttl_seconds: 3600,
                hash_memory_kib: 19456,
                hash_iterations: 2,
            },
            logging: LoggingConfig {
                level: "info".to_string(),
                format: "pretty".to_string(),
            },
        }
    }

    #[test]
    fn validate_accepts_complete_config() {
        let config = valid_config();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn validate_rejects_short_jwt_secret() {
        let mut config = valid_config();
        config.auth.jwt_secret = "short-secret".to_string();

        let error = config
            .validate()
            .expect_err("jwt secret shorter than 32 bytes must fail");
        assert!(matches!(
            error,
            crate::error::AppError::Config(message)
                if message.contains("auth.jwt_secret")
        ));
    }

    #[test]
    fn validate_rejects_nonpositive_token_ttl() {
        let mut config = valid_config();
        config.auth.token_ttl_seconds = 0;

        let error = config
            .validate()
            .expect_err("zero token ttl must fail");
        assert!(matches!(
            error,
            crate::error::AppError::Config(message)
                if message.contains("token_ttl_seconds")
        ));
    }
}
