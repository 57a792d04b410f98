use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub security: SecurityConfig,
    pub quota: QuotaConfig,
    pub openai: OpenAiConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub max_connections: u32,
    pub acquire_timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    /// Symmetric JWT signing secret. Empty means unconfigured, which is a
    /// fatal startup condition (checked in main).
    pub jwt_secret: String,
    /// Session token lifetime. Defaults to one hour.
    pub session_ttl_secs: i64,
    /// Password reset token lifetime. Deliberately short.
    pub reset_ttl_secs: i64,
    pub bcrypt_cost: u32,
    /// Marks the token cookie `Secure` + `SameSite=None` (cross-origin
    /// frontends over HTTPS). Off in development so plain-http works.
    pub secure_cookies: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuotaConfig {
    /// Hard ceiling on admitted metered calls per user.
    pub max_api_calls: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenAiConfig {
    pub api_key: String,
    pub base_url: String,
    pub chat_model: String,
    pub image_model: String,
    pub request_timeout_secs: u64,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("staging") | Ok("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        // Environment presets first, then specific env vars win
        match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
        .with_env_overrides()
    }

    fn with_env_overrides(mut self) -> Self {
        if let Ok(v) = env::var("PORT") {
            self.server.port = v.parse().unwrap_or(self.server.port);
        }

        if let Ok(v) = env::var("DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections = v.parse().unwrap_or(self.database.max_connections);
        }
        if let Ok(v) = env::var("DATABASE_ACQUIRE_TIMEOUT_SECS") {
            self.database.acquire_timeout_secs =
                v.parse().unwrap_or(self.database.acquire_timeout_secs);
        }

        if let Ok(v) = env::var("SECRET_KEY") {
            self.security.jwt_secret = v;
        }
        if let Ok(v) = env::var("SESSION_TTL_SECS") {
            self.security.session_ttl_secs = v.parse().unwrap_or(self.security.session_ttl_secs);
        }
        if let Ok(v) = env::var("BCRYPT_COST") {
            self.security.bcrypt_cost = v.parse().unwrap_or(self.security.bcrypt_cost);
        }

        if let Ok(v) = env::var("MAX_API_CALLS") {
            self.quota.max_api_calls = v.parse().unwrap_or(self.quota.max_api_calls);
        }

        if let Ok(v) = env::var("OPENAI_API_TOKEN") {
            self.openai.api_key = v;
        }
        if let Ok(v) = env::var("OPENAI_BASE_URL") {
            self.openai.base_url = v;
        }
        if let Ok(v) = env::var("OPENAI_CHAT_MODEL") {
            self.openai.chat_model = v;
        }
        if let Ok(v) = env::var("OPENAI_IMAGE_MODEL") {
            self.openai.image_model = v;
        }
        if let Ok(v) = env::var("AI_TIMEOUT_SECS") {
            self.openai.request_timeout_secs =
                v.parse().unwrap_or(self.openai.request_timeout_secs);
        }

        self
    }

    fn defaults(environment: Environment, secure_cookies: bool) -> Self {
        Self {
            environment,
            server: ServerConfig { port: 4000 },
            database: DatabaseConfig {
                max_connections: 10,
                acquire_timeout_secs: 5,
            },
            security: SecurityConfig {
                jwt_secret: String::new(),
                session_ttl_secs: 3600,
                reset_ttl_secs: 15 * 60,
                bcrypt_cost: 10,
                secure_cookies,
            },
            quota: QuotaConfig { max_api_calls: 20 },
            openai: OpenAiConfig {
                api_key: String::new(),
                base_url: "https://api.openai.com/v1".to_string(),
                chat_model: "gpt-3.5-turbo".to_string(),
                image_model: "dall-e-3".to_string(),
                request_timeout_secs: 30,
            },
        }
    }

    fn development() -> Self {
        Self::defaults(Environment::Development, false)
    }

    fn staging() -> Self {
        let mut config = Self::defaults(Environment::Staging, true);
        config.database.max_connections = 20;
        config
    }

    fn production() -> Self {
        let mut config = Self::defaults(Environment::Production, true);
        config.database.max_connections = 50;
        config
    }
}

// Global singleton config - initialized once at startup
pub static CONFIG: Lazy<AppConfig> = Lazy::new(AppConfig::from_env);

// Convenience function for accessing config
pub fn config() -> &'static AppConfig {
    &CONFIG
}
