use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::env;

use crate::access::PrefixMatch;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub server: ServerConfig,
    pub remote: RemoteConfig,
    pub security: SecurityConfig,
    pub guard: GuardConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub bind_host: String,
    pub port: u16,
    pub enable_request_logging: bool,
}

/// Base collection URLs on the remote mock store, one per entity kind.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteConfig {
    pub staff_url: String,
    pub trainer_url: String,
    pub cage_url: String,
    pub area_url: String,
    pub news_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    pub jwt_secret: String,
    pub jwt_expiry_hours: u64,
    pub enable_cors: bool,
    pub cors_origins: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GuardConfig {
    pub prefix_match: PrefixMatch,
    pub denied_path: String,
}

const STAFF_HOST: &str = "https://648867740e2469c038fda6cc.mockapi.io";
const CAGE_HOST: &str = "https://651822f6582f58d62d356e1a.mockapi.io";

impl AppConfig {
    pub fn from_env() -> Self {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("staging") | Ok("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        // Presets first, then explicit env vars win
        match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
        .with_env_overrides()
    }

    fn with_env_overrides(mut self) -> Self {
        // Server overrides
        if let Ok(v) = env::var("ZOO_BIND_HOST") {
            self.server.bind_host = v;
        }
        if let Some(port) = env::var("ZOO_ADMIN_PORT")
            .ok()
            .or_else(|| env::var("PORT").ok())
            .and_then(|s| s.parse::<u16>().ok())
        {
            self.server.port = port;
        }
        if let Ok(v) = env::var("SERVER_ENABLE_REQUEST_LOGGING") {
            self.server.enable_request_logging = v.parse().unwrap_or(self.server.enable_request_logging);
        }

        // Remote collection overrides
        if let Ok(v) = env::var("REMOTE_STAFF_URL") {
            self.remote.staff_url = v;
        }
        if let Ok(v) = env::var("REMOTE_TRAINER_URL") {
            self.remote.trainer_url = v;
        }
        if let Ok(v) = env::var("REMOTE_CAGE_URL") {
            self.remote.cage_url = v;
        }
        if let Ok(v) = env::var("REMOTE_AREA_URL") {
            self.remote.area_url = v;
        }
        if let Ok(v) = env::var("REMOTE_NEWS_URL") {
            self.remote.news_url = v;
        }

        // Security overrides
        if let Ok(v) = env::var("SECURITY_JWT_SECRET") {
            self.security.jwt_secret = v;
        }
        if let Ok(v) = env::var("SECURITY_JWT_EXPIRY_HOURS") {
            self.security.jwt_expiry_hours = v.parse().unwrap_or(self.security.jwt_expiry_hours);
        }
        if let Ok(v) = env::var("SECURITY_ENABLE_CORS") {
            self.security.enable_cors = v.parse().unwrap_or(self.security.enable_cors);
        }
        if let Ok(v) = env::var("SECURITY_CORS_ORIGINS") {
            self.security.cors_origins = v.split(',').map(|s| s.trim().to_string()).collect();
        }

        // Guard overrides
        if let Ok(v) = env::var("GUARD_PREFIX_MATCH") {
            match v.parse() {
                Ok(mode) => self.guard.prefix_match = mode,
                Err(e) => tracing::warn!("ignoring GUARD_PREFIX_MATCH: {}", e),
            }
        }
        if let Ok(v) = env::var("GUARD_DENIED_PATH") {
            self.guard.denied_path = v;
        }

        self
    }

    fn remote_defaults() -> RemoteConfig {
        RemoteConfig {
            staff_url: format!("{}/staff", STAFF_HOST),
            trainer_url: format!("{}/trainer", STAFF_HOST),
            cage_url: format!("{}/cage", CAGE_HOST),
            area_url: format!("{}/area", CAGE_HOST),
            news_url: format!("{}/news", CAGE_HOST),
        }
    }

    fn development() -> Self {
        Self {
            environment: Environment::Development,
            server: ServerConfig {
                bind_host: "127.0.0.1".to_string(),
                port: 3000,
                enable_request_logging: true,
            },
            remote: Self::remote_defaults(),
            security: SecurityConfig {
                jwt_secret: "zoo-admin-development-secret".to_string(),
                jwt_expiry_hours: 24 * 7, // 1 week
                enable_cors: true,
                cors_origins: vec!["http://localhost:3000".to_string(), "http://localhost:5173".to_string()],
            },
            guard: GuardConfig {
                prefix_match: PrefixMatch::Segment,
                denied_path: "/denied".to_string(),
            },
        }
    }

    fn staging() -> Self {
        Self {
            environment: Environment::Staging,
            server: ServerConfig {
                bind_host: "0.0.0.0".to_string(),
                port: 3000,
                enable_request_logging: true,
            },
            remote: Self::remote_defaults(),
            security: SecurityConfig {
                // Must come from SECURITY_JWT_SECRET outside development
                jwt_secret: String::new(),
                jwt_expiry_hours: 24,
                enable_cors: true,
                cors_origins: vec!["https://staging.example.com".to_string()],
            },
            guard: GuardConfig {
                prefix_match: PrefixMatch::Segment,
                denied_path: "/denied".to_string(),
            },
        }
    }

    fn production() -> Self {
        Self {
            environment: Environment::Production,
            server: ServerConfig {
                bind_host: "0.0.0.0".to_string(),
                port: 8080,
                enable_request_logging: false,
            },
            remote: Self::remote_defaults(),
            security: SecurityConfig {
                jwt_secret: String::new(),
                jwt_expiry_hours: 8,
                enable_cors: true,
                cors_origins: vec!["https://app.example.com".to_string()],
            },
            guard: GuardConfig {
                prefix_match: PrefixMatch::Segment,
                denied_path: "/denied".to_string(),
            },
        }
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.bind_host, self.server.port)
    }
}

// Global singleton config - initialized once at startup
pub static CONFIG: Lazy<AppConfig> = Lazy::new(AppConfig::from_env);

// Convenience function for accessing config
pub fn config() -> &'static AppConfig {
    &CONFIG
}

#[macro_export]
macro_rules! is_development {
    () => {
        matches!($crate::config::CONFIG.environment, $crate::config::Environment::Development)
    };
}
