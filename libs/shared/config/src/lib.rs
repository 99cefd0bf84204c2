use std::env;
use std::str::FromStr;
use tracing::warn;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub backend_url: String,
    pub port: u16,
    pub backend_timeout_secs: u64,
    pub upcoming_horizon_days: u32,
    pub recent_appointments_limit: usize,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let config = Self {
            backend_url: env::var("CLINIC_BACKEND_URL")
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or_else(|_| {
                    warn!("CLINIC_BACKEND_URL not set, using empty value");
                    String::new()
                }),
            port: parse_or("CONSOLE_PORT", 3000),
            backend_timeout_secs: parse_or("BACKEND_TIMEOUT_SECS", 15),
            upcoming_horizon_days: parse_or("UPCOMING_HORIZON_DAYS", 7),
            recent_appointments_limit: parse_or("RECENT_APPOINTMENTS_LIMIT", 5),
        };

        if !config.is_configured() {
            warn!("Console not fully configured - missing environment variables");
        }

        config
    }

    /// Config pointing at an explicit backend, everything else defaulted.
    pub fn with_backend_url(backend_url: impl Into<String>) -> Self {
        Self {
            backend_url: backend_url.into(),
            ..Self::default()
        }
    }

    pub fn is_configured(&self) -> bool {
        !self.backend_url.is_empty()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            backend_url: String::new(),
            port: 3000,
            backend_timeout_secs: 15,
            upcoming_horizon_days: 7,
            recent_appointments_limit: 5,
        }
    }
}

fn parse_or<T: FromStr + std::fmt::Display>(key: &str, default: T) -> T {
    match env::var(key) {
        Ok(raw) => raw.trim().parse().unwrap_or_else(|_| {
            warn!("Invalid {} value {:?}, using default {}", key, raw, default);
            default
        }),
        Err(_) => default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn with_backend_url_keeps_defaults() {
        let config = AppConfig::with_backend_url("http://localhost:4000");
        assert!(config.is_configured());
        assert_eq!(config.upcoming_horizon_days, 7);
        assert_eq!(config.recent_appointments_limit, 5);
    }

    #[test]
    fn default_config_is_not_configured() {
        assert!(!AppConfig::default().is_configured());
    }
}
