use gate_core::config::{self as core_config, get_env, Environment};
use gate_core::error::AppError;
use serde::Deserialize;
use std::env;

#[derive(Debug, Clone, Deserialize)]
pub struct GateConfig {
    pub common: core_config::Config,
    pub environment: Environment,
    pub service_name: String,
    pub service_version: String,
    pub log_level: String,
    pub session: SessionConfig,
    pub pin: PinConfig,
    pub gate: GateTimingConfig,
    pub security: SecurityConfig,
    pub rate_limit: RateLimitConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    pub ttl_hours: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PinConfig {
    pub min_len: usize,
    pub max_len: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GateTimingConfig {
    /// Ceiling on credential validation and executor calls, in seconds.
    pub call_timeout_seconds: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SecurityConfig {
    pub allowed_origins: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RateLimitConfig {
    pub login_attempts: u32,
    pub login_window_seconds: u64,
    pub pin_attempts: u32,
    pub pin_window_seconds: u64,
    pub global_ip_limit: u32,
    pub global_ip_window_seconds: u64,
}

impl GateConfig {
    pub fn from_env() -> Result<Self, AppError> {
        let common = core_config::Config::load()?;

        let env_str = env::var("ENVIRONMENT").unwrap_or_else(|_| "dev".to_string());
        let environment: Environment = env_str
            .parse()
            .map_err(|e: String| AppError::ConfigError(anyhow::anyhow!(e)))?;

        let is_prod = environment == Environment::Prod;

        let config = GateConfig {
            common,
            environment,
            service_name: get_env("SERVICE_NAME", Some("gate-service"), is_prod)?,
            service_version: get_env("SERVICE_VERSION", Some(env!("CARGO_PKG_VERSION")), is_prod)?,
            log_level: get_env("LOG_LEVEL", Some("info"), is_prod)?,
            session: SessionConfig {
                ttl_hours: parse(get_env("SESSION_TTL_HOURS", Some("24"), is_prod)?)?,
            },
            pin: PinConfig {
                min_len: parse(get_env("PIN_MIN_LEN", Some("4"), is_prod)?)?,
                max_len: parse(get_env("PIN_MAX_LEN", Some("4"), is_prod)?)?,
            },
            gate: GateTimingConfig {
                call_timeout_seconds: parse(get_env("GATE_CALL_TIMEOUT_SECONDS", Some("10"), is_prod)?)?,
            },
            security: SecurityConfig {
                allowed_origins: get_env(
                    "ALLOWED_ORIGINS",
                    Some("http://localhost:3000"),
                    is_prod,
                )?
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
            },
            rate_limit: RateLimitConfig {
                login_attempts: parse(get_env("RATE_LIMIT_LOGIN_ATTEMPTS", Some("5"), is_prod)?)?,
                login_window_seconds: parse(get_env(
                    "RATE_LIMIT_LOGIN_WINDOW_SECONDS",
                    Some("60"),
                    is_prod,
                )?)?,
                pin_attempts: parse(get_env("RATE_LIMIT_PIN_ATTEMPTS", Some("10"), is_prod)?)?,
                pin_window_seconds: parse(get_env(
                    "RATE_LIMIT_PIN_WINDOW_SECONDS",
                    Some("60"),
                    is_prod,
                )?)?,
                global_ip_limit: parse(get_env("RATE_LIMIT_GLOBAL_IP", Some("300"), is_prod)?)?,
                global_ip_window_seconds: parse(get_env(
                    "RATE_LIMIT_GLOBAL_IP_WINDOW_SECONDS",
                    Some("60"),
                    is_prod,
                )?)?,
            },
        };

        if config.pin.min_len == 0 || config.pin.min_len > config.pin.max_len {
            return Err(AppError::ConfigError(anyhow::anyhow!(
                "PIN_MIN_LEN must be >= 1 and <= PIN_MAX_LEN"
            )));
        }

        Ok(config)
    }
}

fn parse<T: std::str::FromStr>(raw: String) -> Result<T, AppError>
where
    T::Err: std::fmt::Display,
{
    raw.parse()
        .map_err(|e| AppError::ConfigError(anyhow::anyhow!("Invalid value {:?}: {}", raw, e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_rejects_garbage() {
        assert!(parse::<u32>("not-a-number".to_string()).is_err());
        assert_eq!(parse::<u32>("42".to_string()).unwrap(), 42);
    }
}
