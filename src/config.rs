use std::net::SocketAddr;

use chrono::FixedOffset;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for the environment variable {0}: {1}")]
    InvalidValue(String, String),
}

#[derive(Clone, Debug)]
pub struct Config {
    pub bind_address: SocketAddr,
    pub database_url: String,
    pub max_connections: u32,
    /// Offset used for calendar days, weeks and months.
    pub utc_offset: FixedOffset,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        let bind_address = env_or("BIND_ADDRESS", "127.0.0.1:3000")
            .parse::<SocketAddr>()
            .map_err(|e| ConfigError::InvalidValue("BIND_ADDRESS".to_string(), e.to_string()))?;

        let database_url = env_or("DATABASE_URL", "sqlite://planner.db?mode=rwc");

        let max_connections = env_or("DB_MAX_CONNECTIONS", "5")
            .parse::<u32>()
            .map_err(|e| ConfigError::InvalidValue("DB_MAX_CONNECTIONS".to_string(), e.to_string()))?;

        let utc_offset = parse_offset(&env_or("UTC_OFFSET_MINUTES", "0"))?;

        Ok(Self {
            bind_address,
            database_url,
            max_connections,
            utc_offset,
        })
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn parse_offset(minutes: &str) -> Result<FixedOffset, ConfigError> {
    let invalid = |reason: String| ConfigError::InvalidValue("UTC_OFFSET_MINUTES".to_string(), reason);
    let minutes = minutes.trim().parse::<i32>().map_err(|e| invalid(e.to_string()))?;
    minutes
        .checked_mul(60)
        .and_then(FixedOffset::east_opt)
        .ok_or_else(|| invalid(format!("{} minutes is out of range", minutes)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offset_parses_signed_minutes() {
        assert_eq!(parse_offset("-300").unwrap().local_minus_utc(), -300 * 60);
        assert_eq!(parse_offset(" 540 ").unwrap().local_minus_utc(), 540 * 60);
        assert!(parse_offset("abc").is_err());
        assert!(parse_offset("100000").is_err());
    }
}
