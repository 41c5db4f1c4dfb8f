// Configuration loaded from the environment

pub mod app;
pub mod database;
pub mod gateway;
pub mod seeding;

pub use app::AppConfig;
pub use database::{run_migrations, DatabaseConfig};
pub use gateway::GatewayConfig;
pub use seeding::DatabaseSeeder;

use anyhow::{Context, Result};
use std::str::FromStr;

/// Parse an optional raw setting, falling back to `default` when unset.
/// A value that is present but malformed is an error, never a silent default.
pub(crate) fn parse_setting<T>(key: &str, raw: Option<String>, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match raw {
        Some(value) => value
            .trim()
            .parse()
            .with_context(|| format!("{} has an invalid value: {:?}", key, value)),
        None => Ok(default),
    }
}

/// `parse_setting` over the process environment
pub(crate) fn env_setting<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    parse_setting(key, std::env::var(key).ok(), default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_setting_uses_default_when_unset() {
        assert_eq!(parse_setting::<u32>("DB_MAX_CONNECTIONS", None, 20).unwrap(), 20);
    }

    #[test]
    fn test_parse_setting_reads_value() {
        let value = parse_setting::<u16>("PORT", Some(" 8080 ".to_string()), 3000).unwrap();
        assert_eq!(value, 8080);
    }

    #[test]
    fn test_parse_setting_rejects_malformed_value() {
        let err = parse_setting::<u32>("DB_MAX_CONNECTIONS", Some("abc".to_string()), 20).unwrap_err();
        assert!(err.to_string().contains("DB_MAX_CONNECTIONS"));

        assert!(parse_setting::<u16>("PORT", Some("70000".to_string()), 3000).is_err());
    }
}
