// src/config.rs
use std::net::IpAddr;

use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("{name} has an invalid value: {value}")]
    Invalid { name: &'static str, value: String },
}

/// Accepted token lifetimes: one hour up to a year.
const TOKEN_TTL_HOURS_RANGE: std::ops::RangeInclusive<i64> = 1..=8760;

/// Runtime settings, read from the environment (and `.env` via dotenvy).
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub database_max_connections: u32,
    pub jwt_secret: String,
    pub token_ttl_hours: i64,
    pub host: IpAddr,
    pub port: u16,
    /// Empty means any origin.
    pub cors_allowed_origins: Vec<String>,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |name: &'static str| {
            lookup(name)
                .filter(|v| !v.trim().is_empty())
                .ok_or(ConfigError::Missing(name))
        };

        let database_url = required("DATABASE_URL")?;
        let jwt_secret = required("JWT_SECRET")?;

        let host = match lookup("HOST") {
            Some(v) => v.parse().map_err(|_| ConfigError::Invalid { name: "HOST", value: v })?,
            None => IpAddr::from([127, 0, 0, 1]),
        };
        let port = parse_or(&lookup, "PORT", 3000)?;
        let database_max_connections = parse_or(&lookup, "DATABASE_MAX_CONNECTIONS", 5)?;
        let token_ttl_hours = parse_or(&lookup, "TOKEN_TTL_HOURS", 8)?;
        if !TOKEN_TTL_HOURS_RANGE.contains(&token_ttl_hours) {
            return Err(ConfigError::Invalid {
                name: "TOKEN_TTL_HOURS",
                value: token_ttl_hours.to_string(),
            });
        }

        let cors_allowed_origins = lookup("CORS_ALLOWED_ORIGINS")
            .map(|v| {
                v.split(',')
                    .map(str::trim)
                    .filter(|o| !o.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        Ok(Self {
            database_url,
            database_max_connections,
            jwt_secret,
            token_ttl_hours,
            host,
            port,
            cors_allowed_origins,
        })
    }
}

fn parse_or<F, T>(lookup: &F, name: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(name) {
        Some(v) => v.trim().parse().map_err(|_| ConfigError::Invalid { name, value: v }),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply() {
        let cfg = AppConfig::from_lookup(lookup(&[
            ("DATABASE_URL", "postgres://localhost/custo3d"),
            ("JWT_SECRET", "secret"),
        ]))
        .unwrap();
        assert_eq!(cfg.port, 3000);
        assert_eq!(cfg.host, IpAddr::from([127, 0, 0, 1]));
        assert_eq!(cfg.token_ttl_hours, 8);
        assert_eq!(cfg.database_max_connections, 5);
        assert!(cfg.cors_allowed_origins.is_empty());
    }

    #[test]
    fn missing_secret_is_an_error() {
        let err = AppConfig::from_lookup(lookup(&[("DATABASE_URL", "postgres://x")])).unwrap_err();
        assert_eq!(err, ConfigError::Missing("JWT_SECRET"));
    }

    #[test]
    fn bad_port_is_reported() {
        let err = AppConfig::from_lookup(lookup(&[
            ("DATABASE_URL", "postgres://x"),
            ("JWT_SECRET", "s"),
            ("PORT", "eighty"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { name: "PORT", .. }));
    }

    #[test]
    fn token_lifetime_is_bounded() {
        for bad in ["0", "-3", "8761", "9223372036854775807"] {
            let err = AppConfig::from_lookup(lookup(&[
                ("DATABASE_URL", "postgres://x"),
                ("JWT_SECRET", "s"),
                ("TOKEN_TTL_HOURS", bad),
            ]))
            .unwrap_err();
            assert!(matches!(err, ConfigError::Invalid { name: "TOKEN_TTL_HOURS", .. }), "{bad}");
        }

        let cfg = AppConfig::from_lookup(lookup(&[
            ("DATABASE_URL", "postgres://x"),
            ("JWT_SECRET", "s"),
            ("TOKEN_TTL_HOURS", "8760"),
        ]))
        .unwrap();
        assert_eq!(cfg.token_ttl_hours, 8760);
    }

    #[test]
    fn origins_are_split() {
        let cfg = AppConfig::from_lookup(lookup(&[
            ("DATABASE_URL", "postgres://x"),
            ("JWT_SECRET", "s"),
            ("CORS_ALLOWED_ORIGINS", "http://localhost:5173, https://app.example.com,"),
        ]))
        .unwrap();
        assert_eq!(
            cfg.cors_allowed_origins,
            vec!["http://localhost:5173", "https://app.example.com"]
        );
    }
}
