use std::{env, str::FromStr, time::Duration};

use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{key} has an invalid value: {value:?}")]
    Invalid { key: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub backend_url: String,
    pub backend_timeout: Duration,
    pub roster_concurrency: usize,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|k| env::var(k).ok())
    }

    /// Same as `from_env`, reading values through `get` so tests don't touch
    /// the process environment.
    pub fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let timeout_secs: u64 = parse(&get, "BACKEND_TIMEOUT_SECS", 10)?;
        let roster_concurrency: usize = parse(&get, "ROSTER_CONCURRENCY", 8)?;
        if timeout_secs == 0 {
            return Err(invalid("BACKEND_TIMEOUT_SECS", "0"));
        }
        if roster_concurrency == 0 {
            return Err(invalid("ROSTER_CONCURRENCY", "0"));
        }

        Ok(Self {
            port: parse(&get, "PORT", 8081)?,
            backend_url: get("BACKEND_URL")
                .filter(|s| !s.trim().is_empty())
                .unwrap_or_else(|| "http://localhost:3000/api".into()),
            backend_timeout: Duration::from_secs(timeout_secs),
            roster_concurrency,
        })
    }
}

fn parse<T: FromStr>(
    get: &impl Fn(&str) -> Option<String>,
    key: &'static str,
    default: T,
) -> Result<T, ConfigError> {
    match get(key) {
        None => Ok(default),
        Some(v) if v.trim().is_empty() => Ok(default),
        Some(v) => v.trim().parse().map_err(|_| invalid(key, &v)),
    }
}

fn invalid(key: &'static str, value: &str) -> ConfigError {
    ConfigError::Invalid {
        key,
        value: value.to_string(),
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
        move |k| map.get(k).cloned()
    }

    #[test]
    fn defaults_when_unset() {
        let cfg = Config::from_lookup(lookup(&[])).unwrap();
        assert_eq!(cfg.port, 8081);
        assert_eq!(cfg.backend_url, "http://localhost:3000/api");
        assert_eq!(cfg.backend_timeout, Duration::from_secs(10));
        assert_eq!(cfg.roster_concurrency, 8);
    }

    #[test]
    fn reads_overrides() {
        let cfg = Config::from_lookup(lookup(&[
            ("PORT", "9000"),
            ("BACKEND_URL", "https://ead.example/api"),
            ("BACKEND_TIMEOUT_SECS", "3"),
            ("ROSTER_CONCURRENCY", "2"),
        ]))
        .unwrap();
        assert_eq!(cfg.port, 9000);
        assert_eq!(cfg.backend_url, "https://ead.example/api");
        assert_eq!(cfg.backend_timeout, Duration::from_secs(3));
        assert_eq!(cfg.roster_concurrency, 2);
    }

    #[test]
    fn rejects_garbage_and_zero() {
        let err = Config::from_lookup(lookup(&[("PORT", "http")])).unwrap_err();
        assert_eq!(err, invalid("PORT", "http"));
        assert!(Config::from_lookup(lookup(&[("ROSTER_CONCURRENCY", "0")])).is_err());
        assert!(Config::from_lookup(lookup(&[("BACKEND_TIMEOUT_SECS", "0")])).is_err());
    }
}
