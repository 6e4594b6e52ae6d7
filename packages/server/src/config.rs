//! Server configuration read from the environment.

use std::time::Duration;

/// Port used when `PORT` is not set.
pub const DEFAULT_PORT: u16 = 4002;

/// Bind address used when `BIND_ADDR` is not set.
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1";

/// Per-query timeout used when `QUERY_TIMEOUT_SECS` is not set.
pub const DEFAULT_QUERY_TIMEOUT: Duration = Duration::from_secs(30);

/// A configuration variable was set to something unusable.
#[derive(Debug, thiserror::Error)]
#[error("Invalid value {value:?} for {var}: {reason}")]
pub struct ConfigError {
    /// Environment variable name.
    pub var: &'static str,
    /// The rejected value.
    pub value: String,
    /// Why it was rejected.
    pub reason: String,
}

/// Listener and query settings for the subgraph server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Address to bind to.
    pub bind_addr: String,
    /// Port to listen on.
    pub port: u16,
    /// Upper bound on any single spatial store call. Also applied as the
    /// `PostgreSQL` `statement_timeout`.
    pub query_timeout: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            port: DEFAULT_PORT,
            query_timeout: DEFAULT_QUERY_TIMEOUT,
        }
    }
}

impl ServerConfig {
    /// Reads `BIND_ADDR`, `PORT` and `QUERY_TIMEOUT_SECS`, falling back to
    /// defaults for unset variables.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if `PORT` or `QUERY_TIMEOUT_SECS` is set but
    /// cannot be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let bind_addr = lookup("BIND_ADDR").unwrap_or(defaults.bind_addr);

        let port = match lookup("PORT") {
            Some(value) => value.trim().parse::<u16>().map_err(|e| ConfigError {
                var: "PORT",
                reason: format!("{e}"),
                value,
            })?,
            None => defaults.port,
        };

        let query_timeout = match lookup("QUERY_TIMEOUT_SECS") {
            Some(value) => match value.trim().parse::<u64>() {
                Ok(0) => {
                    return Err(ConfigError {
                        var: "QUERY_TIMEOUT_SECS",
                        reason: "must be at least 1".to_string(),
                        value,
                    });
                }
                Ok(secs) => Duration::from_secs(secs),
                Err(e) => {
                    return Err(ConfigError {
                        var: "QUERY_TIMEOUT_SECS",
                        reason: format!("{e}"),
                        value,
                    });
                }
            },
            None => defaults.query_timeout,
        };

        Ok(Self {
            bind_addr,
            port,
            query_timeout,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;

    fn config_from(vars: &[(&str, &str)]) -> Result<ServerConfig, ConfigError> {
        let vars: BTreeMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        ServerConfig::from_lookup(|var| vars.get(var).cloned())
    }

    #[test]
    fn unset_variables_use_defaults() {
        assert_eq!(config_from(&[]).unwrap(), ServerConfig::default());
        assert_eq!(ServerConfig::default().port, 4002);
    }

    #[test]
    fn reads_all_variables() {
        let config = config_from(&[
            ("BIND_ADDR", "0.0.0.0"),
            ("PORT", "9000"),
            ("QUERY_TIMEOUT_SECS", "5"),
        ])
        .unwrap();

        assert_eq!(config.bind_addr, "0.0.0.0");
        assert_eq!(config.port, 9000);
        assert_eq!(config.query_timeout, Duration::from_secs(5));
    }

    #[test]
    fn rejects_unparseable_port() {
        let err = config_from(&[("PORT", "eighty")]).unwrap_err();
        assert_eq!(err.var, "PORT");
        assert_eq!(err.value, "eighty");
    }

    #[test]
    fn rejects_zero_timeout() {
        let err = config_from(&[("QUERY_TIMEOUT_SECS", "0")]).unwrap_err();
        assert_eq!(err.var, "QUERY_TIMEOUT_SECS");
    }
}
