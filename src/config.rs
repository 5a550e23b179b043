//! Configuration for the secure notes server.
//!
//! All configuration is loaded from environment variables, each with a default.
//! No secrets are logged.

use std::time::Duration;

/// Default identifier obfuscation salt
pub const DEFAULT_ID_SALT: &str = "salt for secure notes app";

/// Default minimum identifier length
pub const DEFAULT_ID_MIN_LENGTH: usize = 5;

/// Server configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Server bind address
    pub bind_addr: String,

    /// Server port
    pub port: u16,

    // === Identifiers ===
    /// Salt for identifier obfuscation
    pub id_salt: String,

    /// Minimum identifier length (shorter ids are padded)
    pub id_min_length: usize,

    // === Password Hashing ===
    pub hasher: HasherConfig,

    // === Limits ===
    /// Maximum note text size in bytes (default: 64KB)
    pub max_note_size: usize,

    /// Expired note sweep interval (default: 10 seconds)
    pub cleanup_interval: Duration,

    /// Per-request deadline (default: 10 seconds)
    pub request_timeout: Duration,
}

/// Argon2id cost parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HasherConfig {
    /// Memory cost in KiB
    pub m_cost: u32,
    /// Number of iterations
    pub t_cost: u32,
    /// Degree of parallelism
    pub p_cost: u32,
}

impl HasherConfig {
    /// Minimum costs argon2 accepts. Test use only.
    pub fn fast() -> Self {
        Self {
            m_cost: argon2::Params::MIN_M_COST,
            t_cost: argon2::Params::MIN_T_COST,
            p_cost: argon2::Params::MIN_P_COST,
        }
    }
}

impl Default for HasherConfig {
    fn default() -> Self {
        Self {
            m_cost: argon2::Params::DEFAULT_M_COST,
            t_cost: argon2::Params::DEFAULT_T_COST,
            p_cost: argon2::Params::DEFAULT_P_COST,
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let hasher_defaults = HasherConfig::default();

        Self {
            bind_addr: std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env_parse("PORT").unwrap_or(8080),

            id_salt: std::env::var("ID_SALT").unwrap_or_else(|_| DEFAULT_ID_SALT.to_string()),
            id_min_length: env_parse("ID_MIN_LENGTH").unwrap_or(DEFAULT_ID_MIN_LENGTH),

            hasher: HasherConfig {
                m_cost: env_parse("ARGON2_M_COST").unwrap_or(hasher_defaults.m_cost),
                t_cost: env_parse("ARGON2_T_COST").unwrap_or(hasher_defaults.t_cost),
                p_cost: env_parse("ARGON2_P_COST").unwrap_or(hasher_defaults.p_cost),
            },

            max_note_size: env_parse("MAX_NOTE_SIZE").unwrap_or(64 * 1024),
            cleanup_interval: Duration::from_secs(
                env_parse("CLEANUP_INTERVAL_SECS").unwrap_or(10),
            ),
            request_timeout: Duration::from_secs(env_parse("REQUEST_TIMEOUT_SECS").unwrap_or(10)),
        }
    }

    /// Request body limit: note text plus room for the JSON envelope
    pub fn max_body_size(&self) -> usize {
        self.max_note_size.saturating_mul(2).saturating_add(4 * 1024)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hasher_defaults_match_argon2() {
        let defaults = HasherConfig::default();
        assert_eq!(defaults.m_cost, 19 * 1024);
        assert_eq!(defaults.t_cost, 2);
        assert_eq!(defaults.p_cost, 1);
    }

    #[test]
    fn body_limit_covers_largest_note() {
        let config = Config {
            max_note_size: 1000,
            ..Config::default()
        };
        assert!(config.max_body_size() > 1000);
    }
}
