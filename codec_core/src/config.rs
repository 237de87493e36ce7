//! Process-scoped configuration, read once at startup from environment
//! variables. There is no config-file layer here (no example in the pack
//! reaches for one) — just typed env vars with defaults, in the spirit of
//! the original service's `fetchConfigPath`/`MustLoad`.

use std::env;
use std::time::Duration;

/// Host/port/timeout/log settings for the HTTP shell.
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub read_timeout: Duration,
    pub write_timeout: Duration,
    pub idle_timeout: Duration,
    /// Key size used by `/rsa/generate-keys` when the caller omits `?bits=`.
    pub rsa_key_bits: u32,
    pub log_env: String,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            host: "127.0.0.1".to_string(),
            port: 8080,
            read_timeout: Duration::from_secs(15),
            write_timeout: Duration::from_secs(15),
            idle_timeout: Duration::from_secs(60),
            rsa_key_bits: 2048,
            log_env: "info".to_string(),
        }
    }
}

impl Config {
    /// Builds a `Config` from environment variables, falling back to
    /// [`Config::default`] values for anything unset or unparsable. Never
    /// panics: a malformed value is logged and the default is kept.
    pub fn from_env() -> Self {
        let defaults = Config::default();
        Config {
            host: env::var("CODEC_HOST").unwrap_or(defaults.host),
            port: env_parsed("CODEC_PORT", defaults.port),
            read_timeout: Duration::from_secs(env_parsed(
                "CODEC_READ_TIMEOUT_SECS",
                defaults.read_timeout.as_secs(),
            )),
            write_timeout: Duration::from_secs(env_parsed(
                "CODEC_WRITE_TIMEOUT_SECS",
                defaults.write_timeout.as_secs(),
            )),
            idle_timeout: Duration::from_secs(env_parsed(
                "CODEC_IDLE_TIMEOUT_SECS",
                defaults.idle_timeout.as_secs(),
            )),
            rsa_key_bits: env_parsed("CODEC_RSA_KEY_BITS", defaults.rsa_key_bits),
            log_env: env::var("RUST_LOG").unwrap_or(defaults.log_env),
        }
    }
}

fn env_parsed<T: std::str::FromStr>(key: &str, default: T) -> T {
    match env::var(key) {
        Ok(raw) => raw.parse().unwrap_or_else(|_| {
            log::warn!("ignoring unparsable {key}={raw:?}, using default");
            default
        }),
        Err(_) => default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sane() {
        let cfg = Config::default();
        assert_eq!(cfg.port, 8080);
        assert_eq!(cfg.rsa_key_bits, 2048);
    }
}
