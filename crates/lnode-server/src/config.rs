//! Server configuration, parsed once at startup from flags and environment.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use clap::{ArgAction, Parser};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::ParseError;

use crate::platform::PlatformConfig;

/// Log directives used when neither `--log-filter` nor `RUST_LOG` is set.
pub const DEFAULT_LOG_FILTER: &str = "lnode_server=info,tower_http=info";

/// Secret accepted only with `--dev`.
pub const DEV_JWT_SECRET: &str = "dev-secret-change-me";

#[derive(Parser, Debug, Clone)]
#[command(name = "lnode-server")]
#[command(
    version,
    about = "Lnode provisioning server - users, device allow-list, and platform mirroring"
)]
pub struct Config {
    /// Address to listen on.
    #[arg(long, env = "LISTEN_ADDR", default_value = "0.0.0.0:8080")]
    pub addr: SocketAddr,

    /// Path to SQLite database file. Defaults to ~/.lnode/lnode.db.
    #[arg(long, env = "DATABASE_PATH")]
    pub db_path: Option<PathBuf>,

    /// JWT signing secret.
    #[arg(long, env = "JWT_SECRET", default_value = "", hide_env_values = true)]
    pub jwt_secret: String,

    /// Token TTL in seconds.
    #[arg(long, env = "TOKEN_TTL_SECS", default_value_t = 86_400)]
    pub token_ttl: i64,

    /// Platform URL scheme.
    #[arg(long, env = "CHIRPSTACK_SCHEME", default_value = "http")]
    pub chirpstack_scheme: String,

    #[arg(long, env = "CHIRPSTACK_HOST", default_value = "localhost")]
    pub chirpstack_host: String,

    #[arg(long, env = "CHIRPSTACK_PORT", default_value_t = 8090)]
    pub chirpstack_port: u16,

    /// Platform API token. Empty disables the integration.
    #[arg(long, env = "CHIRPSTACK_TOKEN", default_value = "", hide_env_values = true)]
    pub chirpstack_token: String,

    /// Mirror users and devices onto the platform.
    #[arg(long, env = "CHIRPSTACK_ENABLED", default_value_t = true, action = ArgAction::Set)]
    pub chirpstack_enabled: bool,

    /// Per-request timeout for platform calls, in seconds.
    #[arg(long, env = "CHIRPSTACK_TIMEOUT_SECS", default_value_t = 30)]
    pub chirpstack_timeout: u64,

    /// Allow the built-in development JWT secret.
    #[arg(long)]
    pub dev: bool,

    /// Log filter directives, e.g. `lnode_server=debug,tower_http=info`.
    #[arg(long, env = "RUST_LOG", default_value = DEFAULT_LOG_FILTER)]
    pub log_filter: String,

    /// Output logs as JSON (for structured log aggregation).
    #[arg(long)]
    pub log_json: bool,
}

impl Config {
    /// The JWT secret to sign with. An empty secret is a startup error
    /// unless `--dev` is set.
    pub fn jwt_secret(&self) -> lnode_core::Result<&str> {
        if !self.jwt_secret.is_empty() {
            return Ok(&self.jwt_secret);
        }
        if self.dev {
            return Ok(DEV_JWT_SECRET);
        }
        Err(lnode_core::Error::Config(
            "JWT_SECRET is required (or pass --dev)".into(),
        ))
    }

    /// Parsed `--log-filter`. A malformed directive is a startup error
    /// rather than a silently dropped one.
    pub fn log_filter(&self) -> Result<EnvFilter, ParseError> {
        EnvFilter::try_new(&self.log_filter)
    }

    pub fn db_path(&self) -> lnode_core::Result<PathBuf> {
        if let Some(path) = &self.db_path {
            return Ok(path.clone());
        }
        dirs::home_dir()
            .map(|home| home.join(".lnode").join("lnode.db"))
            .ok_or_else(|| lnode_core::Error::Config("Cannot determine home directory".into()))
    }

    pub fn platform(&self) -> PlatformConfig {
        PlatformConfig {
            scheme: self.chirpstack_scheme.clone(),
            host: self.chirpstack_host.clone(),
            port: self.chirpstack_port,
            token: self.chirpstack_token.clone(),
            enabled: self.chirpstack_enabled,
            timeout: Duration::from_secs(self.chirpstack_timeout),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Config {
        let mut argv = vec!["lnode-server"];
        argv.extend_from_slice(args);
        Config::try_parse_from(argv).unwrap()
    }

    #[test]
    fn platform_settings_from_flags() {
        let config = parse(&[
            "--chirpstack-scheme",
            "https",
            "--chirpstack-host",
            "ns.example.com",
            "--chirpstack-port",
            "443",
            "--chirpstack-token",
            "tok",
            "--chirpstack-timeout",
            "5",
        ]);
        let platform = config.platform();
        assert_eq!(platform.base_url(), "https://ns.example.com:443/api");
        assert_eq!(platform.timeout, Duration::from_secs(5));
        assert!(platform.is_enabled());
    }

    #[test]
    fn integration_can_be_switched_off() {
        let config = parse(&["--chirpstack-token", "tok", "--chirpstack-enabled", "false"]);
        assert!(!config.platform().is_enabled());
    }

    #[test]
    fn explicit_secret_wins() {
        let config = parse(&["--jwt-secret", "s3cret", "--dev"]);
        assert_eq!(config.jwt_secret().unwrap(), "s3cret");
    }

    #[test]
    fn dev_flag_allows_builtin_secret() {
        let config = parse(&["--jwt-secret", "", "--dev"]);
        assert_eq!(config.jwt_secret().unwrap(), DEV_JWT_SECRET);
    }

    #[test]
    fn empty_secret_without_dev_is_rejected() {
        let config = parse(&["--jwt-secret", ""]);
        assert!(matches!(
            config.jwt_secret(),
            Err(lnode_core::Error::Config(_))
        ));
    }

    #[test]
    fn default_log_filter_parses() {
        assert!(EnvFilter::try_new(DEFAULT_LOG_FILTER).is_ok());
    }

    #[test]
    fn log_filter_from_flag() {
        let config = parse(&["--log-filter", "lnode_server=debug"]);
        assert_eq!(config.log_filter, "lnode_server=debug");
        assert!(config.log_filter().is_ok());

        let config = parse(&["--log-filter", "lnode_server=verbose"]);
        assert!(config.log_filter().is_err());
    }

    #[test]
    fn explicit_db_path_is_used() {
        let config = parse(&["--db-path", "/tmp/lnode-test.db"]);
        assert_eq!(config.db_path().unwrap(), PathBuf::from("/tmp/lnode-test.db"));
    }
}
