//! Configuration loading and management.

use std::net::{Ipv4Addr, SocketAddr};
use std::path::{Path, PathBuf};
use std::time::Duration;

use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use serde::{Deserialize, Serialize};

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Address of the request/response API.
    pub http_addr: SocketAddr,
    /// Address of the WebSocket push channel.
    pub ws_addr: SocketAddr,
    /// Path to the archive of completed events.
    pub archive_path: PathBuf,
    /// Seconds between sweeps.
    pub sweep_interval_secs: u64,
    /// Start the first sweep on the next wall-clock minute boundary.
    pub align_to_minute: bool,
    /// Minutes before the start time at which the alert goes out.
    pub lead_minutes: u32,
    /// Alerts a subscriber may fall behind by before it is dropped.
    pub subscriber_buffer: usize,
    /// Upper bound on a single push write, in milliseconds.
    pub send_timeout_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        let data_dir = dirs_data_path().unwrap_or_else(|| PathBuf::from("."));
        Self {
            http_addr: SocketAddr::from((Ipv4Addr::LOCALHOST, 3005)),
            ws_addr: SocketAddr::from((Ipv4Addr::LOCALHOST, 8090)),
            archive_path: data_dir.join("events.json"),
            sweep_interval_secs: 60,
            align_to_minute: true,
            lead_minutes: 5,
            subscriber_buffer: 64,
            send_timeout_ms: 5000,
        }
    }
}

/// A configuration value that loads but cannot run.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("invalid configuration: {field} must be greater than zero")]
pub struct InvalidConfig {
    pub field: &'static str,
}

impl Config {
    /// Loads configuration, optionally from a specific file.
    #[expect(
        clippy::result_large_err,
        reason = "figment::Error is large but only returned at startup"
    )]
    pub fn load_from(config_path: Option<&Path>) -> Result<Self, figment::Error> {
        Self::figment(config_path).extract()
    }

    fn figment(config_path: Option<&Path>) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        // Load from default config location
        if let Some(config_dir) = dirs_config_path() {
            figment = figment.merge(Toml::file(config_dir.join("config.toml")));
        }

        // Load from specified config file
        if let Some(path) = config_path {
            figment = figment.merge(Toml::file(path));
        }

        // Load from environment variables (REMIND_*)
        figment.merge(Env::prefixed("REMIND_"))
    }

    /// Rejects values the service cannot run with.
    pub const fn validate(&self) -> Result<(), InvalidConfig> {
        if self.sweep_interval_secs == 0 {
            return Err(InvalidConfig {
                field: "sweep_interval_secs",
            });
        }
        if self.lead_minutes == 0 {
            return Err(InvalidConfig {
                field: "lead_minutes",
            });
        }
        if self.subscriber_buffer == 0 {
            return Err(InvalidConfig {
                field: "subscriber_buffer",
            });
        }
        Ok(())
    }

    pub const fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs)
    }

    pub const fn send_timeout(&self) -> Duration {
        Duration::from_millis(self.send_timeout_ms)
    }
}

/// Returns the platform-specific config directory for remind.
fn dirs_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("remind"))
}

/// Returns the platform-specific data directory for remind.
///
/// On Linux: `~/.local/share/remind`
pub fn dirs_data_path() -> Option<PathBuf> {
    dirs::data_dir().map(|p| p.join("remind"))
}
