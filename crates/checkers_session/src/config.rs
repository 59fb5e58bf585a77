//! Session configuration.

use crate::error::ConfigError;
use checkers_core::{BoardState, SeatMode, StandardLayout};
use derive_getters::Getters;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info, instrument};

/// Configuration shared by host and peers.
#[derive(Debug, Clone, PartialEq, Eq, Getters, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Board rows.
    #[serde(default = "default_rows")]
    rows: i32,

    /// Board columns.
    #[serde(default = "default_cols")]
    cols: i32,

    /// Rows of men placed per side at reset.
    #[serde(default = "default_rows_per_side")]
    rows_per_side: i32,

    /// Two or four seats.
    #[serde(default)]
    seat_mode: SeatMode,

    /// Coins awarded to the local player when their team wins.
    #[serde(default = "default_coins_per_win")]
    coins_per_win: i64,

    /// How long a peer waits for the host to accept its connection.
    #[serde(default = "default_connect_timeout_secs")]
    connect_timeout_secs: u64,

    /// UDP port for LAN host discovery.
    #[serde(default = "default_discovery_port")]
    discovery_port: u16,

    /// Interval between host announcements.
    #[serde(default = "default_broadcast_interval_ms")]
    broadcast_interval_ms: u64,

    /// Default tracing filter when `RUST_LOG` is unset.
    #[serde(default = "default_log_filter")]
    log_filter: String,

    /// File holding the persisted coin counter.
    #[serde(default = "default_progress_path")]
    progress_path: PathBuf,
}

fn default_rows() -> i32 {
    6
}

fn default_cols() -> i32 {
    6
}

fn default_rows_per_side() -> i32 {
    2
}

fn default_coins_per_win() -> i64 {
    10
}

fn default_connect_timeout_secs() -> u64 {
    5
}

fn default_discovery_port() -> u16 {
    47777
}

fn default_broadcast_interval_ms() -> u64 {
    1000
}

fn default_log_filter() -> String {
    "info".to_string()
}

fn default_progress_path() -> PathBuf {
    PathBuf::from("checkers_progress.json")
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            rows: default_rows(),
            cols: default_cols(),
            rows_per_side: default_rows_per_side(),
            seat_mode: SeatMode::default(),
            coins_per_win: default_coins_per_win(),
            connect_timeout_secs: default_connect_timeout_secs(),
            discovery_port: default_discovery_port(),
            broadcast_interval_ms: default_broadcast_interval_ms(),
            log_filter: default_log_filter(),
            progress_path: default_progress_path(),
        }
    }
}

impl SessionConfig {
    /// Loads configuration from a TOML file.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        debug!("Loading config from file");
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::new(format!("Failed to read config file: {}", e)))?;
        let config = Self::from_toml(&content)?;
        info!(
            rows = config.rows,
            cols = config.cols,
            seat_mode = ?config.seat_mode,
            "Config loaded successfully"
        );
        Ok(config)
    }

    /// Loads the file if it exists, otherwise returns the defaults.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file_or_default(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        if path.as_ref().exists() {
            Self::from_file(path)
        } else {
            debug!("Config file not found, using defaults");
            Ok(Self::default())
        }
    }

    /// Parses and validates TOML text.
    #[instrument(skip(content))]
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)
            .map_err(|e| ConfigError::new(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Rejects configurations a match cannot be set up with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        BoardState::area(self.rows, self.cols)?;
        if self.rows_per_side < 0 {
            return Err(ConfigError::new(format!(
                "rows_per_side must not be negative, got {}",
                self.rows_per_side
            )));
        }
        Ok(())
    }

    /// Replaces the seat mode.
    pub fn with_seat_mode(mut self, seat_mode: SeatMode) -> Self {
        self.seat_mode = seat_mode;
        self
    }

    /// Replaces the board dimensions.
    pub fn with_board(mut self, rows: i32, cols: i32, rows_per_side: i32) -> Self {
        self.rows = rows;
        self.cols = cols;
        self.rows_per_side = rows_per_side;
        self
    }

    /// Starting layout for this configuration.
    pub fn layout(&self) -> StandardLayout {
        StandardLayout::new(self.rows_per_side)
    }

    /// Peer connect timeout.
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    /// Interval between discovery announcements.
    pub fn broadcast_interval(&self) -> Duration {
        Duration::from_millis(self.broadcast_interval_ms)
    }
}
