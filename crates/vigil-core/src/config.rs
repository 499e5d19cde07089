//! Engine configuration — loaded from `~/.vigil/config.toml`.

use crate::error::{Result, VigilError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Top-level configuration for the Vigil engine.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct VigilConfig {
    #[serde(default)]
    pub scheduler: SchedulerConfig,
    #[serde(default)]
    pub content: ContentConfig,
    #[serde(default)]
    pub channel: ChannelConfig,
    #[serde(default)]
    pub broadcast: BroadcastConfig,
    #[serde(default)]
    pub store: StoreConfig,
}

/// Scheduler tick cadence and fan-out.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulerConfig {
    /// Seconds between poller ticks. The trigger tolerance window is half
    /// of this, so each reminder window is hit exactly once per cadence.
    #[serde(default = "default_tick_secs")]
    pub tick_secs: u64,
    /// Max slots evaluated concurrently within one tick.
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
    /// Default UTC offset (minutes) for recipients without their own.
    #[serde(default)]
    pub default_utc_offset_minutes: i32,
}

fn default_tick_secs() -> u64 { 60 }
fn default_concurrency() -> usize { 8 }

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            tick_secs: default_tick_secs(),
            concurrency: default_concurrency(),
            default_utc_offset_minutes: 0,
        }
    }
}

impl SchedulerConfig {
    /// Trigger tolerance in seconds (half the tick interval).
    pub fn tolerance_secs(&self) -> u64 {
        (self.tick_secs / 2).max(1)
    }
}

/// Daily content generation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentConfig {
    /// OpenAI-compatible chat completions endpoint.
    #[serde(default = "default_api_url")]
    pub api_url: String,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_model")]
    pub model: String,
    /// Hard timeout for a generation call. Must stay below the tick
    /// interval so a stuck provider cannot stall the scheduler.
    #[serde(default = "default_ai_timeout_secs")]
    pub ai_timeout_secs: u64,
    /// Length budget for a message body, in characters.
    #[serde(default = "default_max_len")]
    pub max_len: usize,
}

fn default_api_url() -> String { "http://localhost:11434/v1/chat/completions".into() }
fn default_model() -> String { "llama3.2".into() }
fn default_ai_timeout_secs() -> u64 { 10 }
fn default_max_len() -> usize { 1024 }

impl Default for ContentConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            api_key: None,
            model: default_model(),
            ai_timeout_secs: default_ai_timeout_secs(),
            max_len: default_max_len(),
        }
    }
}

/// Outbound channel settings.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ChannelConfig {
    pub telegram: Option<TelegramConfig>,
}

/// Telegram bot channel configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelegramConfig {
    pub bot_token: String,
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Per-request send timeout. Kept below the AI timeout.
    #[serde(default = "default_send_timeout_secs")]
    pub send_timeout_secs: u64,
}

fn default_true() -> bool { true }
fn default_send_timeout_secs() -> u64 { 5 }

/// Broadcast fan-out pacing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BroadcastConfig {
    /// Minimum delay between sends, to stay under the channel's
    /// documented throughput ceiling.
    #[serde(default = "default_send_delay_ms")]
    pub send_delay_ms: u64,
}

fn default_send_delay_ms() -> u64 { 250 }

impl Default for BroadcastConfig {
    fn default() -> Self {
        Self { send_delay_ms: default_send_delay_ms() }
    }
}

/// Persistence settings.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct StoreConfig {
    /// Engine-state SQLite database. Defaults to `~/.vigil/engine.db`.
    #[serde(default)]
    pub db_path: Option<PathBuf>,
    /// The platform's own database, read through the registries only.
    /// Defaults to `~/.vigil/platform.db`.
    #[serde(default)]
    pub platform_db_path: Option<PathBuf>,
}

impl StoreConfig {
    pub fn resolved_db_path(&self) -> PathBuf {
        self.db_path
            .clone()
            .unwrap_or_else(|| VigilConfig::home_dir().join("engine.db"))
    }

    pub fn resolved_platform_db_path(&self) -> PathBuf {
        self.platform_db_path
            .clone()
            .unwrap_or_else(|| VigilConfig::home_dir().join("platform.db"))
    }
}

impl VigilConfig {
    /// Vigil home directory (`~/.vigil`).
    pub fn home_dir() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".vigil")
    }

    /// Default config file path.
    pub fn default_path() -> PathBuf {
        Self::home_dir().join("config.toml")
    }

    /// Load from the default path, falling back to defaults when absent.
    pub fn load() -> Result<Self> {
        let path = Self::default_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load from an explicit path.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| VigilError::ConfigNotFound(format!("{}: {e}", path.display())))?;
        toml::from_str(&content).map_err(|e| VigilError::Config(format!("Parse failed: {e}")))
    }

    /// Save to the default path, creating `~/.vigil` if needed.
    pub fn save(&self) -> Result<()> {
        let path = Self::default_path();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)
            .map_err(|e| VigilError::Config(format!("Serialize failed: {e}")))?;
        std::fs::write(&path, content)?;
        Ok(())
    }
}
