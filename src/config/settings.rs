use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::models::ChallengeKind;
use crate::progress::SystemClock;

pub const CONFIG_ENV: &str = "VIGIL_CONFIG";
pub const DB_ENV: &str = "VIGIL_DB";

fn default_trophies_preview() -> usize {
    6
}
fn default_days() -> u32 {
    7
}
fn default_kind() -> String {
    "reading".to_string()
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClockConfig {
    /// Minutes east of UTC used to decide what "today" is.
    /// Unset = the machine's local time zone.
    #[serde(default)]
    pub utc_offset_minutes: Option<i32>,
}

impl ClockConfig {
    pub fn system_clock(&self) -> Result<SystemClock> {
        match self.utc_offset_minutes {
            None => Ok(SystemClock::local()),
            Some(minutes) => SystemClock::with_offset_minutes(minutes)
                .ok_or_else(|| anyhow!("Invalid UTC offset: {} minutes", minutes)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileConfig {
    /// How many trophies `progress` shows.
    #[serde(default = "default_trophies_preview")]
    pub trophies_preview: usize,
}

impl Default for ProfileConfig {
    fn default() -> Self {
        Self {
            trophies_preview: default_trophies_preview(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JourneyConfig {
    #[serde(default = "default_days")]
    pub default_days: u32,
    #[serde(default = "default_kind")]
    pub default_kind: String,
}

impl Default for JourneyConfig {
    fn default() -> Self {
        Self {
            default_days: default_days(),
            default_kind: default_kind(),
        }
    }
}

impl JourneyConfig {
    pub fn kind(&self) -> Result<ChallengeKind> {
        self.default_kind
            .parse()
            .with_context(|| format!("journey.default_kind = '{}'", self.default_kind))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub clock: ClockConfig,
    #[serde(default)]
    pub profile: ProfileConfig,
    #[serde(default)]
    pub journey: JourneyConfig,
}

impl AppConfig {
    fn project_dirs() -> Result<ProjectDirs> {
        ProjectDirs::from("", "", "vigil").context("Could not determine project directories")
    }

    pub fn config_path() -> Result<PathBuf> {
        if let Some(path) = std::env::var_os(CONFIG_ENV) {
            return Ok(PathBuf::from(path));
        }
        let dirs = Self::project_dirs()?;
        Ok(dirs.config_dir().join("config.toml"))
    }

    pub fn db_path() -> Result<PathBuf> {
        if let Some(path) = std::env::var_os(DB_ENV) {
            return Ok(PathBuf::from(path));
        }
        let dirs = Self::project_dirs()?;
        Ok(dirs.data_dir().join("vigil.db"))
    }

    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        if !path.exists() {
            return Ok(Self::default());
        }
        let content =
            std::fs::read_to_string(&path).with_context(|| format!("Reading {:?}", path))?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).context("Parsing config.toml")
    }

    /// Creates the database's parent directory if needed.
    pub fn ensure_db_dir() -> Result<PathBuf> {
        let path = Self::db_path()?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Creating {:?}", parent))?;
        }
        Ok(path)
    }
}
