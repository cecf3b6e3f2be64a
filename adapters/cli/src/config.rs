//! Optional TOML configuration layered beneath the command-line flags.

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::debug;

const DEFAULT_MAP_PATH: &str = "assets/overworld.tmap";
const DEFAULT_SAVE_PATH: &str = "saves/overworld.json";

/// Fully resolved game configuration.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct Config {
    pub(crate) map_path: PathBuf,
    pub(crate) save_path: PathBuf,
    pub(crate) window: WindowConfig,
    pub(crate) overworld: OverworldConfig,
    pub(crate) minigame: MinigameConfig,
}

/// Window creation parameters.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct WindowConfig {
    pub(crate) width: u32,
    pub(crate) height: u32,
    pub(crate) vsync: bool,
}

/// Overworld rules.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct OverworldConfig {
    pub(crate) start_tile: u32,
    /// Allows Space+Build to place a building without playing a minigame.
    pub(crate) debug_build: bool,
}

/// Minigame rules.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct MinigameConfig {
    pub(crate) strikes_required: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            map_path: PathBuf::from(DEFAULT_MAP_PATH),
            save_path: PathBuf::from(DEFAULT_SAVE_PATH),
            window: WindowConfig::default(),
            overworld: OverworldConfig::default(),
            minigame: MinigameConfig::default(),
        }
    }
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 960,
            vsync: true,
        }
    }
}

impl Default for MinigameConfig {
    fn default() -> Self {
        Self {
            strikes_required: 9,
        }
    }
}

/// Values supplied on the command line; each one overrides the file.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub(crate) struct Overrides {
    pub(crate) map_path: Option<PathBuf>,
    pub(crate) save_path: Option<PathBuf>,
    pub(crate) vsync: Option<bool>,
}

impl Config {
    /// Loads the configuration file, falling back to defaults when it does not exist.
    pub(crate) fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!(path = %path.display(), "config_missing_using_defaults");
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        Self::parse(&contents)
            .with_context(|| format!("failed to parse config file {}", path.display()))
    }

    fn parse(contents: &str) -> Result<Self> {
        let config: Self = toml::from_str(contents).context("invalid config toml")?;
        Ok(config)
    }

    /// Applies command-line overrides on top of the loaded values.
    #[must_use]
    pub(crate) fn with_overrides(mut self, overrides: Overrides) -> Self {
        if let Some(map_path) = overrides.map_path {
            self.map_path = map_path;
        }
        if let Some(save_path) = overrides.save_path {
            self.save_path = save_path;
        }
        if let Some(vsync) = overrides.vsync {
            self.window.vsync = vsync;
        }
        self
    }
}
