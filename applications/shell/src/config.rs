/// Shell configuration
use crate::error::{Result, ShellError};
use orbit_metadata::ScanConfig;
use orbit_playback::PlaybackConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Config file looked up in the working directory when none is given
pub const DEFAULT_CONFIG_FILE: &str = "orbit.toml";

/// Prefix for environment overrides, e.g. `ORBIT__PLAYBACK__VOLUME=0.5`
pub const ENV_PREFIX: &str = "ORBIT";

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct ShellConfig {
    #[serde(default)]
    pub playback: PlaybackConfig,

    #[serde(default)]
    pub library: LibrarySettings,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct LibrarySettings {
    /// Files or directories loaded at startup, before any given on the
    /// command line
    #[serde(default)]
    pub paths: Vec<PathBuf>,

    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,

    #[serde(default = "default_recursive")]
    pub recursive: bool,
}

impl LibrarySettings {
    pub fn scan_config(&self) -> ScanConfig {
        ScanConfig {
            recursive: self.recursive,
            ..ScanConfig::with_extensions(&self.extensions)
        }
    }
}

impl Default for LibrarySettings {
    fn default() -> Self {
        Self {
            paths: Vec::new(),
            extensions: default_extensions(),
            recursive: default_recursive(),
        }
    }
}

fn default_extensions() -> Vec<String> {
    ScanConfig::default().extensions
}

fn default_recursive() -> bool {
    true
}

/// Environment source used by [`ShellConfig::load`]
pub fn environment() -> config::Environment {
    config::Environment::with_prefix(ENV_PREFIX)
        .prefix_separator("__")
        .separator("__")
        .try_parsing(true)
}

impl ShellConfig {
    /// Load configuration from file and environment
    ///
    /// An explicit `path` must exist; otherwise `orbit.toml` is used when
    /// present.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        Self::load_with(path, environment())
    }

    /// Same as [`load`](Self::load) with a custom environment source
    pub fn load_with(path: Option<&Path>, env: config::Environment) -> Result<Self> {
        let mut settings = config::Config::builder();

        match path {
            Some(path) => {
                if !path.exists() {
                    return Err(ShellError::Config(format!(
                        "config file {} not found",
                        path.display()
                    )));
                }
                settings = settings.add_source(config::File::from(path));
            }
            None => {
                let default_path = PathBuf::from(DEFAULT_CONFIG_FILE);
                if default_path.exists() {
                    settings = settings.add_source(config::File::from(default_path));
                }
            }
        }

        // Override with environment variables (prefixed with ORBIT__)
        settings = settings.add_source(env);

        let config: Self = settings.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        let volume = self.playback.volume;
        if !(0.0..=1.0).contains(&volume) {
            return Err(ShellError::Config(format!(
                "playback.volume must be between 0 and 1, got {volume}"
            )));
        }

        if self.playback.scrub_threshold_secs.is_nan() || self.playback.scrub_threshold_secs < 0.0
        {
            return Err(ShellError::Config(format!(
                "playback.scrub_threshold_secs must not be negative, got {}",
                self.playback.scrub_threshold_secs
            )));
        }

        if self.library.extensions.is_empty() {
            return Err(ShellError::Config(
                "library.extensions must list at least one extension".to_string(),
            ));
        }

        Ok(())
    }
}
