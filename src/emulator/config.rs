// Configuration management
//
// Core settings loaded from TOML. Where the file lives is up to the
// front end; the core only reads and writes the paths it is handed.

use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::Path;
use thiserror::Error;

use crate::cartridge::mappers::Mmc3IrqMode;
use crate::ppu::constants::{DOTS_PER_CPU_CYCLE, DOTS_PER_SCANLINE};

/// Errors from loading or saving a configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("invalid TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("could not serialize configuration: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Core configuration
///
/// Every section may be omitted from the TOML file; missing values take
/// their defaults.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CoreConfig {
    /// CPU/PPU clock relationship
    pub timing: TimingConfig,

    /// Video delivery settings
    pub video: VideoConfig,

    /// Mapper compatibility switches
    pub mappers: MapperConfig,

    /// Debug output
    pub debug: DebugConfig,
}

/// Timing configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    /// PPU dots per scanline (341 on NTSC)
    pub dots_per_scanline: u32,

    /// PPU dots per CPU cycle (3 on NTSC)
    pub dots_per_cpu_cycle: u32,
}

/// Video configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VideoConfig {
    /// Withhold the bottom 16 lines from the video sink
    pub crop_overscan: bool,
}

/// Mapper configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MapperConfig {
    /// How MMC3 clocks its IRQ counter
    pub mmc3_irq: Mmc3IrqMode,
}

/// Debug configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DebugConfig {
    /// Log a nestest-format line per instruction at `trace` level
    pub trace_cpu: bool,
}

impl Default for TimingConfig {
    fn default() -> Self {
        TimingConfig {
            dots_per_scanline: DOTS_PER_SCANLINE,
            dots_per_cpu_cycle: DOTS_PER_CPU_CYCLE,
        }
    }
}

impl Default for VideoConfig {
    fn default() -> Self {
        VideoConfig { crop_overscan: true }
    }
}

impl CoreConfig {
    /// Parse a configuration from TOML text
    ///
    /// # Errors
    ///
    /// `ConfigError::Parse` for malformed TOML, `ConfigError::Invalid` for
    /// values the scheduler cannot run with.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: CoreConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Render the configuration as TOML
    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Load configuration from file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// Load configuration from file, falling back to the defaults
    ///
    /// A missing file is silent; an unreadable or invalid one is logged.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();
        match Self::load(path) {
            Ok(config) => config,
            Err(ConfigError::Io(e)) if e.kind() == io::ErrorKind::NotFound => Self::default(),
            Err(e) => {
                log::warn!("Ignoring configuration {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    /// Save configuration to file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        fs::write(path, self.to_toml_string()?)?;
        Ok(())
    }

    /// Check the values the scheduler divides by or counts down with
    pub fn validate(&self) -> Result<(), ConfigError> {
        let timing = &self.timing;
        if timing.dots_per_cpu_cycle == 0 || timing.dots_per_scanline == 0 {
            return Err(ConfigError::Invalid(
                "timing values must be greater than zero".to_string(),
            ));
        }
        if timing.dots_per_scanline < timing.dots_per_cpu_cycle {
            return Err(ConfigError::Invalid(format!(
                "a scanline ({} dots) must be at least one CPU cycle ({} dots)",
                timing.dots_per_scanline, timing.dots_per_cpu_cycle
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = CoreConfig::default();
        assert_eq!(config.timing.dots_per_scanline, 341);
        assert_eq!(config.timing.dots_per_cpu_cycle, 3);
        assert!(config.video.crop_overscan);
        assert_eq!(config.mappers.mmc3_irq, Mmc3IrqMode::Scanline);
        assert!(!config.debug.trace_cpu);
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config = CoreConfig::from_toml_str(
            r#"
            [mappers]
            mmc3_irq = "AddressLine"

            [debug]
            trace_cpu = true
            "#,
        )
        .expect("valid config");

        assert_eq!(config.mappers.mmc3_irq, Mmc3IrqMode::AddressLine);
        assert!(config.debug.trace_cpu);
        assert_eq!(config.timing, TimingConfig::default());
        assert!(config.video.crop_overscan);
    }

    #[test]
    fn test_config_serialization() {
        let mut config = CoreConfig::default();
        config.video.crop_overscan = false;

        let toml_str = config.to_toml_string().expect("Failed to serialize");
        let deserialized = CoreConfig::from_toml_str(&toml_str).expect("Failed to deserialize");

        assert_eq!(config, deserialized);
    }

    #[test]
    fn test_invalid_values_rejected() {
        let result = CoreConfig::from_toml_str("[timing]\ndots_per_cpu_cycle = 0\n");
        assert!(matches!(result, Err(ConfigError::Invalid(_))));

        let result = CoreConfig::from_toml_str("[timing]\ndots_per_scanline = 2\n");
        assert!(matches!(result, Err(ConfigError::Invalid(_))));

        let result = CoreConfig::from_toml_str("[video\n");
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_file_round_trip() {
        let path = std::env::temp_dir().join(format!("nes-core-config-{}.toml", std::process::id()));
        let mut config = CoreConfig::default();
        config.timing.dots_per_scanline = 340;

        config.save(&path).expect("save");
        assert_eq!(CoreConfig::load(&path).expect("load"), config);
        let _ = fs::remove_file(&path);

        assert_eq!(CoreConfig::load_or_default(&path), CoreConfig::default(), "missing file");
    }
}
