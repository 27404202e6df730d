//! Configuration for sunswitch with validation and default generation.
//!
//! Settings live in `sunswitch.toml` under the XDG config directory
//! (`$XDG_CONFIG_HOME/sunswitch/sunswitch.toml`). When no file exists a
//! commented default is written so a fresh deployment starts with the
//! original hardware's coordinates and pin assignment and only needs the
//! location edited.
//!
//! Latitude and longitude are fixed constants for a given deployment,
//! supplied once at process start. There is no hot reload; the daemon is
//! restarted when the file changes.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::PathBuf;

use crate::constants::*;

/// Deployment settings loaded from `sunswitch.toml`.
///
/// All fields are optional in the file; the GPIO fields fall back to
/// defaults while missing coordinates are a validation error, since no
/// sensible location can be guessed.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct Config {
    /// Geographic latitude in decimal degrees (-90 to +90, positive north).
    pub latitude: Option<f64>,
    /// Geographic longitude in decimal degrees (-180 to +180, positive east).
    pub longitude: Option<f64>,
    /// sysfs GPIO number of the output line.
    pub gpio_pin: Option<u32>,
    /// Whether the line is wired active-low (driving it low turns the
    /// relay on). Matches common solid-state relay boards.
    pub active_low: Option<bool>,
}

impl Config {
    /// Load configuration from the default path, creating a commented
    /// default file first if none exists.
    pub fn load() -> Result<Self> {
        let path = get_config_path()?;
        if !path.exists() {
            create_default_config(&path)?;
            log_block_start!("Created default configuration: {}", path.display());
            log_indented!("Edit latitude/longitude for your deployment site");
        }
        Self::load_from_path(&path)
    }

    /// Load and validate configuration from an explicit path.
    pub fn load_from_path(path: &PathBuf) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read configuration from {}", path.display()))?;
        let config: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse configuration at {}", path.display()))?;
        validate_config(&config)?;
        Ok(config)
    }

    /// Latitude, guaranteed present after validation.
    pub fn latitude(&self) -> f64 {
        self.latitude.expect("validated at load time")
    }

    /// Longitude, guaranteed present after validation.
    pub fn longitude(&self) -> f64 {
        self.longitude.expect("validated at load time")
    }

    /// GPIO number of the output line.
    pub fn gpio_pin(&self) -> u32 {
        self.gpio_pin.unwrap_or(DEFAULT_GPIO_PIN)
    }

    /// Output polarity.
    pub fn active_low(&self) -> bool {
        self.active_low.unwrap_or(DEFAULT_ACTIVE_LOW)
    }

    /// Log the loaded configuration as an indented block.
    pub fn log_config(&self) {
        log_block_start!("Loaded configuration");
        log_indented!("Latitude: {:.4}°", self.latitude());
        log_indented!("Longitude: {:.4}°", self.longitude());
        log_indented!("GPIO pin: {}", self.gpio_pin());
        log_indented!(
            "Polarity: {}",
            if self.active_low() { "active-low" } else { "active-high" }
        );
    }
}

/// Resolve the path of `sunswitch.toml` under the XDG config directory.
pub fn get_config_path() -> Result<PathBuf> {
    let config_dir = dirs::config_dir().context("Could not determine config directory")?;
    Ok(config_dir.join("sunswitch").join("sunswitch.toml"))
}

/// Validate loaded settings, rejecting impossible deployments early.
fn validate_config(config: &Config) -> Result<()> {
    let lat = config
        .latitude
        .context("latitude is required (decimal degrees, -90 to 90)")?;
    let lon = config
        .longitude
        .context("longitude is required (decimal degrees, -180 to 180)")?;

    if !(-90.0..=90.0).contains(&lat) {
        anyhow::bail!("latitude must be between -90 and 90 degrees (got {lat})");
    }
    if !(-180.0..=180.0).contains(&lon) {
        anyhow::bail!("longitude must be between -180 and 180 degrees (got {lon})");
    }
    if let Some(pin) = config.gpio_pin
        && pin > MAXIMUM_GPIO_PIN
    {
        anyhow::bail!("gpio_pin ({pin}) must be at most {MAXIMUM_GPIO_PIN}");
    }
    Ok(())
}

/// Write a commented default configuration file.
///
/// The defaults mirror the original deployment: Oklahoma City coordinates,
/// GPIO 5, active-low relay wiring.
pub fn create_default_config(path: &PathBuf) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).context("Failed to create config directory")?;
    }

    let content = format!(
        "#[Location]\n\
         latitude = 35.1515    # Geographic latitude (-90 to 90, positive north)\n\
         longitude = -97.2919  # Geographic longitude (-180 to 180, positive east)\n\
         \n\
         #[Output]\n\
         gpio_pin = {DEFAULT_GPIO_PIN}          # sysfs GPIO number of the switched line (0-{MAXIMUM_GPIO_PIN})\n\
         active_low = {DEFAULT_ACTIVE_LOW}     # true: driving the line low turns the relay on\n"
    );

    fs::write(path, content)
        .with_context(|| format!("Failed to write default config to {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    fn write_config(dir: &TempDir, contents: &str) -> PathBuf {
        let path = dir.path().join("sunswitch.toml");
        let mut file = fs::File::create(&path).unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        path
    }

    #[test]
    fn loads_minimal_config_with_defaults() {
        let dir = TempDir::new().unwrap();
        let path = write_config(&dir, "latitude = 35.1515\nlongitude = -97.2919\n");
        let config = Config::load_from_path(&path).unwrap();
        assert_eq!(config.latitude(), 35.1515);
        assert_eq!(config.longitude(), -97.2919);
        assert_eq!(config.gpio_pin(), DEFAULT_GPIO_PIN);
        assert!(config.active_low());
    }

    #[test]
    fn loads_full_config() {
        let dir = TempDir::new().unwrap();
        let path = write_config(
            &dir,
            "latitude = -36.85\nlongitude = 174.76\ngpio_pin = 17\nactive_low = false\n",
        );
        let config = Config::load_from_path(&path).unwrap();
        assert_eq!(config.gpio_pin(), 17);
        assert!(!config.active_low());
    }

    #[test]
    fn rejects_missing_coordinates() {
        let dir = TempDir::new().unwrap();
        let path = write_config(&dir, "gpio_pin = 5\n");
        let err = Config::load_from_path(&path).unwrap_err();
        assert!(err.to_string().contains("latitude"));
    }

    #[test]
    fn rejects_out_of_range_latitude() {
        let dir = TempDir::new().unwrap();
        let path = write_config(&dir, "latitude = 95.0\nlongitude = 0.0\n");
        assert!(Config::load_from_path(&path).is_err());
    }

    #[test]
    fn rejects_out_of_range_longitude() {
        let dir = TempDir::new().unwrap();
        let path = write_config(&dir, "latitude = 0.0\nlongitude = -200.0\n");
        assert!(Config::load_from_path(&path).is_err());
    }

    #[test]
    fn rejects_absurd_gpio_pin() {
        let dir = TempDir::new().unwrap();
        let path = write_config(&dir, "latitude = 0.0\nlongitude = 0.0\ngpio_pin = 5000\n");
        assert!(Config::load_from_path(&path).is_err());
    }

    #[test]
    fn default_config_round_trips() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("sunswitch.toml");
        create_default_config(&path).unwrap();
        let config = Config::load_from_path(&path).unwrap();
        assert_eq!(config.latitude(), 35.1515);
        assert_eq!(config.longitude(), -97.2919);
        assert_eq!(config.gpio_pin(), DEFAULT_GPIO_PIN);
    }
}
