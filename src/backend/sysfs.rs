//! Linux sysfs GPIO implementation of the output line.
//!
//! Talks directly to `/sys/class/gpio`: export the pin, set its direction
//! to output, then write `0`/`1` to the value attribute on each toggle.
//! The sysfs interface is deprecated in favour of the character device but
//! remains available on the small always-on boards this daemon targets.

use anyhow::{Context, Result};
use std::fs;
use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;

use super::{Level, SwitchBackend};

const GPIO_SYSFS_ROOT: &str = "/sys/class/gpio";

/// Output line driven through `/sys/class/gpio/gpioN/value`.
pub struct SysfsGpioBackend {
    pin: u32,
    active_low: bool,
    value_path: PathBuf,
    exported_here: bool,
}

impl SysfsGpioBackend {
    /// Export the pin and configure it as an output.
    ///
    /// The initial drive level is left to the caller; the scheduler writes
    /// the resolved startup state before arming any deadline so the line is
    /// never left indeterminate.
    pub fn new(pin: u32, active_low: bool) -> Result<Self> {
        let gpio_dir = PathBuf::from(GPIO_SYSFS_ROOT).join(format!("gpio{pin}"));

        let exported_here = if gpio_dir.exists() {
            false
        } else {
            fs::write(PathBuf::from(GPIO_SYSFS_ROOT).join("export"), pin.to_string())
                .with_context(|| format!("Failed to export GPIO {pin}"))?;
            // The kernel needs a moment to create the attribute files and
            // apply udev permissions after export.
            std::thread::sleep(Duration::from_millis(100));
            true
        };

        let direction_path = gpio_dir.join("direction");
        fs::write(&direction_path, "out")
            .with_context(|| format!("Failed to set GPIO {pin} direction to output"))?;

        Ok(Self {
            pin,
            active_low,
            value_path: gpio_dir.join("value"),
            exported_here,
        })
    }

    fn physical_value(&self, level: Level) -> &'static str {
        match (level, self.active_low) {
            (Level::Asserted, true) | (Level::Deasserted, false) => "0",
            (Level::Asserted, false) | (Level::Deasserted, true) => "1",
        }
    }
}

impl SwitchBackend for SysfsGpioBackend {
    fn write(&mut self, level: Level) -> Result<()> {
        let mut file = fs::OpenOptions::new()
            .write(true)
            .open(&self.value_path)
            .with_context(|| format!("Failed to open GPIO {} value attribute", self.pin))?;
        file.write_all(self.physical_value(level).as_bytes())
            .with_context(|| format!("Failed to write GPIO {} value", self.pin))?;
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "sysfs"
    }

    fn cleanup(self: Box<Self>, debug_enabled: bool) {
        // Only unexport what we exported; a pre-exported pin may be shared
        // with other tooling on the host.
        if self.exported_here {
            let result = fs::write(
                PathBuf::from(GPIO_SYSFS_ROOT).join("unexport"),
                self.pin.to_string(),
            );
            if debug_enabled {
                match result {
                    Ok(()) => log_decorated!("Unexported GPIO {}", self.pin),
                    Err(e) => log_warning!("Failed to unexport GPIO {}: {}", self.pin, e),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn polarity_mapping_active_low() {
        let backend = SysfsGpioBackend {
            pin: 5,
            active_low: true,
            value_path: PathBuf::new(),
            exported_here: false,
        };
        assert_eq!(backend.physical_value(Level::Asserted), "0");
        assert_eq!(backend.physical_value(Level::Deasserted), "1");
    }

    #[test]
    fn polarity_mapping_active_high() {
        let backend = SysfsGpioBackend {
            pin: 5,
            active_low: false,
            value_path: PathBuf::new(),
            exported_here: false,
        };
        assert_eq!(backend.physical_value(Level::Asserted), "1");
        assert_eq!(backend.physical_value(Level::Deasserted), "0");
    }
}
