//! Linux sysfs GPIO and PWM backend

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::{Direction, MotorError, MotorIo, Wheel};

/// Pin assignment for one wheel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MotorPins {
    /// First H-bridge input (BCM numbering)
    pub in1: u32,
    /// Second H-bridge input (BCM numbering)
    pub in2: u32,
    /// PWM chip index under `pwm/`
    pub pwm_chip: u32,
    /// Channel index on the PWM chip
    pub pwm_channel: u32,
}

/// Sysfs backend configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SysfsConfig {
    /// Root holding `gpio/` and `pwm/` (normally `/sys/class`)
    pub root: PathBuf,
    pub left: MotorPins,
    pub right: MotorPins,
    /// PWM carrier frequency
    pub pwm_frequency_hz: u32,
}

impl Default for SysfsConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("/sys/class"),
            left: MotorPins {
                in1: 17,
                in2: 27,
                pwm_chip: 0,
                pwm_channel: 1,
            },
            right: MotorPins {
                in1: 24,
                in2: 23,
                pwm_chip: 0,
                pwm_channel: 0,
            },
            pwm_frequency_hz: 1000,
        }
    }
}

fn write(path: &Path, value: &str) -> Result<(), MotorError> {
    std::fs::write(path, value).map_err(|source| MotorError::Sysfs {
        path: path.to_path_buf(),
        source,
    })
}

struct Channel {
    in1: PathBuf,
    in2: PathBuf,
    pwm: PathBuf,
}

/// H-bridge on exported sysfs GPIO lines and PWM channels
pub struct SysfsMotorIo {
    config: SysfsConfig,
    channels: [Channel; 2],
    period_ns: u64,
    released: bool,
}

impl SysfsMotorIo {
    /// Export and configure all pins and channels, leaving them low and at 0
    pub fn open(config: SysfsConfig) -> Result<Self, MotorError> {
        if config.pwm_frequency_hz == 0 {
            return Err(MotorError::InvalidFrequency(0));
        }
        let period_ns = 1_000_000_000 / config.pwm_frequency_hz as u64;

        let left = Self::open_channel(&config.root, &config.left, period_ns)?;
        let right = match Self::open_channel(&config.root, &config.right, period_ns) {
            Ok(channel) => channel,
            Err(e) => {
                warn!("Right motor channel unavailable, releasing left: {}", e);
                let _ = Self::release_channel(&config.root, &config.left, &left);
                return Err(e);
            }
        };

        info!(
            "Motor GPIO ready: left {:?}, right {:?} @ {} Hz",
            config.left, config.right, config.pwm_frequency_hz
        );

        let mut io = Self {
            config,
            channels: [left, right],
            period_ns,
            released: false,
        };
        io.reset()?;
        Ok(io)
    }

    fn export_gpio(root: &Path, pin: u32) -> Result<PathBuf, MotorError> {
        let dir = root.join("gpio").join(format!("gpio{pin}"));
        if !dir.exists() {
            write(&root.join("gpio").join("export"), &pin.to_string())?;
        }
        if !dir.exists() {
            return Err(MotorError::GpioUnavailable(pin));
        }
        write(&dir.join("direction"), "out")?;
        Ok(dir.join("value"))
    }

    fn export_pwm(root: &Path, chip: u32, channel: u32) -> Result<PathBuf, MotorError> {
        let chip_dir = root.join("pwm").join(format!("pwmchip{chip}"));
        let dir = chip_dir.join(format!("pwm{channel}"));
        if !dir.exists() {
            write(&chip_dir.join("export"), &channel.to_string())?;
        }
        if !dir.exists() {
            return Err(MotorError::PwmUnavailable { chip, channel });
        }
        Ok(dir)
    }

    fn open_channel(root: &Path, pins: &MotorPins, period_ns: u64) -> Result<Channel, MotorError> {
        let in1 = Self::export_gpio(root, pins.in1)?;
        let in2 = Self::export_gpio(root, pins.in2)?;
        let pwm = Self::export_pwm(root, pins.pwm_chip, pins.pwm_channel)?;

        // Duty must not exceed the period, so zero it before changing the period.
        write(&pwm.join("duty_cycle"), "0")?;
        write(&pwm.join("period"), &period_ns.to_string())?;
        write(&pwm.join("enable"), "1")?;

        debug!("Opened motor channel {:?}", pins);
        Ok(Channel { in1, in2, pwm })
    }

    /// Disable the channel and unexport its PWM and GPIO lines.
    /// Every step is attempted; the first error is returned.
    fn release_channel(root: &Path, pins: &MotorPins, channel: &Channel) -> Result<(), MotorError> {
        let steps = [
            (channel.pwm.join("duty_cycle"), "0".to_string()),
            (channel.pwm.join("enable"), "0".to_string()),
            (
                root.join("pwm").join(format!("pwmchip{}", pins.pwm_chip)).join("unexport"),
                pins.pwm_channel.to_string(),
            ),
            (channel.in1.clone(), "0".to_string()),
            (channel.in2.clone(), "0".to_string()),
            (root.join("gpio").join("unexport"), pins.in1.to_string()),
            (root.join("gpio").join("unexport"), pins.in2.to_string()),
        ];

        let mut first_error = None;
        for (path, value) in steps {
            if let Err(e) = write(&path, &value) {
                warn!("Release step failed: {}", e);
                first_error.get_or_insert(e);
            }
        }
        first_error.map_or(Ok(()), Err)
    }

    fn duty_ns(&self, duty: f64) -> u64 {
        let fraction = (duty / 100.0).clamp(0.0, 1.0);
        (self.period_ns as f64 * fraction).round() as u64
    }
}

impl MotorIo for SysfsMotorIo {
    fn set_direction(&mut self, wheel: Wheel, direction: Direction) -> Result<(), MotorError> {
        let channel = &self.channels[wheel.index()];
        let (in1, in2) = direction.pin_levels();
        write(&channel.in1, if in1 { "1" } else { "0" })?;
        write(&channel.in2, if in2 { "1" } else { "0" })
    }

    fn set_duty_cycle(&mut self, wheel: Wheel, duty: f64) -> Result<(), MotorError> {
        let ns = self.duty_ns(duty);
        write(&self.channels[wheel.index()].pwm.join("duty_cycle"), &ns.to_string())
    }

    fn reset(&mut self) -> Result<(), MotorError> {
        let mut first_error = None;
        for wheel in Wheel::BOTH {
            if let Err(e) = self.set_duty_cycle(wheel, 0.0) {
                first_error.get_or_insert(e);
            }
            if let Err(e) = self.set_direction(wheel, Direction::Off) {
                first_error.get_or_insert(e);
            }
        }
        first_error.map_or(Ok(()), Err)
    }

    fn release(&mut self) -> Result<(), MotorError> {
        if self.released {
            return Ok(());
        }
        self.released = true;

        let mut first_error = None;
        let wheels = [self.config.left, self.config.right];
        for (pins, channel) in wheels.iter().zip(self.channels.iter()) {
            if let Err(e) = Self::release_channel(&self.config.root, pins, channel) {
                first_error.get_or_insert(e);
            }
        }

        info!("Motor GPIO released");
        first_error.map_or(Ok(()), Err)
    }
}

impl Drop for SysfsMotorIo {
    fn drop(&mut self) {
        if let Err(e) = self.release() {
            warn!("Motor GPIO release on drop failed: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Lay out a fake sysfs tree with every pin and channel pre-exported
    fn fake_sysfs(config: &SysfsConfig) {
        for pins in [config.left, config.right] {
            for pin in [pins.in1, pins.in2] {
                std::fs::create_dir_all(config.root.join("gpio").join(format!("gpio{pin}"))).unwrap();
            }
            std::fs::create_dir_all(
                config
                    .root
                    .join("pwm")
                    .join(format!("pwmchip{}", pins.pwm_chip))
                    .join(format!("pwm{}", pins.pwm_channel)),
            )
            .unwrap();
        }
    }

    fn read(path: PathBuf) -> String {
        std::fs::read_to_string(path).unwrap()
    }

    #[test]
    fn test_open_configures_pins() {
        let dir = tempfile::tempdir().unwrap();
        let config = SysfsConfig {
            root: dir.path().to_path_buf(),
            ..Default::default()
        };
        fake_sysfs(&config);

        let _io = SysfsMotorIo::open(config).unwrap();
        let gpio = dir.path().join("gpio");
        assert_eq!(read(gpio.join("gpio24/direction")), "out");
        assert_eq!(read(gpio.join("gpio24/value")), "0");
        assert_eq!(read(gpio.join("gpio27/value")), "0");

        let pwm = dir.path().join("pwm/pwmchip0/pwm1");
        assert_eq!(read(pwm.join("period")), "1000000");
        assert_eq!(read(pwm.join("duty_cycle")), "0");
        assert_eq!(read(pwm.join("enable")), "1");
    }

    #[test]
    fn test_forward_and_duty() {
        let dir = tempfile::tempdir().unwrap();
        let config = SysfsConfig {
            root: dir.path().to_path_buf(),
            ..Default::default()
        };
        fake_sysfs(&config);

        let mut io = SysfsMotorIo::open(config).unwrap();
        io.set_direction(Wheel::Left, Direction::Forward).unwrap();
        io.set_duty_cycle(Wheel::Left, 60.0).unwrap();

        assert_eq!(read(dir.path().join("gpio/gpio17/value")), "1");
        assert_eq!(read(dir.path().join("gpio/gpio27/value")), "0");
        assert_eq!(read(dir.path().join("pwm/pwmchip0/pwm1/duty_cycle")), "600000");
        // Right wheel untouched
        assert_eq!(read(dir.path().join("pwm/pwmchip0/pwm0/duty_cycle")), "0");
    }

    #[test]
    fn test_release_unexports() {
        let dir = tempfile::tempdir().unwrap();
        let config = SysfsConfig {
            root: dir.path().to_path_buf(),
            ..Default::default()
        };
        fake_sysfs(&config);

        let mut io = SysfsMotorIo::open(config).unwrap();
        io.release().unwrap();
        io.release().unwrap();
        assert_eq!(read(dir.path().join("pwm/pwmchip0/pwm0/enable")), "0");
        assert!(dir.path().join("gpio/unexport").is_file());
    }

    #[test]
    fn test_missing_gpio_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("gpio")).unwrap();
        let config = SysfsConfig {
            root: dir.path().to_path_buf(),
            ..Default::default()
        };
        assert!(matches!(
            SysfsMotorIo::open(config),
            Err(MotorError::GpioUnavailable(17))
        ));
    }

    #[test]
    fn test_partial_open_releases_left_channel() {
        let dir = tempfile::tempdir().unwrap();
        let config = SysfsConfig {
            root: dir.path().to_path_buf(),
            ..Default::default()
        };
        // Only the left wheel's lines exist
        for pin in [config.left.in1, config.left.in2] {
            std::fs::create_dir_all(dir.path().join("gpio").join(format!("gpio{pin}"))).unwrap();
        }
        std::fs::create_dir_all(dir.path().join("pwm/pwmchip0/pwm1")).unwrap();

        assert!(matches!(
            SysfsMotorIo::open(config),
            Err(MotorError::GpioUnavailable(24))
        ));
        assert_eq!(read(dir.path().join("pwm/pwmchip0/pwm1/enable")), "0");
        assert_eq!(read(dir.path().join("pwm/pwmchip0/unexport")), "1");
        assert_eq!(read(dir.path().join("gpio/unexport")), "27");
    }

    #[test]
    fn test_drop_releases_hardware() {
        let dir = tempfile::tempdir().unwrap();
        let config = SysfsConfig {
            root: dir.path().to_path_buf(),
            ..Default::default()
        };
        fake_sysfs(&config);

        let mut io = SysfsMotorIo::open(config).unwrap();
        io.set_direction(Wheel::Right, Direction::Forward).unwrap();
        io.set_duty_cycle(Wheel::Right, 80.0).unwrap();
        drop(io);

        let pwm = dir.path().join("pwm/pwmchip0/pwm0");
        assert_eq!(read(pwm.join("enable")), "0");
        assert_eq!(read(pwm.join("duty_cycle")), "0");
        assert_eq!(read(dir.path().join("gpio/gpio24/value")), "0");
    }

    #[test]
    fn test_zero_frequency_rejected() {
        let config = SysfsConfig {
            pwm_frequency_hz: 0,
            ..Default::default()
        };
        assert!(matches!(
            SysfsMotorIo::open(config),
            Err(MotorError::InvalidFrequency(0))
        ));
    }
}
