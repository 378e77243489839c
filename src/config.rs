use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use xdg::BaseDirectories;
use yaml_rust::{ScanError, Yaml, YamlLoader};

pub const XDG_PREFIX: &str = "glassjoy";
pub const CONFIG_FILE: &str = "config.yml";

#[derive(Debug, Error)]
pub enum ConfigError {
  #[error("Could not read: {0}")]
  Io(#[from] io::Error),
  #[error("Unable to parse: {0}")]
  Scan(#[from] ScanError),
  #[error("Unable to locate configuration directory: {0}")]
  Xdg(#[from] xdg::BaseDirectoriesError),
  #[error("Invalid value for `{key}`: {reason}")]
  Invalid { key: &'static str, reason: String },
}

/// Tunables of the flick recognizer. Distances are in dp, velocity in dp/s.
#[derive(Clone, Debug, PartialEq)]
pub struct FlickConfig {
  pub touch_slop: f32,
  pub double_tap_slop: f32,
  pub double_tap_timeout: Duration,
  pub double_tap_min_time: Duration,
  pub long_press_timeout: Duration,
  pub min_fling_velocity: f32,
}

impl Default for FlickConfig {
  fn default() -> Self {
    FlickConfig {
      touch_slop: 8.0,
      double_tap_slop: 100.0,
      double_tap_timeout: Duration::from_millis(300),
      double_tap_min_time: Duration::from_millis(40),
      long_press_timeout: Duration::from_millis(500),
      min_fling_velocity: 50.0,
    }
  }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Config {
  /// Joystick dead zone in dp.
  pub dead_zone: f32,
  /// Hold time before a contact acts as a joystick.
  pub dead_time: Duration,
  pub flick: FlickConfig,
  /// Synthesize a button hold after this long; `None` relies on the input's own
  /// long-press events.
  pub button_hold_time: Option<Duration>,
  pub repeat_initial_delay: Duration,
  pub repeat_interval: Duration,
  pub exit_timeout: Duration,
  /// Pixels per dp.
  pub density: f32,
}

impl Default for Config {
  fn default() -> Self {
    Config {
      dead_zone: 16.0,
      dead_time: Duration::from_millis(300),
      flick: FlickConfig::default(),
      button_hold_time: None,
      repeat_initial_delay: Duration::from_millis(1000),
      repeat_interval: Duration::from_millis(500),
      exit_timeout: Duration::from_millis(1000),
      density: 1.0,
    }
  }
}

impl Config {
  /// Loads the config from `path`, or from the xdg config directory when no path
  /// is given. A missing xdg config file yields the defaults.
  pub fn load(path: Option<&Path>) -> Result<Config, ConfigError> {
    let path = match path {
      Some(path) => path.to_path_buf(),
      None => match Config::find_default_file()? {
        Some(path) => path,
        None => {
          log::info!("No {} found, using defaults", CONFIG_FILE);
          return Ok(Config::default());
        }
      },
    };

    log::info!("Loading config from {:?}", path);
    let content = fs::read_to_string(&path)?;
    Config::from_yaml_str(&content)
  }

  fn find_default_file() -> Result<Option<PathBuf>, ConfigError> {
    let xdg_dirs = BaseDirectories::with_prefix(XDG_PREFIX)?;
    Ok(xdg_dirs.find_config_file(CONFIG_FILE))
  }

  pub fn from_yaml_str(content: &str) -> Result<Config, ConfigError> {
    let docs = YamlLoader::load_from_str(content)?;
    let conf_yaml = match docs.first() {
      Some(doc) => doc,
      None => return Ok(Config::default()),
    };

    let defaults = Config::default();
    let flick = &conf_yaml["flick"];
    let config = Config {
      dead_zone: get_f32(&conf_yaml["joystick"]["dead_zone"], "joystick.dead_zone", defaults.dead_zone)?,
      dead_time: get_millis(&conf_yaml["joystick"]["dead_time"], "joystick.dead_time", defaults.dead_time)?,
      flick: FlickConfig {
        touch_slop: get_f32(&flick["touch_slop"], "flick.touch_slop", defaults.flick.touch_slop)?,
        double_tap_slop: get_f32(
          &flick["double_tap_slop"],
          "flick.double_tap_slop",
          defaults.flick.double_tap_slop,
        )?,
        double_tap_timeout: get_millis(
          &flick["double_tap_timeout"],
          "flick.double_tap_timeout",
          defaults.flick.double_tap_timeout,
        )?,
        double_tap_min_time: get_millis(
          &flick["double_tap_min_time"],
          "flick.double_tap_min_time",
          defaults.flick.double_tap_min_time,
        )?,
        long_press_timeout: get_millis(
          &flick["long_press_timeout"],
          "flick.long_press_timeout",
          defaults.flick.long_press_timeout,
        )?,
        min_fling_velocity: get_f32(
          &flick["min_fling_velocity"],
          "flick.min_fling_velocity",
          defaults.flick.min_fling_velocity,
        )?,
      },
      button_hold_time: get_optional_millis(&conf_yaml["button"]["hold_time"], "button.hold_time")?,
      repeat_initial_delay: get_millis(
        &conf_yaml["repeat"]["initial_delay"],
        "repeat.initial_delay",
        defaults.repeat_initial_delay,
      )?,
      repeat_interval: get_millis(&conf_yaml["repeat"]["interval"], "repeat.interval", defaults.repeat_interval)?,
      exit_timeout: get_millis(&conf_yaml["exit_timeout"], "exit_timeout", defaults.exit_timeout)?,
      density: get_f32(&conf_yaml["density"], "density", defaults.density)?,
    };

    if config.density <= 0.0 {
      return Err(ConfigError::Invalid {
        key: "density",
        reason: "must be greater than zero".to_string(),
      });
    }
    if config.repeat_interval.is_zero() {
      return Err(ConfigError::Invalid {
        key: "repeat.interval",
        reason: "must be greater than zero".to_string(),
      });
    }

    Ok(config)
  }

  pub fn dead_zone_px(&self) -> f32 {
    self.dead_zone * self.density
  }
}

// yaml-rust keeps integers and reals apart; both are fine here.
fn get_number(value: &Yaml, key: &'static str) -> Result<Option<f64>, ConfigError> {
  let number = match value {
    Yaml::BadValue | Yaml::Null => return Ok(None),
    Yaml::Integer(i) => *i as f64,
    Yaml::Real(_) => value.as_f64().ok_or_else(|| ConfigError::Invalid {
      key,
      reason: "not a number".to_string(),
    })?,
    other => {
      return Err(ConfigError::Invalid {
        key,
        reason: format!("expected a number, found {:?}", other),
      })
    }
  };

  if !number.is_finite() || number < 0.0 {
    return Err(ConfigError::Invalid {
      key,
      reason: format!("{} is not a non-negative number", number),
    });
  }
  Ok(Some(number))
}

fn get_f32(value: &Yaml, key: &'static str, default: f32) -> Result<f32, ConfigError> {
  Ok(get_number(value, key)?.map(|n| n as f32).unwrap_or(default))
}

fn get_millis(value: &Yaml, key: &'static str, default: Duration) -> Result<Duration, ConfigError> {
  Ok(get_optional_millis(value, key)?.unwrap_or(default))
}

fn get_optional_millis(value: &Yaml, key: &'static str) -> Result<Option<Duration>, ConfigError> {
  Ok(get_number(value, key)?.map(|ms| Duration::from_micros((ms * 1000.0) as u64)))
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn empty_document_yields_defaults() {
    assert_eq!(Config::from_yaml_str("").unwrap(), Config::default());
  }

  #[test]
  fn overrides_are_applied() {
    let config = Config::from_yaml_str(
      "
joystick:
  dead_zone: 20
  dead_time: 250
flick:
  min_fling_velocity: 75.5
button:
  hold_time: 800
repeat:
  interval: 400
density: 2
",
    )
    .unwrap();

    assert_eq!(config.dead_zone, 20.0);
    assert_eq!(config.dead_zone_px(), 40.0);
    assert_eq!(config.dead_time, Duration::from_millis(250));
    assert_eq!(config.flick.min_fling_velocity, 75.5);
    assert_eq!(config.flick.touch_slop, 8.0);
    assert_eq!(config.button_hold_time, Some(Duration::from_millis(800)));
    assert_eq!(config.repeat_initial_delay, Duration::from_millis(1000));
    assert_eq!(config.repeat_interval, Duration::from_millis(400));
  }

  #[test]
  fn negative_values_are_rejected() {
    let err = Config::from_yaml_str("joystick:\n  dead_time: -5\n").unwrap_err();
    assert!(matches!(err, ConfigError::Invalid { key: "joystick.dead_time", .. }));
  }

  #[test]
  fn non_numeric_values_are_rejected() {
    let err = Config::from_yaml_str("density: lots\n").unwrap_err();
    assert!(matches!(err, ConfigError::Invalid { key: "density", .. }));
  }

  #[test]
  fn zero_density_is_rejected() {
    assert!(Config::from_yaml_str("density: 0\n").is_err());
  }
}
