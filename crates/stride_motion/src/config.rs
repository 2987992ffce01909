//! Controller configuration
//!
//! Every field has a default, so a config file only needs the values it
//! changes:
//!
//! ```toml
//! [movement]
//! max_speed = 1.8
//!
//! [body]
//! eye_height = 3.35
//! capsule_height = 1.85
//! capsule_radius = 0.25
//! ```

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use stride_core::Vec3;
use stride_platform::Key;
use thiserror::Error;

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Config file could not be read
    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Config file is not valid TOML for this schema
    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    /// Config could not be written as TOML
    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    /// A value is outside its allowed range
    #[error("Invalid value for `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Full controller configuration
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StrideConfig {
    pub movement: MovementConfig,
    pub gait: GaitConfig,
    pub body: BodyConfig,
    pub look: LookConfig,
    pub touch: TouchConfig,
    pub telemetry: TelemetryConfig,
    pub audio: FootstepAudioConfig,
    pub keys: KeyBindings,
}

/// Horizontal movement
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MovementConfig {
    /// Top walking speed (m/s)
    pub max_speed: f32,
    /// Rate used while speeding up (m/s²)
    pub acceleration: f32,
    /// Rate used while slowing down (m/s²)
    pub deceleration: f32,
    /// Joystick axis magnitude below which keyboard flags are used instead
    pub joystick_threshold: f32,
}

impl Default for MovementConfig {
    fn default() -> Self {
        Self {
            max_speed: 2.0,
            acceleration: 18.0,
            deceleration: 22.0,
            joystick_threshold: 0.001,
        }
    }
}

/// Head-bob shaping
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GaitConfig {
    /// Master switch; disabled means no offsets and no footsteps
    pub enabled: bool,
    /// Step cadence at a crawl (Hz)
    pub min_cadence_hz: f32,
    /// Step cadence at full speed (Hz)
    pub max_cadence_hz: f32,
    /// Peak vertical offset (m)
    pub vertical_amplitude: f32,
    /// Peak side sway (m)
    pub lateral_amplitude: f32,
    /// How quickly intensity follows speed (1/s)
    pub intensity_smoothing: f32,
    /// How quickly cadence follows speed (1/s)
    pub cadence_smoothing: f32,
    /// Weight of the 4th harmonic in the vertical curve
    pub harmonic_weight: f32,
    /// 0..1, how much speed scales amplitude
    pub speed_amplitude_influence: f32,
    /// 0..1, sway weight for pure strafing relative to forward walking
    pub strafe_lateral_factor: f32,
}

impl Default for GaitConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            min_cadence_hz: 0.1,
            max_cadence_hz: 0.8,
            vertical_amplitude: 0.015,
            lateral_amplitude: 0.01,
            intensity_smoothing: 8.0,
            cadence_smoothing: 6.0,
            harmonic_weight: 0.15,
            speed_amplitude_influence: 1.0,
            strafe_lateral_factor: 0.6,
        }
    }
}

/// Capsule geometry and eye placement
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BodyConfig {
    /// Eye height above the feet (m)
    pub eye_height: f32,
    pub capsule_radius: f32,
    /// Length of the capsule's cylindrical section (m)
    pub capsule_height: f32,
    /// Ground point the body is spawned above
    pub spawn: Vec3,
}

impl Default for BodyConfig {
    fn default() -> Self {
        Self {
            eye_height: 1.6,
            capsule_radius: 0.3,
            capsule_height: 1.0,
            spawn: Vec3::new(0.0, 0.0, 5.0),
        }
    }
}

impl BodyConfig {
    /// Distance from the body center down to the feet
    pub fn feet_offset(&self) -> f32 {
        self.capsule_height / 2.0 + self.capsule_radius
    }

    /// Body center for the spawn point, lifted just clear of the ground
    pub fn spawn_position(&self) -> Vec3 {
        Vec3::new(
            self.spawn.x,
            self.spawn.y + self.feet_offset() + 0.01,
            self.spawn.z,
        )
    }
}

/// Look rotation
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LookConfig {
    /// Touch-drag sensitivity (radians per pixel)
    pub touch_sensitivity: f32,
    /// Locked-pointer sensitivity (radians per pixel)
    pub pointer_sensitivity: f32,
    /// Pitch stops this far short of straight up/down (radians)
    pub pitch_margin: f32,
}

impl Default for LookConfig {
    fn default() -> Self {
        Self {
            touch_sensitivity: 0.0025,
            pointer_sensitivity: 0.002,
            pitch_margin: 0.01,
        }
    }
}

impl LookConfig {
    /// Largest pitch magnitude the camera may reach
    pub fn pitch_limit(&self) -> f32 {
        std::f32::consts::FRAC_PI_2 - self.pitch_margin
    }
}

/// On-screen touch controls
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TouchConfig {
    /// Joystick travel that maps to a full axis (px)
    pub max_radius: f32,
    /// Travel over which the joystick ramps up from zero (px)
    pub dead_zone: f32,
    /// Multiplier on look-drag pixels before they reach the store
    pub look_sensitivity: f32,
}

impl Default for TouchConfig {
    fn default() -> Self {
        Self {
            max_radius: 60.0,
            dead_zone: 8.0,
            look_sensitivity: 1.0,
        }
    }
}

/// Gait debug telemetry
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TelemetryConfig {
    /// Start with telemetry on
    pub enabled: bool,
    /// Points per reference curve in exported overlay data
    pub curve_samples: usize,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            curve_samples: 128,
        }
    }
}

/// Footstep sound cue shaping
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FootstepAudioConfig {
    /// Minimum time between two cues (s)
    pub min_interval: f32,
    /// Number of interchangeable footstep samples
    pub variants: u32,
    pub volume_min: f32,
    pub volume_jitter: f32,
    pub rate_min: f32,
    pub rate_jitter: f32,
    /// Seed for the variation generator
    pub seed: u64,
}

impl Default for FootstepAudioConfig {
    fn default() -> Self {
        Self {
            min_interval: 0.11,
            variants: 3,
            volume_min: 0.6,
            volume_jitter: 0.15,
            rate_min: 0.95,
            rate_jitter: 0.1,
            seed: 0x5757_4144,
        }
    }
}

/// Keyboard bindings
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyBindings {
    pub forward: Key,
    pub back: Key,
    pub strafe_left: Key,
    pub strafe_right: Key,
    /// Toggles gait telemetry
    pub debug_toggle: Key,
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self {
            forward: Key::W,
            back: Key::S,
            strafe_left: Key::A,
            strafe_right: Key::D,
            debug_toggle: Key::B,
        }
    }
}

impl StrideConfig {
    /// Load and validate a TOML config file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    /// Parse and validate TOML text
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: StrideConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Check every numeric field against its allowed range
    pub fn validate(&self) -> Result<(), ConfigError> {
        let m = &self.movement;
        non_negative("movement.max_speed", m.max_speed)?;
        positive("movement.acceleration", m.acceleration)?;
        positive("movement.deceleration", m.deceleration)?;
        non_negative("movement.joystick_threshold", m.joystick_threshold)?;

        let g = &self.gait;
        non_negative("gait.min_cadence_hz", g.min_cadence_hz)?;
        non_negative("gait.max_cadence_hz", g.max_cadence_hz)?;
        if g.min_cadence_hz > g.max_cadence_hz {
            return Err(ConfigError::Invalid {
                field: "gait.min_cadence_hz",
                reason: format!(
                    "{} is above max_cadence_hz {}",
                    g.min_cadence_hz, g.max_cadence_hz
                ),
            });
        }
        non_negative("gait.vertical_amplitude", g.vertical_amplitude)?;
        non_negative("gait.lateral_amplitude", g.lateral_amplitude)?;
        non_negative("gait.intensity_smoothing", g.intensity_smoothing)?;
        non_negative("gait.cadence_smoothing", g.cadence_smoothing)?;
        finite("gait.harmonic_weight", g.harmonic_weight)?;
        unit("gait.speed_amplitude_influence", g.speed_amplitude_influence)?;
        unit("gait.strafe_lateral_factor", g.strafe_lateral_factor)?;

        let b = &self.body;
        non_negative("body.eye_height", b.eye_height)?;
        non_negative("body.capsule_radius", b.capsule_radius)?;
        non_negative("body.capsule_height", b.capsule_height)?;
        if !b.spawn.is_finite() {
            return Err(ConfigError::Invalid {
                field: "body.spawn",
                reason: "must be finite".into(),
            });
        }

        let l = &self.look;
        finite("look.touch_sensitivity", l.touch_sensitivity)?;
        finite("look.pointer_sensitivity", l.pointer_sensitivity)?;
        if !(0.0..std::f32::consts::FRAC_PI_2).contains(&l.pitch_margin) {
            return Err(ConfigError::Invalid {
                field: "look.pitch_margin",
                reason: format!("{} is outside [0, π/2)", l.pitch_margin),
            });
        }

        let t = &self.touch;
        positive("touch.max_radius", t.max_radius)?;
        non_negative("touch.dead_zone", t.dead_zone)?;
        finite("touch.look_sensitivity", t.look_sensitivity)?;

        let a = &self.audio;
        non_negative("audio.min_interval", a.min_interval)?;
        if a.variants == 0 {
            return Err(ConfigError::Invalid {
                field: "audio.variants",
                reason: "at least one footstep variant is required".into(),
            });
        }
        non_negative("audio.volume_min", a.volume_min)?;
        non_negative("audio.volume_jitter", a.volume_jitter)?;
        positive("audio.rate_min", a.rate_min)?;
        non_negative("audio.rate_jitter", a.rate_jitter)?;

        Ok(())
    }
}

fn finite(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::Invalid {
            field,
            reason: format!("{} is not finite", value),
        })
    }
}

fn non_negative(field: &'static str, value: f32) -> Result<(), ConfigError> {
    finite(field, value)?;
    if value < 0.0 {
        return Err(ConfigError::Invalid {
            field,
            reason: format!("{} is negative", value),
        });
    }
    Ok(())
}

fn positive(field: &'static str, value: f32) -> Result<(), ConfigError> {
    finite(field, value)?;
    if value <= 0.0 {
        return Err(ConfigError::Invalid {
            field,
            reason: format!("{} must be greater than zero", value),
        });
    }
    Ok(())
}

fn unit(field: &'static str, value: f32) -> Result<(), ConfigError> {
    finite(field, value)?;
    if !(0.0..=1.0).contains(&value) {
        return Err(ConfigError::Invalid {
            field,
            reason: format!("{} is outside [0, 1]", value),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = StrideConfig::default();
        config.validate().unwrap();
        assert_eq!(config.body.feet_offset(), 0.8);
        assert_eq!(config.keys.debug_toggle, Key::B);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config = StrideConfig::from_toml_str(
            r#"
            [movement]
            max_speed = 1.8

            [body]
            eye_height = 3.35
            capsule_height = 1.85
            capsule_radius = 0.25
            "#,
        )
        .unwrap();

        assert_eq!(config.movement.max_speed, 1.8);
        assert_eq!(config.movement.acceleration, 18.0);
        assert_eq!(config.body.eye_height, 3.35);
        assert_eq!(config.gait, GaitConfig::default());
    }

    #[test]
    fn test_toml_round_trip() {
        let mut config = StrideConfig::default();
        config.keys.forward = Key::Up;
        config.telemetry.enabled = true;

        let text = config.to_toml_string().unwrap();
        let parsed = StrideConfig::from_toml_str(&text).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_rejects_inverted_cadence_range() {
        let err = StrideConfig::from_toml_str(
            r#"
            [gait]
            min_cadence_hz = 2.0
            max_cadence_hz = 1.0
            "#,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid {
                field: "gait.min_cadence_hz",
                ..
            }
        ));
    }

    #[test]
    fn test_rejects_out_of_range_factor() {
        let mut config = StrideConfig::default();
        config.gait.strafe_lateral_factor = 1.5;
        assert!(config.validate().is_err());

        let mut config = StrideConfig::default();
        config.movement.deceleration = 0.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_parse_error() {
        let err = StrideConfig::from_toml_str("[movement]\nmax_speed = \"fast\"").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_spawn_position() {
        let body = BodyConfig::default();
        let spawn = body.spawn_position();
        assert_eq!(spawn.x, 0.0);
        assert!((spawn.y - 0.81).abs() < 1e-6);
        assert_eq!(spawn.z, 5.0);
    }
}
