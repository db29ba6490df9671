//! Game tuning
//!
//! Every feel parameter for timing, charge, aim and toss physics. Loaded once
//! at boot (JSON) and never mutated afterwards.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::*;

/// Largest basket or ground coordinate accepted (px from the catapult)
pub const COORD_LIMIT: f32 = 1.0e6;

/// Errors while loading tuning
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read tuning file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse tuning: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid tuning: {0}")]
    Invalid(String),
}

/// Tuned constants for one game build
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    // === Timing ===
    /// Animation frame length (ms)
    pub frame_ms: u32,
    /// A-button hold delay before the first repeat (ms)
    pub hold_delay_ms: u32,
    /// A-button repeat interval (ms)
    pub hold_repeat_ms: u32,

    // === Charge & aim ===
    pub charge_max: u8,
    pub angle_min: i32,
    pub angle_init: i32,
    pub angle_max: i32,
    pub angle_step: i32,
    /// Pumpkins per game
    pub pumpkins: u32,

    // === Toss physics ===
    /// Vertical launch speed at full charge (px/ms)
    pub v_base: f32,
    /// Horizontal launch speed at full charge (px/ms)
    pub u_base: f32,
    /// px/ms²
    pub gravity: f32,
    pub drag_coeff: f32,
    /// Horizontal speed floor as a fraction of `u_base`
    pub min_fraction: f32,
    pub windup_frames: u32,
    pub toss_timeout_ms: u32,
    pub basket_x: f32,
    pub basket_y: f32,
    pub ground_level: f32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            frame_ms: FRAME_MS,
            hold_delay_ms: HOLD_DELAY_MS,
            hold_repeat_ms: HOLD_REPEAT_MS,

            charge_max: CHARGE_MAX,
            angle_min: ANGLE_MIN,
            angle_init: ANGLE_INIT,
            angle_max: ANGLE_MAX,
            angle_step: ANGLE_STEP,
            pumpkins: PUMPKINS,

            v_base: V_BASE,
            u_base: U_BASE,
            gravity: GRAVITY,
            drag_coeff: DRAG_COEFF,
            min_fraction: MIN_FRACTION,
            windup_frames: WINDUP_FRAMES,
            toss_timeout_ms: TOSS_TIMEOUT_MS,
            basket_x: BASKET_X,
            basket_y: BASKET_Y,
            ground_level: GROUND_LEVEL,
        }
    }
}

impl Tuning {
    /// Parse tuning from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let tuning: Self = serde_json::from_str(json)?;
        tuning.validate()?;
        Ok(tuning)
    }

    /// Load tuning from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let tuning = Self::from_json(&json)?;
        log::info!("Loaded tuning from {}", path.display());
        Ok(tuning)
    }

    /// Reject combinations the state machine cannot honor
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.frame_ms == 0 {
            return Err(ConfigError::Invalid("frame_ms must be positive".into()));
        }
        if self.hold_repeat_ms == 0 {
            return Err(ConfigError::Invalid("hold_repeat_ms must be positive".into()));
        }
        if self.charge_max == 0 || self.charge_max > CHARGE_MAX {
            return Err(ConfigError::Invalid(format!(
                "charge_max must be in 1..={CHARGE_MAX} (charge indicator resolution)"
            )));
        }
        if !(self.angle_min <= self.angle_init && self.angle_init <= self.angle_max) {
            return Err(ConfigError::Invalid(format!(
                "angle limits out of order: {} <= {} <= {}",
                self.angle_min, self.angle_init, self.angle_max
            )));
        }
        if self.toss_timeout_ms >= MAX_TIMER {
            return Err(ConfigError::Invalid(format!(
                "toss_timeout_ms must be below {MAX_TIMER} (timer saturation)"
            )));
        }
        for (name, value) in [
            ("basket_x", self.basket_x),
            ("basket_y", self.basket_y),
            ("ground_level", self.ground_level),
        ] {
            if !value.is_finite() || value.abs() > COORD_LIMIT {
                return Err(ConfigError::Invalid(format!(
                    "{name} must be finite and within {COORD_LIMIT} px, got {value}"
                )));
            }
        }
        let physics = [self.v_base, self.u_base, self.gravity, self.drag_coeff, self.min_fraction];
        if physics.iter().any(|v| !v.is_finite()) {
            return Err(ConfigError::Invalid("toss physics must be finite".into()));
        }
        if self.basket_y >= self.ground_level {
            return Err(ConfigError::Invalid(
                "basket must start above ground level".into(),
            ));
        }
        if !(self.min_fraction > 0.0 && self.gravity > 0.0 && self.drag_coeff >= 0.0) {
            return Err(ConfigError::Invalid(
                "min_fraction and gravity must be positive, drag_coeff non-negative".into(),
            ));
        }
        Ok(())
    }

    /// Horizontal speed floor (px/ms)
    pub fn min_horizontal_speed(&self) -> f32 {
        self.min_fraction * self.u_base
    }
}
