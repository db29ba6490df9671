//! Pumpkin Toss - catapult arcade game core
//!
//! Core modules:
//! - `sim`: Game state machine, tick engine and toss physics
//! - `input`: Gamepad bitmask classification (edges, hold/repeat)
//! - `sprites`: Sprite manager interface and tile tables
//! - `host`: Cooperative poll/tick/refresh loop
//! - `settings`: Data-driven game tuning

pub mod host;
pub mod input;
pub mod settings;
pub mod sim;
pub mod sprites;

pub use input::{Event, InputTracker};
pub use settings::{ConfigError, Tuning};
pub use sim::{GameState, Phase, StateMachine};

/// Game configuration constants
pub mod consts {
    /// Animation frame duration (ms). Physics and sprites update at most once per frame.
    pub const FRAME_MS: u32 = 64;

    /// Hardware tick counter rolls over at 2^29
    pub const TICK_MASK: u32 = (1 << 29) - 1;
    /// Upper clamp for the game timer so tick arithmetic never overflows
    pub const MAX_TIMER: u32 = (1 << 30) - 1;

    /// Charge power limit (matches the 20-step charge indicator bar)
    pub const CHARGE_MAX: u8 = 20;

    /// Launch angle limits (degrees)
    pub const ANGLE_MIN: i32 = 0;
    pub const ANGLE_INIT: i32 = 45;
    pub const ANGLE_MAX: i32 = 90;
    pub const ANGLE_STEP: i32 = 5;

    /// Pumpkins available per game
    pub const PUMPKINS: u32 = 10;

    /// Gamepad A-button hold delay before the first repeat (ms)
    pub const HOLD_DELAY_MS: u32 = 133;
    /// Gamepad A-button interval between repeats (ms)
    pub const HOLD_REPEAT_MS: u32 = 133;

    /// Vertical launch speed at full charge (px/ms, up is positive)
    pub const V_BASE: f32 = 0.1;
    /// Horizontal launch speed at full charge (px/ms)
    pub const U_BASE: f32 = 0.08;
    /// Downward acceleration (px/ms²)
    pub const GRAVITY: f32 = 0.0002;
    /// Quadratic horizontal drag coefficient
    pub const DRAG_COEFF: f32 = 0.01;
    /// Horizontal speed floor as a fraction of U_BASE
    pub const MIN_FRACTION: f32 = 0.1;

    /// Frames reserved for the throwing arm wind-up before the pumpkin leaves the basket
    pub const WINDUP_FRAMES: u32 = 2;
    /// Hard stop for a toss that never reaches the ground (ms)
    pub const TOSS_TIMEOUT_MS: u32 = 3000;

    /// Pumpkin position when it leaves the basket (px, relative to catapult)
    pub const BASKET_X: f32 = 8.0;
    pub const BASKET_Y: f32 = -4.0;
    /// Ground height in the splat zone (px, relative to catapult, y grows down)
    pub const GROUND_LEVEL: f32 = 32.0;
}

/// Milliseconds elapsed between two hardware tick readings.
///
/// The counter wraps at 2^29, so the difference is masked. Correct as long
/// as the real interval is shorter than half the counter range.
#[inline]
pub fn ticks_diff(prev: u32, now: u32) -> u32 {
    now.wrapping_sub(prev) & consts::TICK_MASK
}
