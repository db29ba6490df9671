//! Game state and toss projectile
//!
//! Everything the state machine owns for one session lives here.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::settings::Tuning;

/// Current phase of play
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Phase {
    /// Start screen
    Title,
    /// Pumpkin loaded, waiting for A
    Ready,
    /// A held, charge building
    Charging,
    /// Arm wind-up and pumpkin flight
    Tossing,
    /// Frozen; the interrupted phase is in `GameState::previous_phase`
    Paused,
    /// Supply exhausted, end screen
    Score,
}

impl Phase {
    pub const ALL: [Phase; 6] = [
        Phase::Title,
        Phase::Ready,
        Phase::Charging,
        Phase::Tossing,
        Phase::Paused,
        Phase::Score,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Phase::Title => "Title",
            Phase::Ready => "Ready",
            Phase::Charging => "Charge",
            Phase::Tossing => "Toss",
            Phase::Paused => "Pause",
            Phase::Score => "Score",
        }
    }
}

/// A pumpkin in flight.
///
/// Coordinates are px relative to the catapult with y growing downward.
/// `vel.x` is horizontal speed, `vel.y` vertical speed with up positive (px/ms).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Projectile {
    pub pos: Vec2,
    pub vel: Vec2,
    /// Frame boundaries crossed since launch (wind-up included)
    pub frames: u32,
}

/// Complete session state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameState {
    pub phase: Phase,
    /// Phase to restore on resume (set only while paused)
    pub previous_phase: Option<Phase>,
    /// Launch power, `0..=charge_max`
    pub charge: u8,
    /// ms since launch while tossing, 0 otherwise. Never above `MAX_TIMER`.
    pub timer: u32,
    /// ms accrued toward the next frame boundary, always below `frame_ms`
    pub frame_accumulator: u32,
    /// Launch angle (degrees)
    pub aim_angle: i32,
    /// Pumpkins left, including the loaded one
    pub pumpkins: u32,
    pub score: u32,
    /// Present only while tossing
    pub projectile: Option<Projectile>,
    /// Where the last pumpkin came down (shown until the next launch)
    pub last_splat: Option<Vec2>,
    pub needs_repaint: bool,
}

impl GameState {
    /// Boot state: title screen with a full supply
    pub fn new(tuning: &Tuning) -> Self {
        let mut state = Self {
            phase: Phase::Title,
            previous_phase: None,
            charge: 0,
            timer: 0,
            frame_accumulator: 0,
            aim_angle: tuning.angle_init,
            pumpkins: tuning.pumpkins,
            score: 0,
            projectile: None,
            last_splat: None,
            needs_repaint: true,
        };
        state.new_game(tuning, Phase::Title);
        state
    }

    /// Reset the session and enter `phase`
    pub fn new_game(&mut self, tuning: &Tuning, phase: Phase) {
        self.pumpkins = tuning.pumpkins;
        self.score = 0;
        self.aim_angle = tuning.angle_init;
        self.previous_phase = None;
        self.last_splat = None;
        self.load_pumpkin();
        self.phase = phase;
    }

    /// Put the next pumpkin in the basket
    pub fn load_pumpkin(&mut self) {
        self.timer = 0;
        self.charge = 0;
        self.projectile = None;
        self.phase = Phase::Ready;
    }

    /// Phase whose sprites are on screen (the interrupted one while paused)
    pub fn visible_phase(&self) -> Phase {
        match self.phase {
            Phase::Paused => self.previous_phase.unwrap_or(Phase::Ready),
            phase => phase,
        }
    }
}
