//! Rate-limited tick engine
//!
//! The host calls `tick` every loop pass (~60 Hz). Animation and physics only
//! advance when a full frame period has accrued; everything in between is a
//! cheap early exit.

use super::machine::{HitResolver, StateMachine};
use super::physics;
use super::state::Phase;
use crate::consts::MAX_TIMER;
use crate::sprites::Sprites;

impl<S: Sprites, R: HitResolver> StateMachine<S, R> {
    /// Advance animations and timers by `elapsed_ms`.
    ///
    /// Returns true when the scene changed and the caller should refresh the
    /// display.
    pub fn tick(&mut self, elapsed_ms: u32) -> bool {
        if self.state.phase == Phase::Paused {
            return false;
        }

        // Rate limit updates to the frame period
        let frame_ms = self.tuning.frame_ms;
        let accrued = self.state.frame_accumulator.saturating_add(elapsed_ms);
        if accrued < frame_ms {
            self.state.frame_accumulator = accrued;
            return false; // NOTE: early return
        }
        self.state.frame_accumulator = accrued % frame_ms;
        let frame_elapsed = accrued - self.state.frame_accumulator;

        if self.state.phase == Phase::Tossing {
            self.advance_toss(frame_elapsed);
        }

        if self.state.needs_repaint {
            self.paint();
            self.state.needs_repaint = false;
            true
        } else {
            false
        }
    }

    /// One frame of the toss: wind-up, flight, then splat or timeout
    fn advance_toss(&mut self, elapsed_ms: u32) {
        let tuning = &self.tuning;
        let state = &mut self.state;

        state.timer = state.timer.saturating_add(elapsed_ms).min(MAX_TIMER);
        state.needs_repaint = true;

        let landed = match state.projectile.as_mut() {
            Some(p) => {
                p.frames += 1;
                let flying = p.frames > tuning.windup_frames;
                if flying {
                    log::debug!("flying x={:.1} y={:.1} t={}", p.pos.x, p.pos.y, state.timer);
                }
                flying && physics::step(p, elapsed_ms as f32, tuning)
            }
            None => true,
        };

        if landed {
            self.resolve_toss();
        } else if state.timer > tuning.toss_timeout_ms {
            log::warn!("Toss timed out after {} ms", state.timer);
            self.resolve_toss();
        }
    }
}
