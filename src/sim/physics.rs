//! Toss physics
//!
//! Discrete per-frame integration of the pumpkin under gravity and a tuned
//! quadratic horizontal drag. Deterministic for a given (state, dt).

use glam::Vec2;

use super::state::Projectile;
use crate::settings::Tuning;

/// Launch a pumpkin from the basket with power `charge`
pub fn launch(charge: u8, tuning: &Tuning) -> Projectile {
    let fraction = f32::from(charge.min(tuning.charge_max)) / f32::from(tuning.charge_max);
    Projectile {
        pos: Vec2::new(tuning.basket_x, tuning.basket_y),
        vel: Vec2::new(
            tuning.u_base * fraction,
            tuning.v_base * (0.5 * (1.0 + fraction)),
        ),
        frames: 0,
    }
}

/// Horizontal speed after `dt_ms` of drag, never below the floor
#[inline]
pub fn drag(u: f32, dt_ms: f32, tuning: &Tuning) -> f32 {
    (u - tuning.drag_coeff * u * u * dt_ms).max(tuning.min_horizontal_speed())
}

/// Advance one frame of flight. Returns true once the pumpkin reaches the ground.
///
/// A landing pumpkin is snapped to ground level.
pub fn step(projectile: &mut Projectile, dt_ms: f32, tuning: &Tuning) -> bool {
    projectile.pos.x += projectile.vel.x * dt_ms;
    projectile.pos.y -= projectile.vel.y * dt_ms;
    projectile.vel.y -= tuning.gravity * dt_ms;
    projectile.vel.x = drag(projectile.vel.x, dt_ms, tuning);

    if projectile.pos.y >= tuning.ground_level {
        projectile.pos.y = tuning.ground_level;
        true
    } else {
        false
    }
}
