//! Game timing and state machine core
//!
//! All gameplay logic lives here. This module is pure and single-threaded:
//! - Time only enters through `tick(elapsed_ms)`
//! - Input only enters through `handle_event`
//! - Sprites are driven through the `Sprites` trait, never owned here

pub mod machine;
pub mod physics;
pub mod state;
pub mod tick;

pub use machine::{HitResolver, NoScoring, Outcome, StateMachine};
pub use state::{GameState, Phase, Projectile};
