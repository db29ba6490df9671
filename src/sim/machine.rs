//! Game state machine
//!
//! A (phase, event) lookup decides the action for each input event. Actions
//! mutate `GameState` and mark the scene dirty; the tick engine coalesces
//! dirty frames into a single repaint.

use super::physics;
use super::state::{GameState, Phase};
use crate::input::Event;
use crate::settings::{ConfigError, Tuning};
use crate::sprites::{CatapultFrame, PumpkinFrame, Sprites};

/// Result of a pumpkin coming down in the splat zone
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Miss,
    Hit { points: u32 },
}

/// Scoring policy, consulted once per toss with the landing x (px from catapult)
pub trait HitResolver {
    fn resolve_hit(&mut self, projectile_x: f32) -> Outcome;
}

/// Default policy: nothing scores
#[derive(Debug, Clone, Copy, Default)]
pub struct NoScoring;

impl HitResolver for NoScoring {
    fn resolve_hit(&mut self, _projectile_x: f32) -> Outcome {
        Outcome::Miss
    }
}

impl<F: FnMut(f32) -> Outcome> HitResolver for F {
    fn resolve_hit(&mut self, projectile_x: f32) -> Outcome {
        self(projectile_x)
    }
}

/// What an input event does in the current phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
    Nop,
    /// Start a new game
    Play,
    Charge,
    Toss,
    Pause,
    Resume,
    AimUp,
    AimDown,
}

fn action(phase: Phase, event: Event) -> Action {
    match (phase, event) {
        (Phase::Title | Phase::Score, Event::Start) => Action::Play,

        (Phase::Ready, Event::ADown) => Action::Charge,
        (Phase::Ready, Event::AimUp) => Action::AimUp,
        (Phase::Ready, Event::AimDown) => Action::AimDown,

        (Phase::Charging, Event::AHold) => Action::Charge,
        (Phase::Charging, Event::AUp) => Action::Toss,

        (Phase::Ready | Phase::Charging | Phase::Tossing, Event::Select) => Action::Pause,
        (Phase::Paused, Event::Select | Event::Start) => Action::Resume,

        _ => Action::Nop,
    }
}

/// Session owner: game state, tuning, sprite layer and scoring policy
pub struct StateMachine<S: Sprites, R: HitResolver = NoScoring> {
    pub(super) tuning: Tuning,
    pub(super) state: GameState,
    pub(super) sprites: S,
    resolver: R,
}

impl<S: Sprites> StateMachine<S> {
    pub fn new(tuning: Tuning, sprites: S) -> Result<Self, ConfigError> {
        Self::with_resolver(tuning, sprites, NoScoring)
    }
}

impl<S: Sprites, R: HitResolver> StateMachine<S, R> {
    /// Build a session. Fails if `tuning` does not pass [`Tuning::validate`].
    pub fn with_resolver(tuning: Tuning, sprites: S, resolver: R) -> Result<Self, ConfigError> {
        tuning.validate()?;
        let state = GameState::new(&tuning);
        Ok(Self {
            tuning,
            state,
            sprites,
            resolver,
        })
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn tuning(&self) -> &Tuning {
        &self.tuning
    }

    pub fn sprites(&self) -> &S {
        &self.sprites
    }

    #[cfg(test)]
    pub(crate) fn state_mut(&mut self) -> &mut GameState {
        &mut self.state
    }

    /// Handle an event given by numeric code. Unknown codes are logged and ignored.
    pub fn handle_code(&mut self, code: u8) {
        match Event::from_code(code) {
            Some(event) => self.handle_event(event),
            None => log::warn!("Button value out of range: {code}"),
        }
    }

    /// Handle one classified input event
    pub fn handle_event(&mut self, event: Event) {
        let tuning = &self.tuning;
        let state = &mut self.state;

        match action(state.phase, event) {
            Action::Nop => return,
            Action::Play => {
                state.new_game(tuning, Phase::Ready);
                log::info!("New game: {} pumpkins", state.pumpkins);
            }
            Action::Charge => {
                state.phase = Phase::Charging;
                state.charge = state.charge.saturating_add(1).min(tuning.charge_max);
            }
            Action::Toss => {
                let projectile = physics::launch(state.charge, tuning);
                log::info!(
                    "Toss: charge {}/{}, angle {}",
                    state.charge,
                    tuning.charge_max,
                    state.aim_angle
                );
                state.projectile = Some(projectile);
                state.last_splat = None;
                state.charge = 0;
                state.timer = 0;
                state.phase = Phase::Tossing;
            }
            Action::Pause => {
                state.previous_phase = Some(state.phase);
                state.phase = Phase::Paused;
            }
            Action::Resume => {
                state.phase = state.previous_phase.take().unwrap_or(Phase::Ready);
            }
            Action::AimUp => {
                state.aim_angle = (state.aim_angle + tuning.angle_step).min(tuning.angle_max);
            }
            Action::AimDown => {
                state.aim_angle = (state.aim_angle - tuning.angle_step).max(tuning.angle_min);
            }
        }
        state.needs_repaint = true;
    }

    /// The toss is over: score it, use up the pumpkin, load the next one
    pub(super) fn resolve_toss(&mut self) {
        let state = &mut self.state;
        let landing = state
            .projectile
            .take()
            .map(|p| p.pos)
            .unwrap_or(glam::Vec2::new(self.tuning.basket_x, self.tuning.ground_level));

        let outcome = self.resolver.resolve_hit(landing.x);
        if let Outcome::Hit { points } = outcome {
            state.score = state.score.saturating_add(points);
        }
        log::info!("Splat at x={:.1}: {:?}", landing.x, outcome);

        state.pumpkins = state.pumpkins.saturating_sub(1);
        if state.pumpkins == 0 {
            state.projectile = None;
            state.charge = 0;
            state.timer = 0;
            state.phase = Phase::Score;
            log::info!("Game over: score {}", state.score);
        } else {
            state.load_pumpkin();
            state.last_splat = Some(landing);
        }
        state.needs_repaint = true;
    }

    /// One-line status summary
    pub fn summary(&self) -> String {
        let s = &self.state;
        format!(
            "{}: pumpkins: {}, angle: {}, timer: {}, charge: {}",
            s.phase.name(),
            s.pumpkins,
            s.aim_angle,
            s.timer,
            s.charge
        )
    }

    /// Push the current scene to the sprite layer
    pub(super) fn paint(&mut self) {
        let state = &self.state;
        self.sprites.set_charge_indicator(state.charge);

        match state.visible_phase() {
            Phase::Tossing => {
                let frames = state.projectile.map_or(0, |p| p.frames);
                let windup = self.tuning.windup_frames;
                let arm = if frames > windup {
                    CatapultFrame::Toss3
                } else if frames == 0 {
                    CatapultFrame::Load
                } else if frames < windup {
                    CatapultFrame::Toss1
                } else {
                    CatapultFrame::Toss2
                };
                self.sprites.set_primary_sprite(arm.index());
                match state.projectile {
                    Some(p) if frames > windup => {
                        self.sprites
                            .set_projectile_sprite(PumpkinFrame::Fly.index(), p.pos.x, p.pos.y)
                    }
                    _ => self
                        .sprites
                        .set_projectile_sprite(PumpkinFrame::Hide.index(), 0.0, 0.0),
                }
            }
            Phase::Ready | Phase::Charging => {
                self.sprites.set_primary_sprite(CatapultFrame::Load.index());
                match state.last_splat {
                    Some(pos) => self.sprites.set_projectile_sprite(
                        PumpkinFrame::Splat3.index(),
                        pos.x,
                        pos.y,
                    ),
                    None => self
                        .sprites
                        .set_projectile_sprite(PumpkinFrame::Hide.index(), 0.0, 0.0),
                }
            }
            Phase::Title | Phase::Score | Phase::Paused => {
                self.sprites.set_primary_sprite(CatapultFrame::Load.index());
                self.sprites
                    .set_projectile_sprite(PumpkinFrame::Hide.index(), 0.0, 0.0);
            }
        }

        log::debug!("{}", self.summary());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sprites::TileSprites;

    fn machine() -> StateMachine<TileSprites> {
        StateMachine::new(Tuning::default(), TileSprites::default()).unwrap()
    }

    /// Drive a fresh machine into `phase` through events only
    fn machine_in(phase: Phase) -> StateMachine<TileSprites> {
        let mut m = machine();
        match phase {
            Phase::Title => {}
            Phase::Ready => m.handle_event(Event::Start),
            Phase::Charging => {
                m.handle_event(Event::Start);
                m.handle_event(Event::ADown);
            }
            Phase::Tossing => {
                m.handle_event(Event::Start);
                m.handle_event(Event::ADown);
                m.handle_event(Event::AUp);
            }
            Phase::Paused => {
                m.handle_event(Event::Start);
                m.handle_event(Event::Select);
            }
            Phase::Score => {
                m.handle_event(Event::Start);
                m.state_mut().pumpkins = 1;
                m.handle_event(Event::ADown);
                m.handle_event(Event::AUp);
                m.resolve_toss();
            }
        }
        assert_eq!(m.state().phase, phase);
        m.state_mut().needs_repaint = false;
        m
    }

    #[test]
    fn test_title_start_begins_game() {
        let mut m = machine();
        m.handle_event(Event::Start);
        let s = m.state();
        assert_eq!(s.phase, Phase::Ready);
        assert_eq!(s.pumpkins, 10);
        assert!(s.needs_repaint);
    }

    #[test]
    fn test_charge_and_toss() {
        let mut m = machine_in(Phase::Ready);
        assert_eq!(m.state().charge, 0);

        m.handle_event(Event::ADown);
        for _ in 0..9 {
            m.handle_event(Event::AHold);
        }
        assert_eq!(m.state().phase, Phase::Charging);
        assert_eq!(m.state().charge, 10);

        m.handle_event(Event::AUp);
        let s = m.state();
        assert_eq!(s.phase, Phase::Tossing);
        assert_eq!(s.charge, 0);
        let tuning = m.tuning();
        let fraction = 10.0 / f32::from(tuning.charge_max);
        let p = s.projectile.expect("projectile launched");
        assert!((p.vel.x - tuning.u_base * fraction).abs() < 1e-6);
        assert!((p.vel.y - tuning.v_base * 0.5 * (1.0 + fraction)).abs() < 1e-6);
    }

    #[test]
    fn test_charge_clamped() {
        let mut m = machine_in(Phase::Charging);
        for _ in 0..100 {
            m.handle_event(Event::AHold);
        }
        assert_eq!(m.state().charge, m.tuning().charge_max);
    }

    #[test]
    fn test_hold_in_ready_is_noop() {
        let mut m = machine_in(Phase::Ready);
        let before = m.state().clone();
        m.handle_event(Event::AHold);
        assert_eq!(m.state(), &before);
    }

    #[test]
    fn test_pause_resume_round_trip() {
        let mut m = machine_in(Phase::Charging);
        for _ in 0..6 {
            m.handle_event(Event::AHold);
        }
        assert_eq!(m.state().charge, 7);

        m.handle_event(Event::Select);
        assert_eq!(m.state().phase, Phase::Paused);
        assert_eq!(m.state().previous_phase, Some(Phase::Charging));

        // A is ignored while paused
        m.handle_event(Event::AHold);
        m.handle_event(Event::AUp);
        assert_eq!(m.state().phase, Phase::Paused);

        m.handle_event(Event::Select);
        assert_eq!(m.state().phase, Phase::Charging);
        assert_eq!(m.state().charge, 7);
        assert_eq!(m.state().previous_phase, None);

        m.handle_event(Event::Select);
        m.handle_event(Event::Start);
        assert_eq!(m.state().phase, Phase::Charging);
        assert_eq!(m.state().charge, 7);
    }

    #[test]
    fn test_resume_without_record_goes_ready() {
        let mut m = machine_in(Phase::Paused);
        m.state_mut().previous_phase = None;
        m.handle_event(Event::Start);
        assert_eq!(m.state().phase, Phase::Ready);
    }

    #[test]
    fn test_pause_during_toss_keeps_projectile() {
        let mut m = machine_in(Phase::Tossing);
        let projectile = m.state().projectile;
        m.handle_event(Event::Select);
        assert_eq!(m.state().projectile, projectile);
        m.handle_event(Event::Select);
        assert_eq!(m.state().phase, Phase::Tossing);
        assert_eq!(m.state().projectile, projectile);
    }

    #[test]
    fn test_aim_clamped() {
        let mut m = machine_in(Phase::Ready);
        for _ in 0..30 {
            m.handle_event(Event::AimUp);
        }
        assert_eq!(m.state().aim_angle, m.tuning().angle_max);
        for _ in 0..30 {
            m.handle_event(Event::AimDown);
        }
        assert_eq!(m.state().aim_angle, m.tuning().angle_min);
    }

    #[test]
    fn test_noop_cells_change_nothing() {
        for phase in Phase::ALL {
            for event in Event::ALL {
                if action(phase, event) != Action::Nop {
                    continue;
                }
                let mut m = machine_in(phase);
                let before = m.state().clone();
                m.handle_event(event);
                assert_eq!(m.state(), &before, "{phase:?} + {event:?} mutated state");
            }
        }
    }

    #[test]
    fn test_transition_table() {
        use Phase::*;
        let cases = [
            (Title, Event::Start, Ready),
            (Ready, Event::ADown, Charging),
            (Ready, Event::Select, Paused),
            (Charging, Event::AHold, Charging),
            (Charging, Event::AUp, Tossing),
            (Charging, Event::Select, Paused),
            (Tossing, Event::Select, Paused),
            (Paused, Event::Select, Ready),
            (Paused, Event::Start, Ready),
            (Score, Event::Start, Ready),
        ];
        for (from, event, to) in cases {
            let mut m = machine_in(from);
            m.handle_event(event);
            assert_eq!(m.state().phase, to, "{from:?} + {event:?}");
            assert!(m.state().needs_repaint);
        }
    }

    #[test]
    fn test_out_of_range_code_ignored() {
        let mut m = machine_in(Phase::Ready);
        let before = m.state().clone();
        m.handle_code(42);
        assert_eq!(m.state(), &before);
        m.handle_code(Event::ADown.code());
        assert_eq!(m.state().phase, Phase::Charging);
    }

    #[test]
    fn test_supply_exhaustion_ends_game() {
        let mut m = machine_in(Phase::Ready);
        m.state_mut().pumpkins = 2;
        m.handle_event(Event::ADown);
        m.handle_event(Event::AUp);
        m.resolve_toss();
        assert_eq!(m.state().phase, Phase::Ready);
        assert_eq!(m.state().pumpkins, 1);
        assert!(m.state().last_splat.is_some());

        m.handle_event(Event::ADown);
        m.handle_event(Event::AUp);
        m.resolve_toss();
        assert_eq!(m.state().phase, Phase::Score);
        assert_eq!(m.state().pumpkins, 0);

        m.handle_event(Event::Start);
        assert_eq!(m.state().phase, Phase::Ready);
        assert_eq!(m.state().pumpkins, 10);
    }

    #[test]
    fn test_resolver_scores_hits() {
        let mut landed_at = Vec::new();
        let mut m = StateMachine::with_resolver(
            Tuning::default(),
            TileSprites::default(),
            |x: f32| {
                landed_at.push(x);
                Outcome::Hit { points: 3 }
            },
        )
        .unwrap();
        m.handle_event(Event::Start);
        m.handle_event(Event::ADown);
        m.handle_event(Event::AUp);
        m.resolve_toss();
        assert_eq!(m.state().score, 3);
        drop(m);
        assert_eq!(landed_at.len(), 1);
    }

    #[test]
    fn test_score_accumulates_over_tosses() {
        // Hit, miss, hit, miss, ...
        let mut tosses = 0u32;
        let resolver = |_x: f32| {
            tosses += 1;
            if tosses % 2 == 1 {
                Outcome::Hit { points: tosses }
            } else {
                Outcome::Miss
            }
        };
        let mut m =
            StateMachine::with_resolver(Tuning::default(), TileSprites::default(), resolver)
                .unwrap();
        m.handle_event(Event::Start);

        let mut expected = Vec::new();
        for _ in 0..5 {
            m.handle_event(Event::ADown);
            m.handle_event(Event::AUp);
            m.resolve_toss();
            expected.push(m.state().score);
        }
        // Points 1, 3, 5 on the odd tosses; misses leave the score alone
        assert_eq!(expected, vec![1, 1, 4, 4, 9]);
        assert_eq!(m.state().pumpkins, 5);
        assert_eq!(m.state().phase, Phase::Ready);
    }

    #[test]
    fn test_no_scoring_never_adds() {
        let mut m = machine_in(Phase::Ready);
        for _ in 0..3 {
            m.handle_event(Event::ADown);
            m.handle_event(Event::AUp);
            m.resolve_toss();
        }
        assert_eq!(m.state().score, 0);
        assert_eq!(m.state().pumpkins, 7);
    }

    #[test]
    fn test_invalid_tuning_rejected() {
        let zero_frame = Tuning {
            frame_ms: 0,
            ..Default::default()
        };
        let err = StateMachine::new(zero_frame, TileSprites::default()).err();
        assert!(matches!(err, Some(ConfigError::Invalid(_))));

        let oversized_charge = Tuning {
            charge_max: 30,
            ..Default::default()
        };
        let err = StateMachine::new(oversized_charge, TileSprites::default()).err();
        assert!(matches!(err, Some(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_paint_shows_charge_bar() {
        let mut m = machine_in(Phase::Charging);
        for _ in 0..19 {
            m.handle_event(Event::AHold);
        }
        m.paint();
        assert_eq!(m.sprites().charge_bar, [1, 6, 6, 6, 6, 6, 7]);
        assert_eq!(m.sprites().pumpkin, 0);
    }

    #[test]
    fn test_summary() {
        let m = machine_in(Phase::Ready);
        assert_eq!(m.summary(), "Ready: pumpkins: 10, angle: 45, timer: 0, charge: 0");
    }
}
