//! Cooperative host loop
//!
//! One `run_pass` is one trip through the main loop: tick, poll one gamepad
//! sample, dispatch its events, tick again, refresh the display at most once.
//! The gamepad, clock and display are hardware collaborators behind traits.

use thiserror::Error;

use crate::input::{InputTracker, parse_report};
use crate::sim::{HitResolver, StateMachine};
use crate::sprites::Sprites;
use crate::ticks_diff;

/// Minimum interval between ticks while no gamepad is connected (ms)
pub const IDLE_TICK_MS: u32 = 16;

/// Report buffer size
pub const REPORT_BUF_LEN: usize = 64;

/// Gamepad I/O failures
#[derive(Debug, Error)]
pub enum PollError {
    /// No report within the read timeout
    #[error("gamepad read timed out")]
    Timeout,
    /// Device busy or briefly gone; retry
    #[error("gamepad not ready")]
    NotReady,
    /// Device lost; go back to discovery
    #[error("gamepad failed: {0}")]
    Failed(String),
}

/// USB gamepad driver
pub trait Gamepad {
    /// Look for and configure a gamepad. `Ok(false)` if none is attached.
    fn connect(&mut self) -> Result<bool, PollError>;
    /// Read one input report into `buf`, returning its length
    fn read_report(&mut self, buf: &mut [u8]) -> Result<usize, PollError>;
}

/// Free-running ms tick counter (may wrap)
pub trait Clock {
    fn ticks_ms(&mut self) -> u32;
}

/// Display with manual refresh
pub trait Display {
    fn refresh(&mut self);
}

/// Main loop state
pub struct Host<G, C, D, S: Sprites, R: HitResolver> {
    machine: StateMachine<S, R>,
    gamepad: G,
    clock: C,
    display: D,
    tracker: InputTracker,
    connected: bool,
    prev_ms: u32,
    last_sample_ms: u32,
}

impl<G, C, D, S, R> Host<G, C, D, S, R>
where
    G: Gamepad,
    C: Clock,
    D: Display,
    S: Sprites,
    R: HitResolver,
{
    pub fn new(machine: StateMachine<S, R>, gamepad: G, mut clock: C, display: D) -> Self {
        let tracker = InputTracker::from_tuning(machine.tuning());
        let now = clock.ticks_ms();
        Self {
            machine,
            gamepad,
            clock,
            display,
            tracker,
            connected: false,
            prev_ms: now,
            last_sample_ms: now,
        }
    }

    pub fn machine(&self) -> &StateMachine<S, R> {
        &self.machine
    }

    pub fn display(&self) -> &D {
        &self.display
    }

    pub fn gamepad(&self) -> &G {
        &self.gamepad
    }

    pub fn is_connected(&self) -> bool {
        self.connected
    }

    /// Run one loop pass. Returns true if the display was refreshed.
    pub fn run_pass(&mut self) -> bool {
        if !self.connected {
            return self.discover();
        }

        let now = self.clock.ticks_ms();
        let elapsed = ticks_diff(self.prev_ms, now);
        self.prev_ms = now;
        let mut refresh = self.machine.tick(elapsed);

        if let Some(buttons) = self.sample() {
            let now = self.clock.ticks_ms();
            let interval = ticks_diff(self.last_sample_ms, now);
            self.last_sample_ms = now;
            for event in self.tracker.update(buttons, interval).events() {
                self.machine.handle_event(event);
            }
        }

        // Time spent blocked in the poll
        let now = self.clock.ticks_ms();
        refresh |= self.machine.tick(ticks_diff(self.prev_ms, now));
        self.prev_ms = now;

        if refresh {
            self.display.refresh();
        }
        refresh
    }

    /// Keep animating while looking for a gamepad
    fn discover(&mut self) -> bool {
        let now = self.clock.ticks_ms();
        let elapsed = ticks_diff(self.prev_ms, now);
        let mut refresh = false;
        if elapsed >= IDLE_TICK_MS {
            self.prev_ms = now;
            refresh = self.machine.tick(elapsed);
            if refresh {
                self.display.refresh();
            }
        }

        match self.gamepad.connect() {
            Ok(true) => {
                log::info!("Gamepad connected");
                self.connected = true;
                self.tracker.reset();
                self.last_sample_ms = self.clock.ticks_ms();
            }
            Ok(false) => {}
            Err(e) => log::warn!("Gamepad discovery failed: {e}"),
        }
        refresh
    }

    /// Poll one report. `None` means no new sample this pass.
    fn sample(&mut self) -> Option<u16> {
        let mut buf = [0u8; REPORT_BUF_LEN];
        match self.gamepad.read_report(&mut buf) {
            Ok(len) => match parse_report(&buf[..len.min(REPORT_BUF_LEN)]) {
                Some(buttons) => Some(buttons),
                None => {
                    log::warn!("Short gamepad report ({len} bytes), keeping previous buttons");
                    Some(self.tracker.previous())
                }
            },
            Err(PollError::Timeout) => None,
            Err(PollError::NotReady) => {
                log::debug!("Gamepad not ready");
                None
            }
            Err(e @ PollError::Failed(_)) => {
                log::warn!("{e}; gamepad unplugged?");
                self.connected = false;
                self.tracker.reset();
                None
            }
        }
    }
}
