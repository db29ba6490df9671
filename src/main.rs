//! Pumpkin Toss headless demo
//!
//! Drives the host loop with a simulated clock and a scripted gamepad that
//! plays a whole game with jittery poll timing. Pass a tuning JSON path as
//! the first argument to override the defaults.

use std::cell::Cell;
use std::rc::Rc;

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use pumpkin_toss::Tuning;
use pumpkin_toss::host::{Clock, Display, Gamepad, Host, PollError};
use pumpkin_toss::input::buttons::{A, START};
use pumpkin_toss::sim::{Outcome, Phase, StateMachine};
use pumpkin_toss::sprites::TileSprites;

/// Give up after this much simulated time (ms)
const MAX_SIM_MS: u32 = 5 * 60 * 1000;
/// One pumpkin per cycle: wait, hold A, release, watch it fly
const CYCLE_MS: u32 = 4000;

/// Simulated ms counter shared by the clock and the gamepad
#[derive(Clone, Default)]
struct SimClock(Rc<Cell<u32>>);

impl Clock for SimClock {
    fn ticks_ms(&mut self) -> u32 {
        // Same width as the hardware counter
        self.0.get() & pumpkin_toss::consts::TICK_MASK
    }
}

/// Bot player: press Start, then one charged toss per cycle
struct ScriptedGamepad {
    now: Rc<Cell<u32>>,
    rng: Pcg32,
    boot_polls: u32,
    hold_ms: u32,
    cycle: u32,
}

impl ScriptedGamepad {
    fn new(now: Rc<Cell<u32>>, seed: u64) -> Self {
        let mut rng = Pcg32::seed_from_u64(seed);
        let hold_ms = rng.random_range(300..=2000);
        Self {
            now,
            rng,
            boot_polls: 3,
            hold_ms,
            cycle: 0,
        }
    }

    fn buttons_at(&mut self, t: u32) -> u16 {
        if (600..720).contains(&t) {
            return START;
        }
        let Some(t) = t.checked_sub(1000) else {
            return 0;
        };
        let cycle = t / CYCLE_MS;
        if cycle != self.cycle {
            self.cycle = cycle;
            self.hold_ms = self.rng.random_range(300..=2000);
        }
        let offset = t % CYCLE_MS;
        if (500..500 + self.hold_ms).contains(&offset) {
            A
        } else {
            0
        }
    }
}

impl Gamepad for ScriptedGamepad {
    fn connect(&mut self) -> Result<bool, PollError> {
        // USB takes a few tries to come up after boot
        self.now.set(self.now.get() + 100);
        if self.boot_polls > 0 {
            self.boot_polls -= 1;
            return Ok(false);
        }
        Ok(true)
    }

    fn read_report(&mut self, buf: &mut [u8]) -> Result<usize, PollError> {
        let latency = self.rng.random_range(4..=22);
        let t = self.now.get() + latency;
        self.now.set(t);

        if self.rng.random_bool(0.002) {
            return Err(PollError::Timeout);
        }
        if self.rng.random_bool(0.002) {
            return Ok(8);
        }
        let buttons = self.buttons_at(t);
        buf[..20].fill(0);
        buf[2..4].copy_from_slice(&buttons.to_le_bytes());
        Ok(20)
    }
}

#[derive(Default)]
struct LogDisplay {
    refreshes: u64,
}

impl Display for LogDisplay {
    fn refresh(&mut self) {
        self.refreshes += 1;
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("Pumpkin Toss (headless) starting...");

    let tuning = match std::env::args().nth(1) {
        Some(path) => match Tuning::load(&path) {
            Ok(tuning) => tuning,
            Err(e) => {
                log::error!("{e}");
                std::process::exit(1);
            }
        },
        None => Tuning::default(),
    };

    // Reward landings in the skeleton zone (demo-only policy)
    let resolver = |x: f32| {
        if (54.0..=124.0).contains(&x) {
            Outcome::Hit { points: 1 }
        } else {
            Outcome::Miss
        }
    };
    let machine = match StateMachine::with_resolver(tuning, TileSprites::default(), resolver) {
        Ok(machine) => machine,
        Err(e) => {
            log::error!("{e}");
            std::process::exit(1);
        }
    };

    let clock = SimClock::default();
    let gamepad = ScriptedGamepad::new(clock.0.clone(), 2024);
    let mut host = Host::new(machine, gamepad, clock.clone(), LogDisplay::default());

    while clock.0.get() < MAX_SIM_MS {
        host.run_pass();
        if host.machine().state().phase == Phase::Score {
            break;
        }
    }

    let state = host.machine().state();
    log::info!(
        "Finished after {} simulated ms: {} ({} refreshes, score {})",
        clock.0.get(),
        host.machine().summary(),
        host.display().refreshes,
        state.score
    );
}
