//! Gamepad input classification
//!
//! Turns the raw 16-bit button bitfield from each poll into state machine
//! events. Two independent checks run on every poll:
//! - edge: press/release of A, exact-match Select/Start/Up/Down
//! - hold/repeat: synthetic `AHold` events while A stays down
//!
//! Repeat timers subtract their period instead of resetting, so the long-run
//! cadence stays stable when poll intervals jitter.

use serde::{Deserialize, Serialize};

use crate::settings::Tuning;

/// Gamepad button bitmask constants (SNES-style names, XInput report layout)
pub mod buttons {
    /// dpad: Up
    pub const UP: u16 = 0x0001;
    /// dpad: Down
    pub const DOWN: u16 = 0x0002;
    /// dpad: Left
    pub const LEFT: u16 = 0x0004;
    /// dpad: Right
    pub const RIGHT: u16 = 0x0008;
    pub const START: u16 = 0x0010;
    pub const SELECT: u16 = 0x0020;
    /// Left shoulder
    pub const L: u16 = 0x0100;
    /// Right shoulder
    pub const R: u16 = 0x0200;
    /// Cluster bottom (Nintendo B, Xbox A)
    pub const B: u16 = 0x1000;
    /// Cluster right (Nintendo A, Xbox B). The action button.
    pub const A: u16 = 0x2000;
    /// Cluster left (Nintendo Y, Xbox X)
    pub const Y: u16 = 0x4000;
    /// Cluster top (Nintendo X, Xbox Y)
    pub const X: u16 = 0x8000;
}

/// Shortest report that carries a full button/stick payload
pub const REPORT_MIN_LEN: usize = 14;

/// Input events understood by the state machine.
///
/// The discriminants are the event codes accepted by
/// [`StateMachine::handle_code`](crate::sim::StateMachine::handle_code).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Event {
    /// A pressed
    ADown = 0,
    /// A still held after the hold delay / repeat interval
    AHold = 1,
    /// A released
    AUp = 2,
    Select = 3,
    Start = 4,
    /// dpad Up pressed
    AimUp = 5,
    /// dpad Down pressed
    AimDown = 6,
}

impl Event {
    pub const ALL: [Event; 7] = [
        Event::ADown,
        Event::AHold,
        Event::AUp,
        Event::Select,
        Event::Start,
        Event::AimUp,
        Event::AimDown,
    ];

    /// Numeric code of this event
    pub fn code(self) -> u8 {
        self as u8
    }

    /// Decode an event code; `None` if out of range
    pub fn from_code(code: u8) -> Option<Self> {
        Self::ALL.get(usize::from(code)).copied()
    }
}

/// Which check a classification call performs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Check {
    /// Compare against the previous bitfield for press/release edges
    Edge,
    /// Caller decided a hold/repeat interval elapsed
    Repeat,
}

/// Classify one poll into at most one event.
///
/// Edge priority: A press, A release, Select, Start, Up, Down. Select, Start
/// and the dpad only count when they are the only button down.
pub fn classify(previous: u16, current: u16, check: Check) -> Option<Event> {
    use buttons::*;

    if check == Check::Repeat {
        return (current & A != 0).then_some(Event::AHold);
    }

    let diff = previous ^ current;
    if diff & A != 0 {
        return Some(if current & A != 0 {
            Event::ADown
        } else {
            Event::AUp
        });
    }
    let exact = |mask: u16| current == mask && diff & mask != 0;
    if exact(SELECT) {
        Some(Event::Select)
    } else if exact(START) {
        Some(Event::Start)
    } else if exact(UP) {
        Some(Event::AimUp)
    } else if exact(DOWN) {
        Some(Event::AimDown)
    } else {
        None
    }
}

/// Extract the button bitfield from a raw gamepad report.
///
/// Report layout: bytes 0-1 prefix, 2-3 buttons (u16 LE), then triggers and
/// sticks. Short reports return `None`.
pub fn parse_report(report: &[u8]) -> Option<u16> {
    if report.len() < REPORT_MIN_LEN {
        return None;
    }
    let bytes = report.get(2..4)?;
    Some(u16::from_le_bytes([bytes[0], bytes[1]]))
}

/// Events produced by one poll. Dispatch edge first, then repeat.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Classified {
    pub edge: Option<Event>,
    pub repeat: Option<Event>,
}

impl Classified {
    /// Events in dispatch order
    pub fn events(self) -> impl Iterator<Item = Event> {
        self.edge.into_iter().chain(self.repeat)
    }
}

/// Previous bitfield plus the A-button hold/repeat timers
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputTracker {
    previous: u16,
    hold_ms: u32,
    repeat_ms: u32,
    delay: u32,
    interval: u32,
}

impl InputTracker {
    pub fn new(delay_ms: u32, repeat_ms: u32) -> Self {
        Self {
            previous: 0,
            hold_ms: 0,
            repeat_ms: 0,
            delay: delay_ms,
            interval: repeat_ms,
        }
    }

    pub fn from_tuning(tuning: &Tuning) -> Self {
        Self::new(tuning.hold_delay_ms, tuning.hold_repeat_ms)
    }

    /// Last observed button bitfield
    pub fn previous(&self) -> u16 {
        self.previous
    }

    /// How long A has been held (ms)
    pub fn hold_timer(&self) -> u32 {
        self.hold_ms
    }

    pub fn repeat_timer(&self) -> u32 {
        self.repeat_ms
    }

    /// Forget everything (gamepad reconnected)
    pub fn reset(&mut self) {
        self.previous = 0;
        self.hold_ms = 0;
        self.repeat_ms = 0;
    }

    /// Feed one poll sample taken `interval_ms` after the previous one
    pub fn update(&mut self, current: u16, interval_ms: u32) -> Classified {
        if current & buttons::A != 0 {
            self.hold_ms = self.hold_ms.saturating_add(interval_ms);
            self.repeat_ms = self.repeat_ms.saturating_add(interval_ms);
        } else {
            self.hold_ms = 0;
            self.repeat_ms = 0;
        }

        let edge = if current != self.previous {
            classify(self.previous, current, Check::Edge)
        } else {
            None
        };

        let mut repeat = None;
        if self.hold_ms >= self.delay {
            if self.hold_ms == self.repeat_ms {
                // First repeat after the initial delay
                self.repeat_ms -= self.delay;
                repeat = classify(self.previous, current, Check::Repeat);
            } else if self.repeat_ms >= self.interval {
                self.repeat_ms -= self.interval;
                repeat = classify(self.previous, current, Check::Repeat);
            }
        }

        self.previous = current;
        Classified { edge, repeat }
    }
}
