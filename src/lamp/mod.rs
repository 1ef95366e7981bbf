//! Lamp state machine.
//!
//! ```text
//!   ModeAdvance          ModeAdvance          ModeAdvance
//! ┌─────────┐ ───▶ ┌────────┐ ───▶ ┌───────┐ ───▶ ┌───────┐
//! │ Marquee │      │ Breath │      │ Stack │      │ Fixed │
//! └─────────┘ ◀─────────────────────────────────── └───────┘
//!                            ModeAdvance
//! ```
//!
//! [`LampState`] is the single canonical record of what the lamp shows.
//! Intents mutate it through [`LampState::apply`]; the render loop advances
//! its animation fields through [`render::next_frame`].

pub mod render;

use core::fmt;

use log::{error, info};
use rand::Rng;

// ---------------------------------------------------------------------------
// Mode identity
// ---------------------------------------------------------------------------

/// Closed set of lighting effects, in cycle order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum LampMode {
    /// Rainbow sweep across the strip.
    Marquee = 0,
    /// Stored hue, brightness ramps up and down.
    Breath = 1,
    /// One lit output at a time walking from the top LED down the strip.
    Stack = 2,
    /// Stored colour, steady.
    Fixed = 3,
}

impl LampMode {
    pub const COUNT: usize = 4;

    pub const ALL: [Self; Self::COUNT] = [Self::Marquee, Self::Breath, Self::Stack, Self::Fixed];

    /// The mode after this one; Fixed wraps to Marquee.
    pub fn next(self) -> Self {
        Self::ALL[(self as usize + 1) % Self::COUNT]
    }

    pub fn as_u8(self) -> u8 {
        self as u8
    }
}

/// A persisted byte that does not name a [`LampMode`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidMode(pub u8);

impl fmt::Display for InvalidMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid lamp mode {}", self.0)
    }
}

impl TryFrom<u8> for LampMode {
    type Error = InvalidMode;

    fn try_from(raw: u8) -> Result<Self, Self::Error> {
        Self::ALL.get(raw as usize).copied().ok_or(InvalidMode(raw))
    }
}

// ---------------------------------------------------------------------------
// Colour
// ---------------------------------------------------------------------------

/// Hue in degrees, saturation and value in percent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hsv {
    pub hue: u16,
    pub saturation: u8,
    pub value: u8,
}

impl Hsv {
    pub const fn new(hue: u16, saturation: u8, value: u8) -> Self {
        Self {
            hue,
            saturation,
            value,
        }
    }
}

/// Lowest saturation the random draw produces; keeps colours from washing out.
pub const RANDOM_MIN_SATURATION: u8 = 40;

/// Draw a fresh colour: hue in `[0, 360)`, saturation in `[40, 100]`, full value.
pub fn random_color(rng: &mut impl Rng) -> Hsv {
    Hsv {
        hue: rng.gen_range(0..360),
        saturation: rng.gen_range(RANDOM_MIN_SATURATION..=100),
        value: 100,
    }
}

// ---------------------------------------------------------------------------
// Intents
// ---------------------------------------------------------------------------

/// Coalesced user stimulus, in priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Intent {
    /// Vibration knock: cycle to the next mode.
    ModeAdvance = 0,
    /// Button A: pick a new random colour.
    ColorNext = 1,
    /// Button B: keep the lamp on.
    TimerPulse = 2,
}

impl Intent {
    pub const COUNT: usize = 3;

    /// Highest priority first.
    pub const BY_PRIORITY: [Self; Self::COUNT] = [Self::ModeAdvance, Self::ColorNext, Self::TimerPulse];

    pub const fn mask(self) -> u8 {
        1 << self as u8
    }
}

/// What an intent did to the state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    ModeChanged { from: LampMode, to: LampMode },
    ColorChanged(Hsv),
    /// Colour change refused because the current mode ignores the stored colour.
    ColorRejected(LampMode),
    KeepAlive,
}

impl Transition {
    /// Whether the persisted fields changed and the save countdown must restart.
    pub fn dirties_state(self) -> bool {
        matches!(self, Self::ModeChanged { .. } | Self::ColorChanged(_))
    }
}

// ---------------------------------------------------------------------------
// LampState
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LampState {
    pub mode: LampMode,
    pub hue: u16,
    pub saturation: u8,
    pub value: u8,
    /// Stack cursor: 0 is the top LED, `i >= 1` is strip pixel `i - 1`,
    /// anything past the strip leaves every output dark.
    pub strip_index: usize,
    /// Breath direction.
    pub rising: bool,
}

impl LampState {
    pub fn new(mode: LampMode, color: Hsv) -> Self {
        Self {
            mode,
            hue: color.hue % 360,
            saturation: color.saturation.min(100),
            value: color.value.min(100),
            strip_index: 0,
            rising: true,
        }
    }

    pub fn color(&self) -> Hsv {
        Hsv::new(self.hue, self.saturation, self.value)
    }

    /// Apply one intent. Timer side effects are left to the caller, driven by
    /// the returned [`Transition`].
    pub fn apply(&mut self, intent: Intent, strip_len: usize, rng: &mut impl Rng) -> Transition {
        match intent {
            Intent::ModeAdvance => {
                let from = self.mode;
                self.mode = from.next();
                self.strip_index = strip_len + 1;
                self.rising = true;
                info!("lamp: mode {:?} -> {:?}", from, self.mode);
                Transition::ModeChanged {
                    from,
                    to: self.mode,
                }
            }
            Intent::ColorNext => {
                if self.mode == LampMode::Marquee {
                    error!("lamp: colour is fixed by the rainbow in {:?}", self.mode);
                    return Transition::ColorRejected(self.mode);
                }
                let color = random_color(rng);
                self.hue = color.hue;
                self.saturation = color.saturation;
                self.value = color.value;
                info!(
                    "lamp: next colour h={} s={} v={}",
                    color.hue, color.saturation, color.value
                );
                Transition::ColorChanged(color)
            }
            Intent::TimerPulse => Transition::KeepAlive,
        }
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------


// ---------------------------------------------------------------------------
// Property-based tests
// ---------------------------------------------------------------------------
