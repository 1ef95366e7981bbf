//! Port traits: the hexagonal boundary between lamp logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ LampService (domain)
//! ```
//!
//! Driven adapters (LED outputs, timers, event sinks, storage) implement these
//! traits.  The [`LampService`](super::service::LampService) consumes them via
//! generics, so the domain core never touches hardware directly.

use core::time::Duration;

use smart_leds::RGB8;

// ───────────────────────────────────────────────────────────────
// Top LED port (domain → PWM RGB LED)
// ───────────────────────────────────────────────────────────────

/// The single RGB LED at the top of the lamp.
///
/// Colours passed in are linear; any perceptual correction belongs to the
/// implementation.
pub trait TopLed {
    fn set_rgb(&mut self, rgb: RGB8) -> Result<(), LedError>;

    /// Last colour written through [`set_rgb`](Self::set_rgb), uncorrected.
    fn rgb(&self) -> RGB8;

    fn clear(&mut self) -> Result<(), LedError> {
        self.set_rgb(RGB8::default())
    }
}

// ───────────────────────────────────────────────────────────────
// Strip port (domain → addressable strip)
// ───────────────────────────────────────────────────────────────

/// Addressable strip with a pixel buffer that is transmitted on refresh.
pub trait LedStrip {
    /// Number of pixels.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Stage one pixel; nothing is visible until [`refresh`](Self::refresh).
    fn set_pixel(&mut self, index: usize, rgb: RGB8) -> Result<(), LedError>;

    /// Transmit the buffer.
    fn refresh(&mut self) -> Result<(), LedError>;

    /// Turn every pixel off immediately.
    fn clear(&mut self) -> Result<(), LedError>;
}

// ───────────────────────────────────────────────────────────────
// Key-value store port (domain ↔ NVS)
// ───────────────────────────────────────────────────────────────

/// Typed persistent storage scoped to one namespace.
///
/// Writes are staged until [`commit`](Self::commit).
pub trait KeyValueStore {
    fn get_u8(&self, key: &str) -> Result<u8, StorageError>;
    fn get_u16(&self, key: &str) -> Result<u16, StorageError>;
    fn set_u8(&mut self, key: &str, value: u8) -> Result<(), StorageError>;
    fn set_u16(&mut self, key: &str, value: u16) -> Result<(), StorageError>;
    fn commit(&mut self) -> Result<(), StorageError>;
}

// ───────────────────────────────────────────────────────────────
// Countdown timer port (domain → timer service)
// ───────────────────────────────────────────────────────────────

/// Single-shot restartable timer whose expiry action is fixed at creation.
pub trait CountdownTimer {
    /// Start counting down from `after`, replacing any countdown in progress.
    fn arm(&self, after: Duration);
}

// ───────────────────────────────────────────────────────────────
// Event sink port (domain → logging / telemetry)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`LampEvent`](super::events::LampEvent)s
/// through this port.
pub trait EventSink {
    fn emit(&mut self, event: &super::events::LampEvent);
}

// ───────────────────────────────────────────────────────────────
// Error types
// ───────────────────────────────────────────────────────────────

/// Errors from [`TopLed`] and [`LedStrip`] operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LedError {
    /// LEDC duty write failed (ESP-IDF error code).
    Pwm(i32),
    /// Strip transmission failed.
    Transport,
}

/// Errors from [`KeyValueStore`] operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageError {
    /// Requested key does not exist.
    NotFound,
    /// Storage partition is full.
    Full,
    /// Generic I/O error (ESP-IDF error code, 0 on host).
    IoError(i32),
}

impl core::fmt::Display for LedError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Pwm(rc) => write!(f, "PWM duty write failed (rc={})", rc),
            Self::Transport => write!(f, "strip transmission failed"),
        }
    }
}

impl core::fmt::Display for StorageError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::NotFound => write!(f, "key not found"),
            Self::Full => write!(f, "storage full"),
            Self::IoError(rc) => write!(f, "I/O error (rc={})", rc),
        }
    }
}

impl std::error::Error for LedError {}
impl std::error::Error for StorageError {}
