//! Unified error type for the lamp firmware.
//!
//! Each subsystem keeps its own small error enum next to the code that
//! raises it; this module gathers them so boot code can funnel everything
//! through one type. All variants are `Copy`.

use core::fmt;

use crate::app::ports::{LedError, StorageError};
use crate::drivers::hw_init::HwInitError;

/// Every fallible boot-time operation funnels into this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// Peripheral or timer initialisation failed.
    Init(HwInitError),
    /// The key-value store could not be opened or written.
    Storage(StorageError),
    /// An LED output rejected a write.
    Led(LedError),
    /// Configuration is invalid.
    Config(&'static str),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Init(e) => write!(f, "init: {e}"),
            Self::Storage(e) => write!(f, "storage: {e}"),
            Self::Led(e) => write!(f, "led: {e}"),
            Self::Config(msg) => write!(f, "config: {msg}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Init(e) => Some(e),
            Self::Storage(e) => Some(e),
            Self::Led(e) => Some(e),
            Self::Config(_) => None,
        }
    }
}

impl From<HwInitError> for Error {
    fn from(e: HwInitError) -> Self {
        Self::Init(e)
    }
}

impl From<StorageError> for Error {
    fn from(e: StorageError) -> Self {
        Self::Storage(e)
    }
}

impl From<LedError> for Error {
    fn from(e: LedError) -> Self {
        Self::Led(e)
    }
}

/// Firmware-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
