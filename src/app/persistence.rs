//! Persistence gateway: lamp state ↔ key-value store.
//!
//! | Key         | Type | Field       |
//! |-------------|------|-------------|
//! | `lamp-mode` | u8   | mode        |
//! | `lamp-h`    | u16  | hue         |
//! | `lamp-s`    | u8   | saturation  |
//! | `lamp-v`    | u8   | value       |
//!
//! Mode and colour are committed separately, mode first.

use log::{error, info, warn};
use rand::Rng;

use crate::lamp::{Hsv, LampMode, LampState, random_color};

use super::ports::{KeyValueStore, StorageError};

pub const KEY_MODE: &str = "lamp-mode";
pub const KEY_HUE: &str = "lamp-h";
pub const KEY_SATURATION: &str = "lamp-s";
pub const KEY_VALUE: &str = "lamp-v";

/// Subset of [`LampState`] that survives a power cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PersistedState {
    pub mode: LampMode,
    pub color: Hsv,
}

impl From<&LampState> for PersistedState {
    fn from(state: &LampState) -> Self {
        Self {
            mode: state.mode,
            color: state.color(),
        }
    }
}

/// Read the persisted state, synthesising and writing back anything missing.
///
/// - no mode → Marquee
/// - no hue → random hue
/// - no saturation / value → 100
///
/// A key that could not be read (anything but "not found") gets the same
/// default in memory only; nothing is written over it. Write-back failures
/// are logged; the synthesised state is still returned.
pub fn load(store: &mut impl KeyValueStore, rng: &mut impl Rng) -> PersistedState {
    let mode = match read(store.get_u8(KEY_MODE), KEY_MODE) {
        Stored::Value(raw) => match LampMode::try_from(raw) {
            Ok(mode) => mode,
            Err(e) => {
                error!("persistence: {}, falling back to Marquee", e);
                write_back_mode(store)
            }
        },
        Stored::Missing => write_back_mode(store),
        Stored::Unreadable => LampMode::Marquee,
    };

    let hue = read(store.get_u16(KEY_HUE), KEY_HUE);
    let saturation = read(store.get_u8(KEY_SATURATION), KEY_SATURATION);
    let value = read(store.get_u8(KEY_VALUE), KEY_VALUE);
    let missing = [hue.is_missing(), saturation.is_missing(), value.is_missing()];
    let unreadable = [
        hue.is_unreadable(),
        saturation.is_unreadable(),
        value.is_unreadable(),
    ];

    let color = Hsv::new(
        hue.value().map_or_else(|| random_color(rng).hue, |h| h % 360),
        saturation.value().unwrap_or(100).min(100),
        value.value().unwrap_or(100).min(100),
    );
    // Colour is written back as one record; any unreadable field blocks it.
    if missing.contains(&true) {
        if unreadable.contains(&true) {
            warn!("persistence: colour defaults kept in memory only");
        } else if let Err(e) = save_color(store, color) {
            warn!("persistence: default colour write-back failed: {}", e);
        }
    }

    info!(
        "persistence: loaded mode={:?} h={} s={} v={}",
        mode, color.hue, color.saturation, color.value
    );
    PersistedState { mode, color }
}

fn write_back_mode(store: &mut impl KeyValueStore) -> LampMode {
    let mode = LampMode::Marquee;
    if let Err(e) = save_mode(store, mode) {
        warn!("persistence: default mode write-back failed: {}", e);
    }
    mode
}

/// Write the mode and commit.
pub fn save_mode(store: &mut impl KeyValueStore, mode: LampMode) -> Result<(), StorageError> {
    store.set_u8(KEY_MODE, mode.as_u8())?;
    store.commit()
}

/// Write hue, saturation and value, then commit once.
pub fn save_color(store: &mut impl KeyValueStore, color: Hsv) -> Result<(), StorageError> {
    store.set_u16(KEY_HUE, color.hue)?;
    store.set_u8(KEY_SATURATION, color.saturation)?;
    store.set_u8(KEY_VALUE, color.value)?;
    store.commit()
}

/// Save mode then colour. Stops at the first failure.
pub fn save(store: &mut impl KeyValueStore, state: PersistedState) -> Result<(), StorageError> {
    save_mode(store, state.mode)?;
    save_color(store, state.color)
}

/// Outcome of reading one key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stored<T> {
    Value(T),
    /// Never written.
    Missing,
    /// Present or not, the store could not say.
    Unreadable,
}

impl<T: Copy> Stored<T> {
    fn value(self) -> Option<T> {
        match self {
            Self::Value(v) => Some(v),
            Self::Missing | Self::Unreadable => None,
        }
    }

    fn is_missing(self) -> bool {
        matches!(self, Self::Missing)
    }

    fn is_unreadable(self) -> bool {
        matches!(self, Self::Unreadable)
    }
}

fn read<T>(result: Result<T, StorageError>, key: &str) -> Stored<T> {
    match result {
        Ok(v) => Stored::Value(v),
        Err(StorageError::NotFound) => {
            info!("persistence: '{}' not stored yet", key);
            Stored::Missing
        }
        Err(e) => {
            warn!("persistence: reading '{}' failed: {}", key, e);
            Stored::Unreadable
        }
    }
}
