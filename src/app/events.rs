//! Outbound application events.
//!
//! The [`LampService`](super::service::LampService) emits these through the
//! [`EventSink`](super::ports::EventSink) port.  Adapters on the other
//! side decide what to do with them.

use crate::lamp::{Hsv, LampMode};

use super::persistence::PersistedState;
use super::ports::{LedError, StorageError};

/// Structured events emitted by the application core.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LampEvent {
    /// The service has started (carries the loaded state).
    Started(PersistedState),

    /// A knock cycled the effect.
    ModeChanged { from: LampMode, to: LampMode },

    /// A new random colour was drawn.
    ColorChanged(Hsv),

    /// A colour change was refused in the given mode.
    ColorRejected(LampMode),

    /// Keep-alive press; the off countdown restarted.
    KeepAlive,

    /// The save countdown expired and state was written.
    Saved(PersistedState),

    /// Writing state failed. Not retried until the next save countdown.
    SaveFailed(StorageError),

    /// The off countdown expired; both outputs went dark.
    Blanked,

    /// Activity after a blank; rendering resumed.
    Woke,

    /// A frame could not be written to the outputs and was dropped.
    FrameDropped(LedError),
}
