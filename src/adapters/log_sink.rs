//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured lamp events to the
//! ESP-IDF logger (UART / USB-CDC in production).

use log::{info, warn};

use crate::app::events::LampEvent;
use crate::app::ports::EventSink;

/// Adapter that logs every [`LampEvent`] to the serial console.
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl Default for LogEventSink {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &LampEvent) {
        match event {
            LampEvent::Started(s) => {
                info!(
                    "START | mode={:?} | h={} s={}% v={}%",
                    s.mode, s.color.hue, s.color.saturation, s.color.value
                );
            }
            LampEvent::ModeChanged { from, to } => {
                info!("MODE  | {:?} -> {:?}", from, to);
            }
            LampEvent::ColorChanged(c) => {
                info!("COLOR | h={} s={}% v={}%", c.hue, c.saturation, c.value);
            }
            LampEvent::ColorRejected(mode) => {
                warn!("COLOR | rejected in {:?}", mode);
            }
            LampEvent::KeepAlive => {
                info!("TIMER | off countdown restarted");
            }
            LampEvent::Saved(s) => {
                info!(
                    "SAVE  | mode={:?} h={} s={} v={}",
                    s.mode, s.color.hue, s.color.saturation, s.color.value
                );
            }
            LampEvent::SaveFailed(e) => {
                warn!("SAVE  | failed: {}", e);
            }
            LampEvent::Blanked => {
                info!("POWER | outputs off after inactivity");
            }
            LampEvent::Woke => {
                info!("POWER | outputs back on");
            }
            LampEvent::FrameDropped(e) => {
                warn!("FRAME | dropped: {}", e);
            }
        }
    }
}
