//! Both LED outputs behind one owner, plus the blanked flag.
//!
//! The service keeps a `Display` inside a single mutex so that a frame write
//! and an off-timer blank can never interleave. The same mutex guards the
//! last-activity stamp, so an expiry that lands after an intent has already
//! woken the display sees the fresh activity and leaves it lit.

use std::time::{Duration, Instant};

use log::{debug, info};
use smart_leds::RGB8;

use crate::lamp::render::{Frame, Target};

use super::ports::{LedError, LedStrip, TopLed};

pub struct Display<T, S> {
    top: T,
    strip: S,
    blanked: bool,
    last_activity: Option<Instant>,
}

/// Tolerance for an expiry landing marginally early against `Instant`.
const EXPIRY_SLACK: Duration = Duration::from_millis(5);

impl<T: TopLed, S: LedStrip> Display<T, S> {
    pub fn new(top: T, strip: S) -> Self {
        Self {
            top,
            strip,
            blanked: false,
            last_activity: None,
        }
    }

    pub fn is_blanked(&self) -> bool {
        self.blanked
    }

    /// Write one frame to both outputs.
    pub fn show(&mut self, frame: &Frame) -> Result<(), LedError> {
        match frame {
            Frame::Fill(color) => {
                self.top.set_rgb(*color)?;
                for i in 0..self.strip.len() {
                    self.strip.set_pixel(i, *color)?;
                }
                self.strip.refresh()
            }
            Frame::Sweep(pixels) => {
                self.top.set_rgb(pixels.first().copied().unwrap_or_default())?;
                for (i, px) in pixels.iter().enumerate().take(self.strip.len()) {
                    self.strip.set_pixel(i, *px)?;
                }
                self.strip.refresh()
            }
            Frame::Single { target, color } => {
                self.clear()?;
                match target {
                    Some(Target::Top) => self.top.set_rgb(*color),
                    Some(Target::Strip(i)) => {
                        self.strip.set_pixel(*i, *color)?;
                        self.strip.refresh()
                    }
                    None => Ok(()),
                }
            }
        }
    }

    /// Turn both outputs off without changing the blanked flag.
    pub fn clear(&mut self) -> Result<(), LedError> {
        self.top.clear()?;
        for i in 0..self.strip.len() {
            self.strip.set_pixel(i, RGB8::default())?;
        }
        self.strip.clear()
    }

    /// Clear both outputs and stop accepting frames until [`wake`](Self::wake).
    pub fn blank(&mut self) -> Result<(), LedError> {
        self.blanked = true;
        info!("display: blanked");
        self.clear()
    }

    /// Blank only if nothing has touched the display for `idle`.
    ///
    /// Returns `true` if the outputs were blanked.
    pub fn blank_if_idle(&mut self, idle: Duration) -> Result<bool, LedError> {
        if let Some(at) = self.last_activity {
            if at.elapsed() + EXPIRY_SLACK < idle {
                debug!("display: stale off expiry ignored");
                return Ok(false);
            }
        }
        self.blank().map(|()| true)
    }

    /// Record activity without changing the blanked flag.
    pub fn touch(&mut self) {
        self.last_activity = Some(Instant::now());
    }

    /// Record activity and resume rendering. Returns `true` if the display
    /// was blanked.
    pub fn wake(&mut self) -> bool {
        self.touch();
        core::mem::replace(&mut self.blanked, false)
    }

    pub fn top(&self) -> &T {
        &self.top
    }

    pub fn strip(&self) -> &S {
        &self.strip
    }
}
