//! Per-mode frame planning.
//!
//! [`next_frame`] is pure: it reads the lamp state, advances the animation
//! fields for the current mode, and describes what both outputs should show
//! plus how long to hold it. Writing to hardware happens in the app layer.

use core::time::Duration;

use heapless::Vec;
use smart_leds::RGB8;

use super::{LampMode, LampState};
use crate::color::hsv_to_rgb;
use crate::config::LampConfig;

/// Upper bound on strip length; sizes the rainbow frame buffer.
pub const MAX_STRIP_LEN: usize = 64;

pub type Pixels = Vec<RGB8, MAX_STRIP_LEN>;

/// Which single output a [`Frame::Single`] lights.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    Top,
    Strip(usize),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    /// Same colour on the top LED and every strip pixel.
    Fill(RGB8),
    /// Per-pixel strip colours; the top LED mirrors pixel 0.
    Sweep(Pixels),
    /// Everything dark except `target`, if any.
    Single { target: Option<Target>, color: RGB8 },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderStep {
    pub frame: Frame,
    pub hold: Duration,
}

/// Plan the next frame for `state.mode` and advance its animation.
pub fn next_frame(state: &mut LampState, config: &LampConfig) -> RenderStep {
    let strip_len = config.strip_len.min(MAX_STRIP_LEN);
    let (frame, hold_ms) = match state.mode {
        LampMode::Fixed => (
            Frame::Fill(hsv_to_rgb(state.hue, state.saturation, state.value)),
            config.fixed_frame_ms,
        ),
        LampMode::Breath => {
            let frame = Frame::Fill(hsv_to_rgb(state.hue, 100, state.value));
            step_breath(state, config);
            (frame, config.breath_frame_ms)
        }
        LampMode::Marquee => {
            let pixels = (0..strip_len)
                .map(|i| hsv_to_rgb(((state.hue as usize + i) % 360) as u16, 100, 100))
                .collect();
            state.hue = (state.hue + 1) % 360;
            (Frame::Sweep(pixels), config.marquee_frame_ms)
        }
        LampMode::Stack => {
            let target = match state.strip_index {
                0 => Some(Target::Top),
                i if i <= strip_len => Some(Target::Strip(i - 1)),
                _ => None,
            };
            let color = hsv_to_rgb(state.hue, state.saturation, state.value);
            state.strip_index = if state.strip_index >= strip_len {
                0
            } else {
                state.strip_index + 1
            };
            (Frame::Single { target, color }, config.stack_frame_ms)
        }
    };

    RenderStep {
        frame,
        hold: Duration::from_millis(u64::from(hold_ms)),
    }
}

fn step_breath(state: &mut LampState, config: &LampConfig) {
    if state.rising {
        if state.value >= config.breath_ceiling {
            state.rising = false;
        }
        state.value = (state.value + 1).min(100);
    } else {
        if state.value < config.breath_floor {
            state.rising = true;
        }
        state.value = state.value.saturating_sub(1);
    }
}
