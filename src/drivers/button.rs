//! Sampled, debounced push-button driver with press-down detection.
//!
//! ## Hardware
//!
//! Active-low momentary switch with pull-up. The input sampler calls
//! [`ButtonDriver::tick`] every few milliseconds with the raw level; the
//! driver runs the debounce state machine and reports each press once, on
//! the way down. Releases are not reported.
//!
//! | State        | Leaves when                          | Emits       |
//! |--------------|--------------------------------------|-------------|
//! | Released     | level goes low                       | -           |
//! | DebounceWait | low for `DEBOUNCE_MS` / bounced high | `PressDown` |
//! | Held         | level goes high                      | -           |

pub const DEBOUNCE_MS: u32 = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonEvent {
    PressDown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PressState {
    Released,
    DebounceWait { since_ms: u32 },
    Held,
}

pub struct ButtonDriver {
    gpio: i32,
    state: PressState,
}

impl ButtonDriver {
    pub fn new(gpio: i32) -> Self {
        Self {
            gpio,
            state: PressState::Released,
        }
    }

    /// Feed one sample. `pressed` is the electrical state (low = pressed).
    /// `now_ms` is monotonic milliseconds; wrap-around is tolerated.
    pub fn tick(&mut self, now_ms: u32, pressed: bool) -> Option<ButtonEvent> {
        match (self.state, pressed) {
            (PressState::Released, true) => {
                self.state = PressState::DebounceWait { since_ms: now_ms };
                None
            }
            (PressState::DebounceWait { since_ms }, true) => {
                if now_ms.wrapping_sub(since_ms) >= DEBOUNCE_MS {
                    self.state = PressState::Held;
                    Some(ButtonEvent::PressDown)
                } else {
                    None
                }
            }
            (PressState::DebounceWait { .. } | PressState::Held, false) => {
                self.state = PressState::Released;
                None
            }
            (PressState::Released, false) | (PressState::Held, true) => None,
        }
    }

    /// Sample the pin and [`tick`](Self::tick).
    pub fn poll(&mut self, now_ms: u32) -> Option<ButtonEvent> {
        let pressed = !crate::drivers::hw_init::gpio_read(self.gpio);
        self.tick(now_ms, pressed)
    }
}
