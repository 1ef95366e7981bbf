//! Top RGB LED driver.
//!
//! Three LEDC PWM channels (CH0-2) drive a discrete common-cathode RGB LED.
//! Colours are gamma-corrected on the way out; [`TopLed::rgb`] reports the
//! linear colour last requested.
//!
//! ## Dual-target design
//!
//! On ESP-IDF: drives three LEDC PWM channels via hw_init.
//! On host/test: tracks state in-memory only.

use smart_leds::RGB8;

use crate::app::ports::{LedError, TopLed};
use crate::color::gamma_correct_rgb;
use crate::drivers::hw_init;

pub struct PwmTopLed {
    current: RGB8,
    /// Duty values actually written, after gamma.
    duty: RGB8,
}

impl PwmTopLed {
    pub fn new() -> Self {
        Self {
            current: RGB8::default(),
            duty: RGB8::default(),
        }
    }

    pub fn duty(&self) -> RGB8 {
        self.duty
    }
}

impl Default for PwmTopLed {
    fn default() -> Self {
        Self::new()
    }
}

impl TopLed for PwmTopLed {
    fn set_rgb(&mut self, rgb: RGB8) -> Result<(), LedError> {
        let duty = gamma_correct_rgb(rgb);
        hw_init::ledc_set(hw_init::LEDC_CH_TOP_R, duty.r).map_err(LedError::Pwm)?;
        hw_init::ledc_set(hw_init::LEDC_CH_TOP_G, duty.g).map_err(LedError::Pwm)?;
        hw_init::ledc_set(hw_init::LEDC_CH_TOP_B, duty.b).map_err(LedError::Pwm)?;
        self.current = rgb;
        self.duty = duty;
        Ok(())
    }

    fn rgb(&self) -> RGB8 {
        self.current
    }
}
