//! WS2812 addressable strip driver.
//!
//! Keeps a pixel buffer; [`LedStrip::refresh`] transmits it over RMT and
//! [`LedStrip::clear`] transmits all-off without touching the buffer.
//!
//! On host the last transmitted frame is kept in [`Ws2812Strip::shown`].

use log::warn;
use smart_leds::RGB8;

use crate::app::ports::{LedError, LedStrip};

#[cfg(target_os = "espidf")]
use super::hw_init::HwInitError;
#[cfg(target_os = "espidf")]
use esp_idf_hal::{gpio::OutputPin, peripheral::Peripheral, rmt::RmtChannel};
#[cfg(target_os = "espidf")]
use smart_leds::SmartLedsWrite;
#[cfg(target_os = "espidf")]
use ws2812_esp32_rmt_driver::Ws2812Esp32Rmt;

pub struct Ws2812Strip {
    pixels: Vec<RGB8>,
    #[cfg(target_os = "espidf")]
    driver: Ws2812Esp32Rmt<'static>,
    #[cfg(not(target_os = "espidf"))]
    shown: Vec<RGB8>,
}

impl Ws2812Strip {
    #[cfg(target_os = "espidf")]
    pub fn new<C: RmtChannel, P: OutputPin>(
        channel: impl Peripheral<P = C> + 'static,
        pin: impl Peripheral<P = P> + 'static,
        len: usize,
    ) -> Result<Self, HwInitError> {
        let driver = Ws2812Esp32Rmt::new(channel, pin).map_err(|e| {
            log::error!("strip: RMT driver: {:?}", e);
            HwInitError::StripInitFailed
        })?;
        log::info!("strip: {} x WS2812 ready", len);
        Ok(Self {
            pixels: vec![RGB8::default(); len],
            driver,
        })
    }

    #[cfg(not(target_os = "espidf"))]
    pub fn new(len: usize) -> Self {
        Self {
            pixels: vec![RGB8::default(); len],
            shown: vec![RGB8::default(); len],
        }
    }

    /// Staged buffer contents.
    pub fn pixels(&self) -> &[RGB8] {
        &self.pixels
    }

    /// What the strip currently displays (host only).
    #[cfg(not(target_os = "espidf"))]
    pub fn shown(&self) -> &[RGB8] {
        &self.shown
    }

    fn transmit(&mut self, frame: &[RGB8]) -> Result<(), LedError> {
        #[cfg(target_os = "espidf")]
        {
            self.driver.write(frame.iter().copied()).map_err(|e| {
                warn!("strip: transmit failed: {:?}", e);
                LedError::Transport
            })
        }

        #[cfg(not(target_os = "espidf"))]
        {
            self.shown.clear();
            self.shown.extend_from_slice(frame);
            Ok(())
        }
    }
}

impl LedStrip for Ws2812Strip {
    fn len(&self) -> usize {
        self.pixels.len()
    }

    fn set_pixel(&mut self, index: usize, rgb: RGB8) -> Result<(), LedError> {
        match self.pixels.get_mut(index) {
            Some(px) => *px = rgb,
            None => warn!("strip: pixel {} out of range (len={})", index, self.pixels.len()),
        }
        Ok(())
    }

    fn refresh(&mut self) -> Result<(), LedError> {
        let frame = self.pixels.clone();
        self.transmit(&frame)
    }

    fn clear(&mut self) -> Result<(), LedError> {
        let dark = vec![RGB8::default(); self.pixels.len()];
        self.transmit(&dark)
    }
}
