//! Vibration (knock) detector.
//!
//! The sensor is a pulled-up switch that pulses LOW when the lamp is
//! knocked. A periodic sampler feeds levels into [`VibrationDetector::sample`];
//! the first falling edge while armed disarms the detector and drops a token
//! into a single-slot mailbox. [`VibrationDetector::serve`] drains the
//! mailbox, reports the knock, waits out the cool-down and re-arms.
//!
//! ```text
//!  sampler (5 ms)          mailbox (1 slot)         service thread
//!  falling edge ──disarm──▶ Signal::signal ──────▶ wait → on_knock()
//!                                                   sleep(cool-down) → rearm
//! ```

use core::sync::atomic::{AtomicBool, Ordering};
use core::time::Duration;

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;
use embedded_hal::digital::{Error as _, InputPin};
use log::{debug, warn};

pub struct VibrationDetector {
    armed: AtomicBool,
    /// Last sampled level; idle is HIGH.
    last_high: AtomicBool,
    mailbox: Signal<CriticalSectionRawMutex, ()>,
}

impl VibrationDetector {
    pub const fn new() -> Self {
        Self {
            armed: AtomicBool::new(true),
            last_high: AtomicBool::new(true),
            mailbox: Signal::new(),
        }
    }

    /// Feed one level sample. Returns `true` if a knock was posted.
    pub fn sample(&self, high: bool) -> bool {
        let was_high = self.last_high.swap(high, Ordering::AcqRel);
        if !(was_high && !high) {
            return false;
        }
        if self
            .armed
            .compare_exchange(true, false, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return false;
        }
        // Overwrites any unread token: at most one knock is ever pending.
        self.mailbox.signal(());
        true
    }

    /// Read `pin` and [`sample`](Self::sample) it.
    pub fn sample_pin<P: InputPin>(&self, pin: &mut P) -> bool {
        match pin.is_high() {
            Ok(high) => self.sample(high),
            Err(e) => {
                warn!("vibration: pin read failed: {:?}", e.kind());
                false
            }
        }
    }

    pub fn is_armed(&self) -> bool {
        self.armed.load(Ordering::Acquire)
    }

    pub fn rearm(&self) {
        self.armed.store(true, Ordering::Release);
    }

    /// Block until a knock token is available and consume it.
    pub fn wait_knock(&self) {
        futures_lite::future::block_on(self.mailbox.wait());
    }

    /// Service one knock: wait, report, cool down, re-arm.
    pub fn serve_once(&self, cooldown: Duration, on_knock: impl FnOnce()) {
        self.wait_knock();
        debug!("vibration: knock");
        on_knock();
        std::thread::sleep(cooldown);
        self.rearm();
    }

    /// Service loop for the dedicated vibration thread.
    pub fn serve(&self, cooldown: Duration, on_knock: impl Fn()) -> ! {
        loop {
            self.serve_once(cooldown, &on_knock);
        }
    }
}

impl Default for VibrationDetector {
    fn default() -> Self {
        Self::new()
    }
}
