//! Intent register: coalescing event bits with a blocking wait.
//!
//! Stimuli are produced by:
//! - the input sampler (button presses, timer-task context)
//! - the vibration service thread (knocks)
//!
//! and consumed by the coordinator thread, one intent at a time in
//! priority order.
//!
//! ```text
//! ┌─────────────┐     ┌──────────────────┐     ┌──────────────┐
//! │ Button A    │────▶│  bits: AtomicU8  │     │              │
//! │ Button B    │────▶│  one bit / kind  │────▶│ Coordinator  │
//! │ Vibration   │────▶│  + wake Signal   │     │  (consumer)  │
//! └─────────────┘     └──────────────────┘     └──────────────┘
//! ```
//!
//! Posting the same kind twice before it is consumed collapses into one.
//! Taking an intent clears only its own bit, so other pending kinds survive.
//!
//! [`SaveRequest`] is the same idea for the save countdown: the timer
//! callback rings it and the saver thread does the flash write.

use core::sync::atomic::{AtomicU8, Ordering};

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;

use crate::lamp::Intent;

pub struct IntentRegister {
    bits: AtomicU8,
    wake: Signal<CriticalSectionRawMutex, ()>,
}

impl IntentRegister {
    pub const fn new() -> Self {
        Self {
            bits: AtomicU8::new(0),
            wake: Signal::new(),
        }
    }

    /// Raise `intent`. Never blocks.
    pub fn post(&self, intent: Intent) {
        self.bits.fetch_or(intent.mask(), Ordering::AcqRel);
        self.wake.signal(());
    }

    /// Atomically clear and return the highest-priority pending intent.
    pub fn take(&self) -> Option<Intent> {
        let mut taken = None;
        let _ = self
            .bits
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |bits| {
                taken = Intent::BY_PRIORITY
                    .into_iter()
                    .find(|i| bits & i.mask() != 0);
                taken.map(|i| bits & !i.mask())
            });
        taken
    }

    /// Block until an intent is pending, then take it.
    pub fn wait(&self) -> Intent {
        loop {
            if let Some(intent) = self.take() {
                return intent;
            }
            futures_lite::future::block_on(self.wake.wait());
        }
    }

    /// Raw pending bits (diagnostics / tests).
    pub fn pending(&self) -> u8 {
        self.bits.load(Ordering::Acquire)
    }
}

impl Default for IntentRegister {
    fn default() -> Self {
        Self::new()
    }
}

/// Single-slot doorbell for deferred saves.
///
/// Requests made before the saver gets to them collapse into one.
pub struct SaveRequest {
    bell: Signal<CriticalSectionRawMutex, ()>,
}

impl SaveRequest {
    pub const fn new() -> Self {
        Self { bell: Signal::new() }
    }

    /// Ask for a save. Never blocks.
    pub fn request(&self) {
        self.bell.signal(());
    }

    pub fn is_pending(&self) -> bool {
        self.bell.signaled()
    }

    /// Block until a save is requested and consume the request.
    pub fn wait(&self) {
        futures_lite::future::block_on(self.bell.wait());
    }
}

impl Default for SaveRequest {
    fn default() -> Self {
        Self::new()
    }
}
