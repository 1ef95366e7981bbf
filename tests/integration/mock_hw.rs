//! Mock hardware adapters for integration tests.
//!
//! Every mock records what it was asked to do so tests can assert on the
//! full history without touching real LEDC/RMT/NVS. Store and sink keep
//! their state behind an `Arc` so a test can hold a handle after moving
//! the mock into the service.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use nightlamp::app::events::LampEvent;
use nightlamp::app::ports::{
    CountdownTimer, EventSink, KeyValueStore, LedError, LedStrip, StorageError, TopLed,
};
use smart_leds::RGB8;

fn lock<V>(m: &Mutex<V>) -> std::sync::MutexGuard<'_, V> {
    m.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
}

// ── MockTopLed ────────────────────────────────────────────────

#[derive(Default)]
pub struct MockTopLed {
    pub current: RGB8,
    pub writes: Vec<RGB8>,
    pub fail: bool,
}

impl TopLed for MockTopLed {
    fn set_rgb(&mut self, rgb: RGB8) -> Result<(), LedError> {
        if self.fail {
            return Err(LedError::Pwm(-1));
        }
        self.current = rgb;
        self.writes.push(rgb);
        Ok(())
    }

    fn rgb(&self) -> RGB8 {
        self.current
    }
}

// ── MockStrip ─────────────────────────────────────────────────

pub struct MockStrip {
    pub buffer: Vec<RGB8>,
    /// Last frame transmitted.
    pub shown: Vec<RGB8>,
    pub refreshes: u32,
}

impl MockStrip {
    pub fn new(len: usize) -> Self {
        Self {
            buffer: vec![RGB8::default(); len],
            shown: vec![RGB8::default(); len],
            refreshes: 0,
        }
    }

    pub fn is_dark(&self) -> bool {
        self.shown.iter().all(|p| *p == RGB8::default())
    }
}

impl LedStrip for MockStrip {
    fn len(&self) -> usize {
        self.buffer.len()
    }

    fn set_pixel(&mut self, index: usize, rgb: RGB8) -> Result<(), LedError> {
        if let Some(px) = self.buffer.get_mut(index) {
            *px = rgb;
        }
        Ok(())
    }

    fn refresh(&mut self) -> Result<(), LedError> {
        self.shown.clone_from(&self.buffer);
        self.refreshes += 1;
        Ok(())
    }

    fn clear(&mut self) -> Result<(), LedError> {
        self.shown = vec![RGB8::default(); self.buffer.len()];
        Ok(())
    }
}

// ── MockStore ─────────────────────────────────────────────────

#[derive(Default)]
pub struct StoreState {
    pub committed: HashMap<String, u16>,
    pub staged: HashMap<String, u16>,
    pub commits: u32,
    /// When set, every write fails with this error.
    pub fail_writes: Option<StorageError>,
    /// One-shot read failures, consumed by the next read of the key.
    pub fail_reads: HashMap<String, StorageError>,
}

/// In-memory key-value store; clones share contents.
#[derive(Clone, Default)]
pub struct MockStore(pub Arc<Mutex<StoreState>>);

#[allow(dead_code)]
impl MockStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store with values already committed.
    pub fn with(entries: &[(&str, u16)]) -> Self {
        let store = Self::new();
        {
            let mut s = lock(&store.0);
            for (k, v) in entries {
                s.committed.insert((*k).to_string(), *v);
            }
        }
        store
    }

    pub fn committed(&self, key: &str) -> Option<u16> {
        lock(&self.0).committed.get(key).copied()
    }

    pub fn commits(&self) -> u32 {
        lock(&self.0).commits
    }

    pub fn fail_writes(&self, err: Option<StorageError>) {
        lock(&self.0).fail_writes = err;
    }

    /// Make the next read of `key` fail with `err`.
    pub fn fail_next_read(&self, key: &str, err: StorageError) {
        lock(&self.0).fail_reads.insert(key.to_string(), err);
    }

    fn get(&self, key: &str) -> Result<u16, StorageError> {
        let mut s = lock(&self.0);
        if let Some(err) = s.fail_reads.remove(key) {
            return Err(err);
        }
        s.staged
            .get(key)
            .or_else(|| s.committed.get(key))
            .copied()
            .ok_or(StorageError::NotFound)
    }

    fn set(&self, key: &str, value: u16) -> Result<(), StorageError> {
        let mut s = lock(&self.0);
        if let Some(err) = s.fail_writes {
            return Err(err);
        }
        s.staged.insert(key.to_string(), value);
        Ok(())
    }
}

impl KeyValueStore for MockStore {
    fn get_u8(&self, key: &str) -> Result<u8, StorageError> {
        self.get(key).map(|v| v as u8)
    }

    fn get_u16(&self, key: &str) -> Result<u16, StorageError> {
        self.get(key)
    }

    fn set_u8(&mut self, key: &str, value: u8) -> Result<(), StorageError> {
        self.set(key, u16::from(value))
    }

    fn set_u16(&mut self, key: &str, value: u16) -> Result<(), StorageError> {
        self.set(key, value)
    }

    fn commit(&mut self) -> Result<(), StorageError> {
        let mut s = lock(&self.0);
        if let Some(err) = s.fail_writes {
            return Err(err);
        }
        let staged = std::mem::take(&mut s.staged);
        s.committed.extend(staged);
        s.commits += 1;
        Ok(())
    }
}

// ── MockTimer ─────────────────────────────────────────────────

/// Records every arm; never fires on its own unless given an expiry hook.
#[derive(Default)]
pub struct MockTimer {
    pub arms: Mutex<Vec<Duration>>,
    /// Runs inside `arm`, before the arm is recorded, standing in for an
    /// expiry that was already dispatched when the countdown restarted.
    pub in_flight: Mutex<Option<Box<dyn Fn() + Send>>>,
}

#[allow(dead_code)]
impl MockTimer {
    /// Fire `expiry` from within every subsequent `arm`.
    pub fn expire_during_arm(&self, expiry: impl Fn() + Send + 'static) {
        *lock(&self.in_flight) = Some(Box::new(expiry));
    }

    pub fn arm_count(&self) -> usize {
        lock(&self.arms).len()
    }

    pub fn last_arm(&self) -> Option<Duration> {
        lock(&self.arms).last().copied()
    }
}

impl CountdownTimer for MockTimer {
    fn arm(&self, after: Duration) {
        if let Some(expiry) = lock(&self.in_flight).as_ref() {
            expiry();
        }
        lock(&self.arms).push(after);
    }
}

// ── LogSink ───────────────────────────────────────────────────

/// Collects every emitted event; clones share the list.
#[derive(Clone, Default)]
pub struct LogSink(pub Arc<Mutex<Vec<LampEvent>>>);

#[allow(dead_code)]
impl LogSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<LampEvent> {
        lock(&self.0).clone()
    }

    pub fn last(&self) -> Option<LampEvent> {
        lock(&self.0).last().cloned()
    }
}

impl EventSink for LogSink {
    fn emit(&mut self, event: &LampEvent) {
        lock(&self.0).push(event.clone());
    }
}
