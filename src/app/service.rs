//! Lamp service, the hexagonal core.
//!
//! [`LampService`] owns the canonical [`LampState`], both LED outputs, the
//! store and the event sink.  Every method takes `&self` so one instance can
//! be shared (`Arc`) between the coordinator thread, the render thread and
//! the timer callbacks.
//!
//! ```text
//!  Intent ─────▶ ┌─────────────────────────┐ ──▶ EventSink
//!  save expiry ─▶│       LampService       │ ──▶ KeyValueStore
//!  off expiry ──▶│  state · display · rng  │ ──▶ TopLed + LedStrip
//!                └─────────────────────────┘
//! ```
//!
//! Lock order is display → state → rng → store → sink.

use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use log::{debug, info, warn};
use rand::Rng;

use crate::config::LampConfig;
use crate::lamp::render::next_frame;
use crate::lamp::{Intent, LampState, Transition};

use super::display::Display;
use super::events::LampEvent;
use super::persistence::{self, PersistedState};
use super::ports::{CountdownTimer, EventSink, KeyValueStore, LedStrip, TopLed};

// ───────────────────────────────────────────────────────────────
// Inactivity timers
// ───────────────────────────────────────────────────────────────

/// The two countdowns the service re-arms on activity.
pub struct InactivityTimers<C> {
    /// Expiry persists the state.
    pub save: C,
    /// Expiry blanks the display.
    pub off: C,
}

// ───────────────────────────────────────────────────────────────
// LampService
// ───────────────────────────────────────────────────────────────

pub struct LampService<T, S, K, E, R> {
    config: LampConfig,
    state: Mutex<LampState>,
    display: Mutex<Display<T, S>>,
    store: Mutex<K>,
    sink: Mutex<E>,
    rng: Mutex<R>,
}

/// Recover the guard from a poisoned lock; lamp state is always consistent
/// between statements.
fn lock<V>(m: &Mutex<V>) -> MutexGuard<'_, V> {
    m.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
}

impl<T, S, K, E, R> LampService<T, S, K, E, R>
where
    T: TopLed,
    S: LedStrip,
    K: KeyValueStore,
    E: EventSink,
    R: Rng,
{
    /// Construct the service around an already-loaded state.
    ///
    /// Does not touch any output; call [`start`](Self::start) next.
    pub fn new(config: LampConfig, initial: PersistedState, top: T, strip: S, store: K, sink: E, rng: R) -> Self {
        Self {
            state: Mutex::new(LampState::new(initial.mode, initial.color)),
            display: Mutex::new(Display::new(top, strip)),
            store: Mutex::new(store),
            sink: Mutex::new(sink),
            rng: Mutex::new(rng),
            config,
        }
    }

    /// Load state from `store` (synthesising defaults) and construct.
    pub fn load(config: LampConfig, top: T, strip: S, mut store: K, sink: E, mut rng: R) -> Self {
        let initial = persistence::load(&mut store, &mut rng);
        Self::new(config, initial, top, strip, store, sink, rng)
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Announce the loaded state and start the off countdown.
    pub fn start(&self, timers: &InactivityTimers<impl CountdownTimer>) {
        let snapshot = self.persisted();
        lock(&self.display).touch();
        timers.off.arm(self.config.off_after());
        self.emit(&LampEvent::Started(snapshot));
        info!("LampService started in {:?}", snapshot.mode);
    }

    // ── Intent handling ───────────────────────────────────────

    /// Apply one intent and re-arm the countdowns it implies.
    ///
    /// An accepted intent counts as activity: it wakes a blanked display
    /// and restarts the off countdown.  Intents that change persisted fields
    /// also restart the save countdown.  A rejected `ColorNext` is swallowed
    /// without touching the display or either countdown.
    pub fn handle_intent(&self, intent: Intent, timers: &InactivityTimers<impl CountdownTimer>) -> Transition {
        let transition = {
            let mut state = lock(&self.state);
            let mut rng = lock(&self.rng);
            state.apply(intent, self.config.strip_len, &mut *rng)
        };

        if let Transition::ColorRejected(mode) = transition {
            self.emit(&LampEvent::ColorRejected(mode));
            return transition;
        }

        // Activity is stamped before the off countdown restarts, so an
        // expiry already in flight finds it and stands down.
        if lock(&self.display).wake() {
            self.emit(&LampEvent::Woke);
        }
        timers.off.arm(self.config.off_after());
        if transition.dirties_state() {
            timers.save.arm(self.config.save_after());
        }

        self.emit(&match transition {
            Transition::ModeChanged { from, to } => LampEvent::ModeChanged { from, to },
            Transition::ColorChanged(color) => LampEvent::ColorChanged(color),
            Transition::ColorRejected(mode) => LampEvent::ColorRejected(mode),
            Transition::KeepAlive => LampEvent::KeepAlive,
        });
        transition
    }

    // ── Timer expiries ────────────────────────────────────────

    /// Save countdown expired: persist mode, then colour. Runs on the saver
    /// thread, never on the timer task.
    pub fn on_save_timer(&self) {
        let snapshot = self.persisted();
        let result = persistence::save(&mut *lock(&self.store), snapshot);
        match result {
            Ok(()) => {
                info!("LampService: state saved");
                self.emit(&LampEvent::Saved(snapshot));
            }
            Err(e) => {
                warn!("LampService: save failed: {}", e);
                self.emit(&LampEvent::SaveFailed(e));
            }
        }
    }

    /// Off countdown expired: blank both outputs. Lamp state is kept.
    ///
    /// An expiry that lost the race against an intent finds recent activity
    /// and does nothing.
    pub fn on_off_timer(&self) {
        let result = lock(&self.display).blank_if_idle(self.config.off_after());
        match result {
            Ok(true) => self.emit(&LampEvent::Blanked),
            Ok(false) => debug!("LampService: off expiry superseded by activity"),
            Err(e) => {
                warn!("LampService: blank failed: {}", e);
                self.emit(&LampEvent::Blanked);
            }
        }
    }

    // ── Rendering ─────────────────────────────────────────────

    /// Compute and show one frame. Returns how long to hold it.
    ///
    /// While blanked the animation does not advance and nothing is written.
    pub fn render_frame(&self) -> Duration {
        let mut display = lock(&self.display);
        if display.is_blanked() {
            return Duration::from_millis(u64::from(self.config.fixed_frame_ms));
        }
        let step = next_frame(&mut lock(&self.state), &self.config);
        if let Err(e) = display.show(&step.frame) {
            drop(display);
            warn!("LampService: frame dropped: {}", e);
            self.emit(&LampEvent::FrameDropped(e));
        }
        step.hold
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn config(&self) -> &LampConfig {
        &self.config
    }

    /// Copy of the current state.
    pub fn snapshot(&self) -> LampState {
        lock(&self.state).clone()
    }

    pub fn persisted(&self) -> PersistedState {
        PersistedState::from(&*lock(&self.state))
    }

    pub fn is_blanked(&self) -> bool {
        lock(&self.display).is_blanked()
    }

    /// Run `f` against the outputs (diagnostics / tests).
    pub fn with_display<V>(&self, f: impl FnOnce(&Display<T, S>) -> V) -> V {
        f(&lock(&self.display))
    }

    fn emit(&self, event: &LampEvent) {
        lock(&self.sink).emit(event);
    }
}
