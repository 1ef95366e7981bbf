//! Software timers on ESP-IDF's esp_timer API.
//!
//! - [`OneShotTimer`]: restartable countdown (save / off inactivity timers).
//! - [`PeriodicTimer`]: fixed-rate callback (5 ms input sampler).
//!
//! Callbacks execute in the ESP timer task context (not ISR), so they may
//! take short mutex locks but must never block for long.
//!
//! On simulation targets each timer is backed by a std thread.

use core::time::Duration;
use std::sync::Mutex;

use crate::app::ports::CountdownTimer;

use super::hw_init::HwInitError;

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;

type Callback = Box<dyn Fn() + Send + Sync + 'static>;

// ───────────────────────────────────────────────────────────────
// ESP-IDF backend
// ───────────────────────────────────────────────────────────────

#[cfg(target_os = "espidf")]
unsafe extern "C" fn trampoline(arg: *mut core::ffi::c_void) {
    // SAFETY: `arg` points at the boxed callback owned by the timer, which
    // stops and deletes the esp_timer before freeing it.
    let cb = unsafe { &*(arg as *const Callback) };
    cb();
}

#[cfg(target_os = "espidf")]
struct EspTimer {
    handle: esp_timer_handle_t,
    _callback: Box<Callback>,
}

// SAFETY: esp_timer handles may be used from any task; the API serialises
// internally.
#[cfg(target_os = "espidf")]
unsafe impl Send for EspTimer {}
#[cfg(target_os = "espidf")]
unsafe impl Sync for EspTimer {}

#[cfg(target_os = "espidf")]
impl EspTimer {
    fn create(name: &'static core::ffi::CStr, callback: Callback) -> Result<Self, HwInitError> {
        let callback = Box::new(callback);
        let args = esp_timer_create_args_t {
            callback: Some(trampoline),
            arg: &*callback as *const Callback as *mut core::ffi::c_void,
            dispatch_method: esp_timer_dispatch_t_ESP_TIMER_TASK,
            name: name.as_ptr(),
            skip_unhandled_events: false,
        };
        let mut handle: esp_timer_handle_t = core::ptr::null_mut();
        // SAFETY: args and the boxed callback outlive the timer (owned by self).
        let ret = unsafe { esp_timer_create(&args, &mut handle) };
        if ret != ESP_OK as i32 {
            return Err(HwInitError::TimerCreateFailed(ret));
        }
        Ok(Self {
            handle,
            _callback: callback,
        })
    }
}

#[cfg(target_os = "espidf")]
impl Drop for EspTimer {
    fn drop(&mut self) {
        // SAFETY: handle is valid until deleted here; stop before delete.
        unsafe {
            esp_timer_stop(self.handle);
            esp_timer_delete(self.handle);
        }
    }
}

// ───────────────────────────────────────────────────────────────
// Simulation backend
// ───────────────────────────────────────────────────────────────

#[cfg(not(target_os = "espidf"))]
mod sim {
    use std::sync::{Arc, Condvar, Mutex};
    use std::time::{Duration, Instant};

    use super::Callback;

    #[derive(Default)]
    pub struct Schedule {
        pub deadline: Option<Instant>,
        pub period: Option<Duration>,
        pub shutdown: bool,
    }

    pub type Shared = Arc<(Mutex<Schedule>, Condvar)>;

    /// Spawn the worker thread that fires `callback` whenever the deadline passes.
    pub fn spawn(name: &str, callback: Callback) -> Shared {
        let shared: Shared = Arc::new((Mutex::new(Schedule::default()), Condvar::new()));
        let worker = Arc::clone(&shared);
        let spawned = std::thread::Builder::new()
            .name(format!("timer-{name}"))
            .spawn(move || run(&worker, &callback));
        if let Err(e) = spawned {
            log::error!("hw_timer(sim): worker spawn failed: {}", e);
        }
        shared
    }

    fn run(shared: &Shared, callback: &Callback) {
        let (lock, cvar) = &**shared;
        let mut s = lock.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        loop {
            if s.shutdown {
                return;
            }
            match s.deadline {
                None => {
                    s = cvar.wait(s).unwrap_or_else(std::sync::PoisonError::into_inner);
                }
                Some(at) => {
                    let now = Instant::now();
                    if now >= at {
                        s.deadline = s.period.map(|p| at + p);
                        drop(s);
                        callback();
                        s = lock.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
                    } else {
                        s = cvar
                            .wait_timeout(s, at - now)
                            .map(|(g, _)| g)
                            .unwrap_or_else(|e| e.into_inner().0);
                    }
                }
            }
        }
    }

    pub fn update(shared: &Shared, f: impl FnOnce(&mut Schedule)) {
        let (lock, cvar) = &**shared;
        f(&mut lock.lock().unwrap_or_else(std::sync::PoisonError::into_inner));
        cvar.notify_all();
    }
}

// ───────────────────────────────────────────────────────────────
// OneShotTimer
// ───────────────────────────────────────────────────────────────

/// Single-shot countdown created once and re-armed any number of times.
pub struct OneShotTimer {
    #[cfg(target_os = "espidf")]
    inner: EspTimer,
    #[cfg(not(target_os = "espidf"))]
    inner: sim::Shared,
    /// Serialises arm() so restart-or-start is not raced by two callers.
    arm_lock: Mutex<()>,
}

impl OneShotTimer {
    /// Create the timer disarmed. `name` shows up in esp_timer dumps.
    pub fn new(
        name: &'static core::ffi::CStr,
        on_expiry: impl Fn() + Send + Sync + 'static,
    ) -> Result<Self, HwInitError> {
        #[cfg(target_os = "espidf")]
        let inner = EspTimer::create(name, Box::new(on_expiry))?;
        #[cfg(not(target_os = "espidf"))]
        let inner = sim::spawn(&name.to_string_lossy(), Box::new(on_expiry));

        Ok(Self {
            inner,
            arm_lock: Mutex::new(()),
        })
    }

    /// Whether a countdown is in progress.
    pub fn is_armed(&self) -> bool {
        #[cfg(target_os = "espidf")]
        {
            // SAFETY: handle valid for the lifetime of self.
            unsafe { esp_timer_is_active(self.inner.handle) }
        }

        #[cfg(not(target_os = "espidf"))]
        {
            let (lock, _) = &*self.inner;
            lock.lock()
                .unwrap_or_else(std::sync::PoisonError::into_inner)
                .deadline
                .is_some()
        }
    }
}

impl CountdownTimer for OneShotTimer {
    fn arm(&self, after: Duration) {
        let _guard = self.arm_lock.lock().unwrap_or_else(std::sync::PoisonError::into_inner);

        #[cfg(target_os = "espidf")]
        {
            let us = after.as_micros() as u64;
            // SAFETY: handle valid for the lifetime of self.
            unsafe {
                let ret = esp_timer_restart(self.inner.handle, us);
                if ret == ESP_ERR_INVALID_STATE as i32 {
                    // Not running yet: first arm, or the previous countdown fired.
                    let ret = esp_timer_start_once(self.inner.handle, us);
                    if ret != ESP_OK as i32 {
                        log::error!("hw_timer: start_once failed (rc={})", ret);
                    }
                } else if ret != ESP_OK as i32 {
                    log::error!("hw_timer: restart failed (rc={})", ret);
                }
            }
        }

        #[cfg(not(target_os = "espidf"))]
        sim::update(&self.inner, |s| {
            s.deadline = Some(std::time::Instant::now() + after);
            s.period = None;
        });
    }
}

#[cfg(not(target_os = "espidf"))]
impl Drop for OneShotTimer {
    fn drop(&mut self) {
        sim::update(&self.inner, |s| s.shutdown = true);
    }
}

// ───────────────────────────────────────────────────────────────
// PeriodicTimer
// ───────────────────────────────────────────────────────────────

/// Fixed-rate timer that runs until dropped.
pub struct PeriodicTimer {
    #[cfg(target_os = "espidf")]
    _inner: EspTimer,
    #[cfg(not(target_os = "espidf"))]
    inner: sim::Shared,
}

impl PeriodicTimer {
    /// Create and immediately start a timer calling `tick` every `period`.
    ///
    /// `tick` may keep mutable state; calls never overlap.
    pub fn start(
        name: &'static core::ffi::CStr,
        period: Duration,
        tick: impl FnMut() + Send + 'static,
    ) -> Result<Self, HwInitError> {
        let tick = Mutex::new(tick);
        let callback: Callback = Box::new(move || {
            let mut f = tick.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
            f();
        });

        #[cfg(target_os = "espidf")]
        {
            let inner = EspTimer::create(name, callback)?;
            // SAFETY: handle valid for the lifetime of inner.
            let ret = unsafe { esp_timer_start_periodic(inner.handle, period.as_micros() as u64) };
            if ret != ESP_OK as i32 {
                return Err(HwInitError::TimerCreateFailed(ret));
            }
            log::info!("hw_timer: '{}' every {:?}", name.to_string_lossy(), period);
            Ok(Self { _inner: inner })
        }

        #[cfg(not(target_os = "espidf"))]
        {
            let inner = sim::spawn(&name.to_string_lossy(), callback);
            sim::update(&inner, |s| {
                s.deadline = Some(std::time::Instant::now() + period);
                s.period = Some(period);
            });
            Ok(Self { inner })
        }
    }
}

#[cfg(not(target_os = "espidf"))]
impl Drop for PeriodicTimer {
    fn drop(&mut self) {
        sim::update(&self.inner, |s| s.shutdown = true);
    }
}
