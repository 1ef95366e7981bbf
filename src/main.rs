//! Night Lamp Firmware: Main Entry Point
//!
//! Hexagonal architecture: pure lamp logic behind port traits, hardware in
//! adapters and drivers, three execution contexts sharing one service.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  PwmTopLed   Ws2812Strip   NvsAdapter   LogEventSink   HwRng   │
//! │  (TopLed)    (LedStrip)    (KV store)   (EventSink)    (Rng)   │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │              LampService (pure logic)                  │    │
//! │  │  LampState · render · persistence                      │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! │                                                                │
//! │  coordinator · saver · render loop (main) · esp_timer callbacks│
//! └────────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Result;
use log::{error, info};

use esp_idf_hal::peripherals::Peripherals;

use nightlamp::adapters::log_sink::LogEventSink;
use nightlamp::adapters::nvs::{NvsAdapter, NAMESPACE};
use nightlamp::adapters::random::HwRng;
use nightlamp::app::service::{InactivityTimers, LampService};
use nightlamp::app::tasks::{run_coordinator, run_render_loop, run_saver};
use nightlamp::config::LampConfig;
use nightlamp::drivers::button::{ButtonDriver, ButtonEvent};
use nightlamp::drivers::hw_init::{self, RawInput};
use nightlamp::drivers::hw_timer::{OneShotTimer, PeriodicTimer};
use nightlamp::drivers::strip::Ws2812Strip;
use nightlamp::drivers::task_pin::{spawn_on_core, Core};
use nightlamp::drivers::top_led::PwmTopLed;
use nightlamp::drivers::vibration::VibrationDetector;
use nightlamp::error::Error;
use nightlamp::events::{IntentRegister, SaveRequest};
use nightlamp::lamp::Intent;
use nightlamp::pins;

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("╔══════════════════════════════════════╗");
    info!("║  NightLamp v{}                    ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    let config = LampConfig::default();
    config.validate().map_err(Error::Config)?;

    // ── 2. Persistent store ───────────────────────────────────
    let store = NvsAdapter::new(NAMESPACE).map_err(Error::from)?;

    // ── 3. Outputs ────────────────────────────────────────────
    if let Err(e) = hw_init::init_peripherals() {
        error!("HAL init failed: {}", e);
        return Err(Error::from(e).into());
    }
    let peripherals = Peripherals::take()?;
    // Data line is pins::STRIP_DATA_GPIO.
    let strip = Ws2812Strip::new(
        peripherals.rmt.channel0,
        peripherals.pins.gpio18,
        config.strip_len,
    )
    .map_err(Error::from)?;
    let top = PwmTopLed::new();

    // ── 4. Lamp service (loads persisted mode/colour) ────────
    let service = Arc::new(LampService::load(
        config,
        top,
        strip,
        store,
        LogEventSink::new(),
        HwRng::new(),
    ));

    // ── 5. Inactivity timers + saver ──────────────────────────
    // The save expiry only rings the doorbell; NVS commits run on the saver
    // thread so the timer task keeps sampling inputs.
    let save_requests = Arc::new(SaveRequest::new());
    {
        let svc = Arc::clone(&service);
        let requests = Arc::clone(&save_requests);
        spawn_on_core(Core::App, 3, 6, "save\0", move || run_saver(&requests, &svc))?;
    }
    let save = {
        let requests = Arc::clone(&save_requests);
        OneShotTimer::new(c"lamp-save", move || requests.request()).map_err(Error::from)?
    };
    let off = {
        let svc = Arc::clone(&service);
        OneShotTimer::new(c"lamp-off", move || svc.on_off_timer()).map_err(Error::from)?
    };
    let timers = Arc::new(InactivityTimers { save, off });
    service.start(&timers);

    // ── 6. Coordinator + vibration service ───────────────────
    // Pending intents: written by the input sampler and the knock service.
    let intents = Arc::new(IntentRegister::new());
    let knocks = Arc::new(VibrationDetector::new());
    {
        let svc = Arc::clone(&service);
        let timers = Arc::clone(&timers);
        let intents = Arc::clone(&intents);
        spawn_on_core(Core::App, 5, 8, "coord\0", move || {
            run_coordinator(&intents, &svc, &timers)
        })?;
    }
    let cooldown = Duration::from_millis(u64::from(service.config().vibration_cooldown_ms));
    let sample_every = Duration::from_millis(u64::from(service.config().vibration_sample_ms));
    {
        let intents = Arc::clone(&intents);
        let knocks = Arc::clone(&knocks);
        spawn_on_core(Core::App, 4, 4, "knock\0", move || {
            knocks.serve(cooldown, || intents.post(Intent::ModeAdvance))
        })?;
    }

    // ── 7. Input sampler (buttons + vibration) ───────────────
    let mut color_btn = ButtonDriver::new(pins::COLOR_BUTTON_GPIO);
    let mut timer_btn = ButtonDriver::new(pins::TIMER_BUTTON_GPIO);
    let mut knock_pin = RawInput(pins::VIBRATION_GPIO);
    let boot = Instant::now();
    let _sampler = PeriodicTimer::start(
        c"lamp-input",
        sample_every,
        move || {
            let now_ms = boot.elapsed().as_millis() as u32;
            if color_btn.poll(now_ms) == Some(ButtonEvent::PressDown) {
                intents.post(Intent::ColorNext);
            }
            if timer_btn.poll(now_ms) == Some(ButtonEvent::PressDown) {
                intents.post(Intent::TimerPulse);
            }
            knocks.sample_pin(&mut knock_pin);
        },
    )
    .map_err(Error::from)?;

    // ── 8. Render loop on the main task ──────────────────────
    info!("Boot complete, entering render loop");
    run_render_loop(&service)
}
