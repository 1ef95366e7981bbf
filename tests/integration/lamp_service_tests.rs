//! Integration tests for the LampService → render → outputs pipeline.
//!
//! These run on the host and drive the service the way the firmware does:
//! intents from the coordinator, expiries from the timer callbacks and
//! frames from the render loop, all against mock adapters.

use std::sync::Arc;
use std::time::Duration;

use nightlamp::app::events::LampEvent;
use nightlamp::app::persistence::{KEY_HUE, KEY_MODE, KEY_SATURATION, KEY_VALUE, PersistedState};
use nightlamp::app::ports::{StorageError, TopLed};
use nightlamp::app::service::{InactivityTimers, LampService};
use nightlamp::color::hsv_to_rgb;
use nightlamp::config::LampConfig;
use nightlamp::drivers::hw_timer::OneShotTimer;
use nightlamp::lamp::{Hsv, Intent, LampMode, Transition};
use rand::rngs::mock::StepRng;
use smart_leds::RGB8;

use super::mock_hw::{LogSink, MockStore, MockStrip, MockTimer, MockTopLed};

const STRIP: usize = 6;

type Service = LampService<MockTopLed, MockStrip, MockStore, LogSink, StepRng>;

fn config() -> LampConfig {
    LampConfig {
        strip_len: STRIP,
        ..Default::default()
    }
}

fn timers() -> InactivityTimers<MockTimer> {
    InactivityTimers {
        save: MockTimer::default(),
        off: MockTimer::default(),
    }
}

/// Service around an explicit starting state.
fn service_in(mode: LampMode, color: Hsv) -> (Service, MockStore, LogSink) {
    let store = MockStore::new();
    let sink = LogSink::new();
    let svc = LampService::new(
        config(),
        PersistedState { mode, color },
        MockTopLed::default(),
        MockStrip::new(STRIP),
        store.clone(),
        sink.clone(),
        StepRng::new(0, 0),
    );
    (svc, store, sink)
}

fn top_rgb(svc: &Service) -> RGB8 {
    svc.with_display(|d| d.top().rgb())
}

fn strip_shown(svc: &Service) -> Vec<RGB8> {
    svc.with_display(|d| d.strip().shown.clone())
}

// ── Boot ──────────────────────────────────────────────────────

#[test]
fn fresh_store_boots_into_marquee_with_synthesised_hue() {
    let store = MockStore::new();
    let svc = LampService::load(
        config(),
        MockTopLed::default(),
        MockStrip::new(STRIP),
        store.clone(),
        LogSink::new(),
        StepRng::new(0, 0),
    );

    let loaded = svc.persisted();
    assert_eq!(loaded.mode, LampMode::Marquee);
    assert_eq!(loaded.color, Hsv::new(0, 100, 100));

    assert_eq!(store.committed(KEY_MODE), Some(0));
    assert_eq!(store.committed(KEY_HUE), Some(0));
    assert_eq!(store.committed(KEY_SATURATION), Some(100));
    assert_eq!(store.committed(KEY_VALUE), Some(100));

    let hold = svc.render_frame();
    assert_eq!(hold, Duration::from_millis(30));
    let shown = strip_shown(&svc);
    for (i, px) in shown.iter().enumerate() {
        assert_eq!(*px, hsv_to_rgb(i as u16, 100, 100), "pixel {i}");
    }
    assert_eq!(top_rgb(&svc), RGB8::new(255, 0, 0));
    assert_eq!(svc.snapshot().hue, 1, "rainbow advances one degree per frame");
}

#[test]
fn start_arms_only_the_off_countdown() {
    let (svc, _store, sink) = service_in(LampMode::Fixed, Hsv::new(10, 90, 70));
    let t = timers();
    svc.start(&t);

    assert_eq!(t.off.last_arm(), Some(Duration::from_secs(30 * 60)));
    assert_eq!(t.save.arm_count(), 0);
    assert!(matches!(sink.last(), Some(LampEvent::Started(s)) if s.mode == LampMode::Fixed));
}

// ── Intents ───────────────────────────────────────────────────

#[test]
fn color_next_in_marquee_changes_nothing() {
    let (svc, _store, sink) = service_in(LampMode::Marquee, Hsv::new(200, 80, 90));
    let t = timers();
    let before = svc.snapshot();

    let tr = svc.handle_intent(Intent::ColorNext, &t);

    assert_eq!(tr, Transition::ColorRejected(LampMode::Marquee));
    assert_eq!(svc.snapshot(), before);
    assert_eq!(t.save.arm_count(), 0, "rejected colour must not schedule a save");
    assert_eq!(t.off.arm_count(), 0, "rejected colour is not activity");
    assert_eq!(sink.last(), Some(LampEvent::ColorRejected(LampMode::Marquee)));
}

#[test]
fn rejected_color_next_leaves_blanked_display_dark() {
    let (svc, _store, sink) = service_in(LampMode::Marquee, Hsv::new(200, 80, 90));
    let t = timers();
    svc.on_off_timer();

    svc.handle_intent(Intent::ColorNext, &t);
    svc.render_frame();

    assert!(svc.is_blanked());
    assert_eq!(top_rgb(&svc), RGB8::default());
    assert!(!sink.events().contains(&LampEvent::Woke));
    assert_eq!(t.off.arm_count(), 0);
}

#[test]
fn color_next_draws_colour_and_schedules_save() {
    let (svc, _store, sink) = service_in(LampMode::Fixed, Hsv::new(10, 90, 70));
    let t = timers();

    let tr = svc.handle_intent(Intent::ColorNext, &t);

    let drawn = Hsv::new(0, 40, 100);
    assert_eq!(tr, Transition::ColorChanged(drawn));
    assert_eq!(svc.snapshot().color(), drawn);
    assert_eq!(t.save.last_arm(), Some(Duration::from_secs(3 * 60)));
    assert_eq!(t.off.arm_count(), 1);
    assert_eq!(sink.last(), Some(LampEvent::ColorChanged(drawn)));
}

#[test]
fn timer_pulse_only_rearms_off() {
    let (svc, _store, sink) = service_in(LampMode::Breath, Hsv::new(10, 90, 70));
    let t = timers();
    let before = svc.snapshot();

    svc.handle_intent(Intent::TimerPulse, &t);
    svc.handle_intent(Intent::TimerPulse, &t);

    assert_eq!(svc.snapshot(), before);
    assert_eq!(t.off.arm_count(), 2);
    assert_eq!(t.save.arm_count(), 0);
    assert_eq!(sink.last(), Some(LampEvent::KeepAlive));
}

#[test]
fn four_mode_advances_return_to_start() {
    let (svc, _store, _sink) = service_in(LampMode::Breath, Hsv::new(10, 90, 70));
    let t = timers();

    for _ in 0..LampMode::COUNT {
        svc.handle_intent(Intent::ModeAdvance, &t);
    }

    assert_eq!(svc.snapshot().mode, LampMode::Breath);
    assert_eq!(t.save.arm_count(), LampMode::COUNT);
}

#[test]
fn entering_stack_starts_dark_then_walks_top_to_strip() {
    let (svc, _store, _sink) = service_in(LampMode::Breath, Hsv::new(120, 100, 100));
    let t = timers();
    svc.render_frame();

    svc.handle_intent(Intent::ModeAdvance, &t);
    assert_eq!(svc.snapshot().mode, LampMode::Stack);

    svc.render_frame();
    assert_eq!(top_rgb(&svc), RGB8::default());
    assert!(strip_shown(&svc).iter().all(|p| *p == RGB8::default()));

    let green = hsv_to_rgb(120, 100, 100);
    svc.render_frame();
    assert_eq!(top_rgb(&svc), green);
    assert!(strip_shown(&svc).iter().all(|p| *p == RGB8::default()));

    svc.render_frame();
    assert_eq!(top_rgb(&svc), RGB8::default());
    assert_eq!(strip_shown(&svc)[0], green);
}

// ── Save countdown ────────────────────────────────────────────

#[test]
fn save_expiry_persists_mode_and_colour() {
    let (svc, store, sink) = service_in(LampMode::Fixed, Hsv::new(10, 90, 70));

    svc.on_save_timer();

    assert_eq!(store.committed(KEY_MODE), Some(u16::from(LampMode::Fixed.as_u8())));
    assert_eq!(store.committed(KEY_HUE), Some(10));
    assert_eq!(store.committed(KEY_SATURATION), Some(90));
    assert_eq!(store.committed(KEY_VALUE), Some(70));
    assert_eq!(store.commits(), 2, "mode and colour commit separately");
    assert!(matches!(sink.last(), Some(LampEvent::Saved(_))));
}

#[test]
fn save_failure_is_reported_and_state_kept() {
    let (svc, store, sink) = service_in(LampMode::Fixed, Hsv::new(10, 90, 70));
    store.fail_writes(Some(StorageError::Full));

    svc.on_save_timer();

    assert_eq!(sink.last(), Some(LampEvent::SaveFailed(StorageError::Full)));
    assert_eq!(store.committed(KEY_MODE), None);
    assert_eq!(svc.snapshot().mode, LampMode::Fixed);
}

// ── Off countdown ─────────────────────────────────────────────

#[test]
fn off_expiry_blanks_outputs_but_keeps_state() {
    let (svc, _store, sink) = service_in(LampMode::Fixed, Hsv::new(10, 90, 70));
    svc.render_frame();
    assert_ne!(top_rgb(&svc), RGB8::default());

    svc.on_off_timer();

    assert!(svc.is_blanked());
    assert_eq!(top_rgb(&svc), RGB8::default());
    assert!(svc.with_display(|d| d.strip().is_dark()));
    assert_eq!(svc.snapshot().mode, LampMode::Fixed);
    assert_eq!(svc.snapshot().color(), Hsv::new(10, 90, 70));
    assert_eq!(sink.last(), Some(LampEvent::Blanked));
}

#[test]
fn blanked_display_ignores_frames_until_activity() {
    let (svc, _store, sink) = service_in(LampMode::Marquee, Hsv::new(0, 100, 100));
    let t = timers();
    svc.on_off_timer();
    let writes = svc.with_display(|d| d.top().writes.len());
    let hue = svc.snapshot().hue;

    svc.render_frame();
    svc.render_frame();
    assert_eq!(svc.with_display(|d| d.top().writes.len()), writes);
    assert_eq!(svc.snapshot().hue, hue, "animation paused while blanked");

    svc.handle_intent(Intent::TimerPulse, &t);
    assert!(!svc.is_blanked());
    assert!(sink.events().contains(&LampEvent::Woke));

    svc.render_frame();
    assert_ne!(top_rgb(&svc), RGB8::default());
}

#[test]
fn off_expiry_racing_an_intent_does_not_blank() {
    let (svc, _store, sink) = service_in(LampMode::Fixed, Hsv::new(10, 90, 70));
    let svc = Arc::new(svc);
    let t = timers();
    svc.start(&t);
    svc.render_frame();
    {
        let svc = Arc::clone(&svc);
        t.off.expire_during_arm(move || svc.on_off_timer());
    }

    svc.handle_intent(Intent::TimerPulse, &t);
    svc.render_frame();

    assert!(!svc.is_blanked());
    assert_eq!(top_rgb(&svc), hsv_to_rgb(10, 90, 70));
    assert!(!sink.events().contains(&LampEvent::Blanked));
}

#[test]
fn off_expiry_racing_a_wake_leaves_display_lit() {
    let (svc, _store, _sink) = service_in(LampMode::Fixed, Hsv::new(10, 90, 70));
    let svc = Arc::new(svc);
    let t = timers();
    svc.on_off_timer();
    assert!(svc.is_blanked());
    {
        let svc = Arc::clone(&svc);
        t.off.expire_during_arm(move || svc.on_off_timer());
    }

    svc.handle_intent(Intent::TimerPulse, &t);
    svc.render_frame();

    assert!(!svc.is_blanked());
    assert_ne!(top_rgb(&svc), RGB8::default());
}

#[test]
fn output_failure_drops_the_frame() {
    let sink = LogSink::new();
    let svc = LampService::new(
        config(),
        PersistedState {
            mode: LampMode::Fixed,
            color: Hsv::new(10, 90, 70),
        },
        MockTopLed {
            fail: true,
            ..Default::default()
        },
        MockStrip::new(STRIP),
        MockStore::new(),
        sink.clone(),
        StepRng::new(0, 0),
    );

    let hold = svc.render_frame();

    assert_eq!(hold, Duration::from_millis(100));
    assert!(matches!(sink.last(), Some(LampEvent::FrameDropped(_))));
}

// ── Real countdown timers ─────────────────────────────────────

#[test]
fn off_countdown_fires_through_one_shot_timer() {
    let cfg = LampConfig {
        off_after_ms: 30,
        ..config()
    };
    let svc = Arc::new(LampService::new(
        cfg,
        PersistedState {
            mode: LampMode::Fixed,
            color: Hsv::new(10, 90, 70),
        },
        MockTopLed::default(),
        MockStrip::new(STRIP),
        MockStore::new(),
        LogSink::new(),
        StepRng::new(0, 0),
    ));

    let off = {
        let svc = Arc::clone(&svc);
        OneShotTimer::new(c"off", move || svc.on_off_timer()).unwrap()
    };
    let save = {
        let svc = Arc::clone(&svc);
        OneShotTimer::new(c"save", move || svc.on_save_timer()).unwrap()
    };
    let t = InactivityTimers { save, off };

    svc.start(&t);
    svc.render_frame();
    std::thread::sleep(Duration::from_millis(300));

    assert!(svc.is_blanked());
    assert!(!t.off.is_armed());
}
