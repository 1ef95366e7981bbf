//! Long-running loops: the intent coordinator, the saver and the render loop.
//!
//! Each runs on its own thread until power-off. They hold no state of their
//! own; everything goes through the shared [`LampService`].

use std::time::Duration;

use log::info;
use rand::Rng;

use crate::events::{IntentRegister, SaveRequest};
use crate::lamp::Transition;

use super::ports::{CountdownTimer, EventSink, KeyValueStore, LedStrip, TopLed};
use super::service::{InactivityTimers, LampService};

/// Block for the next intent and dispatch it.
pub fn dispatch_next<T, S, K, E, R, C>(
    intents: &IntentRegister,
    service: &LampService<T, S, K, E, R>,
    timers: &InactivityTimers<C>,
) -> Transition
where
    T: TopLed,
    S: LedStrip,
    K: KeyValueStore,
    E: EventSink,
    R: Rng,
    C: CountdownTimer,
{
    let intent = intents.wait();
    service.handle_intent(intent, timers)
}

/// One coordinator step: dispatch the next intent, then hold off for the
/// settle delay so nothing else is dispatched until it has passed.
pub fn coordinate_once<T, S, K, E, R, C>(
    intents: &IntentRegister,
    service: &LampService<T, S, K, E, R>,
    timers: &InactivityTimers<C>,
) -> Transition
where
    T: TopLed,
    S: LedStrip,
    K: KeyValueStore,
    E: EventSink,
    R: Rng,
    C: CountdownTimer,
{
    let transition = dispatch_next(intents, service, timers);
    std::thread::sleep(service.config().settle());
    transition
}

/// Coordinator loop: one intent, then the settle pause, forever.
pub fn run_coordinator<T, S, K, E, R, C>(
    intents: &IntentRegister,
    service: &LampService<T, S, K, E, R>,
    timers: &InactivityTimers<C>,
) -> !
where
    T: TopLed,
    S: LedStrip,
    K: KeyValueStore,
    E: EventSink,
    R: Rng,
    C: CountdownTimer,
{
    let settle: Duration = service.config().settle();
    info!("coordinator: waiting for intents (settle={:?})", settle);
    loop {
        coordinate_once(intents, service, timers);
    }
}

/// Block for a save request and persist the current state.
pub fn save_once<T, S, K, E, R>(requests: &SaveRequest, service: &LampService<T, S, K, E, R>)
where
    T: TopLed,
    S: LedStrip,
    K: KeyValueStore,
    E: EventSink,
    R: Rng,
{
    requests.wait();
    service.on_save_timer();
}

/// Saver loop: flash writes stay off the timer task.
pub fn run_saver<T, S, K, E, R>(requests: &SaveRequest, service: &LampService<T, S, K, E, R>) -> !
where
    T: TopLed,
    S: LedStrip,
    K: KeyValueStore,
    E: EventSink,
    R: Rng,
{
    info!("saver: waiting for save requests");
    loop {
        save_once(requests, service);
    }
}

/// Render loop: draw a frame, hold it, repeat.
pub fn run_render_loop<T, S, K, E, R>(service: &LampService<T, S, K, E, R>) -> !
where
    T: TopLed,
    S: LedStrip,
    K: KeyValueStore,
    E: EventSink,
    R: Rng,
{
    info!("render: loop started");
    loop {
        let hold = service.render_frame();
        std::thread::sleep(hold);
    }
}
