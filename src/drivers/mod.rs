//! Lamp output drivers, input sampling, and peripheral helpers.

pub mod button;
pub mod hw_init;
pub mod hw_timer;
pub mod strip;
pub mod task_pin;
pub mod top_led;
pub mod vibration;
