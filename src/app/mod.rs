//! Application core: lamp logic, zero direct I/O.
//!
//! This module wires the lamp state machine to its collaborators: LED
//! outputs, the key-value store, countdown timers and the event sink.
//! All interaction with hardware happens through **port traits** defined
//! in [`ports`], keeping this layer fully testable without real peripherals.

pub mod display;
pub mod events;
pub mod persistence;
pub mod ports;
pub mod service;
pub mod tasks;
