//! Night lamp firmware library.
//!
//! Exposes the lamp logic, ports, adapters and drivers for the binary and
//! for integration testing. All ESP-IDF-specific code is guarded by
//! `#[cfg(target_os = "espidf")]` within each module.

#![deny(unused_must_use)]

pub mod app;
pub mod color;
pub mod config;
pub mod error;
pub mod events;
pub mod lamp;
pub mod pins;

pub mod adapters;
pub mod drivers;
