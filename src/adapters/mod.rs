//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter    | Implements     | Connects to              |
//! |------------|----------------|--------------------------|
//! | `log_sink` | EventSink      | Serial log output        |
//! | `nvs`      | KeyValueStore  | NVS / in-memory store    |
//! | `random`   | RngCore        | esp_random / StdRng      |
//!
//! LED outputs and timers live in [`crate::drivers`] because they own
//! peripherals directly.

pub mod log_sink;
pub mod nvs;
pub mod random;
