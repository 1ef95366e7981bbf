//! GPIO / peripheral pin assignments for the night lamp board.
//!
//! Single source of truth: every driver references this module rather than
//! hard-coding pin numbers.

// ---------------------------------------------------------------------------
// Top LED (discrete RGB on LEDC PWM)
// ---------------------------------------------------------------------------

pub const TOP_LED_R_GPIO: i32 = 25;
pub const TOP_LED_G_GPIO: i32 = 26;
pub const TOP_LED_B_GPIO: i32 = 27;

// ---------------------------------------------------------------------------
// Addressable strip (WS2812, GRB, driven by RMT channel 0)
// ---------------------------------------------------------------------------

/// Data line of the WS2812 strip.
pub const STRIP_DATA_GPIO: i32 = 18;
/// Number of pixels on the strip.
pub const STRIP_LED_COUNT: usize = 12;

// ---------------------------------------------------------------------------
// User inputs (active-low with internal pull-up)
// ---------------------------------------------------------------------------

/// Button A: draw a new random colour.
pub const COLOR_BUTTON_GPIO: i32 = 0;
/// Button B: keep-alive, re-arms the off-timer.
pub const TIMER_BUTTON_GPIO: i32 = 4;
/// Vibration (tilt / shake) switch. Idle HIGH, pulses LOW on a knock.
pub const VIBRATION_GPIO: i32 = 5;

// ---------------------------------------------------------------------------
// PWM configuration
// ---------------------------------------------------------------------------

/// LEDC timer resolution (bits).  8-bit gives 0 – 255 duty levels.
pub const PWM_RESOLUTION_BITS: u32 = 8;
/// LEDC frequency for the top LED (20 kHz, above audible and visible range).
pub const TOP_LED_PWM_FREQ_HZ: u32 = 20_000;
