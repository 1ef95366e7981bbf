//! Lamp configuration parameters
//!
//! All timing constants for the lamp live here. Values are compiled in;
//! the user-facing state (mode and colour) is persisted separately by the
//! persistence gateway.

use core::time::Duration;

use crate::pins;

/// Core lamp configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LampConfig {
    // --- Strip ---
    /// Number of addressable pixels on the strip
    pub strip_len: usize,

    // --- Inactivity timers ---
    /// Quiet period after the last mode/colour change before state is saved
    pub save_after_ms: u32,
    /// Quiet period after the last activity before both outputs go dark
    pub off_after_ms: u32,

    // --- Coordinator ---
    /// Pause after each processed intent
    pub settle_ms: u32,
    /// Vibration input sampling period
    pub vibration_sample_ms: u32,
    /// Time the vibration detector stays disarmed after a knock
    pub vibration_cooldown_ms: u32,

    // --- Frame cadence ---
    pub fixed_frame_ms: u32,
    pub breath_frame_ms: u32,
    pub marquee_frame_ms: u32,
    pub stack_frame_ms: u32,

    // --- Breath envelope ---
    /// Brightness at or below which Breath turns around and starts rising
    pub breath_floor: u8,
    /// Brightness at or above which Breath turns around and starts falling
    pub breath_ceiling: u8,
}

impl Default for LampConfig {
    fn default() -> Self {
        Self {
            strip_len: pins::STRIP_LED_COUNT,

            save_after_ms: 3 * 60 * 1000,
            off_after_ms: 30 * 60 * 1000,

            settle_ms: 1000,
            vibration_sample_ms: 5,
            vibration_cooldown_ms: 250,

            fixed_frame_ms: 100,
            breath_frame_ms: 20,
            marquee_frame_ms: 30,
            stack_frame_ms: 100,

            breath_floor: 15,
            breath_ceiling: 99,
        }
    }
}

impl LampConfig {
    /// Range-check every field. Called once at boot before any task starts.
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.strip_len == 0 || self.strip_len > crate::lamp::render::MAX_STRIP_LEN {
            return Err("strip_len must be 1..=MAX_STRIP_LEN");
        }
        if self.save_after_ms == 0 || self.off_after_ms == 0 {
            return Err("inactivity timers must be non-zero");
        }
        if self.vibration_sample_ms == 0 {
            return Err("vibration_sample_ms must be non-zero");
        }
        if self.breath_floor >= self.breath_ceiling || self.breath_ceiling > 100 {
            return Err("breath envelope must satisfy floor < ceiling <= 100");
        }
        let frames = [
            self.fixed_frame_ms,
            self.breath_frame_ms,
            self.marquee_frame_ms,
            self.stack_frame_ms,
        ];
        if frames.contains(&0) {
            return Err("frame delays must be non-zero");
        }
        Ok(())
    }

    pub fn save_after(&self) -> Duration {
        Duration::from_millis(u64::from(self.save_after_ms))
    }

    pub fn off_after(&self) -> Duration {
        Duration::from_millis(u64::from(self.off_after_ms))
    }

    pub fn settle(&self) -> Duration {
        Duration::from_millis(u64::from(self.settle_ms))
    }
}
