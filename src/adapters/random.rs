//! Hardware random source.
//!
//! On ESP-IDF, [`HwRng`] draws from `esp_random()` (RF-noise seeded TRNG).
//! On host it wraps an entropy-seeded [`StdRng`] so simulation runs differ.

use rand::{Error, RngCore};

#[cfg(not(target_os = "espidf"))]
use rand::{SeedableRng, rngs::StdRng};

pub struct HwRng {
    #[cfg(not(target_os = "espidf"))]
    inner: StdRng,
}

impl HwRng {
    pub fn new() -> Self {
        Self {
            #[cfg(not(target_os = "espidf"))]
            inner: StdRng::from_entropy(),
        }
    }
}

impl Default for HwRng {
    fn default() -> Self {
        Self::new()
    }
}

impl RngCore for HwRng {
    fn next_u32(&mut self) -> u32 {
        #[cfg(target_os = "espidf")]
        {
            // SAFETY: esp_random reads a hardware register; callable from any task.
            unsafe { esp_idf_svc::sys::esp_random() }
        }

        #[cfg(not(target_os = "espidf"))]
        {
            self.inner.next_u32()
        }
    }

    fn next_u64(&mut self) -> u64 {
        (u64::from(self.next_u32()) << 32) | u64::from(self.next_u32())
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        for chunk in dest.chunks_mut(4) {
            let word = self.next_u32().to_le_bytes();
            chunk.copy_from_slice(&word[..chunk.len()]);
        }
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), Error> {
        self.fill_bytes(dest);
        Ok(())
    }
}
