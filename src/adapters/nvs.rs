//! NVS (Non-Volatile Storage) adapter.
//!
//! Implements [`KeyValueStore`] over one NVS namespace.  On ESP-IDF the
//! namespace handle is opened once and kept for the life of the adapter;
//! on host a staged/committed pair of maps models `nvs_commit()`.
//!
//! Keys are at most 15 bytes (NVS limit); longer keys are truncated.

use crate::app::ports::{KeyValueStore, StorageError};
use log::info;

#[cfg(not(target_os = "espidf"))]
use std::collections::HashMap;

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;
#[cfg(target_os = "espidf")]
use log::warn;

/// Namespace holding the lamp state.
pub const NAMESPACE: &str = "ShellHome";

#[cfg(not(target_os = "espidf"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stored {
    U8(u8),
    U16(u16),
}

pub struct NvsAdapter {
    #[cfg(target_os = "espidf")]
    handle: nvs_handle_t,
    #[cfg(not(target_os = "espidf"))]
    committed: HashMap<String, Stored>,
    #[cfg(not(target_os = "espidf"))]
    staged: HashMap<String, Stored>,
}

impl NvsAdapter {
    /// Initialise NVS flash and open `namespace` read-write.
    ///
    /// On first boot or after a version mismatch the NVS partition is erased
    /// and re-initialised automatically.
    pub fn new(namespace: &'static str) -> Result<Self, StorageError> {
        #[cfg(target_os = "espidf")]
        {
            // SAFETY: nvs_flash_init / nvs_flash_erase are called from the
            // single main-task context before any concurrent NVS access.
            let ret = unsafe { nvs_flash_init() };
            if ret == ESP_ERR_NVS_NO_FREE_PAGES || ret == ESP_ERR_NVS_NEW_VERSION_FOUND {
                warn!("NVS: erasing and re-initialising flash partition");
                let ret2 = unsafe { nvs_flash_erase() };
                if ret2 != ESP_OK {
                    return Err(StorageError::IoError(ret2));
                }
                let ret3 = unsafe { nvs_flash_init() };
                if ret3 != ESP_OK {
                    return Err(StorageError::IoError(ret3));
                }
            } else if ret != ESP_OK {
                return Err(StorageError::IoError(ret));
            }

            let ns = Self::c_key(namespace);
            let mut handle: nvs_handle_t = 0;
            // SAFETY: `ns` is a NUL-terminated buffer that outlives the call.
            let ret = unsafe {
                nvs_open(ns.as_ptr() as *const _, nvs_open_mode_t_NVS_READWRITE, &mut handle)
            };
            if ret != ESP_OK {
                return Err(StorageError::IoError(ret));
            }
            info!("NvsAdapter: namespace '{}' open", namespace);
            Ok(Self { handle })
        }

        #[cfg(not(target_os = "espidf"))]
        {
            info!("NvsAdapter: simulation backend ('{}')", namespace);
            Ok(Self {
                committed: HashMap::new(),
                staged: HashMap::new(),
            })
        }
    }

    /// NUL-terminated copy of `key`, truncated to the 15-byte NVS limit.
    #[cfg(target_os = "espidf")]
    fn c_key(key: &str) -> [u8; 16] {
        let mut buf = [0u8; 16];
        let kb = key.as_bytes();
        let kl = kb.len().min(15);
        buf[..kl].copy_from_slice(&kb[..kl]);
        buf
    }

    #[cfg(target_os = "espidf")]
    fn map_err(ret: esp_err_t) -> StorageError {
        match ret {
            ESP_ERR_NVS_NOT_FOUND => StorageError::NotFound,
            ESP_ERR_NVS_NOT_ENOUGH_SPACE => StorageError::Full,
            rc => StorageError::IoError(rc),
        }
    }

    #[cfg(target_os = "espidf")]
    fn check(ret: esp_err_t) -> Result<(), StorageError> {
        if ret == ESP_OK { Ok(()) } else { Err(Self::map_err(ret)) }
    }

    #[cfg(not(target_os = "espidf"))]
    fn host_key(key: &str) -> String {
        key.chars().take(15).collect()
    }

    /// Staged writes shadow committed ones, as NVS does for reads on the same handle.
    #[cfg(not(target_os = "espidf"))]
    fn host_get(&self, key: &str) -> Option<Stored> {
        let key = Self::host_key(key);
        self.staged.get(&key).or_else(|| self.committed.get(&key)).copied()
    }

    /// Whether `key` has been committed (host only; used by tests).
    #[cfg(not(target_os = "espidf"))]
    pub fn is_committed(&self, key: &str) -> bool {
        self.committed.contains_key(&Self::host_key(key))
    }
}

impl KeyValueStore for NvsAdapter {
    fn get_u8(&self, key: &str) -> Result<u8, StorageError> {
        #[cfg(not(target_os = "espidf"))]
        {
            match self.host_get(key) {
                Some(Stored::U8(v)) => Ok(v),
                // NVS keys are typed; a width mismatch reads as absent.
                _ => Err(StorageError::NotFound),
            }
        }

        #[cfg(target_os = "espidf")]
        {
            let k = Self::c_key(key);
            let mut out: u8 = 0;
            // SAFETY: handle is open for the adapter's lifetime; `k` is NUL-terminated.
            Self::check(unsafe { nvs_get_u8(self.handle, k.as_ptr() as *const _, &mut out) })?;
            Ok(out)
        }
    }

    fn get_u16(&self, key: &str) -> Result<u16, StorageError> {
        #[cfg(not(target_os = "espidf"))]
        {
            match self.host_get(key) {
                Some(Stored::U16(v)) => Ok(v),
                _ => Err(StorageError::NotFound),
            }
        }

        #[cfg(target_os = "espidf")]
        {
            let k = Self::c_key(key);
            let mut out: u16 = 0;
            // SAFETY: as in get_u8.
            Self::check(unsafe { nvs_get_u16(self.handle, k.as_ptr() as *const _, &mut out) })?;
            Ok(out)
        }
    }

    fn set_u8(&mut self, key: &str, value: u8) -> Result<(), StorageError> {
        #[cfg(not(target_os = "espidf"))]
        {
            self.staged.insert(Self::host_key(key), Stored::U8(value));
            Ok(())
        }

        #[cfg(target_os = "espidf")]
        {
            let k = Self::c_key(key);
            // SAFETY: as in get_u8.
            Self::check(unsafe { nvs_set_u8(self.handle, k.as_ptr() as *const _, value) })
        }
    }

    fn set_u16(&mut self, key: &str, value: u16) -> Result<(), StorageError> {
        #[cfg(not(target_os = "espidf"))]
        {
            self.staged.insert(Self::host_key(key), Stored::U16(value));
            Ok(())
        }

        #[cfg(target_os = "espidf")]
        {
            let k = Self::c_key(key);
            // SAFETY: as in get_u8.
            Self::check(unsafe { nvs_set_u16(self.handle, k.as_ptr() as *const _, value) })
        }
    }

    fn commit(&mut self) -> Result<(), StorageError> {
        #[cfg(not(target_os = "espidf"))]
        {
            self.committed.extend(self.staged.drain());
            Ok(())
        }

        #[cfg(target_os = "espidf")]
        {
            // SAFETY: handle is open for the adapter's lifetime.
            Self::check(unsafe { nvs_commit(self.handle) })
        }
    }
}

#[cfg(target_os = "espidf")]
impl Drop for NvsAdapter {
    fn drop(&mut self) {
        // SAFETY: handle was opened in new() and is closed exactly once here.
        unsafe { nvs_close(self.handle) };
    }
}
