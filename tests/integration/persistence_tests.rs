//! Persistence gateway against a shared in-memory store and the host
//! build of the NVS adapter.

use nightlamp::adapters::nvs::NvsAdapter;
use nightlamp::app::persistence::{self, KEY_HUE, KEY_MODE, KEY_SATURATION, KEY_VALUE, PersistedState};
use nightlamp::app::ports::StorageError;
use nightlamp::lamp::{Hsv, LampMode};
use rand::rngs::mock::StepRng;

use super::mock_hw::MockStore;

fn rng() -> StepRng {
    StepRng::new(0, 0)
}

#[test]
fn complete_record_loads_without_writing() {
    let mut store = MockStore::with(&[
        (KEY_MODE, 2),
        (KEY_HUE, 300),
        (KEY_SATURATION, 55),
        (KEY_VALUE, 80),
    ]);

    let loaded = persistence::load(&mut store, &mut rng());

    assert_eq!(loaded.mode, LampMode::Stack);
    assert_eq!(loaded.color, Hsv::new(300, 55, 80));
    assert_eq!(store.commits(), 0);
}

#[test]
fn unknown_mode_byte_falls_back_to_marquee_and_is_rewritten() {
    let mut store = MockStore::with(&[
        (KEY_MODE, 9),
        (KEY_HUE, 10),
        (KEY_SATURATION, 90),
        (KEY_VALUE, 70),
    ]);

    let loaded = persistence::load(&mut store, &mut rng());

    assert_eq!(loaded.mode, LampMode::Marquee);
    assert_eq!(store.committed(KEY_MODE), Some(0));
    assert_eq!(loaded.color, Hsv::new(10, 90, 70));
}

#[test]
fn missing_saturation_and_value_default_to_full() {
    let mut store = MockStore::with(&[(KEY_MODE, 3), (KEY_HUE, 42)]);

    let loaded = persistence::load(&mut store, &mut rng());

    assert_eq!(loaded.mode, LampMode::Fixed);
    assert_eq!(loaded.color, Hsv::new(42, 100, 100));
    assert_eq!(store.committed(KEY_SATURATION), Some(100));
    assert_eq!(store.committed(KEY_VALUE), Some(100));
}

#[test]
fn out_of_range_values_are_normalised() {
    let mut store = MockStore::with(&[
        (KEY_MODE, 1),
        (KEY_HUE, 400),
        (KEY_SATURATION, 150),
        (KEY_VALUE, 101),
    ]);

    let loaded = persistence::load(&mut store, &mut rng());

    assert_eq!(loaded.color, Hsv::new(40, 100, 100));
}

#[test]
fn write_back_failure_still_yields_defaults() {
    let mut store = MockStore::new();
    store.fail_writes(Some(StorageError::IoError(-1)));

    let loaded = persistence::load(&mut store, &mut rng());

    assert_eq!(loaded.mode, LampMode::Marquee);
    assert_eq!(loaded.color, Hsv::new(0, 100, 100));
    assert_eq!(store.committed(KEY_MODE), None);
}

#[test]
fn transient_hue_read_error_keeps_stored_record() {
    let mut store = MockStore::with(&[
        (KEY_MODE, 3),
        (KEY_HUE, 123),
        (KEY_SATURATION, 50),
        (KEY_VALUE, 60),
    ]);
    store.fail_next_read(KEY_HUE, StorageError::IoError(-1));

    let loaded = persistence::load(&mut store, &mut rng());

    assert_eq!(loaded.mode, LampMode::Fixed);
    assert_eq!(loaded.color, Hsv::new(0, 50, 60), "random hue used in memory");
    assert_eq!(store.committed(KEY_HUE), Some(123));
    assert_eq!(store.commits(), 0);

    // The next boot reads the untouched record.
    let reloaded = persistence::load(&mut store, &mut rng());
    assert_eq!(reloaded.color, Hsv::new(123, 50, 60));
}

#[test]
fn transient_mode_read_error_is_not_written_back() {
    let mut store = MockStore::with(&[
        (KEY_MODE, 1),
        (KEY_HUE, 10),
        (KEY_SATURATION, 90),
        (KEY_VALUE, 70),
    ]);
    store.fail_next_read(KEY_MODE, StorageError::IoError(-1));

    let loaded = persistence::load(&mut store, &mut rng());

    assert_eq!(loaded.mode, LampMode::Marquee);
    assert_eq!(store.committed(KEY_MODE), Some(1));
    assert_eq!(store.commits(), 0);
}

#[test]
fn unreadable_field_blocks_colour_write_back_of_missing_ones() {
    let mut store = MockStore::with(&[(KEY_MODE, 3), (KEY_HUE, 42)]);
    store.fail_next_read(KEY_HUE, StorageError::IoError(-1));

    let loaded = persistence::load(&mut store, &mut rng());

    assert_eq!(loaded.color, Hsv::new(0, 100, 100));
    assert_eq!(store.committed(KEY_HUE), Some(42));
    assert_eq!(store.committed(KEY_SATURATION), None);
    assert_eq!(store.commits(), 0);
}

#[test]
fn nvs_adapter_round_trip() {
    let mut nvs = NvsAdapter::new("lamp-test").unwrap();
    let state = PersistedState {
        mode: LampMode::Breath,
        color: Hsv::new(359, 40, 100),
    };

    persistence::save(&mut nvs, state).unwrap();

    assert!(nvs.is_committed(KEY_MODE));
    assert!(nvs.is_committed(KEY_VALUE));
    assert_eq!(persistence::load(&mut nvs, &mut rng()), state);
}
