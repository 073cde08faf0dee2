#![allow(dead_code)]

use std::{
    path::{Path, PathBuf},
    sync::Mutex,
};

use chrono::{DateTime, TimeZone, Utc};
use once_cell::sync::Lazy;
use tempfile::TempDir;
use vaultrise::{
    storage::{JsonFilePreferences, MemoryPreferences},
    time::FixedClock,
    utils,
    vault::VaultManager,
};

/// Holds TempDir guards so temporary folders live for the duration of the test run.
static TEST_DIRS: Lazy<Mutex<Vec<TempDir>>> = Lazy::new(|| Mutex::new(Vec::new()));

/// Returns a fresh directory that outlives the calling test.
pub fn temp_home() -> PathBuf {
    let temp = TempDir::new().expect("create temp dir");
    let base = temp.path().to_path_buf();
    TEST_DIRS.lock().expect("lock temp dir registry").push(temp);
    base
}

pub fn fixed_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap()
}

pub fn memory_vault() -> VaultManager {
    VaultManager::open(
        Box::new(MemoryPreferences::new()),
        Box::new(FixedClock(fixed_now())),
    )
}

/// Opens (or reopens) a file-backed vault rooted at `home`.
pub fn file_vault(home: &Path) -> VaultManager {
    let store = JsonFilePreferences::open(utils::preferences_file(home))
        .expect("open preferences file");
    VaultManager::open(Box::new(store), Box::new(FixedClock(fixed_now())))
}
