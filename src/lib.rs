#![doc(test(attr(deny(warnings))))]

//! VaultRise tracks savings goals with their deposit and withdrawal history,
//! persists them in a key-value preference store, derives vault-wide
//! statistics, and hosts a small lane-dodging arcade game.

pub mod cli;
pub mod config;
pub mod errors;
pub mod format;
pub mod forms;
pub mod game;
pub mod goals;
pub mod storage;
pub mod summary;
pub mod time;
pub mod utils;
pub mod vault;

use std::sync::Once;

static INIT_TRACING: Once = Once::new();

/// Initializes global tracing and emits a startup info log.
pub fn init() {
    INIT_TRACING.call_once(|| {
        utils::init_tracing();
        tracing::info!("VaultRise tracing initialized.");
    });
}
