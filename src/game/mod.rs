//! Lane-dodging arcade simulation: catch diamonds and money bags, avoid rocks.
//!
//! The simulation is independent of the savings vault. Its three periodic
//! actions run on a [`Scheduler`] so tests can drive it with a virtual clock.

pub mod items;
pub mod scheduler;
pub mod session;

use std::time::Duration;

use serde::{Deserialize, Serialize};

pub use items::{GameItem, HitBox, ItemKind};
pub use scheduler::{Scheduler, TaskHandle, VirtualScheduler};
pub use session::{Direction, GameOutcome, GameSession, GameSnapshot, GameState, GameTask};

/// Timing and movement tunables. Periods are milliseconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub tick_period_ms: u64,
    pub tick_floor_ms: u64,
    pub tick_step_ms: u64,
    pub spawn_period_ms: u64,
    pub spawn_floor_ms: u64,
    pub spawn_step_ms: u64,
    pub difficulty_period_ms: u64,
    /// Vertical distance an item falls per position tick.
    pub fall_step: f64,
    /// Lane change distance per move.
    pub player_step: f64,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            tick_period_ms: 30,
            tick_floor_ms: 15,
            tick_step_ms: 3,
            spawn_period_ms: 1_500,
            spawn_floor_ms: 800,
            spawn_step_ms: 100,
            difficulty_period_ms: 10_000,
            fall_step: 0.015,
            player_step: 0.15,
        }
    }
}

impl GameConfig {
    pub fn tick_period(&self) -> Duration {
        Duration::from_millis(self.tick_period_ms)
    }

    pub fn spawn_period(&self) -> Duration {
        Duration::from_millis(self.spawn_period_ms)
    }

    pub fn difficulty_period(&self) -> Duration {
        Duration::from_millis(self.difficulty_period_ms)
    }
}
