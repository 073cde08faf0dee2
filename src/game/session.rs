use std::time::Duration;

use rand::{rngs::StdRng, Rng, SeedableRng};
use tracing::{debug, info};

use super::{
    items::{GameItem, HitBox, ItemKind},
    scheduler::{Scheduler, TaskHandle, VirtualScheduler},
    GameConfig,
};

const LANE_CENTER: f64 = 0.5;
const LANE_MIN: f64 = 0.15;
const LANE_MAX: f64 = 0.85;
const SPAWN_Y: f64 = -0.1;
const DESPAWN_Y: f64 = 1.1;
const PLAYER_HALF_WIDTH: f64 = 0.04;
const PLAYER_TOP: f64 = 0.58;
const PLAYER_SIZE: f64 = 0.08;

const DIAMOND_SCORE: u32 = 50;
const MONEY_BAG_SCORE: u32 = 30;
const MONEY_BAG_BONUS: u32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameState {
    Idle,
    Running,
    GameOver,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Left,
    Right,
}

/// The periodic actions a running game registers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameTask {
    Tick,
    Spawn,
    Difficulty,
}

/// Final numbers handed back to whoever hosted the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameOutcome {
    pub score: u32,
    pub bonus: u32,
    pub level: u32,
    pub elapsed: Duration,
    pub crashed: bool,
}

/// Observable game state, excluding the clock.
#[derive(Debug, Clone, PartialEq)]
pub struct GameSnapshot {
    pub state: GameState,
    pub player_x: f64,
    pub direction: Direction,
    pub items: Vec<GameItem>,
    pub score: u32,
    pub level: u32,
    pub bonus: u32,
    pub tick_period: Duration,
    pub spawn_period: Duration,
}

#[derive(Debug, Clone, Copy, Default)]
struct Handles {
    tick: Option<TaskHandle>,
    spawn: Option<TaskHandle>,
    difficulty: Option<TaskHandle>,
}

pub struct GameSession<S = VirtualScheduler<GameTask>> {
    config: GameConfig,
    scheduler: S,
    rng: StdRng,
    state: GameState,
    player_x: f64,
    direction: Direction,
    items: Vec<GameItem>,
    next_item_id: u64,
    score: u32,
    level: u32,
    bonus: u32,
    tick_period: Duration,
    spawn_period: Duration,
    handles: Handles,
    started_at: Duration,
    ended_at: Option<Duration>,
}

impl GameSession<VirtualScheduler<GameTask>> {
    /// Session on a fresh virtual clock with a reproducible random stream.
    pub fn with_seed(config: GameConfig, seed: u64) -> Self {
        Self::new(config, VirtualScheduler::new(), StdRng::seed_from_u64(seed))
    }
}

impl<S: Scheduler<GameTask>> GameSession<S> {
    pub fn new(config: GameConfig, scheduler: S, rng: StdRng) -> Self {
        let tick_period = config.tick_period();
        let spawn_period = config.spawn_period();
        Self {
            config,
            scheduler,
            rng,
            state: GameState::Idle,
            player_x: LANE_CENTER,
            direction: Direction::Right,
            items: Vec::new(),
            next_item_id: 0,
            score: 0,
            level: 1,
            bonus: 0,
            tick_period,
            spawn_period,
            handles: Handles::default(),
            started_at: Duration::ZERO,
            ended_at: None,
        }
    }

    pub fn state(&self) -> GameState {
        self.state
    }

    pub fn player_position(&self) -> f64 {
        self.player_x
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn items(&self) -> &[GameItem] {
        &self.items
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn bonus(&self) -> u32 {
        self.bonus
    }

    pub fn tick_period(&self) -> Duration {
        self.tick_period
    }

    pub fn spawn_period(&self) -> Duration {
        self.spawn_period
    }

    pub fn now(&self) -> Duration {
        self.scheduler.now()
    }

    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    pub fn snapshot(&self) -> GameSnapshot {
        GameSnapshot {
            state: self.state,
            player_x: self.player_x,
            direction: self.direction,
            items: self.items.clone(),
            score: self.score,
            level: self.level,
            bonus: self.bonus,
            tick_period: self.tick_period,
            spawn_period: self.spawn_period,
        }
    }

    pub fn outcome(&self) -> GameOutcome {
        GameOutcome {
            score: self.score,
            bonus: self.bonus,
            level: self.level,
            elapsed: self
                .ended_at
                .unwrap_or_else(|| self.scheduler.now())
                .saturating_sub(self.started_at),
            crashed: self.state == GameState::GameOver,
        }
    }

    /// Begins a run from Idle. Returns `false` in any other state.
    pub fn start(&mut self) -> bool {
        if self.state != GameState::Idle {
            return false;
        }
        self.begin_run();
        true
    }

    /// Throws away the current run and begins a new one from the starting state.
    pub fn restart(&mut self) {
        self.begin_run();
    }

    /// Cancels every periodic task and returns to Idle with the run's totals.
    pub fn stop(&mut self) -> GameOutcome {
        self.ended_at.get_or_insert(self.scheduler.now());
        let outcome = self.outcome();
        self.cancel_tasks();
        self.state = GameState::Idle;
        debug!("game stopped at score {}", outcome.score);
        outcome
    }

    pub fn move_player(&mut self, direction: Direction) {
        if self.state != GameState::Running {
            return;
        }
        self.direction = direction;
        self.player_x = match direction {
            Direction::Left => (self.player_x - self.config.player_step).max(LANE_MIN),
            Direction::Right => (self.player_x + self.config.player_step).min(LANE_MAX),
        };
    }

    /// Places an item directly, bypassing the spawn roll. Useful for scripted
    /// scenarios.
    pub fn place_item(&mut self, kind: ItemKind, x: f64, y: f64) -> u64 {
        let id = self.next_item_id;
        self.next_item_id += 1;
        self.items.push(GameItem {
            id,
            kind,
            x,
            y,
            active: true,
        });
        id
    }

    /// Runs every task that falls due within the next `elapsed` of clock time.
    pub fn advance(&mut self, elapsed: Duration) {
        let deadline = self.scheduler.now() + elapsed;
        while let Some(task) = self.scheduler.pop_due(deadline) {
            match task {
                GameTask::Tick => self.update_positions(),
                GameTask::Spawn => self.spawn_item(),
                GameTask::Difficulty => self.increase_difficulty(),
            }
        }
        self.scheduler.settle(deadline);
    }

    fn begin_run(&mut self) {
        self.cancel_tasks();
        self.player_x = LANE_CENTER;
        self.direction = Direction::Right;
        self.items.clear();
        self.score = 0;
        self.level = 1;
        self.bonus = 0;
        self.tick_period = self.config.tick_period();
        self.spawn_period = self.config.spawn_period();
        self.started_at = self.scheduler.now();
        self.ended_at = None;
        self.state = GameState::Running;
        self.handles = Handles {
            tick: Some(self.scheduler.schedule_repeating(self.tick_period, GameTask::Tick)),
            spawn: Some(self.scheduler.schedule_repeating(self.spawn_period, GameTask::Spawn)),
            difficulty: Some(
                self.scheduler
                    .schedule_repeating(self.config.difficulty_period(), GameTask::Difficulty),
            ),
        };
        debug!("game run started");
    }

    fn cancel_tasks(&mut self) {
        let handles = std::mem::take(&mut self.handles);
        for handle in [handles.tick, handles.spawn, handles.difficulty]
            .into_iter()
            .flatten()
        {
            self.scheduler.cancel(handle);
        }
    }

    fn player_hit_box(&self) -> HitBox {
        HitBox {
            x: self.player_x - PLAYER_HALF_WIDTH,
            y: PLAYER_TOP,
            width: PLAYER_SIZE,
            height: PLAYER_SIZE,
        }
    }

    fn update_positions(&mut self) {
        for item in self.items.iter_mut() {
            item.y += self.config.fall_step;
        }

        // Every overlap in a tick counts, even alongside a rock.
        let player = self.player_hit_box();
        let mut crashed = false;
        for item in self.items.iter_mut().filter(|item| item.active) {
            if !player.intersects(&item.hit_box()) {
                continue;
            }
            item.active = false;
            match item.kind {
                ItemKind::Diamond => self.score += DIAMOND_SCORE,
                ItemKind::MoneyBag => {
                    self.score += MONEY_BAG_SCORE;
                    self.bonus += MONEY_BAG_BONUS;
                }
                ItemKind::Rock => crashed = true,
            }
        }

        self.items.retain(|item| item.y <= DESPAWN_Y);
        if crashed {
            self.end_run();
        }
    }

    fn end_run(&mut self) {
        self.ended_at = Some(self.scheduler.now());
        self.cancel_tasks();
        self.state = GameState::GameOver;
        info!(
            "game over at level {} with score {} and bonus {}",
            self.level, self.score, self.bonus
        );
    }

    fn spawn_item(&mut self) {
        let x = self.rng.gen_range(LANE_MIN..=LANE_MAX);
        let kind = ItemKind::draw(&mut self.rng);
        self.place_item(kind, x, SPAWN_Y);
    }

    fn increase_difficulty(&mut self) {
        self.level += 1;
        let tick_floor = Duration::from_millis(self.config.tick_floor_ms);
        let spawn_floor = Duration::from_millis(self.config.spawn_floor_ms);
        self.tick_period = self
            .tick_period
            .saturating_sub(Duration::from_millis(self.config.tick_step_ms))
            .max(tick_floor);
        self.spawn_period = self
            .spawn_period
            .saturating_sub(Duration::from_millis(self.config.spawn_step_ms))
            .max(spawn_floor);

        if let Some(handle) = self.handles.tick.take() {
            self.scheduler.cancel(handle);
        }
        if let Some(handle) = self.handles.spawn.take() {
            self.scheduler.cancel(handle);
        }
        self.handles.tick = Some(self.scheduler.schedule_repeating(self.tick_period, GameTask::Tick));
        self.handles.spawn =
            Some(self.scheduler.schedule_repeating(self.spawn_period, GameTask::Spawn));
        debug!(
            "level {}: tick every {:?}, spawn every {:?}",
            self.level, self.tick_period, self.spawn_period
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn running_session() -> GameSession {
        let mut session = GameSession::with_seed(GameConfig::default(), 7);
        assert!(session.start());
        session
    }

    #[test]
    fn fresh_session_is_idle_at_center() {
        let session = GameSession::with_seed(GameConfig::default(), 1);
        assert_eq!(session.state(), GameState::Idle);
        assert_eq!(session.player_position(), 0.5);
        assert_eq!(session.score(), 0);
        assert_eq!(session.level(), 1);
        assert_eq!(session.bonus(), 0);
        assert_eq!(session.scheduler().pending(), 0);
    }

    #[test]
    fn start_registers_three_tasks_once() {
        let mut session = running_session();
        assert_eq!(session.scheduler().pending(), 3);
        assert!(!session.start());
        assert_eq!(session.scheduler().pending(), 3);
    }

    #[test]
    fn player_moves_within_lane_bounds() {
        let mut session = running_session();
        for _ in 0..5 {
            session.move_player(Direction::Left);
        }
        assert!((session.player_position() - 0.15).abs() < 1e-9);
        assert_eq!(session.direction(), Direction::Left);
        for _ in 0..10 {
            session.move_player(Direction::Right);
        }
        assert!((session.player_position() - 0.85).abs() < 1e-9);
    }

    #[test]
    fn moves_are_ignored_while_idle() {
        let mut session = GameSession::with_seed(GameConfig::default(), 1);
        session.move_player(Direction::Left);
        assert_eq!(session.player_position(), 0.5);
    }

    #[test]
    fn diamond_and_money_bag_score() {
        let mut session = running_session();
        session.place_item(ItemKind::Diamond, 0.5, 0.52);
        session.place_item(ItemKind::MoneyBag, 0.52, 0.52);
        session.advance(Duration::from_millis(30));
        assert_eq!(session.score(), 80);
        assert_eq!(session.bonus(), 10);
        assert!(session.items().iter().all(|item| !item.active));

        // Spent items never score twice.
        session.advance(Duration::from_millis(30));
        assert_eq!(session.score(), 80);
    }

    #[test]
    fn prizes_hit_alongside_a_rock_still_score() {
        let mut session = running_session();
        session.place_item(ItemKind::Rock, 0.5, 0.52);
        session.place_item(ItemKind::Diamond, 0.52, 0.52);
        session.place_item(ItemKind::MoneyBag, 0.48, 0.52);
        session.advance(Duration::from_millis(30));
        assert_eq!(session.state(), GameState::GameOver);
        assert_eq!(session.score(), 80);
        assert_eq!(session.bonus(), 10);
        assert!(session.items().iter().all(|item| !item.active));
    }

    #[test]
    fn crashed_run_elapsed_stops_at_the_crash() {
        let mut session = running_session();
        session.advance(Duration::from_millis(60));
        session.place_item(ItemKind::Rock, 0.5, 0.52);
        session.advance(Duration::from_millis(30));
        assert_eq!(session.state(), GameState::GameOver);

        session.advance(Duration::from_secs(5));
        assert_eq!(session.outcome().elapsed, Duration::from_millis(90));
        assert_eq!(session.stop().elapsed, Duration::from_millis(90));

        session.restart();
        session.advance(Duration::from_millis(30));
        assert_eq!(session.outcome().elapsed, Duration::from_millis(30));
    }

    #[test]
    fn items_in_other_lanes_pass_by() {
        let mut session = running_session();
        session.place_item(ItemKind::Rock, 0.2, 0.52);
        session.advance(Duration::from_millis(300));
        assert_eq!(session.state(), GameState::Running);
    }

    #[test]
    fn off_screen_items_are_removed() {
        let mut session = running_session();
        session.place_item(ItemKind::Diamond, 0.15, 1.09);
        session.place_item(ItemKind::Rock, 0.15, 0.2);
        session.advance(Duration::from_millis(30));
        assert_eq!(session.items().len(), 1);
        assert_eq!(session.items()[0].kind, ItemKind::Rock);
    }

    #[test]
    fn spawn_tick_adds_item_in_lane_range() {
        let mut session = running_session();
        session.advance(Duration::from_millis(1_499));
        assert!(session.items().is_empty());
        session.advance(Duration::from_millis(1));
        let spawned: Vec<_> = session.items().to_vec();
        assert_eq!(spawned.len(), 1);
        assert!((0.15..=0.85).contains(&spawned[0].x));
        assert!(spawned[0].y < 0.0);
    }

    #[test]
    fn difficulty_shortens_periods_to_floors() {
        // No spawns inside the window, so nothing can end the run.
        let mut quiet = GameConfig::default();
        quiet.spawn_period_ms = 60_000;
        let mut session = GameSession::with_seed(quiet, 7);
        session.start();
        session.advance(Duration::from_millis(10_000));
        assert_eq!(session.state(), GameState::Running);
        assert_eq!(session.level(), 2);
        assert_eq!(session.tick_period(), Duration::from_millis(27));
        assert_eq!(session.spawn_period(), Duration::from_millis(59_900));

        let mut config = GameConfig::default();
        config.tick_step_ms = 20;
        config.spawn_step_ms = 1_000;
        let mut session = GameSession::with_seed(config, 3);
        session.start();
        for _ in 0..3 {
            session.increase_difficulty();
        }
        assert_eq!(session.level(), 4);
        assert_eq!(session.tick_period(), Duration::from_millis(15));
        assert_eq!(session.spawn_period(), Duration::from_millis(800));
        assert_eq!(session.scheduler().pending(), 3);
    }
}
