//! Headless driver for `play`: steers the player on the virtual clock.

use std::time::Duration;

use crate::game::{Direction, GameItem, GameOutcome, GameSession, GameSnapshot, GameState};

const PLAYER_Y: f64 = 0.62;
const LOOKAHEAD: f64 = 0.35;
const DANGER_WIDTH: f64 = 0.1;

/// Runs one game for at most `limit`, stepping one position tick at a time.
pub fn play(session: &mut GameSession, limit: Duration) -> GameOutcome {
    session.restart();
    while session.state() == GameState::Running && session.outcome().elapsed < limit {
        if let Some(direction) = choose_move(&session.snapshot()) {
            session.move_player(direction);
        }
        session.advance(session.tick_period());
    }
    if session.state() == GameState::Running {
        return session.stop();
    }
    session.outcome()
}

/// Dodges the closest incoming rock, otherwise drifts toward the closest prize.
pub fn choose_move(snapshot: &GameSnapshot) -> Option<Direction> {
    let x = snapshot.player_x;
    let incoming =
        |item: &&GameItem| item.active && item.y < PLAYER_Y && PLAYER_Y - item.y < LOOKAHEAD;

    let threat = snapshot
        .items
        .iter()
        .filter(incoming)
        .filter(|item| item.kind.is_obstacle() && (item.x - x).abs() < DANGER_WIDTH)
        .max_by(|a, b| a.y.total_cmp(&b.y));
    if let Some(rock) = threat {
        return Some(if rock.x >= x && x > 0.2 {
            Direction::Left
        } else if x < 0.8 {
            Direction::Right
        } else {
            Direction::Left
        });
    }

    let prize = snapshot
        .items
        .iter()
        .filter(incoming)
        .filter(|item| !item.kind.is_obstacle())
        .max_by(|a, b| a.y.total_cmp(&b.y))?;
    let offset = prize.x - x;
    if offset > 0.075 {
        Some(Direction::Right)
    } else if offset < -0.075 {
        Some(Direction::Left)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::{GameConfig, ItemKind, Scheduler};

    fn snapshot_with(items: Vec<GameItem>) -> GameSnapshot {
        let mut session = GameSession::with_seed(GameConfig::default(), 1);
        session.start();
        let mut snapshot = session.snapshot();
        snapshot.items = items;
        snapshot
    }

    fn item(kind: ItemKind, x: f64, y: f64) -> GameItem {
        GameItem {
            id: 0,
            kind,
            x,
            y,
            active: true,
        }
    }

    #[test]
    fn steps_away_from_incoming_rock() {
        let snapshot = snapshot_with(vec![item(ItemKind::Rock, 0.52, 0.4)]);
        assert_eq!(choose_move(&snapshot), Some(Direction::Left));
    }

    #[test]
    fn drifts_toward_prize() {
        let snapshot = snapshot_with(vec![item(ItemKind::Diamond, 0.8, 0.4)]);
        assert_eq!(choose_move(&snapshot), Some(Direction::Right));
        let aligned = snapshot_with(vec![item(ItemKind::Diamond, 0.5, 0.4)]);
        assert_eq!(choose_move(&aligned), None);
    }

    #[test]
    fn run_ends_within_limit() {
        let mut session = GameSession::with_seed(GameConfig::default(), 11);
        let outcome = play(&mut session, Duration::from_secs(5));
        assert!(outcome.elapsed <= Duration::from_secs(5) + Duration::from_millis(30));
        assert_ne!(session.state(), GameState::Running);
        assert_eq!(session.scheduler().pending(), 0);
    }
}
