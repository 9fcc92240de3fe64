//! Registry of in-flight matches for a multi-game host.
//!
//! Each match sits behind its own mutex, so actions on one game are applied
//! one at a time while separate games proceed in parallel. Matches are
//! dropped as soon as they are won, tied or abandoned.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock};

use serde::Serialize;
use tracing::info;

use crate::error::SessionError;
use crate::game::{GridSnapshot, PlayerId};
use crate::session::{Action, GameSettings, Match, Status, Turn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct GameId(pub u64);

impl std::fmt::Display for GameId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

type SharedMatch = Arc<Mutex<Match>>;

// A match is only mutated through `Match::act`, which validates before it
// mutates, so a poisoned lock still guards a consistent game.
fn lock(game: &SharedMatch) -> MutexGuard<'_, Match> {
    game.lock().unwrap_or_else(PoisonError::into_inner)
}

#[derive(Debug, Default)]
pub struct GameRegistry {
    games: RwLock<HashMap<GameId, SharedMatch>>,
    next_id: AtomicU64,
}

impl GameRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a new match and return its id.
    pub fn start(
        &self,
        challenger: PlayerId,
        opponent: PlayerId,
        settings: GameSettings,
    ) -> Result<GameId, SessionError> {
        let game = Match::challenge(challenger, opponent, settings)?;
        let id = GameId(self.next_id.fetch_add(1, Ordering::Relaxed) + 1);

        self.games
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id, Arc::new(Mutex::new(game)));
        info!(game = %id, "game registered");
        Ok(id)
    }

    fn get(&self, id: GameId) -> Result<SharedMatch, SessionError> {
        self.games
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&id)
            .cloned()
            .ok_or(SessionError::GameNotFound(id.0))
    }

    fn remove(&self, id: GameId) -> Option<SharedMatch> {
        self.games
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&id)
    }

    /// Apply an action to a match. A match that ends with this action is
    /// removed from the registry.
    pub fn act(&self, id: GameId, user: PlayerId, action: Action) -> Result<Turn, SessionError> {
        let game = self.get(id)?;
        let turn = lock(&game).act(user, action)?;

        if turn.status.is_over() && self.remove(id).is_some() {
            info!(game = %id, status = ?turn.status, "game concluded");
        }
        Ok(turn)
    }

    pub fn status(&self, id: GameId) -> Result<Status, SessionError> {
        let game = self.get(id)?;
        let status = lock(&game).status();
        Ok(status)
    }

    pub fn snapshot(&self, id: GameId) -> Result<GridSnapshot, SessionError> {
        let game = self.get(id)?;
        let grid = lock(&game).grid();
        Ok(grid)
    }

    /// Drop a match that nobody is going to finish.
    pub fn abandon(&self, id: GameId) -> Result<(), SessionError> {
        self.remove(id).ok_or(SessionError::GameNotFound(id.0))?;
        info!(game = %id, "game abandoned");
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.games.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::Cell;

    const A: PlayerId = PlayerId(1);
    const B: PlayerId = PlayerId(2);

    #[test]
    fn test_start_assigns_distinct_ids() {
        let registry = GameRegistry::new();
        let first = registry.start(A, B, GameSettings::default()).unwrap();
        let second = registry.start(B, A, GameSettings::default()).unwrap();

        assert_ne!(first, second);
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.status(second).unwrap(), Status::InProgress { current: B });
    }

    #[test]
    fn test_start_rejects_self_challenge() {
        let registry = GameRegistry::new();
        assert_eq!(
            registry.start(A, A, GameSettings::default()),
            Err(SessionError::SelfChallenge)
        );
        assert!(registry.is_empty());
    }

    #[test]
    fn test_act_updates_snapshot() {
        let registry = GameRegistry::new();
        let id = registry.start(A, B, GameSettings::default()).unwrap();

        registry.act(id, A, Action::Place(2)).unwrap();
        assert_eq!(registry.snapshot(id).unwrap().get(5, 2), Cell::PlayerA);
    }

    #[test]
    fn test_concluded_game_is_removed() {
        let registry = GameRegistry::new();
        let id = registry.start(A, B, GameSettings::default()).unwrap();

        for (user, col) in [(A, 3), (B, 2), (A, 3), (B, 2), (A, 3), (B, 2)] {
            registry.act(id, user, Action::Place(col)).unwrap();
        }
        let turn = registry.act(id, A, Action::Place(3)).unwrap();

        assert_eq!(turn.status, Status::Won { winner: A });
        assert!(registry.is_empty());
        assert_eq!(
            registry.act(id, B, Action::Place(0)),
            Err(SessionError::GameNotFound(id.0))
        );
    }

    #[test]
    fn test_abandon() {
        let registry = GameRegistry::new();
        let id = registry.start(A, B, GameSettings::default()).unwrap();

        registry.abandon(id).unwrap();
        assert!(registry.is_empty());
        assert_eq!(registry.abandon(id), Err(SessionError::GameNotFound(id.0)));
    }

    #[test]
    fn test_games_played_from_many_threads() {
        let registry = GameRegistry::new();
        let ids: Vec<GameId> = (0..8)
            .map(|i| {
                registry
                    .start(PlayerId(100 + i), PlayerId(200 + i), GameSettings::default())
                    .unwrap()
            })
            .collect();

        std::thread::scope(|s| {
            for (i, &id) in ids.iter().enumerate() {
                let registry = &registry;
                s.spawn(move || {
                    let a = PlayerId(100 + i as u64);
                    let b = PlayerId(200 + i as u64);
                    // Six turns: too few for anyone to connect four.
                    for col in 0..3 {
                        registry.act(id, a, Action::Place(col)).unwrap();
                        registry.act(id, b, Action::Place(col)).unwrap();
                    }
                });
            }
        });

        assert_eq!(registry.len(), 8);
        for id in ids {
            let grid = registry.snapshot(id).unwrap();
            assert_eq!(grid.get(5, 0), Cell::PlayerA);
            assert_eq!(grid.get(4, 0), Cell::PlayerB);
        }
    }
}
