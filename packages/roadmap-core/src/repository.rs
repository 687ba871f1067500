/// Board repository: read-modify-write of the whole snapshot against a
/// `SnapshotStore`, behind simulated network latency.
///
/// Every mutating call holds `write_lock` from the read until the write
/// completes, so two overlapping mutations can never both read the same
/// snapshot and lose one of the updates.
use std::time::Duration;

use tokio::sync::Mutex;

use crate::error::BoardError;
use crate::mutation::Mutation;
use crate::seed::seed_board;
use crate::storage::SnapshotStore;
use crate::types::{Board, Card, ColumnId};

pub const DEFAULT_STORAGE_KEY: &str = "ui-architect-kanban-rq";

/// Simulated round-trip delays.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Latency {
    pub fetch: Duration,
    pub save: Duration,
}

impl Latency {
    pub fn none() -> Self {
        Self {
            fetch: Duration::ZERO,
            save: Duration::ZERO,
        }
    }
}

impl Default for Latency {
    fn default() -> Self {
        Self {
            fetch: Duration::from_millis(300),
            save: Duration::from_millis(200),
        }
    }
}

async fn simulate(delay: Duration) {
    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }
}

pub struct BoardRepository<S: SnapshotStore> {
    store: S,
    key: String,
    latency: Latency,
    write_lock: Mutex<()>,
}

impl<S: SnapshotStore> BoardRepository<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            key: DEFAULT_STORAGE_KEY.to_string(),
            latency: Latency::default(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = key.into();
        self
    }

    pub fn with_latency(mut self, latency: Latency) -> Self {
        self.latency = latency;
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// The stored board, or the seed if nothing is stored.
    pub async fn fetch_board(&self) -> Result<Board, BoardError> {
        simulate(self.latency.fetch).await;
        self.read_snapshot()
    }

    fn read_snapshot(&self) -> Result<Board, BoardError> {
        let Some(raw) = self.store.read(&self.key)? else {
            return Ok(seed_board());
        };
        let board: Board = serde_json::from_str(&raw)?;
        if let Err(e) = board.check_integrity() {
            log::warn!("[roadmap.repository] Stored board is inconsistent: {}", e);
        }
        Ok(board)
    }

    async fn save_board(&self, board: &Board) -> Result<(), BoardError> {
        simulate(self.latency.save).await;
        let raw = serde_json::to_string(board)?;
        self.store.write(&self.key, &raw)?;
        Ok(())
    }

    /// Insert a new card at the top of the backlog, or replace an existing card.
    pub async fn upsert_item(&self, card: Card) -> Result<Board, BoardError> {
        self.apply(&Mutation::Upsert(card)).await
    }

    /// Remove a card everywhere. Unknown ids return the current board unchanged.
    pub async fn delete_item(&self, id: &str) -> Result<Board, BoardError> {
        self.apply(&Mutation::Delete(id.to_string())).await
    }

    pub async fn move_item(
        &self,
        source: ColumnId,
        dest: ColumnId,
        source_index: usize,
        dest_index: usize,
    ) -> Result<Board, BoardError> {
        self.apply(&Mutation::Move {
            source,
            dest,
            source_index,
            dest_index,
        })
        .await
    }

    /// Read, transform, persist. The version only moves when the board changed.
    pub async fn apply(&self, mutation: &Mutation) -> Result<Board, BoardError> {
        let _guard = self.write_lock.lock().await;

        let mut board = self.fetch_board().await?;
        let changed = mutation.apply(&mut board)?;
        if changed {
            board.version += 1;
        }
        self.save_board(&board).await?;

        log::debug!(
            "[roadmap.repository] Applied {} (changed: {}, version {})",
            mutation.kind(),
            changed,
            board.version
        );
        Ok(board)
    }

    /// Compare-and-swap write of a whole board.
    /// Fails with `Conflict` unless `board.version` matches the stored version.
    pub async fn replace_board(&self, mut board: Board) -> Result<Board, BoardError> {
        let _guard = self.write_lock.lock().await;

        let current = self.fetch_board().await?;
        if current.version != board.version {
            log::warn!(
                "[roadmap.repository] Rejecting stale write (version {}, stored {})",
                board.version,
                current.version
            );
            return Err(BoardError::Conflict {
                expected: board.version,
                found: current.version,
            });
        }

        board.version += 1;
        self.save_board(&board).await?;
        Ok(board)
    }

    /// Forget the stored board. The next fetch returns the seed.
    pub async fn reset(&self) -> Result<Board, BoardError> {
        let _guard = self.write_lock.lock().await;
        self.store.remove(&self.key)?;
        log::info!("[roadmap.repository] Cleared stored board under {}", self.key);
        Ok(seed_board())
    }
}
