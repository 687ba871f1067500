/// Board view-model: confirmed snapshot plus an optimistic overlay.
///
/// The displayed board is always the confirmed board with every in-flight
/// mutation replayed on top, in invocation order. Settling a mutation drops
/// it from the pending log: on success the repository's board becomes the
/// confirmed one, on failure the mutation simply disappears from the replay.
/// A failed mutation therefore never discards edits that started after it.
///
/// Repository writes, their settlement and refresh adoption all run under
/// `commit_lock`, so a fetched board never contains a write whose mutation
/// is still in the pending log.
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use tokio::sync::{watch, Mutex as AsyncMutex};

use crate::error::BoardError;
use crate::filter::filter_board;
use crate::mutation::Mutation;
use crate::repository::BoardRepository;
use crate::storage::SnapshotStore;
use crate::types::{Board, Card, ColumnId};

/// Recent mutations kept for status display.
const RECORD_LIMIT: usize = 32;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadStatus {
    Loading,
    Ready,
    Failed(String),
}

/// Lifecycle of one mutation: `Idle -> Optimistic -> {Committed | RolledBack}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationPhase {
    Idle,
    Optimistic,
    Committed,
    RolledBack,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MutationRecord {
    pub ticket: u64,
    pub kind: &'static str,
    pub phase: MutationPhase,
}

/// Where a drag started or ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DragLocation {
    pub column: ColumnId,
    pub index: usize,
}

struct PendingMutation {
    ticket: u64,
    mutation: Mutation,
}

struct ViewState {
    status: LoadStatus,
    confirmed: Option<Board>,
    displayed: Option<Board>,
    pending: Vec<PendingMutation>,
    query: String,
    last_error: Option<String>,
    records: VecDeque<MutationRecord>,
}

impl ViewState {
    /// Adopt a board from the repository unless it is older than what we have.
    fn adopt(&mut self, board: Board) {
        let newer = self
            .confirmed
            .as_ref()
            .map_or(true, |current| board.version >= current.version);
        if newer {
            self.confirmed = Some(board);
        }
    }

    /// displayed = confirmed + pending, replayed in order.
    fn recompute(&mut self) {
        let Some(confirmed) = &self.confirmed else {
            self.displayed = None;
            return;
        };
        let mut board = confirmed.clone();
        for p in &self.pending {
            if let Err(e) = p.mutation.apply(&mut board) {
                log::debug!(
                    "[roadmap.view_model] Pending {} #{} no longer applies: {}",
                    p.mutation.kind(),
                    p.ticket,
                    e
                );
            }
        }
        self.displayed = Some(board);
    }

    fn record(&mut self, ticket: u64, kind: &'static str, phase: MutationPhase) {
        log::debug!("[roadmap.view_model] {} #{} -> {:?}", kind, ticket, phase);
        if let Some(existing) = self.records.iter_mut().find(|r| r.ticket == ticket) {
            existing.phase = phase;
            return;
        }
        if self.records.len() == RECORD_LIMIT {
            self.records.pop_front();
        }
        self.records.push_back(MutationRecord { ticket, kind, phase });
    }
}

pub struct BoardViewModel<S: SnapshotStore> {
    repo: Arc<BoardRepository<S>>,
    state: Mutex<ViewState>,
    next_ticket: AtomicU64,
    displayed_tx: watch::Sender<Option<Board>>,
    /// Serializes repository writes with their settlement and with refreshes
    commit_lock: AsyncMutex<()>,
}

impl<S: SnapshotStore> BoardViewModel<S> {
    pub fn new(repo: Arc<BoardRepository<S>>) -> Self {
        let (displayed_tx, _) = watch::channel(None);
        Self {
            repo,
            state: Mutex::new(ViewState {
                status: LoadStatus::Loading,
                confirmed: None,
                displayed: None,
                pending: Vec::new(),
                query: String::new(),
                last_error: None,
                records: VecDeque::new(),
            }),
            next_ticket: AtomicU64::new(1),
            displayed_tx,
            commit_lock: AsyncMutex::new(()),
        }
    }

    pub fn repository(&self) -> &Arc<BoardRepository<S>> {
        &self.repo
    }

    /// Receiver that always holds the latest displayed board.
    pub fn subscribe(&self) -> watch::Receiver<Option<Board>> {
        self.displayed_tx.subscribe()
    }

    fn publish(&self, state: &ViewState) {
        self.displayed_tx.send_replace(state.displayed.clone());
    }

    pub fn status(&self) -> LoadStatus {
        self.state.lock().unwrap().status.clone()
    }

    /// Board as displayed, optimistic edits included.
    pub fn board(&self) -> Option<Board> {
        self.state.lock().unwrap().displayed.clone()
    }

    /// Last board confirmed by the repository.
    pub fn confirmed(&self) -> Option<Board> {
        self.state.lock().unwrap().confirmed.clone()
    }

    /// Displayed board with the filter query applied.
    pub fn visible_board(&self) -> Option<Board> {
        let state = self.state.lock().unwrap();
        state
            .displayed
            .as_ref()
            .map(|board| filter_board(board, &state.query).into_owned())
    }

    pub fn filter_query(&self) -> String {
        self.state.lock().unwrap().query.clone()
    }

    pub fn set_filter_query(&self, text: &str) {
        self.state.lock().unwrap().query = text.to_string();
    }

    pub fn last_error(&self) -> Option<String> {
        self.state.lock().unwrap().last_error.clone()
    }

    pub fn pending_count(&self) -> usize {
        self.state.lock().unwrap().pending.len()
    }

    /// Most recent mutations, oldest first.
    pub fn records(&self) -> Vec<MutationRecord> {
        self.state.lock().unwrap().records.iter().cloned().collect()
    }

    /// Initial fetch.
    pub async fn load(&self) -> Result<Board, BoardError> {
        self.state.lock().unwrap().status = LoadStatus::Loading;

        let _commit = self.commit_lock.lock().await;
        let result = self.repo.fetch_board().await;

        let mut state = self.state.lock().unwrap();
        match &result {
            Ok(board) => {
                state.adopt(board.clone());
                state.status = LoadStatus::Ready;
                state.recompute();
                self.publish(&state);
            }
            Err(e) => {
                log::warn!("[roadmap.view_model] Failed to load board: {}", e);
                state.status = LoadStatus::Failed(e.to_string());
            }
        }
        result
    }

    async fn ensure_loaded(&self) -> Result<(), BoardError> {
        let loaded = self.state.lock().unwrap().confirmed.is_some();
        if !loaded {
            self.load().await?;
        }
        Ok(())
    }

    /// Refetch the confirmed board. Failures are logged, not surfaced.
    pub async fn invalidate(&self) {
        let _commit = self.commit_lock.lock().await;
        match self.repo.fetch_board().await {
            Ok(board) => {
                let mut state = self.state.lock().unwrap();
                state.adopt(board);
                state.status = LoadStatus::Ready;
                state.recompute();
                self.publish(&state);
            }
            Err(e) => log::warn!("[roadmap.view_model] Refresh failed: {}", e),
        }
    }

    async fn mutate(&self, mutation: Mutation) -> Result<Board, BoardError> {
        mutation.validate()?;
        self.ensure_loaded().await?;

        let kind = mutation.kind();
        let ticket = self.next_ticket.fetch_add(1, Ordering::Relaxed);
        {
            let mut state = self.state.lock().unwrap();
            state.record(ticket, kind, MutationPhase::Idle);

            let mut optimistic = state.displayed.clone().unwrap_or_default();
            if let Err(e) = mutation.apply(&mut optimistic) {
                state.record(ticket, kind, MutationPhase::RolledBack);
                state.last_error = Some(e.to_string());
                return Err(e);
            }
            state.pending.push(PendingMutation {
                ticket,
                mutation: mutation.clone(),
            });
            state.displayed = Some(optimistic);
            state.record(ticket, kind, MutationPhase::Optimistic);
            self.publish(&state);
        }

        let commit = self.commit_lock.lock().await;
        let result = self.repo.apply(&mutation).await;

        {
            let mut state = self.state.lock().unwrap();
            state.pending.retain(|p| p.ticket != ticket);
            match &result {
                Ok(board) => {
                    state.adopt(board.clone());
                    state.record(ticket, kind, MutationPhase::Committed);
                }
                Err(e) => {
                    log::warn!("[roadmap.view_model] {} #{} rolled back: {}", kind, ticket, e);
                    state.last_error = Some(e.to_string());
                    state.record(ticket, kind, MutationPhase::RolledBack);
                }
            }
            state.recompute();
            self.publish(&state);
        }
        drop(commit);

        self.invalidate().await;
        result
    }

    /// Save a card from the "new" editor.
    pub async fn create(&self, card: Card) -> Result<Board, BoardError> {
        self.mutate(Mutation::Upsert(card)).await
    }

    /// Save a card from the "edit" editor. Column membership is kept.
    pub async fn update(&self, card: Card) -> Result<Board, BoardError> {
        self.mutate(Mutation::Upsert(card)).await
    }

    pub async fn delete(&self, id: &str) -> Result<Board, BoardError> {
        self.mutate(Mutation::Delete(id.to_string())).await
    }

    pub async fn move_item(
        &self,
        source: ColumnId,
        dest: ColumnId,
        source_index: usize,
        dest_index: usize,
    ) -> Result<Board, BoardError> {
        self.mutate(Mutation::Move {
            source,
            dest,
            source_index,
            dest_index,
        })
        .await
    }

    /// Drag-end from the presentation layer. Drops outside a column and drops
    /// onto the starting slot do nothing and return `Ok(None)`.
    pub async fn on_drag_end(
        &self,
        source: DragLocation,
        destination: Option<DragLocation>,
    ) -> Result<Option<Board>, BoardError> {
        let Some(dest) = destination else {
            return Ok(None);
        };
        if dest == source {
            return Ok(None);
        }
        self.move_item(source.column, dest.column, source.index, dest.index)
            .await
            .map(Some)
    }

    /// Clear persisted state, reload the seed and clear the filter query.
    pub async fn reset(&self) -> Result<Board, BoardError> {
        let commit = self.commit_lock.lock().await;
        let board = self.repo.reset().await?;
        {
            let mut state = self.state.lock().unwrap();
            state.confirmed = Some(board.clone());
            state.query.clear();
            state.last_error = None;
            state.status = LoadStatus::Ready;
            state.recompute();
            self.publish(&state);
        }
        drop(commit);
        log::info!("[roadmap.view_model] Board reset to seed");
        self.invalidate().await;
        Ok(board)
    }
}
