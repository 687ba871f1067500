/// Board transformations shared by the repository (authoritative write) and
/// the view-model (optimistic overlay).
use crate::error::BoardError;
use crate::types::{Board, Card, CardId, Column, ColumnId};

#[derive(Debug, Clone, PartialEq)]
pub enum Mutation {
    /// Insert a new card at the top of the backlog, or replace an existing card's value.
    Upsert(Card),
    /// Remove a card from the board. Unknown ids are a no-op.
    Delete(CardId),
    /// Move the id at `source_index` of `source` to `dest_index` of `dest`.
    Move {
        source: ColumnId,
        dest: ColumnId,
        source_index: usize,
        dest_index: usize,
    },
}

impl Mutation {
    /// Short name for log lines.
    pub fn kind(&self) -> &'static str {
        match self {
            Mutation::Upsert(_) => "upsert",
            Mutation::Delete(_) => "delete",
            Mutation::Move { .. } => "move",
        }
    }

    /// Checks that must pass before a mutation is issued at all.
    pub fn validate(&self) -> Result<(), BoardError> {
        match self {
            Mutation::Upsert(card) => card.validate(),
            Mutation::Delete(_) | Mutation::Move { .. } => Ok(()),
        }
    }

    /// Apply to `board` in place. Returns whether anything changed.
    /// On error the board is left untouched.
    pub fn apply(&self, board: &mut Board) -> Result<bool, BoardError> {
        match self {
            Mutation::Upsert(card) => Ok(upsert(board, card)),
            Mutation::Delete(id) => Ok(delete(board, id)),
            Mutation::Move {
                source,
                dest,
                source_index,
                dest_index,
            } => move_card(board, *source, *dest, *source_index, *dest_index),
        }
    }
}

fn upsert(board: &mut Board, card: &Card) -> bool {
    match board.items.get(&card.id) {
        Some(existing) if existing == card => false,
        Some(_) => {
            board.items.insert(card.id.clone(), card.clone());
            true
        }
        None => {
            board
                .columns
                .entry(ColumnId::Backlog)
                .or_insert_with(|| Column::new(ColumnId::Backlog))
                .item_ids
                .insert(0, card.id.clone());
            board.items.insert(card.id.clone(), card.clone());
            true
        }
    }
}

fn delete(board: &mut Board, id: &str) -> bool {
    let mut changed = board.items.remove(id).is_some();
    for col in board.columns.values_mut() {
        let before = col.item_ids.len();
        col.item_ids.retain(|x| x != id);
        changed |= col.item_ids.len() != before;
    }
    changed
}

fn move_card(
    board: &mut Board,
    source: ColumnId,
    dest: ColumnId,
    source_index: usize,
    dest_index: usize,
) -> Result<bool, BoardError> {
    let source_len = board.column(source).map_or(0, |c| c.item_ids.len());
    if source_index >= source_len {
        return Err(BoardError::IndexOutOfRange {
            column: source,
            index: source_index,
            len: source_len,
        });
    }

    // Insertion bound is measured after the removal.
    let dest_len = if source == dest {
        source_len - 1
    } else {
        board.column(dest).map_or(0, |c| c.item_ids.len())
    };
    if dest_index > dest_len {
        return Err(BoardError::IndexOutOfRange {
            column: dest,
            index: dest_index,
            len: dest_len,
        });
    }

    if source == dest && source_index == dest_index {
        return Ok(false);
    }

    let id = match board.column_mut(source) {
        Some(col) => col.item_ids.remove(source_index),
        None => return Ok(false),
    };
    board
        .columns
        .entry(dest)
        .or_insert_with(|| Column::new(dest))
        .item_ids
        .insert(dest_index, id);
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seed::seed_board;
    use crate::types::{Category, Level};

    fn card(id: &str) -> Card {
        Card {
            id: id.to_string(),
            title: format!("Card {}", id),
            category: Category::UiArchitecture,
            level: Level::Intermediate,
            description: None,
            resources: None,
            portfolio: None,
        }
    }

    fn board_with(backlog: &[&str], in_progress: &[&str]) -> Board {
        let mut board = Board::empty();
        for (col, ids) in [(ColumnId::Backlog, backlog), (ColumnId::InProgress, in_progress)] {
            for id in ids {
                board.items.insert(id.to_string(), card(id));
                board.column_mut(col).unwrap().item_ids.push(id.to_string());
            }
        }
        board
    }

    fn ids(board: &Board, col: ColumnId) -> Vec<&str> {
        board
            .column(col)
            .unwrap()
            .item_ids
            .iter()
            .map(String::as_str)
            .collect()
    }

    #[test]
    fn test_reorder_within_column() {
        let mut board = board_with(&["a", "b", "c"], &[]);
        let m = Mutation::Move {
            source: ColumnId::Backlog,
            dest: ColumnId::Backlog,
            source_index: 0,
            dest_index: 2,
        };
        assert!(m.apply(&mut board).unwrap());
        assert_eq!(ids(&board, ColumnId::Backlog), vec!["b", "c", "a"]);
    }

    #[test]
    fn test_move_across_columns() {
        let mut board = board_with(&["a", "b"], &[]);
        let m = Mutation::Move {
            source: ColumnId::Backlog,
            dest: ColumnId::InProgress,
            source_index: 1,
            dest_index: 0,
        };
        assert!(m.apply(&mut board).unwrap());
        assert_eq!(ids(&board, ColumnId::Backlog), vec!["a"]);
        assert_eq!(ids(&board, ColumnId::InProgress), vec!["b"]);
        assert!(board.check_integrity().is_ok());
    }

    #[test]
    fn test_move_to_same_slot_is_noop() {
        let mut board = board_with(&["a", "b"], &[]);
        let before = board.clone();
        let m = Mutation::Move {
            source: ColumnId::Backlog,
            dest: ColumnId::Backlog,
            source_index: 1,
            dest_index: 1,
        };
        assert!(!m.apply(&mut board).unwrap());
        assert_eq!(board, before);
    }

    #[test]
    fn test_move_out_of_range_leaves_board_untouched() {
        let mut board = board_with(&["a", "b"], &["c"]);
        let before = board.clone();

        let bad_source = Mutation::Move {
            source: ColumnId::Backlog,
            dest: ColumnId::Done,
            source_index: 2,
            dest_index: 0,
        };
        assert!(matches!(
            bad_source.apply(&mut board),
            Err(BoardError::IndexOutOfRange { column: ColumnId::Backlog, index: 2, len: 2 })
        ));

        let bad_dest = Mutation::Move {
            source: ColumnId::Backlog,
            dest: ColumnId::InProgress,
            source_index: 0,
            dest_index: 2,
        };
        assert!(matches!(
            bad_dest.apply(&mut board),
            Err(BoardError::IndexOutOfRange { column: ColumnId::InProgress, index: 2, len: 1 })
        ));

        // Same column: only len - 1 slots remain after the removal
        let bad_reorder = Mutation::Move {
            source: ColumnId::Backlog,
            dest: ColumnId::Backlog,
            source_index: 0,
            dest_index: 2,
        };
        assert!(bad_reorder.apply(&mut board).is_err());
        assert_eq!(board, before);
    }

    #[test]
    fn test_move_to_end_of_other_column() {
        let mut board = board_with(&["a"], &["b", "c"]);
        let m = Mutation::Move {
            source: ColumnId::Backlog,
            dest: ColumnId::InProgress,
            source_index: 0,
            dest_index: 2,
        };
        m.apply(&mut board).unwrap();
        assert_eq!(ids(&board, ColumnId::InProgress), vec!["b", "c", "a"]);
        assert!(ids(&board, ColumnId::Backlog).is_empty());
    }

    #[test]
    fn test_upsert_new_card_prepends_to_backlog() {
        let mut board = board_with(&["a"], &["b"]);
        assert!(Mutation::Upsert(card("new")).apply(&mut board).unwrap());
        assert_eq!(ids(&board, ColumnId::Backlog), vec!["new", "a"]);
        assert_eq!(ids(&board, ColumnId::InProgress), vec!["b"]);
        assert_eq!(board.items["new"], card("new"));
    }

    #[test]
    fn test_upsert_existing_card_keeps_membership() {
        let mut board = board_with(&["a"], &["b"]);
        let mut edited = card("b");
        edited.title = "Renamed".to_string();
        edited.level = Level::Architect;

        assert!(Mutation::Upsert(edited.clone()).apply(&mut board).unwrap());
        assert_eq!(ids(&board, ColumnId::Backlog), vec!["a"]);
        assert_eq!(ids(&board, ColumnId::InProgress), vec!["b"]);
        assert_eq!(board.items["b"], edited);

        assert!(!Mutation::Upsert(edited).apply(&mut board).unwrap());
    }

    #[test]
    fn test_delete_is_idempotent() {
        let mut board = board_with(&["a", "b"], &["c"]);
        assert!(Mutation::Delete("b".to_string()).apply(&mut board).unwrap());
        let once = board.clone();
        assert!(!Mutation::Delete("b".to_string()).apply(&mut board).unwrap());
        assert_eq!(board, once);
        assert_eq!(ids(&board, ColumnId::Backlog), vec!["a"]);
        assert!(!board.contains_card("b"));
    }

    #[test]
    fn test_validate_rejects_blank_title() {
        let mut c = card("x");
        c.title = String::new();
        assert!(matches!(
            Mutation::Upsert(c).validate(),
            Err(BoardError::Validation(_))
        ));
        assert!(Mutation::Delete("x".to_string()).validate().is_ok());
    }

    #[test]
    fn test_sequence_preserves_integrity() {
        let mut board = seed_board();
        let steps = vec![
            Mutation::Upsert(card("n1")),
            Mutation::Move {
                source: ColumnId::Backlog,
                dest: ColumnId::Done,
                source_index: 0,
                dest_index: 0,
            },
            Mutation::Move {
                source: ColumnId::Backlog,
                dest: ColumnId::InProgress,
                source_index: 3,
                dest_index: 0,
            },
            Mutation::Delete("m1-acc".to_string()),
            Mutation::Upsert(card("n2")),
            Mutation::Delete("n1".to_string()),
            Mutation::Delete("missing".to_string()),
        ];
        for step in &steps {
            step.apply(&mut board).unwrap();
            assert!(board.check_integrity().is_ok(), "after {}", step.kind());
        }
        assert!(ids(&board, ColumnId::Done).is_empty());
        assert_eq!(ids(&board, ColumnId::Backlog)[0], "n2");
    }
}
