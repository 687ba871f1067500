use std::borrow::Cow;
use std::collections::BTreeMap;

use crate::types::{Board, Card, Column};

/// Case-insensitive containment against title, description, category and level.
/// `needle` must already be lowercased.
pub fn card_matches(card: &Card, needle: &str) -> bool {
    card.title.to_lowercase().contains(needle)
        || card
            .description
            .as_deref()
            .unwrap_or_default()
            .to_lowercase()
            .contains(needle)
        || card.category.label().to_lowercase().contains(needle)
        || card.level.label().to_lowercase().contains(needle)
}

/// Board restricted to cards matching `query`, column order preserved.
/// A blank query borrows the input unchanged. Otherwise the query is matched
/// as typed, surrounding whitespace included.
pub fn filter_board<'a>(board: &'a Board, query: &str) -> Cow<'a, Board> {
    if query.trim().is_empty() {
        return Cow::Borrowed(board);
    }
    let needle = query.to_lowercase();

    let items: BTreeMap<_, _> = board
        .items
        .iter()
        .filter(|(_, card)| card_matches(card, &needle))
        .map(|(id, card)| (id.clone(), card.clone()))
        .collect();

    let columns = board
        .columns
        .iter()
        .map(|(id, col)| {
            let item_ids = col
                .item_ids
                .iter()
                .filter(|x| items.contains_key(*x))
                .cloned()
                .collect();
            let filtered = Column {
                id: col.id,
                title: col.title.clone(),
                item_ids,
            };
            (*id, filtered)
        })
        .collect();

    Cow::Owned(Board {
        columns,
        items,
        column_order: board.column_order.clone(),
        version: board.version,
    })
}
