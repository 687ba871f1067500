use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::fmt;

use crate::error::BoardError;

pub type CardId = String;

/// The three fixed workflow stages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ColumnId {
    Backlog,
    InProgress,
    Done,
}

impl ColumnId {
    pub const ALL: [ColumnId; 3] = [ColumnId::Backlog, ColumnId::InProgress, ColumnId::Done];

    /// Key used in the persisted JSON.
    pub fn as_str(&self) -> &'static str {
        match self {
            ColumnId::Backlog => "backlog",
            ColumnId::InProgress => "inProgress",
            ColumnId::Done => "done",
        }
    }

    pub fn default_title(&self) -> &'static str {
        match self {
            ColumnId::Backlog => "Backlog",
            ColumnId::InProgress => "In Progress",
            ColumnId::Done => "Done",
        }
    }
}

impl fmt::Display for ColumnId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    #[serde(rename = "Core Web Tech")]
    CoreWebTech,
    #[serde(rename = "Framework Mastery")]
    FrameworkMastery,
    #[serde(rename = "State & Data Management")]
    StateAndDataManagement,
    #[serde(rename = "UI Architecture")]
    UiArchitecture,
    #[serde(rename = "Performance & Security")]
    PerformanceAndSecurity,
    #[serde(rename = "Tooling & CI/CD")]
    ToolingAndCiCd,
    #[serde(rename = "Leadership & Governance")]
    LeadershipAndGovernance,
}

impl Category {
    /// Editor order.
    pub const ALL: [Category; 7] = [
        Category::CoreWebTech,
        Category::FrameworkMastery,
        Category::StateAndDataManagement,
        Category::UiArchitecture,
        Category::PerformanceAndSecurity,
        Category::ToolingAndCiCd,
        Category::LeadershipAndGovernance,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Category::CoreWebTech => "Core Web Tech",
            Category::FrameworkMastery => "Framework Mastery",
            Category::StateAndDataManagement => "State & Data Management",
            Category::UiArchitecture => "UI Architecture",
            Category::PerformanceAndSecurity => "Performance & Security",
            Category::ToolingAndCiCd => "Tooling & CI/CD",
            Category::LeadershipAndGovernance => "Leadership & Governance",
        }
    }

    /// Legend class used by the board stylesheet.
    pub fn css_class(&self) -> &'static str {
        match self {
            Category::CoreWebTech => "category-core",
            Category::FrameworkMastery => "category-framework",
            Category::StateAndDataManagement => "category-state",
            Category::UiArchitecture => "category-architecture",
            Category::PerformanceAndSecurity => "category-perf",
            Category::ToolingAndCiCd => "category-tooling",
            Category::LeadershipAndGovernance => "category-leadership",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Level {
    Beginner,
    Intermediate,
    Advanced,
    Architect,
}

impl Level {
    pub const ALL: [Level; 4] = [
        Level::Beginner,
        Level::Intermediate,
        Level::Advanced,
        Level::Architect,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Level::Beginner => "Beginner",
            Level::Intermediate => "Intermediate",
            Level::Advanced => "Advanced",
            Level::Architect => "Architect",
        }
    }

    pub fn emoji(&self) -> &'static str {
        match self {
            Level::Beginner => "🌱",
            Level::Intermediate => "🛠️",
            Level::Advanced => "🚀",
            Level::Architect => "🏛️",
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A single learning milestone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Card {
    pub id: CardId,
    pub title: String,
    pub category: Category,
    pub level: Level,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Ordered list of URLs.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resources: Option<Vec<String>>,
    /// Deliverable that proves the milestone.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub portfolio: Option<String>,
}

impl Card {
    /// Blank card for the editor. The id is assigned here and never changes.
    pub fn draft() -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            title: String::new(),
            category: Category::UiArchitecture,
            level: Level::Intermediate,
            description: Some(String::new()),
            resources: Some(Vec::new()),
            portfolio: Some(String::new()),
        }
    }

    /// Reject cards the editor must not save.
    pub fn validate(&self) -> Result<(), BoardError> {
        if self.id.trim().is_empty() {
            return Err(BoardError::Validation("card id must not be empty".to_string()));
        }
        if self.title.trim().is_empty() {
            return Err(BoardError::Validation("title must not be empty".to_string()));
        }
        Ok(())
    }
}

/// Split the editor's "one per line" resources text into a list.
pub fn parse_resources(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Column {
    pub id: ColumnId,
    pub title: String,
    pub item_ids: Vec<CardId>,
}

impl Column {
    pub fn new(id: ColumnId) -> Self {
        Self {
            id,
            title: id.default_title().to_string(),
            item_ids: Vec::new(),
        }
    }
}

/// Header info for one column.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnSummary {
    pub id: ColumnId,
    pub title: String,
    pub card_count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IntegrityError {
    #[error("Column {0} is missing")]
    MissingColumn(ColumnId),

    #[error("Column stored under {key} claims id {found}")]
    ColumnIdMismatch { key: ColumnId, found: ColumnId },

    #[error("Column order {0:?} is not a permutation of the fixed columns")]
    BadColumnOrder(Vec<ColumnId>),

    #[error("Column {column} references unknown card {id}")]
    OrphanedId { column: ColumnId, id: CardId },

    #[error("Card {0} is placed more than once")]
    DuplicateId(CardId),

    #[error("Card {0} is not placed in any column")]
    UnplacedCard(CardId),
}

/// The complete board state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Board {
    pub columns: BTreeMap<ColumnId, Column>,
    pub items: BTreeMap<CardId, Card>,
    pub column_order: Vec<ColumnId>,
    /// Optimistic-concurrency token, bumped by the repository on every change.
    #[serde(default)]
    pub version: u64,
}

impl Default for Board {
    fn default() -> Self {
        Self::empty()
    }
}

impl Board {
    /// A board with the three fixed columns and no cards.
    pub fn empty() -> Self {
        Self {
            columns: ColumnId::ALL
                .iter()
                .map(|id| (*id, Column::new(*id)))
                .collect(),
            items: BTreeMap::new(),
            column_order: ColumnId::ALL.to_vec(),
            version: 0,
        }
    }

    pub fn column(&self, id: ColumnId) -> Option<&Column> {
        self.columns.get(&id)
    }

    pub fn column_mut(&mut self, id: ColumnId) -> Option<&mut Column> {
        self.columns.get_mut(&id)
    }

    pub fn contains_card(&self, id: &str) -> bool {
        self.items.contains_key(id)
    }

    /// Column currently holding the card.
    pub fn column_of(&self, id: &str) -> Option<ColumnId> {
        self.columns
            .values()
            .find(|col| col.item_ids.iter().any(|x| x == id))
            .map(|col| col.id)
    }

    /// Cards of a column in display order. Ids without a card are skipped.
    pub fn cards_in(&self, column: ColumnId) -> Vec<&Card> {
        self.column(column)
            .map(|col| {
                col.item_ids
                    .iter()
                    .filter_map(|id| self.items.get(id))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Column headers in `column_order`.
    pub fn column_summaries(&self) -> Vec<ColumnSummary> {
        self.column_order
            .iter()
            .filter_map(|id| self.column(*id))
            .map(|col| ColumnSummary {
                id: col.id,
                title: col.title.clone(),
                card_count: col.item_ids.len(),
            })
            .collect()
    }

    /// Check the structural invariants. Returns the first violation found.
    pub fn check_integrity(&self) -> Result<(), IntegrityError> {
        for id in ColumnId::ALL {
            match self.columns.get(&id) {
                None => return Err(IntegrityError::MissingColumn(id)),
                Some(col) if col.id != id => {
                    return Err(IntegrityError::ColumnIdMismatch {
                        key: id,
                        found: col.id,
                    })
                }
                Some(_) => {}
            }
        }

        let mut order = self.column_order.clone();
        order.sort();
        if order != ColumnId::ALL.to_vec() {
            return Err(IntegrityError::BadColumnOrder(self.column_order.clone()));
        }

        let mut placed: HashSet<&str> = HashSet::new();
        for col in self.columns.values() {
            for id in &col.item_ids {
                if !self.items.contains_key(id) {
                    return Err(IntegrityError::OrphanedId {
                        column: col.id,
                        id: id.clone(),
                    });
                }
                if !placed.insert(id.as_str()) {
                    return Err(IntegrityError::DuplicateId(id.clone()));
                }
            }
        }

        if let Some(id) = self.items.keys().find(|id| !placed.contains(id.as_str())) {
            return Err(IntegrityError::UnplacedCard(id.clone()));
        }
        Ok(())
    }
}
