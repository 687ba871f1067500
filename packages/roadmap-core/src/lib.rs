//! State core of the learning-roadmap Kanban board: typed board model,
//! snapshot repository with simulated latency, optimistic view-model and
//! free-text filter.

pub mod config;
pub mod error;
pub mod filter;
pub mod mutation;
pub mod repository;
pub mod seed;
pub mod storage;
pub mod types;
pub mod view_model;

pub use error::BoardError;
pub use mutation::Mutation;
pub use repository::{BoardRepository, Latency};
pub use types::{Board, Card, Category, Column, ColumnId, Level};
pub use view_model::BoardViewModel;
