//! Typed cultural knowledge model and builtin dataset.

pub mod dataset;
pub mod items;
pub mod store;

pub use items::{CulturalItem, ItemKind};
pub use store::{excerpt, KnowledgeBase, RetrievalStore};
