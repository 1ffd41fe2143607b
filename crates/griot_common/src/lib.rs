//! Shared types for the Griot cultural-heritage engine.
//!
//! Holds the message/response envelope exchanged between capabilities and
//! the typed cultural knowledge model with its builtin dataset.

pub mod knowledge;
pub mod message;

pub use knowledge::dataset;
pub use knowledge::items::{CulturalItem, ItemKind};
pub use knowledge::store::{KnowledgeBase, RetrievalStore};
pub use message::{AgentMessage, AgentResponse, SourceRef, TaskType};
