//! Capability modules invoked by the orchestrator.
//!
//! Each capability is a single-purpose operation with isolated failure
//! handling: `invoke` always returns an [`AgentResponse`], never an error.

pub mod heritage;
pub mod research;
pub mod translation;
pub mod verification;

use async_trait::async_trait;
use griot_common::{AgentMessage, AgentResponse};

/// Single invocation contract shared by every capability
#[async_trait]
pub trait Capability: Send + Sync {
    /// Stable capability identifier, used as `producer` on responses
    fn id(&self) -> &'static str;

    /// Process one message. Failures are converted into zero/low-confidence
    /// responses carrying an `error` metadata marker.
    async fn invoke(&self, message: AgentMessage) -> AgentResponse;
}
