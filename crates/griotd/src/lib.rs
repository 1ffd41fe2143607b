//! Griot engine: answer synthesis for cultural-heritage questions.
//!
//! The orchestrator plans which capabilities a query needs (heritage
//! synthesis, research, verification, translation), invokes them in
//! dependency order, and combines their outputs into one response with
//! aggregated confidence and merged provenance.

pub mod capabilities;
pub mod config;
pub mod enrichment;
pub mod llm;
pub mod orchestrator;
pub mod reasoning;
