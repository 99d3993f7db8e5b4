//! # Stagehand Core
//!
//! Domain types, traits, and error definitions for the Stagehand agent
//! pipeline. This crate has **no framework dependencies**: it defines the
//! domain model that the provider, agent, and pipeline crates implement
//! against.
//!
//! ## Design Philosophy
//!
//! The model backend is a trait here. HTTP implementations live in
//! `stagehand-providers`, scripted ones live in tests. This enables:
//! - Swapping backends via configuration
//! - Easy testing with mock/stub implementations
//! - Clean dependency graph (all crates depend inward on core)

pub mod agent;
pub mod backend;
pub mod error;
pub mod message;
pub mod tool;

// Re-export key types at crate root for ergonomics
pub use agent::{AgentRole, AgentState};
pub use backend::{Backend, ChatRequest, RawResponse};
pub use error::{DispatchError, TransportError};
pub use message::{Message, Role};
pub use tool::{ToolCall, ToolRegistry};
