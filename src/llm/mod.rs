//! LLM client abstraction layer
//!
//! This module provides a trait-based abstraction for chat-completion
//! backends, so the composer can run against the real OpenAI-compatible
//! client or a scripted mock interchangeably.

pub mod backend;
pub mod mock;
pub mod openai;

pub use backend::{BackendError, ChatBackend};
pub use mock::MockChatBackend;
pub use openai::OpenAiClient;
