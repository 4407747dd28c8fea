//! Core AI engine components
//!
//! This module contains the per-turn orchestration logic.

mod chat;

pub use chat::{ChatEngine, ChatError};
