//! # Conversation Browser Common Library
//!
//! Shared code for the conversation player and its shells:
//! - Dataset model (conversations and their recorded lines)
//! - Dataset loading and browsing queries
//! - Character display-name and portrait tables
//! - Event types (ConvoEvent enum) and the EventBus
//! - Configuration loading
//! - Injected key/value persistence and viewed-conversation tracking

pub mod characters;
pub mod config;
pub mod dataset;
pub mod error;
pub mod events;
pub mod model;
pub mod storage;
pub mod viewed;

pub use error::{Error, Result};
pub use events::{ConvoEvent, EventBus};
pub use model::{Character, Conversation, ConversationData, ConversationLine};
