//! exambank-providers — question drafting backends.
//!
//! Implements the `QuestionDrafter` trait for the OpenAI chat-completions
//! API, plus a scriptable mock for exercising the bank pipeline without real
//! API calls.

pub mod config;
pub mod error;
pub mod mock;
pub mod openai;

pub use config::{create_drafter, load_config, load_config_from, DrafterConfig, ExambankConfig};
pub use error::DrafterError;
