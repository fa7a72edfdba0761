//! Prompt system for the company chat service.
//!
//! This crate provides:
//! - Built-in prompt definitions (constrained summary, open chat)
//! - YAML prompt overrides
//! - Handlebars rendering into a system/user message pair

pub mod builder;
pub mod loader;
pub mod types;

// Re-export main types
pub use builder::build_prompt;
pub use loader::{
    builtin_prompt, load_prompt, load_prompt_file, MAX_SUMMARIZE_TEMPERATURE, OPEN_CHAT_PROMPT_ID,
    SUMMARIZE_PROMPT_ID,
};
pub use types::{BuiltPrompt, PromptDefinition};
