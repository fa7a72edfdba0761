//! Command handlers for the company-chat binary.

pub mod ask;
pub mod serve;

pub use ask::AskCommand;
pub use serve::ServeCommand;
