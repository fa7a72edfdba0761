//! Retrieval service access: transport, defensive parsing, context building.

pub mod client;
pub mod mock;
pub mod parse;

pub use client::{HttpRetrievalClient, RetrievalClient};
pub use mock::StaticRetrieval;
pub use parse::{build_context, parse_response, MAX_CONTEXT_HITS};
