//! Fixed-result retrieval for tests and offline runs.

use crate::retrieval::client::RetrievalClient;
use crate::types::{Question, RetrievalResult};
use std::sync::atomic::{AtomicUsize, Ordering};

/// Returns the same result for every question and counts calls.
#[derive(Debug, Default)]
pub struct StaticRetrieval {
    result: RetrievalResult,
    calls: AtomicUsize,
}

impl StaticRetrieval {
    pub fn new(result: RetrievalResult) -> Self {
        Self {
            result,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl RetrievalClient for StaticRetrieval {
    async fn fetch(&self, _question: &Question) -> RetrievalResult {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.result.clone()
    }
}
