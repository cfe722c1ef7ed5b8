//! Session-scoped import history.
//!
//! Lives only as long as the process; swap in another `ImportHistoryStore`
//! for persistence.

use std::collections::VecDeque;
use std::sync::Arc;
use async_trait::async_trait;
use parking_lot::RwLock;
use tracing::debug;
use crate::domain::{error::ImportError, models::ImportOutcome, ports::ImportHistoryStore};

#[derive(Clone, Default)]
pub struct InMemoryImportHistory {
    entries: Arc<RwLock<VecDeque<ImportOutcome>>>,
}

impl InMemoryImportHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

#[async_trait]
impl ImportHistoryStore for InMemoryImportHistory {
    async fn append(&self, outcome: ImportOutcome) -> Result<(), ImportError> {
        let mut entries = self.entries.write();
        debug!("Recording import outcome {} for '{}'", outcome.id, outcome.file_name);
        entries.push_front(outcome);
        Ok(())
    }

    async fn recent(&self, limit: usize) -> Result<Vec<ImportOutcome>, ImportError> {
        let entries = self.entries.read();
        Ok(entries.iter().take(limit).cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    fn outcome(file_name: &str) -> ImportOutcome {
        ImportOutcome {
            id: Uuid::new_v4(),
            total: 1,
            success_count: 1,
            failure_count: 0,
            errors: Vec::new(),
            file_name: file_name.to_string(),
            started_at: Utc::now(),
            timestamp: Utc::now(),
            cancelled: false,
        }
    }

    #[tokio::test]
    async fn test_recent_is_most_recent_first() {
        let history = InMemoryImportHistory::new();
        history.append(outcome("first.csv")).await.unwrap();
        history.append(outcome("second.csv")).await.unwrap();
        history.append(outcome("third.csv")).await.unwrap();

        let names: Vec<_> = history
            .recent(10)
            .await
            .unwrap()
            .into_iter()
            .map(|o| o.file_name)
            .collect();
        assert_eq!(names, vec!["third.csv", "second.csv", "first.csv"]);
    }

    #[tokio::test]
    async fn test_recent_respects_limit() {
        let history = InMemoryImportHistory::new();
        for i in 0..7 {
            history.append(outcome(&format!("batch-{i}.csv"))).await.unwrap();
        }

        assert_eq!(history.recent(5).await.unwrap().len(), 5);
        assert_eq!(history.len(), 7);
    }

    #[tokio::test]
    async fn test_clones_share_entries() {
        let history = InMemoryImportHistory::new();
        let handle = history.clone();
        handle.append(outcome("shared.csv")).await.unwrap();

        assert!(!history.is_empty());
        assert_eq!(history.recent(1).await.unwrap()[0].file_name, "shared.csv");
    }
}
