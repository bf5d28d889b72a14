//! In-memory `Session` double for repository tests.
//!
//! Returns canned query results in order and records every call so tests
//! can assert on the issued selects and on write/commit counts.

use std::collections::VecDeque;

use contacts_types::error::RepositoryError;

use super::{QueryResult, Record, Select, Session, UserPatch};

#[derive(Debug, Default)]
pub(crate) struct RecordingSession {
    results: VecDeque<QueryResult>,
    pub(crate) executed: Vec<Select>,
    pub(crate) added: Vec<Record>,
    pub(crate) updated: Vec<UserPatch>,
    pub(crate) deleted: Vec<Record>,
    pub(crate) refreshed: Vec<Record>,
    pub(crate) commits: usize,
    fail_commit: bool,
}

impl RecordingSession {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Queue the result for the next `execute`. Once the queue is drained,
    /// `execute` returns empty results.
    pub(crate) fn with_result(mut self, result: QueryResult) -> Self {
        self.results.push_back(result);
        self
    }

    pub(crate) fn failing_commit(mut self) -> Self {
        self.fail_commit = true;
        self
    }
}

impl Session for RecordingSession {
    async fn execute(&mut self, select: Select) -> Result<QueryResult, RepositoryError> {
        self.executed.push(select);
        Ok(self.results.pop_front().unwrap_or_default())
    }

    fn add(&mut self, record: Record) {
        self.added.push(record);
    }

    fn update(&mut self, patch: UserPatch) {
        self.updated.push(patch);
    }

    async fn delete(&mut self, record: Record) -> Result<(), RepositoryError> {
        self.deleted.push(record);
        Ok(())
    }

    async fn commit(&mut self) -> Result<(), RepositoryError> {
        self.commits += 1;
        if self.fail_commit {
            return Err(RepositoryError::Connection);
        }
        Ok(())
    }

    async fn refresh(&mut self, record: Record) -> Result<Record, RepositoryError> {
        self.refreshed.push(record.clone());
        Ok(record)
    }
}
