//! In-memory search service for tests

use std::cell::RefCell;

use crate::api::{ApiError, SearchService};
use crate::core::query::QueryDescriptor;
use crate::core::record::EntityRecord;
use crate::core::template::lookup;

const TYPE_NAME: &[&str] = &["EntityType", "Name"];

/// Serves a fixed list of records, honoring entity types and pagination
#[derive(Debug, Default)]
pub struct MemoryService {
    records: Vec<EntityRecord>,
    failure: Option<(String, String)>,
    queries: RefCell<Vec<QueryDescriptor>>,
}

impl MemoryService {
    pub fn new(records: Vec<EntityRecord>) -> Self {
        Self {
            records,
            ..Self::default()
        }
    }

    /// Make every request fail with the given status and message
    pub fn failing(status: &str, message: &str) -> Self {
        Self {
            failure: Some((status.to_string(), message.to_string())),
            ..Self::default()
        }
    }

    /// Queries received so far
    pub fn queries(&self) -> Vec<QueryDescriptor> {
        self.queries.borrow().clone()
    }

    fn check(&self) -> Result<(), ApiError> {
        match &self.failure {
            Some((status, message)) => Err(ApiError::Status {
                status: status.clone(),
                message: message.clone(),
            }),
            None => Ok(()),
        }
    }
}

impl SearchService for MemoryService {
    fn search(&self, query: &QueryDescriptor) -> Result<Vec<EntityRecord>, ApiError> {
        self.queries.borrow_mut().push(query.clone());
        self.check()?;

        Ok(self
            .records
            .iter()
            .filter(|record| {
                query.entity_types.is_empty()
                    || lookup(record, TYPE_NAME)
                        .and_then(|name| name.as_str().map(str::to_string))
                        .is_some_and(|name| query.entity_types.contains(&name))
            })
            .skip(query.offset as usize)
            .take(query.limit as usize)
            .cloned()
            .collect())
    }

    fn find_by_id(&self, id: u64, _include: &[String]) -> Result<Vec<EntityRecord>, ApiError> {
        self.check()?;
        Ok(self
            .records
            .iter()
            .filter(|record| record.id() == Some(id))
            .cloned()
            .collect())
    }
}
