//! Remote service access
//!
//! Commands only see the [`SearchService`] trait; [`TpClient`] is the
//! production implementation backed by the Targetprocess REST API.

pub mod client;
pub mod error;

#[cfg(test)]
pub mod memory;

pub use client::{entity_url, Auth, Credentials, TpClient};
pub use error::ApiError;

use crate::core::query::QueryDescriptor;
use crate::core::record::EntityRecord;

/// A source of assignable entities
pub trait SearchService {
    /// One page of entities matching `query`
    fn search(&self, query: &QueryDescriptor) -> Result<Vec<EntityRecord>, ApiError>;

    /// Every entity with the given id, fetching the `include` attribute paths
    fn find_by_id(&self, id: u64, include: &[String]) -> Result<Vec<EntityRecord>, ApiError>;
}
