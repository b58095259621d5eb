//! Repository traits for the exercise tracker store.
//!
//! The store is split by record kind:
//! - [`UserRepository`]: user creation, listing and lookup
//! - [`ExerciseRepository`]: exercise inserts and filtered log queries
//!
//! [`FullRepository`] combines both and adds the health check; it is the
//! type handed to the HTTP layer as `Arc<dyn FullRepository>`.

pub mod error;
pub mod exercises;
pub mod users;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub use error::{ErrorContext, RepositoryError, RepositoryResult};
pub use exercises::ExerciseRepository;
pub use users::UserRepository;

/// Connection pool state and query counters of a pooled backend.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolStats {
    /// Number of connections currently in use
    pub connections_in_use: u32,
    /// Number of idle connections
    pub idle_connections: u32,
    /// Total number of connections in the pool
    pub total_connections: u32,
    /// Maximum pool size
    pub max_size: u32,
    /// Total successful queries executed
    pub total_queries: u64,
    /// Total failed queries
    pub failed_queries: u64,
    /// Total retried operations
    pub retried_operations: u64,
}

/// Complete store interface used by the services and the HTTP server.
#[async_trait]
pub trait FullRepository: UserRepository + ExerciseRepository {
    /// Check that the store is reachable.
    ///
    /// # Returns
    /// * `Ok(true)` - The store answered
    /// * `Ok(false)` - The store is reachable but not ready
    /// * `Err(RepositoryError)` - The check itself failed
    async fn health_check(&self) -> RepositoryResult<bool>;

    /// Pool statistics, for backends that keep a connection pool.
    fn pool_stats(&self) -> Option<PoolStats> {
        None
    }
}
