//! Application state for the HTTP server.

use std::path::PathBuf;
use std::sync::Arc;

use crate::db::repository::FullRepository;

/// Shared application state passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Repository instance for database operations
    pub repository: Arc<dyn FullRepository>,
    /// Directory served for unmatched GET paths
    pub public_dir: PathBuf,
}

impl AppState {
    /// Create a new application state serving the crate's `public/` directory.
    pub fn new(repository: Arc<dyn FullRepository>) -> Self {
        Self {
            repository,
            public_dir: PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("public"),
        }
    }

    pub fn with_public_dir(mut self, public_dir: impl Into<PathBuf>) -> Self {
        self.public_dir = public_dir.into();
        self
    }
}
