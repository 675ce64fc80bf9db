//! Application state for the HTTP server.

use std::sync::Arc;

use crate::config::Settings;
use crate::db::repository::FullRepository;
use crate::services::PageRequest;

/// Shared application state passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Repository instance for database operations
    pub repository: Arc<dyn FullRepository>,
    pub settings: Arc<Settings>,
}

impl AppState {
    pub fn new(repository: Arc<dyn FullRepository>, settings: Settings) -> Self {
        Self {
            repository,
            settings: Arc::new(settings),
        }
    }

    /// Page request for `?page=N` with the configured page size.
    pub fn page(&self, page: Option<usize>) -> PageRequest {
        PageRequest::new(page, self.settings.page_size)
    }
}
