//! Storage layer.
//!
//! Data access goes through the repository traits in [`repository`], so the
//! service layer never knows which backend it talks to.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────┐
//! │  HTTP handlers (axum)                                │
//! └───────────────────┬──────────────────────────────────┘
//!                     │
//! ┌───────────────────▼──────────────────────────────────┐
//! │  Services - permissions and business rules           │
//! └───────────────────┬──────────────────────────────────┘
//!                     │
//! ┌───────────────────▼──────────────────────────────────┐
//! │  Repository traits (repository/)                     │
//! └─────────┬─────────────────────────────┬──────────────┘
//!           │                             │
//!   ┌───────▼────────┐          ┌─────────▼──────────┐
//!   │ LocalRepository│          │ PostgresRepository │
//!   │  (in-memory)   │          │  (Diesel + r2d2)   │
//!   └────────────────┘          └────────────────────┘
//! ```
//!
//! - `repository`: trait definitions and [`RepositoryError`]
//! - `repositories::local`: in-memory backend for tests and development
//! - `repositories::postgres`: Postgres backend (feature `postgres-repo`)
//! - `factory` / `repo_config`: backend selection from env or `repository.toml`

#[cfg(not(any(feature = "postgres-repo", feature = "local-repo")))]
compile_error!("Enable at least one repository backend feature.");

pub mod factory;
pub mod repo_config;
pub mod repositories;
pub mod repository;

#[cfg(feature = "postgres-repo")]
pub use repositories::postgres::{PoolStats, PostgresConfig};

/// Placeholder so configuration code compiles without the Postgres backend.
#[cfg(not(feature = "postgres-repo"))]
#[derive(Debug, Clone)]
pub struct PostgresConfig {
    _private: (),
}

#[cfg(not(feature = "postgres-repo"))]
impl PostgresConfig {
    pub fn from_env() -> Result<Self, String> {
        Err("Postgres repository feature not enabled".to_string())
    }
}

pub use factory::{RepositoryFactory, RepositoryType};
pub use repo_config::RepositoryConfig;
pub use repositories::LocalRepository;
#[cfg(feature = "postgres-repo")]
pub use repositories::PostgresRepository;
pub use repository::{
    AccountRepository, CourseworkRepository, ErrorContext, FullRepository, MeetupRepository,
    NewsRepository, RepositoryError, RepositoryResult, SchoolRepository,
};

use anyhow::{Context, Result};
use std::sync::{Arc, OnceLock};

/// Global repository instance initialized once per process.
static REPOSITORY: OnceLock<Arc<dyn FullRepository>> = OnceLock::new();

/// Initialize the global repository from `repository.toml` or the environment.
///
/// Calling it again returns the already initialized instance.
pub async fn init_repository() -> Result<&'static Arc<dyn FullRepository>> {
    if let Some(repo) = REPOSITORY.get() {
        return Ok(repo);
    }

    let repo = RepositoryFactory::from_default_config()
        .await
        .context("Failed to initialize repository")?;
    Ok(REPOSITORY.get_or_init(|| repo))
}

/// Get the global repository instance.
pub fn get_repository() -> Result<&'static Arc<dyn FullRepository>> {
    REPOSITORY
        .get()
        .context("Repository not initialized. Call init_repository() first.")
}
