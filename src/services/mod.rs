//! Business logic services

pub mod catalog;
pub mod circulation;
pub mod members;

use crate::{config::LibraryConfig, error::AppResult, repository::Repository};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub catalog: catalog::CatalogService,
    pub members: members::MembersService,
    pub circulation: circulation::CirculationService,
    repository: Repository,
}

impl Services {
    /// Create all services with the given repository
    pub fn new(repository: Repository, library_config: LibraryConfig) -> Self {
        Self {
            catalog: catalog::CatalogService::new(repository.clone()),
            members: members::MembersService::new(repository.clone()),
            circulation: circulation::CirculationService::new(repository.clone(), library_config),
            repository,
        }
    }

    /// Check that the backing store is reachable
    pub async fn ping_store(&self) -> AppResult<()> {
        sqlx::query_scalar::<_, i32>("SELECT 1")
            .fetch_one(&self.repository.pool)
            .await?;
        Ok(())
    }
}
