//! Business logic services

pub mod catalog;
pub mod loans;
pub mod members;

use std::sync::Arc;

use crate::{error::AppResult, repository::LibraryStore};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub catalog: catalog::CatalogService,
    pub members: members::MembersService,
    pub loans: loans::LoansService,
    store: Arc<dyn LibraryStore>,
}

impl Services {
    /// Create all services over the given store
    pub fn new(store: Arc<dyn LibraryStore>) -> Self {
        Self {
            catalog: catalog::CatalogService::new(store.clone()),
            members: members::MembersService::new(store.clone()),
            loans: loans::LoansService::new(store.clone()),
            store,
        }
    }

    /// Check the datastore is reachable
    pub async fn ping(&self) -> AppResult<()> {
        self.store.ping().await
    }
}
