//! Business logic services

pub mod cascade;
pub mod inventory;
pub mod loans;
pub mod penalties;

use crate::{config::CirculationConfig, repository::Repository};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub cascade: cascade::CascadeService,
    pub inventory: inventory::InventoryService,
    pub loans: loans::LoansService,
    pub penalties: penalties::PenaltiesService,
}

impl Services {
    /// Create all services with the given repository
    pub fn new(repository: Repository, circulation: &CirculationConfig) -> Self {
        let penalties = penalties::PenaltiesService::new(repository.clone(), circulation.daily_fee);
        Self {
            cascade: cascade::CascadeService::new(repository.clone()),
            inventory: inventory::InventoryService::new(
                repository.clone(),
                circulation.shelf_capacity,
            ),
            loans: loans::LoansService::new(repository, penalties.clone()),
            penalties,
        }
    }
}
