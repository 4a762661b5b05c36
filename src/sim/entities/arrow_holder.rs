//! Container that fired arrows are spawned into

use crate::sim::category::Category;
use crate::sim::entity::Entity;

/// Receives `ARROW_SPAWNER` commands and owns every live projectile
#[derive(Debug, Default, Clone, Copy)]
pub struct ArrowHolder;

impl Entity for ArrowHolder {
    fn category(&self) -> Category {
        Category::ARROW_SPAWNER
    }
}
