use crate::errors::Result;
use crate::portfolio::portfolio_model::{NewPosition, PortfolioView, Position, PositionPatch};
use async_trait::async_trait;

/// Trait for portfolio persistence
///
/// Every mutation is a whole-file read, modify and write.
#[async_trait]
pub trait PortfolioRepositoryTrait: Send + Sync {
    /// All stored positions; rows missing an id are assigned one and persisted.
    async fn list(&self) -> Result<Vec<Position>>;
    async fn add(&self, position: Position) -> Result<Position>;
    async fn update(&self, id: &str, patch: PositionPatch) -> Result<Position>;
    /// Remove and return the position; unknown ids leave the file untouched.
    async fn delete(&self, id: &str) -> Result<Position>;
}

/// Trait for portfolio service operations
#[async_trait]
pub trait PortfolioServiceTrait: Send + Sync {
    async fn get_portfolio(&self) -> Result<PortfolioView>;
    async fn add_position(&self, new_position: NewPosition) -> Result<Position>;
    async fn update_position(&self, id: &str, patch: PositionPatch) -> Result<Position>;
    async fn delete_position(&self, id: &str) -> Result<Position>;
}
