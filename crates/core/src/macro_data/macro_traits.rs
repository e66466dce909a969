use crate::macro_data::macro_model::MacroSnapshot;
use async_trait::async_trait;

/// Trait for macro overview operations
#[async_trait]
pub trait MacroServiceTrait: Send + Sync {
    /// Every part is fetched independently; a failed part is left empty.
    async fn summary(&self) -> MacroSnapshot;
}
