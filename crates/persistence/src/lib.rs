#![deny(warnings)]

//! Persistence layer: simulation state store port and adapters.
//!
//! Stores are plain key-value: one `SimulationState` per simulation id,
//! last write wins. Nothing here knows about months or phases.

mod json_dir;
mod memory;

pub use json_dir::JsonDirStateStore;
pub use memory::InMemoryStateStore;

use async_trait::async_trait;
use sim_core::{SimulationId, SimulationState};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store i/o failed for {id}: {source}")]
    Io {
        id: String,
        #[source]
        source: std::io::Error,
    },
    #[error("stored state for {id} is malformed: {source}")]
    Serde {
        id: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid simulation id {0:?}")]
    InvalidId(String),
}

/// Port for loading and saving carried-forward simulation state.
#[async_trait]
pub trait StateStore: Send + Sync {
    /// Previous state for `id`, or `None` if nothing was ever saved.
    async fn load(&self, id: &SimulationId) -> Result<Option<SimulationState>, StoreError>;

    /// Replace the state for `id`.
    async fn save(&self, id: &SimulationId, state: &SimulationState) -> Result<(), StoreError>;
}

#[async_trait]
impl<T: StateStore + ?Sized> StateStore for std::sync::Arc<T> {
    async fn load(&self, id: &SimulationId) -> Result<Option<SimulationState>, StoreError> {
        (**self).load(id).await
    }

    async fn save(&self, id: &SimulationId, state: &SimulationState) -> Result<(), StoreError> {
        (**self).save(id, state).await
    }
}
