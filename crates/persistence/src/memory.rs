//! Process-local store, for tests and the CLI.

use async_trait::async_trait;
use sim_core::{SimulationId, SimulationState};
use std::collections::HashMap;
use tokio::sync::RwLock;

use crate::{StateStore, StoreError};

/// Thread-safe in-memory store. Contents are lost on drop.
#[derive(Debug, Default)]
pub struct InMemoryStateStore {
    states: RwLock<HashMap<SimulationId, SimulationState>>,
}

impl InMemoryStateStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.states.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.states.read().await.is_empty()
    }
}

#[async_trait]
impl StateStore for InMemoryStateStore {
    async fn load(&self, id: &SimulationId) -> Result<Option<SimulationState>, StoreError> {
        Ok(self.states.read().await.get(id).cloned())
    }

    async fn save(&self, id: &SimulationId, state: &SimulationState) -> Result<(), StoreError> {
        self.states.write().await.insert(id.clone(), state.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::state;

    #[tokio::test]
    async fn missing_id_loads_none() {
        let store = InMemoryStateStore::new();
        assert!(store.is_empty().await);
        let got = store.load(&SimulationId("nope".into())).await.unwrap();
        assert!(got.is_none());
    }

    #[tokio::test]
    async fn last_write_wins() {
        let store = InMemoryStateStore::new();
        let id = SimulationId("sim-1".into());
        store.save(&id, &state(1, 1_000)).await.unwrap();
        store.save(&id, &state(2, 2_000)).await.unwrap();
        assert_eq!(store.load(&id).await.unwrap(), Some(state(2, 2_000)));
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn ids_are_independent() {
        let store = InMemoryStateStore::new();
        let a = SimulationId("a".into());
        let b = SimulationId("b".into());
        store.save(&a, &state(1, 10)).await.unwrap();
        store.save(&b, &state(5, 50)).await.unwrap();
        assert_eq!(store.load(&a).await.unwrap().map(|s| s.month), Some(1));
        assert_eq!(store.load(&b).await.unwrap().map(|s| s.month), Some(5));
    }
}
