//! One pretty-printed JSON file per simulation under a directory.

use async_trait::async_trait;
use sim_core::{SimulationId, SimulationState};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::{StateStore, StoreError};

#[derive(Clone, Debug)]
pub struct JsonDirStateStore {
    dir: PathBuf,
}

impl JsonDirStateStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// `<dir>/<id>.json`. Ids that could escape the directory are rejected.
    pub fn path_for(&self, id: &SimulationId) -> Result<PathBuf, StoreError> {
        let ok = !id.0.is_empty()
            && id
                .0
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !ok {
            return Err(StoreError::InvalidId(id.0.clone()));
        }
        Ok(self.dir.join(format!("{}.json", id.0)))
    }
}

fn io_err(id: &SimulationId) -> impl FnOnce(std::io::Error) -> StoreError + '_ {
    move |source| StoreError::Io {
        id: id.0.clone(),
        source,
    }
}

#[async_trait]
impl StateStore for JsonDirStateStore {
    async fn load(&self, id: &SimulationId) -> Result<Option<SimulationState>, StoreError> {
        let path = self.path_for(id)?;
        let bytes = match tokio::fs::read(&path).await {
            Ok(b) => b,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(io_err(id)(e)),
        };
        let state = serde_json::from_slice(&bytes).map_err(|source| StoreError::Serde {
            id: id.0.clone(),
            source,
        })?;
        Ok(Some(state))
    }

    async fn save(&self, id: &SimulationId, state: &SimulationState) -> Result<(), StoreError> {
        let path = self.path_for(id)?;
        let body = serde_json::to_vec_pretty(state).map_err(|source| StoreError::Serde {
            id: id.0.clone(),
            source,
        })?;
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(io_err(id))?;
        // Write then rename so a crash never leaves a half-written file.
        let tmp = path.with_extension("json.tmp");
        tokio::fs::write(&tmp, body).await.map_err(io_err(id))?;
        tokio::fs::rename(&tmp, &path).await.map_err(io_err(id))?;
        debug!(%id, path = %path.display(), "state saved");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::state;

    fn scratch_dir(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!(
            "storefront-sim-{}-{}",
            name,
            std::process::id()
        ))
    }

    #[tokio::test]
    async fn save_then_load_round_trips() {
        let dir = scratch_dir("roundtrip");
        let store = JsonDirStateStore::new(&dir);
        let id = SimulationId("coffee_1".into());
        assert!(store.load(&id).await.unwrap().is_none());
        store.save(&id, &state(4, 7_500)).await.unwrap();
        store.save(&id, &state(5, 8_000)).await.unwrap();
        assert_eq!(store.load(&id).await.unwrap(), Some(state(5, 8_000)));
        let _ = tokio::fs::remove_dir_all(&dir).await;
    }

    #[tokio::test]
    async fn malformed_file_is_a_serde_error() {
        let dir = scratch_dir("malformed");
        tokio::fs::create_dir_all(&dir).await.unwrap();
        let store = JsonDirStateStore::new(&dir);
        let id = SimulationId("broken".into());
        tokio::fs::write(store.path_for(&id).unwrap(), b"{ not json")
            .await
            .unwrap();
        let err = store.load(&id).await.unwrap_err();
        assert!(matches!(err, StoreError::Serde { .. }));
        let _ = tokio::fs::remove_dir_all(&dir).await;
    }

    #[test]
    fn path_traversal_ids_are_rejected() {
        let store = JsonDirStateStore::new("/tmp/x");
        for bad in ["", "../etc", "a/b", "a.b"] {
            assert!(matches!(
                store.path_for(&SimulationId(bad.into())),
                Err(StoreError::InvalidId(_))
            ));
        }
        assert!(store.path_for(&SimulationId("ok-id_2".into())).is_ok());
    }
}
