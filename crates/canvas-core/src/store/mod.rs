//! Project and block stores.
//!
//! Each store keeps its working state in memory and writes the whole state
//! back to durable storage as one JSON blob per fixed namespace on every
//! mutation, preserving the stored layout the original client produced:
//! `{"projects": [...], "currentProjectId": ...}` under `canvas-projects`
//! and `{"blocks": [...], "selectedBlockId": ...}` under `canvas-blocks`.

pub mod block;
pub mod project;

use canvas_types::error::StoreError;

/// Namespace for the project state blob.
pub const PROJECTS_NAMESPACE: &str = "canvas-projects";

/// Namespace for the block state blob.
pub const BLOCKS_NAMESPACE: &str = "canvas-blocks";

/// Durable key/value port: one JSON blob per namespace string.
///
/// Implementations live in canvas-infra (e.g., `SqliteStateStore`).
pub trait StateStore: Send + Sync {
    /// Load the blob stored under `namespace`, if any.
    fn load(
        &self,
        namespace: &str,
    ) -> impl std::future::Future<Output = Result<Option<serde_json::Value>, StoreError>> + Send;

    /// Replace the blob stored under `namespace`.
    fn save(
        &self,
        namespace: &str,
        value: &serde_json::Value,
    ) -> impl std::future::Future<Output = Result<(), StoreError>> + Send;
}

#[cfg(test)]
pub(crate) mod testing {
    use std::collections::HashMap;
    use std::sync::Mutex;

    use super::*;

    /// In-memory state store for service tests.
    #[derive(Default)]
    pub struct MemoryStateStore {
        blobs: Mutex<HashMap<String, serde_json::Value>>,
    }

    impl MemoryStateStore {
        pub fn new() -> Self {
            Self::default()
        }

        /// Peek at the persisted blob, as a test assertion helper.
        pub fn blob(&self, namespace: &str) -> Option<serde_json::Value> {
            self.blobs.lock().unwrap().get(namespace).cloned()
        }
    }

    impl StateStore for MemoryStateStore {
        async fn load(&self, namespace: &str) -> Result<Option<serde_json::Value>, StoreError> {
            Ok(self.blobs.lock().unwrap().get(namespace).cloned())
        }

        async fn save(
            &self,
            namespace: &str,
            value: &serde_json::Value,
        ) -> Result<(), StoreError> {
            self.blobs
                .lock()
                .unwrap()
                .insert(namespace.to_string(), value.clone());
            Ok(())
        }
    }

    impl StateStore for std::sync::Arc<MemoryStateStore> {
        async fn load(&self, namespace: &str) -> Result<Option<serde_json::Value>, StoreError> {
            self.as_ref().load(namespace).await
        }

        async fn save(
            &self,
            namespace: &str,
            value: &serde_json::Value,
        ) -> Result<(), StoreError> {
            self.as_ref().save(namespace, value).await
        }
    }
}
