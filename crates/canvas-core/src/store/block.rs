//! Building-block store service.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use uuid::Uuid;

use canvas_types::block::{Block, BlockCategory, BlockKind, BlockPatch, NewBlock};
use canvas_types::error::StoreError;

use super::{StateStore, BLOCKS_NAMESPACE};

/// Persisted shape of the block namespace blob.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BlockState {
    #[serde(default)]
    blocks: Vec<Block>,
    #[serde(default)]
    selected_block_id: Option<Uuid>,
}

/// Block collection with a selection pointer.
///
/// Unlike projects, adding a block does not select it.
pub struct BlockStore<S: StateStore> {
    store: S,
    state: RwLock<BlockState>,
}

impl<S: StateStore> BlockStore<S> {
    /// Load the store, starting empty when the namespace has no blob yet.
    pub async fn load(store: S) -> Result<Self, StoreError> {
        let state = match store.load(BLOCKS_NAMESPACE).await? {
            Some(value) => serde_json::from_value(value)
                .map_err(|e| StoreError::Serialization(e.to_string()))?,
            None => BlockState::default(),
        };
        Ok(Self {
            store,
            state: RwLock::new(state),
        })
    }

    async fn persist(&self, state: &BlockState) -> Result<(), StoreError> {
        let value = serde_json::to_value(state)
            .map_err(|e| StoreError::Serialization(e.to_string()))?;
        self.store.save(BLOCKS_NAMESPACE, &value).await
    }

    pub async fn add(&self, new: NewBlock) -> Result<Block, StoreError> {
        let now = Utc::now();
        let block = Block {
            id: Uuid::now_v7(),
            name: new.name,
            kind: new.kind,
            color: new.color,
            webhook_url: new.webhook_url,
            created_at: now,
            updated_at: now,
            properties: new.properties,
        };

        let mut state = self.state.write().await;
        state.blocks.push(block.clone());
        self.persist(&state).await?;

        tracing::info!(block_id = %block.id, kind = %block.kind, "block created");
        Ok(block)
    }

    /// Apply a partial update and touch `updated_at`.
    pub async fn update(&self, id: Uuid, patch: BlockPatch) -> Result<Block, StoreError> {
        let mut state = self.state.write().await;
        let block = state
            .blocks
            .iter_mut()
            .find(|b| b.id == id)
            .ok_or(StoreError::NotFound)?;

        if let Some(name) = patch.name {
            block.name = name;
        }
        if let Some(kind) = patch.kind {
            block.kind = kind;
        }
        if let Some(color) = patch.color {
            block.color = color;
        }
        if let Some(webhook_url) = patch.webhook_url {
            block.webhook_url = Some(webhook_url);
        }
        if let Some(properties) = patch.properties {
            block.properties = properties;
        }
        block.updated_at = Utc::now();

        let updated = block.clone();
        self.persist(&state).await?;
        Ok(updated)
    }

    /// Delete a block, clearing the selection if it pointed at it.
    pub async fn delete(&self, id: Uuid) -> Result<(), StoreError> {
        let mut state = self.state.write().await;
        let before = state.blocks.len();
        state.blocks.retain(|b| b.id != id);
        if state.blocks.len() == before {
            return Err(StoreError::NotFound);
        }
        if state.selected_block_id == Some(id) {
            state.selected_block_id = None;
        }
        self.persist(&state).await?;

        tracing::info!(block_id = %id, "block deleted");
        Ok(())
    }

    pub async fn select(&self, id: Option<Uuid>) -> Result<(), StoreError> {
        let mut state = self.state.write().await;
        if let Some(id) = id
            && !state.blocks.iter().any(|b| b.id == id)
        {
            return Err(StoreError::NotFound);
        }
        state.selected_block_id = id;
        self.persist(&state).await
    }

    pub async fn get(&self, id: Uuid) -> Option<Block> {
        let state = self.state.read().await;
        state.blocks.iter().find(|b| b.id == id).cloned()
    }

    pub async fn selected(&self) -> Option<Block> {
        let state = self.state.read().await;
        let id = state.selected_block_id?;
        state.blocks.iter().find(|b| b.id == id).cloned()
    }

    pub async fn list(&self) -> Vec<Block> {
        self.state.read().await.blocks.clone()
    }

    /// Group blocks by kind for the sidebar: categories in declaration
    /// order, newest first within a category, empty categories omitted.
    pub async fn categorized(&self) -> Vec<BlockCategory> {
        let state = self.state.read().await;
        BlockKind::ALL
            .iter()
            .filter_map(|kind| {
                let mut blocks: Vec<Block> = state
                    .blocks
                    .iter()
                    .filter(|b| b.kind == *kind)
                    .cloned()
                    .collect();
                if blocks.is_empty() {
                    return None;
                }
                blocks.sort_by(|a, b| b.created_at.cmp(&a.created_at));
                Some(BlockCategory {
                    name: kind.to_string(),
                    blocks,
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::store::testing::MemoryStateStore;

    fn new_block(name: &str, kind: BlockKind) -> NewBlock {
        NewBlock {
            name: name.to_string(),
            kind,
            color: "#2563eb".to_string(),
            webhook_url: None,
            properties: serde_json::Map::new(),
        }
    }

    #[tokio::test]
    async fn add_does_not_select() {
        let store = BlockStore::load(Arc::new(MemoryStateStore::new()))
            .await
            .unwrap();
        store.add(new_block("Notes", BlockKind::Text)).await.unwrap();
        assert!(store.selected().await.is_none());
    }

    #[tokio::test]
    async fn select_and_delete_interplay() {
        let store = BlockStore::load(Arc::new(MemoryStateStore::new()))
            .await
            .unwrap();
        let block = store.add(new_block("Notes", BlockKind::Text)).await.unwrap();

        store.select(Some(block.id)).await.unwrap();
        assert_eq!(store.selected().await.unwrap().id, block.id);

        store.delete(block.id).await.unwrap();
        assert!(store.selected().await.is_none());

        assert!(matches!(
            store.select(Some(block.id)).await,
            Err(StoreError::NotFound)
        ));
    }

    #[tokio::test]
    async fn update_changes_kind_and_touches_updated_at() {
        let store = BlockStore::load(Arc::new(MemoryStateStore::new()))
            .await
            .unwrap();
        let block = store.add(new_block("Notes", BlockKind::Text)).await.unwrap();

        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        let updated = store
            .update(
                block.id,
                BlockPatch {
                    kind: Some(BlockKind::Code),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.kind, BlockKind::Code);
        assert!(updated.updated_at > block.updated_at);
    }

    #[tokio::test]
    async fn categorized_groups_newest_first_and_skips_empty() {
        let store = BlockStore::load(Arc::new(MemoryStateStore::new()))
            .await
            .unwrap();
        let older = store.add(new_block("Old text", BlockKind::Text)).await.unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        let newer = store.add(new_block("New text", BlockKind::Text)).await.unwrap();
        store
            .add(new_block("Reviewer", BlockKind::Expert))
            .await
            .unwrap();

        let categories = store.categorized().await;
        assert_eq!(categories.len(), 2);
        assert_eq!(categories[0].name, "Text Block");
        assert_eq!(categories[0].blocks[0].id, newer.id);
        assert_eq!(categories[0].blocks[1].id, older.id);
        assert_eq!(categories[1].name, "Expert Block");
    }

    #[tokio::test]
    async fn blob_layout_and_reload_round_trip() {
        let backing = Arc::new(MemoryStateStore::new());
        let store = BlockStore::load(Arc::clone(&backing)).await.unwrap();
        let block = store.add(new_block("Notes", BlockKind::Text)).await.unwrap();
        store.select(Some(block.id)).await.unwrap();

        let blob = backing.blob(BLOCKS_NAMESPACE).unwrap();
        assert_eq!(blob["blocks"][0]["type"], "Text Block");
        assert_eq!(blob["selectedBlockId"], block.id.to_string());

        let reloaded = BlockStore::load(backing).await.unwrap();
        assert_eq!(reloaded.selected().await.unwrap().id, block.id);
    }
}
