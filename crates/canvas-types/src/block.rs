//! Building-block domain types.
//!
//! Blocks are the reusable sidebar elements. The five kinds and their wire
//! names ("Text Block", "Image Block", ...) are fixed by the stored blob
//! format.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The kind of a building block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BlockKind {
    #[serde(rename = "Text Block")]
    Text,
    #[serde(rename = "Image Block")]
    Image,
    #[serde(rename = "Code Block")]
    Code,
    #[serde(rename = "Form Block")]
    Form,
    #[serde(rename = "Expert Block")]
    Expert,
}

impl BlockKind {
    /// All kinds in display/category order.
    pub const ALL: [BlockKind; 5] = [
        BlockKind::Text,
        BlockKind::Image,
        BlockKind::Code,
        BlockKind::Form,
        BlockKind::Expert,
    ];

    /// The human-readable (and wire) name of this kind.
    pub fn name(&self) -> &'static str {
        match self {
            BlockKind::Text => "Text Block",
            BlockKind::Image => "Image Block",
            BlockKind::Code => "Code Block",
            BlockKind::Form => "Form Block",
            BlockKind::Expert => "Expert Block",
        }
    }
}

impl std::fmt::Display for BlockKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// A building block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Block {
    pub id: Uuid,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: BlockKind,
    /// Display color, hex string.
    pub color: String,
    /// n8n webhook URL for AI/agent functions.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub webhook_url: Option<String>,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub updated_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "serde_json::Map::is_empty")]
    pub properties: serde_json::Map<String, serde_json::Value>,
}

/// Blocks grouped by kind for the sidebar.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlockCategory {
    pub name: String,
    pub blocks: Vec<Block>,
}

/// Input for creating a block. Id and timestamps are filled by the store.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewBlock {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: BlockKind,
    pub color: String,
    #[serde(default)]
    pub webhook_url: Option<String>,
    #[serde(default)]
    pub properties: serde_json::Map<String, serde_json::Value>,
}

/// Partial update for a block.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockPatch {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, rename = "type")]
    pub kind: Option<BlockKind>,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub webhook_url: Option<String>,
    #[serde(default)]
    pub properties: Option<serde_json::Map<String, serde_json::Value>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_block_kind_wire_names() {
        assert_eq!(
            serde_json::to_string(&BlockKind::Text).unwrap(),
            "\"Text Block\""
        );
        assert_eq!(
            serde_json::from_str::<BlockKind>("\"Expert Block\"").unwrap(),
            BlockKind::Expert
        );
    }

    #[test]
    fn test_block_kind_display_matches_wire_name() {
        for kind in BlockKind::ALL {
            assert_eq!(
                serde_json::to_value(kind).unwrap().as_str().unwrap(),
                kind.to_string()
            );
        }
    }

    #[test]
    fn test_block_round_trips() {
        let now = Utc::now();
        let block = Block {
            id: Uuid::now_v7(),
            name: "Summarizer".to_string(),
            kind: BlockKind::Expert,
            color: "#7c3aed".to_string(),
            webhook_url: Some("https://n8n.local/hook/expert".to_string()),
            created_at: now,
            updated_at: now,
            properties: serde_json::Map::new(),
        };

        let json = serde_json::to_string(&block).unwrap();
        let back: Block = serde_json::from_str(&json).unwrap();
        assert_eq!(back.kind, BlockKind::Expert);
        assert_eq!(back.created_at.timestamp_millis(), now.timestamp_millis());
    }
}
