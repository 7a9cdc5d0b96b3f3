use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A family tree owned by the record keeper
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FamilyTree {
    pub id: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl FamilyTree {
    /// Generate a unique ID for a tree
    pub fn generate_id(timestamp_millis: u64) -> String {
        format!("tree::{}", timestamp_millis)
    }

    /// Filesystem-safe name for a tree ID ("tree::123" -> "tree_123")
    pub fn directory_name(tree_id: &str) -> String {
        tree_id
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '-' { c } else { '_' })
            .collect::<String>()
            .split('_')
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join("_")
    }
}
