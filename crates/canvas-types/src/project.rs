//! Project domain types.
//!
//! A project is a user-defined workspace entry: a name, a goal, a system
//! prompt (`instructions`), a local folder reference, and an optional n8n
//! webhook URL used for AI-assisted attribute generation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Color theme preference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    Dark,
    #[default]
    System,
}

/// Per-project editor settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectSettings {
    pub auto_save: bool,
    pub snap_to_grid: bool,
    pub grid_size: u32,
    pub theme: Theme,
    pub collaboration_mode: bool,
}

impl Default for ProjectSettings {
    fn default() -> Self {
        Self {
            auto_save: true,
            snap_to_grid: true,
            grid_size: 50,
            theme: Theme::System,
            collaboration_mode: false,
        }
    }
}

/// Descriptive metadata attached to a project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectMetadata {
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default = "ProjectMetadata::default_version")]
    pub version: String,
    /// Last time the project was selected, epoch milliseconds.
    #[serde(default, with = "chrono::serde::ts_milliseconds_option")]
    pub last_accessed: Option<DateTime<Utc>>,
}

impl ProjectMetadata {
    fn default_version() -> String {
        "1.0.0".to_string()
    }
}

impl Default for ProjectMetadata {
    fn default() -> Self {
        Self {
            description: String::new(),
            tags: Vec::new(),
            version: Self::default_version(),
            last_accessed: None,
        }
    }
}

/// A user-defined project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: Uuid,
    pub name: String,
    /// What the user wants this project to accomplish.
    pub goal: String,
    /// System prompt text used by AI/agent functions.
    pub instructions: String,
    /// Local folder reference.
    pub folder: String,
    /// n8n webhook URL for AI/agent functions.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub webhook_url: Option<String>,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub updated_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub collaborators: Vec<String>,
    #[serde(default)]
    pub settings: ProjectSettings,
    #[serde(default)]
    pub metadata: ProjectMetadata,
}

/// Input for creating a project. Id and timestamps are filled by the store.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProject {
    pub name: String,
    #[serde(default)]
    pub goal: String,
    #[serde(default)]
    pub instructions: String,
    #[serde(default)]
    pub folder: String,
    #[serde(default)]
    pub webhook_url: Option<String>,
    #[serde(default)]
    pub owner: Option<String>,
    #[serde(default)]
    pub collaborators: Vec<String>,
    /// Defaults applied by the store when omitted.
    #[serde(default)]
    pub settings: Option<ProjectSettings>,
    #[serde(default)]
    pub metadata: Option<ProjectMetadata>,
}

/// Partial update for a project. Present fields replace the stored value;
/// `updated_at` is touched by the store on every successful patch.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectPatch {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub goal: Option<String>,
    #[serde(default)]
    pub instructions: Option<String>,
    #[serde(default)]
    pub folder: Option<String>,
    /// `Some(None)` clears the webhook URL, `None` leaves it untouched.
    #[serde(default, with = "double_option")]
    pub webhook_url: Option<Option<String>>,
    #[serde(default)]
    pub owner: Option<String>,
    #[serde(default)]
    pub collaborators: Option<Vec<String>>,
    #[serde(default)]
    pub settings: Option<ProjectSettings>,
    #[serde(default)]
    pub metadata: Option<ProjectMetadata>,
}

/// Serde helper distinguishing "field absent" from "field set to null".
mod double_option {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<T, S>(value: &Option<Option<T>>, serializer: S) -> Result<S::Ok, S::Error>
    where
        T: Serialize,
        S: Serializer,
    {
        match value {
            Some(inner) => inner.serialize(serializer),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
    where
        T: Deserialize<'de>,
        D: Deserializer<'de>,
    {
        Option::<T>::deserialize(deserializer).map(Some)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settings_defaults_match_source() {
        let settings = ProjectSettings::default();
        assert!(settings.auto_save);
        assert!(settings.snap_to_grid);
        assert_eq!(settings.grid_size, 50);
        assert_eq!(settings.theme, Theme::System);
        assert!(!settings.collaboration_mode);
    }

    #[test]
    fn test_theme_wire_names() {
        assert_eq!(serde_json::to_string(&Theme::System).unwrap(), "\"system\"");
        assert_eq!(
            serde_json::from_str::<Theme>("\"dark\"").unwrap(),
            Theme::Dark
        );
    }

    #[test]
    fn test_project_serializes_camel_case_ms_timestamps() {
        let now = Utc::now();
        let project = Project {
            id: Uuid::now_v7(),
            name: "Demo".to_string(),
            goal: "ship it".to_string(),
            instructions: String::new(),
            folder: "~/demo".to_string(),
            webhook_url: None,
            created_at: now,
            updated_at: now,
            owner: None,
            collaborators: Vec::new(),
            settings: ProjectSettings::default(),
            metadata: ProjectMetadata::default(),
        };

        let json = serde_json::to_value(&project).unwrap();
        assert_eq!(json["createdAt"], now.timestamp_millis());
        assert!(json["settings"]["snapToGrid"].as_bool().unwrap());
        // Absent optionals are omitted, not null
        assert!(json.get("webhookUrl").is_none());
    }

    #[test]
    fn test_patch_distinguishes_absent_from_null() {
        let patch: ProjectPatch = serde_json::from_str(r#"{"name":"x"}"#).unwrap();
        assert!(patch.webhook_url.is_none());

        let patch: ProjectPatch = serde_json::from_str(r#"{"webhookUrl":null}"#).unwrap();
        assert_eq!(patch.webhook_url, Some(None));

        let patch: ProjectPatch =
            serde_json::from_str(r#"{"webhookUrl":"https://n8n.local/hook"}"#).unwrap();
        assert_eq!(
            patch.webhook_url,
            Some(Some("https://n8n.local/hook".to_string()))
        );
    }
}
