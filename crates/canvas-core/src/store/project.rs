//! Project store service.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use uuid::Uuid;

use canvas_types::error::StoreError;
use canvas_types::project::{NewProject, Project, ProjectPatch};

use super::{StateStore, PROJECTS_NAMESPACE};

/// Persisted shape of the project namespace blob.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProjectState {
    #[serde(default)]
    projects: Vec<Project>,
    #[serde(default)]
    current_project_id: Option<Uuid>,
}

/// Project collection with a current-selection pointer.
///
/// Generic over the [`StateStore`] port; every mutation writes the full
/// state blob back under [`PROJECTS_NAMESPACE`].
pub struct ProjectStore<S: StateStore> {
    store: S,
    state: RwLock<ProjectState>,
}

impl<S: StateStore> ProjectStore<S> {
    /// Load the store, starting empty when the namespace has no blob yet.
    pub async fn load(store: S) -> Result<Self, StoreError> {
        let state = match store.load(PROJECTS_NAMESPACE).await? {
            Some(value) => serde_json::from_value(value)
                .map_err(|e| StoreError::Serialization(e.to_string()))?,
            None => ProjectState::default(),
        };
        Ok(Self {
            store,
            state: RwLock::new(state),
        })
    }

    async fn persist(&self, state: &ProjectState) -> Result<(), StoreError> {
        let value = serde_json::to_value(state)
            .map_err(|e| StoreError::Serialization(e.to_string()))?;
        self.store.save(PROJECTS_NAMESPACE, &value).await
    }

    /// Create a project and make it the current selection.
    pub async fn add(&self, new: NewProject) -> Result<Project, StoreError> {
        let now = Utc::now();
        let project = Project {
            id: Uuid::now_v7(),
            name: new.name,
            goal: new.goal,
            instructions: new.instructions,
            folder: new.folder,
            webhook_url: new.webhook_url,
            created_at: now,
            updated_at: now,
            owner: new.owner,
            collaborators: new.collaborators,
            settings: new.settings.unwrap_or_default(),
            metadata: new.metadata.unwrap_or_default(),
        };

        let mut state = self.state.write().await;
        state.projects.push(project.clone());
        state.current_project_id = Some(project.id);
        self.persist(&state).await?;

        tracing::info!(project_id = %project.id, name = %project.name, "project created");
        Ok(project)
    }

    /// Apply a partial update and touch `updated_at`.
    pub async fn update(&self, id: Uuid, patch: ProjectPatch) -> Result<Project, StoreError> {
        let mut state = self.state.write().await;
        let project = state
            .projects
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or(StoreError::NotFound)?;

        if let Some(name) = patch.name {
            project.name = name;
        }
        if let Some(goal) = patch.goal {
            project.goal = goal;
        }
        if let Some(instructions) = patch.instructions {
            project.instructions = instructions;
        }
        if let Some(folder) = patch.folder {
            project.folder = folder;
        }
        if let Some(webhook_url) = patch.webhook_url {
            project.webhook_url = webhook_url;
        }
        if let Some(owner) = patch.owner {
            project.owner = Some(owner);
        }
        if let Some(collaborators) = patch.collaborators {
            project.collaborators = collaborators;
        }
        if let Some(settings) = patch.settings {
            project.settings = settings;
        }
        if let Some(metadata) = patch.metadata {
            project.metadata = metadata;
        }
        project.updated_at = Utc::now();

        let updated = project.clone();
        self.persist(&state).await?;
        Ok(updated)
    }

    /// Delete a project, clearing the current selection if it pointed at it.
    pub async fn delete(&self, id: Uuid) -> Result<(), StoreError> {
        let mut state = self.state.write().await;
        let before = state.projects.len();
        state.projects.retain(|p| p.id != id);
        if state.projects.len() == before {
            return Err(StoreError::NotFound);
        }
        if state.current_project_id == Some(id) {
            state.current_project_id = None;
        }
        self.persist(&state).await?;

        tracing::info!(project_id = %id, "project deleted");
        Ok(())
    }

    /// Change the current selection. Selecting a project touches its
    /// `last_accessed` metadata; `None` clears the selection.
    pub async fn select(&self, id: Option<Uuid>) -> Result<(), StoreError> {
        let mut state = self.state.write().await;
        if let Some(id) = id {
            let project = state
                .projects
                .iter_mut()
                .find(|p| p.id == id)
                .ok_or(StoreError::NotFound)?;
            let now = Utc::now();
            project.metadata.last_accessed = Some(now);
            project.updated_at = now;
        }
        state.current_project_id = id;
        self.persist(&state).await
    }

    pub async fn get(&self, id: Uuid) -> Option<Project> {
        let state = self.state.read().await;
        state.projects.iter().find(|p| p.id == id).cloned()
    }

    pub async fn current(&self) -> Option<Project> {
        let state = self.state.read().await;
        let id = state.current_project_id?;
        state.projects.iter().find(|p| p.id == id).cloned()
    }

    pub async fn list(&self) -> Vec<Project> {
        self.state.read().await.projects.clone()
    }

    pub async fn by_owner(&self, owner: &str) -> Vec<Project> {
        let state = self.state.read().await;
        state
            .projects
            .iter()
            .filter(|p| p.owner.as_deref() == Some(owner))
            .cloned()
            .collect()
    }
}
