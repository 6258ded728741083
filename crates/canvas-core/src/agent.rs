//! AI-assisted project attribute generation.
//!
//! Thin glue between the project store and the webhook correlator: builds
//! the `generate-project-attributes` envelope sent to a project's n8n flow
//! and folds the generated attributes back into a project patch.

use uuid::Uuid;

use canvas_types::project::{Project, ProjectPatch};
use canvas_types::webhook::{
    action, ProjectGenerationResponse, WebhookEnvelope, WebhookOutcome, WebhookResponse,
};

/// Session-id prefix for attribute generation requests.
const SESSION_PREFIX: &str = "project-creation";

/// Build the envelope asking the automation side to generate attributes
/// for `project`. Each call mints a fresh unique session id.
pub fn attribute_request_envelope(project: &Project) -> WebhookEnvelope {
    WebhookEnvelope::new(
        format!("{SESSION_PREFIX}-{}", Uuid::now_v7()),
        action::GENERATE_PROJECT_ATTRIBUTES,
        serde_json::json!({
            "projectName": project.name,
            "goal": project.goal,
            "instructions": project.instructions,
        }),
    )
}

/// Extract the generation payload from a resolved outcome.
///
/// Returns `None` for errors, timeouts, remote failures, and payloads that
/// do not look like a generation response.
pub fn parse_generation_outcome(outcome: &WebhookOutcome) -> Option<ProjectGenerationResponse> {
    match outcome {
        WebhookOutcome::Success(WebhookResponse {
            success: true,
            data: Some(data),
            ..
        }) => serde_json::from_value(data.clone()).ok(),
        _ => None,
    }
}

/// Fold generated attributes into a patch for `project`.
///
/// Empty generated strings leave the existing value alone; description and
/// tags merge into the project's current metadata so version and
/// last-accessed survive.
pub fn apply_generated_attributes(
    project: &Project,
    generated: &ProjectGenerationResponse,
) -> ProjectPatch {
    let mut metadata = project.metadata.clone();
    if !generated.description.is_empty() {
        metadata.description = generated.description.clone();
    }
    if !generated.tags.is_empty() {
        metadata.tags = generated.tags.clone();
    }

    ProjectPatch {
        instructions: (!generated.instructions.is_empty())
            .then(|| generated.instructions.clone()),
        folder: (!generated.folder.is_empty()).then(|| generated.folder.clone()),
        settings: generated.settings.clone(),
        metadata: Some(metadata),
        ..Default::default()
    }
}
