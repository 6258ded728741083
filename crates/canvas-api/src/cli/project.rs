//! Project lifecycle CLI commands: list, create, show, delete, select,
//! generate.

use anyhow::Result;
use comfy_table::{presets, Cell, Color, ContentArrangement, Table};
use console::style;
use uuid::Uuid;

use canvas_core::agent;
use canvas_core::webhook::DispatchOptions;
use canvas_types::project::NewProject;
use canvas_types::webhook::WebhookOutcome;

use crate::state::AppState;

/// List all projects in a colored table.
pub async fn list_projects(state: &AppState, owner: Option<String>, json: bool) -> Result<()> {
    let projects = match &owner {
        Some(owner) => state.project_store.by_owner(owner).await,
        None => state.project_store.list().await,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&projects)?);
        return Ok(());
    }

    if projects.is_empty() {
        println!();
        println!(
            "  {} No projects found. Create one with: {}",
            style("i").blue().bold(),
            style("canvas project create <name>").yellow()
        );
        println!();
        return Ok(());
    }

    let current_id = state.project_store.current().await.map(|p| p.id);

    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        Cell::new("Name").fg(Color::White),
        Cell::new("Goal").fg(Color::White),
        Cell::new("Webhook").fg(Color::White),
        Cell::new("ID").fg(Color::White),
    ]);

    for project in &projects {
        let name_display = if Some(project.id) == current_id {
            format!("● {}", project.name)
        } else {
            project.name.clone()
        };

        let goal = if project.goal.len() > 50 {
            format!("{}...", &project.goal[..47])
        } else {
            project.goal.clone()
        };

        let webhook_cell = match &project.webhook_url {
            Some(_) => Cell::new("✓").fg(Color::Green),
            None => Cell::new("—").fg(Color::DarkGrey),
        };

        table.add_row(vec![
            Cell::new(name_display).fg(Color::Cyan),
            Cell::new(goal),
            webhook_cell,
            Cell::new(project.id.to_string()).fg(Color::DarkGrey),
        ]);
    }

    println!();
    println!("{table}");
    println!();
    println!(
        "  {} project{}",
        style(projects.len()).bold(),
        if projects.len() == 1 { "" } else { "s" }
    );
    println!();

    Ok(())
}

/// Create a project and make it the current selection.
pub async fn create_project(
    state: &AppState,
    name: String,
    goal: String,
    instructions: String,
    folder: String,
    webhook_url: Option<String>,
    json: bool,
) -> Result<()> {
    let project = state
        .project_store
        .add(NewProject {
            name,
            goal,
            instructions,
            folder,
            webhook_url,
            ..Default::default()
        })
        .await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&project)?);
        return Ok(());
    }

    println!();
    println!("  {} Project created and selected", style("✓").green().bold());
    println!();
    println!("  {}  {}", style("Name:").bold(), style(&project.name).cyan());
    println!("  {}  {}", style("Goal:").bold(), &project.goal);
    println!(
        "  {}  {}",
        style("ID:").bold(),
        style(project.id.to_string()).dim()
    );
    println!();

    Ok(())
}

/// Show full details of a project.
pub async fn show_project(state: &AppState, id: Uuid, json: bool) -> Result<()> {
    let project = state
        .project_store
        .get(id)
        .await
        .ok_or_else(|| anyhow::anyhow!("project {id} not found"))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&project)?);
        return Ok(());
    }

    println!();
    println!("  {}", style(&project.name).cyan().bold());
    println!();
    println!("  {}  {}", style("Goal:").bold(), &project.goal);
    if !project.instructions.is_empty() {
        println!("  {}  {}", style("Instructions:").bold(), &project.instructions);
    }
    if !project.folder.is_empty() {
        println!("  {}  {}", style("Folder:").bold(), &project.folder);
    }
    match &project.webhook_url {
        Some(url) => println!("  {}  {}", style("Webhook:").bold(), style(url).yellow()),
        None => println!("  {}  {}", style("Webhook:").bold(), style("none").dim()),
    }
    if !project.metadata.description.is_empty() {
        println!(
            "  {}  {}",
            style("Description:").bold(),
            &project.metadata.description
        );
    }
    if !project.metadata.tags.is_empty() {
        println!(
            "  {}  {}",
            style("Tags:").bold(),
            project.metadata.tags.join(", ")
        );
    }
    println!(
        "  {}  {}",
        style("Updated:").bold(),
        project.updated_at.to_rfc3339()
    );
    println!("  {}  {}", style("ID:").bold(), style(id.to_string()).dim());
    println!();

    Ok(())
}

/// Delete a project.
pub async fn delete_project(state: &AppState, id: Uuid, json: bool) -> Result<()> {
    state.project_store.delete(id).await?;

    if json {
        println!("{}", serde_json::json!({ "deleted": id.to_string() }));
        return Ok(());
    }

    println!();
    println!("  {} Project deleted", style("✓").green().bold());
    println!();
    Ok(())
}

/// Make a project the current selection.
pub async fn select_project(state: &AppState, id: Uuid, json: bool) -> Result<()> {
    state.project_store.select(Some(id)).await?;

    if json {
        println!("{}", serde_json::json!({ "selected": id.to_string() }));
        return Ok(());
    }

    println!();
    println!("  {} Project selected", style("✓").green().bold());
    println!();
    Ok(())
}

/// Dispatch an attribute generation request and wait for the session to
/// resolve, applying the generated attributes on success.
pub async fn generate_attributes(state: &AppState, id: Uuid, json: bool) -> Result<()> {
    let project = state
        .project_store
        .get(id)
        .await
        .ok_or_else(|| anyhow::anyhow!("project {id} not found"))?;
    let url = project
        .webhook_url
        .clone()
        .or_else(|| state.config.webhook.agent_url.clone())
        .ok_or_else(|| {
            anyhow::anyhow!("project has no webhook URL and no agent URL is configured")
        })?;

    let envelope = agent::attribute_request_envelope(&project);
    let session_id = envelope.session_id.clone();

    if !json {
        println!();
        println!(
            "  {} Requesting attributes for {} (session {})",
            style("⚡").bold(),
            style(&project.name).cyan(),
            style(&session_id).dim()
        );
    }

    let handle = state
        .webhook
        .dispatch(&url, envelope, DispatchOptions::default())
        .await?;
    let outcome = handle.outcome().await?;

    let Some(generated) = agent::parse_generation_outcome(&outcome) else {
        let reason = match outcome {
            WebhookOutcome::Timeout => "the session timed out".to_string(),
            WebhookOutcome::Error(e) => e,
            WebhookOutcome::Success(_) => "the response carried no attributes".to_string(),
        };
        anyhow::bail!("attribute generation failed: {reason}");
    };

    let patch = agent::apply_generated_attributes(&project, &generated);
    let updated = state.project_store.update(id, patch).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&updated)?);
        return Ok(());
    }

    println!();
    println!("  {} Attributes applied", style("✓").green().bold());
    if !updated.instructions.is_empty() {
        println!("  {}  {}", style("Instructions:").bold(), &updated.instructions);
    }
    if !updated.metadata.description.is_empty() {
        println!(
            "  {}  {}",
            style("Description:").bold(),
            &updated.metadata.description
        );
    }
    if !updated.metadata.tags.is_empty() {
        println!(
            "  {}  {}",
            style("Tags:").bold(),
            updated.metadata.tags.join(", ")
        );
    }
    println!();

    Ok(())
}
