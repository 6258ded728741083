//! Block CLI commands: flat and categorized listings.

use anyhow::Result;
use comfy_table::{presets, Cell, Color, ContentArrangement, Table};
use console::style;

use crate::state::AppState;

/// List all blocks, either flat or grouped by kind.
pub async fn list_blocks(state: &AppState, categorized: bool, json: bool) -> Result<()> {
    if categorized {
        let categories = state.block_store.categorized().await;

        if json {
            println!("{}", serde_json::to_string_pretty(&categories)?);
            return Ok(());
        }

        if categories.is_empty() {
            println!();
            println!("  {} No blocks found.", style("i").blue().bold());
            println!();
            return Ok(());
        }

        println!();
        for category in &categories {
            println!(
                "  {} ({})",
                style(&category.name).cyan().bold(),
                category.blocks.len()
            );
            for block in &category.blocks {
                println!(
                    "    {} {}",
                    style("•").dim(),
                    block.name,
                );
            }
            println!();
        }
        return Ok(());
    }

    let blocks = state.block_store.list().await;

    if json {
        println!("{}", serde_json::to_string_pretty(&blocks)?);
        return Ok(());
    }

    if blocks.is_empty() {
        println!();
        println!("  {} No blocks found.", style("i").blue().bold());
        println!();
        return Ok(());
    }

    let selected_id = state.block_store.selected().await.map(|b| b.id);

    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        Cell::new("Name").fg(Color::White),
        Cell::new("Kind").fg(Color::White),
        Cell::new("Webhook").fg(Color::White),
        Cell::new("ID").fg(Color::White),
    ]);

    for block in &blocks {
        let name_display = if Some(block.id) == selected_id {
            format!("● {}", block.name)
        } else {
            block.name.clone()
        };

        let webhook_cell = match &block.webhook_url {
            Some(_) => Cell::new("✓").fg(Color::Green),
            None => Cell::new("—").fg(Color::DarkGrey),
        };

        table.add_row(vec![
            Cell::new(name_display).fg(Color::Cyan),
            Cell::new(block.kind.to_string()),
            webhook_cell,
            Cell::new(block.id.to_string()).fg(Color::DarkGrey),
        ]);
    }

    println!();
    println!("{table}");
    println!();
    println!(
        "  {} block{}",
        style(blocks.len()).bold(),
        if blocks.len() == 1 { "" } else { "s" }
    );
    println!();

    Ok(())
}
