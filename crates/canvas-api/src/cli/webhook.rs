//! Webhook CLI commands: connectivity test and pending-session count.

use anyhow::Result;
use console::style;

use crate::state::AppState;

/// POST a synthetic test envelope and report reachability.
pub async fn test_webhook(state: &AppState, url: &str, json: bool) -> Result<()> {
    let reachable = state.webhook.probe(url).await;

    if json {
        println!(
            "{}",
            serde_json::json!({ "url": url, "reachable": reachable })
        );
        return Ok(());
    }

    println!();
    if reachable {
        println!(
            "  {} {} is reachable",
            style("✓").green().bold(),
            style(url).cyan()
        );
    } else {
        println!(
            "  {} {} did not answer 2xx",
            style("✗").red().bold(),
            style(url).cyan()
        );
    }
    println!();

    Ok(())
}

/// Show the number of sessions awaiting resolution.
pub async fn pending_webhooks(state: &AppState, json: bool) -> Result<()> {
    let count = state.webhook.pending_count();

    if json {
        println!("{}", serde_json::json!({ "count": count }));
        return Ok(());
    }

    println!();
    println!(
        "  {} pending webhook session{}",
        style(count).bold(),
        if count == 1 { "" } else { "s" }
    );
    println!();

    Ok(())
}
