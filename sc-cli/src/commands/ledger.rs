//! Ledger commands: list, badge, mark read, clear.

use comfy_table::{modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL, ContentArrangement, Table};
use console::style;

use sc_core::config::ConfigHandle;
use sc_core::error::ScResult;
use crate::OutputFormat;

pub async fn list(
    config: ConfigHandle,
    unread_only: bool,
    ephemeral: bool,
    format: OutputFormat,
) -> ScResult<()> {
    let center = super::start_center(&config, ephemeral, format).await?;
    let mut records = center.records().await;
    if unread_only {
        records.retain(|r| r.is_unread());
    }

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&records).unwrap_or_default());
        }
        OutputFormat::Text => {
            if records.is_empty() {
                println!("No notifications.");
                return Ok(());
            }

            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .apply_modifier(UTF8_ROUND_CORNERS)
                .set_content_arrangement(ContentArrangement::Dynamic);
            table.set_header(vec!["", "ID", "Title", "Body", "Received"]);

            for r in &records {
                let marker = if r.read { " " } else { "*" };
                table.add_row(vec![
                    marker.to_string(),
                    super::truncate(&r.id, 24),
                    super::truncate(&r.title, 30),
                    super::truncate(&r.body, 40),
                    super::format_timestamp(r.timestamp),
                ]);
            }

            println!("{table}");
            println!(
                "{} notification(s), {} unread",
                records.len(),
                style(center.unread_count().await).bold()
            );
        }
    }

    Ok(())
}

pub async fn badge(config: ConfigHandle, ephemeral: bool, format: OutputFormat) -> ScResult<()> {
    let center = super::start_center(&config, ephemeral, format).await?;
    let count = center.unread_count().await;

    match format {
        OutputFormat::Json => println!("{}", serde_json::json!({ "unread_count": count })),
        OutputFormat::Text => println!("Unread: {}", style(count).bold()),
    }
    Ok(())
}

pub async fn mark_all_read(config: ConfigHandle, ephemeral: bool, format: OutputFormat) -> ScResult<()> {
    let center = super::start_center(&config, ephemeral, format).await?;
    let before = center.unread_count().await;
    let after = center.mark_all_read().await;
    let marked = before.saturating_sub(after);

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::json!({ "marked": marked, "unread_count": after }));
        }
        OutputFormat::Text => {
            println!("{} {} notification(s) as read.", style("Marked").green(), marked);
        }
    }
    Ok(())
}

pub async fn mark_read(
    config: ConfigHandle,
    id: &str,
    ephemeral: bool,
    format: OutputFormat,
) -> ScResult<()> {
    let center = super::start_center(&config, ephemeral, format).await?;
    let found = center.mark_read(id).await;
    let unread = center.unread_count().await;

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::json!({ "id": id, "found": found, "unread_count": unread }));
        }
        OutputFormat::Text => {
            if found {
                println!("{} {id} as read. Unread: {unread}", style("Marked").green());
            } else {
                println!("{} no notification with id {id}", style("Not found:").yellow());
            }
        }
    }
    Ok(())
}

pub async fn clear(config: ConfigHandle, ephemeral: bool, format: OutputFormat) -> ScResult<()> {
    let center = super::start_center(&config, ephemeral, format).await?;
    let total = center.records().await.len();
    center.clear().await;

    match format {
        OutputFormat::Json => println!("{}", serde_json::json!({ "removed": total })),
        OutputFormat::Text => println!("{} {total} notification(s).", style("Removed").green()),
    }
    Ok(())
}
