//! `tables` command: list destination tables

use anyhow::{Context, Result};

use crate::cli::TablesArgs;
use crate::cli::output::{OutputFormat, render_csv, render_table};

pub async fn handle(args: TablesArgs) -> Result<()> {
    let client = super::build_client().await?;
    let tables = client
        .fetch_tables()
        .await
        .map_err(|err| anyhow::anyhow!("{}", err.user_message()))
        .context("Failed to list destination tables")?;

    if tables.is_empty() {
        println!("The backend reports no syncable tables.");
        return Ok(());
    }

    let headers = ["name", "display name"];
    let rows: Vec<Vec<String>> = tables
        .iter()
        .map(|table| {
            vec![
                table.name.clone(),
                table.display_name.clone().unwrap_or_default(),
            ]
        })
        .collect();

    match args.format {
        OutputFormat::Table => print!("{}", render_table(&headers, &rows)),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&tables)?),
        OutputFormat::Csv => print!("{}", render_csv(&headers, &rows)),
    }

    Ok(())
}
