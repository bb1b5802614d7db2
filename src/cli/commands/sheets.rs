//! `sheets` command: list a spreadsheet's worksheets

use anyhow::{Context, Result};
use colored::Colorize;

use crate::api::filter_worksheets;
use crate::cli::SheetsArgs;
use crate::cli::output::{OutputFormat, render_csv, render_table};

pub async fn handle(args: SheetsArgs) -> Result<()> {
    let config = crate::global_config();
    let client = super::build_client().await?;

    let all_sheets = client
        .fetch_sheets(&args.spreadsheet)
        .await
        .map_err(|err| anyhow::anyhow!("{}", err.user_message()))
        .context("Failed to list worksheets")?;
    let fetched_count = all_sheets.len();

    let sheets = if args.all {
        all_sheets
    } else {
        filter_worksheets(all_sheets, &config.settings.sheet_prefix)
    };

    if sheets.is_empty() {
        // Distinguish "nothing matched the prefix" from "spreadsheet is empty"
        if fetched_count > 0 {
            println!(
                "No worksheets start with {:?} ({} other worksheets; pass --all to see them).",
                config.settings.sheet_prefix, fetched_count
            );
        } else {
            println!("The spreadsheet has no worksheets.");
        }
        return Ok(());
    }

    let headers = ["name", "rows", "columns", "status"];
    let rows: Vec<Vec<String>> = sheets
        .iter()
        .map(|sheet| {
            vec![
                sheet.name.clone(),
                sheet.row_count.to_string(),
                sheet.columns.len().to_string(),
                sheet
                    .error
                    .clone()
                    .unwrap_or_else(|| "ok".to_string()),
            ]
        })
        .collect();

    match args.format {
        OutputFormat::Table => print!("{}", render_table(&headers, &rows)),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&sheets)?),
        OutputFormat::Csv => print!("{}", render_csv(&headers, &rows)),
    }

    if args.sample && args.format == OutputFormat::Table {
        for sheet in &sheets {
            if sheet.sample_data.is_empty() {
                continue;
            }
            println!();
            println!("{}", sheet.name.bold());
            println!("{}", serde_json::to_string_pretty(&sheet.sample_data)?);
        }
    }

    Ok(())
}
