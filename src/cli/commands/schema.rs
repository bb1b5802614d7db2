//! `schema` command: show a destination table's columns

use anyhow::Result;
use colored::Colorize;
use log::debug;

use crate::api::{SchemaInspector, SchemaOrigin};
use crate::cli::SchemaArgs;
use crate::cli::output::{OutputFormat, render_csv, render_table};

pub async fn handle(args: SchemaArgs) -> Result<()> {
    let client = super::build_client().await?;
    let schema = SchemaInspector::new(&client).inspect(&args.table).await;
    debug!("column list for {} came from: {}", args.table, schema.origin.label());

    match schema.origin {
        SchemaOrigin::Live => {}
        SchemaOrigin::Fallback => {
            eprintln!(
                "{}",
                "warning: schema endpoint unavailable, showing the built-in column list"
                    .yellow()
            );
        }
        SchemaOrigin::Empty => {
            anyhow::bail!(
                "Could not fetch the schema for {:?} and no built-in column list exists for it \
                 (built-ins: {}).",
                args.table,
                crate::api::fallback::FALLBACK_TABLE_NAMES.join(", ")
            );
        }
    }

    let headers = ["column", "type", "nullable", "default"];
    let rows: Vec<Vec<String>> = schema
        .columns
        .iter()
        .map(|column| {
            vec![
                column.name.clone(),
                column.data_type.clone(),
                if column.nullable { "yes" } else { "no" }.to_string(),
                column.default.clone().unwrap_or_default(),
            ]
        })
        .collect();

    match args.format {
        OutputFormat::Table => print!("{}", render_table(&headers, &rows)),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&schema.columns)?),
        OutputFormat::Csv => print!("{}", render_csv(&headers, &rows)),
    }

    Ok(())
}
