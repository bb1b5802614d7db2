//! `map` commands: compute, inspect and edit per-table column mappings

use anyhow::{Context, Result};
use colored::Colorize;
use dialoguer::{Confirm, Select};
use log::debug;
use sqlx::SqlitePool;

use crate::api::{SchemaInspector, SyncApiClient};
use crate::cli::output::render_table;
use crate::cli::{MapAutoArgs, MapCommands, MapEditArgs};
use crate::config::repository::mappings as mapping_store;
use crate::services::matching::{self, ColumnMapping, Suggestion};

/// Where a mapping came from when resolving one for use
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MappingOrigin {
    Stored,
    Computed,
}

/// Stored mapping first; only compute an auto-map when nothing is stored.
pub async fn resolve_mapping(
    pool: &SqlitePool,
    table: &str,
    destination_columns: &[String],
    source_columns: &[String],
) -> Result<(ColumnMapping, MappingOrigin)> {
    let stored = mapping_store::get_column_mapping(pool, table).await?;
    if !stored.is_empty() {
        return Ok((stored, MappingOrigin::Stored));
    }
    Ok((
        matching::auto_map(destination_columns, source_columns),
        MappingOrigin::Computed,
    ))
}

pub async fn handle(command: MapCommands) -> Result<()> {
    match command {
        MapCommands::Auto(args) => auto(args).await,
        MapCommands::Show { table } => show(&table).await,
        MapCommands::Set {
            table,
            source,
            target,
        } => {
            let pool = &crate::global_config().pool;
            mapping_store::set_mapping_entry(pool, &table, &source, &target).await?;
            println!("Mapped {:?} -> {:?} for {}.", source, target, table);
            Ok(())
        }
        MapCommands::Unset { table, source } => {
            let pool = &crate::global_config().pool;
            mapping_store::delete_mapping_entry(pool, &table, &source).await?;
            println!("Removed the entry for {:?} from {}.", source, table);
            Ok(())
        }
        MapCommands::Clear { table, yes } => clear(&table, yes).await,
        MapCommands::Edit(args) => edit(args).await,
    }
}

async fn auto(args: MapAutoArgs) -> Result<()> {
    let config = crate::global_config();
    let client = super::build_client().await?;

    let sheet = find_worksheet(&client, &args.spreadsheet, &args.sheet).await?;
    let schema = SchemaInspector::new(&client).inspect(&args.table).await;
    if schema.columns.is_empty() {
        anyhow::bail!("No columns are known for table {:?}.", args.table);
    }
    let destination_columns = schema.column_names();

    // The server-side suggester is consulted for its logs only; the local
    // mapper stays authoritative.
    match client
        .fetch_mapping_suggestions(&sheet.columns, &args.table)
        .await
    {
        Ok(body) => debug!("server mapping suggestions: {}", body),
        Err(err) => debug!("server mapping suggestions unavailable: {}", err),
    }

    let (mapping, origin) = if args.refresh {
        (
            matching::auto_map(&destination_columns, &sheet.columns),
            MappingOrigin::Computed,
        )
    } else {
        resolve_mapping(
            &config.pool,
            &args.table,
            &destination_columns,
            &sheet.columns,
        )
        .await?
    };

    if mapping.is_empty() {
        println!(
            "No sheet columns could be matched to {}; map them by hand with `sheetsync map set`.",
            args.table
        );
        return Ok(());
    }

    match origin {
        MappingOrigin::Stored => println!(
            "Using the stored mapping for {} (pass --refresh to recompute):",
            args.table
        ),
        MappingOrigin::Computed => println!("Suggested mapping for {}:", args.table),
    }
    print_mapping(&mapping, &sheet.columns);

    if args.save {
        mapping_store::replace_column_mapping(&config.pool, &args.table, &mapping).await?;
        println!("Saved.");
    } else if origin == MappingOrigin::Computed {
        println!("Not saved; pass --save to persist it.");
    }

    Ok(())
}

async fn show(table: &str) -> Result<()> {
    let pool = &crate::global_config().pool;
    let mapping = mapping_store::get_column_mapping(pool, table).await?;
    if mapping.is_empty() {
        println!("No mapping is stored for {}.", table);
        return Ok(());
    }
    print_mapping(&mapping, &[]);
    Ok(())
}

async fn clear(table: &str, yes: bool) -> Result<()> {
    let pool = &crate::global_config().pool;
    if !yes {
        let confirmed = Confirm::new()
            .with_prompt(format!("Drop the stored mapping for {}?", table))
            .default(false)
            .interact()
            .context("Confirmation aborted")?;
        if !confirmed {
            println!("Nothing changed.");
            return Ok(());
        }
    }
    mapping_store::clear_column_mapping(pool, table).await?;
    println!("Cleared the mapping for {}.", table);
    Ok(())
}

async fn edit(args: MapEditArgs) -> Result<()> {
    let config = crate::global_config();
    let client = super::build_client().await?;

    let sheet = find_worksheet(&client, &args.spreadsheet, &args.sheet).await?;
    let schema = SchemaInspector::new(&client).inspect(&args.table).await;
    if schema.columns.is_empty() {
        anyhow::bail!("No columns are known for table {:?}.", args.table);
    }
    let destination_columns = schema.column_names();

    let (mut mapping, origin) = resolve_mapping(
        &config.pool,
        &args.table,
        &destination_columns,
        &sheet.columns,
    )
    .await?;
    if origin == MappingOrigin::Computed && !mapping.is_empty() {
        println!("Starting from a computed mapping (nothing was stored).");
    }

    loop {
        let mut items: Vec<String> = destination_columns
            .iter()
            .map(|dest| match mapping.source_for(dest) {
                Some(source) => format!("{}  <-  {}", dest, source),
                None => format!("{}  (unmapped)", dest),
            })
            .collect();
        items.push("Save and exit".to_string());
        items.push("Discard changes".to_string());

        let choice = Select::new()
            .with_prompt(format!("Mapping for {}", args.table))
            .items(&items)
            .default(0)
            .interact()
            .context("Editor aborted")?;

        if choice == destination_columns.len() {
            mapping_store::replace_column_mapping(&config.pool, &args.table, &mapping).await?;
            println!("Saved the mapping for {}.", args.table);
            return Ok(());
        }
        if choice == destination_columns.len() + 1 {
            println!("Discarded.");
            return Ok(());
        }

        let destination = &destination_columns[choice];
        edit_one(destination, &sheet.columns, &mut mapping)?;
    }
}

/// Pick a source column for one destination column. Suggestions come
/// first, labeled by match tier; assigning steals the destination from any
/// other source, keeping the mapping invariant.
fn edit_one(destination: &str, source_columns: &[String], mapping: &mut ColumnMapping) -> Result<()> {
    let suggestions: Vec<Suggestion> = matching::suggest(destination, source_columns);
    let others: Vec<String> = source_columns
        .iter()
        .filter(|source| !suggestions.iter().any(|s| &s.source_column == *source))
        .cloned()
        .collect();

    let mut items: Vec<String> = suggestions
        .iter()
        .map(|s| format!("{} {}", s.source_column, s.match_type.label().dimmed()))
        .collect();
    items.extend(others.iter().cloned());
    items.push("(leave unmapped)".to_string());

    let pick = Select::new()
        .with_prompt(format!("Source column for {}", destination))
        .items(&items)
        .default(0)
        .interact()
        .context("Editor aborted")?;

    if pick == items.len() - 1 {
        if let Some(source) = mapping.source_for(destination).map(str::to_string) {
            mapping.remove_source(&source);
        }
        return Ok(());
    }

    let source = if pick < suggestions.len() {
        suggestions[pick].source_column.clone()
    } else {
        others[pick - suggestions.len()].clone()
    };

    mapping.assign(source, destination);
    Ok(())
}

fn print_mapping(mapping: &ColumnMapping, source_columns: &[String]) {
    let rows: Vec<Vec<String>> = mapping
        .iter()
        .map(|(source, target)| {
            let tier = matching::suggest(target, source_columns)
                .into_iter()
                .find(|s| &s.source_column == source)
                .map(|s| s.match_type.label().to_string())
                .unwrap_or_default();
            vec![source.clone(), target.clone(), tier]
        })
        .collect();
    print!("{}", render_table(&["source", "destination", "match"], &rows));
}

/// Fetch the named worksheet, honoring the sync prefix filter
pub(crate) async fn find_worksheet(
    client: &SyncApiClient,
    spreadsheet: &str,
    sheet_name: &str,
) -> Result<crate::api::SheetInfo> {
    let config = crate::global_config();
    let sheets = client
        .fetch_sheets(spreadsheet)
        .await
        .map_err(|err| anyhow::anyhow!("{}", err.user_message()))
        .context("Failed to list worksheets")?;
    let sheets = crate::api::filter_worksheets(sheets, &config.settings.sheet_prefix);

    let sheet = sheets
        .into_iter()
        .find(|sheet| sheet.name == sheet_name)
        .with_context(|| {
            format!(
                "Worksheet {:?} not found (only names starting with {:?} are sync sources).",
                sheet_name, config.settings.sheet_prefix
            )
        })?;

    if let Some(error) = &sheet.error {
        anyhow::bail!("Worksheet {:?} could not be read: {}", sheet_name, error);
    }
    if sheet.columns.is_empty() {
        anyhow::bail!("Worksheet {:?} has no header row.", sheet_name);
    }
    Ok(sheet)
}
