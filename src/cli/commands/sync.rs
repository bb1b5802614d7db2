//! `sync` command: run one sheet-to-table sync

use anyhow::{Context, Result};
use colored::Colorize;
use dialoguer::Confirm;
use is_terminal::IsTerminal;
use log::debug;

use crate::api::{SchemaInspector, SyncRequest};
use crate::cli::SyncArgs;
use crate::config::repository::options;
use crate::sync::{LogTag, ProgressEstimator, SyncPresenter, SyncRunner};

use super::mapping::{MappingOrigin, find_worksheet, resolve_mapping};

pub async fn handle(args: SyncArgs) -> Result<()> {
    let config = crate::global_config();
    let client = super::build_client().await?;
    if !client.has_token() {
        anyhow::bail!("No API token is configured. Run `sheetsync auth set-token` first.");
    }

    // Source worksheet: row count feeds the ETA, headers feed the mapping
    let sheet = find_worksheet(&client, &args.spreadsheet, &args.sheet).await?;

    // Destination schema (degrades to the built-in list when the endpoint
    // is down, so the run can still be prepared)
    let schema = SchemaInspector::new(&client).inspect(&args.table).await;
    if schema.columns.is_empty() {
        anyhow::bail!("No columns are known for table {:?}.", args.table);
    }

    let (mapping, origin) = resolve_mapping(
        &config.pool,
        &args.table,
        &schema.column_names(),
        &sheet.columns,
    )
    .await?;
    if mapping.is_empty() {
        anyhow::bail!(
            "No column mapping for {} and nothing could be auto-matched. \
             Run `sheetsync map edit` first.",
            args.table
        );
    }
    if origin == MappingOrigin::Computed {
        println!("No stored mapping for {}; using the auto-computed one.", args.table);
    }

    // Last-run bookkeeping is informational only
    match client.fetch_history(&args.table, &args.spreadsheet).await {
        Ok(history) => {
            if let Some(last) = history.last_sync_time {
                println!("Last synced: {}", format_sync_time(&last));
            }
        }
        Err(err) => debug!("sync history unavailable: {}", err),
    }

    if args.truncate && !args.yes {
        let confirmed = Confirm::new()
            .with_prompt(format!(
                "This will DELETE every existing row in {} before inserting. Continue?",
                args.table
            ))
            .default(false)
            .interact()
            .context("Confirmation aborted")?;
        if !confirmed {
            println!("Nothing changed.");
            return Ok(());
        }
    }

    let request = SyncRequest {
        spreadsheet_id: args.spreadsheet.clone(),
        sheet_name: sheet.name.clone(),
        target_table: args.table.clone(),
        column_mapping: mapping,
        truncate_table: args.truncate,
        enable_incremental_sync: args.incremental,
    };

    let learned_rate = options::get_f64(&config.pool, options::KEY_MS_PER_ROW).await?;
    let row_estimate = (sheet.row_count > 0).then_some(sheet.row_count);
    let mut estimator = ProgressEstimator::new(row_estimate, learned_rate);
    let mut presenter = SyncPresenter::new();
    if args.truncate {
        presenter.note_warning(format!("truncating {} before insert", args.table));
    }

    println!(
        "Syncing {:?} -> {} ({} rows expected, ETA ~{}s)",
        sheet.name,
        args.table,
        sheet.row_count,
        estimator.eta().as_secs()
    );

    let render = std::io::stdout().is_terminal() && !args.no_progress;
    let mut runner = SyncRunner::new(&client).with_render(render);
    let outcome = runner
        .run(&request, &mut estimator, &mut presenter)
        .await
        .map_err(|err| anyhow::anyhow!("{}", err.user_message()))
        .context("Sync stream failed")?;
    debug_assert!(runner.phase().is_terminal());
    debug!("run ended in phase {:?} ({})", runner.phase(), runner.phase().label());

    // Replay the run log (the live line only showed percentages)
    for line in presenter.lines(None) {
        println!("{}", line.render_colored());
    }

    let stats = outcome.stats;
    println!(
        "{} {} processed, {} inserted, {} updated, {} errors in {:.1}s",
        if outcome.success {
            "done:".green().bold().to_string()
        } else {
            "failed:".red().bold().to_string()
        },
        stats.processed,
        stats.inserted,
        stats.updated,
        stats.errors,
        outcome.duration.as_secs_f64()
    );

    if let Some(dir) = &args.log_dir {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create {}", dir.display()))?;
        let path = presenter.export(dir)?;
        println!("Run log written to {}", path.display());
    }

    if outcome.success {
        // Feed the next run's ETA
        let rate = estimator.learned_rate_after(outcome.duration, stats.inserted, stats.updated);
        options::set_f64(&config.pool, options::KEY_MS_PER_ROW, rate).await?;
        debug!("learned sync rate persisted: {} ms/row", rate);
        Ok(())
    } else {
        if args.log_dir.is_none() && !presenter.lines(Some(LogTag::Error)).is_empty() {
            println!("Re-run with --log-dir DIR to keep the full run log.");
        }
        anyhow::bail!("Sync failed: {}", outcome.message);
    }
}

/// Render the backend's RFC3339 timestamp in local time when it parses
fn format_sync_time(raw: &str) -> String {
    match chrono::DateTime::parse_from_rfc3339(raw) {
        Ok(parsed) => parsed
            .with_timezone(&chrono::Local)
            .format("%Y-%m-%d %H:%M:%S")
            .to_string(),
        Err(_) => raw.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_sync_time_parses_rfc3339() {
        let formatted = format_sync_time("2026-08-01T09:30:00+09:00");
        assert!(formatted.starts_with("2026-08-01") || formatted.starts_with("2026-07-31"));
    }

    #[test]
    fn test_format_sync_time_passes_through_garbage() {
        assert_eq!(format_sync_time("yesterday-ish"), "yesterday-ish");
    }
}
