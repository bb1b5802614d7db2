//! `history` command: last sync time for a table/spreadsheet pair

use anyhow::{Context, Result};

use crate::cli::HistoryArgs;

pub async fn handle(args: HistoryArgs) -> Result<()> {
    let client = super::build_client().await?;
    let history = client
        .fetch_history(&args.table, &args.spreadsheet)
        .await
        .map_err(|err| anyhow::anyhow!("{}", err.user_message()))
        .context("Failed to fetch sync history")?;

    match history.last_sync_time {
        Some(last) => println!("{} was last synced at {}.", args.table, last),
        None => println!("{} has never been synced from this spreadsheet.", args.table),
    }
    Ok(())
}
