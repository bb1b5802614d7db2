//! `auth` commands: manage the API token

use anyhow::{Context, Result};

use crate::cli::AuthCommands;
use crate::config::repository::options;
use crate::config::settings::ENV_TOKEN;

pub async fn handle(command: AuthCommands) -> Result<()> {
    let pool = &crate::global_config().pool;

    match command {
        AuthCommands::SetToken { token } => {
            let token = match token {
                Some(token) => token,
                None => rpassword::prompt_password("API token: ")
                    .context("Failed to read the token")?,
            };
            let token = token.trim();
            if token.is_empty() {
                anyhow::bail!("The token is empty; nothing was stored.");
            }
            options::set_string(pool, options::KEY_API_TOKEN, token).await?;
            println!("Token stored.");
        }
        AuthCommands::Status => {
            if std::env::var(ENV_TOKEN).map(|t| !t.is_empty()).unwrap_or(false) {
                println!("A token is set via {} (overrides the store).", ENV_TOKEN);
            } else if options::get_string(pool, options::KEY_API_TOKEN)
                .await?
                .is_some()
            {
                println!("A token is stored in the configuration store.");
            } else {
                println!("No token is configured. Run `sheetsync auth set-token`.");
            }
        }
        AuthCommands::Clear => {
            options::delete(pool, options::KEY_API_TOKEN).await?;
            println!("Stored token removed.");
        }
    }
    Ok(())
}
