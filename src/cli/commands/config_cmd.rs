//! `config` commands: show local configuration

use anyhow::Result;

use crate::cli::ConfigCommands;
use crate::config::Settings;

pub async fn handle(command: ConfigCommands) -> Result<()> {
    let config = crate::global_config();

    match command {
        ConfigCommands::Path => {
            match Settings::config_file() {
                Some(path) => println!("settings: {}", path.display()),
                None => println!("settings: (no config directory on this platform)"),
            }
            println!("store:    {}", config.settings.database_path()?.display());
        }
        ConfigCommands::Show => {
            print!("{}", toml::to_string_pretty(&config.settings)?);
        }
    }
    Ok(())
}
