use std::{env, fs};

use anyhow::{Context, Result};

use super::super::exit_status::ExitStatus;
use super::{CommandResult, CommandSummary, InitSummary};
use crate::config::{CONFIG_FILE_NAME, default_config_json};

pub fn init() -> Result<CommandResult> {
    let config_path = env::current_dir()?.join(CONFIG_FILE_NAME);

    if config_path.exists() {
        anyhow::bail!("{} already exists", CONFIG_FILE_NAME);
    }

    fs::write(&config_path, default_config_json()?)
        .with_context(|| format!("Failed to write {}", CONFIG_FILE_NAME))?;

    Ok(CommandResult {
        summary: CommandSummary::Init(InitSummary {
            path: CONFIG_FILE_NAME.to_string(),
        }),
        exit_status: ExitStatus::Success,
    })
}
