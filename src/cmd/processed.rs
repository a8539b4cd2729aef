//! Request log inspection — `pagesmith processed`.

use std::path::PathBuf;

use anyhow::{Context, Result, bail};

use pagesmith::config::processed_path_from_env;
use pagesmith::service::ledger::Ledger;

/// Print the request log at `path` (or the default location), or a single entry.
pub fn cmd_processed(path: Option<PathBuf>, key: Option<&str>) -> Result<()> {
    let path = path.unwrap_or_else(processed_path_from_env);
    let map = Ledger::new(&path).load();

    let output = match key {
        Some(key) => match map.get(key) {
            Some(entry) => serde_json::to_string_pretty(entry)?,
            None => bail!("No processed request with key '{}' in {}", key, path.display()),
        },
        None => serde_json::to_string_pretty(&map).context("Failed to render request log")?,
    };
    println!("{}", output);
    Ok(())
}
