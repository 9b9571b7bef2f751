use crate::infrastructure::config::{ensure_default_configs, resolve_timezone};
use crate::infrastructure::error::InfraError;
use crate::infrastructure::storage::initialize_database;
use chrono_tz::Tz;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug)]
pub struct BootstrapResult {
    pub workspace_root: PathBuf,
    pub config_dir: PathBuf,
    pub logs_dir: PathBuf,
    pub database_path: PathBuf,
    pub timezone: Tz,
}

/// Prepares the on-disk workspace: the config, state and log directories,
/// default configuration, and the key-value store's database file. The
/// resolved timezone anchors every "today" computation downstream.
pub fn bootstrap_workspace(workspace_root: &Path) -> Result<BootstrapResult, InfraError> {
    let config_dir = workspace_root.join("config");
    let state_dir = workspace_root.join("state");
    let logs_dir = workspace_root.join("logs");
    let database_path = state_dir.join("dayloop.sqlite");

    fs::create_dir_all(&config_dir)?;
    fs::create_dir_all(&state_dir)?;
    fs::create_dir_all(&logs_dir)?;

    ensure_default_configs(&config_dir)?;
    initialize_database(&database_path)?;

    Ok(BootstrapResult {
        workspace_root: workspace_root.to_path_buf(),
        timezone: resolve_timezone(&config_dir),
        config_dir,
        logs_dir,
        database_path,
    })
}
