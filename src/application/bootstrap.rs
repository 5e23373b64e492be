use crate::infrastructure::config::{EngineSettings, ensure_default_configs, read_engine_settings};
use crate::infrastructure::error::InfraError;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug)]
pub struct BootstrapResult {
    pub workspace_root: PathBuf,
    pub config_dir: PathBuf,
    pub settings: EngineSettings,
}

pub fn bootstrap_workspace(workspace_root: &Path) -> Result<BootstrapResult, InfraError> {
    let config_dir = workspace_root.join("config");
    fs::create_dir_all(&config_dir)?;

    ensure_default_configs(&config_dir)?;
    let settings = read_engine_settings(&config_dir)?;
    tracing::info!(
        workspace_root = %workspace_root.display(),
        zone = %settings.zone,
        "bootstrapped time accounting workspace"
    );

    Ok(BootstrapResult {
        workspace_root: workspace_root.to_path_buf(),
        config_dir,
        settings,
    })
}
