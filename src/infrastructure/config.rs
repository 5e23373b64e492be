use crate::domain::lock::LockTimeEntriesSettings;
use crate::domain::work_duration::SubtractBreakSettings;
use crate::infrastructure::error::InfraError;
use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

const APP_JSON: &str = "app.json";
const SETTINGS_JSON: &str = "settings.json";
const TENANTS_JSON: &str = "tenants.json";
const SUPPORTED_SCHEMA: u64 = 1;
pub const DEFAULT_TIMEZONE: &str = "Europe/Berlin";
pub const DEFAULT_TENANT_ID: &str = "default";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum TenantMode {
    #[default]
    Single,
    Multi,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AppConfig {
    pub schema: u8,
    pub timezone: String,
    #[serde(default)]
    pub tenant_mode: TenantMode,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SettingsConfig {
    pub schema: u8,
    #[serde(default)]
    pub lock_time_entries: LockTimeEntriesSettings,
    #[serde(default)]
    pub subtract_breaks: SubtractBreakSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TenantConfig {
    pub id: String,
    pub timezone: String,
    #[serde(default = "default_true")]
    pub active: bool,
    #[serde(default)]
    pub lock_time_entries: LockTimeEntriesSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TenantsConfig {
    pub schema: u8,
    #[serde(default)]
    pub tenants: Vec<TenantConfig>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineSettings {
    pub zone: Tz,
    pub tenant_mode: TenantMode,
    pub lock: LockTimeEntriesSettings,
    pub subtract_breaks: SubtractBreakSettings,
}

fn default_true() -> bool {
    true
}

fn default_files() -> Vec<(&'static str, serde_json::Value)> {
    vec![
        (
            APP_JSON,
            serde_json::json!({
                "schema": 1,
                "timezone": DEFAULT_TIMEZONE,
                "tenantMode": "single"
            }),
        ),
        (
            SETTINGS_JSON,
            serde_json::json!({
                "schema": 1,
                "lockTimeEntries": {
                    "active": false,
                    "daysInPast": 2
                },
                "subtractBreaks": {
                    "active": true,
                    "enabledAt": null
                }
            }),
        ),
        (
            TENANTS_JSON,
            serde_json::json!({
                "schema": 1,
                "tenants": []
            }),
        ),
    ]
}

pub fn ensure_default_configs(config_dir: &Path) -> Result<(), InfraError> {
    for (name, value) in default_files() {
        let path = config_dir.join(name);
        if !path.exists() {
            write_pretty(&path, &value)?;
        }
    }
    Ok(())
}

fn write_pretty<T: Serialize>(path: &Path, value: &T) -> Result<(), InfraError> {
    let formatted = serde_json::to_string_pretty(value)?;
    fs::write(path, format!("{formatted}\n"))?;
    Ok(())
}

fn read_config(path: &Path) -> Result<serde_json::Value, InfraError> {
    let raw = fs::read_to_string(path)?;
    let parsed: serde_json::Value = serde_json::from_str(&raw)?;
    let schema = parsed
        .get("schema")
        .and_then(serde_json::Value::as_u64)
        .ok_or_else(|| InfraError::InvalidConfig(format!("missing schema in {}", path.display())))?;
    if schema != SUPPORTED_SCHEMA {
        return Err(InfraError::InvalidConfig(format!(
            "unsupported schema {} in {}",
            schema,
            path.display()
        )));
    }
    Ok(parsed)
}

fn read_typed<T: for<'de> Deserialize<'de>>(path: &Path) -> Result<T, InfraError> {
    Ok(serde_json::from_value(read_config(path)?)?)
}

pub fn read_app_config(config_dir: &Path) -> Result<AppConfig, InfraError> {
    read_typed(&config_dir.join(APP_JSON))
}

pub fn read_settings_config(config_dir: &Path) -> Result<SettingsConfig, InfraError> {
    read_typed(&config_dir.join(SETTINGS_JSON))
}

pub fn read_tenants_config(config_dir: &Path) -> Result<TenantsConfig, InfraError> {
    read_typed(&config_dir.join(TENANTS_JSON))
}

pub fn parse_timezone(value: &str) -> Result<Tz, InfraError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(InfraError::InvalidConfig("timezone must not be empty".to_string()));
    }
    value
        .parse::<Tz>()
        .map_err(|error| InfraError::InvalidConfig(format!("invalid timezone {value}: {error}")))
}

pub fn read_engine_settings(config_dir: &Path) -> Result<EngineSettings, InfraError> {
    let app = read_app_config(config_dir)?;
    let settings = read_settings_config(config_dir)?;
    settings.lock_time_entries.validate()?;

    Ok(EngineSettings {
        zone: parse_timezone(&app.timezone)?,
        tenant_mode: app.tenant_mode,
        lock: settings.lock_time_entries,
        subtract_breaks: settings.subtract_breaks,
    })
}

pub fn save_lock_settings(
    config_dir: &Path,
    lock: &LockTimeEntriesSettings,
) -> Result<(), InfraError> {
    lock.validate()?;
    write_settings_section(config_dir, "lockTimeEntries", serde_json::to_value(lock)?)?;
    tracing::info!(
        active = lock.active,
        days_in_past = lock.days_in_past,
        "saved lock time entries settings"
    );
    Ok(())
}

/// Switching from inactive to active stamps `enabled_at` with `now`. Entries recorded before
/// that instant keep their plain work duration.
pub fn save_subtract_break_settings(
    config_dir: &Path,
    active: bool,
    now: DateTime<Utc>,
) -> Result<SubtractBreakSettings, InfraError> {
    let previous = read_settings_config(config_dir)?.subtract_breaks;
    let subtract_breaks = SubtractBreakSettings {
        active,
        enabled_at: match (previous.active, active) {
            (_, false) => None,
            (false, true) => Some(now),
            (true, true) => previous.enabled_at,
        },
    };

    write_settings_section(
        config_dir,
        "subtractBreaks",
        serde_json::to_value(subtract_breaks)?,
    )?;
    tracing::info!(
        active,
        enabled_at = ?subtract_breaks.enabled_at,
        "saved subtract breaks settings"
    );
    Ok(subtract_breaks)
}

fn write_settings_section(
    config_dir: &Path,
    key: &str,
    value: serde_json::Value,
) -> Result<(), InfraError> {
    let path = config_dir.join(SETTINGS_JSON);
    let mut settings = read_config(&path)?;
    let object = settings.as_object_mut().ok_or_else(|| {
        InfraError::InvalidConfig(format!("invalid object structure in {}", path.display()))
    })?;
    object.insert(key.to_string(), value);
    write_pretty(&path, &settings)
}
