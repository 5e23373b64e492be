use crate::domain::lock::{DayLockedEvent, LockTimeEntriesSettings, LockWindow};
use crate::infrastructure::config::{
    DEFAULT_TENANT_ID, TenantMode, parse_timezone, read_app_config, read_settings_config,
    read_tenants_config,
};
use crate::infrastructure::error::InfraError;
use crate::infrastructure::event_publisher::DayLockedPublisher;
use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::task::JoinSet;

type NowProvider = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TenantLockSettings {
    pub tenant_id: String,
    pub timezone: String,
    pub lock: LockTimeEntriesSettings,
}

pub trait TenantDirectory: Send + Sync {
    fn active_tenants(&self) -> Result<Vec<TenantLockSettings>, InfraError>;
}

#[derive(Debug, Clone)]
pub struct ConfigTenantDirectory {
    config_dir: PathBuf,
}

impl ConfigTenantDirectory {
    pub fn new(config_dir: impl AsRef<Path>) -> Self {
        Self {
            config_dir: config_dir.as_ref().to_path_buf(),
        }
    }
}

impl TenantDirectory for ConfigTenantDirectory {
    fn active_tenants(&self) -> Result<Vec<TenantLockSettings>, InfraError> {
        let app = read_app_config(&self.config_dir)?;
        match app.tenant_mode {
            TenantMode::Single => {
                let settings = read_settings_config(&self.config_dir)?;
                Ok(vec![TenantLockSettings {
                    tenant_id: DEFAULT_TENANT_ID.to_string(),
                    timezone: app.timezone,
                    lock: settings.lock_time_entries,
                }])
            }
            TenantMode::Multi => Ok(read_tenants_config(&self.config_dir)?
                .tenants
                .into_iter()
                .filter(|tenant| tenant.active)
                .map(|tenant| TenantLockSettings {
                    tenant_id: tenant.id,
                    timezone: tenant.timezone,
                    lock: tenant.lock_time_entries,
                })
                .collect()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DayLockedRunSummary {
    pub published: usize,
    pub skipped: usize,
    pub failed: usize,
}

enum TenantOutcome {
    Published,
    Skipped,
}

pub struct DayLockedScheduler<D, P>
where
    D: TenantDirectory,
    P: DayLockedPublisher,
{
    tenant_directory: Arc<D>,
    publisher: Arc<P>,
    now_provider: NowProvider,
}

impl<D, P> DayLockedScheduler<D, P>
where
    D: TenantDirectory,
    P: DayLockedPublisher + 'static,
{
    pub fn new(tenant_directory: Arc<D>, publisher: Arc<P>) -> Self {
        Self {
            tenant_directory,
            publisher,
            now_provider: Arc::new(Utc::now),
        }
    }

    pub fn with_now_provider(mut self, now_provider: NowProvider) -> Self {
        self.now_provider = now_provider;
        self
    }

    /// Evaluates every active tenant independently. A failing tenant is logged and counted, the
    /// others still run. Only failing to list the tenants is an error.
    pub async fn check_locked_and_publish(&self) -> Result<DayLockedRunSummary, InfraError> {
        let tenants = self.tenant_directory.active_tenants()?;
        let now = (self.now_provider)();

        let mut tasks: JoinSet<(String, Result<TenantOutcome, InfraError>)> = JoinSet::new();
        for tenant in tenants {
            let publisher = Arc::clone(&self.publisher);
            tasks.spawn(async move {
                let tenant_id = tenant.tenant_id.clone();
                let outcome = check_tenant(tenant, publisher.as_ref(), now).await;
                (tenant_id, outcome)
            });
        }

        let mut summary = DayLockedRunSummary::default();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((_, Ok(TenantOutcome::Published))) => summary.published += 1,
                Ok((_, Ok(TenantOutcome::Skipped))) => summary.skipped += 1,
                Ok((tenant_id, Err(error))) => {
                    summary.failed += 1;
                    tracing::error!(%tenant_id, %error, "day locked check failed for tenant");
                }
                Err(error) => {
                    summary.failed += 1;
                    tracing::error!(%error, "day locked check task did not complete");
                }
            }
        }

        tracing::info!(
            published = summary.published,
            skipped = summary.skipped,
            failed = summary.failed,
            "finished day locked check"
        );
        Ok(summary)
    }
}

async fn check_tenant<P>(
    tenant: TenantLockSettings,
    publisher: &P,
    now: DateTime<Utc>,
) -> Result<TenantOutcome, InfraError>
where
    P: DayLockedPublisher + ?Sized,
{
    let zone = parse_timezone(&tenant.timezone)?;
    tenant.lock.validate()?;

    let window = LockWindow::new(tenant.lock, zone);
    let Some(date) = window.newly_locked_date(now) else {
        tracing::debug!(tenant_id = %tenant.tenant_id, "time entry locking inactive, nothing to publish");
        return Ok(TenantOutcome::Skipped);
    };

    tracing::info!(tenant_id = %tenant.tenant_id, %date, %zone, "publishing day locked event");
    publisher
        .publish(DayLockedEvent {
            tenant_id: tenant.tenant_id,
            date,
            zone,
        })
        .await?;
    Ok(TenantOutcome::Published)
}
