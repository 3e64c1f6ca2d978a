use anyhow::{Context, Result};
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::time::Duration;
use tracing::info;

pub mod defaults;

use defaults::*;

use crate::database::TenantContext;

/// Environment variable prefix; nested keys use a double underscore,
/// e.g. `UPKEEP_DATABASE__URL`.
pub const ENV_PREFIX: &str = "UPKEEP_";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub tenants: TenantsConfig,
    #[serde(default)]
    pub scheduler: SchedulerConfig,
    #[serde(default)]
    pub work_orders: WorkOrderConfig,
    #[serde(default)]
    pub reminders: ReminderConfig,
    #[serde(default)]
    pub mail: MailConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_database_url")]
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// How long a job waits for a pooled connection before failing the query
    #[serde(default = "default_acquire_timeout")]
    pub acquire_timeout: String,
}

/// Where the list of active tenant schemas comes from
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TenantSource {
    /// `tenants` registry table in the shared schema
    #[default]
    Database,
    /// The `schemas` list below, in order
    Static,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TenantsConfig {
    #[serde(default)]
    pub source: TenantSource,
    #[serde(default)]
    pub schemas: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulerConfig {
    /// Cron expression (UTC) for work-order generation
    #[serde(default = "default_work_order_cron")]
    pub work_orders: String,
    /// Cron expression (UTC) for the overdue sweep
    #[serde(default = "default_overdue_cron")]
    pub overdue: String,
    /// Cron expression (UTC) for reminder dispatch
    #[serde(default = "default_reminder_cron")]
    pub reminders: String,
    /// Time budget for one tenant inside one job run
    #[serde(default = "default_tenant_timeout")]
    pub tenant_timeout: String,
    /// Run every job once immediately at startup
    #[serde(default = "default_run_on_start")]
    pub run_on_start: bool,
    /// Judge overdue against each schedule's local date instead of the run date
    #[serde(default = "default_overdue_in_schedule_timezone")]
    pub overdue_in_schedule_timezone: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkOrderConfig {
    #[serde(default = "default_work_order_severity")]
    pub default_severity: String,
    #[serde(default = "default_work_order_category")]
    pub default_category: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReminderConfig {
    /// Days before an occurrence that its reminder becomes due
    #[serde(default = "default_reminder_lead_days")]
    pub lead_days: u32,
    #[serde(default = "default_notification_type")]
    pub notification_type: String,
    #[serde(default = "default_reminder_template")]
    pub template: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MailProvider {
    /// Log reminders instead of sending them
    #[default]
    Log,
    /// POST reminders to a transactional mail HTTP API
    Http,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MailConfig {
    #[serde(default)]
    pub provider: MailProvider,
    pub endpoint: Option<String>,
    pub api_key: Option<String>,
    #[serde(default = "default_mail_from")]
    pub from_address: String,
    #[serde(default = "default_mail_timeout")]
    pub timeout: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default)]
    pub format: LogFormat,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: default_database_url(),
            max_connections: default_max_connections(),
            acquire_timeout: default_acquire_timeout(),
        }
    }
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            work_orders: default_work_order_cron(),
            overdue: default_overdue_cron(),
            reminders: default_reminder_cron(),
            tenant_timeout: default_tenant_timeout(),
            run_on_start: default_run_on_start(),
            overdue_in_schedule_timezone: default_overdue_in_schedule_timezone(),
        }
    }
}

impl Default for WorkOrderConfig {
    fn default() -> Self {
        Self {
            default_severity: default_work_order_severity(),
            default_category: default_work_order_category(),
        }
    }
}

impl Default for ReminderConfig {
    fn default() -> Self {
        Self {
            lead_days: default_reminder_lead_days(),
            notification_type: default_notification_type(),
            template: default_reminder_template(),
        }
    }
}

impl Default for MailConfig {
    fn default() -> Self {
        Self {
            provider: MailProvider::default(),
            endpoint: None,
            api_key: None,
            from_address: default_mail_from(),
            timeout: default_mail_timeout(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
        }
    }
}

impl DatabaseConfig {
    pub fn acquire_timeout(&self) -> Result<Duration> {
        humantime::parse_duration(&self.acquire_timeout)
            .with_context(|| format!("Invalid database.acquire_timeout '{}'", self.acquire_timeout))
    }
}

impl SchedulerConfig {
    pub fn tenant_timeout(&self) -> Result<Duration> {
        humantime::parse_duration(&self.tenant_timeout)
            .with_context(|| format!("Invalid scheduler.tenant_timeout '{}'", self.tenant_timeout))
    }
}

impl MailConfig {
    pub fn timeout(&self) -> Result<Duration> {
        humantime::parse_duration(&self.timeout)
            .with_context(|| format!("Invalid mail.timeout '{}'", self.timeout))
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let config_file =
            std::env::var("CONFIG_FILE").unwrap_or_else(|_| "config.toml".to_string());
        Self::load_from_file(&config_file)
    }

    /// Load defaults, then the TOML file (if present), then `UPKEEP_*` env vars.
    pub fn load_from_file(config_file: &str) -> Result<Self> {
        if std::path::Path::new(config_file).exists() {
            info!("Loading configuration from {}", config_file);
        } else {
            info!(
                "Config file {} not found, using defaults and environment",
                config_file
            );
        }

        let config: Config = Figment::from(Serialized::defaults(Config::default()))
            .merge(Toml::file(config_file))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()
            .with_context(|| format!("Failed to load configuration from {config_file}"))?;

        config.validate()?;
        Ok(config)
    }

    /// Write the default configuration as TOML, for `upkeep init-config`-style bootstrapping.
    pub fn write_default(config_file: &str) -> Result<()> {
        let contents = toml::to_string_pretty(&Self::default())?;
        std::fs::write(config_file, contents)?;
        info!("Created default config file: {}", config_file);
        Ok(())
    }

    /// Reject configurations that would only fail later inside a job run.
    pub fn validate(&self) -> Result<()> {
        for (name, expression) in [
            ("scheduler.work_orders", &self.scheduler.work_orders),
            ("scheduler.overdue", &self.scheduler.overdue),
            ("scheduler.reminders", &self.scheduler.reminders),
        ] {
            cron::Schedule::from_str(expression)
                .map_err(|e| anyhow::anyhow!("Invalid cron expression for {name} '{expression}': {e}"))?;
        }

        self.database.acquire_timeout()?;
        self.scheduler.tenant_timeout()?;
        self.mail.timeout()?;

        if self.tenants.source == TenantSource::Static {
            if self.tenants.schemas.is_empty() {
                anyhow::bail!("tenants.source = \"static\" requires at least one entry in tenants.schemas");
            }
            for schema in &self.tenants.schemas {
                TenantContext::new(schema.clone())?;
            }
        }

        if self.mail.provider == MailProvider::Http && self.mail.endpoint.is_none() {
            anyhow::bail!("mail.provider = \"http\" requires mail.endpoint");
        }

        Ok(())
    }
}
