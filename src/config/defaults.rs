/// Configuration default values
///
/// This module contains all the default values for configuration options,
/// making them easily changeable in one central location.
// Database defaults
pub const DEFAULT_DATABASE_URL: &str = "sqlite://./upkeep.db";
pub const DEFAULT_MAX_CONNECTIONS: u32 = 10;
pub const DEFAULT_ACQUIRE_TIMEOUT: &str = "5s";

// Scheduler defaults (cron, seconds first, evaluated in UTC)
pub const DEFAULT_WORK_ORDER_CRON: &str = "0 0 1 * * *";
pub const DEFAULT_OVERDUE_CRON: &str = "0 0 8 * * *";
pub const DEFAULT_REMINDER_CRON: &str = "0 0 9 * * *";
pub const DEFAULT_TENANT_TIMEOUT: &str = "10m";
pub const DEFAULT_RUN_ON_START: bool = false;
pub const DEFAULT_OVERDUE_IN_SCHEDULE_TIMEZONE: bool = false;

// Work order defaults
pub const DEFAULT_WORK_ORDER_SEVERITY: &str = "medium";
pub const DEFAULT_WORK_ORDER_CATEGORY: &str = "preventive_maintenance";

// Reminder defaults
pub const DEFAULT_REMINDER_LEAD_DAYS: u32 = 7;
pub const DEFAULT_NOTIFICATION_TYPE: &str = "email";
pub const DEFAULT_REMINDER_TEMPLATE: &str = "maintenance-reminder";

// Mail defaults
pub const DEFAULT_MAIL_FROM: &str = "maintenance@localhost";
pub const DEFAULT_MAIL_TIMEOUT: &str = "15s";

// Logging defaults
pub const DEFAULT_LOG_LEVEL: &str = "info";

pub fn default_database_url() -> String {
    DEFAULT_DATABASE_URL.to_string()
}

pub fn default_max_connections() -> u32 {
    DEFAULT_MAX_CONNECTIONS
}

pub fn default_acquire_timeout() -> String {
    DEFAULT_ACQUIRE_TIMEOUT.to_string()
}

pub fn default_work_order_cron() -> String {
    DEFAULT_WORK_ORDER_CRON.to_string()
}

pub fn default_overdue_cron() -> String {
    DEFAULT_OVERDUE_CRON.to_string()
}

pub fn default_reminder_cron() -> String {
    DEFAULT_REMINDER_CRON.to_string()
}

pub fn default_tenant_timeout() -> String {
    DEFAULT_TENANT_TIMEOUT.to_string()
}

pub fn default_run_on_start() -> bool {
    DEFAULT_RUN_ON_START
}

pub fn default_overdue_in_schedule_timezone() -> bool {
    DEFAULT_OVERDUE_IN_SCHEDULE_TIMEZONE
}

pub fn default_work_order_severity() -> String {
    DEFAULT_WORK_ORDER_SEVERITY.to_string()
}

pub fn default_work_order_category() -> String {
    DEFAULT_WORK_ORDER_CATEGORY.to_string()
}

pub fn default_reminder_lead_days() -> u32 {
    DEFAULT_REMINDER_LEAD_DAYS
}

pub fn default_notification_type() -> String {
    DEFAULT_NOTIFICATION_TYPE.to_string()
}

pub fn default_reminder_template() -> String {
    DEFAULT_REMINDER_TEMPLATE.to_string()
}

pub fn default_mail_from() -> String {
    DEFAULT_MAIL_FROM.to_string()
}

pub fn default_mail_timeout() -> String {
    DEFAULT_MAIL_TIMEOUT.to_string()
}

pub fn default_log_level() -> String {
    DEFAULT_LOG_LEVEL.to_string()
}
