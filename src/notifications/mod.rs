//! Reminder delivery
//!
//! The reminder engine talks to a [`Mailer`]; which implementation backs it
//! is a configuration choice (`mail.provider`).

pub mod email;
pub mod mailer;

pub use email::ReminderEmail;
pub use mailer::{HttpMailer, LogMailer, Mailer};

#[cfg(test)]
pub use mailer::MockMailer;

use std::sync::Arc;

use crate::config::{MailConfig, MailProvider};
use crate::errors::{AppError, AppResult};

/// Build the configured mailer
pub fn build_mailer(config: &MailConfig) -> AppResult<Arc<dyn Mailer>> {
    match config.provider {
        MailProvider::Log => Ok(Arc::new(LogMailer::new(config.from_address.clone()))),
        MailProvider::Http => {
            let timeout = config
                .timeout()
                .map_err(|e| AppError::configuration(e.to_string()))?;
            let mailer = HttpMailer::new(config, timeout)?;
            Ok(Arc::new(mailer))
        }
    }
}
