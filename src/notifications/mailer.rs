//! Mailer implementations

use reqwest::Client;
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, info};

use super::email::ReminderEmail;
use crate::config::MailConfig;
use crate::errors::{AppError, AppResult, MailError, MailResult};

/// Delivers one reminder to one recipient
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, recipient: &str, email: &ReminderEmail) -> MailResult<()>;
}

/// Writes reminders to the log instead of sending them
#[derive(Debug, Clone)]
pub struct LogMailer {
    from_address: String,
}

impl LogMailer {
    pub fn new(from_address: String) -> Self {
        Self { from_address }
    }
}

#[async_trait::async_trait]
impl Mailer for LogMailer {
    async fn send(&self, recipient: &str, email: &ReminderEmail) -> MailResult<()> {
        info!(
            from = %self.from_address,
            to = %recipient,
            template = %email.template,
            "Reminder email: {}",
            email.subject
        );
        Ok(())
    }
}

#[derive(Serialize)]
struct OutgoingMessage<'a> {
    from: &'a str,
    to: &'a str,
    to_name: Option<&'a str>,
    subject: &'a str,
    text: &'a str,
    template: &'a str,
}

/// Posts reminders as JSON to a transactional mail HTTP API
#[derive(Debug, Clone)]
pub struct HttpMailer {
    client: Client,
    endpoint: String,
    api_key: Option<String>,
    from_address: String,
}

impl HttpMailer {
    pub fn new(config: &MailConfig, timeout: Duration) -> AppResult<Self> {
        let endpoint = config
            .endpoint
            .clone()
            .ok_or_else(|| AppError::configuration("mail.endpoint is required for the http provider"))?;

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(MailError::from)?;

        Ok(Self {
            client,
            endpoint,
            api_key: config.api_key.clone(),
            from_address: config.from_address.clone(),
        })
    }

    fn message<'a>(&'a self, recipient: &'a str, email: &'a ReminderEmail) -> OutgoingMessage<'a> {
        OutgoingMessage {
            from: &self.from_address,
            to: recipient,
            to_name: email.recipient_name.as_deref(),
            subject: &email.subject,
            text: &email.body,
            template: &email.template,
        }
    }
}

#[async_trait::async_trait]
impl Mailer for HttpMailer {
    async fn send(&self, recipient: &str, email: &ReminderEmail) -> MailResult<()> {
        if recipient.trim().is_empty() || !recipient.contains('@') {
            return Err(MailError::InvalidRecipient {
                recipient: recipient.to_string(),
            });
        }

        let mut request = self
            .client
            .post(&self.endpoint)
            .json(&self.message(recipient, email));
        if let Some(api_key) = &self.api_key {
            request = request.bearer_auth(api_key);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(MailError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        debug!("Mail service accepted reminder for {}", recipient);
        Ok(())
    }
}
