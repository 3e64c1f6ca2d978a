use serde::Serialize;

use crate::models::ReminderDispatch;

/// A rendered maintenance reminder
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReminderEmail {
    /// Template identifier understood by the mail service
    pub template: String,
    pub recipient_name: Option<String>,
    pub subject: String,
    pub body: String,
}

impl ReminderEmail {
    pub fn for_dispatch(dispatch: &ReminderDispatch, template: &str) -> Self {
        let asset = dispatch.asset_name.as_deref().unwrap_or("an asset");
        let greeting = match dispatch.display_name.as_deref() {
            Some(name) if !name.trim().is_empty() => format!("Hello {},", name.trim()),
            _ => "Hello,".to_string(),
        };

        Self {
            template: template.to_string(),
            recipient_name: dispatch.display_name.clone(),
            subject: format!(
                "Upcoming maintenance: {} due {}",
                dispatch.schedule_title, dispatch.scheduled_at
            ),
            body: format!(
                "{greeting}\n\n\"{}\" on {asset} is due on {}.\n\nYou receive this reminder because you are assigned to this maintenance schedule.\n",
                dispatch.schedule_title,
                dispatch.scheduled_at.format("%A, %d %B %Y"),
            ),
        }
    }
}
