use crate::domain::ports::NotificationService;
use crate::error::AppError;
use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use tracing::error;

pub struct HttpNotificationService {
    client: Client,
    api_url: String,
    api_key: String,
}

impl HttpNotificationService {
    pub fn new(api_url: String, api_key: String) -> Self {
        Self {
            client: Client::new(),
            api_url,
            api_key,
        }
    }
}

#[derive(Serialize)]
struct NotificationPayload<'a> {
    user_id: &'a str,
    #[serde(rename = "type")]
    kind: &'a str,
    title: &'a str,
    message: &'a str,
}

#[async_trait]
impl NotificationService for HttpNotificationService {
    async fn send_to_user(&self, user_id: &str, kind: &str, title: &str, message: &str) -> Result<(), AppError> {
        let payload = NotificationPayload { user_id, kind, title, message };

        let res = self.client.post(&self.api_url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&payload)
            .send()
            .await
            .map_err(|e| {
                let msg = format!("Notification service connection error: {}", e);
                error!("{}", msg);
                AppError::InternalWithMsg(msg)
            })?;

        if !res.status().is_success() {
            let status = res.status();
            let text = res.text().await.unwrap_or_default();
            let msg = format!("Notification service failed. Status: {}, Body: {}", status, text);
            error!("{}", msg);
            return Err(AppError::InternalWithMsg(msg));
        }

        Ok(())
    }
}

/// Used when no notification endpoint is configured.
pub struct LogOnlyNotificationService;

#[async_trait]
impl NotificationService for LogOnlyNotificationService {
    async fn send_to_user(&self, user_id: &str, kind: &str, title: &str, _message: &str) -> Result<(), AppError> {
        tracing::info!(user_id = %user_id, kind = %kind, "Notification (not delivered): {}", title);
        Ok(())
    }
}
