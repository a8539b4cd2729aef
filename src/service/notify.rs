use crate::errors::NotifyError;

use super::models::NotificationPayload;

/// Tells the evaluation service a round has been published.
#[derive(Clone)]
pub struct Notifier {
    client: reqwest::Client,
}

impl Notifier {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }

    /// POST `payload` once. Only transport failures are errors; a non-success
    /// status is logged and otherwise ignored.
    pub async fn notify(&self, url: &str, payload: &NotificationPayload) -> Result<(), NotifyError> {
        let resp = self
            .client
            .post(url)
            .json(payload)
            .send()
            .await
            .map_err(|source| NotifyError::Transport {
                url: url.to_string(),
                source,
            })?;

        let status = resp.status();
        if status.is_success() {
            tracing::info!(url = %url, task = %payload.task, round = payload.round, "evaluation service notified");
        } else {
            tracing::warn!(url = %url, status = status.as_u16(), "evaluation service answered with an error status");
        }
        Ok(())
    }
}
