use std::path::PathBuf;

use serde::{Deserialize, Serialize};

fn default_round() -> u32 {
    1
}

/// Inbound webhook body for `POST /api-endpoint`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookRequest {
    pub secret: String,
    pub task: String,
    pub brief: String,
    #[serde(default)]
    pub attachments: Vec<AttachmentDescriptor>,
    #[serde(default)]
    pub checks: Vec<serde_json::Value>,
    #[serde(default = "default_round")]
    pub round: u32,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub nonce: Option<String>,
    #[serde(default)]
    pub evaluation_url: Option<String>,
}

/// One attachment as sent by the client. Only `data:` URLs are decoded.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AttachmentDescriptor {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub url: String,
}

/// An attachment decoded and written to local disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedAttachment {
    pub name: String,
    pub path: PathBuf,
}

/// Result of decoding one attachment descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum AttachmentOutcome {
    Saved(SavedAttachment),
    Skipped { name: String, reason: String },
    Failed { name: String, reason: String },
}

/// The two files the generator produces, in publication order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GeneratedFiles {
    pub index_html: String,
    pub readme: String,
}

impl GeneratedFiles {
    pub const INDEX_HTML: &'static str = "index.html";
    pub const README: &'static str = "README.md";

    /// `(filename, content)` pairs in the order they are committed.
    pub fn entries(&self) -> [(&'static str, &str); 2] {
        [
            (Self::INDEX_HTML, self.index_html.as_str()),
            (Self::README, self.readme.as_str()),
        ]
    }
}

/// Where a generated site ended up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Publication {
    pub repo_url: String,
    pub commit_sha: String,
    pub pages_url: String,
}

/// Body POSTed to the evaluation callback and stored in the request log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationPayload {
    pub email: Option<String>,
    pub task: String,
    pub round: u32,
    pub nonce: Option<String>,
    pub repo_url: String,
    pub commit_sha: String,
    pub pages_url: String,
}

impl NotificationPayload {
    pub fn new(request: &WebhookRequest, publication: Publication) -> Self {
        Self {
            email: request.email.clone(),
            task: request.task.clone(),
            round: request.round,
            nonce: request.nonce.clone(),
            repo_url: publication.repo_url,
            commit_sha: publication.commit_sha,
            pages_url: publication.pages_url,
        }
    }
}

/// Immediate response to an accepted webhook.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AcceptedResponse {
    pub status: String,
    pub message: String,
    pub task_received: String,
    pub job_id: uuid::Uuid,
}
