use std::path::PathBuf;
use std::sync::Arc;

use super::attachments::{decode_attachments, saved};
use super::completion::CompletionClient;
use super::extract::{README_MARKER, extract_files, readme_fallback};
use super::models::{
    AttachmentDescriptor, AttachmentOutcome, GeneratedFiles, SavedAttachment,
};

pub const SYSTEM_PROMPT: &str = "You are a helpful coding assistant.";

/// Everything the generator needs for one round.
#[derive(Debug, Clone, Default)]
pub struct GenerationRequest {
    pub brief: String,
    pub attachments: Vec<AttachmentDescriptor>,
    pub checks: Vec<serde_json::Value>,
    pub round: u32,
    /// README from the previous round. Accepted but not yet fed into the prompt.
    pub previous_readme: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Generation {
    pub files: GeneratedFiles,
    pub attachments: Vec<SavedAttachment>,
    pub outcomes: Vec<AttachmentOutcome>,
    pub used_fallback: bool,
}

/// Produces `index.html` and `README.md` for a brief via the completion API.
pub struct Generator {
    client: Arc<dyn CompletionClient>,
    attachments_dir: PathBuf,
}

impl Generator {
    pub fn new(client: Arc<dyn CompletionClient>, attachments_dir: PathBuf) -> Self {
        Self {
            client,
            attachments_dir,
        }
    }

    /// Generate the site files. Completion failures are absorbed: the
    /// deterministic fallback page is used instead, so this never fails.
    pub async fn generate(&self, request: &GenerationRequest) -> Generation {
        let outcomes = decode_attachments(&self.attachments_dir, &request.attachments).await;
        let attachments = saved(&outcomes);
        let prompt = build_prompt(&request.brief, &summarize_attachments(&attachments));

        tracing::debug!(
            round = request.round,
            checks = request.checks.len(),
            attachments = attachments.len(),
            "requesting completion"
        );

        let (text, used_fallback) = match self.client.complete(SYSTEM_PROMPT, &prompt).await {
            Ok(text) => {
                tracing::info!(round = request.round, "code generated");
                (text, false)
            }
            Err(e) => {
                tracing::warn!(error = %e, "completion failed, using fallback content");
                (fallback_response(&request.brief), true)
            }
        };

        Generation {
            files: extract_files(&text, &request.brief),
            attachments,
            outcomes,
            used_fallback,
        }
    }
}

/// One-line description of the saved attachments for the prompt.
pub fn summarize_attachments(saved: &[SavedAttachment]) -> String {
    if saved.is_empty() {
        "No attachments.".to_string()
    } else {
        format!("{} attachment(s) included.", saved.len())
    }
}

pub fn build_prompt(brief: &str, attachments_summary: &str) -> String {
    format!(
        "You are an expert web developer.\n\
         Task: {brief}\n\
         Attachments summary: {attachments_summary}\n\
         Output format rules:\n\
         1.  Produce a complete, self-contained `index.html` file.\n\
         2.  After the code, on a new line, write exactly: {README_MARKER}\n\
         3.  After that, write a professional `README.md`.\n\
         4.  Do not include any other commentary.\n"
    )
}

/// Model output substituted when the completion call fails.
pub fn fallback_response(brief: &str) -> String {
    format!(
        "<html><body><h1>Fallback App</h1><p>{brief}</p></body></html>\n{README_MARKER}\n{}",
        readme_fallback(brief)
    )
}
