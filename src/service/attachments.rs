//! Decoding of inline `data:` URI attachments to local files.

use std::path::{Component, Path};

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

use crate::errors::AttachmentError;

use super::models::{AttachmentDescriptor, AttachmentOutcome, SavedAttachment};

const DATA_SCHEME: &str = "data:";
const DEFAULT_NAME: &str = "attachment";

/// Decode every `data:` attachment into `dir`, one outcome per descriptor.
///
/// Entries with any other URL scheme are skipped. A failure on one entry is
/// logged and recorded; it never stops the remaining entries.
pub async fn decode_attachments(
    dir: &Path,
    attachments: &[AttachmentDescriptor],
) -> Vec<AttachmentOutcome> {
    let mut outcomes = Vec::with_capacity(attachments.len());
    if attachments.is_empty() {
        return outcomes;
    }

    if let Err(e) = tokio::fs::create_dir_all(dir).await {
        tracing::warn!(dir = %dir.display(), error = %e, "failed to create attachment directory");
    }

    for att in attachments {
        let name = att
            .name
            .as_deref()
            .filter(|n| !n.is_empty())
            .unwrap_or(DEFAULT_NAME)
            .to_string();

        if !att.url.starts_with(DATA_SCHEME) {
            outcomes.push(AttachmentOutcome::Skipped {
                name,
                reason: "not a data URI".to_string(),
            });
            continue;
        }

        match save_one(dir, &name, &att.url).await {
            Ok(saved) => {
                tracing::debug!(name = %saved.name, path = %saved.path.display(), "saved attachment");
                outcomes.push(AttachmentOutcome::Saved(saved));
            }
            Err(e) => {
                tracing::warn!(name = %name, error = %e, "failed to decode attachment");
                outcomes.push(AttachmentOutcome::Failed {
                    name,
                    reason: e.to_string(),
                });
            }
        }
    }

    outcomes
}

/// The successfully saved attachments, in input order.
pub fn saved(outcomes: &[AttachmentOutcome]) -> Vec<SavedAttachment> {
    outcomes
        .iter()
        .filter_map(|o| match o {
            AttachmentOutcome::Saved(s) => Some(s.clone()),
            _ => None,
        })
        .collect()
}

async fn save_one(dir: &Path, name: &str, url: &str) -> Result<SavedAttachment, AttachmentError> {
    let (_header, payload) = url
        .split_once(',')
        .ok_or(AttachmentError::MissingSeparator)?;
    // Line-wrapped (MIME-style) payloads are accepted.
    let compact: Vec<u8> = payload
        .bytes()
        .filter(|b| !b.is_ascii_whitespace())
        .collect();
    let bytes = STANDARD.decode(compact)?;

    if !is_plain_file_name(name) {
        return Err(AttachmentError::UnsafeName(name.to_string()));
    }

    let path = dir.join(name);
    tokio::fs::write(&path, &bytes)
        .await
        .map_err(|source| AttachmentError::Write {
            path: path.clone(),
            source,
        })?;

    let path = std::path::absolute(&path).unwrap_or(path);
    Ok(SavedAttachment {
        name: name.to_string(),
        path,
    })
}

/// True when `name` is exactly one normal path component.
fn is_plain_file_name(name: &str) -> bool {
    let mut components = Path::new(name).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    )
}
