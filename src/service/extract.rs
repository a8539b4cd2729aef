//! Splitting raw model output into the generated site files.

use super::models::GeneratedFiles;

/// Separates the HTML from the README in model output.
pub const README_MARKER: &str = "---README.md---";

const FENCE: &str = "```";

/// README used when the model output carries no README section.
pub fn readme_fallback(brief: &str) -> String {
    format!("# README for Project\n\n**Brief:** {}", brief)
}

/// Split model output on the first [`README_MARKER`] and strip code fences from both halves.
///
/// Without a marker the whole text becomes `index.html` and the README is
/// synthesized from `brief`.
pub fn extract_files(text: &str, brief: &str) -> GeneratedFiles {
    let (code, readme) = match text.split_once(README_MARKER) {
        Some((code, readme)) => (code.to_string(), readme.to_string()),
        None => (text.to_string(), readme_fallback(brief)),
    };

    GeneratedFiles {
        index_html: strip_code_fence(&code),
        readme: strip_code_fence(&readme),
    }
}

/// Return the body of the first fenced block in `text`, trimmed.
///
/// The block runs from the first fence to the second, or to the end of the
/// text when the fence is never closed. A bare alphabetic first line
/// (`html`, `markdown`) is treated as a language hint and dropped. Text with
/// no fence is returned trimmed.
pub fn strip_code_fence(text: &str) -> String {
    let Some((_, after_open)) = text.split_once(FENCE) else {
        return text.trim().to_string();
    };
    let block = match after_open.split_once(FENCE) {
        Some((block, _)) => block,
        None => after_open,
    };

    if let Some((first_line, rest)) = block.split_once('\n') {
        if is_language_hint(first_line) {
            return rest.trim().to_string();
        }
    }
    block.trim().to_string()
}

fn is_language_hint(line: &str) -> bool {
    let line = line.trim();
    !line.is_empty() && line.chars().all(char::is_alphabetic)
}
