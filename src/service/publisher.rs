use std::sync::Arc;

use chrono::Datelike;

use crate::errors::PublishError;

use super::github::RepoHost;
use super::models::{GeneratedFiles, Publication};

pub const LICENSE_PATH: &str = "LICENSE";
pub const LICENSE_COMMIT_MESSAGE: &str = "docs: Add MIT License";

pub fn file_commit_message(filename: &str) -> String {
    format!("feat: Add/update {}", filename)
}

/// Public GitHub Pages URL for a task repository.
pub fn pages_url(username: &str, task_id: &str) -> String {
    format!("https://{}.github.io/{}/", username, task_id)
}

/// MIT license text for `holder`.
pub fn mit_license(year: i32, holder: &str) -> String {
    format!(
        "MIT License\n\
         \n\
         Copyright (c) {year} {holder}\n\
         \n\
         Permission is hereby granted, free of charge, to any person obtaining a copy\n\
         of this software and associated documentation files (the \"Software\"), to deal\n\
         in the Software without restriction, including without limitation the rights\n\
         to use, copy, modify, merge, publish, distribute, sublicense, and/or sell\n\
         copies of the Software, and to permit persons to whom the Software is\n\
         furnished to do so, subject to the following conditions:\n\
         \n\
         The above copyright notice and this permission notice shall be included in all\n\
         copies or substantial portions of the Software.\n\
         \n\
         THE SOFTWARE IS PROVIDED \"AS IS\", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR\n\
         IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,\n\
         FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE\n\
         AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER\n\
         LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM,\n\
         OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE\n\
         SOFTWARE.\n"
    )
}

/// Pushes a generated site to its own repository and turns on Pages.
pub struct Publisher {
    host: Arc<dyn RepoHost>,
    username: String,
}

impl Publisher {
    pub fn new(host: Arc<dyn RepoHost>, username: &str) -> Self {
        Self {
            host,
            username: username.to_string(),
        }
    }

    /// Create or reuse the `task_id` repository, commit the site and a
    /// license, enable Pages, and report where it all landed.
    ///
    /// Stops at the first failing call; earlier commits are not rolled back.
    pub async fn publish(
        &self,
        task_id: &str,
        files: &GeneratedFiles,
    ) -> Result<Publication, PublishError> {
        let repo = self.host.create_repo(task_id).await?;

        for (filename, content) in files.entries() {
            self.host
                .put_file(&repo, filename, content, &file_commit_message(filename))
                .await?;
        }

        let license = mit_license(chrono::Utc::now().year(), &self.username);
        self.host
            .put_file(&repo, LICENSE_PATH, &license, LICENSE_COMMIT_MESSAGE)
            .await?;

        self.host.enable_pages(&repo).await?;
        let commit_sha = self.host.latest_commit_sha(&repo).await?;

        tracing::info!(repo = %repo.full_name, commit = %commit_sha, "published");

        Ok(Publication {
            repo_url: repo.html_url,
            commit_sha,
            pages_url: pages_url(&self.username, task_id),
        })
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::RecordingHost;
    use super::*;

    fn files() -> GeneratedFiles {
        GeneratedFiles {
            index_html: "<html></html>".to_string(),
            readme: "# Site".to_string(),
        }
    }

    #[tokio::test]
    async fn test_publish_commits_files_then_license_then_pages() {
        let host = Arc::new(RecordingHost::default());
        let publisher = Publisher::new(host.clone(), "octocat");

        let publication = publisher.publish("clock-app", &files()).await.unwrap();
        assert_eq!(publication.repo_url, "https://github.com/octocat/clock-app");
        assert_eq!(publication.pages_url, "https://octocat.github.io/clock-app/");
        assert_eq!(publication.commit_sha, "cafebabe");

        let calls = host.calls.lock().unwrap().clone();
        assert_eq!(
            calls,
            vec![
                "create_repo clock-app",
                "put_file index.html",
                "put_file README.md",
                "put_file LICENSE",
                "enable_pages clock-app",
                "latest_commit_sha",
            ]
        );

        let committed = host.files.lock().unwrap();
        assert_eq!(committed[0].2, "feat: Add/update index.html");
        assert_eq!(committed[1].2, "feat: Add/update README.md");
        assert_eq!(committed[2].2, LICENSE_COMMIT_MESSAGE);
        assert!(committed[2].1.starts_with("MIT License"));
        assert!(committed[2].1.contains("octocat"));
    }

    #[tokio::test]
    async fn test_publish_stops_at_first_failure() {
        let host = Arc::new(RecordingHost::failing_on("README.md"));
        let publisher = Publisher::new(host.clone(), "octocat");

        let err = publisher.publish("clock-app", &files()).await.unwrap_err();
        assert!(matches!(err, PublishError::Api { status: 500, .. }));

        let calls = host.calls.lock().unwrap();
        assert!(!calls.iter().any(|c| c.starts_with("enable_pages")));
        assert!(!calls.iter().any(|c| c == "put_file LICENSE"));
    }

    #[test]
    fn test_pages_url_template() {
        assert_eq!(pages_url("alice", "my-task"), "https://alice.github.io/my-task/");
    }

    #[test]
    fn test_mit_license_contains_year_and_holder() {
        let text = mit_license(2026, "Alice");
        assert!(text.contains("Copyright (c) 2026 Alice"));
        assert!(text.contains("THE SOFTWARE IS PROVIDED \"AS IS\""));
    }
}
