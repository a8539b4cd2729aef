use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::{Deserialize, Serialize};

use crate::errors::PublishError;

const USER_AGENT: &str = "pagesmith";
const GITHUB_API_VERSION: &str = "2022-11-28";

/// A GitHub repository (subset of fields we care about).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GitHubRepo {
    pub full_name: String,
    pub name: String,
    pub html_url: String,
    #[serde(default = "default_branch")]
    pub default_branch: String,
}

fn default_branch() -> String {
    "main".to_string()
}

#[derive(Debug, Deserialize)]
struct ContentEntry {
    sha: String,
}

#[derive(Debug, Deserialize)]
struct CommitEntry {
    sha: String,
}

/// Known GitHub token prefixes.
/// See: https://github.blog/2021-04-05-behind-githubs-new-authentication-token-formats/
const GITHUB_TOKEN_PREFIXES: &[&str] = &[
    "ghp_",        // Personal access tokens (classic)
    "github_pat_", // Fine-grained personal access tokens
    "gho_",        // OAuth access tokens
    "ghu_",        // GitHub App user-to-server tokens
    "ghs_",        // GitHub App server-to-server tokens
    "ghr_",        // GitHub App refresh tokens
];

/// Format check only; does not verify the token is active or scoped for `repo`.
pub fn is_valid_github_token(token: &str) -> bool {
    !token.is_empty()
        && GITHUB_TOKEN_PREFIXES
            .iter()
            .any(|prefix| token.starts_with(prefix))
}

/// Abstraction over the repository host used by the publisher.
/// Real implementation: `GitHubClient`. Test double: `RecordingHost`.
#[async_trait]
pub trait RepoHost: Send + Sync {
    /// Create a public repository, or return the existing one with that name.
    async fn create_repo(&self, name: &str) -> Result<GitHubRepo, PublishError>;

    /// Create `path` or replace its contents with a single commit.
    async fn put_file(
        &self,
        repo: &GitHubRepo,
        path: &str,
        content: &str,
        message: &str,
    ) -> Result<(), PublishError>;

    /// Turn on Pages for the default branch root. Already enabled counts as success.
    async fn enable_pages(&self, repo: &GitHubRepo) -> Result<(), PublishError>;

    async fn latest_commit_sha(&self, repo: &GitHubRepo) -> Result<String, PublishError>;
}

/// GitHub REST client authenticated as a single user.
pub struct GitHubClient {
    client: reqwest::Client,
    api_url: String,
    owner: String,
    token: String,
}

impl GitHubClient {
    pub fn new(client: reqwest::Client, api_url: &str, owner: &str, token: &str) -> Self {
        Self {
            client,
            api_url: api_url.trim_end_matches('/').to_string(),
            owner: owner.to_string(),
            token: token.to_string(),
        }
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.client
            .request(method, format!("{}{}", self.api_url, path))
            .bearer_auth(&self.token)
            .header("User-Agent", USER_AGENT)
            .header("Accept", "application/vnd.github+json")
            .header("X-GitHub-Api-Version", GITHUB_API_VERSION)
    }

    async fn get_repo(&self, name: &str) -> Result<GitHubRepo, PublishError> {
        let endpoint = format!("/repos/{}/{}", self.owner, name);
        let resp = self.request(Method::GET, &endpoint).send().await?;
        Ok(ensure_success(resp, &format!("GET {}", endpoint)).await?.json().await?)
    }

    async fn existing_sha(&self, repo: &GitHubRepo, path: &str) -> Result<Option<String>, PublishError> {
        let endpoint = format!("/repos/{}/contents/{}", repo.full_name, path);
        let resp = self.request(Method::GET, &endpoint).send().await?;
        if resp.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let entry: ContentEntry = ensure_success(resp, &format!("GET {}", endpoint))
            .await?
            .json()
            .await?;
        Ok(Some(entry.sha))
    }
}

/// Turn a non-success response into `PublishError::Api`, keeping the body for the log.
async fn ensure_success(resp: Response, endpoint: &str) -> Result<Response, PublishError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body = resp.text().await.unwrap_or_default();
    Err(PublishError::Api {
        endpoint: endpoint.to_string(),
        status: status.as_u16(),
        body,
    })
}

#[async_trait]
impl RepoHost for GitHubClient {
    async fn create_repo(&self, name: &str) -> Result<GitHubRepo, PublishError> {
        let resp = self
            .request(Method::POST, "/user/repos")
            .json(&serde_json::json!({
                "name": name,
                "private": false,
                "auto_init": true,
            }))
            .send()
            .await?;

        // 422 means the name is taken on this account; reuse it.
        if resp.status() == StatusCode::UNPROCESSABLE_ENTITY {
            tracing::info!(repo = %name, "repository already exists, reusing it");
            return self.get_repo(name).await;
        }

        Ok(ensure_success(resp, "POST /user/repos").await?.json().await?)
    }

    async fn put_file(
        &self,
        repo: &GitHubRepo,
        path: &str,
        content: &str,
        message: &str,
    ) -> Result<(), PublishError> {
        let sha = self.existing_sha(repo, path).await?;

        let mut body = serde_json::json!({
            "message": message,
            "content": STANDARD.encode(content.as_bytes()),
            "branch": repo.default_branch,
        });
        if let Some(sha) = sha {
            body["sha"] = serde_json::Value::String(sha);
        }

        let endpoint = format!("/repos/{}/contents/{}", repo.full_name, path);
        let resp = self
            .request(Method::PUT, &endpoint)
            .json(&body)
            .send()
            .await?;
        ensure_success(resp, &format!("PUT {}", endpoint)).await?;
        tracing::debug!(repo = %repo.full_name, path = %path, "committed file");
        Ok(())
    }

    async fn enable_pages(&self, repo: &GitHubRepo) -> Result<(), PublishError> {
        let endpoint = format!("/repos/{}/pages", repo.full_name);
        let resp = self
            .request(Method::POST, &endpoint)
            .json(&serde_json::json!({
                "source": {"branch": repo.default_branch, "path": "/"}
            }))
            .send()
            .await?;

        if resp.status() == StatusCode::CONFLICT {
            tracing::debug!(repo = %repo.full_name, "pages already enabled");
            return Ok(());
        }
        ensure_success(resp, &format!("POST {}", endpoint)).await?;
        Ok(())
    }

    async fn latest_commit_sha(&self, repo: &GitHubRepo) -> Result<String, PublishError> {
        let endpoint = format!("/repos/{}/commits", repo.full_name);
        let resp = self
            .request(Method::GET, &endpoint)
            .query(&[("per_page", "1")])
            .send()
            .await?;
        let commits: Vec<CommitEntry> = ensure_success(resp, &format!("GET {}", endpoint))
            .await?
            .json()
            .await?;
        commits
            .into_iter()
            .next()
            .map(|c| c.sha)
            .ok_or_else(|| PublishError::NoCommits {
                repo: repo.full_name.clone(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn repo_json(name: &str) -> serde_json::Value {
        serde_json::json!({
            "full_name": format!("octocat/{}", name),
            "name": name,
            "html_url": format!("https://github.com/octocat/{}", name),
            "default_branch": "main"
        })
    }

    fn sample_repo() -> GitHubRepo {
        serde_json::from_value(repo_json("site")).unwrap()
    }

    fn client_for(server: &MockServer) -> GitHubClient {
        GitHubClient::new(reqwest::Client::new(), &server.uri(), "octocat", "ghp_test")
    }

    // ── is_valid_github_token ────────────────────────────────────────

    #[test]
    fn test_known_prefixes_are_valid() {
        for token in ["ghp_abc", "github_pat_abc", "gho_x", "ghu_x", "ghs_x", "ghr_x"] {
            assert!(is_valid_github_token(token), "{}", token);
        }
    }

    #[test]
    fn test_unknown_or_empty_tokens_are_invalid() {
        assert!(!is_valid_github_token(""));
        assert!(!is_valid_github_token("not-a-token"));
        assert!(!is_valid_github_token("GHP_abc123"));
        assert!(!is_valid_github_token(" ghp_abc123"));
    }

    // ── GitHubRepo deserialization ───────────────────────────────────

    #[test]
    fn test_repo_default_branch_defaults_to_main() {
        let json = r#"{"full_name":"o/r","name":"r","html_url":"https://github.com/o/r"}"#;
        let repo: GitHubRepo = serde_json::from_str(json).unwrap();
        assert_eq!(repo.default_branch, "main");
    }

    // ── create_repo ──────────────────────────────────────────────────

    #[tokio::test]
    async fn test_create_repo_posts_public_auto_init() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/user/repos"))
            .and(header("authorization", "Bearer ghp_test"))
            .and(header("user-agent", USER_AGENT))
            .and(body_partial_json(serde_json::json!({
                "name": "site", "private": false, "auto_init": true
            })))
            .respond_with(ResponseTemplate::new(201).set_body_json(repo_json("site")))
            .expect(1)
            .mount(&server)
            .await;

        let repo = client_for(&server).create_repo("site").await.unwrap();
        assert_eq!(repo.full_name, "octocat/site");
        assert_eq!(repo.html_url, "https://github.com/octocat/site");
    }

    #[tokio::test]
    async fn test_create_repo_reuses_existing_on_422() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/user/repos"))
            .respond_with(ResponseTemplate::new(422).set_body_json(serde_json::json!({
                "message": "Repository creation failed."
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/repos/octocat/site"))
            .respond_with(ResponseTemplate::new(200).set_body_json(repo_json("site")))
            .expect(1)
            .mount(&server)
            .await;

        let repo = client_for(&server).create_repo("site").await.unwrap();
        assert_eq!(repo.name, "site");
    }

    #[tokio::test]
    async fn test_create_repo_unauthorized_is_api_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/user/repos"))
            .respond_with(ResponseTemplate::new(401).set_body_string("Bad credentials"))
            .mount(&server)
            .await;

        let err = client_for(&server).create_repo("site").await.unwrap_err();
        match err {
            PublishError::Api { status, endpoint, body } => {
                assert_eq!(status, 401);
                assert_eq!(endpoint, "POST /user/repos");
                assert_eq!(body, "Bad credentials");
            }
            other => panic!("Expected Api error, got {:?}", other),
        }
    }

    // ── put_file ─────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_put_new_file_has_no_sha() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/repos/octocat/site/contents/index.html"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;
        Mock::given(method("PUT"))
            .and(path("/repos/octocat/site/contents/index.html"))
            .and(body_partial_json(serde_json::json!({
                "message": "feat: Add/update index.html",
                "content": STANDARD.encode("<html></html>"),
                "branch": "main"
            })))
            .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({})))
            .expect(1)
            .mount(&server)
            .await;

        client_for(&server)
            .put_file(&sample_repo(), "index.html", "<html></html>", "feat: Add/update index.html")
            .await
            .unwrap();

        let requests = server.received_requests().await.unwrap();
        let put = requests.iter().find(|r| r.method.as_str() == "PUT").unwrap();
        let body: serde_json::Value = serde_json::from_slice(&put.body).unwrap();
        assert!(body.get("sha").is_none());
    }

    #[tokio::test]
    async fn test_put_existing_file_sends_sha() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/repos/octocat/site/contents/README.md"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"sha": "blob123"})),
            )
            .mount(&server)
            .await;
        Mock::given(method("PUT"))
            .and(path("/repos/octocat/site/contents/README.md"))
            .and(body_partial_json(serde_json::json!({"sha": "blob123"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
            .expect(1)
            .mount(&server)
            .await;

        client_for(&server)
            .put_file(&sample_repo(), "README.md", "# Hi", "feat: Add/update README.md")
            .await
            .unwrap();
    }

    // ── enable_pages ─────────────────────────────────────────────────

    #[tokio::test]
    async fn test_enable_pages_conflict_is_ok() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/repos/octocat/site/pages"))
            .and(body_partial_json(serde_json::json!({
                "source": {"branch": "main", "path": "/"}
            })))
            .respond_with(ResponseTemplate::new(409))
            .expect(1)
            .mount(&server)
            .await;

        client_for(&server).enable_pages(&sample_repo()).await.unwrap();
    }

    #[tokio::test]
    async fn test_enable_pages_forbidden_is_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/repos/octocat/site/pages"))
            .respond_with(ResponseTemplate::new(403))
            .mount(&server)
            .await;

        let err = client_for(&server).enable_pages(&sample_repo()).await.unwrap_err();
        assert!(matches!(err, PublishError::Api { status: 403, .. }));
    }

    // ── latest_commit_sha ────────────────────────────────────────────

    #[tokio::test]
    async fn test_latest_commit_sha_takes_first() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/repos/octocat/site/commits"))
            .and(query_param("per_page", "1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                {"sha": "deadbeef"}
            ])))
            .mount(&server)
            .await;

        let sha = client_for(&server).latest_commit_sha(&sample_repo()).await.unwrap();
        assert_eq!(sha, "deadbeef");
    }

    #[tokio::test]
    async fn test_latest_commit_sha_empty_list() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/repos/octocat/site/commits"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
            .mount(&server)
            .await;

        let err = client_for(&server).latest_commit_sha(&sample_repo()).await.unwrap_err();
        assert!(matches!(err, PublishError::NoCommits { .. }));
    }
}
