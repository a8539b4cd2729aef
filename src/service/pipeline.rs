use std::sync::Arc;

use tracing::Instrument;
use uuid::Uuid;

use crate::config::AppConfig;
use crate::errors::PipelineError;

use super::completion::OpenAiClient;
use super::generator::{GenerationRequest, Generator};
use super::github::GitHubClient;
use super::jobs::JobRegistry;
use super::ledger::{Ledger, processed_key};
use super::models::{NotificationPayload, WebhookRequest};
use super::notify::Notifier;
use super::publisher::Publisher;

/// The collaborators one pipeline run needs, wired once at startup.
pub struct PipelineDeps {
    pub generator: Generator,
    pub publisher: Publisher,
    pub notifier: Notifier,
    pub ledger: Ledger,
}

impl PipelineDeps {
    /// Build the production collaborators from configuration.
    pub fn from_config(config: &AppConfig) -> Self {
        let http = reqwest::Client::new();
        let completion = OpenAiClient::new(
            http.clone(),
            &config.openai_base_url,
            &config.openai_api_key,
            &config.openai_model,
        );
        let github = GitHubClient::new(
            http.clone(),
            &config.github_api_url,
            &config.github_username,
            &config.github_token,
        );
        Self {
            generator: Generator::new(Arc::new(completion), config.attachments_dir.clone()),
            publisher: Publisher::new(Arc::new(github), &config.github_username),
            notifier: Notifier::new(http),
            ledger: Ledger::new(config.processed_path.clone()),
        }
    }
}

/// Runs accepted webhooks in the background: generate, publish, notify, record.
#[derive(Clone)]
pub struct PipelineRunner {
    deps: Arc<PipelineDeps>,
    jobs: JobRegistry,
}

impl PipelineRunner {
    pub fn new(deps: PipelineDeps, jobs: JobRegistry) -> Self {
        Self {
            deps: Arc::new(deps),
            jobs,
        }
    }

    pub fn jobs(&self) -> &JobRegistry {
        &self.jobs
    }

    /// Spawn a background run for `request` and return its job id immediately.
    pub fn start(&self, request: WebhookRequest) -> Uuid {
        let job_id = self.jobs.enqueue(&request.task, request.round);
        let runner = self.clone();
        let span = tracing::info_span!(
            "pipeline",
            job_id = %job_id,
            task = %request.task,
            round = request.round
        );

        tokio::spawn(
            async move {
                runner.jobs.mark_running(job_id);
                match runner.run(&request).await {
                    Ok(payload) => {
                        tracing::info!(repo = %payload.repo_url, "finished round");
                        runner.jobs.mark_succeeded(job_id, payload);
                    }
                    Err(e) => {
                        tracing::error!(error = %e, "pipeline aborted");
                        runner.jobs.mark_failed(job_id, e.to_string());
                    }
                }
            }
            .instrument(span),
        );

        job_id
    }

    /// Execute every step for one request, in order. Nothing is recorded in
    /// the ledger unless all earlier steps succeed.
    pub async fn run(&self, request: &WebhookRequest) -> Result<NotificationPayload, PipelineError> {
        tracing::info!("starting background process");

        let generation = self
            .deps
            .generator
            .generate(&GenerationRequest {
                brief: request.brief.clone(),
                attachments: request.attachments.clone(),
                checks: request.checks.clone(),
                round: request.round,
                previous_readme: None,
            })
            .await;
        if generation.used_fallback {
            tracing::warn!("publishing fallback content");
        }

        let publication = self
            .deps
            .publisher
            .publish(&request.task, &generation.files)
            .await?;
        let payload = NotificationPayload::new(request, publication);

        match request.evaluation_url.as_deref() {
            Some(url) if !url.is_empty() => self.deps.notifier.notify(url, &payload).await?,
            _ => tracing::warn!("no evaluation_url supplied, skipping notification"),
        }

        let key = processed_key(request.email.as_deref(), &request.task, request.round);
        self.deps.ledger.record(&key, &payload).await?;

        Ok(payload)
    }
}
