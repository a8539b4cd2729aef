//! Webhook service — brief in, published GitHub Pages site out.
//!
//! ## Module Map
//!
//! ```text
//! ┌──────────┐   HTTP   ┌──────────────────────────────────────────────────┐
//! │  Client  │ ───────> │  server.rs  (axum Router, ServerConfig)          │
//! │          │ <─────── │    └─ api.rs  (handlers, AppState, ApiError)     │
//! └──────────┘  200/4xx │         │                                        │
//!                       │         │ PipelineRunner::start() → job id        │
//!                       │         v                                        │
//!                       │  pipeline.rs  (background tokio task)            │
//!                       │         │                                        │
//!                       │         ├─ generator.rs  ─ completion.rs         │
//!                       │         │     ├─ attachments.rs                   │
//!                       │         │     └─ extract.rs                       │
//!                       │         ├─ publisher.rs  ─ github.rs             │
//!                       │         ├─ notify.rs                             │
//!                       │         └─ ledger.rs                             │
//!                       └──────────────────────────────────────────────────┘
//! ```
//!
//! ## Supporting Modules
//!
//! | Module           | Responsibility                                        |
//! |------------------|-------------------------------------------------------|
//! | `models`         | Wire types: `WebhookRequest`, `NotificationPayload`   |
//! | `jobs`           | `JobRegistry` — status of every background run        |
//!
//! ## Request Flow
//!
//! 1. `POST /api-endpoint` → `api::receive_request()` parses JSON (400) and
//!    checks the shared secret (401).
//! 2. `PipelineRunner::start()` registers a job and spawns the run; the
//!    handler answers 200 straight away.
//! 3. `Generator` decodes attachments, calls the completion API (falling back
//!    to a canned page on any error) and splits the output into
//!    `index.html` + `README.md`.
//! 4. `Publisher` creates or reuses the repo, commits both files and a
//!    LICENSE, enables Pages, and reads back the latest commit SHA.
//! 5. `Notifier` POSTs the result to `evaluation_url`.
//! 6. `Ledger` records the payload under `email::task::roundN`.
//!
//! Any error in steps 4-6 aborts the run; it shows up in the log and in
//! `GET /jobs/{id}`, never in the original HTTP response.

pub mod api;
pub mod attachments;
pub mod completion;
pub mod extract;
pub mod generator;
pub mod github;
pub mod jobs;
pub mod ledger;
pub mod models;
pub mod notify;
pub mod pipeline;
pub mod publisher;
pub mod server;
