use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use super::models::NotificationPayload;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Queued,
    Running,
    Succeeded,
    Failed,
}

/// Observable record of one background pipeline run.
#[derive(Debug, Clone, Serialize)]
pub struct JobRecord {
    pub id: Uuid,
    pub task: String,
    pub round: u32,
    pub status: JobStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<NotificationPayload>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip)]
    seq: u64,
}

/// Records kept before finished runs start being evicted.
pub const DEFAULT_JOB_CAPACITY: usize = 1000;

impl JobStatus {
    pub fn is_finished(self) -> bool {
        matches!(self, JobStatus::Succeeded | JobStatus::Failed)
    }
}

/// In-memory registry of pipeline runs. Cheap to clone; clones share state.
///
/// Bounded: once `capacity` records exist, enqueueing evicts the oldest
/// finished runs. Queued and running jobs are never evicted.
#[derive(Clone)]
pub struct JobRegistry {
    jobs: Arc<RwLock<HashMap<Uuid, JobRecord>>>,
    next_seq: Arc<AtomicU64>,
    capacity: usize,
}

impl Default for JobRegistry {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_JOB_CAPACITY)
    }
}

impl JobRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            jobs: Arc::new(RwLock::new(HashMap::new())),
            next_seq: Arc::new(AtomicU64::new(0)),
            capacity: capacity.max(1),
        }
    }

    pub fn len(&self) -> usize {
        self.jobs.read().map(|jobs| jobs.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn enqueue(&self, task: &str, round: u32) -> Uuid {
        let id = Uuid::new_v4();
        let now = Utc::now();
        let record = JobRecord {
            id,
            task: task.to_string(),
            round,
            status: JobStatus::Queued,
            error: None,
            result: None,
            created_at: now,
            updated_at: now,
            seq: self.next_seq.fetch_add(1, Ordering::Relaxed),
        };
        if let Ok(mut jobs) = self.jobs.write() {
            evict_finished(&mut jobs, self.capacity);
            jobs.insert(id, record);
        }
        id
    }

    pub fn mark_running(&self, id: Uuid) {
        self.update(id, |job| job.status = JobStatus::Running);
    }

    pub fn mark_succeeded(&self, id: Uuid, payload: NotificationPayload) {
        self.update(id, |job| {
            job.status = JobStatus::Succeeded;
            job.result = Some(payload);
        });
    }

    pub fn mark_failed(&self, id: Uuid, error: String) {
        self.update(id, |job| {
            job.status = JobStatus::Failed;
            job.error = Some(error);
        });
    }

    pub fn get(&self, id: Uuid) -> Option<JobRecord> {
        self.jobs.read().ok()?.get(&id).cloned()
    }

    fn update(&self, id: Uuid, f: impl FnOnce(&mut JobRecord)) {
        let Ok(mut jobs) = self.jobs.write() else {
            tracing::error!(job_id = %id, "job registry lock poisoned");
            return;
        };
        if let Some(job) = jobs.get_mut(&id) {
            f(job);
            job.updated_at = Utc::now();
        }
    }
}

/// Drop the oldest finished records until there is room for one more.
fn evict_finished(jobs: &mut HashMap<Uuid, JobRecord>, capacity: usize) {
    if jobs.len() < capacity {
        return;
    }
    let mut finished: Vec<(DateTime<Utc>, u64, Uuid)> = jobs
        .values()
        .filter(|job| job.status.is_finished())
        .map(|job| (job.updated_at, job.seq, job.id))
        .collect();
    finished.sort();

    let excess = jobs.len() + 1 - capacity;
    for (_, _, id) in finished.into_iter().take(excess) {
        jobs.remove(&id);
    }
    if jobs.len() >= capacity {
        tracing::warn!(
            active = jobs.len(),
            capacity,
            "job registry is over capacity with unfinished runs"
        );
    }
}
