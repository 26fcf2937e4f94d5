//! Queued background jobs
//!
//! Jobs are pushed onto an in-process [`JobQueue`] and drained by the cron
//! endpoint. There is no retry: a failed job is logged and dropped.

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::sync::Mutex;

/// A record that can render itself to PDF
#[async_trait]
pub trait GeneratesPdf: Send + Sync {
    /// Name used in logs, e.g. `INV-000012`
    fn pdf_name(&self) -> String;

    /// Render the PDF, replacing the stored file when `delete_existing_file` is set
    async fn generate_pdf(&self, delete_existing_file: bool) -> Result<()>;
}

/// Regenerate the PDF of one record
#[derive(Clone)]
pub struct GeneratePdfJob {
    record: Arc<dyn GeneratesPdf>,
    delete_existing_file: bool,
    queued_at: DateTime<Utc>,
}

impl GeneratePdfJob {
    pub fn new(record: Arc<dyn GeneratesPdf>, delete_existing_file: bool) -> Self {
        Self {
            record,
            delete_existing_file,
            queued_at: Utc::now(),
        }
    }

    pub fn queued_at(&self) -> DateTime<Utc> {
        self.queued_at
    }

    /// Run the job; `0` on success
    pub async fn handle(&self) -> Result<i32> {
        self.record.generate_pdf(self.delete_existing_file).await?;
        Ok(0)
    }
}

/// FIFO queue of pending jobs
#[derive(Clone, Default)]
pub struct JobQueue {
    pending: Arc<Mutex<VecDeque<GeneratePdfJob>>>,
}

impl JobQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn dispatch(&self, job: GeneratePdfJob) {
        tracing::debug!(record = %job.record.pdf_name(), "pdf job queued");
        self.pending.lock().await.push_back(job);
    }

    pub async fn len(&self) -> usize {
        self.pending.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.pending.lock().await.is_empty()
    }

    /// Run every job queued so far, returning how many succeeded
    pub async fn run_pending(&self) -> usize {
        // The lock is released before any job runs
        let batch: Vec<GeneratePdfJob> = self.pending.lock().await.drain(..).collect();

        let mut processed = 0;
        for job in batch {
            let waited_ms = (Utc::now() - job.queued_at).num_milliseconds();
            tracing::debug!(record = %job.record.pdf_name(), waited_ms, "running pdf job");
            match job.handle().await {
                Ok(_) => processed += 1,
                Err(e) => {
                    tracing::warn!(record = %job.record.pdf_name(), error = %e, "pdf job failed")
                }
            }
        }
        processed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Recorder {
        name: &'static str,
        calls: AtomicUsize,
        deleted: AtomicUsize,
        fail: bool,
    }

    impl Recorder {
        fn new(name: &'static str, fail: bool) -> Arc<Self> {
            Arc::new(Self {
                name,
                calls: AtomicUsize::new(0),
                deleted: AtomicUsize::new(0),
                fail,
            })
        }
    }

    #[async_trait]
    impl GeneratesPdf for Recorder {
        fn pdf_name(&self) -> String {
            self.name.to_string()
        }

        async fn generate_pdf(&self, delete_existing_file: bool) -> Result<()> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if delete_existing_file {
                self.deleted.fetch_add(1, Ordering::SeqCst);
            }
            if self.fail {
                anyhow::bail!("renderer unavailable");
            }
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_handle_returns_zero_and_forwards_flag() {
        let record = Recorder::new("INV-000001", false);
        let job = GeneratePdfJob::new(record.clone(), true);

        assert!(job.queued_at() <= Utc::now());
        assert_eq!(job.handle().await.unwrap(), 0);
        assert_eq!(record.calls.load(Ordering::SeqCst), 1);
        assert_eq!(record.deleted.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_handle_propagates_failure() {
        let job = GeneratePdfJob::new(Recorder::new("EST-000001", true), false);
        assert!(job.handle().await.is_err());
    }

    #[tokio::test]
    async fn test_run_pending_drains_queue() {
        let queue = JobQueue::new();
        let ok = Recorder::new("INV-000001", false);
        let broken = Recorder::new("PAY-000001", true);

        queue.dispatch(GeneratePdfJob::new(ok.clone(), false)).await;
        queue.dispatch(GeneratePdfJob::new(broken.clone(), false)).await;
        queue.dispatch(GeneratePdfJob::new(ok.clone(), false)).await;
        assert_eq!(queue.len().await, 3);

        assert_eq!(queue.run_pending().await, 2);
        assert!(queue.is_empty().await);
        assert_eq!(ok.calls.load(Ordering::SeqCst), 2);
        assert_eq!(broken.calls.load(Ordering::SeqCst), 1);

        assert_eq!(queue.run_pending().await, 0);
    }
}
