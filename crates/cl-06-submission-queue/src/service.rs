//! # Submission Queue Service
//!
//! ```text
//! enqueue(task) ──→ lanes[complaint] ──(one drain task per lane)──→ Semaphore(workers) ──→ TaskExecutor
//! ```
//!
//! A lane stays in the map while its drain task runs, including while the
//! last task executes, so a later enqueue for the same complaint joins the
//! running lane instead of starting a second one. The drain task removes
//! the lane under its shard lock when it finds it empty.
//!
//! Must be used from within a Tokio runtime.

use crate::domain::{QueueConfig, QueueStats, SubmissionTask};
use crate::error::{QueueError, QueueResult};
use crate::ports::inbound::SubmissionQueueApi;
use crate::ports::outbound::TaskExecutor;
use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use shared_types::ComplaintId;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::{Notify, Semaphore};
use tracing::{debug, info, warn};

struct QueueInner {
    executor: Arc<dyn TaskExecutor>,
    config: QueueConfig,
    lanes: DashMap<ComplaintId, VecDeque<SubmissionTask>>,
    workers: Arc<Semaphore>,
    queued: AtomicUsize,
    closed: AtomicBool,
    idle: Notify,
    executed: AtomicU64,
    failed: AtomicU64,
    rejected: AtomicU64,
}

/// Handle to the queue. Cheap to clone.
#[derive(Clone)]
pub struct SubmissionQueue {
    inner: Arc<QueueInner>,
}

impl SubmissionQueue {
    pub fn new(executor: Arc<dyn TaskExecutor>, config: QueueConfig) -> Self {
        let workers = Arc::new(Semaphore::new(config.workers.max(1)));
        Self {
            inner: Arc::new(QueueInner {
                executor,
                config,
                lanes: DashMap::new(),
                workers,
                queued: AtomicUsize::new(0),
                closed: AtomicBool::new(false),
                idle: Notify::new(),
                executed: AtomicU64::new(0),
                failed: AtomicU64::new(0),
                rejected: AtomicU64::new(0),
            }),
        }
    }

    pub fn config(&self) -> &QueueConfig {
        &self.inner.config
    }

    fn reserve_slot(&self) -> QueueResult<()> {
        let capacity = self.inner.config.max_queued;
        self.inner
            .queued
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| {
                (n < capacity).then_some(n + 1)
            })
            .map(|_| ())
            .map_err(|_| {
                self.inner.rejected.fetch_add(1, Ordering::Relaxed);
                QueueError::Full { capacity }
            })
    }
}

impl QueueInner {
    /// Next task of the lane, or `None` after removing the empty lane.
    fn next_task(&self, complaint_id: &ComplaintId) -> Option<SubmissionTask> {
        match self.lanes.entry(complaint_id.clone()) {
            Entry::Occupied(mut lane) => match lane.get_mut().pop_front() {
                Some(task) => Some(task),
                None => {
                    lane.remove();
                    None
                }
            },
            Entry::Vacant(_) => None,
        }
    }

    fn finish_task(&self) {
        if self.queued.fetch_sub(1, Ordering::SeqCst) == 1 {
            self.idle.notify_waiters();
        }
    }
}

/// Run a lane's tasks one at a time until it is empty.
async fn drain_lane(inner: Arc<QueueInner>, complaint_id: ComplaintId) {
    while let Some(task) = inner.next_task(&complaint_id) {
        let permit = match inner.workers.clone().acquire_owned().await {
            Ok(permit) => permit,
            Err(_) => {
                warn!(complaint_id = %complaint_id, "Worker pool closed, dropping task");
                inner.finish_task();
                continue;
            }
        };

        match inner.executor.execute(&task).await {
            Ok(()) => {
                inner.executed.fetch_add(1, Ordering::Relaxed);
                debug!(
                    complaint_id = %task.complaint_id,
                    ticket_id = %task.ticket_id,
                    kind = task.kind.label(),
                    "Submission task executed"
                );
            }
            Err(e) => {
                inner.failed.fetch_add(1, Ordering::Relaxed);
                warn!(
                    complaint_id = %task.complaint_id,
                    ticket_id = %task.ticket_id,
                    kind = task.kind.label(),
                    retryable = e.is_retryable(),
                    error = %e,
                    "Submission task failed"
                );
            }
        }
        drop(permit);
        inner.finish_task();
    }
}

#[async_trait]
impl SubmissionQueueApi for SubmissionQueue {
    fn enqueue(&self, task: SubmissionTask) -> QueueResult<()> {
        if self.is_closed() {
            self.inner.rejected.fetch_add(1, Ordering::Relaxed);
            return Err(QueueError::Closed);
        }
        self.reserve_slot()?;

        let complaint_id = task.complaint_id.clone();
        let start_lane = match self.inner.lanes.entry(complaint_id.clone()) {
            Entry::Occupied(mut lane) => {
                lane.get_mut().push_back(task);
                false
            }
            Entry::Vacant(slot) => {
                slot.insert(VecDeque::from([task]));
                true
            }
        };

        if start_lane {
            tokio::spawn(drain_lane(self.inner.clone(), complaint_id));
        }
        Ok(())
    }

    fn close(&self) {
        if !self.inner.closed.swap(true, Ordering::SeqCst) {
            info!(
                queued = self.inner.queued.load(Ordering::SeqCst),
                "Submission queue closed"
            );
        }
    }

    fn is_closed(&self) -> bool {
        self.inner.closed.load(Ordering::SeqCst)
    }

    async fn wait_idle(&self) {
        loop {
            let notified = self.inner.idle.notified();
            if self.inner.queued.load(Ordering::SeqCst) == 0 {
                return;
            }
            notified.await;
        }
    }

    fn stats(&self) -> QueueStats {
        QueueStats {
            queued: self.inner.queued.load(Ordering::SeqCst),
            active_lanes: self.inner.lanes.len(),
            executed: self.inner.executed.load(Ordering::Relaxed),
            failed: self.inner.failed.load(Ordering::Relaxed),
            rejected: self.inner.rejected.load(Ordering::Relaxed),
        }
    }
}
