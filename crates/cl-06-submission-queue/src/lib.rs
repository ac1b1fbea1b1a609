//! # Submission Queue
//!
//! Takes ledger submissions off the request path. Callers enqueue a
//! `SubmissionTask` and return immediately; workers broadcast in the
//! background.
//!
//! ## Ordering and Concurrency
//!
//! ```text
//! RT1: [t1] → [t2] → [t3]      one drain task, strictly in enqueue order
//! RT2: [t1] → [t2]             runs alongside RT1
//!              ↓
//!      Semaphore(workers)      bounds executing tasks across all lanes
//! ```
//!
//! | Limit | Setting | On breach |
//! |-------|---------|-----------|
//! | Executing tasks | `workers` | Lane waits for a permit |
//! | Accepted, unfinished tasks | `max_queued` | `QueueError::Full` |
//! | After `close()` | n/a | `QueueError::Closed` |
//!
//! ## Module Structure (Hexagonal Architecture)
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │  ports/inbound.rs  - SubmissionQueueApi                         │
//! │  ports/outbound.rs - TaskExecutor                               │
//! └─────────────────────────────────────────────────────────────────┘
//!                          ↑ uses ↑
//! ┌─────────────────────────────────────────────────────────────────┐
//! │  domain/   - SubmissionTask, QueueConfig, QueueStats            │
//! │  service.rs - SubmissionQueue                                   │
//! └─────────────────────────────────────────────────────────────────┘
//! ```

#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod domain;
pub mod error;
pub mod ports;
pub mod service;

pub use domain::{QueueConfig, QueueStats, SubmissionTask};
pub use error::{QueueError, QueueResult};
pub use ports::inbound::SubmissionQueueApi;
pub use ports::outbound::TaskExecutor;
pub use service::SubmissionQueue;
