//! # Shared Bus - Ledger Status Events
//!
//! In-process publish/subscribe channel through which the transaction
//! submitter and the SLA tracker announce state changes to the rest of the
//! ledger.
//!
//! ## Choreography
//!
//! ```text
//! ┌──────────────┐                    ┌──────────────────┐
//! │ Tx Submitter │                    │ Ticket handler   │
//! │              │    publish()       │ (mirror/anchor)  │
//! │              │ ──────┐            │                  │
//! └──────────────┘       │            └──────────────────┘
//!                        ▼                    ↑
//!                  ┌──────────────┐          │
//!                  │  Event Bus   │          │
//!                  │              │ ─────────┘
//!                  └──────────────┘  subscribe()
//! ```
//!
//! Events are best effort: a subscriber that lags behind the channel
//! capacity skips events. Consumers that need certainty (the mirror)
//! additionally run a reconciliation pass against the submitter.

#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod events;
pub mod publisher;
pub mod subscriber;

pub use events::{EventFilter, EventTopic, LedgerEvent};
pub use publisher::{BusStats, EventPublisher, InMemoryEventBus, NoopPublisher};
pub use subscriber::{Subscription, SubscriptionError};

/// Maximum events to buffer per subscriber before it starts lagging.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 1000;
