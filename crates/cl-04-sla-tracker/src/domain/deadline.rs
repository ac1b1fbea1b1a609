//! Deadline state machine.
//!
//! ```text
//! [NO_DEADLINE] ──set_deadline(ts > now)──→ [ACTIVE] ──now > deadline──→ [ESCALATED]
//!                                            │    ↑
//!                                            └────┘ set_deadline(ts ≥ current)
//! ```
//!
//! Transitions are pure functions of the stored deadline and the current
//! time, so the service only has to apply them under the entry lock.

use crate::error::{SlaError, SlaResult};
use shared_types::{SlaDeadline, Timestamp};

/// Outcome of a valid `set_deadline` request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeadlineChange {
    /// First deadline for the complaint.
    Created,
    /// Same timestamp as stored. Only an unanchored deadline is anchored again.
    Unchanged,
    /// Moved forward from `previous`.
    Extended { previous: Timestamp },
}

/// Decide what setting `deadline_ts` at `now` does to `current`.
pub fn plan_deadline(
    current: Option<&SlaDeadline>,
    deadline_ts: Timestamp,
    now: Timestamp,
) -> SlaResult<DeadlineChange> {
    if let Some(existing) = current {
        if existing.escalated {
            return Err(SlaError::AlreadyEscalated(existing.complaint_id.clone()));
        }
        if deadline_ts == existing.deadline_ts {
            return Ok(DeadlineChange::Unchanged);
        }
        if deadline_ts < existing.deadline_ts {
            return Err(SlaError::DeadlineMovedEarlier {
                current: existing.deadline_ts,
                requested: deadline_ts,
            });
        }
    }
    if deadline_ts <= now {
        return Err(SlaError::DeadlineNotInFuture { deadline_ts, now });
    }
    Ok(match current {
        Some(existing) => DeadlineChange::Extended {
            previous: existing.deadline_ts,
        },
        None => DeadlineChange::Created,
    })
}

/// ACTIVE and strictly past its deadline.
pub fn should_escalate(deadline: &SlaDeadline, now: Timestamp) -> bool {
    !deadline.escalated && now > deadline.deadline_ts
}
