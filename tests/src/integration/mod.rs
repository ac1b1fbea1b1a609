//! Cross-crate integration scenarios.

#[cfg(test)]
mod fixtures;

mod access_control;
mod e2e_escalation;
mod event_verification;
mod evidence_flows;
mod submission_flows;
