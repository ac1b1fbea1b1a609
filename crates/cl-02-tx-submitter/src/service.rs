//! # Transaction Submitter Service
//!
//! Owns every ticket and the signing account's nonce counter.
//!
//! ## Locking
//!
//! | State | Guard | Held across |
//! |-------|-------|-------------|
//! | nonce counter | `tokio::sync::Mutex` | allocate → sign → broadcast (incl. retries) |
//! | tickets | `DashMap` shard lock | never across an `.await` |
//! | poll pass | `tokio::sync::Mutex` | one `poll_pending` / `refresh` at a time |
//!
//! The nonce is consumed only when the ledger accepted the transaction, so
//! a failed broadcast never leaves a gap.

use crate::domain::{
    anchor_call_data, backoff_delay, bump_gas_price, initial_gas_price, PollOutcome, PollReport,
    Reservation, SignedTransaction, SubmitterConfig, UnsignedTransaction,
};
use crate::error::{SubmitterError, SubmitterResult};
use crate::ports::inbound::TransactionSubmitterApi;
use crate::ports::outbound::{LedgerReceipt, LedgerRpc, RpcError, TransactionSigner};
use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use shared_bus::{EventPublisher, LedgerEvent};
use shared_types::{
    to_hex, BlockReference, Hash, ReceiptStatus, SubmissionStatus, Ticket, TicketFailure,
    TicketId, TicketMetadata, TimeSource, TransactionReceipt,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{watch, Mutex};
use tracing::{debug, error, info, warn};

/// Signs, broadcasts and tracks ledger transactions.
pub struct TransactionSubmitter {
    rpc: Arc<dyn LedgerRpc>,
    signer: Arc<dyn TransactionSigner>,
    clock: Arc<dyn TimeSource>,
    publisher: Arc<dyn EventPublisher>,
    config: SubmitterConfig,
    tickets: DashMap<TicketId, Ticket>,
    by_hash: DashMap<Hash, TicketId>,
    /// Next nonce to use; `None` until synchronised with the ledger.
    nonce: Mutex<Option<u64>>,
    poll_lock: Mutex<()>,
}

impl TransactionSubmitter {
    pub fn new(
        rpc: Arc<dyn LedgerRpc>,
        signer: Arc<dyn TransactionSigner>,
        clock: Arc<dyn TimeSource>,
        publisher: Arc<dyn EventPublisher>,
        config: SubmitterConfig,
    ) -> Self {
        Self {
            rpc,
            signer,
            clock,
            publisher,
            config,
            tickets: DashMap::new(),
            by_hash: DashMap::new(),
            nonce: Mutex::new(None),
            poll_lock: Mutex::new(()),
        }
    }

    pub fn config(&self) -> &SubmitterConfig {
        &self.config
    }

    /// The next nonce this submitter will use, if synchronised.
    pub async fn next_nonce(&self) -> Option<u64> {
        *self.nonce.lock().await
    }

    /// Poll for confirmations until `shutdown` flips to `true`.
    ///
    /// Polls every `poll_interval_ms` while tickets are outstanding and backs
    /// off up to `poll_backoff_max_ms` while idle or while the ledger errors.
    pub async fn run_poller(self: Arc<Self>, mut shutdown: watch::Receiver<bool>) {
        let interval = Duration::from_millis(self.config.poll_interval_ms);
        let ceiling = Duration::from_millis(self.config.poll_backoff_max_ms.max(1));
        let mut delay = interval;

        info!(interval_ms = self.config.poll_interval_ms, "Confirmation poller started");
        loop {
            tokio::select! {
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
                _ = tokio::time::sleep(delay) => {
                    delay = match self.poll_pending().await {
                        Ok(report) if report.is_idle() => (delay * 2).min(ceiling),
                        Ok(_) => interval,
                        Err(e) => {
                            warn!(error = %e, "Confirmation poll failed");
                            (delay * 2).min(ceiling)
                        }
                    };
                }
            }
        }
        info!("Confirmation poller stopped");
    }

    fn snapshot(&self, ticket_id: &TicketId) -> SubmitterResult<Ticket> {
        self.tickets
            .get(ticket_id)
            .map(|t| t.clone())
            .ok_or(SubmitterError::UnknownTicket(*ticket_id))
    }

    /// Apply `f` to the stored ticket and return the updated copy.
    fn update<F>(&self, ticket_id: &TicketId, f: F) -> SubmitterResult<Ticket>
    where
        F: FnOnce(&mut Ticket),
    {
        let mut entry = self
            .tickets
            .get_mut(ticket_id)
            .ok_or(SubmitterError::UnknownTicket(*ticket_id))?;
        f(entry.value_mut());
        Ok(entry.clone())
    }

    async fn fail(&self, ticket_id: &TicketId, failure: TicketFailure) -> SubmitterResult<Ticket> {
        let ticket = self.update(ticket_id, |t| {
            t.status = SubmissionStatus::Failed;
            t.failure = Some(failure);
        })?;
        error!(
            ticket_id = %ticket.id,
            complaint_id = %ticket.complaint_id(),
            kind = ticket.metadata.kind.label(),
            reason = %ticket.failure.as_ref().map(ToString::to_string).unwrap_or_default(),
            "Ticket failed"
        );
        self.publisher
            .publish(LedgerEvent::TicketFailed(ticket.clone()))
            .await;
        Ok(ticket)
    }

    fn sign(&self, ticket: &Ticket, nonce: u64, gas_price: u128) -> SubmitterResult<SignedTransaction> {
        let unsigned = UnsignedTransaction {
            nonce,
            gas_price,
            gas_limit: self.config.gas_limit,
            to: self.config.registry_address,
            value: 0,
            data: anchor_call_data(&ticket.payload_hash, &ticket.metadata),
            chain_id: self.config.chain_id,
        };
        Ok(self.signer.sign(&unsigned)?)
    }

    async fn sync_nonce(&self) -> Result<u64, RpcError> {
        let address = self.signer.address();
        let nonce = self.rpc.transaction_count(&address).await?;
        info!(address = %to_hex(&address), nonce, "Nonce synchronised with ledger");
        Ok(nonce)
    }

    /// Decide what happens to one SUBMITTED ticket.
    async fn check_ticket(
        &self,
        ticket_id: TicketId,
        head: u64,
        allow_replacement: bool,
    ) -> SubmitterResult<PollOutcome> {
        let ticket = self.snapshot(&ticket_id)?;
        if ticket.status != SubmissionStatus::Submitted {
            return Ok(PollOutcome::Waiting);
        }

        // Any broadcast version may be the one that got mined.
        let mut found = None;
        for tx_hash in ticket.broadcast_hashes.iter().rev() {
            if let Some(receipt) = self.rpc.transaction_receipt(tx_hash).await? {
                found = Some(receipt);
                break;
            }
        }

        let now = self.clock.now();
        match found {
            Some(receipt) if receipt.status == ReceiptStatus::Reverted => {
                self.record_receipt(&ticket_id, &receipt, head)?;
                self.fail(
                    &ticket_id,
                    TicketFailure::Reverted {
                        tx_hash: receipt.tx_hash,
                    },
                )
                .await?;
                Ok(PollOutcome::Failed)
            }
            Some(receipt) => {
                let confirmations = self.record_receipt(&ticket_id, &receipt, head)?;
                if confirmations < self.config.confirmation_depth {
                    return Ok(PollOutcome::Waiting);
                }
                let confirmed = self.update(&ticket_id, |t| {
                    t.status = SubmissionStatus::Confirmed;
                    t.confirmed_at = Some(now);
                })?;
                info!(
                    ticket_id = %ticket_id,
                    complaint_id = %confirmed.complaint_id(),
                    tx_hash = %to_hex(&receipt.tx_hash),
                    block = receipt.block_number,
                    confirmations,
                    "Ticket confirmed"
                );
                self.publisher
                    .publish(LedgerEvent::TicketConfirmed(confirmed))
                    .await;
                Ok(PollOutcome::Confirmed)
            }
            None if !allow_replacement => Ok(PollOutcome::Waiting),
            None => {
                let since = ticket.last_broadcast_at.unwrap_or(ticket.created_at);
                if now.saturating_sub(since) < self.config.confirmation_timeout_secs {
                    return Ok(PollOutcome::Waiting);
                }
                if ticket.replacements >= self.config.max_retries {
                    self.fail(
                        &ticket_id,
                        TicketFailure::RetriesExhausted {
                            replacements: ticket.replacements,
                        },
                    )
                    .await?;
                    return Ok(PollOutcome::Failed);
                }
                self.replace(ticket, now).await
            }
        }
    }

    /// Store the receipt projection; returns confirmations seen.
    fn record_receipt(
        &self,
        ticket_id: &TicketId,
        receipt: &LedgerReceipt,
        head: u64,
    ) -> SubmitterResult<u64> {
        let confirmations = if head >= receipt.block_number {
            head - receipt.block_number + 1
        } else {
            0
        };
        self.update(ticket_id, |t| {
            t.tx_hash = Some(receipt.tx_hash);
            t.receipt = Some(TransactionReceipt {
                tx_hash: receipt.tx_hash,
                block_reference: BlockReference {
                    number: receipt.block_number,
                    hash: receipt.block_hash,
                },
                status: receipt.status,
                confirmations_seen: confirmations,
                gas_used: receipt.gas_used,
            });
        })?;
        Ok(confirmations)
    }

    /// Re-broadcast with the same nonce and a bumped fee.
    async fn replace(&self, ticket: Ticket, now: u64) -> SubmitterResult<PollOutcome> {
        let Some(nonce) = ticket.nonce else {
            return Ok(PollOutcome::Waiting);
        };
        let gas_price = bump_gas_price(ticket.gas_price, self.config.fee_bump_percent);
        let signed = self.sign(&ticket, nonce, gas_price)?;

        match self.rpc.send_raw_transaction(&signed).await {
            Ok(_) | Err(RpcError::AlreadyKnown) => {
                let updated = self.update(&ticket.id, |t| {
                    t.gas_price = gas_price;
                    t.replacements += 1;
                    t.tx_hash = Some(signed.hash);
                    t.broadcast_hashes.push(signed.hash);
                    t.last_broadcast_at = Some(now);
                })?;
                warn!(
                    ticket_id = %ticket.id,
                    nonce,
                    gas_price,
                    replacements = updated.replacements,
                    tx_hash = %to_hex(&signed.hash),
                    "Unconfirmed past timeout, broadcast fee-bumped replacement"
                );
                self.publisher
                    .publish(LedgerEvent::TicketSubmitted(updated))
                    .await;
                Ok(PollOutcome::Replaced)
            }
            Err(RpcError::NonceTooLow(message)) => {
                // The nonce was mined, possibly by an earlier version of this
                // ticket. Restart the timer so receipts get another pass.
                debug!(ticket_id = %ticket.id, %message, "Replacement nonce already used");
                self.update(&ticket.id, |t| {
                    t.replacements += 1;
                    t.last_broadcast_at = Some(now);
                })?;
                Ok(PollOutcome::Waiting)
            }
            Err(e) if e.is_transient() => {
                warn!(ticket_id = %ticket.id, error = %e, "Replacement broadcast failed, will retry");
                Ok(PollOutcome::Waiting)
            }
            Err(e) => {
                self.fail(
                    &ticket.id,
                    TicketFailure::Rejected {
                        reason: e.to_string(),
                    },
                )
                .await?;
                Ok(PollOutcome::Failed)
            }
        }
    }
}

#[async_trait]
impl TransactionSubmitterApi for TransactionSubmitter {
    fn reserve(&self, payload_hash: Hash, metadata: TicketMetadata) -> Reservation {
        let now = self.clock.now();
        match self.by_hash.entry(payload_hash) {
            Entry::Occupied(mut entry) => {
                if let Some(existing) = self.tickets.get(entry.get()) {
                    if existing.status != SubmissionStatus::Failed {
                        debug!(
                            ticket_id = %existing.id,
                            payload_hash = %to_hex(&payload_hash),
                            "Duplicate submission, returning existing ticket"
                        );
                        return Reservation::Existing(existing.clone());
                    }
                }
                let ticket = Ticket::pending(payload_hash, metadata, now);
                self.tickets.insert(ticket.id, ticket.clone());
                entry.insert(ticket.id);
                Reservation::New(ticket)
            }
            Entry::Vacant(entry) => {
                let ticket = Ticket::pending(payload_hash, metadata, now);
                self.tickets.insert(ticket.id, ticket.clone());
                entry.insert(ticket.id);
                Reservation::New(ticket)
            }
        }
    }

    async fn broadcast(&self, ticket_id: TicketId) -> SubmitterResult<Ticket> {
        let mut nonce_guard = self.nonce.lock().await;

        let ticket = self.snapshot(&ticket_id)?;
        if ticket.status != SubmissionStatus::Pending {
            return Ok(ticket);
        }

        let gas_price =
            initial_gas_price(self.config.base_gas_price, self.config.gas_price_multiplier_percent);
        let max_attempts = self.config.broadcast_attempts.max(1);
        let mut attempt = 0u32;
        let mut last_error: RpcError;

        loop {
            let nonce = match *nonce_guard {
                Some(nonce) => Ok(nonce),
                None => self.sync_nonce().await,
            };

            let result = match nonce {
                Ok(nonce) => {
                    *nonce_guard = Some(nonce);
                    let signed = self.sign(&ticket, nonce, gas_price)?;
                    match self.rpc.send_raw_transaction(&signed).await {
                        Ok(_) | Err(RpcError::AlreadyKnown) => Ok(signed),
                        Err(e) => Err(e),
                    }
                }
                Err(e) => Err(e),
            };

            match result {
                Ok(signed) => {
                    *nonce_guard = Some(signed.nonce + 1);
                    let now = self.clock.now();
                    let submitted = self.update(&ticket_id, |t| {
                        t.status = SubmissionStatus::Submitted;
                        t.nonce = Some(signed.nonce);
                        t.gas_price = signed.gas_price;
                        t.tx_hash = Some(signed.hash);
                        t.broadcast_hashes.push(signed.hash);
                        t.submitted_at = Some(now);
                        t.last_broadcast_at = Some(now);
                    })?;
                    drop(nonce_guard);

                    info!(
                        ticket_id = %ticket_id,
                        complaint_id = %submitted.complaint_id(),
                        kind = submitted.metadata.kind.label(),
                        nonce = signed.nonce,
                        tx_hash = %to_hex(&signed.hash),
                        "Ticket submitted"
                    );
                    self.publisher
                        .publish(LedgerEvent::TicketSubmitted(submitted.clone()))
                        .await;
                    return Ok(submitted);
                }
                Err(RpcError::NonceTooLow(message)) => {
                    warn!(ticket_id = %ticket_id, %message, "Nonce too low, resynchronising");
                    *nonce_guard = None;
                    last_error = RpcError::NonceTooLow(message);
                }
                Err(e) if e.is_transient() => {
                    warn!(ticket_id = %ticket_id, attempt, error = %e, "Transient broadcast failure");
                    last_error = e;
                }
                Err(e) => {
                    drop(nonce_guard);
                    self.fail(
                        &ticket_id,
                        TicketFailure::Rejected {
                            reason: e.to_string(),
                        },
                    )
                    .await?;
                    return Err(SubmitterError::Rejected(e.to_string()));
                }
            }

            attempt += 1;
            if attempt >= max_attempts {
                break;
            }
            tokio::time::sleep(backoff_delay(
                attempt - 1,
                self.config.backoff_base_ms,
                self.config.backoff_max_ms,
            ))
            .await;
        }

        drop(nonce_guard);
        self.fail(
            &ticket_id,
            TicketFailure::BroadcastExhausted {
                attempts: attempt,
                last_error: last_error.to_string(),
            },
        )
        .await?;
        Err(SubmitterError::Rpc(last_error))
    }

    async fn submit(&self, payload_hash: Hash, metadata: TicketMetadata) -> SubmitterResult<Ticket> {
        match self.reserve(payload_hash, metadata) {
            Reservation::New(ticket) => self.broadcast(ticket.id).await,
            Reservation::Existing(ticket) => Ok(ticket),
        }
    }

    async fn resubmit(&self, ticket_id: TicketId) -> SubmitterResult<Ticket> {
        let failed = self.snapshot(&ticket_id)?;
        if failed.status != SubmissionStatus::Failed {
            return Err(SubmitterError::InvalidState {
                ticket_id,
                status: failed.status,
            });
        }
        info!(ticket_id = %ticket_id, "Resubmitting failed ticket");
        self.submit(failed.payload_hash, failed.metadata).await
    }

    async fn poll_pending(&self) -> SubmitterResult<PollReport> {
        let _pass = self.poll_lock.lock().await;

        let outstanding: Vec<TicketId> = self
            .tickets
            .iter()
            .filter(|t| t.status == SubmissionStatus::Submitted)
            .map(|t| t.id)
            .collect();

        let mut report = PollReport::default();
        if outstanding.is_empty() {
            return Ok(report);
        }

        report.head_block = self.rpc.block_number().await?;
        for ticket_id in outstanding {
            report.checked += 1;
            match self.check_ticket(ticket_id, report.head_block, true).await {
                Ok(outcome) => report.record(ticket_id, outcome),
                Err(e) => {
                    report.errors += 1;
                    warn!(ticket_id = %ticket_id, error = %e, "Ticket check failed");
                }
            }
        }

        debug!(
            head = report.head_block,
            checked = report.checked,
            confirmed = report.confirmed.len(),
            replaced = report.replaced.len(),
            failed = report.failed.len(),
            "Confirmation pass complete"
        );
        Ok(report)
    }

    async fn refresh(&self, ticket_id: TicketId) -> SubmitterResult<Ticket> {
        let _pass = self.poll_lock.lock().await;
        let ticket = self.snapshot(&ticket_id)?;
        if ticket.status == SubmissionStatus::Submitted {
            let head = self.rpc.block_number().await?;
            self.check_ticket(ticket_id, head, false).await?;
        }
        self.snapshot(&ticket_id)
    }

    fn ticket(&self, ticket_id: &TicketId) -> Option<Ticket> {
        self.tickets.get(ticket_id).map(|t| t.clone())
    }

    fn tickets_with_status(&self, status: SubmissionStatus) -> Vec<Ticket> {
        let mut tickets: Vec<Ticket> = self
            .tickets
            .iter()
            .filter(|t| t.status == status)
            .map(|t| t.clone())
            .collect();
        tickets.sort_by_key(|t| t.created_at);
        tickets
    }
}
