//! Simulated ledger for development mode and tests.
//!
//! Behaves like a single geth node with a mempool:
//! - nonces below the account's next nonce are rejected (`nonce too low`)
//! - a pending transaction can only be replaced by one paying at least 10% more
//! - only contiguous nonces are mined
//!
//! Faults can be injected per `send_raw_transaction` call, and the next N
//! mined transactions can be made to revert.

use crate::domain::{bump_gas_price, keccak256, SignedTransaction};
use crate::ports::outbound::{LedgerReceipt, LedgerRpc, RpcError};
use async_trait::async_trait;
use parking_lot::Mutex;
use shared_types::{Address, Hash, ReceiptStatus};
use std::collections::{BTreeMap, BTreeSet, HashMap, VecDeque};
use tracing::trace;

/// Gas reported for every mined anchor.
const ANCHOR_GAS_USED: u64 = 46_000;
/// Minimum replacement bump accepted by the simulated mempool.
const REPLACEMENT_BUMP_PERCENT: u64 = 10;

#[derive(Debug, Default)]
struct ChainState {
    head: u64,
    auto_mine: bool,
    next_nonce: HashMap<Address, u64>,
    pending: BTreeMap<(Address, u64), SignedTransaction>,
    receipts: HashMap<Hash, LedgerReceipt>,
    send_faults: VecDeque<RpcError>,
    revert_next: usize,
    accepted: Vec<SignedTransaction>,
}

#[derive(Debug)]
pub struct InMemoryLedger {
    state: Mutex<ChainState>,
}

impl InMemoryLedger {
    /// Ledger that mines a block for every accepted transaction.
    pub fn new() -> Self {
        Self::with_auto_mine(true)
    }

    /// Ledger that only mines on `mine_block`.
    pub fn manual() -> Self {
        Self::with_auto_mine(false)
    }

    fn with_auto_mine(auto_mine: bool) -> Self {
        Self {
            state: Mutex::new(ChainState {
                auto_mine,
                ..ChainState::default()
            }),
        }
    }

    pub fn set_auto_mine(&self, auto_mine: bool) {
        self.state.lock().auto_mine = auto_mine;
    }

    /// Mine one block. Returns the hashes included in it.
    pub fn mine_block(&self) -> Vec<Hash> {
        let mut state = self.state.lock();
        Self::mine(&mut state)
    }

    /// Mine `count` blocks, including whatever is minable.
    pub fn advance_blocks(&self, count: u64) {
        let mut state = self.state.lock();
        for _ in 0..count {
            Self::mine(&mut state);
        }
    }

    /// The next `send_raw_transaction` call fails with `error`.
    pub fn inject_send_fault(&self, error: RpcError) {
        self.state.lock().send_faults.push_back(error);
    }

    /// The next `count` mined transactions revert.
    pub fn revert_next(&self, count: usize) {
        self.state.lock().revert_next += count;
    }

    /// Simulate nonces consumed outside this process.
    pub fn set_account_nonce(&self, address: Address, nonce: u64) {
        self.state.lock().next_nonce.insert(address, nonce);
    }

    /// Every transaction the mempool accepted, in arrival order.
    pub fn accepted_transactions(&self) -> Vec<SignedTransaction> {
        self.state.lock().accepted.clone()
    }

    pub fn pending_count(&self) -> usize {
        self.state.lock().pending.len()
    }

    pub fn mined_count(&self) -> usize {
        self.state.lock().receipts.len()
    }

    pub fn head(&self) -> u64 {
        self.state.lock().head
    }

    fn mine(state: &mut ChainState) -> Vec<Hash> {
        state.head += 1;
        let number = state.head;
        let block_hash = keccak256(&number.to_be_bytes());

        let senders: BTreeSet<Address> = state.pending.keys().map(|(from, _)| *from).collect();
        let mut included = Vec::new();
        for sender in senders {
            loop {
                let next = state.next_nonce.get(&sender).copied().unwrap_or(0);
                let Some(tx) = state.pending.remove(&(sender, next)) else {
                    break;
                };
                let status = if state.revert_next > 0 {
                    state.revert_next -= 1;
                    ReceiptStatus::Reverted
                } else {
                    ReceiptStatus::Success
                };
                state.receipts.insert(
                    tx.hash,
                    LedgerReceipt {
                        tx_hash: tx.hash,
                        block_number: number,
                        block_hash,
                        status,
                        gas_used: ANCHOR_GAS_USED,
                    },
                );
                state.next_nonce.insert(sender, next + 1);
                included.push(tx.hash);
            }
        }
        trace!(block = number, included = included.len(), "Simulated block mined");
        included
    }
}

impl Default for InMemoryLedger {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LedgerRpc for InMemoryLedger {
    async fn send_raw_transaction(&self, tx: &SignedTransaction) -> Result<Hash, RpcError> {
        let mut state = self.state.lock();

        if let Some(fault) = state.send_faults.pop_front() {
            return Err(fault);
        }
        if state.receipts.contains_key(&tx.hash) {
            return Err(RpcError::AlreadyKnown);
        }

        let next = state.next_nonce.get(&tx.from).copied().unwrap_or(0);
        if tx.nonce < next {
            return Err(RpcError::NonceTooLow(format!(
                "next nonce {next}, tx nonce {}",
                tx.nonce
            )));
        }

        if let Some(existing) = state.pending.get(&(tx.from, tx.nonce)) {
            if existing.hash == tx.hash {
                return Err(RpcError::AlreadyKnown);
            }
            if tx.gas_price < bump_gas_price(existing.gas_price, REPLACEMENT_BUMP_PERCENT) {
                return Err(RpcError::Underpriced(format!(
                    "existing {} wei, offered {} wei",
                    existing.gas_price, tx.gas_price
                )));
            }
        }

        state.pending.insert((tx.from, tx.nonce), tx.clone());
        state.accepted.push(tx.clone());
        if state.auto_mine {
            Self::mine(&mut state);
        }
        Ok(tx.hash)
    }

    async fn transaction_receipt(&self, tx_hash: &Hash) -> Result<Option<LedgerReceipt>, RpcError> {
        Ok(self.state.lock().receipts.get(tx_hash).copied())
    }

    async fn transaction_count(&self, address: &Address) -> Result<u64, RpcError> {
        let state = self.state.lock();
        let mut nonce = state.next_nonce.get(address).copied().unwrap_or(0);
        while state.pending.contains_key(&(*address, nonce)) {
            nonce += 1;
        }
        Ok(nonce)
    }

    async fn block_number(&self) -> Result<u64, RpcError> {
        Ok(self.state.lock().head)
    }
}
