//! # Component Container
//!
//! Holds every component instance, wired to its adapters.
//!
//! ## Initialization Order
//!
//! ```text
//! Level 0: clock, event bus, encoder, ledger mirror
//! Level 1: transaction submitter (ledger RPC + signer)
//! Level 2: submission queue (worker → submitter.broadcast)
//! Level 3: submission pipeline (submitter + mirror + queue)
//! Level 4: evidence anchor, SLA tracker (ports → pipeline)
//! ```
//!
//! All components are `Arc`-shared and keep their state in per-entity maps.

use crate::adapters::{
    BroadcastExecutor, LedgerEscalationSink, PipelineAnchorSubmitter, SubmissionPipeline,
    SubmitterReceipts,
};
use crate::container::config::{ConfigError, LedgerConfig, LedgerMode};
use cl_01_event_encoder::{keccak256, EventEncoderService};
use cl_02_tx_submitter::{
    InMemoryLedger, JsonRpcLedger, LedgerRpc, LocalKeySigner, TransactionSigner,
    TransactionSubmitter,
};
use cl_03_evidence_anchor::{EvidenceAnchor, LocalFileStore};
use cl_04_sla_tracker::SlaTracker;
use cl_05_ledger_mirror::LedgerMirror;
use cl_06_submission_queue::SubmissionQueue;
use shared_bus::InMemoryEventBus;
use shared_types::{SystemTimeSource, TimeSource};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};
use uuid::Uuid;
use zeroize::Zeroizing;

/// Remote ledger and signing account the submitter uses.
pub struct LedgerBackend {
    pub rpc: Arc<dyn LedgerRpc>,
    pub signer: Arc<dyn TransactionSigner>,
}

impl LedgerBackend {
    /// Build the backend the configuration asks for.
    pub fn from_config(config: &LedgerConfig) -> Result<Self, ConfigError> {
        let rpc: Arc<dyn LedgerRpc> = match config.ledger.mode {
            LedgerMode::InMemory => Arc::new(InMemoryLedger::new()),
            LedgerMode::JsonRpc => Arc::new(
                JsonRpcLedger::new(
                    config.ledger.rpc_url.clone(),
                    Duration::from_secs(config.ledger.rpc_timeout_secs.max(1)),
                )
                .map_err(|e| ConfigError::Backend(e.to_string()))?,
            ),
        };

        let signer = match (&config.signer_key, config.ledger.mode) {
            (Some(key), _) => LocalKeySigner::from_hex(key.expose())
                .map_err(|e| ConfigError::InvalidSignerKey(e.to_string()))?,
            (None, LedgerMode::InMemory) => {
                warn!("No signer key configured, using an ephemeral key for the in-memory ledger");
                ephemeral_signer()?
            }
            (None, LedgerMode::JsonRpc) => return Err(ConfigError::MissingSignerKey),
        };

        Ok(Self {
            rpc,
            signer: Arc::new(signer),
        })
    }
}

fn ephemeral_signer() -> Result<LocalKeySigner, ConfigError> {
    let mut seed = Zeroizing::new(Vec::with_capacity(32));
    seed.extend_from_slice(Uuid::new_v4().as_bytes());
    seed.extend_from_slice(Uuid::new_v4().as_bytes());
    let secret = Zeroizing::new(keccak256(&seed));
    LocalKeySigner::from_bytes(secret.as_slice())
        .map_err(|e| ConfigError::InvalidSignerKey(e.to_string()))
}

/// Central container holding all component instances.
pub struct LedgerComponents {
    pub config: LedgerConfig,
    pub clock: Arc<dyn TimeSource>,
    pub bus: Arc<InMemoryEventBus>,
    pub encoder: EventEncoderService,
    pub submitter: Arc<TransactionSubmitter>,
    pub mirror: Arc<LedgerMirror>,
    pub queue: SubmissionQueue,
    pub pipeline: Arc<SubmissionPipeline>,
    pub evidence: Arc<EvidenceAnchor>,
    pub sla: Arc<SlaTracker>,
    pub receipts: Arc<SubmitterReceipts>,
}

impl LedgerComponents {
    /// Validate `config` and wire components against the backend it names.
    pub fn from_config(config: LedgerConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let backend = LedgerBackend::from_config(&config)?;
        Ok(Self::with_backend(config, backend, Arc::new(SystemTimeSource)))
    }

    /// Wire components against an explicit backend and clock.
    pub fn with_backend(
        config: LedgerConfig,
        backend: LedgerBackend,
        clock: Arc<dyn TimeSource>,
    ) -> Self {
        info!(
            mode = ?config.ledger.mode,
            chain_id = config.submitter.chain_id,
            workers = config.queue.workers,
            evidence_dir = %config.storage.evidence_dir.display(),
            "Initializing complaint ledger components"
        );

        // Level 0
        let bus = Arc::new(InMemoryEventBus::new());
        let encoder = EventEncoderService::new();
        let mirror = Arc::new(LedgerMirror::new(config.mirror.clone()));

        // Level 1
        let submitter = Arc::new(TransactionSubmitter::new(
            backend.rpc,
            backend.signer,
            clock.clone(),
            bus.clone(),
            config.submitter.clone(),
        ));

        // Level 2
        let queue = SubmissionQueue::new(
            Arc::new(BroadcastExecutor::new(submitter.clone())),
            config.queue.clone(),
        );

        // Level 3
        let pipeline = Arc::new(SubmissionPipeline::new(
            submitter.clone(),
            mirror.clone(),
            queue.clone(),
        ));

        // Level 4
        let evidence = Arc::new(EvidenceAnchor::new(
            Arc::new(LocalFileStore::new(config.storage.evidence_dir.clone())),
            Arc::new(PipelineAnchorSubmitter::new(pipeline.clone())),
            clock.clone(),
            bus.clone(),
        ));
        let sla = Arc::new(SlaTracker::new(
            Arc::new(LedgerEscalationSink::new(pipeline.clone(), bus.clone())),
            clock.clone(),
        ));
        let receipts = Arc::new(SubmitterReceipts::new(submitter.clone()));

        Self {
            config,
            clock,
            bus,
            encoder,
            submitter,
            mirror,
            queue,
            pipeline,
            evidence,
            sla,
            receipts,
        }
    }
}
