//! # Ledger Configuration
//!
//! Unified configuration for every component and the background loops.
//!
//! ## Security Requirements
//!
//! - The signing key is only ever read from `CL_SIGNER_KEY` or the file named
//!   by `CL_SIGNER_KEY_FILE`. It is never logged; `Debug` prints a placeholder.
//! - A JSON-RPC ledger requires a key. The in-memory ledger generates an
//!   ephemeral one when none is given.

use cl_02_tx_submitter::SubmitterConfig;
use cl_05_ledger_mirror::MirrorConfig;
use cl_06_submission_queue::QueueConfig;
use shared_types::Address;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use thiserror::Error;
use zeroize::Zeroizing;

/// Complete ledger configuration.
#[derive(Debug, Clone, Default)]
pub struct LedgerConfig {
    /// Remote ledger backend.
    pub ledger: BackendConfig,
    /// Transaction submission parameters.
    pub submitter: SubmitterConfig,
    /// Hex secret of the signing account.
    pub signer_key: Option<SignerKey>,
    pub storage: StorageConfig,
    pub sla: SlaConfig,
    pub mirror: MirrorConfig,
    pub queue: QueueConfig,
    pub scheduler: SchedulerConfig,
    pub access: AccessConfig,
}

impl LedgerConfig {
    /// Defaults overridden by `CL_*` variables from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults overridden by whatever `lookup` returns for each `CL_*` key.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        let env = EnvReader { lookup: &lookup };

        if let Some(mode) = env.string("CL_LEDGER_MODE") {
            config.ledger.mode = mode
                .parse()
                .map_err(|_| ConfigError::invalid("CL_LEDGER_MODE", &mode))?;
        }
        if let Some(url) = env.string("CL_RPC_URL") {
            config.ledger.rpc_url = url;
        }
        env.parse("CL_RPC_TIMEOUT_SECS", &mut config.ledger.rpc_timeout_secs)?;

        env.parse("CL_CHAIN_ID", &mut config.submitter.chain_id)?;
        if let Some(address) = env.string("CL_REGISTRY_ADDRESS") {
            config.submitter.registry_address = parse_address(&address)
                .ok_or_else(|| ConfigError::invalid("CL_REGISTRY_ADDRESS", &address))?;
        }
        env.parse("CL_GAS_LIMIT", &mut config.submitter.gas_limit)?;
        env.parse("CL_BASE_GAS_PRICE", &mut config.submitter.base_gas_price)?;
        env.parse("CL_FEE_BUMP_PERCENT", &mut config.submitter.fee_bump_percent)?;
        env.parse("CL_MAX_RETRIES", &mut config.submitter.max_retries)?;
        env.parse("CL_CONFIRMATION_DEPTH", &mut config.submitter.confirmation_depth)?;
        env.parse(
            "CL_CONFIRMATION_TIMEOUT_SECS",
            &mut config.submitter.confirmation_timeout_secs,
        )?;
        env.parse("CL_POLL_INTERVAL_MS", &mut config.submitter.poll_interval_ms)?;

        if let Some(key) = env.string("CL_SIGNER_KEY") {
            config.signer_key = Some(SignerKey::new(key));
        } else if let Some(path) = env.string("CL_SIGNER_KEY_FILE") {
            let key = std::fs::read_to_string(&path).map_err(|e| ConfigError::SignerKeyFile {
                path: path.clone(),
                message: e.to_string(),
            })?;
            config.signer_key = Some(SignerKey::new(key.trim()));
        }

        if let Some(dir) = env.string("CL_EVIDENCE_DIR") {
            config.storage.evidence_dir = PathBuf::from(dir);
        }

        env.parse("CL_DEFAULT_SLA_HOURS", &mut config.sla.default_sla_hours)?;
        env.parse("CL_OVERDUE_BATCH", &mut config.sla.overdue_batch)?;

        env.parse("CL_STALE_AFTER_SECS", &mut config.mirror.stale_after_secs)?;
        env.parse("CL_RECONCILE_BATCH", &mut config.mirror.reconcile_batch)?;

        env.parse("CL_WORKERS", &mut config.queue.workers)?;
        env.parse("CL_MAX_QUEUED", &mut config.queue.max_queued)?;

        env.parse(
            "CL_ESCALATION_INTERVAL_SECS",
            &mut config.scheduler.escalation_interval_secs,
        )?;
        env.parse(
            "CL_RECONCILE_INTERVAL_SECS",
            &mut config.scheduler.reconcile_interval_secs,
        )?;

        if let Some(admin) = env.string("CL_ADMIN_PRINCIPAL") {
            config.access.admin_principal = admin;
        }

        Ok(config)
    }

    /// Check the configuration is usable before wiring anything.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.ledger.mode == LedgerMode::JsonRpc {
            if self.ledger.rpc_url.trim().is_empty() {
                return Err(ConfigError::MissingRpcUrl);
            }
            if self.signer_key.is_none() {
                return Err(ConfigError::MissingSignerKey);
            }
        }
        if self.submitter.confirmation_depth == 0 {
            return Err(ConfigError::ZeroConfirmationDepth);
        }
        if self.queue.workers == 0 {
            return Err(ConfigError::ZeroWorkers);
        }
        if self.queue.max_queued == 0 {
            return Err(ConfigError::ZeroQueueCapacity);
        }
        if self.access.admin_principal.trim().is_empty() {
            return Err(ConfigError::EmptyAdminPrincipal);
        }
        Ok(())
    }
}

/// Configuration errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("{key} has invalid value {value:?}")]
    InvalidValue { key: String, value: String },

    #[error("CL_SIGNER_KEY or CL_SIGNER_KEY_FILE must be set for the json-rpc ledger")]
    MissingSignerKey,

    #[error("cannot read signer key file {path}: {message}")]
    SignerKeyFile { path: String, message: String },

    /// The key material was present but unusable. The key itself is never
    /// part of the message.
    #[error("invalid signer key: {0}")]
    InvalidSignerKey(String),

    #[error("CL_RPC_URL must be set for the json-rpc ledger")]
    MissingRpcUrl,

    #[error("cannot reach ledger endpoint: {0}")]
    Backend(String),

    #[error("confirmation depth must be at least 1")]
    ZeroConfirmationDepth,

    #[error("queue needs at least one worker")]
    ZeroWorkers,

    #[error("queue capacity must be at least 1")]
    ZeroQueueCapacity,

    #[error("admin principal must not be empty")]
    EmptyAdminPrincipal,
}

impl ConfigError {
    fn invalid(key: &str, value: &str) -> Self {
        ConfigError::InvalidValue {
            key: key.to_string(),
            value: value.to_string(),
        }
    }
}

struct EnvReader<'a, F> {
    lookup: &'a F,
}

impl<F> EnvReader<'_, F>
where
    F: Fn(&str) -> Option<String>,
{
    /// Non-blank value of `key`.
    fn string(&self, key: &str) -> Option<String> {
        (self.lookup)(key).filter(|v| !v.trim().is_empty())
    }

    /// Overwrite `target` when `key` is set; fail if it does not parse.
    fn parse<T: FromStr>(&self, key: &str, target: &mut T) -> Result<(), ConfigError> {
        if let Some(raw) = self.string(key) {
            *target = raw
                .trim()
                .parse()
                .map_err(|_| ConfigError::invalid(key, &raw))?;
        }
        Ok(())
    }
}

fn parse_address(raw: &str) -> Option<Address> {
    let raw = raw.trim();
    let digits = raw.strip_prefix("0x").unwrap_or(raw);
    let bytes = hex::decode(digits).ok()?;
    bytes.try_into().ok()
}

/// Signing key material. Wiped on drop and never printed.
#[derive(Clone)]
pub struct SignerKey(Zeroizing<String>);

impl SignerKey {
    pub fn new(secret: impl Into<String>) -> Self {
        Self(Zeroizing::new(secret.into()))
    }

    pub fn expose(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Debug for SignerKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SignerKey(<redacted>)")
    }
}

/// Which remote ledger the submitter talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LedgerMode {
    /// Simulated chain in process memory.
    #[default]
    InMemory,
    JsonRpc,
}

impl FromStr for LedgerMode {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "memory" | "in-memory" | "in_memory" => Ok(LedgerMode::InMemory),
            "json-rpc" | "json_rpc" | "jsonrpc" | "rpc" => Ok(LedgerMode::JsonRpc),
            _ => Err(()),
        }
    }
}

/// Remote ledger backend configuration.
#[derive(Debug, Clone)]
pub struct BackendConfig {
    pub mode: LedgerMode,
    pub rpc_url: String,
    /// Bound on every RPC call.
    pub rpc_timeout_secs: u64,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            mode: LedgerMode::InMemory,
            rpc_url: "http://127.0.0.1:8545".to_string(),
            rpc_timeout_secs: 10,
        }
    }
}

/// Evidence storage configuration.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// Root directory of the content-addressed evidence store.
    pub evidence_dir: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            evidence_dir: PathBuf::from("./data/evidence"),
        }
    }
}

/// SLA configuration.
#[derive(Debug, Clone)]
pub struct SlaConfig {
    /// Deadline applied by `set_default_sla_deadline`.
    pub default_sla_hours: u64,
    /// Complaints escalated per scheduler pass.
    pub overdue_batch: usize,
}

impl Default for SlaConfig {
    fn default() -> Self {
        Self {
            default_sla_hours: 48,
            overdue_batch: 50,
        }
    }
}

/// Background loop intervals.
#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    pub escalation_interval_secs: u64,
    pub reconcile_interval_secs: u64,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            escalation_interval_secs: 60,
            reconcile_interval_secs: 60,
        }
    }
}

/// Access control configuration.
#[derive(Debug, Clone)]
pub struct AccessConfig {
    /// Principal allowed to run administrative operations.
    pub admin_principal: String,
}

impl Default for AccessConfig {
    fn default() -> Self {
        Self {
            admin_principal: "ledger-admin".to_string(),
        }
    }
}
