//! Ethereum JSON-RPC client for the remote ledger.

use crate::domain::SignedTransaction;
use crate::ports::outbound::{LedgerReceipt, LedgerRpc, RpcError};
use async_trait::async_trait;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use shared_types::{parse_hash, to_hex, Address, Hash, ReceiptStatus};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tracing::debug;

/// JSON-RPC request structure.
#[derive(Debug, Serialize)]
struct JsonRpcRequest<'a, T: Serialize> {
    jsonrpc: &'static str,
    method: &'a str,
    params: T,
    id: u64,
}

/// JSON-RPC response structure.
#[derive(Debug, Deserialize)]
struct JsonRpcResponse<T> {
    result: Option<T>,
    error: Option<JsonRpcError>,
}

/// JSON-RPC error structure.
#[derive(Debug, Deserialize)]
struct JsonRpcError {
    code: i64,
    message: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ReceiptJson {
    transaction_hash: String,
    block_number: Option<String>,
    block_hash: Option<String>,
    status: Option<String>,
    gas_used: Option<String>,
}

/// `LedgerRpc` over HTTP.
pub struct JsonRpcLedger {
    http_client: reqwest::Client,
    rpc_url: String,
    request_id: AtomicU64,
}

impl JsonRpcLedger {
    /// Create a client whose every call is bounded by `timeout`.
    pub fn new(rpc_url: impl Into<String>, timeout: Duration) -> Result<Self, RpcError> {
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| RpcError::Transport(e.to_string()))?;

        Ok(Self {
            http_client,
            rpc_url: rpc_url.into(),
            request_id: AtomicU64::new(1),
        })
    }

    pub fn url(&self) -> &str {
        &self.rpc_url
    }

    /// Make a JSON-RPC call. A `null` result is returned as `None`.
    async fn call<P: Serialize + Send, R: DeserializeOwned>(
        &self,
        method: &str,
        params: P,
    ) -> Result<Option<R>, RpcError> {
        let id = self.request_id.fetch_add(1, Ordering::SeqCst);

        let request = JsonRpcRequest {
            jsonrpc: "2.0",
            method,
            params,
            id,
        };

        let response = self
            .http_client
            .post(&self.rpc_url)
            .json(&request)
            .send()
            .await
            .map_err(transport_error)?;

        let rpc_response: JsonRpcResponse<R> = response
            .json()
            .await
            .map_err(|e| RpcError::Decode(e.to_string()))?;

        if let Some(error) = rpc_response.error {
            debug!(method, code = error.code, message = %error.message, "RPC error");
            return Err(RpcError::classify(error.code, &error.message));
        }

        Ok(rpc_response.result)
    }

    async fn call_required<P: Serialize + Send, R: DeserializeOwned>(
        &self,
        method: &str,
        params: P,
    ) -> Result<R, RpcError> {
        self.call(method, params)
            .await?
            .ok_or_else(|| RpcError::Decode(format!("{method} returned no result")))
    }
}

fn transport_error(err: reqwest::Error) -> RpcError {
    if err.is_timeout() {
        RpcError::Timeout
    } else {
        RpcError::Transport(err.to_string())
    }
}

/// Parse a `0x`-prefixed hex quantity.
pub fn parse_hex_u64(value: &str) -> Result<u64, RpcError> {
    let stripped = value.strip_prefix("0x").unwrap_or(value);
    if stripped.is_empty() {
        return Ok(0);
    }
    u64::from_str_radix(stripped, 16)
        .map_err(|e| RpcError::Decode(format!("invalid quantity {value}: {e}")))
}

fn parse_hash_field(value: &str) -> Result<Hash, RpcError> {
    parse_hash(value).ok_or_else(|| RpcError::Decode(format!("invalid hash {value}")))
}

fn decode_receipt(json: ReceiptJson) -> Result<Option<LedgerReceipt>, RpcError> {
    // Some nodes return pending receipts with a null block.
    let (Some(block_number), Some(block_hash)) = (json.block_number, json.block_hash) else {
        return Ok(None);
    };
    let status = match json.status.as_deref().map(parse_hex_u64).transpose()? {
        Some(0) => ReceiptStatus::Reverted,
        _ => ReceiptStatus::Success,
    };
    Ok(Some(LedgerReceipt {
        tx_hash: parse_hash_field(&json.transaction_hash)?,
        block_number: parse_hex_u64(&block_number)?,
        block_hash: parse_hash_field(&block_hash)?,
        status,
        gas_used: json
            .gas_used
            .as_deref()
            .map(parse_hex_u64)
            .transpose()?
            .unwrap_or(0),
    }))
}

#[async_trait]
impl LedgerRpc for JsonRpcLedger {
    async fn send_raw_transaction(&self, tx: &SignedTransaction) -> Result<Hash, RpcError> {
        let result: String = self
            .call_required("eth_sendRawTransaction", [to_hex(&tx.raw)])
            .await?;
        parse_hash_field(&result)
    }

    async fn transaction_receipt(&self, tx_hash: &Hash) -> Result<Option<LedgerReceipt>, RpcError> {
        let receipt: Option<ReceiptJson> = self
            .call("eth_getTransactionReceipt", [to_hex(tx_hash)])
            .await?;
        match receipt {
            Some(json) => decode_receipt(json),
            None => Ok(None),
        }
    }

    async fn transaction_count(&self, address: &Address) -> Result<u64, RpcError> {
        let result: String = self
            .call_required(
                "eth_getTransactionCount",
                [to_hex(address), "pending".to_string()],
            )
            .await?;
        parse_hex_u64(&result)
    }

    async fn block_number(&self) -> Result<u64, RpcError> {
        let result: String = self
            .call_required("eth_blockNumber", Vec::<()>::new())
            .await?;
        parse_hex_u64(&result)
    }
}
