//! Ledger transactions.
//!
//! Anchors are legacy (type 0) EIP-155 transactions calling
//! `anchor(bytes32 payloadHash, bytes32 metadataDigest)` on the registry
//! contract.
//!
//! ```text
//! signing payload = rlp([nonce, gasPrice, gasLimit, to, value, data, chainId, 0, 0])
//! signed          = rlp([nonce, gasPrice, gasLimit, to, value, data, v, r, s])
//! v               = recovery_id + chainId * 2 + 35
//! tx_hash         = keccak256(signed)
//! ```

use rlp::RlpStream;
use sha3::{Digest, Keccak256};
use shared_types::{Address, Hash, TicketMetadata};

/// `keccak256("anchor(bytes32,bytes32)")[..4]`
pub const ANCHOR_SELECTOR: [u8; 4] = [0xa2, 0x1f, 0x3c, 0x6a];

pub fn keccak256(bytes: &[u8]) -> Hash {
    let mut hasher = Keccak256::new();
    hasher.update(bytes);
    hasher.finalize().into()
}

/// Digest binding a ticket's metadata into the anchor call.
pub fn metadata_digest(metadata: &TicketMetadata) -> Hash {
    let mut hasher = Keccak256::new();
    hasher.update(metadata.complaint_id.as_str().as_bytes());
    hasher.update([0u8]);
    hasher.update(metadata.kind.label().as_bytes());
    hasher.finalize().into()
}

/// ABI-encoded `anchor(payload_hash, metadata_digest)` call.
pub fn anchor_call_data(payload_hash: &Hash, metadata: &TicketMetadata) -> Vec<u8> {
    let mut data = Vec::with_capacity(4 + 64);
    data.extend_from_slice(&ANCHOR_SELECTOR);
    data.extend_from_slice(payload_hash);
    data.extend_from_slice(&metadata_digest(metadata));
    data
}

/// A transaction ready to be signed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnsignedTransaction {
    pub nonce: u64,
    pub gas_price: u128,
    pub gas_limit: u64,
    pub to: Address,
    pub value: u128,
    pub data: Vec<u8>,
    pub chain_id: u64,
}

impl UnsignedTransaction {
    /// RLP payload whose Keccak-256 is signed (EIP-155).
    pub fn signing_payload(&self) -> Vec<u8> {
        let mut stream = RlpStream::new_list(9);
        self.append_body(&mut stream);
        stream.append(&self.chain_id);
        append_uint(&mut stream, 0);
        append_uint(&mut stream, 0);
        stream.out().to_vec()
    }

    pub fn signing_hash(&self) -> Hash {
        keccak256(&self.signing_payload())
    }

    /// Final RLP encoding with the signature attached.
    pub fn encode_signed(&self, v: u64, r: &[u8; 32], s: &[u8; 32]) -> Vec<u8> {
        let mut stream = RlpStream::new_list(9);
        self.append_body(&mut stream);
        stream.append(&v);
        stream.append(&trim_leading_zeros(r));
        stream.append(&trim_leading_zeros(s));
        stream.out().to_vec()
    }

    fn append_body(&self, stream: &mut RlpStream) {
        stream.append(&self.nonce);
        append_uint(stream, self.gas_price);
        stream.append(&self.gas_limit);
        stream.append(&self.to.to_vec());
        append_uint(stream, self.value);
        stream.append(&self.data);
    }
}

/// A signed transaction plus the fields the submitter tracks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedTransaction {
    pub raw: Vec<u8>,
    pub hash: Hash,
    pub nonce: u64,
    pub from: Address,
    pub gas_price: u128,
}

fn append_uint(stream: &mut RlpStream, value: u128) {
    stream.append(&trim_leading_zeros(&value.to_be_bytes()));
}

fn trim_leading_zeros(bytes: &[u8]) -> Vec<u8> {
    let start = bytes.iter().position(|b| *b != 0).unwrap_or(bytes.len());
    bytes[start..].to_vec()
}
