//! secp256k1 signer for the ledger account.
//!
//! The key never leaves this type: `Debug` is redacted and the scalar is
//! wiped on drop.

use crate::domain::{keccak256, SignedTransaction, UnsignedTransaction};
use crate::ports::outbound::{SignerError, TransactionSigner};
use k256::ecdsa::SigningKey;
use k256::elliptic_curve::sec1::ToEncodedPoint;
use shared_types::Address;
use std::fmt;
use zeroize::Zeroize;

pub struct LocalKeySigner {
    signing_key: SigningKey,
    address: Address,
}

impl LocalKeySigner {
    /// Build a signer from a raw 32-byte secret.
    pub fn from_bytes(secret: &[u8]) -> Result<Self, SignerError> {
        let signing_key = SigningKey::from_slice(secret).map_err(|_| SignerError::InvalidKey)?;
        let address = derive_address(&signing_key);
        Ok(Self {
            signing_key,
            address,
        })
    }

    /// Build a signer from a hex secret, with or without `0x`.
    pub fn from_hex(secret: &str) -> Result<Self, SignerError> {
        let trimmed = secret.trim();
        let stripped = trimmed.strip_prefix("0x").unwrap_or(trimmed);
        let mut bytes = hex::decode(stripped).map_err(|_| SignerError::InvalidKey)?;
        let signer = Self::from_bytes(&bytes);
        bytes.zeroize();
        signer
    }
}

fn derive_address(signing_key: &SigningKey) -> Address {
    let point = signing_key.verifying_key().as_affine().to_encoded_point(false);
    let hash = keccak256(&point.as_bytes()[1..]);
    let mut address = [0u8; 20];
    address.copy_from_slice(&hash[12..]);
    address
}

impl TransactionSigner for LocalKeySigner {
    fn address(&self) -> Address {
        self.address
    }

    fn sign(&self, tx: &UnsignedTransaction) -> Result<SignedTransaction, SignerError> {
        let prehash = tx.signing_hash();
        let (signature, recovery_id) = self
            .signing_key
            .sign_prehash_recoverable(&prehash)
            .map_err(|e| SignerError::Signature(e.to_string()))?;

        let bytes = signature.to_bytes();
        let mut r = [0u8; 32];
        let mut s = [0u8; 32];
        r.copy_from_slice(&bytes[..32]);
        s.copy_from_slice(&bytes[32..]);
        let v = u64::from(recovery_id.to_byte()) + tx.chain_id * 2 + 35;

        let raw = tx.encode_signed(v, &r, &s);
        Ok(SignedTransaction {
            hash: keccak256(&raw),
            raw,
            nonce: tx.nonce,
            from: self.address,
            gas_price: tx.gas_price,
        })
    }
}

impl fmt::Debug for LocalKeySigner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LocalKeySigner")
            .field("address", &shared_types::to_hex(&self.address))
            .field("signing_key", &"<redacted>")
            .finish()
    }
}

impl Drop for LocalKeySigner {
    fn drop(&mut self) {
        let mut bytes: [u8; 32] = self.signing_key.to_bytes().into();
        bytes.zeroize();
    }
}
