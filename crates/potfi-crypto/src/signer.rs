use potfi_core::types::EthAddress;
use rand::RngCore;
use thiserror::Error;
use zeroize::Zeroizing;

use crate::hash::keccak256;
use crate::permit::{PermitDigests, PermitFields};

#[derive(Debug, Error)]
pub enum SignatureError {
    #[error("invalid secret key")]
    InvalidSecretKey,
    #[error("invalid signature")]
    InvalidSignature,
    #[error("invalid signature length: expected 65, got {0}")]
    InvalidSignatureLength(usize),
}

/// `keccak256("\x19Ethereum Signed Message:\n32" ‖ digest)`, the hash an
/// `ecrecover`-based verifier checks for a personal-message signature over a
/// raw 32-byte digest.
pub fn personal_message_hash(digest: &[u8; 32]) -> [u8; 32] {
    let mut msg = Vec::with_capacity(28 + 32);
    msg.extend_from_slice(b"\x19Ethereum Signed Message:\n32");
    msg.extend_from_slice(digest);
    keccak256(&msg)
}

fn address_of(public_key: &libsecp256k1::PublicKey) -> EthAddress {
    let h = keccak256(&public_key.serialize()[1..65]);
    let mut addr = [0u8; 20];
    addr.copy_from_slice(&h[12..]);
    EthAddress::from_bytes(addr)
}

/// Recover the address that produced a personal-message `signature`
/// (r ‖ s ‖ v, v ∈ {0, 1, 27, 28}) over `digest`.
pub fn recover_signer(digest: &[u8; 32], signature: &[u8]) -> Result<EthAddress, SignatureError> {
    if signature.len() != 65 {
        return Err(SignatureError::InvalidSignatureLength(signature.len()));
    }
    let mut rs = [0u8; 64];
    rs.copy_from_slice(&signature[..64]);
    let v = signature[64];
    let v = if v >= 27 { v - 27 } else { v };

    let sig = libsecp256k1::Signature::parse_standard(&rs)
        .map_err(|_| SignatureError::InvalidSignature)?;
    let rec_id = libsecp256k1::RecoveryId::parse(v).map_err(|_| SignatureError::InvalidSignature)?;
    let msg = libsecp256k1::Message::parse(&personal_message_hash(digest));
    let pk = libsecp256k1::recover(&msg, &sig, &rec_id)
        .map_err(|_| SignatureError::InvalidSignature)?;
    Ok(address_of(&pk))
}

/// Holds the service's permit-signing key.
///
/// The secret key lives in a `Zeroizing<Vec<u8>>` and is never exposed;
/// `Debug` prints the signer address only.
pub struct PermitSigner {
    address: EthAddress,
    secret_key_bytes: Zeroizing<Vec<u8>>,
}

impl PermitSigner {
    pub fn from_secret_key_bytes(sk_bytes: &[u8]) -> Result<Self, SignatureError> {
        let sk = libsecp256k1::SecretKey::parse_slice(sk_bytes)
            .map_err(|_| SignatureError::InvalidSecretKey)?;
        let address = address_of(&libsecp256k1::PublicKey::from_secret_key(&sk));
        Ok(Self {
            address,
            secret_key_bytes: Zeroizing::new(sk_bytes.to_vec()),
        })
    }

    /// Parse a hex secret key, with or without `0x`.
    pub fn from_hex(s: &str) -> Result<Self, SignatureError> {
        let trimmed = s.trim();
        let trimmed = trimmed.strip_prefix("0x").unwrap_or(trimmed);
        let bytes = Zeroizing::new(hex::decode(trimmed).map_err(|_| SignatureError::InvalidSecretKey)?);
        Self::from_secret_key_bytes(&bytes)
    }

    /// Fresh random key. Only for local development and tests.
    pub fn generate() -> Self {
        let mut rng = rand::rngs::OsRng;
        loop {
            let mut bytes = Zeroizing::new([0u8; 32]);
            rng.fill_bytes(&mut bytes[..]);
            if let Ok(signer) = Self::from_secret_key_bytes(&bytes[..]) {
                return signer;
            }
        }
    }

    /// Address the ledger must have registered as its permit signer.
    pub fn address(&self) -> EthAddress {
        self.address
    }

    /// Personal-message signature over a raw 32-byte digest: r ‖ s ‖ v with v ∈ {27, 28}.
    pub fn sign_digest(&self, digest: &[u8; 32]) -> Result<[u8; 65], SignatureError> {
        let sk = libsecp256k1::SecretKey::parse_slice(&self.secret_key_bytes)
            .map_err(|_| SignatureError::InvalidSecretKey)?;
        let msg = libsecp256k1::Message::parse(&personal_message_hash(digest));
        let (sig, rec_id) = libsecp256k1::sign(&msg, &sk);
        let mut out = [0u8; 65];
        out[..64].copy_from_slice(&sig.serialize());
        out[64] = 27 + rec_id.serialize();
        Ok(out)
    }

    /// Compute both digests and sign the V2 one.
    pub fn sign_permit(&self, fields: &PermitFields) -> Result<(PermitDigests, [u8; 65]), SignatureError> {
        let digests = fields.digests();
        let signature = self.sign_digest(&digests.v2)?;
        Ok((digests, signature))
    }
}

impl std::fmt::Debug for PermitSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "PermitSigner {{ address: {} }}", self.address)
    }
}
