//! Permit digests accepted by the pot ledger's `claim()`.
//!
//! Both versions are `keccak256(abi.encode(TYPEHASH, ...fields))` where every
//! field occupies one 32-byte big-endian word:
//!
//!   V2: TYPEHASH_V2 ‖ claimer ‖ potId ‖ deadline ‖ contentId ‖ ledger ‖ chainId
//!   V1: TYPEHASH_V1 ‖ claimer ‖ potId ‖ deadline ‖ contentId
//!
//! V1 is kept for diagnostics against older ledgers; only V2 is ever signed.

use once_cell::sync::Lazy;
use potfi_core::constants::{PERMIT_V1_TYPE, PERMIT_V2_TYPE};
use potfi_core::types::{ContentId, EthAddress, PotId};
use serde::{Deserialize, Serialize};

use crate::hash::keccak256;

static PERMIT_V2_TYPEHASH: Lazy<[u8; 32]> = Lazy::new(|| keccak256(PERMIT_V2_TYPE.as_bytes()));
static PERMIT_V1_TYPEHASH: Lazy<[u8; 32]> = Lazy::new(|| keccak256(PERMIT_V1_TYPE.as_bytes()));

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum PermitVersion {
    /// Legacy: no ledger address or chain id bound in.
    V1,
    /// Domain-separated: bound to one ledger contract on one chain.
    V2,
}

/// Everything a permit binds together.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PermitFields {
    pub claimer: EthAddress,
    pub pot_id: PotId,
    /// Unix seconds.
    pub deadline: u64,
    pub content_id: ContentId,
    pub ledger: EthAddress,
    pub chain_id: u64,
}

/// Both digests for one set of fields.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PermitDigests {
    pub v1: [u8; 32],
    pub v2: [u8; 32],
}

fn uint_word(v: u64) -> [u8; 32] {
    let mut word = [0u8; 32];
    word[24..].copy_from_slice(&v.to_be_bytes());
    word
}

impl PermitFields {
    /// ABI-encoded preimage for `version`.
    pub fn encode(&self, version: PermitVersion) -> Vec<u8> {
        let mut words: Vec<[u8; 32]> = match version {
            PermitVersion::V1 => vec![*PERMIT_V1_TYPEHASH],
            PermitVersion::V2 => vec![*PERMIT_V2_TYPEHASH],
        };
        words.push(self.claimer.to_word());
        words.push(self.pot_id.0);
        words.push(uint_word(self.deadline));
        words.push(self.content_id.0);
        if version == PermitVersion::V2 {
            words.push(self.ledger.to_word());
            words.push(uint_word(self.chain_id));
        }
        words.concat()
    }

    pub fn digest(&self, version: PermitVersion) -> [u8; 32] {
        keccak256(&self.encode(version))
    }

    pub fn digests(&self) -> PermitDigests {
        PermitDigests {
            v1: self.digest(PermitVersion::V1),
            v2: self.digest(PermitVersion::V2),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use potfi_core::types::Bytes32;

    fn fields() -> PermitFields {
        PermitFields {
            claimer: EthAddress::from_bytes([0x11; 20]),
            pot_id: Bytes32::from_bytes([0x22; 32]),
            deadline: 1_700_003_600,
            content_id: Bytes32::from_bytes([0x33; 32]),
            ledger: EthAddress::from_bytes([0x44; 20]),
            chain_id: 8453,
        }
    }

    #[test]
    fn encodings_have_expected_layout() {
        let f = fields();
        let v2 = f.encode(PermitVersion::V2);
        let v1 = f.encode(PermitVersion::V1);
        assert_eq!(v2.len(), 7 * 32);
        assert_eq!(v1.len(), 5 * 32);
        assert_eq!(&v2[..32], &keccak256(PERMIT_V2_TYPE.as_bytes()));
        assert_eq!(&v1[..32], &keccak256(PERMIT_V1_TYPE.as_bytes()));
        // Shared fields line up word for word after the typehash.
        assert_eq!(&v2[32..160], &v1[32..160]);
        assert_eq!(&v2[32 + 12..64], &[0x11; 20]);
        assert_eq!(&v2[96 + 24..128], &1_700_003_600u64.to_be_bytes());
        assert_eq!(&v2[160 + 12..192], &[0x44; 20]);
        assert_eq!(&v2[192 + 24..224], &8453u64.to_be_bytes());
    }

    #[test]
    fn digests_are_deterministic() {
        assert_eq!(fields().digests(), fields().digests());
    }

    #[test]
    fn v2_binds_domain_but_v1_does_not() {
        let a = fields();
        let mut b = fields();
        b.chain_id = 1;
        b.ledger = EthAddress::from_bytes([0x55; 20]);
        assert_ne!(a.digest(PermitVersion::V2), b.digest(PermitVersion::V2));
        assert_eq!(a.digest(PermitVersion::V1), b.digest(PermitVersion::V1));
    }

    #[test]
    fn every_shared_field_changes_both_digests() {
        let base = fields().digests();
        let mut f = fields();
        f.deadline += 1;
        let d = f.digests();
        assert_ne!(d.v1, base.v1);
        assert_ne!(d.v2, base.v2);

        let mut f = fields();
        f.content_id = Bytes32::ZERO;
        let d = f.digests();
        assert_ne!(d.v1, base.v1);
        assert_ne!(d.v2, base.v2);
    }
}
