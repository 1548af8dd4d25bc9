pub mod hash;
pub mod permit;
pub mod signer;

pub use hash::{keccak256, selector};
pub use permit::{PermitDigests, PermitFields, PermitVersion};
pub use signer::{personal_message_hash, recover_signer, PermitSigner, SignatureError};
