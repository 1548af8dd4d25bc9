use sha3::{Digest, Keccak256};

/// Compute Keccak-256 of arbitrary bytes → 32-byte array.
pub fn keccak256(data: &[u8]) -> [u8; 32] {
    Keccak256::digest(data).into()
}

/// 4-byte ABI function selector for a canonical signature such as
/// `"potRequirements(bytes32)"`.
pub fn selector(signature: &str) -> [u8; 4] {
    let h = keccak256(signature.as_bytes());
    [h[0], h[1], h[2], h[3]]
}
