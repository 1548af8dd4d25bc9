use std::time::Duration;

use potfi_core::constants::{DEFAULT_CHAIN_ID, DEFAULT_POT_AMOUNT, DEFAULT_UPSTREAM_TIMEOUT_MS};
use potfi_core::types::{Balance, EthAddress};

/// Deployment parameters for the claim service.
#[derive(Clone, Debug)]
pub struct ServiceConfig {
    /// Chain the ledger lives on; bound into V2 permits.
    pub chain_id: u64,
    /// Pot ledger contract; bound into V2 permits.
    pub ledger_address: EthAddress,
    /// Bound on each identity, engagement and ledger call.
    pub upstream_timeout: Duration,
    /// Total assumed for a pot first seen through a claim.
    pub default_pot_amount: Balance,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            chain_id: DEFAULT_CHAIN_ID,
            ledger_address: EthAddress::default(),
            upstream_timeout: Duration::from_millis(DEFAULT_UPSTREAM_TIMEOUT_MS),
            default_pot_amount: DEFAULT_POT_AMOUNT,
        }
    }
}
