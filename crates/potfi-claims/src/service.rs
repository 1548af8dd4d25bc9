use std::sync::Arc;

use potfi_core::constants::PERMIT_TTL_SECS;
use potfi_core::error::PotfiError;
use potfi_core::pot::{PotClosure, PotState};
use potfi_core::types::{Balance, ContentId, EthAddress, PlatformUserId, PotId, Timestamp};
use potfi_crypto::{PermitFields, PermitSigner};
use potfi_gate::{EngagementGate, Identity};
use potfi_jackpot::{evaluate_claim, ClaimOutcome, RandomSource};
use potfi_state::PotStore;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::ServiceConfig;

/// One inbound claim.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClaimRequest {
    pub pot_id: PotId,
    pub claimer: EthAddress,
    pub content_id: ContentId,
    pub platform_user_id: Option<PlatformUserId>,
}

/// A signed permit plus the outcome it authorizes.
#[derive(Clone, Debug)]
pub struct ClaimReceipt {
    /// Unix seconds after which the ledger rejects the permit.
    pub deadline: u64,
    pub content_id: ContentId,
    /// Personal-message signature over `hash_v2`: r ‖ s ‖ v.
    pub signature: [u8; 65],
    pub identity: Identity,
    pub outcome: ClaimOutcome,
    pub hash_v2: [u8; 32],
    pub hash_v1: [u8; 32],
}

/// Pot state plus derived accounting, as reported by `status`.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PotStatus {
    pub pot_id: PotId,
    pub state: PotState,
    pub claimed_amount: Balance,
    pub remaining_amount: Balance,
    pub max_possible_claims: u64,
    pub expires_at: Timestamp,
}

impl PotStatus {
    fn of(pot_id: PotId, state: PotState) -> Self {
        Self {
            pot_id,
            claimed_amount: state.claimed_amount(),
            remaining_amount: state.remaining_amount(),
            max_possible_claims: state.max_possible_claims(),
            expires_at: state.expires_at(),
            state,
        }
    }
}

fn unix_now() -> Timestamp {
    chrono::Utc::now().timestamp()
}

/// The claim orchestrator.
///
/// A claim runs `resolve identity → ledger config → engagement → commit`.
/// Everything before the commit is read-only, so any failure there leaves the
/// store untouched. The commit evaluates the outcome and signs the permit on a
/// staged copy of the pot inside one `PotStore::update`, and the staged state
/// is written only once the permit exists.
pub struct ClaimService<S: PotStore> {
    store: Arc<S>,
    gate: EngagementGate,
    signer: Arc<PermitSigner>,
    rng: Arc<dyn RandomSource>,
    config: ServiceConfig,
}

impl<S: PotStore> ClaimService<S> {
    pub fn new(
        store: Arc<S>,
        gate: EngagementGate,
        signer: Arc<PermitSigner>,
        rng: Arc<dyn RandomSource>,
        config: ServiceConfig,
    ) -> Self {
        Self { store, gate, signer, rng, config }
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    pub fn signer_address(&self) -> EthAddress {
        self.signer.address()
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    // ── Claims ───────────────────────────────────────────────────────────────

    pub async fn claim(&self, req: &ClaimRequest) -> Result<ClaimReceipt, PotfiError> {
        self.claim_at(req, unix_now()).await
    }

    pub async fn claim_at(&self, req: &ClaimRequest, now: Timestamp) -> Result<ClaimReceipt, PotfiError> {
        let identity = self
            .gate
            .resolve_identity(req.platform_user_id, &req.claimer)
            .await?;

        let pot_config = self.gate.pot_config(&req.pot_id).await?;
        if !pot_config.content_id.is_zero() && pot_config.content_id != req.content_id {
            return Err(PotfiError::InvalidRequest(format!(
                "content id {} does not match pot content {}",
                req.content_id, pot_config.content_id
            )));
        }

        self.gate
            .verify(&pot_config.requirements, &identity, &req.content_id)
            .await?;

        let deadline = (now.max(0) as u64).saturating_add(PERMIT_TTL_SECS as u64);
        let fields = PermitFields {
            claimer: req.claimer,
            pot_id: req.pot_id,
            deadline,
            content_id: req.content_id,
            ledger: self.config.ledger_address,
            chain_id: self.config.chain_id,
        };
        let default_total = self.config.default_pot_amount;

        let (outcome, digests, signature) = self.store.update(&req.pot_id, |current| {
            let mut staged =
                current.unwrap_or_else(|| PotState::new(default_total, now, None));

            if !staged.is_active {
                return Err(PotfiError::PotInactive);
            }
            if staged.is_expired(now) {
                return Err(PotfiError::PotExpired { expired_at: staged.expires_at() });
            }
            if staged.remaining_amount() < staged.standard_claim_amount {
                return Err(PotfiError::PotExhausted);
            }

            let outcome = evaluate_claim(&mut staged, now, self.rng.as_ref());
            let (digests, signature) = self.signer.sign_permit(&fields).map_err(|e| {
                warn!(pot_id = %req.pot_id, error = %e, "permit signing failed");
                PotfiError::Signing(e.to_string())
            })?;
            Ok((staged, (outcome, digests, signature)))
        })?;

        if outcome.is_jackpot {
            info!(
                pot_id = %req.pot_id,
                claimer = %req.claimer,
                claim_index = outcome.claim_index,
                amount = %outcome.claim_amount,
                "jackpot claimed, pot closed"
            );
        } else {
            debug!(
                pot_id = %req.pot_id,
                claimer = %req.claimer,
                claim_index = outcome.claim_index,
                "standard claim issued"
            );
        }

        Ok(ClaimReceipt {
            deadline,
            content_id: req.content_id,
            signature,
            identity,
            outcome,
            hash_v2: digests.v2,
            hash_v1: digests.v1,
        })
    }

    // ── Administration ───────────────────────────────────────────────────────

    pub fn initialize(
        &self,
        pot_id: &PotId,
        total_amount: Balance,
        creator: Option<EthAddress>,
    ) -> Result<PotStatus, PotfiError> {
        self.initialize_at(pot_id, total_amount, creator, unix_now())
    }

    pub fn initialize_at(
        &self,
        pot_id: &PotId,
        total_amount: Balance,
        creator: Option<EthAddress>,
        now: Timestamp,
    ) -> Result<PotStatus, PotfiError> {
        if total_amount == 0 {
            return Err(PotfiError::InvalidRequest("total amount must be positive".into()));
        }
        let state = self.store.initialize(pot_id, total_amount, creator, now)?;
        info!(%pot_id, total_amount = %total_amount, "pot initialized");
        Ok(PotStatus::of(*pot_id, state))
    }

    pub fn status(&self, pot_id: &PotId) -> Result<PotStatus, PotfiError> {
        let state = self
            .store
            .get(pot_id)?
            .ok_or_else(|| PotfiError::PotNotFound(pot_id.to_hex()))?;
        Ok(PotStatus::of(*pot_id, state))
    }

    /// Sweep what is left of an expired pot back to its creator. Returns the
    /// amount reclaimed.
    pub fn reclaim(&self, pot_id: &PotId, creator: &EthAddress) -> Result<Balance, PotfiError> {
        self.reclaim_at(pot_id, creator, unix_now())
    }

    pub fn reclaim_at(
        &self,
        pot_id: &PotId,
        creator: &EthAddress,
        now: Timestamp,
    ) -> Result<Balance, PotfiError> {
        let reclaimed = self.store.update(pot_id, |current| {
            let mut state = current.ok_or_else(|| PotfiError::PotNotFound(pot_id.to_hex()))?;

            if !state.is_active {
                return Err(PotfiError::PotInactive);
            }
            if let Some(recorded) = state.creator {
                if recorded != *creator {
                    return Err(PotfiError::NotPotCreator);
                }
            }
            if !state.is_expired(now) {
                return Err(PotfiError::NotExpired { reclaimable_at: state.expires_at() + 1 });
            }
            let remaining = state.remaining_amount();
            if remaining == 0 {
                return Err(PotfiError::NothingToReclaim);
            }

            state.total_amount = state.claimed_amount();
            state.is_active = false;
            state.closure = Some(PotClosure::Reclaimed { amount: remaining, at: now });
            Ok((state, remaining))
        })?;

        info!(%pot_id, %creator, amount = %reclaimed, "pot reclaimed");
        Ok(reclaimed)
    }
}
