use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use potfi_core::error::PotfiError;
use potfi_core::pot::{PotConfig, Requirements};
use potfi_core::types::{ContentId, EthAddress, PlatformUserId, PotId};
use tracing::{debug, warn};

use crate::ledger::PotLedger;
use crate::oracle::{EngagementOracle, Identity, IdentityResolver};

/// Checks that a claimer exists and has performed the engagement a pot requires.
///
/// Every outbound call is bounded by `timeout`; a timeout surfaces as the
/// retryable `UpstreamUnavailable`.
///
/// A caller-supplied platform user id is trusted as-is unless
/// `require_linked_address` is set, in which case the claimer address must
/// resolve to that same user.
pub struct EngagementGate {
    resolver: Arc<dyn IdentityResolver>,
    oracle: Arc<dyn EngagementOracle>,
    ledger: Arc<dyn PotLedger>,
    timeout: Duration,
    require_linked_address: bool,
}

impl EngagementGate {
    pub fn new(
        resolver: Arc<dyn IdentityResolver>,
        oracle: Arc<dyn EngagementOracle>,
        ledger: Arc<dyn PotLedger>,
        timeout: Duration,
    ) -> Self {
        Self { resolver, oracle, ledger, timeout, require_linked_address: false }
    }

    /// Reject a platform user id whose verified addresses do not include the claimer.
    pub fn require_linked_address(mut self, on: bool) -> Self {
        self.require_linked_address = on;
        self
    }

    async fn bounded<T, F>(&self, what: &'static str, fut: F) -> Result<T, PotfiError>
    where
        F: Future<Output = Result<T, PotfiError>>,
    {
        match tokio::time::timeout(self.timeout, fut).await {
            Ok(res) => res,
            Err(_) => {
                warn!(call = what, timeout_ms = self.timeout.as_millis() as u64, "upstream call timed out");
                Err(PotfiError::UpstreamUnavailable(format!("{what} timed out")))
            }
        }
    }

    /// Resolve the claimer: platform id first when given, then the address.
    pub async fn resolve_identity(
        &self,
        platform_user_id: Option<PlatformUserId>,
        address: &EthAddress,
    ) -> Result<Identity, PotfiError> {
        if let Some(id) = platform_user_id {
            let found = self
                .bounded("identity lookup", self.resolver.resolve_platform_user(id))
                .await?;
            if let Some(identity) = found {
                if self.require_linked_address {
                    self.check_linked(&identity, address).await?;
                }
                return Ok(identity);
            }
            debug!(platform_user_id = id, "platform id unknown, falling back to address");
        }

        self.bounded("identity lookup", self.resolver.resolve_address(address))
            .await?
            .ok_or(PotfiError::IdentityNotFound)
    }

    async fn check_linked(&self, identity: &Identity, address: &EthAddress) -> Result<(), PotfiError> {
        let owner = self
            .bounded("identity lookup", self.resolver.resolve_address(address))
            .await?;
        match owner {
            Some(owner) if owner.platform_user_id == identity.platform_user_id => Ok(()),
            _ => {
                debug!(
                    platform_user_id = identity.platform_user_id,
                    %address,
                    "claimer address not linked to platform id"
                );
                Err(PotfiError::IdentityNotFound)
            }
        }
    }

    /// Requirement flags and bound content for a pot, from the ledger.
    pub async fn pot_config(&self, pot_id: &PotId) -> Result<PotConfig, PotfiError> {
        self.bounded("ledger read", self.ledger.pot_config(pot_id)).await
    }

    /// Fail-fast check in like → recast → comment order. The oracle is
    /// consulted once, and not at all when nothing is required.
    pub async fn verify(
        &self,
        requirements: &Requirements,
        identity: &Identity,
        content_id: &ContentId,
    ) -> Result<(), PotfiError> {
        if !requirements.any() {
            return Ok(());
        }

        let status = self
            .bounded(
                "engagement lookup",
                self.oracle.engagement(identity.platform_user_id, content_id),
            )
            .await?;

        if let Some(missing) = requirements.required().find(|kind| !status.has(*kind)) {
            debug!(
                platform_user_id = identity.platform_user_id,
                %content_id,
                missing = %missing,
                "engagement requirement not met"
            );
            return Err(PotfiError::EngagementMissing(missing));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::StaticLedger;
    use crate::memory::InMemorySocialGraph;
    use crate::oracle::EngagementStatus;
    use async_trait::async_trait;
    use potfi_core::pot::EngagementKind;
    use potfi_core::types::Bytes32;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn alice() -> Identity {
        Identity { platform_user_id: 42, handle: "alice".into(), display_name: "Alice".into() }
    }

    fn alice_addr() -> EthAddress {
        EthAddress::from_bytes([0xa1; 20])
    }

    fn content() -> ContentId {
        Bytes32::from_bytes([7; 32])
    }

    fn gate_with(graph: Arc<InMemorySocialGraph>) -> EngagementGate {
        EngagementGate::new(
            graph.clone(),
            graph,
            Arc::new(StaticLedger::open()),
            Duration::from_millis(200),
        )
    }

    /// Oracle that counts calls and never answers in time.
    struct StallingOracle {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl EngagementOracle for StallingOracle {
        async fn engagement(&self, _fid: PlatformUserId, _content: &ContentId) -> Result<EngagementStatus, PotfiError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(EngagementStatus::default())
        }
    }

    #[tokio::test]
    async fn missing_recast_is_reported() {
        let graph = Arc::new(InMemorySocialGraph::new());
        graph.add_user(alice(), [alice_addr()]);
        graph.set_engagement(42, content(), EngagementStatus { liked: true, recasted: false, replied: true });
        let gate = gate_with(graph);

        let req = Requirements { require_like: false, require_recast: true, require_comment: false };
        let err = gate.verify(&req, &alice(), &content()).await.unwrap_err();
        assert!(matches!(err, PotfiError::EngagementMissing(EngagementKind::Recast)));
    }

    #[tokio::test]
    async fn first_missing_requirement_wins() {
        let graph = Arc::new(InMemorySocialGraph::new());
        graph.add_user(alice(), [alice_addr()]);
        let gate = gate_with(graph);

        let req = Requirements { require_like: true, require_recast: true, require_comment: true };
        let err = gate.verify(&req, &alice(), &content()).await.unwrap_err();
        assert!(matches!(err, PotfiError::EngagementMissing(EngagementKind::Like)));
    }

    #[tokio::test]
    async fn satisfied_requirements_pass() {
        let graph = Arc::new(InMemorySocialGraph::new());
        graph.set_engagement(42, content(), EngagementStatus { liked: true, recasted: true, replied: true });
        let gate = gate_with(graph);
        let req = Requirements { require_like: true, require_recast: true, require_comment: true };
        gate.verify(&req, &alice(), &content()).await.unwrap();
    }

    #[tokio::test]
    async fn no_requirements_skips_the_oracle() {
        let oracle = Arc::new(StallingOracle { calls: AtomicUsize::new(0) });
        let gate = EngagementGate::new(
            Arc::new(InMemorySocialGraph::new()),
            oracle.clone(),
            Arc::new(StaticLedger::open()),
            Duration::from_millis(50),
        );
        gate.verify(&Requirements::default(), &alice(), &content()).await.unwrap();
        assert_eq!(oracle.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn slow_oracle_times_out_as_retryable() {
        let oracle = Arc::new(StallingOracle { calls: AtomicUsize::new(0) });
        let gate = EngagementGate::new(
            Arc::new(InMemorySocialGraph::new()),
            oracle.clone(),
            Arc::new(StaticLedger::open()),
            Duration::from_millis(50),
        );
        let req = Requirements { require_like: true, require_recast: true, require_comment: false };
        let err = gate.verify(&req, &alice(), &content()).await.unwrap_err();
        assert!(err.is_retryable());
        assert_eq!(oracle.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn identity_falls_back_to_address() {
        let graph = Arc::new(InMemorySocialGraph::new());
        graph.add_user(alice(), [alice_addr()]);
        let gate = gate_with(graph);

        let by_fid = gate.resolve_identity(Some(42), &EthAddress::default()).await.unwrap();
        assert_eq!(by_fid, alice());
        let by_addr = gate.resolve_identity(Some(9_999), &alice_addr()).await.unwrap();
        assert_eq!(by_addr, alice());
        let addr_only = gate.resolve_identity(None, &alice_addr()).await.unwrap();
        assert_eq!(addr_only, alice());
    }

    #[tokio::test]
    async fn linked_address_check_rejects_borrowed_platform_id() {
        let graph = Arc::new(InMemorySocialGraph::new());
        graph.add_user(alice(), [alice_addr()]);
        let mallory = EthAddress::from_bytes([0xee; 20]);

        let lenient = gate_with(graph.clone());
        assert_eq!(lenient.resolve_identity(Some(42), &mallory).await.unwrap(), alice());

        let strict = gate_with(graph).require_linked_address(true);
        let err = strict.resolve_identity(Some(42), &mallory).await.unwrap_err();
        assert!(matches!(err, PotfiError::IdentityNotFound));
        assert_eq!(strict.resolve_identity(Some(42), &alice_addr()).await.unwrap(), alice());
    }

    #[tokio::test]
    async fn unknown_identity_is_rejected() {
        let gate = gate_with(Arc::new(InMemorySocialGraph::new()));
        let err = gate.resolve_identity(Some(1), &alice_addr()).await.unwrap_err();
        assert!(matches!(err, PotfiError::IdentityNotFound));
    }
}
