use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::RwLock;
use potfi_core::error::PotfiError;
use potfi_core::types::{ContentId, EthAddress, PlatformUserId};

use crate::oracle::{EngagementOracle, EngagementStatus, Identity, IdentityResolver};

/// In-process social graph serving both identity and engagement lookups.
///
/// Unknown users resolve to `None`; unknown engagement reads as "nothing done".
#[derive(Default)]
pub struct InMemorySocialGraph {
    users: RwLock<HashMap<PlatformUserId, Identity>>,
    addresses: RwLock<HashMap<EthAddress, PlatformUserId>>,
    engagement: RwLock<HashMap<(PlatformUserId, ContentId), EngagementStatus>>,
}

impl InMemorySocialGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a user and the addresses verified for them.
    pub fn add_user<I: IntoIterator<Item = EthAddress>>(&self, identity: Identity, addresses: I) {
        let id = identity.platform_user_id;
        let mut by_address = self.addresses.write();
        for addr in addresses {
            by_address.insert(addr, id);
        }
        self.users.write().insert(id, identity);
    }

    pub fn set_engagement(&self, platform_user_id: PlatformUserId, content_id: ContentId, status: EngagementStatus) {
        self.engagement.write().insert((platform_user_id, content_id), status);
    }
}

#[async_trait]
impl IdentityResolver for InMemorySocialGraph {
    async fn resolve_platform_user(
        &self,
        platform_user_id: PlatformUserId,
    ) -> Result<Option<Identity>, PotfiError> {
        Ok(self.users.read().get(&platform_user_id).cloned())
    }

    async fn resolve_address(&self, address: &EthAddress) -> Result<Option<Identity>, PotfiError> {
        let Some(id) = self.addresses.read().get(address).copied() else {
            return Ok(None);
        };
        Ok(self.users.read().get(&id).cloned())
    }
}

#[async_trait]
impl EngagementOracle for InMemorySocialGraph {
    async fn engagement(
        &self,
        platform_user_id: PlatformUserId,
        content_id: &ContentId,
    ) -> Result<EngagementStatus, PotfiError> {
        Ok(self
            .engagement
            .read()
            .get(&(platform_user_id, *content_id))
            .copied()
            .unwrap_or_default())
    }
}
