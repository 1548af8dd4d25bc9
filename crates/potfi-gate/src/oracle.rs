use async_trait::async_trait;
use potfi_core::error::PotfiError;
use potfi_core::pot::EngagementKind;
use potfi_core::types::{ContentId, EthAddress, PlatformUserId};
use serde::{Deserialize, Serialize};

/// Canonical user identity on the social platform.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    pub platform_user_id: PlatformUserId,
    pub handle: String,
    #[serde(default)]
    pub display_name: String,
}

/// Combined engagement status of one user on one piece of content.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngagementStatus {
    pub liked: bool,
    pub recasted: bool,
    pub replied: bool,
}

impl EngagementStatus {
    pub fn has(&self, kind: EngagementKind) -> bool {
        match kind {
            EngagementKind::Like => self.liked,
            EngagementKind::Recast => self.recasted,
            EngagementKind::Comment => self.replied,
        }
    }
}

/// Maps addresses and platform ids to identities.
///
/// `Ok(None)` means "no such user"; transport failures are
/// `PotfiError::UpstreamUnavailable`.
#[async_trait]
pub trait IdentityResolver: Send + Sync {
    async fn resolve_platform_user(
        &self,
        platform_user_id: PlatformUserId,
    ) -> Result<Option<Identity>, PotfiError>;

    async fn resolve_address(&self, address: &EthAddress) -> Result<Option<Identity>, PotfiError>;
}

/// Reports a user's engagement with a piece of content in one fetch.
#[async_trait]
pub trait EngagementOracle: Send + Sync {
    async fn engagement(
        &self,
        platform_user_id: PlatformUserId,
        content_id: &ContentId,
    ) -> Result<EngagementStatus, PotfiError>;
}
