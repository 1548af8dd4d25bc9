use async_trait::async_trait;
use potfi_core::error::PotfiError;
use potfi_core::types::{ContentId, EthAddress, PlatformUserId};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use tracing::warn;

use crate::oracle::{EngagementOracle, EngagementStatus, Identity, IdentityResolver};

/// HTTP client for the social platform API.
///
/// Endpoints (relative to `base_url`):
///   GET /users/by-fid/{fid}            → Identity
///   GET /users/by-address/{address}    → Identity
///   GET /engagement?fid=&content_id=   → EngagementStatus
///
/// A 404 on a user lookup means "no such user". Anything else that is not a
/// 2xx is reported as `UpstreamUnavailable`.
pub struct HttpSocialApi {
    base_url: String,
    api_key: Option<String>,
    client: reqwest::Client,
}

impl HttpSocialApi {
    pub fn new(base_url: &str, api_key: Option<String>) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            client: reqwest::Client::new(),
        }
    }

    /// GET `path` and decode the body; `Ok(None)` on 404.
    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<Option<T>, PotfiError> {
        let url = format!("{}{}", self.base_url, path);
        let mut req = self.client.get(&url).query(query);
        if let Some(key) = &self.api_key {
            req = req.header("x-api-key", key);
        }

        let resp = req.send().await.map_err(|e| {
            warn!(%url, error = %e, "social api unreachable");
            PotfiError::UpstreamUnavailable("social api unreachable".into())
        })?;

        match resp.status() {
            StatusCode::NOT_FOUND => return Ok(None),
            s if !s.is_success() => {
                warn!(%url, status = s.as_u16(), "social api error status");
                return Err(PotfiError::UpstreamUnavailable(format!(
                    "social api returned {}",
                    s.as_u16()
                )));
            }
            _ => {}
        }

        let body = resp.json::<T>().await.map_err(|e| {
            warn!(%url, error = %e, "social api response malformed");
            PotfiError::UpstreamUnavailable("social api response malformed".into())
        })?;
        Ok(Some(body))
    }
}

#[async_trait]
impl IdentityResolver for HttpSocialApi {
    async fn resolve_platform_user(
        &self,
        platform_user_id: PlatformUserId,
    ) -> Result<Option<Identity>, PotfiError> {
        self.get_json(&format!("/users/by-fid/{platform_user_id}"), &[]).await
    }

    async fn resolve_address(&self, address: &EthAddress) -> Result<Option<Identity>, PotfiError> {
        self.get_json(&format!("/users/by-address/{}", address.to_hex()), &[]).await
    }
}

#[async_trait]
impl EngagementOracle for HttpSocialApi {
    async fn engagement(
        &self,
        platform_user_id: PlatformUserId,
        content_id: &ContentId,
    ) -> Result<EngagementStatus, PotfiError> {
        let query = [
            ("fid", platform_user_id.to_string()),
            ("content_id", content_id.to_hex()),
        ];
        // No record of the content means no engagement with it.
        Ok(self
            .get_json::<EngagementStatus>("/engagement", &query)
            .await?
            .unwrap_or_default())
    }
}
