//! Pinning client for the content-addressed store.
//!
//! Calls `POST {api_url}/pinning/pinJSONToIPFS` with the Pinata request
//! shape (`pinataContent`, `pinataMetadata.name`) and returns the
//! resulting content identifier.

use std::future::Future;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::config::{ConfigError, ContentStoreConfig};
use crate::error::ContentStoreError;

/// Anything that can pin a JSON document and hand back its identifier.
///
/// The registry's provenance linker is generic over this so tests can
/// substitute an in-process fake.
pub trait ContentStore: Send + Sync {
    /// Pin `payload` under a human-readable `name`. Returns the content
    /// identifier.
    fn pin_json(
        &self,
        name: &str,
        payload: &serde_json::Value,
    ) -> impl Future<Output = Result<String, ContentStoreError>> + Send;
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PinJsonRequest<'a> {
    pinata_content: &'a serde_json::Value,
    pinata_metadata: PinMetadata<'a>,
}

#[derive(Serialize)]
struct PinMetadata<'a> {
    name: &'a str,
}

#[derive(Deserialize)]
struct PinResponse {
    #[serde(rename = "IpfsHash")]
    ipfs_hash: String,
}

/// HTTP client for the pinning API. Clone-friendly.
#[derive(Debug, Clone)]
pub struct ContentStoreClient {
    http: Option<reqwest::Client>,
    api_url: Url,
    gateway_url: Url,
    budget: Duration,
}

impl ContentStoreClient {
    /// Build a client. Without a token the client is disabled and every
    /// upload returns [`ContentStoreError::Disabled`].
    pub fn new(config: ContentStoreConfig) -> Result<Self, ContentStoreError> {
        let budget = Duration::from_secs(config.timeout_secs.max(1));
        let http = match &config.api_token {
            None => {
                tracing::warn!("CONTENT_STORE_TOKEN not set; content uploads are disabled");
                None
            }
            Some(token) => {
                let mut headers = reqwest::header::HeaderMap::new();
                let mut value =
                    reqwest::header::HeaderValue::from_str(&format!("Bearer {}", token.as_str()))
                        .map_err(|_| ConfigError::InvalidToken)?;
                value.set_sensitive(true);
                headers.insert(reqwest::header::AUTHORIZATION, value);
                let http = reqwest::Client::builder()
                    .timeout(budget)
                    .default_headers(headers)
                    .build()
                    .map_err(|e| ContentStoreError::Http {
                        endpoint: "client_init".into(),
                        source: e,
                    })?;
                Some(http)
            }
        };
        Ok(Self {
            http,
            api_url: config.api_url,
            gateway_url: config.gateway_url,
            budget,
        })
    }

    /// Whether uploads are configured.
    pub fn is_enabled(&self) -> bool {
        self.http.is_some()
    }

    /// Public retrieval URL for a content identifier.
    pub fn gateway_url(&self, cid: &str) -> String {
        format!("{}/{cid}", self.gateway_url.as_str().trim_end_matches('/'))
    }

    async fn pin_json_inner(
        &self,
        http: &reqwest::Client,
        name: &str,
        payload: &serde_json::Value,
    ) -> Result<String, ContentStoreError> {
        let endpoint = "POST /pinning/pinJSONToIPFS";
        let url = format!(
            "{}/pinning/pinJSONToIPFS",
            self.api_url.as_str().trim_end_matches('/')
        );
        let body = PinJsonRequest {
            pinata_content: payload,
            pinata_metadata: PinMetadata { name },
        };

        let resp = crate::retry::retry_send(|| http.post(&url).json(&body).send())
            .await
            .map_err(|e| ContentStoreError::Http {
                endpoint: endpoint.into(),
                source: e,
            })?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            return Err(ContentStoreError::Api {
                endpoint: endpoint.into(),
                status,
                body,
            });
        }

        let pinned: PinResponse =
            resp.json()
                .await
                .map_err(|e| ContentStoreError::Deserialization {
                    endpoint: endpoint.into(),
                    source: e,
                })?;
        tracing::info!(
            cid = %pinned.ipfs_hash,
            name,
            url = %self.gateway_url(&pinned.ipfs_hash),
            "pinned JSON document"
        );
        Ok(pinned.ipfs_hash)
    }
}

impl ContentStore for ContentStoreClient {
    async fn pin_json(
        &self,
        name: &str,
        payload: &serde_json::Value,
    ) -> Result<String, ContentStoreError> {
        let http = self.http.as_ref().ok_or(ContentStoreError::Disabled)?;
        match tokio::time::timeout(self.budget, self.pin_json_inner(http, name, payload)).await {
            Ok(result) => result,
            Err(_) => Err(ContentStoreError::Timeout {
                endpoint: "POST /pinning/pinJSONToIPFS".into(),
                secs: self.budget.as_secs(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gateway_url_joins_cleanly() {
        let cfg = ContentStoreConfig::local_mock("http://127.0.0.1:9100", "t").unwrap();
        let client = ContentStoreClient::new(cfg).unwrap();
        assert_eq!(client.gateway_url("bafyabc"), "http://127.0.0.1:9100/ipfs/bafyabc");
    }

    #[test]
    fn request_body_uses_pinata_shape() {
        let payload = serde_json::json!({"site": "mangrove"});
        let body = PinJsonRequest {
            pinata_content: &payload,
            pinata_metadata: PinMetadata { name: "doc" },
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["pinataContent"]["site"], "mangrove");
        assert_eq!(json["pinataMetadata"]["name"], "doc");
    }

    #[tokio::test]
    async fn disabled_client_fails_fast() {
        let mut cfg = ContentStoreConfig::local_mock("http://127.0.0.1:9100", "t").unwrap();
        cfg.api_token = None;
        let client = ContentStoreClient::new(cfg).unwrap();
        assert!(!client.is_enabled());
        let err = client
            .pin_json("x", &serde_json::json!({}))
            .await
            .unwrap_err();
        assert!(matches!(err, ContentStoreError::Disabled));
    }
}
