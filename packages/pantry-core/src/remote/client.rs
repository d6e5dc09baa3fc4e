//! HTTP client for a PostgREST-style backend.

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use serde_json::json;

use super::query;
use crate::config::RemoteConfig;
use crate::error::{Error, Result, PG_UNIQUE_VIOLATION};
use crate::friends::{
    EdgeRow, ExpandedFriend, FriendshipEdge, FriendshipStore, EXPANDED_FRIENDS_RPC,
};
use crate::identity::validate_identity;

/// PostgREST error body
#[derive(Debug, Deserialize)]
struct PostgrestError {
    code: Option<String>,
    message: Option<String>,
    details: Option<String>,
    hint: Option<String>,
}

/// [`FriendshipStore`] over the hosted REST API.
///
/// One `reqwest::Client` is shared by every call.
pub struct RestStore {
    client: Client,
    config: RemoteConfig,
}

impl RestStore {
    /// Build a store from validated settings
    pub fn new(config: RemoteConfig) -> Result<Self> {
        config.validate()?;
        let client = Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| Error::InvalidConfig(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self { client, config })
    }

    /// Settings in use
    pub fn config(&self) -> &RemoteConfig {
        &self.config
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.config.rest_url(), path)
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .header("apikey", &self.config.api_key)
            .header("Authorization", format!("Bearer {}", self.config.bearer()))
            .header("Accept", "application/json")
    }

    async fn get_edges(&self, params: Vec<(String, String)>) -> Result<Vec<EdgeRow>> {
        let response = self
            .authorize(self.client.get(self.url("friendships")))
            .query(&params)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(error_from(response).await);
        }
        Ok(response.json().await?)
    }

    async fn accepted_edges_with_any(&self, column: &str, ids: &[String]) -> Result<Vec<EdgeRow>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        for id in ids {
            validate_identity(id)?;
        }
        self.get_edges(query::accepted_edges_with_any(column, ids)).await
    }
}

#[async_trait]
impl FriendshipStore for RestStore {
    async fn get_user_friends_expanded(&self, subject: &str) -> Result<Vec<ExpandedFriend>> {
        validate_identity(subject)?;

        let response = self
            .authorize(self.client.post(self.url(&format!("rpc/{}", EXPANDED_FRIENDS_RPC))))
            .json(&json!({ "user_id": subject }))
            .send()
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(Error::RpcUnavailable(format!(
                "{} is not deployed",
                EXPANDED_FRIENDS_RPC
            )));
        }
        if !response.status().is_success() {
            return Err(error_from(response).await);
        }
        Ok(response.json().await?)
    }

    async fn accepted_edges_for(&self, subject: &str) -> Result<Vec<EdgeRow>> {
        validate_identity(subject)?;
        self.get_edges(query::accepted_edges_for(subject)).await
    }

    async fn accepted_edges_by_requester(&self, ids: &[String]) -> Result<Vec<EdgeRow>> {
        self.accepted_edges_with_any("requester_id", ids).await
    }

    async fn accepted_edges_by_addressee(&self, ids: &[String]) -> Result<Vec<EdgeRow>> {
        self.accepted_edges_with_any("addressee_id", ids).await
    }

    async fn insert_friend_request(&self, requester: &str, addressee: &str) -> Result<FriendshipEdge> {
        validate_identity(requester)?;
        validate_identity(addressee)?;

        let response = self
            .authorize(self.client.post(self.url("friendships")))
            .header("Prefer", "return=representation")
            .json(&json!({
                "requester_id": requester,
                "addressee_id": addressee,
            }))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(error_from(response).await);
        }

        let mut inserted: Vec<FriendshipEdge> = response.json().await?;
        if inserted.is_empty() {
            return Err(Error::DeserializationError(
                "insert returned no representation".into(),
            ));
        }
        Ok(inserted.swap_remove(0))
    }
}

/// Turn a non-success response into an [`Error`].
///
/// SQLSTATE `23505` becomes [`Error::RequestPending`].
async fn error_from(response: Response) -> Error {
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();

    let Ok(parsed) = serde_json::from_str::<PostgrestError>(&body) else {
        return Error::RemoteError {
            status,
            code: None,
            message: body,
        };
    };

    if parsed.code.as_deref() == Some(PG_UNIQUE_VIOLATION) {
        return Error::RequestPending;
    }

    tracing::debug!(
        status,
        code = ?parsed.code,
        details = ?parsed.details,
        hint = ?parsed.hint,
        "Backend returned an error"
    );
    Error::RemoteError {
        status,
        code: parsed.code,
        message: parsed.message.unwrap_or(body),
    }
}

// ============================================================================
// TESTS
// ============================================================================
