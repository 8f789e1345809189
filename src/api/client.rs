//! REST API wrapper
//!
//! Thin reqwest-based client for the IFMeetup participation endpoints.
//! This crate consumes the wire protocol, it does not define it: the
//! server remains the source of truth for capacity and timing rules.
//! Failed responses are mapped into `ClientError::Api` at this boundary,
//! carrying the domain error code from the body when one is present.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use url::Url;

use crate::config::ApiConfig;
use crate::utils::errors::{ClientError, Result};

/// Wire representation of a participation status
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParticipationSnapshot {
    pub is_registered: bool,
    pub participants_count: i64,
    /// Server-derived registration availability; absent on older
    /// deployments, in which case we stay pessimistic
    #[serde(default)]
    pub can_register: bool,
}

/// Error body shape returned by the API on failures
#[derive(Debug, Clone, Deserialize)]
struct ApiErrorBody {
    error: ApiErrorDetail,
}

#[derive(Debug, Clone, Deserialize)]
struct ApiErrorDetail {
    code: Option<String>,
    message: Option<String>,
}

/// The participation operations this crate needs from the backend.
///
/// Reads are idempotent; `register` is not (a second call reports
/// `already_registered`). Trackers and fetchers hold this as a trait
/// object so tests can substitute a scripted transport.
#[async_trait]
pub trait ParticipationApi: Send + Sync {
    /// Fetch the caller's participation status for one event
    async fn participation_status(&self, event_id: i64, user_id: i64)
        -> Result<ParticipationSnapshot>;

    /// Register the authenticated user for an event
    async fn register(&self, event_id: i64) -> Result<ParticipationSnapshot>;

    /// Cancel the authenticated user's registration
    async fn cancel_registration(&self, event_id: i64) -> Result<()>;
}

/// HTTP implementation of `ParticipationApi`
#[derive(Debug, Clone)]
pub struct HttpApiClient {
    client: Client,
    base_url: Url,
}

impl HttpApiClient {
    /// Create a new client from API configuration
    pub fn new(config: &ApiConfig) -> Result<Self> {
        let mut base_url = Url::parse(&config.base_url)?;
        // Url::join drops the last path segment unless it ends in '/'
        if !base_url.path().ends_with('/') {
            base_url.set_path(&format!("{}/", base_url.path()));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .user_agent(concat!("ifmeetup-client/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(ClientError::Http)?;

        Ok(Self { client, base_url })
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        self.base_url.join(path).map_err(ClientError::from)
    }

    /// Turn a non-success response into `ClientError::Api`, pulling the
    /// domain code out of the error body when the server sent one
    async fn error_from_response(response: Response) -> ClientError {
        let status = response.status().as_u16();

        match response.json::<ApiErrorBody>().await {
            Ok(body) => ClientError::Api {
                status,
                code: body.error.code,
                message: body.error.message,
            },
            Err(_) => {
                // Not all failures carry a JSON body (proxies, 502s)
                warn!(status = status, "API error response without parseable body");
                ClientError::Api {
                    status,
                    code: None,
                    message: None,
                }
            }
        }
    }
}

#[async_trait]
impl ParticipationApi for HttpApiClient {
    async fn participation_status(
        &self,
        event_id: i64,
        user_id: i64,
    ) -> Result<ParticipationSnapshot> {
        let mut url = self.endpoint(&format!("events/{event_id}/participation"))?;
        url.query_pairs_mut()
            .append_pair("user_id", &user_id.to_string());

        debug!(event_id = event_id, user_id = user_id, "Fetching participation status");

        let response = self.client.get(url).send().await?;
        if response.status().is_success() {
            let snapshot = response.json::<ParticipationSnapshot>().await?;
            Ok(snapshot)
        } else {
            Err(Self::error_from_response(response).await)
        }
    }

    async fn register(&self, event_id: i64) -> Result<ParticipationSnapshot> {
        let url = self.endpoint(&format!("events/{event_id}/registrations"))?;

        debug!(event_id = event_id, "Registering for event");

        let response = self.client.post(url).send().await?;
        if response.status().is_success() {
            let snapshot = response.json::<ParticipationSnapshot>().await?;
            Ok(snapshot)
        } else {
            Err(Self::error_from_response(response).await)
        }
    }

    async fn cancel_registration(&self, event_id: i64) -> Result<()> {
        let url = self.endpoint(&format!("events/{event_id}/registrations/me"))?;

        debug!(event_id = event_id, "Cancelling registration");

        let response = self.client.delete(url).send().await?;
        match response.status() {
            status if status.is_success() || status == StatusCode::NO_CONTENT => Ok(()),
            _ => Err(Self::error_from_response(response).await),
        }
    }
}
