use crate::record::{Observation, ObservationDraft, ObservationId};
use async_trait::async_trait;
use log::debug;
use reqwest::{Client, Response, StatusCode, Url};
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_BASE_URL: &str = "http://localhost:3001/api/observations";

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// Non-2xx answer. `reason` is what the server said, verbatim when it said anything.
    #[error("{reason}")]
    Rejected { status: StatusCode, reason: String },

    #[error("invalid observation endpoint '{0}'")]
    InvalidUrl(String),
}

/// The three calls the client makes against the observation API.
#[async_trait]
pub trait ObservationGateway: Send + Sync {
    async fn list(&self) -> Result<Vec<Observation>, GatewayError>;
    async fn create(&self, draft: &ObservationDraft) -> Result<Observation, GatewayError>;
    async fn delete_by_id(&self, id: &ObservationId) -> Result<(), GatewayError>;
}

#[derive(Deserialize)]
struct ErrorBody {
    error: String,
}

pub struct HttpGateway {
    client: Client,
    base_url: Url,
}

impl HttpGateway {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, GatewayError> {
        let base_url =
            Url::parse(base_url).map_err(|_| GatewayError::InvalidUrl(base_url.to_string()))?;
        if base_url.cannot_be_a_base() {
            return Err(GatewayError::InvalidUrl(base_url.to_string()));
        }

        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("birdwatch/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self { client, base_url })
    }

    fn item_url(&self, id: &ObservationId) -> Result<Url, GatewayError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| GatewayError::InvalidUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .push(id.as_str());
        Ok(url)
    }
}

/// Turn a non-2xx response into `Rejected`, keeping the server's own words where possible.
async fn check(response: Response) -> Result<Response, GatewayError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let reason = match serde_json::from_str::<ErrorBody>(&body) {
        Ok(parsed) => parsed.error,
        Err(_) if !body.trim().is_empty() => body.trim().to_string(),
        Err(_) => status
            .canonical_reason()
            .unwrap_or("request rejected")
            .to_string(),
    };

    Err(GatewayError::Rejected { status, reason })
}

#[async_trait]
impl ObservationGateway for HttpGateway {
    async fn list(&self) -> Result<Vec<Observation>, GatewayError> {
        debug!("GET {}", self.base_url);
        let response = self.client.get(self.base_url.clone()).send().await?;
        let observations = check(response).await?.json().await?;
        Ok(observations)
    }

    async fn create(&self, draft: &ObservationDraft) -> Result<Observation, GatewayError> {
        debug!("POST {} ({})", self.base_url, draft.name);
        let response = self
            .client
            .post(self.base_url.clone())
            .json(draft)
            .send()
            .await?;
        let created = check(response).await?.json().await?;
        Ok(created)
    }

    async fn delete_by_id(&self, id: &ObservationId) -> Result<(), GatewayError> {
        let url = self.item_url(id)?;
        debug!("DELETE {}", url);
        let response = self.client.delete(url).send().await?;
        check(response).await?;
        Ok(())
    }
}
