use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::error::ApiError;
use crate::types::{
    ErrorBody, FilterSummary, IdAvailability, LoginRequest, LoginResponse, MilestoneDraft,
    MilestoneListResponse, MilestoneOverview, RegisterRequest,
};

/// The remote seam. Everything above this trait holds an `Arc<dyn TrackerApi>`
/// so coordinators and tests can swap in their own implementations.
#[async_trait]
pub trait TrackerApi: Send + Sync {
    async fn check_id_available(&self, user_id: &str) -> Result<bool, ApiError>;
    async fn register(&self, request: RegisterRequest) -> Result<(), ApiError>;
    async fn login(&self, request: LoginRequest) -> Result<LoginResponse, ApiError>;
    async fn fetch_milestones(&self) -> Result<Vec<MilestoneOverview>, ApiError>;
    async fn fetch_filters(&self) -> Result<FilterSummary, ApiError>;
    async fn create_milestone(&self, draft: MilestoneDraft) -> Result<(), ApiError>;
    async fn update_milestone(&self, milestone_id: u64, draft: MilestoneDraft)
    -> Result<(), ApiError>;
}

pub struct HttpTrackerApi {
    client: Client,
    base_url: String,
}

impl HttpTrackerApi {
    pub fn new(base_url: impl Into<String>) -> Result<Self, ApiError> {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        let client = Client::builder().timeout(Duration::from_secs(10)).build()?;
        Ok(Self { client, base_url })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

/// Turn a non-2xx response into `ApiError::Status`, salvaging the server's
/// message body when there is one.
async fn check_status(response: Response) -> Result<Response, ApiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let message = response
        .bytes()
        .await
        .ok()
        .and_then(|body| serde_json::from_slice::<ErrorBody>(&body).ok())
        .map(|body| body.message)
        .unwrap_or_default();
    Err(ApiError::Status {
        status: status.as_u16(),
        message,
    })
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
    let response = check_status(response).await?;
    let body = response.bytes().await?;
    Ok(serde_json::from_slice(&body)?)
}

#[async_trait]
impl TrackerApi for HttpTrackerApi {
    async fn check_id_available(&self, user_id: &str) -> Result<bool, ApiError> {
        debug!(user_id, "probing id availability");
        let response = self
            .client
            .get(self.url(&format!("/api/users/{user_id}/exists")))
            .send()
            .await?;
        let probe: IdAvailability = decode(response).await?;
        Ok(probe.available())
    }

    async fn register(&self, request: RegisterRequest) -> Result<(), ApiError> {
        debug!(user_id = %request.user_id, "registering account");
        let response = self
            .client
            .post(self.url("/api/users"))
            .json(&request)
            .send()
            .await?;
        check_status(response).await?;
        Ok(())
    }

    async fn login(&self, request: LoginRequest) -> Result<LoginResponse, ApiError> {
        debug!(user_id = %request.user_id, "logging in");
        let response = self
            .client
            .post(self.url("/api/login"))
            .json(&request)
            .send()
            .await?;
        decode(response).await
    }

    async fn fetch_milestones(&self) -> Result<Vec<MilestoneOverview>, ApiError> {
        let response = self.client.get(self.url("/api/milestones")).send().await?;
        let list: MilestoneListResponse = decode(response).await?;
        Ok(list.milestones)
    }

    async fn fetch_filters(&self) -> Result<FilterSummary, ApiError> {
        let response = self.client.get(self.url("/api/filters")).send().await?;
        decode(response).await
    }

    async fn create_milestone(&self, draft: MilestoneDraft) -> Result<(), ApiError> {
        debug!(title = %draft.title, "creating milestone");
        let response = self
            .client
            .post(self.url("/api/milestones"))
            .json(&draft)
            .send()
            .await?;
        check_status(response).await?;
        Ok(())
    }

    async fn update_milestone(
        &self,
        milestone_id: u64,
        draft: MilestoneDraft,
    ) -> Result<(), ApiError> {
        debug!(milestone_id, title = %draft.title, "updating milestone");
        let response = self
            .client
            .put(self.url(&format!("/api/milestones/{milestone_id}")))
            .json(&draft)
            .send()
            .await?;
        check_status(response).await?;
        Ok(())
    }
}
