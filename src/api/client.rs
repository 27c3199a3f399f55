//! Tutor API client.
//!
//! Wraps an [`HttpClient`] with the base URL and credentials. Streaming
//! endpoints hand back the unread response; everything else is decoded
//! into [`crate::models`] types.

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, info, warn};

use super::credentials::Credentials;
use crate::config::TutorConfig;
use crate::error::NetworkError;
use crate::models::{
    Badge, BadgesResponse, ContinueCaseRequest, LeaderboardQuery, ProgressData,
    SavePerformanceRequest, SchoolLeaderboardResponse, StartCaseRequest, UserLeaderboardResponse, UserMetadata,
    WardCatalog, WeeklyDashboardStats,
};
use crate::traits::{Headers, HttpClient, Response, StreamResponse};

/// Response header carrying the case thread id on `start_case`.
pub const THREAD_ID_HEADER: &str = "X-Thread-Id";

pub struct TutorApi<C: HttpClient> {
    http: C,
    config: TutorConfig,
    credentials: Credentials,
}

impl<C: HttpClient> TutorApi<C> {
    pub fn new(http: C, config: TutorConfig, credentials: Credentials) -> Self {
        Self {
            http,
            config,
            credentials,
        }
    }

    pub fn config(&self) -> &TutorConfig {
        &self.config
    }

    pub fn http(&self) -> &C {
        &self.http
    }

    /// Swap in renewed tokens.
    pub fn set_credentials(&mut self, credentials: Credentials) {
        self.credentials = credentials;
    }

    /// `POST /start_case`. The thread id is in the [`THREAD_ID_HEADER`]
    /// response header.
    pub async fn start_case(
        &self,
        request: &StartCaseRequest,
    ) -> Result<StreamResponse, NetworkError> {
        info!(condition = %request.condition, focus = ?request.case_focus, "Starting case");
        self.post_stream("start_case", request).await
    }

    /// `POST /continue_case`.
    pub async fn continue_case(
        &self,
        request: &ContinueCaseRequest,
    ) -> Result<StreamResponse, NetworkError> {
        debug!(thread_id = %request.thread_id, "Continuing case");
        self.post_stream("continue_case", request).await
    }

    /// `POST /save_performance`. The reply body is not used.
    pub async fn save_performance(
        &self,
        request: &SavePerformanceRequest,
    ) -> Result<(), NetworkError> {
        let url = self.config.endpoint("save_performance");
        let body = encode(request)?;
        let response = self
            .http
            .post(&url, &body, &self.json_headers())
            .await
            .map_err(|e| NetworkError::from_http_error(e, &url))?;

        if !response.is_success() {
            return Err(status_error(&url, &response));
        }
        info!(thread_id = %request.thread_id, result = request.result, "Saved performance");
        Ok(())
    }

    pub async fn wards(&self) -> Result<WardCatalog, NetworkError> {
        self.get_json("wards").await
    }

    pub async fn progress(&self) -> Result<ProgressData, NetworkError> {
        self.get_json("progress").await
    }

    pub async fn weekly_stats(&self) -> Result<WeeklyDashboardStats, NetworkError> {
        self.get_json("weekly_dashboard_stats").await
    }

    pub async fn badges(&self) -> Result<Vec<Badge>, NetworkError> {
        let response: BadgesResponse = self.get_json("badges").await?;
        Ok(response.badges)
    }

    /// The learner's profile, or `None` if they have not onboarded yet.
    pub async fn user_metadata(&self) -> Result<Option<UserMetadata>, NetworkError> {
        let url = self.config.endpoint("user_metadata/me");
        let response = self.get(&url).await?;
        if response.status == 404 {
            debug!("User has no metadata yet");
            return Ok(None);
        }
        decode(&url, response).map(Some)
    }

    pub async fn user_leaderboard(
        &self,
        query: &LeaderboardQuery,
    ) -> Result<UserLeaderboardResponse, NetworkError> {
        self.get_json(&with_query("leaderboard/users", query)).await
    }

    pub async fn school_leaderboard(
        &self,
        query: &LeaderboardQuery,
    ) -> Result<SchoolLeaderboardResponse, NetworkError> {
        self.get_json(&with_query("leaderboard/schools", query)).await
    }

    fn json_headers(&self) -> Headers {
        let mut headers = self.credentials.auth_headers();
        headers.insert("Content-Type".to_string(), "application/json".to_string());
        headers
    }

    async fn get(&self, url: &str) -> Result<Response, NetworkError> {
        self.http
            .get(url, &self.credentials.auth_headers())
            .await
            .map_err(|e| NetworkError::from_http_error(e, url))
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, NetworkError> {
        let url = self.config.endpoint(path);
        let response = self.get(&url).await?;
        decode(&url, response)
    }

    async fn post_stream<B: Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<StreamResponse, NetworkError> {
        let url = self.config.endpoint(path);
        let body = encode(body)?;

        let response = self
            .http
            .post_stream(&url, &body, &self.json_headers())
            .await
            .map_err(|e| {
                warn!(url = %url, error = %e, "Stream request failed");
                NetworkError::from_http_error(e, &url)
            })?;

        debug!(url = %url, status = response.status, "Stream opened");
        Ok(response)
    }
}

fn with_query(path: &str, query: &LeaderboardQuery) -> String {
    let query = query.to_query_string();
    if query.is_empty() {
        path.to_string()
    } else {
        format!("{}?{}", path, query)
    }
}

fn encode<B: Serialize>(body: &B) -> Result<String, NetworkError> {
    serde_json::to_string(body).map_err(|e| NetworkError::Other {
        message: format!("could not encode request body: {}", e),
    })
}

fn status_error(url: &str, response: &Response) -> NetworkError {
    let message = response
        .text()
        .unwrap_or_else(|_| "Unknown error".to_string());
    warn!(url = %url, status = response.status, "Request failed");
    NetworkError::HttpStatus {
        status: response.status,
        message,
    }
}

fn decode<T: DeserializeOwned>(url: &str, response: Response) -> Result<T, NetworkError> {
    if !response.is_success() {
        return Err(status_error(url, &response));
    }

    response.json().map_err(|e| NetworkError::InvalidResponse {
        message: format!("{}: {}", url, e),
    })
}
