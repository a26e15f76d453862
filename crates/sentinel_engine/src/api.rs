use std::time::Duration;

use reqwest::Url;
use serde::de::DeserializeOwned;
use serde::Serialize;
use sentinel_logging::{sentinel_info, sentinel_warn};

use crate::{
    AnalyzeRequest, AnalyzeResponse, ApiError, FailureKind, FixProjectResponse, SaveResponse,
    ScanResponse,
};

pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";

#[derive(Debug, Clone)]
pub struct ApiSettings {
    pub base_url: String,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(60),
        }
    }
}

/// The external agent service. Everything it does is opaque to this crate.
#[async_trait::async_trait]
pub trait AgentApi: Send + Sync {
    async fn scan_project(&self, path: &str) -> Result<ScanResponse, ApiError>;

    async fn fix_project(
        &self,
        folder_path: &str,
        instruction: &str,
    ) -> Result<FixProjectResponse, ApiError>;

    async fn analyze(&self, request: &AnalyzeRequest) -> Result<AnalyzeResponse, ApiError>;

    async fn save_file(&self, path: &str, content: &str) -> Result<SaveResponse, ApiError>;
}

#[derive(Serialize)]
struct ScanRequest<'a> {
    path: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct FixProjectRequest<'a> {
    folder_path: &'a str,
    instruction: &'a str,
}

#[derive(Serialize)]
struct SaveFileRequest<'a> {
    path: &'a str,
    content: &'a str,
}

#[derive(Debug, Clone)]
pub struct ReqwestAgentApi {
    base: Url,
    client: reqwest::Client,
}

impl ReqwestAgentApi {
    pub fn new(settings: ApiSettings) -> Result<Self, ApiError> {
        let mut base_url = settings.base_url.trim().to_string();
        // Endpoints are joined relative to the base, so keep any path prefix.
        if !base_url.ends_with('/') {
            base_url.push('/');
        }
        let base = Url::parse(&base_url)
            .map_err(|err| ApiError::new(FailureKind::InvalidUrl, err.to_string()))?;

        let client = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.request_timeout)
            .build()
            .map_err(|err| ApiError::new(FailureKind::Network, err.to_string()))?;

        Ok(Self { base, client })
    }

    pub fn base_url(&self) -> &str {
        self.base.as_str()
    }

    async fn post<B, R>(&self, endpoint: &str, body: &B) -> Result<R, ApiError>
    where
        B: Serialize + Sync + ?Sized,
        R: DeserializeOwned,
    {
        let url = self
            .base
            .join(endpoint)
            .map_err(|err| ApiError::new(FailureKind::InvalidUrl, err.to_string()))?;
        sentinel_info!("POST {}", url);

        let response = self
            .client
            .post(url.clone())
            .json(body)
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            sentinel_warn!("POST {} failed with {}: {}", url, status, detail);
            return Err(ApiError::new(
                FailureKind::HttpStatus(status.as_u16()),
                if detail.is_empty() {
                    status.to_string()
                } else {
                    detail
                },
            ));
        }

        response.json::<R>().await.map_err(map_reqwest_error)
    }
}

#[async_trait::async_trait]
impl AgentApi for ReqwestAgentApi {
    async fn scan_project(&self, path: &str) -> Result<ScanResponse, ApiError> {
        self.post("api/project/scan", &ScanRequest { path }).await
    }

    async fn fix_project(
        &self,
        folder_path: &str,
        instruction: &str,
    ) -> Result<FixProjectResponse, ApiError> {
        self.post(
            "api/fix-project",
            &FixProjectRequest {
                folder_path,
                instruction,
            },
        )
        .await
    }

    async fn analyze(&self, request: &AnalyzeRequest) -> Result<AnalyzeResponse, ApiError> {
        self.post("api/analyze", request).await
    }

    async fn save_file(&self, path: &str, content: &str) -> Result<SaveResponse, ApiError> {
        self.post("api/save-file", &SaveFileRequest { path, content })
            .await
    }
}

fn map_reqwest_error(err: reqwest::Error) -> ApiError {
    if err.is_timeout() {
        return ApiError::new(FailureKind::Timeout, err.to_string());
    }
    if err.is_decode() {
        return ApiError::new(FailureKind::Decode, err.to_string());
    }
    ApiError::new(FailureKind::Network, err.to_string())
}
