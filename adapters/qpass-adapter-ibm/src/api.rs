//! IBM Quantum Platform API client.
//!
//! This module implements the parts of the IBM Quantum REST API qpass needs:
//! - Authentication via IAM token exchange (API key plus service CRN) or a
//!   direct bearer token
//! - Listing backends and picking the least busy one
//! - Submitting Sampler V2 jobs
//! - Polling job status and retrieving results
//!
//! Supports both the IBM Cloud API (`quantum.cloud.ibm.com/api`) and the
//! legacy endpoint (`api.quantum-computing.ibm.com`).

use reqwest::{Client, Response, header};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::time::Duration;
use tracing::{debug, instrument, warn};

use crate::error::{IbmError, IbmResult};

/// Default IBM Quantum Cloud API endpoint.
pub const DEFAULT_ENDPOINT: &str = "https://quantum.cloud.ibm.com/api";

/// Legacy IBM Quantum API endpoint.
pub const LEGACY_ENDPOINT: &str = "https://api.quantum-computing.ibm.com";

/// IBM Cloud IAM token endpoint.
pub const IAM_TOKEN_URL: &str = "https://iam.cloud.ibm.com/identity/token";

/// IBM Cloud Global Search endpoint, used to find the service instance.
pub const RESOURCE_SEARCH_URL: &str =
    "https://api.global-search-tagging.cloud.ibm.com/v3/resources/search";

/// Search query matching IBM Quantum service instances.
const QUANTUM_SERVICE_QUERY: &str = "service_name:quantum-computing";

/// IBM API version header value.
const IBM_API_VERSION: &str = "2026-02-01";

/// User-Agent sent with requests (Cloudflare blocks the default reqwest UA).
const USER_AGENT: &str = concat!("qpass/", env!("CARGO_PKG_VERSION"));

const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Credentials for IBM Quantum.
///
/// The token is an IBM Cloud API key, exchanged through IAM for a bearer
/// token on the Cloud API. Without an `instance` the account's first
/// Quantum service instance is used. In direct-token mode the token is sent
/// as is to the legacy endpoint.
#[derive(Clone)]
pub struct IbmCredentials {
    /// API key, or bearer token in direct-token mode.
    pub token: String,
    /// IBM Cloud service CRN.
    pub instance: Option<String>,
    /// API base URL override.
    pub endpoint: Option<String>,
    /// Send the token directly instead of exchanging it through IAM.
    pub direct: bool,
    /// IAM token URL override.
    pub iam_url: Option<String>,
    /// Resource search URL override.
    pub search_url: Option<String>,
}

impl IbmCredentials {
    /// Create credentials from an API key.
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            instance: None,
            endpoint: None,
            direct: false,
            iam_url: None,
            search_url: None,
        }
    }

    /// Set the service CRN instead of looking it up.
    #[must_use]
    pub fn with_instance(mut self, instance: impl Into<String>) -> Self {
        self.instance = Some(instance.into());
        self
    }

    /// Override the API base URL.
    #[must_use]
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    /// Use the token as a bearer token on the legacy API.
    #[must_use]
    pub fn with_direct_token(mut self) -> Self {
        self.direct = true;
        self
    }

    /// Override the IAM token URL.
    #[must_use]
    pub fn with_iam_url(mut self, url: impl Into<String>) -> Self {
        self.iam_url = Some(url.into());
        self
    }

    /// Override the resource search URL used to find the service instance.
    #[must_use]
    pub fn with_search_url(mut self, url: impl Into<String>) -> Self {
        self.search_url = Some(url.into());
        self
    }

    /// Whether these credentials use the IBM Cloud IAM flow.
    pub fn is_cloud(&self) -> bool {
        !self.direct
    }
}

impl fmt::Debug for IbmCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IbmCredentials")
            .field("token", &"[REDACTED]")
            .field("instance", &self.instance)
            .field("endpoint", &self.endpoint)
            .field("direct", &self.direct)
            .finish_non_exhaustive()
    }
}

/// IBM Quantum API client.
pub struct IbmClient {
    /// HTTP client with auth headers preset.
    client: Client,
    /// API endpoint URL.
    endpoint: String,
    /// Whether using the Cloud API (vs legacy).
    cloud_api: bool,
}

impl fmt::Debug for IbmClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IbmClient")
            .field("endpoint", &self.endpoint)
            .field("cloud_api", &self.cloud_api)
            .finish_non_exhaustive()
    }
}

/// IAM token response from `iam.cloud.ibm.com`.
#[derive(Debug, Deserialize)]
struct IamTokenResponse {
    access_token: String,
}

/// Global Search response.
#[derive(Debug, Deserialize)]
struct ResourceSearchResponse {
    #[serde(default)]
    items: Vec<ResourceItem>,
}

#[derive(Debug, Deserialize)]
struct ResourceItem {
    crn: String,
}

fn bearer_headers(token: &str) -> IbmResult<header::HeaderMap> {
    let mut headers = header::HeaderMap::new();
    headers.insert(
        header::AUTHORIZATION,
        header::HeaderValue::from_str(&format!("Bearer {token}"))
            .map_err(|_| IbmError::InvalidToken)?,
    );
    headers.insert(
        header::CONTENT_TYPE,
        header::HeaderValue::from_static("application/json"),
    );
    headers.insert(
        header::ACCEPT,
        header::HeaderValue::from_static("application/json"),
    );
    Ok(headers)
}

fn http_client(headers: header::HeaderMap) -> IbmResult<Client> {
    Ok(Client::builder()
        .user_agent(USER_AGENT)
        .default_headers(headers)
        .timeout(REQUEST_TIMEOUT)
        .connect_timeout(CONNECT_TIMEOUT)
        .build()?)
}

/// Turn a non-success response into an `ApiError`.
///
/// Uses the structured `{code, message}` body when present and the raw
/// body text otherwise.
async fn api_error(response: Response, context: &str) -> IbmError {
    let status = response.status();
    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "no body".to_string());

    match serde_json::from_str::<ApiErrorResponse>(&body) {
        Ok(parsed) if !parsed.message.is_empty() => IbmError::ApiError {
            code: parsed.code,
            message: format!("{context}: {}", parsed.message),
        },
        _ => IbmError::ApiError {
            code: Some(status.as_u16().to_string()),
            message: format!("{context} ({status}): {body}"),
        },
    }
}

/// Exchange an IBM Cloud API key for an IAM bearer token.
async fn exchange_api_key(iam_url: &str, api_key: &str) -> IbmResult<String> {
    if api_key.trim().is_empty() {
        return Err(IbmError::MissingToken);
    }

    let iam_client = Client::builder()
        .user_agent(USER_AGENT)
        .timeout(Duration::from_secs(30))
        .connect_timeout(CONNECT_TIMEOUT)
        .build()?;

    let iam_response = iam_client
        .post(iam_url)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .header(header::ACCEPT, "application/json")
        .body(format!(
            "grant_type=urn:ibm:params:oauth:grant-type:apikey&apikey={api_key}"
        ))
        .send()
        .await
        .map_err(|e| IbmError::IamTokenExchange(e.to_string()))?;

    if !iam_response.status().is_success() {
        let status = iam_response.status();
        let body = iam_response
            .text()
            .await
            .unwrap_or_else(|_| "no body".to_string());
        return Err(IbmError::IamTokenExchange(format!(
            "IAM returned {status}: {body}"
        )));
    }

    let iam_token: IamTokenResponse = iam_response
        .json()
        .await
        .map_err(|e| IbmError::IamTokenExchange(format!("failed to parse IAM response: {e}")))?;
    debug!("IAM token exchange succeeded");
    Ok(iam_token.access_token)
}

/// Find the CRN of the first IBM Quantum service instance on the account.
async fn resolve_instance(search_url: &str, access_token: &str) -> IbmResult<String> {
    let client = http_client(bearer_headers(access_token)?)?;
    let response = client
        .post(search_url)
        .json(&serde_json::json!({
            "query": QUANTUM_SERVICE_QUERY,
            "fields": ["crn", "name"],
        }))
        .send()
        .await?;

    if !response.status().is_success() {
        return Err(api_error(response, "service instance lookup failed").await);
    }

    let found: ResourceSearchResponse = response.json().await?;
    let crn = found
        .items
        .into_iter()
        .next()
        .map(|item| item.crn)
        .ok_or(IbmError::NoServiceInstance)?;
    debug!("using service instance {crn}");
    Ok(crn)
}

impl IbmClient {
    /// Create a client that sends `token` directly as a bearer token.
    pub fn new(endpoint: impl Into<String>, token: impl Into<String>) -> IbmResult<Self> {
        let token = token.into();
        if token.trim().is_empty() {
            return Err(IbmError::MissingToken);
        }

        Ok(Self {
            client: http_client(bearer_headers(&token)?)?,
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            cloud_api: false,
        })
    }

    /// Create a client for the IBM Cloud API using the API key flow.
    ///
    /// Exchanges the API key for an IAM bearer token and sets the
    /// Service-CRN header the Cloud API requires.
    pub async fn connect(api_key: &str, service_crn: &str) -> IbmResult<Self> {
        Self::connect_at(DEFAULT_ENDPOINT, IAM_TOKEN_URL, api_key, service_crn).await
    }

    /// [`connect`](Self::connect) against explicit API and IAM URLs.
    #[instrument(skip(api_key, service_crn))]
    pub async fn connect_at(
        endpoint: &str,
        iam_url: &str,
        api_key: &str,
        service_crn: &str,
    ) -> IbmResult<Self> {
        let access_token = exchange_api_key(iam_url, api_key).await?;
        Self::cloud(endpoint, &access_token, service_crn)
    }

    /// Client for the Cloud API with an IAM bearer token.
    fn cloud(endpoint: &str, access_token: &str, service_crn: &str) -> IbmResult<Self> {
        let mut headers = bearer_headers(access_token)?;
        headers.insert(
            header::HeaderName::from_static("service-crn"),
            header::HeaderValue::from_str(service_crn)
                .map_err(|_| IbmError::InvalidParameter("invalid Service-CRN value".into()))?,
        );
        headers.insert(
            header::HeaderName::from_static("ibm-api-version"),
            header::HeaderValue::from_static(IBM_API_VERSION),
        );

        Ok(Self {
            client: http_client(headers)?,
            endpoint: endpoint.trim_end_matches('/').to_string(),
            cloud_api: true,
        })
    }

    /// Build a client from credentials, choosing the auth flow they imply.
    ///
    /// API keys go through IAM. When no service CRN is given, the first
    /// Quantum service instance visible to the key is used.
    #[instrument(skip(credentials))]
    pub async fn from_credentials(credentials: &IbmCredentials) -> IbmResult<Self> {
        if credentials.direct {
            let endpoint = credentials.endpoint.as_deref().unwrap_or(LEGACY_ENDPOINT);
            return Self::new(endpoint, credentials.token.clone());
        }

        let endpoint = credentials.endpoint.as_deref().unwrap_or(DEFAULT_ENDPOINT);
        let iam_url = credentials.iam_url.as_deref().unwrap_or(IAM_TOKEN_URL);
        let access_token = exchange_api_key(iam_url, &credentials.token).await?;

        let service_crn = match &credentials.instance {
            Some(crn) => crn.clone(),
            None => {
                let search_url = credentials
                    .search_url
                    .as_deref()
                    .unwrap_or(RESOURCE_SEARCH_URL);
                resolve_instance(search_url, &access_token).await?
            }
        };

        Self::cloud(endpoint, &access_token, &service_crn)
    }

    /// Whether this client uses the Cloud API.
    pub fn is_cloud_api(&self) -> bool {
        self.cloud_api
    }

    /// The API base URL.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Get available backends.
    ///
    /// On the Cloud API this fetches the device list and then the
    /// configuration and status of each device. Devices whose details fail
    /// to load are skipped.
    pub async fn list_backends(&self) -> IbmResult<Vec<BackendInfo>> {
        let url = format!("{}/v1/backends", self.endpoint);
        let response = self.client.get(&url).send().await?;

        if !response.status().is_success() {
            return Err(api_error(response, "list backends failed").await);
        }

        if !self.cloud_api {
            let backends: LegacyBackendsResponse = response.json().await?;
            return Ok(backends.backends);
        }

        let devices: DevicesResponse = response.json().await?;
        let mut backends = Vec::with_capacity(devices.devices.len());
        for device in &devices.devices {
            match self.get_backend(&device.name).await {
                Ok(info) => backends.push(info),
                Err(e) => warn!("skipping backend {}: {e}", device.name),
            }
        }

        Ok(backends)
    }

    /// Get details for a specific backend.
    ///
    /// On the Cloud API, fetches `/configuration` and `/status` separately
    /// and merges them into a single `BackendInfo`.
    pub async fn get_backend(&self, name: &str) -> IbmResult<BackendInfo> {
        if self.cloud_api {
            self.get_backend_cloud(name).await
        } else {
            self.get_backend_legacy(name).await
        }
    }

    async fn get_backend_cloud(&self, name: &str) -> IbmResult<BackendInfo> {
        let config_url = format!("{}/v1/backends/{}/configuration", self.endpoint, name);
        let config_response = self.client.get(&config_url).send().await?;

        if !config_response.status().is_success() {
            if config_response.status() == reqwest::StatusCode::NOT_FOUND {
                return Err(IbmError::BackendUnavailable(name.to_string()));
            }
            return Err(api_error(
                config_response,
                &format!("backend configuration failed for {name}"),
            )
            .await);
        }

        let config: BackendConfigResponse = config_response.json().await?;

        let status_url = format!("{}/v1/backends/{}/status", self.endpoint, name);
        let status_response = self.client.get(&status_url).send().await?;

        let status = if status_response.status().is_success() {
            let s: BackendStatusResponse = status_response.json().await?;
            BackendStatus {
                operational: s.state,
                status_msg: Some(s.status),
                pending_jobs: Some(u32::try_from(s.length_queue).unwrap_or(u32::MAX)),
            }
        } else {
            // Configuration loaded, so the device exists.
            BackendStatus {
                operational: true,
                status_msg: None,
                pending_jobs: None,
            }
        };

        Ok(BackendInfo {
            name: config.backend_name,
            num_qubits: config.n_qubits,
            status,
            processor_type: config.processor_type,
            basis_gates: config.basis_gates,
            simulator: config.simulator.unwrap_or(false),
            max_shots: config.max_shots,
        })
    }

    async fn get_backend_legacy(&self, name: &str) -> IbmResult<BackendInfo> {
        let url = format!("{}/v1/backends/{}", self.endpoint, name);
        let response = self.client.get(&url).send().await?;

        if !response.status().is_success() {
            if response.status() == reqwest::StatusCode::NOT_FOUND {
                return Err(IbmError::BackendUnavailable(name.to_string()));
            }
            return Err(api_error(response, &format!("get backend {name} failed")).await);
        }

        response.json().await.map_err(IbmError::from)
    }

    /// Pick the operational hardware device with the fewest pending jobs.
    ///
    /// Devices with an unknown queue length rank last. Ties go to the
    /// device listed first.
    #[instrument(skip(self))]
    pub async fn least_busy(&self) -> IbmResult<BackendInfo> {
        let backends = self.list_backends().await?;
        let chosen = select_least_busy(backends).ok_or(IbmError::NoOperationalDevice)?;
        debug!(
            "least busy device: {} ({:?} pending)",
            chosen.name, chosen.status.pending_jobs
        );
        Ok(chosen)
    }

    /// Submit a job using the Sampler V2 primitive.
    ///
    /// Each circuit becomes one PUB `[circuit, {}, shots]`. Circuits must
    /// already be in the device's instruction set.
    #[instrument(skip(self, circuits))]
    pub async fn submit_sampler_job(
        &self,
        backend: &str,
        circuits: Vec<String>,
        shots: u32,
    ) -> IbmResult<SubmitResponse> {
        let url = format!("{}/v1/jobs", self.endpoint);

        let request = SamplerJobRequest {
            program_id: "sampler".to_string(),
            backend: backend.to_string(),
            params: SamplerParams {
                version: 2,
                pubs: circuits
                    .into_iter()
                    .map(|c| serde_json::json!([c, {}, shots]))
                    .collect(),
            },
        };

        let response = self.client.post(&url).json(&request).send().await?;

        if !response.status().is_success() {
            return Err(api_error(response, "job submission failed").await);
        }

        response.json().await.map_err(IbmError::from)
    }

    /// Get job status.
    pub async fn get_job_status(&self, job_id: &str) -> IbmResult<JobStatusResponse> {
        let url = format!("{}/v1/jobs/{}", self.endpoint, job_id);
        let response = self.client.get(&url).send().await?;

        if !response.status().is_success() {
            if response.status() == reqwest::StatusCode::NOT_FOUND {
                return Err(IbmError::JobNotFound(job_id.to_string()));
            }
            return Err(api_error(response, "job status failed").await);
        }

        response.json().await.map_err(IbmError::from)
    }

    /// Get job results.
    pub async fn get_job_results(&self, job_id: &str) -> IbmResult<JobResultResponse> {
        let url = format!("{}/v1/jobs/{}/results", self.endpoint, job_id);
        let response = self.client.get(&url).send().await?;

        if !response.status().is_success() {
            if response.status() == reqwest::StatusCode::NOT_FOUND {
                return Err(IbmError::JobNotFound(job_id.to_string()));
            }
            return Err(api_error(response, "job results failed").await);
        }

        response.json().await.map_err(IbmError::from)
    }

    /// Cancel a job.
    pub async fn cancel_job(&self, job_id: &str) -> IbmResult<()> {
        let url = format!("{}/v1/jobs/{}/cancel", self.endpoint, job_id);
        let response = self.client.post(&url).send().await?;

        if !response.status().is_success() {
            return Err(api_error(response, "job cancel failed").await);
        }

        Ok(())
    }
}

/// Least-busy selection over a device listing.
pub fn select_least_busy(backends: Vec<BackendInfo>) -> Option<BackendInfo> {
    backends
        .into_iter()
        .filter(|b| b.status.operational && !b.simulator)
        .min_by_key(|b| b.status.pending_jobs.unwrap_or(u32::MAX))
}

// ============================================================================
// Request types
// ============================================================================

/// Sampler job request.
#[derive(Debug, Serialize)]
struct SamplerJobRequest {
    /// Program ID.
    program_id: String,
    /// Backend name.
    backend: String,
    /// Sampler parameters.
    params: SamplerParams,
}

/// Sampler V2 parameters.
#[derive(Debug, Serialize)]
struct SamplerParams {
    /// Primitive version.
    version: u8,
    /// Primitive unified blocs: `[circuit, parameter values, shots]`.
    pubs: Vec<serde_json::Value>,
}

// ============================================================================
// Response types
// ============================================================================

/// API error response.
#[derive(Debug, Deserialize)]
struct ApiErrorResponse {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    message: String,
}

/// Cloud API device list (`{"devices": [...]}`).
#[derive(Debug, Deserialize)]
struct DevicesResponse {
    devices: Vec<DeviceEntry>,
}

#[derive(Debug, Deserialize)]
struct DeviceEntry {
    name: String,
}

/// Legacy API backend list (`{"backends": [...]}`).
#[derive(Debug, Deserialize)]
struct LegacyBackendsResponse {
    backends: Vec<BackendInfo>,
}

/// Cloud API `/backends/{name}/configuration`.
#[derive(Debug, Deserialize)]
struct BackendConfigResponse {
    backend_name: String,
    n_qubits: usize,
    #[serde(default)]
    basis_gates: Vec<String>,
    #[serde(default)]
    processor_type: Option<ProcessorType>,
    #[serde(default)]
    simulator: Option<bool>,
    #[serde(default)]
    max_shots: Option<u32>,
}

/// Cloud API `/backends/{name}/status`.
#[derive(Debug, Deserialize)]
struct BackendStatusResponse {
    state: bool,
    #[serde(default)]
    status: String,
    #[serde(default)]
    length_queue: u64,
}

/// Backend information.
#[derive(Debug, Clone, Deserialize)]
pub struct BackendInfo {
    /// Backend name.
    pub name: String,
    /// Number of qubits.
    pub num_qubits: usize,
    /// Backend status.
    pub status: BackendStatus,
    /// Processor type.
    #[serde(default)]
    pub processor_type: Option<ProcessorType>,
    /// Basis gates.
    #[serde(default)]
    pub basis_gates: Vec<String>,
    /// Whether this is a simulator.
    #[serde(default)]
    pub simulator: bool,
    /// Maximum number of shots.
    #[serde(default)]
    pub max_shots: Option<u32>,
}

/// Backend status.
#[derive(Debug, Clone, Deserialize)]
pub struct BackendStatus {
    /// Whether the backend is operational.
    pub operational: bool,
    /// Status message.
    #[serde(default)]
    pub status_msg: Option<String>,
    /// Number of pending jobs.
    #[serde(default)]
    pub pending_jobs: Option<u32>,
}

/// Processor type information.
#[derive(Debug, Clone, Deserialize)]
pub struct ProcessorType {
    /// Family (e.g., "Eagle", "Heron").
    pub family: String,
    /// Revision.
    #[serde(default)]
    pub revision: Option<String>,
}

/// Job submission response.
#[derive(Debug, Deserialize)]
pub struct SubmitResponse {
    /// Job ID.
    pub id: String,
    /// Job status.
    #[serde(default)]
    pub status: String,
}

/// Job status response.
#[derive(Debug, Clone, Deserialize)]
pub struct JobStatusResponse {
    /// Job ID.
    pub id: String,
    /// Job status (mixed case on the Cloud API).
    pub status: String,
    /// Backend name.
    #[serde(default)]
    pub backend: Option<String>,
    /// Error information if failed (legacy API).
    #[serde(default)]
    pub error: Option<JobError>,
    /// State object with reason (Cloud API).
    #[serde(default)]
    pub state: Option<JobState>,
}

/// Job error information (legacy API).
#[derive(Debug, Clone, Deserialize)]
pub struct JobError {
    /// Error code.
    #[serde(default)]
    pub code: Option<String>,
    /// Error message.
    pub message: String,
}

/// Job state with reason (Cloud API).
#[derive(Debug, Clone, Deserialize)]
pub struct JobState {
    /// Status string.
    #[serde(default)]
    pub status: String,
    /// Reason for failure.
    #[serde(default)]
    pub reason: Option<String>,
}

impl JobStatusResponse {
    fn normalized_status(&self) -> String {
        self.status.to_uppercase()
    }

    /// Check if job is in a terminal state.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self.normalized_status().as_str(),
            "COMPLETED" | "FAILED" | "CANCELLED" | "ERROR"
        )
    }

    /// Check if job completed successfully.
    pub fn is_completed(&self) -> bool {
        self.normalized_status() == "COMPLETED"
    }

    /// Check if job failed.
    pub fn is_failed(&self) -> bool {
        matches!(self.normalized_status().as_str(), "FAILED" | "ERROR")
    }

    /// Check if job was cancelled.
    pub fn is_cancelled(&self) -> bool {
        self.normalized_status() == "CANCELLED"
    }

    /// The failure reason, preferring the Cloud API `state.reason`.
    pub fn error_message(&self) -> Option<String> {
        self.state
            .as_ref()
            .and_then(|s| s.reason.clone())
            .or_else(|| self.error.as_ref().map(|e| e.message.clone()))
    }
}

/// Job result response.
#[derive(Debug, Deserialize)]
pub struct JobResultResponse {
    /// Job ID (absent on the V2 results endpoint).
    #[serde(default)]
    pub id: Option<String>,
    /// One result per PUB.
    pub results: Vec<SamplerResult>,
}

/// Sampler result for one circuit.
#[derive(Debug, Deserialize)]
pub struct SamplerResult {
    /// V2 data: classical register name to per-shot samples.
    #[serde(default)]
    pub data: Option<HashMap<String, ClassicalRegisterData>>,
    /// Pre-aggregated counts (V1 only).
    #[serde(default)]
    pub counts: Option<HashMap<String, u64>>,
    /// Metadata.
    #[serde(default)]
    pub metadata: Option<serde_json::Value>,
}

/// Classical register data from V2 Sampler results.
#[derive(Debug, Deserialize)]
pub struct ClassicalRegisterData {
    /// One hex string per shot, in shot order (e.g. `["0x0", "0x1"]`).
    pub samples: Vec<String>,
    /// Register width.
    #[serde(default)]
    pub num_bits: Option<usize>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn backend(name: &str, operational: bool, simulator: bool, pending: Option<u32>) -> BackendInfo {
        BackendInfo {
            name: name.into(),
            num_qubits: 127,
            status: BackendStatus {
                operational,
                status_msg: None,
                pending_jobs: pending,
            },
            processor_type: None,
            basis_gates: vec![],
            simulator,
            max_shots: None,
        }
    }

    #[test]
    fn test_job_status_terminal() {
        let status: JobStatusResponse =
            serde_json::from_str(r#"{"id": "test", "status": "COMPLETED"}"#).unwrap();
        assert!(status.is_terminal());
        assert!(status.is_completed());
        assert!(!status.is_failed());

        let failed: JobStatusResponse = serde_json::from_str(
            r#"{"id": "test", "status": "FAILED", "error": {"message": "Test error"}}"#,
        )
        .unwrap();
        assert!(failed.is_terminal());
        assert!(failed.is_failed());
        assert_eq!(failed.error_message().unwrap(), "Test error");
    }

    #[test]
    fn test_job_status_cloud_api_mixed_case() {
        let status: JobStatusResponse = serde_json::from_str(
            r#"{"id": "test", "status": "Failed",
                "state": {"status": "Failed", "reason": "circuit too deep"}}"#,
        )
        .unwrap();
        assert!(status.is_terminal());
        assert!(status.is_failed());
        assert_eq!(status.error_message().unwrap(), "circuit too deep");
    }

    #[test]
    fn test_sampler_request_serialization() {
        let request = SamplerJobRequest {
            program_id: "sampler".to_string(),
            backend: "ibm_torino".to_string(),
            params: SamplerParams {
                version: 2,
                pubs: vec![serde_json::json!(["OPENQASM 3.0;", {}, 128])],
            },
        };

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["program_id"], "sampler");
        assert_eq!(json["backend"], "ibm_torino");
        assert_eq!(json["params"]["version"], 2);
        assert_eq!(json["params"]["pubs"][0][2], 128);
    }

    #[test]
    fn test_devices_response_deserialization() {
        let json = r#"{"devices": [
            {"name": "ibm_fez", "status": {"name": "online"}},
            {"name": "ibm_torino", "status": {"name": "online"}}
        ]}"#;
        let resp: DevicesResponse = serde_json::from_str(json).unwrap();
        assert_eq!(resp.devices.len(), 2);
        assert_eq!(resp.devices[1].name, "ibm_torino");
    }

    #[test]
    fn test_backend_config_response_deserialization() {
        let json = r#"{
            "backend_name": "ibm_torino",
            "n_qubits": 133,
            "basis_gates": ["cz", "id", "rx", "rz", "rzz", "sx", "x"],
            "simulator": false
        }"#;
        let config: BackendConfigResponse = serde_json::from_str(json).unwrap();
        assert_eq!(config.backend_name, "ibm_torino");
        assert_eq!(config.n_qubits, 133);
        assert_eq!(config.basis_gates.len(), 7);
        assert_eq!(config.simulator, Some(false));
    }

    #[test]
    fn test_select_least_busy() {
        let chosen = select_least_busy(vec![
            backend("ibm_sim", true, true, Some(0)),
            backend("ibm_down", false, false, Some(0)),
            backend("ibm_brisbane", true, false, Some(40)),
            backend("ibm_kyiv", true, false, Some(3)),
            backend("ibm_unknown", true, false, None),
        ])
        .unwrap();
        assert_eq!(chosen.name, "ibm_kyiv");
    }

    #[test]
    fn test_select_least_busy_tie_takes_first() {
        let chosen = select_least_busy(vec![
            backend("ibm_a", true, false, Some(2)),
            backend("ibm_b", true, false, Some(2)),
        ])
        .unwrap();
        assert_eq!(chosen.name, "ibm_a");
    }

    #[test]
    fn test_select_least_busy_none_operational() {
        assert!(select_least_busy(vec![backend("ibm_down", false, false, Some(0))]).is_none());
        assert!(select_least_busy(vec![]).is_none());
    }

    #[test]
    fn test_credentials_redacted() {
        let creds = IbmCredentials::new("super-secret").with_instance("crn:v1:abc");
        let debug = format!("{creds:?}");
        assert!(!debug.contains("super-secret"));
        assert!(debug.contains("crn:v1:abc"));
        assert!(creds.is_cloud());
        assert!(IbmCredentials::new("t").is_cloud());
        assert!(!IbmCredentials::new("t").with_direct_token().is_cloud());
    }

    #[tokio::test]
    async fn test_blank_api_key_rejected_before_network() {
        let credentials = IbmCredentials::new("  ")
            .with_iam_url("http://127.0.0.1:9/identity/token")
            .with_search_url("http://127.0.0.1:9/v3/resources/search");
        let err = IbmClient::from_credentials(&credentials).await.unwrap_err();
        assert!(matches!(err, IbmError::MissingToken));
    }

    #[test]
    fn test_direct_client_is_not_cloud() {
        let client = IbmClient::new("https://example.com/", "test-token").unwrap();
        assert!(!client.is_cloud_api());
        assert_eq!(client.endpoint(), "https://example.com");
    }

    #[test]
    fn test_empty_token_rejected() {
        assert!(matches!(
            IbmClient::new(LEGACY_ENDPOINT, "  "),
            Err(IbmError::MissingToken)
        ));
    }
}
