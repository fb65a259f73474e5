//! LeonardoClient - handles communication with the Leonardo.ai API.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::io::AsyncWriteExt;

/// The environment variable name for the Leonardo.ai API key.
pub const LEONARDO_API_KEY_ENV: &str = "LEONARDO_API_KEY";

/// Default base URL for the Leonardo.ai API.
pub const LEONARDO_API_BASE_URL: &str = "https://api.leonardo.ai";

/// Creation and status endpoint for text-to-image jobs.
pub const IMAGE_GENERATIONS_ENDPOINT: &str = "/v1/images/generations";

/// Creation and status endpoint for image-to-motion-video jobs.
pub const MOTION_GENERATIONS_ENDPOINT: &str = "/v1/videos/motion-generations";

/// Default model for image generation.
pub const DEFAULT_IMAGE_MODEL: &str = "leonardo-anime-xl";

/// Default timeout for individual HTTP requests (30 seconds).
const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Default connection timeout (10 seconds).
const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Validate a prompt before sending it to the API.
///
/// # Errors
/// Returns `LeonardoError::EmptyPrompt` if the prompt is empty or
/// whitespace-only.
pub fn validate_prompt(prompt: &str) -> Result<(), LeonardoError> {
    if prompt.trim().is_empty() {
        return Err(LeonardoError::EmptyPrompt);
    }
    Ok(())
}

/// Parameters for a text-to-image generation job.
///
/// Defaults mirror what the API documents for anime-style stills.
#[derive(Debug, Clone)]
pub struct ImageParams {
    /// Model identifier (default `leonardo-anime-xl`).
    pub model: String,
    /// Image width in pixels.
    pub width: u32,
    /// Image height in pixels.
    pub height: u32,
    /// Number of inference steps.
    pub steps: u32,
    /// Classifier-free guidance scale.
    pub cfg_scale: f64,
}

impl Default for ImageParams {
    fn default() -> Self {
        Self {
            model: DEFAULT_IMAGE_MODEL.to_string(),
            width: 1024,
            height: 1024,
            steps: 30,
            cfg_scale: 7.5,
        }
    }
}

/// Parameters for an image-to-motion-video generation job.
#[derive(Debug, Clone)]
pub struct MotionParams {
    /// Camera motion direction (e.g. `zoom_in`, `pan_left`).
    pub direction: String,
    /// Clip duration in seconds.
    pub duration_seconds: u32,
    /// Motion strength (0.0-1.0).
    pub strength: f64,
    /// Motion smoothness (0.0-1.0).
    pub smoothness: f64,
}

impl Default for MotionParams {
    fn default() -> Self {
        Self {
            direction: "zoom_in".to_string(),
            duration_seconds: 30,
            strength: 0.6,
            smoothness: 0.6,
        }
    }
}

/// Polling configuration for `wait_for_completion`.
#[derive(Debug, Clone)]
pub struct PollConfig {
    /// Fixed delay between status queries (default 5 seconds).
    pub interval: Duration,
    /// Total polling budget before giving up (default 300 seconds).
    pub timeout: Duration,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(5),
            timeout: Duration::from_secs(300),
        }
    }
}

/// Request body for image generation.
#[derive(Debug, Serialize)]
struct ImageGenerationRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    width: u32,
    height: u32,
    num_inference_steps: u32,
    cfg_scale: f64,
    samples: u32,
}

/// Request body for motion video generation.
#[derive(Debug, Serialize)]
struct MotionGenerationRequest<'a> {
    image_url: &'a str,
    motion_type: &'a str,
    duration_seconds: u32,
    strength: f64,
    smoothness: f64,
}

/// Response from a job creation endpoint.
#[derive(Debug, Deserialize)]
struct CreateJobResponse {
    #[serde(default)]
    id: Option<String>,
}

/// A single asset record inside a job's `result` list.
#[derive(Debug, Clone, Deserialize)]
pub struct JobResult {
    /// Download URL for the produced asset.
    #[serde(default)]
    pub url: Option<String>,
}

/// Response from a job status endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct JobResponse {
    /// Job identifier (echoed back by some endpoints).
    #[serde(default)]
    pub id: Option<String>,
    /// Raw status string reported by the service.
    #[serde(default)]
    pub status: String,
    /// Produced assets, present once the job has succeeded.
    #[serde(default)]
    pub result: Option<Vec<JobResult>>,
}

impl JobResponse {
    /// Map the raw status string onto the three-state job lifecycle.
    ///
    /// Anything that is not an explicit terminal status counts as pending,
    /// so the poller keeps waiting on statuses it does not recognize.
    pub fn job_status(&self) -> JobStatus {
        match self.status.as_str() {
            "succeeded" => JobStatus::Succeeded,
            "failed" => JobStatus::Failed,
            _ => JobStatus::Pending,
        }
    }

    /// URL of the first result asset, if any.
    ///
    /// An absent `result` key and an empty result list are treated the same:
    /// no URL.
    pub fn first_result_url(&self) -> Option<&str> {
        self.result
            .as_deref()
            .unwrap_or_default()
            .first()
            .and_then(|asset| asset.url.as_deref())
    }
}

/// Lifecycle state of a remote generation job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobStatus {
    /// Queued or still generating.
    Pending,
    /// Terminal success; result URLs are valid.
    Succeeded,
    /// Terminal failure.
    Failed,
}

/// Client for communicating with the Leonardo.ai API.
pub struct LeonardoClient {
    api_key: String,
    base_url: String,
    http_client: reqwest::Client,
}

impl LeonardoClient {
    /// Create a new client by reading the API key from the environment.
    ///
    /// # Errors
    /// Returns `LeonardoError::MissingApiKey` if `LEONARDO_API_KEY` is not
    /// set.
    pub fn new() -> Result<Self, LeonardoError> {
        let api_key =
            std::env::var(LEONARDO_API_KEY_ENV).map_err(|_| LeonardoError::MissingApiKey)?;
        Self::with_api_key(api_key)
    }

    /// Create a new client with an explicit API key.
    pub fn with_api_key(api_key: String) -> Result<Self, LeonardoError> {
        Self::with_base_url(api_key, LEONARDO_API_BASE_URL.to_string())
    }

    /// Create a new client with a custom base URL.
    ///
    /// Useful for testing against a mock server.
    pub fn with_base_url(api_key: String, base_url: String) -> Result<Self, LeonardoError> {
        if api_key.is_empty() {
            return Err(LeonardoError::MissingApiKey);
        }

        let http_client = reqwest::Client::builder()
            .timeout(DEFAULT_REQUEST_TIMEOUT)
            .connect_timeout(DEFAULT_CONNECT_TIMEOUT)
            .build()?;

        Ok(Self {
            api_key,
            base_url,
            http_client,
        })
    }

    /// Get the API key.
    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    /// Get the base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Submit a text-to-image generation job.
    ///
    /// Returns the job identifier to poll with `wait_for_completion`.
    ///
    /// # Errors
    /// Returns `LeonardoError::EmptyPrompt` for a blank prompt,
    /// `LeonardoError::Api` for a non-2xx response,
    /// `LeonardoError::MissingJobId` if the response carries no job id,
    /// or `LeonardoError::Http` if the request itself fails.
    pub async fn submit_image_generation(
        &self,
        prompt: &str,
        params: &ImageParams,
    ) -> Result<String, LeonardoError> {
        validate_prompt(prompt)?;

        let url = format!("{}{}", self.base_url, IMAGE_GENERATIONS_ENDPOINT);
        let request_body = ImageGenerationRequest {
            model: &params.model,
            prompt,
            width: params.width,
            height: params.height,
            num_inference_steps: params.steps,
            cfg_scale: params.cfg_scale,
            samples: 1,
        };

        log::debug!("Submitting image generation to {}", url);
        let response = self
            .http_client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&request_body)
            .send()
            .await?;

        let body: CreateJobResponse = Self::check_response(response).await?.json().await?;
        body.id
            .filter(|id| !id.is_empty())
            .ok_or(LeonardoError::MissingJobId)
    }

    /// Submit an image-to-motion-video generation job.
    ///
    /// Same contract shape as `submit_image_generation`, against the motion
    /// endpoint. `image_url` must point at a finished image asset.
    pub async fn submit_motion_generation(
        &self,
        image_url: &str,
        params: &MotionParams,
    ) -> Result<String, LeonardoError> {
        let url = format!("{}{}", self.base_url, MOTION_GENERATIONS_ENDPOINT);
        let request_body = MotionGenerationRequest {
            image_url,
            motion_type: &params.direction,
            duration_seconds: params.duration_seconds,
            strength: params.strength,
            smoothness: params.smoothness,
        };

        log::debug!("Submitting motion generation to {}", url);
        let response = self
            .http_client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&request_body)
            .send()
            .await?;

        let body: CreateJobResponse = Self::check_response(response).await?.json().await?;
        body.id
            .filter(|id| !id.is_empty())
            .ok_or(LeonardoError::MissingJobId)
    }

    /// Poll a job's status endpoint until it reaches a terminal state.
    ///
    /// Queries `{base_url}{endpoint}/{job_id}` at the fixed interval from
    /// `poll`. Returns the full status body once the job succeeds. A `failed`
    /// status terminates immediately regardless of remaining budget. If the
    /// accumulated wait reaches `poll.timeout` without a terminal state, the
    /// call fails with `LeonardoError::Timeout`.
    ///
    /// Elapsed time is accounted in poll intervals, not wall clock, matching
    /// the fixed-interval contract: interval 5s and timeout 300s allow at
    /// most 60 queries.
    pub async fn wait_for_completion(
        &self,
        job_id: &str,
        endpoint: &str,
        poll: &PollConfig,
    ) -> Result<JobResponse, LeonardoError> {
        let url = format!("{}{}/{}", self.base_url, endpoint, job_id);

        let mut elapsed = Duration::ZERO;
        while elapsed < poll.timeout {
            let response = self
                .http_client
                .get(&url)
                .bearer_auth(&self.api_key)
                .send()
                .await?;
            let body: JobResponse = Self::check_response(response).await?.json().await?;

            match body.job_status() {
                JobStatus::Succeeded => return Ok(body),
                JobStatus::Failed => {
                    return Err(LeonardoError::JobFailed {
                        job_id: job_id.to_string(),
                    });
                }
                JobStatus::Pending => {
                    log::debug!("Job {} still pending after {:?}", job_id, elapsed);
                }
            }

            tokio::time::sleep(poll.interval).await;
            elapsed += poll.interval;
        }

        Err(LeonardoError::Timeout {
            job_id: job_id.to_string(),
            timeout: poll.timeout,
        })
    }

    /// Download an asset (image or video) from a URL to a local file.
    ///
    /// Asset URLs returned in job results are pre-signed, so no auth header
    /// is sent. The body is streamed to disk, overwriting any existing file
    /// and creating parent directories as needed.
    ///
    /// # Errors
    /// Returns `LeonardoError::Api` for a non-2xx response,
    /// `LeonardoError::Http` if the request fails, or `LeonardoError::Io` if
    /// writing to disk fails.
    pub async fn download_asset(&self, url: &str, dest: &Path) -> Result<PathBuf, LeonardoError> {
        if let Some(parent) = dest.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        let response = self.http_client.get(url).send().await?;
        let response = Self::check_response(response).await?;

        let mut file = tokio::fs::File::create(dest).await?;
        let mut stream = response.bytes_stream();

        use futures_util::StreamExt;
        while let Some(chunk_result) = stream.next().await {
            let chunk = chunk_result?;
            file.write_all(&chunk).await?;
        }
        file.flush().await?;

        Ok(dest.to_path_buf())
    }

    /// Turn a non-2xx response into `LeonardoError::Api` with the response
    /// text, passing 2xx responses through.
    async fn check_response(response: reqwest::Response) -> Result<reqwest::Response, LeonardoError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let message = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());
        Err(LeonardoError::Api {
            status: status.as_u16(),
            message,
        })
    }
}

/// Errors that can occur during Leonardo.ai operations.
#[derive(Debug, thiserror::Error)]
pub enum LeonardoError {
    #[error("LEONARDO_API_KEY environment variable is not set")]
    MissingApiKey,

    #[error("Prompt is empty")]
    EmptyPrompt,

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API request failed with status {status}: {message}")]
    Api {
        /// HTTP status code returned by the service.
        status: u16,
        /// Response body text, as far as it could be read.
        message: String,
    },

    #[error("API response did not contain a job id")]
    MissingJobId,

    #[error("Job {job_id} failed")]
    JobFailed {
        /// Identifier of the failed job.
        job_id: String,
    },

    #[error("Job {job_id} did not complete within {} seconds", .timeout.as_secs())]
    Timeout {
        /// Identifier of the job that timed out.
        job_id: String,
        /// Polling budget that was exhausted.
        timeout: Duration,
    },

    #[error("Job succeeded but returned no result URL")]
    MissingResultUrl,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
