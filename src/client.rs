//! # Generation Client
//!
//! Thin HTTP client for the remote staging service. One generation is one
//! multipart `POST <base>/generate-image`; there is no retry, no streaming
//! and no client-side timeout beyond the platform default. A failed attempt
//! is terminal and the user re-triggers it explicitly.
//!
//! ## Wire format
//!
//! Request fields:
//!
//! | field              | content                                        |
//! |--------------------|------------------------------------------------|
//! | `image`            | raw upload bytes, original MIME type           |
//! | `room_type`        | e.g. `KITCHEN`                                 |
//! | `style`            | e.g. `MODERN`                                  |
//! | `aspect_ratio`     | e.g. `4:3`                                     |
//! | `house_continuity` | optional JSON, see [`HouseContinuity`]         |
//! | `enable_analysis`  | `"true"` when a scene analysis is wanted       |
//!
//! Response JSON: `image` (display source, usually a data URL), optional
//! `scene_analysis`, and `error` on failures.

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::analysis::SceneAnalysis;
use crate::aspect::AspectRatio;
use crate::catalog::{RoomType, Style};
use crate::error::{StagingError, StagingResult};
use crate::profile::{DesignDna, HouseProfile};
use crate::upload::DataUrl;

/// Continuity payload tying a generation to a house profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HouseContinuity {
    pub profile_name: String,
    pub style: Style,
    #[serde(rename = "designDNA")]
    pub design_dna: DesignDna,
    pub rooms_staged: u32,
}

impl From<&HouseProfile> for HouseContinuity {
    fn from(profile: &HouseProfile) -> Self {
        Self {
            profile_name: profile.name.clone(),
            style: profile.style,
            design_dna: profile.design_dna.clone(),
            rooms_staged: profile.rooms_staged,
        }
    }
}

/// Everything needed for one generation attempt.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub image: DataUrl,
    pub room_type: RoomType,
    pub style: Style,
    pub aspect_ratio: AspectRatio,
    pub house_continuity: Option<HouseContinuity>,
    pub enable_analysis: bool,
}

impl GenerationRequest {
    /// Build the multipart body.
    pub fn to_form(&self) -> StagingResult<Form> {
        let part = Part::bytes(self.image.bytes.clone())
            .file_name(format!("upload.{}", self.image.extension()))
            .mime_str(&self.image.mime)
            .map_err(|e| StagingError::decode(format!("invalid MIME type: {}", e)))?;

        let mut form = Form::new()
            .part("image", part)
            .text("room_type", self.room_type.as_str())
            .text("style", self.style.as_str())
            .text("aspect_ratio", self.aspect_ratio.label());

        if let Some(continuity) = &self.house_continuity {
            let json = serde_json::to_string(continuity)
                .map_err(|e| StagingError::decode(e.to_string()))?;
            form = form.text("house_continuity", json);
        }
        if self.enable_analysis {
            form = form.text("enable_analysis", "true");
        }
        Ok(form)
    }
}

/// Successful generation result.
#[derive(Debug, Clone)]
pub struct GenerationResponse {
    /// Display source of the staged image (data URL or http URL).
    pub image: String,
    pub scene_analysis: Option<SceneAnalysis>,
}

impl GenerationResponse {
    /// Interpret a response body. `status` is only used in error messages.
    pub fn from_body(status: u16, success: bool, body: &str) -> StagingResult<Self> {
        let parsed: Option<Value> = serde_json::from_str(body).ok();

        if !success {
            let message = parsed
                .as_ref()
                .and_then(error_message)
                .unwrap_or_else(|| format!("Generation failed (HTTP {})", status));
            return Err(StagingError::backend(Some(status), message));
        }

        let Some(Value::Object(mut map)) = parsed else {
            return Err(StagingError::backend(
                Some(status),
                "Generation service returned an unreadable response",
            ));
        };
        let image = match map.remove("image") {
            Some(Value::String(s)) if !s.trim().is_empty() => s,
            _ => {
                let message = error_message(&Value::Object(map))
                    .unwrap_or_else(|| "Generation service returned no image".to_string());
                return Err(StagingError::backend(Some(status), message));
            }
        };
        let scene_analysis = match map.remove("scene_analysis") {
            None | Some(Value::Null) => None,
            Some(v) => Some(SceneAnalysis::from_value(v)),
        };
        Ok(Self {
            image,
            scene_analysis,
        })
    }
}

fn error_message(body: &Value) -> Option<String> {
    ["error", "detail"].iter().find_map(|key| match body.get(*key) {
        Some(Value::String(s)) if !s.is_empty() => Some(s.clone()),
        Some(Value::Null) | None => None,
        Some(other) => Some(other.to_string()),
    })
}

/// Seam between the session and the remote service.
#[async_trait]
pub trait StagingBackend: Send + Sync {
    /// Run one generation attempt.
    async fn generate(&self, request: &GenerationRequest) -> StagingResult<GenerationResponse>;
}

/// reqwest-backed client for the staging service.
#[derive(Debug, Clone)]
pub struct GenerationClient {
    http: reqwest::Client,
    base_url: String,
}

impl GenerationClient {
    pub fn new(base_url: impl Into<String>) -> StagingResult<Self> {
        let http = reqwest::Client::builder()
            .build()
            .map_err(|e| StagingError::network("build http client", e.to_string()))?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// `GET <base>/health`, expecting `{"status":"ok"}`.
    pub async fn health(&self) -> StagingResult<()> {
        let url = self.endpoint("health");
        let resp = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| network_error("health", e))?;
        let status = resp.status();
        let body: Value = resp
            .json()
            .await
            .map_err(|e| StagingError::backend(Some(status.as_u16()), e.to_string()))?;
        if status.is_success() && body.get("status").and_then(Value::as_str) == Some("ok") {
            Ok(())
        } else {
            Err(StagingError::backend(
                Some(status.as_u16()),
                format!("unhealthy: {}", body),
            ))
        }
    }

    /// Bytes behind a response `image` source: data URLs are decoded
    /// locally, http(s) URLs are fetched.
    pub async fn resolve_image(&self, src: &str) -> StagingResult<DataUrl> {
        let src = src.trim();
        if src.starts_with("data:") {
            return DataUrl::parse(src);
        }
        if !(src.starts_with("http://") || src.starts_with("https://")) {
            return Err(StagingError::decode(
                "image source is neither a data URL nor an http(s) URL",
            ));
        }
        let resp = self
            .http
            .get(src)
            .send()
            .await
            .map_err(|e| network_error("fetch staged image", e))?;
        let status = resp.status();
        if !status.is_success() {
            return Err(StagingError::backend(
                Some(status.as_u16()),
                format!("Could not download staged image (HTTP {})", status.as_u16()),
            ));
        }
        let mime = resp
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.split(';').next().unwrap_or(v).trim().to_string());
        let bytes = resp
            .bytes()
            .await
            .map_err(|e| network_error("fetch staged image", e))?
            .to_vec();
        let mime = mime.unwrap_or_else(|| crate::upload::detect_mime(src, &bytes));
        Ok(DataUrl::new(mime, bytes))
    }
}

#[async_trait]
impl StagingBackend for GenerationClient {
    async fn generate(&self, request: &GenerationRequest) -> StagingResult<GenerationResponse> {
        let url = self.endpoint("generate-image");
        info!(
            %url,
            room_type = %request.room_type,
            style = %request.style,
            aspect_ratio = %request.aspect_ratio,
            continuity = request.house_continuity.is_some(),
            "sending generation request"
        );

        let resp = self
            .http
            .post(&url)
            .multipart(request.to_form()?)
            .send()
            .await
            .map_err(|e| network_error("generate-image", e))?;

        let status = resp.status();
        let body = resp
            .text()
            .await
            .map_err(|e| network_error("read generation response", e))?;
        debug!(status = status.as_u16(), bytes = body.len(), "generation response received");

        let result = GenerationResponse::from_body(status.as_u16(), status.is_success(), &body);
        if let Err(e) = &result {
            warn!(error = %e, "generation failed");
        }
        result
    }
}

fn network_error(operation: &str, e: reqwest::Error) -> StagingError {
    StagingError::network(operation, e.to_string())
        .with_recovery_suggestion("Check the backend URL and that the staging service is running")
}
