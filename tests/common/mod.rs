//! Common test utilities shared by the integration tests
//!
//! - image fixtures (solid, transparent, gradient) encoded in memory
//! - a mock staging backend built on axum, bound to an ephemeral port, that
//!   records every multipart request it receives

#![allow(dead_code)]

use std::collections::HashMap;
use std::io::Cursor;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{Value, json};
use virtual_stager::DataUrl;

/// Image fixtures
pub mod fixtures {
    use super::*;
    use image::{ImageBuffer, ImageFormat, Rgba};

    pub fn encode(img: &ImageBuffer<Rgba<u8>, Vec<u8>>, format: ImageFormat) -> Vec<u8> {
        let mut out = Cursor::new(Vec::new());
        match format {
            ImageFormat::Jpeg => image::DynamicImage::ImageRgba8(img.clone())
                .to_rgb8()
                .write_to(&mut out, format)
                .unwrap(),
            _ => img.write_to(&mut out, format).unwrap(),
        }
        out.into_inner()
    }

    /// Opaque solid-colour PNG
    pub fn solid_png(w: u32, h: u32, rgba: [u8; 4]) -> Vec<u8> {
        encode(&ImageBuffer::from_pixel(w, h, Rgba(rgba)), ImageFormat::Png)
    }

    /// PNG whose left half is fully transparent
    pub fn half_transparent_png(w: u32, h: u32) -> Vec<u8> {
        let img = ImageBuffer::from_fn(w, h, |x, _| {
            if x < w / 2 {
                Rgba([0, 0, 0, 0])
            } else {
                Rgba([30, 90, 150, 255])
            }
        });
        encode(&img, ImageFormat::Png)
    }

    /// Opaque JPEG with a horizontal gradient
    pub fn gradient_jpeg(w: u32, h: u32) -> Vec<u8> {
        let img = ImageBuffer::from_fn(w, h, |x, y| {
            Rgba([(x * 255 / w.max(1)) as u8, (y * 255 / h.max(1)) as u8, 128, 255])
        });
        encode(&img, ImageFormat::Jpeg)
    }

    /// What a backend would return as the `image` field
    pub fn staged_data_url(w: u32, h: u32) -> String {
        DataUrl::new("image/png", solid_png(w, h, [200, 180, 160, 255])).encode()
    }
}

/// One request seen by the mock backend
#[derive(Debug, Clone, Default)]
pub struct CapturedRequest {
    pub fields: HashMap<String, Vec<u8>>,
    pub image_content_type: Option<String>,
    pub image_file_name: Option<String>,
}

impl CapturedRequest {
    pub fn text(&self, name: &str) -> Option<String> {
        self.fields
            .get(name)
            .map(|b| String::from_utf8_lossy(b).into_owned())
    }
}

#[derive(Clone)]
struct MockState {
    reply: Arc<Mutex<(u16, Value)>>,
    requests: Arc<Mutex<Vec<CapturedRequest>>>,
}

/// Mock staging backend
pub struct MockBackend {
    pub base_url: String,
    state: MockState,
}

impl MockBackend {
    /// Start a backend that answers every generation with `status`/`body`.
    pub async fn start(status: u16, body: Value) -> Self {
        let state = MockState {
            reply: Arc::new(Mutex::new((status, body))),
            requests: Arc::new(Mutex::new(Vec::new())),
        };
        let app = Router::new()
            .route("/generate-image", post(generate))
            .route("/health", get(|| async { Json(json!({"status": "ok"})) }))
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr: SocketAddr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url: format!("http://{}", addr),
            state,
        }
    }

    /// Backend that returns a staged image and an analysis.
    pub async fn succeeding() -> Self {
        Self::start(
            200,
            json!({
                "image": fixtures::staged_data_url(64, 48),
                "scene_analysis": {
                    "room_type": "kitchen",
                    "room_state": "empty",
                    "window_count": 2,
                    "doorway_count": 1
                }
            }),
        )
        .await
    }

    pub fn set_reply(&self, status: u16, body: Value) {
        *self.state.reply.lock().unwrap() = (status, body);
    }

    pub fn requests(&self) -> Vec<CapturedRequest> {
        self.state.requests.lock().unwrap().clone()
    }
}

async fn generate(
    State(state): State<MockState>,
    mut multipart: Multipart,
) -> (StatusCode, Json<Value>) {
    let mut captured = CapturedRequest::default();
    while let Some(field) = multipart.next_field().await.unwrap() {
        let name = field.name().unwrap_or_default().to_string();
        if name == "image" {
            captured.image_content_type = field.content_type().map(str::to_string);
            captured.image_file_name = field.file_name().map(str::to_string);
        }
        let data = field.bytes().await.unwrap();
        captured.fields.insert(name, data.to_vec());
    }
    state.requests.lock().unwrap().push(captured);

    let (status, body) = state.reply.lock().unwrap().clone();
    (StatusCode::from_u16(status).unwrap(), Json(body))
}

/// An address nothing listens on
pub async fn dead_url() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}", addr)
}
