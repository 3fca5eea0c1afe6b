//! Integration tests for the generation client against a mock backend

mod common;

use common::{MockBackend, dead_url, fixtures};
use serde_json::json;
use virtual_stager::catalog::{RoomType, Style};
use virtual_stager::client::HouseContinuity;
use virtual_stager::profile::DesignDna;
use virtual_stager::{
    AspectRatio, DataUrl, GenerationClient, GenerationRequest, Retryable, StagingBackend,
    StagingError,
};

fn request(continuity: Option<HouseContinuity>, enable_analysis: bool) -> GenerationRequest {
    GenerationRequest {
        image: DataUrl::new("image/png", fixtures::solid_png(16, 12, [1, 2, 3, 255])),
        room_type: RoomType::Kitchen,
        style: Style::Modern,
        aspect_ratio: AspectRatio::Landscape4x3,
        house_continuity: continuity,
        enable_analysis,
    }
}

#[tokio::test]
async fn sends_all_multipart_fields() {
    let backend = MockBackend::succeeding().await;
    let client = GenerationClient::new(&backend.base_url).unwrap();

    let continuity = HouseContinuity {
        profile_name: "Maple Street".into(),
        style: Style::Modern,
        design_dna: DesignDna::for_style(Style::Modern),
        rooms_staged: 3,
    };
    let req = request(Some(continuity.clone()), true);
    let resp = client.generate(&req).await.unwrap();
    assert!(resp.image.starts_with("data:image/png;base64,"));
    assert_eq!(resp.scene_analysis.unwrap().window_count, Some(2));

    let seen = backend.requests();
    assert_eq!(seen.len(), 1);
    let r = &seen[0];
    assert_eq!(r.fields.get("image"), Some(&req.image.bytes));
    assert_eq!(r.image_content_type.as_deref(), Some("image/png"));
    assert_eq!(r.image_file_name.as_deref(), Some("upload.png"));
    assert_eq!(r.text("room_type").as_deref(), Some("KITCHEN"));
    assert_eq!(r.text("style").as_deref(), Some("MODERN"));
    assert_eq!(r.text("aspect_ratio").as_deref(), Some("4:3"));
    assert_eq!(r.text("enable_analysis").as_deref(), Some("true"));

    let sent: HouseContinuity =
        serde_json::from_str(&r.text("house_continuity").unwrap()).unwrap();
    assert_eq!(sent, continuity);
}

#[tokio::test]
async fn optional_fields_are_omitted() {
    let backend = MockBackend::succeeding().await;
    let client = GenerationClient::new(&backend.base_url).unwrap();

    client.generate(&request(None, false)).await.unwrap();

    let r = &backend.requests()[0];
    assert!(!r.fields.contains_key("house_continuity"));
    assert!(!r.fields.contains_key("enable_analysis"));
}

#[tokio::test]
async fn backend_error_message_is_surfaced_verbatim() {
    let backend = MockBackend::start(500, json!({"error": "GPU pool exhausted"})).await;
    let client = GenerationClient::new(&backend.base_url).unwrap();

    let err = client.generate(&request(None, true)).await.unwrap_err();
    match &err {
        StagingError::Backend { status, message, .. } => {
            assert_eq!(*status, Some(500));
            assert_eq!(message, "GPU pool exhausted");
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(err.is_retryable());
}

#[tokio::test]
async fn error_without_message_gets_generic_text() {
    let backend = MockBackend::start(400, json!({})).await;
    let client = GenerationClient::new(&backend.base_url).unwrap();

    let err = client.generate(&request(None, true)).await.unwrap_err();
    assert_eq!(err.user_message(), "Generation failed (HTTP 400)");
    assert!(!err.is_retryable());
}

#[tokio::test]
async fn unreachable_backend_is_a_network_error() {
    let client = GenerationClient::new(dead_url().await).unwrap();
    let err = client.generate(&request(None, true)).await.unwrap_err();
    assert!(matches!(err, StagingError::Network { .. }));
}

#[tokio::test]
async fn health_check() {
    let backend = MockBackend::succeeding().await;
    let client = GenerationClient::new(format!("{}/", backend.base_url)).unwrap();
    client.health().await.unwrap();

    let client = GenerationClient::new(dead_url().await).unwrap();
    assert!(client.health().await.is_err());
}

#[tokio::test]
async fn resolve_image_decodes_data_urls_locally() {
    let client = GenerationClient::new(dead_url().await).unwrap();
    let src = fixtures::staged_data_url(8, 6);
    let image = client.resolve_image(&src).await.unwrap();
    assert_eq!(image.mime, "image/png");
    assert_eq!(image.encode(), src);

    assert!(client.resolve_image("file:///etc/passwd").await.is_err());
}
