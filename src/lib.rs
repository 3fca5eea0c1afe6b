//! # Virtual Stager Client Library
//!
//! Client side of a virtual-staging tool: a photo of an empty or partially
//! furnished room goes in, a furnished rendering from a remote generation
//! service comes back, and the result is exported as PNG or JPEG.
//!
//! ## Architecture
//!
//! - `upload`: file validation, data URLs, dimension probing
//! - `aspect`: nearest-match aspect-ratio classification
//! - `catalog`: room types and decor styles
//! - `client`: multipart HTTP client for the generation service
//! - `analysis`: permissive scene-analysis report
//! - `session`: Idle / Processing / Complete / Error state machine
//! - `profile` + `storage`: persisted house profiles for multi-room continuity
//! - `export`: resize and re-encode for download
//! - `config`: layered configuration
//!
//! ## Example
//!
//! ```rust,no_run
//! use virtual_stager::{GenerationClient, HouseProfileStore, StagingSession, Upload};
//! use virtual_stager::catalog::{RoomType, Style};
//! use virtual_stager::storage::MemoryStore;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = GenerationClient::new("http://localhost:8000")?;
//! let mut profiles = HouseProfileStore::load(MemoryStore::new())?;
//!
//! let mut session = StagingSession::new();
//! session.load_upload(Upload::from_path("empty_kitchen.jpg")?)?;
//! session.set_room_type(RoomType::Kitchen);
//! session.set_style(&profiles, Style::Modern)?;
//! session.run_generation(&client, &mut profiles).await?;
//!
//! println!("staged image: {}", session.generated().unwrap_or_default().len());
//! # Ok(())
//! # }
//! ```

pub mod analysis;
pub mod aspect;
pub mod catalog;
pub mod client;
pub mod config;
pub mod error;
pub mod export;
pub mod profile;
pub mod session;
pub mod storage;
pub mod upload;

/// Re-export error types for convenience
pub use error::{HasRecoverySuggestion, HasSeverity, Retryable, StagingError, StagingResult};

pub use aspect::{AspectRatio, classify};
pub use client::{GenerationClient, GenerationRequest, GenerationResponse, StagingBackend};
pub use export::{ExportFormat, ExportResolution};
pub use profile::{HouseProfile, HouseProfileStore};
pub use session::{Phase, StagingSession};
pub use upload::{DataUrl, Upload};
