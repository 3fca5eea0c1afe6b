//! # Staging Session
//!
//! The view state of one staging workflow:
//!
//! ```text
//!   upload ──► Idle ──begin──► Processing ──ok──► Complete
//!                ▲                  │
//!                │                  └──err──► Error
//!                └────── dismiss ──────────────┘
//! ```
//!
//! A new upload or an explicit reset always lands in `Idle` with the result
//! and analysis cleared. A failed attempt leaves the previous result alone;
//! only a successful one overwrites it.
//!
//! While a house profile is active the style follows the profile and cannot
//! be changed independently. Which profile is active is owned by the
//! [`HouseProfileStore`]; the session only asks it.

use std::fmt;

use tracing::{info, warn};

use crate::analysis::SceneAnalysis;
use crate::aspect::AspectRatio;
use crate::catalog::{RoomType, Style};
use crate::client::{GenerationRequest, GenerationResponse, HouseContinuity, StagingBackend};
use crate::error::{StagingError, StagingResult};
use crate::profile::{HouseProfile, HouseProfileStore};
use crate::storage::KeyValueStore;
use crate::upload::Upload;

/// Loading phase of the session.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Idle,
    Processing,
    Complete,
    Error { message: String },
}

impl Phase {
    pub fn name(&self) -> &'static str {
        match self {
            Phase::Idle => "idle",
            Phase::Processing => "processing",
            Phase::Complete => "complete",
            Phase::Error { .. } => "error",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Error { message } => write!(f, "error: {}", message),
            other => f.write_str(other.name()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct StagingSession {
    original: Option<Upload>,
    generated: Option<String>,
    analysis: Option<SceneAnalysis>,
    room_type: RoomType,
    style: Style,
    aspect_ratio: AspectRatio,
    enable_analysis: bool,
    phase: Phase,
}

impl Default for StagingSession {
    fn default() -> Self {
        Self::new()
    }
}

impl StagingSession {
    pub fn new() -> Self {
        Self {
            original: None,
            generated: None,
            analysis: None,
            room_type: RoomType::default(),
            style: Style::default(),
            aspect_ratio: AspectRatio::default(),
            enable_analysis: true,
            phase: Phase::Idle,
        }
    }

    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    pub fn original(&self) -> Option<&Upload> {
        self.original.as_ref()
    }

    pub fn generated(&self) -> Option<&str> {
        self.generated.as_deref()
    }

    pub fn analysis(&self) -> Option<&SceneAnalysis> {
        self.analysis.as_ref()
    }

    pub fn room_type(&self) -> RoomType {
        self.room_type
    }

    pub fn style(&self) -> Style {
        self.style
    }

    pub fn aspect_ratio(&self) -> AspectRatio {
        self.aspect_ratio
    }

    pub fn is_style_locked<S: KeyValueStore>(&self, profiles: &HouseProfileStore<S>) -> bool {
        profiles.active().is_some()
    }

    /// Whether the generate action is currently available.
    pub fn can_generate(&self) -> bool {
        self.original.is_some() && self.phase != Phase::Processing
    }

    /// Install a new upload; clears any previous result and analysis.
    pub fn load_upload(&mut self, upload: Upload) -> StagingResult<()> {
        self.ensure_not_processing("load a new upload")?;
        self.aspect_ratio = upload.aspect_ratio;
        self.original = Some(upload);
        self.clear_result();
        self.phase = Phase::Idle;
        Ok(())
    }

    pub fn set_room_type(&mut self, room_type: RoomType) {
        self.room_type = room_type;
    }

    /// Change the style; rejected while a house profile with a different
    /// style is active.
    pub fn set_style<S: KeyValueStore>(
        &mut self,
        profiles: &HouseProfileStore<S>,
        style: Style,
    ) -> StagingResult<()> {
        if let Some(profile) = profiles.active() {
            if style != profile.style {
                return Err(StagingError::style_locked(profile.name.clone()));
            }
        }
        self.style = style;
        Ok(())
    }

    pub fn set_analysis_enabled(&mut self, enabled: bool) {
        self.enable_analysis = enabled;
    }

    /// Activate a house profile and lock the style to it.
    pub fn select_profile<S: KeyValueStore>(
        &mut self,
        profiles: &mut HouseProfileStore<S>,
        id: &str,
    ) -> StagingResult<()> {
        let profile: &HouseProfile = profiles.select(id)?;
        self.style = profile.style;
        info!(profile = %profile.name, style = %profile.style, "style locked to house profile");
        Ok(())
    }

    /// Deactivate the house profile; the style becomes editable again.
    pub fn clear_profile<S: KeyValueStore>(&mut self, profiles: &mut HouseProfileStore<S>) {
        profiles.clear_selection();
    }

    /// Enter `Processing` and build the request for this attempt.
    pub fn begin_generation(
        &mut self,
        house_continuity: Option<HouseContinuity>,
    ) -> StagingResult<GenerationRequest> {
        self.ensure_not_processing("start a generation")?;
        let upload = self
            .original
            .as_ref()
            .ok_or_else(|| StagingError::invalid_state("without an upload", "generate"))?;
        let request = GenerationRequest {
            image: upload.data.clone(),
            room_type: self.room_type,
            style: self.style,
            aspect_ratio: self.aspect_ratio,
            house_continuity,
            enable_analysis: self.enable_analysis,
        };
        self.phase = Phase::Processing;
        Ok(request)
    }

    /// Store a successful result.
    pub fn complete(&mut self, response: GenerationResponse) -> StagingResult<()> {
        self.ensure_processing("complete a generation")?;
        self.generated = Some(response.image);
        self.analysis = response.scene_analysis;
        self.phase = Phase::Complete;
        Ok(())
    }

    /// Record a failed attempt. Previous results stay untouched.
    pub fn fail(&mut self, message: impl Into<String>) -> StagingResult<()> {
        self.ensure_processing("record a failure")?;
        self.phase = Phase::Error {
            message: message.into(),
        };
        Ok(())
    }

    /// `Error → Idle`.
    pub fn dismiss_error(&mut self) -> StagingResult<()> {
        match self.phase {
            Phase::Error { .. } => {
                self.phase = Phase::Idle;
                Ok(())
            }
            _ => Err(StagingError::invalid_state(self.phase.name(), "dismiss an error")),
        }
    }

    /// Drop the upload, result and analysis. Room type, style and the
    /// active profile are kept.
    pub fn reset(&mut self) {
        self.original = None;
        self.aspect_ratio = AspectRatio::default();
        self.clear_result();
        self.phase = Phase::Idle;
    }

    /// One full generation attempt against `backend`.
    ///
    /// On success the result is stored and the active profile's counter is
    /// bumped. A counter that cannot be saved is logged, not reported: the
    /// generation itself still succeeded. On failure the session enters
    /// `Error` and the error is returned.
    pub async fn run_generation<B, S>(
        &mut self,
        backend: &B,
        profiles: &mut HouseProfileStore<S>,
    ) -> StagingResult<()>
    where
        B: StagingBackend + ?Sized,
        S: KeyValueStore,
    {
        let active = profiles.active();
        if let Some(profile) = active {
            self.style = profile.style;
        }
        let active_id = active.map(|p| p.id.clone());
        let request = self.begin_generation(active.map(HouseContinuity::from))?;

        match backend.generate(&request).await {
            Ok(response) => {
                self.complete(response)?;
                if let Some(id) = active_id {
                    if let Err(e) = profiles.record_staged(&id) {
                        warn!(profile = %id, error = %e, "could not record staged room");
                    }
                }
                info!(room_type = %self.room_type, style = %self.style, "generation complete");
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "generation attempt failed");
                self.fail(e.user_message())?;
                Err(e)
            }
        }
    }

    fn clear_result(&mut self) {
        self.generated = None;
        self.analysis = None;
    }

    fn ensure_not_processing(&self, operation: &str) -> StagingResult<()> {
        if self.phase == Phase::Processing {
            return Err(StagingError::invalid_state(self.phase.name(), operation));
        }
        Ok(())
    }

    fn ensure_processing(&self, operation: &str) -> StagingResult<()> {
        if self.phase != Phase::Processing {
            return Err(StagingError::invalid_state(self.phase.name(), operation));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;
    use crate::storage::testing::FlakyStore;
    use crate::upload::DataUrl;

    fn upload(w: u32, h: u32) -> Upload {
        Upload {
            name: "room.png".into(),
            data: DataUrl::new("image/png", vec![1, 2, 3]),
            width: w,
            height: h,
            aspect_ratio: crate::aspect::classify(w, h),
        }
    }

    fn response(image: &str) -> GenerationResponse {
        GenerationResponse {
            image: image.into(),
            scene_analysis: Some(SceneAnalysis::default()),
        }
    }

    #[test]
    fn happy_path_transitions() {
        let mut s = StagingSession::new();
        assert!(!s.can_generate());
        s.load_upload(upload(1600, 1200)).unwrap();
        assert_eq!(s.aspect_ratio(), AspectRatio::Landscape4x3);

        let req = s.begin_generation(None).unwrap();
        assert_eq!(req.aspect_ratio, AspectRatio::Landscape4x3);
        assert!(req.enable_analysis);
        assert_eq!(s.phase(), &Phase::Processing);
        assert!(!s.can_generate());

        s.complete(response("data:image/png;base64,AA==")).unwrap();
        assert_eq!(s.phase(), &Phase::Complete);
        assert_eq!(s.generated(), Some("data:image/png;base64,AA=="));
        assert!(s.analysis().is_some());
    }

    #[test]
    fn generation_without_upload_is_rejected() {
        let mut s = StagingSession::new();
        assert!(matches!(
            s.begin_generation(None),
            Err(StagingError::InvalidState { .. })
        ));
        assert_eq!(s.phase(), &Phase::Idle);
    }

    #[test]
    fn overlapping_generation_is_rejected() {
        let mut s = StagingSession::new();
        s.load_upload(upload(10, 10)).unwrap();
        s.begin_generation(None).unwrap();
        assert!(s.begin_generation(None).is_err());
        assert!(s.load_upload(upload(10, 10)).is_err());
    }

    #[test]
    fn failure_keeps_previous_result_and_dismiss_returns_to_idle() {
        let mut s = StagingSession::new();
        s.load_upload(upload(10, 10)).unwrap();
        s.begin_generation(None).unwrap();
        s.complete(response("first")).unwrap();

        s.begin_generation(None).unwrap();
        s.fail("backend exploded").unwrap();
        assert_eq!(
            s.phase(),
            &Phase::Error {
                message: "backend exploded".into()
            }
        );
        assert_eq!(s.generated(), Some("first"));

        s.dismiss_error().unwrap();
        assert_eq!(s.phase(), &Phase::Idle);
        assert!(s.dismiss_error().is_err());
    }

    #[test]
    fn new_upload_and_reset_clear_results() {
        let mut s = StagingSession::new();
        s.load_upload(upload(10, 10)).unwrap();
        s.begin_generation(None).unwrap();
        s.complete(response("x")).unwrap();

        s.load_upload(upload(1920, 1080)).unwrap();
        assert_eq!(s.phase(), &Phase::Idle);
        assert!(s.generated().is_none());
        assert!(s.analysis().is_none());
        assert_eq!(s.aspect_ratio(), AspectRatio::Landscape16x9);

        s.set_room_type(RoomType::Office);
        s.reset();
        assert!(s.original().is_none());
        assert_eq!(s.room_type(), RoomType::Office);
    }

    #[test]
    fn profile_locks_style() {
        let mut profiles = HouseProfileStore::load(MemoryStore::new()).unwrap();
        let p = profiles.create("Lake House", Style::Scandinavian).unwrap();

        let mut s = StagingSession::new();
        s.set_style(&profiles, Style::Luxury).unwrap();
        s.select_profile(&mut profiles, &p.id).unwrap();
        assert_eq!(s.style(), Style::Scandinavian);
        assert!(s.is_style_locked(&profiles));
        assert!(matches!(
            s.set_style(&profiles, Style::Modern),
            Err(StagingError::StyleLocked { .. })
        ));
        s.set_style(&profiles, Style::Scandinavian).unwrap();

        s.clear_profile(&mut profiles);
        assert!(profiles.active().is_none());
        s.set_style(&profiles, Style::Modern).unwrap();
    }

    struct EchoBackend;

    #[async_trait::async_trait]
    impl StagingBackend for EchoBackend {
        async fn generate(&self, request: &GenerationRequest) -> StagingResult<GenerationResponse> {
            Ok(GenerationResponse {
                image: request.image.encode(),
                scene_analysis: None,
            })
        }
    }

    #[tokio::test]
    async fn deleted_profile_releases_style_lock() {
        let mut profiles = HouseProfileStore::load(MemoryStore::new()).unwrap();
        let p = profiles.create("Lake House", Style::Coastal).unwrap();

        let mut s = StagingSession::new();
        s.load_upload(upload(10, 10)).unwrap();
        s.select_profile(&mut profiles, &p.id).unwrap();
        profiles.delete(&p.id).unwrap();

        assert!(!s.is_style_locked(&profiles));
        s.set_style(&profiles, Style::Modern).unwrap();
        s.run_generation(&EchoBackend, &mut profiles).await.unwrap();
        assert_eq!(s.phase(), &Phase::Complete);
        assert_eq!(s.style(), Style::Modern);
    }

    #[tokio::test]
    async fn unsaved_counter_does_not_fail_generation() {
        let mut profiles = HouseProfileStore::load(FlakyStore::default()).unwrap();
        let p = profiles.create("Lake House", Style::Coastal).unwrap();

        let mut s = StagingSession::new();
        s.load_upload(upload(10, 10)).unwrap();
        s.select_profile(&mut profiles, &p.id).unwrap();
        profiles.storage_mut().fail_writes = true;

        s.run_generation(&EchoBackend, &mut profiles).await.unwrap();
        assert_eq!(s.phase(), &Phase::Complete);
        assert_eq!(profiles.get(&p.id).unwrap().rooms_staged, 0);
    }

    #[test]
    fn complete_outside_processing_is_rejected() {
        let mut s = StagingSession::new();
        assert!(s.complete(response("x")).is_err());
        assert!(s.fail("x").is_err());
    }
}
