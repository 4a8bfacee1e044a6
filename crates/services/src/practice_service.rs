use std::sync::Arc;

use gesture_core::model::{Gesture, GestureId, PracticeSettings};
use gesture_core::Clock;
use storage::repository::{GestureCatalog, StorageError};

use crate::capture::{CaptureHost, MediaCaptureHandle, RenderSurface};
use crate::completion::CompletionSender;
use crate::detection::DetectorFactory;
use crate::error::PracticeError;
use crate::practice::PracticeSession;

/// Entry point for the presentation layer: looks up gestures and opens
/// practice sessions wired to the shared completion channel.
#[derive(Clone)]
pub struct PracticeService {
    catalog: Arc<dyn GestureCatalog>,
    settings: PracticeSettings,
    completions: Option<CompletionSender>,
    detectors: Option<Arc<dyn DetectorFactory>>,
    clock: Clock,
}

impl PracticeService {
    #[must_use]
    pub fn new(catalog: Arc<dyn GestureCatalog>, settings: PracticeSettings) -> Self {
        Self {
            catalog,
            settings,
            completions: None,
            detectors: None,
            clock: Clock::default(),
        }
    }

    #[must_use]
    pub fn with_completions(mut self, completions: CompletionSender) -> Self {
        self.completions = Some(completions);
        self
    }

    /// Replace the simulated detector for every session this service opens.
    #[must_use]
    pub fn with_detector(mut self, detectors: Arc<dyn DetectorFactory>) -> Self {
        self.detectors = Some(detectors);
        self
    }

    /// Override the clock (usually for deterministic testing).
    #[must_use]
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    #[must_use]
    pub fn settings(&self) -> &PracticeSettings {
        &self.settings
    }

    /// Fetch a gesture by id.
    ///
    /// # Errors
    ///
    /// Returns `PracticeError::GestureNotFound` if the catalog lacks `id`.
    pub async fn gesture(&self, id: &GestureId) -> Result<Gesture, PracticeError> {
        match self.catalog.get_gesture(id).await {
            Ok(gesture) => Ok(gesture),
            Err(StorageError::NotFound) => Err(PracticeError::GestureNotFound(id.clone())),
            Err(err) => Err(err.into()),
        }
    }

    /// # Errors
    ///
    /// Returns `PracticeError::Storage` if the catalog cannot be read.
    pub async fn list_gestures(&self) -> Result<Vec<Gesture>, PracticeError> {
        Ok(self.catalog.list_gestures().await?)
    }

    /// Open a session for `id` on the given camera host and surface.
    ///
    /// # Errors
    ///
    /// Returns `PracticeError::GestureNotFound` for unknown ids.
    pub async fn open_session(
        &self,
        id: &GestureId,
        host: Box<dyn CaptureHost>,
        surface: Box<dyn RenderSurface>,
    ) -> Result<PracticeSession, PracticeError> {
        let gesture = self.gesture(id).await?;
        let camera = MediaCaptureHandle::new(host, surface, &self.settings);
        let mut session =
            PracticeSession::new(gesture, camera, &self.settings).with_clock(self.clock);
        if let Some(detectors) = &self.detectors {
            session = session.with_detector(Arc::clone(detectors));
        }
        if let Some(completions) = &self.completions {
            session = session.with_completions(completions.clone());
        }
        Ok(session)
    }
}

impl std::fmt::Debug for PracticeService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PracticeService")
            .field("settings", &self.settings)
            .field("clock", &self.clock)
            .finish_non_exhaustive()
    }
}
