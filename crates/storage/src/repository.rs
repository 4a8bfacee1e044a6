use async_trait::async_trait;
use gesture_core::model::{Gesture, GestureId, PracticeCompletion};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};
use thiserror::Error;

use crate::catalog::starter_catalog;

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("not found")]
    NotFound,

    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Read-only source of gestures, keyed by id.
#[async_trait]
pub trait GestureCatalog: Send + Sync {
    /// Fetch a gesture by ID.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if missing, or other storage errors.
    async fn get_gesture(&self, id: &GestureId) -> Result<Gesture, StorageError>;

    /// List every gesture in catalog order.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the catalog cannot be read.
    async fn list_gestures(&self) -> Result<Vec<Gesture>, StorageError>;
}

/// Sink for completed practice runs.
#[async_trait]
pub trait CompletionRepository: Send + Sync {
    /// Append a completion and return its sequence id.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the completion cannot be stored.
    async fn append_completion(&self, completion: &PracticeCompletion)
    -> Result<u64, StorageError>;

    /// All completions in the order they were appended.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if completions cannot be read.
    async fn list_completions(&self) -> Result<Vec<PracticeCompletion>, StorageError>;
}

#[derive(Default)]
struct CatalogState {
    order: Vec<GestureId>,
    gestures: BTreeMap<GestureId, Gesture>,
}

/// Simple in-memory repository implementation for the desktop app and tests.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    catalog: Arc<Mutex<CatalogState>>,
    completions: Arc<Mutex<Vec<PracticeCompletion>>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Repository pre-populated with `gestures`, keeping their order.
    #[must_use]
    pub fn with_gestures(gestures: impl IntoIterator<Item = Gesture>) -> Self {
        let mut state = CatalogState::default();
        for gesture in gestures {
            insert_gesture(&mut state, gesture);
        }
        Self {
            catalog: Arc::new(Mutex::new(state)),
            completions: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Insert or replace a gesture. New ids are appended to the catalog order.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Connection` if the store lock is poisoned.
    pub fn upsert_gesture(&self, gesture: Gesture) -> Result<(), StorageError> {
        let mut guard = self
            .catalog
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        insert_gesture(&mut guard, gesture);
        Ok(())
    }
}

fn insert_gesture(state: &mut CatalogState, gesture: Gesture) {
    let id = gesture.id().clone();
    if state.gestures.insert(id.clone(), gesture).is_none() {
        state.order.push(id);
    }
}

#[async_trait]
impl GestureCatalog for InMemoryRepository {
    async fn get_gesture(&self, id: &GestureId) -> Result<Gesture, StorageError> {
        let guard = self
            .catalog
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.gestures.get(id).cloned().ok_or(StorageError::NotFound)
    }

    async fn list_gestures(&self) -> Result<Vec<Gesture>, StorageError> {
        let guard = self
            .catalog
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard
            .order
            .iter()
            .filter_map(|id| guard.gestures.get(id).cloned())
            .collect())
    }
}

#[async_trait]
impl CompletionRepository for InMemoryRepository {
    async fn append_completion(
        &self,
        completion: &PracticeCompletion,
    ) -> Result<u64, StorageError> {
        let mut guard = self
            .completions
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.push(completion.clone());
        u64::try_from(guard.len()).map_err(|e| StorageError::Serialization(e.to_string()))
    }

    async fn list_completions(&self) -> Result<Vec<PracticeCompletion>, StorageError> {
        let guard = self
            .completions
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.clone())
    }
}

/// Aggregates the catalog and completion sink behind trait objects for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub gestures: Arc<dyn GestureCatalog>,
    pub completions: Arc<dyn CompletionRepository>,
}

impl Storage {
    /// In-memory storage seeded with the starter catalog.
    #[must_use]
    pub fn in_memory() -> Self {
        Self::from_catalog(starter_catalog())
    }

    #[must_use]
    pub fn from_catalog(gestures: Vec<Gesture>) -> Self {
        let repo = InMemoryRepository::with_gestures(gestures);
        let catalog: Arc<dyn GestureCatalog> = Arc::new(repo.clone());
        let completions: Arc<dyn CompletionRepository> = Arc::new(repo);
        Self {
            gestures: catalog,
            completions,
        }
    }
}
