//! Forwarding completed practice runs to a completion sink.

use std::sync::Arc;

use gesture_core::model::PracticeCompletion;
use storage::repository::CompletionRepository;
use tokio::sync::mpsc;
use tracing::{info, warn};

pub type CompletionSender = mpsc::UnboundedSender<PracticeCompletion>;
pub type CompletionReceiver = mpsc::UnboundedReceiver<PracticeCompletion>;

#[must_use]
pub fn completion_channel() -> (CompletionSender, CompletionReceiver) {
    mpsc::unbounded_channel()
}

/// Drains completion events into a repository.
pub struct CompletionRecorder {
    repo: Arc<dyn CompletionRepository>,
}

impl CompletionRecorder {
    #[must_use]
    pub fn new(repo: Arc<dyn CompletionRepository>) -> Self {
        Self { repo }
    }

    /// Record events until every sender is dropped. Returns how many were stored.
    ///
    /// A failed write is logged and skipped; later events are still recorded.
    pub async fn run(self, mut events: CompletionReceiver) -> usize {
        let mut recorded = 0;
        while let Some(completion) = events.recv().await {
            match self.repo.append_completion(&completion).await {
                Ok(seq) => {
                    recorded += 1;
                    info!(
                        gesture = %completion.gesture_id,
                        points = completion.points_awarded,
                        seq,
                        "practice completion recorded"
                    );
                }
                Err(err) => {
                    warn!(gesture = %completion.gesture_id, error = %err, "failed to record completion");
                }
            }
        }
        recorded
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use gesture_core::model::GestureId;
    use gesture_core::time::fixed_now;
    use storage::repository::{InMemoryRepository, StorageError};

    use super::*;

    fn completion(id: &str) -> PracticeCompletion {
        PracticeCompletion {
            gesture_id: GestureId::new(id),
            points_awarded: 10,
            completed_at: fixed_now(),
        }
    }

    #[tokio::test]
    async fn recorder_stores_until_senders_drop() {
        let repo = InMemoryRepository::new();
        let (tx, rx) = completion_channel();
        tx.send(completion("hello")).unwrap();
        tx.send(completion("please")).unwrap();
        drop(tx);

        let recorded = CompletionRecorder::new(Arc::new(repo.clone())).run(rx).await;

        assert_eq!(recorded, 2);
        let stored = repo.list_completions().await.unwrap();
        assert_eq!(stored[1].gesture_id.as_str(), "please");
    }

    struct Rejecting;

    #[async_trait]
    impl CompletionRepository for Rejecting {
        async fn append_completion(
            &self,
            _completion: &PracticeCompletion,
        ) -> Result<u64, StorageError> {
            Err(StorageError::Connection("offline".into()))
        }

        async fn list_completions(&self) -> Result<Vec<PracticeCompletion>, StorageError> {
            Ok(Vec::new())
        }
    }

    #[tokio::test]
    async fn write_failures_do_not_stop_the_recorder() {
        let (tx, rx) = completion_channel();
        tx.send(completion("hello")).unwrap();
        tx.send(completion("yes")).unwrap();
        drop(tx);

        assert_eq!(CompletionRecorder::new(Arc::new(Rejecting)).run(rx).await, 0);
    }
}
