//! Removal Coordinator
//!
//! Removes a slot by position. A local (in-flight) slot just releases its
//! preview; a confirmed slot also asks the store to delete the server copy.
//! The local removal always stands, even when the remote delete fails.

use std::sync::Arc;

use shared::Notification;

use super::listener::ProductImageListener;
use super::notify::NotificationSink;
use super::registry::{PreviewRegistry, RemovedImage, SlotId};
use super::store::ImageStore;

/// What `remove_at` did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemovalOutcome {
    /// Index out of range, nothing changed
    NotFound,
    /// An unconfirmed slot was dropped; no network call was made
    Local { id: SlotId },
    /// A confirmed slot was dropped and a remote delete attempted
    Remote {
        id: SlotId,
        url: String,
        deleted: bool,
    },
}

impl RemovalOutcome {
    pub fn is_removed(&self) -> bool {
        !matches!(self, RemovalOutcome::NotFound)
    }
}

#[derive(Clone)]
pub struct RemovalCoordinator {
    registry: PreviewRegistry,
    store: Arc<dyn ImageStore>,
    notifier: Arc<dyn NotificationSink>,
    listener: Arc<dyn ProductImageListener>,
}

impl RemovalCoordinator {
    pub fn new(
        registry: PreviewRegistry,
        store: Arc<dyn ImageStore>,
        notifier: Arc<dyn NotificationSink>,
        listener: Arc<dyn ProductImageListener>,
    ) -> Self {
        Self {
            registry,
            store,
            notifier,
            listener,
        }
    }

    /// Remove the slot at `index`
    pub async fn remove_at(&self, index: usize) -> RemovalOutcome {
        let Some(removed) = self.registry.remove(index) else {
            tracing::debug!(index, "Remove ignored, index out of range");
            return RemovalOutcome::NotFound;
        };

        match removed {
            RemovedImage::Local { id, preview } => {
                // 释放本地预览，不访问服务器
                let url = preview.release();
                self.listener.on_remove(&url);
                RemovalOutcome::Local { id }
            }
            RemovedImage::Remote { id, url } => {
                let deleted = match self.store.delete(&url).await {
                    Ok(()) => {
                        tracing::info!(slot_id = %id, url = %url, "Image deleted");
                        self.notifier
                            .notify(Notification::success("Image removed successfully"));
                        true
                    }
                    Err(e) => {
                        tracing::warn!(slot_id = %id, url = %url, error = %e, "Failed to delete image");
                        self.notifier.notify(Notification::error(format!(
                            "Failed to delete image {}: {}",
                            url, e
                        )));
                        false
                    }
                };
                self.listener.on_remove(&url);
                RemovalOutcome::Remote { id, url, deleted }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image::file::ImageFile;
    use crate::image::notify::MemoryNotifier;
    use crate::image::store::UploadError;
    use crate::{ClientError, ClientResult};
    use async_trait::async_trait;
    use std::sync::Mutex;

    #[derive(Default)]
    struct DeleteStore {
        fail: bool,
        deleted: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl ImageStore for DeleteStore {
        async fn upload(&self, _file: &ImageFile) -> Result<String, UploadError> {
            Err(UploadError::MissingUrl)
        }

        async fn delete(&self, image_url: &str) -> ClientResult<()> {
            self.deleted.lock().unwrap().push(image_url.to_string());
            if self.fail {
                return Err(ClientError::Api {
                    code: None,
                    status: 500,
                    message: "storage offline".into(),
                });
            }
            Ok(())
        }
    }

    #[derive(Default)]
    struct Removed(Mutex<Vec<String>>);

    impl ProductImageListener for Removed {
        fn on_upload(&self, _urls: &[String]) {}
        fn on_remove(&self, url: &str) {
            self.0.lock().unwrap().push(url.to_string());
        }
    }

    fn coordinator(
        registry: &PreviewRegistry,
        fail: bool,
    ) -> (RemovalCoordinator, Arc<DeleteStore>, Arc<MemoryNotifier>, Arc<Removed>) {
        let store = Arc::new(DeleteStore {
            fail,
            ..Default::default()
        });
        let notifier = Arc::new(MemoryNotifier::new());
        let listener = Arc::new(Removed::default());
        let coordinator = RemovalCoordinator::new(
            registry.clone(),
            store.clone(),
            notifier.clone(),
            listener.clone(),
        );
        (coordinator, store, notifier, listener)
    }

    #[tokio::test]
    async fn test_remove_confirmed_deletes_remote() {
        let registry = PreviewRegistry::with_initial(["u0", "u1"]);
        let (coordinator, store, notifier, listener) = coordinator(&registry, false);

        let outcome = coordinator.remove_at(0).await;
        assert!(matches!(outcome, RemovalOutcome::Remote { deleted: true, .. }));
        assert_eq!(store.deleted.lock().unwrap().clone(), vec!["u0"]);
        assert_eq!(notifier.successes(), vec!["Image removed successfully"]);
        assert_eq!(listener.0.lock().unwrap().clone(), vec!["u0"]);
        assert_eq!(registry.committed_urls(), vec!["u1"]);
    }

    #[tokio::test]
    async fn test_failed_delete_is_not_rolled_back() {
        let registry = PreviewRegistry::with_initial(["u0", "u1"]);
        let (coordinator, _, notifier, listener) = coordinator(&registry, true);

        let outcome = coordinator.remove_at(1).await;
        assert!(matches!(outcome, RemovalOutcome::Remote { deleted: false, .. }));
        assert_eq!(registry.committed_urls(), vec!["u0"]);
        assert_eq!(notifier.errors(), vec!["Failed to delete image u1: storage offline"]);
        assert_eq!(listener.0.lock().unwrap().clone(), vec!["u1"]);
    }

    #[tokio::test]
    async fn test_remove_local_makes_no_call() {
        let registry = PreviewRegistry::new();
        registry.append_pending(vec![ImageFile::new("a.png", "image/png", vec![1u8])]);
        let (coordinator, store, notifier, _) = coordinator(&registry, false);

        let outcome = coordinator.remove_at(0).await;
        assert!(matches!(outcome, RemovalOutcome::Local { .. }));
        assert!(store.deleted.lock().unwrap().is_empty());
        assert!(notifier.all().is_empty());
        assert!(registry.is_empty());
        assert_eq!(registry.allocator().live(), 0);
    }

    #[tokio::test]
    async fn test_out_of_range() {
        let registry = PreviewRegistry::with_initial(["u0"]);
        let (coordinator, store, _, listener) = coordinator(&registry, false);

        let outcome = coordinator.remove_at(3).await;
        assert_eq!(outcome, RemovalOutcome::NotFound);
        assert!(!outcome.is_removed());
        assert!(store.deleted.lock().unwrap().is_empty());
        assert!(listener.0.lock().unwrap().is_empty());
        assert_eq!(registry.len(), 1);
    }
}
