//! Image upload widget
//!
//! Wires validation, uploads and removals over one shared [`PreviewRegistry`].

use std::sync::Arc;

use shared::models::ProductImage;
use tokio::sync::watch;

use super::file::ImageFile;
use super::listener::ProductImageListener;
use super::notify::NotificationSink;
use super::orchestrator::{BatchHandle, UploadOrchestrator};
use super::registry::{PreviewRegistry, SlotView};
use super::removal::{RemovalCoordinator, RemovalOutcome};
use super::store::{HttpImageStore, ImageStore};
use super::validator;
use crate::config::UploadRules;
use crate::{ClientConfig, ClientResult};

/// Multi-image upload widget state
///
/// ```no_run
/// use std::sync::Arc;
/// use merchant_client::image::{ImageFile, ImageUploader, TracingNotifier};
/// use merchant_client::ClientConfig;
///
/// # async fn run() -> merchant_client::ClientResult<()> {
/// let uploader = ImageUploader::from_config(
///     &ClientConfig::from_env(),
///     Arc::new(TracingNotifier),
///     Arc::new(()),
/// )?;
/// let file = ImageFile::from_path("cover.png").await?;
/// if let Some(batch) = uploader.select_files(vec![file]) {
///     let report = batch.wait().await;
///     println!("{:?}", report.uploaded);
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct ImageUploader {
    registry: PreviewRegistry,
    rules: UploadRules,
    store: Arc<dyn ImageStore>,
    notifier: Arc<dyn NotificationSink>,
    listener: Arc<dyn ProductImageListener>,
    orchestrator: UploadOrchestrator,
    removal: RemovalCoordinator,
}

impl ImageUploader {
    pub fn new(
        registry: PreviewRegistry,
        store: Arc<dyn ImageStore>,
        notifier: Arc<dyn NotificationSink>,
        listener: Arc<dyn ProductImageListener>,
        rules: UploadRules,
    ) -> Self {
        let orchestrator = UploadOrchestrator::new(
            registry.clone(),
            store.clone(),
            notifier.clone(),
            listener.clone(),
        )
        .with_orphan_cleanup(rules.cleanup_orphans);
        let removal = RemovalCoordinator::new(
            registry.clone(),
            store.clone(),
            notifier.clone(),
            listener.clone(),
        );

        Self {
            registry,
            rules,
            store,
            notifier,
            listener,
            orchestrator,
            removal,
        }
    }

    /// Widget for a new product, talking to the merchant API
    pub fn from_config(
        config: &ClientConfig,
        notifier: Arc<dyn NotificationSink>,
        listener: Arc<dyn ProductImageListener>,
    ) -> ClientResult<Self> {
        let store = Arc::new(HttpImageStore::from_config(config)?);
        Ok(Self::new(
            PreviewRegistry::new(),
            store,
            notifier,
            listener,
            config.upload_rules.clone(),
        ))
    }

    /// Replace the slots with a product's persisted images (edit form)
    pub fn with_images(self, images: &[ProductImage]) -> Self {
        Self::new(
            PreviewRegistry::from_product_images(images),
            self.store,
            self.notifier,
            self.listener,
            self.rules,
        )
    }

    /// Validate the picked files and upload the accepted ones
    ///
    /// Returns `None` when every file was rejected.
    pub fn select_files(&self, files: Vec<ImageFile>) -> Option<BatchHandle> {
        let outcome = validator::validate(files, &self.rules, self.notifier.as_ref());
        if outcome.accepted.is_empty() {
            return None;
        }
        Some(self.orchestrator.submit(outcome.accepted))
    }

    /// Remove the image at `index` (0 is the thumbnail)
    pub async fn remove_at(&self, index: usize) -> RemovalOutcome {
        self.removal.remove_at(index).await
    }

    pub fn committed_urls(&self) -> Vec<String> {
        self.registry.committed_urls()
    }

    pub fn snapshot(&self) -> Vec<SlotView> {
        self.registry.snapshot()
    }

    pub fn subscribe(&self) -> watch::Receiver<Vec<SlotView>> {
        self.registry.subscribe()
    }

    pub fn registry(&self) -> &PreviewRegistry {
        &self.registry
    }

    pub fn rules(&self) -> &UploadRules {
        &self.rules
    }
}
