//! Upload Orchestrator
//!
//! Uploads a batch of validated files concurrently and reconciles each result
//! into the [`PreviewRegistry`]:
//!
//! 1. placeholders for the whole batch are appended in one update
//! 2. one task per file is spawned into a `JoinSet` (no concurrency cap)
//! 3. a single loop consumes `(SlotId, result)` messages as tasks settle
//! 4. once every task has settled, the form is told about the new URLs and a
//!    single success toast is shown
//!
//! A failed file never cancels its siblings. A file whose slot was removed
//! while uploading is an orphan: its URL is never committed.

use std::collections::BTreeMap;
use std::sync::Arc;

use shared::Notification;
use tokio::task::{JoinHandle, JoinSet};

use super::file::ImageFile;
use super::listener::ProductImageListener;
use super::notify::NotificationSink;
use super::registry::{PendingUpload, PreviewRegistry, SlotId};
use super::store::{ImageStore, UploadError};

/// One file that did not make it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailedUpload {
    pub slot_id: SlotId,
    pub file_name: String,
    pub message: String,
}

/// Outcome of one settled batch
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchReport {
    /// URLs committed by this batch, in slot order
    pub uploaded: Vec<String>,
    pub failed: Vec<FailedUpload>,
    /// Successful uploads whose slot had already been removed
    pub orphaned: Vec<String>,
}

impl BatchReport {
    pub fn is_empty(&self) -> bool {
        self.uploaded.is_empty() && self.failed.is_empty() && self.orphaned.is_empty()
    }
}

/// Handle to a running batch
///
/// Dropping it does not cancel anything; the batch keeps running in the
/// background.
#[derive(Debug)]
pub struct BatchHandle {
    slots: Vec<SlotId>,
    task: JoinHandle<BatchReport>,
}

impl BatchHandle {
    /// Slots created for this batch, in file order
    pub fn slot_ids(&self) -> &[SlotId] {
        &self.slots
    }

    /// Wait for every upload of the batch to settle
    pub async fn wait(self) -> BatchReport {
        match self.task.await {
            Ok(report) => report,
            Err(e) => {
                tracing::error!(error = %e, "Upload batch task failed");
                BatchReport::default()
            }
        }
    }
}

/// Fires uploads and reconciles their results
#[derive(Clone)]
pub struct UploadOrchestrator {
    registry: PreviewRegistry,
    store: Arc<dyn ImageStore>,
    notifier: Arc<dyn NotificationSink>,
    listener: Arc<dyn ProductImageListener>,
    cleanup_orphans: bool,
}

impl UploadOrchestrator {
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
            cleanup_orphans: true,
        }
    }

    /// Delete (or keep) server copies of orphaned uploads
    pub fn with_orphan_cleanup(mut self, enabled: bool) -> Self {
        self.cleanup_orphans = enabled;
        self
    }

    pub fn registry(&self) -> &PreviewRegistry {
        &self.registry
    }

    /// Start uploading `files`
    ///
    /// Placeholders are visible (and marked uploading) before this returns.
    /// Must be called from within a Tokio runtime.
    pub fn submit(&self, files: Vec<ImageFile>) -> BatchHandle {
        let pending = self.registry.append_pending(files);
        let slots: Vec<SlotId> = pending.iter().map(|p| p.id).collect();
        self.registry.begin_uploads(&slots);

        let this = self.clone();
        let task = tokio::spawn(async move { this.run_batch(pending).await });
        BatchHandle { slots, task }
    }

    async fn run_batch(&self, pending: Vec<PendingUpload>) -> BatchReport {
        let mut report = BatchReport::default();
        if pending.is_empty() {
            return report;
        }
        tracing::info!(files = pending.len(), "Upload batch started");

        let mut outstanding: BTreeMap<SlotId, String> = BTreeMap::new();
        let mut tasks = JoinSet::new();
        for PendingUpload { id, file } in pending {
            outstanding.insert(id, file.name().to_string());
            let store = self.store.clone();
            tasks.spawn(async move {
                let result = store.upload(&file).await;
                (id, result)
            });
        }

        let mut uploaded: Vec<(SlotId, String)> = Vec::new();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((id, result)) => {
                    let file_name = outstanding.remove(&id).unwrap_or_default();
                    self.reconcile(id, file_name, result, &mut uploaded, &mut report);
                }
                Err(e) => {
                    tracing::error!(error = %e, "Upload task panicked");
                }
            }
        }

        // Tasks that died without reporting count as failed uploads
        for (id, file_name) in std::mem::take(&mut outstanding) {
            let err = UploadError::Task("upload task ended unexpectedly".into());
            self.reconcile(id, file_name, Err(err), &mut uploaded, &mut report);
        }

        // Slot ids grow monotonically within a batch
        uploaded.sort_by_key(|(id, _)| *id);
        report.uploaded = uploaded.into_iter().map(|(_, url)| url).collect();

        if !report.uploaded.is_empty() {
            self.listener.on_upload(&report.uploaded);
            self.notifier
                .notify(Notification::success(uploaded_message(report.uploaded.len())));
        }

        tracing::info!(
            uploaded = report.uploaded.len(),
            failed = report.failed.len(),
            orphaned = report.orphaned.len(),
            "Upload batch settled"
        );
        report
    }

    fn reconcile(
        &self,
        id: SlotId,
        file_name: String,
        result: Result<String, UploadError>,
        uploaded: &mut Vec<(SlotId, String)>,
        report: &mut BatchReport,
    ) {
        match result {
            Ok(url) => {
                if self.registry.confirm(id, url.clone()) {
                    tracing::debug!(slot_id = %id, file = %file_name, url = %url, "Image uploaded");
                    uploaded.push((id, url));
                } else {
                    tracing::info!(slot_id = %id, file = %file_name, url = %url, "Upload finished after slot was removed");
                    self.drop_orphan(url.clone());
                    report.orphaned.push(url);
                }
            }
            Err(e) => {
                tracing::warn!(slot_id = %id, file = %file_name, error = %e, "Image upload failed");
                self.registry.discard(id);
                let message = e.user_message();
                self.notifier.notify(Notification::error(format!(
                    "Failed to upload {}: {}",
                    file_name, message
                )));
                report.failed.push(FailedUpload {
                    slot_id: id,
                    file_name,
                    message,
                });
            }
        }
    }

    fn drop_orphan(&self, url: String) {
        if !self.cleanup_orphans {
            return;
        }
        let store = self.store.clone();
        tokio::spawn(async move {
            if let Err(e) = store.delete(&url).await {
                tracing::warn!(url = %url, error = %e, "Failed to delete orphaned upload");
            }
        });
    }
}

fn uploaded_message(count: usize) -> String {
    if count == 1 {
        "1 image uploaded successfully".to_string()
    } else {
        format!("{} images uploaded successfully", count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ClientResult;
    use crate::image::notify::MemoryNotifier;
    use crate::image::registry::SlotStatus;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Store that answers instantly: files named `fail*` are rejected and
    /// files named `boom*` panic the upload task
    #[derive(Default)]
    struct InstantStore {
        deleted: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl ImageStore for InstantStore {
        async fn upload(&self, file: &ImageFile) -> Result<String, UploadError> {
            tokio::task::yield_now().await;
            if file.name().starts_with("boom") {
                panic!("store crashed on {}", file.name());
            }
            if file.name().starts_with("fail") {
                return Err(UploadError::Client(crate::ClientError::Api {
                    code: None,
                    status: 500,
                    message: "disk full".into(),
                }));
            }
            Ok(format!("https://cdn/{}", file.name()))
        }

        async fn delete(&self, image_url: &str) -> ClientResult<()> {
            self.deleted.lock().unwrap().push(image_url.to_string());
            Ok(())
        }
    }

    #[derive(Default)]
    struct Recorder {
        batches: Mutex<Vec<Vec<String>>>,
    }

    impl ProductImageListener for Recorder {
        fn on_upload(&self, urls: &[String]) {
            self.batches.lock().unwrap().push(urls.to_vec());
        }
        fn on_remove(&self, _url: &str) {}
    }

    fn file(name: &str) -> ImageFile {
        ImageFile::new(name, "image/png", vec![1u8; 8])
    }

    fn setup() -> (UploadOrchestrator, Arc<MemoryNotifier>, Arc<Recorder>) {
        let notifier = Arc::new(MemoryNotifier::new());
        let recorder = Arc::new(Recorder::default());
        let orchestrator = UploadOrchestrator::new(
            PreviewRegistry::new(),
            Arc::new(InstantStore::default()),
            notifier.clone(),
            recorder.clone(),
        );
        (orchestrator, notifier, recorder)
    }

    #[tokio::test]
    async fn test_placeholders_visible_before_uploads_run() {
        let (orchestrator, _, _) = setup();
        let handle = orchestrator.submit(vec![file("a.png"), file("b.png")]);

        // Nothing has been polled yet on the current-thread runtime
        let snapshot = orchestrator.registry().snapshot();
        assert_eq!(snapshot.len(), 2);
        assert!(snapshot.iter().all(|s| s.status == SlotStatus::Uploading));
        assert_eq!(handle.slot_ids().len(), 2);

        handle.wait().await;
    }

    #[tokio::test]
    async fn test_batch_success_reports_once() {
        let (orchestrator, notifier, recorder) = setup();
        let report = orchestrator
            .submit(vec![file("a.png"), file("b.png"), file("c.png")])
            .wait()
            .await;

        assert_eq!(
            report.uploaded,
            vec!["https://cdn/a.png", "https://cdn/b.png", "https://cdn/c.png"]
        );
        assert!(report.failed.is_empty());
        assert_eq!(notifier.successes(), vec!["3 images uploaded successfully"]);
        assert_eq!(recorder.batches.lock().unwrap().len(), 1);
        assert_eq!(orchestrator.registry().allocator().live(), 0);
    }

    #[tokio::test]
    async fn test_partial_failure() {
        let (orchestrator, notifier, recorder) = setup();
        let report = orchestrator
            .submit(vec![file("a.png"), file("fail.png")])
            .wait()
            .await;

        assert_eq!(report.uploaded, vec!["https://cdn/a.png"]);
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].file_name, "fail.png");
        assert_eq!(report.failed[0].message, "disk full");

        assert_eq!(notifier.errors(), vec!["Failed to upload fail.png: disk full"]);
        assert_eq!(notifier.successes(), vec!["1 image uploaded successfully"]);
        assert_eq!(
            recorder.batches.lock().unwrap().clone(),
            vec![vec!["https://cdn/a.png".to_string()]]
        );
        assert_eq!(orchestrator.registry().committed_urls(), vec!["https://cdn/a.png"]);
        assert_eq!(orchestrator.registry().len(), 1);
    }

    #[tokio::test]
    async fn test_full_failure_has_no_success_toast() {
        let (orchestrator, notifier, recorder) = setup();
        let report = orchestrator
            .submit(vec![file("fail-1.png"), file("fail-2.png")])
            .wait()
            .await;

        assert!(report.uploaded.is_empty());
        assert_eq!(notifier.errors().len(), 2);
        assert!(notifier.successes().is_empty());
        assert!(recorder.batches.lock().unwrap().is_empty());
        assert!(orchestrator.registry().is_empty());
    }

    #[tokio::test]
    async fn test_panicked_task_counts_as_failure() {
        let (orchestrator, notifier, recorder) = setup();
        let handle = orchestrator.submit(vec![file("a.png"), file("boom.png"), file("c.png")]);
        let boom_slot = handle.slot_ids()[1];
        let report = handle.wait().await;

        assert_eq!(report.uploaded, vec!["https://cdn/a.png", "https://cdn/c.png"]);
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].slot_id, boom_slot);
        assert_eq!(report.failed[0].file_name, "boom.png");
        assert_eq!(report.failed[0].message, "Upload failed");

        assert_eq!(notifier.errors(), vec!["Failed to upload boom.png: Upload failed"]);
        assert_eq!(notifier.successes(), vec!["2 images uploaded successfully"]);
        assert_eq!(recorder.batches.lock().unwrap().len(), 1);
        assert_eq!(
            orchestrator.registry().committed_urls(),
            vec!["https://cdn/a.png", "https://cdn/c.png"]
        );
        assert_eq!(orchestrator.registry().allocator().live(), 0);
    }

    #[tokio::test]
    async fn test_empty_batch() {
        let (orchestrator, notifier, _) = setup();
        let report = orchestrator.submit(Vec::new()).wait().await;
        assert!(report.is_empty());
        assert!(notifier.all().is_empty());
    }

    #[test]
    fn test_uploaded_message() {
        assert_eq!(uploaded_message(1), "1 image uploaded successfully");
        assert_eq!(uploaded_message(4), "4 images uploaded successfully");
    }
}
