//! Preview Registry - ordered image slots
//!
//! The registry is the single source of truth for what the image widget
//! renders and which URLs are committed. Slots keep their insertion order;
//! index 0 is the thumbnail.
//!
//! In-flight uploads are correlated with their slot through a [`SlotId`],
//! never through the slot position, so removals and other batches can reshape
//! the sequence while uploads are running.
//!
//! Every mutation happens under one lock and publishes exactly one new
//! snapshot, so subscribers never observe a half-applied change.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use shared::models::ProductImage;
use tokio::sync::watch;

use super::file::ImageFile;
use super::preview::{LocalPreview, PreviewAllocator};

/// Stable identifier of a slot, assigned at creation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SlotId(u64);

impl fmt::Display for SlotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "slot-{}", self.0)
    }
}

/// Slot lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotStatus {
    /// Placeholder created, upload not issued yet
    Pending,
    /// Upload request in flight
    Uploading,
    /// Backed by a server URL
    Confirmed,
}

impl SlotStatus {
    pub fn is_in_flight(&self) -> bool {
        matches!(self, SlotStatus::Pending | SlotStatus::Uploading)
    }
}

enum SlotSource {
    Local {
        preview: LocalPreview,
        file: ImageFile,
    },
    Remote(String),
}

struct ImageSlot {
    id: SlotId,
    status: SlotStatus,
    source: SlotSource,
}

impl ImageSlot {
    fn display_url(&self) -> &str {
        match &self.source {
            SlotSource::Local { preview, .. } => preview.url(),
            SlotSource::Remote(url) => url,
        }
    }

    fn view(&self) -> SlotView {
        SlotView {
            id: self.id,
            display_url: self.display_url().to_string(),
            status: self.status,
            file_name: match &self.source {
                SlotSource::Local { file, .. } => Some(file.name().to_string()),
                SlotSource::Remote(_) => None,
            },
        }
    }
}

/// Read-only copy of a slot for rendering
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotView {
    pub id: SlotId,
    pub display_url: String,
    pub status: SlotStatus,
    /// Original file name while the slot is in flight
    pub file_name: Option<String>,
}

/// A placeholder created for one accepted file
#[derive(Debug, Clone)]
pub struct PendingUpload {
    pub id: SlotId,
    pub file: ImageFile,
}

/// What a removed slot resolved to
#[derive(Debug)]
pub enum RemovedImage {
    /// Never reached the server; the preview is released when this is dropped
    Local { id: SlotId, preview: LocalPreview },
    /// Server-confirmed image
    Remote { id: SlotId, url: String },
}

impl RemovedImage {
    pub fn id(&self) -> SlotId {
        match self {
            RemovedImage::Local { id, .. } | RemovedImage::Remote { id, .. } => *id,
        }
    }

    pub fn url(&self) -> &str {
        match self {
            RemovedImage::Local { preview, .. } => preview.url(),
            RemovedImage::Remote { url, .. } => url,
        }
    }

    pub fn is_local(&self) -> bool {
        matches!(self, RemovedImage::Local { .. })
    }
}

struct RegistryState {
    slots: Vec<ImageSlot>,
}

/// Shared, ordered list of image slots
#[derive(Clone)]
pub struct PreviewRegistry {
    state: Arc<Mutex<RegistryState>>,
    next_id: Arc<AtomicU64>,
    allocator: PreviewAllocator,
    updates: watch::Sender<Vec<SlotView>>,
}

impl PreviewRegistry {
    pub fn new() -> Self {
        Self::with_allocator(PreviewAllocator::new())
    }

    pub fn with_allocator(allocator: PreviewAllocator) -> Self {
        let (updates, _) = watch::channel(Vec::new());
        Self {
            state: Arc::new(Mutex::new(RegistryState { slots: Vec::new() })),
            next_id: Arc::new(AtomicU64::new(1)),
            allocator,
            updates,
        }
    }

    /// Seed the registry with already-persisted image URLs, in order
    pub fn with_initial<I, S>(urls: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let registry = Self::new();
        {
            let mut state = registry.lock();
            for url in urls {
                let id = registry.next_slot_id();
                state.slots.push(ImageSlot {
                    id,
                    status: SlotStatus::Confirmed,
                    source: SlotSource::Remote(url.into()),
                });
            }
            registry.publish(&state);
        }
        registry
    }

    /// Seed from a product's persisted images, ordered by `display_order`
    pub fn from_product_images(images: &[ProductImage]) -> Self {
        Self::with_initial(ProductImage::ordered_urls(images))
    }

    fn lock(&self) -> MutexGuard<'_, RegistryState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn next_slot_id(&self) -> SlotId {
        SlotId(self.next_id.fetch_add(1, Ordering::Relaxed))
    }

    fn publish(&self, state: &RegistryState) {
        self.updates
            .send_replace(state.slots.iter().map(ImageSlot::view).collect());
    }

    /// Append one Pending slot per file, all in a single update
    pub fn append_pending(&self, files: Vec<ImageFile>) -> Vec<PendingUpload> {
        if files.is_empty() {
            return Vec::new();
        }

        let mut state = self.lock();
        let mut pending = Vec::with_capacity(files.len());
        for file in files {
            let id = self.next_slot_id();
            let preview = self.allocator.allocate(file.name());
            tracing::debug!(slot_id = %id, file = %file.name(), "Placeholder appended");
            pending.push(PendingUpload {
                id,
                file: file.clone(),
            });
            state.slots.push(ImageSlot {
                id,
                status: SlotStatus::Pending,
                source: SlotSource::Local { preview, file },
            });
        }
        self.publish(&state);
        pending
    }

    /// Mark the given Pending slots as Uploading, in a single update
    pub fn begin_uploads(&self, ids: &[SlotId]) {
        let mut state = self.lock();
        let mut changed = false;
        for slot in state.slots.iter_mut() {
            if slot.status == SlotStatus::Pending && ids.contains(&slot.id) {
                slot.status = SlotStatus::Uploading;
                changed = true;
            }
        }
        if changed {
            self.publish(&state);
        }
    }

    /// Swap an in-flight slot for its server URL, keeping its position
    ///
    /// Returns `false` when the slot no longer exists (removed while the
    /// upload was running); the confirmation is then dropped.
    pub fn confirm(&self, id: SlotId, url: impl Into<String>) -> bool {
        let mut state = self.lock();
        let Some(slot) = state
            .slots
            .iter_mut()
            .find(|s| s.id == id && s.status.is_in_flight())
        else {
            tracing::debug!(slot_id = %id, "Confirm ignored, slot gone");
            return false;
        };

        // Replacing the source drops the local preview
        slot.source = SlotSource::Remote(url.into());
        slot.status = SlotStatus::Confirmed;
        tracing::debug!(slot_id = %id, url = %slot.display_url(), "Slot confirmed");
        self.publish(&state);
        true
    }

    /// Drop an in-flight slot whose upload failed
    pub fn discard(&self, id: SlotId) -> bool {
        let mut state = self.lock();
        let Some(index) = state
            .slots
            .iter()
            .position(|s| s.id == id && s.status.is_in_flight())
        else {
            return false;
        };
        state.slots.remove(index);
        tracing::debug!(slot_id = %id, "Slot discarded");
        self.publish(&state);
        true
    }

    /// Remove the slot at `index`; out of range is a no-op
    pub fn remove(&self, index: usize) -> Option<RemovedImage> {
        let mut state = self.lock();
        if index >= state.slots.len() {
            return None;
        }
        let slot = state.slots.remove(index);
        self.publish(&state);

        tracing::debug!(slot_id = %slot.id, index, status = ?slot.status, "Slot removed");
        Some(match slot.source {
            SlotSource::Local { preview, .. } => RemovedImage::Local {
                id: slot.id,
                preview,
            },
            SlotSource::Remote(url) => RemovedImage::Remote { id: slot.id, url },
        })
    }

    /// Confirmed URLs in slot order; the first one is the thumbnail
    pub fn committed_urls(&self) -> Vec<String> {
        self.lock()
            .slots
            .iter()
            .filter_map(|s| match (&s.status, &s.source) {
                (SlotStatus::Confirmed, SlotSource::Remote(url)) => Some(url.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn snapshot(&self) -> Vec<SlotView> {
        self.lock().slots.iter().map(ImageSlot::view).collect()
    }

    /// Receive one snapshot per mutation
    pub fn subscribe(&self) -> watch::Receiver<Vec<SlotView>> {
        self.updates.subscribe()
    }

    pub fn len(&self) -> usize {
        self.lock().slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, id: SlotId) -> bool {
        self.lock().slots.iter().any(|s| s.id == id)
    }

    pub fn status_of(&self, id: SlotId) -> Option<SlotStatus> {
        self.lock()
            .slots
            .iter()
            .find(|s| s.id == id)
            .map(|s| s.status)
    }

    pub fn allocator(&self) -> &PreviewAllocator {
        &self.allocator
    }
}

impl Default for PreviewRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for PreviewRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PreviewRegistry")
            .field("slots", &self.snapshot())
            .field("live_previews", &self.allocator.live())
            .finish()
    }
}
