//! Product image uploads
//!
//! - [`validator`]: per-file type/size checks before any I/O
//! - [`registry`]: ordered slots backing the widget
//! - [`orchestrator`]: concurrent uploads reconciled by [`SlotId`]
//! - [`removal`]: user removals, local or remote
//! - [`uploader`]: the widget facade tying them together

pub mod file;
pub mod listener;
pub mod notify;
pub mod orchestrator;
pub mod preview;
pub mod registry;
pub mod removal;
pub mod store;
pub mod uploader;
pub mod validator;

pub use file::ImageFile;
pub use listener::ProductImageListener;
pub use notify::{ChannelNotifier, MemoryNotifier, NotificationSink, TracingNotifier};
pub use orchestrator::{BatchHandle, BatchReport, FailedUpload, UploadOrchestrator};
pub use preview::{LocalPreview, PreviewAllocator, is_local_preview};
pub use registry::{PendingUpload, PreviewRegistry, RemovedImage, SlotId, SlotStatus, SlotView};
pub use removal::{RemovalCoordinator, RemovalOutcome};
pub use store::{HttpImageStore, ImageStore, UploadError};
pub use uploader::ImageUploader;
pub use validator::{RejectReason, ValidationOutcome};
