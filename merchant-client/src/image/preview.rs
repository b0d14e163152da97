//! Transient local previews
//!
//! A [`LocalPreview`] stands in for an image that has not reached the server
//! yet. Each handle is owned by exactly one slot and is released when dropped,
//! so it cannot be read after release and cannot be released twice.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use uuid::Uuid;

/// URL scheme used for local previews
pub const LOCAL_PREVIEW_PREFIX: &str = "blob:local/";

#[derive(Debug, Default)]
struct AllocatorInner {
    live: AtomicUsize,
    released: AtomicUsize,
}

/// Hands out [`LocalPreview`] handles and tracks how many are alive
#[derive(Debug, Clone, Default)]
pub struct PreviewAllocator {
    inner: Arc<AllocatorInner>,
}

impl PreviewAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a preview for a file about to be uploaded
    pub fn allocate(&self, file_name: &str) -> LocalPreview {
        self.inner.live.fetch_add(1, Ordering::SeqCst);
        let url = format!("{}{}", LOCAL_PREVIEW_PREFIX, Uuid::new_v4());
        tracing::trace!(file = %file_name, url = %url, "Local preview allocated");
        LocalPreview {
            url,
            allocator: self.inner.clone(),
        }
    }

    /// Number of previews not yet released
    pub fn live(&self) -> usize {
        self.inner.live.load(Ordering::SeqCst)
    }

    /// Number of previews released so far
    pub fn released(&self) -> usize {
        self.inner.released.load(Ordering::SeqCst)
    }
}

/// Whether `url` is a local preview reference rather than a server URL
pub fn is_local_preview(url: &str) -> bool {
    url.starts_with(LOCAL_PREVIEW_PREFIX)
}

/// Owned handle to a local preview; released on drop
#[derive(Debug)]
pub struct LocalPreview {
    url: String,
    allocator: Arc<AllocatorInner>,
}

impl LocalPreview {
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Release the preview, returning the URL it had for bookkeeping
    pub fn release(self) -> String {
        self.url.clone()
    }
}

impl Drop for LocalPreview {
    fn drop(&mut self) {
        self.allocator.live.fetch_sub(1, Ordering::SeqCst);
        self.allocator.released.fetch_add(1, Ordering::SeqCst);
        tracing::trace!(url = %self.url, "Local preview released");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allocate_and_drop() {
        let allocator = PreviewAllocator::new();
        let a = allocator.allocate("a.png");
        let b = allocator.allocate("b.png");
        assert_eq!(allocator.live(), 2);
        assert_ne!(a.url(), b.url());
        assert!(is_local_preview(a.url()));

        drop(a);
        assert_eq!(allocator.live(), 1);
        assert_eq!(allocator.released(), 1);

        let url = b.release();
        assert!(url.starts_with(LOCAL_PREVIEW_PREFIX));
        assert_eq!(allocator.live(), 0);
        assert_eq!(allocator.released(), 2);
    }

    #[test]
    fn test_server_url_is_not_local() {
        assert!(!is_local_preview("https://cdn.shop/images/1.jpg"));
    }
}
