//! Callbacks into the product form that owns the image list

/// Receives committed image changes
///
/// `on_upload` gets only the URLs committed by one batch, in slot order;
/// the form appends them to its own list.
pub trait ProductImageListener: Send + Sync {
    fn on_upload(&self, urls: &[String]);
    fn on_remove(&self, url: &str);
}

/// Listener that ignores everything
impl ProductImageListener for () {
    fn on_upload(&self, _urls: &[String]) {}
    fn on_remove(&self, _url: &str) {}
}
