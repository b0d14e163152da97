//! Product form image state and the product endpoints

use std::sync::Mutex;

use shared::models::{Product, ProductCreate, ProductImage, ProductUpdate};

use crate::ClientResult;
use crate::http::NetworkHttpClient;
use crate::image::ProductImageListener;

/// Image URLs held by the product form
///
/// Fed by the upload widget through [`ProductImageListener`]. Thumbnail and
/// display order are derived from position only when the payload is built.
#[derive(Debug, Default)]
pub struct ProductImageForm {
    urls: Mutex<Vec<String>>,
}

impl ProductImageForm {
    pub fn new() -> Self {
        Self::default()
    }

    /// Form for editing an existing product
    pub fn from_product(product: &Product) -> Self {
        Self::from_images(&product.images)
    }

    pub fn from_images(images: &[ProductImage]) -> Self {
        Self {
            urls: Mutex::new(ProductImage::ordered_urls(images)),
        }
    }

    pub fn urls(&self) -> Vec<String> {
        self.urls.lock().map(|u| u.clone()).unwrap_or_default()
    }

    /// Replace the list, e.g. with the widget's committed URLs
    pub fn set_urls(&self, urls: Vec<String>) {
        if let Ok(mut current) = self.urls.lock() {
            *current = urls;
        }
    }

    /// Image list for submission (index 0 = thumbnail)
    pub fn to_payload(&self) -> Vec<ProductImage> {
        ProductImage::from_ordered_urls(self.urls())
    }

    pub fn fill_create(&self, mut create: ProductCreate) -> ProductCreate {
        create.images = self.to_payload();
        create
    }

    pub fn fill_update(&self, mut update: ProductUpdate) -> ProductUpdate {
        update.images = Some(self.to_payload());
        update
    }
}

impl ProductImageListener for ProductImageForm {
    fn on_upload(&self, urls: &[String]) {
        if let Ok(mut current) = self.urls.lock() {
            current.extend(urls.iter().cloned());
        }
    }

    fn on_remove(&self, url: &str) {
        if let Ok(mut current) = self.urls.lock()
            && let Some(pos) = current.iter().position(|u| u == url)
        {
            current.remove(pos);
        }
    }
}

/// Product endpoints
#[derive(Debug, Clone)]
pub struct ProductApi {
    http: NetworkHttpClient,
}

impl ProductApi {
    pub fn new(http: NetworkHttpClient) -> Self {
        Self { http }
    }

    pub async fn get_product(&self, id: &str) -> ClientResult<Product> {
        self.http.get(&format!("api/products/{}", id)).await
    }

    pub async fn create_product(&self, product: &ProductCreate) -> ClientResult<Product> {
        tracing::info!(name = %product.name, images = product.images.len(), "Creating product");
        self.http.post("api/products", product).await
    }

    pub async fn update_product(&self, id: &str, update: &ProductUpdate) -> ClientResult<Product> {
        tracing::info!(product_id = %id, "Updating product");
        self.http.put(&format!("api/products/{}", id), update).await
    }
}
