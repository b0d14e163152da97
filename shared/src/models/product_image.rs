//! Product Image Model

use serde::{Deserialize, Serialize};

/// One persisted product image
///
/// `is_thumbnail` and `display_order` are positional: they are re-derived from
/// the ordered URL list every time a product payload is built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductImage {
    pub image_url: String,
    #[serde(default)]
    pub is_thumbnail: bool,
    #[serde(default)]
    pub display_order: u32,
}

impl ProductImage {
    /// Build the image list for an ordered set of URLs (index 0 = thumbnail)
    pub fn from_ordered_urls<I, S>(urls: I) -> Vec<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        urls.into_iter()
            .enumerate()
            .map(|(index, url)| Self {
                image_url: url.into(),
                is_thumbnail: index == 0,
                display_order: index as u32,
            })
            .collect()
    }

    /// Sort persisted images by `display_order` and return their URLs
    pub fn ordered_urls(images: &[ProductImage]) -> Vec<String> {
        let mut sorted: Vec<&ProductImage> = images.iter().collect();
        sorted.sort_by_key(|img| img.display_order);
        sorted.into_iter().map(|img| img.image_url.clone()).collect()
    }
}

/// Response body of the image upload endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageUploadResponse {
    pub image_url: String,
}

/// Request body of the image delete endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageDeleteRequest {
    pub image_url: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_ordered_urls_derives_thumbnail() {
        let images = ProductImage::from_ordered_urls(["a", "b", "c"]);
        assert_eq!(images.len(), 3);
        assert!(images[0].is_thumbnail);
        assert!(!images[1].is_thumbnail);
        assert_eq!(images[2].display_order, 2);
        assert_eq!(images[2].image_url, "c");
    }

    #[test]
    fn test_ordered_urls_sorts_by_display_order() {
        let images = vec![
            ProductImage {
                image_url: "second".into(),
                is_thumbnail: false,
                display_order: 1,
            },
            ProductImage {
                image_url: "first".into(),
                is_thumbnail: true,
                display_order: 0,
            },
        ];
        assert_eq!(ProductImage::ordered_urls(&images), vec!["first", "second"]);
    }

    #[test]
    fn test_camel_case_wire_format() {
        let image = ProductImage {
            image_url: "https://cdn/x.jpg".into(),
            is_thumbnail: true,
            display_order: 0,
        };
        let json = serde_json::to_string(&image).unwrap();
        assert_eq!(
            json,
            r#"{"imageUrl":"https://cdn/x.jpg","isThumbnail":true,"displayOrder":0}"#
        );

        let resp: ImageUploadResponse =
            serde_json::from_str(r#"{"imageUrl":"https://cdn/y.png"}"#).unwrap();
        assert_eq!(resp.image_url, "https://cdn/y.png");
    }
}
