//! Image dimension probing

use async_trait::async_trait;
use image::GenericImageView;

use crate::error::MediaError;

/// Resolves an image URL to its natural dimensions.
#[async_trait]
pub trait ImageProbe: Send + Sync {
    /// Natural `(width, height)` of the image at `url`.
    async fn dimensions(&self, url: &str) -> Result<(u32, u32), MediaError>;
}

/// HTTP probe: fetches the image bytes and decodes only the dimensions.
pub struct HttpImageProbe {
    client: reqwest::Client,
}

impl HttpImageProbe {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

impl Default for HttpImageProbe {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ImageProbe for HttpImageProbe {
    async fn dimensions(&self, url: &str) -> Result<(u32, u32), MediaError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| MediaError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(MediaError::Network(format!("HTTP error: {status}")));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| MediaError::Network(e.to_string()))?;

        let img = image::load_from_memory(&bytes)?;
        Ok(img.dimensions())
    }
}
