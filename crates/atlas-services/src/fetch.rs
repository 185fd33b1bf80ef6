use async_trait::async_trait;
use tracing::instrument;

use crate::error::{ServiceError, ServiceResult};
use crate::traits::ImageFetcher;

/// Downloads images over plain HTTP(S).
#[derive(Clone, Debug, Default)]
pub struct HttpImageFetcher {
    http: reqwest::Client,
}

impl HttpImageFetcher {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ImageFetcher for HttpImageFetcher {
    #[instrument(skip(self))]
    async fn fetch(&self, url: &str) -> ServiceResult<Vec<u8>> {
        let response = self.http.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ServiceError::Api {
                service: "image download",
                status: status.as_u16(),
                message: format!("GET {url} failed"),
            });
        }
        Ok(response.bytes().await?.to_vec())
    }
}
