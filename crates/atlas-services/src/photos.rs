use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, instrument};

use crate::error::{ServiceError, ServiceResult};
use crate::traits::PhotoLibrary;
use crate::types::{AlbumSummary, PhotoRef};

const DEFAULT_BASE_URL: &str = "https://photoslibrary.googleapis.com/v1";
const SERVICE: &str = "google photos";

/// Items requested per page for album and media listings.
pub const PAGE_SIZE: u32 = 50;

/// Client for the Google Photos Library API.
///
/// Authenticates with a pre-issued OAuth access token.
pub struct GooglePhotosClient {
    http: reqwest::Client,
    access_token: String,
    base_url: String,
}

impl GooglePhotosClient {
    pub fn new(access_token: impl Into<String>) -> Self {
        Self::with_base_url(access_token, DEFAULT_BASE_URL)
    }

    pub fn with_base_url(access_token: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            access_token: access_token.into(),
            base_url: base_url.into(),
        }
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> ServiceResult<Value> {
        let response = request.bearer_auth(&self.access_token).send().await?;
        let status = response.status();
        let body: Value = response.json().await?;
        if !status.is_success() {
            let message = body
                .get("error")
                .and_then(|e| e.get("message"))
                .and_then(Value::as_str)
                .unwrap_or("Unknown error")
                .to_string();
            return Err(ServiceError::Api {
                service: SERVICE,
                status: status.as_u16(),
                message,
            });
        }
        Ok(body)
    }
}

impl std::fmt::Debug for GooglePhotosClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GooglePhotosClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl PhotoLibrary for GooglePhotosClient {
    #[instrument(skip(self))]
    async fn list_albums(&self) -> ServiceResult<Vec<AlbumSummary>> {
        let mut albums = Vec::new();
        let mut page_token: Option<String> = None;
        loop {
            let mut request = self
                .http
                .get(format!("{}/albums", self.base_url))
                .query(&[("pageSize", PAGE_SIZE.to_string())]);
            if let Some(token) = &page_token {
                request = request.query(&[("pageToken", token.as_str())]);
            }
            let (page, next) = parse_album_page(self.send(request).await?)?;
            albums.extend(page);
            match next {
                Some(token) => page_token = Some(token),
                None => break,
            }
        }
        debug!(count = albums.len(), "listed albums");
        Ok(albums)
    }

    #[instrument(skip(self))]
    async fn album_info(&self, album_id: &str) -> ServiceResult<AlbumSummary> {
        let request = self.http.get(format!("{}/albums/{}", self.base_url, album_id));
        parse_album(self.send(request).await?)
    }

    #[instrument(skip(self))]
    async fn list_album_photos(&self, album_id: &str) -> ServiceResult<Vec<PhotoRef>> {
        let mut photos = Vec::new();
        let mut page_token: Option<String> = None;
        loop {
            let mut body = json!({ "albumId": album_id, "pageSize": PAGE_SIZE });
            if let Some(token) = &page_token {
                body["pageToken"] = Value::String(token.clone());
            }
            let request = self
                .http
                .post(format!("{}/mediaItems:search", self.base_url))
                .json(&body);
            let (page, next) = parse_media_page(self.send(request).await?)?;
            photos.extend(page);
            match next {
                Some(token) => page_token = Some(token),
                None => break,
            }
        }
        debug!(count = photos.len(), "listed album photos");
        Ok(photos)
    }

    #[instrument(skip(self, photo), fields(photo_id = %photo.id))]
    async fn fetch_photo(&self, photo: &PhotoRef) -> ServiceResult<Vec<u8>> {
        let response = self.http.get(photo.download_url()).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ServiceError::Api {
                service: SERVICE,
                status: status.as_u16(),
                message: format!("download of {} failed", photo.id),
            });
        }
        Ok(response.bytes().await?.to_vec())
    }
}

// ---------------------------------------------------------------------------
// Wire format
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AlbumWire {
    id: String,
    #[serde(default)]
    title: String,
    #[serde(default)]
    media_items_count: Option<String>,
}

impl From<AlbumWire> for AlbumSummary {
    fn from(wire: AlbumWire) -> Self {
        Self {
            id: wire.id,
            title: wire.title,
            media_items_count: wire.media_items_count.and_then(|c| c.parse().ok()),
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AlbumPage {
    #[serde(default)]
    albums: Vec<AlbumWire>,
    #[serde(default)]
    next_page_token: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct MediaPage {
    #[serde(default)]
    media_items: Vec<MediaItem>,
    #[serde(default)]
    next_page_token: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct MediaItem {
    id: String,
    base_url: String,
    #[serde(default)]
    filename: String,
    media_metadata: MediaMetadata,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct MediaMetadata {
    creation_time: DateTime<Utc>,
}

fn next_token(token: Option<String>) -> Option<String> {
    token.filter(|t| !t.is_empty())
}

fn decode<T: DeserializeOwned>(body: Value) -> ServiceResult<T> {
    serde_json::from_value(body).map_err(|e| ServiceError::unexpected(SERVICE, e.to_string()))
}

/// Parse one page of the album listing into albums and the next page token.
pub fn parse_album_page(body: Value) -> ServiceResult<(Vec<AlbumSummary>, Option<String>)> {
    let page: AlbumPage = decode(body)?;
    Ok((
        page.albums.into_iter().map(AlbumSummary::from).collect(),
        next_token(page.next_page_token),
    ))
}

pub fn parse_album(body: Value) -> ServiceResult<AlbumSummary> {
    Ok(decode::<AlbumWire>(body)?.into())
}

/// Parse one page of an album's media items.
pub fn parse_media_page(body: Value) -> ServiceResult<(Vec<PhotoRef>, Option<String>)> {
    let page: MediaPage = decode(body)?;
    let photos = page
        .media_items
        .into_iter()
        .map(|item| PhotoRef {
            id: item.id,
            base_url: item.base_url,
            filename: item.filename,
            creation_time: item.media_metadata.creation_time,
        })
        .collect();
    Ok((photos, next_token(page.next_page_token)))
}
