use async_trait::async_trait;

use crate::error::ServiceResult;
use crate::types::{
    AlbumSummary, Coordinates, GeocodedDestination, GeocodedPlace, PhotoRef, Suggestion,
};

/// Place autocomplete and geocoding.
#[async_trait]
pub trait PlaceLookup: Send + Sync {
    /// City-level candidates for free text.
    async fn suggest_destinations(&self, text: &str) -> ServiceResult<Vec<Suggestion>>;

    /// Point-of-interest candidates for free text, biased towards `near`.
    async fn suggest_places(
        &self,
        text: &str,
        near: Option<Coordinates>,
    ) -> ServiceResult<Vec<Suggestion>>;

    async fn geocode_destination(&self, place_id: &str) -> ServiceResult<GeocodedDestination>;

    async fn geocode_place(&self, place_id: &str) -> ServiceResult<GeocodedPlace>;
}

/// The operator's photo library.
#[async_trait]
pub trait PhotoLibrary: Send + Sync {
    /// Every album, all pages.
    async fn list_albums(&self) -> ServiceResult<Vec<AlbumSummary>>;

    async fn album_info(&self, album_id: &str) -> ServiceResult<AlbumSummary>;

    /// Photos of an album, in library order.
    async fn list_album_photos(&self, album_id: &str) -> ServiceResult<Vec<PhotoRef>>;

    /// Original-resolution bytes of one photo.
    async fn fetch_photo(&self, photo: &PhotoRef) -> ServiceResult<Vec<u8>>;
}

/// Download of arbitrary image URLs (resume logos).
#[async_trait]
pub trait ImageFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> ServiceResult<Vec<u8>>;
}
