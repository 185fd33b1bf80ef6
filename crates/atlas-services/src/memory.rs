//! In-memory collaborators for tests and offline runs.
//!
//! Each fake counts its calls and can be switched into a failing mode that
//! answers every call with [`ServiceError::Unavailable`].

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use crate::error::{ServiceError, ServiceResult};
use crate::traits::{ImageFetcher, PhotoLibrary, PlaceLookup};
use crate::types::{
    AlbumSummary, Coordinates, GeocodedDestination, GeocodedPlace, PhotoRef, Suggestion,
};

fn mentions(suggestion: &Suggestion, text: &str) -> bool {
    suggestion
        .description
        .to_lowercase()
        .contains(&text.trim().to_lowercase())
}

fn check_failure(failure: &Mutex<Option<String>>) -> ServiceResult<()> {
    match failure.lock().expect("lock poisoned").as_ref() {
        Some(reason) => Err(ServiceError::Unavailable(reason.clone())),
        None => Ok(()),
    }
}

// ---------------------------------------------------------------------------
// Place lookup
// ---------------------------------------------------------------------------

/// Place lookup over a fixed set of destinations and places.
///
/// Suggestions match when their description contains the query text,
/// ignoring case.
#[derive(Default)]
pub struct InMemoryPlaceLookup {
    destinations: Vec<(Suggestion, GeocodedDestination)>,
    places: Vec<(Suggestion, GeocodedPlace)>,
    calls: AtomicUsize,
    failure: Mutex<Option<String>>,
}

impl InMemoryPlaceLookup {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_destination(
        mut self,
        suggestion: Suggestion,
        geocoded: GeocodedDestination,
    ) -> Self {
        self.destinations.push((suggestion, geocoded));
        self
    }

    pub fn with_place(mut self, suggestion: Suggestion, geocoded: GeocodedPlace) -> Self {
        self.places.push((suggestion, geocoded));
        self
    }

    /// Fail every subsequent call with `reason`, or stop failing with `None`.
    pub fn set_failure(&self, reason: Option<&str>) {
        *self.failure.lock().expect("lock poisoned") = reason.map(str::to_string);
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn begin(&self) -> ServiceResult<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        check_failure(&self.failure)
    }
}

#[async_trait]
impl PlaceLookup for InMemoryPlaceLookup {
    async fn suggest_destinations(&self, text: &str) -> ServiceResult<Vec<Suggestion>> {
        self.begin()?;
        Ok(self
            .destinations
            .iter()
            .filter(|(s, _)| mentions(s, text))
            .map(|(s, _)| s.clone())
            .collect())
    }

    async fn suggest_places(
        &self,
        text: &str,
        _near: Option<Coordinates>,
    ) -> ServiceResult<Vec<Suggestion>> {
        self.begin()?;
        Ok(self
            .places
            .iter()
            .filter(|(s, _)| mentions(s, text))
            .map(|(s, _)| s.clone())
            .collect())
    }

    async fn geocode_destination(&self, place_id: &str) -> ServiceResult<GeocodedDestination> {
        self.begin()?;
        self.destinations
            .iter()
            .find(|(_, g)| g.place_id == place_id)
            .map(|(_, g)| g.clone())
            .ok_or_else(|| ServiceError::NotFound {
                kind: "destination",
                id: place_id.to_string(),
            })
    }

    async fn geocode_place(&self, place_id: &str) -> ServiceResult<GeocodedPlace> {
        self.begin()?;
        self.places
            .iter()
            .find(|(_, g)| g.place_id == place_id)
            .map(|(_, g)| g.clone())
            .ok_or_else(|| ServiceError::NotFound {
                kind: "place",
                id: place_id.to_string(),
            })
    }
}

// ---------------------------------------------------------------------------
// Photo library
// ---------------------------------------------------------------------------

struct LibraryAlbum {
    summary: AlbumSummary,
    photos: Vec<(PhotoRef, Vec<u8>)>,
}

/// Photo library holding albums and photo bytes in memory.
#[derive(Default)]
pub struct InMemoryPhotoLibrary {
    albums: Mutex<Vec<LibraryAlbum>>,
    listing_delay: Option<Duration>,
    album_listings: AtomicUsize,
    photo_fetches: AtomicUsize,
    failure: Mutex<Option<String>>,
}

impl InMemoryPhotoLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Delay `list_albums` by `delay`, to exercise waiting on the preload.
    pub fn with_listing_delay(mut self, delay: Duration) -> Self {
        self.listing_delay = Some(delay);
        self
    }

    /// Add an album with its photos and their bytes, in library order.
    pub fn add_album(&self, id: &str, title: &str, photos: Vec<(PhotoRef, Vec<u8>)>) {
        let summary = AlbumSummary {
            id: id.to_string(),
            title: title.to_string(),
            media_items_count: Some(photos.len() as u64),
        };
        self.albums
            .lock()
            .expect("lock poisoned")
            .push(LibraryAlbum { summary, photos });
    }

    pub fn set_failure(&self, reason: Option<&str>) {
        *self.failure.lock().expect("lock poisoned") = reason.map(str::to_string);
    }

    /// Number of completed or attempted `list_albums` calls.
    pub fn album_listing_count(&self) -> usize {
        self.album_listings.load(Ordering::SeqCst)
    }

    /// Number of `fetch_photo` calls.
    pub fn photo_fetch_count(&self) -> usize {
        self.photo_fetches.load(Ordering::SeqCst)
    }

    fn not_found(album_id: &str) -> ServiceError {
        ServiceError::NotFound {
            kind: "album",
            id: album_id.to_string(),
        }
    }
}

#[async_trait]
impl PhotoLibrary for InMemoryPhotoLibrary {
    async fn list_albums(&self) -> ServiceResult<Vec<AlbumSummary>> {
        self.album_listings.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.listing_delay {
            tokio::time::sleep(delay).await;
        }
        check_failure(&self.failure)?;
        Ok(self
            .albums
            .lock()
            .expect("lock poisoned")
            .iter()
            .map(|a| a.summary.clone())
            .collect())
    }

    async fn album_info(&self, album_id: &str) -> ServiceResult<AlbumSummary> {
        check_failure(&self.failure)?;
        self.albums
            .lock()
            .expect("lock poisoned")
            .iter()
            .find(|a| a.summary.id == album_id)
            .map(|a| a.summary.clone())
            .ok_or_else(|| Self::not_found(album_id))
    }

    async fn list_album_photos(&self, album_id: &str) -> ServiceResult<Vec<PhotoRef>> {
        check_failure(&self.failure)?;
        self.albums
            .lock()
            .expect("lock poisoned")
            .iter()
            .find(|a| a.summary.id == album_id)
            .map(|a| a.photos.iter().map(|(p, _)| p.clone()).collect())
            .ok_or_else(|| Self::not_found(album_id))
    }

    async fn fetch_photo(&self, photo: &PhotoRef) -> ServiceResult<Vec<u8>> {
        self.photo_fetches.fetch_add(1, Ordering::SeqCst);
        check_failure(&self.failure)?;
        self.albums
            .lock()
            .expect("lock poisoned")
            .iter()
            .flat_map(|a| a.photos.iter())
            .find(|(p, _)| p.id == photo.id)
            .map(|(_, bytes)| bytes.clone())
            .ok_or_else(|| ServiceError::NotFound {
                kind: "photo",
                id: photo.id.clone(),
            })
    }
}

// ---------------------------------------------------------------------------
// Image fetcher
// ---------------------------------------------------------------------------

/// Image fetcher serving a fixed URL map.
#[derive(Default)]
pub struct InMemoryImageFetcher {
    images: Mutex<HashMap<String, Vec<u8>>>,
    fetches: AtomicUsize,
}

impl InMemoryImageFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, url: &str, bytes: Vec<u8>) {
        self.images
            .lock()
            .expect("lock poisoned")
            .insert(url.to_string(), bytes);
    }

    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ImageFetcher for InMemoryImageFetcher {
    async fn fetch(&self, url: &str) -> ServiceResult<Vec<u8>> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        self.images
            .lock()
            .expect("lock poisoned")
            .get(url)
            .cloned()
            .ok_or_else(|| ServiceError::NotFound {
                kind: "image",
                id: url.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use atlas_types::Decimal;
    use chrono::{TimeZone, Utc};

    fn suggestion(place_id: &str, description: &str) -> Suggestion {
        Suggestion {
            place_id: place_id.into(),
            description: description.into(),
            main_text: description.into(),
            secondary_text: String::new(),
        }
    }

    fn paris() -> GeocodedDestination {
        GeocodedDestination {
            place_id: "paris123".into(),
            name: "Paris".into(),
            country: "France".into(),
            country_code: "FR".into(),
            latitude: Decimal::new(48856614, 6),
            longitude: Decimal::new(2352222, 6),
            kind: "locality".into(),
        }
    }

    fn photo(id: &str) -> PhotoRef {
        PhotoRef {
            id: id.into(),
            base_url: format!("https://lh3.example/{id}"),
            filename: format!("{id}.jpg"),
            creation_time: Utc.with_ymd_and_hms(2023, 5, 1, 10, 0, 0).unwrap(),
        }
    }

    #[tokio::test]
    async fn lookup_filters_by_text_and_geocodes() {
        let lookup = InMemoryPlaceLookup::new()
            .with_destination(suggestion("paris123", "Paris, France"), paris());

        assert_eq!(lookup.suggest_destinations("par").await.unwrap().len(), 1);
        assert!(lookup.suggest_destinations("rome").await.unwrap().is_empty());
        assert_eq!(lookup.geocode_destination("paris123").await.unwrap().name, "Paris");
        assert!(matches!(
            lookup.geocode_destination("nope").await.unwrap_err(),
            ServiceError::NotFound { .. }
        ));
        assert_eq!(lookup.call_count(), 4);
    }

    #[tokio::test]
    async fn failing_lookup_is_unavailable() {
        let lookup = InMemoryPlaceLookup::new();
        lookup.set_failure(Some("offline"));
        let err = lookup.suggest_destinations("x").await.unwrap_err();
        assert!(matches!(err, ServiceError::Unavailable(_)));
        lookup.set_failure(None);
        assert!(lookup.suggest_destinations("x").await.is_ok());
    }

    #[tokio::test]
    async fn library_lists_and_fetches_in_order() {
        let library = InMemoryPhotoLibrary::new();
        library.add_album(
            "alb1",
            "Paris -- Eiffel Tower",
            vec![(photo("p1"), vec![1]), (photo("p2"), vec![2])],
        );

        let albums = library.list_albums().await.unwrap();
        assert_eq!(albums[0].media_items_count, Some(2));

        let photos = library.list_album_photos("alb1").await.unwrap();
        let ids: Vec<&str> = photos.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["p1", "p2"]);
        assert_eq!(library.fetch_photo(&photos[1]).await.unwrap(), vec![2]);
        assert_eq!(library.photo_fetch_count(), 1);
        assert_eq!(library.album_listing_count(), 1);
    }

    #[tokio::test]
    async fn fetcher_serves_known_urls() {
        let fetcher = InMemoryImageFetcher::new();
        fetcher.insert("https://logo.example/acme.png", vec![9, 9]);
        assert_eq!(
            fetcher.fetch("https://logo.example/acme.png").await.unwrap(),
            vec![9, 9]
        );
        assert!(fetcher.fetch("https://logo.example/missing.png").await.is_err());
        assert_eq!(fetcher.fetch_count(), 2);
    }
}
