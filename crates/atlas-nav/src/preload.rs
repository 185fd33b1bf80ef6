//! Background loading of the photo-library album listing.
//!
//! The listing is slow, so it starts once at startup and runs while the
//! operator navigates menus. Steps that need it await [`AlbumPreload::albums`],
//! the only join point; exiting calls [`AlbumPreload::cancel`].

use std::sync::Arc;

use atlas_services::{AlbumSummary, PhotoLibrary, ServiceError, ServiceResult};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::error::{NavError, NavResult};

enum PreloadState {
    Pending(JoinHandle<ServiceResult<Vec<AlbumSummary>>>),
    Ready(Arc<Vec<AlbumSummary>>),
    Failed(String),
    Cancelled,
}

/// The album listing, loading or loaded.
pub struct AlbumPreload {
    state: Mutex<PreloadState>,
}

impl AlbumPreload {
    /// Spawn the listing on the current runtime.
    pub fn start(library: Arc<dyn PhotoLibrary>) -> Self {
        let handle = tokio::spawn(async move {
            let albums = library.list_albums().await;
            match &albums {
                Ok(list) => info!(count = list.len(), "album listing loaded"),
                Err(e) => warn!(error = %e, "album listing failed"),
            }
            albums
        });
        Self {
            state: Mutex::new(PreloadState::Pending(handle)),
        }
    }

    /// A listing that is already complete.
    pub fn ready(albums: Vec<AlbumSummary>) -> Self {
        Self {
            state: Mutex::new(PreloadState::Ready(Arc::new(albums))),
        }
    }

    /// Wait for the listing to finish and return it.
    ///
    /// A failed listing is reported on every call.
    pub async fn albums(&self) -> NavResult<Arc<Vec<AlbumSummary>>> {
        let mut state = self.state.lock().await;
        if let PreloadState::Pending(handle) = &mut *state {
            debug!("waiting for album listing");
            *state = match handle.await {
                Ok(Ok(albums)) => PreloadState::Ready(Arc::new(albums)),
                Ok(Err(e)) => PreloadState::Failed(e.to_string()),
                Err(e) if e.is_cancelled() => PreloadState::Cancelled,
                Err(e) => PreloadState::Failed(format!("album listing task failed: {e}")),
            };
        }
        match &*state {
            PreloadState::Ready(albums) => Ok(Arc::clone(albums)),
            PreloadState::Failed(reason) => Err(ServiceError::Unavailable(reason.clone()).into()),
            PreloadState::Cancelled => Err(NavError::Upstream(ServiceError::Unavailable(
                "album listing was cancelled".into(),
            ))),
            PreloadState::Pending(_) => Err(ServiceError::Unavailable(
                "album listing is still pending".into(),
            )
            .into()),
        }
    }

    /// Whether [`albums`](Self::albums) would return without waiting.
    pub async fn is_loaded(&self) -> bool {
        match &*self.state.lock().await {
            PreloadState::Pending(handle) => handle.is_finished(),
            _ => true,
        }
    }

    /// Abort the listing if it is still running.
    pub async fn cancel(&self) {
        let mut state = self.state.lock().await;
        if let PreloadState::Pending(handle) = &*state {
            if !handle.is_finished() {
                handle.abort();
                info!("album listing cancelled");
                *state = PreloadState::Cancelled;
            }
        }
    }
}

impl std::fmt::Debug for AlbumPreload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AlbumPreload").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use atlas_services::InMemoryPhotoLibrary;
    use std::time::Duration;

    #[tokio::test]
    async fn albums_waits_for_the_listing() {
        let library = InMemoryPhotoLibrary::new().with_listing_delay(Duration::from_millis(20));
        library.add_album("alb1", "Paris -- Eiffel Tower", Vec::new());
        let library = Arc::new(library);

        let preload = AlbumPreload::start(library.clone());
        let albums = preload.albums().await.unwrap();
        assert_eq!(albums.len(), 1);
        assert_eq!(albums[0].id, "alb1");

        // The listing runs once no matter how often it is awaited.
        preload.albums().await.unwrap();
        assert_eq!(library.album_listing_count(), 1);
        assert!(preload.is_loaded().await);
    }

    #[tokio::test]
    async fn failure_is_reported_as_upstream() {
        let library = InMemoryPhotoLibrary::new();
        library.set_failure(Some("token expired"));
        let preload = AlbumPreload::start(Arc::new(library));
        let err = preload.albums().await.unwrap_err();
        assert!(matches!(err, NavError::Upstream(_)));
        assert!(err.to_string().contains("token expired"));
    }

    #[tokio::test]
    async fn cancel_stops_a_running_listing() {
        let library = InMemoryPhotoLibrary::new().with_listing_delay(Duration::from_secs(30));
        let preload = AlbumPreload::start(Arc::new(library));
        preload.cancel().await;
        let err = preload.albums().await.unwrap_err();
        assert!(err.to_string().contains("cancelled"));
    }

    #[tokio::test]
    async fn ready_listing_needs_no_runtime_task() {
        let preload = AlbumPreload::ready(Vec::new());
        assert!(preload.is_loaded().await);
        assert!(preload.albums().await.unwrap().is_empty());
        preload.cancel().await;
    }
}
