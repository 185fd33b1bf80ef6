//! External collaborators for Atlas.
//!
//! The curation workflows depend on three outside services, each behind a
//! narrow async trait so the workflows can be driven by in-memory fakes:
//!
//! - [`PlaceLookup`] -- place autocomplete and geocoding
//!   ([`GoogleMapsClient`], [`InMemoryPlaceLookup`])
//! - [`PhotoLibrary`] -- album listing and photo download
//!   ([`GooglePhotosClient`], [`InMemoryPhotoLibrary`])
//! - [`ImageFetcher`] -- plain URL download ([`HttpImageFetcher`],
//!   [`InMemoryImageFetcher`])
//!
//! No call is retried; every failure is returned as a [`ServiceError`].

pub mod error;
pub mod fetch;
pub mod maps;
pub mod memory;
pub mod photos;
pub mod traits;
pub mod types;

pub use error::{ServiceError, ServiceResult};
pub use fetch::HttpImageFetcher;
pub use maps::GoogleMapsClient;
pub use memory::{InMemoryImageFetcher, InMemoryPhotoLibrary, InMemoryPlaceLookup};
pub use photos::GooglePhotosClient;
pub use traits::{ImageFetcher, PhotoLibrary, PlaceLookup};
pub use types::{
    AlbumSummary, Coordinates, GeocodedDestination, GeocodedPlace, PhotoRef, Suggestion,
};
