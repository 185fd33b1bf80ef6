//! Media pipeline for Atlas.
//!
//! Photos go through a fixed pipeline before they are recorded: the source
//! bytes are decoded, scaled to fit a maximum dimension, re-encoded, hashed,
//! checked against the hashes already stored for their scope, and only then
//! uploaded to the object store.
//!
//! # Components
//!
//! - [`ImageCodec`] / [`PngCodec`] -- decode, rescale, and re-encode
//! - [`ContentHasher`] -- domain-separated BLAKE3 digest of processed bytes
//! - [`MediaStore`] -- object storage; [`InMemoryMediaStore`] and
//!   [`DirectoryMediaStore`] backends
//! - [`SeenHashes`] -- per-scope set of already-uploaded content hashes
//! - [`paths`] -- object path rules

pub mod codec;
pub mod dedup;
pub mod error;
pub mod hasher;
pub mod paths;
pub mod store;

pub use codec::{scaled_dimensions, EncodedImage, ImageCodec, PngCodec};
pub use dedup::{existing_hashes, HashScope, SeenHashes};
pub use error::{MediaError, MediaResult};
pub use hasher::ContentHasher;
pub use store::{DirectoryMediaStore, InMemoryMediaStore, MediaStore, StoredObject, Visibility};

/// Longest side of an uploaded travel photo, in pixels.
pub const PHOTO_MAX_DIMENSION: u32 = 2048;

/// Longest side of a thumbnail, in pixels.
pub const THUMBNAIL_MAX_DIMENSION: u32 = 256;

/// Longest side of a home-page photo, in pixels.
pub const HOME_PHOTO_MAX_DIMENSION: u32 = 1024;

/// Longest side of a resume logo, in pixels.
pub const LOGO_MAX_DIMENSION: u32 = 512;
