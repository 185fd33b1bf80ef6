//! Object path rules.
//!
//! Every uploaded object is named by its content hash, under a directory
//! derived from the owning records. Spaces are replaced with underscores.

use atlas_types::ContentHash;

pub const IMAGE_DIRECTORY: &str = "images";
pub const THUMBNAIL_DIRECTORY: &str = "thumbnails";
pub const HOME_DIRECTORY: &str = "HOME";
pub const RESUME_LOGO_DIRECTORY: &str = "resume/images";

fn object_path(segments: &[&str], hash: &ContentHash, extension: &str) -> String {
    let mut path = segments.join("/");
    path.push('/');
    path.push_str(&hash.to_hex());
    path.push('.');
    path.push_str(extension);
    path.replace(' ', "_")
}

/// `images/<destinationId>/<placeId>/<hash>.<ext>`
pub fn photo_path(
    destination_id: &str,
    place_id: &str,
    hash: &ContentHash,
    extension: &str,
) -> String {
    object_path(&[IMAGE_DIRECTORY, destination_id, place_id], hash, extension)
}

/// `thumbnails/<destinationId>/<placeId>/<hash>.<ext>`
///
/// `hash` is the full-size photo's hash, so a photo and its thumbnail share a
/// file name.
pub fn thumbnail_path(
    destination_id: &str,
    place_id: &str,
    hash: &ContentHash,
    extension: &str,
) -> String {
    object_path(&[THUMBNAIL_DIRECTORY, destination_id, place_id], hash, extension)
}

/// `HOME/<hash>.<ext>`
pub fn home_path(hash: &ContentHash, extension: &str) -> String {
    object_path(&[HOME_DIRECTORY], hash, extension)
}

/// `resume/images/<hash>.<ext>`
pub fn resume_logo_path(hash: &ContentHash, extension: &str) -> String {
    object_path(&[RESUME_LOGO_DIRECTORY], hash, extension)
}
