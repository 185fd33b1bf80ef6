//! Photo import: library album to object store and table.
//!
//! Each source photo is rendered, hashed, and checked against the hashes
//! already stored for its scope. Duplicates are skipped before anything is
//! uploaded or written. New photos are uploaded, then recorded, then added
//! to the in-memory scope set so repeats within one album are skipped too.

use std::fmt;
use std::sync::Arc;

use atlas_media::paths::{home_path, photo_path, resume_logo_path, thumbnail_path};
use atlas_media::{
    ContentHasher, EncodedImage, HashScope, ImageCodec, MediaStore, SeenHashes, Visibility,
    HOME_PHOTO_MAX_DIMENSION, LOGO_MAX_DIMENSION, PHOTO_MAX_DIMENSION, THUMBNAIL_MAX_DIMENSION,
};
use atlas_services::{PhotoLibrary, PhotoRef};
use atlas_store::EntityRepository;
use atlas_types::{Album, ContentHash, HomePhoto, Photo};
use tracing::{debug, info, instrument};

use crate::error::NavResult;
use crate::prompt::Prompter;

/// Counts from one import run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ImportReport {
    pub uploaded: usize,
    pub skipped: usize,
}

impl ImportReport {
    pub fn total(&self) -> usize {
        self.uploaded + self.skipped
    }
}

impl fmt::Display for ImportReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Uploaded {} photo(s), skipped {} already present",
            self.uploaded, self.skipped
        )
    }
}

/// Moves photos from the library into storage.
pub struct PhotoImporter {
    repo: EntityRepository,
    library: Arc<dyn PhotoLibrary>,
    media: Arc<dyn MediaStore>,
    codec: Arc<dyn ImageCodec>,
    hasher: ContentHasher,
}

impl PhotoImporter {
    pub fn new(
        repo: EntityRepository,
        library: Arc<dyn PhotoLibrary>,
        media: Arc<dyn MediaStore>,
        codec: Arc<dyn ImageCodec>,
    ) -> Self {
        Self {
            repo,
            library,
            media,
            codec,
            hasher: ContentHasher::IMAGE,
        }
    }

    async fn upload(&self, path: &str, image: EncodedImage) -> NavResult<String> {
        let url = self
            .media
            .store(
                path,
                image.bytes,
                self.codec.content_type(),
                Visibility::PublicRead,
            )
            .await?;
        Ok(url)
    }

    /// Fetch and render one source photo at `max_dimension`, returning the
    /// source bytes, the rendered image and its hash.
    async fn prepare(
        &self,
        photo: &PhotoRef,
        max_dimension: u32,
    ) -> NavResult<(Vec<u8>, EncodedImage, ContentHash)> {
        let source = self.library.fetch_photo(photo).await?;
        let image = self.codec.render(&source, max_dimension)?;
        let hash = self.hasher.hash(&image.bytes);
        Ok((source, image, hash))
    }

    /// Import every photo of `album` into its place.
    #[instrument(skip(self, prompter, album), fields(album_id = %album.album_id, place_id = %album.place_id))]
    pub async fn import_album(
        &self,
        prompter: &dyn Prompter,
        album: &Album,
    ) -> NavResult<ImportReport> {
        let photos = self.library.list_album_photos(&album.album_id).await?;
        let mut seen = SeenHashes::load(&self.repo, HashScope::place(&album.place_id))?;
        let extension = self.codec.extension();
        let mut report = ImportReport::default();

        for (i, source_ref) in photos.iter().enumerate() {
            prompter.say(&format!("Uploading photo {} of {}", i + 1, photos.len()));
            let (source, full, hash) = self.prepare(source_ref, PHOTO_MAX_DIMENSION).await?;
            if seen.contains(&hash) {
                debug!(photo_id = %source_ref.id, hash = %hash.short_hex(), "skip duplicate photo");
                report.skipped += 1;
                continue;
            }
            let thumbnail = self.codec.render(&source, THUMBNAIL_MAX_DIMENSION)?;
            let (width, height) = (full.width, full.height);

            let src = self
                .upload(
                    &photo_path(&album.destination_id, &album.place_id, &hash, extension),
                    full,
                )
                .await?;
            let thumbnail_src = self
                .upload(
                    &thumbnail_path(&album.destination_id, &album.place_id, &hash, extension),
                    thumbnail,
                )
                .await?;

            self.repo.save(&Photo {
                photo_id: source_ref.id.clone(),
                src,
                thumbnail_src,
                destination_id: album.destination_id.clone(),
                place_id: album.place_id.clone(),
                height,
                width,
                creation_timestamp: source_ref.creation_time,
                content_hash: hash,
            })?;
            seen.admit(hash);
            report.uploaded += 1;
        }

        info!(uploaded = report.uploaded, skipped = report.skipped, "album imported");
        prompter.say(&report.to_string());
        Ok(report)
    }

    /// Import every photo of library album `album_id` as home-page photos.
    #[instrument(skip(self, prompter))]
    pub async fn import_home(
        &self,
        prompter: &dyn Prompter,
        album_id: &str,
    ) -> NavResult<ImportReport> {
        let photos = self.library.list_album_photos(album_id).await?;
        let mut seen = SeenHashes::load(&self.repo, HashScope::Home)?;
        let mut report = ImportReport::default();

        for (i, source_ref) in photos.iter().enumerate() {
            prompter.say(&format!("Uploading photo {} of {}", i + 1, photos.len()));
            let (_, image, hash) = self.prepare(source_ref, HOME_PHOTO_MAX_DIMENSION).await?;
            if seen.contains(&hash) {
                debug!(photo_id = %source_ref.id, hash = %hash.short_hex(), "skip duplicate home photo");
                report.skipped += 1;
                continue;
            }
            let (width, height) = (image.width, image.height);
            let src = self
                .upload(&home_path(&hash, self.codec.extension()), image)
                .await?;
            self.repo.save(&HomePhoto {
                photo_id: source_ref.id.clone(),
                src,
                height,
                width,
                creation_timestamp: source_ref.creation_time,
                content_hash: hash,
            })?;
            seen.admit(hash);
            report.uploaded += 1;
        }

        info!(uploaded = report.uploaded, skipped = report.skipped, "home photos imported");
        prompter.say(&report.to_string());
        Ok(report)
    }

    /// Re-encode a downloaded logo and store it, returning its URL.
    pub async fn upload_logo(&self, source: &[u8]) -> NavResult<String> {
        let image = self.codec.render(source, LOGO_MAX_DIMENSION)?;
        let hash = self.hasher.hash(&image.bytes);
        let url = self
            .upload(&resume_logo_path(&hash, self.codec.extension()), image)
            .await?;
        debug!(hash = %hash.short_hex(), "logo stored");
        Ok(url)
    }
}

impl fmt::Debug for PhotoImporter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PhotoImporter")
            .field("hasher", &self.hasher.domain())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prompt::ScriptedPrompter;
    use atlas_media::{InMemoryMediaStore, PngCodec};
    use atlas_services::InMemoryPhotoLibrary;
    use atlas_store::InMemoryTable;
    use chrono::{TimeZone, Utc};
    use std::io::Cursor;

    fn png(width: u32, height: u32, shade: u8) -> Vec<u8> {
        let img = image::RgbImage::from_pixel(width, height, image::Rgb([shade, 80, 160]));
        let mut out = Cursor::new(Vec::new());
        img.write_to(&mut out, image::ImageFormat::Png).unwrap();
        out.into_inner()
    }

    fn photo(id: &str, shade: u8) -> (PhotoRef, Vec<u8>) {
        (
            PhotoRef {
                id: id.into(),
                base_url: format!("https://lh3.example/{id}"),
                filename: format!("{id}.jpg"),
                creation_time: Utc.with_ymd_and_hms(2023, 5, 1, 10, 0, 0).unwrap(),
            },
            png(40, 30, shade),
        )
    }

    struct Fixture {
        table: Arc<InMemoryTable>,
        media: Arc<InMemoryMediaStore>,
        importer: PhotoImporter,
    }

    fn fixture(library: InMemoryPhotoLibrary) -> Fixture {
        let table = Arc::new(InMemoryTable::new());
        let media = Arc::new(InMemoryMediaStore::new());
        let importer = PhotoImporter::new(
            EntityRepository::new(table.clone()),
            Arc::new(library),
            media.clone(),
            Arc::new(PngCodec),
        );
        Fixture {
            table,
            media,
            importer,
        }
    }

    #[tokio::test]
    async fn repeats_within_an_album_are_skipped() {
        let library = InMemoryPhotoLibrary::new();
        library.add_album(
            "alb1",
            "Paris -- Eiffel Tower",
            vec![photo("p1", 10), photo("p2", 20), photo("p1-copy", 10)],
        );
        let fx = fixture(library);
        let prompter = ScriptedPrompter::default();
        let album = Album::new("alb1", "Paris -- Eiffel Tower", "paris123", "eiffel1");

        let report = fx.importer.import_album(&prompter, &album).await.unwrap();
        assert_eq!(report, ImportReport { uploaded: 2, skipped: 1 });
        assert_eq!(fx.table.len(), 2);
        // full photo + thumbnail per upload
        assert_eq!(fx.media.write_count(), 4);
        assert!(prompter.saw("Uploading photo 3 of 3"));
        assert!(prompter.saw("Uploaded 2 photo(s), skipped 1 already present"));

        let paths = fx.media.paths();
        assert!(paths.iter().any(|p| p.starts_with("images/paris123/eiffel1/")));
        assert!(paths.iter().any(|p| p.starts_with("thumbnails/paris123/eiffel1/")));
    }

    #[tokio::test]
    async fn photo_record_carries_rendered_size_and_urls() {
        let library = InMemoryPhotoLibrary::new();
        library.add_album("alb1", "t", vec![photo("p1", 10)]);
        let fx = fixture(library);
        let album = Album::new("alb1", "t", "paris123", "eiffel1");
        fx.importer
            .import_album(&ScriptedPrompter::default(), &album)
            .await
            .unwrap();

        let repo = EntityRepository::new(fx.table.clone());
        let photos: Vec<Photo> = repo.children("eiffel1").unwrap();
        assert_eq!(photos.len(), 1);
        let stored = &photos[0];
        assert_eq!((stored.width, stored.height), (40, 30));
        assert!(stored.src.ends_with(&format!("{}.png", stored.content_hash.to_hex())));
        assert!(stored.thumbnail_src.contains("/thumbnails/"));
        let object = fx
            .media
            .get(&format!(
                "images/paris123/eiffel1/{}.png",
                stored.content_hash.to_hex()
            ))
            .unwrap();
        assert_eq!(object.content_type, "image/png");
        assert_eq!(object.visibility, Visibility::PublicRead);
        assert!(ContentHasher::IMAGE.verify(&object.bytes, &stored.content_hash));
    }

    #[tokio::test]
    async fn home_import_is_deduplicated_across_runs() {
        let library = InMemoryPhotoLibrary::new();
        library.add_album("home", "Home", vec![photo("h1", 1), photo("h2", 2)]);
        let fx = fixture(library);
        let prompter = ScriptedPrompter::default();

        let first = fx.importer.import_home(&prompter, "home").await.unwrap();
        assert_eq!(first.uploaded, 2);
        let second = fx.importer.import_home(&prompter, "home").await.unwrap();
        assert_eq!(second, ImportReport { uploaded: 0, skipped: 2 });
        assert_eq!(fx.media.write_count(), 2);
        assert!(fx.media.paths().iter().all(|p| p.starts_with("HOME/")));
    }

    #[tokio::test]
    async fn logo_is_stored_by_hash() {
        let fx = fixture(InMemoryPhotoLibrary::new());
        let url = fx.importer.upload_logo(&png(64, 64, 200)).await.unwrap();
        assert!(url.contains("resume/images/"));
        assert!(url.ends_with(".png"));
    }
}
