use std::collections::HashSet;

use atlas_store::{EntityRepository, StoreError};
use atlas_types::{ContentHash, Entity, HomePhoto, Photo, Record, SortKey, TypeError};
use tracing::debug;

use crate::error::MediaResult;

/// Field holding a photo's content hash in both photo partitions.
const CONTENT_HASH_FIELD: &str = "contentHash";

/// The set of stored photos a new photo is compared against.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum HashScope {
    /// Travel photos of one place.
    Place { place_id: String },
    /// All home-page photos.
    Home,
}

impl HashScope {
    pub fn place(place_id: impl Into<String>) -> Self {
        Self::Place {
            place_id: place_id.into(),
        }
    }
}

impl std::fmt::Display for HashScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Place { place_id } => write!(f, "place {place_id}"),
            Self::Home => f.write_str("home"),
        }
    }
}

/// Content hashes of every photo already stored in `scope`.
///
/// Only the `contentHash` field is read; the rest of each record is ignored.
pub fn existing_hashes(
    repo: &EntityRepository,
    scope: &HashScope,
) -> MediaResult<HashSet<ContentHash>> {
    let records = match scope {
        HashScope::Place { place_id } => {
            repo.get_by_prefix(Photo::PARTITION, &SortKey::child_prefix(place_id))?
        }
        HashScope::Home => repo.get_equal(HomePhoto::PARTITION, None)?,
    };
    let hashes = records
        .iter()
        .map(content_hash_of)
        .collect::<Result<HashSet<_>, _>>()?;
    debug!(%scope, count = hashes.len(), "loaded existing hashes");
    Ok(hashes)
}

fn content_hash_of(record: &Record) -> Result<ContentHash, StoreError> {
    let hex = record
        .field_str(CONTENT_HASH_FIELD)
        .ok_or_else(|| TypeError::Decode {
            partition: record.partition_key.clone(),
            sort: record.sort_key.clone(),
            expected: "contentHash",
            reason: "missing field".into(),
        })?;
    Ok(ContentHash::from_hex(hex)?)
}

/// Hashes known in one scope: those already stored plus those admitted
/// during the current import.
#[derive(Clone, Debug)]
pub struct SeenHashes {
    scope: HashScope,
    hashes: HashSet<ContentHash>,
}

impl SeenHashes {
    /// Load the stored hashes for `scope`.
    pub fn load(repo: &EntityRepository, scope: HashScope) -> MediaResult<Self> {
        let hashes = existing_hashes(repo, &scope)?;
        Ok(Self { scope, hashes })
    }

    pub fn scope(&self) -> &HashScope {
        &self.scope
    }

    pub fn contains(&self, hash: &ContentHash) -> bool {
        self.hashes.contains(hash)
    }

    /// Record `hash` as seen. Returns `false` if it already was, meaning the
    /// photo is a duplicate and must be skipped.
    pub fn admit(&mut self, hash: ContentHash) -> bool {
        self.hashes.insert(hash)
    }

    pub fn len(&self) -> usize {
        self.hashes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hashes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use atlas_store::InMemoryTable;
    use atlas_types::Partition;
    use chrono::{TimeZone, Utc};

    use crate::error::MediaError;
    use crate::hasher::ContentHasher;

    fn repo() -> EntityRepository {
        EntityRepository::new(Arc::new(InMemoryTable::new()))
    }

    fn photo(place_id: &str, photo_id: &str, hash: ContentHash) -> Photo {
        Photo {
            photo_id: photo_id.into(),
            src: format!("https://cdn/{photo_id}.png"),
            thumbnail_src: format!("https://cdn/t/{photo_id}.png"),
            destination_id: "paris123".into(),
            place_id: place_id.into(),
            height: 10,
            width: 20,
            creation_timestamp: Utc.with_ymd_and_hms(2023, 5, 1, 12, 0, 0).unwrap(),
            content_hash: hash,
        }
    }

    #[test]
    fn place_scope_only_sees_its_own_photos() {
        let repo = repo();
        let a = ContentHasher::IMAGE.hash(b"a");
        let b = ContentHasher::IMAGE.hash(b"b");
        repo.save(&photo("eiffel1", "p1", a)).unwrap();
        repo.save(&photo("louvre1", "p2", b)).unwrap();

        let hashes = existing_hashes(&repo, &HashScope::place("eiffel1")).unwrap();
        assert_eq!(hashes, HashSet::from([a]));
    }

    #[test]
    fn home_scope_reads_whole_partition() {
        let repo = repo();
        let hash = ContentHasher::IMAGE.hash(b"home");
        repo.save(&HomePhoto {
            photo_id: "h1".into(),
            src: "https://cdn/HOME/x.png".into(),
            height: 1,
            width: 1,
            creation_timestamp: Utc.with_ymd_and_hms(2022, 1, 1, 0, 0, 0).unwrap(),
            content_hash: hash,
        })
        .unwrap();

        let seen = SeenHashes::load(&repo, HashScope::Home).unwrap();
        assert!(seen.contains(&hash));
        assert_eq!(seen.len(), 1);
    }

    #[test]
    fn admit_rejects_repeats_within_a_batch() {
        let mut seen = SeenHashes::load(&repo(), HashScope::place("eiffel1")).unwrap();
        assert!(seen.is_empty());
        let hash = ContentHasher::IMAGE.hash(b"same");
        assert!(seen.admit(hash));
        assert!(!seen.admit(hash));
        assert_eq!(seen.scope(), &HashScope::place("eiffel1"));
    }

    #[test]
    fn record_without_hash_is_an_error() {
        let repo = repo();
        repo.put(
            Partition::PHOTO,
            &SortKey::scoped("eiffel1", "p1"),
            serde_json::json!({"photoId": "p1"}),
        )
        .unwrap();
        let err = existing_hashes(&repo, &HashScope::place("eiffel1")).unwrap_err();
        assert!(matches!(err, MediaError::Store(StoreError::Type(_))));
    }
}
