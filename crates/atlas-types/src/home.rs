use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::entity::Entity;
use crate::hash::ContentHash;
use crate::key::{Partition, SortKey};

/// A home-page photo. Keyed by its content hash, so the partition itself is
/// the dedup scope.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HomePhoto {
    pub photo_id: String,
    pub src: String,
    pub height: u32,
    pub width: u32,
    pub creation_timestamp: DateTime<Utc>,
    pub content_hash: ContentHash,
}

impl Entity for HomePhoto {
    const PARTITION: Partition = Partition::HOME_PHOTO;
    const NAME: &'static str = "HomePhoto";
    const KEY_FIELDS: &'static [&'static str] = &["contentHash"];

    fn sort_key(&self) -> SortKey {
        SortKey::new(self.content_hash.to_hex())
    }

    fn label(&self) -> String {
        self.photo_id.clone()
    }
}
