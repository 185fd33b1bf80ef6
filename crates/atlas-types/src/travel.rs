//! Travel models: destinations, the places within them, one album per place,
//! and the photos imported from that album.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::entity::Entity;
use crate::hash::ContentHash;
use crate::key::{Partition, SortKey};

/// A city or region. Keyed by its geocoder place id.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Destination {
    pub place_id: String,
    pub name: String,
    pub country: String,
    pub country_code: String,
    pub latitude: Decimal,
    pub longitude: Decimal,
    #[serde(rename = "type")]
    pub kind: String,
}

impl Entity for Destination {
    const PARTITION: Partition = Partition::DESTINATION;
    const NAME: &'static str = "Destination";
    const KEY_FIELDS: &'static [&'static str] = &["placeId"];

    fn sort_key(&self) -> SortKey {
        SortKey::new(&self.place_id)
    }

    fn label(&self) -> String {
        format!("{} ({})", self.name, self.country_code)
    }
}

/// A point of interest inside a destination.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Place {
    pub name: String,
    pub place_id: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub country: String,
    pub zip_code: String,
    pub latitude: Decimal,
    pub longitude: Decimal,
    pub destination_id: String,
}

impl Entity for Place {
    const PARTITION: Partition = Partition::PLACE;
    const NAME: &'static str = "Place";
    const KEY_FIELDS: &'static [&'static str] = &["placeId", "destinationId"];

    fn sort_key(&self) -> SortKey {
        SortKey::scoped(&self.destination_id, &self.place_id)
    }

    fn label(&self) -> String {
        self.name.clone()
    }
}

/// The photo-library album that feeds a place. At most one per place.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Album {
    pub album_id: String,
    pub title: String,
    pub destination_id: String,
    pub place_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cover_photo_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cover_photo_url: Option<String>,
}

impl Album {
    pub fn new(
        album_id: impl Into<String>,
        title: impl Into<String>,
        destination_id: impl Into<String>,
        place_id: impl Into<String>,
    ) -> Self {
        Self {
            album_id: album_id.into(),
            title: title.into(),
            destination_id: destination_id.into(),
            place_id: place_id.into(),
            cover_photo_id: None,
            cover_photo_url: None,
        }
    }

    /// A copy of this album with `photo` as its cover.
    pub fn with_cover(&self, photo: &Photo) -> Self {
        Self {
            cover_photo_id: Some(photo.photo_id.clone()),
            cover_photo_url: Some(photo.thumbnail_src.clone()),
            ..self.clone()
        }
    }
}

impl Entity for Album {
    const PARTITION: Partition = Partition::ALBUM;
    const NAME: &'static str = "Album";
    const KEY_FIELDS: &'static [&'static str] = &["albumId", "placeId"];

    fn sort_key(&self) -> SortKey {
        SortKey::scoped(&self.place_id, &self.album_id)
    }

    fn label(&self) -> String {
        self.title.clone()
    }
}

/// An uploaded photo. Created by import, never edited.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Photo {
    pub photo_id: String,
    pub src: String,
    pub thumbnail_src: String,
    pub destination_id: String,
    pub place_id: String,
    pub height: u32,
    pub width: u32,
    pub creation_timestamp: DateTime<Utc>,
    pub content_hash: ContentHash,
}

impl Entity for Photo {
    const PARTITION: Partition = Partition::PHOTO;
    const NAME: &'static str = "Photo";
    const KEY_FIELDS: &'static [&'static str] = &["photoId", "placeId"];

    fn sort_key(&self) -> SortKey {
        SortKey::scoped(&self.place_id, &self.photo_id)
    }

    fn label(&self) -> String {
        format!(
            "{} ({}x{}, {})",
            self.photo_id,
            self.width,
            self.height,
            self.creation_timestamp.format("%Y-%m-%d")
        )
    }
}

/// Display order for destination lists: country code, then name.
pub fn sort_destinations(destinations: &mut [Destination]) {
    destinations.sort_by(|a, b| {
        a.country_code
            .cmp(&b.country_code)
            .then_with(|| a.name.cmp(&b.name))
    });
}

/// Display order for place lists: by name.
pub fn sort_places(places: &mut [Place]) {
    places.sort_by(|a, b| a.name.cmp(&b.name));
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn paris() -> Destination {
        Destination {
            place_id: "paris123".into(),
            name: "Paris".into(),
            country: "France".into(),
            country_code: "FR".into(),
            latitude: Decimal::from_str("48.856614").unwrap(),
            longitude: Decimal::from_str("2.3522219").unwrap(),
            kind: "city".into(),
        }
    }

    fn eiffel() -> Place {
        Place {
            name: "Eiffel Tower".into(),
            place_id: "eiffel1".into(),
            address: "Champ de Mars 5".into(),
            city: "Paris".into(),
            state: "Ile-de-France".into(),
            country: "France".into(),
            zip_code: "75007".into(),
            latitude: Decimal::from_str("48.8583701").unwrap(),
            longitude: Decimal::from_str("2.2944813").unwrap(),
            destination_id: "paris123".into(),
        }
    }

    #[test]
    fn sort_keys_are_parent_scoped() {
        assert_eq!(paris().sort_key().as_str(), "paris123");
        assert_eq!(eiffel().sort_key().as_str(), "paris123#eiffel1");
        let album = Album::new("alb1", "Paris -- Eiffel Tower", "paris123", "eiffel1");
        assert_eq!(album.sort_key().as_str(), "eiffel1#alb1");
    }

    #[test]
    fn destination_serializes_camel_case_with_type_field() {
        let json = serde_json::to_value(paris()).unwrap();
        assert_eq!(json["countryCode"], "FR");
        assert_eq!(json["type"], "city");
        assert!(json.get("kind").is_none());
    }

    #[test]
    fn coordinates_survive_roundtrip_exactly() {
        let json = serde_json::to_string(&eiffel()).unwrap();
        let back: Place = serde_json::from_str(&json).unwrap();
        assert_eq!(back.latitude.to_string(), "48.8583701");
        assert_eq!(back, eiffel());
    }

    #[test]
    fn album_cover_fields_are_optional() {
        let album = Album::new("alb1", "t", "d", "p");
        let json = serde_json::to_value(&album).unwrap();
        assert!(json.get("coverPhotoId").is_none());
        let back: Album = serde_json::from_value(json).unwrap();
        assert_eq!(back, album);
    }

    #[test]
    fn with_cover_uses_thumbnail() {
        let photo = Photo {
            photo_id: "p1".into(),
            src: "https://cdn/images/a.png".into(),
            thumbnail_src: "https://cdn/thumbnails/a.png".into(),
            destination_id: "paris123".into(),
            place_id: "eiffel1".into(),
            height: 10,
            width: 20,
            creation_timestamp: "2019-06-01T10:00:00Z".parse().unwrap(),
            content_hash: ContentHash::from_digest([7; 16]),
        };
        let album = Album::new("alb1", "t", "paris123", "eiffel1").with_cover(&photo);
        assert_eq!(album.cover_photo_id.as_deref(), Some("p1"));
        assert_eq!(album.cover_photo_url.as_deref(), Some("https://cdn/thumbnails/a.png"));
        assert_eq!(album.sort_key().as_str(), "eiffel1#alb1");
    }

    #[test]
    fn destinations_sort_by_country_then_name() {
        let mut lyon = paris();
        lyon.name = "Lyon".into();
        let mut rome = paris();
        rome.name = "Rome".into();
        rome.country_code = "IT".into();
        let mut berlin = paris();
        berlin.name = "Berlin".into();
        berlin.country_code = "DE".into();

        let mut list = vec![rome, paris(), berlin, lyon];
        sort_destinations(&mut list);
        let names: Vec<&str> = list.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["Berlin", "Lyon", "Paris", "Rome"]);
    }

    #[test]
    fn places_sort_by_name() {
        let mut louvre = eiffel();
        louvre.name = "Louvre".into();
        let mut arc = eiffel();
        arc.name = "Arc de Triomphe".into();
        let mut list = vec![louvre, eiffel(), arc];
        sort_places(&mut list);
        let names: Vec<&str> = list.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Arc de Triomphe", "Eiffel Tower", "Louvre"]);
    }
}
