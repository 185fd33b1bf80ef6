use atlas_types::{Decimal, Destination, Place};
use chrono::{DateTime, Utc};

/// One autocomplete candidate.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Suggestion {
    pub place_id: String,
    /// Full one-line description, e.g. "Paris, France".
    pub description: String,
    /// Primary name, e.g. "Eiffel Tower".
    pub main_text: String,
    /// Qualifier shown after the name, e.g. "Avenue Gustave Eiffel, Paris".
    pub secondary_text: String,
}

impl Suggestion {
    /// Text shown in a selection list.
    pub fn label(&self) -> String {
        if self.secondary_text.is_empty() {
            self.main_text.clone()
        } else {
            format!("{} {}", self.main_text, self.secondary_text)
        }
    }
}

/// A latitude/longitude pair used to bias searches.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Coordinates {
    pub latitude: Decimal,
    pub longitude: Decimal,
}

impl Coordinates {
    pub fn of_destination(destination: &Destination) -> Self {
        Self {
            latitude: destination.latitude,
            longitude: destination.longitude,
        }
    }
}

/// Geocoder fields for a city or region.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GeocodedDestination {
    pub place_id: String,
    pub name: String,
    pub country: String,
    pub country_code: String,
    pub latitude: Decimal,
    pub longitude: Decimal,
    /// First result type reported by the geocoder, e.g. `locality`.
    pub kind: String,
}

impl GeocodedDestination {
    pub fn into_destination(self) -> Destination {
        Destination {
            place_id: self.place_id,
            name: self.name,
            country: self.country,
            country_code: self.country_code,
            latitude: self.latitude,
            longitude: self.longitude,
            kind: self.kind,
        }
    }
}

/// Geocoder fields for a point of interest.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GeocodedPlace {
    pub place_id: String,
    pub address: String,
    pub state: String,
    pub country: String,
    pub zip_code: String,
    pub latitude: Decimal,
    pub longitude: Decimal,
}

impl GeocodedPlace {
    /// Build a place under `destination`. The city is the destination's name.
    pub fn into_place(self, name: impl Into<String>, destination: &Destination) -> Place {
        Place {
            name: name.into(),
            place_id: self.place_id,
            address: self.address,
            city: destination.name.clone(),
            state: self.state,
            country: self.country,
            zip_code: self.zip_code,
            latitude: self.latitude,
            longitude: self.longitude,
            destination_id: destination.place_id.clone(),
        }
    }
}

/// A photo-library album.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AlbumSummary {
    pub id: String,
    pub title: String,
    pub media_items_count: Option<u64>,
}

/// A photo in a library album, not yet downloaded.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PhotoRef {
    pub id: String,
    pub base_url: String,
    pub filename: String,
    pub creation_time: DateTime<Utc>,
}

impl PhotoRef {
    /// URL of the original-resolution download.
    pub fn download_url(&self) -> String {
        format!("{}=d", self.base_url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn paris() -> Destination {
        Destination {
            place_id: "paris123".into(),
            name: "Paris".into(),
            country: "France".into(),
            country_code: "FR".into(),
            latitude: Decimal::new(48856614, 6),
            longitude: Decimal::new(2352222, 6),
            kind: "locality".into(),
        }
    }

    #[test]
    fn suggestion_label_joins_texts() {
        let mut s = Suggestion {
            place_id: "x".into(),
            description: "Eiffel Tower, Paris, France".into(),
            main_text: "Eiffel Tower".into(),
            secondary_text: "Paris, France".into(),
        };
        assert_eq!(s.label(), "Eiffel Tower Paris, France");
        s.secondary_text.clear();
        assert_eq!(s.label(), "Eiffel Tower");
    }

    #[test]
    fn geocoded_place_takes_city_and_parent_from_destination() {
        let geocoded = GeocodedPlace {
            place_id: "eiffel1".into(),
            address: "Avenue Gustave Eiffel 5".into(),
            state: "Ile-de-France".into(),
            country: "France".into(),
            zip_code: "75007".into(),
            latitude: Decimal::new(488584, 4),
            longitude: Decimal::new(22945, 4),
        };
        let place = geocoded.into_place("Eiffel Tower", &paris());
        assert_eq!(place.city, "Paris");
        assert_eq!(place.destination_id, "paris123");
        assert_eq!(place.name, "Eiffel Tower");
    }

    #[test]
    fn photo_download_url_requests_original() {
        let photo = PhotoRef {
            id: "p1".into(),
            base_url: "https://lh3.example/abc".into(),
            filename: "IMG_1.jpg".into(),
            creation_time: Utc.with_ymd_and_hms(2023, 6, 1, 8, 30, 0).unwrap(),
        };
        assert_eq!(photo.download_url(), "https://lh3.example/abc=d");
    }
}
