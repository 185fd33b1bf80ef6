use std::str::FromStr;

use async_trait::async_trait;
use atlas_types::Decimal;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, instrument};

use crate::error::{ServiceError, ServiceResult};
use crate::traits::PlaceLookup;
use crate::types::{Coordinates, GeocodedDestination, GeocodedPlace, Suggestion};

const DEFAULT_BASE_URL: &str = "https://maps.googleapis.com/maps/api";
const SERVICE: &str = "google maps";

/// Autocomplete type filter restricting results to cities.
pub const CITIES_TYPE: &str = "(cities)";

/// Radius around a destination that place suggestions are biased to.
pub const PLACE_SEARCH_RADIUS_METERS: u32 = 25_000;

/// Client for the Google Places autocomplete and Geocoding APIs.
pub struct GoogleMapsClient {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl GoogleMapsClient {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::with_base_url(api_key, DEFAULT_BASE_URL)
    }

    pub fn with_base_url(api_key: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_key: api_key.into(),
            base_url: base_url.into(),
        }
    }

    async fn get_json(&self, endpoint: &str, query: &[(&str, String)]) -> ServiceResult<Value> {
        let response = self
            .http
            .get(format!("{}/{}", self.base_url, endpoint))
            .query(query)
            .query(&[("key", self.api_key.as_str())])
            .send()
            .await?;

        let status = response.status();
        let body: Value = response.json().await?;
        if !status.is_success() {
            return Err(ServiceError::Api {
                service: SERVICE,
                status: status.as_u16(),
                message: error_message(&body),
            });
        }
        Ok(body)
    }
}

impl std::fmt::Debug for GoogleMapsClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GoogleMapsClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl PlaceLookup for GoogleMapsClient {
    #[instrument(skip(self))]
    async fn suggest_destinations(&self, text: &str) -> ServiceResult<Vec<Suggestion>> {
        let body = self
            .get_json(
                "place/autocomplete/json",
                &[("input", text.to_string()), ("types", CITIES_TYPE.to_string())],
            )
            .await?;
        parse_suggestions(body)
    }

    #[instrument(skip(self))]
    async fn suggest_places(
        &self,
        text: &str,
        near: Option<Coordinates>,
    ) -> ServiceResult<Vec<Suggestion>> {
        let mut query = vec![("input", text.to_string())];
        if let Some(near) = near {
            query.push(("location", format!("{},{}", near.latitude, near.longitude)));
            query.push(("radius", PLACE_SEARCH_RADIUS_METERS.to_string()));
        }
        let body = self.get_json("place/autocomplete/json", &query).await?;
        parse_suggestions(body)
    }

    #[instrument(skip(self))]
    async fn geocode_destination(&self, place_id: &str) -> ServiceResult<GeocodedDestination> {
        let body = self
            .get_json("geocode/json", &[("place_id", place_id.to_string())])
            .await?;
        parse_destination(place_id, body)
    }

    #[instrument(skip(self))]
    async fn geocode_place(&self, place_id: &str) -> ServiceResult<GeocodedPlace> {
        let body = self
            .get_json("geocode/json", &[("place_id", place_id.to_string())])
            .await?;
        parse_place(place_id, body)
    }
}

// ---------------------------------------------------------------------------
// Wire format
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
struct AutocompleteResponse {
    status: String,
    #[serde(default)]
    error_message: Option<String>,
    #[serde(default)]
    predictions: Vec<Prediction>,
}

#[derive(Deserialize)]
struct Prediction {
    description: String,
    place_id: String,
    #[serde(default)]
    structured_formatting: Option<StructuredFormatting>,
}

#[derive(Deserialize)]
struct StructuredFormatting {
    main_text: String,
    #[serde(default)]
    secondary_text: Option<String>,
}

#[derive(Deserialize)]
struct GeocodeResponse {
    status: String,
    #[serde(default)]
    error_message: Option<String>,
    #[serde(default)]
    results: Vec<GeocodeResult>,
}

#[derive(Deserialize)]
struct GeocodeResult {
    #[serde(default)]
    place_id: Option<String>,
    address_components: Vec<AddressComponent>,
    geometry: Geometry,
    #[serde(default)]
    types: Vec<String>,
}

#[derive(Deserialize)]
struct AddressComponent {
    long_name: String,
    short_name: String,
    #[serde(default)]
    types: Vec<String>,
}

impl AddressComponent {
    fn is(&self, kind: &str) -> bool {
        self.types.iter().any(|t| t == kind)
    }
}

#[derive(Deserialize)]
struct Geometry {
    location: LatLng,
}

#[derive(Deserialize)]
struct LatLng {
    lat: serde_json::Number,
    lng: serde_json::Number,
}

fn error_message(body: &Value) -> String {
    body.get("error_message")
        .and_then(Value::as_str)
        .unwrap_or("Unknown error")
        .to_string()
}

/// Maps API status codes that carry a usable (possibly empty) result.
fn check_status(status: &str, error_message: Option<String>) -> ServiceResult<()> {
    match status {
        "OK" | "ZERO_RESULTS" => Ok(()),
        other => Err(ServiceError::Api {
            service: SERVICE,
            status: 200,
            message: match error_message {
                Some(message) => format!("{other}: {message}"),
                None => other.to_string(),
            },
        }),
    }
}

fn decimal(number: &serde_json::Number) -> ServiceResult<Decimal> {
    let text = number.to_string();
    Decimal::from_str(&text)
        .or_else(|_| Decimal::from_scientific(&text))
        .map_err(|e| ServiceError::unexpected(SERVICE, format!("coordinate {text}: {e}")))
}

fn first_result(body: Value, place_id: &str) -> ServiceResult<GeocodeResult> {
    let response: GeocodeResponse =
        serde_json::from_value(body).map_err(|e| ServiceError::unexpected(SERVICE, e.to_string()))?;
    check_status(&response.status, response.error_message)?;
    response
        .results
        .into_iter()
        .next()
        .ok_or_else(|| ServiceError::NotFound {
            kind: "place",
            id: place_id.to_string(),
        })
}

/// Parse an autocomplete response.
pub fn parse_suggestions(body: Value) -> ServiceResult<Vec<Suggestion>> {
    let response: AutocompleteResponse =
        serde_json::from_value(body).map_err(|e| ServiceError::unexpected(SERVICE, e.to_string()))?;
    check_status(&response.status, response.error_message)?;
    debug!(count = response.predictions.len(), "autocomplete suggestions");

    Ok(response
        .predictions
        .into_iter()
        .map(|p| {
            let (main_text, secondary_text) = match p.structured_formatting {
                Some(f) => (f.main_text, f.secondary_text.unwrap_or_default()),
                None => (p.description.clone(), String::new()),
            };
            Suggestion {
                place_id: p.place_id,
                description: p.description,
                main_text,
                secondary_text,
            }
        })
        .collect())
}

/// Parse a geocode response for a city or region.
///
/// The name is the first address component; country and country code come
/// from the `country` component, which must be present.
pub fn parse_destination(place_id: &str, body: Value) -> ServiceResult<GeocodedDestination> {
    let result = first_result(body, place_id)?;
    let name = result
        .address_components
        .first()
        .map(|c| c.long_name.clone())
        .ok_or_else(|| ServiceError::unexpected(SERVICE, "no address components"))?;
    let country = result
        .address_components
        .iter()
        .find(|c| c.is("country"))
        .ok_or_else(|| ServiceError::unexpected(SERVICE, "no country component"))?;

    Ok(GeocodedDestination {
        place_id: place_id.to_string(),
        name,
        country: country.long_name.clone(),
        country_code: country.short_name.clone(),
        latitude: decimal(&result.geometry.location.lat)?,
        longitude: decimal(&result.geometry.location.lng)?,
        kind: result.types.first().cloned().unwrap_or_default(),
    })
}

/// Parse a geocode response for a point of interest.
///
/// Missing components become empty strings. The address is the route
/// followed by the street number.
pub fn parse_place(place_id: &str, body: Value) -> ServiceResult<GeocodedPlace> {
    let result = first_result(body, place_id)?;
    let component = |kind: &str| -> String {
        result
            .address_components
            .iter()
            .find(|c| c.is(kind))
            .map(|c| c.long_name.clone())
            .unwrap_or_default()
    };
    let address = format!("{} {}", component("route"), component("street_number"))
        .trim()
        .to_string();

    Ok(GeocodedPlace {
        place_id: result
            .place_id
            .clone()
            .unwrap_or_else(|| place_id.to_string()),
        address,
        state: component("administrative_area_level_1"),
        country: component("country"),
        zip_code: component("postal_code"),
        latitude: decimal(&result.geometry.location.lat)?,
        longitude: decimal(&result.geometry.location.lng)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn paris_geocode() -> Value {
        json!({
            "status": "OK",
            "results": [{
                "place_id": "paris123",
                "types": ["locality", "political"],
                "address_components": [
                    { "long_name": "Paris", "short_name": "Paris", "types": ["locality"] },
                    { "long_name": "Ile-de-France", "short_name": "IDF",
                      "types": ["administrative_area_level_1"] },
                    { "long_name": "France", "short_name": "FR", "types": ["country"] }
                ],
                "geometry": { "location": { "lat": 48.856614, "lng": 2.3522219 } }
            }]
        })
    }

    #[test]
    fn client_defaults() {
        let client = GoogleMapsClient::new("key");
        assert_eq!(client.base_url, DEFAULT_BASE_URL);
        let custom = GoogleMapsClient::with_base_url("key", "http://localhost:9000");
        assert_eq!(custom.base_url, "http://localhost:9000");
    }

    #[test]
    fn parses_suggestions_with_and_without_formatting() {
        let body = json!({
            "status": "OK",
            "predictions": [
                {
                    "description": "Eiffel Tower, Paris, France",
                    "place_id": "eiffel1",
                    "structured_formatting": {
                        "main_text": "Eiffel Tower",
                        "secondary_text": "Paris, France"
                    }
                },
                { "description": "Paris, France", "place_id": "paris123" }
            ]
        });
        let suggestions = parse_suggestions(body).unwrap();
        assert_eq!(suggestions.len(), 2);
        assert_eq!(suggestions[0].main_text, "Eiffel Tower");
        assert_eq!(suggestions[0].secondary_text, "Paris, France");
        assert_eq!(suggestions[1].main_text, "Paris, France");
    }

    #[test]
    fn zero_results_is_empty_not_error() {
        let suggestions = parse_suggestions(json!({"status": "ZERO_RESULTS"})).unwrap();
        assert!(suggestions.is_empty());
    }

    #[test]
    fn denied_request_is_api_error() {
        let err = parse_suggestions(json!({
            "status": "REQUEST_DENIED",
            "error_message": "The provided API key is invalid."
        }))
        .unwrap_err();
        match err {
            ServiceError::Api { message, .. } => assert!(message.starts_with("REQUEST_DENIED")),
            other => panic!("expected api error, got {other:?}"),
        }
    }

    #[test]
    fn parses_destination_with_exact_coordinates() {
        let destination = parse_destination("paris123", paris_geocode()).unwrap();
        assert_eq!(destination.name, "Paris");
        assert_eq!(destination.country, "France");
        assert_eq!(destination.country_code, "FR");
        assert_eq!(destination.kind, "locality");
        assert_eq!(destination.latitude.to_string(), "48.856614");
        assert_eq!(destination.longitude.to_string(), "2.3522219");
    }

    #[test]
    fn destination_without_country_is_rejected() {
        let body = json!({
            "status": "OK",
            "results": [{
                "address_components": [
                    { "long_name": "Nowhere", "short_name": "NW", "types": ["locality"] }
                ],
                "geometry": { "location": { "lat": 0.5, "lng": 0.5 } }
            }]
        });
        let err = parse_destination("x", body).unwrap_err();
        assert!(matches!(err, ServiceError::UnexpectedResponse { .. }));
    }

    #[test]
    fn parses_place_components() {
        let body = json!({
            "status": "OK",
            "results": [{
                "place_id": "eiffel1",
                "address_components": [
                    { "long_name": "5", "short_name": "5", "types": ["street_number"] },
                    { "long_name": "Avenue Anatole France", "short_name": "Av. Anatole France",
                      "types": ["route"] },
                    { "long_name": "Ile-de-France", "short_name": "IDF",
                      "types": ["administrative_area_level_1"] },
                    { "long_name": "France", "short_name": "FR", "types": ["country"] },
                    { "long_name": "75007", "short_name": "75007", "types": ["postal_code"] }
                ],
                "geometry": { "location": { "lat": 48.8583701, "lng": 2.2944813 } }
            }]
        });
        let place = parse_place("eiffel1", body).unwrap();
        assert_eq!(place.address, "Avenue Anatole France 5");
        assert_eq!(place.state, "Ile-de-France");
        assert_eq!(place.zip_code, "75007");
        assert_eq!(place.latitude.to_string(), "48.8583701");
    }

    #[test]
    fn empty_geocode_is_not_found() {
        let err = parse_place("gone", json!({"status": "ZERO_RESULTS", "results": []})).unwrap_err();
        assert!(matches!(err, ServiceError::NotFound { .. }));
    }
}
