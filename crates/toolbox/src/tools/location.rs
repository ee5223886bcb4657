//! Location resolution with a cache-aside database layer.
//!
//! Three input shapes are accepted, exactly one per request:
//!
//! - `{zipCode}`: postal-code lookup
//! - `{lat, lon}`: reverse geocode
//! - `{city, state?, country}`: forward geocode
//!
//! Whatever shape the caller used becomes the cache key, so two shapes that
//! land on the same place are cached as two rows.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use database::{location, Database, ResolvedLocation};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::config::ToolConfig;
use crate::context::ToolContext;
use crate::error::ToolError;
use crate::tool::{Tool, ToolArgs, ToolOutput};
use crate::tools::us_states::abbreviate_state;
use crate::upstream::endpoint;

const SHAPE_ERROR: &str =
    "Provide exactly one of: zipCode, lat and lon, or city and country (state optional)";

/// A validated location request.
#[derive(Debug, Clone, PartialEq)]
pub enum LocationQuery {
    ZipCode(String),
    Coordinates {
        lat: f64,
        lon: f64,
    },
    Place {
        city: String,
        state: Option<String>,
        country: String,
    },
}

impl LocationQuery {
    /// Read the location fields out of tool arguments.
    pub fn from_args(args: &ToolArgs) -> Result<Self, ToolError> {
        let zip = text_field(args, "zipCode")?;
        let lat = args.get_number_opt("lat")?;
        let lon = args.get_number_opt("lon")?;
        let city = text_field(args, "city")?;
        let state = text_field(args, "state")?;
        let country = text_field(args, "country")?;

        let has_zip = zip.is_some();
        let has_coords = lat.is_some() || lon.is_some();
        let has_place = city.is_some() || country.is_some() || state.is_some();

        let shapes = [has_zip, has_coords, has_place]
            .iter()
            .filter(|present| **present)
            .count();
        if shapes != 1 {
            return Err(ToolError::Validation(SHAPE_ERROR.to_string()));
        }

        if let Some(zip) = zip {
            return Ok(LocationQuery::ZipCode(zip));
        }

        if has_coords {
            let (Some(lat), Some(lon)) = (lat, lon) else {
                return Err(ToolError::Validation(SHAPE_ERROR.to_string()));
            };
            if !(-90.0..=90.0).contains(&lat) {
                return Err(ToolError::invalid("lat", "must be between -90 and 90"));
            }
            if !(-180.0..=180.0).contains(&lon) {
                return Err(ToolError::invalid("lon", "must be between -180 and 180"));
            }
            return Ok(LocationQuery::Coordinates { lat, lon });
        }

        match (city, country) {
            (Some(city), Some(country)) => Ok(LocationQuery::Place {
                city,
                state,
                country,
            }),
            _ => Err(ToolError::Validation(SHAPE_ERROR.to_string())),
        }
    }

    /// Exact-match cache key: the supplied fields as JSON with sorted keys.
    pub fn cache_key(&self) -> String {
        let mut fields: BTreeMap<&str, Value> = BTreeMap::new();
        match self {
            LocationQuery::ZipCode(zip) => {
                fields.insert("zipCode", json!(zip));
            }
            LocationQuery::Coordinates { lat, lon } => {
                fields.insert("lat", json!(lat));
                fields.insert("lon", json!(lon));
            }
            LocationQuery::Place {
                city,
                state,
                country,
            } => {
                fields.insert("city", json!(city));
                fields.insert("country", json!(country));
                if let Some(state) = state {
                    fields.insert("state", json!(state));
                }
            }
        }
        Value::Object(fields.into_iter().map(|(k, v)| (k.to_string(), v)).collect()).to_string()
    }
}

/// A text location field. Numbers are taken as their decimal text (zip codes
/// often arrive unquoted); blank strings and `null` count as absent.
fn text_field(args: &ToolArgs, key: &str) -> Result<Option<String>, ToolError> {
    match args.get_value(key) {
        None => Ok(None),
        Some(Value::String(s)) => {
            let s = s.trim();
            Ok((!s.is_empty()).then(|| s.to_string()))
        }
        Some(Value::Number(n)) => Ok(Some(n.to_string())),
        Some(_) => Err(ToolError::invalid(key, "expected string")),
    }
}

/// A resolved location and whether it came from the cache.
#[derive(Debug, Clone)]
pub struct Resolution {
    pub location: ResolvedLocation,
    pub cached: bool,
}

/// Geocoder response entry (Nominatim `jsonv2`).
#[derive(Debug, Deserialize)]
struct Place {
    lat: Option<Value>,
    lon: Option<Value>,
    #[serde(default)]
    address: Address,
    error: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct Address {
    city: Option<String>,
    town: Option<String>,
    village: Option<String>,
    hamlet: Option<String>,
    municipality: Option<String>,
    county: Option<String>,
    state: Option<String>,
    postcode: Option<String>,
    country_code: Option<String>,
}

impl Address {
    fn locality(&self) -> Option<String> {
        [
            &self.city,
            &self.town,
            &self.village,
            &self.hamlet,
            &self.municipality,
            &self.county,
        ]
        .into_iter()
        .flatten()
        .next()
        .cloned()
    }
}

impl Place {
    fn coordinates(&self) -> Option<(f64, f64)> {
        Some((coordinate(self.lat.as_ref()?)?, coordinate(self.lon.as_ref()?)?))
    }
}

/// Nominatim sends coordinates as strings; accept numbers too.
fn coordinate(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.parse().ok(),
        _ => None,
    }
}

/// Fields gathered from one or more geocoder responses.
#[derive(Debug, Default)]
struct Draft {
    zip_code: Option<String>,
    city: Option<String>,
    state: Option<String>,
    country: Option<String>,
}

impl Draft {
    fn fill_from(&mut self, address: &Address) {
        if self.zip_code.is_none() {
            self.zip_code = address.postcode.clone();
        }
        if self.city.is_none() {
            self.city = address.locality();
        }
        if self.state.is_none() {
            self.state = address.state.clone();
        }
        if self.country.is_none() {
            self.country = address.country_code.clone();
        }
    }

    fn is_complete(&self) -> bool {
        self.zip_code.is_some() && self.city.is_some() && self.state.is_some()
    }

    fn finish(self, lat: f64, lon: f64) -> ResolvedLocation {
        let state = self.state.map(|s| abbreviate_state(&s));
        let country = self.country.map(|c| c.trim().to_uppercase());
        let address = format_address(
            self.city.as_deref(),
            state.as_deref(),
            self.zip_code.as_deref(),
            country.as_deref(),
        );

        ResolvedLocation {
            zip_code: self.zip_code,
            lat,
            lon,
            city: self.city,
            state,
            country,
            address,
        }
    }
}

/// "City, ST 12345, CC" with empty parts dropped.
fn format_address(
    city: Option<&str>,
    state: Option<&str>,
    zip: Option<&str>,
    country: Option<&str>,
) -> String {
    let region = [state, zip]
        .into_iter()
        .flatten()
        .collect::<Vec<_>>()
        .join(" ");

    [city, Some(region.as_str()), country]
        .into_iter()
        .flatten()
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Resolves location queries, consulting the cache first.
pub struct LocationResolver {
    http: reqwest::Client,
    db: Database,
    config: Arc<ToolConfig>,
}

impl LocationResolver {
    pub fn new(ctx: &ToolContext) -> Self {
        Self {
            http: ctx.http.clone(),
            db: ctx.db.clone(),
            config: ctx.config.clone(),
        }
    }

    /// Return the cached record for this query, or geocode and cache it.
    pub async fn resolve(&self, query: &LocationQuery) -> Result<Resolution, ToolError> {
        let key = query.cache_key();

        if let Some(location) = location::get_location(self.db.pool(), &key).await? {
            debug!("Location cache hit for {}", key);
            return Ok(Resolution {
                location,
                cached: true,
            });
        }

        debug!("Location cache miss for {}", key);
        let location = self.geocode(query).await?;
        location::upsert_location(self.db.pool(), &key, &location).await?;

        Ok(Resolution {
            location,
            cached: false,
        })
    }

    async fn geocode(&self, query: &LocationQuery) -> Result<ResolvedLocation, ToolError> {
        let mut draft = Draft::default();

        let (lat, lon) = match query {
            LocationQuery::Coordinates { lat, lon } => {
                let place = self.reverse(*lat, *lon).await?;
                draft.fill_from(&place.address);
                return Ok(draft.finish(*lat, *lon));
            }
            LocationQuery::ZipCode(zip) => {
                draft.zip_code = Some(zip.clone());
                let place = self
                    .search(vec![
                        ("postalcode", zip.clone()),
                        ("countrycodes", self.config.default_country.clone()),
                    ])
                    .await?;
                draft.fill_from(&place.address);
                place.coordinates().ok_or(ToolError::FetchFailed)?
            }
            LocationQuery::Place {
                city,
                state,
                country,
            } => {
                let mut params = vec![("city", city.clone()), ("country", country.clone())];
                if let Some(state) = state {
                    params.push(("state", state.clone()));
                }
                let place = self.search(params).await?;
                draft.fill_from(&place.address);
                if draft.city.is_none() {
                    draft.city = Some(city.clone());
                }
                if draft.state.is_none() {
                    draft.state = state.clone();
                }
                if draft.country.is_none() {
                    draft.country = Some(country.clone());
                }
                place.coordinates().ok_or(ToolError::FetchFailed)?
            }
        };

        if !draft.is_complete() {
            // Forward results often lack a postcode; the reverse lookup on the
            // matched point supplies it (and any other gaps).
            match self.reverse(lat, lon).await {
                Ok(place) => draft.fill_from(&place.address),
                Err(e) => warn!("Reverse lookup for missing fields failed: {}", e),
            }
        }

        Ok(draft.finish(lat, lon))
    }

    async fn search(&self, mut params: Vec<(&str, String)>) -> Result<Place, ToolError> {
        params.push(("limit", "1".to_string()));
        let places: Vec<Place> = self.fetch("search", params).await?;
        places.into_iter().next().ok_or_else(|| {
            warn!("Geocoder returned no results");
            ToolError::FetchFailed
        })
    }

    async fn reverse(&self, lat: f64, lon: f64) -> Result<Place, ToolError> {
        let place: Place = self
            .fetch("reverse", vec![("lat", lat.to_string()), ("lon", lon.to_string())])
            .await?;

        if let Some(error) = &place.error {
            warn!("Reverse geocode failed: {}", error);
            return Err(ToolError::FetchFailed);
        }
        Ok(place)
    }

    /// GET a geocoder endpoint. Every failure collapses to `FetchFailed`.
    async fn fetch<T: DeserializeOwned>(
        &self,
        path: &str,
        mut params: Vec<(&str, String)>,
    ) -> Result<T, ToolError> {
        params.push(("format", "jsonv2".to_string()));
        params.push(("addressdetails", "1".to_string()));

        let url = endpoint(&self.config.geocoder_url, &[path])?;
        debug!("Geocoding via {} with {:?}", url, params);

        let response = self
            .http
            .get(url)
            .header(reqwest::header::USER_AGENT, &self.config.geocoder_user_agent)
            .query(&params)
            .send()
            .await
            .map_err(|e| {
                warn!("Geocoder request failed: {}", e);
                ToolError::FetchFailed
            })?;

        if !response.status().is_success() {
            warn!("Geocoder returned status {}", response.status());
            return Err(ToolError::FetchFailed);
        }

        response.json::<T>().await.map_err(|e| {
            warn!("Geocoder response could not be parsed: {}", e);
            ToolError::FetchFailed
        })
    }
}

/// `resolveLocation` tool.
pub struct ResolveLocation {
    resolver: Arc<LocationResolver>,
}

impl ResolveLocation {
    pub fn new(resolver: Arc<LocationResolver>) -> Self {
        Self { resolver }
    }
}

#[async_trait]
impl Tool for ResolveLocation {
    fn name(&self) -> &str {
        "resolveLocation"
    }

    fn description(&self) -> &str {
        "Resolves a zip code, a lat/lon pair, or a city/state/country into coordinates, \
         place names and a display address. Results are cached per query."
    }

    fn demo_body(&self) -> Value {
        json!({ "city": "Austin", "state": "Texas", "country": "US" })
    }

    fn demo_response(&self) -> Value {
        json!({
            "status": true,
            "cached": false,
            "data": {
                "zipCode": "78701",
                "lat": 30.2711286,
                "lon": -97.7436995,
                "city": "Austin",
                "state": "TX",
                "country": "US",
                "address": "Austin, TX 78701, US"
            }
        })
    }

    async fn execute(&self, args: ToolArgs) -> Result<ToolOutput, ToolError> {
        let query = LocationQuery::from_args(&args)?;
        let resolution = self.resolver.resolve(&query).await?;

        Ok(ToolOutput::success(json!({
            "status": true,
            "cached": resolution.cached,
            "data": resolution.location,
        })))
    }
}
