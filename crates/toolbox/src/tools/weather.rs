//! Current conditions from OpenWeatherMap.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;

use crate::config::{required, ToolConfig};
use crate::context::ToolContext;
use crate::error::ToolError;
use crate::tool::{Tool, ToolArgs, ToolOutput};
use crate::tools::location::{LocationQuery, LocationResolver};
use crate::upstream::{endpoint, ensure_success};

const UNITS: &[&str] = &["imperial", "metric", "standard"];

/// Weather tool: resolves the location (any of the `resolveLocation` input
/// shapes), then fetches current conditions for its coordinates.
///
/// # Parameters
///
/// - location fields: `zipCode`, or `lat` + `lon`, or `city` + `country`
///   (`state` optional)
/// - `units` (optional): `imperial` (default), `metric` or `standard`
pub struct Weather {
    http: reqwest::Client,
    config: Arc<ToolConfig>,
    resolver: Arc<LocationResolver>,
}

#[derive(Debug, Deserialize)]
struct CurrentWeather {
    #[serde(default)]
    weather: Vec<Condition>,
    main: Readings,
    #[serde(default)]
    wind: Wind,
    #[serde(default)]
    name: String,
}

#[derive(Debug, Deserialize)]
struct Condition {
    main: String,
    description: String,
    icon: String,
}

#[derive(Debug, Deserialize)]
struct Readings {
    temp: f64,
    feels_like: f64,
    temp_min: f64,
    temp_max: f64,
    humidity: f64,
    pressure: f64,
}

#[derive(Debug, Default, Deserialize)]
struct Wind {
    #[serde(default)]
    speed: f64,
    deg: Option<f64>,
}

impl Weather {
    pub fn new(ctx: &ToolContext, resolver: Arc<LocationResolver>) -> Self {
        Self {
            http: ctx.http.clone(),
            config: ctx.config.clone(),
            resolver,
        }
    }

    async fn fetch_weather(&self, lat: f64, lon: f64, units: &str) -> Result<CurrentWeather, ToolError> {
        let api_key = required(&self.config.openweather_api_key, "OPENWEATHER_API_KEY")?;
        let url = endpoint(&self.config.openweather_url, &["data", "2.5", "weather"])?;

        debug!("Fetching weather for {},{} in {}", lat, lon, units);

        let response = self
            .http
            .get(url)
            .query(&[
                ("lat", lat.to_string()),
                ("lon", lon.to_string()),
                ("units", units.to_string()),
                ("appid", api_key.to_string()),
            ])
            .send()
            .await?;

        Ok(ensure_success(response, "OpenWeatherMap").await?.json().await?)
    }
}

#[async_trait]
impl Tool for Weather {
    fn name(&self) -> &str {
        "getWeather"
    }

    fn description(&self) -> &str {
        "Gets current weather for a zip code, coordinates, or city/state/country. \
         Units: imperial (default), metric or standard."
    }

    fn demo_body(&self) -> Value {
        json!({ "zipCode": "78701", "units": "imperial" })
    }

    fn demo_response(&self) -> Value {
        json!({
            "status": true,
            "location": {
                "zipCode": "78701",
                "lat": 30.2711286,
                "lon": -97.7436995,
                "city": "Austin",
                "state": "TX",
                "country": "US",
                "address": "Austin, TX 78701, US"
            },
            "units": "imperial",
            "weather": {
                "condition": "Clear",
                "description": "clear sky",
                "icon": "01d",
                "temperature": 88.3,
                "feelsLike": 91.2,
                "tempMin": 85.1,
                "tempMax": 90.4,
                "humidity": 48.0,
                "pressure": 1014.0,
                "windSpeed": 9.2,
                "windDeg": 170.0,
                "station": "Austin"
            }
        })
    }

    async fn execute(&self, args: ToolArgs) -> Result<ToolOutput, ToolError> {
        let units = args
            .get_string_opt("units")
            .map(|u| u.to_lowercase())
            .unwrap_or_else(|| "imperial".to_string());
        if !UNITS.contains(&units.as_str()) {
            return Err(ToolError::invalid("units", "expected imperial, metric or standard"));
        }

        let query = LocationQuery::from_args(&args)?;
        let location = self.resolver.resolve(&query).await?.location;

        let current = self.fetch_weather(location.lat, location.lon, &units).await?;
        let condition = current.weather.first();

        Ok(ToolOutput::success(json!({
            "status": true,
            "location": location,
            "units": units,
            "weather": {
                "condition": condition.map(|c| c.main.as_str()),
                "description": condition.map(|c| c.description.as_str()),
                "icon": condition.map(|c| c.icon.as_str()),
                "temperature": current.main.temp,
                "feelsLike": current.main.feels_like,
                "tempMin": current.main.temp_min,
                "tempMax": current.main.temp_max,
                "humidity": current.main.humidity,
                "pressure": current.main.pressure,
                "windSpeed": current.wind.speed,
                "windDeg": current.wind.deg,
                "station": current.name,
            }
        })))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use database::{location, Database, ResolvedLocation};
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn tool(server: &MockServer, api_key: Option<&str>) -> (Weather, ToolContext) {
        let config = ToolConfig {
            geocoder_url: server.uri(),
            openweather_url: server.uri(),
            openweather_api_key: api_key.map(str::to_string),
            ..Default::default()
        };
        let ctx = ToolContext::new(config, Database::in_memory().await.unwrap()).unwrap();
        let resolver = Arc::new(LocationResolver::new(&ctx));
        (Weather::new(&ctx, resolver), ctx)
    }

    async fn seed_austin(ctx: &ToolContext) {
        let austin = ResolvedLocation {
            zip_code: Some("78701".to_string()),
            lat: 30.27,
            lon: -97.74,
            city: Some("Austin".to_string()),
            state: Some("TX".to_string()),
            country: Some("US".to_string()),
            address: "Austin, TX 78701, US".to_string(),
        };
        location::upsert_location(ctx.db.pool(), r#"{"zipCode":"78701"}"#, &austin)
            .await
            .unwrap();
    }

    fn args(value: Value) -> ToolArgs {
        ToolArgs::from_value(value).unwrap()
    }

    #[tokio::test]
    async fn test_weather_uses_resolved_coordinates() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/data/2.5/weather"))
            .and(query_param("lat", "30.27"))
            .and(query_param("lon", "-97.74"))
            .and(query_param("units", "metric"))
            .and(query_param("appid", "owm-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "weather": [{"main": "Clouds", "description": "broken clouds", "icon": "04d"}],
                "main": {
                    "temp": 31.4, "feels_like": 33.0, "temp_min": 30.0,
                    "temp_max": 32.8, "humidity": 52, "pressure": 1012
                },
                "wind": {"speed": 4.1, "deg": 160},
                "name": "Austin"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let (weather, ctx) = tool(&server, Some("owm-key")).await;
        seed_austin(&ctx).await;

        let output = weather
            .execute(args(json!({"zipCode": "78701", "units": "Metric"})))
            .await
            .unwrap();

        assert!(output.success);
        assert_eq!(output.content["units"], "metric");
        assert_eq!(output.content["location"]["city"], "Austin");
        assert_eq!(output.content["weather"]["condition"], "Clouds");
        assert_eq!(output.content["weather"]["temperature"], 31.4);
        assert_eq!(output.content["weather"]["humidity"], 52.0);
    }

    #[tokio::test]
    async fn test_weather_rejects_unknown_units() {
        let server = MockServer::start().await;
        let (weather, _ctx) = tool(&server, Some("owm-key")).await;

        let err = weather
            .execute(args(json!({"zipCode": "78701", "units": "kelvin"})))
            .await
            .unwrap_err();
        assert!(err.is_client_error());
    }

    #[tokio::test]
    async fn test_weather_requires_api_key() {
        let server = MockServer::start().await;
        let (weather, ctx) = tool(&server, None).await;
        seed_austin(&ctx).await;

        let err = weather.execute(args(json!({"zipCode": "78701"}))).await.unwrap_err();
        assert_eq!(err.to_string(), "OPENWEATHER_API_KEY is not configured");
    }

    #[tokio::test]
    async fn test_weather_surfaces_upstream_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/data/2.5/weather"))
            .respond_with(
                ResponseTemplate::new(401).set_body_json(json!({"cod": 401, "message": "Invalid API key"})),
            )
            .mount(&server)
            .await;

        let (weather, ctx) = tool(&server, Some("bad")).await;
        seed_austin(&ctx).await;

        let err = weather.execute(args(json!({"zipCode": "78701"}))).await.unwrap_err();
        assert!(err.to_string().contains("Invalid API key"));
        assert!(!err.is_client_error());
    }
}
