//! Current weather by city, with IP geolocation when no city is given.

use futures_util::future::BoxFuture;
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::{AssistantError, AssistantResult};
use crate::speech::Speaker;

#[derive(Debug, Clone, PartialEq)]
pub struct WeatherReport {
    /// Degrees Celsius.
    pub temperature: f64,
    pub description: String,
}

pub trait WeatherService: Send + Sync {
    /// `Ok(None)` when the service has no report for the city.
    fn current<'a>(&'a self, city: &'a str)
        -> BoxFuture<'a, anyhow::Result<Option<WeatherReport>>>;
}

pub trait Geolocator: Send + Sync {
    /// City of the caller's public IP, if the service could tell.
    fn city(&self) -> BoxFuture<'_, anyhow::Result<Option<String>>>;
}

/// OpenWeatherMap current-weather client (metric units).
pub struct OpenWeatherClient {
    url: String,
    api_key: Option<String>,
    client: reqwest::Client,
}

impl OpenWeatherClient {
    pub fn new(url: &str, api_key: Option<String>, client: reqwest::Client) -> Self {
        Self {
            url: url.to_string(),
            api_key,
            client,
        }
    }
}

impl WeatherService for OpenWeatherClient {
    fn current<'a>(
        &'a self,
        city: &'a str,
    ) -> BoxFuture<'a, anyhow::Result<Option<WeatherReport>>> {
        Box::pin(async move {
            let key = self
                .api_key
                .as_deref()
                .ok_or_else(|| anyhow::anyhow!("No weather API key configured"))?;
            // Unknown cities come back as 404 with a JSON body, so the
            // status is read from `cod` rather than the HTTP status.
            let json: Value = self
                .client
                .get(&self.url)
                .query(&[("q", city), ("appid", key), ("units", "metric")])
                .send()
                .await?
                .json()
                .await?;
            debug!(city = %city, cod = %json["cod"], "Weather response");
            parse_weather(&json)
        })
    }
}

/// `cod` is a number on success and a string on most errors.
fn response_code(json: &Value) -> Option<i64> {
    match &json["cod"] {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn parse_weather(json: &Value) -> anyhow::Result<Option<WeatherReport>> {
    match response_code(json) {
        Some(200) => {
            let temperature = json["main"]["temp"]
                .as_f64()
                .ok_or_else(|| anyhow::anyhow!("Weather response has no temperature"))?;
            let description = json["weather"][0]["description"]
                .as_str()
                .unwrap_or_default()
                .to_string();
            Ok(Some(WeatherReport {
                temperature,
                description,
            }))
        }
        // Every other status reads as an unknown location.
        code => {
            warn!(
                ?code,
                message = json["message"].as_str().unwrap_or_default(),
                "Weather service returned no report"
            );
            Ok(None)
        }
    }
}

/// ipinfo.io lookup.
pub struct IpInfoClient {
    url: String,
    client: reqwest::Client,
}

impl IpInfoClient {
    pub fn new(url: &str, client: reqwest::Client) -> Self {
        Self {
            url: url.to_string(),
            client,
        }
    }
}

impl Geolocator for IpInfoClient {
    fn city(&self) -> BoxFuture<'_, anyhow::Result<Option<String>>> {
        Box::pin(async move {
            let json: Value = self
                .client
                .get(&self.url)
                .header(reqwest::header::ACCEPT, "application/json")
                .send()
                .await?
                .error_for_status()?
                .json()
                .await?;
            Ok(json["city"]
                .as_str()
                .map(str::trim)
                .filter(|c| !c.is_empty())
                .map(str::to_string))
        })
    }
}

/// Weather for `city`, or for the detected location when `city` is `None`.
///
/// The detected city is announced before the report.
pub async fn show_weather(
    weather: &dyn WeatherService,
    geolocator: &dyn Geolocator,
    speaker: &dyn Speaker,
    city: Option<&str>,
) -> AssistantResult<String> {
    let city = match city {
        Some(city) => city.to_string(),
        None => {
            let detected = geolocator.city().await.map_err(|e| {
                AssistantError::service("There was a problem detecting your location.", e)
            })?;
            let city = detected.ok_or_else(|| {
                AssistantError::not_found("Couldn't detect your current city. Please specify it.")
            })?;
            speaker
                .speak(&format!(
                    "Showing weather for your current location: {}",
                    city
                ))
                .await;
            city
        }
    };

    match weather.current(&city).await {
        Ok(Some(report)) => Ok(format!(
            "The temperature in {} is {} degrees Celsius with {}.",
            city, report.temperature, report.description
        )),
        Ok(None) => Err(AssistantError::not_found(
            "Sorry, I couldn't find the weather for that location.",
        )),
        Err(e) => Err(AssistantError::service(
            "Something went wrong while fetching the weather.",
            e,
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::handlers::fakes::RecordingSpeaker;
    use serde_json::json;

    struct FixedWeather(Option<WeatherReport>);

    impl WeatherService for FixedWeather {
        fn current<'a>(
            &'a self,
            city: &'a str,
        ) -> BoxFuture<'a, anyhow::Result<Option<WeatherReport>>> {
            Box::pin(async move {
                if city == "offline" {
                    anyhow::bail!("network down");
                }
                Ok(self.0.clone())
            })
        }
    }

    struct FixedLocation(Result<Option<&'static str>, ()>);

    impl Geolocator for FixedLocation {
        fn city(&self) -> BoxFuture<'_, anyhow::Result<Option<String>>> {
            Box::pin(async move {
                match self.0 {
                    Ok(city) => Ok(city.map(str::to_string)),
                    Err(()) => anyhow::bail!("timeout"),
                }
            })
        }
    }

    fn sunny() -> FixedWeather {
        FixedWeather(Some(WeatherReport {
            temperature: 21.5,
            description: "clear sky".into(),
        }))
    }

    #[test]
    fn test_parse_weather_codes() {
        let ok = json!({"cod": 200, "main": {"temp": 18}, "weather": [{"description": "light rain"}]});
        assert_eq!(
            parse_weather(&ok).unwrap(),
            Some(WeatherReport {
                temperature: 18.0,
                description: "light rain".into()
            })
        );
        assert_eq!(parse_weather(&json!({"cod": "404", "message": "city not found"})).unwrap(), None);
        assert!(parse_weather(&json!({"cod": 200, "main": {}})).is_err());
    }

    #[test]
    fn test_any_other_code_is_unknown_location() {
        let bad_key = json!({"cod": 401, "message": "Invalid API key"});
        assert_eq!(parse_weather(&bad_key).unwrap(), None);
        assert_eq!(parse_weather(&json!({"cod": "500"})).unwrap(), None);
        assert_eq!(parse_weather(&json!({})).unwrap(), None);
    }

    #[tokio::test]
    async fn test_named_city() {
        let speaker = RecordingSpeaker::default();
        let text = show_weather(&sunny(), &FixedLocation(Ok(None)), &speaker, Some("london"))
            .await
            .unwrap();
        assert_eq!(
            text,
            "The temperature in london is 21.5 degrees Celsius with clear sky."
        );
        assert!(speaker.spoken().is_empty());
    }

    #[tokio::test]
    async fn test_detected_city_is_announced() {
        let speaker = RecordingSpeaker::default();
        let text = show_weather(&sunny(), &FixedLocation(Ok(Some("Paris"))), &speaker, None)
            .await
            .unwrap();
        assert!(text.starts_with("The temperature in Paris is"));
        assert_eq!(
            speaker.spoken(),
            vec!["Showing weather for your current location: Paris"]
        );
    }

    #[tokio::test]
    async fn test_location_failures() {
        let speaker = RecordingSpeaker::default();
        let err = show_weather(&sunny(), &FixedLocation(Ok(None)), &speaker, None)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);

        let err = show_weather(&sunny(), &FixedLocation(Err(())), &speaker, None)
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "There was a problem detecting your location.");
    }

    #[tokio::test]
    async fn test_unknown_city_and_outage() {
        let speaker = RecordingSpeaker::default();
        let location = FixedLocation(Ok(None));
        let err = show_weather(&FixedWeather(None), &location, &speaker, Some("atlantis"))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);

        let err = show_weather(&sunny(), &location, &speaker, Some("offline"))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Service);
    }
}
