use crate::{
    config::Config,
    model::{City, WeatherPayload},
    provider::openweather::OpenWeatherProvider,
};
use async_trait::async_trait;
use std::fmt::Debug;

pub mod openweather;

/// Classified result of a single weather request.
#[derive(Debug, Clone, PartialEq)]
pub enum RequestOutcome {
    Success(WeatherPayload),
    NotFound,
    Unauthorized,
    OtherHttpError(u16),
    Timeout,
    ConnectionFailure,
    MalformedResponse,
}

impl RequestOutcome {
    /// Map an HTTP status and body to an outcome.
    ///
    /// Only a 200 counts as success, and only if the body is a JSON object.
    pub fn from_response(status: u16, body: &str) -> Self {
        match status {
            200 => serde_json::from_str(body)
                .ok()
                .and_then(WeatherPayload::from_value)
                .map_or(RequestOutcome::MalformedResponse, RequestOutcome::Success),
            404 => RequestOutcome::NotFound,
            401 => RequestOutcome::Unauthorized,
            other => RequestOutcome::OtherHttpError(other),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, RequestOutcome::Success(_))
    }

    /// User-facing explanation for a failed request; `None` on success.
    pub fn failure_message(&self, city: &City) -> Option<String> {
        let msg = match self {
            RequestOutcome::Success(_) => return None,
            RequestOutcome::NotFound => {
                format!("City '{city}' not found. Please check spelling.")
            }
            RequestOutcome::Unauthorized => {
                "Invalid API key. Please check your credentials.".to_string()
            }
            RequestOutcome::OtherHttpError(code) => format!("API error: {code}"),
            RequestOutcome::Timeout => {
                "Request timed out. Check your internet connection.".to_string()
            }
            RequestOutcome::ConnectionFailure => {
                "Connection error. Check your internet connection.".to_string()
            }
            RequestOutcome::MalformedResponse => "Invalid JSON response from API".to_string(),
        };

        Some(msg)
    }
}

/// Source of current weather for a city.
///
/// Implementations perform at most one request per call, never retry, and
/// report every expected failure as a [`RequestOutcome`] variant.
#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    async fn fetch(&self, city: &City) -> RequestOutcome;
}

/// Construct the provider described by `config`, authenticated with `api_key`.
pub fn provider_from_config(
    config: &Config,
    api_key: String,
) -> anyhow::Result<Box<dyn WeatherProvider>> {
    let provider = OpenWeatherProvider::new(api_key, &config.base_url, config.timeout())?;
    Ok(Box::new(provider))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn city() -> City {
        City::try_from("Atlantis").unwrap()
    }

    #[test]
    fn ok_with_object_body_is_success() {
        let body = r#"{"name":"Miami","main":{"temp":28.5}}"#;
        let outcome = RequestOutcome::from_response(200, body);
        match outcome {
            RequestOutcome::Success(payload) => {
                assert_eq!(payload.number(&["main", "temp"]), Some(28.5));
            }
            other => panic!("expected success, got {other:?}"),
        }
    }

    #[test]
    fn ok_with_bad_body_is_malformed() {
        for body in ["", "<html>", "{\"name\":", "[1,2,3]", "42"] {
            assert_eq!(
                RequestOutcome::from_response(200, body),
                RequestOutcome::MalformedResponse,
                "body {body:?}"
            );
        }
    }

    #[test]
    fn status_codes_are_classified() {
        assert_eq!(RequestOutcome::from_response(404, ""), RequestOutcome::NotFound);
        assert_eq!(RequestOutcome::from_response(401, "{}"), RequestOutcome::Unauthorized);
        assert_eq!(
            RequestOutcome::from_response(500, "oops"),
            RequestOutcome::OtherHttpError(500)
        );
        assert_eq!(
            RequestOutcome::from_response(204, ""),
            RequestOutcome::OtherHttpError(204)
        );
    }

    #[test]
    fn failure_messages_are_distinct() {
        let failures = [
            RequestOutcome::NotFound,
            RequestOutcome::Unauthorized,
            RequestOutcome::OtherHttpError(503),
            RequestOutcome::Timeout,
            RequestOutcome::ConnectionFailure,
            RequestOutcome::MalformedResponse,
        ];

        let messages: Vec<String> = failures
            .iter()
            .map(|f| f.failure_message(&city()).expect("failure has a message"))
            .collect();

        for (i, a) in messages.iter().enumerate() {
            for b in &messages[i + 1..] {
                assert_ne!(a, b);
            }
        }
        assert!(messages[0].contains("Atlantis"));
        assert!(messages[2].contains("503"));
    }

    #[test]
    fn success_has_no_failure_message() {
        let outcome = RequestOutcome::Success(WeatherPayload::sample());
        assert!(outcome.is_success());
        assert_eq!(outcome.failure_message(&city()), None);
    }

    #[test]
    fn provider_from_config_builds_with_defaults() {
        let cfg = Config::default();
        let provider = provider_from_config(&cfg, "KEY".to_string());
        assert!(provider.is_ok());
    }
}
