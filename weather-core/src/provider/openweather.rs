use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, instrument, warn};

use crate::{model::City, provider::RequestOutcome};

use super::WeatherProvider;

/// Current-weather client for the OpenWeather `/weather` endpoint.
#[derive(Debug, Clone)]
pub struct OpenWeatherProvider {
    api_key: String,
    base_url: String,
    http: Client,
}

impl OpenWeatherProvider {
    /// `base_url` is the API root, e.g. `https://api.openweathermap.org/data/2.5`.
    /// `timeout` bounds the whole request, body included.
    pub fn new(api_key: String, base_url: &str, timeout: Duration) -> Result<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client for OpenWeather")?;

        Ok(Self {
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            http,
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/weather", self.base_url)
    }
}

#[async_trait]
impl WeatherProvider for OpenWeatherProvider {
    #[instrument(skip_all, fields(city = %city))]
    async fn fetch(&self, city: &City) -> RequestOutcome {
        let url = self.endpoint();
        debug!(%url, "requesting current weather");

        let res = match self
            .http
            .get(&url)
            .query(&[
                ("q", city.as_str()),
                ("appid", self.api_key.as_str()),
                ("units", "metric"),
            ])
            .send()
            .await
        {
            Ok(res) => res,
            Err(err) => return transport_failure(&err),
        };

        let status = res.status().as_u16();
        let body = match res.text().await {
            Ok(body) => body,
            Err(err) => return transport_failure(&err),
        };

        let outcome = RequestOutcome::from_response(status, &body);
        if !outcome.is_success() {
            debug!(status, body = %truncate_body(&body), "OpenWeather request failed");
        }
        outcome
    }
}

fn transport_failure(err: &reqwest::Error) -> RequestOutcome {
    warn!(error = %err, "OpenWeather transport error");
    if err.is_timeout() {
        RequestOutcome::Timeout
    } else {
        RequestOutcome::ConnectionFailure
    }
}

fn truncate_body(body: &str) -> &str {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => &body[..idx],
        None => body,
    }
}
