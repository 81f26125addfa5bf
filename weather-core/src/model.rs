use anyhow::anyhow;
use chrono::{Local, SecondsFormat};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::fmt;

/// A city name as typed by the user, trimmed and guaranteed non-empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct City(String);

impl City {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for City {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<&str> for City {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(anyhow!("City name must not be empty."));
        }

        Ok(City(trimmed.to_string()))
    }
}

/// Parsed body of a successful provider response.
///
/// The provider's shape is a convention, not a contract: any key may be
/// missing, so every read goes through [`WeatherPayload::lookup`], which
/// yields `None` instead of failing. The wrapped value is always a JSON
/// object.
#[derive(Debug, Clone, PartialEq)]
pub struct WeatherPayload(Value);

impl WeatherPayload {
    /// Wrap a JSON value; only objects are accepted.
    pub fn from_value(value: Value) -> Option<Self> {
        value.is_object().then_some(Self(value))
    }

    /// Walk `path` through nested objects and arrays. Array steps are
    /// numeric segments, e.g. `["weather", "0", "description"]`.
    /// Missing keys, out-of-range indices, type mismatches and JSON
    /// `null` all resolve to `None`.
    pub fn lookup(&self, path: &[&str]) -> Option<&Value> {
        path.iter()
            .try_fold(&self.0, |node, segment| match node {
                Value::Object(map) => map.get(*segment),
                Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
                _ => None,
            })
            .filter(|value| !value.is_null())
    }

    /// Numeric field at `path`, if present and numeric.
    pub fn number(&self, path: &[&str]) -> Option<f64> {
        self.lookup(path).and_then(Value::as_f64)
    }

    /// String field at `path`, if present and a string.
    pub fn text(&self, path: &[&str]) -> Option<&str> {
        self.lookup(path).and_then(Value::as_str)
    }

    /// Field at `path` rendered for display, or `default` when absent.
    pub fn display_or(&self, path: &[&str], default: &str) -> String {
        match self.lookup(path) {
            Some(Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
            None => default.to_string(),
        }
    }

    /// Canned response used by the offline `sample` mode.
    pub fn sample() -> Self {
        Self(json!({
            "name": "Miami",
            "main": {
                "temp": 28.5,
                "feels_like": 30.2,
                "humidity": 75,
                "pressure": 1012
            },
            "weather": [
                { "description": "scattered clouds", "main": "Clouds" }
            ],
            "wind": { "speed": 4.5 }
        }))
    }
}

impl TryFrom<Value> for WeatherPayload {
    type Error = anyhow::Error;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        Self::from_value(value).ok_or_else(|| anyhow!("Weather payload must be a JSON object"))
    }
}

/// One line of the history log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryEntry {
    pub timestamp: String,
    pub city: String,
    #[serde(default)]
    pub temperature: Option<f64>,
    #[serde(default)]
    pub description: Option<String>,
}

impl QueryEntry {
    /// Entry for a query answered now, stamped with local time.
    pub fn new(city: &City, payload: &WeatherPayload) -> Self {
        let timestamp = Local::now().to_rfc3339_opts(SecondsFormat::Micros, false);
        Self::at(timestamp, city, payload)
    }

    pub fn at(timestamp: impl Into<String>, city: &City, payload: &WeatherPayload) -> Self {
        Self {
            timestamp: timestamp.into(),
            city: city.as_str().to_string(),
            temperature: payload.number(&["main", "temp"]),
            description: payload
                .text(&["weather", "0", "description"])
                .map(str::to_string),
        }
    }

    /// `timestamp | city: temp°C, description`, with the timestamp cut to
    /// whole seconds.
    pub fn summary_line(&self) -> String {
        let timestamp = self.timestamp.get(..19).unwrap_or(&self.timestamp);
        let temperature = self
            .temperature
            .map(|t| t.to_string())
            .unwrap_or_else(|| "N/A".to_string());
        let description = self.description.as_deref().unwrap_or("N/A");

        format!("{timestamp} | {}: {temperature}°C, {description}", self.city)
    }
}

/// One element of the persisted `queries` list.
///
/// Elements that do not match [`QueryEntry`] are kept verbatim so that a
/// rewrite never drops them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum HistoryRecord {
    Entry(QueryEntry),
    Unrecognized(Value),
}

/// The full persisted history. Unknown keys are ignored on read.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HistoryDocument {
    #[serde(default)]
    pub queries: Vec<HistoryRecord>,
}

impl HistoryDocument {
    pub fn push(&mut self, entry: QueryEntry) {
        self.queries.push(HistoryRecord::Entry(entry));
    }

    /// Well-formed entries, oldest first.
    pub fn entries(&self) -> impl DoubleEndedIterator<Item = &QueryEntry> {
        self.queries.iter().filter_map(|record| match record {
            HistoryRecord::Entry(entry) => Some(entry),
            HistoryRecord::Unrecognized(_) => None,
        })
    }

    /// At most the last `n` well-formed entries, oldest first.
    pub fn tail(&self, n: usize) -> Vec<QueryEntry> {
        let mut out: Vec<QueryEntry> = self.entries().rev().take(n).cloned().collect();
        out.reverse();
        out
    }

    /// Number of stored records, including unrecognized ones.
    pub fn len(&self) -> usize {
        self.queries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queries.is_empty()
    }
}
