//! Rule-based advisories derived from a weather payload.

use crate::model::WeatherPayload;

const DEFAULT_TEMPERATURE: f64 = 20.0;
const DEFAULT_HUMIDITY: f64 = 0.0;

/// One piece of advice. Variants are declared in the order rules are
/// evaluated, which is also the order they are printed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advisory {
    Umbrella,
    WarmGear,
    StayIndoors,
    Hydrate,
    Outdoors,
    Freezing,
    Jacket,
    Muggy,
}

impl Advisory {
    pub fn message(&self) -> &'static str {
        match self {
            Advisory::Umbrella => "Don't forget your umbrella!",
            Advisory::WarmGear => "Dress warmly and wear boots!",
            Advisory::StayIndoors => "Stay indoors if possible!",
            Advisory::Hydrate => "Very hot! Stay hydrated and seek shade.",
            Advisory::Outdoors => "Great day for outdoor activities!",
            Advisory::Freezing => "Bundle up! It's freezing!",
            Advisory::Jacket => "Bring a jacket!",
            Advisory::Muggy => "High humidity - might feel muggy!",
        }
    }
}

/// Every advisory that applies to `payload`, in rule order.
///
/// Keyword and humidity rules fire independently; at most one
/// temperature band fires. Missing data falls back to 20°C, an empty
/// description and 0% humidity.
pub fn advisories(payload: &WeatherPayload) -> Vec<Advisory> {
    let temp = payload
        .number(&["main", "temp"])
        .unwrap_or(DEFAULT_TEMPERATURE);
    let humidity = payload
        .number(&["main", "humidity"])
        .unwrap_or(DEFAULT_HUMIDITY);
    let description = payload
        .text(&["weather", "0", "description"])
        .unwrap_or_default()
        .to_lowercase();

    let mut out = Vec::new();

    if description.contains("rain") || description.contains("drizzle") {
        out.push(Advisory::Umbrella);
    }
    if description.contains("snow") {
        out.push(Advisory::WarmGear);
    }
    if description.contains("thunder") || description.contains("storm") {
        out.push(Advisory::StayIndoors);
    }

    // 15..=25 is left without a band.
    if let Some(band) = temperature_band(temp) {
        out.push(band);
    }

    if humidity > 80.0 {
        out.push(Advisory::Muggy);
    }

    out
}

fn temperature_band(temp: f64) -> Option<Advisory> {
    if temp > 30.0 {
        Some(Advisory::Hydrate)
    } else if temp > 25.0 {
        Some(Advisory::Outdoors)
    } else if temp < 5.0 {
        Some(Advisory::Freezing)
    } else if temp < 15.0 {
        Some(Advisory::Jacket)
    } else {
        None
    }
}

/// Recommendation block printed after the report.
pub fn recommend(payload: &WeatherPayload) -> String {
    let fired = advisories(payload);

    if fired.is_empty() {
        return "Recommendation: Enjoy your day!".to_string();
    }

    let mut out = String::from("Recommendations:");
    for advisory in fired {
        out.push_str("\n   ");
        out.push_str(advisory.message());
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn conditions(temp: f64, description: &str, humidity: f64) -> WeatherPayload {
        WeatherPayload::try_from(json!({
            "main": { "temp": temp, "humidity": humidity },
            "weather": [{ "description": description }]
        }))
        .unwrap()
    }

    fn at(temp: f64) -> Vec<Advisory> {
        advisories(&conditions(temp, "clear sky", 50.0))
    }

    #[test]
    fn miami_sample_only_suggests_outdoors() {
        let payload = WeatherPayload::sample();
        assert_eq!(advisories(&payload), vec![Advisory::Outdoors]);
        assert_eq!(
            recommend(&payload),
            "Recommendations:\n   Great day for outdoor activities!"
        );
    }

    #[test]
    fn band_boundaries() {
        assert_eq!(at(30.0), vec![Advisory::Outdoors]);
        assert_eq!(at(30.1), vec![Advisory::Hydrate]);
        assert_eq!(at(25.0), Vec::<Advisory>::new());
        assert_eq!(at(25.5), vec![Advisory::Outdoors]);
        assert_eq!(at(15.0), Vec::<Advisory>::new());
        assert_eq!(at(14.9), vec![Advisory::Jacket]);
        assert_eq!(at(5.0), vec![Advisory::Jacket]);
        assert_eq!(at(4.9), vec![Advisory::Freezing]);
        assert_eq!(at(-20.0), vec![Advisory::Freezing]);
    }

    #[test]
    fn storm_and_heat_combine_with_storm_first() {
        let fired = advisories(&conditions(32.0, "thunderstorm", 40.0));
        assert_eq!(fired, vec![Advisory::StayIndoors, Advisory::Hydrate]);
    }

    #[test]
    fn keyword_rules_fire_independently() {
        let fired = advisories(&conditions(0.0, "Thunderstorm with light RAIN and snow", 95.0));
        assert_eq!(
            fired,
            vec![
                Advisory::Umbrella,
                Advisory::WarmGear,
                Advisory::StayIndoors,
                Advisory::Freezing,
                Advisory::Muggy,
            ]
        );
    }

    #[test]
    fn drizzle_needs_an_umbrella() {
        let fired = advisories(&conditions(18.0, "light intensity drizzle", 60.0));
        assert_eq!(fired, vec![Advisory::Umbrella]);
    }

    #[test]
    fn humidity_threshold_is_exclusive() {
        assert!(advisories(&conditions(20.0, "", 80.0)).is_empty());
        assert_eq!(advisories(&conditions(20.0, "", 81.0)), vec![Advisory::Muggy]);
    }

    #[test]
    fn never_more_than_one_band() {
        let bands = [
            Advisory::Hydrate,
            Advisory::Outdoors,
            Advisory::Freezing,
            Advisory::Jacket,
        ];
        for tenth in -400..=500 {
            let fired = at(f64::from(tenth) / 10.0);
            let count = fired.iter().filter(|a| bands.contains(a)).count();
            assert!(count <= 1, "{} fired {count} bands", f64::from(tenth) / 10.0);
        }
    }

    #[test]
    fn empty_payload_uses_defaults() {
        let payload = WeatherPayload::try_from(json!({})).unwrap();
        assert!(advisories(&payload).is_empty());
        assert_eq!(recommend(&payload), "Recommendation: Enjoy your day!");
    }

    #[test]
    fn multiple_advisories_are_one_per_line() {
        let text = recommend(&conditions(2.0, "snow", 85.0));
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(
            lines,
            [
                "Recommendations:",
                "   Dress warmly and wear boots!",
                "   Bundle up! It's freezing!",
                "   High humidity - might feel muggy!",
            ]
        );
    }
}
