//! Human-readable weather report.

use crate::model::WeatherPayload;

const MISSING: &str = "N/A";
const RULE: &str = "══════════════════════════════════════════";

/// Render the fixed-layout report block for `payload`.
///
/// Absent fields show as `N/A` (the city as `Unknown`); this never fails.
pub fn format_report(payload: &WeatherPayload) -> String {
    let city = payload.display_or(&["name"], "Unknown");
    let temp = payload.display_or(&["main", "temp"], MISSING);
    let feels_like = payload.display_or(&["main", "feels_like"], MISSING);
    let humidity = payload.display_or(&["main", "humidity"], MISSING);
    let description = payload.display_or(&["weather", "0", "description"], MISSING);
    let wind_speed = payload.display_or(&["wind", "speed"], MISSING);

    format!(
        "╔{RULE}\n\
         ║ Weather in {}\n\
         ╠{RULE}\n\
         ║ Temperature: {temp}°C (feels like {feels_like}°C)\n\
         ║ Conditions:  {}\n\
         ║ Humidity:    {humidity}%\n\
         ║ Wind Speed:  {wind_speed} m/s\n\
         ╚{RULE}",
        title_case(&city),
        title_case(&description),
    )
}

/// Upper-case the first letter of every word and lower-case the rest.
/// A word starts after any non-alphabetic character.
pub fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_word = false;

    for ch in text.chars() {
        if ch.is_alphabetic() {
            if in_word {
                out.extend(ch.to_lowercase());
            } else {
                out.extend(ch.to_uppercase());
            }
            in_word = true;
        } else {
            out.push(ch);
            in_word = false;
        }
    }

    out
}
