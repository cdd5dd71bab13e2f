use chrono::Local;
use skycast_core::{InsightResult, WeatherSnapshot};

/// Glyph for an OpenWeather icon id such as `10d`.
fn icon_glyph(icon: &str) -> &'static str {
    match icon.get(..2).unwrap_or_default() {
        "01" => "☀",
        "02" => "⛅",
        "03" | "04" => "☁",
        "09" | "10" => "🌧",
        "11" => "⛈",
        "13" => "❄",
        "50" => "🌫",
        _ => "·",
    }
}

pub fn weather(snapshot: &WeatherSnapshot) -> String {
    let updated = snapshot.fetched_at.with_timezone(&Local).format("%H:%M");
    let place = match (snapshot.location_name.as_str(), snapshot.country.as_str()) {
        ("", "") => "Unnamed location".to_string(),
        (name, "") => name.to_string(),
        ("", country) => country.to_string(),
        (name, country) => format!("{name}, {country}"),
    };

    format!(
        "{glyph}  {place}: {description}\n\
         \x20  Temperature: {temp:.0}°C (feels like {feels:.0}°C)\n\
         \x20  Humidity:    {humidity}%\n\
         \x20  Wind:        {wind:.1} m/s\n\
         \x20  Updated:     {updated}",
        glyph = icon_glyph(&snapshot.condition.icon),
        description = snapshot.condition.description,
        temp = snapshot.temperature,
        feels = snapshot.feels_like,
        humidity = snapshot.humidity_pct,
        wind = snapshot.wind_speed_mps,
    )
}

pub fn insight(insight: &InsightResult) -> String {
    format!(
        "   Summary:  {}\n   Wear:     {}\n   Fun fact: {}",
        insight.summary, insight.outfit_advice, insight.fun_fact
    )
}

pub fn json(snapshot: &WeatherSnapshot, insight: Option<&InsightResult>) -> anyhow::Result<String> {
    let value = serde_json::json!({
        "weather": snapshot,
        "insight": insight,
    });
    Ok(serde_json::to_string_pretty(&value)?)
}
