use chrono::Duration;
use serde::Serializer;

/// Formats a duration as an ISO-8601 duration string, e.g. `PT1M23.456S`.
///
/// Lap and sector times never reach an hour, so only minute and second
/// components are emitted.
pub fn format_duration(duration: &Duration) -> String {
    let ms = duration.num_milliseconds();
    let (sign, ms) = if ms < 0 { ("-", -ms) } else { ("", ms) };
    let minutes = ms / 60_000;
    let seconds = (ms % 60_000) as f64 / 1000.0;
    if minutes > 0 {
        format!("{sign}PT{minutes}M{seconds:.3}S")
    } else {
        format!("{sign}PT{seconds:.3}S")
    }
}

pub fn serialize_option_duration<S>(
    value: &Option<Duration>,
    serializer: S,
) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match value {
        Some(duration) => serializer.serialize_str(&format_duration(duration)),
        None => serializer.serialize_none(),
    }
}
