//! ISO-8601 duration codec used for refresh rates
//!
//! Only fixed-length designators are supported: weeks, days, hours, minutes
//! and (fractional) seconds. Years and months have no fixed length and are
//! rejected.

use crate::definition::DefinitionError;
use std::fmt::Write;
use std::time::Duration;

const SECONDS_PER_MINUTE: u64 = 60;
const SECONDS_PER_HOUR: u64 = 60 * SECONDS_PER_MINUTE;
const SECONDS_PER_DAY: u64 = 24 * SECONDS_PER_HOUR;
const SECONDS_PER_WEEK: u64 = 7 * SECONDS_PER_DAY;

fn invalid(text: &str, reason: &str) -> DefinitionError {
    DefinitionError::InvalidDuration(format!("{} ({})", text, reason))
}

/// Split `5H30M` into `[("5", 'H'), ("30", 'M')]`
fn split_components<'a>(part: &'a str, original: &str) -> Result<Vec<(&'a str, char)>, DefinitionError> {
    let mut components = Vec::new();
    let mut start = 0;

    for (index, ch) in part.char_indices() {
        if ch.is_ascii_alphabetic() {
            let number = &part[start..index];
            if number.is_empty() {
                return Err(invalid(original, "designator without a number"));
            }
            components.push((number, ch.to_ascii_uppercase()));
            start = index + ch.len_utf8();
        }
    }

    if start != part.len() {
        return Err(invalid(original, "number without a designator"));
    }

    Ok(components)
}

fn parse_whole(number: &str, original: &str) -> Result<u64, DefinitionError> {
    if !number.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid(original, "expected a whole number"));
    }
    number
        .parse::<u64>()
        .map_err(|_| invalid(original, "number too large"))
}

/// Parse seconds, allowing a `.` or `,` decimal fraction
fn parse_seconds(number: &str, original: &str) -> Result<Duration, DefinitionError> {
    let (whole, fraction) = match number.find(['.', ',']) {
        Some(pos) => (&number[..pos], &number[pos + 1..]),
        None => (number, ""),
    };

    if whole.is_empty() {
        return Err(invalid(original, "missing whole seconds"));
    }
    let seconds = parse_whole(whole, original)?;

    if !fraction.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid(original, "malformed fraction"));
    }
    // Nanosecond precision; extra digits are truncated
    let mut nanos: u32 = 0;
    for (i, digit) in fraction.bytes().take(9).enumerate() {
        nanos += u32::from(digit - b'0') * 10u32.pow(8 - i as u32);
    }

    Ok(Duration::new(seconds, nanos))
}

fn scaled(value: u64, unit: u64, original: &str) -> Result<u64, DefinitionError> {
    value
        .checked_mul(unit)
        .ok_or_else(|| invalid(original, "duration too large"))
}

/// Parse an ISO-8601 duration such as `PT5S`, `PT1H30M` or `P1DT12H`.
pub fn parse_iso8601_duration(text: &str) -> Result<Duration, DefinitionError> {
    let original = text.trim();
    let body = original
        .strip_prefix(['P', 'p'])
        .ok_or_else(|| invalid(original, "missing 'P' prefix"))?;

    let (date_part, time_part) = match body.find(['T', 't']) {
        Some(pos) => (&body[..pos], Some(&body[pos + 1..])),
        None => (body, None),
    };

    if date_part.is_empty() && time_part.map_or(true, str::is_empty) {
        return Err(invalid(original, "no components"));
    }

    let mut total_seconds: u64 = 0;
    let mut nanos: u32 = 0;

    // Designators must appear at most once and in descending order
    let mut last_rank = 0;
    for (number, designator) in split_components(date_part, original)? {
        let (rank, unit) = match designator {
            'Y' | 'M' => return Err(invalid(original, "years and months are not supported")),
            'W' => (1, SECONDS_PER_WEEK),
            'D' => (2, SECONDS_PER_DAY),
            _ => return Err(invalid(original, "unknown date designator")),
        };
        if rank <= last_rank {
            return Err(invalid(original, "designators out of order"));
        }
        last_rank = rank;

        let value = scaled(parse_whole(number, original)?, unit, original)?;
        total_seconds = total_seconds
            .checked_add(value)
            .ok_or_else(|| invalid(original, "duration too large"))?;
    }

    if let Some(time_part) = time_part {
        if time_part.is_empty() {
            return Err(invalid(original, "empty time part"));
        }

        let mut last_rank = 0;
        for (number, designator) in split_components(time_part, original)? {
            let rank = match designator {
                'H' => 1,
                'M' => 2,
                'S' => 3,
                _ => return Err(invalid(original, "unknown time designator")),
            };
            if rank <= last_rank {
                return Err(invalid(original, "designators out of order"));
            }
            last_rank = rank;

            let value = match designator {
                'H' => scaled(parse_whole(number, original)?, SECONDS_PER_HOUR, original)?,
                'M' => scaled(parse_whole(number, original)?, SECONDS_PER_MINUTE, original)?,
                _ => {
                    let seconds = parse_seconds(number, original)?;
                    nanos = seconds.subsec_nanos();
                    seconds.as_secs()
                }
            };
            total_seconds = total_seconds
                .checked_add(value)
                .ok_or_else(|| invalid(original, "duration too large"))?;
        }
    }

    Ok(Duration::new(total_seconds, nanos))
}

/// Format a duration in canonical ISO-8601 form (`PT1H30M5S`, `P1DT2S`, `PT0S`).
///
/// Canonical input strings survive a parse/format round trip unchanged.
pub fn format_iso8601_duration(duration: Duration) -> String {
    let total = duration.as_secs();
    let nanos = duration.subsec_nanos();

    let days = total / SECONDS_PER_DAY;
    let hours = (total % SECONDS_PER_DAY) / SECONDS_PER_HOUR;
    let minutes = (total % SECONDS_PER_HOUR) / SECONDS_PER_MINUTE;
    let seconds = total % SECONDS_PER_MINUTE;

    let mut out = String::from("P");
    if days > 0 {
        let _ = write!(out, "{}D", days);
    }

    let has_time = hours > 0 || minutes > 0 || seconds > 0 || nanos > 0;
    if has_time || days == 0 {
        out.push('T');
        if hours > 0 {
            let _ = write!(out, "{}H", hours);
        }
        if minutes > 0 {
            let _ = write!(out, "{}M", minutes);
        }
        if nanos > 0 {
            let fraction = format!("{:09}", nanos);
            let _ = write!(out, "{}.{}S", seconds, fraction.trim_end_matches('0'));
        } else if seconds > 0 || !has_time {
            let _ = write!(out, "{}S", seconds);
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_time_components() {
        assert_eq!(parse_iso8601_duration("PT5S").unwrap(), Duration::from_secs(5));
        assert_eq!(parse_iso8601_duration("PT2M").unwrap(), Duration::from_secs(120));
        assert_eq!(
            parse_iso8601_duration("PT1H30M5S").unwrap(),
            Duration::from_secs(3600 + 1800 + 5)
        );
    }

    #[test]
    fn test_parse_date_components() {
        assert_eq!(parse_iso8601_duration("P1D").unwrap(), Duration::from_secs(86_400));
        assert_eq!(parse_iso8601_duration("P2W").unwrap(), Duration::from_secs(2 * 604_800));
        assert_eq!(
            parse_iso8601_duration("P1DT12H").unwrap(),
            Duration::from_secs(86_400 + 12 * 3600)
        );
    }

    #[test]
    fn test_parse_fractional_seconds() {
        assert_eq!(
            parse_iso8601_duration("PT2.5S").unwrap(),
            Duration::from_millis(2500)
        );
        assert_eq!(
            parse_iso8601_duration("PT1,25S").unwrap(),
            Duration::from_millis(1250)
        );
    }

    #[test]
    fn test_parse_rejects_malformed_input() {
        for text in ["", "5S", "P", "PT", "PT5", "PTS", "P1Y", "P1M", "PT5S1M", "PT1.5M", "PT-5S", "PT5X"] {
            assert!(
                matches!(parse_iso8601_duration(text), Err(DefinitionError::InvalidDuration(_))),
                "{:?} should be rejected",
                text
            );
        }
    }

    #[test]
    fn test_format_canonical_forms() {
        assert_eq!(format_iso8601_duration(Duration::ZERO), "PT0S");
        assert_eq!(format_iso8601_duration(Duration::from_secs(5)), "PT5S");
        assert_eq!(format_iso8601_duration(Duration::from_secs(3600)), "PT1H");
        assert_eq!(format_iso8601_duration(Duration::from_secs(86_400)), "P1D");
        assert_eq!(format_iso8601_duration(Duration::from_secs(86_402)), "P1DT2S");
        assert_eq!(format_iso8601_duration(Duration::from_millis(2500)), "PT2.5S");
    }

    #[test]
    fn test_canonical_text_survives_round_trip() {
        for text in ["PT3S", "PT1M30S", "PT1H30M5S", "P1DT12H", "PT0.25S"] {
            let parsed = parse_iso8601_duration(text).unwrap();
            assert_eq!(format_iso8601_duration(parsed), text);
        }
    }
}
