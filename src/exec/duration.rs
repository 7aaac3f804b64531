// src/exec/duration.rs

use std::time::Duration;

/// Parse a short duration string such as `"500ms"`, `"3s"`, `"2m"` or `"1h"`.
///
/// Values that do not fit in a `Duration` are rejected rather than wrapped.
pub fn parse_duration(s: &str) -> Result<Duration, String> {
    let s = s.trim();
    let split = s.find(|c: char| !c.is_ascii_digit()).unwrap_or(s.len());
    let (digits, unit) = s.split_at(split);

    if digits.is_empty() {
        return Err(format!("duration '{s}' must start with a number"));
    }
    let value: u64 = digits
        .parse()
        .map_err(|e| format!("invalid duration number '{digits}': {e}"))?;

    let secs_per_unit: u64 = match unit.trim().to_ascii_lowercase().as_str() {
        "ms" => return Ok(Duration::from_millis(value)),
        "s" => 1,
        "m" => 60,
        "h" => 60 * 60,
        "" => return Err(format!("duration '{s}' is missing a unit (ms, s, m or h)")),
        other => {
            return Err(format!(
                "unsupported duration unit '{other}'; expected ms, s, m or h"
            ));
        }
    };

    value
        .checked_mul(secs_per_unit)
        .map(Duration::from_secs)
        .ok_or_else(|| format!("duration '{s}' is too large"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_supported_units() {
        assert_eq!(parse_duration("250ms"), Ok(Duration::from_millis(250)));
        assert_eq!(parse_duration(" 3s "), Ok(Duration::from_secs(3)));
        assert_eq!(parse_duration("2m"), Ok(Duration::from_secs(120)));
        assert_eq!(parse_duration("1h"), Ok(Duration::from_secs(3600)));
    }

    #[test]
    fn rejects_malformed_input() {
        assert!(parse_duration("").is_err());
        assert!(parse_duration("10").is_err());
        assert!(parse_duration("s").is_err());
        assert!(parse_duration("5d").is_err());
    }

    #[test]
    fn oversized_values_are_errors_not_overflows() {
        let err = parse_duration("9999999999999999999h").unwrap_err();
        assert!(err.contains("too large"), "unexpected message: {err}");
        assert!(parse_duration("307445734561825861m").is_err());
        // Largest whole-second value still fits.
        assert_eq!(
            parse_duration("18446744073709551615s"),
            Ok(Duration::from_secs(u64::MAX))
        );
        // Beyond u64 the number itself does not parse.
        assert!(parse_duration("99999999999999999999ms").is_err());
    }
}
