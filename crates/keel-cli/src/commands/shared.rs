use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;

/// Parse a snake_case enum value using serde-deserialization.
pub fn parse_enum<T>(raw: &str, field: &str) -> anyhow::Result<T>
where
    T: DeserializeOwned,
{
    let normalized = raw.trim().to_lowercase().replace('-', "_");
    let json = format!("\"{normalized}\"");
    serde_json::from_str(&json).map_err(|error| anyhow::anyhow!("invalid {field} '{raw}': {error}"))
}

/// Parse an optional enum flag.
pub fn parse_opt_enum<T>(raw: Option<&str>, field: &str) -> anyhow::Result<Option<T>>
where
    T: DeserializeOwned,
{
    raw.map(|value| parse_enum(value, field)).transpose()
}

/// Parse an RFC 3339 timestamp, defaulting to now.
pub fn parse_timestamp(raw: Option<&str>) -> anyhow::Result<DateTime<Utc>> {
    raw.map_or_else(
        || Ok(Utc::now()),
        |value| {
            DateTime::parse_from_rfc3339(value)
                .map(|dt| dt.with_timezone(&Utc))
                .map_err(|error| anyhow::anyhow!("invalid timestamp '{value}': {error}"))
        },
    )
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use keel_core::enums::{AuditAction, DecisionStatus, Severity};
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn parses_snake_case_enum() {
        let status: DecisionStatus = parse_enum("accepted", "status").expect("status should parse");
        assert_eq!(status, DecisionStatus::Accepted);
    }

    #[test]
    fn parses_hyphenated_alias() {
        let action: AuditAction =
            parse_enum("status-changed", "action").expect("action should parse");
        assert_eq!(action, AuditAction::StatusChanged);
    }

    #[test]
    fn errors_on_invalid_enum() {
        let err = parse_enum::<Severity>("severe", "severity").expect_err("should fail");
        assert!(err.to_string().contains("invalid severity 'severe'"));
    }

    #[test]
    fn missing_optional_enum_is_none() {
        let status: Option<DecisionStatus> =
            parse_opt_enum(None, "status").expect("none should parse");
        assert_eq!(status, None);
    }

    #[test]
    fn timestamps_are_normalized_to_utc() {
        let at = parse_timestamp(Some("2026-03-01T10:00:00+02:00")).expect("should parse");
        assert_eq!(at, Utc.with_ymd_and_hms(2026, 3, 1, 8, 0, 0).unwrap());
        assert!(parse_timestamp(Some("yesterday")).is_err());
    }
}
