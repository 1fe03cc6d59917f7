/*!
HL7 `YYYYMMDDHHMMSS` timestamps.
*/

use crate::error::{Hl7Error, Result};
use chrono::{Local, NaiveDateTime};

/// chrono format string for HL7 timestamps
pub const FORMAT: &str = "%Y%m%d%H%M%S";

/// Current local time as an HL7 timestamp
pub fn now() -> String {
    format(&Local::now().naive_local())
}

/// Render a date-time as an HL7 timestamp
pub fn format(datetime: &NaiveDateTime) -> String {
    datetime.format(FORMAT).to_string()
}

/// Parse an HL7 timestamp; `field` names the source for the error
pub fn parse(value: &str, field: &str) -> Result<NaiveDateTime> {
    if value.len() != 14 {
        return Err(Hl7Error::invalid_field(
            "TS",
            field,
            format!("expected 14 digits (YYYYMMDDHHMMSS), got {:?}", value),
        ));
    }
    NaiveDateTime::parse_from_str(value, FORMAT)
        .map_err(|e| Hl7Error::invalid_field("TS", field, format!("{:?}: {}", value, e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    #[test]
    fn test_parse_and_format() {
        let parsed = parse("20201207150940", "timestamp").unwrap();
        assert_eq!(parsed.year(), 2020);
        assert_eq!(parsed.month(), 12);
        assert_eq!(parsed.day(), 7);
        assert_eq!(parsed.hour(), 15);
        assert_eq!(parsed.second(), 40);
        assert_eq!(format(&parsed), "20201207150940");
    }

    #[test]
    fn test_now_shape() {
        let now = now();
        assert_eq!(now.len(), 14);
        assert!(now.chars().all(|c| c.is_ascii_digit()));
        assert!(parse(&now, "now").is_ok());
    }

    #[test]
    fn test_rejects_bad_values() {
        assert!(parse("2020-12-07", "timestamp").is_err());
        assert!(parse("20201307150940", "timestamp").is_err());
        assert!(parse("2020120715094", "timestamp").is_err());
    }
}
