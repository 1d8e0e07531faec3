//! Parsing of the daily-rates XML document into a [`Snapshot`].
//!
//! The document looks like:
//!
//! ```xml
//! <ValCurs Date="19.10.2026" name="Foreign Currency Market">
//!   <Valute ID="R01235">
//!     <NumCode>840</NumCode>
//!     <CharCode>USD</CharCode>
//!     <Nominal>1</Nominal>
//!     <Name>US Dollar</Name>
//!     <Value>90,5000</Value>
//!   </Valute>
//! </ValCurs>
//! ```
//!
//! Numbers use a comma as the fractional separator. Parsing is all or nothing:
//! one bad record fails the whole document.

use crate::core::{CurrencyRecord, RatesError, Snapshot, normalize_code};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::str::FromStr;
use tracing::debug;

const FEED_DATE_FORMAT: &str = "%d.%m.%Y";

#[derive(Debug, Deserialize)]
struct ValCurs {
    #[serde(rename = "@Date", default)]
    date: Option<String>,
    #[serde(rename = "Valute", default)]
    valutes: Vec<Valute>,
}

#[derive(Debug, Deserialize)]
struct Valute {
    #[serde(rename = "NumCode")]
    num_code: String,
    #[serde(rename = "CharCode")]
    char_code: String,
    #[serde(rename = "Nominal")]
    nominal: String,
    #[serde(rename = "Name", default)]
    name: String,
    #[serde(rename = "Value")]
    value: String,
}

/// Replaces the first comma with a period so the string parses as a decimal.
pub fn normalize_decimal(raw: &str) -> String {
    raw.trim().replacen(',', ".", 1)
}

fn parse_decimal(field: &str, raw: &str, code: &str) -> Result<Decimal, RatesError> {
    Decimal::from_str(&normalize_decimal(raw)).map_err(|e| {
        RatesError::Parse(format!(
            "Invalid {field} '{raw}' for currency {code}: {e}"
        ))
    })
}

fn parse_integer(field: &str, raw: &str, code: &str) -> Result<u32, RatesError> {
    normalize_decimal(raw).parse::<u32>().map_err(|e| {
        RatesError::Parse(format!(
            "Invalid {field} '{raw}' for currency {code}: {e}"
        ))
    })
}

impl Valute {
    fn into_record(self) -> Result<CurrencyRecord, RatesError> {
        let char_code = normalize_code(&self.char_code);
        if char_code.is_empty() {
            return Err(RatesError::Parse("Empty currency code".to_string()));
        }

        Ok(CurrencyRecord {
            numeric_code: parse_integer("NumCode", &self.num_code, &char_code)?,
            nominal: parse_integer("Nominal", &self.nominal, &char_code)?,
            value: parse_decimal("Value", &self.value, &char_code)?,
            display_name: self.name.trim().to_string(),
            char_code,
        })
    }
}

/// Parses the raw document. Unknown elements and attributes are ignored.
pub fn parse_snapshot(raw: &str) -> Result<Snapshot, RatesError> {
    let document: ValCurs = quick_xml::de::from_str(raw)
        .map_err(|e| RatesError::Parse(format!("Malformed rates document: {e}")))?;

    let date = document
        .date
        .as_deref()
        .map(|d| {
            NaiveDate::parse_from_str(d.trim(), FEED_DATE_FORMAT)
                .map_err(|e| RatesError::Parse(format!("Invalid document date '{d}': {e}")))
        })
        .transpose()?;

    if document.valutes.is_empty() {
        return Err(RatesError::Parse(
            "Rates document contains no currency records".to_string(),
        ));
    }

    let records = document
        .valutes
        .into_iter()
        .map(Valute::into_record)
        .collect::<Result<Vec<_>, _>>()?;

    let snapshot = Snapshot::new(date, records)?;
    debug!(
        records = snapshot.len(),
        date = ?snapshot.date(),
        "Parsed rates document"
    );
    Ok(snapshot)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) const SAMPLE_FEED: &str = r#"<?xml version="1.0" encoding="windows-1251"?>
<ValCurs Date="18.10.2026" name="Foreign Currency Market">
    <Valute ID="R01235">
        <NumCode>840</NumCode>
        <CharCode>USD</CharCode>
        <Nominal>1</Nominal>
        <Name>US Dollar</Name>
        <Value>90,5000</Value>
        <VunitRate>90,5</VunitRate>
    </Valute>
    <Valute ID="R01239">
        <NumCode>978</NumCode>
        <CharCode>EUR</CharCode>
        <Nominal>1</Nominal>
        <Name>Euro</Name>
        <Value>98,1234</Value>
        <VunitRate>98,1234</VunitRate>
    </Valute>
    <Valute ID="R01820">
        <NumCode>392</NumCode>
        <CharCode>JPY</CharCode>
        <Nominal>100</Nominal>
        <Name>Japanese Yen</Name>
        <Value>61,2000</Value>
        <VunitRate>0,612</VunitRate>
    </Valute>
</ValCurs>"#;

    fn single_valute(value: &str, nominal: &str) -> String {
        format!(
            r#"<ValCurs Date="18.10.2026">
    <Valute ID="R01010">
        <NumCode>036</NumCode>
        <CharCode>AUD</CharCode>
        <Nominal>{nominal}</Nominal>
        <Name>Australian Dollar</Name>
        <Value>{value}</Value>
    </Valute>
</ValCurs>"#
        )
    }

    #[test]
    fn test_parse_sample_feed() {
        let snapshot = parse_snapshot(SAMPLE_FEED).unwrap();
        assert_eq!(snapshot.len(), 3);
        assert_eq!(snapshot.date(), NaiveDate::from_ymd_opt(2026, 10, 18));

        let usd = &snapshot.records()[0];
        assert_eq!(usd.numeric_code, 840);
        assert_eq!(usd.char_code, "USD");
        assert_eq!(usd.nominal, 1);
        assert_eq!(usd.display_name, "US Dollar");
        assert_eq!(usd.value, Decimal::from_str("90.5").unwrap());

        let jpy = &snapshot.records()[2];
        assert_eq!(jpy.nominal, 100);
        assert_eq!(jpy.rate_to_domestic(), Decimal::from_str("0.612").unwrap());
    }

    #[test]
    fn test_comma_decimal_is_normalized() {
        let snapshot = parse_snapshot(&single_valute("12,3456", "1")).unwrap();
        let aud = &snapshot.records()[0];
        assert_eq!(aud.value, Decimal::from_str("12.3456").unwrap());
        assert_eq!(aud.numeric_code, 36);
    }

    #[test]
    fn test_normalize_decimal_replaces_first_comma_only() {
        assert_eq!(normalize_decimal("12,3456"), "12.3456");
        assert_eq!(normalize_decimal(" 1,2,3 "), "1.2,3");
        assert_eq!(normalize_decimal("7"), "7");
    }

    #[test]
    fn test_non_numeric_value_fails_whole_parse() {
        let result = parse_snapshot(&single_valute("abc", "1"));
        match result {
            Err(RatesError::Parse(msg)) => assert!(msg.contains("Invalid Value 'abc'")),
            other => panic!("Expected parse error, got {other:?}"),
        }
    }

    #[test]
    fn test_zero_nominal_fails_parse() {
        assert!(matches!(
            parse_snapshot(&single_valute("1,0", "0")),
            Err(RatesError::Parse(_))
        ));
    }

    #[test]
    fn test_missing_field_fails_parse() {
        let raw = r#"<ValCurs Date="18.10.2026">
    <Valute><NumCode>840</NumCode><CharCode>USD</CharCode><Nominal>1</Nominal></Valute>
</ValCurs>"#;
        assert!(matches!(parse_snapshot(raw), Err(RatesError::Parse(_))));
    }

    #[test]
    fn test_malformed_document_fails_parse() {
        assert!(matches!(
            parse_snapshot("<ValCurs><Valute>"),
            Err(RatesError::Parse(_))
        ));
        assert!(matches!(parse_snapshot("<ValCurs/>"), Err(RatesError::Parse(_))));
    }

    #[test]
    fn test_invalid_date_fails_parse() {
        let raw = SAMPLE_FEED.replace("18.10.2026", "2026-10-18");
        assert!(matches!(parse_snapshot(&raw), Err(RatesError::Parse(_))));
    }

    #[test]
    fn test_lowercase_codes_are_normalized() {
        let raw = single_valute("1,5", "1").replace("AUD", "aud");
        let snapshot = parse_snapshot(&raw).unwrap();
        assert_eq!(snapshot.records()[0].char_code, "AUD");
    }
}
