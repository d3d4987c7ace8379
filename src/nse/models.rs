use super::config;
use crate::error::FetchError;
use chrono::NaiveDate;
use serde::de::{self, Deserializer};
use serde::Deserialize;
use serde_json::Value;
use std::cmp::Ordering;

// -----------------------------------------------
// NUMBER HELPERS
// -----------------------------------------------
// NSE is not consistent about numbers: the same field comes back as 24350.5
// on one endpoint and "24,350.50" on another.

fn value_to_f64<E: de::Error>(value: Value) -> Result<Option<f64>, E> {
    let number = match value {
        Value::Null => return Ok(None),
        Value::Number(n) => n.as_f64().ok_or_else(|| E::custom("number out of range"))?,
        Value::String(s) => s
            .trim()
            .replace(',', "")
            .parse::<f64>()
            .map_err(|e| E::custom(format!("invalid number '{}': {}", s, e)))?,
        other => return Err(E::custom(format!("expected a number, got {}", other))),
    };

    // "NaN", "inf" and "1e999" all parse
    if !number.is_finite() {
        return Err(E::custom("non-finite number"));
    }
    Ok(Some(number))
}

fn de_f64<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    value_to_f64::<D::Error>(Value::deserialize(deserializer)?)?
        .ok_or_else(|| de::Error::custom("expected a number, got null"))
}

fn de_opt_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    value_to_f64(Value::deserialize(deserializer)?)
}

// -----------------------------------------------
// INDEX SNAPSHOT
// -----------------------------------------------

/// Response of `/api/equity-stockIndices`
#[derive(Debug, Clone, Deserialize)]
pub struct IndexQuote {
    #[serde(default)]
    pub data: Vec<IndexData>,

    #[serde(default)]
    pub timestamp: Option<String>,
}

/// One row of the index response; the first row is the index itself
#[derive(Debug, Clone, Deserialize)]
pub struct IndexData {
    #[serde(rename = "lastPrice", default, deserialize_with = "de_opt_f64")]
    pub last_price: Option<f64>,

    #[serde(rename = "totalTradedVolume", default, deserialize_with = "de_opt_f64")]
    pub total_traded_volume: Option<f64>,

    #[serde(rename = "totalTradedValue", default, deserialize_with = "de_opt_f64")]
    pub total_traded_value: Option<f64>,
}

/// Price and traded totals of the index at one point in time
#[derive(Debug, Clone, PartialEq)]
pub struct IndexSnapshot {
    pub last_price: f64,
    pub traded_volume: f64,
    pub traded_value: f64,
    pub timestamp: Option<String>,
}

impl IndexQuote {
    pub fn into_snapshot(self) -> Result<IndexSnapshot, FetchError> {
        let first = self
            .data
            .into_iter()
            .next()
            .ok_or(FetchError::MissingData("index data is empty"))?;

        Ok(IndexSnapshot {
            last_price: first
                .last_price
                .ok_or(FetchError::MissingData("lastPrice"))?,
            traded_volume: first
                .total_traded_volume
                .ok_or(FetchError::MissingData("totalTradedVolume"))?,
            traded_value: first
                .total_traded_value
                .ok_or(FetchError::MissingData("totalTradedValue"))?,
            timestamp: self.timestamp,
        })
    }
}

// -----------------------------------------------
// OPTION CHAIN
// -----------------------------------------------

/// Response of `/api/option-chain-indices`
#[derive(Debug, Clone, Deserialize)]
pub struct OptionChain {
    pub records: Records,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Records {
    #[serde(rename = "expiryDates", default)]
    pub expiry_dates: Vec<String>,

    #[serde(default)]
    pub data: Vec<OptionData>,

    #[serde(default)]
    pub timestamp: Option<String>,

    #[serde(rename = "underlyingValue", default, deserialize_with = "de_opt_f64")]
    pub underlying_value: Option<f64>,
}

/// One strike of one expiry
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct OptionData {
    #[serde(rename = "strikePrice", deserialize_with = "de_f64")]
    pub strike_price: f64,

    #[serde(rename = "expiryDate")]
    pub expiry_date: String,

    #[serde(rename = "CE", default)]
    pub call: Option<OptionDetail>,

    #[serde(rename = "PE", default)]
    pub put: Option<OptionDetail>,
}

/// Call or put side of a strike
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct OptionDetail {
    #[serde(rename = "openInterest", deserialize_with = "de_f64")]
    pub open_interest: f64,

    #[serde(rename = "changeinOpenInterest", deserialize_with = "de_f64")]
    pub change_in_oi: f64,
}

impl OptionData {
    /// Strike with neither side listed
    pub fn new(strike_price: f64, expiry_date: impl Into<String>) -> Self {
        Self {
            strike_price,
            expiry_date: expiry_date.into(),
            call: None,
            put: None,
        }
    }

    /// Adds the CE side
    pub fn with_call(mut self, open_interest: f64, change_in_oi: f64) -> Self {
        self.call = Some(OptionDetail { open_interest, change_in_oi });
        self
    }

    /// Adds the PE side
    pub fn with_put(mut self, open_interest: f64, change_in_oi: f64) -> Self {
        self.put = Some(OptionDetail { open_interest, change_in_oi });
        self
    }
}

impl OptionChain {
    /// Available expiries, oldest first.
    ///
    /// Uses `records.expiryDates` when present, otherwise collects the
    /// expiries seen on the strikes.
    pub fn expiry_dates(&self) -> Vec<String> {
        let mut dates: Vec<String> = if self.records.expiry_dates.is_empty() {
            self.records
                .data
                .iter()
                .map(|opt| opt.expiry_date.clone())
                .collect()
        } else {
            self.records.expiry_dates.clone()
        };

        sort_expiries(&mut dates);
        dates.dedup();
        dates
    }
}

/// Chronological order for `25-Jul-2024` style dates; unparseable entries
/// go last in string order
pub fn sort_expiries(dates: &mut [String]) {
    let parse = |s: &str| NaiveDate::parse_from_str(s, config::EXPIRY_DATE_FORMAT).ok();

    dates.sort_by(|a, b| match (parse(a), parse(b)) {
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => a.cmp(b),
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_index_quote_accepts_numbers_and_strings() {
        let quote: IndexQuote = serde_json::from_value(json!({
            "timestamp": "19-Oct-2026 10:15:00",
            "data": [{
                "lastPrice": "24,350.50",
                "totalTradedVolume": 1000,
                "totalTradedValue": 2.5e7
            }]
        }))
        .unwrap();

        let snapshot = quote.into_snapshot().unwrap();
        assert_eq!(snapshot.last_price, 24350.5);
        assert_eq!(snapshot.traded_volume, 1000.0);
        assert_eq!(snapshot.traded_value, 25_000_000.0);
        assert_eq!(snapshot.timestamp.as_deref(), Some("19-Oct-2026 10:15:00"));
    }

    #[test]
    fn test_index_quote_missing_fields() {
        let quote: IndexQuote = serde_json::from_value(json!({ "data": [] })).unwrap();
        assert!(matches!(quote.into_snapshot(), Err(FetchError::MissingData(_))));

        let quote: IndexQuote =
            serde_json::from_value(json!({ "data": [{ "lastPrice": 100.0 }] })).unwrap();
        assert!(matches!(
            quote.into_snapshot(),
            Err(FetchError::MissingData("totalTradedVolume"))
        ));
    }

    #[test]
    fn test_option_data_sides_are_optional() {
        let data: OptionData = serde_json::from_value(json!({
            "strikePrice": 24000,
            "expiryDate": "25-Jul-2024",
            "PE": { "openInterest": 10, "changeinOpenInterest": -5 }
        }))
        .unwrap();

        assert_eq!(data.strike_price, 24000.0);
        assert!(data.call.is_none());
        assert_eq!(data.put.unwrap().change_in_oi, -5.0);
    }

    #[test]
    fn test_non_finite_numbers_rejected() {
        for bad in ["NaN", "inf", "-Infinity", "1e999"] {
            let result: Result<OptionData, _> = serde_json::from_value(json!({
                "strikePrice": 100,
                "expiryDate": "E1",
                "CE": { "openInterest": 1, "changeinOpenInterest": bad }
            }));
            assert!(result.is_err(), "{} should not parse", bad);
        }

        let quote: Result<IndexQuote, _> =
            serde_json::from_value(json!({ "data": [{ "lastPrice": "NaN" }] }));
        assert!(quote.is_err());
    }

    #[test]
    fn test_option_detail_requires_oi() {
        let result: Result<OptionData, _> = serde_json::from_value(json!({
            "strikePrice": 24000,
            "expiryDate": "25-Jul-2024",
            "CE": { "changeinOpenInterest": 1 }
        }));
        assert!(result.is_err());
    }

    #[test]
    fn test_expiry_dates_sorted_chronologically() {
        let chain: OptionChain = serde_json::from_value(json!({
            "records": {
                "expiryDates": ["01-Aug-2024", "25-Jul-2024", "26-Sep-2024"],
                "data": []
            }
        }))
        .unwrap();

        assert_eq!(
            chain.expiry_dates(),
            vec!["25-Jul-2024", "01-Aug-2024", "26-Sep-2024"]
        );
    }

    #[test]
    fn test_expiry_dates_from_strikes_when_list_absent() {
        let chain = OptionChain {
            records: Records {
                expiry_dates: vec![],
                data: vec![
                    OptionData::new(100.0, "01-Aug-2024"),
                    OptionData::new(150.0, "25-Jul-2024"),
                    OptionData::new(100.0, "25-Jul-2024"),
                ],
                timestamp: None,
                underlying_value: None,
            },
        };

        assert_eq!(chain.expiry_dates(), vec!["25-Jul-2024", "01-Aug-2024"]);
    }
}
