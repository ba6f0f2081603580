//! Data resolution — daily, weekly, N-minute intraday, or tick-level.

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Granularity of stored data. String form is `"D"`, `"W"`, the minute
/// count (`"1"`–`"60"`), or `"tick"`; that form is what metadata documents
/// carry and what `FromStr`/`Display` speak.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Resolution {
    Day,
    Week,
    /// Intraday bars, 1–60 minutes.
    Minutes(u8),
    Tick,
}

impl Resolution {
    /// Directory component under `candles/` or `ticks/`.
    pub fn dir_name(&self) -> String {
        match self {
            Resolution::Day => "day".to_string(),
            Resolution::Week => "week".to_string(),
            Resolution::Minutes(n) => format!("{n}min"),
            Resolution::Tick => "tick".to_string(),
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unrecognized resolution `{0}`; expected D, W, tick, or intraday minutes 1-60")]
pub struct ParseResolutionError(pub String);

impl FromStr for Resolution {
    type Err = ParseResolutionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "D" => Ok(Resolution::Day),
            "W" => Ok(Resolution::Week),
            _ if s.eq_ignore_ascii_case("tick") => Ok(Resolution::Tick),
            _ => match s.parse::<u8>() {
                Ok(minutes @ 1..=60) => Ok(Resolution::Minutes(minutes)),
                _ => Err(ParseResolutionError(s.to_string())),
            },
        }
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Resolution::Day => f.write_str("D"),
            Resolution::Week => f.write_str("W"),
            Resolution::Minutes(n) => write!(f, "{n}"),
            Resolution::Tick => f.write_str("tick"),
        }
    }
}

impl Serialize for Resolution {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Resolution {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_the_documented_forms() {
        assert_eq!("D".parse::<Resolution>().unwrap(), Resolution::Day);
        assert_eq!("W".parse::<Resolution>().unwrap(), Resolution::Week);
        assert_eq!("1".parse::<Resolution>().unwrap(), Resolution::Minutes(1));
        assert_eq!("60".parse::<Resolution>().unwrap(), Resolution::Minutes(60));
        assert_eq!("tick".parse::<Resolution>().unwrap(), Resolution::Tick);
    }

    #[test]
    fn rejects_out_of_range_minutes_and_noise() {
        assert!("0".parse::<Resolution>().is_err());
        assert!("61".parse::<Resolution>().is_err());
        assert!("d".parse::<Resolution>().is_err());
        assert!("hourly".parse::<Resolution>().is_err());
    }

    #[test]
    fn serde_round_trips_through_the_string_form() {
        for res in [Resolution::Day, Resolution::Week, Resolution::Minutes(15), Resolution::Tick] {
            let json = serde_json::to_string(&res).unwrap();
            let back: Resolution = serde_json::from_str(&json).unwrap();
            assert_eq!(back, res);
        }
        assert_eq!(serde_json::to_string(&Resolution::Minutes(5)).unwrap(), "\"5\"");
    }

    #[test]
    fn dir_names_are_stable() {
        assert_eq!(Resolution::Day.dir_name(), "day");
        assert_eq!(Resolution::Week.dir_name(), "week");
        assert_eq!(Resolution::Minutes(5).dir_name(), "5min");
        assert_eq!(Resolution::Tick.dir_name(), "tick");
    }
}
