//! Time-related field value types: durations, calendar units and zone ids.

use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use regex::Regex;
use thiserror::Error;

macro_rules! named_units {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $text:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            /// Every unit, in wire-ordinal order.
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// Position of the unit in [`Self::ALL`]; this is the wire ordinal.
            pub fn ordinal(self) -> u32 {
                self as u32
            }

            pub fn from_ordinal(ordinal: u32) -> Option<Self> {
                Self::ALL.get(ordinal as usize).copied()
            }

            /// Upper-case textual form used by the document and tree codecs.
            pub fn name(self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }

            pub fn from_name(name: &str) -> Option<Self> {
                match name {
                    $($text => Some($name::$variant),)+
                    _ => None,
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.name())
            }
        }
    };
}

named_units! {
    /// Unit of a [`DurationValue`].
    DurationUnit {
        Nanoseconds => "NANOSECONDS",
        Microseconds => "MICROSECONDS",
        Milliseconds => "MILLISECONDS",
        Seconds => "SECONDS",
        Minutes => "MINUTES",
        Hours => "HOURS",
        Days => "DAYS",
    }
}

named_units! {
    /// Calendar unit enumeration, from nanoseconds up to "forever".
    CalendarUnit {
        Nanos => "NANOS",
        Micros => "MICROS",
        Millis => "MILLIS",
        Seconds => "SECONDS",
        Minutes => "MINUTES",
        Hours => "HOURS",
        HalfDays => "HALF_DAYS",
        Days => "DAYS",
        Weeks => "WEEKS",
        Months => "MONTHS",
        Years => "YEARS",
        Decades => "DECADES",
        Centuries => "CENTURIES",
        Millennia => "MILLENNIA",
        Eras => "ERAS",
        Forever => "FOREVER",
    }
}

impl DurationUnit {
    fn suffix(self) -> &'static str {
        match self {
            DurationUnit::Nanoseconds => "nanos",
            DurationUnit::Microseconds => "micros",
            DurationUnit::Milliseconds => "ms",
            DurationUnit::Seconds => "s",
            DurationUnit::Minutes => "m",
            DurationUnit::Hours => "h",
            DurationUnit::Days => "d",
        }
    }
}

/// A duration expressed as a magnitude in a given unit.
///
/// The unit is preserved as written; `60 SECONDS` and `1 MINUTES` are
/// different values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DurationValue {
    pub magnitude: i64,
    pub unit: DurationUnit,
}

impl DurationValue {
    pub fn new(magnitude: i64, unit: DurationUnit) -> Self {
        Self { magnitude, unit }
    }

    pub fn millis(magnitude: i64) -> Self {
        Self::new(magnitude, DurationUnit::Milliseconds)
    }

    pub fn seconds(magnitude: i64) -> Self {
        Self::new(magnitude, DurationUnit::Seconds)
    }

    pub fn minutes(magnitude: i64) -> Self {
        Self::new(magnitude, DurationUnit::Minutes)
    }
}

impl fmt::Display for DurationValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.magnitude, self.unit.suffix())
    }
}

/// Returned when a string is not an acceptable zone identifier.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid time zone id `{0}`")]
pub struct InvalidTimeZone(pub String);

/// A validated time-zone identifier such as `Europe/Paris`, `UTC+01:00` or `Z`.
///
/// Only the syntax is checked; region ids are not resolved against a zone
/// database.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimeZoneId(String);

fn offset_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^[+-](?:(\d{1,2})|(\d{2}):(\d{2})(?::(\d{2}))?|(\d{2})(\d{2})(\d{2})?)$")
            .expect("static regex")
    })
}

fn prefixed_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(?:UTC|GMT|UT)([+-].*)?$").expect("static regex"))
}

fn region_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[A-Za-z][A-Za-z0-9~/._+-]+$").expect("static regex"))
}

fn is_valid_offset(text: &str) -> bool {
    let Some(caps) = offset_regex().captures(text) else {
        return false;
    };
    // hour alone, `hh:mm[:ss]` or `hhmm[ss]`; separators may not be mixed
    let part = |groups: &[usize]| {
        groups
            .iter()
            .find_map(|&i| caps.get(i))
            .map_or(Some(0), |m| m.as_str().parse::<u32>().ok())
    };
    match (part(&[1, 2, 5]), part(&[3, 6]), part(&[4, 7])) {
        (Some(h), Some(m), Some(s)) => h <= 18 && m < 60 && s < 60 && (h < 18 || m + s == 0),
        _ => false,
    }
}

impl TimeZoneId {
    pub fn parse(id: &str) -> Result<Self, InvalidTimeZone> {
        let valid = id == "Z"
            || is_valid_offset(id)
            || match prefixed_regex().captures(id) {
                Some(caps) => caps.get(1).is_none_or(|m| is_valid_offset(m.as_str())),
                None => region_regex().is_match(id),
            };
        if valid {
            Ok(Self(id.to_owned()))
        } else {
            Err(InvalidTimeZone(id.to_owned()))
        }
    }

    pub fn utc() -> Self {
        Self("UTC".to_owned())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for TimeZoneId {
    type Err = InvalidTimeZone;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for TimeZoneId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
