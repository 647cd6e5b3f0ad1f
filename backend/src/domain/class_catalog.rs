//! Static catalogue of classes and streams taught at the centre.
//!
//! A [`ClassKey`] is the partition key for rosters, pricing and most content.
//! Keys serialise as the short identifiers stored in the database (`"6"`,
//! `"11_science"`, ...).

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Grade level, or grade plus elective stream for the senior classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ClassKey {
    #[serde(rename = "6")]
    Six,
    #[serde(rename = "7")]
    Seven,
    #[serde(rename = "8")]
    Eight,
    #[serde(rename = "9")]
    Nine,
    #[serde(rename = "10")]
    Ten,
    #[serde(rename = "11_arts")]
    ElevenArts,
    #[serde(rename = "11_science")]
    ElevenScience,
    #[serde(rename = "12_arts")]
    TwelveArts,
    #[serde(rename = "12_science")]
    TwelveScience,
}

impl ClassKey {
    /// Every class in display order.
    pub const ALL: [Self; 9] = [
        Self::Six,
        Self::Seven,
        Self::Eight,
        Self::Nine,
        Self::Ten,
        Self::ElevenArts,
        Self::ElevenScience,
        Self::TwelveArts,
        Self::TwelveScience,
    ];

    /// Identifier persisted in storage and accepted on the wire.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Six => "6",
            Self::Seven => "7",
            Self::Eight => "8",
            Self::Nine => "9",
            Self::Ten => "10",
            Self::ElevenArts => "11_arts",
            Self::ElevenScience => "11_science",
            Self::TwelveArts => "12_arts",
            Self::TwelveScience => "12_science",
        }
    }

    /// Human-readable label used in notification copy.
    pub const fn label(self) -> &'static str {
        match self {
            Self::Six => "Class 6",
            Self::Seven => "Class 7",
            Self::Eight => "Class 8",
            Self::Nine => "Class 9",
            Self::Ten => "Class 10",
            Self::ElevenArts => "Class 11 Arts",
            Self::ElevenScience => "Class 11 Science",
            Self::TwelveArts => "Class 12 Arts",
            Self::TwelveScience => "Class 12 Science",
        }
    }

    /// Monthly tuition fee in rupees.
    pub const fn monthly_fee(self) -> u32 {
        match self {
            Self::Six | Self::Seven => 400,
            Self::Eight | Self::Nine | Self::Ten => 500,
            Self::ElevenScience | Self::TwelveScience => 400,
            Self::ElevenArts | Self::TwelveArts => 700,
        }
    }

    /// Short code embedded in registration numbers.
    pub const fn registration_code(self) -> &'static str {
        match self {
            Self::Six => "6",
            Self::Seven => "7",
            Self::Eight => "8",
            Self::Nine => "9",
            Self::Ten => "10",
            Self::ElevenArts => "11A",
            Self::ElevenScience => "11S",
            Self::TwelveArts => "12A",
            Self::TwelveScience => "12S",
        }
    }
}

impl fmt::Display for ClassKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raised when a string does not name a known class.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown class key: {0}")]
pub struct UnknownClassKey(pub String);

impl FromStr for ClassKey {
    type Err = UnknownClassKey;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|key| key.as_str() == value)
            .ok_or_else(|| UnknownClassKey(value.to_owned()))
    }
}

/// Fee for a raw class identifier; unknown identifiers cost nothing.
///
/// # Examples
/// ```
/// use tutorhub::domain::fee_amount_for_class;
///
/// assert_eq!(fee_amount_for_class("11_arts"), 700);
/// assert_eq!(fee_amount_for_class("kindergarten"), 0);
/// ```
pub fn fee_amount_for_class(class_key: &str) -> u32 {
    class_key
        .parse::<ClassKey>()
        .map(ClassKey::monthly_fee)
        .unwrap_or(0)
}

const EVERYONE: &str = "all";

/// Who a notification, test or PDF is addressed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Audience {
    /// Every student regardless of class.
    Everyone,
    /// Students of a single class.
    Class(ClassKey),
}

impl Audience {
    /// Identifier persisted in `class_for` columns.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Everyone => EVERYONE,
            Self::Class(key) => key.as_str(),
        }
    }

    /// Human-readable label used in notification copy.
    pub const fn label(self) -> &'static str {
        match self {
            Self::Everyone => "All Students",
            Self::Class(key) => key.label(),
        }
    }

    /// Whether a student of `class_key` belongs to this audience.
    pub fn includes(self, class_key: ClassKey) -> bool {
        match self {
            Self::Everyone => true,
            Self::Class(key) => key == class_key,
        }
    }
}

impl FromStr for Audience {
    type Err = UnknownClassKey;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        if value == EVERYONE {
            return Ok(Self::Everyone);
        }
        value.parse().map(Self::Class)
    }
}

impl fmt::Display for Audience {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Audience {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Audience {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}
