//! Enumerated paste options understood by PrivateBin hosts.
//!
//! Each option parses from the exact string the host expects and reports the
//! allowed set when given anything else.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// A paste option value outside its allowed set.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("{option} {value:?} must be one of {}", .allowed.join(", "))]
pub struct InvalidOption {
    pub option: &'static str,
    pub value: String,
    pub allowed: &'static [&'static str],
}

/// How long the host keeps a paste.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Expiration {
    FiveMinutes,
    TenMinutes,
    OneHour,
    #[default]
    OneDay,
    OneWeek,
    OneMonth,
    OneYear,
    Never,
}

impl Expiration {
    pub const ALLOWED: &'static [&'static str] = &[
        "5min", "10min", "1hour", "1day", "1week", "1month", "1year", "never",
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FiveMinutes => "5min",
            Self::TenMinutes => "10min",
            Self::OneHour => "1hour",
            Self::OneDay => "1day",
            Self::OneWeek => "1week",
            Self::OneMonth => "1month",
            Self::OneYear => "1year",
            Self::Never => "never",
        }
    }
}

impl FromStr for Expiration {
    type Err = InvalidOption;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "5min" => Ok(Self::FiveMinutes),
            "10min" => Ok(Self::TenMinutes),
            "1hour" => Ok(Self::OneHour),
            "1day" => Ok(Self::OneDay),
            "1week" => Ok(Self::OneWeek),
            "1month" => Ok(Self::OneMonth),
            "1year" => Ok(Self::OneYear),
            "never" => Ok(Self::Never),
            other => Err(InvalidOption {
                option: "expiration",
                value: other.to_string(),
                allowed: Self::ALLOWED,
            }),
        }
    }
}

/// How the host renders the paste text.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Formatter {
    #[default]
    PlainText,
    SyntaxHighlighting,
    Markdown,
}

impl Formatter {
    pub const ALLOWED: &'static [&'static str] = &["plaintext", "syntaxhighlighting", "markdown"];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PlainText => "plaintext",
            Self::SyntaxHighlighting => "syntaxhighlighting",
            Self::Markdown => "markdown",
        }
    }
}

impl FromStr for Formatter {
    type Err = InvalidOption;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "plaintext" => Ok(Self::PlainText),
            "syntaxhighlighting" => Ok(Self::SyntaxHighlighting),
            "markdown" => Ok(Self::Markdown),
            other => Err(InvalidOption {
                option: "formatting",
                value: other.to_string(),
                allowed: Self::ALLOWED,
            }),
        }
    }
}

/// Compression applied to the plaintext before encryption.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Compression {
    #[default]
    Zlib,
    None,
}

impl Compression {
    pub const ALLOWED: &'static [&'static str] = &["zlib", "none"];

    /// First protocol version on which hosts accept compressed pastes.
    pub const MIN_PROTOCOL_VERSION: u32 = 2;

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Zlib => "zlib",
            Self::None => "none",
        }
    }

    /// Resolves the requested compression against the host's protocol
    /// version. Older hosts always get `none`, whatever was requested.
    pub fn negotiate(self, protocol_version: u32) -> Self {
        if protocol_version >= Self::MIN_PROTOCOL_VERSION {
            self
        } else {
            Self::None
        }
    }
}

impl FromStr for Compression {
    type Err = InvalidOption;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "zlib" => Ok(Self::Zlib),
            "none" => Ok(Self::None),
            other => Err(InvalidOption {
                option: "compression",
                value: other.to_string(),
                allowed: Self::ALLOWED,
            }),
        }
    }
}

macro_rules! string_conversions {
    ($($ty:ty),*) => {$(
        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl TryFrom<String> for $ty {
            type Error = InvalidOption;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                value.parse()
            }
        }

        impl From<$ty> for String {
            fn from(value: $ty) -> Self {
                value.as_str().to_string()
            }
        }
    )*};
}

string_conversions!(Expiration, Formatter, Compression);
