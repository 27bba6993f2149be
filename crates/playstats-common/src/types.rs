//! Common type definitions and newtype wrappers for domain modeling.

use crate::error::StatsError;
use serde::{Deserialize, Deserializer, Serialize};
use std::{fmt, str::FromStr};

/// Opaque account identifier selecting whose activity is retrieved.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountId(String);

impl AccountId {
    /// Wraps a raw identifier, trimming surrounding whitespace.
    pub fn new(raw: impl AsRef<str>) -> Self {
        Self(raw.as_ref().trim().to_string())
    }

    /// Returns the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the identifier is empty after trimming.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for AccountId {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

/// Opaque item identifier, stable across both retrieved collections.
///
/// Sources emit it as a JSON string or as any JSON number; all of them
/// deserialize to the textual form of the value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct ItemId(String);

impl ItemId {
    /// Creates an item identifier.
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// Returns the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<u64> for ItemId {
    fn from(raw: u64) -> Self {
        Self(raw.to_string())
    }
}

impl From<&str> for ItemId {
    fn from(raw: &str) -> Self {
        Self(raw.to_string())
    }
}

impl<'de> Deserialize<'de> for ItemId {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawId {
            Unsigned(u64),
            Signed(i64),
            Float(f64),
            Text(String),
        }

        Ok(match RawId::deserialize(deserializer)? {
            RawId::Unsigned(n) => Self(n.to_string()),
            RawId::Signed(n) => Self(n.to_string()),
            RawId::Float(n) => Self(n.to_string()),
            RawId::Text(s) => Self(s),
        })
    }
}

/// Which retrieval a collection came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RetrievalKind {
    /// Short-window activity (`recently_played`).
    Recent,
    /// All-time activity with categories (`all_activity_with_categories`).
    Full,
}

impl RetrievalKind {
    /// Endpoint name on the activity source.
    pub const fn endpoint(self) -> &'static str {
        match self {
            Self::Recent => "recently_played",
            Self::Full => "all_activity_with_categories",
        }
    }
}

impl fmt::Display for RetrievalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.endpoint())
    }
}

/// Presentation unit for a playtime magnitude.
///
/// Percentages additionally need a reference total, supplied when the
/// formatter is invoked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DisplayUnit {
    /// Raw minutes.
    Minutes,
    /// Hours with two fractional digits.
    Hours,
    /// Share of a total, in percent.
    Percentage,
}

impl DisplayUnit {
    /// Name used in configuration files and on the command line.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Minutes => "minutes",
            Self::Hours => "hours",
            Self::Percentage => "percentage",
        }
    }
}

impl fmt::Display for DisplayUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DisplayUnit {
    type Err = StatsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "minutes" => Ok(Self::Minutes),
            "hours" => Ok(Self::Hours),
            "percentage" | "percent" => Ok(Self::Percentage),
            _ => Err(StatsError::invalid_mode(s)),
        }
    }
}

/// One entry of the `recently_played` collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentEntry {
    /// Item identifier.
    pub id: ItemId,
    /// Human-readable name.
    #[serde(default, deserialize_with = "null_as_default")]
    pub label: String,
    /// Minutes played in the short window.
    #[serde(default, deserialize_with = "null_as_default")]
    pub recent_minutes: u64,
}

/// One entry of the `all_activity_with_categories` collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategorizedEntry {
    /// Item identifier.
    pub id: ItemId,
    /// Human-readable name.
    #[serde(default, deserialize_with = "null_as_default")]
    pub label: String,
    /// Minutes played all-time.
    #[serde(default, deserialize_with = "null_as_default")]
    pub total_minutes: u64,
    /// Category labels attached to the item.
    #[serde(default, deserialize_with = "null_as_default")]
    pub categories: Vec<String>,
}

/// Reads an optional field, treating `null` like an absent value.
fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// One item of tracked activity, merged from both collections.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityRecord {
    /// Item identifier.
    pub id: ItemId,
    /// Human-readable name.
    pub label: String,
    /// Minutes played in the short window; zero when absent.
    pub recent_minutes: u64,
    /// Minutes played all-time; zero when absent.
    pub total_minutes: u64,
    /// Distinct category labels in first-seen order.
    pub categories: Vec<String>,
}

impl ActivityRecord {
    /// Creates a record without categories.
    pub fn new(id: impl Into<ItemId>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            recent_minutes: 0,
            total_minutes: 0,
            categories: Vec::new(),
        }
    }

    /// Sets the short-window minutes.
    #[must_use]
    pub const fn with_recent_minutes(mut self, minutes: u64) -> Self {
        self.recent_minutes = minutes;
        self
    }

    /// Sets the all-time minutes.
    #[must_use]
    pub const fn with_total_minutes(mut self, minutes: u64) -> Self {
        self.total_minutes = minutes;
        self
    }

    /// Sets the categories, dropping repeated labels.
    #[must_use]
    pub fn with_categories<I, S>(mut self, categories: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.categories = crate::utils::dedup_preserving_order(categories);
        self
    }
}
