//! Video categories offered by the workflow.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer};

/// A video category. The names are what users pick in the form.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Category {
    /// Vlog
    Vlog,
    /// Food
    Yemek,
    /// Podcast
    Podcast,
    /// Travel
    Travel,
    /// Sport
    Spor,
    /// Gaming
    Oyun,
    /// Education
    Egitim,
    /// Technology
    Teknoloji,
    /// Anything else
    Diger,
}

impl Category {
    /// Every category, in form order.
    pub const ALL: [Category; 9] = [
        Category::Vlog,
        Category::Yemek,
        Category::Podcast,
        Category::Travel,
        Category::Spor,
        Category::Oyun,
        Category::Egitim,
        Category::Teknoloji,
        Category::Diger,
    ];

    /// The display name, as submitted by the form.
    pub fn as_str(self) -> &'static str {
        match self {
            Category::Vlog => "Vlog",
            Category::Yemek => "Yemek",
            Category::Podcast => "Podcast",
            Category::Travel => "Travel",
            Category::Spor => "Spor",
            Category::Oyun => "Oyun",
            Category::Egitim => "Eğitim",
            Category::Teknoloji => "Teknoloji",
            Category::Diger => "Diğer",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned for names outside the fixed category list.
#[derive(Debug, Eq, PartialEq)]
pub struct UnknownCategory(pub String);

impl fmt::Display for UnknownCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Unknown category: {}", self.0)
    }
}

impl std::error::Error for UnknownCategory {}

impl FromStr for Category {
    type Err = UnknownCategory;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Category::ALL
            .into_iter()
            .find(|category| category.as_str() == s)
            .ok_or_else(|| UnknownCategory(s.to_string()))
    }
}

impl<'de> Deserialize<'de> for Category {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}
