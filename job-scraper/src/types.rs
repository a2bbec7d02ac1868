use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Request error: '{0}'")]
    Request(#[from] reqwest::Error),
    #[error("Failed to scrape data from: '{0}', status: {1}")]
    RequestNotOk(String, u16),
    #[error("Invalid url: '{0}'")]
    InvalidUrl(String),
}

/// The job board a vacancy was scraped from, doubles as the collection name
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    Headhunter,
    Superjob,
}

impl Source {
    pub fn collection(&self) -> &'static str {
        match self {
            Source::Headhunter => "headhunter",
            Source::Superjob => "superjob",
        }
    }
}

/// Normalized salary of a vacancy.
/// A range without any field serializes to an empty mapping, otherwise all four keys are written
/// and absent values become `null`.
#[derive(Deserialize, Debug, Clone, Default, PartialEq, Eq, Hash)]
#[serde(default)]
pub struct SalaryRange {
    pub min: Option<i64>,
    pub max: Option<i64>,
    pub currency: Option<String>,
    pub frequency: Option<String>,
}

impl SalaryRange {
    pub fn is_empty(&self) -> bool {
        self.min.is_none()
            && self.max.is_none()
            && self.currency.is_none()
            && self.frequency.is_none()
    }

    /// true if neither bound is known
    pub fn is_unspecified(&self) -> bool {
        self.min.is_none() && self.max.is_none()
    }
}

impl Serialize for SalaryRange {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if self.is_empty() {
            return serializer.serialize_map(Some(0))?.end();
        }
        let mut map = serializer.serialize_map(Some(4))?;
        map.serialize_entry("min", &self.min)?;
        map.serialize_entry("max", &self.max)?;
        map.serialize_entry("currency", &self.currency)?;
        map.serialize_entry("frequency", &self.frequency)?;
        map.end()
    }
}

/// A single scraped job posting. Two vacancies are duplicates iff every field is equal.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Hash)]
pub struct Vacancy {
    pub name: String,
    pub salary: SalaryRange,
    pub link: String,
    pub source: Source,
}

/// Fields of a vacancy as they appear in the markup, before salary normalization
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartialVacancy {
    pub name: String,
    pub raw_salary: String,
    /// pay frequency as printed by the site, `None` if the site did not print one
    pub frequency: Option<String>,
    pub link: String,
}
