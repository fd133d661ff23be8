//! Per-pair count series, kept only on request
//!
//! Handy for checking how well the chain mixes, or for recomputing the
//! statistics offline.
//!
//! Pairs are keyed by their two labels. Only the JSON form joins them into a
//! single `"x - y"` key, so a label containing `" - "` makes the JSON
//! ambiguous; reading such a key back splits at the first separator.

use crate::errors::Result;
use serde::de::Error as _;
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;
use std::path::Path;

const KEY_SEPARATOR: &str = " - ";

/// Every co-occurrence count recorded for every tracked pair, sample 0 first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawSampleLog {
    series: BTreeMap<(String, String), Vec<u32>>,
}

impl RawSampleLog {
    pub fn from_series(entries: impl IntoIterator<Item = (String, String, Vec<u32>)>) -> Self {
        Self {
            series: entries
                .into_iter()
                .map(|(a, b, counts)| ((a, b), counts))
                .collect(),
        }
    }

    /// Count series of a pair, in either label order
    pub fn series(&self, a: &str, b: &str) -> Option<&[u32]> {
        let key = |x: &str, y: &str| (x.to_string(), y.to_string());
        self.series
            .get(&key(a, b))
            .or_else(|| self.series.get(&key(b, a)))
            .map(Vec::as_slice)
    }

    /// Iterate over `(first label, second label, counts)`
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str, &[u32])> {
        self.series
            .iter()
            .map(|((a, b), v)| (a.as_str(), b.as_str(), v.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.series.len()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Write the log as JSON to `path`, replacing any existing file
    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<()> {
        std::fs::write(path, self.to_json()?)?;
        Ok(())
    }
}

impl Serialize for RawSampleLog {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.series.len()))?;
        for ((a, b), counts) in &self.series {
            map.serialize_entry(&format!("{a}{KEY_SEPARATOR}{b}"), counts)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for RawSampleLog {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let flat = BTreeMap::<String, Vec<u32>>::deserialize(deserializer)?;
        let series = flat
            .into_iter()
            .map(|(key, counts)| {
                let (a, b) = key.split_once(KEY_SEPARATOR).ok_or_else(|| {
                    D::Error::custom(format!("raw log key '{key}' is not of the form 'x - y'"))
                })?;
                Ok(((a.to_string(), b.to_string()), counts))
            })
            .collect::<std::result::Result<_, D::Error>>()?;
        Ok(Self { series })
    }
}
