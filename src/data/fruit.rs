use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FruitError {
    #[error("request failed: {0}")]
    Network(String),
    #[error("endpoint answered HTTP {0}")]
    Status(u16),
    #[error("malformed fruit data: {0}")]
    Decode(#[from] serde_json::Error),
}

/// One entry of the fruit list
///
/// Only the position of a record in its list matters to the scene, so the
/// record is kept as raw JSON. Its category is read for logging.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FruitRecord(pub Value);

impl FruitRecord {
    /// The record's category, sent as `type`
    pub fn kind(&self) -> Option<&str> {
        self.0.get("type").and_then(Value::as_str)
    }
}

/// Wire format: `{"fruits": [...]}`; a missing or null list is empty
#[derive(Debug, Deserialize)]
struct FruitResponse {
    #[serde(default)]
    fruits: Option<Vec<FruitRecord>>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FruitList {
    pub fruits: Vec<FruitRecord>,
}

impl FruitList {
    pub fn from_json(json: &str) -> Result<Self, FruitError> {
        let response: FruitResponse = serde_json::from_str(json)?;
        Ok(Self {
            fruits: response.fruits.unwrap_or_default(),
        })
    }

    pub fn len(&self) -> usize {
        self.fruits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fruits.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FruitRecord> {
        self.fruits.iter()
    }

    /// Records per category; records without a string `type` count as "other"
    pub fn kind_counts(&self) -> BTreeMap<String, usize> {
        let mut counts = BTreeMap::new();
        for record in self.iter() {
            let kind = record.kind().unwrap_or("other");
            *counts.entry(kind.to_string()).or_insert(0) += 1;
        }
        counts
    }
}
