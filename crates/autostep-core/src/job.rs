//! Jobs handed out by the remote source.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;

use crate::args::{deserialize_string_map, Product};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JobState {
    #[default]
    Pending,
    Succeeded,
    Failed,
}

impl JobState {
    pub fn code(self) -> i8 {
        match self {
            JobState::Pending => 0,
            JobState::Succeeded => 1,
            JobState::Failed => -1,
        }
    }

    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            0 => Some(JobState::Pending),
            1 => Some(JobState::Succeeded),
            -1 => Some(JobState::Failed),
            _ => None,
        }
    }

    pub fn is_terminal(self) -> bool {
        self != JobState::Pending
    }
}

impl fmt::Display for JobState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            JobState::Pending => "pending",
            JobState::Succeeded => "succeeded",
            JobState::Failed => "failed",
        };
        f.write_str(s)
    }
}

impl Serialize for JobState {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_i8(self.code())
    }
}

impl<'de> Deserialize<'de> for JobState {
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        let code = i64::deserialize(d)?;
        JobState::from_code(code)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid job state {code}")))
    }
}

/// One queued request to run `site/script`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Job {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    pub site: String,
    pub script: String,
    #[serde(default)]
    pub product: Product,
    #[serde(default, deserialize_with = "deserialize_string_map")]
    pub args: BTreeMap<String, String>,
    #[serde(default)]
    pub state: JobState,
    #[serde(default)]
    pub running: bool,
}

impl Job {
    pub fn new(id: impl Into<String>, site: impl Into<String>, script: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            site: site.into(),
            script: script.into(),
            product: Product::new(),
            args: BTreeMap::new(),
            state: JobState::Pending,
            running: false,
        }
    }

    pub fn with_arg(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.args.insert(key.into(), value.into());
        self
    }
}

/// Remote ids come as strings or numbers.
fn deserialize_id<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Id {
        Text(String),
        Number(serde_json::Number),
    }
    Ok(match Id::deserialize(d)? {
        Id::Text(s) => s,
        Id::Number(n) => n.to_string(),
    })
}
