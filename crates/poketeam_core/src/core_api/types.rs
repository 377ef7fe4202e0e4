use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::creature::{Creature, CreatureId};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterCriteria {
    pub query: String,
    pub types: Vec<String>,
    pub generation: Option<u32>,
}

impl FilterCriteria {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_query(mut self, query: impl Into<String>) -> Self {
        self.query = query.into();
        self
    }

    pub fn with_type(mut self, type_name: impl Into<String>) -> Self {
        self.types.push(type_name.into());
        self
    }

    pub fn with_generation(mut self, generation: u32) -> Self {
        self.generation = Some(generation);
        self
    }

    pub fn toggle_type(&mut self, type_name: &str) {
        if let Some(pos) = self.types.iter().position(|t| t == type_name) {
            self.types.remove(pos);
        } else {
            self.types.push(type_name.to_string());
        }
    }

    pub fn is_empty(&self) -> bool {
        self.query.is_empty() && self.types.is_empty() && self.generation.is_none()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SortKey {
    #[default]
    IdAsc,
    IdDesc,
    NameAsc,
    NameDesc,
    StatsDesc,
}

impl SortKey {
    pub const ALL: [SortKey; 5] = [
        Self::IdAsc,
        Self::IdDesc,
        Self::NameAsc,
        Self::NameDesc,
        Self::StatsDesc,
    ];

    pub fn as_str(&self) -> &'static str {
        match *self {
            Self::IdAsc => "id-asc",
            Self::IdDesc => "id-desc",
            Self::NameAsc => "name-asc",
            Self::NameDesc => "name-desc",
            Self::StatsDesc => "stats-desc",
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortKey {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|key| key.as_str() == normalized)
            .ok_or_else(|| {
                format!(
                    "invalid sort key '{value}', expected one of: id-asc, id-desc, name-asc, name-desc, stats-desc"
                )
            })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RosterEntry {
    #[serde(rename = "pokemon")]
    pub creature: Creature,
    #[serde(rename = "addedAt")]
    pub added_at: DateTime<Utc>,
    pub slot: usize,
}

impl RosterEntry {
    pub fn id(&self) -> CreatureId {
        self.creature.pokedex_id
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamSummary {
    pub members: usize,
    pub stats: Vec<StatSummary>,
    pub total: u32,
    /// Distinct type labels across members, in first-seen order.
    pub types: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatSummary {
    pub key: String,
    pub sum: u32,
    pub average: f64,
}
