use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StatTier {
    High,
    Medium,
    Low,
}

impl StatTier {
    pub const HIGH_MIN: u32 = 100;
    pub const MEDIUM_MIN: u32 = 70;
    pub const STAT_CEILING: u32 = 255;

    pub fn from_value(value: u32) -> Self {
        match value {
            v if v >= Self::HIGH_MIN => Self::High,
            v if v >= Self::MEDIUM_MIN => Self::Medium,
            _ => Self::Low,
        }
    }

    /// Share of the bar to fill, in whole percent, clamped to 100.
    pub fn percent_of_ceiling(value: u32) -> u32 {
        (value.min(Self::STAT_CEILING) * 100) / Self::STAT_CEILING
    }

    pub fn as_str(&self) -> &'static str {
        match *self {
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
        }
    }
}

impl fmt::Display for StatTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResistanceTier {
    Immune,
    DoubleResist,
    Resist,
    Neutral,
    Weak,
    DoubleWeak,
}

impl ResistanceTier {
    pub fn from_multiplier(multiplier: f64) -> Self {
        if multiplier == 0.0 {
            Self::Immune
        } else if multiplier < 0.5 {
            Self::DoubleResist
        } else if multiplier < 1.0 {
            Self::Resist
        } else if multiplier == 1.0 {
            Self::Neutral
        } else if multiplier <= 2.0 {
            Self::Weak
        } else {
            Self::DoubleWeak
        }
    }

    pub fn as_str(&self) -> &'static str {
        match *self {
            Self::Immune => "immune",
            Self::DoubleResist => "double-resist",
            Self::Resist => "resist",
            Self::Neutral => "neutral",
            Self::Weak => "weak",
            Self::DoubleWeak => "double-weak",
        }
    }

    pub fn label(multiplier: f64) -> String {
        if multiplier == 0.0 {
            "Immunité".to_string()
        } else {
            format!("×{multiplier}")
        }
    }
}

impl fmt::Display for ResistanceTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
