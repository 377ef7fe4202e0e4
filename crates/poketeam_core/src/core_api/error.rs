use thiserror::Error;

use crate::creature::CreatureId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoreErrorCode {
    Network,
    NotFound,
    Decode,
    Encode,
    Io,
    Persistence,
}

impl CoreErrorCode {
    pub fn as_str(&self) -> &'static str {
        match *self {
            Self::Network => "network",
            Self::NotFound => "not_found",
            Self::Decode => "decode",
            Self::Encode => "encode",
            Self::Io => "io",
            Self::Persistence => "persistence",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{code:?}: {message}")]
pub struct CoreError {
    pub code: CoreErrorCode,
    pub message: String,
}

impl CoreError {
    pub fn new(code: CoreErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

/// Why a roster mutation was refused. None of these are exceptional; shells
/// turn them into notifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RosterRejection {
    #[error("team is full")]
    Full,
    #[error("creature {0} is already in the team")]
    Duplicate(CreatureId),
    #[error("slot {index} is out of bounds for a team of {len}")]
    OutOfBounds { index: usize, len: usize },
}
