//! Vocabulary shared by the API, the services and the planning client.
//!
//! Task and framework attributes are persisted as plain strings; these enums
//! are the canonical spelling and the only place the accepted values live.

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString, IntoEnumIterator};

use crate::errors::CoreError;

/// Maximum number of tasks a single source may generate for one stage.
pub const MAX_TASKS_PER_STAGE: u64 = 3;

/// Top-level stage of the planning wizard.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, EnumIter, AsRefStr,
)]
#[cfg_attr(feature = "server", derive(utoipa::ToSchema))]
pub enum BlockId {
    #[serde(rename = "block1")]
    #[strum(serialize = "block1")]
    Discover,
    #[serde(rename = "block2")]
    #[strum(serialize = "block2")]
    Design,
    #[serde(rename = "block3")]
    #[strum(serialize = "block3")]
    Deliver,
}

impl BlockId {
    pub fn label(&self) -> &'static str {
        match self {
            BlockId::Discover => "Discover",
            BlockId::Design => "Design",
            BlockId::Deliver => "Deliver",
        }
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, EnumIter, AsRefStr,
)]
#[cfg_attr(feature = "server", derive(utoipa::ToSchema))]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum TaskStage {
    Identification,
    Definition,
    Delivery,
    Closure,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, EnumIter, AsRefStr,
)]
#[cfg_attr(feature = "server", derive(utoipa::ToSchema))]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum TaskOrigin {
    Heuristic,
    Factor,
    Policy,
    Framework,
    Custom,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, EnumIter, AsRefStr,
)]
#[cfg_attr(feature = "server", derive(utoipa::ToSchema))]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum TaskPriority {
    Low,
    Medium,
    High,
}

#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    AsRefStr,
)]
#[cfg_attr(feature = "server", derive(utoipa::ToSchema))]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum TaskStatus {
    #[default]
    Todo,
    InProgress,
    Done,
    Blocked,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, EnumIter, AsRefStr,
)]
#[cfg_attr(feature = "server", derive(utoipa::ToSchema))]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ProjectSize {
    Small,
    Medium,
    Large,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, EnumIter, AsRefStr,
)]
#[cfg_attr(feature = "server", derive(utoipa::ToSchema))]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum PathClarity {
    Clear,
    Emerging,
    Unclear,
}

/// Parse a stored or user-supplied value into one of the vocabulary enums.
pub fn parse_value<T>(field: &str, raw: &str) -> Result<T, CoreError>
where
    T: std::str::FromStr + IntoEnumIterator + AsRef<str>,
{
    raw.parse::<T>().map_err(|_| {
        let accepted = T::iter()
            .map(|value| value.as_ref().to_string())
            .collect::<Vec<_>>()
            .join(", ");
        CoreError::validation(format!(
            "Invalid {}: '{}' (expected one of {})",
            field, raw, accepted
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn block_ids_use_legacy_keys() {
        assert_eq!(BlockId::Discover.to_string(), "block1");
        assert_eq!("block3".parse::<BlockId>().unwrap(), BlockId::Deliver);
        assert_eq!(
            serde_json::to_value(BlockId::Design).unwrap(),
            serde_json::json!("block2")
        );
    }

    #[test]
    fn task_status_round_trips_through_snake_case() {
        assert_eq!(TaskStatus::InProgress.as_ref(), "in_progress");
        assert_eq!(
            "in_progress".parse::<TaskStatus>().unwrap(),
            TaskStatus::InProgress
        );
    }

    #[test]
    fn parse_value_lists_accepted_values() {
        let err = parse_value::<TaskStage>("stage", "launch").unwrap_err();
        assert!(err.message().contains("identification"));
        assert!(err.message().contains("closure"));
    }
}
