//! Command entity (database row mapping).

use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Database row mapping for the commands table.
///
/// `params` is stored as JSONB and selected as `params::TEXT`.
#[derive(Debug, Clone, FromRow)]
pub struct CommandEntity {
    pub id: i64,
    pub device_id: String,
    pub name: String,
    pub params: String,
    pub author: String,
    pub created_at: DateTime<Utc>,
    pub try_count: i32,
    pub last_try_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub response: Option<String>,
    pub raw_request: Option<String>,
    pub raw_response: Option<String>,
    pub abandoned_at: Option<DateTime<Utc>>,
}

impl From<CommandEntity> for domain::models::Command {
    fn from(entity: CommandEntity) -> Self {
        Self {
            id: entity.id,
            device_id: entity.device_id,
            name: entity.name,
            params: entity.params,
            author: entity.author,
            created_at: entity.created_at,
            try_count: entity.try_count,
            last_try_at: entity.last_try_at,
            completed_at: entity.completed_at,
            response: entity.response,
            raw_request: entity.raw_request,
            raw_response: entity.raw_response,
            abandoned_at: entity.abandoned_at,
        }
    }
}

/// Row returned by a claim: the post-claim state of the delivered command.
#[derive(Debug, Clone, FromRow)]
pub struct ClaimedCommandEntity {
    pub id: i64,
    pub name: String,
    pub params: String,
    pub try_count: i32,
    pub abandoned_at: Option<DateTime<Utc>>,
}

impl From<ClaimedCommandEntity> for domain::models::ClaimedCommand {
    fn from(entity: ClaimedCommandEntity) -> Self {
        Self {
            id: entity.id,
            name: entity.name,
            params: entity.params,
            try_count: entity.try_count,
            abandoned: entity.abandoned_at.is_some(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain::models::{ClaimedCommand, Command, CommandStatus};

    fn entity() -> CommandEntity {
        CommandEntity {
            id: 7,
            device_id: "356938035643809".to_string(),
            name: "reboot".to_string(),
            params: r#"{"delay": 5}"#.to_string(),
            author: "operator".to_string(),
            created_at: Utc::now(),
            try_count: 2,
            last_try_at: Some(Utc::now()),
            completed_at: None,
            response: None,
            raw_request: None,
            raw_response: None,
            abandoned_at: None,
        }
    }

    #[test]
    fn test_command_entity_into_domain() {
        let entity = entity();
        let created_at = entity.created_at;
        let command: Command = entity.into();
        assert_eq!(command.id, 7);
        assert_eq!(command.name, "reboot");
        assert_eq!(command.try_count, 2);
        assert_eq!(command.created_at, created_at);
        assert_eq!(command.status(), CommandStatus::Pending);
    }

    #[test]
    fn test_claimed_entity_abandoned_flag() {
        let claimed: ClaimedCommand = ClaimedCommandEntity {
            id: 1,
            name: "reboot".to_string(),
            params: "{}".to_string(),
            try_count: 3,
            abandoned_at: Some(Utc::now()),
        }
        .into();
        assert!(claimed.abandoned);
        assert_eq!(claimed.try_count, 3);
    }

    #[test]
    fn test_claimed_entity_not_abandoned() {
        let claimed: ClaimedCommand = ClaimedCommandEntity {
            id: 1,
            name: "reboot".to_string(),
            params: "{}".to_string(),
            try_count: 1,
            abandoned_at: None,
        }
        .into();
        assert!(!claimed.abandoned);
    }
}
