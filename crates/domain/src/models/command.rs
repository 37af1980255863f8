//! Command domain model.

use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// A command queued for delivery to a device.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Command {
    pub id: i64,
    /// Target device identity (IMEI).
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

/// Lifecycle state derived from a command's timestamps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CommandStatus {
    Pending,
    Completed,
    Abandoned,
}

impl Command {
    /// A completion always wins over abandonment.
    pub fn status(&self) -> CommandStatus {
        if self.completed_at.is_some() {
            CommandStatus::Completed
        } else if self.abandoned_at.is_some() {
            CommandStatus::Abandoned
        } else {
            CommandStatus::Pending
        }
    }
}

/// A command handed to a device by a claim.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClaimedCommand {
    pub id: i64,
    pub name: String,
    pub params: String,
    /// Delivery attempts including this one.
    pub try_count: i32,
    /// True when this delivery exhausted the retry budget.
    pub abandoned: bool,
}

/// Request payload for enqueueing a command.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct EnqueueCommandRequest {
    #[validate(custom(function = "shared::validation::validate_imei"))]
    pub imei: String,

    /// Device protocol used to pick the parameter validator.
    #[validate(length(min = 1, max = 45, message = "Protocol must be 1-45 characters"))]
    #[validate(custom(function = "shared::validation::validate_no_nul"))]
    pub protocol: String,

    #[validate(length(min = 1, max = 45, message = "Command name must be 1-45 characters"))]
    #[validate(custom(function = "shared::validation::validate_command_name"))]
    pub name: String,

    pub params: serde_json::Value,

    #[validate(length(
        min = 3,
        max = 30,
        message = "Author name must be between 3 and 30 characters"
    ))]
    #[validate(custom(function = "shared::validation::validate_no_nul"))]
    pub author: String,
}

/// Response payload after a successful enqueue.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnqueueCommandResponse {
    pub id: i64,
}

/// Request payload for reporting a device's response to a command.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CompleteCommandRequest {
    /// When the device responded, with an explicit UTC offset.
    pub responded_at: DateTime<FixedOffset>,
    #[serde(default)]
    #[validate(custom(function = "shared::validation::validate_no_nul"))]
    pub response: Option<String>,
    #[serde(default)]
    #[validate(custom(function = "shared::validation::validate_no_nul"))]
    pub raw_request: Option<String>,
    #[serde(default)]
    #[validate(custom(function = "shared::validation::validate_no_nul"))]
    pub raw_response: Option<String>,
}

impl CompleteCommandRequest {
    pub fn responded_at_utc(&self) -> DateTime<Utc> {
        self.responded_at.with_timezone(&Utc)
    }
}

/// Response payload after recording a command response.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompleteCommandResponse {
    pub rows_affected: u64,
}

/// Query parameters for listing a device's commands.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListCommandsQuery {
    pub offset: Option<i64>,
    pub limit: Option<i64>,
    #[serde(default)]
    pub pending_only: bool,
}

/// Response for command listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListCommandsResponse {
    pub commands: Vec<Command>,
}
