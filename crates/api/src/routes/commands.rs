//! Command endpoint handlers.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use tracing::{info, warn};
use validator::Validate;

use crate::app::AppState;
use crate::error::{ApiError, ValidationDetail};
use crate::middleware::metrics::{
    record_command_claimed, record_command_completed, record_command_duplicate,
    record_command_enqueued,
};
use domain::errors::CommandError;
use domain::models::command::{
    ClaimedCommand, Command, CompleteCommandRequest, CompleteCommandResponse,
    EnqueueCommandRequest, EnqueueCommandResponse, ListCommandsQuery, ListCommandsResponse,
};
use domain::services::ParamsValidator;
use shared::pagination::PageParams;
use shared::validation::validate_imei;

/// Rejects path IMEIs the enqueue validator would also reject.
fn check_imei(imei: &str) -> Result<(), ApiError> {
    validate_imei(imei).map_err(|e| {
        ApiError::invalid_fields(vec![ValidationDetail {
            field: "imei".to_string(),
            message: e
                .message
                .map(|m| m.to_string())
                .unwrap_or_else(|| "Invalid IMEI".to_string()),
        }])
    })
}

/// Enqueue a command for a device.
///
/// POST /api/v1/commands
pub async fn enqueue_command(
    State(state): State<AppState>,
    Json(request): Json<EnqueueCommandRequest>,
) -> Result<(StatusCode, Json<EnqueueCommandResponse>), ApiError> {
    request.validate()?;

    let violations = ParamsValidator::validate(
        state.params_validator.as_ref(),
        &request.protocol,
        &request.name,
        &request.params,
    )?;
    if !violations.is_empty() {
        return Err(ApiError::invalid_fields(
            violations.into_iter().map(Into::into).collect(),
        ));
    }

    let params = request.params.to_string();
    let result = state
        .commands
        .enqueue(&request.imei, &request.name, &params, &request.author)
        .await;

    match result {
        Ok(id) => {
            record_command_enqueued();
            info!(
                command_id = id,
                device_id = %request.imei,
                name = %request.name,
                author = %request.author,
                "Command enqueued"
            );
            Ok((StatusCode::CREATED, Json(EnqueueCommandResponse { id })))
        }
        Err(err @ CommandError::Duplicate { .. }) => {
            record_command_duplicate();
            info!(
                device_id = %request.imei,
                name = %request.name,
                "Duplicate command rejected"
            );
            Err(err.into())
        }
        Err(err) => {
            tracing::error!(
                device_id = %request.imei,
                error = %err,
                "Failed to enqueue command"
            );
            Err(err.into())
        }
    }
}

/// List a device's commands.
///
/// GET /api/v1/devices/:imei/commands?offset=&limit=&pendingOnly=
pub async fn list_commands(
    State(state): State<AppState>,
    Path(imei): Path<String>,
    Query(query): Query<ListCommandsQuery>,
) -> Result<Json<ListCommandsResponse>, ApiError> {
    check_imei(&imei)?;

    let page = PageParams {
        offset: query.offset,
        limit: query.limit,
    }
    .resolve(
        state.config.commands.default_list_limit,
        state.config.commands.max_list_limit,
    )?;

    let commands = state
        .commands
        .list_for_device(&imei, page.offset, page.limit, query.pending_only)
        .await
        .inspect_err(|e| {
            tracing::error!(device_id = %imei, error = %e, "Failed to list commands")
        })?;

    Ok(Json(ListCommandsResponse { commands }))
}

/// Claim the next pending command for delivery to a device.
///
/// POST /api/v1/devices/:imei/commands/next
pub async fn claim_next_command(
    State(state): State<AppState>,
    Path(imei): Path<String>,
) -> Result<Json<ClaimedCommand>, ApiError> {
    check_imei(&imei)?;

    let claimed = state
        .commands
        .claim_next(&imei)
        .await
        .inspect_err(|e| {
            tracing::error!(device_id = %imei, error = %e, "Failed to claim command")
        })?
        .ok_or_else(|| ApiError::NotFound(format!("No pending commands for device {imei}")))?;

    record_command_claimed(claimed.abandoned);
    if claimed.abandoned {
        warn!(
            command_id = claimed.id,
            device_id = %imei,
            name = %claimed.name,
            try_count = claimed.try_count,
            "Command abandoned after final delivery attempt"
        );
    } else {
        info!(
            command_id = claimed.id,
            device_id = %imei,
            name = %claimed.name,
            try_count = claimed.try_count,
            "Command claimed for delivery"
        );
    }

    Ok(Json(claimed))
}

/// Record a device's response to a command.
///
/// PUT /api/v1/commands/:id/response
pub async fn complete_command(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(request): Json<CompleteCommandRequest>,
) -> Result<Json<CompleteCommandResponse>, ApiError> {
    request.validate()?;

    let rows_affected = state
        .commands
        .complete(
            id,
            request.responded_at_utc(),
            request.response.as_deref(),
            request.raw_request.as_deref(),
            request.raw_response.as_deref(),
        )
        .await
        .inspect_err(|e| {
            tracing::error!(command_id = id, error = %e, "Failed to complete command")
        })?;

    if rows_affected == 0 {
        return Err(CommandError::NotFound(id.to_string()).into());
    }

    record_command_completed();
    info!(
        command_id = id,
        responded_at = %request.responded_at_utc(),
        "Command completed"
    );

    Ok(Json(CompleteCommandResponse { rows_affected }))
}

/// Get a single command by ID.
///
/// GET /api/v1/commands/:id
pub async fn get_command(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Command>, ApiError> {
    let command = state
        .commands
        .get_by_id(id)
        .await
        .inspect_err(|e| tracing::error!(command_id = id, error = %e, "Failed to get command"))?
        .ok_or_else(|| ApiError::from(CommandError::NotFound(id.to_string())))?;

    Ok(Json(command))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_imei_accepts_digits() {
        assert!(check_imei("356938035643809").is_ok());
        assert!(check_imei("3569380356438091").is_ok());
    }

    #[test]
    fn test_check_imei_rejects_with_field_detail() {
        match check_imei("35693803564380x") {
            Err(ApiError::Validation { details, .. }) => {
                assert_eq!(details.len(), 1);
                assert_eq!(details[0].field, "imei");
            }
            other => panic!("Expected Validation, got {other:?}"),
        }
        assert!(check_imei("1234").is_err());
    }
}
