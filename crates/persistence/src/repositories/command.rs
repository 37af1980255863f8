//! Command repository: the command lifecycle engine.
//!
//! Every operation is a single SQL statement, so the database is the only
//! arbiter between concurrent callers:
//! - enqueue relies on the partial unique index over pending rows
//!   (`commands_pending_device_name_idx`) for deduplication;
//! - claim_next locks the oldest pending row with `FOR UPDATE SKIP LOCKED`
//!   and derives both the new `try_count` and the abandonment decision from
//!   the pre-update value in one `UPDATE`.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use domain::errors::{is_pending_duplicate, CommandError};
use domain::models::{ClaimedCommand, Command};
use domain::services::RetryPolicy;

use crate::entities::{ClaimedCommandEntity, CommandEntity};
use crate::metrics::QueryTimer;

/// Repository for command lifecycle operations.
#[derive(Debug, Clone)]
pub struct CommandRepository {
    pool: PgPool,
    retry_policy: RetryPolicy,
}

impl CommandRepository {
    /// Create a repository using the default retry policy.
    pub fn new(pool: PgPool) -> Self {
        Self::with_retry_policy(pool, RetryPolicy::default())
    }

    pub fn with_retry_policy(pool: PgPool, retry_policy: RetryPolicy) -> Self {
        Self { pool, retry_policy }
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        self.retry_policy
    }

    /// Enqueue a command for a device.
    ///
    /// Returns [`CommandError::Duplicate`] when the same command is already
    /// pending for the device. `params` must be valid JSON.
    pub async fn enqueue(
        &self,
        device_id: &str,
        name: &str,
        params: &str,
        author: &str,
    ) -> Result<i64, CommandError> {
        let timer = QueryTimer::new("enqueue_command");
        let result = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO commands (device_id, name, params, author)
            VALUES ($1, $2, $3::JSONB, $4)
            RETURNING id
            "#,
        )
        .bind(device_id)
        .bind(name)
        .bind(params)
        .bind(author)
        .fetch_one(&self.pool)
        .await;
        timer.record();

        result.map_err(|err| {
            if is_pending_duplicate(&err) {
                CommandError::Duplicate {
                    device_id: device_id.to_string(),
                    name: name.to_string(),
                }
            } else {
                CommandError::store("enqueue", err)
            }
        })
    }

    /// Claim the oldest pending command of a device as a delivery attempt.
    ///
    /// Returns `None` when the device has nothing pending. The claim that
    /// uses the last allowed attempt still returns the command, marked
    /// abandoned.
    pub async fn claim_next(
        &self,
        device_id: &str,
    ) -> Result<Option<ClaimedCommand>, CommandError> {
        let timer = QueryTimer::new("claim_next_command");
        let result = sqlx::query_as::<_, ClaimedCommandEntity>(
            r#"
            WITH next AS (
                SELECT id
                FROM commands
                WHERE device_id = $1
                  AND completed_at IS NULL
                  AND abandoned_at IS NULL
                ORDER BY created_at ASC, id ASC
                LIMIT 1
                FOR UPDATE SKIP LOCKED
            )
            UPDATE commands AS c
            SET try_count = c.try_count + 1,
                last_try_at = NOW(),
                abandoned_at = CASE WHEN c.try_count >= $2 THEN NOW() ELSE NULL END
            FROM next
            WHERE c.id = next.id
            RETURNING c.id, c.name, c.params::TEXT AS params, c.try_count, c.abandoned_at
            "#,
        )
        .bind(device_id)
        .bind(self.retry_policy.abandon_threshold())
        .fetch_optional(&self.pool)
        .await;
        timer.record();

        result
            .map(|row| row.map(Into::into))
            .map_err(|err| CommandError::store("claim_next", err))
    }

    /// Record a device's response to a command.
    ///
    /// Always clears `abandoned_at`, so a late response revives an abandoned
    /// command as completed. Re-completion overwrites the previous response.
    /// Empty payload strings are stored as NULL. Returns the number of rows
    /// updated: zero means no command has this id.
    pub async fn complete(
        &self,
        id: i64,
        responded_at: DateTime<Utc>,
        response: Option<&str>,
        raw_request: Option<&str>,
        raw_response: Option<&str>,
    ) -> Result<u64, CommandError> {
        let timer = QueryTimer::new("complete_command");
        let result = sqlx::query(
            r#"
            UPDATE commands
            SET completed_at = $2,
                response = $3,
                raw_request = $4,
                raw_response = $5,
                abandoned_at = NULL
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(responded_at)
        .bind(non_empty(response))
        .bind(non_empty(raw_request))
        .bind(non_empty(raw_response))
        .execute(&self.pool)
        .await;
        timer.record();

        result
            .map(|done| done.rows_affected())
            .map_err(|err| CommandError::store("complete", err))
    }

    /// List commands for a device with pagination.
    ///
    /// `pending_only` returns the queue in claim order (oldest first);
    /// otherwise the full history is returned newest first.
    pub async fn list_for_device(
        &self,
        device_id: &str,
        offset: i64,
        limit: i64,
        pending_only: bool,
    ) -> Result<Vec<Command>, CommandError> {
        let sql = if pending_only {
            r#"
            SELECT id, device_id, name, params::TEXT AS params, author, created_at,
                try_count, last_try_at, completed_at, response, raw_request,
                raw_response, abandoned_at
            FROM commands
            WHERE device_id = $1
              AND completed_at IS NULL
              AND abandoned_at IS NULL
            ORDER BY created_at ASC, id ASC
            OFFSET $2 LIMIT $3
            "#
        } else {
            r#"
            SELECT id, device_id, name, params::TEXT AS params, author, created_at,
                try_count, last_try_at, completed_at, response, raw_request,
                raw_response, abandoned_at
            FROM commands
            WHERE device_id = $1
            ORDER BY created_at DESC, id DESC
            OFFSET $2 LIMIT $3
            "#
        };

        let timer = QueryTimer::new(if pending_only {
            "list_pending_commands"
        } else {
            "list_commands"
        });
        let result = sqlx::query_as::<_, CommandEntity>(sql)
            .bind(device_id)
            .bind(offset)
            .bind(limit)
            .fetch_all(&self.pool)
            .await;
        timer.record();

        result
            .map(|rows| rows.into_iter().map(Into::into).collect())
            .map_err(|err| CommandError::store("list", err))
    }

    /// Get a command by ID.
    pub async fn get_by_id(&self, id: i64) -> Result<Option<Command>, CommandError> {
        let timer = QueryTimer::new("get_command_by_id");
        let result = sqlx::query_as::<_, CommandEntity>(
            r#"
            SELECT id, device_id, name, params::TEXT AS params, author, created_at,
                try_count, last_try_at, completed_at, response, raw_request,
                raw_response, abandoned_at
            FROM commands
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();

        result
            .map(|row| row.map(Into::into))
            .map_err(|err| CommandError::store("get_by_id", err))
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}
