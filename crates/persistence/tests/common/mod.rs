//! Common test utilities for command store integration tests.
//!
//! These tests run against a real PostgreSQL database given by
//! `TEST_DATABASE_URL`. When the variable is unset the tests return early.

#![allow(dead_code)]

use sqlx::{postgres::PgPoolOptions, PgPool};
use std::time::Duration;

/// Connect to the test database and apply migrations.
///
/// Returns `None` (and the calling test passes vacuously) when
/// `TEST_DATABASE_URL` is not set.
pub async fn test_pool() -> Option<PgPool> {
    let Ok(database_url) = std::env::var("TEST_DATABASE_URL") else {
        eprintln!("TEST_DATABASE_URL not set, skipping database test");
        return None;
    };

    let pool = PgPoolOptions::new()
        .max_connections(20)
        .min_connections(1)
        .acquire_timeout(Duration::from_secs(30))
        .connect(&database_url)
        .await
        .expect("Failed to connect to test database");

    sqlx::migrate!("./src/migrations")
        .run(&pool)
        .await
        .expect("Failed to run migrations");

    Some(pool)
}

/// A random 15-digit device identity, unique per test.
pub fn unique_imei() -> String {
    let value = uuid::Uuid::new_v4().as_u128() % 1_000_000_000_000_000;
    format!("{:015}", value)
}
