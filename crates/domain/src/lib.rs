//! Domain layer for the command queue backend.
//!
//! This crate contains:
//! - Domain models (Command and its request/response payloads)
//! - Lifecycle rules (delivery retry policy)
//! - The parameter validation capability used before enqueue
//! - Domain error types

pub mod errors;
pub mod models;
pub mod services;
