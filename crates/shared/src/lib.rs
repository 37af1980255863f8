//! Shared utilities and common types for the command queue backend.
//!
//! This crate provides common functionality used across all other crates:
//! - Offset pagination
//! - Common validation logic for device identities, command names and stored text

pub mod pagination;
pub mod validation;
