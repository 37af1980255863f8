//! HTTP route handlers.

pub mod commands;
pub mod health;
