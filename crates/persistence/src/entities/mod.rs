//! Database entity definitions.
//!
//! Entities are direct mappings to database rows.

pub mod command;

pub use command::{ClaimedCommandEntity, CommandEntity};
