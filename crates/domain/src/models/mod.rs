//! Domain models for the command queue.

pub mod command;

pub use command::{ClaimedCommand, Command, CommandStatus};
