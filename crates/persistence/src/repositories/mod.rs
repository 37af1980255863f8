//! Repository implementations for database operations.

pub mod command;

pub use command::CommandRepository;
