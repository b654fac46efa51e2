// Library root: re-exports all modules so integration tests and the binary
// share the same code paths.

pub mod bots;
pub mod config;
pub mod data;
pub mod db;
pub mod sim;
