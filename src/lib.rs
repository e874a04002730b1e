// ABOUTME: Library root for dockscout - exposes public types for testing.
// ABOUTME: The main binary is in main.rs.

pub mod compose;
pub mod config;
pub mod diagnostics;
pub mod engine;
pub mod error;
pub mod inventory;
pub mod output;
pub mod registry;
pub mod runtime;
pub mod state;
pub mod types;
pub mod update;
