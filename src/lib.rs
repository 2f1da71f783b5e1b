// ABOUTME: Library root for dockdev - exposes the pipeline and its backends.
// ABOUTME: The main binary is in main.rs.

pub mod config;
pub mod deploy;
pub mod error;
pub mod machine;
pub mod output;
pub mod runtime;
pub mod ssh;
pub mod sync;
pub mod types;
