// ABOUTME: Type-safe identifiers and validated domain names.
// ABOUTME: Container ids and DNS-safe project names.

mod clean_name;
mod id;

pub use clean_name::{CleanName, CleanNameError};
pub use id::ContainerId;
