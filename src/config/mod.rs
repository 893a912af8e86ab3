//! Configuration model for cronlock.
//!
//! All settings come from `CRONLOCK_*` environment variables (compatible with
//! the shell `cronlock` tool) or the matching long flags. The resolved values
//! are collected once into a [`LockConfig`] that is passed by reference to the
//! store and the coordinator; nothing reads the environment after startup.

mod model;
mod operations;
pub mod types;


// Re-export public API
pub use model::LockConfig;
