//! # coursehub-core
//!
//! Core crate for the CourseHub client. Contains configuration schemas,
//! the storage and clock seams, poll bookkeeping, the cancellable task
//! handle, and the unified error system.
//!
//! This crate has **no** internal dependencies on other CourseHub crates.

pub mod config;
pub mod error;
pub mod poll;
pub mod result;
pub mod task;
pub mod traits;

pub use error::AppError;
pub use result::AppResult;
