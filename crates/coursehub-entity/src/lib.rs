//! # coursehub-entity
//!
//! Domain entities shared by the CourseHub client crates.

pub mod notification;
pub mod session;
pub mod user;
