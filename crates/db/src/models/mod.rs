//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` entity struct matching the database row
//! - A create DTO for inserts
//! - An update DTO (all `Option` fields) for patches
//!
//! Enumerated `TEXT` columns decode into the `becs_core` enums via
//! `#[sqlx(try_from = "String")]`.

pub mod attendance;
pub mod dashboard;
pub mod invoice;
pub mod leave;
pub mod leave_template;
pub mod notification;
pub mod project;
pub mod review;
pub mod session;
pub mod task;
pub mod template;
pub mod user;
