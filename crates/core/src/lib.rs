//! Domain rules for the BECS workspace backend.
//!
//! Pure logic only: no I/O, no database, no HTTP. The `db` and `api` crates
//! call into these modules for enumerations, validation and the task
//! lifecycle state machine.

#[macro_use]
pub mod text_enum;

pub mod attendance;
pub mod bulk_import;
pub mod error;
pub mod invoice;
pub mod leave;
pub mod notification;
pub mod pagination;
pub mod project;
pub mod review;
pub mod roles;
pub mod task_workflow;
pub mod template;
pub mod types;
pub mod upload;
pub mod user;
pub mod validation;
