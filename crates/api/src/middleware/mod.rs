//! Authentication and authorization extractors.
//!
//! - [`auth::AuthUser`] -- the authenticated caller, from a JWT Bearer token.
//! - [`rbac::RequirePrivileged`] -- admin or director.
//! - [`rbac::RequireAdmin`] -- admin only.

pub mod auth;
pub mod rbac;
