//! Staff roles and the privileged/ordinary split used for authorization.
//!
//! Role names must match the `CHECK` constraint on `users.role`.

crate::define_text_enum! {
    /// Fixed role enumeration carried on every user and in JWT claims.
    Role("role") {
        Admin = "admin",
        Director = "director",
        Staff = "staff",
    }
}

impl Role {
    /// Admins and directors may create, assign and review across all records.
    pub fn is_privileged(self) -> bool {
        matches!(self, Role::Admin | Role::Director)
    }
}
