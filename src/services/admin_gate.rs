//! Admin gate
//!
//! Authorization predicate consulted by every admin-only mutation. The check
//! itself is a role capability test; the role is derived from the one
//! reserved administrator email when the user record is upserted, so no
//! authorization decision compares email strings directly.

use crate::{
    error::{AppError, AppResult},
    models::{Role, User},
};

/// Authorization predicate for admin-gated operations
pub struct AdminGate;

impl AdminGate {
    /// Fail fast with `Forbidden` unless the actor holds the admin role.
    pub fn ensure_admin(actor: &User) -> AppResult<()> {
        if actor.is_admin() {
            Ok(())
        } else {
            Err(AppError::Forbidden(
                "Administrator access required".to_string(),
            ))
        }
    }

    /// Derive the role for an authenticated identity. Case-insensitive on the
    /// email, since identity providers are inconsistent about casing.
    pub fn role_for_email(email: &str, admin_email: &str) -> Role {
        if email.eq_ignore_ascii_case(admin_email) {
            Role::Admin
        } else {
            Role::Member
        }
    }
}
