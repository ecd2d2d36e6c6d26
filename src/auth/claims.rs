use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Account role. The decoded role claim is trusted as-is for the token's
/// lifetime, even if the stored role changes afterwards.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "user_role", rename_all = "lowercase")]
pub enum Role {
    User,
    Admin,
}

impl Role {
    pub fn is_admin(self) -> bool {
        matches!(self, Role::Admin)
    }
}

/// JWT payload used for authentication.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,  // account ID
    pub role: Role, // role at issue time
    pub iat: usize, // issued at (unix timestamp)
    pub exp: usize, // expires at (unix timestamp)
}

impl Claims {
    /// Ownership policy: the resource's author, or any admin.
    pub fn owns_or_admin(&self, author_id: Uuid) -> bool {
        self.sub == author_id || self.role.is_admin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn claims(sub: Uuid, role: Role) -> Claims {
        Claims {
            sub,
            role,
            iat: 0,
            exp: 0,
        }
    }

    #[test]
    fn author_passes_ownership() {
        let id = Uuid::new_v4();
        assert!(claims(id, Role::User).owns_or_admin(id));
    }

    #[test]
    fn admin_passes_ownership_on_any_resource() {
        assert!(claims(Uuid::new_v4(), Role::Admin).owns_or_admin(Uuid::new_v4()));
    }

    #[test]
    fn unrelated_user_fails_ownership() {
        assert!(!claims(Uuid::new_v4(), Role::User).owns_or_admin(Uuid::new_v4()));
    }
}
