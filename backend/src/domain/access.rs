//! Role gating over an authenticated identity.

use crate::domain::{Error, Identity, Role};

/// Role set an operation requires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoleRequirement {
    /// Admins only.
    Admin,
    /// Vendors only.
    Vendor,
    /// Either admins or vendors.
    AdminOrVendor,
}

impl RoleRequirement {
    /// Whether `role` satisfies the requirement.
    #[must_use]
    pub const fn admits(self, role: Role) -> bool {
        matches!(
            (self, role),
            (Self::Admin, Role::Admin)
                | (Self::Vendor, Role::Vendor)
                | (Self::AdminOrVendor, Role::Admin | Role::Vendor)
        )
    }

    const fn denial(self) -> &'static str {
        match self {
            Self::Admin => "Access denied. Admin rights required.",
            Self::Vendor => "Access denied. Vendor rights required.",
            Self::AdminOrVendor => "Access denied. Admin or vendor rights required.",
        }
    }
}

/// Check `identity` against `requirement`.
///
/// # Examples
/// ```
/// use nightlist::domain::{Role, RoleRequirement};
///
/// assert!(RoleRequirement::AdminOrVendor.admits(Role::Vendor));
/// assert!(!RoleRequirement::Admin.admits(Role::User));
/// ```
pub fn authorize(identity: &Identity, requirement: RoleRequirement) -> Result<(), Error> {
    if requirement.admits(identity.role()) {
        Ok(())
    } else {
        Err(Error::forbidden(requirement.denial()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(RoleRequirement::Admin, Role::Admin, true)]
    #[case(RoleRequirement::Admin, Role::Vendor, false)]
    #[case(RoleRequirement::Admin, Role::User, false)]
    #[case(RoleRequirement::Vendor, Role::Vendor, true)]
    #[case(RoleRequirement::Vendor, Role::Admin, false)]
    #[case(RoleRequirement::AdminOrVendor, Role::Admin, true)]
    #[case(RoleRequirement::AdminOrVendor, Role::Vendor, true)]
    #[case(RoleRequirement::AdminOrVendor, Role::User, false)]
    fn role_matrix(#[case] requirement: RoleRequirement, #[case] role: Role, #[case] ok: bool) {
        assert_eq!(requirement.admits(role), ok);
    }
}
