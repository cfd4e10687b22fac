//! Role-based capability checks.
//!
//! DESIGN
//! ======
//! The backend hands us a free-form role string. It is folded into `Role`
//! once, when the user record is decoded, so capability checks are plain
//! enum matches. Only Admin can modify data or open configuration.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::session::User;

pub const ROLE_ADMIN: &str = "Admin";
pub const ROLE_CONSULTOR: &str = "Consultor";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Role {
    Admin,
    Consultor,
    /// A role the gateway does not know; grants nothing.
    Unknown(String),
}

impl Role {
    /// Case-insensitive parse against the known roles.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.eq_ignore_ascii_case(ROLE_ADMIN) {
            Self::Admin
        } else if trimmed.eq_ignore_ascii_case(ROLE_CONSULTOR) {
            Self::Consultor
        } else {
            Self::Unknown(trimmed.to_string())
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Admin => ROLE_ADMIN,
            Self::Consultor => ROLE_CONSULTOR,
            Self::Unknown(raw) => raw,
        }
    }
}

impl Serialize for Role {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Role {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Self::parse(&raw))
    }
}

/// Gate names used by protected content and mutating routes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Permission {
    Modify,
    AccessConfig,
    Admin,
    Consultor,
}

/// Coarse capabilities derived from the current user's role.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Capabilities {
    pub is_admin: bool,
    pub is_consultor: bool,
    pub can_modify: bool,
    pub can_access_config: bool,
}

impl Capabilities {
    /// No user or no role means every check is false.
    #[must_use]
    pub fn for_user(user: Option<&User>) -> Self {
        let role = user.and_then(|u| u.role.as_ref());
        Self::for_role(role)
    }

    #[must_use]
    pub fn for_role(role: Option<&Role>) -> Self {
        let is_admin = matches!(role, Some(Role::Admin));
        let is_consultor = matches!(role, Some(Role::Consultor));
        Self { is_admin, is_consultor, can_modify: is_admin, can_access_config: is_admin }
    }

    #[must_use]
    pub fn allows(&self, permission: Permission) -> bool {
        match permission {
            Permission::Modify => self.can_modify,
            Permission::AccessConfig => self.can_access_config,
            Permission::Admin => self.is_admin,
            Permission::Consultor => self.is_consultor,
        }
    }
}

#[cfg(test)]
#[path = "rbac_test.rs"]
mod tests;
