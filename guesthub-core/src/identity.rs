use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{CoreError, CoreResult};

/// Access level of a registered account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Guest,
    Staff,
    Management,
    Admin,
}

impl Role {
    pub const ALL: [Role; 4] = [Role::Guest, Role::Staff, Role::Management, Role::Admin];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Guest => "guest",
            Role::Staff => "staff",
            Role::Management => "management",
            Role::Admin => "admin",
        }
    }

    /// Staff, management and admin may see every booking.
    pub fn is_privileged(&self) -> bool {
        matches!(self, Role::Staff | Role::Management | Role::Admin)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown role '{0}', expected one of guest, staff, management, admin")]
pub struct UnknownRole(pub String);

impl FromStr for Role {
    type Err = UnknownRole;

    /// Case-insensitive, so `"GUEST"` and `"guest"` are the same role.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Role::ALL
            .into_iter()
            .find(|role| role.as_str() == wanted)
            .ok_or_else(|| UnknownRole(s.to_string()))
    }
}

/// A verified caller, built from token claims and handed explicitly to every
/// service operation that needs to know who is asking.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Caller {
    pub email: String,
    pub name: String,
    pub role: Role,
}

impl Caller {
    pub fn new(email: impl Into<String>, name: impl Into<String>, role: Role) -> Self {
        Self {
            email: email.into(),
            name: name.into(),
            role,
        }
    }

    pub fn is_privileged(&self) -> bool {
        self.role.is_privileged()
    }

    /// Fails with `Forbidden` unless the caller holds one of `allowed`.
    pub fn require_any(&self, allowed: &[Role]) -> CoreResult<()> {
        if allowed.contains(&self.role) {
            return Ok(());
        }
        let names: Vec<&str> = allowed.iter().map(Role::as_str).collect();
        Err(CoreError::Forbidden(format!(
            "Requires one of roles: {}",
            names.join(", ")
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_roles_case_insensitively() {
        assert_eq!("GUEST".parse::<Role>().unwrap(), Role::Guest);
        assert_eq!(" Management ".parse::<Role>().unwrap(), Role::Management);
        assert_eq!("admin".parse::<Role>().unwrap(), Role::Admin);
    }

    #[test]
    fn rejects_unknown_role() {
        let err = "superuser".parse::<Role>().unwrap_err();
        assert_eq!(err, UnknownRole("superuser".to_string()));
    }

    #[test]
    fn only_guest_is_unprivileged() {
        assert!(!Role::Guest.is_privileged());
        assert!(Role::Staff.is_privileged());
        assert!(Role::Management.is_privileged());
        assert!(Role::Admin.is_privileged());
    }

    #[test]
    fn require_any_gates_by_role() {
        let manager = Caller::new("m@b.com", "M", Role::Management);
        assert!(manager.require_any(&[Role::Management, Role::Admin]).is_ok());
        assert!(matches!(
            manager.require_any(&[Role::Admin]),
            Err(CoreError::Forbidden(_))
        ));
    }

    #[test]
    fn serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Role::Staff).unwrap(), "\"staff\"");
    }
}
