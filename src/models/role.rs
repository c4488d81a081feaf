//! Account roles and the capability hierarchy behind access control.

use serde::{Deserialize, Serialize};

use super::common::{normalize_label, WireLabel};

/// Account roles with cumulative capabilities.
///
/// Employee ⊂ Technician ⊂ Admin: an admin can do everything a technician
/// can, a technician everything an employee can.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Role {
    /// Files tickets and follows their own requests
    Employee,
    /// Triages, assigns and resolves tickets
    Technician,
    /// Manages accounts and reads statistics
    Admin,
}

impl Role {
    pub const ALL: [Role; 3] = [Role::Employee, Role::Technician, Role::Admin];

    /// Check if this role has at least the specified capability level
    pub fn has_at_least(&self, required: Role) -> bool {
        self.level() >= required.level()
    }

    /// Get the capability level (higher = more capabilities)
    pub fn level(&self) -> u8 {
        match self {
            Role::Employee => 1,
            Role::Technician => 2,
            Role::Admin => 3,
        }
    }

    /// Check if the role works the ticket queue
    pub fn can_manage_tickets(&self) -> bool {
        self.has_at_least(Role::Technician)
    }

    /// Check if the role can delete tickets outright
    pub fn can_delete_tickets(&self) -> bool {
        matches!(self, Role::Admin)
    }

    /// Check if the role can manage user accounts
    pub fn can_manage_users(&self) -> bool {
        matches!(self, Role::Admin)
    }
}

impl WireLabel for Role {
    fn label(&self) -> &'static str {
        match self {
            Role::Employee => "Employee",
            Role::Technician => "Technician",
            Role::Admin => "Admin",
        }
    }

    fn wire_label(&self) -> &'static str {
        match self {
            Role::Employee => "Employé",
            Role::Technician => "Technicien",
            Role::Admin => "Admin",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize_label(s).as_str() {
            "employee" | "employe" => Ok(Role::Employee),
            "technician" | "technicien" | "tech" => Ok(Role::Technician),
            "admin" | "administrator" | "administrateur" => Ok(Role::Admin),
            _ => Err(format!("Unknown role: {}", s)),
        }
    }
}

impl TryFrom<String> for Role {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<Role> for String {
    fn from(role: Role) -> Self {
        role.label().to_string()
    }
}
