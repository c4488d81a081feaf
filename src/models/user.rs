//! User account models.

use serde::{Deserialize, Serialize};

use super::common::{as_wire, as_wire_opt, UserId};
use super::role::Role;

/// The signed-in user, as held by a session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserRef {
    pub id: UserId,
    #[serde(alias = "nom")]
    pub name: String,
    pub email: String,
    pub role: Role,
}

/// A user account as listed in the administration pages
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: UserId,
    #[serde(alias = "nom")]
    pub name: String,
    pub email: String,
    pub role: Role,
    #[serde(default, alias = "date_inscription", skip_serializing_if = "Option::is_none")]
    pub registered_at: Option<String>,
}

impl From<UserRecord> for UserRef {
    fn from(user: UserRecord) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            role: user.role,
        }
    }
}

/// Login form credentials, sent to `POST /auth/verify`
#[derive(Clone, Serialize)]
pub struct Credentials {
    pub email: String,
    #[serde(rename = "mot_de_passe")]
    pub password: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Body of `POST /users`
#[derive(Clone, Serialize)]
pub struct NewUser {
    #[serde(rename = "nom")]
    pub name: String,
    pub email: String,
    #[serde(rename = "mot_de_passe")]
    pub password: String,
    #[serde(serialize_with = "as_wire")]
    pub role: Role,
}

/// Body of `PUT /users/{id}`; only the changed fields are sent
#[derive(Clone, Default, Serialize)]
pub struct UserUpdate {
    #[serde(rename = "nom", skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(rename = "mot_de_passe", skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(serialize_with = "as_wire_opt", skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
}

impl UserUpdate {
    /// Build an update holding only the fields that differ from `current`.
    /// A blank password keeps the current one.
    pub fn diff(
        current: &UserRecord,
        name: &str,
        email: &str,
        password: &str,
        role: Role,
    ) -> Self {
        let name = name.trim();
        let email = email.trim();
        Self {
            name: (!name.is_empty() && name != current.name).then(|| name.to_string()),
            email: (!email.is_empty() && email != current.email).then(|| email.to_string()),
            password: (!password.is_empty()).then(|| password.to_string()),
            role: (role != current.role).then_some(role),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.email.is_none() && self.password.is_none() && self.role.is_none()
    }
}

/// Which slice of the user directory to list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UserScope {
    #[default]
    All,
    Only(Role),
}

impl UserScope {
    /// Backend path serving this scope
    pub fn path(&self) -> &'static str {
        match self {
            UserScope::All => "/users",
            UserScope::Only(Role::Employee) => "/users/employees",
            UserScope::Only(Role::Technician) => "/users/technicians",
            UserScope::Only(Role::Admin) => "/users/admins",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> UserRecord {
        UserRecord {
            id: 9,
            name: "Ada".to_string(),
            email: "ada@example.com".to_string(),
            role: Role::Technician,
            registered_at: None,
        }
    }

    #[test]
    fn test_user_from_backend_keys() {
        let json = r#"{"id": 9, "nom": "Ada", "email": "ada@example.com", "role": "Technicien", "date_inscription": "2024-09-01"}"#;
        let user: UserRecord = serde_json::from_str(json).unwrap();
        assert_eq!(user.name, "Ada");
        assert_eq!(user.role, Role::Technician);
        assert_eq!(user.registered_at.as_deref(), Some("2024-09-01"));

        let user_ref: UserRef = user.into();
        assert_eq!(user_ref.id, 9);
    }

    #[test]
    fn test_update_diff_only_changed_fields() {
        let update = UserUpdate::diff(&record(), "Ada", "ada@corp.example", "", Role::Technician);
        assert_eq!(update.email.as_deref(), Some("ada@corp.example"));
        assert!(update.name.is_none());
        assert!(update.password.is_none());
        assert!(update.role.is_none());

        let value = serde_json::to_value(&update).unwrap();
        assert_eq!(value, serde_json::json!({"email": "ada@corp.example"}));
    }

    #[test]
    fn test_update_diff_role_and_password() {
        let update = UserUpdate::diff(&record(), "Ada", "ada@example.com", "s3cret", Role::Admin);
        let value = serde_json::to_value(&update).unwrap();
        assert_eq!(value, serde_json::json!({"mot_de_passe": "s3cret", "role": "Admin"}));

        let unchanged = UserUpdate::diff(&record(), "Ada", "ada@example.com", "", Role::Technician);
        assert!(unchanged.is_empty());
    }

    #[test]
    fn test_scope_paths() {
        assert_eq!(UserScope::All.path(), "/users");
        assert_eq!(UserScope::Only(Role::Technician).path(), "/users/technicians");
        assert_eq!(UserScope::Only(Role::Employee).path(), "/users/employees");
        assert_eq!(UserScope::Only(Role::Admin).path(), "/users/admins");
    }

    #[test]
    fn test_credentials_debug_redacts_password() {
        let creds = Credentials {
            email: "a@b.c".to_string(),
            password: "hunter2".to_string(),
        };
        assert!(!format!("{:?}", creds).contains("hunter2"));
    }
}
