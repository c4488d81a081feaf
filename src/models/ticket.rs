//! Ticket and comment models.

use serde::{Deserialize, Serialize};

use super::common::{as_wire, as_wire_opt, normalize_label, TicketId, UserId, WireLabel};

/// Ticket lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Status {
    Open,
    InProgress,
    Resolved,
    Closed,
}

impl Status {
    pub const ALL: [Status; 4] = [
        Status::Open,
        Status::InProgress,
        Status::Resolved,
        Status::Closed,
    ];
}

impl WireLabel for Status {
    fn label(&self) -> &'static str {
        match self {
            Status::Open => "Open",
            Status::InProgress => "In progress",
            Status::Resolved => "Resolved",
            Status::Closed => "Closed",
        }
    }

    fn wire_label(&self) -> &'static str {
        match self {
            Status::Open => "Ouvert",
            Status::InProgress => "En cours",
            Status::Resolved => "Résolu",
            Status::Closed => "Fermé",
        }
    }
}

impl std::str::FromStr for Status {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize_label(s).as_str() {
            "open" | "ouvert" => Ok(Status::Open),
            "in progress" | "inprogress" | "en cours" => Ok(Status::InProgress),
            "resolved" | "resolu" => Ok(Status::Resolved),
            "closed" | "ferme" => Ok(Status::Closed),
            _ => Err(format!("Unknown ticket status: {}", s)),
        }
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl TryFrom<String> for Status {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<Status> for String {
    fn from(status: Status) -> Self {
        status.label().to_string()
    }
}

/// Ticket priority
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Priority {
    Low,
    Medium,
    High,
    Critical,
}

impl Priority {
    pub const ALL: [Priority; 4] = [
        Priority::Low,
        Priority::Medium,
        Priority::High,
        Priority::Critical,
    ];
}

impl WireLabel for Priority {
    fn label(&self) -> &'static str {
        match self {
            Priority::Low => "Low",
            Priority::Medium => "Medium",
            Priority::High => "High",
            Priority::Critical => "Critical",
        }
    }

    fn wire_label(&self) -> &'static str {
        match self {
            Priority::Low => "Faible",
            Priority::Medium => "Moyenne",
            Priority::High => "Élevée",
            Priority::Critical => "Critique",
        }
    }
}

impl std::str::FromStr for Priority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize_label(s).as_str() {
            "low" | "faible" | "basse" => Ok(Priority::Low),
            "medium" | "moyenne" | "normale" => Ok(Priority::Medium),
            "high" | "elevee" | "haute" => Ok(Priority::High),
            "critical" | "critique" => Ok(Priority::Critical),
            _ => Err(format!("Unknown ticket priority: {}", s)),
        }
    }
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl TryFrom<String> for Priority {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<Priority> for String {
    fn from(priority: Priority) -> Self {
        priority.label().to_string()
    }
}

/// A support ticket as returned by the backend.
///
/// Optional fields are skipped when serializing so that list projections
/// can tell an absent attribute from an empty one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ticket {
    pub id: TicketId,
    #[serde(alias = "titre")]
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(alias = "statut")]
    pub status: Status,
    #[serde(alias = "priorite", alias = "priorité")]
    pub priority: Priority,
    #[serde(default, alias = "id_employe", skip_serializing_if = "Option::is_none")]
    pub employee_id: Option<UserId>,
    #[serde(default, alias = "id_technicien", skip_serializing_if = "Option::is_none")]
    pub technician_id: Option<UserId>,
    #[serde(default, alias = "employe_nom", skip_serializing_if = "Option::is_none")]
    pub employee_name: Option<String>,
    #[serde(default, alias = "technicien_nom", skip_serializing_if = "Option::is_none")]
    pub technician_name: Option<String>,
    #[serde(default, alias = "date_creation", skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, alias = "date_mise_a_jour", skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

impl Ticket {
    pub fn is_unassigned(&self) -> bool {
        self.technician_id.is_none()
    }

    /// Who the ticket is assigned to, for display
    pub fn assignee(&self) -> String {
        match (&self.technician_name, self.technician_id) {
            (Some(name), _) => name.clone(),
            (None, Some(id)) => format!("Technician #{}", id),
            (None, None) => "Unassigned".to_string(),
        }
    }

    /// Who filed the ticket, for display
    pub fn reporter(&self) -> String {
        match (&self.employee_name, self.employee_id) {
            (Some(name), _) => name.clone(),
            (None, Some(id)) => format!("User #{}", id),
            (None, None) => "-".to_string(),
        }
    }
}

/// A comment on a ticket
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    pub id: i64,
    #[serde(default, alias = "id_ticket", skip_serializing_if = "Option::is_none")]
    pub ticket_id: Option<TicketId>,
    #[serde(default, alias = "id_utilisateur", skip_serializing_if = "Option::is_none")]
    pub author_id: Option<UserId>,
    #[serde(default, alias = "nom_utilisateur", skip_serializing_if = "Option::is_none")]
    pub author_name: Option<String>,
    #[serde(default, alias = "role_utilisateur", skip_serializing_if = "Option::is_none")]
    pub author_role: Option<String>,
    #[serde(alias = "contenu")]
    pub content: String,
    #[serde(default, alias = "date_creation", skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

impl Comment {
    pub fn author(&self) -> String {
        match (&self.author_name, self.author_id) {
            (Some(name), _) => name.clone(),
            (None, Some(id)) => format!("User #{}", id),
            (None, None) => "Unknown".to_string(),
        }
    }
}

/// Body of `POST /tickets`
#[derive(Debug, Clone, Serialize)]
pub struct NewTicket {
    #[serde(rename = "titre")]
    pub title: String,
    pub description: String,
    #[serde(rename = "priorite", serialize_with = "as_wire")]
    pub priority: Priority,
    #[serde(rename = "statut", serialize_with = "as_wire")]
    pub status: Status,
    #[serde(rename = "id_employe")]
    pub employee_id: UserId,
}

/// Body of `PUT /tickets/{id}`; only the set fields are sent
#[derive(Debug, Clone, Default, Serialize)]
pub struct TicketUpdate {
    #[serde(rename = "statut", serialize_with = "as_wire_opt", skip_serializing_if = "Option::is_none")]
    pub status: Option<Status>,
    #[serde(rename = "priorite", serialize_with = "as_wire_opt", skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
    #[serde(rename = "id_technicien", skip_serializing_if = "Option::is_none")]
    pub technician_id: Option<UserId>,
}

impl TicketUpdate {
    pub fn is_empty(&self) -> bool {
        self.status.is_none() && self.priority.is_none() && self.technician_id.is_none()
    }
}

/// Body of `POST /tickets/{id}/comments`
#[derive(Debug, Clone, Serialize)]
pub struct NewComment {
    #[serde(rename = "contenu")]
    pub content: String,
    #[serde(rename = "id_ticket")]
    pub ticket_id: TicketId,
    #[serde(rename = "id_utilisateur")]
    pub author_id: UserId,
}

/// Query string of `GET /tickets`
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketQuery {
    #[serde(serialize_with = "as_wire_opt", skip_serializing_if = "Option::is_none")]
    pub status: Option<Status>,
    #[serde(serialize_with = "as_wire_opt", skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub employee_id: Option<UserId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub technician_id: Option<UserId>,
}
