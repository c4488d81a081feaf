// Askama template definitions

use askama::Template;

use crate::access::PageKey;
use crate::error::Notice;
use crate::models::{Comment, Role, Ticket, UserRecord, UserRef, WireLabel};
use crate::views::{StatisticsView, Table};

/// Sidebar entry
pub struct NavLink {
    pub href: &'static str,
    pub label: &'static str,
    pub active: bool,
}

/// Pages reachable from the sidebar, in display order
const NAV_PAGES: [(PageKey, &str); 5] = [
    (PageKey::EmployeeTickets, "/tickets"),
    (PageKey::NewTicket, "/tickets/new"),
    (PageKey::TechTickets, "/queue"),
    (PageKey::AdminDashboard, "/admin"),
    (PageKey::AdminUsers, "/admin/users"),
];

/// Frame shared by every page: title, signed-in user, sidebar and notice
pub struct Chrome {
    pub title: &'static str,
    pub user_name: String,
    pub role_label: &'static str,
    pub nav: Vec<NavLink>,
    pub notice: Option<Notice>,
    pub version: &'static str,
}

impl Chrome {
    pub fn anonymous(notice: Option<Notice>) -> Self {
        Self {
            title: PageKey::Login.title(),
            user_name: String::new(),
            role_label: "",
            nav: Vec::new(),
            notice,
            version: env!("CARGO_PKG_VERSION"),
        }
    }

    /// Sidebar only lists the pages `user` can open
    pub fn for_user(user: &UserRef, page: PageKey, notice: Option<Notice>) -> Self {
        let nav = NAV_PAGES
            .iter()
            .filter(|(key, _)| key.is_allowed_for(user.role))
            .map(|(key, href)| NavLink {
                href: *href,
                label: key.title(),
                active: *key == page,
            })
            .collect();
        Self {
            title: page.title(),
            user_name: user.name.clone(),
            role_label: user.role.label(),
            nav,
            notice,
            version: env!("CARGO_PKG_VERSION"),
        }
    }

    pub fn is_signed_in(&self) -> bool {
        !self.user_name.is_empty()
    }
}

pub struct SelectOption {
    pub value: &'static str,
    pub label: &'static str,
    pub selected: bool,
}

pub fn select_options<T: WireLabel + Copy + PartialEq>(
    all: &[T],
    selected: Option<T>,
) -> Vec<SelectOption> {
    all.iter()
        .map(|item| SelectOption {
            value: item.label(),
            label: item.label(),
            selected: Some(*item) == selected,
        })
        .collect()
}

/// Ticket fields flattened to display strings
pub struct TicketCard {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub status: &'static str,
    pub priority: &'static str,
    pub reporter: String,
    pub assignee: String,
    pub created_at: String,
    pub updated_at: String,
}

impl From<&Ticket> for TicketCard {
    fn from(ticket: &Ticket) -> Self {
        Self {
            id: ticket.id,
            title: ticket.title.clone(),
            description: ticket.description.clone().unwrap_or_default(),
            status: ticket.status.label(),
            priority: ticket.priority.label(),
            reporter: ticket.reporter(),
            assignee: ticket.assignee(),
            created_at: ticket.created_at.clone().unwrap_or_else(|| "-".to_string()),
            updated_at: ticket.updated_at.clone().unwrap_or_else(|| "-".to_string()),
        }
    }
}

pub struct CommentLine {
    pub author: String,
    pub role: String,
    pub content: String,
    pub created_at: String,
}

impl From<&Comment> for CommentLine {
    fn from(comment: &Comment) -> Self {
        Self {
            author: comment.author(),
            role: comment
                .author_role
                .as_deref()
                .and_then(|r| r.parse::<Role>().ok())
                .map(|r| r.label().to_string())
                .unwrap_or_default(),
            content: comment.content.clone(),
            created_at: comment.created_at.clone().unwrap_or_default(),
        }
    }
}

#[derive(Template)]
#[template(path = "login.html")]
pub struct LoginTemplate {
    pub chrome: Chrome,
    pub email: String,
}

/// Employee list and technician queue
#[derive(Template)]
#[template(path = "tickets.html")]
pub struct TicketListTemplate {
    pub chrome: Chrome,
    pub action: &'static str,
    pub table: Table,
    pub statuses: Vec<SelectOption>,
    pub priorities: Vec<SelectOption>,
    /// Only the queue filters by assignment
    pub assignments: Vec<SelectOption>,
    pub can_create: bool,
}

#[derive(Template)]
#[template(path = "ticket_new.html")]
pub struct TicketNewTemplate {
    pub chrome: Chrome,
    pub title: String,
    pub description: String,
    pub priorities: Vec<SelectOption>,
}

#[derive(Template)]
#[template(path = "ticket_detail.html")]
pub struct TicketDetailTemplate {
    pub chrome: Chrome,
    pub ticket: TicketCard,
    pub comments: Vec<CommentLine>,
    pub manage: bool,
    pub can_assign_self: bool,
    pub can_delete: bool,
    pub statuses: Vec<SelectOption>,
    pub priorities: Vec<SelectOption>,
    pub back_href: String,
}

#[derive(Template)]
#[template(path = "dashboard.html")]
pub struct DashboardTemplate {
    pub chrome: Chrome,
    pub stats: Option<StatisticsView>,
}

#[derive(Template)]
#[template(path = "users.html")]
pub struct UsersTemplate {
    pub chrome: Chrome,
    pub table: Table,
    pub filter_roles: Vec<SelectOption>,
    pub new_roles: Vec<SelectOption>,
}

#[derive(Template)]
#[template(path = "user_detail.html")]
pub struct UserDetailTemplate {
    pub chrome: Chrome,
    pub user: UserRecord,
    pub role_label: &'static str,
    pub roles: Vec<SelectOption>,
    pub is_self: bool,
}
