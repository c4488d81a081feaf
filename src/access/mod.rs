//! Page keys and the single access-control check in front of every page.

use serde::{Deserialize, Serialize};

use crate::error::{DeskError, Notice};
use crate::models::Role;
use crate::session::Session;

/// Identifier of a dashboard view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PageKey {
    Login,
    EmployeeTickets,
    NewTicket,
    TicketDetails,
    TechTickets,
    AdminDashboard,
    AdminUsers,
    UserDetails,
}

impl PageKey {
    pub const ALL: [PageKey; 8] = [
        PageKey::Login,
        PageKey::EmployeeTickets,
        PageKey::NewTicket,
        PageKey::TicketDetails,
        PageKey::TechTickets,
        PageKey::AdminDashboard,
        PageKey::AdminUsers,
        PageKey::UserDetails,
    ];

    /// Minimum role needed to open the page; `None` for public pages
    pub fn required_role(&self) -> Option<Role> {
        match self {
            PageKey::Login => None,
            PageKey::EmployeeTickets | PageKey::NewTicket | PageKey::TicketDetails => {
                Some(Role::Employee)
            }
            PageKey::TechTickets => Some(Role::Technician),
            PageKey::AdminDashboard | PageKey::AdminUsers | PageKey::UserDetails => {
                Some(Role::Admin)
            }
        }
    }

    pub fn is_allowed_for(&self, role: Role) -> bool {
        self.required_role()
            .map_or(true, |required| role.has_at_least(required))
    }

    /// Default page after sign-in
    pub fn landing_for(role: Role) -> PageKey {
        match role {
            Role::Employee => PageKey::EmployeeTickets,
            Role::Technician => PageKey::TechTickets,
            Role::Admin => PageKey::AdminDashboard,
        }
    }

    /// Pages a detail view can return to
    pub fn is_list(&self) -> bool {
        matches!(
            self,
            PageKey::EmployeeTickets | PageKey::TechTickets | PageKey::AdminUsers
        )
    }

    pub fn title(&self) -> &'static str {
        match self {
            PageKey::Login => "Sign in",
            PageKey::EmployeeTickets => "My tickets",
            PageKey::NewTicket => "New ticket",
            PageKey::TicketDetails => "Ticket",
            PageKey::TechTickets => "Ticket queue",
            PageKey::AdminDashboard => "Dashboard",
            PageKey::AdminUsers => "Users",
            PageKey::UserDetails => "User",
        }
    }
}

/// Which rendition of the ticket detail page a role gets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TicketView {
    /// Fields and comments only
    ReadOnly,
    /// Status update, self-assignment, deletion for admins
    Manage,
}

impl TicketView {
    pub fn for_role(role: Role) -> Self {
        if role.can_manage_tickets() {
            TicketView::Manage
        } else {
            TicketView::ReadOnly
        }
    }
}

/// Outcome of [`resolve`]
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    /// The page to render
    pub page: PageKey,
    /// Set when `page` is the ticket detail page
    pub ticket_view: Option<TicketView>,
    /// Why the session's page was not honoured, if it was not
    pub error: Option<DeskError>,
}

impl Resolution {
    fn page(page: PageKey, role: Option<Role>) -> Self {
        let ticket_view = match (page, role) {
            (PageKey::TicketDetails, Some(role)) => Some(TicketView::for_role(role)),
            _ => None,
        };
        Self {
            page,
            ticket_view,
            error: None,
        }
    }

    fn redirect(page: PageKey, role: Role, error: DeskError) -> Self {
        Self {
            error: Some(error),
            ..Self::page(page, Some(role))
        }
    }

    /// Notice to show when the requested page was replaced
    pub fn notice(&self) -> Option<Notice> {
        self.error.as_ref().map(DeskError::notice)
    }
}

/// Decide which page a session may see.
///
/// Unauthenticated sessions always get the login page. Authenticated
/// sessions without a page (or still on the login page) get their role's
/// landing page. Otherwise the current page is checked against the role;
/// a denial falls back to the landing page with an `AuthorizationDenied`
/// error for the caller to show.
pub fn resolve(session: &Session) -> Resolution {
    let user = match (session.is_authenticated(), session.user()) {
        (true, Some(user)) => user,
        _ => return Resolution::page(PageKey::Login, None),
    };
    let role = user.role;
    let landing = PageKey::landing_for(role);

    let page = match session.current_page() {
        None | Some(PageKey::Login) => return Resolution::page(landing, Some(role)),
        Some(page) => page,
    };

    if !page.is_allowed_for(role) {
        tracing::warn!(user_id = user.id, %role, page = ?page, "Page access denied");
        return Resolution::redirect(landing, role, DeskError::AuthorizationDenied(page));
    }

    let missing_selection = match page {
        PageKey::TicketDetails => session.selected_ticket_id().is_none(),
        PageKey::UserDetails => session.selected_user_id().is_none(),
        _ => false,
    };
    if missing_selection {
        return Resolution::redirect(landing, role, DeskError::InvalidNavigation(page));
    }

    Resolution::page(page, Some(role))
}
