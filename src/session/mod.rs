//! Per-browser session state: who is signed in and which page they are on.
//!
//! A [`Session`] is plain data owned by one browser; handlers load it from the
//! [`SessionStore`], mutate it through the methods below and save it back.
//! The methods keep two invariants: a detail page is only current while its
//! selection is set, and an unauthenticated session carries no user, page or
//! selection.

mod store;

pub use store::{spawn_purge_task, SessionStore};

use chrono::{DateTime, Utc};

use crate::access::PageKey;
use crate::error::{DeskError, Notice};
use crate::gateway::TicketGateway;
use crate::models::{Credentials, TicketId, UserId, UserRef};

#[derive(Debug, Clone)]
pub struct Session {
    authenticated: bool,
    user: Option<UserRef>,
    current_page: Option<PageKey>,
    selected_ticket_id: Option<TicketId>,
    selected_user_id: Option<UserId>,
    last_list_page: Option<PageKey>,
    notice: Option<Notice>,
    last_seen: DateTime<Utc>,
    // Store revision this copy was loaded at
    revision: u64,
    // Bumped whenever the signed-in identity changes
    generation: u64,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    /// A fresh, unauthenticated session
    pub fn new() -> Self {
        Self {
            authenticated: false,
            user: None,
            current_page: None,
            selected_ticket_id: None,
            selected_user_id: None,
            last_list_page: None,
            notice: None,
            last_seen: Utc::now(),
            revision: 0,
            generation: 0,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.authenticated
    }

    /// Nothing worth storing: signed out with no pending notice
    pub fn is_blank(&self) -> bool {
        !self.authenticated && self.notice.is_none()
    }

    pub fn user(&self) -> Option<&UserRef> {
        self.user.as_ref()
    }

    pub fn current_page(&self) -> Option<PageKey> {
        self.current_page
    }

    pub fn selected_ticket_id(&self) -> Option<TicketId> {
        self.selected_ticket_id
    }

    pub fn selected_user_id(&self) -> Option<UserId> {
        self.selected_user_id
    }

    pub fn last_seen(&self) -> DateTime<Utc> {
        self.last_seen
    }

    pub(crate) fn touch(&mut self) {
        self.last_seen = Utc::now();
    }

    /// Verify credentials against the backend and sign in.
    ///
    /// On success the session lands on the role's default page. On failure
    /// the session is left exactly as it was.
    pub async fn login(
        &mut self,
        gateway: &dyn TicketGateway,
        credentials: &Credentials,
    ) -> Result<UserRef, DeskError> {
        if credentials.email.trim().is_empty() || credentials.password.is_empty() {
            return Err(DeskError::Validation("Please fill in all fields.".to_string()));
        }

        match gateway.verify_credentials(credentials).await {
            Ok(user) => {
                tracing::info!(user_id = user.id, role = %user.role, "User signed in");
                self.sign_in(user.clone());
                Ok(user)
            }
            Err(failure) if failure.is_unauthorized() => {
                tracing::info!(email = %credentials.email, "Rejected sign-in attempt");
                Err(DeskError::AuthFailure)
            }
            Err(failure) => {
                tracing::warn!(error = %failure, "Credential check failed");
                Err(DeskError::Api(failure))
            }
        }
    }

    /// Install a verified user and move to the role's landing page
    pub fn sign_in(&mut self, user: UserRef) {
        self.authenticated = true;
        self.current_page = Some(PageKey::landing_for(user.role));
        self.selected_ticket_id = None;
        self.selected_user_id = None;
        self.last_list_page = None;
        self.user = Some(user);
        self.generation += 1;
    }

    /// Sign out and reset to the unauthenticated state. Idempotent.
    pub fn logout(&mut self) {
        if let Some(user) = &self.user {
            tracing::info!(user_id = user.id, "User signed out");
        }
        self.authenticated = false;
        self.user = None;
        self.current_page = None;
        self.selected_ticket_id = None;
        self.selected_user_id = None;
        self.last_list_page = None;
        self.notice = None;
        self.generation += 1;
    }

    /// Replace the signed-in user after the account was updated server-side
    pub fn replace_user(&mut self, user: UserRef) {
        if self.user.as_ref().map(|u| u.id) == Some(user.id) {
            self.user = Some(user);
            self.generation += 1;
        }
    }

    /// Move to `page`.
    ///
    /// Detail pages take `selection` as the ticket or user id, falling back
    /// to the one already selected. Without either the call fails with
    /// `InvalidNavigation` and nothing changes. Access control is not checked
    /// here; see [`crate::access::resolve`].
    pub fn navigate(&mut self, page: PageKey, selection: Option<i64>) -> Result<(), DeskError> {
        match page {
            PageKey::TicketDetails => {
                let id = selection
                    .or(self.selected_ticket_id)
                    .ok_or(DeskError::InvalidNavigation(page))?;
                self.selected_ticket_id = Some(id);
            }
            PageKey::UserDetails => {
                let id = selection
                    .or(self.selected_user_id)
                    .ok_or(DeskError::InvalidNavigation(page))?;
                self.selected_user_id = Some(id);
            }
            _ => {}
        }

        if page.is_list() {
            self.last_list_page = Some(page);
        }
        self.current_page = Some(page);
        Ok(())
    }

    /// The list page a detail view returns to: the last list visited, or the
    /// role's landing page.
    pub fn return_page(&self) -> PageKey {
        let role = match &self.user {
            Some(user) => user.role,
            None => return PageKey::Login,
        };
        self.last_list_page
            .filter(|page| page.is_allowed_for(role))
            .unwrap_or_else(|| PageKey::landing_for(role))
    }

    /// Queue a notice for the next rendered page
    pub fn flash(&mut self, notice: Notice) {
        self.notice = Some(notice);
    }

    /// Take the queued notice, if any
    pub fn take_notice(&mut self) -> Option<Notice> {
        self.notice.take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::memory::MemoryGateway;
    use crate::models::Role;

    fn user(role: Role) -> UserRef {
        UserRef {
            id: 1,
            name: "Test".to_string(),
            email: "test@example.com".to_string(),
            role,
        }
    }

    fn creds(email: &str, password: &str) -> Credentials {
        Credentials {
            email: email.to_string(),
            password: password.to_string(),
        }
    }

    fn assert_detail_invariants(session: &Session) {
        if session.current_page() == Some(PageKey::TicketDetails) {
            assert!(session.selected_ticket_id().is_some());
        }
        if session.current_page() == Some(PageKey::UserDetails) {
            assert!(session.selected_user_id().is_some());
        }
    }

    #[test]
    fn test_login_lands_on_role_page() {
        let gateway = MemoryGateway::seeded();

        let mut session = Session::new();
        let user = tokio_test::block_on(session.login(&gateway, &creds("tech@example.com", "tech")))
            .unwrap();
        assert_eq!(user.role, Role::Technician);
        assert!(session.is_authenticated());
        assert_eq!(session.current_page(), Some(PageKey::TechTickets));

        let mut session = Session::new();
        tokio_test::block_on(session.login(&gateway, &creds("emp@example.com", "emp"))).unwrap();
        assert_eq!(session.current_page(), Some(PageKey::EmployeeTickets));

        let mut session = Session::new();
        tokio_test::block_on(session.login(&gateway, &creds("admin@example.com", "admin")))
            .unwrap();
        assert_eq!(session.current_page(), Some(PageKey::AdminDashboard));
    }

    #[test]
    fn test_failed_login_leaves_session_unchanged() {
        let gateway = MemoryGateway::seeded();
        let mut session = Session::new();

        let err = tokio_test::block_on(session.login(&gateway, &creds("emp@example.com", "nope")))
            .unwrap_err();
        assert_eq!(err, DeskError::AuthFailure);
        assert!(!session.is_authenticated());
        assert!(session.user().is_none());
        assert!(session.current_page().is_none());

        let err = tokio_test::block_on(session.login(&gateway, &creds("", ""))).unwrap_err();
        assert!(matches!(err, DeskError::Validation(_)));
        assert!(!session.is_authenticated());
    }

    #[test]
    fn test_login_surfaces_backend_failure() {
        let gateway = MemoryGateway::seeded();
        gateway.fail_next(500, "database down");
        let mut session = Session::new();

        let err = tokio_test::block_on(session.login(&gateway, &creds("emp@example.com", "emp")))
            .unwrap_err();
        assert!(matches!(err, DeskError::Api(ref f) if f.status_code == Some(500)));
        assert!(!session.is_authenticated());
    }

    #[test]
    fn test_logout_is_idempotent() {
        let mut session = Session::new();
        session.sign_in(user(Role::Admin));
        session.navigate(PageKey::UserDetails, Some(4)).unwrap();
        session.flash(Notice::info("hello"));

        session.logout();
        let once = format!("{:?}", (session.is_authenticated(), session.user(), session.current_page(), session.selected_ticket_id(), session.selected_user_id()));
        session.logout();
        let twice = format!("{:?}", (session.is_authenticated(), session.user(), session.current_page(), session.selected_ticket_id(), session.selected_user_id()));

        assert_eq!(once, twice);
        assert!(!session.is_authenticated());
        assert!(session.current_page().is_none());
        assert!(session.selected_user_id().is_none());
        assert!(session.take_notice().is_none());
    }

    #[test]
    fn test_detail_navigation_requires_selection() {
        let mut session = Session::new();
        session.sign_in(user(Role::Technician));

        let err = session.navigate(PageKey::TicketDetails, None).unwrap_err();
        assert_eq!(err, DeskError::InvalidNavigation(PageKey::TicketDetails));
        assert_eq!(session.current_page(), Some(PageKey::TechTickets));

        session.navigate(PageKey::TicketDetails, Some(12)).unwrap();
        assert_eq!(session.selected_ticket_id(), Some(12));

        // The previous selection is reused
        session.navigate(PageKey::TechTickets, None).unwrap();
        session.navigate(PageKey::TicketDetails, None).unwrap();
        assert_eq!(session.selected_ticket_id(), Some(12));

        assert!(session.navigate(PageKey::UserDetails, None).is_err());
        assert_detail_invariants(&session);
    }

    #[test]
    fn test_invariants_hold_after_every_navigation() {
        let mut session = Session::new();
        session.sign_in(user(Role::Admin));

        for page in PageKey::ALL {
            for selection in [None, Some(3)] {
                let _ = session.navigate(page, selection);
                assert_detail_invariants(&session);
            }
        }
    }

    #[test]
    fn test_return_page_tracks_last_list() {
        let mut session = Session::new();
        assert_eq!(session.return_page(), PageKey::Login);

        session.sign_in(user(Role::Admin));
        assert_eq!(session.return_page(), PageKey::AdminDashboard);

        session.navigate(PageKey::TechTickets, None).unwrap();
        session.navigate(PageKey::TicketDetails, Some(8)).unwrap();
        assert_eq!(session.return_page(), PageKey::TechTickets);
    }

    #[test]
    fn test_replace_user_only_for_same_account() {
        let mut session = Session::new();
        session.sign_in(user(Role::Admin));

        let mut other = user(Role::Employee);
        other.id = 99;
        session.replace_user(other);
        assert_eq!(session.user().unwrap().role, Role::Admin);

        let mut renamed = user(Role::Admin);
        renamed.name = "Renamed".to_string();
        session.replace_user(renamed);
        assert_eq!(session.user().unwrap().name, "Renamed");
    }
}
