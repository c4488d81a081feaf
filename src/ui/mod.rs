//! Server-rendered dashboard.
//!
//! Every page handler runs the same sequence: load the browser's session,
//! move it to the requested page, let [`resolve`] decide what may be shown,
//! call the gateway, render, then save the session back. Form posts follow
//! post/redirect/get and carry their outcome to the next page as a notice.

mod admin;
mod auth;
mod templates;
mod tickets;

use askama::Template;
use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
    Router,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use std::str::FromStr;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::access::{resolve, PageKey, Resolution};
use crate::config::SessionConfig;
use crate::error::{ApiFailure, DeskError, Notice};
use crate::models::UserRef;
use crate::session::Session;
use crate::AppState;

pub use templates::*;

const LOGIN_PATH: &str = "/login";

/// Either the page to send, or the redirect sent in its place
type Outcome = Result<Response, Response>;

// Helper to render templates and handle errors
fn render_template<T: Template>(template: T) -> Response {
    match template.render() {
        Ok(html) => Html(html).into_response(),
        Err(e) => (StatusCode::INTERNAL_SERVER_ERROR, format!("Template error: {}", e)).into_response(),
    }
}

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(auth::home))
        .route("/login", get(auth::login_page))
        .route("/login", post(auth::login_submit))
        .route("/logout", post(auth::logout))
        // Tickets
        .route("/tickets", get(tickets::my_tickets))
        .route("/tickets/new", get(tickets::new_ticket_form))
        .route("/tickets/new", post(tickets::create_ticket))
        .route("/tickets/:id", get(tickets::ticket_detail))
        .route("/tickets/:id/comments", post(tickets::add_comment))
        .route("/tickets/:id/update", post(tickets::update_ticket))
        .route("/tickets/:id/delete", post(tickets::delete_ticket))
        .route("/queue", get(tickets::queue))
        // Administration
        .route("/admin", get(admin::dashboard))
        .route("/admin/users", get(admin::users))
        .route("/admin/users", post(admin::create_user))
        .route("/admin/users/:id", get(admin::user_detail))
        .route("/admin/users/:id/update", post(admin::update_user))
        .route("/admin/users/:id/delete", post(admin::delete_user))
        .route("/health", get(health_check))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health_check() -> &'static str {
    "OK"
}

/// URL showing `page`; detail pages use the session's selection
fn page_path(page: PageKey, session: &Session) -> String {
    match page {
        PageKey::Login => LOGIN_PATH.to_string(),
        PageKey::EmployeeTickets => "/tickets".to_string(),
        PageKey::NewTicket => "/tickets/new".to_string(),
        PageKey::TicketDetails => session
            .selected_ticket_id()
            .map(|id| format!("/tickets/{}", id))
            .unwrap_or_else(|| "/tickets".to_string()),
        PageKey::TechTickets => "/queue".to_string(),
        PageKey::AdminDashboard => "/admin".to_string(),
        PageKey::AdminUsers => "/admin/users".to_string(),
        PageKey::UserDetails => session
            .selected_user_id()
            .map(|id| format!("/admin/users/{}", id))
            .unwrap_or_else(|| "/admin/users".to_string()),
    }
}

/// Parse an optional form or query value; blank and unknown values are `None`
fn parse_choice<T: FromStr>(raw: Option<&str>) -> Option<T> {
    raw.map(str::trim)
        .filter(|s| !s.is_empty())
        .and_then(|s| s.parse().ok())
}

/// One request's view of the browser session
struct Visit {
    /// `None` until the session is first stored
    id: Option<String>,
    session: Session,
    jar: CookieJar,
}

impl Visit {
    /// Load the session named by the cookie, or start a blank one
    fn open(state: &AppState, jar: CookieJar) -> Self {
        let id = jar
            .get(&state.config.session.cookie_name)
            .map(|cookie| cookie.value().to_string());
        if let Some(id) = id {
            if let Some(session) = state.sessions.load(&id) {
                return Self {
                    id: Some(id),
                    session,
                    jar,
                };
            }
        }

        Self {
            id: None,
            session: Session::new(),
            jar,
        }
    }

    /// Drop the stored session so the next save issues a new id.
    ///
    /// Called when the signed-in identity changes; requests still holding
    /// the old id can no longer write to it.
    fn renew(&mut self, state: &AppState) {
        if let Some(id) = self.id.take() {
            state.sessions.remove(&id);
        }
    }

    /// Move to `page` and check access.
    ///
    /// `Err` holds the redirect to send instead, with the reason queued as a
    /// notice.
    fn enter(
        &mut self,
        page: PageKey,
        selection: Option<i64>,
    ) -> Result<(UserRef, Resolution), Response> {
        if !self.session.is_authenticated() {
            return Err(Redirect::to(LOGIN_PATH).into_response());
        }
        if let Err(err) = self.session.navigate(page, selection) {
            self.session.flash(err.notice());
        }

        let resolution = resolve(&self.session);
        if resolution.page != page {
            if let Some(notice) = resolution.notice() {
                self.session.flash(notice);
            }
            return Err(self.redirect_to(resolution.page));
        }

        match self.session.user().cloned() {
            Some(user) => Ok((user, resolution)),
            None => Err(Redirect::to(LOGIN_PATH).into_response()),
        }
    }

    fn redirect_to(&self, page: PageKey) -> Response {
        Redirect::to(&page_path(page, &self.session)).into_response()
    }

    /// Navigate to a page that needs no selection and redirect there
    fn go(&mut self, page: PageKey) -> Response {
        let _ = self.session.navigate(page, None);
        self.redirect_to(page)
    }

    /// Return to the list page the user came from
    fn back_to_list(&mut self) -> Response {
        let page = self.session.return_page();
        self.go(page)
    }

    fn flash(&mut self, notice: Notice) {
        self.session.flash(notice);
    }

    /// Log a gateway failure and queue it for the user
    fn report(&mut self, action: &'static str, failure: ApiFailure) {
        tracing::warn!(
            action,
            status = ?failure.status_code,
            error = %failure,
            "Ticket API call failed"
        );
        self.flash(DeskError::Api(failure).notice());
    }

    /// A detail record could not be loaded: go back to the list
    fn missing(&mut self, what: String, failure: ApiFailure) -> Response {
        if failure.is_not_found() {
            self.flash(Notice::warning(format!("{} not found.", what)));
        } else {
            self.report("load record", failure);
        }
        self.back_to_list()
    }

    fn chrome(&mut self, user: &UserRef, page: PageKey) -> Chrome {
        Chrome::for_user(user, page, self.session.take_notice())
    }

    /// Save the session and attach the cookie jar
    fn finish(self, state: &AppState, outcome: Outcome) -> Response {
        let response = match outcome {
            Ok(response) | Err(response) => response,
        };

        let mut jar = self.jar;
        match self.id {
            Some(id) => {
                state.sessions.save(&id, self.session);
            }
            None if !self.session.is_blank() => {
                let id = state.sessions.insert(self.session);
                jar = jar.add(session_cookie(&state.config.session, id));
            }
            None => {}
        }
        (jar, response).into_response()
    }
}

fn session_cookie(config: &SessionConfig, id: String) -> Cookie<'static> {
    Cookie::build((config.cookie_name.clone(), id))
        .path("/")
        .http_only(true)
        .secure(config.secure_cookie)
        .same_site(SameSite::Lax)
        .build()
}
