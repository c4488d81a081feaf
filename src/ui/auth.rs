use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    Form,
};
use axum_extra::extract::CookieJar;
use serde::Deserialize;
use std::sync::Arc;

use super::{render_template, Chrome, LoginTemplate, Visit, LOGIN_PATH};
use crate::access::{resolve, PageKey};
use crate::error::{DeskError, Notice};
use crate::models::Credentials;
use crate::AppState;

// Root: send the user wherever their session says they are
pub(super) async fn home(State(state): State<Arc<AppState>>, jar: CookieJar) -> Response {
    let mut visit = Visit::open(&state, jar);
    let response = if visit.session.is_authenticated() {
        let resolution = resolve(&visit.session);
        if let Some(notice) = resolution.notice() {
            visit.flash(notice);
        }
        visit.redirect_to(resolution.page)
    } else {
        Redirect::to(LOGIN_PATH).into_response()
    };
    visit.finish(&state, Ok(response))
}

pub(super) async fn login_page(State(state): State<Arc<AppState>>, jar: CookieJar) -> Response {
    let mut visit = Visit::open(&state, jar);
    let response = if visit.session.is_authenticated() {
        let page = resolve(&visit.session).page;
        visit.redirect_to(page)
    } else {
        render_template(LoginTemplate {
            chrome: Chrome::anonymous(visit.session.take_notice()),
            email: String::new(),
        })
    };
    visit.finish(&state, Ok(response))
}

#[derive(Deserialize)]
pub(super) struct LoginForm {
    #[serde(default)]
    email: String,
    #[serde(default)]
    password: String,
}

pub(super) async fn login_submit(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Form(form): Form<LoginForm>,
) -> Response {
    let mut visit = Visit::open(&state, jar);
    let credentials = Credentials {
        email: form.email.trim().to_string(),
        password: form.password,
    };

    let response = match visit
        .session
        .login(state.gateway.as_ref(), &credentials)
        .await
    {
        Ok(user) => {
            visit.renew(&state);
            visit.redirect_to(PageKey::landing_for(user.role))
        }
        Err(err) => {
            let status = if err == DeskError::AuthFailure {
                StatusCode::UNAUTHORIZED
            } else {
                StatusCode::OK
            };
            let page = render_template(LoginTemplate {
                chrome: Chrome::anonymous(Some(err.notice())),
                email: credentials.email,
            });
            (status, page).into_response()
        }
    };
    visit.finish(&state, Ok(response))
}

pub(super) async fn logout(State(state): State<Arc<AppState>>, jar: CookieJar) -> Response {
    let mut visit = Visit::open(&state, jar);
    visit.session.logout();
    visit.renew(&state);
    visit.flash(Notice::info("You have been signed out."));
    visit.finish(&state, Ok(Redirect::to(LOGIN_PATH).into_response()))
}
