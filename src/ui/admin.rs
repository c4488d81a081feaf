use axum::{
    extract::{Path, Query, State},
    response::Response,
    Form,
};
use axum_extra::extract::CookieJar;
use serde::Deserialize;
use std::sync::Arc;

use super::{
    parse_choice, render_template, select_options, DashboardTemplate, Outcome, UserDetailTemplate,
    UsersTemplate, Visit,
};
use crate::access::PageKey;
use crate::error::{DeskError, Notice};
use crate::models::{NewUser, Role, UserId, UserRef, UserScope, UserUpdate, WireLabel};
use crate::views::{project_list, StatisticsView, USER_FIELDS};
use crate::AppState;

pub(super) async fn dashboard(State(state): State<Arc<AppState>>, jar: CookieJar) -> Response {
    let mut visit = Visit::open(&state, jar);
    let outcome = show_dashboard(&state, &mut visit).await;
    visit.finish(&state, outcome)
}

async fn show_dashboard(state: &AppState, visit: &mut Visit) -> Outcome {
    let (user, _) = visit.enter(PageKey::AdminDashboard, None)?;

    let stats = match state.gateway.statistics().await {
        Ok(stats) => Some(StatisticsView::from_payload(&stats)),
        Err(failure) => {
            visit.report("load statistics", failure);
            None
        }
    };

    Ok(render_template(DashboardTemplate {
        chrome: visit.chrome(&user, PageKey::AdminDashboard),
        stats,
    }))
}

#[derive(Debug, Deserialize)]
pub(super) struct UserFilter {
    role: Option<String>,
}

pub(super) async fn users(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Query(filter): Query<UserFilter>,
) -> Response {
    let mut visit = Visit::open(&state, jar);
    let outcome = list_users(&state, &mut visit, filter).await;
    visit.finish(&state, outcome)
}

async fn list_users(state: &AppState, visit: &mut Visit, filter: UserFilter) -> Outcome {
    let (user, _) = visit.enter(PageKey::AdminUsers, None)?;

    let role = parse_choice::<Role>(filter.role.as_deref());
    let scope = role.map(UserScope::Only).unwrap_or_default();
    let users = match state.gateway.list_users(scope).await {
        Ok(users) => users,
        Err(failure) => {
            visit.report("list users", failure);
            Vec::new()
        }
    };

    Ok(render_template(UsersTemplate {
        chrome: visit.chrome(&user, PageKey::AdminUsers),
        table: project_list(&users, USER_FIELDS),
        filter_roles: select_options(&Role::ALL, role),
        new_roles: select_options(&Role::ALL, Some(Role::Employee)),
    }))
}

/// Create and edit form; a blank password on edit keeps the current one
#[derive(Debug, Deserialize)]
pub(super) struct UserForm {
    #[serde(default)]
    name: String,
    #[serde(default)]
    email: String,
    #[serde(default)]
    password: String,
    #[serde(default)]
    role: String,
}

impl UserForm {
    fn role(&self) -> Result<Role, DeskError> {
        parse_choice(Some(self.role.as_str()))
            .ok_or_else(|| DeskError::Validation("Please choose a valid role.".to_string()))
    }

    fn validate_new(&self) -> Result<NewUser, DeskError> {
        let name = self.name.trim();
        let email = self.email.trim();
        if name.is_empty() || email.is_empty() || self.password.is_empty() {
            return Err(DeskError::Validation("Please fill in all fields.".to_string()));
        }
        Ok(NewUser {
            name: name.to_string(),
            email: email.to_string(),
            password: self.password.clone(),
            role: self.role()?,
        })
    }
}

pub(super) async fn create_user(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Form(form): Form<UserForm>,
) -> Response {
    let mut visit = Visit::open(&state, jar);
    let outcome = submit_user(&state, &mut visit, form).await;
    visit.finish(&state, outcome)
}

async fn submit_user(state: &AppState, visit: &mut Visit, form: UserForm) -> Outcome {
    let (admin, _) = visit.enter(PageKey::AdminUsers, None)?;

    let new_user = match form.validate_new() {
        Ok(new_user) => new_user,
        Err(err) => {
            visit.flash(err.notice());
            return Ok(visit.redirect_to(PageKey::AdminUsers));
        }
    };

    match state.gateway.create_user(&new_user).await {
        Ok(id) => {
            tracing::info!(user_id = id, role = %new_user.role, admin_id = admin.id, "User created");
            visit.flash(Notice::success(format!("User #{} created.", id)));
        }
        Err(failure) => visit.report("create user", failure),
    }
    Ok(visit.redirect_to(PageKey::AdminUsers))
}

pub(super) async fn user_detail(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Path(id): Path<UserId>,
) -> Response {
    let mut visit = Visit::open(&state, jar);
    let outcome = show_user(&state, &mut visit, id).await;
    visit.finish(&state, outcome)
}

async fn show_user(state: &AppState, visit: &mut Visit, id: UserId) -> Outcome {
    let (admin, _) = visit.enter(PageKey::UserDetails, Some(id))?;

    let record = state
        .gateway
        .get_user(id)
        .await
        .map_err(|failure| visit.missing(format!("User #{}", id), failure))?;

    Ok(render_template(UserDetailTemplate {
        chrome: visit.chrome(&admin, PageKey::UserDetails),
        role_label: record.role.label(),
        roles: select_options(&Role::ALL, Some(record.role)),
        is_self: record.id == admin.id,
        user: record,
    }))
}

pub(super) async fn update_user(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Path(id): Path<UserId>,
    Form(form): Form<UserForm>,
) -> Response {
    let mut visit = Visit::open(&state, jar);
    let outcome = apply_user_update(&state, &mut visit, id, form).await;
    visit.finish(&state, outcome)
}

async fn apply_user_update(
    state: &AppState,
    visit: &mut Visit,
    id: UserId,
    form: UserForm,
) -> Outcome {
    let (admin, _) = visit.enter(PageKey::UserDetails, Some(id))?;

    let role = match form.role() {
        Ok(role) => role,
        Err(err) => {
            visit.flash(err.notice());
            return Ok(visit.redirect_to(PageKey::UserDetails));
        }
    };

    let current = state
        .gateway
        .get_user(id)
        .await
        .map_err(|failure| visit.missing(format!("User #{}", id), failure))?;

    let update = UserUpdate::diff(&current, &form.name, &form.email, &form.password, role);
    if update.is_empty() {
        visit.flash(Notice::info("No changes to save."));
        return Ok(visit.redirect_to(PageKey::UserDetails));
    }

    match state.gateway.update_user(id, &update).await {
        Ok(echoed) => {
            tracing::info!(user_id = id, admin_id = admin.id, "User updated");
            if id == admin.id {
                // The backend may only acknowledge; rebuild from what was sent
                let refreshed = echoed.map(UserRef::from).unwrap_or_else(|| UserRef {
                    id,
                    name: update.name.clone().unwrap_or(current.name),
                    email: update.email.clone().unwrap_or(current.email),
                    role: update.role.unwrap_or(current.role),
                });
                visit.session.replace_user(refreshed);
            }
            visit.flash(Notice::success("User updated."));
        }
        Err(failure) if failure.is_not_found() => {
            return Err(visit.missing(format!("User #{}", id), failure))
        }
        Err(failure) => visit.report("update user", failure),
    }
    Ok(visit.redirect_to(PageKey::UserDetails))
}

#[derive(Debug, Deserialize)]
pub(super) struct DeleteForm {
    confirm: Option<String>,
}

pub(super) async fn delete_user(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Path(id): Path<UserId>,
    Form(form): Form<DeleteForm>,
) -> Response {
    let mut visit = Visit::open(&state, jar);
    let outcome = remove_user(&state, &mut visit, id, form).await;
    visit.finish(&state, outcome)
}

async fn remove_user(state: &AppState, visit: &mut Visit, id: UserId, form: DeleteForm) -> Outcome {
    let (admin, _) = visit.enter(PageKey::UserDetails, Some(id))?;

    if id == admin.id {
        visit.flash(
            DeskError::Validation("You cannot delete your own account.".to_string()).notice(),
        );
        return Ok(visit.redirect_to(PageKey::UserDetails));
    }
    if form.confirm.is_none() {
        visit.flash(Notice::warning("Please confirm the deletion."));
        return Ok(visit.redirect_to(PageKey::UserDetails));
    }

    match state.gateway.delete_user(id).await {
        Ok(()) => {
            tracing::info!(user_id = id, admin_id = admin.id, "User deleted");
            visit.flash(Notice::success(format!("User #{} deleted.", id)));
            Ok(visit.go(PageKey::AdminUsers))
        }
        Err(failure) if failure.is_not_found() => {
            Err(visit.missing(format!("User #{}", id), failure))
        }
        Err(failure) => {
            visit.report("delete user", failure);
            Ok(visit.redirect_to(PageKey::UserDetails))
        }
    }
}
