use axum::{
    extract::{Path, Query, State},
    response::Response,
    Form,
};
use axum_extra::extract::CookieJar;
use serde::Deserialize;
use std::sync::Arc;

use super::{
    parse_choice, render_template, select_options, CommentLine, Outcome, SelectOption,
    TicketCard, TicketDetailTemplate, TicketListTemplate, TicketNewTemplate, Visit,
};
use crate::access::{PageKey, TicketView};
use crate::error::{DeskError, Notice};
use crate::models::{
    NewComment, NewTicket, Priority, Status, TicketId, TicketUpdate, UserId, UserRef,
};
use crate::views::{filter_tickets, project_list, Assignment, TicketCriteria, TICKET_FIELDS};
use crate::AppState;

const ASSIGNMENTS: [(&str, &str); 3] = [
    ("all", "All"),
    ("mine", "Assigned to me"),
    ("unassigned", "Unassigned"),
];

#[derive(Debug, Default, Deserialize)]
pub(super) struct TicketFilter {
    status: Option<String>,
    priority: Option<String>,
    assignment: Option<String>,
}

pub(super) async fn my_tickets(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Query(filter): Query<TicketFilter>,
) -> Response {
    let mut visit = Visit::open(&state, jar);
    let outcome = ticket_list(&state, &mut visit, PageKey::EmployeeTickets, filter).await;
    visit.finish(&state, outcome)
}

pub(super) async fn queue(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Query(filter): Query<TicketFilter>,
) -> Response {
    let mut visit = Visit::open(&state, jar);
    let outcome = ticket_list(&state, &mut visit, PageKey::TechTickets, filter).await;
    visit.finish(&state, outcome)
}

async fn ticket_list(
    state: &AppState,
    visit: &mut Visit,
    page: PageKey,
    filter: TicketFilter,
) -> Outcome {
    let (user, _) = visit.enter(page, None)?;

    let status = parse_choice::<Status>(filter.status.as_deref());
    let priority = parse_choice::<Priority>(filter.priority.as_deref());
    let mut criteria = TicketCriteria {
        status,
        priority,
        ..Default::default()
    };

    let mut assignments = Vec::new();
    if page == PageKey::EmployeeTickets {
        criteria.employee_id = Some(user.id);
    } else {
        let assignment = filter.assignment.as_deref().unwrap_or("all");
        criteria.technician = match assignment {
            "mine" => Some(Assignment::To(user.id)),
            "unassigned" => Some(Assignment::Unassigned),
            _ => None,
        };
        assignments = ASSIGNMENTS
            .iter()
            .map(|(value, label)| SelectOption {
                value: *value,
                label: *label,
                selected: *value == assignment,
            })
            .collect();
    }

    let tickets = match state.gateway.list_tickets(&criteria.to_query()).await {
        Ok(tickets) => filter_tickets(&tickets, &criteria),
        Err(failure) => {
            visit.report("list tickets", failure);
            Vec::new()
        }
    };

    Ok(render_template(TicketListTemplate {
        chrome: visit.chrome(&user, page),
        action: if page == PageKey::EmployeeTickets {
            "/tickets"
        } else {
            "/queue"
        },
        table: project_list(&tickets, TICKET_FIELDS),
        statuses: select_options(&Status::ALL, status),
        priorities: select_options(&Priority::ALL, priority),
        assignments,
        can_create: page == PageKey::EmployeeTickets,
    }))
}

#[derive(Debug, Default, Deserialize)]
pub(super) struct NewTicketForm {
    #[serde(default)]
    title: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    priority: String,
}

impl NewTicketForm {
    fn validate(&self, employee_id: UserId) -> Result<NewTicket, DeskError> {
        let title = self.title.trim();
        let description = self.description.trim();
        if title.is_empty() || description.is_empty() {
            return Err(DeskError::Validation("Please fill in all fields.".to_string()));
        }
        let priority = parse_choice::<Priority>(Some(self.priority.as_str()))
            .ok_or_else(|| DeskError::Validation("Please choose a valid priority.".to_string()))?;
        Ok(NewTicket {
            title: title.to_string(),
            description: description.to_string(),
            priority,
            status: Status::Open,
            employee_id,
        })
    }
}

fn new_ticket_page(visit: &mut Visit, user: &UserRef, form: &NewTicketForm) -> Response {
    let priority = parse_choice::<Priority>(Some(form.priority.as_str())).unwrap_or(Priority::Medium);
    render_template(TicketNewTemplate {
        chrome: visit.chrome(user, PageKey::NewTicket),
        title: form.title.clone(),
        description: form.description.clone(),
        priorities: select_options(&Priority::ALL, Some(priority)),
    })
}

pub(super) async fn new_ticket_form(State(state): State<Arc<AppState>>, jar: CookieJar) -> Response {
    let mut visit = Visit::open(&state, jar);
    let outcome = visit
        .enter(PageKey::NewTicket, None)
        .map(|(user, _)| new_ticket_page(&mut visit, &user, &NewTicketForm::default()));
    visit.finish(&state, outcome)
}

pub(super) async fn create_ticket(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Form(form): Form<NewTicketForm>,
) -> Response {
    let mut visit = Visit::open(&state, jar);
    let outcome = submit_ticket(&state, &mut visit, form).await;
    visit.finish(&state, outcome)
}

async fn submit_ticket(state: &AppState, visit: &mut Visit, form: NewTicketForm) -> Outcome {
    let (user, _) = visit.enter(PageKey::NewTicket, None)?;

    let ticket = match form.validate(user.id) {
        Ok(ticket) => ticket,
        Err(err) => {
            visit.flash(err.notice());
            return Ok(new_ticket_page(visit, &user, &form));
        }
    };

    match state.gateway.create_ticket(&ticket).await {
        Ok(id) => {
            tracing::info!(ticket_id = id, user_id = user.id, "Ticket created");
            visit.flash(Notice::success(format!("Ticket #{} created.", id)));
            Ok(visit.go(PageKey::EmployeeTickets))
        }
        Err(failure) => {
            visit.report("create ticket", failure);
            Ok(new_ticket_page(visit, &user, &form))
        }
    }
}

pub(super) async fn ticket_detail(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Path(id): Path<TicketId>,
) -> Response {
    let mut visit = Visit::open(&state, jar);
    let outcome = show_ticket(&state, &mut visit, id).await;
    visit.finish(&state, outcome)
}

async fn show_ticket(state: &AppState, visit: &mut Visit, id: TicketId) -> Outcome {
    let (user, resolution) = visit.enter(PageKey::TicketDetails, Some(id))?;

    let ticket = state
        .gateway
        .get_ticket(id)
        .await
        .map_err(|failure| visit.missing(format!("Ticket #{}", id), failure))?;

    let comments = match state.gateway.list_comments(id).await {
        Ok(comments) => comments,
        Err(failure) => {
            visit.report("list comments", failure);
            Vec::new()
        }
    };

    let manage = resolution.ticket_view == Some(TicketView::Manage);
    let back_href = super::page_path(visit.session.return_page(), &visit.session);
    Ok(render_template(TicketDetailTemplate {
        chrome: visit.chrome(&user, PageKey::TicketDetails),
        ticket: TicketCard::from(&ticket),
        comments: comments.iter().map(CommentLine::from).collect(),
        manage,
        can_assign_self: manage && ticket.is_unassigned(),
        can_delete: user.role.can_delete_tickets(),
        statuses: select_options(&Status::ALL, Some(ticket.status)),
        priorities: select_options(&Priority::ALL, Some(ticket.priority)),
        back_href,
    }))
}

#[derive(Debug, Deserialize)]
pub(super) struct CommentForm {
    #[serde(default)]
    content: String,
}

pub(super) async fn add_comment(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Path(id): Path<TicketId>,
    Form(form): Form<CommentForm>,
) -> Response {
    let mut visit = Visit::open(&state, jar);
    let outcome = post_comment(&state, &mut visit, id, form).await;
    visit.finish(&state, outcome)
}

async fn post_comment(
    state: &AppState,
    visit: &mut Visit,
    id: TicketId,
    form: CommentForm,
) -> Outcome {
    let (user, _) = visit.enter(PageKey::TicketDetails, Some(id))?;

    let content = form.content.trim();
    if content.is_empty() {
        visit.flash(DeskError::Validation("A comment cannot be empty.".to_string()).notice());
        return Ok(visit.redirect_to(PageKey::TicketDetails));
    }

    let comment = NewComment {
        content: content.to_string(),
        ticket_id: id,
        author_id: user.id,
    };
    match state.gateway.add_comment(id, &comment).await {
        Ok(_) => visit.flash(Notice::success("Comment added.")),
        Err(failure) if failure.is_not_found() => {
            return Err(visit.missing(format!("Ticket #{}", id), failure))
        }
        Err(failure) => visit.report("add comment", failure),
    }
    Ok(visit.redirect_to(PageKey::TicketDetails))
}

#[derive(Debug, Deserialize)]
pub(super) struct TicketUpdateForm {
    status: Option<String>,
    priority: Option<String>,
    assign_to_me: Option<String>,
}

pub(super) async fn update_ticket(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Path(id): Path<TicketId>,
    Form(form): Form<TicketUpdateForm>,
) -> Response {
    let mut visit = Visit::open(&state, jar);
    let outcome = apply_update(&state, &mut visit, id, form).await;
    visit.finish(&state, outcome)
}

async fn apply_update(
    state: &AppState,
    visit: &mut Visit,
    id: TicketId,
    form: TicketUpdateForm,
) -> Outcome {
    let (user, resolution) = visit.enter(PageKey::TicketDetails, Some(id))?;

    if resolution.ticket_view != Some(TicketView::Manage) {
        tracing::warn!(user_id = user.id, ticket_id = id, "Ticket update denied");
        visit.flash(DeskError::AuthorizationDenied(PageKey::TicketDetails).notice());
        return Ok(visit.redirect_to(PageKey::TicketDetails));
    }

    let update = TicketUpdate {
        status: parse_choice(form.status.as_deref()),
        priority: parse_choice(form.priority.as_deref()),
        technician_id: form.assign_to_me.is_some().then_some(user.id),
    };
    if update.is_empty() {
        visit.flash(Notice::info("Nothing to update."));
        return Ok(visit.redirect_to(PageKey::TicketDetails));
    }

    match state.gateway.update_ticket(id, &update).await {
        Ok(_) => {
            tracing::info!(ticket_id = id, user_id = user.id, "Ticket updated");
            visit.flash(Notice::success(format!("Ticket #{} updated.", id)));
        }
        Err(failure) if failure.is_not_found() => {
            return Err(visit.missing(format!("Ticket #{}", id), failure))
        }
        Err(failure) => visit.report("update ticket", failure),
    }
    Ok(visit.redirect_to(PageKey::TicketDetails))
}

pub(super) async fn delete_ticket(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Path(id): Path<TicketId>,
) -> Response {
    let mut visit = Visit::open(&state, jar);
    let outcome = remove_ticket(&state, &mut visit, id).await;
    visit.finish(&state, outcome)
}

async fn remove_ticket(state: &AppState, visit: &mut Visit, id: TicketId) -> Outcome {
    let (user, _) = visit.enter(PageKey::TicketDetails, Some(id))?;

    if !user.role.can_delete_tickets() {
        tracing::warn!(user_id = user.id, ticket_id = id, "Ticket deletion denied");
        visit.flash(DeskError::AuthorizationDenied(PageKey::TicketDetails).notice());
        return Ok(visit.redirect_to(PageKey::TicketDetails));
    }

    match state.gateway.delete_ticket(id).await {
        Ok(()) => {
            tracing::info!(ticket_id = id, user_id = user.id, "Ticket deleted");
            visit.flash(Notice::success(format!("Ticket #{} deleted.", id)));
            Ok(visit.back_to_list())
        }
        Err(failure) if failure.is_not_found() => {
            Err(visit.missing(format!("Ticket #{}", id), failure))
        }
        Err(failure) => {
            visit.report("delete ticket", failure);
            Ok(visit.redirect_to(PageKey::TicketDetails))
        }
    }
}
