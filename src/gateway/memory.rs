//! In-memory backend used by unit tests.

use async_trait::async_trait;
use std::sync::Mutex;
use std::time::Duration;

use super::{GatewayResult, TicketGateway};
use crate::error::ApiFailure;
use crate::models::{
    Comment, Credentials, NewComment, NewTicket, NewUser, Priority, PriorityCount, Role,
    Statistics, Status, StatusCounts, Ticket, TicketId, TicketQuery, TicketUpdate, UserId,
    UserRecord, UserRef, UserScope, UserUpdate,
};

#[derive(Default)]
struct State {
    users: Vec<(UserRecord, String)>,
    tickets: Vec<Ticket>,
    comments: Vec<Comment>,
    statistics: Statistics,
    fail_next: Option<ApiFailure>,
    list_latency: Option<Duration>,
    calls: Vec<String>,
}

#[derive(Default)]
pub struct MemoryGateway {
    state: Mutex<State>,
}

impl MemoryGateway {
    /// Three accounts (employee, technician, admin) and three tickets
    pub fn seeded() -> Self {
        let user = |id, name: &str, email: &str, role| UserRecord {
            id,
            name: name.to_string(),
            email: email.to_string(),
            role,
            registered_at: Some("2025-01-01".to_string()),
        };
        let ticket = |id, title: &str, status, priority, employee_id, technician_id| Ticket {
            id,
            title: title.to_string(),
            description: Some(format!("{} description", title)),
            status,
            priority,
            employee_id: Some(employee_id),
            technician_id,
            employee_name: None,
            technician_name: None,
            created_at: Some("2025-02-01".to_string()),
            updated_at: None,
        };

        let state = State {
            users: vec![
                (user(1, "Emma", "emp@example.com", Role::Employee), "emp".to_string()),
                (user(2, "Theo", "tech@example.com", Role::Technician), "tech".to_string()),
                (user(3, "Ada", "admin@example.com", Role::Admin), "admin".to_string()),
            ],
            tickets: vec![
                ticket(1, "Printer jammed", Status::Open, Priority::High, 1, None),
                ticket(2, "VPN drops", Status::InProgress, Priority::Medium, 1, Some(2)),
                ticket(3, "New monitor", Status::Open, Priority::Low, 3, None),
            ],
            comments: vec![Comment {
                id: 1,
                ticket_id: Some(2),
                author_id: Some(2),
                author_name: Some("Theo".to_string()),
                author_role: Some("Technicien".to_string()),
                content: "Looking into it".to_string(),
                created_at: None,
            }],
            statistics: Statistics {
                stats_by_status: Some(StatusCounts {
                    open: 2,
                    in_progress: 1,
                    resolved: 0,
                    closed: 0,
                }),
                mean_resolution_by_technician: None,
                tickets_by_priority: Some(vec![PriorityCount {
                    priority: "Élevée".to_string(),
                    total: 1,
                }]),
            },
            ..Default::default()
        };
        Self {
            state: Mutex::new(state),
        }
    }

    /// Make the next call fail with the given status
    pub fn fail_next(&self, status: u16, message: &str) {
        self.state.lock().unwrap().fail_next = Some(ApiFailure::new(Some(status), message));
    }

    /// Delay every ticket listing by `latency`
    pub fn slow_listing(&self, latency: Duration) {
        self.state.lock().unwrap().list_latency = Some(latency);
    }

    /// Names of the operations called so far
    pub fn calls(&self) -> Vec<String> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn ticket(&self, id: TicketId) -> Option<Ticket> {
        self.state.lock().unwrap().tickets.iter().find(|t| t.id == id).cloned()
    }

    pub fn user(&self, id: UserId) -> Option<UserRecord> {
        self.state
            .lock()
            .unwrap()
            .users
            .iter()
            .find(|(u, _)| u.id == id)
            .map(|(u, _)| u.clone())
    }

    pub fn comments_on(&self, ticket_id: TicketId) -> Vec<Comment> {
        self.state
            .lock()
            .unwrap()
            .comments
            .iter()
            .filter(|c| c.ticket_id == Some(ticket_id))
            .cloned()
            .collect()
    }

    fn enter(&self, call: &str) -> Result<std::sync::MutexGuard<'_, State>, ApiFailure> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(call.to_string());
        match state.fail_next.take() {
            Some(failure) => Err(failure),
            None => Ok(state),
        }
    }
}

fn not_found(what: &str) -> ApiFailure {
    ApiFailure::new(Some(404), format!("{} not found", what))
}

#[async_trait]
impl TicketGateway for MemoryGateway {
    async fn verify_credentials(&self, credentials: &Credentials) -> GatewayResult<UserRef> {
        let state = self.enter("verify_credentials")?;
        state
            .users
            .iter()
            .find(|(u, pw)| u.email == credentials.email && *pw == credentials.password)
            .map(|(u, _)| u.clone().into())
            .ok_or_else(|| ApiFailure::new(Some(401), "Identifiants invalides"))
    }

    async fn list_tickets(&self, query: &TicketQuery) -> GatewayResult<Vec<Ticket>> {
        // Like the real backend, query parameters are ignored
        let _ = query;
        let latency = self.state.lock().unwrap().list_latency;
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }
        let state = self.enter("list_tickets")?;
        Ok(state.tickets.clone())
    }

    async fn get_ticket(&self, id: TicketId) -> GatewayResult<Ticket> {
        let state = self.enter("get_ticket")?;
        state
            .tickets
            .iter()
            .find(|t| t.id == id)
            .cloned()
            .ok_or_else(|| not_found("Ticket"))
    }

    async fn create_ticket(&self, ticket: &NewTicket) -> GatewayResult<TicketId> {
        let mut state = self.enter("create_ticket")?;
        let id = state.tickets.iter().map(|t| t.id).max().unwrap_or(0) + 1;
        state.tickets.push(Ticket {
            id,
            title: ticket.title.clone(),
            description: Some(ticket.description.clone()),
            status: ticket.status,
            priority: ticket.priority,
            employee_id: Some(ticket.employee_id),
            technician_id: None,
            employee_name: None,
            technician_name: None,
            created_at: None,
            updated_at: None,
        });
        Ok(id)
    }

    async fn update_ticket(
        &self,
        id: TicketId,
        update: &TicketUpdate,
    ) -> GatewayResult<Option<Ticket>> {
        let mut state = self.enter("update_ticket")?;
        let ticket = state
            .tickets
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or_else(|| not_found("Ticket"))?;
        if let Some(status) = update.status {
            ticket.status = status;
        }
        if let Some(priority) = update.priority {
            ticket.priority = priority;
        }
        if let Some(technician_id) = update.technician_id {
            ticket.technician_id = Some(technician_id);
        }
        Ok(Some(ticket.clone()))
    }

    async fn delete_ticket(&self, id: TicketId) -> GatewayResult<()> {
        let mut state = self.enter("delete_ticket")?;
        let before = state.tickets.len();
        state.tickets.retain(|t| t.id != id);
        if state.tickets.len() == before {
            return Err(not_found("Ticket"));
        }
        Ok(())
    }

    async fn list_comments(&self, ticket_id: TicketId) -> GatewayResult<Vec<Comment>> {
        let state = self.enter("list_comments")?;
        Ok(state
            .comments
            .iter()
            .filter(|c| c.ticket_id == Some(ticket_id))
            .cloned()
            .collect())
    }

    async fn add_comment(
        &self,
        ticket_id: TicketId,
        comment: &NewComment,
    ) -> GatewayResult<Comment> {
        let mut state = self.enter("add_comment")?;
        let created = Comment {
            id: state.comments.len() as i64 + 1,
            ticket_id: Some(ticket_id),
            author_id: Some(comment.author_id),
            author_name: None,
            author_role: None,
            content: comment.content.clone(),
            created_at: None,
        };
        state.comments.push(created.clone());
        Ok(created)
    }

    async fn list_users(&self, scope: UserScope) -> GatewayResult<Vec<UserRecord>> {
        let state = self.enter("list_users")?;
        Ok(state
            .users
            .iter()
            .map(|(u, _)| u.clone())
            .filter(|u| match scope {
                UserScope::All => true,
                UserScope::Only(role) => u.role == role,
            })
            .collect())
    }

    async fn get_user(&self, id: UserId) -> GatewayResult<UserRecord> {
        let state = self.enter("get_user")?;
        state
            .users
            .iter()
            .find(|(u, _)| u.id == id)
            .map(|(u, _)| u.clone())
            .ok_or_else(|| not_found("User"))
    }

    async fn create_user(&self, user: &NewUser) -> GatewayResult<UserId> {
        let mut state = self.enter("create_user")?;
        let id = state.users.iter().map(|(u, _)| u.id).max().unwrap_or(0) + 1;
        let record = UserRecord {
            id,
            name: user.name.clone(),
            email: user.email.clone(),
            role: user.role,
            registered_at: None,
        };
        state.users.push((record, user.password.clone()));
        Ok(id)
    }

    async fn update_user(
        &self,
        id: UserId,
        update: &UserUpdate,
    ) -> GatewayResult<Option<UserRecord>> {
        let mut state = self.enter("update_user")?;
        let (user, password) = state
            .users
            .iter_mut()
            .find(|(u, _)| u.id == id)
            .ok_or_else(|| not_found("User"))?;
        if let Some(name) = &update.name {
            user.name = name.clone();
        }
        if let Some(email) = &update.email {
            user.email = email.clone();
        }
        if let Some(pw) = &update.password {
            *password = pw.clone();
        }
        if let Some(role) = update.role {
            user.role = role;
        }
        Ok(Some(user.clone()))
    }

    async fn delete_user(&self, id: UserId) -> GatewayResult<()> {
        let mut state = self.enter("delete_user")?;
        let before = state.users.len();
        state.users.retain(|(u, _)| u.id != id);
        if state.users.len() == before {
            return Err(not_found("User"));
        }
        Ok(())
    }

    async fn statistics(&self) -> GatewayResult<Statistics> {
        let state = self.enter("statistics")?;
        Ok(state.statistics.clone())
    }
}
