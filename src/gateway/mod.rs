//! Client side of the ticket backend's REST API.
//!
//! Handlers only see the [`TicketGateway`] trait; [`HttpGateway`] is the
//! production implementation over reqwest.

mod http;
#[cfg(test)]
pub(crate) mod memory;

pub use http::HttpGateway;

use async_trait::async_trait;

use crate::error::ApiFailure;
use crate::models::{
    Comment, Credentials, NewComment, NewTicket, NewUser, Statistics, Ticket, TicketId,
    TicketQuery, TicketUpdate, UserId, UserRecord, UserRef, UserScope, UserUpdate,
};

pub type GatewayResult<T> = Result<T, ApiFailure>;

/// Operations the dashboard needs from the ticket backend.
///
/// Every non-success answer is reported as an [`ApiFailure`]; nothing is
/// retried. Update calls return the updated record when the backend echoes
/// it, `None` when it only acknowledges.
#[async_trait]
pub trait TicketGateway: Send + Sync {
    /// `POST /auth/verify`; a 401 failure means bad credentials
    async fn verify_credentials(&self, credentials: &Credentials) -> GatewayResult<UserRef>;

    async fn list_tickets(&self, query: &TicketQuery) -> GatewayResult<Vec<Ticket>>;
    async fn get_ticket(&self, id: TicketId) -> GatewayResult<Ticket>;
    async fn create_ticket(&self, ticket: &NewTicket) -> GatewayResult<TicketId>;
    async fn update_ticket(
        &self,
        id: TicketId,
        update: &TicketUpdate,
    ) -> GatewayResult<Option<Ticket>>;
    async fn delete_ticket(&self, id: TicketId) -> GatewayResult<()>;

    async fn list_comments(&self, ticket_id: TicketId) -> GatewayResult<Vec<Comment>>;
    async fn add_comment(&self, ticket_id: TicketId, comment: &NewComment)
        -> GatewayResult<Comment>;

    async fn list_users(&self, scope: UserScope) -> GatewayResult<Vec<UserRecord>>;
    async fn get_user(&self, id: UserId) -> GatewayResult<UserRecord>;
    async fn create_user(&self, user: &NewUser) -> GatewayResult<UserId>;
    async fn update_user(
        &self,
        id: UserId,
        update: &UserUpdate,
    ) -> GatewayResult<Option<UserRecord>>;
    async fn delete_user(&self, id: UserId) -> GatewayResult<()>;

    async fn statistics(&self) -> GatewayResult<Statistics>;
}
