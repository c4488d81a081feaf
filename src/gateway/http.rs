//! reqwest implementation of the ticket backend client.

use async_trait::async_trait;
use reqwest::{Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::{GatewayResult, TicketGateway};
use crate::config::ApiConfig;
use crate::error::ApiFailure;
use crate::models::{
    Comment, Credentials, NewComment, NewTicket, NewUser, Statistics, Ticket, TicketId,
    TicketQuery, TicketUpdate, UserId, UserRecord, UserRef, UserScope, UserUpdate, WireLabel,
};

/// Answer of creation endpoints: either the full record or `{ticketId}`
#[derive(Debug, Deserialize)]
struct CreatedId {
    #[serde(alias = "ticketId", alias = "userId", alias = "insertId")]
    id: i64,
}

/// Error body the backend sends with non-2xx answers
#[derive(Debug, Deserialize)]
struct ErrorPayload {
    #[serde(alias = "msg", alias = "error")]
    message: String,
}

/// HTTP client for the ticket backend
pub struct HttpGateway {
    base_url: String,
    client: reqwest::Client,
}

impl HttpGateway {
    pub fn new(config: &ApiConfig) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(concat!("ticketdesk/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.client
            .request(method, format!("{}{}", self.base_url, path))
            .header("Accept", "application/json")
    }

    /// Send the request and turn transport errors and non-2xx answers into
    /// an [`ApiFailure`]
    async fn send(&self, request: RequestBuilder) -> GatewayResult<Response> {
        let response = request.send().await.map_err(|e| {
            tracing::warn!(error = %e, "Ticket API request failed");
            ApiFailure::transport(e.to_string())
        })?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorPayload>(&body)
            .map(|p| p.message)
            .unwrap_or_else(|_| {
                if body.trim().is_empty() {
                    status.canonical_reason().unwrap_or("request failed").to_string()
                } else {
                    body
                }
            });
        tracing::debug!(status = status.as_u16(), %message, "Ticket API error response");
        Err(ApiFailure::new(Some(status.as_u16()), message))
    }

    async fn decode<T: DeserializeOwned>(response: Response) -> GatewayResult<T> {
        let status = response.status().as_u16();
        response.json().await.map_err(|e| {
            ApiFailure::new(Some(status), format!("Unexpected response from the ticket API: {}", e))
        })
    }

    /// Decode the body if it is a `T`, ignore it otherwise
    async fn decode_optional<T: DeserializeOwned>(response: Response) -> Option<T> {
        let body = response.bytes().await.ok()?;
        serde_json::from_slice(&body).ok()
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> GatewayResult<T> {
        let response = self.send(self.request(Method::GET, path)).await?;
        Self::decode(response).await
    }

    async fn send_json<B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        body: &B,
    ) -> GatewayResult<Response> {
        self.send(self.request(method, path).json(body)).await
    }
}

#[async_trait]
impl TicketGateway for HttpGateway {
    async fn verify_credentials(&self, credentials: &Credentials) -> GatewayResult<UserRef> {
        let response = self
            .send_json(Method::POST, "/auth/verify", credentials)
            .await?;
        Self::decode(response).await
    }

    async fn list_tickets(&self, query: &TicketQuery) -> GatewayResult<Vec<Ticket>> {
        let response = self
            .send(self.request(Method::GET, "/tickets").query(query))
            .await?;
        Self::decode(response).await
    }

    async fn get_ticket(&self, id: TicketId) -> GatewayResult<Ticket> {
        self.get(&format!("/tickets/{}", id)).await
    }

    async fn create_ticket(&self, ticket: &NewTicket) -> GatewayResult<TicketId> {
        let response = self.send_json(Method::POST, "/tickets", ticket).await?;
        let created: CreatedId = Self::decode(response).await?;
        Ok(created.id)
    }

    async fn update_ticket(
        &self,
        id: TicketId,
        update: &TicketUpdate,
    ) -> GatewayResult<Option<Ticket>> {
        let response = self
            .send_json(Method::PUT, &format!("/tickets/{}", id), update)
            .await?;
        Ok(Self::decode_optional(response).await)
    }

    async fn delete_ticket(&self, id: TicketId) -> GatewayResult<()> {
        self.send(self.request(Method::DELETE, &format!("/tickets/{}", id)))
            .await?;
        Ok(())
    }

    async fn list_comments(&self, ticket_id: TicketId) -> GatewayResult<Vec<Comment>> {
        self.get(&format!("/tickets/{}/comments", ticket_id)).await
    }

    async fn add_comment(
        &self,
        ticket_id: TicketId,
        comment: &NewComment,
    ) -> GatewayResult<Comment> {
        let response = self
            .send_json(Method::POST, &format!("/tickets/{}/comments", ticket_id), comment)
            .await?;
        Self::decode(response).await
    }

    async fn list_users(&self, scope: UserScope) -> GatewayResult<Vec<UserRecord>> {
        let mut request = self.request(Method::GET, scope.path());
        if let UserScope::Only(role) = scope {
            request = request.query(&[("role", role.wire_label())]);
        }
        let response = self.send(request).await?;
        Self::decode(response).await
    }

    async fn get_user(&self, id: UserId) -> GatewayResult<UserRecord> {
        self.get(&format!("/users/{}", id)).await
    }

    async fn create_user(&self, user: &NewUser) -> GatewayResult<UserId> {
        let response = self.send_json(Method::POST, "/users", user).await?;
        let created: CreatedId = Self::decode(response).await?;
        Ok(created.id)
    }

    async fn update_user(
        &self,
        id: UserId,
        update: &UserUpdate,
    ) -> GatewayResult<Option<UserRecord>> {
        let response = self
            .send_json(Method::PUT, &format!("/users/{}", id), update)
            .await?;
        Ok(Self::decode_optional(response).await)
    }

    async fn delete_user(&self, id: UserId) -> GatewayResult<()> {
        self.send(self.request(Method::DELETE, &format!("/users/{}", id)))
            .await?;
        Ok(())
    }

    async fn statistics(&self) -> GatewayResult<Statistics> {
        self.get("/statistics").await
    }
}
