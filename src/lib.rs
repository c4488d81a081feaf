pub mod access;
pub mod cli;
pub mod config;
pub mod error;
pub mod gateway;
pub mod models;
pub mod session;
pub mod ui;
pub mod views;

use config::Config;
use std::sync::Arc;

use crate::gateway::TicketGateway;
use crate::session::SessionStore;

pub struct AppState {
    pub config: Config,
    pub gateway: Arc<dyn TicketGateway>,
    pub sessions: Arc<SessionStore>,
}

impl AppState {
    pub fn new(config: Config, gateway: Arc<dyn TicketGateway>) -> Self {
        Self {
            config,
            gateway,
            sessions: Arc::new(SessionStore::new()),
        }
    }
}
