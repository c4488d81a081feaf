//! Error taxonomy for the dashboard and the notices it turns into.
//!
//! No error is fatal to a request: every failure ends as a rendered page
//! carrying a [`Notice`] for the user.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::access::PageKey;

/// Failure reported by the ticket backend or the transport underneath it.
///
/// `status_code` is `None` when no HTTP response was received (connection
/// refused, timeout, undecodable body).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct ApiFailure {
    pub status_code: Option<u16>,
    pub message: String,
}

impl ApiFailure {
    pub fn new(status_code: Option<u16>, message: impl Into<String>) -> Self {
        Self {
            status_code,
            message: message.into(),
        }
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self::new(None, message)
    }

    pub fn is_not_found(&self) -> bool {
        self.status_code == Some(404)
    }

    pub fn is_unauthorized(&self) -> bool {
        self.status_code == Some(401)
    }
}

/// Errors surfaced by session, routing and form handling
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DeskError {
    #[error("Incorrect email or password")]
    AuthFailure,

    #[error("The ticket service returned an error: {0}")]
    Api(#[from] ApiFailure),

    #[error("Cannot open {0:?} without a selection")]
    InvalidNavigation(PageKey),

    #[error("You do not have permission to open this page")]
    AuthorizationDenied(PageKey),

    #[error("{0}")]
    Validation(String),
}

impl DeskError {
    /// The user-visible notice for this error
    pub fn notice(&self) -> Notice {
        match self {
            DeskError::AuthFailure => Notice::error(self.to_string()),
            DeskError::Api(failure) => match failure.status_code {
                Some(code) => Notice::error(format!(
                    "The ticket service returned an error ({}): {}",
                    code, failure.message
                )),
                None => Notice::error(format!(
                    "The ticket service is unreachable: {}",
                    failure.message
                )),
            },
            DeskError::InvalidNavigation(_) => Notice::warning("Nothing is selected to display."),
            DeskError::AuthorizationDenied(_) => Notice::error(self.to_string()),
            DeskError::Validation(msg) => Notice::warning(msg.clone()),
        }
    }
}

/// Severity of a notice, used as a CSS class
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Info,
    Success,
    Warning,
    Error,
}

impl NoticeLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            NoticeLevel::Info => "info",
            NoticeLevel::Success => "success",
            NoticeLevel::Warning => "warning",
            NoticeLevel::Error => "error",
        }
    }
}

/// A one-shot message shown on the next rendered page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn new(level: NoticeLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::new(NoticeLevel::Info, message)
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self::new(NoticeLevel::Success, message)
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(NoticeLevel::Warning, message)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(NoticeLevel::Error, message)
    }

    pub fn css_class(&self) -> &'static str {
        self.level.as_str()
    }
}

impl From<DeskError> for Notice {
    fn from(err: DeskError) -> Self {
        err.notice()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_failure_classification() {
        assert!(ApiFailure::new(Some(404), "Ticket non trouvé").is_not_found());
        assert!(ApiFailure::new(Some(401), "Identifiants invalides").is_unauthorized());
        assert!(!ApiFailure::transport("connection refused").is_not_found());
    }

    #[test]
    fn test_notice_levels() {
        assert_eq!(DeskError::AuthFailure.notice().level, NoticeLevel::Error);
        assert_eq!(
            DeskError::Validation("Title is required".into()).notice(),
            Notice::warning("Title is required")
        );
        assert_eq!(
            DeskError::AuthorizationDenied(PageKey::AdminUsers).notice().level,
            NoticeLevel::Error
        );
    }

    #[test]
    fn test_api_notice_mentions_status() {
        let notice = DeskError::from(ApiFailure::new(Some(500), "boom")).notice();
        assert!(notice.message.contains("500"));
        assert!(notice.message.contains("boom"));

        let notice = DeskError::from(ApiFailure::transport("timed out")).notice();
        assert!(notice.message.contains("unreachable"));
    }
}
