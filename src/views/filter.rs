//! Client-side ticket filtering.
//!
//! Applied after every list fetch: the backend does not reliably honour the
//! query string, and "unassigned" cannot be expressed in it at all.

use crate::models::{Priority, Status, Ticket, TicketQuery, UserId};

/// Technician assignment predicate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Assignment {
    /// Assigned to this technician
    To(UserId),
    /// No technician yet
    Unassigned,
}

/// Optional equality predicates, ANDed together
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TicketCriteria {
    pub status: Option<Status>,
    pub priority: Option<Priority>,
    pub employee_id: Option<UserId>,
    pub technician: Option<Assignment>,
}

impl TicketCriteria {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub fn matches(&self, ticket: &Ticket) -> bool {
        self.status.map_or(true, |s| ticket.status == s)
            && self.priority.map_or(true, |p| ticket.priority == p)
            && self
                .employee_id
                .map_or(true, |id| ticket.employee_id == Some(id))
            && match self.technician {
                None => true,
                Some(Assignment::Unassigned) => ticket.technician_id.is_none(),
                Some(Assignment::To(id)) => ticket.technician_id == Some(id),
            }
    }

    /// The subset of the criteria the backend query string can carry
    pub fn to_query(&self) -> TicketQuery {
        TicketQuery {
            status: self.status,
            priority: self.priority,
            employee_id: self.employee_id,
            technician_id: match self.technician {
                Some(Assignment::To(id)) => Some(id),
                _ => None,
            },
        }
    }
}

/// Keep the tickets matching every provided criterion, in input order
pub fn filter_tickets(tickets: &[Ticket], criteria: &TicketCriteria) -> Vec<Ticket> {
    tickets
        .iter()
        .filter(|ticket| criteria.matches(ticket))
        .cloned()
        .collect()
}
