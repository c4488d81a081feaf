//! Pure view models: records in, renderable rows and series out.

pub mod filter;
pub mod projection;
pub mod stats;

pub use filter::{filter_tickets, Assignment, TicketCriteria};
pub use projection::{project_list, FieldMap, Row, Table, TICKET_FIELDS, USER_FIELDS};
pub use stats::{Bar, Section, StatCard, StatisticsView};
