//! Records exchanged with the ticket backend, split into domain-specific modules.
//!
//! Field names are English inside the crate. The backend's French keys are
//! accepted as serde aliases on the way in and written back only by the
//! request payload types.

pub mod common;
pub mod role;
pub mod stats;
pub mod ticket;
pub mod user;

pub use common::*;
pub use role::*;
pub use stats::*;
pub use ticket::*;
pub use user::*;
